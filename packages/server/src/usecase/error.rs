//! UseCase 層のエラー定義

use thiserror::Error;

use crate::{
    domain::{RepositoryError, SnapshotError, Username},
    infrastructure::{parser::CatalogError, source::SourceError},
};

/// トラッキング操作のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// 既に追跡中
    #[error("{0} is already tracked")]
    AlreadyTracked(Username),

    /// 追跡数の上限に到達
    #[error("tracking limit of {limit} players reached")]
    LimitReached { limit: usize },

    /// 追跡していないユーザー
    #[error("{0} is not tracked")]
    NotTracked(Username),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// 1 回のポーリングが失敗した理由（ベースラインは変更されない）
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] SourceError),

    #[error("malformed snapshot: {0}")]
    Malformed(#[from] SnapshotError),
}

/// カタログ同期のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncCatalogError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] SourceError),

    #[error(transparent)]
    Parse(#[from] CatalogError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
