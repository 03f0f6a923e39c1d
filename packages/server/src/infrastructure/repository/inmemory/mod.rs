//! InMemory Repository 実装群
//!
//! データベース URL が設定されていない場合に使われます。
//! プロセス再起動で内容は失われます。

mod addon;
mod seen;
mod tracking;
mod user;

pub use addon::InMemoryAddonRepository;
pub use seen::InMemorySeenRepository;
pub use tracking::InMemoryTrackingRepository;
pub use user::InMemoryUserRepository;
