//! PostgreSQL Repository 実装
//!
//! ドメイン層の 4 つの Repository trait を 1 つの接続プールで実装します。
//! 行は `FromRow` の Row 構造体で受け取り、ドメインモデルへ変換します。
//!
//! ```text
//! DB Row → *Row (FromRow) → ドメインモデル
//! ```

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};

use crate::domain::{
    AddonRecord, AddonRepository, CountryCode, KnownUser, RepositoryError, SeenRecord,
    SeenRepository, SeenUpdate, SubscriberId, TrackingRepository, UserRepository, Username,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS kartwatch_seen (
        username TEXT PRIMARY KEY,
        country TEXT,
        seen_at TIMESTAMPTZ NOT NULL,
        server_name TEXT NOT NULL,
        server_country TEXT
    )",
    "ALTER TABLE kartwatch_seen ALTER COLUMN server_country DROP NOT NULL",
    "CREATE TABLE IF NOT EXISTS kartwatch_tracking (
        subscriber_id BIGINT PRIMARY KEY,
        usernames TEXT[] NOT NULL DEFAULT '{}'
    )",
    "CREATE TABLE IF NOT EXISTS kartwatch_addons (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        file TEXT NOT NULL,
        date BIGINT NOT NULL,
        uploader TEXT NOT NULL,
        designer TEXT NOT NULL,
        description TEXT NOT NULL,
        image TEXT NOT NULL DEFAULT '',
        format INTEGER NOT NULL,
        revision INTEGER NOT NULL,
        status INTEGER NOT NULL,
        size BIGINT NOT NULL,
        rating DOUBLE PRECISION NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS kartwatch_users (
        id BIGINT PRIMARY KEY,
        username TEXT NOT NULL
    )",
];

fn database(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

/// Escape `LIKE` wildcards so `raw` matches literally, using `\` as the escape character
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, FromRow)]
struct SeenRow {
    username: String,
    country: Option<String>,
    seen_at: DateTime<Utc>,
    server_name: String,
    server_country: Option<String>,
}

impl TryFrom<SeenRow> for SeenRecord {
    type Error = RepositoryError;

    fn try_from(row: SeenRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| RepositoryError::CorruptRow {
            table: "kartwatch_seen",
            reason,
        };
        Ok(SeenRecord {
            username: Username::new(row.username).map_err(|e| corrupt(e.to_string()))?,
            // Country is optional in the model; a bad stored value reads as unknown
            country: row.country.as_deref().and_then(|c| CountryCode::new(c).ok()),
            seen_at: row.seen_at,
            server_name: row.server_name,
            server_country: row
                .server_country
                .as_deref()
                .and_then(|c| CountryCode::new(c).ok()),
        })
    }
}

#[derive(Debug, FromRow)]
struct TrackingRow {
    subscriber_id: i64,
    usernames: Vec<String>,
}

#[derive(Debug, FromRow)]
struct AddonRow {
    id: String,
    name: String,
    file: String,
    date: i64,
    uploader: String,
    designer: String,
    description: String,
    image: String,
    format: i32,
    revision: i32,
    status: i32,
    size: i64,
    rating: f64,
}

impl From<AddonRow> for AddonRecord {
    fn from(row: AddonRow) -> Self {
        AddonRecord {
            id: row.id,
            name: row.name,
            file: row.file,
            date: row.date,
            uploader: row.uploader,
            designer: row.designer,
            description: row.description,
            image: row.image,
            format: row.format,
            revision: row.revision,
            status: row.status,
            size: row.size,
            rating: row.rating,
        }
    }
}

/// All repositories backed by one PostgreSQL pool
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and create the tables if they do not exist yet
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(database)?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(database)?;
        }
        Ok(())
    }

    async fn upsert_seen(
        &self,
        statement: &str,
        updates: &[SeenUpdate],
        seen_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(database)?;
        for update in updates {
            sqlx::query(statement)
                .bind(update.username.as_str())
                .bind(update.country.as_ref().map(|c| c.as_str()))
                .bind(seen_at)
                .bind(&update.server_name)
                .bind(update.server_country.as_ref().map(|c| c.as_str()))
                .execute(&mut *tx)
                .await
                .map_err(database)?;
        }
        tx.commit().await.map_err(database)
    }
}

#[async_trait]
impl SeenRepository for PostgresStore {
    async fn upsert_with_country(
        &self,
        updates: &[SeenUpdate],
        seen_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.upsert_seen(
            "INSERT INTO kartwatch_seen (username, country, seen_at, server_name, server_country)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (username) DO UPDATE SET
                country = EXCLUDED.country,
                seen_at = EXCLUDED.seen_at,
                server_name = EXCLUDED.server_name,
                server_country = EXCLUDED.server_country",
            updates,
            seen_at,
        )
        .await
    }

    async fn upsert_without_country(
        &self,
        updates: &[SeenUpdate],
        seen_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        // $2 is bound but only used for a brand-new row
        self.upsert_seen(
            "INSERT INTO kartwatch_seen (username, country, seen_at, server_name, server_country)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (username) DO UPDATE SET
                seen_at = EXCLUDED.seen_at,
                server_name = EXCLUDED.server_name,
                server_country = EXCLUDED.server_country",
            updates,
            seen_at,
        )
        .await
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<SeenRecord>, RepositoryError> {
        let row: Option<SeenRow> = sqlx::query_as(
            "SELECT username, country, seen_at, server_name, server_country
             FROM kartwatch_seen
             WHERE username ILIKE $1 ESCAPE '\\'
             ORDER BY username
             LIMIT 1",
        )
        .bind(format!("{}%", escape_like(prefix)))
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?;

        row.map(SeenRecord::try_from).transpose()
    }
}

#[async_trait]
impl TrackingRepository for PostgresStore {
    async fn tracked_by(&self, subscriber: SubscriberId) -> Result<Vec<Username>, RepositoryError> {
        let row: Option<TrackingRow> = sqlx::query_as(
            "SELECT subscriber_id, usernames FROM kartwatch_tracking WHERE subscriber_id = $1",
        )
        .bind(subscriber.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?;

        row.map(|r| r.usernames)
            .unwrap_or_default()
            .into_iter()
            .map(|name| {
                Username::new(name).map_err(|e| RepositoryError::CorruptRow {
                    table: "kartwatch_tracking",
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    async fn add(
        &self,
        subscriber: SubscriberId,
        username: Username,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO kartwatch_tracking (subscriber_id, usernames)
             VALUES ($1, ARRAY[$2::TEXT])
             ON CONFLICT (subscriber_id) DO UPDATE SET
                usernames = array_append(kartwatch_tracking.usernames, $2::TEXT)",
        )
        .bind(subscriber.value())
        .bind(username.as_str())
        .execute(&self.pool)
        .await
        .map_err(database)?;
        Ok(())
    }

    async fn remove(
        &self,
        subscriber: SubscriberId,
        username: &Username,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE kartwatch_tracking
             SET usernames = array_remove(usernames, $2::TEXT)
             WHERE subscriber_id = $1 AND $2::TEXT = ANY(usernames)",
        )
        .bind(subscriber.value())
        .bind(username.as_str())
        .execute(&self.pool)
        .await
        .map_err(database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, subscriber: SubscriberId) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(database)?;
        let count: Option<(i32,)> = sqlx::query_as(
            "SELECT cardinality(usernames) FROM kartwatch_tracking
             WHERE subscriber_id = $1 FOR UPDATE",
        )
        .bind(subscriber.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(database)?;

        sqlx::query("UPDATE kartwatch_tracking SET usernames = '{}' WHERE subscriber_id = $1")
            .bind(subscriber.value())
            .execute(&mut *tx)
            .await
            .map_err(database)?;
        tx.commit().await.map_err(database)?;

        Ok(count.map(|(n,)| n.max(0) as usize).unwrap_or(0))
    }

    async fn subscribers_for(
        &self,
        usernames: &[Username],
    ) -> Result<HashMap<Username, Vec<SubscriberId>>, RepositoryError> {
        if usernames.is_empty() {
            return Ok(HashMap::new());
        }
        let names: Vec<String> = usernames.iter().map(|u| u.as_str().to_string()).collect();
        let rows: Vec<TrackingRow> = sqlx::query_as(
            "SELECT subscriber_id, usernames FROM kartwatch_tracking
             WHERE usernames && $1::TEXT[]
             ORDER BY subscriber_id",
        )
        .bind(names.clone())
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        let mut result: HashMap<Username, Vec<SubscriberId>> = HashMap::new();
        for row in rows {
            for name in row.usernames.iter().filter(|n| wanted.contains(n.as_str())) {
                if let Some(username) = usernames.iter().find(|u| u.as_str() == name) {
                    result
                        .entry(username.clone())
                        .or_default()
                        .push(SubscriberId::new(row.subscriber_id));
                }
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl AddonRepository for PostgresStore {
    async fn upsert_all(&self, records: &[AddonRecord]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(database)?;
        for r in records {
            sqlx::query(
                "INSERT INTO kartwatch_addons
                    (id, name, file, date, uploader, designer, description, image,
                     format, revision, status, size, rating)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                 ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    file = EXCLUDED.file,
                    date = EXCLUDED.date,
                    uploader = EXCLUDED.uploader,
                    designer = EXCLUDED.designer,
                    description = EXCLUDED.description,
                    image = EXCLUDED.image,
                    format = EXCLUDED.format,
                    revision = EXCLUDED.revision,
                    status = EXCLUDED.status,
                    size = EXCLUDED.size,
                    rating = EXCLUDED.rating",
            )
            .bind(&r.id)
            .bind(&r.name)
            .bind(&r.file)
            .bind(r.date)
            .bind(&r.uploader)
            .bind(&r.designer)
            .bind(&r.description)
            .bind(&r.image)
            .bind(r.format)
            .bind(r.revision)
            .bind(r.status)
            .bind(r.size)
            .bind(r.rating)
            .execute(&mut *tx)
            .await
            .map_err(database)?;
        }
        tx.commit().await.map_err(database)
    }

    async fn load_all(&self) -> Result<Vec<AddonRecord>, RepositoryError> {
        let rows: Vec<AddonRow> = sqlx::query_as(
            "SELECT id, name, file, date, uploader, designer, description, image,
                    format, revision, status, size, rating
             FROM kartwatch_addons ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;
        Ok(rows.into_iter().map(AddonRecord::from).collect())
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn remember(&self, users: &[KnownUser]) -> Result<(), RepositoryError> {
        if users.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(database)?;
        for user in users {
            sqlx::query(
                "INSERT INTO kartwatch_users (id, username) VALUES ($1, $2)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(i64::from(user.user_id))
            .bind(user.username.as_str())
            .execute(&mut *tx)
            .await
            .map_err(database)?;
        }
        tx.commit().await.map_err(database)
    }

    async fn username_of(&self, user_id: u32) -> Result<Option<Username>, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT username FROM kartwatch_users WHERE id = $1")
                .bind(i64::from(user_id))
                .fetch_optional(&self.pool)
                .await
                .map_err(database)?;

        row.map(|(name,)| {
            Username::new(name).map_err(|e| RepositoryError::CorruptRow {
                table: "kartwatch_users",
                reason: e.to_string(),
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        // テスト項目: LIKE のワイルドカードとエスケープ文字がエスケープされる
        assert_eq!(escape_like("alice"), "alice");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_seen_row_conversion() {
        // テスト項目: 保存済みの行がドメインモデルへ変換される
        // given (前提条件):
        let row = SeenRow {
            username: "alice".to_string(),
            country: Some("XX1".to_string()),
            seen_at: Utc::now(),
            server_name: "Server".to_string(),
            server_country: Some("DE".to_string()),
        };

        // when (操作):
        let record = SeenRecord::try_from(row).unwrap();

        // then (期待する結果): 不正な国コードは不明扱い
        assert_eq!(record.country, None);
        assert_eq!(record.server_country, Some(CountryCode::new("de").unwrap()));
    }

    #[test]
    fn test_seen_row_with_empty_username_is_corrupt() {
        // テスト項目: ユーザー名が空の行は CorruptRow になる
        let row = SeenRow {
            username: String::new(),
            country: None,
            seen_at: Utc::now(),
            server_name: "Server".to_string(),
            server_country: None,
        };

        assert!(matches!(
            SeenRecord::try_from(row),
            Err(RepositoryError::CorruptRow {
                table: "kartwatch_seen",
                ..
            })
        ));
    }
}
