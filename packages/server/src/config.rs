//! Command-line and environment configuration.

use std::{net::SocketAddr, time::Duration};

use clap::Parser;

/// Runtime settings; every flag can also be set through a `KARTWATCH_*` variable
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Base URL of the online services API
    #[arg(long, env = "KARTWATCH_API_BASE_URL", default_value = "https://online.supertuxkart.net")]
    pub api_base_url: String,

    /// User agent sent with every upstream request
    #[arg(long, env = "KARTWATCH_USER_AGENT", default_value = concat!("kartwatch/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "KARTWATCH_HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// Seconds between server list polls
    #[arg(long, env = "KARTWATCH_POLL_INTERVAL_SECS", default_value_t = 5)]
    pub poll_interval_secs: u64,

    /// Seconds between addon catalog syncs
    #[arg(long, env = "KARTWATCH_CATALOG_INTERVAL_SECS", default_value_t = 7200)]
    pub catalog_interval_secs: u64,

    /// Address the HTTP API listens on
    #[arg(long, env = "KARTWATCH_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// PostgreSQL URL; in-memory stores are used when unset
    #[arg(long, env = "KARTWATCH_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Endpoint receiving tracked-player notifications; they are only logged when unset
    #[arg(long, env = "KARTWATCH_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Pending notifications kept before new ones are dropped
    #[arg(long, env = "KARTWATCH_QUEUE_CAPACITY", default_value_t = 256)]
    pub queue_capacity: usize,

    /// Usernames one subscriber may track
    #[arg(long, env = "KARTWATCH_MAX_TRACKED", default_value_t = 20)]
    pub max_tracked: usize,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, env = "KARTWATCH_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn catalog_interval(&self) -> Duration {
        Duration::from_secs(self.catalog_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // テスト項目: 引数なしでデフォルト値が使われる
        // when (操作):
        let config = Config::try_parse_from(["kartwatch-server"]).unwrap();

        // then (期待する結果):
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.catalog_interval(), Duration::from_secs(7200));
        assert_eq!(config.max_tracked, 20);
        assert!(config.user_agent.starts_with("kartwatch/"));
    }

    #[test]
    fn test_flags_override_defaults() {
        // テスト項目: フラグで値を上書きでき、0 秒の間隔は 1 秒に切り上げられる
        let config = Config::try_parse_from([
            "kartwatch-server",
            "--poll-interval-secs",
            "0",
            "--bind",
            "0.0.0.0:9000",
            "--webhook-url",
            "http://hooks.local/notify",
        ])
        .unwrap();

        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.webhook_url.as_deref(), Some("http://hooks.local/notify"));
        assert!(config.database_url.is_none());
    }
}
