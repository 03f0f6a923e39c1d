//! reqwest client for the remote API.

use std::time::Duration;

use async_trait::async_trait;

use super::{CATALOG_PATH, CatalogSource, SERVER_LIST_PATH, SnapshotSource, SourceError};

/// GETs documents relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Create a client for `base_url` (e.g. `https://online.example.net`).
    ///
    /// # Errors
    ///
    /// Fails when the TLS backend cannot be initialised.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, path: &str) -> Result<String, SourceError> {
        let url = format!("{}{}", self.base_url, path);
        let transport = |e: reqwest::Error| SourceError::Transport {
            url: url.clone(),
            reason: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        tracing::trace!("GET {} -> {} bytes", url, body.len());
        Ok(body)
    }
}

#[async_trait]
impl SnapshotSource for HttpApiClient {
    async fn fetch_server_list(&self) -> Result<String, SourceError> {
        self.get_text(SERVER_LIST_PATH).await
    }
}

#[async_trait]
impl CatalogSource for HttpApiClient {
    async fn fetch_catalog(&self) -> Result<String, SourceError> {
        self.get_text(CATALOG_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        // テスト項目: ベース URL 末尾のスラッシュは取り除かれる
        let client =
            HttpApiClient::new("https://online.example.net/", "kartwatch/test", Duration::from_secs(5))
                .unwrap();

        assert_eq!(client.base_url(), "https://online.example.net");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // テスト項目: 接続できない場合は Transport エラーになる
        // given (前提条件): 誰も listen していないポート
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = HttpApiClient::new(
            &format!("http://{addr}"),
            "kartwatch/test",
            Duration::from_secs(2),
        )
        .unwrap();

        // when (操作):
        let result = client.fetch_server_list().await;

        // then (期待する結果):
        assert!(matches!(result, Err(SourceError::Transport { .. })));
    }
}
