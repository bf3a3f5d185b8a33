//! Retrieval of transaction records from the library service.

use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::AUTHORIZATION;

use crate::error::FetchError;
use crate::model::TransactionRecord;

const TRANSACTIONS_PATH: &str = "transactions";

/// Anything that can produce the full transaction list for a report run.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Returns every transaction visible to the holder of `token`. Filtering
    /// by month happens on the caller's side.
    async fn fetch_transactions(&self, token: &str) -> Result<Vec<TransactionRecord>, FetchError>;
}

/// Reads transactions from the library REST service.
#[derive(Clone, Debug)]
pub struct HttpTransactionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpTransactionSource {
    /// Creates a source for the service rooted at `base_url`.
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: transactions_url(base_url),
        }
    }

    /// The endpoint the source reads from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Builds a client carrying the crate's user agent. No request timeout is configured.
pub fn default_http_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(concat!("library-report/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::Client)
}

fn transactions_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), TRANSACTIONS_PATH)
}

#[async_trait]
impl TransactionSource for HttpTransactionSource {
    async fn fetch_transactions(&self, token: &str) -> Result<Vec<TransactionRecord>, FetchError> {
        debug!("Fetching transactions from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Transaction request to {} returned {}", self.url, status);
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Transport {
            url: self.url.clone(),
            source,
        })?;

        let records: Vec<TransactionRecord> =
            serde_json::from_slice(&body).map_err(|err| FetchError::Decode {
                url: self.url.clone(),
                message: err.to_string(),
            })?;

        debug!("Fetched {} transactions", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_base_url_and_path() {
        assert_eq!(
            transactions_url("https://library.example/api/"),
            "https://library.example/api/transactions"
        );
        assert_eq!(
            transactions_url("http://localhost:5000/api"),
            "http://localhost:5000/api/transactions"
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let client = default_http_client().expect("client builds");
        // Port 9 (discard) on localhost is not expected to accept connections.
        let source = HttpTransactionSource::new(client, "http://127.0.0.1:9");

        let err = source
            .fetch_transactions("token")
            .await
            .expect_err("nothing listens there");
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
