//! Search transport.
//!
//! The client does not talk HTTP itself: it sends each request through a
//! [`SearchTransport`], which performs a GET against the select endpoint and
//! returns the decoded JSON body. [`HttpTransport`] is the reqwest-backed
//! implementation; tests substitute their own.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Performs select requests against a search backend.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Sends a GET to `url` with `params` as the query string and returns the
    /// JSON response body.
    async fn fetch(&self, url: &str, params: &[(String, String)]) -> Result<Value, TransportError>;
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
    use serde_json::Value;

    use super::SearchTransport;
    use crate::error::TransportError;

    /// Upper bound on the error body echoed into [`TransportError::Status`].
    const MAX_ERROR_BODY: usize = 2048;

    /// reqwest-backed [`SearchTransport`].
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: reqwest::Client,
    }

    impl HttpTransport {
        /// Creates a transport with the given request timeout.
        pub fn new(timeout: Duration) -> Result<Self, TransportError> {
            let mut headers = HeaderMap::new();
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

            let client = reqwest::Client::builder()
                .default_headers(headers)
                .timeout(timeout)
                .build()
                .map_err(|e| TransportError::Request {
                    message: format!("failed to create HTTP client: {e}"),
                })?;

            Ok(Self { client })
        }

        /// Wraps an existing reqwest client.
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl SearchTransport for HttpTransport {
        async fn fetch(
            &self,
            url: &str,
            params: &[(String, String)],
        ) -> Result<Value, TransportError> {
            tracing::debug!(url, params = params.len(), "GET select");

            let response = self
                .client
                .get(url)
                .query(params)
                .send()
                .await
                .map_err(|e| TransportError::Request {
                    message: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                let mut body = response.text().await.unwrap_or_default();
                if body.len() > MAX_ERROR_BODY {
                    let mut cut = MAX_ERROR_BODY;
                    while !body.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    body.truncate(cut);
                }
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            response
                .json::<Value>()
                .await
                .map_err(|e| TransportError::Decode {
                    message: e.to_string(),
                })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_new_builds_client() {
            assert!(HttpTransport::new(Duration::from_secs(5)).is_ok());
        }

        #[tokio::test]
        async fn test_unreachable_host_is_request_error() {
            let transport = HttpTransport::new(Duration::from_millis(500)).unwrap();
            // port 9 (discard) on localhost is expected to refuse connections
            let result = transport
                .fetch("http://127.0.0.1:9/solr/select", &[("q".to_string(), "*:*".to_string())])
                .await;
            assert!(matches!(result, Err(TransportError::Request { .. })));
        }
    }
}
