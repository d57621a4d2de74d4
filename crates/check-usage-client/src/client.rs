//! HTTP client for the accounting service
//!
//! One [`UsageClient::fetch`] call is one GET to the jobs endpoint. Failures
//! come back as errors; nothing is retried.

use crate::config::ClientConfig;
use check_usage_core::{QueryParameters, Result, UsageError, UsageReport};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use tracing::{debug, info};

/// Longest body excerpt carried in a status error
const MAX_ERROR_BODY: usize = 200;

/// Client for the accounting service's jobs endpoint
pub struct UsageClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl UsageClient {
    /// Create a client; the token is sent on every request
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(config.token()).map_err(|_| {
            UsageError::Config("API token contains characters not allowed in a header".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("check-usage/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL, including query string, for `query`
    pub fn request_url(&self, query: &QueryParameters) -> Result<Url> {
        let mut url = self.config.jobs_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        Ok(url)
    }

    /// Issue the request for `query` and parse the response
    pub async fn fetch(&self, query: &QueryParameters) -> Result<UsageReport> {
        let url = self.request_url(query)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        info!("Accounting service responded with {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UsageError::Status {
                status: status.as_u16(),
                message: describe_failure(status, &body),
            });
        }

        let body = response.bytes().await?;
        debug!("Received {} byte response", body.len());
        UsageReport::from_slice(&body)
    }
}

/// Human-readable explanation of a non-success response
///
/// Prefers a `detail` or `error` field from a JSON body, then the body text,
/// then the status reason phrase.
fn describe_failure(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Unknown status");

    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["detail", "error", "message"]
                .iter()
                .find_map(|key| v.get(key).and_then(|d| d.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.split_whitespace().collect::<Vec<_>>().join(" "));

    if detail.is_empty() {
        return reason.to_string();
    }

    let mut detail = detail;
    if detail.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !detail.is_char_boundary(cut) {
            cut -= 1;
        }
        detail.truncate(cut);
        detail.push_str("...");
    }
    format!("{reason} ({detail})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use check_usage_core::{ErrorKind, Site};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> UsageClient {
        let config =
            ClientConfig::new(Site::Brc, &format!("{}/api", server.uri()), "Token test").unwrap();
        UsageClient::new(config).unwrap()
    }

    fn alice_query() -> QueryParameters {
        QueryParameters::builder()
            .with_user("alice")
            .build_with_login(None)
            .unwrap()
    }

    #[test]
    fn test_request_url_encodes_parameters() {
        let config = ClientConfig::new(Site::Brc, "https://example.org/api/", "t").unwrap();
        let client = UsageClient::new(config).unwrap();
        let query = QueryParameters::builder()
            .with_user("a b")
            .with_account("fc_x&y")
            .with_expand(true)
            .build_with_login(None)
            .unwrap();

        let url = client.request_url(&query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.org/api/jobs/?user=a+b&account=fc_x%26y&expand=true"
        );
    }

    #[test]
    fn test_describe_failure() {
        assert_eq!(
            describe_failure(StatusCode::NOT_FOUND, r#"{"detail": "Not found."}"#),
            "Not Found (Not found.)"
        );
        assert_eq!(
            describe_failure(StatusCode::BAD_GATEWAY, ""),
            "Bad Gateway"
        );
        let long = "x".repeat(500);
        let described = describe_failure(StatusCode::INTERNAL_SERVER_ERROR, &long);
        assert!(described.ends_with("...)"));
        assert!(described.len() < 260);
    }

    #[tokio::test]
    async fn test_fetch_sends_token_and_parses_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jobs/"))
            .and(query_param("user", "alice"))
            .and(header("authorization", "Token test"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 4,
                "total_cpu_time": 10.5,
                "total_amount": "21.00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let report = client_for(&server).fetch(&alice_query()).await.unwrap();
        assert_eq!(report.count, 4);
        assert_eq!(report.total_amount.as_str(), "21.00");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"detail": "Invalid token."})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).fetch(&alice_query()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        match err {
            UsageError::Status { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("Invalid token."));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).fetch(&alice_query()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseFormat);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Nothing listens on the discard port
        let config = ClientConfig::new(Site::Lrc, "http://127.0.0.1:9/api/", "t")
            .unwrap()
            .with_timeout(std::time::Duration::from_secs(5));
        let client = UsageClient::new(config).unwrap();

        let err = client.fetch(&alice_query()).await.unwrap_err();
        assert!(matches!(err, UsageError::Network(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
