use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{ProbeResult, Prober};

/// HTTP-based prober with connection pooling.
///
/// Issues one GET per [`Prober::probe`] call and never raises: a transport
/// error is reported as [`ProbeResult::transport_failure`].
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Self::build_client(timeout),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &crate::config::CheckConfig) -> Self {
        Self::new(config.request_timeout)
    }

    pub fn build_client(timeout: Duration) -> Client {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(20)
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client")
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(url, status, "Probe completed");
                ProbeResult::status(status)
            }
            Err(e) => {
                if e.is_timeout() {
                    warn!(url, "Probe timed out");
                } else {
                    warn!(url, error = %e, "Probe network error");
                }
                ProbeResult::transport_failure()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn probe_reports_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let prober = HttpProber::new(Duration::from_secs(5));
        let result = prober.probe(&format!("{}/health", server.uri())).await;
        assert_eq!(result.status_code, Some(200));
        assert!(result.is_up());
    }

    #[tokio::test]
    async fn probe_reports_non_200_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let prober = HttpProber::new(Duration::from_secs(5));
        let result = prober.probe(&format!("{}/health", server.uri())).await;
        assert_eq!(result.status_code, Some(503));
        assert!(!result.is_up());
    }

    #[tokio::test]
    async fn probe_maps_connection_refused_to_transport_failure() {
        // Port from a server that has been shut down, so nothing is listening.
        // A non-pooled server is required: pooled servers keep listening after drop.
        let server = MockServer::builder().start().await;
        let url = format!("{}/health", server.uri());
        drop(server);

        let prober = HttpProber::new(Duration::from_secs(5));
        let result = prober.probe(&url).await;
        assert_eq!(result.status_code, None);
        assert!(!result.is_up());
    }

    #[tokio::test]
    async fn from_config_prober_uses_configured_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = crate::config::CheckConfig::default().with_request_timeout(5);
        let prober = HttpProber::from_config(&config);
        let result = prober.probe(&format!("{}/health", server.uri())).await;
        assert!(result.is_up());
    }

    #[tokio::test]
    async fn probe_issues_single_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let prober = HttpProber::new(Duration::from_secs(5));
        prober.probe(&format!("{}/health", server.uri())).await;
        // expect(1) verified on MockServer drop
    }
}
