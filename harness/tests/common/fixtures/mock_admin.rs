//! Mock agent admin API for testing
//!
//! Fake HTTP server answering the admin endpoints the harness calls, so tests
//! never need a real agent process.

use serde_json::Value;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use super::test_data::SWAGGER_BODY;

const PROBE_PATH: &str = "/api/docs/swagger.json";

/// Mock admin server that simulates agent HTTP responses
pub struct MockAdminServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockAdminServer {
    /// Create a new mock admin server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub fn port(&self) -> u16 {
        self.server.address().port()
    }

    /// Number of requests received so far on `request_path`
    pub async fn request_count(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }

    /// Agent is up: swagger document served with the marker
    pub async fn mock_ready(&self) {
        self.mock_probe(200, SWAGGER_BODY, 5).await;
    }

    /// Agent still starting for the first `times` probes
    pub async fn mock_starting(&self, times: u64) {
        Mock::given(method("GET"))
            .and(path(PROBE_PATH))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(times)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Agent never comes up
    pub async fn mock_never_ready(&self) {
        self.mock_probe(503, "", 5).await;
    }

    /// Agent accepts the probe but answers only after `delay`
    pub async fn mock_hanging(&self, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(PROBE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SWAGGER_BODY)
                    .set_delay(delay),
            )
            .with_priority(5)
            .mount(&self.server)
            .await;
    }

    /// Something else answers on the admin port
    pub async fn mock_foreign_service(&self) {
        self.mock_probe(200, "<html>nginx</html>", 5).await;
    }

    async fn mock_probe(&self, status: u16, body: &str, priority: u8) {
        Mock::given(method("GET"))
            .and(path(PROBE_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .with_priority(priority)
            .mount(&self.server)
            .await;
    }

    /// JSON response on any method for `endpoint`
    pub async fn mock_json(&self, http_method: &str, endpoint: &str, body: Value) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Raw body response
    pub async fn mock_text(&self, http_method: &str, endpoint: &str, status: u16, body: &str) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Status-only response with an empty body
    pub async fn mock_status(&self, http_method: &str, endpoint: &str, status: u16) {
        Mock::given(method(http_method))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
