//! Mock ledger browser for DID registration and genesis download

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub struct MockLedgerServer {
    pub server: MockServer,
    pub base_url: String,
}

impl MockLedgerServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Accept a registration for `seed` and hand back `did`
    pub async fn mock_register(&self, seed: &str, did: &str) {
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_partial_json(json!({"seed": seed, "role": "TRUST_ANCHOR"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "did": did,
                "seed": seed,
                "verkey": "FakeVerkey"
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_register_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_genesis(&self, genesis: &str) {
        Mock::given(method("GET"))
            .and(path("/genesis"))
            .respond_with(ResponseTemplate::new(200).set_body_string(genesis))
            .mount(&self.server)
            .await;
    }

    /// Body of the last request received, if any
    pub async fn last_body(&self) -> Option<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .last()
            .and_then(|r| r.body_json::<Value>().ok())
    }
}
