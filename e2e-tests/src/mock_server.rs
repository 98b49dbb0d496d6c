use httpmock::{Method, Mock, MockServer};
use serde_json::Value;

/// MockServerGlobal (has mock server inside)
pub struct MockServerGlobal {
    pub(crate) client_url: String,
    pub(crate) mock_server: MockServer,
}

impl MockServerGlobal {
    /// To create a new client
    pub async fn new() -> Self {
        let server = MockServer::start_async().await;
        Self { client_url: format!("http://localhost:{:?}", server.port()), mock_server: server }
    }

    /// To get the mock server ref for adding expects for URLs
    pub fn mock_server(&self) -> &MockServer {
        &self.mock_server
    }

    /// To get the server URL
    pub fn url(&self) -> String {
        self.client_url.clone()
    }

    /// To add mock on the mock server endpoints
    pub async fn add_mock_on_endpoint(
        &self,
        method: Method,
        path: &str,
        body_contains: Option<&str>,
        status: Option<u16>,
        response_body: &Value,
    ) -> Mock<'_> {
        let response = serde_json::to_vec(response_body).expect("response body serializes");
        self.mock_server
            .mock_async(|when, then| {
                when.method(method).path(path).body_includes(body_contains.unwrap_or(""));
                then.status(status.unwrap_or(200)).header("content-type", "application/json").body(response);
            })
            .await
    }
}
