use httpmock::{Method, Mock};
use serde_json::{json, Value};

use crate::mock_server::MockServerGlobal;

pub const VERIFIED_AMOUNT: u64 = 80;
pub const BUYER: &str = "buyer123";

/// Simulated proof-of-funds backend on top of a [`MockServerGlobal`].
pub struct PofBackend {
    server: MockServerGlobal,
}

pub fn proof_body(deal_id: &str) -> Value {
    json!({
        "success": true,
        "verified_amount": VERIFIED_AMOUNT,
        "deal_info": { "amount": VERIFIED_AMOUNT, "buyer": BUYER, "deal_id": deal_id }
    })
}

pub fn job_status_body(status: &str, proof: Option<Value>) -> Value {
    let mut body = json!({
        "status": status,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:05Z"
    });
    if let Some(proof) = proof {
        body["proof"] = proof;
    }
    body
}

impl PofBackend {
    pub async fn new() -> Self {
        Self { server: MockServerGlobal::new().await }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    pub async fn mock_commitment(&self, bank_index: u64, amount: u64) -> Mock<'_> {
        let body = format!(r#""bank_index":{bank_index}"#);
        let ack = json!({ "bank_index": bank_index, "amount": amount, "signed_message": "0x01" });
        self.server.add_mock_on_endpoint(Method::POST, "/lb/commitment", Some(&body), None, &ack).await
    }

    pub async fn mock_sync_proof(&self, deal_id: &str) -> Mock<'_> {
        self.server.add_mock_on_endpoint(Method::POST, "/bb/proof", Some(deal_id), None, &proof_body(deal_id)).await
    }

    pub async fn mock_proof_job(&self, job_id: &str) -> Mock<'_> {
        let response = json!({ "job_id": job_id, "status": "Pending" });
        self.server.add_mock_on_endpoint(Method::POST, "/proofs/async", None, None, &response).await
    }

    pub async fn mock_job_status(&self, job_id: &str, response: &Value) -> Mock<'_> {
        let path = format!("/proofs/async/{job_id}");
        self.server.add_mock_on_endpoint(Method::GET, &path, None, None, response).await
    }

    pub async fn mock_verify(&self, deal_id: &str) -> Mock<'_> {
        let response = json!({
            "verified": true,
            "deal_info": { "amount": VERIFIED_AMOUNT, "buyer": BUYER, "deal_id": deal_id }
        });
        self.server.add_mock_on_endpoint(Method::POST, "/sb/verify", Some(deal_id), None, &response).await
    }

    /// Every call on `path` answers `status` with a plain text body.
    pub async fn mock_failure(&self, method: Method, path: &str, status: u16, message: &str) -> Mock<'_> {
        self.server
            .mock_server()
            .mock_async(|when, then| {
                when.method(method).path(path);
                then.status(status).body(message);
            })
            .await
    }
}
