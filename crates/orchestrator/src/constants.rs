/// Buffered [`crate::jobs::JobEvent`]s per subscriber before it starts lagging.
pub const JOB_EVENT_CHANNEL_CAPACITY: usize = 64;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

pub const DEFAULT_OTEL_SERVICE_NAME: &str = "pof-orchestrator";

pub const DEMO_DEAL_ID: &str = "DEAL123";
pub const DEMO_REQUIRED_AMOUNT: u64 = 60;
/// `(bank_index, amount)` pairs committed by the demo flow.
pub const DEMO_COMMITMENTS: [(u64, u64); 2] = [(0, 50), (1, 30)];
