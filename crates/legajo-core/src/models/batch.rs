use serde::{Deserialize, Serialize};

/// One failed file within a batch, with the reason surfaced to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    pub name: String,
    pub reason: String,
}

/// Three-way classification of a batch outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchResult {
    AllSucceeded,
    Partial,
    AllFailed,
}

/// Aggregate result of a local batch upload. One item's failure never aborts
/// the remaining batch, so both counters can be non-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub result: BatchResult,
    pub succeeded: usize,
    pub failed: Vec<ItemFailure>,
}

impl BatchOutcome {
    pub fn classify(succeeded: usize, failed: Vec<ItemFailure>) -> Self {
        let result = match (succeeded, failed.len()) {
            (_, 0) => BatchResult::AllSucceeded,
            (0, _) => BatchResult::AllFailed,
            _ => BatchResult::Partial,
        };
        BatchOutcome {
            result,
            succeeded,
            failed,
        }
    }
}
