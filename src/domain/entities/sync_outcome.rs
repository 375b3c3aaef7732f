use serde::{Deserialize, Serialize};

/// Aggregate result of one sync pass, reported to the UI layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncOutcome {
    pub success_count: u32,
    pub failure_count: u32,
}

impl SyncOutcome {
    pub fn new(success_count: u32, failure_count: u32) -> Self {
        Self {
            success_count,
            failure_count,
        }
    }
}
