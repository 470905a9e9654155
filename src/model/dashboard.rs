use serde::{Deserialize, Serialize};

/// Aggregate counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_donors: u64,
    pub total_receivers: u64,
    pub pending_requests: u64,
    pub fulfilled_requests: u64,
}
