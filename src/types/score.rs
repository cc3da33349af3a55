use serde::{Deserialize, Serialize};

/// A pool risk score as returned by the RSS API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolScore {
    /// Aggregated risk score of the pool.
    pub total_score: f64,
    /// When the score was last computed. Only logged.
    #[serde(default)]
    pub last_updated: serde_json::Value,
}

impl PoolScore {
    /// Creates a [`PoolScore`] without an update time.
    pub fn new(total_score: f64) -> Self {
        Self { total_score, last_updated: serde_json::Value::Null }
    }
}
