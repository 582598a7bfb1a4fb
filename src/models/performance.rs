use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Performance testing framework, e.g. `talos` or `browsertime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceFramework {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceSignature {
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub test: String,
    #[serde(default)]
    pub machine_platform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceAlert {
    pub id: u64,
    pub is_regression: bool,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub prev_value: f64,
    #[serde(default)]
    pub new_value: f64,
    #[serde(default)]
    pub amount_abs: f64,
    #[serde(default)]
    pub amount_pct: f64,
    #[serde(default)]
    pub t_value: Option<f64>,
    #[serde(default)]
    pub manually_created: bool,
    #[serde(default)]
    pub series_signature: PerformanceSignature,
}

/// A group of performance alerts raised against one push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceAlertSummary {
    pub id: u64,
    pub repository: String,
    pub framework: u64,
    /// Server local time without offset, e.g. `2024-01-15T10:23:45.123456`
    pub created: NaiveDateTime,
    #[serde(default)]
    pub push_id: Option<u64>,
    #[serde(default)]
    pub prev_push_id: Option<u64>,
    #[serde(default)]
    pub revision: Option<String>,
    #[serde(default)]
    pub original_revision: Option<String>,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub bug_number: Option<u64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assignee_username: Option<String>,
    #[serde(default)]
    pub alerts: Vec<PerformanceAlert>,
}

impl PerformanceAlertSummary {
    pub fn regression_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_regression).count()
    }

    pub fn improvement_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_regression).count()
    }

    pub fn display_revision(&self) -> Option<&str> {
        self.original_revision
            .as_deref()
            .or(self.revision.as_deref())
            .map(|rev| rev.get(..12).unwrap_or(rev))
    }
}
