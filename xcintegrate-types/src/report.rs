use crate::events::{EventCounts, IntegrationEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,

    #[serde(default)]
    pub targets: Vec<TargetReport>,

    /// Directories removed by the sandbox cleanup pass, if one ran.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sandbox_removed: Vec<String>,

    pub counts: EventCounts,
}

impl IntegrationReport {
    pub fn new(tool: ToolInfo) -> Self {
        Self {
            schema: crate::schema::XCINTEGRATE_REPORT_V1.to_string(),
            tool,
            run: RunInfo::default(),
            targets: vec![],
            sandbox_removed: vec![],
            counts: EventCounts::default(),
        }
    }

    /// True when the run left the project and sandbox untouched.
    pub fn is_noop(&self) -> bool {
        self.counts.is_noop()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetReport {
    pub label: String,

    /// Native targets integrated into.
    #[serde(default)]
    pub native_targets: Vec<String>,

    /// Native targets named by the target model but absent from the project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_native_targets: Vec<String>,

    pub counts: EventCounts,

    #[serde(default)]
    pub events: Vec<IntegrationEvent>,
}
