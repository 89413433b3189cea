//! Run report

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Schema version for the hook report
pub const SCHEMA_VERSION: u32 = 1;

/// What happened to one build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationOutcome {
    pub name: String,
    pub id: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub changed: bool,
}

/// Summary of one hook invocation.
#[derive(Debug, Clone, Serialize)]
pub struct HookReport {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub project_name: String,
    pub pbxproj_path: String,
    pub target: String,
    pub engine_used: bool,
    /// The quoted entry written, e.g. `"WK_WEBVIEW_ENGINE_IS_USED=1"`
    pub flag: String,
    pub configurations: Vec<ConfigurationOutcome>,
    pub digest_before: String,
    pub digest_after: String,
    pub dry_run: bool,
    pub persisted: bool,
}

impl HookReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Number of configurations whose definitions changed
    pub fn changed_count(&self) -> usize {
        self.configurations.iter().filter(|c| c.changed).count()
    }

    /// The console line announcing what was written
    pub fn summary_line(&self) -> String {
        format!("\tAdded preprocessor definition {}", self.flag)
    }
}
