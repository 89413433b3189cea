//! Hook settings and their built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

use crate::definitions::Staleness;
use crate::flag::ENGINE_FLAG_NAME;
use crate::plugins::WKWEBVIEW_PLUGIN_NAME;

/// Resolved hook settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    /// Generated native project, relative to the project root
    pub platform_dir: String,

    /// Plugin whose presence sets the flag to 1
    pub plugin_name: String,

    /// Preprocessor symbol to inject
    pub flag_name: String,

    /// Build setting holding the definitions list
    pub setting_key: String,

    /// How existing flag entries are recognised
    pub staleness: Staleness,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            platform_dir: "platforms/ios".to_string(),
            plugin_name: WKWEBVIEW_PLUGIN_NAME.to_string(),
            flag_name: ENGINE_FLAG_NAME.to_string(),
            setting_key: "GCC_PREPROCESSOR_DEFINITIONS".to_string(),
            staleness: Staleness::Substring,
        }
    }
}

impl HookConfig {
    /// Convert to a JSON value for layering.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "platform_dir": self.platform_dir,
            "plugin_name": self.plugin_name,
            "flag_name": self.flag_name,
            "setting_key": self.setting_key,
            "staleness": self.staleness,
        })
    }
}
