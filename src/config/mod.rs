//! Layered hook configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. Host/user config (~/.config/webview-flag/config.toml)
//! 3. Project config (<project root>/.webview-flag.toml)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::HookConfig;
pub use effective::{
    host_config_path, project_config_path, ConfigError, ConfigOrigin, ConfigSource,
    EffectiveConfig, PROJECT_CONFIG_FILE,
};
pub use merge::{deep_merge, merge_layers};
