//! webview-flag - after_prepare hook for generated iOS projects
//!
//! Detects whether the WKWebView engine plugin is installed and writes
//! `WK_WEBVIEW_ENGINE_IS_USED=0|1` into the preprocessor definitions of every
//! build configuration of the project's first target.

pub mod config;
pub mod definitions;
pub mod flag;
pub mod hook;
pub mod plugins;
pub mod project;

pub use config::{EffectiveConfig, HookConfig};
pub use definitions::{merge, normalize, SettingValue, Staleness};
pub use flag::{Flag, ENGINE_FLAG_NAME, INHERITED_ENTRY};
pub use hook::{apply_to_all, run, HookContext, HookError, HookReport};
pub use plugins::{PluginSource, ProjectMetadata, StaticPlugins};
pub use project::{BuildSettings, XcodeProject};
