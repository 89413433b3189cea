//! Installed plugin detection
//!
//! Answers one question: is the alternate web engine plugin installed in the
//! project? Plugin metadata comes from the project's `config.xml` and the
//! `cordova.plugins` table of `package.json`.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Plugin that selects the WKWebView engine.
pub const WKWEBVIEW_PLUGIN_NAME: &str = "cordova-plugin-wkwebview-engine";

/// A plugin recorded in project metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPlugin {
    pub name: String,
    /// Version or source spec, when the metadata records one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
}

impl InstalledPlugin {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: None,
        }
    }
}

/// Errors from querying plugin metadata
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("No plugin metadata in {0} (expected config.xml or package.json)")]
    NoMetadata(PathBuf),
}

/// Source of the installed plugin list.
pub trait PluginSource {
    fn installed_plugins(&self, project_root: &Path) -> Result<Vec<InstalledPlugin>, MetadataError>;
}

/// Reads `config.xml` and `package.json` at the project root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectMetadata;

impl ProjectMetadata {
    fn read_optional(path: &Path) -> Result<Option<String>, MetadataError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MetadataError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// `<plugin name=".." spec=".."/>` children of the root `<widget>`.
    pub fn parse_config_xml(path: &Path, contents: &str) -> Result<Vec<InstalledPlugin>, MetadataError> {
        let doc = roxmltree::Document::parse(contents).map_err(|e| MetadataError::Malformed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "widget" {
            return Err(MetadataError::Malformed {
                path: path.to_path_buf(),
                message: format!("root element is <{}>, expected <widget>", root.tag_name().name()),
            });
        }

        Ok(root
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "plugin")
            .filter_map(|n| {
                n.attribute("name").map(|name| InstalledPlugin {
                    name: name.to_string(),
                    spec: n.attribute("spec").map(str::to_string),
                })
            })
            .collect())
    }

    /// Keys of `cordova.plugins`. A package.json without that table has no plugins.
    pub fn parse_package_json(path: &Path, contents: &str) -> Result<Vec<InstalledPlugin>, MetadataError> {
        let value: serde_json::Value =
            serde_json::from_str(contents).map_err(|e| MetadataError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let plugins = match value.pointer("/cordova/plugins") {
            None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
            Some(serde_json::Value::Object(map)) => map,
            Some(_) => {
                return Err(MetadataError::Malformed {
                    path: path.to_path_buf(),
                    message: "cordova.plugins must be an object".to_string(),
                })
            }
        };

        let spec_of = |name: &str| {
            value
                .pointer("/dependencies")
                .and_then(|deps| deps.get(name))
                .or_else(|| value.pointer("/devDependencies").and_then(|deps| deps.get(name)))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        Ok(plugins
            .keys()
            .map(|name| InstalledPlugin {
                name: name.clone(),
                spec: spec_of(name),
            })
            .collect())
    }
}

impl PluginSource for ProjectMetadata {
    fn installed_plugins(&self, project_root: &Path) -> Result<Vec<InstalledPlugin>, MetadataError> {
        let config_xml = project_root.join("config.xml");
        let package_json = project_root.join("package.json");

        let xml = Self::read_optional(&config_xml)?;
        let json = Self::read_optional(&package_json)?;
        if xml.is_none() && json.is_none() {
            return Err(MetadataError::NoMetadata(project_root.to_path_buf()));
        }

        let mut plugins = Vec::new();
        if let Some(contents) = xml {
            plugins.extend(Self::parse_config_xml(&config_xml, &contents)?);
        }
        if let Some(contents) = json {
            plugins.extend(Self::parse_package_json(&package_json, &contents)?);
        }

        let mut seen = HashSet::new();
        plugins.retain(|p| seen.insert(p.name.clone()));
        Ok(plugins)
    }
}

/// Fixed plugin list, e.g. supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticPlugins {
    names: Vec<String>,
}

impl StaticPlugins {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl PluginSource for StaticPlugins {
    fn installed_plugins(&self, _project_root: &Path) -> Result<Vec<InstalledPlugin>, MetadataError> {
        Ok(self.names.iter().map(InstalledPlugin::named).collect())
    }
}

/// Whether any installed plugin is named `plugin_name`.
pub fn is_engine_used(
    source: &dyn PluginSource,
    project_root: &Path,
    plugin_name: &str,
) -> Result<bool, MetadataError> {
    let plugins = source.installed_plugins(project_root)?;
    let used = plugins.iter().any(|p| p.name == plugin_name);
    tracing::debug!(
        plugin = plugin_name,
        installed = plugins.len(),
        used,
        "checked installed plugins"
    );
    Ok(used)
}
