//! project.pbxproj backed implementation of [`BuildSettings`]

use std::borrow::Cow;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use pbxproj::{Dict, Document, Node};
use sha2::{Digest, Sha256};

use super::{BuildConfiguration, BuildSettings, ProjectError, Target, XCODEPROJ_EXTENSION};
use crate::definitions::SettingValue;

/// An Xcode project loaded from disk.
///
/// Edits are spliced into the original text, so [`XcodeProject::persist`]
/// writes back every untouched byte exactly as it was read.
#[derive(Debug, Clone)]
pub struct XcodeProject {
    name: String,
    path: PathBuf,
    document: Document,
    loaded_digest: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl XcodeProject {
    /// Path of `project.pbxproj` inside `<project_dir>/<name>.xcodeproj`.
    pub fn pbxproj_path(project_dir: &Path, name: &str) -> PathBuf {
        project_dir
            .join(format!("{}.{}", name, XCODEPROJ_EXTENSION))
            .join("project.pbxproj")
    }

    pub fn load(project_dir: &Path, name: &str) -> Result<Self, ProjectError> {
        let path = Self::pbxproj_path(project_dir, name);
        let source = fs::read_to_string(&path).map_err(|e| ProjectError::Read {
            path: path.clone(),
            source: e,
        })?;
        Self::from_source(name, path, source)
    }

    /// Build from already-read contents. `path` is where `persist` writes.
    pub fn from_source(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Result<Self, ProjectError> {
        let path = path.into();
        let document = Document::parse(source).map_err(|e| ProjectError::Parse {
            path: path.clone(),
            source: e,
        })?;
        let loaded_digest = sha256_hex(document.source().as_bytes());
        tracing::debug!(path = %path.display(), digest = %loaded_digest, "loaded project");

        Ok(Self {
            name: name.into(),
            path,
            document,
            loaded_digest,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file contents, including unsaved edits.
    pub fn source(&self) -> &str {
        self.document.source()
    }

    /// SHA-256 of the current contents, hex encoded.
    pub fn digest(&self) -> String {
        sha256_hex(self.document.source().as_bytes())
    }

    /// SHA-256 of the contents as loaded.
    pub fn loaded_digest(&self) -> &str {
        &self.loaded_digest
    }

    pub fn is_modified(&self) -> bool {
        self.digest() != self.loaded_digest
    }

    /// Write the project back if it changed. Returns whether a write happened.
    ///
    /// Writes a sibling temp file and renames it over the original, so a
    /// failed write leaves the original in place.
    pub fn persist(&self) -> Result<bool, ProjectError> {
        if !self.is_modified() {
            tracing::debug!(path = %self.path.display(), "project unchanged, skipping write");
            return Ok(false);
        }

        let write_error = |e| ProjectError::Write {
            path: self.path.clone(),
            source: e,
        };

        let temp_path = self.path.with_extension("pbxproj.tmp");
        fs::write(&temp_path, self.document.source()).map_err(write_error)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_error(e));
        }

        tracing::debug!(path = %self.path.display(), "project written");
        Ok(true)
    }

    fn objects(&self) -> Result<&Dict, ProjectError> {
        self.document
            .root()
            .get("objects")
            .and_then(Node::as_dict)
            .ok_or_else(|| ProjectError::Structure("missing objects dictionary".to_string()))
    }

    fn object(&self, id: &str) -> Result<&Dict, ProjectError> {
        self.objects()?
            .get(id)
            .and_then(Node::as_dict)
            .ok_or_else(|| ProjectError::Structure(format!("object {} not found", id)))
    }

    fn build_settings(&self, config: &BuildConfiguration) -> Result<&Dict, ProjectError> {
        self.object(&config.id)?
            .get("buildSettings")
            .and_then(Node::as_dict)
            .ok_or_else(|| {
                ProjectError::Structure(format!(
                    "configuration {} ({}) has no buildSettings",
                    config.name, config.id
                ))
            })
    }

    /// Where and what to insert for a key that `settings` does not have yet.
    ///
    /// Keys are kept in byte order, matching how Xcode writes them.
    fn insertion(&self, settings: &Dict, key: &str, values: &[String]) -> (Range<usize>, String) {
        let key_text = pbxproj::format_string(key);

        if let Some(next) = settings.entries.iter().find(|e| e.key.as_str() > key) {
            let indent = self.document.line_indent(next.span.start);
            let text = format!(
                "{} = {};\n{}",
                key_text,
                pbxproj::render_list(values, indent),
                indent
            );
            return (next.span.start..next.span.start, text);
        }

        let (at, indent) = match settings.entries.last() {
            Some(last) => (
                last.span.end,
                self.document.line_indent(last.span.start).to_string(),
            ),
            None => (
                settings.body_start(),
                format!("{}\t", self.document.line_indent(settings.span.start)),
            ),
        };
        let text = format!(
            "\n{}{} = {};",
            indent,
            key_text,
            pbxproj::render_list(values, &indent)
        );
        (at..at, text)
    }
}

impl BuildSettings for XcodeProject {
    fn first_target(&self) -> Result<Target, ProjectError> {
        let root_id = self
            .document
            .root()
            .text("rootObject")
            .ok_or_else(|| ProjectError::Structure("missing rootObject".to_string()))?;
        let project = self.object(&root_id)?;

        let target_id = project
            .get("targets")
            .and_then(Node::as_array)
            .and_then(|targets| targets.first())
            .and_then(Node::as_text)
            .ok_or_else(|| ProjectError::Structure("project has no targets".to_string()))?;
        let target = self.object(&target_id)?;

        Ok(Target {
            id: target_id.into_owned(),
            name: target.text("name").map(Cow::into_owned).unwrap_or_default(),
        })
    }

    fn configurations_of(&self, target: &Target) -> Result<Vec<BuildConfiguration>, ProjectError> {
        let list_id = self
            .object(&target.id)?
            .text("buildConfigurationList")
            .ok_or_else(|| {
                ProjectError::Structure(format!(
                    "target {} has no buildConfigurationList",
                    target.name
                ))
            })?;

        let ids = self
            .object(&list_id)?
            .get("buildConfigurations")
            .and_then(Node::as_array)
            .ok_or_else(|| {
                ProjectError::Structure(format!(
                    "configuration list {} has no buildConfigurations",
                    list_id
                ))
            })?;

        ids.iter()
            .map(|node| -> Result<BuildConfiguration, ProjectError> {
                let id = node.as_text().ok_or_else(|| {
                    ProjectError::Structure(format!(
                        "configuration list {} contains a non-reference entry",
                        list_id
                    ))
                })?;
                let name = self
                    .object(&id)?
                    .text("name")
                    .map(Cow::into_owned)
                    .unwrap_or_default();
                Ok(BuildConfiguration {
                    id: id.into_owned(),
                    name,
                })
            })
            .collect()
    }

    fn setting(&self, config: &BuildConfiguration, key: &str) -> Result<SettingValue, ProjectError> {
        match self.build_settings(config)?.get(key) {
            None => Ok(SettingValue::Absent),
            Some(Node::String { raw, .. }) => Ok(SettingValue::Single(raw.clone())),
            Some(Node::Array { items, .. }) => items
                .iter()
                .map(|item| {
                    item.as_raw().map(str::to_string).ok_or_else(|| {
                        ProjectError::Structure(format!(
                            "{} in {} contains a nested value",
                            key, config.name
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(SettingValue::List),
            Some(Node::Dict(_)) => Err(ProjectError::Structure(format!(
                "{} in {} is a dictionary",
                key, config.name
            ))),
        }
    }

    fn set_setting(
        &mut self,
        config: &BuildConfiguration,
        key: &str,
        values: Vec<String>,
    ) -> Result<(), ProjectError> {
        let (range, text) = {
            let settings = self.build_settings(config)?;
            match settings.entry(key) {
                Some(entry) => {
                    let indent = self.document.line_indent(entry.span.start);
                    (entry.value.span(), pbxproj::render_list(&values, indent))
                }
                None => self.insertion(settings, key, &values),
            }
        };

        self.document = self
            .document
            .splice(range, &text)
            .map_err(|e| ProjectError::Parse {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(())
    }
}
