//! Test fixtures for hook integration tests
//!
//! Provides the sample pbxproj and helpers that lay out a Cordova project
//! tree in a temporary directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const PROJECT_NAME: &str = "HelloCordova";
pub const ENGINE_PLUGIN: &str = "cordova-plugin-wkwebview-engine";

/// Build configurations of the first target
pub const DEBUG_ID: &str = "1D6058940D05DD3E006BFB54";
pub const RELEASE_ID: &str = "1D6058950D05DD3E006BFB54";

/// Path to the sample project file
pub fn pbxproj_fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/HelloCordova.pbxproj")
}

pub fn pbxproj_fixture() -> String {
    fs::read_to_string(pbxproj_fixture_path()).expect("Failed to read pbxproj fixture")
}

/// A Cordova project root on disk.
pub struct CordovaProject {
    pub dir: TempDir,
}

impl CordovaProject {
    /// Project root with the sample pbxproj and no metadata files.
    pub fn new() -> Self {
        Self::with_pbxproj(&pbxproj_fixture())
    }

    pub fn with_pbxproj(contents: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let bundle = dir
            .path()
            .join("platforms/ios")
            .join(format!("{}.xcodeproj", PROJECT_NAME));
        fs::create_dir_all(&bundle).expect("Failed to create project bundle");
        fs::write(bundle.join("project.pbxproj"), contents).expect("Failed to write pbxproj");
        Self { dir }
    }

    /// Write config.xml listing `plugins`.
    pub fn with_config_xml(self, plugins: &[&str]) -> Self {
        let mut xml = String::from(
            "<?xml version='1.0' encoding='utf-8'?>\n\
             <widget id=\"io.cordova.hellocordova\" version=\"1.0.0\" xmlns=\"http://www.w3.org/ns/widgets\">\n\
             \x20   <name>HelloCordova</name>\n",
        );
        for plugin in plugins {
            xml.push_str(&format!("    <plugin name=\"{}\" spec=\"^1.0.0\" />\n", plugin));
        }
        xml.push_str("</widget>\n");
        fs::write(self.root().join("config.xml"), xml).expect("Failed to write config.xml");
        self
    }

    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, contents).expect("Failed to write file");
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn project_dir(&self) -> PathBuf {
        self.root().join("platforms/ios")
    }

    pub fn pbxproj_path(&self) -> PathBuf {
        self.project_dir()
            .join(format!("{}.xcodeproj", PROJECT_NAME))
            .join("project.pbxproj")
    }

    pub fn pbxproj(&self) -> String {
        fs::read_to_string(self.pbxproj_path()).expect("Failed to read pbxproj")
    }

    pub fn modified(&self) -> std::time::SystemTime {
        fs::metadata(self.pbxproj_path())
            .and_then(|m| m.modified())
            .expect("Failed to stat pbxproj")
    }
}

/// Quoted entries as they appear in a list
pub fn entries(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| format!("\"{}\"", s)).collect()
}
