//! Preprocessor definition lists
//!
//! A build setting in project.pbxproj may be missing, hold a single string,
//! or hold a list. Entries are kept as raw tokens, quotes included, so
//! `"$(inherited)"` in the file is the entry `"\"$(inherited)\""` here.

mod merge;

pub use merge::{is_merged, merge, Staleness};

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Raw value of a build setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Absent,
    Single(String),
    List(Vec<String>),
}

impl SettingValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, SettingValue::Absent)
    }
}

/// Coerce a setting into an ordered list of entries.
///
/// Lists are borrowed as-is.
pub fn normalize(value: &SettingValue) -> Cow<'_, [String]> {
    match value {
        SettingValue::Absent => Cow::Owned(Vec::new()),
        SettingValue::Single(entry) => Cow::Owned(vec![entry.clone()]),
        SettingValue::List(entries) => Cow::Borrowed(entries.as_slice()),
    }
}
