//! Progression record
//!
//! The persisted, mutable description of where a learner stands: the active
//! challenge, which challenges were passed, the workspace directory and the
//! challenge-scoped scratch fields written by `setup`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scratch value; deliberately a closed set of serializable kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Bytes(Vec<u8>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Bytes(b) => write!(f, "{}", hex::encode(b)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

/// One learner's progression through the configured challenges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Index into the configured challenge list; `== len` means all done
    pub challenge_index: usize,

    /// Ids of passed challenges
    pub passed: BTreeSet<String>,

    /// Absolute path of the workspace directory
    pub workspace: PathBuf,

    /// Challenge-scoped scratch data
    pub fields: BTreeMap<String, FieldValue>,

    /// When progression first started
    pub started_at: DateTime<Utc>,
}

impl Record {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            challenge_index: 0,
            passed: BTreeSet::new(),
            workspace: workspace.into(),
            fields: BTreeMap::new(),
            started_at: Utc::now(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Path of `rel` inside the workspace
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.workspace.join(rel)
    }

    pub fn has_passed(&self, id: &str) -> bool {
        self.passed.contains(id)
    }

    pub fn mark_passed(&mut self, id: &str) {
        self.passed.insert(id.to_string());
    }

    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.fields.get(key) {
            Some(FieldValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn bytes(&self, key: &str) -> Option<&[u8]> {
        match self.fields.get(key) {
            Some(FieldValue::Bytes(b)) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        self.set(key, FieldValue::Text(value.into()));
    }

    pub fn set_integer(&mut self, key: &str, value: i64) {
        self.set(key, FieldValue::Integer(value));
    }

    pub fn set_bytes(&mut self, key: &str, value: impl Into<Vec<u8>>) {
        self.set(key, FieldValue::Bytes(value.into()));
    }

    pub fn clear_fields(&mut self) {
        self.fields.clear();
    }
}
