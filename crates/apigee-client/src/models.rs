//! Apigee API models
//!
//! These models match the JSON representations of the
//! `organizations.environments.keyvaluemaps.entries` resource.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single key-value map entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvmEntry {
    pub name: String,
    pub value: String,
}

impl KvmEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Coordinates of an environment-scoped key-value map
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KvmPath {
    pub org: String,
    pub env: String,
    pub kvm: String,
}

impl KvmPath {
    pub fn new(org: impl Into<String>, env: impl Into<String>, kvm: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            env: env.into(),
            kvm: kvm.into(),
        }
    }

    /// Path of the entries collection, relative to the API host
    pub fn entries_path(&self) -> String {
        format!(
            "/v1/organizations/{}/environments/{}/keyvaluemaps/{}/entries",
            urlencoding::encode(&self.org),
            urlencoding::encode(&self.env),
            urlencoding::encode(&self.kvm),
        )
    }

    /// Path of a single entry, addressed by name
    pub fn entry_path(&self, name: &str) -> String {
        format!("{}/{}", self.entries_path(), urlencoding::encode(name))
    }
}

impl fmt::Display for KvmPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.org, self.env, self.kvm)
    }
}
