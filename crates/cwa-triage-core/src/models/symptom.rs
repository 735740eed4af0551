//! Symptom reference data.

use serde::{Deserialize, Serialize};

/// An observable symptom, optionally grouped under a body system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Symptom {
    /// Display name, also the identifier used in queries
    pub name: String,
    /// Body system the symptom belongs to (e.g., "Respiratory")
    pub body_system: Option<String>,
}

impl Symptom {
    /// Create a symptom with no body-system grouping.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body_system: None,
        }
    }

    /// Create a symptom grouped under a body system.
    pub fn in_system(name: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body_system: Some(system.into()),
        }
    }

    /// Check whether this symptom belongs to the given body system.
    pub fn is_in_system(&self, system: &str) -> bool {
        self.body_system
            .as_deref()
            .is_some_and(|s| symptom_key(s) == symptom_key(system))
    }
}

/// Comparison key for symptom and system names: trimmed, lowercase.
pub fn symptom_key(name: &str) -> String {
    name.trim().to_lowercase()
}
