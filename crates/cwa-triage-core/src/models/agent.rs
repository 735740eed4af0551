//! Agent reference data.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::medicine::MedicineDoses;
use super::symptom::symptom_key;

/// Broad class of a warfare agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AgentClass {
    Chemical,
    Biological,
}

impl fmt::Display for AgentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentClass::Chemical => write!(f, "Chemical"),
            AgentClass::Biological => write!(f, "Biological"),
        }
    }
}

impl FromStr for AgentClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chemical" => Ok(AgentClass::Chemical),
            "biological" => Ok(AgentClass::Biological),
            other => Err(format!("Unknown agent classification: {}", other)),
        }
    }
}

/// Exposure risk level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Moderate => write!(f, "Moderate"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

/// A known agent in the directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    /// Agent name - unique within a directory
    pub name: String,
    /// Chemical or biological
    pub classification: Option<AgentClass>,
    /// Canonical symptom set, in display order
    pub symptoms: Vec<String>,
    /// Risk level on exposure
    pub risk: Option<RiskLevel>,
    /// One-line suggested action
    pub action: Option<String>,
    /// Ordered treatment protocol steps
    pub protocol: Vec<String>,
    /// Initial medicine doses
    pub medicines: MedicineDoses,
}

impl Agent {
    /// Create an agent known only by name (as listed by the remote service).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classification: None,
            symptoms: Vec::new(),
            risk: None,
            action: None,
            protocol: Vec::new(),
            medicines: MedicineDoses::new(),
        }
    }

    /// Symptoms of this agent that appear in the query key set, in the
    /// agent's own order. Keys come from [`symptom_key`], so the comparison
    /// is trimmed and case-insensitive.
    pub fn matched_symptoms(&self, query_keys: &HashSet<String>) -> Vec<String> {
        self.symptoms
            .iter()
            .filter(|s| query_keys.contains(&symptom_key(s)))
            .cloned()
            .collect()
    }

    /// Check whether a symptom (any casing) belongs to this agent.
    pub fn has_symptom(&self, symptom: &str) -> bool {
        let key = symptom_key(symptom);
        self.symptoms.iter().any(|s| symptom_key(s) == key)
    }
}
