//! Static treatment protocols keyed by agent name.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{TreatmentOutcome, TreatmentSource};
use crate::catalog::AgentDirectory;
use crate::error::TriageResult;
use crate::models::{Agent, AgentClass, MedicineDoses, RiskLevel};

/// Treatment summary for one agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentProtocol {
    pub agent: String,
    pub classification: Option<AgentClass>,
    pub risk: Option<RiskLevel>,
    /// One-line suggested action
    pub action: Option<String>,
    /// Ordered protocol steps
    pub steps: Vec<String>,
    pub medicines: MedicineDoses,
}

impl From<&Agent> for TreatmentProtocol {
    fn from(agent: &Agent) -> Self {
        Self {
            agent: agent.name.clone(),
            classification: agent.classification,
            risk: agent.risk,
            action: agent.action.clone(),
            steps: agent.protocol.clone(),
            medicines: agent.medicines.clone(),
        }
    }
}

impl TreatmentProtocol {
    /// True when there is nothing to show beyond the agent name.
    pub fn is_empty(&self) -> bool {
        self.action.is_none()
            && self.steps.is_empty()
            && self.medicines.administered().next().is_none()
    }
}

/// Exact-name lookup over a fixed set of protocols.
#[derive(Debug, Clone, Default)]
pub struct StaticTreatmentTable {
    protocols: Vec<TreatmentProtocol>,
}

impl StaticTreatmentTable {
    pub fn new(protocols: Vec<TreatmentProtocol>) -> Self {
        Self { protocols }
    }

    /// Table of every directory agent that carries treatment content.
    pub fn from_directory(directory: &AgentDirectory) -> Self {
        Self::new(
            directory
                .agents()
                .iter()
                .map(TreatmentProtocol::from)
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    /// Table over the builtin agent directory.
    pub fn builtin() -> Self {
        Self::from_directory(&AgentDirectory::builtin())
    }

    pub fn get(&self, agent_name: &str) -> Option<&TreatmentProtocol> {
        self.protocols.iter().find(|p| p.agent == agent_name)
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

impl TreatmentSource for StaticTreatmentTable {
    fn resolve(&self, agent_name: &str) -> TriageResult<TreatmentOutcome> {
        match self.get(agent_name) {
            Some(protocol) => Ok(TreatmentOutcome::Protocol(protocol.clone())),
            None => {
                debug!(agent_name, "no static treatment entry");
                Ok(TreatmentOutcome::NoTreatmentData)
            }
        }
    }
}
