//! Treatment lookup for a chosen agent.
//!
//! A [`TreatmentSource`] resolves an agent name either from the static
//! protocol table or from the prediction service's detail endpoint.

mod details;
mod remote;
mod table;

pub use details::*;
pub use remote::*;
pub use table::*;

use crate::error::TriageResult;

/// General immediate actions, independent of the agent.
pub const EMERGENCY_PROTOCOL: &[&str] = &[
    "Evacuate exposed individuals to a safe location immediately.",
    "Ensure all personnel use proper protective equipment (PPE).",
    "Isolate and secure the contaminated area.",
    "Call for emergency medical and hazmat response.",
    "Identify the suspected agent from the observed symptoms.",
    "Follow the treatment protocol for the identified agent.",
    "Document the case in a case report.",
];

/// What is known about treating an agent.
#[derive(Debug, Clone, PartialEq)]
pub enum TreatmentOutcome {
    /// Static protocol steps and doses
    Protocol(TreatmentProtocol),
    /// Detail rows from the prediction service
    Details(DetailTable),
    /// The agent is unknown to the source, or the source returned nothing
    NoTreatmentData,
}

impl TreatmentOutcome {
    pub fn is_found(&self) -> bool {
        !matches!(self, TreatmentOutcome::NoTreatmentData)
    }
}

/// Resolve an agent name to treatment information.
pub trait TreatmentSource {
    fn resolve(&self, agent_name: &str) -> TriageResult<TreatmentOutcome>;
}
