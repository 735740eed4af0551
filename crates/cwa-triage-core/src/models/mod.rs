//! Domain models for the triage workflow.

mod agent;
mod diagnosis;
mod medicine;
mod report;
mod symptom;

pub use agent::*;
pub use diagnosis::*;
pub use medicine::*;
pub use report::*;
pub use symptom::*;
