//! Reference data: the symptom catalog and the agent directory.

mod agents;
mod symptoms;

pub use agents::*;
pub use symptoms::*;
