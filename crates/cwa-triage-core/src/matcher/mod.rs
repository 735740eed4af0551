//! Symptom-to-agent matching.
//!
//! Two interchangeable modes behind [`Matcher`]:
//!
//! - [`LocalMatcher`] scores every directory agent by symptom overlap.
//! - [`RemoteMatcher`] relays the external classifier's single answer.

mod local;
mod remote;

pub use local::*;
pub use remote::*;

use crate::error::TriageResult;
use crate::models::{DiagnosisQuery, MatchOutcome};

/// Diagnose a query into candidate agents.
pub trait Matcher {
    fn diagnose(&self, query: &DiagnosisQuery) -> TriageResult<MatchOutcome>;
}
