//! Case report model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::{AgentClass, RiskLevel};
use super::diagnosis::DemographicContext;
use super::medicine::MedicineDoses;

/// Placeholder shown for a blank clinician name.
pub const CLINICIAN_PLACEHOLDER: &str = "N/A";

/// A composed case report, ready for export. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseReport {
    /// Generated case identifier (prefix + random suffix)
    pub case_id: String,
    /// Diagnosed agent
    pub agent: String,
    /// Agent classification, when known
    pub classification: Option<AgentClass>,
    /// Agent risk level, when known
    pub risk: Option<RiskLevel>,
    /// Observed symptoms in selection order
    pub symptoms: Vec<String>,
    /// Gender and body system
    pub context: DemographicContext,
    /// Recommended doses (all of them; filtering happens at render time)
    pub medicines: MedicineDoses,
    /// Clinician name as entered; may be empty
    pub clinician: String,
    /// Composition timestamp
    pub created_at: DateTime<Utc>,
}

impl CaseReport {
    /// Clinician name, or `N/A` when blank.
    pub fn clinician_display(&self) -> &str {
        let name = self.clinician.trim();
        if name.is_empty() {
            CLINICIAN_PLACEHOLDER
        } else {
            name
        }
    }

    /// Human-readable generation timestamp.
    pub fn generated_display(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_report(clinician: &str) -> CaseReport {
        CaseReport {
            case_id: "CWA-7Q2X9B".into(),
            agent: "Sarin".into(),
            classification: Some(AgentClass::Chemical),
            risk: Some(RiskLevel::High),
            symptoms: vec!["Miosis".into()],
            context: DemographicContext::default(),
            medicines: MedicineDoses::new(),
            clinician: clinician.into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
        }
    }

    #[test]
    fn test_clinician_fallback() {
        assert_eq!(make_report("").clinician_display(), "N/A");
        assert_eq!(make_report("   ").clinician_display(), "N/A");
        assert_eq!(make_report(" Dr. Rao ").clinician_display(), "Dr. Rao");
    }

    #[test]
    fn test_generated_display() {
        assert_eq!(make_report("").generated_display(), "2024-03-09 14:05:00 UTC");
    }
}
