//! Assemble case reports from a finished diagnosis.

use chrono::{DateTime, Utc};
use tracing::info;

use super::case_id::{CaseIdGenerator, RandomCaseIds};
use crate::error::{TriageError, TriageResult};
use crate::models::{
    Agent, AgentClass, CaseReport, DemographicContext, MedicineDoses, RiskLevel,
};

/// Everything a report is composed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRequest {
    pub agent: String,
    pub classification: Option<AgentClass>,
    pub risk: Option<RiskLevel>,
    pub symptoms: Vec<String>,
    pub context: DemographicContext,
    pub medicines: MedicineDoses,
    /// Free text, may be empty
    pub clinician: String,
}

impl ReportRequest {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            ..Default::default()
        }
    }

    /// Fill classification and risk from a directory agent.
    pub fn with_agent_details(mut self, agent: &Agent) -> Self {
        self.classification = agent.classification;
        self.risk = agent.risk;
        self
    }

    pub fn with_symptoms(mut self, symptoms: Vec<String>) -> Self {
        self.symptoms = symptoms;
        self
    }

    pub fn with_context(mut self, context: DemographicContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_medicines(mut self, medicines: MedicineDoses) -> Self {
        self.medicines = medicines;
        self
    }

    pub fn with_clinician(mut self, clinician: impl Into<String>) -> Self {
        self.clinician = clinician.into();
        self
    }
}

/// Composes case reports, drawing ids from a [`CaseIdGenerator`].
pub struct ReportComposer {
    ids: Box<dyn CaseIdGenerator>,
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::new(Box::new(RandomCaseIds))
    }
}

impl ReportComposer {
    pub fn new(ids: Box<dyn CaseIdGenerator>) -> Self {
        Self { ids }
    }

    /// Compose a report stamped with the current time.
    pub fn compose(&self, request: ReportRequest) -> TriageResult<CaseReport> {
        self.compose_at(request, Utc::now())
    }

    /// Compose a report with an explicit timestamp.
    pub fn compose_at(
        &self,
        request: ReportRequest,
        created_at: DateTime<Utc>,
    ) -> TriageResult<CaseReport> {
        let agent = request.agent.trim();
        if agent.is_empty() {
            return Err(TriageError::InvalidInput(
                "A report needs a diagnosed agent".into(),
            ));
        }

        let report = CaseReport {
            case_id: self.ids.next_id(),
            agent: agent.to_string(),
            classification: request.classification,
            risk: request.risk,
            symptoms: request.symptoms,
            context: request.context,
            medicines: request.medicines,
            clinician: request.clinician,
            created_at,
        };

        info!(case_id = %report.case_id, agent = %report.agent, "case report composed");
        Ok(report)
    }
}
