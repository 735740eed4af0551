//! CWA Triage Core Library
//!
//! Symptom-to-agent triage for chemical warfare agent exposure: pick
//! symptoms, match them to a likely agent, look up treatment and produce a
//! case report.
//!
//! # Architecture
//!
//! ```text
//! SymptomCatalog ──selection──▶ Matcher ──candidates──▶ Treatment Resolver
//!                                  │                           │
//!                    ┌─────────────┴────────────┐              │
//!                    ▼                          ▼              ▼
//!              LocalMatcher               RemoteMatcher   Report Composer
//!          (set overlap over the      (external classifier,      │
//!            agent directory)           single answer)           ▼
//!                                                          PDF / text / JSON
//! ```
//!
//! Every step is a single request/response. Stages hand state forward
//! explicitly, either as typed [`session`] objects or as query strings
//! ([`handoff`]).
//!
//! # Modules
//!
//! - [`models`]: Domain types (Symptom, Agent, DiagnosisQuery, CaseReport, etc.)
//! - [`catalog`]: Symptom catalog and agent directory
//! - [`matcher`]: Local and remote matching
//! - [`treatment`]: Static protocol table and remote detail lookup
//! - [`report`]: Case id generation, composition and export
//! - [`remote`]: Prediction service client
//! - [`handoff`]: Query-string state between stages
//! - [`session`]: Typed workflow stages
//! - [`engine`]: Mode-aware entry point used by the CLI and FFI

pub mod catalog;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod handoff;
pub mod matcher;
pub mod models;
pub mod remote;
pub mod report;
pub mod session;
pub mod treatment;

// Re-export commonly used types
pub use catalog::{AgentDirectory, SymptomCatalog};
pub use config::{MatchMode, TriageConfig};
pub use engine::TriageEngine;
pub use error::{ApiError, Fetched, TriageError, TriageResult};
pub use handoff::{DiagnosisHandoff, ReportHandoff, TreatmentHandoff};
pub use matcher::{LocalMatcher, Matcher, RemoteMatcher};
pub use models::{
    Agent, AgentClass, CaseReport, DemographicContext, DiagnosisQuery, DiagnosisResult,
    MatchOutcome, MedicineDose, MedicineDoses, RankedAgent, RiskLevel, Symptom, Vitals,
};
pub use report::{
    export_report, CaseIdGenerator, ExportFormat, ExportedDocument, RandomCaseIds,
    ReportComposer, ReportRequest,
};
pub use session::{ChosenAgent, Diagnosis, SymptomSelection};
pub use treatment::{TreatmentOutcome, TreatmentSource, EMERGENCY_PROTOCOL};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use chrono::{DateTime, Utc};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum CwaTriageError {
    #[error("Prediction service error: {0}")]
    ServiceError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<TriageError> for CwaTriageError {
    fn from(e: TriageError) -> Self {
        match e {
            TriageError::Api(e) => CwaTriageError::ServiceError(e.to_string()),
            TriageError::Serialization(e) => CwaTriageError::SerializationError(e.to_string()),
            TriageError::Export(msg) => CwaTriageError::ExportError(msg),
            TriageError::InvalidInput(msg) => CwaTriageError::InvalidInput(msg),
            TriageError::Config(msg) => CwaTriageError::ConfigError(msg),
        }
    }
}

impl From<ApiError> for CwaTriageError {
    fn from(e: ApiError) -> Self {
        CwaTriageError::ServiceError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a workflow over the builtin catalog and agent directory.
#[uniffi::export]
pub fn open_local() -> Arc<CwaTriageCore> {
    Arc::new(CwaTriageCore {
        engine: TriageEngine::local(),
    })
}

/// Open a workflow backed by the prediction service at `base_url`.
#[uniffi::export]
pub fn open_remote(
    base_url: String,
    timeout_secs: u64,
) -> Result<Arc<CwaTriageCore>, CwaTriageError> {
    let config = TriageConfig::new(Some(base_url), timeout_secs, ".".into())?;
    Ok(Arc::new(CwaTriageCore {
        engine: TriageEngine::from_config(&config)?,
    }))
}

/// General immediate actions, independent of the agent.
#[uniffi::export]
pub fn emergency_protocol() -> Vec<String> {
    EMERGENCY_PROTOCOL.iter().map(|s| s.to_string()).collect()
}

// =========================================================================
// Handoff Functions (exported to FFI)
// =========================================================================

#[uniffi::export]
pub fn encode_diagnosis_handoff(handoff: FfiDiagnosisHandoff) -> String {
    DiagnosisHandoff::from(handoff).to_query()
}

#[uniffi::export]
pub fn decode_diagnosis_handoff(query: String) -> FfiDiagnosisHandoff {
    DiagnosisHandoff::from_query(&query).into()
}

#[uniffi::export]
pub fn encode_treatment_handoff(agent: String, symptoms: Vec<String>) -> String {
    TreatmentHandoff { agent, symptoms }.to_query()
}

/// Agent name carried by a treatment handoff, if any.
#[uniffi::export]
pub fn decode_treatment_handoff(query: String) -> Option<String> {
    TreatmentHandoff::from_query(&query).map(|h| h.agent)
}

#[uniffi::export]
pub fn encode_report_handoff(handoff: FfiReportHandoff) -> String {
    ReportHandoff::from(handoff).to_query()
}

#[uniffi::export]
pub fn decode_report_handoff(query: String) -> Option<FfiReportHandoff> {
    ReportHandoff::from_query(&query).map(|h| h.into())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Workflow handle for FFI.
#[derive(uniffi::Object)]
pub struct CwaTriageCore {
    engine: TriageEngine,
}

#[uniffi::export]
impl CwaTriageCore {
    /// "local" or "remote".
    pub fn mode(&self) -> String {
        match self.engine.mode() {
            MatchMode::Local => "local".into(),
            MatchMode::Remote => "remote".into(),
        }
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// List selectable symptoms, optionally for one body system. Empty when
    /// nothing was found.
    pub fn list_symptoms(
        &self,
        system: Option<String>,
    ) -> Result<Vec<FfiSymptom>, CwaTriageError> {
        let catalog = self.engine.symptoms(system.as_deref())?;
        Ok(catalog
            .found()
            .map(|c| c.symptoms().iter().cloned().map(FfiSymptom::from).collect())
            .unwrap_or_default())
    }

    /// Closest catalog names to a possibly misspelled symptom.
    pub fn suggest_symptoms(&self, input: String, limit: u32) -> Vec<String> {
        self.engine
            .catalog()
            .suggest(&input, limit as usize)
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// List known agents. Empty when nothing was found.
    pub fn list_agents(&self) -> Result<Vec<FfiAgent>, CwaTriageError> {
        let directory = self.engine.agents()?;
        Ok(directory
            .found()
            .map(|d| d.agents().iter().cloned().map(FfiAgent::from).collect())
            .unwrap_or_default())
    }

    // =========================================================================
    // Diagnosis Operations
    // =========================================================================

    /// Match selected symptoms to candidate agents.
    pub fn diagnose(
        &self,
        symptoms: Vec<String>,
        gender: Option<String>,
        body_system: Option<String>,
    ) -> Result<FfiMatchOutcome, CwaTriageError> {
        let mut selection = SymptomSelection::new();
        for symptom in &symptoms {
            selection.select(symptom);
        }
        selection.set_context(DemographicContext::new(gender, body_system));

        let diagnosis = self.engine.diagnose(&selection)?;
        Ok(diagnosis.outcome.into())
    }

    // =========================================================================
    // Treatment Operations
    // =========================================================================

    /// Look up treatment for an agent by exact name.
    pub fn resolve_treatment(&self, agent_name: String) -> Result<FfiTreatment, CwaTriageError> {
        Ok(self.engine.resolve_treatment(&agent_name)?.into())
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Compose a case report with a freshly generated case id.
    pub fn compose_report(
        &self,
        request: FfiReportRequest,
    ) -> Result<FfiCaseReport, CwaTriageError> {
        let report = self.engine.compose_report(request.into())?;
        Ok(report.into())
    }

    /// Export a report as "pdf", "txt" or "json". Without a report nothing
    /// is produced.
    pub fn export_report(
        &self,
        report: Option<FfiCaseReport>,
        format: String,
    ) -> Result<Option<FfiExportedDocument>, CwaTriageError> {
        let format: ExportFormat = format.parse()?;
        let report = report.map(CaseReport::try_from).transpose()?;
        let document = export_report(report.as_ref(), format)?;
        Ok(document.map(|d| d.into()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe symptom.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSymptom {
    pub name: String,
    pub body_system: Option<String>,
}

impl From<Symptom> for FfiSymptom {
    fn from(symptom: Symptom) -> Self {
        Self {
            name: symptom.name,
            body_system: symptom.body_system,
        }
    }
}

/// FFI-safe medicine dose.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicineDose {
    pub name: String,
    pub dose: f64,
}

fn ffi_medicines(medicines: &MedicineDoses) -> Vec<FfiMedicineDose> {
    medicines
        .iter()
        .map(|m| FfiMedicineDose {
            name: m.name.clone(),
            dose: m.dose,
        })
        .collect()
}

fn medicines_from_ffi(medicines: Vec<FfiMedicineDose>) -> MedicineDoses {
    medicines.into_iter().map(|m| (m.name, m.dose)).collect()
}

/// FFI-safe agent.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAgent {
    pub name: String,
    pub classification: Option<String>,
    pub risk: Option<String>,
    pub symptoms: Vec<String>,
    pub action: Option<String>,
    pub protocol: Vec<String>,
    pub medicines: Vec<FfiMedicineDose>,
}

impl From<Agent> for FfiAgent {
    fn from(agent: Agent) -> Self {
        Self {
            medicines: ffi_medicines(&agent.medicines),
            name: agent.name,
            classification: agent.classification.map(|c| c.to_string()),
            risk: agent.risk.map(|r| r.to_string()),
            symptoms: agent.symptoms,
            action: agent.action,
            protocol: agent.protocol,
        }
    }
}

/// FFI-safe ranked candidate.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRankedAgent {
    pub agent_name: String,
    pub matched_symptoms: Vec<String>,
    pub score: f64,
    pub medicines: Vec<FfiMedicineDose>,
}

impl From<RankedAgent> for FfiRankedAgent {
    fn from(ranked: RankedAgent) -> Self {
        Self {
            medicines: ffi_medicines(&ranked.agent.medicines),
            agent_name: ranked.agent.name,
            matched_symptoms: ranked.matched_symptoms,
            score: ranked.score,
        }
    }
}

/// FFI-safe diagnosis result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDiagnosisResult {
    pub agent: String,
    pub score: f64,
    pub medicines: Vec<FfiMedicineDose>,
}

impl From<DiagnosisResult> for FfiDiagnosisResult {
    fn from(result: DiagnosisResult) -> Self {
        Self {
            medicines: ffi_medicines(&result.medicines),
            agent: result.agent,
            score: result.score,
        }
    }
}

/// FFI-safe match outcome.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiMatchOutcome {
    NoSymptoms,
    NoMatch,
    Ranked { candidates: Vec<FfiRankedAgent> },
    Predicted { result: FfiDiagnosisResult },
}

impl From<MatchOutcome> for FfiMatchOutcome {
    fn from(outcome: MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::NoSymptoms => FfiMatchOutcome::NoSymptoms,
            MatchOutcome::NoMatch => FfiMatchOutcome::NoMatch,
            MatchOutcome::Ranked(ranked) => FfiMatchOutcome::Ranked {
                candidates: ranked.into_iter().map(|r| r.into()).collect(),
            },
            MatchOutcome::Predicted(result) => FfiMatchOutcome::Predicted {
                result: result.into(),
            },
        }
    }
}

/// FFI-safe treatment lookup result.
#[derive(Debug, Clone, uniffi::Enum)]
pub enum FfiTreatment {
    Protocol {
        agent: String,
        action: Option<String>,
        steps: Vec<String>,
        /// Display lines for administered medicines
        medicines: Vec<String>,
    },
    Details {
        agent: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    NoTreatmentData,
}

impl From<TreatmentOutcome> for FfiTreatment {
    fn from(outcome: TreatmentOutcome) -> Self {
        match outcome {
            TreatmentOutcome::Protocol(protocol) => FfiTreatment::Protocol {
                medicines: protocol.medicines.display_lines(),
                agent: protocol.agent,
                action: protocol.action,
                steps: protocol.steps,
            },
            TreatmentOutcome::Details(table) => FfiTreatment::Details {
                headers: table.display_headers(),
                rows: table.display_rows(),
                agent: table.agent,
            },
            TreatmentOutcome::NoTreatmentData => FfiTreatment::NoTreatmentData,
        }
    }
}

/// FFI-safe report request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReportRequest {
    pub agent: String,
    pub symptoms: Vec<String>,
    pub gender: Option<String>,
    pub body_system: Option<String>,
    pub medicines: Vec<FfiMedicineDose>,
    pub clinician: String,
}

impl From<FfiReportRequest> for ReportRequest {
    fn from(request: FfiReportRequest) -> Self {
        ReportRequest::new(request.agent)
            .with_symptoms(request.symptoms)
            .with_context(DemographicContext::new(request.gender, request.body_system))
            .with_medicines(medicines_from_ffi(request.medicines))
            .with_clinician(request.clinician)
    }
}

/// FFI-safe case report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCaseReport {
    pub case_id: String,
    pub agent: String,
    pub classification: Option<String>,
    pub risk: Option<String>,
    pub symptoms: Vec<String>,
    pub gender: Option<String>,
    pub body_system: Option<String>,
    pub medicines: Vec<FfiMedicineDose>,
    pub clinician: String,
    /// RFC 3339
    pub created_at: String,
}

impl From<CaseReport> for FfiCaseReport {
    fn from(report: CaseReport) -> Self {
        Self {
            medicines: ffi_medicines(&report.medicines),
            case_id: report.case_id,
            agent: report.agent,
            classification: report.classification.map(|c| c.to_string()),
            risk: report.risk.map(|r| r.to_string()),
            symptoms: report.symptoms,
            gender: report.context.gender,
            body_system: report.context.body_system,
            clinician: report.clinician,
            created_at: report.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<FfiCaseReport> for CaseReport {
    type Error = CwaTriageError;

    fn try_from(report: FfiCaseReport) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&report.created_at)
            .map_err(|e| CwaTriageError::InvalidInput(format!("created_at: {}", e)))?
            .with_timezone(&Utc);
        let classification = report
            .classification
            .map(|c| c.parse::<AgentClass>())
            .transpose()
            .map_err(CwaTriageError::InvalidInput)?;
        let risk = report
            .risk
            .map(|r| r.parse::<RiskLevel>())
            .transpose()
            .map_err(CwaTriageError::InvalidInput)?;

        Ok(CaseReport {
            case_id: report.case_id,
            agent: report.agent,
            classification,
            risk,
            symptoms: report.symptoms,
            context: DemographicContext::new(report.gender, report.body_system),
            medicines: medicines_from_ffi(report.medicines),
            clinician: report.clinician,
            created_at,
        })
    }
}

/// FFI-safe exported document.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub sha256: String,
}

impl From<ExportedDocument> for FfiExportedDocument {
    fn from(document: ExportedDocument) -> Self {
        Self {
            file_name: document.file_name,
            bytes: document.bytes,
            sha256: document.sha256,
        }
    }
}

/// FFI-safe diagnosis-stage handoff.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDiagnosisHandoff {
    pub symptoms: Vec<String>,
    pub gender: Option<String>,
    pub system: Option<String>,
}

impl From<FfiDiagnosisHandoff> for DiagnosisHandoff {
    fn from(handoff: FfiDiagnosisHandoff) -> Self {
        DiagnosisHandoff {
            symptoms: handoff.symptoms,
            gender: handoff.gender,
            system: handoff.system,
        }
    }
}

impl From<DiagnosisHandoff> for FfiDiagnosisHandoff {
    fn from(handoff: DiagnosisHandoff) -> Self {
        Self {
            symptoms: handoff.symptoms,
            gender: handoff.gender,
            system: handoff.system,
        }
    }
}

/// FFI-safe report-stage handoff.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReportHandoff {
    pub agent: String,
    pub symptoms: Vec<String>,
    pub gender: Option<String>,
    pub system: Option<String>,
    pub medicines: Vec<FfiMedicineDose>,
}

impl From<FfiReportHandoff> for ReportHandoff {
    fn from(handoff: FfiReportHandoff) -> Self {
        ReportHandoff {
            agent: handoff.agent,
            symptoms: handoff.symptoms,
            gender: handoff.gender,
            system: handoff.system,
            medicines: medicines_from_ffi(handoff.medicines),
        }
    }
}

impl From<ReportHandoff> for FfiReportHandoff {
    fn from(handoff: ReportHandoff) -> Self {
        Self {
            medicines: ffi_medicines(&handoff.medicines),
            agent: handoff.agent,
            symptoms: handoff.symptoms,
            gender: handoff.gender,
            system: handoff.system,
        }
    }
}
