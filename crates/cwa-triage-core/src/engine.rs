//! Mode-aware entry point over the whole workflow.

use tracing::info;

use crate::catalog::{AgentDirectory, SymptomCatalog};
use crate::config::{MatchMode, TriageConfig};
use crate::error::{Fetched, TriageResult};
use crate::matcher::{LocalMatcher, Matcher, RemoteMatcher};
use crate::models::CaseReport;
use crate::remote::{HttpPredictionApi, PredictionApi};
use crate::report::{CaseIdGenerator, ReportComposer, ReportRequest};
use crate::session::{Diagnosis, SymptomSelection};
use crate::treatment::{
    RemoteTreatmentResolver, StaticTreatmentTable, TreatmentOutcome, TreatmentSource,
};

/// Owns the reference data and, in remote mode, the prediction service
/// client. Each call is one request/response step.
pub struct TriageEngine {
    catalog: SymptomCatalog,
    directory: AgentDirectory,
    treatments: StaticTreatmentTable,
    api: Option<Box<dyn PredictionApi + Send + Sync>>,
    composer: ReportComposer,
}

impl TriageEngine {
    /// Engine over the builtin catalog and directory.
    pub fn local() -> Self {
        let directory = AgentDirectory::builtin();
        Self {
            catalog: SymptomCatalog::builtin(),
            treatments: StaticTreatmentTable::from_directory(&directory),
            directory,
            api: None,
            composer: ReportComposer::default(),
        }
    }

    /// Engine that diagnoses and looks up treatment through `api`.
    pub fn with_api(api: Box<dyn PredictionApi + Send + Sync>) -> Self {
        Self {
            api: Some(api),
            ..Self::local()
        }
    }

    pub fn from_config(config: &TriageConfig) -> TriageResult<Self> {
        let engine = match config.api_base_url() {
            Some(url) => {
                let api = HttpPredictionApi::new(url, config.api_timeout_secs())?;
                Self::with_api(Box::new(api))
            }
            None => Self::local(),
        };
        info!(mode = ?engine.mode(), "triage engine ready");
        Ok(engine)
    }

    pub fn with_case_ids(mut self, ids: Box<dyn CaseIdGenerator>) -> Self {
        self.composer = ReportComposer::new(ids);
        self
    }

    pub fn mode(&self) -> MatchMode {
        match self.api {
            Some(_) => MatchMode::Remote,
            None => MatchMode::Local,
        }
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    pub fn directory(&self) -> &AgentDirectory {
        &self.directory
    }

    /// Selectable symptoms, optionally scoped to one body system.
    pub fn symptoms(&self, system: Option<&str>) -> TriageResult<Fetched<SymptomCatalog>> {
        match (self.api.as_deref(), system) {
            (Some(api), Some(system)) => SymptomCatalog::fetch_by_system(api, system),
            (Some(api), None) => SymptomCatalog::fetch_all(api),
            (None, Some(system)) => {
                let scoped = self.catalog.by_system(system).into_iter().cloned().collect();
                Ok(Fetched::from_vec(scoped, SymptomCatalog::new))
            }
            (None, None) => Ok(Fetched::Found(self.catalog.clone())),
        }
    }

    /// Known agents: the service's list in remote mode, else the directory.
    pub fn agents(&self) -> TriageResult<Fetched<AgentDirectory>> {
        match self.api.as_deref() {
            Some(api) => AgentDirectory::fetch(api),
            None => Ok(Fetched::from_vec(
                self.directory.agents().to_vec(),
                AgentDirectory::new,
            )),
        }
    }

    pub fn matcher(&self) -> Box<dyn Matcher + '_> {
        match self.api.as_deref() {
            Some(api) => Box::new(RemoteMatcher::new(api)),
            None => Box::new(LocalMatcher::new(&self.directory)),
        }
    }

    pub fn treatment_source(&self) -> Box<dyn TreatmentSource + '_> {
        match self.api.as_deref() {
            Some(api) => Box::new(RemoteTreatmentResolver::new(api)),
            None => Box::new(self.treatments.clone()),
        }
    }

    pub fn diagnose(&self, selection: &SymptomSelection) -> TriageResult<Diagnosis> {
        selection.diagnose(self.matcher().as_ref())
    }

    pub fn resolve_treatment(&self, agent_name: &str) -> TriageResult<TreatmentOutcome> {
        self.treatment_source().resolve(agent_name)
    }

    pub fn composer(&self) -> &ReportComposer {
        &self.composer
    }

    /// Compose a report, filling classification and risk from the directory
    /// when the request leaves them out.
    pub fn compose_report(&self, mut request: ReportRequest) -> TriageResult<CaseReport> {
        if let Some(agent) = self.directory.get(request.agent.trim()) {
            request.classification = request.classification.or(agent.classification);
            request.risk = request.risk.or(agent.risk);
        }
        self.composer.compose(request)
    }
}
