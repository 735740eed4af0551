//! Typed workflow stages.
//!
//! Each stage owns exactly what the next one needs and nothing else:
//!
//! ```text
//! SymptomSelection ──diagnose──▶ Diagnosis ──choose──▶ ChosenAgent
//!                                                         │
//!                                       resolve_treatment ┤ compose_report
//!                                                         ▼
//!                                       TreatmentOutcome / CaseReport
//! ```
//!
//! Every stage can also be flattened to its query-string handoff and rebuilt
//! from it.

use tracing::debug;

use crate::catalog::AgentDirectory;
use crate::error::{TriageError, TriageResult};
use crate::handoff::{DiagnosisHandoff, ReportHandoff, TreatmentHandoff};
use crate::matcher::Matcher;
use crate::models::{
    symptom_key, Agent, CaseReport, DemographicContext, DiagnosisQuery, DiagnosisResult,
    MatchOutcome, Vitals,
};
use crate::report::{ReportComposer, ReportRequest};
use crate::treatment::{TreatmentOutcome, TreatmentSource};

/// Symptoms picked so far, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymptomSelection {
    selected: Vec<String>,
    context: DemographicContext,
    vitals: Vitals,
}

impl SymptomSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a symptom, or deselect it if already selected (any casing).
    /// Returns whether the symptom is selected afterwards.
    pub fn toggle(&mut self, symptom: &str) -> bool {
        let key = symptom_key(symptom);
        if key.is_empty() {
            return false;
        }
        match self.selected.iter().position(|s| symptom_key(s) == key) {
            Some(index) => {
                self.selected.remove(index);
                false
            }
            None => {
                self.selected.push(symptom.trim().to_string());
                true
            }
        }
    }

    /// Select a symptom if not already selected.
    pub fn select(&mut self, symptom: &str) {
        if !self.is_selected(symptom) {
            self.toggle(symptom);
        }
    }

    pub fn is_selected(&self, symptom: &str) -> bool {
        let key = symptom_key(symptom);
        self.selected.iter().any(|s| symptom_key(s) == key)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn set_context(&mut self, context: DemographicContext) {
        self.context = context;
    }

    pub fn context(&self) -> &DemographicContext {
        &self.context
    }

    /// Measurements forwarded to a remote classifier.
    pub fn set_vitals(&mut self, vitals: Vitals) {
        self.vitals = vitals;
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn to_query(&self) -> DiagnosisQuery {
        DiagnosisQuery::new(self.selected.clone())
            .with_context(self.context.clone())
            .with_vitals(self.vitals)
    }

    pub fn to_handoff(&self) -> DiagnosisHandoff {
        DiagnosisHandoff::from(&self.to_query())
    }

    pub fn from_handoff(handoff: &DiagnosisHandoff) -> Self {
        let query = handoff.to_diagnosis_query();
        Self {
            selected: query.symptoms,
            context: query.context,
            vitals: Vitals::default(),
        }
    }

    /// Run the matcher over the current selection.
    pub fn diagnose(&self, matcher: &dyn Matcher) -> TriageResult<Diagnosis> {
        let query = self.to_query();
        let outcome = matcher.diagnose(&query)?;
        Ok(Diagnosis { query, outcome })
    }
}

/// A finished match over a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub query: DiagnosisQuery,
    pub outcome: MatchOutcome,
}

impl Diagnosis {
    /// Pick one candidate agent by exact name.
    pub fn choose(&self, agent_name: &str) -> TriageResult<ChosenAgent> {
        let chosen = match &self.outcome {
            MatchOutcome::Ranked(ranked) => ranked
                .iter()
                .find(|r| r.agent.name == agent_name)
                .map(|r| ChosenAgent {
                    query: self.query.clone(),
                    result: DiagnosisResult {
                        agent: r.agent.name.clone(),
                        score: r.score,
                        medicines: r.agent.medicines.clone(),
                    },
                    agent: Some(r.agent.clone()),
                }),
            MatchOutcome::Predicted(result) if result.agent == agent_name => Some(ChosenAgent {
                query: self.query.clone(),
                result: result.clone(),
                agent: None,
            }),
            _ => None,
        };

        chosen.ok_or_else(|| {
            TriageError::InvalidInput(format!("{} is not a candidate agent", agent_name))
        })
    }

    /// The top candidate, if there is one.
    pub fn choose_best(&self) -> Option<ChosenAgent> {
        let best = self.outcome.agent_names().into_iter().next()?;
        self.choose(&best).ok()
    }
}

/// The agent the user settled on, with the diagnosis that led there.
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenAgent {
    pub query: DiagnosisQuery,
    pub result: DiagnosisResult,
    /// Directory entry, when the agent came from local matching
    pub agent: Option<Agent>,
}

impl ChosenAgent {
    pub fn name(&self) -> &str {
        &self.result.agent
    }

    pub fn resolve_treatment(
        &self,
        source: &dyn TreatmentSource,
    ) -> TriageResult<TreatmentOutcome> {
        debug!(agent = %self.name(), "resolving treatment");
        source.resolve(self.name())
    }

    pub fn report_request(&self, clinician: &str) -> ReportRequest {
        let request = ReportRequest::new(self.name())
            .with_symptoms(self.query.symptoms.clone())
            .with_context(self.query.context.clone())
            .with_medicines(self.result.medicines.clone())
            .with_clinician(clinician);
        match &self.agent {
            Some(agent) => request.with_agent_details(agent),
            None => request,
        }
    }

    pub fn compose_report(
        &self,
        composer: &ReportComposer,
        clinician: &str,
    ) -> TriageResult<CaseReport> {
        composer.compose(self.report_request(clinician))
    }

    pub fn to_treatment_handoff(&self) -> TreatmentHandoff {
        TreatmentHandoff {
            agent: self.name().to_string(),
            symptoms: self.query.symptoms.clone(),
        }
    }

    pub fn to_report_handoff(&self) -> ReportHandoff {
        ReportHandoff {
            agent: self.name().to_string(),
            symptoms: self.query.symptoms.clone(),
            gender: self.query.context.gender.clone(),
            system: self.query.context.body_system.clone(),
            medicines: self.result.medicines.clone(),
        }
    }
}

/// Rebuild a report request from the report-stage handoff. Classification
/// and risk are filled in when the directory knows the agent.
pub fn report_request_from_handoff(
    handoff: &ReportHandoff,
    directory: &AgentDirectory,
    clinician: &str,
) -> ReportRequest {
    let request = ReportRequest::new(handoff.agent.clone())
        .with_symptoms(handoff.symptoms.clone())
        .with_context(handoff.context())
        .with_medicines(handoff.medicines.clone())
        .with_clinician(clinician);
    match directory.get(&handoff.agent) {
        Some(agent) => request.with_agent_details(agent),
        None => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{LocalMatcher, RemoteMatcher};
    use crate::models::{AgentClass, MedicineDoses};
    use crate::remote::MockPredictionApi;
    use crate::report::SequentialCaseIds;
    use crate::treatment::StaticTreatmentTable;

    #[test]
    fn test_toggle_preserves_order() {
        let mut selection = SymptomSelection::new();
        assert!(selection.toggle("Nausea"));
        assert!(selection.toggle("Headache"));
        assert!(selection.toggle("Coughing"));
        assert!(!selection.toggle("headache"));
        assert_eq!(selection.selected(), ["Nausea", "Coughing"]);

        selection.select("Nausea");
        assert_eq!(selection.selected().len(), 2);
        assert!(!selection.toggle("   "));
    }

    #[test]
    fn test_local_pipeline() {
        let directory = AgentDirectory::builtin();
        let mut selection = SymptomSelection::new();
        selection.toggle("Blurred Vision");
        selection.toggle("Excessive Sweating");
        selection.toggle("Muscle Twitching");

        let diagnosis = selection.diagnose(&LocalMatcher::new(&directory)).unwrap();
        let chosen = diagnosis.choose_best().unwrap();
        assert_eq!(chosen.name(), "VX Nerve Agent");
        assert_eq!(chosen.result.score, 1.0);

        let treatment = chosen
            .resolve_treatment(&StaticTreatmentTable::from_directory(&directory))
            .unwrap();
        assert!(treatment.is_found());

        let composer = ReportComposer::new(Box::new(SequentialCaseIds::new()));
        let report = chosen.compose_report(&composer, "").unwrap();
        assert_eq!(report.classification, Some(AgentClass::Chemical));
        assert_eq!(report.symptoms.len(), 3);
        assert_eq!(report.clinician_display(), "N/A");
    }

    #[test]
    fn test_choose_unknown_candidate() {
        let directory = AgentDirectory::builtin();
        let mut selection = SymptomSelection::new();
        selection.toggle("Nausea");
        let diagnosis = selection.diagnose(&LocalMatcher::new(&directory)).unwrap();

        assert!(diagnosis.choose("Botulinum Toxin").is_ok());
        assert!(diagnosis.choose("Chlorine").is_err());
    }

    #[test]
    fn test_no_symptoms_has_no_choice() {
        let directory = AgentDirectory::builtin();
        let diagnosis = SymptomSelection::new()
            .diagnose(&LocalMatcher::new(&directory))
            .unwrap();
        assert_eq!(diagnosis.outcome, MatchOutcome::NoSymptoms);
        assert!(diagnosis.choose_best().is_none());
    }

    #[test]
    fn test_remote_pipeline_handoffs() {
        let api = MockPredictionApi::new().with_prediction(
            "Sarin",
            0.9,
            MedicineDoses::new().with("atropine_mg_initial", 2.0),
        );
        let mut selection = SymptomSelection::new();
        selection.toggle("Headache");
        selection.set_context(DemographicContext::new(Some("male".into()), None));

        let diagnosis = selection.diagnose(&RemoteMatcher::new(&api)).unwrap();
        let chosen = diagnosis.choose("Sarin").unwrap();
        assert!(chosen.agent.is_none());

        let report_handoff =
            ReportHandoff::from_query(&chosen.to_report_handoff().to_query()).unwrap();
        assert_eq!(report_handoff.medicines.get("atropine_mg_initial"), Some(2.0));

        let request =
            report_request_from_handoff(&report_handoff, &AgentDirectory::builtin(), "Dr. Rao");
        assert_eq!(request.classification, Some(AgentClass::Chemical));
        assert_eq!(request.context.gender.as_deref(), Some("male"));

        let treatment = TreatmentHandoff::from_query(&chosen.to_treatment_handoff().to_query());
        assert_eq!(treatment.unwrap().agent, "Sarin");
    }

    #[test]
    fn test_vitals_reach_remote_classifier() {
        let api = MockPredictionApi::new().with_prediction("Sarin", 0.7, MedicineDoses::new());
        let vitals = Vitals {
            oxygen: Some(91.0),
            respiratory: Some(28.0),
            ..Vitals::default()
        };

        let mut selection = SymptomSelection::new();
        selection.toggle("Shortness of Breath");
        selection.set_vitals(vitals);
        selection.diagnose(&RemoteMatcher::new(&api)).unwrap();

        assert_eq!(api.predict_requests()[0].vitals, vitals);
    }

    #[test]
    fn test_selection_handoff_roundtrip() {
        let mut selection = SymptomSelection::new();
        selection.toggle("Shortness of Breath");
        selection.toggle("Chest Tightness");
        selection.set_context(DemographicContext::new(None, Some("Respiratory".into())));

        let rebuilt = SymptomSelection::from_handoff(&DiagnosisHandoff::from_query(
            &selection.to_handoff().to_query(),
        ));
        assert_eq!(rebuilt, selection);
    }
}
