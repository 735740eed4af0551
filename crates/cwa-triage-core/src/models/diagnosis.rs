//! Diagnosis query and result models for the matcher.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::medicine::MedicineDoses;
use super::symptom::symptom_key;

/// Optional demographic context carried alongside a symptom selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DemographicContext {
    /// Patient gender as entered (e.g., "male", "female")
    pub gender: Option<String>,
    /// Affected body system (e.g., "Respiratory")
    pub body_system: Option<String>,
}

impl DemographicContext {
    pub fn new(gender: Option<String>, body_system: Option<String>) -> Self {
        Self {
            gender: non_blank(gender),
            body_system: non_blank(body_system),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Optional clinical measurements the classifier accepts alongside the
/// symptom set. Unset values are left out of the request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    /// Oxygen saturation, percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen: Option<f64>,
    /// Breaths per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
}

impl Vitals {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The input to the matcher: selected symptoms plus optional context.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisQuery {
    /// Selected symptom names in selection order, without duplicates
    pub symptoms: Vec<String>,
    /// Demographic context
    pub context: DemographicContext,
    /// Measurements forwarded to the classifier; local matching ignores them
    #[serde(default)]
    pub vitals: Vitals,
}

impl DiagnosisQuery {
    /// Create a query. Blank names are dropped and duplicates (any casing)
    /// keep their first occurrence.
    pub fn new<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let symptoms = symptoms
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(symptom_key(s)))
            .collect();

        Self {
            symptoms,
            context: DemographicContext::default(),
            vitals: Vitals::default(),
        }
    }

    pub fn with_context(mut self, context: DemographicContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = vitals;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Comparison keys for set-intersection matching.
    pub fn symptom_keys(&self) -> HashSet<String> {
        self.symptoms.iter().map(|s| symptom_key(s)).collect()
    }

    /// Symptoms as the prediction service expects them: `"cough, headache"`.
    pub fn joined_symptoms(&self) -> String {
        self.symptoms.join(", ")
    }
}

/// A directory agent that shares at least one symptom with the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedAgent {
    /// The matching agent
    pub agent: Agent,
    /// Agent symptoms present in the query
    pub matched_symptoms: Vec<String>,
    /// Fraction of the agent's symptom set that was observed (0.0 - 1.0)
    pub score: f64,
}

/// The single best answer for a query: an agent, a score and doses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisResult {
    /// Agent name (directory agent, or trusted classifier output)
    pub agent: String,
    /// Confidence score (0.0 - 1.0)
    pub score: f64,
    /// Recommended initial doses
    pub medicines: MedicineDoses,
}

/// What the matcher concluded for a query.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The query had no symptoms; nothing was matched
    NoSymptoms,
    /// Symptoms were given but no agent qualified
    NoMatch,
    /// Local matching: every qualifying agent, best first
    Ranked(Vec<RankedAgent>),
    /// Remote classification: a single best-effort answer
    Predicted(DiagnosisResult),
}

impl MatchOutcome {
    /// The single best result, whichever mode produced the outcome.
    pub fn best(&self) -> Option<DiagnosisResult> {
        match self {
            MatchOutcome::Ranked(ranked) => ranked.first().map(|top| DiagnosisResult {
                agent: top.agent.name.clone(),
                score: top.score,
                medicines: top.agent.medicines.clone(),
            }),
            MatchOutcome::Predicted(result) => Some(result.clone()),
            MatchOutcome::NoSymptoms | MatchOutcome::NoMatch => None,
        }
    }

    /// Names of all candidate agents, best first.
    pub fn agent_names(&self) -> Vec<String> {
        match self {
            MatchOutcome::Ranked(ranked) => ranked.iter().map(|r| r.agent.name.clone()).collect(),
            MatchOutcome::Predicted(result) => vec![result.agent.clone()],
            MatchOutcome::NoSymptoms | MatchOutcome::NoMatch => Vec::new(),
        }
    }

    pub fn has_candidates(&self) -> bool {
        matches!(self, MatchOutcome::Ranked(_) | MatchOutcome::Predicted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_dedup_and_trim() {
        let query = DiagnosisQuery::new(vec!["Nausea", " nausea ", "", "Headache"]);
        assert_eq!(query.symptoms, vec!["Nausea", "Headache"]);
        assert_eq!(query.joined_symptoms(), "Nausea, Headache");
        assert!(query.symptom_keys().contains("headache"));
    }

    #[test]
    fn test_context_blank_is_none() {
        let context = DemographicContext::new(Some("  ".into()), Some("Respiratory".into()));
        assert_eq!(context.gender, None);
        assert_eq!(context.body_system.as_deref(), Some("Respiratory"));
    }

    #[test]
    fn test_best_of_ranked() {
        let mut agent = Agent::new("Sarin");
        agent.medicines = MedicineDoses::new().with("atropine_mg_initial", 2.0);

        let outcome = MatchOutcome::Ranked(vec![RankedAgent {
            agent,
            matched_symptoms: vec!["Miosis".into()],
            score: 0.25,
        }]);

        let best = outcome.best().unwrap();
        assert_eq!(best.agent, "Sarin");
        assert_eq!(best.score, 0.25);
        assert_eq!(best.medicines.get("atropine_mg_initial"), Some(2.0));
        assert_eq!(outcome.agent_names(), vec!["Sarin"]);
    }

    #[test]
    fn test_empty_outcomes_have_no_best() {
        assert!(MatchOutcome::NoSymptoms.best().is_none());
        assert!(MatchOutcome::NoMatch.best().is_none());
        assert!(!MatchOutcome::NoMatch.has_candidates());
    }
}
