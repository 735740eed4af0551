//! Local set-overlap matcher.

use tracing::{debug, info};

use super::Matcher;
use crate::catalog::AgentDirectory;
use crate::error::TriageResult;
use crate::models::{DiagnosisQuery, MatchOutcome, RankedAgent};

/// Matches a query against a static agent directory.
///
/// An agent qualifies when its symptom set shares at least one symptom with
/// the query. Symptom names compare trimmed and case-insensitively, so
/// `" blurred vision"` matches `Blurred Vision`. Candidates are ordered by
/// overlap count, highest first; ties keep directory order. Demographic
/// context does not affect ranking.
pub struct LocalMatcher<'a> {
    directory: &'a AgentDirectory,
}

impl<'a> LocalMatcher<'a> {
    pub fn new(directory: &'a AgentDirectory) -> Self {
        Self { directory }
    }

    /// Every qualifying agent, best first.
    pub fn rank(&self, query: &DiagnosisQuery) -> Vec<RankedAgent> {
        let keys = query.symptom_keys();

        let mut ranked: Vec<RankedAgent> = self
            .directory
            .agents()
            .iter()
            .filter_map(|agent| {
                let matched = agent.matched_symptoms(&keys);
                if matched.is_empty() {
                    return None;
                }
                let score = matched.len() as f64 / agent.symptoms.len() as f64;
                debug!(agent = %agent.name, overlap = matched.len(), score, "agent matched");
                Some(RankedAgent {
                    agent: agent.clone(),
                    matched_symptoms: matched,
                    score,
                })
            })
            .collect();

        // Stable: equal overlap keeps directory order
        ranked.sort_by(|a, b| b.matched_symptoms.len().cmp(&a.matched_symptoms.len()));
        ranked
    }
}

impl Matcher for LocalMatcher<'_> {
    fn diagnose(&self, query: &DiagnosisQuery) -> TriageResult<MatchOutcome> {
        if query.is_empty() {
            return Ok(MatchOutcome::NoSymptoms);
        }

        let ranked = self.rank(query);
        info!(
            symptoms = query.symptoms.len(),
            candidates = ranked.len(),
            "local diagnosis complete"
        );

        if ranked.is_empty() {
            Ok(MatchOutcome::NoMatch)
        } else {
            Ok(MatchOutcome::Ranked(ranked))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Agent, DemographicContext};

    fn agent(name: &str, symptoms: &[&str]) -> Agent {
        let mut agent = Agent::new(name);
        agent.symptoms = symptoms.iter().map(|s| s.to_string()).collect();
        agent
    }

    fn directory() -> AgentDirectory {
        AgentDirectory::new(vec![
            agent("Alpha", &["Nausea", "Headache", "Coughing"]),
            agent("Bravo", &["Headache", "Seizures"]),
            agent("Charlie", &["Blistering"]),
            agent("Delta", &["Nausea", "Headache"]),
        ])
    }

    #[test]
    fn test_empty_query_is_no_symptoms() {
        let directory = directory();
        let matcher = LocalMatcher::new(&directory);
        let outcome = matcher.diagnose(&DiagnosisQuery::default()).unwrap();
        assert_eq!(outcome, MatchOutcome::NoSymptoms);
    }

    #[test]
    fn test_no_overlap_is_no_match() {
        let directory = directory();
        let matcher = LocalMatcher::new(&directory);
        let outcome = matcher
            .diagnose(&DiagnosisQuery::new(vec!["Vomiting"]))
            .unwrap();
        assert_eq!(outcome, MatchOutcome::NoMatch);
    }

    #[test]
    fn test_ranked_by_overlap_then_directory_order() {
        let directory = directory();
        let matcher = LocalMatcher::new(&directory);
        let outcome = matcher
            .diagnose(&DiagnosisQuery::new(vec!["Headache", "nausea"]))
            .unwrap();

        // Alpha and Delta overlap on two, Bravo on one; Charlie is excluded
        assert_eq!(outcome.agent_names(), vec!["Alpha", "Delta", "Bravo"]);
    }

    #[test]
    fn test_score_is_fraction_of_agent_symptoms() {
        let directory = directory();
        let ranked = LocalMatcher::new(&directory).rank(&DiagnosisQuery::new(vec!["Headache"]));

        let alpha = ranked.iter().find(|r| r.agent.name == "Alpha").unwrap();
        assert!((alpha.score - 1.0 / 3.0).abs() < 1e-9);

        let delta = ranked.iter().find(|r| r.agent.name == "Delta").unwrap();
        assert_eq!(delta.score, 0.5);
        assert_eq!(delta.matched_symptoms, vec!["Headache"]);
    }

    #[test]
    fn test_context_does_not_change_ranking() {
        let directory = directory();
        let matcher = LocalMatcher::new(&directory);
        let plain = DiagnosisQuery::new(vec!["Headache"]);
        let with_context = plain.clone().with_context(DemographicContext::new(
            Some("female".into()),
            Some("Skin".into()),
        ));

        assert_eq!(
            matcher.diagnose(&plain).unwrap(),
            matcher.diagnose(&with_context).unwrap()
        );
    }

    #[test]
    fn test_symptom_comparison_ignores_case_and_padding() {
        let directory = directory();
        let ranked = LocalMatcher::new(&directory)
            .rank(&DiagnosisQuery::new(vec![" BLISTERING ", "seizures"]));

        assert_eq!(
            ranked.iter().map(|r| r.agent.name.as_str()).collect::<Vec<_>>(),
            vec!["Bravo", "Charlie"]
        );
        // Reported in the directory's spelling
        assert_eq!(ranked[1].matched_symptoms, vec!["Blistering"]);
    }
}
