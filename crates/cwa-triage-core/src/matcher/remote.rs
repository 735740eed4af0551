//! Remote classifier matcher.

use tracing::{info, warn};

use super::Matcher;
use crate::error::TriageResult;
use crate::models::{DiagnosisQuery, DiagnosisResult, MatchOutcome};
use crate::remote::{PredictRequest, PredictionApi};

/// Delegates diagnosis to the prediction service.
///
/// The classifier's single answer is trusted as-is; nothing is ranked
/// locally. Failures surface as errors and are never retried here.
pub struct RemoteMatcher<'a> {
    api: &'a dyn PredictionApi,
}

impl<'a> RemoteMatcher<'a> {
    pub fn new(api: &'a dyn PredictionApi) -> Self {
        Self { api }
    }
}

impl Matcher for RemoteMatcher<'_> {
    fn diagnose(&self, query: &DiagnosisQuery) -> TriageResult<MatchOutcome> {
        if query.is_empty() {
            return Ok(MatchOutcome::NoSymptoms);
        }

        let response = self.api.predict_agent(&PredictRequest::from(query))?;

        let score = if (0.0..=1.0).contains(&response.score) {
            response.score
        } else {
            warn!(
                agent = %response.predicted_agent,
                score = response.score,
                "classifier score outside [0, 1], clamping"
            );
            if response.score.is_nan() {
                0.0
            } else {
                response.score.clamp(0.0, 1.0)
            }
        };

        info!(agent = %response.predicted_agent, score, "remote diagnosis complete");

        Ok(MatchOutcome::Predicted(DiagnosisResult {
            agent: response.predicted_agent,
            score,
            medicines: response.medicine,
        }))
    }
}
