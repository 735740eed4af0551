//! In-memory prediction service for tests and offline runs.

use std::collections::HashMap;
use std::sync::Mutex;

use super::wire::{DetailRecord, PredictRequest, PredictResponse};
use super::PredictionApi;
use crate::error::ApiError;
use crate::models::MedicineDoses;

/// Mock prediction service with canned responses.
///
/// A configured `failure` is returned from every endpoint, which is how tests
/// exercise the transport-error paths.
#[derive(Default)]
pub struct MockPredictionApi {
    agents: Vec<String>,
    all_symptoms: Vec<String>,
    symptoms_by_system: HashMap<String, Vec<String>>,
    prediction: Option<PredictResponse>,
    details: HashMap<String, Vec<DetailRecord>>,
    failure: Option<ApiError>,
    predict_requests: Mutex<Vec<PredictRequest>>,
}

impl MockPredictionApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(mut self, agents: Vec<String>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_all_symptoms(mut self, symptoms: Vec<String>) -> Self {
        self.all_symptoms = symptoms;
        self
    }

    pub fn with_symptoms(mut self, system: &str, symptoms: Vec<String>) -> Self {
        self.symptoms_by_system.insert(system.to_string(), symptoms);
        self
    }

    pub fn with_prediction(mut self, agent: &str, score: f64, medicine: MedicineDoses) -> Self {
        self.prediction = Some(PredictResponse {
            predicted_agent: agent.to_string(),
            score,
            medicine,
        });
        self
    }

    pub fn with_details(mut self, agent: &str, rows: Vec<DetailRecord>) -> Self {
        self.details.insert(agent.to_string(), rows);
        self
    }

    pub fn failing_with(mut self, error: ApiError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Prediction requests received so far.
    pub fn predict_requests(&self) -> Vec<PredictRequest> {
        self.predict_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn check_failure(&self) -> Result<(), ApiError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl PredictionApi for MockPredictionApi {
    fn get_all_agents(&self) -> Result<Vec<String>, ApiError> {
        self.check_failure()?;
        Ok(self.agents.clone())
    }

    fn get_all_symptoms(&self) -> Result<Vec<String>, ApiError> {
        self.check_failure()?;
        Ok(self.all_symptoms.clone())
    }

    fn get_symptoms_by_system(&self, system: &str) -> Result<Vec<String>, ApiError> {
        self.check_failure()?;
        Ok(self
            .symptoms_by_system
            .get(system)
            .cloned()
            .unwrap_or_default())
    }

    fn predict_agent(&self, request: &PredictRequest) -> Result<PredictResponse, ApiError> {
        if let Ok(mut requests) = self.predict_requests.lock() {
            requests.push(request.clone());
        }
        self.check_failure()?;
        self.prediction.clone().ok_or_else(|| ApiError::Status {
            status: 400,
            body: "No matching data found for top agents".into(),
        })
    }

    fn get_agent_details(&self, agent_name: &str) -> Result<Vec<DetailRecord>, ApiError> {
        self.check_failure()?;
        Ok(self.details.get(agent_name).cloned().unwrap_or_default())
    }
}
