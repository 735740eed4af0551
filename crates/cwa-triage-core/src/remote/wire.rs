//! Request and response bodies of the prediction service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{DiagnosisQuery, MedicineDoses, Vitals};

/// One detail row as returned by `/get_agent_details`, in field order.
pub type DetailRecord = Map<String, Value>;

/// Request body for `/predict_agent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictRequest {
    pub gender: String,
    /// Comma-joined symptom names
    pub symptoms: String,
    pub human_system: String,
    /// Optional measurements, sent as top-level fields when set
    #[serde(flatten)]
    pub vitals: Vitals,
}

impl From<&DiagnosisQuery> for PredictRequest {
    fn from(query: &DiagnosisQuery) -> Self {
        Self {
            gender: query.context.gender.clone().unwrap_or_default(),
            symptoms: query.joined_symptoms(),
            human_system: query.context.body_system.clone().unwrap_or_default(),
            vitals: query.vitals,
        }
    }
}

/// Response body from `/predict_agent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub predicted_agent: String,
    pub score: f64,
    #[serde(default)]
    pub medicine: MedicineDoses,
}

/// Error body the service sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Value,
}

/// Pull a readable message out of an error response body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}
