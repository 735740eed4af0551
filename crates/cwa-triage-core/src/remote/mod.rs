//! Client side of the external prediction service.
//!
//! The service exposes five endpoints:
//!
//! ```text
//! GET  /get_all_agents                       → ["Sarin", ...]
//! GET  /get_all_symptoms                     → ["Blurred Vision", ...]
//! GET  /get_symptoms_by_system?system=...    → ["Coughing", ...]
//! POST /predict_agent  {gender, symptoms, human_system}
//!                                            → {predicted_agent, score, medicine}
//! GET  /get_agent_details?agent_name=...     → [{...}, ...]
//! ```
//!
//! Everything above the [`PredictionApi`] trait works against either the HTTP
//! client or the in-memory mock.

mod http;
mod mock;
mod wire;

pub use http::*;
pub use mock::*;
pub use wire::*;

use crate::error::ApiError;

/// The prediction service, one method per endpoint.
pub trait PredictionApi {
    /// List every agent the service knows.
    fn get_all_agents(&self) -> Result<Vec<String>, ApiError>;

    /// List every symptom the service knows, across all body systems.
    fn get_all_symptoms(&self) -> Result<Vec<String>, ApiError>;

    /// List symptoms associated with a body system.
    fn get_symptoms_by_system(&self, system: &str) -> Result<Vec<String>, ApiError>;

    /// Classify a symptom set into a single agent.
    fn predict_agent(&self, request: &PredictRequest) -> Result<PredictResponse, ApiError>;

    /// Fetch detail rows for an agent. An absent body is an empty list.
    fn get_agent_details(&self, agent_name: &str) -> Result<Vec<DetailRecord>, ApiError>;
}
