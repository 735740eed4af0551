//! Blocking HTTP client for the prediction service.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::wire::{error_message, DetailRecord, PredictRequest, PredictResponse};
use super::PredictionApi;
use crate::error::ApiError;

/// HTTP client for a prediction service at a configured base URL.
pub struct HttpPredictionApi {
    base_url: String,
    client: Client,
    timeout_secs: u64,
}

impl HttpPredictionApi {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ApiError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send a request and decode a successful JSON body.
    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().map_err(|e| {
            if e.is_connect() {
                ApiError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        response
            .json()
            .map_err(|e| ApiError::ResponseParsing(e.to_string()))
    }
}

impl PredictionApi for HttpPredictionApi {
    fn get_all_agents(&self) -> Result<Vec<String>, ApiError> {
        debug!(base_url = %self.base_url, "fetching agent list");
        let agents: Option<Vec<String>> =
            self.send_json(self.client.get(self.url("get_all_agents")))?;
        Ok(agents.unwrap_or_default())
    }

    fn get_all_symptoms(&self) -> Result<Vec<String>, ApiError> {
        debug!(base_url = %self.base_url, "fetching symptom list");
        let symptoms: Option<Vec<String>> =
            self.send_json(self.client.get(self.url("get_all_symptoms")))?;
        Ok(symptoms.unwrap_or_default())
    }

    fn get_symptoms_by_system(&self, system: &str) -> Result<Vec<String>, ApiError> {
        debug!(system, "fetching symptoms by system");
        let symptoms: Option<Vec<String>> = self.send_json(
            self.client
                .get(self.url("get_symptoms_by_system"))
                .query(&[("system", system)]),
        )?;
        Ok(symptoms.unwrap_or_default())
    }

    fn predict_agent(&self, request: &PredictRequest) -> Result<PredictResponse, ApiError> {
        debug!(symptoms = %request.symptoms, "requesting agent prediction");
        self.send_json(self.client.post(self.url("predict_agent")).json(request))
    }

    fn get_agent_details(&self, agent_name: &str) -> Result<Vec<DetailRecord>, ApiError> {
        debug!(agent_name, "fetching agent details");
        let rows: Option<Vec<DetailRecord>> = self.send_json(
            self.client
                .get(self.url("get_agent_details"))
                .query(&[("agent_name", agent_name)]),
        )?;
        Ok(rows.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let api = HttpPredictionApi::new("http://localhost:8000/", 30).unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url("predict_agent"), "http://localhost:8000/predict_agent");
    }

    #[test]
    fn test_unreachable_service_is_retrievable_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let api = HttpPredictionApi::new("http://127.0.0.1:9", 2).unwrap();
        let result = api.get_all_agents();

        assert!(result.is_err());
    }
}
