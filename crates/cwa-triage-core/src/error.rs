//! Error types shared across the triage workflow.

use thiserror::Error;

/// Errors from the remote prediction service.
///
/// Every variant is retrievable: the caller reports it for the current stage
/// and may ask again. Nothing here is retried automatically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Cannot connect to prediction service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Prediction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from prediction service: {0}")]
    ResponseParsing(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Workflow errors.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Prediction service error: {0}")]
    Api(#[from] ApiError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type TriageResult<T> = Result<T, TriageError>;

/// Outcome of a lookup that may legitimately come back empty.
///
/// Keeps "nothing found" apart from transport failures, which travel as
/// [`TriageError`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Found(T),
    NothingFound,
}

impl<T> Fetched<T> {
    /// Wrap a collection, mapping an empty one to `NothingFound`.
    pub fn from_vec<U>(items: Vec<U>, wrap: impl FnOnce(Vec<U>) -> T) -> Self {
        if items.is_empty() {
            Fetched::NothingFound
        } else {
            Fetched::Found(wrap(items))
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Fetched::Found(value) => Some(value),
            Fetched::NothingFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Fetched::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Found(value) => Fetched::Found(f(value)),
            Fetched::NothingFound => Fetched::NothingFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetched_from_empty_vec() {
        let fetched: Fetched<Vec<String>> = Fetched::from_vec(Vec::<String>::new(), |v| v);
        assert_eq!(fetched, Fetched::NothingFound);
        assert!(!fetched.is_found());
    }

    #[test]
    fn test_fetched_from_vec() {
        let fetched = Fetched::from_vec(vec!["Sarin".to_string()], |v| v.len());
        assert_eq!(fetched.found(), Some(1));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 400,
            body: "No matching data found for top agents".into(),
        };
        assert_eq!(
            err.to_string(),
            "Prediction service returned 400: No matching data found for top agents"
        );

        let wrapped: TriageError = err.into();
        assert!(wrapped.to_string().starts_with("Prediction service error"));
    }
}
