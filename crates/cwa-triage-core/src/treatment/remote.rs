//! Treatment details from the prediction service.

use tracing::{debug, info};

use super::{DetailTable, TreatmentOutcome, TreatmentSource};
use crate::error::TriageResult;
use crate::remote::PredictionApi;

/// Looks up treatment rows via `/get_agent_details`.
pub struct RemoteTreatmentResolver<'a> {
    api: &'a dyn PredictionApi,
}

impl<'a> RemoteTreatmentResolver<'a> {
    pub fn new(api: &'a dyn PredictionApi) -> Self {
        Self { api }
    }
}

impl TreatmentSource for RemoteTreatmentResolver<'_> {
    fn resolve(&self, agent_name: &str) -> TriageResult<TreatmentOutcome> {
        let rows = self.api.get_agent_details(agent_name)?;

        match DetailTable::new(agent_name, rows) {
            Some(table) => {
                info!(agent_name, rows = table.rows().len(), "treatment details fetched");
                Ok(TreatmentOutcome::Details(table))
            }
            None => {
                debug!(agent_name, "no treatment details returned");
                Ok(TreatmentOutcome::NoTreatmentData)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::remote::MockPredictionApi;
    use serde_json::json;

    #[test]
    fn test_rows_become_detail_table() {
        let rows = serde_json::from_value(json!([{"gender": 0, "atropine_mg_initial": 2}])).unwrap();
        let api = MockPredictionApi::new().with_details("Sarin", rows);

        let outcome = RemoteTreatmentResolver::new(&api).resolve("Sarin").unwrap();
        let TreatmentOutcome::Details(table) = outcome else {
            panic!("expected details, got {:?}", outcome);
        };
        assert_eq!(table.agent, "Sarin");
        assert_eq!(table.display_rows(), vec![vec!["Female", "2"]]);
    }

    #[test]
    fn test_empty_list_is_no_treatment_data() {
        let api = MockPredictionApi::new();
        assert_eq!(
            RemoteTreatmentResolver::new(&api).resolve("Unknown").unwrap(),
            TreatmentOutcome::NoTreatmentData
        );
    }

    #[test]
    fn test_transport_failure_is_error() {
        let api = MockPredictionApi::new().failing_with(ApiError::Status {
            status: 500,
            body: "boom".into(),
        });
        assert!(RemoteTreatmentResolver::new(&api).resolve("Sarin").is_err());
    }
}
