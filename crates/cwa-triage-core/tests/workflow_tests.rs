//! End-to-end workflow tests: selection through exported document.

use serde_json::json;
use tempfile::TempDir;

use cwa_triage_core::remote::MockPredictionApi;
use cwa_triage_core::report::{is_well_formed_case_id, render_text};
use cwa_triage_core::treatment::StaticTreatmentTable;
use cwa_triage_core::{
    export_report, AgentDirectory, ApiError, DemographicContext, DiagnosisHandoff, ExportFormat,
    LocalMatcher, MatchOutcome, MedicineDoses, RandomCaseIds, RemoteMatcher, ReportComposer,
    ReportHandoff, ReportRequest, SymptomSelection, TreatmentOutcome, TriageEngine, TriageError,
};

#[test]
fn test_local_workflow_to_pdf_on_disk() {
    let directory = AgentDirectory::builtin();
    let mut selection = SymptomSelection::new();
    for symptom in ["Blurred Vision", "Excessive Sweating", "Muscle Twitching"] {
        selection.toggle(symptom);
    }
    selection.set_context(DemographicContext::new(
        Some("Male".into()),
        Some("Nervous".into()),
    ));

    let diagnosis = selection.diagnose(&LocalMatcher::new(&directory)).unwrap();
    let chosen = diagnosis.choose_best().unwrap();
    assert_eq!(chosen.name(), "VX Nerve Agent");

    let treatment = chosen
        .resolve_treatment(&StaticTreatmentTable::from_directory(&directory))
        .unwrap();
    assert!(matches!(treatment, TreatmentOutcome::Protocol(_)));

    let report = chosen
        .compose_report(&ReportComposer::default(), "Dr. Okafor")
        .unwrap();
    let document = export_report(Some(&report), ExportFormat::Pdf)
        .unwrap()
        .unwrap();

    let dir = TempDir::new().unwrap();
    let path = document.write_to(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap().to_str().unwrap(), format!("{}.pdf", report.case_id));

    let written = std::fs::read(&path).unwrap();
    assert!(written.starts_with(b"%PDF"));
    assert_eq!(written, document.bytes);
}

#[test]
fn test_report_text_omits_zero_doses() {
    let directory = AgentDirectory::builtin();
    let mut selection = SymptomSelection::new();
    selection.toggle("Coughing");
    selection.toggle("Chest Tightness");

    let diagnosis = selection.diagnose(&LocalMatcher::new(&directory)).unwrap();
    let report = diagnosis
        .choose("Chlorine")
        .unwrap()
        .compose_report(&ReportComposer::default(), "")
        .unwrap();

    let text = render_text(&report);
    assert!(text.contains("  - albuterol neb mg initial: 2.50\n"));
    assert!(text.contains("  - methylprednisolone mg initial: 125\n"));
    assert!(!text.contains("atropine"));
    assert!(text.contains("Clinician: N/A\n"));
}

#[test]
fn test_remote_workflow_through_handoffs() {
    let details = serde_json::from_value(json!([
        {"gender": 0, "human_system": "Respiratory", "atropine_mg_initial": 0, "score": 0.912},
        {"gender": 1, "human_system": "Respiratory", "atropine_mg_initial": 2, "score": 0.5}
    ]))
    .unwrap();
    let api = MockPredictionApi::new()
        .with_prediction(
            "Sarin",
            0.91,
            MedicineDoses::new()
                .with("atropine_mg_initial", 2.0)
                .with("hydroxocobalamin_g_initial", 0.0),
        )
        .with_details("Sarin", details);

    // Selection screen
    let mut selection = SymptomSelection::new();
    selection.toggle("Shortness of Breath");
    selection.toggle("Headache");
    selection.set_context(DemographicContext::new(
        Some("female".into()),
        Some("Respiratory".into()),
    ));
    let diagnosis_query = selection.to_handoff().to_query();

    // Diagnosis screen
    let selection = SymptomSelection::from_handoff(&DiagnosisHandoff::from_query(&diagnosis_query));
    let diagnosis = selection.diagnose(&RemoteMatcher::new(&api)).unwrap();
    assert!(matches!(diagnosis.outcome, MatchOutcome::Predicted(_)));
    let chosen = diagnosis.choose("Sarin").unwrap();

    let request = &api.predict_requests()[0];
    assert_eq!(request.symptoms, "Shortness of Breath, Headache");
    assert_eq!(request.human_system, "Respiratory");

    // Treatment screen
    let engine = TriageEngine::with_api(Box::new(
        MockPredictionApi::new().with_details(
            "Sarin",
            serde_json::from_value(json!([{"gender": 0, "score": 0.912}])).unwrap(),
        ),
    ));
    let TreatmentOutcome::Details(table) = engine.resolve_treatment(chosen.name()).unwrap() else {
        panic!("expected detail rows");
    };
    assert_eq!(table.display_headers(), vec!["Gender", "Score"]);
    assert_eq!(table.display_rows(), vec![vec!["Female", "0.91"]]);

    // Report screen
    let report_query = chosen.to_report_handoff().to_query();
    let handoff = ReportHandoff::from_query(&report_query).unwrap();
    let report = ReportComposer::default()
        .compose(
            ReportRequest::new(handoff.agent.clone())
                .with_symptoms(handoff.symptoms.clone())
                .with_context(handoff.context())
                .with_medicines(handoff.medicines.clone()),
        )
        .unwrap();
    assert_eq!(report.medicines.display_lines(), vec!["atropine mg initial: 2"]);
    assert_eq!(report.context.gender.as_deref(), Some("female"));
}

#[test]
fn test_remote_failures_are_retrievable() {
    let api = MockPredictionApi::new().failing_with(ApiError::Connection("http://triage".into()));
    let engine = TriageEngine::with_api(Box::new(api));

    let mut selection = SymptomSelection::new();
    selection.toggle("Nausea");
    assert!(matches!(
        engine.diagnose(&selection),
        Err(TriageError::Api(ApiError::Connection(_)))
    ));
    assert!(engine.resolve_treatment("Sarin").is_err());
    assert!(engine.agents().is_err());
}

#[test]
fn test_absent_agent_has_no_treatment_data() {
    let engine = TriageEngine::local();
    assert_eq!(
        engine.resolve_treatment("Not An Agent").unwrap(),
        TreatmentOutcome::NoTreatmentData
    );
}

#[test]
fn test_case_ids_well_formed_across_compositions() {
    let composer = ReportComposer::new(Box::new(RandomCaseIds));
    for n in 0..500 {
        let report = composer.compose(ReportRequest::new("Sarin")).unwrap();
        assert!(
            is_well_formed_case_id(&report.case_id),
            "composition {} produced {}",
            n,
            report.case_id
        );
    }
}

#[test]
fn test_export_without_report_produces_nothing() {
    for format in [ExportFormat::Pdf, ExportFormat::Text, ExportFormat::Json] {
        assert!(export_report(None, format).unwrap().is_none());
    }
}
