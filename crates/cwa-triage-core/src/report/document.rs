//! Ordered line model and document export.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{TriageError, TriageResult};
use crate::models::{CaseReport, CLINICIAN_PLACEHOLDER};

/// Title line of every exported report.
pub const REPORT_TITLE: &str = "CWA Medical Case Report";

/// One line of a rendered report, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportLine {
    Title(String),
    Field { label: &'static str, value: String },
    Heading(&'static str),
    Item(String),
}

impl ReportLine {
    fn field(label: &'static str, value: impl Into<String>) -> Self {
        ReportLine::Field {
            label,
            value: value.into(),
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLine::Title(title) => write!(f, "{}", title),
            ReportLine::Field { label, value } => write!(f, "{}: {}", label, value),
            ReportLine::Heading(heading) => write!(f, "{}:", heading),
            ReportLine::Item(item) => write!(f, "  - {}", item),
        }
    }
}

fn or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(CLINICIAN_PLACEHOLDER).to_string()
}

/// Render a report to its ordered lines.
///
/// Order: title, case id, agent, classification and risk (when known),
/// gender, body system, symptoms, administered medicines, clinician,
/// generation timestamp.
pub fn render_lines(report: &CaseReport) -> Vec<ReportLine> {
    let mut lines = vec![
        ReportLine::Title(REPORT_TITLE.to_string()),
        ReportLine::field("Case ID", report.case_id.as_str()),
        ReportLine::field("Agent", report.agent.as_str()),
    ];

    if let Some(classification) = report.classification {
        lines.push(ReportLine::field("Classification", classification.to_string()));
    }
    if let Some(risk) = report.risk {
        lines.push(ReportLine::field("Risk Level", risk.to_string()));
    }

    lines.push(ReportLine::field(
        "Gender",
        or_placeholder(report.context.gender.as_deref()),
    ));
    lines.push(ReportLine::field(
        "Body System",
        or_placeholder(report.context.body_system.as_deref()),
    ));

    lines.push(ReportLine::Heading("Symptoms"));
    lines.extend(report.symptoms.iter().cloned().map(ReportLine::Item));

    lines.push(ReportLine::Heading("Medicines"));
    lines.extend(report.medicines.display_lines().into_iter().map(ReportLine::Item));

    lines.push(ReportLine::field("Clinician", report.clinician_display()));
    lines.push(ReportLine::field("Generated", report.generated_display()));
    lines
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Text,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "txt" | "text" => Ok(ExportFormat::Text),
            "json" => Ok(ExportFormat::Json),
            other => Err(TriageError::InvalidInput(format!(
                "Unknown export format: {}",
                other
            ))),
        }
    }
}

/// An exported report, ready to download or write to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    /// `<caseId>.<ext>`
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of `bytes`
    pub sha256: String,
}

impl ExportedDocument {
    fn new(report: &CaseReport, format: ExportFormat, bytes: Vec<u8>) -> Self {
        let sha256 = hex::encode(Sha256::digest(&bytes));
        Self {
            file_name: format!("{}.{}", report.case_id, format.extension()),
            format,
            bytes,
            sha256,
        }
    }

    /// Write the document into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> TriageResult<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|e| TriageError::Export(format!("Cannot create {}: {}", dir.display(), e)))?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)
            .map_err(|e| TriageError::Export(format!("Cannot write {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "report written");
        Ok(path)
    }
}

/// Plain-text rendering, one line per [`ReportLine`].
pub fn render_text(report: &CaseReport) -> String {
    let mut text = String::new();
    for line in render_lines(report) {
        text.push_str(&line.to_string());
        text.push('\n');
    }
    text
}

/// JSON rendering with keys in document order.
pub fn render_json(report: &CaseReport) -> TriageResult<String> {
    let mut doc = Map::new();
    doc.insert("title".into(), json!(REPORT_TITLE));
    doc.insert("case_id".into(), json!(report.case_id));
    doc.insert("agent".into(), json!(report.agent));
    if let Some(classification) = report.classification {
        doc.insert("classification".into(), json!(classification));
    }
    if let Some(risk) = report.risk {
        doc.insert("risk".into(), json!(risk));
    }
    doc.insert(
        "gender".into(),
        json!(or_placeholder(report.context.gender.as_deref())),
    );
    doc.insert(
        "body_system".into(),
        json!(or_placeholder(report.context.body_system.as_deref())),
    );
    doc.insert("symptoms".into(), json!(report.symptoms));

    // Raw names stay distinct even when display names collide
    let medicines: Vec<Value> = report
        .medicines
        .administered()
        .map(|m| {
            json!({
                "name": m.name,
                "display_name": m.display_name(),
                "dose": m.dose,
            })
        })
        .collect();
    doc.insert("medicines".into(), Value::Array(medicines));

    doc.insert("clinician".into(), json!(report.clinician_display()));
    doc.insert("generated_at".into(), json!(report.created_at.to_rfc3339()));

    Ok(serde_json::to_string_pretty(&Value::Object(doc))?)
}

/// Export a report. With no report there is nothing to export.
pub fn export_report(
    report: Option<&CaseReport>,
    format: ExportFormat,
) -> TriageResult<Option<ExportedDocument>> {
    let Some(report) = report else {
        debug!("export requested without a report, skipping");
        return Ok(None);
    };

    let bytes = match format {
        ExportFormat::Pdf => super::render_pdf(report)?,
        ExportFormat::Text => render_text(report).into_bytes(),
        ExportFormat::Json => render_json(report)?.into_bytes(),
    };

    let document = ExportedDocument::new(report, format, bytes);
    info!(
        case_id = %report.case_id,
        format = %format,
        bytes = document.bytes.len(),
        "report exported"
    );
    Ok(Some(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgentClass, DemographicContext, MedicineDoses, RiskLevel};
    use chrono::{TimeZone, Utc};

    fn make_report() -> CaseReport {
        CaseReport {
            case_id: "CWA-7Q2X9B".into(),
            agent: "VX Nerve Agent".into(),
            classification: Some(AgentClass::Chemical),
            risk: Some(RiskLevel::High),
            symptoms: vec!["Blurred Vision".into(), "Muscle Twitching".into()],
            context: DemographicContext::new(Some("Male".into()), Some("Nervous".into())),
            medicines: MedicineDoses::new()
                .with("atropine_mg_initial", 2.0)
                .with("hydroxocobalamin_g_initial", 0.0)
                .with("pralidoxime_mg_initial", 600.0),
            clinician: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_text_order() {
        let text = render_text(&make_report());
        let expected = "\
CWA Medical Case Report
Case ID: CWA-7Q2X9B
Agent: VX Nerve Agent
Classification: Chemical
Risk Level: High
Gender: Male
Body System: Nervous
Symptoms:
  - Blurred Vision
  - Muscle Twitching
Medicines:
  - atropine mg initial: 2
  - pralidoxime mg initial: 600
Clinician: N/A
Generated: 2024-03-09 14:05:00 UTC
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let mut report = make_report();
        report.classification = None;
        report.risk = None;
        report.context = DemographicContext::default();

        let lines = render_lines(&report);
        assert!(!lines.iter().any(|l| matches!(l, ReportLine::Field { label: "Risk Level", .. })));
        assert_eq!(lines[3], ReportLine::field("Gender", "N/A"));
    }

    #[test]
    fn test_render_json_keys_in_order() {
        let json = render_json(&make_report()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec![
                "title",
                "case_id",
                "agent",
                "classification",
                "risk",
                "gender",
                "body_system",
                "symptoms",
                "medicines",
                "clinician",
                "generated_at"
            ]
        );
        assert_eq!(
            value["medicines"],
            json!([
                {
                    "name": "atropine_mg_initial",
                    "display_name": "atropine mg initial",
                    "dose": 2.0
                },
                {
                    "name": "pralidoxime_mg_initial",
                    "display_name": "pralidoxime mg initial",
                    "dose": 600.0
                }
            ])
        );
    }

    #[test]
    fn test_render_json_keeps_colliding_display_names() {
        let mut report = make_report();
        report.medicines = MedicineDoses::new()
            .with("atropine_mg", 2.0)
            .with("atropine mg", 4.0);

        let value: Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        let medicines = value["medicines"].as_array().unwrap();
        assert_eq!(medicines.len(), report.medicines.display_lines().len());
        assert_eq!(medicines[0]["name"], "atropine_mg");
        assert_eq!(medicines[1]["name"], "atropine mg");
        assert_eq!(medicines[0]["display_name"], medicines[1]["display_name"]);
        assert_eq!(medicines[1]["dose"], 4.0);
    }

    #[test]
    fn test_render_json_placeholders_match_text() {
        let mut report = make_report();
        report.context = DemographicContext::default();

        let value: Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["gender"], "N/A");
        assert_eq!(value["body_system"], "N/A");
        assert!(render_text(&report).contains("Gender: N/A\nBody System: N/A\n"));
    }

    #[test]
    fn test_export_without_report_is_noop() {
        assert_eq!(export_report(None, ExportFormat::Pdf).unwrap(), None);
    }

    #[test]
    fn test_export_text_document() {
        let report = make_report();
        let doc = export_report(Some(&report), ExportFormat::Text)
            .unwrap()
            .unwrap();
        assert_eq!(doc.file_name, "CWA-7Q2X9B.txt");
        assert_eq!(doc.sha256.len(), 64);
        assert_eq!(doc.sha256, hex::encode(Sha256::digest(&doc.bytes)));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
