//! Query-string handoff between workflow stages.
//!
//! Each stage receives its input as a query string:
//!
//! ```text
//! diagnosis  ?symptoms=Blurred%20Vision,Nausea&gender=male&system=Ocular
//! treatment  ?agent=Sarin&symptoms=Headache
//! report     ?agent=Sarin&symptoms=...&gender=...&system=...&medicines=%7B...%7D
//! ```
//!
//! Symptom names are percent-encoded one by one and then comma-joined, so a
//! comma inside a name survives the trip. Values use the same escaping as a
//! browser's `encodeURIComponent`. Decoding never fails: malformed input is
//! recovered to an empty value.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use tracing::warn;

use crate::models::{DemographicContext, DiagnosisQuery, MedicineDoses};

/// Characters escaped in a URI component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Decode a URI component; `+` is read as a space.
pub fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Encode a symptom list: each name escaped, then comma-joined.
pub fn encode_symptom_list(symptoms: &[String]) -> String {
    symptoms
        .iter()
        .map(|s| encode_component(s))
        .collect::<Vec<_>>()
        .join(",")
}

/// Decode a symptom list, dropping empty entries.
pub fn decode_symptom_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(decode_component)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Encode a medicine mapping as an escaped JSON object.
pub fn encode_medicines(medicines: &MedicineDoses) -> String {
    let json = Value::Object(medicines.to_json_map()).to_string();
    encode_component(&json)
}

/// Decode an escaped JSON medicine object. Anything malformed yields an
/// empty mapping.
pub fn decode_medicines(raw: &str) -> MedicineDoses {
    let json = decode_component(raw);
    match serde_json::from_str::<Value>(&json) {
        Ok(Value::Object(map)) => MedicineDoses::from_json_map(&map),
        Ok(other) => {
            warn!(
                kind = json_kind(&other),
                "medicines handoff is not an object, using empty mapping"
            );
            MedicineDoses::new()
        }
        Err(e) => {
            warn!(error = %e, "malformed medicines handoff, using empty mapping");
            MedicineDoses::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Raw (still escaped) key/value pairs of a query string.
struct QueryParams<'a> {
    pairs: Vec<(String, &'a str)>,
}

impl<'a> QueryParams<'a> {
    fn parse(query: &'a str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (decode_component(key), value),
                None => (decode_component(pair), ""),
            })
            .collect();
        Self { pairs }
    }

    /// First raw value for `key`.
    fn raw(&self, key: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| *value)
    }

    /// First decoded, non-blank value for `key`.
    fn text(&self, key: &str) -> Option<String> {
        self.raw(key)
            .map(decode_component)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn symptoms(&self) -> Vec<String> {
        self.raw("symptoms").map(decode_symptom_list).unwrap_or_default()
    }
}

/// Builds `key=value&...`, skipping absent optional values.
#[derive(Default)]
struct QueryBuilder {
    parts: Vec<String>,
}

impl QueryBuilder {
    fn raw(mut self, key: &str, encoded: String) -> Self {
        self.parts.push(format!("{}={}", key, encoded));
        self
    }

    fn text(self, key: &str, value: &str) -> Self {
        self.raw(key, encode_component(value))
    }

    fn optional(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.text(key, v),
            None => self,
        }
    }

    fn build(self) -> String {
        self.parts.join("&")
    }
}

/// Symptom selection handed to the diagnosis stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosisHandoff {
    pub symptoms: Vec<String>,
    pub gender: Option<String>,
    pub system: Option<String>,
}

impl DiagnosisHandoff {
    pub fn to_query(&self) -> String {
        QueryBuilder::default()
            .raw("symptoms", encode_symptom_list(&self.symptoms))
            .optional("gender", self.gender.as_deref())
            .optional("system", self.system.as_deref())
            .build()
    }

    pub fn from_query(query: &str) -> Self {
        let params = QueryParams::parse(query);
        Self {
            symptoms: params.symptoms(),
            gender: params.text("gender"),
            system: params.text("system"),
        }
    }

    /// The matcher input carried by this handoff.
    pub fn to_diagnosis_query(&self) -> DiagnosisQuery {
        DiagnosisQuery::new(self.symptoms.clone()).with_context(DemographicContext::new(
            self.gender.clone(),
            self.system.clone(),
        ))
    }
}

impl From<&DiagnosisQuery> for DiagnosisHandoff {
    fn from(query: &DiagnosisQuery) -> Self {
        Self {
            symptoms: query.symptoms.clone(),
            gender: query.context.gender.clone(),
            system: query.context.body_system.clone(),
        }
    }
}

/// Chosen agent handed to the treatment stage.
#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentHandoff {
    pub agent: String,
    pub symptoms: Vec<String>,
}

impl TreatmentHandoff {
    pub fn to_query(&self) -> String {
        let builder = QueryBuilder::default().text("agent", &self.agent);
        if self.symptoms.is_empty() {
            builder.build()
        } else {
            builder
                .raw("symptoms", encode_symptom_list(&self.symptoms))
                .build()
        }
    }

    /// `None` when no agent was handed over.
    pub fn from_query(query: &str) -> Option<Self> {
        let params = QueryParams::parse(query);
        Some(Self {
            agent: params.text("agent")?,
            symptoms: params.symptoms(),
        })
    }
}

/// Diagnosis outcome handed to the report stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHandoff {
    pub agent: String,
    pub symptoms: Vec<String>,
    pub gender: Option<String>,
    pub system: Option<String>,
    pub medicines: MedicineDoses,
}

impl ReportHandoff {
    pub fn to_query(&self) -> String {
        QueryBuilder::default()
            .text("agent", &self.agent)
            .raw("symptoms", encode_symptom_list(&self.symptoms))
            .optional("gender", self.gender.as_deref())
            .optional("system", self.system.as_deref())
            .raw("medicines", encode_medicines(&self.medicines))
            .build()
    }

    /// `None` when no agent was handed over. A malformed `medicines` value
    /// becomes an empty mapping.
    pub fn from_query(query: &str) -> Option<Self> {
        let params = QueryParams::parse(query);
        Some(Self {
            agent: params.text("agent")?,
            symptoms: params.symptoms(),
            gender: params.text("gender"),
            system: params.text("system"),
            medicines: params
                .raw("medicines")
                .map(decode_medicines)
                .unwrap_or_default(),
        })
    }

    pub fn context(&self) -> DemographicContext {
        DemographicContext::new(self.gender.clone(), self.system.clone())
    }
}
