//! Medicine-dose mappings.
//!
//! The prediction service returns doses as a JSON object keyed by medicine
//! name (e.g. `atropine_mg_initial`). Entry order is significant for display,
//! so the mapping is kept as an ordered list rather than a hash map.

use serde::de::{Deserializer, Error as _};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::display::format_number;

/// A single medicine and its recommended dose.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineDose {
    /// Medicine key as supplied (may contain underscores)
    pub name: String,
    /// Numeric dose; zero or negative means "not administered"
    pub dose: f64,
}

impl MedicineDose {
    pub fn new(name: impl Into<String>, dose: f64) -> Self {
        Self {
            name: name.into(),
            dose,
        }
    }

    /// Name with underscores replaced by spaces.
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }

    /// Only positive doses are ever rendered or exported.
    pub fn is_administered(&self) -> bool {
        self.dose > 0.0
    }

    /// `"atropine mg initial: 2"`
    pub fn display_line(&self) -> String {
        format!("{}: {}", self.display_name(), format_number(self.dose))
    }
}

/// Ordered medicine name → dose mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicineDoses(Vec<MedicineDose>);

impl MedicineDoses {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace a dose. A replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, dose: f64) {
        let name = name.into();
        match self.0.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.dose = dose,
            None => self.0.push(MedicineDose::new(name, dose)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, dose: f64) -> Self {
        self.insert(name, dose);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|m| m.name == name).map(|m| m.dose)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MedicineDose> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries with a positive dose, in original order.
    pub fn administered(&self) -> impl Iterator<Item = &MedicineDose> {
        self.0.iter().filter(|m| m.is_administered())
    }

    /// Display lines for every administered medicine.
    pub fn display_lines(&self) -> Vec<String> {
        self.administered().map(MedicineDose::display_line).collect()
    }

    /// Build from a JSON object. Non-numeric values count as a zero dose.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let mut doses = Self::new();
        for (name, value) in map {
            doses.insert(name.clone(), value_as_dose(value));
        }
        doses
    }

    /// Convert to a JSON object preserving entry order.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|m| (m.name.clone(), dose_to_value(m.dose)))
            .collect()
    }
}

impl FromIterator<(String, f64)> for MedicineDoses {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut doses = Self::new();
        for (name, dose) in iter {
            doses.insert(name, dose);
        }
        doses
    }
}

fn value_as_dose(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn dose_to_value(dose: f64) -> Value {
    serde_json::Number::from_f64(dose)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl Serialize for MedicineDoses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for medicine in &self.0 {
            map.serialize_entry(&medicine.name, &dose_to_value(medicine.dose))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MedicineDoses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self::from_json_map(&map)),
            Value::Null => Ok(Self::new()),
            other => Err(D::Error::custom(format!(
                "expected a medicine object, got {}",
                other
            ))),
        }
    }
}
