//! Tabular rendering of agent detail rows.

use serde_json::Value;

use crate::display::{display_key, format_number};
use crate::remote::DetailRecord;

/// Detail rows for one agent, with columns fixed by the first row.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailTable {
    pub agent: String,
    columns: Vec<String>,
    rows: Vec<DetailRecord>,
}

impl DetailTable {
    /// Build a table. Returns `None` for an empty row list.
    pub fn new(agent: impl Into<String>, rows: Vec<DetailRecord>) -> Option<Self> {
        let columns = rows.first()?.keys().cloned().collect();
        Some(Self {
            agent: agent.into(),
            columns,
            rows,
        })
    }

    /// Raw field names, in the first row's order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[DetailRecord] {
        &self.rows
    }

    /// Column headers for display: `atropine_mg_initial` → `Atropine Mg Initial`.
    pub fn display_headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| display_key(c)).collect()
    }

    /// Every row rendered to display strings, aligned with the columns.
    /// A field missing from a row renders empty.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| {
                        row.get(column)
                            .map(|value| render_cell(column, value))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }
}

/// Render one field value for display.
///
/// `gender` coded 0/1 becomes Female/Male. Numbers show as integers when
/// exact, otherwise with two decimals.
pub fn render_cell(key: &str, value: &Value) -> String {
    if key == "gender" {
        match value.as_f64() {
            Some(code) if code == 0.0 => return "Female".to_string(),
            Some(code) if code == 1.0 => return "Male".to_string(),
            _ => {}
        }
    }

    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_f64()
            .map(format_number)
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<DetailRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_rows_is_none() {
        assert!(DetailTable::new("Sarin", Vec::new()).is_none());
    }

    #[test]
    fn test_headers_follow_first_row() {
        let table = DetailTable::new(
            "Sarin",
            rows(json!([{"gender": 1, "atropine_mg_initial": 2, "human_system": "Nervous"}])),
        )
        .unwrap();

        assert_eq!(table.columns(), ["gender", "atropine_mg_initial", "human_system"]);
        assert_eq!(
            table.display_headers(),
            vec!["Gender", "Atropine Mg Initial", "Human System"]
        );
    }

    #[test]
    fn test_gender_decoding() {
        let table = DetailTable::new(
            "Sarin",
            rows(json!([
                {"gender": 0, "score": 0.5},
                {"gender": 1, "score": 0.333333},
                {"gender": 2, "score": 3.0}
            ])),
        )
        .unwrap();

        assert_eq!(
            table.display_rows(),
            vec![
                vec!["Female", "0.50"],
                vec!["Male", "0.33"],
                vec!["2", "3"],
            ]
        );
    }

    #[test]
    fn test_missing_field_renders_empty() {
        let table = DetailTable::new(
            "Chlorine",
            rows(json!([{"a": "x", "b": 1}, {"a": "y"}])),
        )
        .unwrap();
        assert_eq!(table.display_rows()[1], vec!["y", ""]);
    }

    #[test]
    fn test_render_cell_other_values() {
        assert_eq!(render_cell("note", &json!(null)), "");
        assert_eq!(render_cell("flag", &json!(true)), "true");
        assert_eq!(render_cell("gender", &json!("female")), "female");
    }
}
