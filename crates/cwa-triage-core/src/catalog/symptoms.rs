//! Symptom catalog: builtin sample list, or fetched whole or by body system.

use strsim::{jaro_winkler, normalized_levenshtein};
use tracing::debug;

use crate::error::{Fetched, TriageResult};
use crate::models::{symptom_key, Symptom};
use crate::remote::PredictionApi;

/// Minimum similarity for a suggestion.
const MIN_SUGGESTION_SCORE: f64 = 0.75;

/// A list of selectable symptoms.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomCatalog {
    symptoms: Vec<Symptom>,
}

impl Default for SymptomCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SymptomCatalog {
    /// Create a catalog. Duplicate names (any casing) keep the first entry.
    pub fn new(symptoms: Vec<Symptom>) -> Self {
        let mut catalog = Self {
            symptoms: Vec::with_capacity(symptoms.len()),
        };
        for symptom in symptoms {
            if catalog.canonicalize(&symptom.name).is_none() {
                catalog.symptoms.push(symptom);
            }
        }
        catalog
    }

    /// The builtin sample catalog.
    pub fn builtin() -> Self {
        Self::new(default_symptoms())
    }

    /// Fetch every symptom the prediction service knows.
    ///
    /// Entries may arrive comma-joined (`"Coughing, Headache"`); they are
    /// split and trimmed, and duplicates keep their first occurrence.
    pub fn fetch_all(api: &dyn PredictionApi) -> TriageResult<Fetched<SymptomCatalog>> {
        let names: Vec<String> = api
            .get_all_symptoms()?
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
        debug!(count = names.len(), "fetched remote symptom list");
        Ok(Fetched::from_vec(names, |names| {
            Self::new(names.into_iter().map(Symptom::new).collect())
        }))
    }

    /// Fetch the symptoms of one body system from the prediction service.
    pub fn fetch_by_system(
        api: &dyn PredictionApi,
        system: &str,
    ) -> TriageResult<Fetched<SymptomCatalog>> {
        let names = api.get_symptoms_by_system(system)?;
        debug!(system, count = names.len(), "fetched remote symptoms");
        Ok(Fetched::from_vec(names, |names| {
            Self::new(
                names
                    .into_iter()
                    .map(|name| Symptom::in_system(name, system))
                    .collect(),
            )
        }))
    }

    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    pub fn names(&self) -> Vec<&str> {
        self.symptoms.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Symptoms of one body system.
    pub fn by_system(&self, system: &str) -> Vec<&Symptom> {
        self.symptoms
            .iter()
            .filter(|s| s.is_in_system(system))
            .collect()
    }

    /// Distinct body systems in catalog order.
    pub fn systems(&self) -> Vec<&str> {
        let mut systems: Vec<&str> = Vec::new();
        for system in self.symptoms.iter().filter_map(|s| s.body_system.as_deref()) {
            if !systems.contains(&system) {
                systems.push(system);
            }
        }
        systems
    }

    /// Catalog spelling of a symptom name entered in any casing.
    pub fn canonicalize(&self, input: &str) -> Option<&str> {
        let key = symptom_key(input);
        self.symptoms
            .iter()
            .find(|s| symptom_key(&s.name) == key)
            .map(|s| s.name.as_str())
    }

    /// Closest catalog names to a misspelled input, best first.
    pub fn suggest(&self, input: &str, limit: usize) -> Vec<&str> {
        let key = symptom_key(input);
        let mut scored: Vec<(&str, f64)> = self
            .symptoms
            .iter()
            .map(|s| (s.name.as_str(), fuzzy_match(&key, &symptom_key(&s.name))))
            .filter(|(_, score)| *score >= MIN_SUGGESTION_SCORE)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(limit).map(|(name, _)| name).collect()
    }
}

/// Combined Jaro-Winkler / Levenshtein similarity.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}

/// Default symptom list, grouped by body system.
fn default_symptoms() -> Vec<Symptom> {
    vec![
        // Nervous
        Symptom::in_system("Headache", "Nervous"),
        Symptom::in_system("Muscle Twitching", "Nervous"),
        Symptom::in_system("Seizures", "Nervous"),
        Symptom::in_system("Confusion", "Nervous"),
        Symptom::in_system("Muscle Weakness", "Nervous"),
        // Ocular
        Symptom::in_system("Blurred Vision", "Ocular"),
        Symptom::in_system("Dilated Pupils", "Ocular"),
        Symptom::in_system("Pinpoint Pupils", "Ocular"),
        Symptom::in_system("Eye Irritation", "Ocular"),
        // Respiratory
        Symptom::in_system("Shortness of Breath", "Respiratory"),
        Symptom::in_system("Coughing", "Respiratory"),
        Symptom::in_system("Chest Tightness", "Respiratory"),
        // Gastrointestinal
        Symptom::in_system("Nausea", "Gastrointestinal"),
        Symptom::in_system("Vomiting", "Gastrointestinal"),
        Symptom::in_system("Difficulty Swallowing", "Gastrointestinal"),
        // Skin
        Symptom::in_system("Excessive Sweating", "Skin"),
        Symptom::in_system("Skin Irritation", "Skin"),
        Symptom::in_system("Blistering", "Skin"),
        // Cardiovascular
        Symptom::in_system("Rapid Heart Rate", "Cardiovascular"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::remote::MockPredictionApi;

    #[test]
    fn test_builtin_includes_selection_screen_symptoms() {
        let catalog = SymptomCatalog::builtin();
        for name in [
            "Nausea",
            "Headache",
            "Shortness of Breath",
            "Muscle Twitching",
            "Blurred Vision",
            "Excessive Sweating",
            "Skin Irritation",
            "Dilated Pupils",
        ] {
            assert_eq!(catalog.canonicalize(name), Some(name));
        }
    }

    #[test]
    fn test_canonicalize_any_casing() {
        let catalog = SymptomCatalog::builtin();
        assert_eq!(catalog.canonicalize(" blurred VISION"), Some("Blurred Vision"));
        assert_eq!(catalog.canonicalize("Hiccups"), None);
    }

    #[test]
    fn test_duplicates_dropped() {
        let catalog = SymptomCatalog::new(vec![Symptom::new("Nausea"), Symptom::new("nausea")]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_by_system_and_systems() {
        let catalog = SymptomCatalog::builtin();
        let respiratory: Vec<&str> = catalog
            .by_system("respiratory")
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(
            respiratory,
            vec!["Shortness of Breath", "Coughing", "Chest Tightness"]
        );
        assert_eq!(catalog.systems().first(), Some(&"Nervous"));
        assert_eq!(catalog.systems().len(), 6);
    }

    #[test]
    fn test_suggest_typo() {
        let catalog = SymptomCatalog::builtin();
        let suggestions = catalog.suggest("blured vison", 3);
        assert_eq!(suggestions.first(), Some(&"Blurred Vision"));

        assert!(catalog.suggest("zzzzzzzz", 3).is_empty());
    }

    #[test]
    fn test_fetch_by_system() {
        let api = MockPredictionApi::new()
            .with_symptoms("Respiratory", vec!["Coughing".into(), "Wheezing".into()]);

        let fetched = SymptomCatalog::fetch_by_system(&api, "Respiratory").unwrap();
        let catalog = fetched.found().unwrap();
        assert_eq!(catalog.names(), vec!["Coughing", "Wheezing"]);
        assert_eq!(catalog.by_system("Respiratory").len(), 2);
    }

    #[test]
    fn test_fetch_by_system_empty_is_nothing_found() {
        let api = MockPredictionApi::new();
        let fetched = SymptomCatalog::fetch_by_system(&api, "Ocular").unwrap();
        assert_eq!(fetched, Fetched::NothingFound);
    }

    #[test]
    fn test_fetch_by_system_transport_error() {
        let api = MockPredictionApi::new().failing_with(ApiError::Timeout(30));
        assert!(SymptomCatalog::fetch_by_system(&api, "Ocular").is_err());
    }

    #[test]
    fn test_fetch_all_splits_joined_entries() {
        let api = MockPredictionApi::new().with_all_symptoms(vec![
            "Blurred Vision".into(),
            "Coughing, Headache".into(),
            "headache".into(),
            " , ".into(),
        ]);

        let catalog = SymptomCatalog::fetch_all(&api).unwrap().found().unwrap();
        assert_eq!(catalog.names(), vec!["Blurred Vision", "Coughing", "Headache"]);
        assert!(catalog.symptoms().iter().all(|s| s.body_system.is_none()));
    }

    #[test]
    fn test_fetch_all_empty_is_nothing_found() {
        let api = MockPredictionApi::new().with_all_symptoms(vec![" ".into()]);
        assert_eq!(SymptomCatalog::fetch_all(&api).unwrap(), Fetched::NothingFound);
    }
}
