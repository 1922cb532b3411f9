use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Parse(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "step catalog parse error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// First sight of the globe; cinematic styling, no data.
    Landing,
    /// Orbit approach; cinematic styling, no data.
    Approach,
    /// A narrative step with focus coordinate and datasets.
    Data,
}

/// Which of a step's datasets is active: the event year or a decade later.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum YearMode {
    #[default]
    Event,
    EventPlusTen,
}

/// One narrative step as declared by the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    pub id: String,
    pub step_type: StepType,
    /// `[lon, lat]` the globe rotates to on entry.
    #[serde(default)]
    pub focus: Option<[f64; 2]>,
    /// Data file key for the event year.
    #[serde(default)]
    pub data_key: Option<String>,
    /// Data file key for event + 10 years.
    #[serde(default)]
    pub late_data_key: Option<String>,
    #[serde(default)]
    pub chart_key: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub event_year: Option<i32>,
    /// Compute one color domain across all of this step's datasets.
    #[serde(default)]
    pub fixed_domain: bool,
}

impl StepSpec {
    pub fn active_data_key(&self, mode: YearMode) -> Option<&str> {
        match mode {
            YearMode::Event => self.data_key.as_deref(),
            YearMode::EventPlusTen => {
                self.late_data_key.as_deref().or(self.data_key.as_deref())
            }
        }
    }

    /// Every dataset belonging to the step, active or not.
    pub fn data_keys(&self) -> impl Iterator<Item = &str> {
        self.data_key
            .as_deref()
            .into_iter()
            .chain(self.late_data_key.as_deref())
    }

    pub fn has_data(&self) -> bool {
        self.data_key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCatalog {
    pub steps: Vec<StepSpec>,
}

impl StepCatalog {
    pub fn new(steps: Vec<StepSpec>) -> Self {
        Self { steps }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepSpec> {
        self.steps.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// The step whose snapshot is preloaded as soon as geometry is ready.
    pub fn first_data_step(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.has_data())
    }
}

#[cfg(test)]
mod tests {
    use super::{StepCatalog, StepType, YearMode};

    const CATALOG_JSON: &str = r#"{
        "steps": [
            {"id": "step-landing", "step_type": "landing"},
            {"id": "step-approach", "step_type": "approach"},
            {"id": "step-1952", "step_type": "data",
             "focus": [-120.0, 30.0],
             "data_key": "em-1952", "late_data_key": "em-1962",
             "chart_key": "series-west", "region": "Alba", "event_year": 1952,
             "fixed_domain": true}
        ]
    }"#;

    #[test]
    fn parses_catalog_with_optional_fields() {
        let catalog = StepCatalog::from_json(CATALOG_JSON).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(0).unwrap().step_type, StepType::Landing);
        assert!(catalog.get(0).unwrap().focus.is_none());

        let data = catalog.get(2).unwrap();
        assert_eq!(data.focus, Some([-120.0, 30.0]));
        assert!(data.fixed_domain);
        assert_eq!(data.data_keys().collect::<Vec<_>>(), vec!["em-1952", "em-1962"]);
    }

    #[test]
    fn year_mode_selects_the_active_key() {
        let catalog = StepCatalog::from_json(CATALOG_JSON).unwrap();
        let step = catalog.get(2).unwrap();
        assert_eq!(step.active_data_key(YearMode::Event), Some("em-1952"));
        assert_eq!(step.active_data_key(YearMode::EventPlusTen), Some("em-1962"));
    }

    #[test]
    fn year_mode_falls_back_when_late_key_is_missing() {
        let catalog = StepCatalog::from_json(
            r#"{"steps": [{"id": "s", "step_type": "data", "data_key": "only"}]}"#,
        )
        .unwrap();
        let step = catalog.get(0).unwrap();
        assert_eq!(step.active_data_key(YearMode::EventPlusTen), Some("only"));
    }

    #[test]
    fn first_data_step_skips_scene_setting_steps() {
        let catalog = StepCatalog::from_json(CATALOG_JSON).unwrap();
        assert_eq!(catalog.first_data_step(), Some(2));
        assert_eq!(catalog.index_of("step-approach"), Some(1));
        assert_eq!(catalog.index_of("nope"), None);
    }

    #[test]
    fn malformed_catalog_is_a_parse_error() {
        assert!(StepCatalog::from_json("[]").is_err());
    }
}
