use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    Parse(String),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::Parse(msg) => write!(f, "geometry parse error: {msg}"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// One named landmass outline: polygon rings of `[lon, lat]` vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// Country outline collection for the globe draw pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub features: Vec<Feature>,
}

impl FeatureSet {
    pub fn from_json(json: &str) -> Result<Self, GeometryError> {
        serde_json::from_str(json).map_err(|e| GeometryError::Parse(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Sampling step along graticule lines, degrees.
const GRATICULE_STEP: f64 = 2.5;

/// Ten-degree graticule: meridians clipped to ±80° latitude plus parallels
/// every 10°, each as a polyline of `[lon, lat]` vertices.
pub fn graticule10() -> Vec<Vec<[f64; 2]>> {
    let mut lines = Vec::new();

    let mut lon = -180.0;
    while lon < 180.0 {
        let mut meridian = Vec::new();
        let mut lat = -80.0;
        while lat <= 80.0 {
            meridian.push([lon, lat]);
            lat += GRATICULE_STEP;
        }
        lines.push(meridian);
        lon += 10.0;
    }

    let mut lat = -80.0;
    while lat <= 80.0 {
        let mut parallel = Vec::new();
        let mut p_lon = -180.0;
        while p_lon <= 180.0 {
            parallel.push([p_lon, lat]);
            p_lon += GRATICULE_STEP;
        }
        lines.push(parallel);
        lat += 10.0;
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::{graticule10, FeatureSet, GeometryError};

    #[test]
    fn parses_feature_collection() {
        let json = r#"{
            "features": [
                {"name": "Testland", "rings": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]]}
            ]
        }"#;
        let set = FeatureSet::from_json(json).unwrap();
        assert_eq!(set.features.len(), 1);
        assert_eq!(set.features[0].name, "Testland");
        assert_eq!(set.features[0].rings[0].len(), 3);
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = FeatureSet::from_json("{").unwrap_err();
        assert!(matches!(err, GeometryError::Parse(_)));
    }

    #[test]
    fn graticule_has_meridians_and_parallels() {
        let lines = graticule10();
        // 36 meridians plus 17 parallels (-80..=80 by 10).
        assert_eq!(lines.len(), 36 + 17);
        for line in &lines {
            assert!(line.len() >= 2);
        }
    }
}
