use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_weight() -> f64 {
    1.0
}

/// One raw data-source row for the globe datasets.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRow {
    pub lat: f64,
    pub lon: f64,
    #[serde(alias = "emissionValue")]
    pub value: f64,
    /// Region relevance in [0, 1]; absent in most datasets, so it defaults
    /// to a full pass-through.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// One binned cell of a globe snapshot.
///
/// Immutable once derived; a data update replaces the whole snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
    pub weight: f64,
}

#[derive(Default)]
struct CellAccumulator {
    value_sum: f64,
    weight_sum: f64,
    count: usize,
}

/// Bins raw rows into one-degree cells keyed by rounded lat/lon, averaging
/// value and weight per cell. Output order is deterministic (by cell key).
pub fn bin_rows(rows: &[EmissionRow]) -> Vec<GeoPoint> {
    let mut cells: BTreeMap<(i64, i64), CellAccumulator> = BTreeMap::new();
    for row in rows {
        if !row.lat.is_finite() || !row.lon.is_finite() || !row.value.is_finite() {
            continue;
        }
        let key = (row.lat.round() as i64, row.lon.round() as i64);
        let cell = cells.entry(key).or_default();
        cell.value_sum += row.value;
        cell.weight_sum += row.weight;
        cell.count += 1;
    }

    cells
        .into_iter()
        .map(|((lat, lon), cell)| {
            let n = cell.count as f64;
            GeoPoint {
                lat: lat as f64,
                lon: lon as f64,
                value: cell.value_sum / n,
                weight: cell.weight_sum / n,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{bin_rows, EmissionRow};

    fn row(lat: f64, lon: f64, value: f64) -> EmissionRow {
        EmissionRow {
            lat,
            lon,
            value,
            weight: 1.0,
        }
    }

    #[test]
    fn rows_in_one_cell_are_averaged() {
        let rows = [row(10.2, 20.1, 2.0), row(9.9, 19.8, 4.0)];
        let points = bin_rows(&rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].lat, 10.0);
        assert_eq!(points[0].lon, 20.0);
        assert_eq!(points[0].value, 3.0);
        assert_eq!(points[0].weight, 1.0);
    }

    #[test]
    fn distinct_cells_stay_separate_and_ordered() {
        let rows = [row(5.0, 7.0, 1.0), row(-3.0, 2.0, 2.0), row(5.0, -7.0, 3.0)];
        let points = bin_rows(&rows);
        assert_eq!(points.len(), 3);
        // BTreeMap order: (-3, 2), (5, -7), (5, 7)
        assert_eq!((points[0].lat, points[0].lon), (-3.0, 2.0));
        assert_eq!((points[1].lat, points[1].lon), (5.0, -7.0));
        assert_eq!((points[2].lat, points[2].lon), (5.0, 7.0));
    }

    #[test]
    fn non_finite_rows_are_skipped() {
        let rows = [row(f64::NAN, 0.0, 1.0), row(0.0, 0.0, f64::INFINITY), row(0.0, 0.0, 2.0)];
        let points = bin_rows(&rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 2.0);
    }

    #[test]
    fn weight_defaults_to_pass_through_when_absent() {
        let parsed: Vec<EmissionRow> =
            serde_json::from_str(r#"[{"lat": 1.0, "lon": 2.0, "emissionValue": 3.5}]"#).unwrap();
        assert_eq!(parsed[0].value, 3.5);
        assert_eq!(parsed[0].weight, 1.0);
    }
}
