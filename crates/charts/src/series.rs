use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One time-series table row: a year plus one value column per region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub time: i32,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SeriesPoint {
    pub time: i32,
    pub value: f64,
}

/// A region's time series split at the step's event year, with the linear
/// scale extents the host needs to draw it.
///
/// Both segments include the event year itself, so the two styled lines
/// join at the split point.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    pub region: String,
    pub event_year: i32,
    pub pre: Vec<SeriesPoint>,
    pub post: Vec<SeriesPoint>,
    pub time_extent: (i32, i32),
    pub value_max: f64,
}

/// Extracts and splits one region's series. `None` when the region has no
/// column or the table is empty; the caller skips the chart update.
pub fn split_region_series(
    rows: &[SeriesRow],
    region: &str,
    event_year: i32,
) -> Option<RegionSeries> {
    let mut points: Vec<SeriesPoint> = rows
        .iter()
        .filter_map(|row| {
            row.values.get(region).map(|&value| SeriesPoint {
                time: row.time,
                value,
            })
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    points.sort_by_key(|p| p.time);

    let time_extent = (points[0].time, points[points.len() - 1].time);
    let value_max = points.iter().fold(0.0f64, |m, p| m.max(p.value));

    Some(RegionSeries {
        region: region.to_string(),
        event_year,
        pre: points.iter().copied().filter(|p| p.time <= event_year).collect(),
        post: points.iter().copied().filter(|p| p.time >= event_year).collect(),
        time_extent,
        value_max,
    })
}

#[cfg(test)]
mod tests {
    use super::{split_region_series, SeriesRow};

    fn table() -> Vec<SeriesRow> {
        serde_json::from_str(
            r#"[
                {"time": 1950, "Alba": 1.0, "Borea": 4.0},
                {"time": 1951, "Alba": 2.0, "Borea": 3.0},
                {"time": 1952, "Alba": 5.0, "Borea": 2.0},
                {"time": 1953, "Alba": 3.0, "Borea": 1.0}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn splits_at_event_year_with_shared_boundary() {
        let series = split_region_series(&table(), "Alba", 1951).unwrap();
        assert_eq!(series.pre.len(), 2);
        assert_eq!(series.post.len(), 3);
        assert_eq!(series.pre.last().unwrap().time, 1951);
        assert_eq!(series.post.first().unwrap().time, 1951);
        assert_eq!(series.time_extent, (1950, 1953));
        assert_eq!(series.value_max, 5.0);
    }

    #[test]
    fn missing_region_column_yields_none() {
        assert!(split_region_series(&table(), "Nowhere", 1951).is_none());
        assert!(split_region_series(&[], "Alba", 1951).is_none());
    }

    #[test]
    fn flattened_columns_parse_per_region() {
        let rows = table();
        assert_eq!(rows[0].values.get("Borea"), Some(&4.0));
        let borea = split_region_series(&rows, "Borea", 1953).unwrap();
        assert_eq!(borea.post.len(), 1);
        assert_eq!(borea.value_max, 4.0);
    }
}
