use std::collections::BTreeMap;

use crate::rows::EmissionRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    UnknownKey(String),
    Parse(String),
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::UnknownKey(key) => write!(f, "unknown data key: {key}"),
            DataError::Parse(msg) => write!(f, "data parse error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {}

/// The data-source boundary: rows by file key.
///
/// Fetching is the host's concern; the engine only sees parsed rows. Callers
/// memoize results in the `SnapshotStore`, so a source is never asked for the
/// same key twice in a session unless the first fetch failed.
pub trait DataSource {
    fn fetch(&mut self, key: &str) -> Result<Vec<EmissionRow>, DataError>;
}

/// Source backed by preloaded row tables, used by tests and the demo player.
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    tables: BTreeMap<String, Vec<EmissionRow>>,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rows(&mut self, key: impl Into<String>, rows: Vec<EmissionRow>) {
        self.tables.insert(key.into(), rows);
    }

    pub fn insert_json(&mut self, key: impl Into<String>, json: &str) -> Result<(), DataError> {
        let rows: Vec<EmissionRow> =
            serde_json::from_str(json).map_err(|e| DataError::Parse(e.to_string()))?;
        self.tables.insert(key.into(), rows);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl DataSource for InMemoryDataSource {
    fn fetch(&mut self, key: &str) -> Result<Vec<EmissionRow>, DataError> {
        self.tables
            .get(key)
            .cloned()
            .ok_or_else(|| DataError::UnknownKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{DataError, DataSource, InMemoryDataSource};

    #[test]
    fn fetch_returns_inserted_rows() {
        let mut source = InMemoryDataSource::new();
        source
            .insert_json("em-1952", r#"[{"lat": 50.0, "lon": 0.0, "value": 1.5}]"#)
            .unwrap();
        let rows = source.fetch("em-1952").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 1.5);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let mut source = InMemoryDataSource::new();
        let err = source.fetch("missing").unwrap_err();
        assert_eq!(err, DataError::UnknownKey("missing".to_string()));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let mut source = InMemoryDataSource::new();
        let err = source.insert_json("bad", "not json").unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }
}
