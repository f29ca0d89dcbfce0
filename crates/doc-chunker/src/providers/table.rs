//! Tabular loading (CSV)

use std::path::Path;

use crate::error::{Error, Result};
use crate::ingestion::Table;

/// Trait for loading a header + rows table from a file
pub trait TableLoader: Send + Sync {
    /// Load the whole table; any malformed row fails the file
    fn load(&self, path: &Path) -> Result<Table>;
}

/// CSV loader: first record is the header, rows must match its width
#[derive(Debug, Clone)]
pub struct CsvTableLoader {
    delimiter: u8,
}

impl CsvTableLoader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for CsvTableLoader {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TableLoader for CsvTableLoader {
    fn load(&self, path: &Path) -> Result<Table> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_path(path)
            .map_err(|e| Error::tabular(&filename, e.to_string()))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::tabular(&filename, e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::tabular(&filename, e.to_string()))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!("Loaded {} rows x {} columns from {}", rows.len(), headers.len(), filename);
        Ok(Table::new(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, "name,age\nAda,36\n\"Hopper, Grace\",85\n").unwrap();

        let table = CsvTableLoader::default().load(&path).unwrap();
        assert_eq!(table.headers(), ["name".to_string(), "age".to_string()]);
        assert_eq!(table.len(), 2);

        let second: Vec<_> = table.records().nth(1).unwrap().collect();
        assert_eq!(second, vec![("name", "Hopper, Grace"), ("age", "85")]);
    }

    #[test]
    fn test_ragged_row_fails_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "a,b\n1,2\n3\n").unwrap();

        let err = CsvTableLoader::default().load(&path).unwrap_err();
        assert!(matches!(err, Error::TabularParse { ref filename, .. } if filename == "bad.csv"));
    }

    #[test]
    fn test_missing_file_is_tabular_error() {
        let err = CsvTableLoader::default()
            .load(Path::new("/definitely/missing.csv"))
            .unwrap_err();
        assert!(err.is_fatal_for_file());
    }
}
