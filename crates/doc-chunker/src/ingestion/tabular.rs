//! Row-to-text flattening for tabular inputs

use crate::types::{Metadata, TextUnit};

/// An ordered table: column names plus rows in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table; every row is expected to have one value per header
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as `(field, value)` pairs in column order
    pub fn records<'a>(
        &'a self,
    ) -> impl Iterator<Item = impl Iterator<Item = (&'a str, &'a str)> + 'a> + 'a {
        self.rows.iter().map(move |row| {
            self.headers
                .iter()
                .map(String::as_str)
                .zip(row.iter().map(String::as_str))
        })
    }
}

/// Flattens each table row into one text unit
pub struct TabularExtractor;

impl TabularExtractor {
    /// Render one record as `field1: value1 | field2: value2`
    ///
    /// Empty cells render as an empty value (`a: `), not a missing-value marker
    /// such as `nan`; normalization then trims the trailing space.
    pub fn row_text<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        fields
            .into_iter()
            .map(|(field, value)| format!("{}: {}", field, value))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// One unit per row, numbered from 1 in input order
    pub fn extract(table: &Table, file_name: &str) -> Vec<TextUnit> {
        let units: Vec<TextUnit> = table
            .records()
            .enumerate()
            .map(|(i, record)| {
                TextUnit::new(
                    &Self::row_text(record),
                    Metadata::row(file_name, i as u32 + 1),
                )
            })
            .collect();

        tracing::debug!("Flattened {} rows from {}", units.len(), file_name);
        units
    }
}
