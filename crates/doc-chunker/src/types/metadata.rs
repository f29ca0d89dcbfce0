//! Provenance metadata carried by text units and chunks

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Where a unit sits inside its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// 1-based page number
    Page(u32),
    /// 1-based row number
    Row(u32),
}

impl Position {
    /// Metadata key this position serializes under
    pub fn key(&self) -> &'static str {
        match self {
            Self::Page(_) => "page",
            Self::Row(_) => "row",
        }
    }

    /// The 1-based index
    pub fn index(&self) -> u32 {
        match self {
            Self::Page(n) | Self::Row(n) => *n,
        }
    }
}

/// Source document type (`type` key)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceType {
    Pdf,
    Csv,
    /// Any other value supplied by an external caller
    Other(String),
}

impl SourceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for SourceType {
    fn from(value: &str) -> Self {
        match value {
            "pdf" => Self::Pdf,
            "csv" => Self::Csv,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit metadata: the known provenance fields plus anything else the caller attached
///
/// Serializes to and from a flat JSON object such as
/// `{"file_name": "a.pdf", "page": 3, "type": "pdf"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Metadata {
    pub file_name: Option<String>,
    pub position: Option<Position>,
    pub source_type: Option<SourceType>,
    /// Extractor- or caller-specific fields
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Metadata for one PDF page
    pub fn page(file_name: impl Into<String>, page: u32) -> Self {
        Self {
            file_name: Some(file_name.into()),
            position: Some(Position::Page(page)),
            source_type: Some(SourceType::Pdf),
            extra: Map::new(),
        }
    }

    /// Metadata for one table row
    pub fn row(file_name: impl Into<String>, row: u32) -> Self {
        Self {
            file_name: Some(file_name.into()),
            position: Some(Position::Row(row)),
            source_type: Some(SourceType::Csv),
            extra: Map::new(),
        }
    }

    /// Attach an extra field
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// `type` value, or `"unknown"` when absent
    pub fn source_type_or_unknown(&self) -> String {
        self.source_type
            .as_ref()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Flatten into a JSON object
    pub fn to_map(&self) -> Map<String, Value> {
        Map::from(self.clone())
    }
}

fn as_index(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}

impl From<Map<String, Value>> for Metadata {
    fn from(mut map: Map<String, Value>) -> Self {
        let file_name = match map.shift_remove("file_name") {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                map.insert("file_name".to_string(), other);
                None
            }
            None => None,
        };

        let position = if let Some(page) = map.get("page").and_then(as_index) {
            map.shift_remove("page");
            Some(Position::Page(page))
        } else if let Some(row) = map.get("row").and_then(as_index) {
            map.shift_remove("row");
            Some(Position::Row(row))
        } else {
            None
        };

        let source_type = match map.get("type").and_then(Value::as_str) {
            Some(t) => {
                let t = SourceType::from(t);
                map.shift_remove("type");
                Some(t)
            }
            None => None,
        };

        Self {
            file_name,
            position,
            source_type,
            extra: map,
        }
    }
}

impl From<Metadata> for Map<String, Value> {
    fn from(meta: Metadata) -> Self {
        let mut map = Map::new();
        if let Some(file_name) = meta.file_name {
            map.insert("file_name".to_string(), Value::String(file_name));
        }
        if let Some(position) = meta.position {
            map.insert(position.key().to_string(), Value::from(position.index()));
        }
        if let Some(source_type) = meta.source_type {
            map.insert("type".to_string(), Value::String(source_type.as_str().to_string()));
        }
        // Known keys first, then extras in insertion order
        map.extend(meta.extra);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_metadata_serializes_flat() {
        let meta = Metadata::page("report.pdf", 3);
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            json!({"file_name": "report.pdf", "page": 3, "type": "pdf"})
        );
    }

    #[test]
    fn test_known_keys_are_lifted_out_of_map() {
        let meta: Metadata = serde_json::from_value(json!({
            "file_name": "rows.csv",
            "row": 7,
            "type": "csv",
            "sheet": "Q3"
        }))
        .unwrap();

        assert_eq!(meta.file_name.as_deref(), Some("rows.csv"));
        assert_eq!(meta.position, Some(Position::Row(7)));
        assert_eq!(meta.source_type, Some(SourceType::Csv));
        assert_eq!(meta.extra.get("sheet"), Some(&json!("Q3")));
        assert_eq!(meta.extra.len(), 1);
    }

    #[test]
    fn test_unrecognised_values_stay_in_extra() {
        let meta: Metadata = serde_json::from_value(json!({
            "page": "three",
            "type": "html"
        }))
        .unwrap();

        assert_eq!(meta.position, None);
        assert_eq!(meta.extra.get("page"), Some(&json!("three")));
        assert_eq!(meta.source_type, Some(SourceType::Other("html".to_string())));
        assert_eq!(meta.source_type_or_unknown(), "html");
        assert_eq!(Metadata::default().source_type_or_unknown(), "unknown");
    }

    #[test]
    fn test_extra_keys_keep_insertion_order() {
        let meta = Metadata::page("a.pdf", 1)
            .with_extra("zeta", 1)
            .with_extra("alpha", 2);
        assert_eq!(
            serde_json::to_string(&meta).unwrap(),
            r#"{"file_name":"a.pdf","page":1,"type":"pdf","zeta":1,"alpha":2}"#
        );

        let parsed: Metadata =
            serde_json::from_str(r#"{"zeta":1,"file_name":"a.pdf","mid":true,"page":1,"alpha":2}"#)
                .unwrap();
        let keys: Vec<_> = parsed.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "mid", "alpha"]);
    }
}
