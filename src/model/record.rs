use serde::{Deserialize, Serialize};

/// Identifier of a code, tag, or folder record
pub type RecordId = i64;

/// Id of the synthetic root node that owns every top-level record
pub const ROOT_ID: RecordId = -1;

/// Which taxonomy a record set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Code,
    Tag,
    Folder,
}

impl RecordKind {
    /// Label shown on the synthetic root when the caller doesn't supply one
    pub fn default_root_label(self) -> &'static str {
        match self {
            RecordKind::Code => "Codes",
            RecordKind::Tag => "Tags",
            RecordKind::Folder => "Folders",
        }
    }

    /// Parse a kind name (`code`, `codes`, `tag`, ...)
    pub fn from_name(s: &str) -> Option<RecordKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" | "codes" => Some(RecordKind::Code),
            "tag" | "tags" => Some(RecordKind::Tag),
            "folder" | "folders" => Some(RecordKind::Folder),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Code => write!(f, "code"),
            RecordKind::Tag => write!(f, "tag"),
            RecordKind::Folder => write!(f, "folder"),
        }
    }
}

/// A flat taxonomy entry as delivered by the data-fetch layer.
///
/// A `parent_id` that doesn't resolve to another record in the same set is
/// treated as "no parent": the record is shown at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub parent_id: Option<RecordId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Record {
    /// Create a top-level record
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Record {
            id,
            parent_id: None,
            name: name.into(),
            color: None,
        }
    }

    /// Builder-style parent assignment
    pub fn with_parent(mut self, parent_id: RecordId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// The synthetic root label record
    pub fn root(label: impl Into<String>) -> Self {
        Record::new(ROOT_ID, label)
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_without_parent() {
        let rec: Record = serde_json::from_str(r#"{"id": 3, "name": "Emotion"}"#).unwrap();
        assert_eq!(rec, Record::new(3, "Emotion"));
    }

    #[test]
    fn test_record_deserializes_null_parent_and_color() {
        let rec: Record =
            serde_json::from_str(r##"{"id": 4, "parent_id": null, "name": "Joy", "color": "#ffcc00"}"##)
                .unwrap();
        assert_eq!(rec.parent_id, None);
        assert_eq!(rec.color.as_deref(), Some("#ffcc00"));
    }

    #[test]
    fn test_record_serialization_skips_missing_color() {
        let json = serde_json::to_string(&Record::new(1, "A").with_parent(7)).unwrap();
        assert_eq!(json, r#"{"id":1,"parent_id":7,"name":"A"}"#);
    }

    #[test]
    fn test_root_record() {
        let root = Record::root("Codes");
        assert!(root.is_root());
        assert_eq!(root.parent_id, None);
        assert!(!Record::new(1, "x").is_root());
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(RecordKind::from_name("Codes"), Some(RecordKind::Code));
        assert_eq!(RecordKind::from_name("tag"), Some(RecordKind::Tag));
        assert_eq!(RecordKind::from_name(" folders "), Some(RecordKind::Folder));
        assert_eq!(RecordKind::from_name("document"), None);
        assert_eq!(RecordKind::Folder.default_root_label(), "Folders");
    }
}
