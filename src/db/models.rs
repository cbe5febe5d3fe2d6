//! Document model shared by every store backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{cmp::Ordering, fmt, str::FromStr};
use uuid::Uuid;

/// Field map of a schemaless record.
pub type Fields = Map<String, Value>;

/// Key under which the identifier is serialized.
pub const ID_FIELD: &str = "_id";

/// Store-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a path identifier. Anything that is not a UUID yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// A stored record: its identifier plus the schemaless fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: RecordId, fields: Fields) -> Self {
        Self { id, fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Shallow merge: keys in `patch` overwrite, everything else is kept.
    pub fn merge(&mut self, patch: Fields) {
        for (key, value) in patch {
            self.fields.insert(key, value);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

/// Equality filter plus optional ordering for `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub equals: Fields,
    pub sort: Option<Sort>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.equals.insert(field.to_string(), value.into());
        self
    }

    pub fn sort_by(mut self, field: &str, descending: bool) -> Self {
        self.sort = Some(Sort {
            field: field.to_string(),
            descending,
        });
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.equals
            .iter()
            .all(|(key, expected)| fields.get(key) == Some(expected))
    }

    /// Orders two documents by the sort field. Missing values sort lowest.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let Some(sort) = &self.sort else {
            return Ordering::Equal;
        };
        let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
        if sort.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => type_rank(x).cmp(&type_rank(y)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(fields: Value) -> Document {
        let Value::Object(fields) = fields else {
            panic!("fixture must be an object");
        };
        Document::new(RecordId::new(), fields)
    }

    #[test]
    fn test_record_id_rejects_non_uuid() {
        assert!(RecordId::parse("64b7f0c2e1a2b3c4d5e6f7a8").is_none());
        assert!(RecordId::parse("").is_none());
        let id = RecordId::new();
        assert_eq!(RecordId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn test_document_serializes_id_as_string() {
        let document = doc(json!({ "title": "Demo" }));
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["_id"], json!(document.id.to_string()));
        assert_eq!(value["title"], "Demo");
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut document = doc(json!({ "title": "A", "meta": { "a": 1, "b": 2 } }));
        let Value::Object(patch) = json!({ "meta": { "a": 3 } }) else {
            unreachable!()
        };
        document.merge(patch);
        assert_eq!(document.get("title"), Some(&json!("A")));
        assert_eq!(document.get("meta"), Some(&json!({ "a": 3 })));
    }

    #[test]
    fn test_filter_matches_exact_values() {
        let filter = Filter::all().eq("approved", true);
        assert!(filter.matches(&doc(json!({ "approved": true })).fields));
        assert!(!filter.matches(&doc(json!({ "approved": false })).fields));
        assert!(!filter.matches(&doc(json!({ "approved": "true" })).fields));
        assert!(!filter.matches(&doc(json!({})).fields));
    }

    #[test]
    fn test_descending_sort_puts_missing_last() {
        let filter = Filter::all().sort_by("createdAt", true);
        let mut docs = vec![
            doc(json!({ "n": 1 })),
            doc(json!({ "n": 2, "createdAt": "2024-01-01T00:00:00.000Z" })),
            doc(json!({ "n": 3, "createdAt": "2024-03-01T00:00:00.000Z" })),
        ];
        docs.sort_by(|a, b| filter.compare(a, b));
        let order: Vec<_> = docs.iter().map(|d| d.get("n").cloned().unwrap()).collect();
        assert_eq!(order, vec![json!(3), json!(2), json!(1)]);
    }
}
