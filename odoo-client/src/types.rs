//! Argument and result types of the record operations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Database id of a record
pub type RecordId = i64;

/// Authenticated user id
pub type Uid = i64;

/// A record as returned by `read`/`search_read`, or field values for `create`/`write`
pub type Record = Map<String, Value>;

/// Field definitions keyed by field name, as returned by `fields_get`
pub type FieldDefinitions = Map<String, Value>;

/// Either a single item or a list of items
///
/// Single/bulk call shapes are resolved at the boundary: the service always
/// works on the list form and only unwraps the answer for single input.
/// Deserializes from either a bare value or a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Whether the caller passed a single item
    pub fn is_one(&self) -> bool {
        matches!(self, OneOrMany::One(_))
    }

    /// Number of items
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize to the list form
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl From<RecordId> for OneOrMany<RecordId> {
    fn from(id: RecordId) -> Self {
        OneOrMany::One(id)
    }
}

impl From<Record> for OneOrMany<Record> {
    fn from(values: Record) -> Self {
        OneOrMany::One(values)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

impl<T: Clone> From<&[T]> for OneOrMany<T> {
    fn from(items: &[T]) -> Self {
        OneOrMany::Many(items.to_vec())
    }
}

impl<T, const N: usize> From<[T; N]> for OneOrMany<T> {
    fn from(items: [T; N]) -> Self {
        OneOrMany::Many(items.into())
    }
}

/// Result of `read`: one record (or nothing) for a single id, a list otherwise
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadResult {
    One(Option<Record>),
    Many(Vec<Record>),
}

impl ReadResult {
    /// All returned records as a list
    pub fn into_records(self) -> Vec<Record> {
        match self {
            ReadResult::One(record) => record.into_iter().collect(),
            ReadResult::Many(records) => records,
        }
    }

    /// Number of returned records
    pub fn len(&self) -> usize {
        match self {
            ReadResult::One(record) => usize::from(record.is_some()),
            ReadResult::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Offset, limit and ordering of a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub offset: u32,
    pub limit: Option<u32>,
    /// Passed to the server as-is, e.g. `"name asc, id desc"`
    pub order: Option<String>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Keyword arguments for `search`/`search_read`; unset limit and order are omitted
    pub(crate) fn to_kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        kwargs.insert("offset".to_string(), Value::from(self.offset));
        if let Some(limit) = self.limit {
            kwargs.insert("limit".to_string(), Value::from(limit));
        }
        if let Some(order) = &self.order {
            kwargs.insert("order".to_string(), Value::from(order.as_str()));
        }
        kwargs
    }
}

/// Entry of the model registry (`ir.model`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub id: RecordId,
    /// Technical name, e.g. `res.partner`
    pub model: String,
    /// Human-readable name
    pub name: String,
    /// Wizard models are transient
    #[serde(default)]
    pub transient: bool,
}

/// Overview of one model: registry entry, field count and a few well-known fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub info: ModelInfo,
    pub field_count: usize,
    /// `None` when the probe search failed (e.g. missing access rights)
    pub has_records: Option<bool>,
    /// Field name -> field type for the standard identification fields present
    pub key_fields: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_or_many_from() {
        let one: OneOrMany<RecordId> = 5.into();
        assert!(one.is_one());
        assert_eq!(one.into_vec(), vec![5]);

        let many: OneOrMany<RecordId> = vec![5].into();
        assert!(!many.is_one());
        assert_eq!(many.len(), 1);

        let array: OneOrMany<RecordId> = [3, 5].into();
        assert_eq!(array, OneOrMany::Many(vec![3, 5]));

        let slice: OneOrMany<RecordId> = (&[1, 2, 3][..]).into();
        assert_eq!(slice.len(), 3);
    }

    #[test]
    fn test_one_or_many_deserialize() {
        let one: OneOrMany<RecordId> = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(one, OneOrMany::One(7));

        let many: OneOrMany<RecordId> = serde_json::from_value(json!([7, 8])).unwrap();
        assert_eq!(many, OneOrMany::Many(vec![7, 8]));

        let record: OneOrMany<Record> = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert!(record.is_one());

        let records: OneOrMany<Record> = serde_json::from_value(json!([{"name": "x"}])).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_read_result() {
        let mut record = Record::new();
        record.insert("id".to_string(), json!(1));

        let one = ReadResult::One(Some(record.clone()));
        assert_eq!(one.len(), 1);
        assert_eq!(serde_json::to_value(&one).unwrap(), json!({"id": 1}));

        let none = ReadResult::One(None);
        assert!(none.is_empty());
        assert_eq!(serde_json::to_value(&none).unwrap(), Value::Null);

        let many = ReadResult::Many(vec![record]);
        assert_eq!(serde_json::to_value(&many).unwrap(), json!([{"id": 1}]));
        assert_eq!(many.into_records().len(), 1);
    }

    #[test]
    fn test_search_options_kwargs() {
        let kwargs = SearchOptions::new().to_kwargs();
        assert_eq!(Value::Object(kwargs), json!({"offset": 0}));

        let kwargs = SearchOptions::new()
            .offset(20)
            .limit(10)
            .order("name desc")
            .to_kwargs();
        assert_eq!(
            Value::Object(kwargs),
            json!({"offset": 20, "limit": 10, "order": "name desc"})
        );
    }

    #[test]
    fn test_model_info_ignores_extra_fields() {
        let info: ModelInfo = serde_json::from_value(json!({
            "id": 81,
            "model": "res.partner",
            "name": "Contact",
            "transient": false,
            "display_name": "Contact"
        }))
        .unwrap();
        assert_eq!(info.model, "res.partner");
        assert!(!info.transient);
    }
}
