//! Deterministic cache keys for record operations
//!
//! A key is the operation name followed by a JSON array holding the model
//! and every argument that shapes the remote call. Encoding the components
//! as one JSON document keeps distinct argument tuples distinct even when a
//! value contains separator characters such as `:` or `|`.

use crate::cache::types::CacheKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Constant key for the model registry listing
pub const MODEL_LIST_KEY: &str = "model_list";

/// Operation a cache entry was produced by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOperation {
    Search,
    SearchRead,
    Read,
    FieldsGet,
}

impl std::fmt::Display for CacheOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheOperation::Search => write!(f, "search"),
            CacheOperation::SearchRead => write!(f, "search_read"),
            CacheOperation::Read => write!(f, "read"),
            CacheOperation::FieldsGet => write!(f, "fields_get"),
        }
    }
}

/// Cache key builder for record operations
///
/// ```
/// use odoo_client::cache::{CacheKeyBuilder, CacheOperation};
/// use serde_json::json;
///
/// let key = CacheKeyBuilder::new(CacheOperation::Search, "res.partner")
///     .part(json!([["is_company", "=", true]]))
///     .part(0)
///     .part(Option::<u32>::None)
///     .build();
/// assert_eq!(key, r#"search:["res.partner",[["is_company","=",true]],0,null]"#);
/// ```
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    operation: CacheOperation,
    components: Vec<Value>,
}

impl CacheKeyBuilder {
    /// Start a key for `operation` on `model`
    pub fn new(operation: CacheOperation, model: &str) -> Self {
        Self {
            operation,
            components: vec![Value::String(model.to_string())],
        }
    }

    /// Append an argument component, order matters
    pub fn part(mut self, value: impl Into<Value>) -> Self {
        self.components.push(value.into());
        self
    }

    /// Build the cache key
    pub fn build(self) -> CacheKey {
        format!("{}:{}", self.operation, Value::Array(self.components))
    }

    /// Key under which an authenticated uid is remembered
    pub fn auth(username: &str, database: &str) -> CacheKey {
        format!("auth:{}:{}", username, database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(CacheOperation::Search.to_string(), "search");
        assert_eq!(CacheOperation::SearchRead.to_string(), "search_read");
        assert_eq!(CacheOperation::Read.to_string(), "read");
        assert_eq!(CacheOperation::FieldsGet.to_string(), "fields_get");
    }

    #[test]
    fn test_auth_key() {
        assert_eq!(
            CacheKeyBuilder::auth("admin@example.com", "prod"),
            "auth:admin@example.com:prod"
        );
    }

    #[test]
    fn test_same_parts_same_key() {
        let build = || {
            CacheKeyBuilder::new(CacheOperation::SearchRead, "res.partner")
                .part(json!([["name", "ilike", "acme"]]))
                .part(vec!["name".to_string(), "email".to_string()])
                .part(0)
                .part(10)
                .part("name asc")
                .build()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_each_component_changes_key() {
        let base = CacheKeyBuilder::new(CacheOperation::Search, "res.partner")
            .part(json!([]))
            .part(0)
            .build();

        let other_model = CacheKeyBuilder::new(CacheOperation::Search, "res.users")
            .part(json!([]))
            .part(0)
            .build();
        let other_op = CacheKeyBuilder::new(CacheOperation::SearchRead, "res.partner")
            .part(json!([]))
            .part(0)
            .build();
        let other_arg = CacheKeyBuilder::new(CacheOperation::Search, "res.partner")
            .part(json!([]))
            .part(10)
            .build();

        assert_ne!(base, other_model);
        assert_ne!(base, other_op);
        assert_ne!(base, other_arg);
    }

    #[test]
    fn test_separator_characters_do_not_collide() {
        // Plain concatenation would render both of these as `read|a|b`.
        let split = CacheKeyBuilder::new(CacheOperation::Read, "x")
            .part("a")
            .part("b")
            .build();
        let joined = CacheKeyBuilder::new(CacheOperation::Read, "x")
            .part("a\",\"b")
            .build();
        assert_ne!(split, joined);

        let colon = CacheKeyBuilder::new(CacheOperation::Read, "a:b").build();
        let plain = CacheKeyBuilder::new(CacheOperation::Read, "a").part("b").build();
        assert_ne!(colon, plain);
    }

    #[test]
    fn test_none_and_empty_differ() {
        let none = CacheKeyBuilder::new(CacheOperation::Read, "res.partner")
            .part(Option::<Vec<String>>::None)
            .build();
        let empty = CacheKeyBuilder::new(CacheOperation::Read, "res.partner")
            .part(Vec::<String>::new())
            .build();
        assert_ne!(none, empty);
    }
}
