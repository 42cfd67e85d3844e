//! Document store boundary.
//!
//! The aggregator only needs point reads, writes and deletes plus single-filter queries with an
//! optional order and limit. [`MemoryStore`] keeps everything in process; [`RedisStore`] keeps
//! documents in RedisJSON with set-based secondary indexes.

mod memory;
mod redis_backend;
mod scripts;

pub use memory::MemoryStore;
pub use redis_backend::{RedisStore, cleanup_pattern};

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::StoreError;

/// A stored document: its key plus its fields. The key is not repeated inside `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self { id: id.into(), fields }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Target key of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentId {
    /// Let the store assign a fresh id.
    Auto,
    Key(String),
}

impl DocumentId {
    pub fn key(id: impl Into<String>) -> Self {
        Self::Key(id.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Scalar field equals the value.
    Equals { field: String, value: Value },
    /// Array field contains the value.
    ArrayContains { field: String, value: Value },
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::ArrayContains {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        match self {
            Filter::Equals { field, value } => fields.get(field) == Some(value),
            Filter::ArrayContains { field, value } => fields
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filter: Filter,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: impl Into<String>, filter: Filter) -> Self {
        Self {
            collection: collection.into(),
            filter,
            order_by: None,
            limit: None,
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            order,
        });
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Orders and truncates already-filtered matches. Ties keep id order so results are stable.
    pub fn finish(&self, mut documents: Vec<Document>) -> Vec<Document> {
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(order_by) = &self.order_by {
            documents.sort_by(|a, b| {
                let ordering = compare_values(a.field(&order_by.field), b.field(&order_by.field));
                match order_by.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
        documents
    }
}

/// Orders field values: numbers numerically, strings lexicographically, booleans false first.
/// Values of different kinds order by kind; a missing value sorts before any present one.
pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => rank(a).cmp(&rank(b)),
        },
    }
}

/// Operations the aggregator needs from a document database.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Writes (replacing) a document and returns its id.
    async fn put(&self, collection: &str, id: DocumentId, fields: Map<String, Value>) -> Result<String, StoreError>;

    /// Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn query(&self, query: Query) -> Result<Vec<Document>, StoreError>;

    async fn query_equals(&self, collection: &str, field: &str, value: Value) -> Result<Vec<Document>, StoreError> {
        self.query(Query::new(collection, Filter::equals(field, value))).await
    }

    async fn query_array_contains(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError> {
        self.query(Query::new(collection, Filter::array_contains(field, value)))
            .await
    }

    async fn count_equals(&self, collection: &str, field: &str, value: Value) -> Result<u64, StoreError> {
        Ok(self.query_equals(collection, field, value).await?.len() as u64)
    }
}
