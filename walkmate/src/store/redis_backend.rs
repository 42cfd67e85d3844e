use redis::{aio::ConnectionManager, cmd};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    Document, DocumentId, DocumentStore, Filter, Query,
    scripts::{DOCUMENT_DELETE_SCRIPT, DOCUMENT_PUT_SCRIPT},
};
use crate::{errors::StoreError, id::generate_document_id, keys::KeyContext};

/// Document store over Redis Stack: documents are RedisJSON values, indexes are plain sets
/// maintained by the write and delete scripts.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

#[derive(Serialize)]
struct PutCommand<'a> {
    key: String,
    id: &'a str,
    index_prefix: String,
    fields: String,
}

#[derive(Serialize)]
struct DeleteCommand<'a> {
    key: String,
    id: &'a str,
    index_prefix: String,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key_context(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix)
    }

    /// Clone of the connection manager for advanced operations.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Index set that answers `filter`, or `None` when the value kind is not indexed.
    fn index_key(&self, collection: &str, filter: &Filter) -> Option<String> {
        let keys = self.key_context();
        match filter {
            Filter::Equals { field, value } => {
                index_token(value).map(|token| keys.equality_index(collection, field, &token))
            }
            Filter::ArrayContains { field, value } => {
                index_token(value).map(|token| keys.membership_index(collection, field, &token))
            }
        }
    }

    async fn fetch_many(&self, collection: &str, ids: Vec<String>) -> Result<Vec<Document>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys = self.key_context();
        let document_keys: Vec<String> = ids.iter().map(|id| keys.document(collection, id)).collect();
        let mut conn = self.conn.clone();
        let raw: Vec<Option<String>> = cmd("JSON.MGET")
            .arg(&document_keys)
            .arg(".")
            .query_async(&mut conn)
            .await?;

        let mut documents = Vec::with_capacity(ids.len());
        for (id, json) in ids.into_iter().zip(raw) {
            // Removed between the index read and the fetch.
            let Some(json) = json else {
                continue;
            };
            documents.push(Document::new(id, decode_fields(&json)?));
        }
        Ok(documents)
    }
}

fn index_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Token whose equality set holds exactly the matching documents. Booleans share their set with the
/// strings `"true"` and `"false"`, so neither can be counted from the set alone.
fn counted_token(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if s != "true" && s != "false" => Some(s),
        _ => None,
    }
}

fn decode_fields(json: &str) -> Result<Map<String, Value>, StoreError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Other {
            message: format!("stored document is not an object: {other}").into(),
        }),
    }
}

impl DocumentStore for RedisStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let key = self.key_context().document(collection, id);
        let mut conn = self.conn.clone();
        let result: Option<String> = cmd("JSON.GET").arg(&key).query_async(&mut conn).await?;
        match result {
            Some(json) => Ok(Some(Document::new(id, decode_fields(&json)?))),
            None => Ok(None),
        }
    }

    async fn put(&self, collection: &str, id: DocumentId, fields: Map<String, Value>) -> Result<String, StoreError> {
        let id = match id {
            DocumentId::Auto => generate_document_id(),
            DocumentId::Key(id) => id,
        };
        let keys = self.key_context();
        let command = PutCommand {
            key: keys.document(collection, &id),
            id: &id,
            index_prefix: keys.index_prefix(collection),
            fields: serde_json::to_string(&Value::Object(fields))?,
        };
        let payload = serde_json::to_string(&command)?;

        let mut conn = self.conn.clone();
        let mut invocation = DOCUMENT_PUT_SCRIPT.prepare_invoke();
        invocation.arg(payload);
        let _: String = invocation.invoke_async(&mut conn).await?;
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let keys = self.key_context();
        let command = DeleteCommand {
            key: keys.document(collection, id),
            id,
            index_prefix: keys.index_prefix(collection),
        };
        let payload = serde_json::to_string(&command)?;

        let mut conn = self.conn.clone();
        let mut invocation = DOCUMENT_DELETE_SCRIPT.prepare_invoke();
        invocation.arg(payload);
        let _: i64 = invocation.invoke_async(&mut conn).await?;
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<Document>, StoreError> {
        let set_key = self
            .index_key(&query.collection, &query.filter)
            .unwrap_or_else(|| self.key_context().members(&query.collection));
        let mut conn = self.conn.clone();
        let ids: Vec<String> = cmd("SMEMBERS").arg(&set_key).query_async(&mut conn).await?;

        let documents = self
            .fetch_many(&query.collection, ids)
            .await?
            .into_iter()
            .filter(|document| query.filter.matches(&document.fields))
            .collect();
        Ok(query.finish(documents))
    }

    async fn count_equals(&self, collection: &str, field: &str, value: Value) -> Result<u64, StoreError> {
        let Some(token) = counted_token(&value) else {
            return Ok(self.query_equals(collection, field, value).await?.len() as u64);
        };
        let key = self.key_context().equality_index(collection, field, token);
        let mut conn = self.conn.clone();
        Ok(cmd("SCARD").arg(&key).query_async(&mut conn).await?)
    }
}

/// Delete all keys matching a pattern (for test cleanup).
///
/// This performs a SCAN + DEL operation to safely delete keys without blocking Redis.
pub async fn cleanup_pattern(conn: &mut ConnectionManager, pattern: &str) -> Result<u64, StoreError> {
    const SCAN_COUNT: usize = 1000;
    let mut cursor: u64 = 0;
    let mut total_deleted: u64 = 0;

    loop {
        let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(SCAN_COUNT)
            .query_async(conn)
            .await?;

        if !keys.is_empty() {
            let deleted: u64 = redis::cmd("DEL").arg(&keys).query_async(conn).await?;
            total_deleted += deleted;
        }

        cursor = next_cursor;
        if cursor == 0 {
            break;
        }
    }

    Ok(total_deleted)
}
