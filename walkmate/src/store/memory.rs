use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{Document, DocumentId, DocumentStore, Query};
use crate::{errors::StoreError, id::generate_document_id};

type Collection = BTreeMap<String, Map<String, Value>>;

/// In-process document store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles a simulated outage: while unavailable every operation fails with
    /// [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    pub async fn len(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, BTreeMap::len)
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn put(&self, collection: &str, id: DocumentId, fields: Map<String, Value>) -> Result<String, StoreError> {
        self.ensure_available()?;
        let id = match id {
            DocumentId::Auto => generate_document_id(),
            DocumentId::Key(id) => id,
        };
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        if let Some(documents) = collections.get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<Document>, StoreError> {
        self.ensure_available()?;
        let matches = {
            let collections = self.collections.read().await;
            collections
                .get(&query.collection)
                .map(|documents| {
                    documents
                        .iter()
                        .filter(|(_, fields)| query.filter.matches(fields))
                        .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };
        Ok(query.finish(matches))
    }
}
