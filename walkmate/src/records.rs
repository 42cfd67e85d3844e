//! Mapping between typed records and schemaless store documents.
//!
//! A record's id is the document key and is never stored as a field: [`to_fields`] strips it and
//! [`from_document`] puts it back.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{errors::StoreError, store::Document};

pub use walkmate_macros::Record;

/// A struct bound to a document collection. Implement with `#[derive(Record)]`.
pub trait Record: Serialize + DeserializeOwned {
    /// Collection the record lives in.
    const COLLECTION: &'static str;
    /// Serialized name of the id field.
    const ID_FIELD: &'static str;

    fn record_id(&self) -> &str;

    fn set_record_id(&mut self, id: String);
}

/// Serializes a record into the field map written to the store.
pub fn to_fields<T: Record>(record: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(mut fields) => {
            fields.remove(T::ID_FIELD);
            Ok(fields)
        }
        other => Err(StoreError::Other {
            message: format!("record for `{}` serialized to a non-object: {other}", T::COLLECTION).into(),
        }),
    }
}

/// Rebuilds a record from a stored document.
pub fn from_document<T: Record>(document: Document) -> Result<T, StoreError> {
    let Document { id, mut fields } = document;
    fields.insert(T::ID_FIELD.to_string(), Value::String(id));
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Decodes a batch of documents, failing on the first malformed one.
pub fn from_documents<T: Record>(documents: Vec<Document>) -> Result<Vec<T>, StoreError> {
    documents.into_iter().map(from_document).collect()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Record, Serialize, Deserialize, Debug, PartialEq)]
    #[record(collection = "notes")]
    struct Note {
        #[record(id)]
        id: String,
        body: String,
    }

    #[test]
    fn id_is_the_key_not_a_field() {
        let note = Note {
            id: "n1".to_string(),
            body: "hello".to_string(),
        };
        let fields = to_fields(&note).unwrap();
        assert!(!fields.contains_key("id"));
        assert_eq!(fields["body"], Value::String("hello".to_string()));

        let restored: Note = from_document(Document::new("n1", fields)).unwrap();
        assert_eq!(restored, note);
    }

    #[test]
    fn derive_exposes_collection_and_id() {
        let mut note = Note {
            id: String::new(),
            body: String::new(),
        };
        assert_eq!(Note::COLLECTION, "notes");
        note.set_record_id("generated".to_string());
        assert_eq!(note.record_id(), "generated");
    }

    #[derive(Record, Serialize, Deserialize, Debug, PartialEq)]
    #[record(collection = "badges")]
    #[serde(rename_all = "camelCase")]
    struct Badge {
        #[record(id)]
        badge_id: String,
        display_label: String,
    }

    #[test]
    fn renamed_ids_are_stripped_under_their_serialized_name() {
        assert_eq!(Badge::ID_FIELD, "badgeId");
        let badge = Badge {
            badge_id: "b1".to_string(),
            display_label: "Early walker".to_string(),
        };
        let fields = to_fields(&badge).unwrap();
        assert!(!fields.contains_key("badgeId"));
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("displayLabel"));

        let restored: Badge = from_document(Document::new("b1", fields)).unwrap();
        assert_eq!(restored, badge);
    }
}
