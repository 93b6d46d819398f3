//! Record shape shared by every stored document type

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Schema tags, timestamps and checksum carried by every record
///
/// Flattened into the record so the persisted fields sit next to the
/// record's own fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordMetadata {
    pub document_type: String,
    pub version: String,
    /// Unix seconds
    pub created: i64,
    /// Unix seconds
    pub updated: i64,
    pub check: String,
}

/// A document type the record store can persist
///
/// `DOCUMENT_TYPE` and `VERSION` select the integrity shape used for the
/// record's checksum.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const DOCUMENT_TYPE: &'static str;
    const VERSION: &'static str;

    /// Persisted fields an update may not change
    ///
    /// `created` is always preserved as well, whatever this list says.
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["uuid"];

    /// Opaque record id, stored under `uuid`
    fn record_id(&self) -> &str;

    fn metadata(&self) -> &RecordMetadata;

    fn metadata_mut(&mut self) -> &mut RecordMetadata;

    /// Sets schema tags and timestamps ahead of a write
    ///
    /// `created` is only filled on first write.
    fn stamp(&mut self, now: i64) {
        let meta = self.metadata_mut();
        meta.document_type = Self::DOCUMENT_TYPE.to_string();
        meta.version = Self::VERSION.to_string();
        if meta.created == 0 {
            meta.created = now;
        }
        meta.updated = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Note {
        uuid: String,
        #[serde(flatten)]
        meta: RecordMetadata,
    }

    impl Record for Note {
        const DOCUMENT_TYPE: &'static str = "note";
        const VERSION: &'static str = "001";

        fn record_id(&self) -> &str {
            &self.uuid
        }

        fn metadata(&self) -> &RecordMetadata {
            &self.meta
        }

        fn metadata_mut(&mut self) -> &mut RecordMetadata {
            &mut self.meta
        }
    }

    #[test]
    fn test_stamp_keeps_created() {
        let mut note = Note::default();
        note.stamp(100);
        assert_eq!(note.metadata().created, 100);
        assert_eq!(note.metadata().document_type, "note");

        note.stamp(200);
        assert_eq!(note.metadata().created, 100);
        assert_eq!(note.metadata().updated, 200);
    }

    #[test]
    fn test_default_immutable_fields() {
        assert_eq!(Note::IMMUTABLE_FIELDS, &["uuid"]);
    }

    #[test]
    fn test_metadata_flattens_with_camel_case() {
        let mut note = Note {
            uuid: "n1".into(),
            ..Default::default()
        };
        note.stamp(5);
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["documentType"], "note");
        assert_eq!(value["version"], "001");
        assert_eq!(value["created"], 5);
        assert_eq!(value["check"], "");
    }
}
