//! Record payloads and type classification
//!
//! FOLIO exports carry no explicit type tag, so the kind of a record is
//! derived from which discriminating field is present in its payload.

use serde_json::Value;
use std::fmt;

/// A parsed JSON record plus its extracted identifier
///
/// The body is kept opaque: it is POSTed back to FOLIO unmodified, so no
/// schema is imposed beyond the presence of the `id` field.
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// Value of the record's "id" field
    pub id: String,
    /// Full JSON document, including the id
    pub body: Value,
}

impl RawRecord {
    /// String value of a top-level field, if present
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    fn has_field(&self, key: &str) -> bool {
        self.body.get(key).is_some()
    }
}

/// Kind of a FOLIO inventory record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Item,
    Holdings,
    Instance,
    Unknown,
}

impl RecordKind {
    /// FOLIO storage collection path for this kind, if it has one
    pub fn collection_path(&self) -> Option<&'static str> {
        match self {
            RecordKind::Item => Some("/item-storage/items"),
            RecordKind::Holdings => Some("/holdings-storage/holdings"),
            RecordKind::Instance => Some("/instance-storage/instances"),
            RecordKind::Unknown => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Item => "item",
            RecordKind::Holdings => "holdings",
            RecordKind::Instance => "instance",
            RecordKind::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Classify a record by which discriminating field its payload carries
///
/// Precedence follows the export format: `barcode` marks an item,
/// `holdingsItems` marks a holdings record (a legacy marker carried by the
/// exports), `instanceTypeId` marks an instance. First match wins. Records
/// matching none of the three are `Unknown` and cannot be placed in the
/// hierarchy.
pub fn classify(record: &RawRecord) -> RecordKind {
    if record.has_field("barcode") {
        RecordKind::Item
    } else if record.has_field("holdingsItems") {
        RecordKind::Holdings
    } else if record.has_field("instanceTypeId") {
        RecordKind::Instance
    } else {
        RecordKind::Unknown
    }
}
