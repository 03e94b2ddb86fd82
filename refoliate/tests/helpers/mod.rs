//! Shared test helpers: a scripted in-memory RecordStore

use async_trait::async_trait;
use refoliate::error::{RestoreError, Result};
use refoliate::folio::{CreateOutcome, RecordStore};
use refoliate::records::{RawRecord, RecordKind};
use std::collections::HashSet;
use std::sync::Mutex;

/// In-memory RecordStore that records every call it receives
///
/// Behavior is scripted per record id: ids in `existing` answer true to
/// the existence check, ids in `reject` get a 422-style rejection, the
/// optional `mismatch` id gets a created response carrying a different id,
/// and the optional `server_error` / `exists_server_error` ids simulate a
/// FOLIO 500 on create and on the existence check respectively.
#[derive(Default)]
pub struct MockStore {
    pub existing: HashSet<String>,
    pub reject: HashSet<String>,
    pub mismatch: Option<String>,
    pub server_error: Option<String>,
    pub exists_server_error: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far, in order, as "op kind id" strings
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, op: &str, kind: RecordKind, id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {} {}", op, kind, id));
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn exists(&self, kind: RecordKind, id: &str) -> Result<bool> {
        self.log("exists", kind, id);

        if self.exists_server_error.as_deref() == Some(id) {
            return Err(RestoreError::RemoteServer {
                status: Some(500),
                message: "simulated storage module failure".to_string(),
            });
        }

        Ok(self.existing.contains(id))
    }

    async fn create(&self, kind: RecordKind, record: &RawRecord) -> Result<CreateOutcome> {
        self.log("create", kind, &record.id);

        if self.server_error.as_deref() == Some(record.id.as_str()) {
            return Err(RestoreError::RemoteServer {
                status: Some(500),
                message: "simulated storage module failure".to_string(),
            });
        }

        if self.reject.contains(&record.id) {
            return Ok(CreateOutcome::Rejected {
                messages: vec!["must not be null".to_string()],
            });
        }

        if self.mismatch.as_deref() == Some(record.id.as_str()) {
            return Ok(CreateOutcome::Created {
                id: format!("{}-reassigned", record.id),
            });
        }

        Ok(CreateOutcome::Created {
            id: record.id.clone(),
        })
    }
}
