//! refoliate — REstore FOLIo sAved insTancE records
//!
//! Reads a directory tree of exported FOLIO JSON records, rebuilds the
//! instance → holdings → item ownership hierarchy from the foreign keys
//! embedded in the payloads, and recreates each record through the Okapi
//! storage APIs in dependency order, skipping anything already present.

pub mod config;
pub mod error;
pub mod folio;
pub mod hierarchy;
pub mod loader;
pub mod records;
pub mod replay;

pub use crate::error::{RestoreError, Result};
