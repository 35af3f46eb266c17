//! Full-dataset export and import.
//!
//! Export writes both collections verbatim into one JSON document. Import
//! adopts each collection independently: a field is taken only when it is
//! present and holds an array of well-formed records, otherwise it is
//! skipped and the current collection stays as it was.

use crate::ledger::FitnessLedger;
use crate::merge::fold_by_date;
use crate::storage::{LedgerStore, Slot};
use crate::{Exercise, Measurement, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version tag written into export documents
pub const EXPORT_VERSION: u32 = 1;

/// Serialized form of the whole ledger
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub measurements: Vec<Measurement>,
    pub exercises: Vec<Exercise>,
}

/// What happened to one field of an imported document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldOutcome {
    /// The document has no such field; the collection is unchanged
    Absent,
    /// The field is present with the wrong shape; the collection is unchanged
    Skipped,
    /// The collection was replaced with this many records
    Imported(usize),
}

/// Per-field result of an import
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportReport {
    pub measurements: FieldOutcome,
    pub exercises: FieldOutcome,
}

impl<S: LedgerStore> FitnessLedger<S> {
    /// Snapshot the ledger as an export document
    pub fn export_document(&self) -> ExportDocument {
        ExportDocument {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            measurements: self.measurements.clone(),
            exercises: self.exercises.clone(),
        }
    }

    /// Serialize the ledger to compact JSON
    pub fn export_data(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.export_document())?)
    }

    /// Import a document, returning whether it parsed
    ///
    /// Fields with the wrong shape are skipped silently; use
    /// [`import_report`](Self::import_report) for per-field outcomes.
    pub fn import_data(&mut self, document: &str) -> bool {
        match self.import_report(document) {
            Ok(report) => {
                tracing::info!(
                    "Imported data: measurements {:?}, exercises {:?}",
                    report.measurements,
                    report.exercises
                );
                true
            }
            Err(e) => {
                tracing::error!("Failed to import data: {}", e);
                false
            }
        }
    }

    /// Import a document and report what happened to each field
    ///
    /// Fails without touching the ledger if the document is not valid JSON or
    /// a replaced collection cannot be persisted.
    pub fn import_report(&mut self, document: &str) -> Result<ImportReport> {
        let parsed: Value = serde_json::from_str(document)?;

        let measurements = decode_field::<Measurement>(&parsed, "measurements")
            .map(|decoded| decoded.map(fold_by_date));
        let exercises = decode_field::<Exercise>(&parsed, "exercises");

        let report = ImportReport {
            measurements: outcome(&measurements),
            exercises: outcome(&exercises),
        };

        let measurements = measurements.flatten();
        let exercises = exercises.flatten();

        if let Some(records) = &measurements {
            self.store.write_collection(Slot::Measurements, records)?;
        }
        if let Some(records) = &exercises {
            if let Err(e) = self.store.write_collection(Slot::Exercises, records) {
                if measurements.is_some() {
                    if let Err(restore) = self
                        .store
                        .write_collection(Slot::Measurements, &self.measurements)
                    {
                        tracing::error!("Failed to restore measurements: {}", restore);
                    }
                }
                return Err(e);
            }
        }

        if let Some(records) = measurements {
            self.measurements = records;
        }
        if let Some(records) = exercises {
            self.exercises = records;
        }

        Ok(report)
    }
}

fn outcome<T>(decoded: &Option<Option<Vec<T>>>) -> FieldOutcome {
    match decoded {
        None => FieldOutcome::Absent,
        Some(None) => FieldOutcome::Skipped,
        Some(Some(records)) => FieldOutcome::Imported(records.len()),
    }
}

/// `None` if the field is absent, `Some(None)` if it has the wrong shape
fn decode_field<T: DeserializeOwned>(document: &Value, field: &str) -> Option<Option<Vec<T>>> {
    let raw = document.get(field)?;
    if !raw.is_array() {
        tracing::warn!("Skipping import field {}: not an array", field);
        return Some(None);
    }

    match serde_json::from_value::<Vec<T>>(raw.clone()) {
        Ok(records) => Some(Some(records)),
        Err(e) => {
            tracing::warn!("Skipping import field {}: {}", field, e);
            Some(None)
        }
    }
}
