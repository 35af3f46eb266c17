#![forbid(unsafe_code)]

//! Core data model and business logic for the Fitlog fitness ledger.
//!
//! This crate provides:
//! - Domain types (measurements, circumferences, exercises)
//! - The ledger with merge-on-add and write-through persistence
//! - Derived metrics (one-rep-max, TDEE, water intake, body composition)
//! - Export/import of the full dataset
//! - Storage backends, user profile, reminders, configuration

pub mod types;
pub mod error;
pub mod calc;
pub mod merge;
pub mod composition;
pub mod validate;
pub mod storage;
pub mod ledger;
pub mod transfer;
pub mod profile;
pub mod reminder;
pub mod format;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use calc::{calculate_one_rep_max, calculate_tdee, calculate_water_intake};
pub use config::Config;
pub use ledger::FitnessLedger;
pub use storage::{JsonDirStore, LedgerStore, MemoryStore, Slot};
pub use transfer::{ExportDocument, FieldOutcome, ImportReport};
pub use profile::{ActivityLevel, Gender, ProfileUpdate, UserProfile};
