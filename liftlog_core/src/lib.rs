#![forbid(unsafe_code)]

//! Core domain model and business logic for liftlog.
//!
//! This crate provides:
//! - Record types (programs, trainings, exercise links, exercise data)
//! - The compact text encodings of set schemas and performance logs
//! - Decoded views of exercises and training slots
//! - Simple/circuit linkage maintenance over a keyed record store
//! - Persistence (JSON snapshot, CSV export)

pub mod types;
pub mod error;
pub mod id_list;
pub mod schema;
pub mod performance;
pub mod store;
pub mod snapshot;
pub mod view;
pub mod linkage;
pub mod workout;
pub mod stats;
pub mod export;
pub mod catalog;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use id_list::IdList;
pub use schema::{Schema, SetBlock, Summary, Tally};
pub use performance::{PerformanceHistory, SessionRecord, SetResult};
pub use store::{MemoryStore, Record, Store, TrainingStore};
pub use view::{FullView, Members, MinimalView, ResolvedExercise};
pub use catalog::Catalog;
pub use config::Config;
pub use export::export_history;
