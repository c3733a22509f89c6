//! Keyed record store collaborator.
//!
//! The core never issues queries of its own; it reads and writes records
//! through [`Store`], implemented once per record type. [`MemoryStore`] is an
//! arena implementation: every table is keyed by id and ids come from one
//! shared sequence. It is what the CLI persists with [`crate::snapshot`].

use crate::{Error, ExerciseData, ExerciseLink, Program, RecordId, Result, Training};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row type the store can hold
pub trait Record: Clone {
    /// Human-readable table name used in errors and logs
    const KIND: &'static str;

    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);
}

/// CRUD surface of the external record store
pub trait Store<R: Record> {
    fn get(&self, id: RecordId) -> Result<R>;

    /// All records matching `filter`, in id order
    fn list(&self, filter: &dyn Fn(&R) -> bool) -> Result<Vec<R>>;

    /// Insert `record` under a freshly allocated id and return the stored row
    fn create(&mut self, record: R) -> Result<R>;

    /// Overwrite an existing record
    fn save(&mut self, record: R) -> Result<R>;

    fn destroy(&mut self, id: RecordId) -> Result<()>;
}

/// A store holding every table the linkage operations touch
pub trait TrainingStore:
    Store<ExerciseData> + Store<ExerciseLink> + Store<Training> + Store<Program>
{
}

impl<S> TrainingStore for S where
    S: Store<ExerciseData> + Store<ExerciseLink> + Store<Training> + Store<Program>
{
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> RecordId {
                self.id
            }

            fn set_id(&mut self, id: RecordId) {
                self.id = id;
            }
        }
    };
}

impl_record!(ExerciseData, "exercise");
impl_record!(ExerciseLink, "link");
impl_record!(Training, "training");
impl_record!(Program, "program");

/// In-memory arena of all record tables
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryStore {
    #[serde(default)]
    last_id: RecordId,
    #[serde(default)]
    exercises: BTreeMap<RecordId, ExerciseData>,
    #[serde(default)]
    links: BTreeMap<RecordId, ExerciseLink>,
    #[serde(default)]
    trainings: BTreeMap<RecordId, Training>,
    #[serde(default)]
    programs: BTreeMap<RecordId, Program>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> RecordId {
        self.last_id += 1;
        self.last_id
    }
}

macro_rules! impl_memory_store {
    ($ty:ty, $table:ident) => {
        impl Store<$ty> for MemoryStore {
            fn get(&self, id: RecordId) -> Result<$ty> {
                self.$table.get(&id).cloned().ok_or(Error::NotFound {
                    kind: <$ty as Record>::KIND,
                    id,
                })
            }

            fn list(&self, filter: &dyn Fn(&$ty) -> bool) -> Result<Vec<$ty>> {
                Ok(self.$table.values().filter(|r| filter(r)).cloned().collect())
            }

            fn create(&mut self, mut record: $ty) -> Result<$ty> {
                let id = self.allocate_id();
                record.set_id(id);
                self.$table.insert(id, record.clone());
                tracing::debug!("Created {} {}", <$ty as Record>::KIND, id);
                Ok(record)
            }

            fn save(&mut self, record: $ty) -> Result<$ty> {
                let id = record.id();
                match self.$table.get_mut(&id) {
                    Some(slot) => {
                        *slot = record.clone();
                        Ok(record)
                    }
                    None => Err(Error::NotFound {
                        kind: <$ty as Record>::KIND,
                        id,
                    }),
                }
            }

            fn destroy(&mut self, id: RecordId) -> Result<()> {
                match self.$table.remove(&id) {
                    Some(_) => {
                        tracing::debug!("Destroyed {} {}", <$ty as Record>::KIND, id);
                        Ok(())
                    }
                    None => Err(Error::NotFound {
                        kind: <$ty as Record>::KIND,
                        id,
                    }),
                }
            }
        }
    };
}

impl_memory_store!(ExerciseData, exercises);
impl_memory_store!(ExerciseLink, links);
impl_memory_store!(Training, trainings);
impl_memory_store!(Program, programs);
