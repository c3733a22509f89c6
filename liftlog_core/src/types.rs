//! Core domain records for liftlog.
//!
//! These are the rows the store collaborator hands out. The text fields the
//! core owns (`schema`, `performances`) are kept in their persisted form and
//! decoded on demand by [`crate::schema`] and [`crate::performance`]; id lists
//! are held as [`IdList`] and only become text at the serde boundary.

use crate::id_list::IdList;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// Store-allocated record identifier
pub type RecordId = u64;

// ============================================================================
// Link kind
// ============================================================================

/// Whether a training slot holds one movement or a circuit of several
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    #[default]
    Simple,
    Circuit,
}

impl LinkKind {
    /// Kind implied by a link's member count
    pub fn for_member_count(count: usize) -> Self {
        if count > 1 {
            LinkKind::Circuit
        } else {
            LinkKind::Simple
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// One leaf movement of a training, with its schema and logged history
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ExerciseData {
    pub id: RecordId,
    pub training_id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub muscle_target: String,
    #[serde(default)]
    pub kind: LinkKind,
    /// Persisted schema field, see [`crate::schema`]
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub notes: String,
    /// Persisted performance field, see [`crate::performance`]
    #[serde(default)]
    pub performances: String,
    #[serde(default)]
    pub finished: bool,
}

/// A slot within a training: one member (simple) or several (circuit)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ExerciseLink {
    pub id: RecordId,
    pub training_id: RecordId,
    pub user_id: RecordId,
    pub member_ids: IdList,
    #[serde(default)]
    pub finished: bool,
}

impl ExerciseLink {
    pub fn kind(&self) -> LinkKind {
        LinkKind::for_member_count(self.member_ids.len())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Training {
    pub id: RecordId,
    pub user_id: RecordId,
    #[serde(default)]
    pub program_id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub muscle_target: String,
    /// Ordered link ids (not exercise data ids)
    #[serde(default)]
    pub link_ids: IdList,
    #[serde(default)]
    pub finished: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Program {
    pub id: RecordId,
    pub user_id: RecordId,
    #[serde(default)]
    pub name: String,
    /// Planned length in weeks
    #[serde(default)]
    pub duration: u32,
    /// Planned trainings per week
    #[serde(default)]
    pub training_number: u32,
    #[serde(default)]
    pub training_ids: IdList,
}

/// User-editable fields of an exercise, as submitted by the caller
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseDraft {
    pub name: String,
    pub muscle_target: String,
    pub schema: Schema,
    pub notes: String,
}

impl ExerciseDraft {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            muscle_target: String::new(),
            schema,
            notes: String::new(),
        }
    }

    pub fn with_muscle_target(mut self, muscle_target: impl Into<String>) -> Self {
        self.muscle_target = muscle_target.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}
