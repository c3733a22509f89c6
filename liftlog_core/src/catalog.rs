//! Default exercise catalog.
//!
//! The catalog is the table of suggested movements offered when a user adds
//! an exercise. It is plain configuration: built from [`Catalog::builtin`]
//! unless the config file provides its own `[[catalog.exercises]]` table,
//! and passed to whoever needs it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One suggested movement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub muscle_target: String,
}

impl CatalogEntry {
    fn new(name: &str, muscle_target: &str) -> Self {
        Self {
            name: name.into(),
            muscle_target: muscle_target.into(),
        }
    }
}

/// Read-only table of suggested movements
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default = "builtin_exercises")]
    pub exercises: Vec<CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_exercises() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("Squat", "quadriceps, glutes"),
        CatalogEntry::new("Deadlift", "hamstrings, glutes, back"),
        CatalogEntry::new("Bench press", "chest, triceps"),
        CatalogEntry::new("Overhead press", "shoulders, triceps"),
        CatalogEntry::new("Pull-up", "back, biceps"),
        CatalogEntry::new("Barbell row", "back, biceps"),
        CatalogEntry::new("Dips", "chest, triceps"),
        CatalogEntry::new("Lunge", "quadriceps, glutes"),
        CatalogEntry::new("Hip thrust", "glutes, hamstrings"),
        CatalogEntry::new("Plank", "abs"),
    ]
}

impl Catalog {
    /// The built-in default table
    pub fn builtin() -> Self {
        Self {
            exercises: builtin_exercises(),
        }
    }

    /// Case-insensitive lookup by name
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.exercises
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for (index, entry) in self.exercises.iter().enumerate() {
            if entry.name.trim().is_empty() {
                errors.push(format!("Catalog entry {} has empty name", index));
                continue;
            }
            if entry.muscle_target.trim().is_empty() {
                errors.push(format!("Catalog entry '{}' has no muscle target", entry.name));
            }
            if !names.insert(entry.name.to_lowercase()) {
                errors.push(format!("Catalog entry '{}' is listed twice", entry.name));
            }
        }

        errors
    }
}
