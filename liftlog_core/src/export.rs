//! CSV export of logged performance history.
//!
//! One row per performed set, in training order: links as the training lists
//! them, members in link order, sessions in the order they were logged.

use crate::store::TrainingStore;
use crate::{performance, view, RecordId, Result};
use std::io::Write;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    exercise_id: RecordId,
    exercise: &'a str,
    date: &'a str,
    set: u32,
    reps: u32,
    weight: f64,
    rest: u32,
}

/// Write the history of every exercise in `training_id` as CSV
///
/// Returns the number of rows written. Headers are always written, even for
/// a training with nothing logged yet.
pub fn export_history<S, W>(store: &S, training_id: RecordId, writer: W) -> Result<usize>
where
    S: TrainingStore,
    W: Write,
{
    let resolved = view::resolve_training(store, training_id)?;

    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv.write_record(["exercise_id", "exercise", "date", "set", "reps", "weight", "rest"])?;

    let mut rows = 0;
    for slot in &resolved {
        for member in slot.members.as_slice() {
            for session in &member.performances {
                for set in &session.sets {
                    csv.serialize(CsvRow {
                        exercise_id: member.summary.id,
                        exercise: &member.summary.name,
                        date: &session.date,
                        set: set.set_number,
                        reps: set.reps,
                        weight: set.weight,
                        rest: set.rest_seconds,
                    })?;
                    rows += 1;
                }
            }
        }
    }

    csv.flush()?;
    tracing::info!("Exported {} rows for training {}", rows, training_id);
    Ok(rows)
}

/// Total weight moved (`reps * weight`) in one decoded history
pub fn total_volume(history: &performance::PerformanceHistory) -> f64 {
    history
        .iter()
        .flat_map(|session| session.sets.iter())
        .map(|set| f64::from(set.reps) * set.weight)
        .sum()
}
