//! Running a training: logging performed sessions and walking its slots.

use crate::performance::{self, SessionRecord};
use crate::store::Store;
use crate::{Error, ExerciseData, ExerciseLink, RecordId, Result, Training};

/// Append one performed session to an exercise's history and mark it finished
///
/// The session is encoded on its own and concatenated to the stored field;
/// earlier sessions are not parsed or rewritten.
pub fn log_session<S: Store<ExerciseData>>(
    store: &mut S,
    data_id: RecordId,
    session: &SessionRecord,
) -> Result<ExerciseData> {
    let fragment = performance::encode_session(session)?;

    let mut data = store.get(data_id)?;
    data.performances = performance::append(&data.performances, &fragment);
    data.finished = true;
    let data = store.save(data)?;

    tracing::info!(
        "Logged {} sets for exercise {} on {}",
        session.sets.len(),
        data_id,
        session.date
    );
    Ok(data)
}

pub fn finish_link<S: Store<ExerciseLink>>(store: &mut S, link_id: RecordId) -> Result<ExerciseLink> {
    let mut link = store.get(link_id)?;
    link.finished = true;
    store.save(link)
}

pub fn finish_training<S: Store<Training>>(store: &mut S, training_id: RecordId) -> Result<Training> {
    let mut training = store.get(training_id)?;
    training.finished = true;
    let training = store.save(training)?;
    tracing::info!("Training {} finished", training_id);
    Ok(training)
}

/// The slot after `link_id` in the training's order, `None` after the last
pub fn next_link<S: Store<Training>>(
    store: &S,
    training_id: RecordId,
    link_id: RecordId,
) -> Result<Option<RecordId>> {
    let training = store.get(training_id)?;
    let index = training.link_ids.position(link_id).ok_or_else(|| {
        Error::InvalidTransition(format!(
            "link {} is not part of training {}",
            link_id, training_id
        ))
    })?;
    Ok(training.link_ids.as_slice().get(index + 1).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::SetResult;
    use crate::{linkage, schema, ExerciseDraft, MemoryStore};

    fn setup() -> (MemoryStore, Training, ExerciseLink, ExerciseData) {
        crate::logging::init_test();
        let mut store = MemoryStore::new();
        let training = linkage::create_training(&mut store, 1, None, "Legs", "quads").unwrap();
        let draft = ExerciseDraft::new("Squat", schema::decode("3,10,60").unwrap());
        let (link, data) = linkage::create_simple(&mut store, training.id, &draft).unwrap();
        (store, training, link, data)
    }

    #[test]
    fn test_log_session_end_to_end() {
        let (mut store, _, _, data) = setup();
        let session = SessionRecord::new("2024-01-01", vec![SetResult::new(1, 10, 40.0, 60)]);

        let logged = log_session(&mut store, data.id, &session).unwrap();

        assert_eq!(logged.performances, "2024-01-01-1,10,40,60");
        assert!(logged.finished);
        assert_eq!(performance::decode(&logged.performances).unwrap(), vec![session]);
    }

    #[test]
    fn test_log_session_appends_in_order() {
        let (mut store, _, _, data) = setup();
        let a = SessionRecord::new("2024-01-01", vec![SetResult::new(1, 10, 40.0, 60)]);
        let b = SessionRecord::new("2024-01-03", vec![SetResult::new(1, 10, 42.5, 60)]);

        log_session(&mut store, data.id, &a).unwrap();
        let logged = log_session(&mut store, data.id, &b).unwrap();

        assert_eq!(performance::decode(&logged.performances).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_zero_weight_session_keeps_history_readable() {
        let (mut store, _, _, data) = setup();
        let loaded = SessionRecord::new("2024-01-01", vec![SetResult::new(1, 10, 40.0, 60)]);
        let bodyweight = SessionRecord::new("2024-01-02", vec![SetResult::new(1, 10, -0.0, 60)]);

        log_session(&mut store, data.id, &loaded).unwrap();
        let logged = log_session(&mut store, data.id, &bodyweight).unwrap();

        assert_eq!(logged.performances, "2024-01-01-1,10,40,60/2024-01-02-1,10,0,60");
        let history = performance::decode(&logged.performances).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], loaded);
        assert_eq!(history[1].sets[0].weight, 0.0);
    }

    #[test]
    fn test_log_session_rejects_bad_session_without_writing() {
        let (mut store, _, _, data) = setup();
        let bad = SessionRecord::new("2024/01/01", vec![]);

        assert!(log_session(&mut store, data.id, &bad).is_err());
        let stored: ExerciseData = store.get(data.id).unwrap();
        assert!(stored.performances.is_empty());
        assert!(!stored.finished);
    }

    #[test]
    fn test_next_link_walks_training_order() {
        let (mut store, training, first, _) = setup();
        let draft = ExerciseDraft::new("Lunge", schema::decode("3,12,45").unwrap());
        let (second, _) = linkage::create_simple(&mut store, training.id, &draft).unwrap();

        assert_eq!(next_link(&store, training.id, first.id).unwrap(), Some(second.id));
        assert_eq!(next_link(&store, training.id, second.id).unwrap(), None);
        assert!(next_link(&store, training.id, 999).is_err());
    }

    #[test]
    fn test_finish_flags() {
        let (mut store, training, link, _) = setup();
        assert!(finish_link(&mut store, link.id).unwrap().finished);
        assert!(finish_training(&mut store, training.id).unwrap().finished);
    }
}
