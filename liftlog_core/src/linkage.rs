//! Simple/circuit linkage between training slots and exercise data.
//!
//! Three id lists must stay consistent:
//! - `Program.training_ids` lists trainings
//! - `Training.link_ids` lists the training's slots ([`ExerciseLink`])
//! - `ExerciseLink.member_ids` lists the exercise data of one slot
//!
//! A link with one member is simple, with more it is a circuit. The kind only
//! ever changes as a side effect of the member count crossing 1/2:
//!
//! - [`create_simple`]: new data + new one-member link
//! - [`extend_to_circuit`]: append a new member; the first member's rests are
//!   zeroed when the second member arrives
//! - [`remove_member`]: drop a member; a single survivor makes the link simple
//!   again, no survivor destroys the link
//! - [`destroy_link`]: drop the link and every member only it references
//!
//! Each operation is one read-modify-write against the store. Callers that
//! need isolation wrap it, e.g. in [`crate::MemoryStore::update`].

use crate::schema;
use crate::store::{Store, TrainingStore};
use crate::{
    Error, ExerciseData, ExerciseDraft, ExerciseLink, IdList, LinkKind, Program, RecordId,
    Result, Training,
};

/// Create a training, registering it with its program when it has one
pub fn create_training<S: TrainingStore>(
    store: &mut S,
    user_id: RecordId,
    program_id: Option<RecordId>,
    name: &str,
    muscle_target: &str,
) -> Result<Training> {
    let mut program = match program_id {
        Some(id) => Some(Store::<Program>::get(store, id)?),
        None => None,
    };

    let training = Store::<Training>::create(
        store,
        Training {
            user_id,
            program_id,
            name: name.to_string(),
            muscle_target: muscle_target.to_string(),
            ..Training::default()
        },
    )?;

    if let Some(program) = program.as_mut() {
        program.training_ids.push_unique(training.id);
        Store::<Program>::save(store, program.clone())?;
    }

    tracing::info!("Created training {} (program {:?})", training.id, program_id);
    Ok(training)
}

/// Allocate one exercise and a simple link holding it
pub fn create_simple<S: TrainingStore>(
    store: &mut S,
    training_id: RecordId,
    draft: &ExerciseDraft,
) -> Result<(ExerciseLink, ExerciseData)> {
    let mut training = Store::<Training>::get(store, training_id)?;

    let data = Store::<ExerciseData>::create(store, new_data(training_id, LinkKind::Simple, draft))?;
    let link = Store::<ExerciseLink>::create(
        store,
        ExerciseLink {
            id: 0,
            training_id,
            user_id: training.user_id,
            member_ids: IdList::single(data.id),
            finished: false,
        },
    )?;

    training.link_ids.push_unique(link.id);
    Store::<Training>::save(store, training)?;

    tracing::info!(
        "Created simple link {} with exercise {} in training {}",
        link.id,
        data.id,
        training_id
    );
    Ok((link, data))
}

/// The link of `training_id` whose members include `member_id`
///
/// Membership is exact id equality, never a substring match on the text.
pub fn find_link_for_member<S: Store<ExerciseLink>>(
    store: &S,
    training_id: RecordId,
    member_id: RecordId,
) -> Result<ExerciseLink> {
    store
        .list(&|link: &ExerciseLink| {
            link.training_id == training_id && link.member_ids.contains(member_id)
        })?
        .into_iter()
        .next()
        .ok_or(Error::UnknownMember { id: member_id })
}

/// Link a new exercise after the members of `link_id`
///
/// `first_member_id` is the exercise the user started the circuit from and
/// must already be a member. When the link goes from one member to two, the
/// first member's schema is rewritten with every rest set to zero; longer
/// circuits are extended without rewriting anything.
pub fn extend_to_circuit<S: TrainingStore>(
    store: &mut S,
    link_id: RecordId,
    first_member_id: RecordId,
    draft: &ExerciseDraft,
) -> Result<(ExerciseLink, ExerciseData)> {
    let mut link = Store::<ExerciseLink>::get(store, link_id)?;

    let head_id = link.member_ids.first().ok_or_else(|| {
        Error::InvalidTransition(format!("link {} has no members to extend", link_id))
    })?;
    if !link.member_ids.contains(first_member_id) {
        return Err(Error::InvalidTransition(format!(
            "exercise {} is not a member of link {}",
            first_member_id, link_id
        )));
    }

    // Load and rewrite everything that can fail before the first write
    let mut members = link
        .member_ids
        .iter()
        .map(|id| match Store::<ExerciseData>::get(store, id) {
            Err(Error::NotFound { .. }) => Err(Error::UnknownMember { id }),
            other => other,
        })
        .collect::<Result<Vec<_>>>()?;

    if link.member_ids.len() == 1 {
        let head = &mut members[0];
        let stripped = schema::strip_rest(&schema::decode(&head.schema)?);
        head.schema = schema::encode(&stripped);
        tracing::debug!("Zeroed rest of exercise {} for circuit", head_id);
    }

    let data = Store::<ExerciseData>::create(
        store,
        new_data(link.training_id, LinkKind::Circuit, draft),
    )?;
    link.member_ids.push(data.id);
    let link = Store::<ExerciseLink>::save(store, link)?;

    for mut member in members {
        member.kind = LinkKind::Circuit;
        Store::<ExerciseData>::save(store, member)?;
    }

    tracing::info!(
        "Linked exercise {} into circuit {} ({} members)",
        data.id,
        link.id,
        link.member_ids.len()
    );
    Ok((link, data))
}

/// Remove `member_id` from `link_id` and destroy its exercise data
///
/// Returns the updated link, or `None` when no member was left and the link
/// was destroyed along with its entry in the training's list.
pub fn remove_member<S: TrainingStore>(
    store: &mut S,
    link_id: RecordId,
    member_id: RecordId,
) -> Result<Option<ExerciseLink>> {
    let mut link = Store::<ExerciseLink>::get(store, link_id)?;
    if !link.member_ids.remove(member_id) {
        return Err(Error::InvalidTransition(format!(
            "exercise {} is not a member of link {}",
            member_id, link_id
        )));
    }

    destroy_data(store, member_id)?;

    if link.member_ids.is_empty() {
        Store::<ExerciseLink>::destroy(store, link.id)?;
        detach_from_training(store, link.training_id, link.id)?;
        tracing::info!("Removed last member {}, destroyed link {}", member_id, link.id);
        return Ok(None);
    }

    let link = Store::<ExerciseLink>::save(store, link)?;

    if let [survivor] = link.member_ids.as_slice() {
        let mut data = Store::<ExerciseData>::get(store, *survivor)?;
        data.kind = LinkKind::Simple;
        Store::<ExerciseData>::save(store, data)?;
        tracing::info!("Link {} demoted to simple", link.id);
    } else {
        tracing::info!(
            "Removed exercise {} from circuit {} ({} left)",
            member_id,
            link.id,
            link.member_ids.len()
        );
    }

    Ok(Some(link))
}

/// Delete one exercise of a training, wherever it is linked
pub fn delete_exercise<S: TrainingStore>(
    store: &mut S,
    training_id: RecordId,
    data_id: RecordId,
) -> Result<Option<ExerciseLink>> {
    let link = find_link_for_member(&*store, training_id, data_id)?;
    remove_member(store, link.id, data_id)
}

/// Destroy a link, its members not shared with another link, and its entry
/// in the training's list
pub fn destroy_link<S: TrainingStore>(store: &mut S, link_id: RecordId) -> Result<()> {
    let link = Store::<ExerciseLink>::get(store, link_id)?;
    destroy_link_rows(store, &link)?;
    detach_from_training(store, link.training_id, link.id)?;
    tracing::info!("Destroyed link {}", link.id);
    Ok(())
}

/// Rewrite the user-editable fields of an exercise
pub fn update_exercise<S: Store<ExerciseData>>(
    store: &mut S,
    data_id: RecordId,
    draft: &ExerciseDraft,
) -> Result<ExerciseData> {
    let mut data = store.get(data_id)?;
    data.name = draft.name.clone();
    data.muscle_target = draft.muscle_target.clone();
    data.schema = schema::encode(&draft.schema);
    data.notes = draft.notes.clone();
    let data = store.save(data)?;
    tracing::debug!("Updated exercise {}", data.id);
    Ok(data)
}

/// Destroy a training with all of its links and exercises, and drop it from
/// its program
pub fn destroy_training<S: TrainingStore>(store: &mut S, training_id: RecordId) -> Result<()> {
    let training = Store::<Training>::get(store, training_id)?;

    let links = Store::<ExerciseLink>::list(store, &|link: &ExerciseLink| {
        link.training_id == training_id
    })?;
    for link in &links {
        destroy_link_rows(store, link)?;
    }

    // Exercise rows no link points at any more
    let orphans = Store::<ExerciseData>::list(store, &|data: &ExerciseData| {
        data.training_id == training_id
    })?;
    for orphan in orphans {
        tracing::warn!("Destroying unlinked exercise {}", orphan.id);
        Store::<ExerciseData>::destroy(store, orphan.id)?;
    }

    Store::<Training>::destroy(store, training_id)?;

    if let Some(program_id) = training.program_id {
        match Store::<Program>::get(store, program_id) {
            Ok(mut program) => {
                program.training_ids.remove(training_id);
                Store::<Program>::save(store, program)?;
            }
            Err(Error::NotFound { .. }) => {
                tracing::warn!("Training {} points at missing program {}", training_id, program_id);
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!("Destroyed training {} ({} links)", training_id, links.len());
    Ok(())
}

/// A program and its trainings, in the program's list order
pub fn program_trainings<S>(store: &S, program_id: RecordId) -> Result<(Program, Vec<Training>)>
where
    S: Store<Program> + Store<Training>,
{
    let program = Store::<Program>::get(store, program_id)?;
    let trainings = program
        .training_ids
        .iter()
        .map(|id| Store::<Training>::get(store, id))
        .collect::<Result<Vec<_>>>()?;
    Ok((program, trainings))
}

/// Destroy a program together with every training it holds
///
/// Trainings are found both through the program's list and through their own
/// `program_id`, so a training missing from the list is not left orphaned.
pub fn destroy_program<S: TrainingStore>(store: &mut S, program_id: RecordId) -> Result<()> {
    let program = Store::<Program>::get(store, program_id)?;

    let mut training_ids = program.training_ids.clone();
    let owned = Store::<Training>::list(store, &|training: &Training| {
        training.program_id == Some(program_id)
    })?;
    for training in &owned {
        training_ids.push_unique(training.id);
    }

    for training_id in training_ids.iter() {
        match Store::<Training>::get(store, training_id) {
            Ok(_) => destroy_training(store, training_id)?,
            Err(Error::NotFound { .. }) => {
                tracing::warn!("Program {} lists missing training {}", program_id, training_id);
            }
            Err(e) => return Err(e),
        }
    }

    Store::<Program>::destroy(store, program_id)?;
    tracing::info!(
        "Destroyed program {} ({} trainings)",
        program_id,
        training_ids.len()
    );
    Ok(())
}

fn new_data(training_id: RecordId, kind: LinkKind, draft: &ExerciseDraft) -> ExerciseData {
    ExerciseData {
        id: 0,
        training_id,
        name: draft.name.clone(),
        muscle_target: draft.muscle_target.clone(),
        kind,
        schema: schema::encode(&draft.schema),
        notes: draft.notes.clone(),
        performances: String::new(),
        finished: false,
    }
}

fn destroy_link_rows<S: TrainingStore>(store: &mut S, link: &ExerciseLink) -> Result<()> {
    for member_id in link.member_ids.iter() {
        let shared = !Store::<ExerciseLink>::list(store, &|other: &ExerciseLink| {
            other.id != link.id && other.member_ids.contains(member_id)
        })?
        .is_empty();

        if shared {
            tracing::debug!("Keeping exercise {}, still linked elsewhere", member_id);
        } else {
            destroy_data(store, member_id)?;
        }
    }
    Store::<ExerciseLink>::destroy(store, link.id)
}

// A member already gone from the store is only a dangling reference; the
// caller is removing that reference anyway.
fn destroy_data<S: Store<ExerciseData>>(store: &mut S, data_id: RecordId) -> Result<()> {
    match store.destroy(data_id) {
        Err(Error::NotFound { .. }) => {
            tracing::warn!("Exercise {} was already gone", data_id);
            Ok(())
        }
        other => other,
    }
}

fn detach_from_training<S: Store<Training>>(
    store: &mut S,
    training_id: RecordId,
    link_id: RecordId,
) -> Result<()> {
    let mut training = store.get(training_id)?;
    if training.link_ids.remove(link_id) {
        store.save(training)?;
    }
    Ok(())
}
