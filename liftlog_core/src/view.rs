//! Decoded exercise views handed to the rendering layer.
//!
//! - [`minimize`]: identity fields plus the schema summary, for lists
//! - [`expand`]: the summary plus the itemized schema and decoded history
//! - [`resolve`]: a whole training slot, simple or circuit

use crate::schema::{self, SetBlock, Tally};
use crate::store::Store;
use crate::{
    performance, Error, ExerciseData, ExerciseLink, LinkKind, PerformanceHistory, RecordId,
    Result, Training,
};
use serde::Serialize;

/// Summary view of one exercise
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MinimalView {
    pub id: RecordId,
    pub name: String,
    pub muscle_target: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    #[serde(rename = "set")]
    pub set_count: u32,
    pub reps: Tally,
    pub rest: Tally,
    pub notes: String,
    pub training_id: RecordId,
    pub finished: bool,
}

/// Detail view of one exercise
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FullView {
    #[serde(flatten)]
    pub summary: MinimalView,
    pub schema: Vec<SetBlock>,
    pub performances: PerformanceHistory,
}

/// The decoded members of a training slot
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Members {
    Simple(Box<FullView>),
    Circuit(Vec<FullView>),
}

impl Members {
    pub fn as_slice(&self) -> &[FullView] {
        match self {
            Members::Simple(view) => std::slice::from_ref(view.as_ref()),
            Members::Circuit(views) => views,
        }
    }
}

/// A training slot with its members decoded
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ResolvedExercise {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    #[serde(rename = "exercises_list")]
    pub members: Members,
    /// Copied from the last member resolved, not "all members finished"
    pub finished: bool,
}

/// Decode the schema and summarize it alongside the identity fields
pub fn minimize(data: &ExerciseData) -> Result<MinimalView> {
    let schema = schema::decode(&data.schema)?;
    Ok(minimal_from(data, &schema))
}

fn minimal_from(data: &ExerciseData, decoded: &schema::Schema) -> MinimalView {
    let summary = schema::summarize(decoded);
    MinimalView {
        id: data.id,
        name: data.name.clone(),
        muscle_target: data.muscle_target.clone(),
        kind: data.kind,
        set_count: summary.sets,
        reps: summary.reps,
        rest: summary.rest,
        notes: data.notes.clone(),
        training_id: data.training_id,
        finished: data.finished,
    }
}

/// Decode the schema itemized and the full performance history
pub fn expand(data: &ExerciseData) -> Result<FullView> {
    let decoded = schema::decode(&data.schema)?;
    let performances = performance::decode(&data.performances)?;

    Ok(FullView {
        summary: minimal_from(data, &decoded),
        schema: decoded.into_blocks(),
        performances,
    })
}

/// Decode every member of `link`
///
/// Members are expanded in list order. A member id the store cannot find, or
/// one that belongs to another training, is reported as `UnknownMember`.
pub fn resolve<S>(link: &ExerciseLink, store: &S) -> Result<ResolvedExercise>
where
    S: Store<ExerciseData>,
{
    let lookup = |id: RecordId| -> Result<FullView> {
        let data = match store.get(id) {
            Ok(data) => data,
            Err(Error::NotFound { .. }) => return Err(Error::UnknownMember { id }),
            Err(e) => return Err(e),
        };
        if data.training_id != link.training_id {
            tracing::warn!(
                "Link {} lists exercise {} from training {}",
                link.id,
                id,
                data.training_id
            );
            return Err(Error::UnknownMember { id });
        }
        expand(&data)
    };

    let (members, finished) = match link.member_ids.as_slice() {
        [] => {
            return Err(Error::MalformedIdList(format!(
                "link {} has no members",
                link.id
            )))
        }
        [single] => {
            let view = lookup(*single)?;
            let finished = view.summary.finished;
            (Members::Simple(Box::new(view)), finished)
        }
        ids => {
            let mut views = Vec::with_capacity(ids.len());
            let mut finished = false;
            for &id in ids {
                let view = lookup(id)?;
                finished = view.summary.finished;
                views.push(view);
            }
            (Members::Circuit(views), finished)
        }
    };

    Ok(ResolvedExercise {
        id: link.id,
        kind: link.kind(),
        members,
        finished,
    })
}

/// Resolve every slot of a training in the training's link order
pub fn resolve_training<S>(store: &S, training_id: RecordId) -> Result<Vec<ResolvedExercise>>
where
    S: Store<ExerciseData> + Store<ExerciseLink> + Store<Training>,
{
    let training = Store::<Training>::get(store, training_id)?;
    training
        .link_ids
        .iter()
        .map(|link_id| {
            let link = Store::<ExerciseLink>::get(store, link_id)?;
            resolve(&link, store)
        })
        .collect()
}
