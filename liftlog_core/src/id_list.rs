//! Ordered id lists with a comma-separated text form.
//!
//! Links, trainings and programs each keep an ordered list of record ids. In
//! memory this is a plain `Vec<RecordId>`; the persisted form is
//! `"<id>[,<id>]*"` with no trailing separator. Membership is decided on parsed
//! ids, never on substrings of the text, so `"1,12,21"` does not contain `2`.

use crate::{Error, RecordId, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ID_SEPARATOR: char = ',';

/// An ordered list of record ids
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IdList(Vec<RecordId>);

impl IdList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(id: RecordId) -> Self {
        Self(vec![id])
    }

    /// Parse the persisted text form.
    ///
    /// Empty tokens are skipped so that rows written with a trailing comma
    /// still load; any other non-numeric token is an error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut ids = Vec::new();
        for token in text.split(ID_SEPARATOR) {
            if token.is_empty() {
                continue;
            }
            let id = Some(token)
                .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|t| t.parse::<RecordId>().ok())
                .ok_or_else(|| {
                    Error::MalformedIdList(format!("'{}' is not a record id in '{}'", token, text))
                })?;
            ids.push(id);
        }
        Ok(Self(ids))
    }

    /// Render the persisted text form
    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.0.contains(&id)
    }

    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.0.iter().position(|&candidate| candidate == id)
    }

    /// Append `id` at the end of the list
    pub fn push(&mut self, id: RecordId) {
        self.0.push(id);
    }

    /// Append `id` unless it is already present. Returns whether it was added.
    pub fn push_unique(&mut self, id: RecordId) -> bool {
        if self.contains(id) {
            false
        } else {
            self.0.push(id);
            true
        }
    }

    /// Drop every occurrence of `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: RecordId) -> bool {
        let before = self.0.len();
        self.0.retain(|&candidate| candidate != id);
        self.0.len() != before
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<RecordId> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[RecordId] {
        &self.0
    }
}

impl From<Vec<RecordId>> for IdList {
    fn from(ids: Vec<RecordId>) -> Self {
        Self(ids)
    }
}

impl FromStr for IdList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, id) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "{}", ID_SEPARATOR)?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

impl Serialize for IdList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IdList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        IdList::parse(&text).map_err(serde::de::Error::custom)
    }
}
