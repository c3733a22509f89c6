//! Set schema codec.
//!
//! A schema is the plan for an exercise: an ordered list of blocks, each
//! `"<set_count>,<reps>,<rest_seconds>"`, joined with `-`:
//!
//! ```text
//! 3,10,60-2,8,90
//! ```
//!
//! Decoding is strict: every block must have exactly three numeric fields.

use crate::{Error, Result};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const BLOCK_SEPARATOR: char = '-';
pub const FIELD_SEPARATOR: char = ',';

/// Separator used when a summary has to list differing block values
pub const SUMMARY_SEPARATOR: &str = ", ";

/// One segment of a schema sharing the same reps and rest
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetBlock {
    #[serde(rename = "set")]
    pub set_count: u32,
    pub reps: u32,
    #[serde(rename = "rest")]
    pub rest_seconds: u32,
}

impl SetBlock {
    pub fn new(set_count: u32, reps: u32, rest_seconds: u32) -> Self {
        Self {
            set_count,
            reps,
            rest_seconds,
        }
    }
}

/// An ordered, non-empty sequence of set blocks
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Schema(Vec<SetBlock>);

impl Schema {
    pub fn new(blocks: Vec<SetBlock>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(Error::MalformedSchema("schema has no blocks".into()));
        }
        Ok(Self(blocks))
    }

    pub fn blocks(&self) -> &[SetBlock] {
        &self.0
    }

    pub fn into_blocks(self) -> Vec<SetBlock> {
        self.0
    }
}

/// A per-field summary value: one number when every block agrees, the
/// itemized list otherwise
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tally {
    Uniform(u32),
    Varied(Vec<u32>),
}

impl Tally {
    fn from_values(values: Vec<u32>) -> Self {
        match values.first() {
            Some(&first) if values.iter().all(|&v| v == first) => Tally::Uniform(first),
            _ => Tally::Varied(values),
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tally::Uniform(value) => write!(f, "{}", value),
            Tally::Varied(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(SUMMARY_SEPARATOR)?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
        }
    }
}

// Renderers get a number for uniform values and the joined text otherwise.
impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Tally::Uniform(value) => serializer.serialize_u32(*value),
            Tally::Varied(_) => serializer.collect_str(self),
        }
    }
}

/// Effective (sets, reps, rest) of a schema, for display
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Summary {
    pub sets: u32,
    pub reps: Tally,
    pub rest: Tally,
}

/// Encode a schema to its persisted text form
pub fn encode(schema: &Schema) -> String {
    schema
        .blocks()
        .iter()
        .map(|block| {
            format!(
                "{}{sep}{}{sep}{}",
                block.set_count,
                block.reps,
                block.rest_seconds,
                sep = FIELD_SEPARATOR
            )
        })
        .collect::<Vec<_>>()
        .join(&BLOCK_SEPARATOR.to_string())
}

/// Decode a persisted schema field
pub fn decode(text: &str) -> Result<Schema> {
    if text.is_empty() {
        return Err(Error::MalformedSchema("empty schema field".into()));
    }

    let blocks = text
        .split(BLOCK_SEPARATOR)
        .map(decode_block)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Decoded schema with {} blocks", blocks.len());
    Schema::new(blocks)
}

fn decode_block(block: &str) -> Result<SetBlock> {
    let fields: Vec<&str> = block.split(FIELD_SEPARATOR).collect();
    if fields.len() != 3 {
        return Err(Error::MalformedSchema(format!(
            "block '{}' has {} fields, expected 3",
            block,
            fields.len()
        )));
    }

    let number = |token: &str, what: &str| {
        Some(token)
            .filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|t| t.parse::<u32>().ok())
            .ok_or_else(|| {
                Error::MalformedSchema(format!(
                    "{} '{}' in block '{}' is not a number",
                    what, token, block
                ))
            })
    };

    Ok(SetBlock {
        set_count: number(fields[0], "set count")?,
        reps: number(fields[1], "reps")?,
        rest_seconds: number(fields[2], "rest")?,
    })
}

/// Summarize a schema into its effective set count, reps and rest
pub fn summarize(schema: &Schema) -> Summary {
    let blocks = schema.blocks();
    Summary {
        sets: blocks.iter().map(|b| b.set_count).max().unwrap_or(0),
        reps: Tally::from_values(blocks.iter().map(|b| b.reps).collect()),
        rest: Tally::from_values(blocks.iter().map(|b| b.rest_seconds).collect()),
    }
}

/// Copy of `schema` with every block's rest set to zero
///
/// Circuit members other than the last rest only after the whole rotation.
pub fn strip_rest(schema: &Schema) -> Schema {
    Schema(
        schema
            .blocks()
            .iter()
            .map(|block| SetBlock {
                rest_seconds: 0,
                ..*block
            })
            .collect(),
    )
}

impl FromStr for Schema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}
