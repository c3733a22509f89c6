//! Performance history codec.
//!
//! Every logged session is a date followed by one fragment per set, joined
//! with `-`; sessions are joined with `/`:
//!
//! ```text
//! 2024-01-01-1,10,40,60-2,8,40,60/2024-01-03-1,10,42.5,60
//! ```
//!
//! Dates themselves contain `-`, so a session's date is the run of leading
//! tokens that carry no `,`. Every later token is a set fragment
//! `"<set_number>,<reps>,<weight>,<rest_seconds>"`.
//!
//! The field is append-only: new sessions are concatenated by [`append`]
//! and prior text is never rewritten.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const SESSION_SEPARATOR: char = '/';
pub const FRAGMENT_SEPARATOR: char = '-';
pub const FIELD_SEPARATOR: char = ',';

/// One performed set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetResult {
    #[serde(rename = "set")]
    pub set_number: u32,
    pub reps: u32,
    pub weight: f64,
    #[serde(rename = "rest")]
    pub rest_seconds: u32,
}

impl SetResult {
    pub fn new(set_number: u32, reps: u32, weight: f64, rest_seconds: u32) -> Self {
        Self {
            set_number,
            reps,
            weight,
            rest_seconds,
        }
    }
}

impl std::str::FromStr for SetResult {
    type Err = Error;

    /// Parse one `"<set_number>,<reps>,<weight>,<rest_seconds>"` fragment
    fn from_str(s: &str) -> Result<Self> {
        decode_set(s.trim(), "input")
    }
}

/// One training session's logged sets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub date: String,
    #[serde(rename = "stats")]
    pub sets: Vec<SetResult>,
}

impl SessionRecord {
    pub fn new(date: impl Into<String>, sets: Vec<SetResult>) -> Self {
        Self {
            date: date.into(),
            sets,
        }
    }
}

/// Sessions in the order they were appended
pub type PerformanceHistory = Vec<SessionRecord>;

/// Today's local date in the `YYYY-MM-DD` form used for session dates
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Encode a whole history to its persisted text form
pub fn encode(history: &[SessionRecord]) -> Result<String> {
    let sessions = history
        .iter()
        .map(encode_session)
        .collect::<Result<Vec<_>>>()?;
    Ok(sessions.join(&SESSION_SEPARATOR.to_string()))
}

/// Encode a single session as the fragment [`append`] expects
pub fn encode_session(session: &SessionRecord) -> Result<String> {
    validate_date(&session.date)?;

    let mut out = session.date.clone();
    for set in &session.sets {
        if !set.weight.is_finite() || set.weight < 0.0 {
            return Err(Error::MalformedPerformance(format!(
                "weight {} of set {} on {} cannot be encoded",
                set.weight, set.set_number, session.date
            )));
        }
        // -0.0 displays as "-0", and that '-' would split the fragment
        let weight = if set.weight == 0.0 { 0.0 } else { set.weight };
        out.push(FRAGMENT_SEPARATOR);
        out.push_str(&format!(
            "{}{sep}{}{sep}{}{sep}{}",
            set.set_number,
            set.reps,
            weight,
            set.rest_seconds,
            sep = FIELD_SEPARATOR
        ));
    }
    Ok(out)
}

// A date must survive the split rules: no session or field separators and no
// empty `-` segments.
fn validate_date(date: &str) -> Result<()> {
    if date.is_empty() {
        return Err(Error::MalformedPerformance("session has no date".into()));
    }
    if date.contains(SESSION_SEPARATOR) || date.contains(FIELD_SEPARATOR) {
        return Err(Error::MalformedPerformance(format!(
            "date '{}' contains a reserved separator",
            date
        )));
    }
    if date.split(FRAGMENT_SEPARATOR).any(str::is_empty) {
        return Err(Error::MalformedPerformance(format!(
            "date '{}' has an empty segment",
            date
        )));
    }
    Ok(())
}

/// Decode a persisted performance field
///
/// Empty fragments between `/` are skipped, so `""` and a stray leading or
/// trailing `/` never produce a phantom session.
pub fn decode(text: &str) -> Result<PerformanceHistory> {
    let history = text
        .split(SESSION_SEPARATOR)
        .filter(|fragment| !fragment.is_empty())
        .map(decode_session)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Decoded {} sessions", history.len());
    Ok(history)
}

fn decode_session(fragment: &str) -> Result<SessionRecord> {
    let tokens: Vec<&str> = fragment.split(FRAGMENT_SEPARATOR).collect();
    if tokens.iter().any(|token| token.is_empty()) {
        return Err(Error::MalformedPerformance(format!(
            "session '{}' has an empty fragment",
            fragment
        )));
    }

    let date_len = tokens
        .iter()
        .take_while(|token| !token.contains(FIELD_SEPARATOR))
        .count();
    if date_len == 0 {
        return Err(Error::MalformedPerformance(format!(
            "session '{}' does not start with a date",
            fragment
        )));
    }

    let date = tokens[..date_len].join(&FRAGMENT_SEPARATOR.to_string());
    let sets = tokens[date_len..]
        .iter()
        .map(|token| decode_set(token, &date))
        .collect::<Result<Vec<_>>>()?;

    Ok(SessionRecord { date, sets })
}

fn decode_set(token: &str, date: &str) -> Result<SetResult> {
    let fields: Vec<&str> = token.split(FIELD_SEPARATOR).collect();
    if fields.len() != 4 {
        return Err(Error::MalformedPerformance(format!(
            "set '{}' on {} has {} fields, expected 4",
            token,
            date,
            fields.len()
        )));
    }

    let malformed = |what: &str, value: &str| {
        Error::MalformedPerformance(format!(
            "{} '{}' in set '{}' on {} is not valid",
            what, value, token, date
        ))
    };
    let whole = |what: &str, value: &str| {
        Some(value)
            .filter(|v| is_digits(v))
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| malformed(what, value))
    };

    let weight = Some(fields[2])
        .filter(|w| is_decimal(w))
        .and_then(|w| w.parse::<f64>().ok())
        .filter(|w| w.is_finite())
        .ok_or_else(|| malformed("weight", fields[2]))?;

    Ok(SetResult {
        set_number: whole("set number", fields[0])?,
        reps: whole("reps", fields[1])?,
        weight,
        rest_seconds: whole("rest", fields[3])?,
    })
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

// The only weight shapes the encoder writes: "40" or "42.5"
fn is_decimal(token: &str) -> bool {
    match token.split_once('.') {
        Some((whole, fraction)) => is_digits(whole) && is_digits(fraction),
        None => is_digits(token),
    }
}

/// Append one encoded session to an existing performance field
///
/// Prior content is neither parsed nor rewritten.
pub fn append(existing: &str, fragment: &str) -> String {
    if fragment.is_empty() {
        return existing.to_string();
    }

    let mut out = String::with_capacity(existing.len() + fragment.len() + 1);
    out.push_str(existing);
    if !existing.is_empty()
        && !existing.ends_with(SESSION_SEPARATOR)
        && !fragment.starts_with(SESSION_SEPARATOR)
    {
        out.push(SESSION_SEPARATOR);
    }
    out.push_str(fragment);
    out
}
