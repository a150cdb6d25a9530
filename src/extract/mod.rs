//! Response extraction: isolate the delimited payload of an agent reply and
//! classify it.

use serde_json::Value;
use strum::Display;

use crate::types::Observation;

pub const START_DELIMITER: &str = "<json_response>";
pub const END_DELIMITER: &str = "</json_response>";

/// Payloads meaning "no observations". Compared exactly, after trimming.
pub const EMPTY_SENTINELS: [&str; 4] = ["", "null", "[]", "[null]"];

/// What one agent reply amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The agent explicitly reported nothing (more) to extract.
    Empty,
    /// Well-formed rows, in the order the agent listed them.
    Parsed(Vec<Observation>),
    /// The reply could not be read as structured data.
    Malformed(MalformedReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// Start delimiter absent, or no end delimiter after it.
    MissingDelimiter,
    InvalidJson(String),
    UnexpectedShape(String),
}

/// Outcome discriminant, for logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeKind {
    Empty,
    Parsed,
    Malformed,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Empty => OutcomeKind::Empty,
            Self::Parsed(_) => OutcomeKind::Parsed,
            Self::Malformed(_) => OutcomeKind::Malformed,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Parsed(rows) => rows.len(),
            _ => 0,
        }
    }
}

/// Text strictly between the first start delimiter and the first end
/// delimiter after it.
pub fn payload(raw: &str) -> Option<&str> {
    let start = raw.find(START_DELIMITER)? + START_DELIMITER.len();
    let end = start + raw[start..].find(END_DELIMITER)?;
    Some(&raw[start..end])
}

/// Classify a raw agent reply.
pub fn extract(raw: &str) -> Outcome {
    let Some(payload) = payload(raw) else {
        return Outcome::Malformed(MalformedReason::MissingDelimiter);
    };
    let trimmed = payload.trim();
    if EMPTY_SENTINELS.contains(&trimmed) {
        return Outcome::Empty;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => rows(value),
        Err(e) => Outcome::Malformed(MalformedReason::InvalidJson(e.to_string())),
    }
}

fn rows(value: Value) -> Outcome {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(record) => vec![Value::Object(record)],
        other => {
            return Outcome::Malformed(MalformedReason::UnexpectedShape(format!(
                "expected a list of records, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Null => {}
            Value::Object(record) if record.is_empty() => {}
            Value::Object(record) => rows.push(Observation::from_record(record)),
            other => {
                return Outcome::Malformed(MalformedReason::UnexpectedShape(format!(
                    "element {index} is {}, not a record",
                    json_kind(&other)
                )))
            }
        }
    }

    // Only the exact sentinels mean "nothing found".
    if rows.is_empty() {
        Outcome::Malformed(MalformedReason::UnexpectedShape(
            "payload holds no records".to_string(),
        ))
    } else {
        Outcome::Parsed(rows)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
