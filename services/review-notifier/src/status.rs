//! Review status records and their mapping to notification text

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// One tracked submission as returned by the status API.
///
/// Both fields are optional here so that a record missing them is reported
/// as [`MappingError::MalformedRecord`] instead of failing the whole response.
/// Use [`StatusRecord::from_value`] to read an entry of the raw `homeworks`
/// list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(default)]
    pub homework_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl StatusRecord {
    pub fn new(homework_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            homework_name: Some(homework_name.into()),
            status: Some(status.into()),
        }
    }

    /// Read one raw entry of the `homeworks` list
    pub fn from_value(value: &serde_json::Value) -> Result<Self, MappingError> {
        if !value.is_object() {
            return Err(MappingError::MalformedRecord(format!(
                "expected an object, got {}",
                json_kind(value)
            )));
        }
        Self::deserialize(value).map_err(|e| MappingError::MalformedRecord(e.to_string()))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Review state of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Reviewing,
    Rejected,
    Approved,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [
        ReviewStatus::Reviewing,
        ReviewStatus::Rejected,
        ReviewStatus::Approved,
    ];

    /// The wire code used by the status API
    pub fn code(self) -> &'static str {
        match self {
            ReviewStatus::Reviewing => "reviewing",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Approved => "approved",
        }
    }

    /// Human-readable sentence for this status
    pub fn verdict(self) -> &'static str {
        match self {
            ReviewStatus::Reviewing => "Taken into review.",
            ReviewStatus::Rejected => "Issues were found.",
            ReviewStatus::Approved => "Approved — proceed to the next unit.",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ReviewStatus {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reviewing" => Ok(ReviewStatus::Reviewing),
            "rejected" => Ok(ReviewStatus::Rejected),
            "approved" => Ok(ReviewStatus::Approved),
            other => Err(MappingError::UnknownStatus(other.to_string())),
        }
    }
}

/// Turn a status record into the message sent to the chat
pub fn map_status(record: &StatusRecord) -> Result<String, MappingError> {
    let name = record
        .homework_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| MappingError::MalformedRecord("missing homework_name".to_string()))?;
    let code = record
        .status
        .as_deref()
        .ok_or_else(|| MappingError::MalformedRecord("missing status".to_string()))?;
    let status: ReviewStatus = code.parse()?;

    Ok(format!(
        "Your submission \"{}\" has been reviewed!\n\n{}",
        name,
        status.verdict()
    ))
}
