//! Field presence rules shared by the handlers.
//!
//! A value is present when it is a non-empty string, any number (`0`
//! included) or `true`. `null`, `false`, `""` and missing keys are not.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

use crate::error::ApiError;

pub fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some("true".into()),
        _ => None,
    })
}

/// A record id as sent by the client: a JSON integer or a numeric string.
/// Missing, `null` and `""` are [`RecordId::Absent`]; anything else that is
/// not an `i32` is [`RecordId::Invalid`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RecordId {
    #[default]
    Absent,
    Id(i32),
    Invalid,
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => RecordId::Absent,
            Some(Value::String(s)) if s.trim().is_empty() => RecordId::Absent,
            Some(Value::String(s)) => s.trim().parse().map_or(RecordId::Invalid, RecordId::Id),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map_or(RecordId::Invalid, RecordId::Id),
            Some(_) => RecordId::Invalid,
        })
    }
}

impl RecordId {
    pub fn required(self) -> Result<i32, ApiError> {
        match self {
            RecordId::Id(id) => Ok(id),
            RecordId::Absent => Err(ApiError::EmptyValue),
            RecordId::Invalid => Err(ApiError::InvalidId),
        }
    }

    pub fn optional(self) -> Result<Option<i32>, ApiError> {
        match self {
            RecordId::Id(id) => Ok(Some(id)),
            RecordId::Absent => Ok(None),
            RecordId::Invalid => Err(ApiError::InvalidId),
        }
    }
}

pub fn required(value: Option<String>) -> Result<String, ApiError> {
    value.filter(|v| !v.is_empty()).ok_or(ApiError::EmptyValue)
}

/// Missing, `null` or empty `due` means "no due date". Integers are Unix
/// milliseconds; strings are RFC 3339 or naive date-times read as UTC.
pub fn parse_due(raw: Option<Value>) -> Result<Option<OffsetDateTime>, ApiError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_due_text(s.trim()).map(Some),
        Some(Value::Number(n)) => {
            let ms = n.as_i64().ok_or(ApiError::InvalidDue)?;
            OffsetDateTime::from_unix_timestamp_nanos(ms as i128 * 1_000_000)
                .map(Some)
                .map_err(|_| ApiError::InvalidDue)
        }
        Some(_) => Err(ApiError::InvalidDue),
    }
}

fn parse_due_text(raw: &str) -> Result<OffsetDateTime, ApiError> {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(dt.to_offset(UtcOffset::UTC));
    }

    // `2024-01-01 10:00` is read like `2024-01-01T10:00`.
    let mut naive = raw.to_string();
    if naive.len() > 10 && naive.is_char_boundary(10) && naive[10..].starts_with(' ') {
        naive.replace_range(10..11, "T");
    }
    let naive_formats = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ];
    if let Some(dt) = naive_formats
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(&naive, format).ok())
    {
        return Ok(dt.assume_utc());
    }

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| ApiError::InvalidDue)
}
