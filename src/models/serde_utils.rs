//! Lenient decoders for backend fields that do not always keep their shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};

/// `null` decodes as the type's default
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A reference the backend sends either as a bare id or populated
#[derive(Deserialize)]
#[serde(untagged)]
enum RefShape {
    Id(String),
    Populated {
        #[serde(rename = "_id", default)]
        id: Option<String>,
    },
}

impl RefShape {
    fn into_id(self) -> Option<String> {
        match self {
            Self::Id(id) => Some(id),
            Self::Populated { id } => id,
        }
    }
}

/// Id of a reference that may be `null`, a string or a `{ _id, .. }` object
pub fn optional_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RefShape>::deserialize(deserializer)?.and_then(RefShape::into_id))
}

/// Like [`optional_ref`], with a missing id decoding as an empty string
pub fn required_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_ref(deserializer)?.unwrap_or_default())
}

/// Timestamp that may be RFC 3339, a naive datetime, or a bare date (midnight UTC)
pub fn flexible_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_datetime(raw)
        .map(Some)
        .ok_or_else(|| DeError::custom(format!("unrecognised date: {raw}")))
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
