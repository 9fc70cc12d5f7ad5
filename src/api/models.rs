//! Persona física data model and wire formats.
//!
//! The backend speaks camelCase JSON. Ids may arrive as numbers or strings,
//! dates as plain `YYYY-MM-DD` or full timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};

/// A natural-person record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonaFisica {
    /// Backend identifier, normalized to a string
    #[serde(rename = "idPersonaFisica", deserialize_with = "deserialize_id")]
    pub id: String,
    /// Given name
    pub nombre: String,
    /// Paternal surname
    pub apellido_paterno: String,
    /// Maternal surname; missing or null reads as empty
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub apellido_materno: String,
    /// Tax identifier (RFC), opaque
    pub rfc: String,
    /// Birth date
    #[serde(deserialize_with = "deserialize_date")]
    pub fecha_nacimiento: NaiveDate,
    /// Registration timestamp
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub fecha_registro: DateTime<Utc>,
    /// Last-update timestamp
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub fecha_actualizacion: DateTime<Utc>,
    /// Active flag
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub activo: bool,
}

/// Payload sent when creating or replacing a record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPersonaFisica {
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub rfc: String,
    pub fecha_nacimiento: NaiveDate,
    pub activo: bool,
}

/// Response body that is either bare or wrapped in `{"data": ...}`.
#[derive(Debug)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    /// An object with a `data` key is unwrapped; anything else decodes as `T`.
    ///
    /// Errors from decoding `T` are passed through unchanged.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = serde_json::Value::deserialize(deserializer)?;
        match value.as_object_mut().and_then(|map| map.remove("data")) {
            Some(data) => T::deserialize(data)
                .map(|data| Envelope::Wrapped { data })
                .map_err(de::Error::custom),
            None => T::deserialize(value)
                .map(Envelope::Bare)
                .map_err(de::Error::custom),
        }
    }
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Parse a date given either as `YYYY-MM-DD` or as a full timestamp.
///
/// Timestamps keep the calendar date of their own offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    parse_naive_datetime(raw).map(|stamp| stamp.date())
}

/// Parse a timestamp in RFC 3339, or naive form interpreted as UTC.
///
/// A bare date is taken as midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Utc));
    }
    if let Some(stamp) = parse_naive_datetime(raw) {
        return Some(stamp.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|stamp| stamp.and_utc())
}

fn parse_naive_datetime(raw: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
