//! Grid row projection.
//!
//! Turns stored records into display rows with human-readable dates.

use crate::api::PersonaFisica;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Write;

/// chrono format strings used in place of a browser locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormats {
    /// Format for calendar dates
    pub date: String,
    /// Format for timestamps
    pub datetime: String,
}

impl DateFormats {
    pub const DEFAULT_DATE: &'static str = "%d/%m/%Y";
    pub const DEFAULT_DATETIME: &'static str = "%d/%m/%Y, %H:%M:%S";

    /// Build formats from patterns, replacing any invalid pattern with its default.
    pub fn new(date: &str, datetime: &str) -> Self {
        Self {
            date: checked_format(date, Self::DEFAULT_DATE),
            datetime: checked_format(datetime, Self::DEFAULT_DATETIME),
        }
    }
}

impl Default for DateFormats {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DATE, Self::DEFAULT_DATETIME)
    }
}

fn checked_format(pattern: &str, fallback: &str) -> String {
    if is_valid_format(pattern) {
        pattern.to_string()
    } else {
        tracing::warn!(pattern, fallback, "invalid date format, using fallback");
        fallback.to_string()
    }
}

/// Whether chrono can render `pattern` without a formatting error.
pub fn is_valid_format(pattern: &str) -> bool {
    !pattern.is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// One display row of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaRow {
    pub id: String,
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub rfc: String,
    pub fecha_nacimiento: String,
    pub fecha_registro: String,
    pub fecha_actualizacion: String,
    pub activo: bool,
}

/// Project a record into a row, rendering timestamps in the local timezone.
pub fn to_row(persona: &PersonaFisica, formats: &DateFormats) -> PersonaRow {
    to_row_in(persona, formats, &Local)
}

/// Project a record into a row, rendering timestamps in `tz`.
pub fn to_row_in<Tz>(persona: &PersonaFisica, formats: &DateFormats, tz: &Tz) -> PersonaRow
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    PersonaRow {
        id: persona.id.clone(),
        nombre: persona.nombre.clone(),
        apellido_paterno: persona.apellido_paterno.clone(),
        apellido_materno: persona.apellido_materno.clone(),
        rfc: persona.rfc.clone(),
        fecha_nacimiento: render(persona.fecha_nacimiento.format(&formats.date))
            .unwrap_or_else(|| persona.fecha_nacimiento.format(DateFormats::DEFAULT_DATE).to_string()),
        fecha_registro: format_timestamp(&persona.fecha_registro, &formats.datetime, tz),
        fecha_actualizacion: format_timestamp(&persona.fecha_actualizacion, &formats.datetime, tz),
        activo: persona.activo,
    }
}

fn format_timestamp<Tz>(stamp: &DateTime<Utc>, pattern: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let local = stamp.with_timezone(tz);
    render(local.format(pattern))
        .unwrap_or_else(|| local.format(DateFormats::DEFAULT_DATETIME).to_string())
}

/// Render a chrono formatter, or `None` when the pattern does not apply to
/// the value (e.g. `%H` on a plain date).
fn render(formatted: impl std::fmt::Display) -> Option<String> {
    let mut out = String::new();
    write!(out, "{formatted}").ok()?;
    Some(out)
}

/// Project the whole collection, preserving order.
pub fn to_rows(personas: &[PersonaFisica], formats: &DateFormats) -> Vec<PersonaRow> {
    personas.iter().map(|p| to_row(p, formats)).collect()
}
