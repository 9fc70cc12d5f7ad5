//! Persona form state and validation.
//!
//! Backs both the creation modal and the edit screen.

use crate::api::{NewPersonaFisica, PersonaFisica};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

/// Form fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Nombre,
    ApellidoPaterno,
    ApellidoMaterno,
    Rfc,
    FechaNacimiento,
    Activo,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Nombre,
        FormField::ApellidoPaterno,
        FormField::ApellidoMaterno,
        FormField::Rfc,
        FormField::FechaNacimiento,
        FormField::Activo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Nombre => "Nombre",
            FormField::ApellidoPaterno => "Apellido Paterno",
            FormField::ApellidoMaterno => "Apellido Materno",
            FormField::Rfc => "RFC",
            FormField::FechaNacimiento => "Fecha de Nacimiento",
            FormField::Activo => "Activo",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} es obligatorio")]
    Required(&'static str),
    #[error("RFC inválido: {0}")]
    InvalidRfc(String),
    #[error("fecha inválida '{0}', use AAAA-MM-DD")]
    InvalidDate(String),
    #[error("la fecha de nacimiento {0} está en el futuro")]
    FutureDate(NaiveDate),
}

/// What a key press did to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    /// Keep editing
    Editing,
    /// User asked to submit
    Submit,
    /// User asked to close without saving
    Cancel,
}

/// Editable persona fields plus focus and the last validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaForm {
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: String,
    pub rfc: String,
    pub fecha_nacimiento: String,
    pub activo: bool,
    pub focus: FormField,
    pub error: Option<String>,
    /// A submission is in flight
    pub submitting: bool,
}

impl Default for PersonaForm {
    fn default() -> Self {
        Self {
            nombre: String::new(),
            apellido_paterno: String::new(),
            apellido_materno: String::new(),
            rfc: String::new(),
            fecha_nacimiento: String::new(),
            activo: true,
            focus: FormField::Nombre,
            error: None,
            submitting: false,
        }
    }
}

impl PersonaForm {
    /// Form prefilled from an existing record.
    pub fn from_persona(persona: &PersonaFisica) -> Self {
        Self {
            nombre: persona.nombre.clone(),
            apellido_paterno: persona.apellido_paterno.clone(),
            apellido_materno: persona.apellido_materno.clone(),
            rfc: persona.rfc.clone(),
            fecha_nacimiento: persona.fecha_nacimiento.format("%Y-%m-%d").to_string(),
            activo: persona.activo,
            ..Self::default()
        }
    }

    /// Text shown for a field.
    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Nombre => self.nombre.clone(),
            FormField::ApellidoPaterno => self.apellido_paterno.clone(),
            FormField::ApellidoMaterno => self.apellido_materno.clone(),
            FormField::Rfc => self.rfc.clone(),
            FormField::FechaNacimiento => self.fecha_nacimiento.clone(),
            FormField::Activo => if self.activo { "Sí" } else { "No" }.to_string(),
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Nombre => Some(&mut self.nombre),
            FormField::ApellidoPaterno => Some(&mut self.apellido_paterno),
            FormField::ApellidoMaterno => Some(&mut self.apellido_materno),
            FormField::Rfc => Some(&mut self.rfc),
            FormField::FechaNacimiento => Some(&mut self.fecha_nacimiento),
            FormField::Activo => None,
        }
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.index() + 1) % FormField::ALL.len();
        self.focus = FormField::ALL[next];
    }

    pub fn focus_prev(&mut self) {
        let len = FormField::ALL.len();
        self.focus = FormField::ALL[(self.focus.index() + len - 1) % len];
    }

    pub fn insert_char(&mut self, ch: char) {
        if let Some(text) = self.text_mut(self.focus) {
            text.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut(self.focus) {
            text.pop();
        }
    }

    pub fn toggle_activo(&mut self) {
        self.activo = !self.activo;
    }

    /// Apply a key press.
    ///
    /// # Details
    /// Tab/Down and Shift-Tab/Up move focus, Space toggles Activo when it
    /// has focus, Enter submits, Esc cancels. Keys are ignored while a
    /// submission is in flight, except Esc.
    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        if self.submitting && key.code != KeyCode::Esc {
            return FormOutcome::Editing;
        }

        match key.code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(' ') if self.focus == FormField::Activo => self.toggle_activo(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c)
            }
            _ => {}
        }
        FormOutcome::Editing
    }

    /// Validate the fields into a payload.
    ///
    /// # Arguments
    /// * `today` - Upper bound for the birth date
    ///
    /// # Returns
    /// * `Result<NewPersonaFisica, FormError>` - Trimmed payload with an
    ///   uppercased RFC, or the first failing field
    pub fn validate(&self, today: NaiveDate) -> Result<NewPersonaFisica, FormError> {
        let nombre = required(&self.nombre, FormField::Nombre)?;
        let apellido_paterno = required(&self.apellido_paterno, FormField::ApellidoPaterno)?;
        let rfc = validate_rfc(&self.rfc)?;

        let raw_date = self.fecha_nacimiento.trim();
        if raw_date.is_empty() {
            return Err(FormError::Required(FormField::FechaNacimiento.label()));
        }
        let fecha_nacimiento = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(raw_date.to_string()))?;
        if fecha_nacimiento > today {
            return Err(FormError::FutureDate(fecha_nacimiento));
        }

        Ok(NewPersonaFisica {
            nombre,
            apellido_paterno,
            apellido_materno: self.apellido_materno.trim().to_string(),
            rfc,
            fecha_nacimiento,
            activo: self.activo,
        })
    }
}

fn required(value: &str, field: FormField) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Required(field.label()))
    } else {
        Ok(value.to_string())
    }
}

/// RFC: 12 characters for companies, 13 for individuals; letters, digits,
/// `&` and `Ñ`.
fn validate_rfc(raw: &str) -> Result<String, FormError> {
    let rfc = raw.trim().to_uppercase();
    if rfc.is_empty() {
        return Err(FormError::Required(FormField::Rfc.label()));
    }
    let length = rfc.chars().count();
    let charset_ok = rfc
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '&' || c == 'Ñ');
    if !(12..=13).contains(&length) || !charset_ok {
        return Err(FormError::InvalidRfc(rfc));
    }
    Ok(rfc)
}
