//! Application state management.
//!
//! Owns the grid rows, paging cursor, delete confirmation flow, creation
//! modal and edit screen. State changes never perform I/O; they return an
//! [`Action`] for the event loop to run against the store, and the loop
//! feeds results back as [`Completion`]s.

use crate::api::{ApiError, NewPersonaFisica, PersonaFisica};
use crate::form::{FormOutcome, PersonaForm};
use crate::router::{Route, Router, edit_path};
use crate::rows::{DateFormats, PersonaRow, to_rows};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

/// Buttons of the delete confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogButton {
    Cancelar,
    Confirmar,
}

/// Delete confirmation state machine: `Idle → Confirming → Deleting → Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteFlow {
    /// No target, dialog closed
    Idle,
    /// Dialog open, waiting for the user
    Confirming { id: String, focus: DialogButton },
    /// Delete issued, waiting for the store
    Deleting { id: String },
}

impl DeleteFlow {
    pub fn is_open(&self) -> bool {
        !matches!(self, DeleteFlow::Idle)
    }

    /// Identifier the dialog is about, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            DeleteFlow::Idle => None,
            DeleteFlow::Confirming { id, .. } | DeleteFlow::Deleting { id } => Some(id),
        }
    }
}

/// Edit screen state for `/personas-fisicas/{id}/edit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditScreen {
    /// Record not in the snapshot yet, fetching it
    Loading { id: String },
    /// Form ready
    Editing { id: String, form: PersonaForm },
    /// Record could not be loaded
    Missing { id: String, reason: String },
}

/// Store work requested by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FetchAll,
    FetchOne(String),
    Delete(String),
    Create(NewPersonaFisica),
    Update { id: String, changes: NewPersonaFisica },
    Quit,
}

/// Result of an [`Action`] delivered back to the UI.
#[derive(Debug)]
pub enum Completion {
    Fetched(Result<usize, ApiError>),
    FetchedOne { id: String, result: Result<PersonaFisica, ApiError> },
    Deleted { id: String, result: Result<(), ApiError> },
    Created(Result<PersonaFisica, ApiError>),
    Updated { id: String, result: Result<PersonaFisica, ApiError> },
}

/// Clickable regions resolved by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    AddButton,
    /// Delete glyph on the row with this absolute index
    DeleteRow(usize),
    /// Edit glyph on the row with this absolute index
    EditRow(usize),
    /// Any other cell of a row
    Row(usize),
    DialogCancel,
    DialogConfirm,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Latest store snapshot
    pub personas: Vec<PersonaFisica>,
    /// Display rows, one per record in `personas`
    pub rows: Vec<PersonaRow>,
    /// Currently selected row index (absolute, across pages)
    pub selected_index: usize,
    /// Rows per page
    pub page_size: usize,
    /// Delete confirmation flow
    pub delete_flow: DeleteFlow,
    /// Creation modal, `Some` while open
    pub create_modal: Option<PersonaForm>,
    /// Edit screen, `Some` while on an edit route
    pub edit: Option<EditScreen>,
    /// Route state
    pub router: Router,
    /// Status message to display
    pub status_message: Option<String>,
    /// A fetch-all is in flight
    pub loading: bool,
    formats: DateFormats,
    mounted: bool,
}

impl App {
    /// Create a new application state.
    ///
    /// # Arguments
    /// * `formats` - Date formats for the grid
    /// * `page_size` - Rows per page (clamped to at least 1)
    pub fn new(formats: DateFormats, page_size: usize) -> Self {
        Self {
            personas: Vec::new(),
            rows: Vec::new(),
            selected_index: 0,
            page_size: page_size.max(1),
            delete_flow: DeleteFlow::Idle,
            create_modal: None,
            edit: None,
            router: Router::default(),
            status_message: None,
            loading: false,
            formats,
            mounted: false,
        }
    }

    /// Mount the list view.
    ///
    /// # Returns
    /// * `Option<Action>` - `FetchAll` on the first call, `None` afterwards
    pub fn mount(&mut self) -> Option<Action> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        Some(self.refresh())
    }

    /// Request a full reload of the collection.
    pub fn refresh(&mut self) -> Action {
        self.loading = true;
        self.set_status("Cargando personas físicas...".to_string());
        Action::FetchAll
    }

    /// Replace the snapshot and rebuild the rows.
    ///
    /// # Details
    /// Keeps the cursor in range, and fills a pending edit screen if its
    /// record has arrived.
    pub fn set_personas(&mut self, personas: Vec<PersonaFisica>) {
        self.rows = to_rows(&personas, &self.formats);
        self.personas = personas;
        self.selected_index = self.selected_index.min(self.rows.len().saturating_sub(1));

        if let Some(EditScreen::Loading { id }) = &self.edit
            && let Some(persona) = self.personas.iter().find(|p| &p.id == id)
        {
            self.edit = Some(EditScreen::Editing {
                id: id.clone(),
                form: PersonaForm::from_persona(persona),
            });
        }
    }

    /// Set status message.
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn selected_row(&self) -> Option<&PersonaRow> {
        self.rows.get(self.selected_index)
    }

    /// Zero-based page of the cursor.
    pub fn page(&self) -> usize {
        self.selected_index / self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    /// Absolute index of the first row on the current page, and the page rows.
    pub fn page_rows(&self) -> (usize, &[PersonaRow]) {
        let start = (self.page() * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());
        (start, &self.rows[start..end])
    }

    /// Move selection up, wrapping to the bottom.
    pub fn move_up(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = self.rows.len() - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Move selection down, wrapping to the top.
    pub fn move_down(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected_index = (self.selected_index + 1) % self.rows.len();
    }

    pub fn next_page(&mut self) {
        let next = (self.page() + 1) * self.page_size;
        if next < self.rows.len() {
            self.selected_index = next;
        }
    }

    pub fn prev_page(&mut self) {
        self.selected_index = self.page().saturating_sub(1) * self.page_size;
    }

    /// Open the confirmation dialog for `id`.
    ///
    /// # Details
    /// Replaces the target of an open dialog. Ignored while a delete is in
    /// flight. Never emits the delete itself.
    pub fn request_delete(&mut self, id: &str) {
        if matches!(self.delete_flow, DeleteFlow::Deleting { .. }) {
            return;
        }
        debug!(id, "delete requested");
        self.delete_flow = DeleteFlow::Confirming {
            id: id.to_string(),
            focus: DialogButton::Confirmar,
        };
    }

    /// Close the dialog without side effects.
    pub fn cancel_delete(&mut self) {
        if let DeleteFlow::Confirming { .. } = self.delete_flow {
            self.delete_flow = DeleteFlow::Idle;
        }
    }

    /// Confirm the pending delete.
    ///
    /// # Returns
    /// * `Option<Action>` - `Delete(id)` the first time, `None` if nothing
    ///   is pending or the delete is already in flight
    pub fn confirm_delete(&mut self) -> Option<Action> {
        let DeleteFlow::Confirming { id, .. } = &self.delete_flow else {
            return None;
        };
        let id = id.clone();
        self.delete_flow = DeleteFlow::Deleting { id: id.clone() };
        Some(Action::Delete(id))
    }

    /// Open the creation modal with an empty form.
    pub fn open_create_modal(&mut self) {
        self.create_modal = Some(PersonaForm::default());
    }

    pub fn close_create_modal(&mut self) {
        self.create_modal = None;
    }

    /// Navigate to the edit route of `id`.
    pub fn edit_persona(&mut self, id: &str) -> Option<Action> {
        self.navigate(&edit_path(id))
    }

    /// Route transition.
    ///
    /// # Returns
    /// * `Option<Action>` - `FetchOne` when the edit target is not cached
    pub fn navigate(&mut self, path: &str) -> Option<Action> {
        let route = match self.router.navigate(path) {
            Ok(route) => route.clone(),
            Err(e) => {
                warn!(error = %e, "navigation failed");
                self.set_status(e.to_string());
                return None;
            }
        };
        self.enter_route(route)
    }

    fn back(&mut self) {
        let route = self.router.back().clone();
        self.enter_route(route);
    }

    fn enter_route(&mut self, route: Route) -> Option<Action> {
        match route {
            Route::PersonasList => {
                self.edit = None;
                None
            }
            Route::EditPersona(id) => match self.personas.iter().find(|p| p.id == id) {
                Some(persona) => {
                    self.edit = Some(EditScreen::Editing {
                        form: PersonaForm::from_persona(persona),
                        id,
                    });
                    None
                }
                None => {
                    self.edit = Some(EditScreen::Loading { id: id.clone() });
                    Some(Action::FetchOne(id))
                }
            },
        }
    }

    /// Handle a key press.
    ///
    /// # Arguments
    /// * `key` - Key event
    /// * `today` - Current date, for form validation
    ///
    /// # Details
    /// The delete dialog captures input first, then the creation modal,
    /// then the active screen.
    pub fn handle_key(&mut self, key: KeyEvent, today: NaiveDate) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }

        if self.delete_flow.is_open() {
            return self.handle_dialog_key(key);
        }
        if self.create_modal.is_some() {
            return self.handle_create_key(key, today);
        }
        if self.edit.is_some() {
            return self.handle_edit_key(key, today);
        }
        self.handle_list_key(key)
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::PageDown | KeyCode::Char(']') => self.next_page(),
            KeyCode::PageUp | KeyCode::Char('[') => self.prev_page(),
            KeyCode::Home => self.selected_index = 0,
            KeyCode::End => self.selected_index = self.rows.len().saturating_sub(1),
            KeyCode::Char('a') => self.open_create_modal(),
            KeyCode::Char('r') => return Some(self.refresh()),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_row().map(|row| row.id.clone()) {
                    self.request_delete(&id);
                }
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.selected_row().map(|row| row.id.clone()) {
                    return self.edit_persona(&id);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Option<Action> {
        let DeleteFlow::Confirming { focus, .. } = &mut self.delete_flow else {
            return None;
        };
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                *focus = match *focus {
                    DialogButton::Cancelar => DialogButton::Confirmar,
                    DialogButton::Confirmar => DialogButton::Cancelar,
                };
                None
            }
            KeyCode::Enter => match *focus {
                DialogButton::Cancelar => {
                    self.cancel_delete();
                    None
                }
                DialogButton::Confirmar => self.confirm_delete(),
            },
            KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.cancel_delete();
                None
            }
            _ => None,
        }
    }

    fn handle_create_key(&mut self, key: KeyEvent, today: NaiveDate) -> Option<Action> {
        let form = self.create_modal.as_mut()?;
        match form.handle_key(key) {
            FormOutcome::Editing => None,
            FormOutcome::Cancel => {
                self.close_create_modal();
                None
            }
            FormOutcome::Submit => submit(form, today).map(Action::Create),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent, today: NaiveDate) -> Option<Action> {
        match self.edit.as_mut()? {
            EditScreen::Editing { id, form } => match form.handle_key(key) {
                FormOutcome::Editing => None,
                FormOutcome::Cancel => {
                    self.back();
                    None
                }
                FormOutcome::Submit => {
                    let id = id.clone();
                    submit(form, today).map(|changes| Action::Update { id, changes })
                }
            },
            EditScreen::Loading { .. } | EditScreen::Missing { .. } => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                    self.back();
                }
                None
            }
        }
    }

    /// Handle a mouse click resolved to a target.
    pub fn click(&mut self, target: ClickTarget) -> Option<Action> {
        if self.delete_flow.is_open() {
            return match target {
                ClickTarget::DialogCancel => {
                    self.cancel_delete();
                    None
                }
                ClickTarget::DialogConfirm => self.confirm_delete(),
                _ => None,
            };
        }
        if self.create_modal.is_some() || self.edit.is_some() {
            return None;
        }

        match target {
            ClickTarget::AddButton => self.open_create_modal(),
            ClickTarget::Row(index) if index < self.rows.len() => self.selected_index = index,
            ClickTarget::DeleteRow(index) => {
                if let Some(id) = self.rows.get(index).map(|row| row.id.clone()) {
                    self.selected_index = index;
                    self.request_delete(&id);
                }
            }
            ClickTarget::EditRow(index) => {
                if let Some(id) = self.rows.get(index).map(|row| row.id.clone()) {
                    self.selected_index = index;
                    return self.edit_persona(&id);
                }
            }
            _ => {}
        }
        None
    }

    /// Apply the result of a store operation.
    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Fetched(result) => {
                self.loading = false;
                match result {
                    Ok(count) => self.set_status(format!("{count} personas físicas cargadas")),
                    Err(e) => self.set_status(format!("Error al cargar personas físicas: {e}")),
                }
            }
            Completion::FetchedOne { id, result } => {
                let waiting = matches!(&self.edit, Some(EditScreen::Loading { id: pending }) if *pending == id);
                if !waiting {
                    return;
                }
                self.edit = Some(match result {
                    Ok(persona) => EditScreen::Editing {
                        form: PersonaForm::from_persona(&persona),
                        id,
                    },
                    Err(e) => EditScreen::Missing {
                        id,
                        reason: e.to_string(),
                    },
                });
            }
            Completion::Deleted { id, result } => {
                if matches!(self.delete_flow, DeleteFlow::Deleting { .. })
                    && self.delete_flow.target() == Some(id.as_str())
                {
                    self.delete_flow = DeleteFlow::Idle;
                }
                match result {
                    Ok(()) => self.set_status(format!("Persona física {id} eliminada")),
                    Err(e) => self.set_status(format!("Error al eliminar persona física {id}: {e}")),
                }
            }
            Completion::Created(result) => match result {
                Ok(persona) => {
                    if self.create_modal.as_ref().is_some_and(|form| form.submitting) {
                        self.close_create_modal();
                    }
                    self.set_status(format!(
                        "Persona física {} creada ({} {})",
                        persona.id, persona.nombre, persona.apellido_paterno
                    ));
                }
                Err(e) => {
                    let message = format!("Error al crear persona física: {e}");
                    if let Some(form) = self.create_modal.as_mut().filter(|form| form.submitting) {
                        form.submitting = false;
                        form.error = Some(message.clone());
                    }
                    self.set_status(message);
                }
            },
            Completion::Updated { id, result } => match result {
                Ok(_) => {
                    if matches!(&self.edit, Some(EditScreen::Editing { id: open, .. }) if *open == id)
                    {
                        self.back();
                    }
                    self.set_status(format!("Persona física {id} actualizada"));
                }
                Err(e) => {
                    let message = format!("Error al actualizar persona física {id}: {e}");
                    if let Some(EditScreen::Editing { form, .. }) = self.edit.as_mut() {
                        form.submitting = false;
                        form.error = Some(message.clone());
                    }
                    self.set_status(message);
                }
            },
        }
    }
}

/// Validate a form for submission, recording the error on failure.
fn submit(form: &mut PersonaForm, today: NaiveDate) -> Option<NewPersonaFisica> {
    match form.validate(today) {
        Ok(payload) => {
            form.error = None;
            form.submitting = true;
            Some(payload)
        }
        Err(e) => {
            form.error = Some(e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::store::tests::persona;
    use reqwest::StatusCode;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(count: usize) -> App {
        let mut app = App::new(DateFormats::default(), 20);
        app.set_personas(
            (1..=count)
                .map(|i| persona(&i.to_string(), &format!("Persona {i}")))
                .collect(),
        );
        app
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        }
    }

    #[test]
    fn test_mount_fetches_exactly_once() {
        let mut app = App::new(DateFormats::default(), 20);
        assert_eq!(app.mount(), Some(Action::FetchAll));
        assert!(app.loading);
        for _ in 0..5 {
            assert_eq!(app.mount(), None);
        }
        app.complete(Completion::Fetched(Ok(0)));
        assert!(!app.loading);
        assert_eq!(app.mount(), None);
    }

    #[test]
    fn test_rows_match_collection() {
        let app = app_with(3);
        assert_eq!(app.rows.len(), app.personas.len());
        for (row, persona) in app.rows.iter().zip(&app.personas) {
            assert_eq!(row.id, persona.id);
        }
    }

    #[test]
    fn test_shrinking_collection_clamps_cursor() {
        let mut app = app_with(5);
        app.selected_index = 4;
        app.set_personas(vec![persona("1", "Ana")]);
        assert_eq!(app.selected_index, 0);
        app.set_personas(Vec::new());
        assert_eq!(app.selected_index, 0);
        assert!(app.selected_row().is_none());
    }

    #[test]
    fn test_delete_key_opens_dialog_without_deleting() {
        let mut app = app_with(3);
        app.move_down();
        assert_eq!(app.handle_key(key(KeyCode::Char('d')), today()), None);
        assert_eq!(
            app.delete_flow,
            DeleteFlow::Confirming {
                id: "2".to_string(),
                focus: DialogButton::Confirmar
            }
        );
    }

    #[test]
    fn test_cancel_closes_without_delete() {
        let mut app = app_with(2);
        app.request_delete("1");
        assert_eq!(app.click(ClickTarget::DialogCancel), None);
        assert_eq!(app.delete_flow, DeleteFlow::Idle);

        app.request_delete("1");
        assert_eq!(app.handle_key(key(KeyCode::Esc), today()), None);
        assert_eq!(app.delete_flow, DeleteFlow::Idle);
    }

    #[test]
    fn test_confirm_deletes_once_then_closes() {
        let mut app = app_with(2);
        app.request_delete("2");
        assert_eq!(
            app.click(ClickTarget::DialogConfirm),
            Some(Action::Delete("2".to_string()))
        );
        assert_eq!(app.click(ClickTarget::DialogConfirm), None);
        assert_eq!(app.handle_key(key(KeyCode::Char('y')), today()), None);
        assert!(app.delete_flow.is_open());

        app.complete(Completion::Deleted {
            id: "2".to_string(),
            result: Ok(()),
        });
        assert_eq!(app.delete_flow, DeleteFlow::Idle);
        // No optimistic removal: rows only change with a new snapshot
        assert_eq!(app.rows.len(), 2);
    }

    #[test]
    fn test_failed_delete_closes_dialog_and_reports() {
        let mut app = app_with(1);
        app.request_delete("1");
        app.confirm_delete();
        app.complete(Completion::Deleted {
            id: "1".to_string(),
            result: Err(server_error()),
        });
        assert_eq!(app.delete_flow, DeleteFlow::Idle);
        assert!(app.status_message.as_deref().unwrap().contains("Error al eliminar"));
    }

    #[test]
    fn test_dialog_focus_and_enter() {
        let mut app = app_with(1);
        app.request_delete("1");
        app.handle_key(key(KeyCode::Left), today());
        assert_eq!(app.handle_key(key(KeyCode::Enter), today()), None);
        assert_eq!(app.delete_flow, DeleteFlow::Idle);

        app.request_delete("1");
        assert_eq!(
            app.handle_key(key(KeyCode::Enter), today()),
            Some(Action::Delete("1".to_string()))
        );
    }

    #[test]
    fn test_new_request_replaces_target() {
        let mut app = app_with(3);
        app.request_delete("1");
        app.request_delete("3");
        assert_eq!(app.delete_flow.target(), Some("3"));
        app.confirm_delete();
        app.request_delete("2");
        assert_eq!(app.delete_flow.target(), Some("3"));
    }

    #[test]
    fn test_edit_navigates_to_edit_path() {
        let mut app = app_with(3);
        app.selected_index = 2;
        assert_eq!(app.handle_key(key(KeyCode::Char('e')), today()), None);
        assert_eq!(app.router.current().path(), "/personas-fisicas/3/edit");
        assert!(matches!(&app.edit, Some(EditScreen::Editing { id, .. }) if id == "3"));

        app.handle_key(key(KeyCode::Esc), today());
        assert_eq!(app.router.current(), &Route::PersonasList);
        assert!(app.edit.is_none());
    }

    #[test]
    fn test_edit_id_with_slash_opens_form() {
        let mut app = App::new(DateFormats::default(), 20);
        app.set_personas(vec![persona("a/b", "Ana")]);
        assert_eq!(app.edit_persona("a/b"), None);
        assert_eq!(app.router.current(), &Route::EditPersona("a/b".to_string()));
        assert!(matches!(&app.edit, Some(EditScreen::Editing { id, .. }) if id == "a/b"));
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_click_edit_glyph_navigates() {
        let mut app = app_with(2);
        app.click(ClickTarget::EditRow(1));
        assert_eq!(app.router.current().path(), "/personas-fisicas/2/edit");
    }

    #[test]
    fn test_click_delete_glyph_opens_dialog() {
        let mut app = app_with(2);
        assert_eq!(app.click(ClickTarget::DeleteRow(0)), None);
        assert_eq!(app.delete_flow.target(), Some("1"));
    }

    #[test]
    fn test_edit_of_uncached_record_fetches_it() {
        let mut app = App::new(DateFormats::default(), 20);
        assert_eq!(
            app.navigate("/personas-fisicas/9/edit"),
            Some(Action::FetchOne("9".to_string()))
        );
        app.complete(Completion::FetchedOne {
            id: "9".to_string(),
            result: Err(ApiError::NotFound("9".to_string())),
        });
        assert!(matches!(app.edit, Some(EditScreen::Missing { .. })));
    }

    #[test]
    fn test_snapshot_fills_pending_edit() {
        let mut app = App::new(DateFormats::default(), 20);
        app.navigate("/personas-fisicas/4/edit");
        app.set_personas(vec![persona("4", "Eva")]);
        assert!(matches!(
            &app.edit,
            Some(EditScreen::Editing { form, .. }) if form.nombre == "Eva"
        ));
    }

    #[test]
    fn test_edit_submit_and_complete() {
        let mut app = app_with(1);
        app.edit_persona("1");
        let action = app.handle_key(key(KeyCode::Enter), today());
        assert!(matches!(action, Some(Action::Update { ref id, .. }) if id == "1"));

        app.complete(Completion::Updated {
            id: "1".to_string(),
            result: Ok(persona("1", "Persona 1")),
        });
        assert!(app.edit.is_none());
        assert_eq!(app.router.current(), &Route::PersonasList);
    }

    #[test]
    fn test_create_modal_flow() {
        let mut app = app_with(0);
        app.handle_key(key(KeyCode::Char('a')), today());
        assert!(app.create_modal.is_some());

        // Empty form fails validation and stays open
        assert_eq!(app.handle_key(key(KeyCode::Enter), today()), None);
        let form = app.create_modal.as_ref().unwrap();
        assert!(form.error.is_some());
        assert!(!form.submitting);

        let form = app.create_modal.as_mut().unwrap();
        form.nombre = "Eva".to_string();
        form.apellido_paterno = "Soto".to_string();
        form.rfc = "SOEV900101AB1".to_string();
        form.fecha_nacimiento = "1990-01-01".to_string();
        let action = app.handle_key(key(KeyCode::Enter), today());
        assert!(matches!(action, Some(Action::Create(ref p)) if p.nombre == "Eva"));

        app.complete(Completion::Created(Err(server_error())));
        let form = app.create_modal.as_ref().unwrap();
        assert!(form.error.as_deref().unwrap().contains("Error al crear"));
        assert!(!form.submitting);

        // Resubmit after the failure
        assert!(app.handle_key(key(KeyCode::Enter), today()).is_some());
        app.complete(Completion::Created(Ok(persona("10", "Eva"))));
        assert!(app.create_modal.is_none());
    }

    #[test]
    fn test_late_create_result_leaves_reopened_modal() {
        let mut app = app_with(0);
        app.open_create_modal();
        let form = app.create_modal.as_mut().unwrap();
        form.nombre = "Eva".to_string();
        form.apellido_paterno = "Soto".to_string();
        form.rfc = "SOEV900101AB1".to_string();
        form.fecha_nacimiento = "1990-01-01".to_string();
        assert!(app.handle_key(key(KeyCode::Enter), today()).is_some());

        // Esc while the request is in flight, then a fresh modal
        app.handle_key(key(KeyCode::Esc), today());
        app.open_create_modal();

        app.complete(Completion::Created(Err(server_error())));
        let form = app.create_modal.as_ref().unwrap();
        assert!(form.error.is_none());
        assert!(app.status_message.as_deref().unwrap().contains("Error al crear"));

        app.complete(Completion::Created(Ok(persona("10", "Eva"))));
        assert!(app.create_modal.is_some());
    }

    #[test]
    fn test_create_modal_escape_closes() {
        let mut app = app_with(0);
        app.click(ClickTarget::AddButton);
        app.handle_key(key(KeyCode::Esc), today());
        assert!(app.create_modal.is_none());
    }

    #[test]
    fn test_paging() {
        let mut app = App::new(DateFormats::default(), 20);
        app.set_personas(
            (1..=45)
                .map(|i| persona(&i.to_string(), "P"))
                .collect(),
        );
        assert_eq!(app.page_count(), 3);
        assert_eq!(app.page_rows().1.len(), 20);

        app.next_page();
        app.next_page();
        assert_eq!(app.page(), 2);
        assert_eq!(app.page_rows(), (40, &app.rows[40..45]));
        app.next_page();
        assert_eq!(app.page(), 2);

        app.prev_page();
        assert_eq!(app.selected_index, 20);
    }

    #[test]
    fn test_move_selection_wraps() {
        let mut app = app_with(3);
        app.move_up();
        assert_eq!(app.selected_index, 2);
        app.move_down();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with(1);
        assert_eq!(app.handle_key(key(KeyCode::Char('q')), today()), Some(Action::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        app.request_delete("1");
        assert_eq!(app.handle_key(ctrl_c, today()), Some(Action::Quit));
    }
}
