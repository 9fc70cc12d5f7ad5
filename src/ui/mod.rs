//! UI components module.
//!
//! Contains ratatui widgets for the personas console, and the hit-testing
//! regions they produce for mouse handling.

pub mod dialog;
pub mod form;
pub mod status;
pub mod table;

use crate::app::{App, ClickTarget, EditScreen};
use dialog::{DialogButtons, render_delete_dialog};
use form::render_form;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};
use status::{render_header, render_status};
use table::{RowHitbox, render_table};

/// Clickable regions of the last rendered frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hitboxes {
    pub add_button: Option<Rect>,
    pub rows: Vec<RowHitbox>,
    pub dialog: Option<DialogButtons>,
}

impl Hitboxes {
    /// Resolve a screen cell to a click target.
    ///
    /// # Details
    /// The dialog shadows everything below it.
    pub fn target_at(&self, column: u16, row: u16) -> Option<ClickTarget> {
        let position = Position::new(column, row);

        if let Some(buttons) = &self.dialog {
            if buttons.cancel.contains(position) {
                return Some(ClickTarget::DialogCancel);
            }
            if buttons.confirm.contains(position) {
                return Some(ClickTarget::DialogConfirm);
            }
            return None;
        }

        if self.add_button.is_some_and(|button| button.contains(position)) {
            return Some(ClickTarget::AddButton);
        }

        self.rows.iter().find_map(|hit| {
            if hit.delete.contains(position) {
                Some(ClickTarget::DeleteRow(hit.index))
            } else if hit.edit.contains(position) {
                Some(ClickTarget::EditRow(hit.index))
            } else if hit.row.contains(position) {
                Some(ClickTarget::Row(hit.index))
            } else {
                None
            }
        })
    }
}

/// Render the complete UI.
///
/// # Arguments
/// * `f` - Frame to render to
/// * `app` - Application state
///
/// # Returns
/// * `Hitboxes` - Regions for mouse hit-testing
///
/// # Details
/// Lays out header, body (grid or edit screen) and status bar, then the
/// creation modal and delete dialog on top.
pub fn render(f: &mut Frame, app: &App) -> Hitboxes {
    let area = f.area();
    render_app(app, area, f.buffer_mut())
}

fn render_app(app: &App, area: Rect, buf: &mut Buffer) -> Hitboxes {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Grid or edit screen
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    let mut hitboxes = Hitboxes {
        add_button: render_header(app, chunks[0], buf),
        ..Hitboxes::default()
    };

    match &app.edit {
        Some(screen) => render_edit_screen(screen, chunks[1], buf),
        None => hitboxes.rows = render_table(app, chunks[1], buf),
    }

    render_status(app, chunks[2], buf);

    if let Some(form) = &app.create_modal {
        render_form(form, "Añadir persona física", centered_rect(area, 72, 14), buf);
        // Rows under the modal are not clickable
        hitboxes.rows.clear();
        hitboxes.add_button = None;
    }

    hitboxes.dialog = render_delete_dialog(&app.delete_flow, area, buf);
    hitboxes
}

fn render_edit_screen(screen: &EditScreen, area: Rect, buf: &mut Buffer) {
    match screen {
        EditScreen::Editing { id, form } => {
            let title = format!("Editar persona física {id}");
            render_form(form, &title, area, buf);
        }
        EditScreen::Loading { id } => {
            render_notice(&format!("Cargando persona física {id}..."), Color::Yellow, area, buf)
        }
        EditScreen::Missing { id, reason } => render_notice(
            &format!("No se pudo cargar la persona física {id}: {reason} (Esc para volver)"),
            Color::Red,
            area,
            buf,
        ),
    }
}

fn render_notice(text: &str, color: Color, area: Rect, buf: &mut Buffer) {
    let paragraph = Paragraph::new(Line::from(text.to_string()))
        .style(Style::default().fg(color))
        .block(Block::default().title("Editar persona física").borders(Borders::ALL));
    Widget::render(paragraph, area, buf);
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
