//! Header bar with the add button, and the status bar.

use crate::app::App;
use crate::router::Route;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

const ADD_LABEL: &str = "[ Añadir persona física ]";

/// Render the header.
///
/// # Returns
/// * `Option<Rect>` - Region of the add button, when shown
///
/// # Details
/// The add button is only offered on the list route.
pub fn render_header(app: &App, area: Rect, buf: &mut Buffer) -> Option<Rect> {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    Widget::render(block, area, buf);

    let route = Line::from(vec![
        Span::styled(
            "Personas Físicas ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.router.current().path(), Style::default().fg(Color::Gray)),
    ]);
    Widget::render(Paragraph::new(route), inner, buf);

    if *app.router.current() != Route::PersonasList || inner.height == 0 {
        return None;
    }

    let width = (ADD_LABEL.chars().count() as u16).min(inner.width);
    let button = Rect::new(inner.right().saturating_sub(width), inner.y, width, 1);
    Widget::render(
        Paragraph::new(Span::styled(
            ADD_LABEL,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        button,
        buf,
    );
    Some(button)
}

/// Render the status bar: key help as title, last message as body.
pub fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    let help = if app.edit.is_some() {
        "Enter guardar · Esc volver"
    } else {
        "↑↓ mover · PgUp/PgDn página · a añadir · e editar · d eliminar · r recargar · q salir"
    };
    let text = app.status_message.as_deref().unwrap_or("Listo");
    let paragraph = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(help),
    );
    Widget::render(paragraph, area, buf);
}
