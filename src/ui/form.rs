//! Persona form rendering, shared by the creation modal and the edit screen.

use crate::form::{FormField, PersonaForm};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// Label column width, wide enough for the longest label.
const LABEL_WIDTH: usize = 21;

/// Render a form inside a bordered block titled `title`.
///
/// # Arguments
/// * `form` - Form state
/// * `title` - Block title
/// * `area` - Area to render in (cleared first)
/// * `buf` - Buffer to render to
///
/// # Details
/// One line per field, the focused field highlighted with a cursor, then
/// the last error (if any) and a key help line.
pub fn render_form(form: &PersonaForm, title: &str, area: Rect, buf: &mut Buffer) {
    Widget::render(Clear, area, buf);

    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| field_line(form, *field))
        .collect();

    lines.push(Line::from(""));
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "Guardando...",
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Tab/↑↓ cambiar campo · Espacio alterna Activo · Enter guardar · Esc cancelar",
        Style::default().fg(Color::Gray),
    )));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    Widget::render(paragraph, area, buf);
}

fn field_line(form: &PersonaForm, field: FormField) -> Line<'static> {
    let focused = form.focus == field;
    let label_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let value_style = if focused {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let mut value = form.value(field);
    if field == FormField::FechaNacimiento && value.is_empty() && !focused {
        return Line::from(vec![
            Span::styled(format!("{:<width$}", field.label(), width = LABEL_WIDTH), label_style),
            Span::styled("AAAA-MM-DD", Style::default().fg(Color::DarkGray)),
        ]);
    }
    if focused && field != FormField::Activo {
        value.push('_');
    }

    Line::from(vec![
        Span::styled(format!("{:<width$}", field.label(), width = LABEL_WIDTH), label_style),
        Span::styled(value, value_style),
    ])
}
