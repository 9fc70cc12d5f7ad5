//! Persona grid rendering.
//!
//! Displays the current page of rows with fixed columns and per-row
//! delete / edit glyphs.

use crate::app::App;
use crate::rows::PersonaRow;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

/// Column headers, in display order.
pub const HEADERS: [&str; 10] = [
    "ID",
    "Nombre",
    "Apellido Paterno",
    "Apellido Materno",
    "RFC",
    "Fecha de Nacimiento",
    "Fecha de Registro",
    "Fecha de Actualización",
    "Activo",
    "Acciones",
];

const WIDTHS: [Constraint; 10] = [
    Constraint::Length(6),
    Constraint::Length(14),
    Constraint::Length(16),
    Constraint::Length(16),
    Constraint::Length(14),
    Constraint::Length(19),
    Constraint::Length(21),
    Constraint::Length(22),
    Constraint::Length(6),
    Constraint::Length(10),
];

const HIGHLIGHT_SYMBOL: &str = "▶ ";
const COLUMN_SPACING: u16 = 1;
/// Actions cell text; the delete glyph sits in the left half, edit in the right.
const ACTIONS: &str = "  ✖    ✎";
const ACTION_SPLIT: u16 = 5;

/// Screen regions of one rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowHitbox {
    /// Absolute row index in `App::rows`
    pub index: usize,
    pub row: Rect,
    pub delete: Rect,
    pub edit: Rect,
}

/// Render the persona grid.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Returns
/// * `Vec<RowHitbox>` - Clickable regions of the visible rows
///
/// # Details
/// Only the cursor's page is shown. If the page does not fit the area,
/// the visible window scrolls to keep the cursor on screen.
pub fn render_table(app: &App, area: Rect, buf: &mut Buffer) -> Vec<RowHitbox> {
    let title = format!(
        "Personas Físicas ({} registros) · Página {}/{}",
        app.rows.len(),
        app.page() + 1,
        app.page_count()
    );
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);

    if app.rows.is_empty() {
        let message = if app.loading {
            "Cargando personas físicas..."
        } else {
            "No hay personas físicas registradas. Presione 'a' para añadir una."
        };
        Widget::render(
            Paragraph::new(Line::from(message)).style(Style::default().fg(Color::Gray)).block(block),
            area,
            buf,
        );
        return Vec::new();
    }

    let (page_start, page_rows) = app.page_rows();
    let body_height = inner.height.saturating_sub(1) as usize;
    let cursor = app.selected_index.saturating_sub(page_start);
    let offset = cursor.saturating_sub(body_height.saturating_sub(1));
    let visible: Vec<&PersonaRow> = page_rows.iter().skip(offset).take(body_height).collect();

    let header = Row::new(HEADERS.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = visible.iter().map(|row| table_row(row)).collect();

    let mut state = TableState::default();
    if cursor >= offset && cursor - offset < visible.len() {
        state.select(Some(cursor - offset));
    }

    let table = Table::new(rows, WIDTHS)
        .header(header)
        .block(block)
        .column_spacing(COLUMN_SPACING)
        .flex(Flex::Start)
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_spacing(HighlightSpacing::Always)
        .row_highlight_style(
            Style::default()
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        );

    StatefulWidget::render(table, area, buf, &mut state);

    row_hitboxes(inner, page_start + offset, visible.len())
}

fn table_row(row: &PersonaRow) -> Row<'static> {
    let activo = if row.activo {
        Cell::from("✔").style(Style::default().fg(Color::Green))
    } else {
        Cell::from("✘").style(Style::default().fg(Color::Red))
    };

    Row::new(vec![
        Cell::from(row.id.clone()),
        Cell::from(row.nombre.clone()),
        Cell::from(row.apellido_paterno.clone()),
        Cell::from(row.apellido_materno.clone()),
        Cell::from(row.rfc.clone()),
        Cell::from(row.fecha_nacimiento.clone()),
        Cell::from(row.fecha_registro.clone()),
        Cell::from(row.fecha_actualizacion.clone()),
        activo,
        Cell::from(ACTIONS).style(Style::default().fg(Color::Yellow)),
    ])
}

/// Compute row regions the same way the table lays out its columns.
fn row_hitboxes(inner: Rect, first_index: usize, count: usize) -> Vec<RowHitbox> {
    let symbol_width = HIGHLIGHT_SYMBOL.chars().count() as u16;
    let columns_area = Rect {
        x: inner.x + symbol_width.min(inner.width),
        width: inner.width.saturating_sub(symbol_width),
        ..inner
    };
    let columns = Layout::horizontal(WIDTHS)
        .flex(Flex::Start)
        .spacing(COLUMN_SPACING)
        .split(columns_area);
    let actions = columns[columns.len() - 1];

    (0..count)
        .map(|i| {
            let y = inner.y + 1 + i as u16;
            let delete_width = ACTION_SPLIT.min(actions.width);
            RowHitbox {
                index: first_index + i,
                row: Rect::new(inner.x, y, inner.width, 1),
                delete: Rect::new(actions.x, y, delete_width, 1),
                edit: Rect::new(actions.x + delete_width, y, actions.width - delete_width, 1),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::store::tests::persona;
    use crate::rows::DateFormats;

    fn app_with(count: usize) -> App {
        let mut app = App::new(DateFormats::default(), 20);
        app.set_personas(
            (1..=count)
                .map(|i| persona(&i.to_string(), &format!("P{i}")))
                .collect(),
        );
        app
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_renders_one_hitbox_per_row() {
        let app = app_with(3);
        let area = Rect::new(0, 0, 200, 10);
        let mut buf = Buffer::empty(area);
        let hitboxes = render_table(&app, area, &mut buf);
        assert_eq!(hitboxes.len(), 3);
        assert_eq!(hitboxes[0].index, 0);
        assert_eq!(hitboxes[0].row.y, 2);

        let text = buffer_text(&buf);
        assert!(text.contains("Apellido Paterno"));
        assert!(text.contains("Fecha de Actualización"));
        assert!(text.contains("P3"));
        assert!(text.contains("01/01/1980"));
    }

    #[test]
    fn test_hitboxes_cover_action_glyphs() {
        let app = app_with(1);
        let area = Rect::new(0, 0, 200, 6);
        let mut buf = Buffer::empty(area);
        let hitboxes = render_table(&app, area, &mut buf);
        let hit = hitboxes[0];

        let delete_found = (hit.delete.x..hit.delete.x + hit.delete.width)
            .any(|x| buf[(x, hit.delete.y)].symbol() == "✖");
        let edit_found = (hit.edit.x..hit.edit.x + hit.edit.width)
            .any(|x| buf[(x, hit.edit.y)].symbol() == "✎");
        assert!(delete_found);
        assert!(edit_found);
    }

    #[test]
    fn test_window_follows_cursor_in_short_area() {
        let mut app = app_with(10);
        app.selected_index = 9;
        // 2 border lines + header leaves 3 body lines
        let area = Rect::new(0, 0, 200, 6);
        let mut buf = Buffer::empty(area);
        let hitboxes = render_table(&app, area, &mut buf);
        let indices: Vec<usize> = hitboxes.iter().map(|h| h.index).collect();
        assert_eq!(indices, vec![7, 8, 9]);
    }

    #[test]
    fn test_only_current_page_rendered() {
        let mut app = App::new(DateFormats::default(), 2);
        app.set_personas((1..=5).map(|i| persona(&i.to_string(), "P")).collect());
        app.selected_index = 4;
        let area = Rect::new(0, 0, 200, 10);
        let mut buf = Buffer::empty(area);
        let hitboxes = render_table(&app, area, &mut buf);
        assert_eq!(hitboxes.len(), 1);
        assert_eq!(hitboxes[0].index, 4);
        assert!(buffer_text(&buf).contains("Página 3/3"));
    }

    #[test]
    fn test_empty_collection_message() {
        let app = app_with(0);
        let area = Rect::new(0, 0, 100, 5);
        let mut buf = Buffer::empty(area);
        assert!(render_table(&app, area, &mut buf).is_empty());
        assert!(buffer_text(&buf).contains("No hay personas"));
    }
}
