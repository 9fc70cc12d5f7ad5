//! Delete confirmation dialog.

use crate::app::{DeleteFlow, DialogButton};
use crate::ui::centered_rect;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

const CANCEL_LABEL: &str = "[ Cancelar ]";
const CONFIRM_LABEL: &str = "[ Confirmar ]";
const BUTTON_GAP: u16 = 4;

/// Screen regions of the dialog buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogButtons {
    pub cancel: Rect,
    pub confirm: Rect,
}

/// Render the confirmation dialog over `area` if the flow is open.
///
/// # Returns
/// * `Option<DialogButtons>` - Button regions while the user can still
///   choose, `None` when closed or while the delete is in flight
pub fn render_delete_dialog(flow: &DeleteFlow, area: Rect, buf: &mut Buffer) -> Option<DialogButtons> {
    let (focus, deleting) = match flow {
        DeleteFlow::Idle => return None,
        DeleteFlow::Confirming { focus, .. } => (Some(*focus), false),
        DeleteFlow::Deleting { .. } => (None, true),
    };

    let popup = centered_rect(area, 60, 8);
    Widget::render(Clear, popup, buf);

    let block = Block::default()
        .title("Confirmar eliminación")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(popup);
    Widget::render(block, popup, buf);

    let text = if deleting {
        Line::from(Span::styled("Eliminando...", Style::default().fg(Color::Yellow)))
    } else {
        Line::from("¿Estás seguro de que deseas eliminar esta persona física?")
    };
    let text_area = Rect { height: inner.height.saturating_sub(2), ..inner };
    Widget::render(
        Paragraph::new(text).wrap(Wrap { trim: true }).alignment(Alignment::Center),
        text_area,
        buf,
    );

    let focus = focus?;
    if inner.height < 2 {
        return None;
    }

    let cancel_width = CANCEL_LABEL.chars().count() as u16;
    let confirm_width = CONFIRM_LABEL.chars().count() as u16;
    let total = cancel_width + BUTTON_GAP + confirm_width;
    let y = inner.y + inner.height - 1;
    let x = inner.x + inner.width.saturating_sub(total) / 2;
    let cancel = Rect::new(x, y, cancel_width.min(inner.width), 1);
    let confirm = Rect::new(
        (x + cancel_width + BUTTON_GAP).min(inner.right().saturating_sub(1)),
        y,
        confirm_width.min(inner.width),
        1,
    )
    .intersection(inner);

    let style_for = |button: DialogButton| {
        if button == focus {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };
    Widget::render(
        Paragraph::new(Span::styled(CANCEL_LABEL, style_for(DialogButton::Cancelar))),
        cancel,
        buf,
    );
    Widget::render(
        Paragraph::new(Span::styled(CONFIRM_LABEL, style_for(DialogButton::Confirmar))),
        confirm,
        buf,
    );

    Some(DialogButtons { cancel, confirm })
}
