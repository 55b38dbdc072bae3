pub(crate) mod calendar;
pub(crate) mod cards;
pub(crate) mod dashboard;
pub(crate) mod investments;
pub(crate) mod recurring;
pub(crate) mod transactions;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::theme;

/// Bordered block with the dim bold title every screen uses.
pub(crate) fn panel<'a>(title: impl Into<String>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style())
        .title(Span::styled(
            format!(" {} ", title.into()),
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Centered hint text inside a titled panel.
pub(crate) fn render_empty(f: &mut Frame, area: Rect, title: impl Into<String>, hints: &[&str]) {
    let mut lines = vec![Line::from("")];
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(hint.to_string(), theme::dim_style())));
    }
    f.render_widget(Paragraph::new(lines).centered().block(panel(title)), area);
}

/// Row style for zebra striping with a cursor.
pub(crate) fn row_style(i: usize, cursor: Option<usize>) -> Style {
    if cursor == Some(i) {
        theme::selected_style()
    } else if i % 2 == 1 {
        theme::alt_row_style()
    } else {
        theme::normal_style()
    }
}
