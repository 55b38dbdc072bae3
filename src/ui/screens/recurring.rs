use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use super::{panel, render_empty, row_style};
use crate::models::TransactionKind;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_signed, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let entries = &app.ledger.recurring;
    if entries.is_empty() {
        render_empty(
            f,
            area,
            "Recurring (0)",
            &[
                "No recurring income or expenses",
                "Add one with :recurring Aluguel -1500 days=5 cat=Moradia",
            ],
        );
        return;
    }

    let header_cells = ["Description", "Category", "Kind", "Value", "Days", "Per month"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .skip(app.recurring_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, r)| {
            let value = r.kind.signed(r.value);
            let monthly = value * Decimal::from(r.days_of_month.len());
            Row::new(vec![
                Cell::from(truncate(&r.description, 30)),
                Cell::from(truncate(&r.category, 18)),
                Cell::from(r.kind.as_str()),
                Cell::from(Span::styled(format_signed(value), theme::amount_style(value))),
                Cell::from(r.days_label()),
                Cell::from(Span::styled(format_signed(monthly), theme::amount_style(monthly))),
            ])
            .style(row_style(i, Some(app.recurring_index)))
        })
        .collect();

    let widths = [
        Constraint::Min(18),
        Constraint::Length(18),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(16),
    ];

    // Upper bound: days past a short month's end never happen
    let net: Decimal = entries
        .iter()
        .map(|r| r.kind.signed(r.value) * Decimal::from(r.days_of_month.len()))
        .sum();
    let income_count = entries
        .iter()
        .filter(|r| r.kind == TransactionKind::Income)
        .count();
    let title = format!(
        "Recurring ({} entries, {income_count} income) net {}/month",
        entries.len(),
        format_signed(net)
    );
    let table = Table::new(rows, widths).header(header).block(panel(title));
    f.render_widget(table, area);
}
