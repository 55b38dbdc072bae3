use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use super::{panel, render_empty, row_style};
use crate::calendar::projection;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let cards = &app.ledger.cards;
    if cards.is_empty() {
        render_empty(
            f,
            area,
            "Cards (0)",
            &[
                "No credit cards",
                "Add one with :card Nubank 10 17 limit=5000",
            ],
        );
        return;
    }

    let bills = projection::project_bills(&app.ledger.transactions, cards, app.current_month);

    let header_cells = ["Card", "Brand", "Closes", "Due", "Limit", "Bill", "Used", ""]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = cards
        .iter()
        .enumerate()
        .skip(app.card_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, card)| {
            let bill = bills
                .iter()
                .find(|b| b.card_id == card.id)
                .map(|b| b.amount)
                .unwrap_or_default();
            let used = if card.credit_limit > Decimal::ZERO {
                format_percent(bill / card.credit_limit * Decimal::ONE_HUNDRED)
            } else {
                String::new()
            };
            let status = if projection::bill_paid(&app.ledger.transactions, card.id, app.current_month) {
                Span::styled("paid", theme::income_style())
            } else if bill > Decimal::ZERO {
                Span::styled("open", theme::bill_style())
            } else {
                Span::raw("")
            };
            Row::new(vec![
                Cell::from(truncate(&card.name, 24)),
                Cell::from(truncate(&card.brand, 14)),
                Cell::from(format!("day {}", card.closing_day)),
                Cell::from(format!("day {}", card.due_day)),
                Cell::from(format_amount(card.credit_limit)),
                Cell::from(Span::styled(format_amount(bill), theme::bill_style())),
                Cell::from(used),
                Cell::from(status),
            ])
            .style(row_style(i, Some(app.card_index)))
        })
        .collect();

    let widths = [
        Constraint::Min(14),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Length(16),
        Constraint::Length(7),
        Constraint::Length(5),
    ];

    let total: Decimal = bills.iter().map(|b| b.amount).sum();
    let title = format!(
        "Cards ({}) bills for {}: {}",
        cards.len(),
        app.current_month,
        format_amount(total)
    );
    let table = Table::new(rows, widths).header(header).block(panel(title));
    f.render_widget(table, area);
}
