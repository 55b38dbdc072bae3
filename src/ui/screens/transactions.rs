use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};

use super::{panel, render_empty, row_style};
use crate::models::PaymentMethod;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_signed, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let txns = app.visible_transactions();

    if txns.is_empty() {
        let title = format!("Transactions {} (0)", app.current_month);
        if app.search_input.is_empty() {
            render_empty(
                f,
                area,
                title,
                &[
                    "No transactions for this month",
                    "Add one with :add-txn 2024-03-10 Mercado -230 cat=Alimentação",
                ],
            );
        } else {
            let msg = format!("No transactions matching '{}'", app.search_input);
            render_empty(f, area, title, &[&msg, "Press Esc to clear the search"]);
        }
        return;
    }

    let header_cells = ["Date", "Description", "Category", "Payment", "Inst.", "Value"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = txns
        .iter()
        .enumerate()
        .skip(app.transaction_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, txn)| {
            let payment = match (&txn.payment_method, &txn.card_brand) {
                (PaymentMethod::CreditCard, Some(card)) => truncate(card, 14),
                (method, _) => method.as_str().to_string(),
            };
            let installment = txn.installment.map(|n| n.to_string()).unwrap_or_default();
            let description = if txn.is_bill_payment {
                Span::styled(truncate(&txn.description, 40), theme::bill_style())
            } else {
                Span::raw(truncate(&txn.description, 40))
            };
            let value = txn.signed_value();

            Row::new(vec![
                Cell::from(txn.date.format("%d/%m/%Y").to_string()),
                Cell::from(description),
                Cell::from(truncate(&txn.category, 18)),
                Cell::from(payment),
                Cell::from(installment),
                Cell::from(Span::styled(format_signed(value), theme::amount_style(value))),
            ])
            .style(row_style(i, Some(app.transaction_index)))
        })
        .collect();

    let widths = [
        Constraint::Length(11),
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Length(16),
    ];

    let search = if app.search_input.is_empty() {
        String::new()
    } else {
        format!(" search: '{}'", app.search_input)
    };
    let title = format!("Transactions {} ({}){search}", app.current_month, txns.len());
    let table = Table::new(rows, widths).header(header).block(panel(title));

    f.render_widget(table, area);
}
