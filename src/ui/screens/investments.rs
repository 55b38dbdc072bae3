use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use super::{panel, render_empty, row_style};
use crate::portfolio;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, format_signed, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[0]);

    render_holdings(f, cols[0], app);
    render_dividends(f, cols[1], app);
    render_totals(f, chunks[1], app);
}

fn render_holdings(f: &mut Frame, area: Rect, app: &App) {
    let holdings = &app.ledger.investments;
    if holdings.is_empty() {
        render_empty(
            f,
            area,
            "Holdings (0)",
            &["No investments yet", "Buy with :buy PETR4 100 32.50"],
        );
        return;
    }

    let header_cells = ["Asset", "Category", "Qty", "Avg", "Price", "Value", "Gain", "Alloc"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = holdings
        .iter()
        .enumerate()
        .skip(app.investment_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, h)| {
            let gain = h.gain();
            Row::new(vec![
                Cell::from(truncate(&h.display_name(), 28)),
                Cell::from(truncate(&h.category, 14)),
                Cell::from(h.quantity.normalize().to_string()),
                Cell::from(format_amount(h.purchase_price)),
                Cell::from(format_amount(h.current_price)),
                Cell::from(format_amount(h.total_value)),
                Cell::from(Span::styled(format_signed(gain), theme::amount_style(gain))),
                Cell::from(format_percent(h.percentage)),
            ])
            .style(row_style(i, Some(app.investment_index)))
        })
        .collect();

    let widths = [
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(15),
        Constraint::Length(15),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(format!("Holdings ({})", holdings.len())));
    f.render_widget(table, area);
}

fn render_dividends(f: &mut Frame, area: Rect, app: &App) {
    let dividends = &app.ledger.dividends;
    if dividends.is_empty() {
        render_empty(f, area, "Dividends", &["None recorded", ":dividend PETR4 12.30"]);
        return;
    }

    let mut recent: Vec<_> = dividends.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));

    let year = chrono::Datelike::year(&app.today);
    let this_year: Decimal = dividends
        .iter()
        .filter(|d| chrono::Datelike::year(&d.date) == year)
        .map(|d| d.amount)
        .sum();

    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled(format!("{year}: "), theme::dim_style()),
            Span::styled(format_amount(this_year), theme::income_style()),
        ]),
        Line::from(""),
    ];
    let width = area.width.saturating_sub(20) as usize;
    for d in recent.iter().take(area.height.saturating_sub(4) as usize) {
        // Unlinked rows keep the income description as their name
        let name_style = if d.investment_id.is_some() {
            theme::normal_style()
        } else {
            theme::dim_style()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", d.date.format("%d/%m")), theme::dim_style()),
            Span::styled(format!("{} ", truncate(&d.asset_name, width)), name_style),
            Span::styled(format_amount(d.amount), theme::income_style()),
        ]));
    }

    f.render_widget(
        Paragraph::new(lines).block(panel(format!("Dividends ({})", dividends.len()))),
        area,
    );
}

fn render_totals(f: &mut Frame, area: Rect, app: &App) {
    let totals = portfolio::portfolio_totals(&app.ledger.investments);
    let pct = if totals.invested > Decimal::ZERO {
        totals.gain / totals.invested * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let line = Line::from(vec![
        Span::styled("Invested ", theme::dim_style()),
        Span::styled(format_amount(totals.invested), theme::normal_style()),
        Span::styled("  Market ", theme::dim_style()),
        Span::styled(format_amount(totals.market_value), theme::normal_style()),
        Span::styled("  Gain ", theme::dim_style()),
        Span::styled(
            format!("{} ({})", format_signed(totals.gain), format_percent(pct)),
            theme::amount_style(totals.gain),
        ),
    ]);
    f.render_widget(Paragraph::new(line).block(panel("Portfolio")), area);
}
