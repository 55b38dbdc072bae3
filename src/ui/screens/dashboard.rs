use chrono::Days;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Sparkline},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{panel, render_empty};
use crate::calendar::projection;
use crate::portfolio;
use crate::store::MonthSummary;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, format_signed, truncate};

const TREND_MONTHS: u32 = 12;
const UPCOMING_DAYS: u64 = 7;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Summary cards
            Constraint::Min(10),   // Spending + side panels
            Constraint::Length(4), // Monthly trend sparkline
        ])
        .split(area);

    let summary = app.ledger.month_summary(app.current_month);
    render_summary_cards(f, chunks[0], app, &summary);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_spending_chart(f, middle[0], &summary);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(middle[1]);
    render_upcoming(f, side[0], app);
    render_goals(f, side[1], app);

    render_trend_sparkline(f, chunks[2], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App, summary: &MonthSummary) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let net = summary.net();
    let totals = portfolio::portfolio_totals(&app.ledger.investments);

    render_card(f, cards[0], "Income", format_amount(summary.income), theme::GREEN, String::new());
    render_card(
        f,
        cards[1],
        "Expenses",
        format_amount(summary.expenses),
        theme::RED,
        format!("{} categories", summary.by_category.len()),
    );
    render_card(
        f,
        cards[2],
        "Net",
        format_signed(net),
        if net >= Decimal::ZERO { theme::GREEN } else { theme::RED },
        app.current_month.to_string(),
    );
    render_card(
        f,
        cards[3],
        "Portfolio",
        format_amount(totals.market_value),
        theme::ACCENT,
        format!("{} gain", format_signed(totals.gain)),
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, subtitle: String) {
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(panel(title));

    f.render_widget(text, area);
}

fn render_spending_chart(f: &mut Frame, area: Rect, summary: &MonthSummary) {
    if summary.by_category.is_empty() {
        render_empty(
            f,
            area,
            "Spending by Category",
            &["No expenses this month", "Add one with :add-txn"],
        );
        return;
    }

    let bars: Vec<Bar> = summary
        .by_category
        .iter()
        .take(10)
        .map(|(name, amount)| {
            Bar::default()
                .value(amount.to_u64().unwrap_or(0))
                .text_value(format!("{:.0}", amount.round_dp(0)))
                .label(Line::from(truncate(name, 9)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::BASE)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(panel("Spending by Category"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(1);

    f.render_widget(chart, area);
}

/// Obligations and bills over the next week.
fn render_upcoming(f: &mut Frame, area: Rect, app: &App) {
    let from = app.today;
    let to = from
        .checked_add_days(Days::new(UPCOMING_DAYS - 1))
        .unwrap_or(from);
    let days = projection::project_window(&app.ledger.projection_inputs(), from, to);

    let mut lines: Vec<Line> = Vec::new();
    for day in days.iter().filter(|d| !d.is_empty()) {
        let date = day.date.format("%d/%m").to_string();
        if let Some(name) = day.holiday {
            lines.push(Line::from(vec![
                Span::styled(format!("{date} "), theme::dim_style()),
                Span::styled(name, theme::holiday_style()),
            ]));
        }
        for o in &day.obligations {
            lines.push(Line::from(vec![
                Span::styled(format!("{date} "), theme::dim_style()),
                Span::styled(truncate(&o.description, 18), theme::normal_style()),
                Span::raw(" "),
                Span::styled(
                    format_signed(o.kind.signed(o.value)),
                    theme::amount_style(o.kind.signed(o.value)),
                ),
            ]));
        }
        for b in &day.bills {
            lines.push(Line::from(vec![
                Span::styled(format!("{date} "), theme::dim_style()),
                Span::styled(format!("Fatura {}", truncate(&b.card_name, 11)), theme::bill_style()),
                Span::raw(" "),
                Span::styled(format_amount(-b.amount), theme::expense_style()),
            ]));
        }
    }

    if lines.is_empty() {
        render_empty(f, area, "Next 7 Days", &["Nothing scheduled"]);
        return;
    }

    let totals = projection::window_totals(&days);
    lines.push(Line::from(Span::styled(
        format!("Net {}", format_signed(totals.net())),
        theme::amount_style(totals.net()),
    )));
    f.render_widget(Paragraph::new(lines).block(panel("Next 7 Days")), area);
}

fn render_goals(f: &mut Frame, area: Rect, app: &App) {
    if app.ledger.goals.is_empty() {
        render_empty(f, area, "Goals", &["No goals yet", ":goal Viagem 8000"]);
        return;
    }

    let bar_width = 12usize;
    let lines: Vec<Line> = app
        .ledger
        .goals
        .iter()
        .map(|g| {
            let progress = g.progress();
            let filled = (progress * Decimal::from(bar_width))
                .round()
                .to_usize()
                .unwrap_or(0)
                .min(bar_width);
            let style = if g.is_reached() {
                theme::income_style()
            } else {
                Style::default().fg(theme::ACCENT)
            };
            Line::from(vec![
                Span::styled(format!("{:<14} ", truncate(&g.name, 14)), theme::normal_style()),
                Span::styled("█".repeat(filled), style),
                Span::styled("░".repeat(bar_width - filled), theme::dim_style()),
                Span::styled(
                    format!(" {}", format_percent(progress * Decimal::ONE_HUNDRED)),
                    theme::dim_style(),
                ),
                Span::styled(
                    if g.is_reached() {
                        String::new()
                    } else {
                        format!("  {} left", format_amount(g.remaining()))
                    },
                    theme::dim_style(),
                ),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(panel("Goals")), area);
}

fn render_trend_sparkline(f: &mut Frame, area: Rect, app: &App) {
    let trend = app.ledger.monthly_trend(app.current_month, TREND_MONTHS);
    let data: Vec<u64> = trend
        .iter()
        .map(|m| m.expenses.to_u64().unwrap_or(0))
        .collect();

    let first = trend.first().map(|m| m.month.to_string()).unwrap_or_default();
    let sparkline = Sparkline::default()
        .block(panel(format!("Monthly Spending since {first}")))
        .data(&data)
        .style(Style::default().fg(theme::YELLOW));

    f.render_widget(sparkline, area);
}
