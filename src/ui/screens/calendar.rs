use chrono::{Datelike, Days, NaiveDate};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use rust_decimal::Decimal;

use super::panel;
use crate::calendar::projection::{self, DayProjection, MonthProjection, ProjectionTotals};
use crate::calendar::{week_start, CalendarView};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_signed, truncate};

const WEEKDAYS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_sunday() as usize]
}

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    let inputs = app.ledger.projection_inputs();
    match app.calendar_view {
        CalendarView::Month => {
            let month = projection::project_month(&inputs, app.current_month);
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
                .split(chunks[0]);
            render_month_grid(f, cols[0], app, &month);
            let selected = month
                .day(app.selected_date.day())
                .cloned()
                .unwrap_or_else(|| projection::project_day(&inputs, app.selected_date));
            render_day_detail(f, cols[1], app, &selected);
            render_totals(
                f,
                chunks[1],
                &format!("Month {}", month.month),
                month.totals(),
                &unplaced_bills(&month),
            );
        }
        CalendarView::Week => {
            let days = projection::project_week(&inputs, app.selected_date);
            render_week(f, chunks[0], app, &days);
            let label = match (days.first(), days.last()) {
                (Some(a), Some(b)) => format!(
                    "Week {} - {}",
                    a.date.format("%d/%m"),
                    b.date.format("%d/%m")
                ),
                _ => "Week".to_string(),
            };
            render_totals(f, chunks[1], &label, projection::window_totals(&days), "");
        }
        CalendarView::Day => {
            let day = projection::project_day(&inputs, app.selected_date);
            render_day_detail(f, chunks[0], app, &day);
            let label = format!("Day {}", day.date.format("%d/%m/%Y"));
            render_totals(
                f,
                chunks[1],
                &label,
                projection::window_totals(std::slice::from_ref(&day)),
                "",
            );
        }
    }
}

/// Bills whose closing day this month does not have.
fn unplaced_bills(month: &MonthProjection) -> String {
    let last = month.month.days_in_month();
    month
        .bills
        .iter()
        .filter(|b| b.day > last)
        .map(|b| format!("{} (closes day {})", b.card_name, b.day))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_month_grid(f: &mut Frame, area: Rect, app: &App, month: &MonthProjection) {
    let first = month.month.first_day();
    let last = month.month.last_day();

    let mut weeks: Vec<NaiveDate> = Vec::new();
    let mut start = week_start(first);
    while start <= last {
        weeks.push(start);
        match start.checked_add_days(Days::new(7)) {
            Some(next) => start = next,
            None => break,
        }
    }

    let inner_height = area.height.saturating_sub(3) as usize;
    let row_height = (inner_height / weeks.len().max(1)).clamp(2, 4);
    let cell_width = (area.width.saturating_sub(2) / 7).saturating_sub(1) as usize;

    let header = Row::new(
        WEEKDAYS
            .iter()
            .map(|d| Cell::from(*d).style(theme::header_style())),
    );

    let rows: Vec<Row> = weeks
        .iter()
        .map(|week| {
            let cells: Vec<Cell> = (0..7)
                .map(|offset| {
                    let date = week.checked_add_days(Days::new(offset));
                    match date.filter(|d| month.month.contains(*d)) {
                        Some(d) => month
                            .day(d.day())
                            .map(|day| day_cell(app, day, cell_width, row_height))
                            .unwrap_or_default(),
                        None => Cell::default(),
                    }
                })
                .collect();
            Row::new(cells).height(row_height as u16)
        })
        .collect();

    let widths = [Constraint::Ratio(1, 7); 7];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(panel(format!("{} ({})", month.month, CalendarView::Month)));
    f.render_widget(table, area);
}

fn day_cell<'a>(app: &App, day: &DayProjection, width: usize, height: usize) -> Cell<'a> {
    let number_style = if day.date == app.selected_date {
        theme::selected_style()
    } else if day.date == app.today {
        theme::today_style()
    } else if day.holiday.is_some() {
        theme::holiday_style()
    } else {
        theme::normal_style()
    };

    let mut lines = vec![Line::from(Span::styled(
        format!("{:>2}", day.date.day()),
        number_style,
    ))];
    if let Some(name) = day.holiday {
        lines.push(Line::from(Span::styled(truncate(name, width), theme::holiday_style())));
    }
    let income = day.expected_income();
    if income > Decimal::ZERO {
        lines.push(Line::from(Span::styled(
            format!("+{}", income.round_dp(0)),
            theme::income_style(),
        )));
    }
    let outflow = day.expected_outflow();
    if outflow > Decimal::ZERO {
        let style = if day.bills.is_empty() {
            theme::expense_style()
        } else {
            theme::bill_style()
        };
        lines.push(Line::from(Span::styled(format!("-{}", outflow.round_dp(0)), style)));
    }
    lines.truncate(height);
    Cell::from(Text::from(lines))
}

fn render_week(f: &mut Frame, area: Rect, app: &App, days: &[DayProjection]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(area);

    for (day, col) in days.iter().zip(cols.iter()) {
        let width = col.width.saturating_sub(2) as usize;
        let mut lines: Vec<Line> = Vec::new();
        if let Some(name) = day.holiday {
            lines.push(Line::from(Span::styled(truncate(name, width), theme::holiday_style())));
        }
        for o in &day.obligations {
            lines.push(Line::from(Span::styled(
                truncate(&o.description, width),
                theme::normal_style(),
            )));
            let value = o.kind.signed(o.value);
            lines.push(Line::from(Span::styled(format_signed(value), theme::amount_style(value))));
        }
        for b in &day.bills {
            lines.push(Line::from(Span::styled(
                truncate(&format!("Fatura {}", b.card_name), width),
                theme::bill_style(),
            )));
            lines.push(Line::from(Span::styled(
                format_amount(-b.amount),
                theme::expense_style(),
            )));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled("-", theme::dim_style())));
        }

        let mut block = panel(format!("{} {}", weekday_name(day.date), day.date.format("%d/%m")));
        if day.date == app.selected_date {
            block = block.border_style(Style::default().fg(theme::ACCENT));
        } else if day.date == app.today {
            block = block.border_style(Style::default().fg(theme::YELLOW));
        }
        f.render_widget(Paragraph::new(lines).block(block), *col);
    }
}

fn render_day_detail(f: &mut Frame, area: Rect, app: &App, day: &DayProjection) {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(name) = day.holiday {
        lines.push(Line::from(Span::styled(format!("Feriado: {name}"), theme::holiday_style())));
        lines.push(Line::from(""));
    }

    if !day.obligations.is_empty() || !day.bills.is_empty() {
        lines.push(Line::from(Span::styled("Expected", theme::title_style())));
    }
    for o in &day.obligations {
        let value = o.kind.signed(o.value);
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", o.description), theme::normal_style()),
            Span::styled(format!("({}) ", o.category), theme::dim_style()),
            Span::styled(format_signed(value), theme::amount_style(value)),
        ]));
    }
    for b in &day.bills {
        lines.push(Line::from(vec![
            Span::styled(format!("Fatura {} ", b.card_name), theme::bill_style()),
            Span::styled(format_amount(-b.amount), theme::expense_style()),
        ]));
    }

    let recorded: Vec<_> = app
        .ledger
        .transactions
        .iter()
        .filter(|t| t.date == day.date)
        .collect();
    if !recorded.is_empty() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled("Recorded", theme::title_style())));
        for t in recorded {
            let value = t.signed_value();
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", t.description), theme::normal_style()),
                Span::styled(format_signed(value), theme::amount_style(value)),
            ]));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("Nothing on this day", theme::dim_style())));
    }

    let title = format!(
        "{} {}",
        weekday_name(day.date),
        day.date.format("%d/%m/%Y")
    );
    let detail = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(panel(title));
    f.render_widget(detail, area);
}

fn render_totals(f: &mut Frame, area: Rect, label: &str, totals: ProjectionTotals, note: &str) {
    let net = totals.net();
    let mut spans = vec![
        Span::styled(format!("{label}  "), theme::dim_style()),
        Span::styled("In ", theme::dim_style()),
        Span::styled(format_amount(totals.income), theme::income_style()),
        Span::styled("  Out ", theme::dim_style()),
        Span::styled(format_amount(totals.outflow), theme::expense_style()),
        Span::styled("  Net ", theme::dim_style()),
        Span::styled(format_signed(net), theme::amount_style(net)),
    ];
    if !note.is_empty() {
        spans.push(Span::styled(format!("  Not placed: {note}"), theme::bill_style()));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).block(panel("Projected")),
        area,
    );
}
