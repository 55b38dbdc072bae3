use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::path::Path;

use super::shellexpand;
use crate::calendar::holidays::{holiday_list, holiday_on, is_supported_year};
use crate::calendar::projection::{self, DayProjection, ProjectionTotals};
use crate::calendar::YearMonth;
use crate::db::Database;
use crate::portfolio;
use crate::store::Ledger;
use crate::ui::util::{format_amount, format_percent, format_signed};

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    match args[1].as_str() {
        "holidays" => cli_holidays(&args[2..], today),
        "calendar" | "cal" => cli_calendar(&args[2..], db, today),
        "summary" | "s" => cli_summary(&args[2..], db, today),
        "portfolio" => cli_portfolio(db),
        "export" => cli_export(&args[2..], db, today),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("finboard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("FinBoard - personal finance calendar and portfolio tracker");
    println!();
    println!("Usage: finboard [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch interactive TUI");
    println!("  holidays [YYYY]               List Brazilian national holidays");
    println!("  calendar [YYYY-MM]            Projected obligations and bills per day");
    println!("    --week <YYYY-MM-DD>         Only the week containing that date");
    println!("    --day <YYYY-MM-DD>          Only that day");
    println!("  summary [YYYY-MM]             Print monthly financial summary");
    println!("  portfolio                     List holdings and dividends");
    println!("  export [path]                 Export transactions to CSV");
    println!("    --month <YYYY-MM>           Month to export (default: current)");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
    println!();
    println!("Environment: FINBOARD_DB, FINBOARD_USER, FINBOARD_LOG");
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if arg.starts_with("--") {
            skip = true;
            continue;
        }
        return Some(arg);
    }
    None
}

fn month_arg(arg: Option<&str>, today: NaiveDate) -> Result<YearMonth> {
    match arg {
        Some(s) => YearMonth::parse(s).with_context(|| format!("Invalid month '{s}', use YYYY-MM")),
        None => Ok(YearMonth::of(today)),
    }
}

fn date_arg(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', use YYYY-MM-DD"))
}

fn cli_holidays(args: &[String], today: NaiveDate) -> Result<()> {
    let year = match positional(args) {
        Some(s) => s
            .parse::<i32>()
            .with_context(|| format!("Invalid year '{s}'"))?,
        None => today.year(),
    };
    if !is_supported_year(year) {
        anyhow::bail!("Year {year} is out of range");
    }

    println!("Feriados nacionais {year}");
    println!("{}", "─".repeat(40));
    for h in holiday_list(year) {
        println!("  {}  {}", h.month_day, h.name);
    }
    if let Some(name) = holiday_on(today).filter(|_| year == today.year()) {
        println!();
        println!("Today: {name}");
    }
    Ok(())
}

fn print_day(day: &DayProjection) {
    println!("{}", day.date.format("%a %d/%m/%Y"));
    if let Some(name) = day.holiday {
        println!("    * {name}");
    }
    for o in &day.obligations {
        println!(
            "    {:<28} {:>16}  ({})",
            o.description,
            format_signed(o.kind.signed(o.value)),
            o.category
        );
    }
    for b in &day.bills {
        println!(
            "    {:<28} {:>16}",
            format!("Fatura {}", b.card_name),
            format_amount(-b.amount)
        );
    }
}

fn print_totals(totals: ProjectionTotals) {
    println!("{}", "─".repeat(50));
    println!("  Expected in:   {}", format_amount(totals.income));
    println!("  Expected out:  {}", format_amount(totals.outflow));
    println!("  Net:           {}", format_signed(totals.net()));
}

fn cli_calendar(args: &[String], db: &mut Database, today: NaiveDate) -> Result<()> {
    let ledger = Ledger::load(db)?;
    let inputs = ledger.projection_inputs();

    if let Some(s) = flag(args, "--day") {
        let day = projection::project_day(&inputs, date_arg(s)?);
        print_day(&day);
        print_totals(projection::window_totals(std::slice::from_ref(&day)));
        return Ok(());
    }

    if let Some(s) = flag(args, "--week") {
        let days = projection::project_week(&inputs, date_arg(s)?);
        for day in &days {
            print_day(day);
        }
        print_totals(projection::window_totals(&days));
        return Ok(());
    }

    let month = month_arg(positional(args), today)?;
    let projected = projection::project_month(&inputs, month);
    println!("FinBoard calendar - {month}");
    println!();
    for day in projected.days.iter().filter(|d| !d.is_empty()) {
        print_day(day);
    }
    let last = month.days_in_month();
    for bill in projected.bills.iter().filter(|b| b.day > last) {
        println!(
            "Not placed: Fatura {} closes on day {}, which {month} does not have",
            bill.card_name, bill.day
        );
    }
    print_totals(projected.totals());
    Ok(())
}

fn cli_summary(args: &[String], db: &mut Database, today: NaiveDate) -> Result<()> {
    let month = month_arg(positional(args), today)?;
    let ledger = Ledger::load(db)?;
    let summary = ledger.month_summary(month);
    let projected = projection::project_month(&ledger.projection_inputs(), month).totals();
    let totals = portfolio::portfolio_totals(&ledger.investments);

    println!("FinBoard - {month}");
    println!("{}", "─".repeat(40));
    println!("  Income:       {}", format_amount(summary.income));
    println!("  Expenses:     {}", format_amount(summary.expenses));
    println!("  Net:          {}", format_signed(summary.net()));
    println!("  Projected:    {}", format_signed(projected.net()));
    println!("  Portfolio:    {}", format_amount(totals.market_value));
    println!("  Total Txns:   {}", db.get_transaction_count()?);

    if !summary.by_category.is_empty() {
        println!();
        println!("Spending by Category:");
        for (name, amount) in &summary.by_category {
            println!("  {name:<24} {}", format_amount(*amount));
        }
    }

    if !ledger.goals.is_empty() {
        println!();
        println!("Goals:");
        for g in &ledger.goals {
            println!(
                "  {:<24} {} of {} ({})",
                g.name,
                format_amount(g.current_amount),
                format_amount(g.target_amount),
                format_percent(g.progress() * Decimal::ONE_HUNDRED)
            );
        }
    }
    Ok(())
}

fn cli_portfolio(db: &mut Database) -> Result<()> {
    let ledger = Ledger::load(db)?;
    if ledger.investments.is_empty() {
        println!("No investments");
        return Ok(());
    }

    println!(
        "{:<28} {:>10} {:>16} {:>16} {:>16} {:>7}",
        "Asset", "Qty", "Avg", "Value", "Gain", "Alloc"
    );
    println!("{}", "─".repeat(98));
    for h in &ledger.investments {
        println!(
            "{:<28} {:>10} {:>16} {:>16} {:>16} {:>7}",
            h.display_name(),
            h.quantity.normalize(),
            format_amount(h.purchase_price),
            format_amount(h.total_value),
            format_signed(h.gain()),
            format_percent(h.percentage)
        );
    }

    let totals = portfolio::portfolio_totals(&ledger.investments);
    let dividends: Decimal = ledger.dividends.iter().map(|d| d.amount).sum();
    println!("{}", "─".repeat(98));
    println!("  Invested:   {}", format_amount(totals.invested));
    println!("  Market:     {}", format_amount(totals.market_value));
    println!("  Gain:       {}", format_signed(totals.gain));
    println!("  Dividends:  {}", format_amount(dividends));
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database, today: NaiveDate) -> Result<()> {
    let month = month_arg(flag(args, "--month"), today)?;

    let output_path = positional(args).map(shellexpand).unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/finboard-export-{month}.csv")
    });

    let count = db.export_to_csv(Path::new(&output_path), Some(month))?;
    if count == 0 {
        println!("No transactions for {month}");
    } else {
        println!("Exported {count} transactions to {output_path}");
    }
    Ok(())
}
