use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::app::{App, Screen};
use crate::calendar::projection::days_from_range;
use crate::calendar::{CalendarView, YearMonth};
use crate::db::Database;
use crate::models::*;
use crate::portfolio::Purchase;
use crate::store::Action;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit FinBoard", cmd_quit, r);
    register_command!("quit", "Quit FinBoard", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("cal", "Go to Calendar", cmd_calendar, r);
    register_command!("calendar", "Go to Calendar", cmd_calendar, r);
    register_command!("inv", "Go to Investments", cmd_investments, r);
    register_command!("investments", "Go to Investments", cmd_investments, r);
    register_command!("rec", "Go to Recurring", cmd_recurring_screen, r);
    register_command!("cards", "Go to Cards", cmd_cards, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-03)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-03)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "week",
        "Calendar week view (e.g. :week 2024-03-10)",
        cmd_week,
        r
    );
    register_command!(
        "day",
        "Calendar day view (e.g. :day 2024-03-10)",
        cmd_day,
        r
    );
    register_command!("view", "Calendar view: month, week or day", cmd_view, r);
    register_command!(
        "search",
        "Search transactions (e.g. :search mercado)",
        cmd_search,
        r
    );
    register_command!("s", "Search transactions (e.g. :s mercado)", cmd_search, r);
    register_command!(
        "add-txn",
        "Add transaction (e.g. :add-txn 2024-03-10 Geladeira -3000 card=Nubank n=10 cat=Casa)",
        cmd_add_txn,
        r
    );
    register_command!(
        "delete-txn",
        "Delete selected transaction",
        cmd_delete_txn,
        r
    );
    register_command!(
        "buy",
        "Buy an asset (e.g. :buy PETR4 100 32.50 cat=Ações)",
        cmd_buy,
        r
    );
    register_command!(
        "quote",
        "Set current price (e.g. :quote PETR4 35.10)",
        cmd_quote,
        r
    );
    register_command!(
        "delete-inv",
        "Delete selected investment (or :delete-inv PETR4)",
        cmd_delete_inv,
        r
    );
    register_command!(
        "dividend",
        "Record a dividend (e.g. :dividend PETR4 12.30 date=2024-03-25)",
        cmd_dividend,
        r
    );
    register_command!(
        "recurring",
        "Add recurring entry (e.g. :recurring Aluguel -1500 days=5,20 cat=Moradia)",
        cmd_recurring,
        r
    );
    register_command!(
        "edit-recurring",
        "Edit selected recurring entry (e.g. :edit-recurring 1600 days=10)",
        cmd_edit_recurring,
        r
    );
    register_command!(
        "delete-recurring",
        "Delete selected recurring entry",
        cmd_delete_recurring,
        r
    );
    register_command!(
        "card",
        "Add credit card (e.g. :card Nubank 10 17 limit=5000 brand=Mastercard)",
        cmd_card,
        r
    );
    register_command!("delete-card", "Delete selected card", cmd_delete_card, r);
    register_command!(
        "pay-bill",
        "Pay a card bill (e.g. :pay-bill Nubank 2024-03)",
        cmd_pay_bill,
        r
    );
    register_command!(
        "goal",
        "Add savings goal (e.g. :goal Viagem 8000 by=2025-01-31)",
        cmd_goal,
        r
    );
    register_command!(
        "contribute",
        "Add to a goal (e.g. :contribute Viagem 500)",
        cmd_contribute,
        r
    );
    register_command!(
        "delete-goal",
        "Delete a goal (e.g. :delete-goal Viagem)",
        cmd_delete_goal,
        r
    );
    register_command!(
        "category",
        "Add a category (e.g. :category Pets kind=expense)",
        cmd_category,
        r
    );
    register_command!(
        "export",
        "Export transactions to CSV (e.g. :export ~/finboard.csv)",
        cmd_export,
        r
    );

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, db) {
            tracing::warn!(command = cmd_name, error = %format!("{e:#}"), "command failed");
            app.set_status(format!("Error: {e:#}"));
        }
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Argument parsing ─────────────────────────────────────────

/// Positional words plus `key=value` flags. Underscores in flag values
/// stand for spaces (`name=Tesouro_Selic`).
#[derive(Debug, Default)]
pub(crate) struct Args<'a> {
    pub(crate) words: Vec<&'a str>,
    pub(crate) flags: HashMap<&'a str, String>,
}

impl<'a> Args<'a> {
    pub(crate) fn parse(input: &'a str) -> Self {
        let mut args = Self::default();
        for token in input.split_whitespace() {
            match token.split_once('=') {
                Some((key, value))
                    if !key.is_empty() && key.chars().all(|c| c.is_ascii_lowercase()) =>
                {
                    args.flags.insert(key, value.replace('_', " "));
                }
                _ => args.words.push(token),
            }
        }
        args
    }

    fn flag(&self, key: &str) -> Option<&str> {
        self.flags.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    fn date_flag(&self, key: &str, today: NaiveDate) -> Result<Option<NaiveDate>, String> {
        match self.flag(key) {
            None => Ok(None),
            Some(v) => parse_date(v, today)
                .map(Some)
                .ok_or_else(|| format!("Invalid date for {key}=: {v}")),
        }
    }

    fn amount_flag(&self, key: &str) -> Result<Option<Decimal>, String> {
        match self.flag(key) {
            None => Ok(None),
            Some(v) => parse_amount(v)
                .map(Some)
                .ok_or_else(|| format!("Invalid amount for {key}=: {v}")),
        }
    }
}

/// `YYYY-MM-DD`, `DD/MM/YYYY`, `DD/MM` (this year) or `today`.
pub(crate) fn parse_date(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("today") || s.eq_ignore_ascii_case("hoje") {
        return Some(today);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Some(d);
    }
    let (day, month) = s.split_once('/')?;
    let year = chrono::Datelike::year(&today);
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

/// Accepts `-4.50`, `1234.5`, `1.234,56` and an optional `R$` prefix.
pub(crate) fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.trim_start_matches("R$").trim();
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// `#12` picks by id, anything else by ticker or name.
fn find_investment<'a>(app: &'a App, key: &str) -> Option<&'a Investment> {
    if let Some(id) = key.strip_prefix('#').and_then(|n| n.parse::<i64>().ok()) {
        return app.ledger.investment(id);
    }
    let key = key.to_lowercase();
    app.ledger.investments.iter().find(|i| {
        i.ticker.as_deref().is_some_and(|t| t.to_lowercase() == key)
            || i.name.to_lowercase() == key
    })
}

fn find_card<'a>(app: &'a App, key: &str) -> Option<&'a CreditCard> {
    if let Some(id) = key.strip_prefix('#').and_then(|n| n.parse::<i64>().ok()) {
        return app.ledger.card(id);
    }
    CreditCard::find_by_name(&app.ledger.cards, key)
}

fn find_goal<'a>(app: &'a App, key: &str) -> Option<&'a Goal> {
    if let Some(id) = key.strip_prefix('#').and_then(|n| n.parse::<i64>().ok()) {
        return app.ledger.goal(id);
    }
    let key = key.trim().to_lowercase();
    app.ledger
        .goals
        .iter()
        .find(|g| g.name.trim().to_lowercase() == key)
}

/// Canonical spelling of a known category, or the text as typed.
fn category_name(app: &App, typed: Option<&str>, kind: TransactionKind) -> String {
    match typed {
        Some(name) => Category::find_by_name(&app.ledger.categories, name)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| name.to_string()),
        None => match kind {
            TransactionKind::Income => "Outras Receitas".into(),
            TransactionKind::Expense => "Outros".into(),
        },
    }
}

/// Days from `days=5,20` or from a `from=`/`to=` date range.
fn parse_days(args: &Args<'_>, today: NaiveDate) -> Result<Option<BTreeSet<u32>>, String> {
    if let Some(list) = args.flag("days") {
        let mut days = BTreeSet::new();
        for part in list.split(',') {
            let day = part
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("Invalid day: {part}"))?;
            days.insert(day);
        }
        return Ok(Some(days));
    }
    match (args.date_flag("from", today)?, args.date_flag("to", today)?) {
        (Some(from), Some(to)) => days_from_range(from, to)
            .map(Some)
            .map_err(|e| format!("Invalid: {e}")),
        (Some(_), None) | (None, Some(_)) => Err("Give both from= and to=".into()),
        (None, None) => Ok(None),
    }
}

/// Amount sign picks the kind (negative is an expense) unless `kind=` says otherwise.
fn signed_kind(args: &Args<'_>, amount: Decimal) -> (TransactionKind, Decimal) {
    let kind = match args.flag("kind") {
        Some(k) => TransactionKind::parse(k),
        None if amount.is_sign_negative() => TransactionKind::Expense,
        None => TransactionKind::Income,
    };
    (kind, amount.abs())
}

pub(crate) fn parse_add_txn(input: &str, app: &App) -> Result<Action, String> {
    const USAGE: &str = "Usage: :add-txn [date] <description> <amount> [cat= card= n= pay= kind= inv= notes=]";
    let args = Args::parse(input);
    let (date, rest) = match args.words.first().and_then(|w| parse_date(w, app.today)) {
        Some(date) => (date, &args.words[1..]),
        None => (app.today, &args.words[..]),
    };
    let Some((amount_word, description)) = rest.split_last() else {
        return Err(USAGE.into());
    };
    if description.is_empty() {
        return Err(USAGE.into());
    }
    let amount = parse_amount(amount_word).ok_or_else(|| format!("Invalid amount: {amount_word}"))?;
    let (kind, value) = signed_kind(&args, amount);
    let category = category_name(app, args.flag("cat"), kind);

    let mut txn = NewTransaction::new(date, description.join(" "), category, kind, value);
    if let Some(pay) = args.flag("pay") {
        txn.payment_method = PaymentMethod::try_parse(pay).ok_or_else(|| {
            let known: Vec<&str> = PaymentMethod::all().iter().map(|m| m.as_str()).collect();
            format!("Unknown payment method {pay} (use {})", known.join(", "))
        })?;
    }
    if let Some(label) = args.flag("card") {
        txn = match find_card(app, label) {
            Some(card) => txn.with_card(card.id, Some(card.name.clone())),
            None => txn.with_card(None, Some(label.to_string())),
        };
    }
    if let Some(n) = args.flag("n") {
        let n = n.parse::<u32>().map_err(|_| format!("Invalid installment count: {n}"))?;
        txn = txn.with_installments(n);
    }
    if let Some(inv) = args.flag("inv") {
        let holding = find_investment(app, inv).ok_or_else(|| format!("No investment {inv}"))?;
        txn.investment_id = holding.id;
    }
    if let Some(notes) = args.flag("notes") {
        txn.notes = notes.to_string();
    }
    Ok(Action::AddTransaction(txn))
}

pub(crate) fn parse_buy(input: &str, app: &App) -> Result<Action, String> {
    const USAGE: &str = "Usage: :buy <ticker> <quantity> <price> [name= cat= current= date=]";
    let args = Args::parse(input);
    let [ticker, qty, price] = args.words.as_slice() else {
        return Err(USAGE.into());
    };
    let quantity = parse_amount(qty).ok_or_else(|| format!("Invalid quantity: {qty}"))?;
    let purchase_price = parse_amount(price).ok_or_else(|| format!("Invalid price: {price}"))?;
    let ticker = (*ticker != "-").then(|| ticker.to_string());
    let name = args
        .flag("name")
        .map(str::to_string)
        .or_else(|| ticker.clone())
        .unwrap_or_default();
    Ok(Action::BuyInvestment(Purchase {
        ticker,
        name,
        category: args.flag("cat").unwrap_or("Ações").to_string(),
        quantity,
        purchase_price,
        current_price: args.amount_flag("current")?,
        date: args.date_flag("date", app.today)?.unwrap_or(app.today),
        color: String::new(),
        icon: String::new(),
    }))
}

pub(crate) fn parse_recurring(input: &str, app: &App) -> Result<Action, String> {
    const USAGE: &str =
        "Usage: :recurring <description> <amount> days=5,20 | from=<date> to=<date> [cat= kind=]";
    let args = Args::parse(input);
    let Some((amount_word, description)) = args.words.split_last() else {
        return Err(USAGE.into());
    };
    if description.is_empty() {
        return Err(USAGE.into());
    }
    let amount = parse_amount(amount_word).ok_or_else(|| format!("Invalid amount: {amount_word}"))?;
    let (kind, value) = signed_kind(&args, amount);
    let days = parse_days(&args, app.today)?.ok_or_else(|| USAGE.to_string())?;
    let category = category_name(app, args.flag("cat"), kind);
    RecurringObligation::new(description.join(" "), category, kind, value, days)
        .map(Action::AddRecurring)
        .map_err(|e| format!("Invalid: {e}"))
}

pub(crate) fn parse_edit_recurring(input: &str, app: &App) -> Result<Action, String> {
    let mut entry = app
        .selected_recurring()
        .cloned()
        .ok_or("Select a recurring entry first (:rec)")?;
    let args = Args::parse(input);
    if let Some(amount_word) = args.words.first() {
        let amount =
            parse_amount(amount_word).ok_or_else(|| format!("Invalid amount: {amount_word}"))?;
        entry.value = amount.abs();
        if args.flag("kind").is_none() && amount.is_sign_negative() {
            entry.kind = TransactionKind::Expense;
        }
    }
    if let Some(kind) = args.flag("kind") {
        entry.kind = TransactionKind::parse(kind);
    }
    if let Some(days) = parse_days(&args, app.today)? {
        entry.days_of_month = days;
    }
    if let Some(cat) = args.flag("cat") {
        entry.category = category_name(app, Some(cat), entry.kind);
    }
    if let Some(desc) = args.flag("desc") {
        entry.description = desc.to_string();
    }
    Ok(Action::UpdateRecurring(entry))
}

pub(crate) fn parse_card(input: &str) -> Result<Action, String> {
    const USAGE: &str = "Usage: :card <name> <closing day> <due day> [limit= brand=]";
    let args = Args::parse(input);
    let n = args.words.len();
    if n < 3 {
        return Err(USAGE.into());
    }
    let closing = args.words[n - 2]
        .parse::<u32>()
        .map_err(|_| USAGE.to_string())?;
    let due = args.words[n - 1]
        .parse::<u32>()
        .map_err(|_| USAGE.to_string())?;
    let name = args.words[..n - 2].join(" ");
    let brand = args.flag("brand").unwrap_or_default().to_string();
    let limit = args.amount_flag("limit")?.unwrap_or_default();
    CreditCard::new(name, brand, closing, due, limit)
        .map(Action::AddCard)
        .map_err(|e| format!("Invalid: {e}"))
}

pub(crate) fn parse_pay_bill(input: &str, app: &App) -> Result<Action, String> {
    let args = Args::parse(input);
    let mut month = app.current_month;
    let mut label = Vec::new();
    for word in &args.words {
        match YearMonth::parse(word) {
            Some(m) => month = m,
            None => label.push(*word),
        }
    }
    let card = if label.is_empty() {
        app.selected_card()
            .ok_or("Usage: :pay-bill <card> [YYYY-MM] [date=]")?
    } else {
        let label = label.join(" ");
        find_card(app, &label).ok_or_else(|| format!("No card named {label}"))?
    };
    let card_id = card.id.ok_or("Card has no id")?;
    let date = args.date_flag("date", app.today)?.unwrap_or(app.today);
    Ok(Action::PayBill {
        card_id,
        month,
        date,
    })
}

pub(crate) fn parse_dividend(input: &str, app: &App) -> Result<Action, String> {
    const USAGE: &str = "Usage: :dividend <ticker|#id|-> <amount> [date= desc=]";
    let args = Args::parse(input);
    let [asset, amount_word] = args.words.as_slice() else {
        return Err(USAGE.into());
    };
    let amount = parse_amount(amount_word).ok_or_else(|| format!("Invalid amount: {amount_word}"))?;
    let investment_id = match *asset {
        "-" => None,
        key => Some(
            find_investment(app, key)
                .and_then(|i| i.id)
                .ok_or_else(|| format!("No investment {key}"))?,
        ),
    };
    Ok(Action::RecordDividend {
        investment_id,
        description: args.flag("desc").unwrap_or_default().to_string(),
        amount,
        date: args.date_flag("date", app.today)?.unwrap_or(app.today),
    })
}

pub(crate) fn parse_goal(input: &str, app: &App) -> Result<Action, String> {
    const USAGE: &str = "Usage: :goal <name> <target> [by=<date>]";
    let args = Args::parse(input);
    let Some((target_word, name)) = args.words.split_last() else {
        return Err(USAGE.into());
    };
    if name.is_empty() {
        return Err(USAGE.into());
    }
    let target = parse_amount(target_word).ok_or_else(|| format!("Invalid amount: {target_word}"))?;
    let deadline = args.date_flag("by", app.today)?;
    Ok(Action::AddGoal(Goal::new(name.join(" "), target, deadline)))
}

pub(crate) fn parse_contribute(input: &str, app: &App) -> Result<Action, String> {
    const USAGE: &str = "Usage: :contribute <goal> <amount>";
    let args = Args::parse(input);
    let Some((amount_word, name)) = args.words.split_last() else {
        return Err(USAGE.into());
    };
    let amount = parse_amount(amount_word).ok_or_else(|| format!("Invalid amount: {amount_word}"))?;
    let name = name.join(" ");
    let goal = find_goal(app, &name).ok_or_else(|| format!("No goal named {name}"))?;
    Ok(Action::ContributeGoal {
        goal_id: goal.id.ok_or("Goal has no id")?,
        amount,
    })
}

pub(crate) fn parse_category(input: &str) -> Result<Action, String> {
    let args = Args::parse(input);
    if args.words.is_empty() {
        return Err("Usage: :category <name> [kind=income|expense]".into());
    }
    let kind = args
        .flag("kind")
        .map(TransactionKind::parse)
        .unwrap_or(TransactionKind::Expense);
    Ok(Action::AddCategory(Category::new(args.words.join(" "), kind)))
}

/// Dispatch a parsed action, or show the parse error.
fn run_parsed(parsed: Result<Action, String>, app: &mut App, db: &mut Database) {
    match parsed {
        Ok(action) => app.dispatch(db, action),
        Err(msg) => app.set_status(msg),
    }
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    Ok(())
}

fn cmd_calendar(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Calendar;
    Ok(())
}

fn cmd_investments(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Investments;
    Ok(())
}

fn cmd_recurring_screen(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Recurring;
    Ok(())
}

fn cmd_cards(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Cards;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_month(YearMonth::of(app.today));
        app.set_status(format!("Switched to month: {}", app.current_month));
        return Ok(());
    }

    // Accept "2024-03", "2024-3", "03" and "3"
    let month = if args.len() <= 2 {
        args.parse::<u32>()
            .ok()
            .and_then(|m| YearMonth::new(app.current_month.year, m))
    } else {
        YearMonth::parse(args)
    };

    match month {
        Some(m) => {
            app.set_month(m);
            app.set_status(format!("Switched to month: {m}"));
        }
        None => app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-03)"),
    }
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.set_month(app.current_month.shift(1));
    app.set_status(format!("Month: {}", app.current_month));
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.set_month(app.current_month.shift(-1));
    app.set_status(format!("Month: {}", app.current_month));
    Ok(())
}

fn show_calendar(args: &str, app: &mut App, view: CalendarView) {
    if !args.is_empty() {
        match parse_date(args, app.today) {
            Some(date) => app.select_date(date),
            None => {
                app.set_status(format!("Invalid date: {args}"));
                return;
            }
        }
    }
    app.calendar_view = view;
    app.screen = Screen::Calendar;
}

fn cmd_week(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    show_calendar(args, app, CalendarView::Week);
    Ok(())
}

fn cmd_day(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    show_calendar(args, app, CalendarView::Day);
    Ok(())
}

fn cmd_view(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    match CalendarView::parse(args) {
        Some(view) => {
            app.calendar_view = view;
            app.screen = Screen::Calendar;
        }
        None => app.set_status("Usage: :view <month|week|day>"),
    }
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.screen = Screen::Transactions;
    app.transaction_index = 0;
    app.transaction_scroll = 0;
    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        let count = app.visible_transactions().len();
        app.set_status(format!("{count} results for \"{args}\""));
    }
    Ok(())
}

fn cmd_add_txn(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = parse_add_txn(args, app);
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_delete_txn(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    match app.selected_transaction().and_then(|t| Some((t.id?, t.description.clone()))) {
        Some((id, desc)) => {
            app.request_confirm(format!("Delete \"{desc}\"?"), Action::DeleteTransaction(id));
        }
        None => app.set_status("No transaction selected"),
    }
    Ok(())
}

fn cmd_buy(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = parse_buy(args, app);
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_quote(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = {
        let words: Vec<&str> = args.split_whitespace().collect();
        let (holding, price_word) = match words.as_slice() {
            [price] => (app.selected_investment(), *price),
            [key, price] => (find_investment(app, key), *price),
            _ => (None, ""),
        };
        match (holding.and_then(|h| h.id), parse_amount(price_word)) {
            (Some(investment_id), Some(price)) => Ok(Action::UpdateQuote {
                investment_id,
                price,
            }),
            _ => Err("Usage: :quote [ticker|#id] <price>".to_string()),
        }
    };
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_delete_inv(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let holding = if args.is_empty() {
        app.selected_investment()
    } else {
        find_investment(app, args)
    };
    match holding.and_then(|h| Some((h.id?, h.display_name()))) {
        Some((id, name)) => app.request_confirm(
            format!("Delete {name}? Dividends and contributions are kept."),
            Action::DeleteInvestment(id),
        ),
        None => app.set_status("No investment selected"),
    }
    Ok(())
}

fn cmd_dividend(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = parse_dividend(args, app);
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_recurring(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = parse_recurring(args, app);
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_edit_recurring(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = parse_edit_recurring(args, app);
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_delete_recurring(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    match app
        .selected_recurring()
        .and_then(|r| Some((r.id?, r.description.clone())))
    {
        Some((id, desc)) => {
            app.request_confirm(format!("Delete recurring \"{desc}\"?"), Action::DeleteRecurring(id));
        }
        None => app.set_status("No recurring entry selected"),
    }
    Ok(())
}

fn cmd_card(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    run_parsed(parse_card(args), app, db);
    Ok(())
}

fn cmd_delete_card(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    match app.selected_card().and_then(|c| Some((c.id?, c.name.clone()))) {
        Some((id, name)) => app.request_confirm(format!("Delete card {name}?"), Action::DeleteCard(id)),
        None => app.set_status("No card selected"),
    }
    Ok(())
}

fn cmd_pay_bill(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = parse_pay_bill(args, app);
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_goal(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = parse_goal(args, app);
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_contribute(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let parsed = parse_contribute(args, app);
    run_parsed(parsed, app, db);
    Ok(())
}

fn cmd_delete_goal(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    match find_goal(app, args).and_then(|g| Some((g.id?, g.name.clone()))) {
        Some((id, name)) => app.request_confirm(format!("Delete goal {name}?"), Action::DeleteGoal(id)),
        None => app.set_status("Usage: :delete-goal <name|#id>"),
    }
    Ok(())
}

fn cmd_category(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    run_parsed(parse_category(args), app, db);
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/finboard-export-{}.csv", app.current_month)
    } else {
        crate::run::shellexpand(args)
    };

    let count = db.export_to_csv(std::path::Path::new(&path), Some(app.current_month))?;
    if count == 0 {
        app.set_status("No transactions to export");
    } else {
        app.set_status(format!("Exported {count} transactions to {path}"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
