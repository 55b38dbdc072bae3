use anyhow::Result;
use chrono::{Days, NaiveDate};

use crate::calendar::{CalendarView, YearMonth};
use crate::db::Database;
use crate::error::ValidationError;
use crate::models::*;
use crate::store::{self, Action, Ledger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Dashboard,
    Transactions,
    Calendar,
    Investments,
    Recurring,
    Cards,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Dashboard,
            Self::Transactions,
            Self::Calendar,
            Self::Investments,
            Self::Recurring,
            Self::Cards,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "Dashboard"),
            Self::Transactions => write!(f, "Transactions"),
            Self::Calendar => write!(f, "Calendar"),
            Self::Investments => write!(f, "Investments"),
            Self::Recurring => write!(f, "Recurring"),
            Self::Cards => write!(f, "Cards"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// A destructive action waiting for y/N.
#[derive(Debug, Clone)]
pub(crate) struct PendingAction {
    pub(crate) action: Action,
    pub(crate) prompt: String,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    pub(crate) ledger: Ledger,
    pub(crate) today: NaiveDate,
    pub(crate) current_month: YearMonth,

    // Calendar
    pub(crate) calendar_view: CalendarView,
    pub(crate) selected_date: NaiveDate,

    // List cursors
    pub(crate) transaction_index: usize,
    pub(crate) transaction_scroll: usize,
    pub(crate) investment_index: usize,
    pub(crate) investment_scroll: usize,
    pub(crate) recurring_index: usize,
    pub(crate) recurring_scroll: usize,
    pub(crate) card_index: usize,
    pub(crate) card_scroll: usize,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(ledger: Ledger, today: NaiveDate) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,

            ledger,
            today,
            current_month: YearMonth::of(today),

            calendar_view: CalendarView::Month,
            selected_date: today,

            transaction_index: 0,
            transaction_scroll: 0,
            investment_index: 0,
            investment_scroll: 0,
            recurring_index: 0,
            recurring_scroll: 0,
            card_index: 0,
            card_scroll: 0,

            pending_action: None,

            visible_rows: 20,
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Run an action through the store. Failures become the status line.
    pub(crate) fn dispatch(&mut self, db: &mut Database, action: Action) {
        match store::dispatch(db, &self.ledger, action) {
            Ok(patch) => {
                let status = self.ledger.apply(patch);
                self.clamp_cursors();
                self.set_status(status);
            }
            Err(e) => {
                if let Some(invalid) = e.downcast_ref::<ValidationError>() {
                    self.set_status(format!("Invalid: {invalid}"));
                } else {
                    tracing::warn!(error = %format!("{e:#}"), "action failed");
                    self.set_status(format!("Error: {e:#}"));
                }
            }
        }
    }

    pub(crate) fn reload(&mut self, db: &Database) -> Result<()> {
        self.ledger = Ledger::load(db)?;
        self.clamp_cursors();
        Ok(())
    }

    /// The month's transactions, narrowed by the search text.
    pub(crate) fn visible_transactions(&self) -> Vec<&Transaction> {
        let needle = self.search_input.to_lowercase();
        self.ledger
            .transactions
            .iter()
            .filter(|t| self.current_month.contains(t.date))
            .filter(|t| {
                needle.is_empty()
                    || t.description.to_lowercase().contains(&needle)
                    || t.category.to_lowercase().contains(&needle)
                    || t.notes.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub(crate) fn selected_transaction(&self) -> Option<&Transaction> {
        self.visible_transactions()
            .get(self.transaction_index)
            .copied()
    }

    pub(crate) fn selected_investment(&self) -> Option<&Investment> {
        self.ledger.investments.get(self.investment_index)
    }

    pub(crate) fn selected_recurring(&self) -> Option<&RecurringObligation> {
        self.ledger.recurring.get(self.recurring_index)
    }

    pub(crate) fn selected_card(&self) -> Option<&CreditCard> {
        self.ledger.cards.get(self.card_index)
    }

    /// Move the viewed month; the calendar cursor follows.
    pub(crate) fn set_month(&mut self, month: YearMonth) {
        self.current_month = month;
        if !month.contains(self.selected_date) {
            let day = chrono::Datelike::day(&self.selected_date).min(month.days_in_month());
            self.selected_date = month.day(day).unwrap_or_else(|| month.first_day());
        }
        self.transaction_index = 0;
        self.transaction_scroll = 0;
    }

    /// Move the calendar cursor by `days`; the viewed month follows.
    pub(crate) fn move_selected_date(&mut self, days: i64) {
        let moved = if days >= 0 {
            self.selected_date.checked_add_days(Days::new(days as u64))
        } else {
            self.selected_date
                .checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.select_date(date);
        }
    }

    pub(crate) fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        let month = YearMonth::of(date);
        if month != self.current_month {
            self.current_month = month;
            self.transaction_index = 0;
            self.transaction_scroll = 0;
        }
    }

    pub(crate) fn request_confirm(&mut self, prompt: String, action: Action) {
        self.pending_action = Some(PendingAction { action, prompt });
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn page(&self) -> usize {
        self.visible_rows.max(1)
    }

    fn clamp_cursors(&mut self) {
        let txns = self.visible_transactions().len();
        clamp(&mut self.transaction_index, &mut self.transaction_scroll, txns);
        let len = self.ledger.investments.len();
        clamp(&mut self.investment_index, &mut self.investment_scroll, len);
        let len = self.ledger.recurring.len();
        clamp(&mut self.recurring_index, &mut self.recurring_scroll, len);
        let len = self.ledger.cards.len();
        clamp(&mut self.card_index, &mut self.card_scroll, len);
    }
}

fn clamp(index: &mut usize, scroll: &mut usize, len: usize) {
    if *index >= len {
        *index = len.saturating_sub(1);
    }
    if *scroll > *index {
        *scroll = *index;
    }
}
