use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::calendar::CalendarView;
use crate::db::Database;
use crate::store::Ledger;
use crate::ui::app::{App, InputMode, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(db: &mut Database) -> Result<()> {
    let ledger = Ledger::load(db)?;
    let mut app = App::new(ledger, chrono::Local::now().date_naive());
    tracing::info!(
        owner = db.owner(),
        transactions = app.ledger.transactions.len(),
        "starting tui"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %format!("{e:#}"), "tui exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // 1 tab + 1 status + 1 cmd + 2 borders + 1 header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Search => handle_search_input(key, app),
                InputMode::Confirm => handle_confirm_input(key, app, db),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
            app.screen = Screen::Transactions;
        }
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
            app.running = false;
        }
        KeyCode::Char('d') if ctrl => {
            for _ in 0..app.page() / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if ctrl => {
            for _ in 0..app.page() / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('r') if ctrl => {
            app.reload(db)?;
            app.set_status("Reloaded");
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('h') | KeyCode::Left if app.screen == Screen::Calendar => {
            app.move_selected_date(-1);
        }
        KeyCode::Char('l') | KeyCode::Right if app.screen == Screen::Calendar => {
            app.move_selected_date(1);
        }
        KeyCode::Char(c @ '1'..='6') => {
            let idx = c as usize - '1' as usize;
            if let Some(screen) = Screen::all().get(idx) {
                switch_screen(app, *screen);
            }
        }
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            switch_screen(app, screens[(idx + 1) % screens.len()]);
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, screens[prev]);
        }
        KeyCode::Char('v') if app.screen == Screen::Calendar => {
            app.calendar_view = match app.calendar_view {
                CalendarView::Month => CalendarView::Week,
                CalendarView::Week => CalendarView::Day,
                CalendarView::Day => CalendarView::Month,
            };
            app.set_status(format!("{} view", app.calendar_view));
        }
        KeyCode::Char('t') if app.screen == Screen::Calendar => {
            app.select_date(app.today);
        }
        KeyCode::Enter if app.screen == Screen::Calendar => {
            app.calendar_view = CalendarView::Day;
        }
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('H') => {
            commands::handle_command("prev-month", app, db)?;
        }
        KeyCode::Char('L') => {
            commands::handle_command("next-month", app, db)?;
        }
        KeyCode::Char('D') => {
            let command = match app.screen {
                Screen::Transactions => "delete-txn",
                Screen::Investments => "delete-inv",
                Screen::Recurring => "delete-recurring",
                Screen::Cards => "delete-card",
                Screen::Dashboard | Screen::Calendar => return Ok(()),
            };
            commands::handle_command(command, app, db)?;
        }
        KeyCode::Esc => handle_escape(app),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.command_input.trim_end();
            if let Some(pos) = trimmed.rfind(' ') {
                app.command_input.truncate(pos + 1);
            } else {
                app.command_input.clear();
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_search_input(key: event::KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
        }
        _ => return,
    }
    app.transaction_index = 0;
    app.transaction_scroll = 0;
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.input_mode = InputMode::Normal;
            if let Some(pending) = app.pending_action.take() {
                app.dispatch(db, pending.action);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.set_status("Cancelled");
        }
        _ => {}
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, screen: Screen) {
    app.screen = screen;
    app.set_status(format!("{screen}"));
}

fn handle_escape(app: &mut App) {
    if app.screen == Screen::Calendar && app.calendar_view != CalendarView::Month {
        app.calendar_view = CalendarView::Month;
    } else if !app.search_input.is_empty() {
        app.search_input.clear();
        app.transaction_index = 0;
        app.transaction_scroll = 0;
        app.set_status("Search cleared");
    }
}

/// The current screen's list cursor, scroll offset and list length.
fn cursor(app: &mut App) -> Option<(&mut usize, &mut usize, usize)> {
    let len = match app.screen {
        Screen::Transactions => app.visible_transactions().len(),
        Screen::Investments => app.ledger.investments.len(),
        Screen::Recurring => app.ledger.recurring.len(),
        Screen::Cards => app.ledger.cards.len(),
        Screen::Dashboard | Screen::Calendar => return None,
    };
    let (index, scroll) = match app.screen {
        Screen::Transactions => (&mut app.transaction_index, &mut app.transaction_scroll),
        Screen::Investments => (&mut app.investment_index, &mut app.investment_scroll),
        Screen::Recurring => (&mut app.recurring_index, &mut app.recurring_scroll),
        Screen::Cards => (&mut app.card_index, &mut app.card_scroll),
        Screen::Dashboard | Screen::Calendar => return None,
    };
    Some((index, scroll, len))
}

/// Calendar rows are weeks except in the day view.
fn calendar_step(app: &App) -> i64 {
    match app.calendar_view {
        CalendarView::Day => 1,
        CalendarView::Month | CalendarView::Week => 7,
    }
}

fn handle_move_down(app: &mut App) {
    if app.screen == Screen::Calendar {
        let step = calendar_step(app);
        app.move_selected_date(step);
        return;
    }
    let page = app.page();
    if let Some((index, scroll, len)) = cursor(app) {
        scroll_down(index, scroll, len, page);
    }
}

fn handle_move_up(app: &mut App) {
    if app.screen == Screen::Calendar {
        let step = calendar_step(app);
        app.move_selected_date(-step);
        return;
    }
    if let Some((index, scroll, _)) = cursor(app) {
        scroll_up(index, scroll);
    }
}

fn handle_goto_top(app: &mut App) {
    if app.screen == Screen::Calendar {
        let first = app.current_month.first_day();
        app.select_date(first);
        return;
    }
    if let Some((index, scroll, _)) = cursor(app) {
        scroll_to_top(index, scroll);
    }
}

fn handle_goto_bottom(app: &mut App) {
    if app.screen == Screen::Calendar {
        let last = app.current_month.last_day();
        app.select_date(last);
        return;
    }
    let page = app.page();
    if let Some((index, scroll, len)) = cursor(app) {
        scroll_to_bottom(index, scroll, len, page);
    }
}
