use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use emicalc::{amortize, export, Field, LoanForm, LoanParameters, Schedule, ValidationErrors};
use ratatui::{backend::Backend, widgets::TableState, Terminal};

use crate::ui::{self, Theme};

pub const EXPORT_FILENAME: &str = "emi_schedule.csv";
pub const SUCCESS_MESSAGE: &str = "EMI calculation completed successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Schedule,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Success(String),
    Error(String),
}

/// Parameters captured at submit time and the schedule computed from them.
/// Replaced wholesale by the next successful submission.
#[derive(Debug, Clone)]
pub struct Calculation {
    pub params: LoanParameters,
    pub schedule: Schedule,
}

pub struct App {
    pub screen: Screen,
    pub form: LoanForm,
    pub focus: Field,
    pub errors: Option<ValidationErrors>,
    pub calculation: Option<Calculation>,
    pub table_state: TableState,
    pub theme: Theme,
    pub status: Option<Status>,
    pub currency: String,
    pub export_path: PathBuf,
}

impl App {
    pub fn new(currency: impl Into<String>, export_path: impl Into<PathBuf>) -> Self {
        Self {
            screen: Screen::Form,
            form: LoanForm::default(),
            focus: Field::LoanAmount,
            errors: None,
            calculation: None,
            table_state: TableState::default(),
            theme: Theme::default(),
            status: None,
            currency: currency.into(),
            export_path: export_path.into(),
        }
    }

    fn row_count(&self) -> usize {
        self.calculation.as_ref().map_or(0, |c| c.schedule.len())
    }

    pub fn submit(&mut self) {
        let params = match self.form.validate() {
            Ok(params) => params,
            Err(errors) => {
                log::warn!("rejected submission: {}", errors);
                self.status = Some(Status::Error(format!("Please correct the form: {}", errors)));
                self.errors = Some(errors);
                return;
            }
        };

        match amortize(&params) {
            Ok(schedule) => {
                log::info!(
                    "schedule for {} at {}% over {} months: {} rows",
                    params.principal,
                    params.annual_rate_percent,
                    params.tenure_months,
                    schedule.len()
                );
                self.calculation = Some(Calculation { params, schedule });
                self.errors = None;
                self.status = Some(Status::Success(SUCCESS_MESSAGE.to_string()));
                self.screen = Screen::Schedule;
                self.table_state.select(Some(0));
            }
            Err(e) => {
                log::warn!("calculation failed: {}", e);
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let Some(calculation) = &self.calculation else {
            anyhow::bail!("nothing to export yet");
        };
        let file = File::create(path)?;
        export::write_csv(&calculation.schedule, file)?;
        log::info!("exported {} rows to {}", calculation.schedule.len(), path.display());
        Ok(())
    }

    fn export(&mut self) {
        self.status = Some(match self.export_csv(&self.export_path) {
            Ok(_) => Status::Success(format!("Exported to {}", self.export_path.display())),
            Err(e) => Status::Error(format!("Error exporting to CSV: {}", e)),
        });
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::ui(f, &mut app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(&mut app, key)? {
                return Ok(());
            }
        }
    }
}

/// Returns `true` when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.code == KeyCode::Char('t') {
        app.theme = app.theme.toggle();
        return Ok(false);
    }

    match app.screen {
        Screen::Form => handle_form_input(app, key),
        Screen::Schedule => handle_schedule_input(app, key),
        Screen::Summary => handle_summary_input(app, key),
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
            app.form.value_mut(app.focus).push(c);
            revalidate(app);
        }
        KeyCode::Backspace => {
            app.form.value_mut(app.focus).pop();
            revalidate(app);
        }
        KeyCode::Tab | KeyCode::Down => app.focus = app.focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.focus = app.focus.previous(),
        KeyCode::Enter => app.submit(),
        KeyCode::Right if app.calculation.is_some() => app.screen = Screen::Schedule,
        KeyCode::Esc => return Ok(true),
        _ => {}
    }
    Ok(false)
}

// Once errors are showing, keep them in step with what's typed.
fn revalidate(app: &mut App) {
    if app.errors.is_some() {
        app.errors = app.form.validate().err();
        if app.errors.is_none() {
            app.status = None;
        }
    }
}

fn handle_schedule_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let rows = app.row_count();
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => app.screen = Screen::Form,
        KeyCode::Char('s') | KeyCode::Char('S') => app.screen = Screen::Summary,
        KeyCode::Char('e') | KeyCode::Char('E') => app.export(),
        KeyCode::Down | KeyCode::Char('j') => {
            let current = app.table_state.selected().unwrap_or(0);
            if current + 1 < rows {
                app.table_state.select(Some(current + 1));
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            let current = app.table_state.selected().unwrap_or(0);
            app.table_state.select(Some(current.saturating_sub(1)));
        }
        KeyCode::PageDown => page_down(app, rows),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => page_down(app, rows),
        KeyCode::PageUp => page_up(app),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => page_up(app),
        KeyCode::Char('g') => app.table_state.select(Some(0)),
        KeyCode::Char('G') => {
            if rows > 0 {
                app.table_state.select(Some(rows - 1));
            }
        }
        _ => {}
    }
    Ok(false)
}

fn page_down(app: &mut App, rows: usize) {
    let current = app.table_state.selected().unwrap_or(0);
    app.table_state
        .select(Some((current + 10).min(rows.saturating_sub(1))));
}

fn page_up(app: &mut App) {
    let current = app.table_state.selected().unwrap_or(0);
    app.table_state.select(Some(current.saturating_sub(10)));
}

fn handle_summary_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => app.screen = Screen::Schedule,
        KeyCode::Char('e') | KeyCode::Char('E') => app.export(),
        _ => {}
    }
    Ok(false)
}
