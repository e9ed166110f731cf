mod app;
mod ui;

use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use emicalc::{amortize, export, LoanForm};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::{run_app, App, EXPORT_FILENAME};

/// Loan EMI calculator with a month-by-month amortization schedule.
///
/// Without a subcommand, opens the interactive form.
#[derive(Parser, Debug)]
#[command(name = "emicalc", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Currency symbol shown before amounts
    #[arg(long, default_value = "₹", global = true)]
    currency: String,

    /// Where the interactive form exports the schedule as CSV
    #[arg(long, default_value = EXPORT_FILENAME)]
    export_path: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the amortization schedule without the interactive form
    Schedule(ScheduleArgs),
}

#[derive(Args, Debug)]
struct ScheduleArgs {
    /// Loan amount (greater than 0, at most 5,000,000)
    #[arg(short, long, allow_hyphen_values = true)]
    amount: String,

    /// Annual interest rate in percent (1 to 30)
    #[arg(short, long, allow_hyphen_values = true)]
    rate: String,

    /// Loan tenure in months (1 to 360)
    #[arg(short, long, allow_hyphen_values = true)]
    tenure: String,

    /// Extra payment made every month on top of the EMI
    #[arg(short = 'x', long, allow_hyphen_values = true)]
    extra: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Schedule(args)) => print_schedule(args, &cli.currency),
        None => run_interactive(App::new(cli.currency, cli.export_path)),
    }
}

fn run_interactive(app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn print_schedule(args: ScheduleArgs, currency: &str) -> Result<()> {
    let form = LoanForm {
        loan_amount: args.amount,
        interest_rate: args.rate,
        loan_tenure: args.tenure,
        extra_emi: args.extra.unwrap_or_default(),
    };

    let params = match form.validate() {
        Ok(params) => params,
        Err(errors) => {
            for error in errors.iter() {
                eprintln!("{}: {}", error.field(), error);
            }
            anyhow::bail!(errors);
        }
    };

    let schedule = amortize(&params)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            log::info!("writing schedule to {}", path.display());
            Box::new(File::create(path)?)
        }
        None => Box::new(io::stdout().lock()),
    };

    match args.format {
        OutputFormat::Table => {
            writeln!(out, "{}", export::render_table(&schedule, currency))?;
            writeln!(out, "{}", export::render_summary(&schedule.summary(), currency))?;
        }
        OutputFormat::Csv => export::write_csv(&schedule, &mut out)?,
        OutputFormat::Json => {
            export::write_json(&params, &schedule, &mut out)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    Ok(())
}
