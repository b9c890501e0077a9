mod clock;
mod config;
mod dates;
mod editor;
mod error;
mod hours;
mod pdf;
mod report;
mod review;
mod sheet;
mod store;
mod totals;
mod weekday;

use chrono::Local;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use editor::{Editor, RESET_WARNING};
use error::{AppResult, EditError};
use sheet::{EntryMode, Field};
use store::Store;
use weekday::Day;

#[derive(Parser)]
#[command(name = "timecard")]
#[command(about = "Biweekly timesheet: two weeks of clock-ins, hours, overtime and tips")]
struct Cli {
    #[arg(long, global = true, help = "Type dates and times freely (Monday dates auto-correct)")]
    text_mode: bool,

    #[arg(long, global = true, help = "Debug output")]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Show the timesheet (default)")]
    Show,
    #[command(about = "Set the employee name")]
    Name { name: String },
    #[command(about = "Set one cell; ROW is 1-14, FIELD one of date, in1, out1, in2, out2, sales, tips")]
    Set {
        row: usize,
        field: String,
        #[arg(default_value = "", allow_hyphen_values = true)]
        value: String,
    },
    #[command(about = "Replace a rejected date with the previous date on the row's weekday")]
    Fix { row: usize },
    #[command(about = "Dismiss the pending mismatch or auto-correct message")]
    Dismiss,
    #[command(about = "Clear the whole form")]
    Reset {
        #[arg(long, help = "Confirm clearing everything")]
        yes: bool,
    },
    #[command(about = "List the time choices offered in dropdown mode")]
    Times,
    #[command(about = "List the dates that fit a row's weekday")]
    Dates { row: usize },
    #[command(about = "Show period totals")]
    Totals,
    #[command(about = "Print the timesheet as JSON")]
    Json,
    #[command(about = "Render the timesheet to a PDF")]
    Pdf {
        #[arg(long, help = "Output file")]
        output: Option<PathBuf>,
    },
    #[command(about = "Ask the AI reviewer for comments (advisory only)")]
    Review,
}

fn init_tracing(debug: bool) {
    let default = if debug { "timecard=debug" } else { "timecard=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = config::load_config();
    if let Err(e) = run(cli, &config) {
        eprintln!("{} {}", "[ERROR]".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &Config) -> AppResult<()> {
    let mode = if cli.text_mode || config.entry.text_mode {
        EntryMode::Text
    } else {
        EntryMode::Dropdown
    };

    let store = Store::from_config(config);
    let snapshot = store.as_ref().map(Store::load).unwrap_or_default();
    let mut editor = Editor::from_snapshot(&snapshot, mode, config.time_options());

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => report::print_sheet(&editor, config),
        Command::Name { name } => {
            editor.set_name(&name);
            save(store.as_ref(), &editor);
            report::print_sheet(&editor, config);
        }
        Command::Set { row, field, value } => {
            let row = row_index(row)?;
            let field: Field = field.parse()?;
            let result = editor.edit(row, field, &value);
            save(store.as_ref(), &editor);
            match result {
                Ok(_) => report::print_sheet(&editor, config),
                Err(e @ EditError::WeekdayMismatch { .. }) => {
                    report::print_feedback(&editor);
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Fix { row } => {
            editor.accept_suggestion(row_index(row)?)?;
            save(store.as_ref(), &editor);
            report::print_sheet(&editor, config);
        }
        Command::Dismiss => {
            editor.dismiss();
            save(store.as_ref(), &editor);
        }
        Command::Reset { yes } => {
            if editor.reset(yes) {
                save(store.as_ref(), &editor);
                println!("{}", "Form cleared.".green());
            } else {
                println!("{}", "WAIT A SEC!".red().bold());
                println!("{}", RESET_WARNING);
                println!("{}", "Run `timecard reset --yes` to clear it.".dimmed());
            }
        }
        Command::Times => {
            for option in editor.time_options() {
                println!("{}", option);
            }
        }
        Command::Dates { row } => {
            let day = Day::for_row(row_index(row)?);
            println!("{}", format!("{} ({})", day.label(), day.full_name()).cyan().bold());
            for option in dates::date_options(day, Local::now().date_naive()) {
                println!("{}", option);
            }
        }
        Command::Totals => report::print_totals(&editor.totals()),
        Command::Json => {
            let data = review::TimesheetData::of(&editor);
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Pdf { output } => {
            if editor.period_ending().is_empty() {
                warn!("no dates entered yet");
                println!("{}", "Dates missing! Enter the dates in the spreadsheet first.".yellow());
            }
            let path = pdf::generate_pdf(&editor, config, output.as_deref())?;
            println!("PDF written: {}", path.display());
        }
        Command::Review => {
            let result = review::review_timesheet(&editor, config)?;
            println!("{}", "MANAGER REVIEW".cyan().bold());
            println!("{}", result.manager_comment);
            for issue in &result.detected_issues {
                println!("  • {}", issue.yellow());
            }
            if let Some(hours) = result.suggested_total_hours {
                println!("Suggested total hours: {:.2}", hours);
            }
        }
    }

    Ok(())
}

/// Displayed rows are 1-14.
fn row_index(row: usize) -> Result<usize, EditError> {
    if (1..=sheet::ROWS).contains(&row) {
        Ok(row - 1)
    } else {
        Err(EditError::RowOutOfRange(row))
    }
}

fn save(store: Option<&Store>, editor: &Editor) {
    let Some(store) = store else {
        warn!("no data directory, changes are not cached");
        return;
    };
    if let Err(e) = store.save(&editor.snapshot()) {
        error!(error = %e, path = %store.path().display(), "failed to save timesheet");
        eprintln!("{} could not save timesheet: {}", "[WARN]".yellow(), e);
    }
}
