mod console;
mod report;
mod stats;
mod tui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use studyplan_core::{
    open_repository, parse_human_date, Activity, ActivityForm, ActivityRepository, Backend, Config,
    Notice, Notifier, StudyStore, YearMonth,
};

use crate::console::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "studyplan")]
#[command(about = "Plan study sessions and track your progress", long_about = None)]
struct Cli {
    /// Storage backend: local (JSON file) or sqlite
    #[arg(long, global = true)]
    backend: Option<Backend>,
    /// Directory holding the activity data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// User whose activities are shown
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Register an activity (usage: add "Title" subject:Math date:tomorrow time:09:00 duration:1h30m notes:"ch. 3")
    Add {
        /// Title words followed by key:value fields
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List all activities, newest first
    List,
    /// Mark an activity done, or undone again
    Toggle {
        /// Activity ID or a unique prefix of it
        id: String,
    },
    /// Show the activities planned for a date
    Day {
        /// today, tomorrow, +2d, fri, 2025-03-10 ...
        date: String,
    },
    /// Show the next upcoming activity
    Next,
    /// Print a month calendar
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        /// Month number, 1-12
        #[arg(long)]
        month: Option<u32>,
    },
    /// Show study statistics
    Stats {
        /// Print tables instead of opening the analytics screen
        #[arg(long)]
        plain: bool,
    },
    /// Open the calendar screen
    Tui,
}

impl Commands {
    fn is_interactive(&self) -> bool {
        matches!(self, Commands::Tui | Commands::Stats { plain: false })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);
    init_logging(command.is_interactive());

    let mut config = Config::from_env()?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(user) = cli.user {
        config.user = Some(user);
    }
    debug!(?config, "configuration loaded");

    let today = Local::now().date_naive();

    if let Commands::Tui = command {
        let status = tui::StatusLine::default();
        let store = open_store(&config, status.clone())?;
        return tui::run(store, status, today);
    }

    let notifier = ConsoleNotifier;
    let mut store = open_store(&config, notifier)?;

    match command {
        Commands::Add { args } => {
            let (form, warnings) = ActivityForm::from_args(&args);
            for warning in warnings {
                println!("Warning: {}", warning);
            }

            let missing = form.missing_fields();
            if !missing.is_empty() {
                notifier.notify(Notice::destructive(
                    "Missing information",
                    &format!("Please fill in all required fields ({}).", missing.join(", ")),
                ));
                return Ok(());
            }

            let input = match form.validate(today) {
                Ok(input) => input,
                Err(e) => {
                    notifier.notify(Notice::destructive("Invalid activity", &e.to_string()));
                    return Ok(());
                }
            };

            if let Some(created) = store.create(input) {
                report::print_activity(&created);
            }
        }
        Commands::List => {
            report::print_activities(&store.sorted_newest_first());
        }
        Commands::Toggle { id } => {
            let id = resolve_id(store.activities(), &id)?;
            match store.toggle_completion(&id) {
                Some(true) => println!("Marked as done."),
                Some(false) => println!("Marked as not done."),
                None => {}
            }
        }
        Commands::Day { date } => {
            let date = parse_human_date(&date, today)?;
            println!("{}", date.format("%A, %B %-d %Y"));
            report::print_activities(&store.activities_for_date(date));
        }
        Commands::Next => {
            report::print_next(store.next_activity());
        }
        Commands::Calendar { year, month } => {
            let month = match (year, month) {
                (None, None) => YearMonth::containing(today),
                (year, month) => {
                    let month = month.unwrap_or(today.month());
                    if !(1..=12).contains(&month) {
                        return Err(anyhow!("Month must be between 1 and 12"));
                    }
                    YearMonth::new(year.unwrap_or(today.year()), month - 1)?
                }
            };
            report::print_calendar(&store, month, today);
        }
        Commands::Stats { plain: true } => {
            report::print_stats(&store, today);
        }
        Commands::Stats { plain: false } => {
            stats::run(&store, today)?;
        }
        Commands::Tui => unreachable!("handled above"),
    }
    Ok(())
}

/// Builds the store for `config` and signs in its session, if any.
fn open_store<N: Notifier>(
    config: &Config,
    notifier: N,
) -> Result<StudyStore<Box<dyn ActivityRepository>, N>> {
    let repo = open_repository(config)?;
    let mut store = StudyStore::new(repo, notifier);
    match config.session() {
        Some(session) => store.sign_in(session),
        None => eprintln!("Not signed in: set STUDYPLAN_USER or pass --user to see your activities."),
    }
    Ok(store)
}

/// Matches a full ID or a unique prefix of one.
fn resolve_id(activities: &[Activity], input: &str) -> Result<Uuid> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Err(anyhow!("Activity ID is required"));
    }

    let matches: Vec<&Activity> = activities
        .iter()
        .filter(|a| a.id.to_string().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [only] => Ok(only.id),
        [] => Err(anyhow!("No activity matches '{}'", input)),
        _ => Err(anyhow!("'{}' matches {} activities, use more characters", input, matches.len())),
    }
}

fn init_logging(interactive: bool) {
    // Interactive screens own the terminal; log only when RUST_LOG is set.
    let default = if interactive { "off" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use studyplan_core::NewActivity;

    fn activity() -> Activity {
        let input = NewActivity::new(
            "Vocabulary",
            "German",
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            25,
        )
        .unwrap();
        Activity::new(input, "local", Utc::now())
    }

    #[test]
    fn test_resolve_id_by_prefix() {
        let activities = vec![activity(), activity()];
        let full = activities[0].id.to_string();

        assert_eq!(resolve_id(&activities, &full).unwrap(), activities[0].id);
        assert_eq!(resolve_id(&activities, &full.to_uppercase()).unwrap(), activities[0].id);
        assert!(resolve_id(&activities, "").is_err());
        assert!(resolve_id(&activities, "zzz").is_err());
    }
}
