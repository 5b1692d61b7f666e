//! `dispatch` CLI — check technician schedules from the command line.
//!
//! Job sets are JSON arrays of flat job records:
//!
//! ```json
//! [{"id":"j1","technician_id":"t1","status":"scheduled",
//!   "start":"2026-03-16T09:00:00Z","end":"2026-03-16T10:00:00Z"}]
//! ```
//!
//! ## Usage
//!
//! ```sh
//! # Which jobs block 09:30-11:00 for technician t1?
//! dispatch conflicts -i jobs.json --technician t1 \
//!     --start 2026-03-16T09:30:00Z --end 2026-03-16T11:00:00Z
//!
//! # Exit status 1 when the slot is taken (moving j1 out of its own way)
//! dispatch conflicts -i jobs.json --exclude j1 --check --start ... --end ...
//!
//! # A day's jobs in board order, in the board's time zone
//! dispatch day -i jobs.json --date 2026-03-16 --timezone America/Chicago
//!
//! # Gaps of at least an hour in the working day
//! dispatch free -i jobs.json --start 2026-03-16T13:00:00Z --end 2026-03-16T22:00:00Z --min-minutes 60
//!
//! # Snap a drag delta to the grid
//! dispatch snap --minutes -23
//!
//! # Expand a recurring job
//! dispatch expand --id maint --technician t1 --rrule "FREQ=WEEKLY;BYDAY=TU" \
//!     --dtstart 2026-02-17T14:00:00 --duration 90 --timezone America/Los_Angeles --count 4
//! ```
//!
//! Diagnostics go to stderr (`RUST_LOG` or `-v`); stdout carries only results.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dispatch_engine::{
    conflict_details, expand_recurring_job, filter_jobs_for_date, find_conflicts,
    find_free_slots, snap_minutes, sort_jobs_by_start_time, BoardConfig, RecurringJob,
    ScheduledJob, TimeInterval,
};
use serde::Serialize;
use std::io::{self, Read};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dispatch",
    version,
    about = "Technician schedule checks: conflicts, day views, free slots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Board config JSON file (time zone, snap grid); flags override it
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List jobs that overlap a proposed slot
    Conflicts {
        /// Jobs JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Slot start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Slot end (RFC 3339, exclusive)
        #[arg(long)]
        end: DateTime<Utc>,
        /// Job being moved; never reported against itself
        #[arg(long)]
        exclude: Option<String>,
        /// Only consider this technician's jobs
        #[arg(long)]
        technician: Option<String>,
        /// Print "clear" or "conflict" and exit 1 on conflict
        #[arg(long, conflicts_with = "details")]
        check: bool,
        /// Include the overlapping window for each conflict
        #[arg(long)]
        details: bool,
    },
    /// Show one calendar day's jobs in start order
    Day {
        /// Jobs JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Local calendar date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// IANA time zone for day boundaries (defaults to the board config)
        #[arg(long)]
        timezone: Option<String>,
        /// Only include this technician's jobs
        #[arg(long)]
        technician: Option<String>,
    },
    /// List free slots within a window
    Free {
        /// Jobs JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Window start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Window end (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
        /// Only report slots at least this long
        #[arg(long)]
        min_minutes: Option<i64>,
        /// Only consider this technician's jobs
        #[arg(long)]
        technician: Option<String>,
    },
    /// Snap a minute delta to the board grid
    Snap {
        /// Raw delta in minutes (negative when dragging left)
        #[arg(long, allow_negative_numbers = true)]
        minutes: i64,
        /// Grid size in minutes (defaults to the board config)
        #[arg(long)]
        interval: Option<i64>,
    },
    /// Expand a recurring job into occurrences
    Expand {
        #[arg(long)]
        id: String,
        #[arg(long)]
        technician: String,
        /// RRULE body, e.g. "FREQ=WEEKLY;BYDAY=TU"
        #[arg(long)]
        rrule: String,
        /// Local start of the first occurrence (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        dtstart: String,
        /// Length of each occurrence in minutes
        #[arg(long)]
        duration: u32,
        /// IANA time zone of the rule (defaults to the board config)
        #[arg(long)]
        timezone: Option<String>,
        /// Local end boundary (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        until: Option<String>,
        /// Maximum number of occurrences
        #[arg(long)]
        count: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let board = load_board_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Conflicts {
            input,
            start,
            end,
            exclude,
            technician,
            check,
            details,
        } => {
            let jobs = load_jobs(input.as_deref(), technician.as_deref())?;
            let candidate = TimeInterval::new(start, end).context("Invalid --start/--end")?;

            if details {
                print_json(&conflict_details(&candidate, &jobs, exclude.as_deref()))?;
                return Ok(());
            }

            let conflicts = find_conflicts(&candidate, &jobs, exclude.as_deref());
            info!(conflicts = conflicts.len(), "checked slot");

            if check {
                if conflicts.is_empty() {
                    println!("clear");
                } else {
                    println!("conflict");
                    process::exit(1);
                }
            } else {
                print_json(&conflicts)?;
            }
        }
        Commands::Day {
            input,
            date,
            timezone,
            technician,
        } => {
            let tz = match timezone {
                Some(name) => dispatch_engine::parse_timezone(&name)?,
                None => board.tz()?,
            };
            let jobs = load_jobs(input.as_deref(), technician.as_deref())?;
            let day = sort_jobs_by_start_time(filter_jobs_for_date(&jobs, date, tz));
            debug!(%date, timezone = %tz, jobs = day.len(), "filtered day");
            print_json(&day)?;
        }
        Commands::Free {
            input,
            start,
            end,
            min_minutes,
            technician,
        } => {
            let jobs = load_jobs(input.as_deref(), technician.as_deref())?;
            let window = TimeInterval::new(start, end).context("Invalid --start/--end")?;
            let slots: Vec<_> = find_free_slots(&jobs, &window)
                .into_iter()
                .filter(|slot| slot.duration_minutes >= min_minutes.unwrap_or(0))
                .collect();
            print_json(&slots)?;
        }
        Commands::Snap { minutes, interval } => {
            let interval = interval.unwrap_or(board.snap.snap_interval_minutes);
            println!("{}", snap_minutes(minutes, interval)?);
        }
        Commands::Expand {
            id,
            technician,
            rrule,
            dtstart,
            duration,
            timezone,
            until,
            count,
        } => {
            let job = RecurringJob {
                id,
                technician_id: technician,
                rrule,
                dtstart,
                duration_minutes: duration,
                timezone: timezone.unwrap_or(board.timezone),
            };
            let occurrences = expand_recurring_job(&job, until.as_deref(), count)
                .context("Failed to expand recurring job")?;
            print_json(&occurrences)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "dispatch=debug" } else { "dispatch=warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_board_config(path: Option<&str>) -> Result<BoardConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path))?;
            let config = BoardConfig::from_json(&json)
                .with_context(|| format!("Invalid board config: {}", path))?;
            debug!(path, timezone = %config.timezone, "loaded board config");
            Ok(config)
        }
        None => Ok(BoardConfig::default()),
    }
}

/// Read a job list, optionally narrowed to one technician.
fn load_jobs(path: Option<&str>, technician: Option<&str>) -> Result<Vec<ScheduledJob>> {
    let json = read_input(path)?;
    let mut jobs: Vec<ScheduledJob> =
        serde_json::from_str(&json).context("Failed to parse job list")?;
    let total = jobs.len();

    if let Some(technician) = technician {
        jobs.retain(|job| job.technician_id == technician);
    }

    debug!(total, kept = jobs.len(), "loaded jobs");
    Ok(jobs)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    println!("{}", pretty);
    Ok(())
}
