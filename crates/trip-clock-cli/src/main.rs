//! `tripclock` — compute trip return deadlines from the command line.
//!
//! Every subcommand prints one JSON object to stdout. Invalid input is
//! reported on stderr with exit code 1.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use trip_clock::{
    compute_deadline, countdown, extend_deadline, hour_to_slot, parse_date, parse_datetime,
    slot_to_boundary, SlotClassification, TimeSlotCode, DEFAULT_EXTENSION_HOURS,
};

#[derive(Parser)]
#[command(name = "tripclock", version, about = "Trip return-deadline calculator")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the boundary hour of a slot code
    Slot {
        /// AM_early, AM_late, PM_early or PM_late
        code: String,
    },
    /// Classify an hour of day into the slot containing it
    Classify {
        #[arg(allow_negative_numbers = true)]
        hour: i64,
    },
    /// Compute the deadline for a return date and slot
    Deadline {
        /// Return date (YYYY-MM-DD)
        date: String,
        code: String,
    },
    /// Show the countdown for a trip at a given instant
    Countdown {
        date: String,
        code: String,
        /// Trip start (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        start: String,
        /// Evaluation instant (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        now: String,
    },
    /// Extend a deadline and show the new date and slot
    Extend {
        date: String,
        code: String,
        #[arg(long, default_value_t = DEFAULT_EXTENSION_HOURS, allow_negative_numbers = true)]
        hours: i64,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlotOutput {
    code: TimeSlotCode,
    boundary_hour: u32,
    day_offset: u32,
}

impl From<SlotClassification> for SlotOutput {
    fn from(c: SlotClassification) -> Self {
        Self {
            code: c.code,
            boundary_hour: c.boundary_hour,
            day_offset: c.day_offset,
        }
    }
}

#[derive(Serialize)]
struct DeadlineOutput {
    deadline: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CountdownOutput {
    deadline: String,
    remaining_seconds: i64,
    total_seconds: i64,
    elapsed_fraction: f64,
    progress_percent: u8,
    remaining: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtendOutput {
    return_date: String,
    return_time_slot: TimeSlotCode,
    deadline: String,
    added_seconds: i64,
}

fn parse_slot(code: &str) -> Result<TimeSlotCode> {
    code.parse::<TimeSlotCode>()
        .with_context(|| format!("expected one of {}", slot_list()))
}

fn slot_list() -> String {
    TimeSlotCode::ALL
        .iter()
        .map(TimeSlotCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_instant(dt: chrono::NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn run(command: Command) -> Result<serde_json::Value> {
    let value = match command {
        Command::Slot { code } => {
            let code = parse_slot(&code)?;
            let b = slot_to_boundary(code);
            serde_json::to_value(SlotOutput {
                code,
                boundary_hour: b.hour,
                day_offset: b.day_offset,
            })?
        }
        Command::Classify { hour } => serde_json::to_value(SlotOutput::from(hour_to_slot(hour)))?,
        Command::Deadline { date, code } => {
            let deadline = compute_deadline(parse_date(&date)?, parse_slot(&code)?);
            serde_json::to_value(DeadlineOutput {
                deadline: format_instant(deadline),
            })?
        }
        Command::Countdown {
            date,
            code,
            start,
            now,
        } => {
            let deadline = compute_deadline(parse_date(&date)?, parse_slot(&code)?);
            let start = parse_datetime(&start).context("--start")?;
            let now = parse_datetime(&now).context("--now")?;
            let c = countdown(now, deadline, start);
            serde_json::to_value(CountdownOutput {
                deadline: format_instant(deadline),
                remaining_seconds: c.remaining.num_seconds(),
                total_seconds: c.total_duration.num_seconds(),
                elapsed_fraction: c.elapsed_fraction,
                progress_percent: c.progress_percent(),
                remaining: c.label(),
            })?
        }
        Command::Extend { date, code, hours } => {
            let current = compute_deadline(parse_date(&date)?, parse_slot(&code)?);
            let ext = extend_deadline(current, hours);
            serde_json::to_value(ExtendOutput {
                return_date: ext.return_date.to_string(),
                return_time_slot: ext.slot,
                deadline: format_instant(ext.deadline),
                added_seconds: ext.added.num_seconds(),
            })?
        }
    };
    Ok(value)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let value = run(cli.command)?;
    let out = if cli.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{out}");
    Ok(())
}
