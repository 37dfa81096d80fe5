use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Timelike, Utc};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use timeblock_core::{RecurrenceRule, ScheduleOutcome, format_time, parse_lines, parse_time};

mod calendar;
mod request;
mod state;

use request::PlanRequest;

#[derive(Parser, Debug)]
#[command(name = "timeblock", version, about = "Deterministic time-block planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the workday configuration at ~/.timeblock/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Run the scheduler over a JSON plan request and print the plan
    Plan {
        /// Path to a plan request JSON file
        #[arg(long)]
        input: PathBuf,

        /// Emit machine-readable JSON instead of the day-by-day view
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Expand a recurrence rule over a date window
    Expand {
        /// Weekdays, 0 = Sunday .. 6 = Saturday (e.g. 1,3,5)
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,

        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,

        /// Bound the rule itself (defaults to indefinite)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Every Nth week
        #[arg(long, default_value_t = 1)]
        interval: u32,

        /// Occurrence end time for the past filter, HH:MM
        #[arg(long)]
        end_time: Option<String>,
    },

    /// Turn free-text lines into structured task drafts
    Draft {
        /// One task per argument
        lines: Vec<String>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run the scheduler and write the plan as an ICS calendar
    ExportIcs {
        #[arg(long)]
        input: PathBuf,

        /// Output path (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default configuration if none exists
    Init,
    /// Print the active configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => state::init_config()?,
            ConfigCommand::Show => {
                let cfg = state::load_config()?;
                println!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Plan { input, json } => plan(&input, json)?,

        Command::Expand {
            days,
            from,
            to,
            start_date,
            end_date,
            interval,
            end_time,
        } => expand(days, from, to, start_date, end_date, interval, end_time)?,

        Command::Draft { lines, json } => draft(&lines, json)?,

        Command::ExportIcs { input, out } => export_ics(&input, out.as_deref())?,
    }

    Ok(())
}

fn load_request(path: &std::path::Path) -> Result<PlanRequest> {
    let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    PlanRequest::from_json(&json)
}

/// Explicit request fields win; otherwise the system clock in the configured
/// timezone supplies (today, now).
fn resolve_now(req: &PlanRequest, cfg: &state::ConfigFile) -> Result<(NaiveDate, u32)> {
    let tz = cfg.tz()?;
    let local = Utc::now().with_timezone(&tz);

    let today = req.today.unwrap_or_else(|| local.date_naive());
    let now_minutes = match &req.now {
        Some(s) => parse_time(s)?,
        None => local.hour() * 60 + local.minute(),
    };

    Ok((today, now_minutes))
}

fn task_names(req: &PlanRequest) -> HashMap<String, String> {
    req.tasks
        .iter()
        .map(|t| (t.id.clone(), t.name.clone()))
        .collect()
}

fn plan(input: &std::path::Path, json: bool) -> Result<()> {
    let cfg = state::load_config()?;
    let req = load_request(input)?;
    let (today, now_minutes) = resolve_now(&req, &cfg)?;

    let out = req.execute(&cfg.to_workday(), today, now_minutes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_plan(&req, &out);
    Ok(())
}

fn print_plan(req: &PlanRequest, out: &ScheduleOutcome) {
    let names = task_names(req);

    println!("# Plan {} .. {}\n", req.window_start, req.window_end);

    let mut current: Option<NaiveDate> = None;
    for p in &out.placements {
        if current != Some(p.date) {
            println!("## {}", p.date);
            current = Some(p.date);
        }
        println!(
            "  {}-{}  {}",
            format_time(p.start),
            format_time(p.end),
            display_name(&names, &p.task_id),
        );
    }

    if !out.unplaced.is_empty() {
        println!("\nDid not fit this window:");
        for id in &out.unplaced {
            println!("  - {}", display_name(&names, id));
        }
    }

    println!(
        "\n{} placed, {} unplaced",
        out.placements.len(),
        out.unplaced.len()
    );
}

fn display_name(names: &HashMap<String, String>, task_id: &str) -> String {
    let base_id = task_id.split('@').next().unwrap_or(task_id);
    names
        .get(task_id)
        .or_else(|| names.get(base_id))
        .cloned()
        .unwrap_or_else(|| task_id.to_string())
}

fn expand(
    days: Vec<u8>,
    from: NaiveDate,
    to: NaiveDate,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    interval: u32,
    end_time: Option<String>,
) -> Result<()> {
    let rule = RecurrenceRule {
        days,
        is_indefinite: start_date.is_none() && end_date.is_none(),
        start_date,
        end_date,
        interval_weeks: interval,
    };
    rule.validate()?;

    let cfg = state::load_config()?;
    let tz = cfg.tz()?;
    let local = Utc::now().with_timezone(&tz);
    let today = local.date_naive();
    let now_minutes = local.hour() * 60 + local.minute();

    let occurrence_end = match end_time {
        Some(s) => parse_time(&s)?,
        None => 1440,
    };

    let dates = rule.expand(from, to, today, now_minutes, occurrence_end);
    for d in &dates {
        println!("{d}");
    }
    println!("\n{} occurrence(s) in {} .. {}", dates.len(), from, to);
    Ok(())
}

fn draft(lines: &[String], json: bool) -> Result<()> {
    if lines.is_empty() {
        bail!("provide at least one task line, e.g.: timeblock draft \"write report 90m p1\"");
    }

    let drafts = parse_lines(&lines.join("\n"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&drafts)?);
        return Ok(());
    }

    for d in &drafts {
        let origin = if d.inferred_duration { "estimated" } else { "explicit" };
        println!(
            "{:>4}m  {:?}  {}  [{}]",
            d.duration_minutes, d.priority, d.name, origin
        );
    }
    Ok(())
}

fn export_ics(input: &std::path::Path, out: Option<&std::path::Path>) -> Result<()> {
    let cfg = state::load_config()?;
    let req = load_request(input)?;
    let (today, now_minutes) = resolve_now(&req, &cfg)?;

    let outcome = req.execute(&cfg.to_workday(), today, now_minutes)?;
    let events = calendar::placements_to_events(&outcome.placements, &task_names(&req), cfg.tz()?)?;
    let ics = calendar::events_to_ics(&events);

    match out {
        Some(path) => {
            fs::write(path, &ics).with_context(|| format!("write {}", path.display()))?;
            println!(
                "Wrote {} event(s) to {} ({} unplaced)",
                events.len(),
                path.display(),
                outcome.unplaced.len()
            );
        }
        None => print!("{ics}"),
    }

    Ok(())
}
