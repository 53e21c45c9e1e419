use serde::Serialize;
use ventlink_backend::{MessageType, SCHEDULE_MAX_ENTRIES};
use ventlink_protocol::{ScheduleEntry, Scheduler};

use crate::cmd::ScheduleArgs;
use crate::config;
use crate::exit::{CliError, CliResult, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Debug, Serialize)]
struct EntryOutput {
    index: usize,
    interval: u32,
    kind: MessageType,
    due_at: u64,
}

#[derive(Serialize)]
struct ScheduleOutput {
    entries: Vec<EntryOutput>,
    cycle_ticks: u64,
}

pub fn run(args: ScheduleArgs, format: OutputFormat) -> CliResult<i32> {
    let config = config::load(args.config.as_deref())?;
    let scheduler = Scheduler::<MessageType, SCHEDULE_MAX_ENTRIES>::new(&config.schedule)
        .map_err(|err| CliError::usage(format!("invalid schedule: {err}")))?;
    let out = describe(scheduler.entries());

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => print_table(
            &["#", "KIND", "INTERVAL", "DUE AT"],
            out.entries.iter().map(|entry| {
                [
                    entry.index.to_string(),
                    entry.kind.to_string(),
                    entry.interval.to_string(),
                    entry.due_at.to_string(),
                ]
            }),
        ),
        OutputFormat::Pretty | OutputFormat::Raw => {
            for entry in &out.entries {
                println!(
                    "{:>2} {:<22} every {:>4} ticks, due at tick {}",
                    entry.index,
                    entry.kind.name(),
                    entry.interval,
                    entry.due_at
                );
            }
            println!("cycle: {} ticks", out.cycle_ticks);
        }
    }
    Ok(SUCCESS)
}

/// Tick at which each entry first becomes due when the clock advances one
/// tick at a time from zero.
fn describe(entries: &[ScheduleEntry<MessageType>]) -> ScheduleOutput {
    let mut due_at = 0u64;
    let entries = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            due_at += u64::from(entry.interval.max(1));
            EntryOutput {
                index,
                interval: entry.interval,
                kind: entry.kind,
                due_at,
            }
        })
        .collect();
    ScheduleOutput {
        entries,
        cycle_ticks: due_at,
    }
}
