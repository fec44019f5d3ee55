//! Read and inspect persisted session event logs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use runtime::{
    ClaimEvent, Event, EventRepository, FileEventLog, RuntimeConfig, SessionEvent, SessionIndex,
};

/// Read a session's event log
#[derive(Parser)]
pub struct ReadEvents {
    /// Session ID to read (defaults to GAME_SESSION_ID, then "default")
    #[arg(short, long, value_name = "SESSION")]
    session: Option<String>,

    /// Custom data directory (defaults to SAVE_DATA_DIR or the platform location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Event counts and the rebuilt roster
    Summary,
    /// One JSON event per line
    List,
    /// Full JSON array
    Json,
}

impl ReadEvents {
    pub fn execute(self) -> Result<()> {
        let mut config = RuntimeConfig::from_env();
        if let Some(session) = self.session {
            config.session_id = Some(session);
        }
        if let Some(dir) = self.data_dir {
            config.save_data_dir = Some(dir);
        }

        let dir = config.session_dir();
        let log = FileEventLog::open(&dir, RuntimeConfig::EVENT_LOG)
            .with_context(|| format!("no event log under {}", dir.display()))?;
        let events = log.read_all().context("failed to read event log")?;

        match self.format {
            OutputFormat::Summary => print_summary(&log, &events),
            OutputFormat::List => {
                for event in &events {
                    println!("{}", serde_json::to_string(event)?);
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        }
        Ok(())
    }
}

fn print_summary(log: &FileEventLog, events: &[Event]) {
    println!("Log: {}", log.path().display());
    println!("Size: {} bytes", log.size());
    println!("Events: {}", events.len());

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(kind(event)).or_default() += 1;
    }
    for (kind, count) in &counts {
        println!("  {kind:<18} {count}");
    }

    let index = SessionIndex::from_events(slot_count(events), events);
    println!();
    println!(
        "Iteration {} ({})",
        index.iteration(),
        if index.is_consistent() {
            "chain consistent"
        } else {
            "chain DIVERGED"
        }
    );
    for (slot, state) in index.slots().iter().enumerate() {
        let seeker = state
            .seeker
            .map_or_else(|| "-".to_string(), |seeker| seeker.to_string());
        println!(
            "  slot {slot:<3} seeker {seeker:<12} configs {:<4} claimed {:<8} {}",
            state.configs.len(),
            state.claimed,
            state.commitment
        );
    }
}

fn kind(event: &Event) -> &'static str {
    match event {
        Event::Session(SessionEvent::SlotUpdated { .. }) => "slot_updated",
        Event::Session(SessionEvent::Spawned { .. }) => "spawned",
        Event::Session(SessionEvent::CommandRejected { .. }) => "command_rejected",
        Event::Claim(ClaimEvent::Paid { .. }) => "claim_paid",
        Event::Claim(ClaimEvent::Rejected { .. }) => "claim_rejected",
    }
}

/// Highest slot any event mentions, plus one.
fn slot_count(events: &[Event]) -> usize {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Session(SessionEvent::SlotUpdated { update, .. }) => Some(update.slot),
            Event::Claim(ClaimEvent::Paid { payout, .. }) => Some(payout.slot),
            _ => None,
        })
        .map(|slot| slot.index() + 1)
        .max()
        .unwrap_or(0)
}
