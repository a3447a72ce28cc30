use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use std::time::Duration;
use tokio::io::BufReader;

use crate::commands::utils::{format_limit, format_remaining};
use crate::journal::JournalFile;
use crate::session::budget::{self, SessionBudget, SessionPhase};
use crate::session::{
    BudgetStore, DayChange, DayClock, DesktopAlerts, DraftStore, DriverOutcome, SessionDriver,
    SessionTimer,
};
use crate::settings::SettingsStore;

/// Open today's diary session and drive it from stdin until it ends
pub async fn run_session(
    data_dir: &Path,
    clock: &impl DayClock,
    no_notify: bool,
    tick_interval: Duration,
) -> Result<DriverOutcome> {
    let settings = SettingsStore::in_dir(data_dir).load();
    let budgets = BudgetStore::in_dir(data_dir);
    let stored = budgets.load();

    let alerts = DesktopAlerts::new(settings.notifications && !no_notify);
    let timer = SessionTimer::start_session(
        stored.as_ref(),
        clock.today(),
        settings.limit_seconds,
        alerts,
    )
    .context("Failed to open diary session")?;

    let budget = timer.budget();
    println!("=== Diary for {} ===", budget.date_key.format("%A, %d %B %Y"));
    if budget.phase == SessionPhase::Locked {
        println!("Today's diary time is used up. Diary input is locked until tomorrow.");
        println!("Login and signup remain available.");
    } else {
        println!(
            "{} of {} left today.",
            format_remaining(budget.remaining_seconds),
            format_limit(budget.limit_seconds)
        );
        println!("Type your entry. Commands: :save  :pause  :resume  :status  :quit");
    }

    let mut driver = SessionDriver::new(
        timer,
        budgets,
        DraftStore::in_dir(data_dir),
        JournalFile::in_dir(data_dir),
    )
    .with_tick_interval(tick_interval);

    let outcome = driver.run(BufReader::new(tokio::io::stdin())).await?;

    match outcome {
        DriverOutcome::Expired => println!("Diary closed."),
        DriverOutcome::Quit | DriverOutcome::InputClosed => {
            let budget = driver.timer().budget();
            println!(
                "Session paused with {} left for today.",
                format_remaining(budget.remaining_seconds)
            );
        }
        DriverOutcome::Locked => {}
    }

    Ok(outcome)
}

/// Show today's session without changing it
pub fn show_status(data_dir: &Path, clock: &impl DayClock) -> Result<()> {
    let settings = SettingsStore::in_dir(data_dir).load();
    let stored = BudgetStore::in_dir(data_dir).load();
    let today = clock.today();

    let budget = budget::start_session(stored.as_ref(), today, settings.limit_seconds)
        .context("Failed to evaluate today's session")?;

    let journal = JournalFile::in_dir(data_dir);
    let has_entry = journal.has_entry_for(today)?;

    println!("\n=== Diary Session Status ===\n");
    println!("Date:            {}", budget.date_key);
    if let Some(note) = carried_over_note(stored.as_ref(), today) {
        println!("Last session:    {}", note);
    }
    println!("Limit:           {}", format_limit(settings.limit_seconds));
    if budget.limit_seconds != settings.limit_seconds {
        println!("Today's limit:   {} (new limit applies tomorrow)", format_limit(budget.limit_seconds));
    }
    println!("Phase:           {}", budget.phase);
    println!("Remaining:       {}", format_remaining(budget.remaining_seconds));
    println!("Used:            {}", format_remaining(budget.used_seconds()));
    println!("Diary input:     {}", if budget.phase.is_terminal() { "locked" } else { "available" });
    println!("Entry today:     {}", if has_entry { "saved" } else { "not yet" });
    if DraftStore::in_dir(data_dir).load().is_some() {
        println!("Draft:           unsaved text kept from an earlier session");
    }
    println!();

    Ok(())
}

/// Describe a stored budget from an earlier day that today's open replaces
fn carried_over_note(stored: Option<&SessionBudget>, today: NaiveDate) -> Option<String> {
    let stored = stored?;
    if !DayChange::between(stored.date_key, today).is_rollover() {
        return None;
    }

    Some(format!(
        "{} ({}, {} left); a fresh budget starts on next open",
        stored.date_key,
        stored.phase,
        format_remaining(stored.remaining_seconds)
    ))
}
