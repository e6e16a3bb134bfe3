//! CLI output formatting

use crate::core::{ProgressCallback, RunOutcome, RunSummary};
use crate::script::ScriptModifierKind;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

// Re-export style
pub use console::style;

pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner that stays hidden until a run starts
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner
}

/// Progress observer ticking `spinner` while a run is in flight
pub fn spinner_observer(spinner: ProgressBar) -> ProgressCallback {
    Arc::new(move |running| {
        if running {
            spinner.enable_steady_tick(Duration::from_millis(100));
        } else {
            spinner.finish_and_clear();
        }
    })
}

/// Format a run outcome for display
pub fn format_outcome(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::Succeeded => style("SUCCEEDED").green().to_string(),
        RunOutcome::Failed => style("FAILED").red().to_string(),
        RunOutcome::Crashed => style("CRASHED").red().bold().to_string(),
        RunOutcome::Aborted => style("ABORTED").yellow().to_string(),
    }
}

/// Format a finished run for display
pub fn format_summary(summary: &RunSummary) -> String {
    let icon = match summary.outcome {
        RunOutcome::Succeeded => CHECK,
        RunOutcome::Failed | RunOutcome::Crashed => CROSS,
        RunOutcome::Aborted => WARN,
    };
    let duration = summary
        .completed_at
        .signed_duration_since(summary.started_at)
        .to_std()
        .unwrap_or_default();

    format!(
        "{}{} of {} {} in {} ({}, last state {:?})",
        icon,
        style(&summary.flavor).bold(),
        style(&summary.project).cyan(),
        format_outcome(summary.outcome),
        format_duration(duration),
        style(&summary.run_id.to_string()[..8]).dim(),
        summary.final_state
    )
}

/// List the modifiers applied to a script
pub fn format_applied_modifiers(applied: &[ScriptModifierKind]) -> String {
    if applied.is_empty() {
        return format!("{}No script modifiers are enabled", INFO);
    }

    let names: Vec<String> = applied.iter().map(|kind| kind.to_string()).collect();
    format!("{}Applied {}", CHECK, style(names.join(", ")).cyan())
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}.{:01}s", secs, duration.subsec_millis() / 100)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
