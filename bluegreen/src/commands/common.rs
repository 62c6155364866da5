use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{args::OutputMode, orchestrator::DeploymentOutcome, ui::Ui};

/// Create a standard spinner used across commands, or None in JSON mode.
pub fn make_spinner(output_mode: &OutputMode, message: &str) -> Option<ProgressBar> {
    if *output_mode == OutputMode::Json {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

/// Print `value` as pretty JSON on stdout when in JSON mode
pub fn print_json<T: Serialize>(output_mode: &OutputMode, value: &T) -> Result<()> {
    if *output_mode == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Seconds since `started`, the way every command reports it
pub fn elapsed(started: Instant) -> String {
    format!("{:.1}s", started.elapsed().as_secs_f64())
}

pub fn print_outcome(ui: &Ui, outcome: &DeploymentOutcome) {
    ui.success(format!(
        "✅ {} deployment complete in {:.1}s",
        outcome.target,
        outcome.duration.as_secs_f64()
    ));
    if let Some(ref address) = outcome.public_address {
        ui.step("🔗", format!("Address: {address}"));
    }
    for line in outcome.instructions.iter().filter(|l| !l.is_empty()) {
        ui.info(line);
    }
}
