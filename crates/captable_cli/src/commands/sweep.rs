//! Sweep command: allocate across an exit-value grid.

use anyhow::Context;
use captable_core::types::{Date, Money};
use captable_model::share_class::ShareClass;
use captable_model::snapshot::CapTableSnapshot;
use captable_pwerm::sensitivity::SensitivityAnalyzer;
use tracing::info;

use crate::io;

/// Runs the sweep command.
pub fn run(
    input: &str,
    low: f64,
    high: f64,
    steps: usize,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let share_classes: Vec<ShareClass> = io::read_json(input)?;
    info!(classes = share_classes.len(), low, high, steps, "sweeping");

    let snapshot =
        CapTableSnapshot::new(share_classes, Date::today()).context("invalid cap table")?;
    let results = SensitivityAnalyzer::new()
        .sweep(
            &snapshot,
            Money::from_dollars(low).context("low bound out of range")?,
            Money::from_dollars(high).context("high bound out of range")?,
            steps,
        )
        .context("sweep failed")?;
    io::write_json(&results, output)
}
