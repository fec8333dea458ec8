//! Waterfall command: allocate one exit value across a cap table.

use anyhow::Context;
use captable_core::types::{Date, Money};
use captable_model::share_class::ShareClass;
use captable_waterfall::request::AllocationRequest;
use tracing::info;

use crate::io;

/// Runs the waterfall command.
pub fn run(
    input: &str,
    exit_value: f64,
    as_of: Option<&str>,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let share_classes: Vec<ShareClass> = io::read_json(input)?;
    info!(classes = share_classes.len(), exit_value, "allocating");

    let as_of = match as_of {
        Some(s) => Some(Date::parse(s).with_context(|| format!("parsing date '{}'", s))?),
        None => None,
    };
    let request = AllocationRequest {
        share_classes,
        exit_value: Money::from_dollars(exit_value).context("exit value out of range")?,
        as_of,
    };
    let response = request.run().context("allocation failed")?;
    if !response.converged {
        tracing::warn!("election fixed point not reached; allocation is best-effort");
    }
    io::write_json(&response, output)
}
