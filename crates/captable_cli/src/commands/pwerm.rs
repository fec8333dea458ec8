//! Pwerm command: probability-weighted exit valuation.

use anyhow::Context;
use captable_pwerm::request::PwermRequest;
use tracing::info;

use crate::io;

/// Runs the pwerm command.
pub fn run(input: &str, output: Option<&str>) -> anyhow::Result<()> {
    let request: PwermRequest = io::read_json(input)?;
    info!(
        classes = request.share_classes.len(),
        scenarios = request.scenarios.len(),
        "running PWERM valuation"
    );

    let response = request.run().context("PWERM valuation failed")?;
    info!(
        expected = response.expected_exit_value,
        adjusted = response.adjusted_expected_value,
        "valuation complete"
    );
    io::write_json(&response, output)
}
