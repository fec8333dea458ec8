//! Fund command: LP/GP waterfall over realized proceeds.

use anyhow::Context;
use captable_core::types::Money;
use captable_fund::distributor::FundDistributor;
use captable_fund::terms::FundTerms;
use serde::Deserialize;
use tracing::info;

use crate::io;

/// A fund request: fund terms plus the proceeds to distribute.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundRequest {
    terms: FundTerms,
    proceeds: f64,
    years: f64,
}

/// Runs the fund command.
pub fn run(input: &str, output: Option<&str>) -> anyhow::Result<()> {
    let request: FundRequest = io::read_json(input)?;
    info!(
        proceeds = request.proceeds,
        years = request.years,
        "distributing fund proceeds"
    );

    let distribution = FundDistributor::new(request.terms)
        .context("invalid fund terms")?
        .distribute(
            Money::from_dollars(request.proceeds).context("proceeds out of range")?,
            request.years,
        )
        .context("distribution failed")?;
    io::write_json(&distribution, output)
}
