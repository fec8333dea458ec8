//! Evolve command: replay financing rounds into snapshots.

use anyhow::Context;
use captable_model::evolution::EvolutionTracker;
use captable_model::round::Round;
use serde::Deserialize;
use tracing::info;

use crate::io;

/// An evolve request: founder shares plus the rounds to replay.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvolveRequest {
    founder_shares: f64,
    rounds: Vec<Round>,
}

/// Runs the evolve command.
pub fn run(input: &str, output: Option<&str>) -> anyhow::Result<()> {
    let request: EvolveRequest = io::read_json(input)?;
    info!(
        founder_shares = request.founder_shares,
        rounds = request.rounds.len(),
        "replaying rounds"
    );

    let steps = EvolutionTracker::new()
        .replay(request.founder_shares, &request.rounds)
        .context("round replay failed")?;
    io::write_json(&steps, output)
}
