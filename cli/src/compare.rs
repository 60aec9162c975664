/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::input::InputArgs;
use crate::{CliDangling, CliLayout, EngineKind, GlobalArgs, ParamsArgs, StopArgs};
use anyhow::{Result, ensure};
use clap::Parser;
use rankgraph_algo::rank::Ranking;
use std::io::Write;
use std::time::{Duration, Instant};

/// The engine configurations compared, the first one being the reference.
const CONFIGS: [(EngineKind, Option<CliLayout>); 6] = [
    (EngineKind::Sequential, Some(CliLayout::Compact)),
    (EngineKind::Sequential, Some(CliLayout::Padded)),
    (EngineKind::Unrolled, Some(CliLayout::Compact)),
    (EngineKind::Parallel, Some(CliLayout::Padded)),
    (EngineKind::Parallel, Some(CliLayout::Compact)),
    (EngineKind::Matrix, None),
];

#[derive(Parser, Debug)]
#[command(
    name = "compare",
    about = "Run all engines on the same input and compare their results with those of the sequential engine.",
    long_about = None
)]
pub struct CliArgs {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub params: ParamsArgs,

    #[clap(flatten)]
    pub stop: StopArgs,

    #[arg(long, default_value_t = 1E-6)]
    /// The maximum absolute difference from the sequential engine allowed for
    /// any score.
    pub tolerance: f64,
}

/// The outcome of an engine run.
#[derive(Debug)]
pub struct Outcome {
    pub name: String,
    pub ranking: Ranking,
    pub elapsed: Duration,
    /// The maximum absolute difference from the reference scores.
    pub max_diff: f64,
}

/// Returns the maximum absolute difference between two vectors.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Writes a table of outcomes.
pub fn write_table(mut out: impl Write, outcomes: &[Outcome]) -> Result<()> {
    writeln!(
        out,
        "{:<20} {:>10} {:>12} {:>14} {:>14}",
        "engine", "iterations", "elapsed (s)", "distance", "max diff"
    )?;
    for o in outcomes {
        writeln!(
            out,
            "{:<20} {:>10} {:>12.6} {:>14.6e} {:>14.6e}",
            o.name,
            o.ranking.iterations(),
            o.elapsed.as_secs_f64(),
            o.ranking.distance().l2(),
            o.max_diff
        )?;
    }
    out.flush()?;
    Ok(())
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    ensure!(
        args.tolerance >= 0.0,
        "The tolerance must be non-negative, got {}",
        args.tolerance
    );
    let input = args.input.read()?;
    let mut params = args.params.params(input.num_threads, input.damping);
    // All engines must use the same dangling policy
    let dangling = args.params.dangling.unwrap_or(CliDangling::Discard);
    params.dangling(dangling.into());

    if let Err(e) = params.check(&input.graph) {
        log::warn!("Not comparing: {e}");
        return Ok(());
    }

    let mut outcomes: Vec<Outcome> = Vec::with_capacity(CONFIGS.len());
    for (engine, layout) in CONFIGS {
        let name = match layout {
            Some(layout) => format!("{engine} ({layout:?})").to_lowercase(),
            None => engine.to_string(),
        };
        log::info!("Running the {name} engine");
        let mut pl = global_args.progress_logger();
        let start = Instant::now();
        let Some(ranking) = engine.run_with_logging(
            layout,
            params,
            &input.graph,
            args.stop.predicate()?,
            &mut pl,
        ) else {
            log::warn!("The {name} engine refused the parameters");
            return Ok(());
        };
        let elapsed = start.elapsed();
        let max_diff = outcomes
            .first()
            .map_or(0.0, |reference| {
                max_abs_diff(reference.ranking.scores(), ranking.scores())
            });
        outcomes.push(Outcome {
            name,
            ranking,
            elapsed,
            max_diff,
        });
    }

    write_table(std::io::stdout().lock(), &outcomes)?;

    let worst = outcomes.iter().fold(0.0, |m, o| o.max_diff.max(m));
    ensure!(
        worst <= args.tolerance,
        "Maximum difference {worst} exceeds the tolerance {}",
        args.tolerance
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_abs_diff() {
        assert_eq!(max_abs_diff(&[0.5, 0.25], &[0.25, 0.25]), 0.25);
        assert_eq!(max_abs_diff(&[], &[]), 0.0);
    }
}
