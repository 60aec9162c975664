/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::input::InputArgs;
use crate::{CliLayout, EngineKind, GlobalArgs, OutputFormat, ParamsArgs, StopArgs};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rank",
    about = "Compute PageRank by power iteration.",
    long_about = None
)]
pub struct CliArgs {
    #[clap(flatten)]
    pub input: InputArgs,

    #[arg(short, long, value_enum, default_value_t = EngineKind::Parallel)]
    /// The engine to use.
    pub engine: EngineKind,

    #[arg(long, value_enum)]
    /// The layout of per-node scores (default: compact for single-threaded
    /// engines, padded for the parallel engine).
    pub layout: Option<CliLayout>,

    #[clap(flatten)]
    pub params: ParamsArgs,

    #[clap(flatten)]
    pub stop: StopArgs,

    #[arg(short, long)]
    /// Where to store the scores (default: standard output).
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Named)]
    /// The output format for the scores.
    pub fmt: OutputFormat,

    #[arg(long)]
    /// Decimal digits for text output formats.
    pub precision: Option<usize>,
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let input = args.input.read()?;
    let params = args.params.params(input.num_threads, input.damping);
    let predicate = args.stop.predicate()?;

    if let Err(e) = params.check(&input.graph) {
        log::warn!("Not ranking: {e}");
        return Ok(());
    }

    let mut pl = global_args.progress_logger();
    let Some(ranking) =
        args.engine
            .run_with_logging(args.layout, params, &input.graph, predicate, &mut pl)
    else {
        log::warn!("The {} engine refused the parameters", args.engine);
        return Ok(());
    };

    log::info!(
        "Completed after {} iteration(s), distance = {} (squared: {})",
        ranking.iterations(),
        ranking.distance().l2(),
        ranking.distance().squared()
    );

    args.fmt.store(
        args.output.as_deref(),
        &input.graph,
        ranking.scores(),
        args.precision,
    )
}
