/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

use anyhow::{Context, Result, anyhow, bail, ensure};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dsi_progress_logger::{ProgressLog, ProgressLogger, progress_logger};
use predicates::BoxPredicate;
use predicates::prelude::*;
use rankgraph::traits::Labels;
use rankgraph_algo::prelude::*;
use rankgraph_algo::rank::preds::PredParams;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;

pub mod compare;
pub mod input;
pub mod rank;

/// Parses the number of threads from a string.
///
/// This function is meant to be used with `#[arg(...,  value_parser =
/// num_threads_parser)]`.
pub fn num_threads_parser(arg: &str) -> Result<usize> {
    let num_threads = arg.parse::<usize>()?;
    ensure!(num_threads > 0, "Number of threads must be greater than 0");
    Ok(num_threads)
}

/// Shared CLI arguments for commands that specify a number of threads.
///
/// When not specified, the number of threads comes from the input (if it
/// provides one) or from Rayon.
#[derive(Args, Debug)]
pub struct NumThreadsArg {
    #[arg(short = 'j', long, value_parser = num_threads_parser)]
    /// The number of threads to use.
    pub num_threads: Option<usize>,
}

/// Shared CLI arguments for commands that specify a granularity.
#[derive(Args, Debug)]
pub struct GranularityArgs {
    #[arg(long, conflicts_with("node_granularity"))]
    /// The tentative number of arcs used to define the size of a parallel job
    /// (advanced option).
    pub arc_granularity: Option<u64>,

    #[arg(long, conflicts_with("arc_granularity"))]
    /// The tentative number of nodes used to define the size of a parallel job
    /// (advanced option).
    pub node_granularity: Option<usize>,
}

impl GranularityArgs {
    pub fn into_granularity(&self) -> Granularity {
        match (self.arc_granularity, self.node_granularity) {
            (Some(_), Some(_)) => unreachable!(),
            (Some(arc_granularity), None) => Granularity::Arcs(arc_granularity),
            (None, Some(node_granularity)) => Granularity::Nodes(node_granularity),
            (None, None) => Granularity::default(),
        }
    }
}

/// The engines available from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Single-threaded sweep in node order.
    Sequential,
    /// Single-threaded sweep in batches of four nodes.
    Unrolled,
    /// Multi-threaded sweep.
    Parallel,
    /// Multi-threaded dense matrix-vector product (quadratic space).
    Matrix,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Sequential => f.write_str("sequential"),
            EngineKind::Unrolled => f.write_str("unrolled"),
            EngineKind::Parallel => f.write_str("parallel"),
            EngineKind::Matrix => f.write_str("matrix"),
        }
    }
}

/// The layout of per-node score records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliLayout {
    /// Two scores per node, 16 bytes.
    Compact,
    /// Two scores per node in a 128-byte aligned record.
    Padded,
}

/// What to do with the rank of nodes without outbound arcs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliDangling {
    /// The rank is lost.
    Discard,
    /// The rank is distributed uniformly to all nodes.
    Redistribute,
}

impl From<CliDangling> for Dangling {
    fn from(d: CliDangling) -> Self {
        match d {
            CliDangling::Discard => Dangling::Discard,
            CliDangling::Redistribute => Dangling::Redistribute,
        }
    }
}

/// The norm used to stop the iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Norm {
    /// Euclidean distance between consecutive score vectors.
    #[default]
    L2,
    /// Sum of squared differences between consecutive score vectors.
    SquaredL2,
}

/// Shared CLI arguments for the stopping criterion.
#[derive(Args, Debug)]
pub struct StopArgs {
    #[arg(long, value_enum, default_value_t = Norm::L2)]
    /// The norm of the difference between consecutive score vectors.
    pub norm: Norm,

    #[arg(short, long)]
    /// The threshold on the norm below which the iteration stops (default:
    /// 1E-5 for L2, 2.5E-5 for squared L2).
    pub threshold: Option<f64>,

    #[arg(long)]
    /// Maximum number of iterations.
    pub max_iter: Option<usize>,
}

impl StopArgs {
    /// Builds the stopping predicate described by the arguments.
    pub fn predicate(&self) -> Result<BoxPredicate<PredParams>> {
        let mut predicate = match self.norm {
            Norm::L2 => L2Norm::try_from(self.threshold)?.boxed(),
            Norm::SquaredL2 => SquaredL2Norm::try_from(self.threshold)?.boxed(),
        };
        if let Some(max_iter) = self.max_iter {
            predicate = predicate.or(MaxIter::from(max_iter)).boxed();
        }
        Ok(predicate)
    }
}

/// Shared CLI arguments setting the engine [`Params`].
#[derive(Args, Debug)]
pub struct ParamsArgs {
    #[arg(short, long)]
    /// The damping factor (overrides the value in the input, if any; default:
    /// 0.85).
    pub damping: Option<f64>,

    #[arg(long, value_enum)]
    /// What to do with the rank of dangling nodes (default: discard, but
    /// redistribute for the matrix engine).
    pub dangling: Option<CliDangling>,

    #[clap(flatten)]
    pub num_threads: NumThreadsArg,

    #[clap(flatten)]
    pub granularity: GranularityArgs,
}

impl ParamsArgs {
    /// Builds engine parameters, using the values coming from the input where
    /// the command line does not specify them.
    pub fn params(&self, input_threads: Option<usize>, input_damping: Option<f64>) -> Params {
        let mut params = Params::default();
        if let Some(damping) = self.damping.or(input_damping) {
            params.damping(damping);
        }
        if let Some(num_threads) = self.num_threads.num_threads.or(input_threads) {
            params.num_threads(num_threads);
        }
        if let Some(dangling) = self.dangling {
            params.dangling(dangling.into());
        }
        params.granularity(self.granularity.into_granularity());
        params
    }
}

impl EngineKind {
    /// Runs the engine selected by `self`, with the given layout (if
    /// applicable).
    pub fn run_with_logging(
        &self,
        layout: Option<CliLayout>,
        params: Params,
        graph: &rankgraph::VecGraph,
        predicate: BoxPredicate<PredParams>,
        pl: &mut impl ProgressLog,
    ) -> Option<Ranking> {
        match (self, layout) {
            (EngineKind::Sequential, None | Some(CliLayout::Compact)) => {
                Sequential::<Compact>::new(params).run_with_logging(graph, predicate, pl)
            }
            (EngineKind::Sequential, Some(CliLayout::Padded)) => {
                Sequential::<Padded>::new(params).run_with_logging(graph, predicate, pl)
            }
            (EngineKind::Unrolled, None | Some(CliLayout::Compact)) => {
                Unrolled::<Compact>::new(params).run_with_logging(graph, predicate, pl)
            }
            (EngineKind::Unrolled, Some(CliLayout::Padded)) => {
                Unrolled::<Padded>::new(params).run_with_logging(graph, predicate, pl)
            }
            (EngineKind::Parallel, None | Some(CliLayout::Padded)) => {
                Parallel::<Padded>::new(params).run_with_logging(graph, predicate, pl)
            }
            (EngineKind::Parallel, Some(CliLayout::Compact)) => {
                Parallel::<Compact>::new(params).run_with_logging(graph, predicate, pl)
            }
            (EngineKind::Matrix, layout) => {
                if layout.is_some() {
                    log::warn!("The matrix engine has no per-node layout: ignoring --layout");
                }
                DenseMatrix::new(params).run_with_logging(graph, predicate, pl)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
/// Formats for emitting scores.
pub enum OutputFormat {
    /// One line per node containing its name and its score, separated by a
    /// space (four decimal digits by default).
    Named,
    /// ASCII format, one score per line.
    Ascii,
    /// A JSON Array.
    Json,
}

impl OutputFormat {
    /// The default number of decimal digits of the [`Named`](Self::Named)
    /// format.
    pub const NAMED_PRECISION: usize = 4;

    /// Writes scores to `out` using the format defined by `self`.
    ///
    /// `precision` is the number of decimal digits. If `None`, the `Named`
    /// format uses [`NAMED_PRECISION`](Self::NAMED_PRECISION) digits, and the
    /// other formats use [zmij](https://crates.io/crates/zmij) formatting.
    pub fn write(
        &self,
        mut out: impl Write,
        labels: &impl Labels,
        scores: &[f64],
        precision: Option<usize>,
    ) -> Result<()> {
        let mut buf = zmij::Buffer::new();
        match self {
            OutputFormat::Named => {
                let precision = precision.unwrap_or(Self::NAMED_PRECISION);
                for (node, score) in scores.iter().enumerate() {
                    writeln!(out, "{} {score:.precision$}", labels.name(node))?;
                }
            }
            OutputFormat::Ascii => {
                for score in scores {
                    match precision {
                        None => writeln!(out, "{}", buf.format(*score)),
                        Some(precision) => writeln!(out, "{score:.precision$}"),
                    }?;
                }
            }
            OutputFormat::Json => {
                write!(out, "[")?;
                for score in scores.iter().take(scores.len().saturating_sub(1)) {
                    match precision {
                        None => write!(out, "{}, ", buf.format(*score)),
                        Some(precision) => write!(out, "{score:.precision$}, "),
                    }?;
                }
                if let Some(last) = scores.last() {
                    match precision {
                        None => write!(out, "{}", buf.format(*last)),
                        Some(precision) => write!(out, "{last:.precision$}"),
                    }?;
                }
                writeln!(out, "]")?;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Stores scores in the specified `path`, or on standard output if
    /// `path` is `None`, using the format defined by `self`.
    pub fn store(
        &self,
        path: Option<&Path>,
        labels: &impl Labels,
        scores: &[f64],
        precision: Option<usize>,
    ) -> Result<()> {
        match path {
            None => {
                log::info!("Writing scores in {self:?} format on standard output");
                self.write(std::io::stdout().lock(), labels, scores, precision)
                    .context("Could not write scores on standard output")
            }
            Some(path) => {
                create_parent_dir(path)?;
                let path_display = path.display();
                log::info!("Storing scores in {self:?} format at {path_display}");
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Could not create {path_display}"))?;
                self.write(BufWriter::new(file), labels, scores, precision)
                    .with_context(|| format!("Could not write scores to {path_display}"))
            }
        }
    }
}

/// Creates all parent directories of the given file path.
pub fn create_parent_dir(file_path: impl AsRef<Path>) -> Result<()> {
    // ensure that the dst directory exists
    if let Some(parent_dir) = file_path.as_ref().parent() {
        std::fs::create_dir_all(parent_dir).with_context(|| {
            format!(
                "Failed to create the directory {:?}",
                parent_dir.to_string_lossy()
            )
        })?;
    }
    Ok(())
}

/// Parses a duration from a string.
/// For compatibility with Java, if no suffix is given, it is assumed to be in milliseconds.
/// You can use suffixes, the available ones are:
/// - `s` for seconds
/// - `m` for minutes
/// - `h` for hours
/// - `d` for days
///
/// Example: `1d2h3m4s567` this is parsed as: 1 day, 2 hours, 3 minutes, 4 seconds, and 567 milliseconds.
fn parse_duration(value: &str) -> Result<Duration> {
    if value.is_empty() {
        bail!("Empty duration string, if you want every 0 milliseconds use `0`.");
    }
    let mut duration = Duration::from_secs(0);
    let mut acc = String::new();
    for c in value.chars() {
        if c.is_ascii_digit() {
            acc.push(c);
        } else if c.is_whitespace() {
            continue;
        } else {
            let dur = acc.parse::<u64>()?;
            match c {
                's' => duration += Duration::from_secs(dur),
                'm' => duration += Duration::from_secs(dur * 60),
                'h' => duration += Duration::from_secs(dur * 60 * 60),
                'd' => duration += Duration::from_secs(dur * 60 * 60 * 24),
                _ => return Err(anyhow!("Invalid duration suffix: {}", c)),
            }
            acc.clear();
        }
    }
    if !acc.is_empty() {
        let dur = acc.parse::<u64>()?;
        duration += Duration::from_millis(dur);
    }
    Ok(duration)
}

/// Initializes the `env_logger` logger with a custom format including
/// timestamps with elapsed time since initialization.
pub fn init_env_logger() -> Result<()> {
    use jiff::SpanRound;
    use jiff::fmt::friendly::{Designator, Spacing, SpanPrinter};

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    let start = std::time::Instant::now();
    let printer = SpanPrinter::new()
        .spacing(Spacing::None)
        .designator(Designator::Compact);
    let span_round = SpanRound::new()
        .largest(jiff::Unit::Day)
        .smallest(jiff::Unit::Millisecond)
        .days_are_24_hours();

    builder.format(move |buf, record| {
        let Ok(ts) = jiff::Timestamp::try_from(SystemTime::now()) else {
            return Err(std::io::Error::other("Failed to get timestamp"));
        };
        let style = buf.default_level_style(record.level());
        let elapsed = start.elapsed();
        let span = jiff::Span::new()
            .seconds(elapsed.as_secs() as i64)
            .milliseconds(elapsed.subsec_millis() as i64);
        let span = span.round(span_round).map_err(std::io::Error::other)?;
        writeln!(
            buf,
            "{} {} {style}{}{style:#} [{:?}] {} - {}",
            ts.strftime("%F %T%.3f"),
            printer.span_to_string(&span),
            record.level(),
            std::thread::current().id(),
            record.target(),
            record.args()
        )
    });
    builder.try_init()?;
    Ok(())
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    #[arg(long, value_parser = parse_duration, global=true, display_order = 1000)]
    /// How often to log progress. Default is 10s. You can use the suffixes "s"
    /// for seconds, "m" for minutes, "h" for hours, and "d" for days. If no
    /// suffix is provided it is assumed to be in milliseconds.
    /// Example: "1d2h3m4s567" is parsed as 1 day + 2 hours + 3 minutes + 4
    /// seconds + 567 milliseconds = 93784567 milliseconds.
    pub log_interval: Option<Duration>,
}

impl GlobalArgs {
    /// Returns a progress logger configured by the global arguments.
    pub fn progress_logger(&self) -> ProgressLogger {
        let mut pl = progress_logger![];
        pl.display_memory(true);
        if let Some(log_interval) = self.log_interval {
            pl.log_interval(log_interval);
        }
        pl
    }
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    Rank(rank::CliArgs),
    Compare(compare::CliArgs),
}

#[derive(Parser, Debug)]
#[command(name = "rankgraph", version)]
/// Computes PageRank by power iteration.
///
/// Noteworthy environment variables:
///
/// - RUST_MIN_STACK: minimum thread stack size (in bytes)
///
/// - RUST_LOG: configuration for env_logger
///   <https://docs.rs/env_logger/latest/env_logger/>
pub struct Cli {
    #[command(subcommand)]
    pub command: SubCommands,
    #[clap(flatten)]
    pub args: GlobalArgs,
}

/// The entry point of the command-line interface.
pub fn cli_main<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let start = std::time::Instant::now();
    let cli = Cli::parse_from(args);
    match cli.command {
        SubCommands::Rank(args) => {
            rank::main(cli.args, args)?;
        }
        SubCommands::Compare(args) => {
            compare::main(cli.args, args)?;
        }
    }

    log::info!(
        "The command took {}",
        pretty_print_elapsed(start.elapsed().as_secs_f64())
    );

    Ok(())
}

/// Pretty-prints seconds in a human-readable format.
pub fn pretty_print_elapsed(elapsed: f64) -> String {
    let mut result = String::new();
    let mut elapsed_seconds = elapsed as u64;
    let weeks = elapsed_seconds / (60 * 60 * 24 * 7);
    elapsed_seconds %= 60 * 60 * 24 * 7;
    let days = elapsed_seconds / (60 * 60 * 24);
    elapsed_seconds %= 60 * 60 * 24;
    let hours = elapsed_seconds / (60 * 60);
    elapsed_seconds %= 60 * 60;
    let minutes = elapsed_seconds / 60;

    match weeks {
        0 => {}
        1 => result.push_str("1 week "),
        _ => result.push_str(&format!("{} weeks ", weeks)),
    }
    match days {
        0 => {}
        1 => result.push_str("1 day "),
        _ => result.push_str(&format!("{} days ", days)),
    }
    match hours {
        0 => {}
        1 => result.push_str("1 hour "),
        _ => result.push_str(&format!("{} hours ", hours)),
    }
    match minutes {
        0 => {}
        1 => result.push_str("1 minute "),
        _ => result.push_str(&format!("{} minutes ", minutes)),
    }

    result.push_str(&format!("{:.3} seconds ({}s)", elapsed % 60.0, elapsed));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankgraph::VecGraph;

    #[test]
    fn test_parse_duration() -> Result<()> {
        assert_eq!(parse_duration("1d2h3m4s567")?, Duration::from_millis(93784567));
        assert_eq!(parse_duration("10s")?, Duration::from_secs(10));
        assert_eq!(parse_duration("250")?, Duration::from_millis(250));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("3x").is_err());
        Ok(())
    }

    #[test]
    fn test_num_threads_parser() {
        assert_eq!(num_threads_parser("4").unwrap(), 4);
        assert!(num_threads_parser("0").is_err());
        assert!(num_threads_parser("-1").is_err());
    }

    #[test]
    fn test_pretty_print_elapsed() {
        assert_eq!(pretty_print_elapsed(1.5), "1.500 seconds (1.5s)");
        assert_eq!(
            pretty_print_elapsed(3725.0),
            "1 hour 2 minutes 5.000 seconds (3725s)"
        );
    }

    #[test]
    fn test_write_named() -> Result<()> {
        let mut g = VecGraph::new();
        g.add_node("A");
        g.add_node("B");
        let mut out = Vec::new();
        OutputFormat::Named.write(&mut out, &g, &[0.075, 0.5], None)?;
        assert_eq!(String::from_utf8(out)?, "A 0.0750\nB 0.5000\n");
        Ok(())
    }

    #[test]
    fn test_write_vectors() -> Result<()> {
        let g = VecGraph::empty(2);
        let mut out = Vec::new();
        OutputFormat::Ascii.write(&mut out, &g, &[0.25, 0.75], Some(2))?;
        assert_eq!(String::from_utf8(out)?, "0.25\n0.75\n");
        let mut out = Vec::new();
        OutputFormat::Json.write(&mut out, &g, &[0.25, 0.75], None)?;
        assert_eq!(String::from_utf8(out)?, "[0.25, 0.75]\n");
        let mut out = Vec::new();
        OutputFormat::Json.write(&mut out, &VecGraph::new(), &[], None)?;
        assert_eq!(String::from_utf8(out)?, "[]\n");
        Ok(())
    }

    #[test]
    fn test_stop_args() -> Result<()> {
        let stop = StopArgs {
            norm: Norm::SquaredL2,
            threshold: None,
            max_iter: Some(3),
        };
        let predicate = stop.predicate()?;
        let params = |iteration, squared| PredParams {
            iteration,
            distance: rankgraph_algo::rank::Distance::from_squared(squared),
        };
        assert!(predicate.eval(&params(3, 1.0)));
        assert!(predicate.eval(&params(1, 2E-5)));
        assert!(!predicate.eval(&params(1, 1E-4)));

        let stop = StopArgs {
            norm: Norm::L2,
            threshold: Some(-1.0),
            max_iter: None,
        };
        assert!(stop.predicate().is_err());
        Ok(())
    }
}
