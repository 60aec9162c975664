/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! PageRank by power iteration.
//!
//! All engines in this module compute the same fixed point: given a graph
//! with *n* nodes and a damping factor *d*, the score of node *i* is
//!
//! > *xᵢ* = (1 − *d*) / *n* + *d* ∑_(*j* → *i*) *xⱼ* / outdeg(*j*),
//!
//! computed by a Jacobi (power) iteration starting from the uniform vector
//! 1/*n*. Each iteration, or _sweep_, computes a new generation of scores
//! from the old one and never reads a new score, so the order in which nodes
//! are updated is irrelevant and updates can run in parallel without
//! synchronization.
//!
//! # Engines
//!
//! - [`Sequential`]: a scalar sweep over a double-buffered [score
//!   store](store::ScoreStore);
//! - [`Unrolled`]: the same sweep, processed in batches of four nodes with a
//!   remainder loop;
//! - [`Parallel`]: a parallel sweep over cache-line-padded records, followed
//!   by a separate parallel reduction of the distance;
//! - [`DenseMatrix`]: the iteration rewritten as a dense matrix-vector
//!   product *x* ← (1 − *d*)/*n* + *M* *x*, multiplied in parallel.
//!
//! The score layout of the per-node engines is a type parameter: see
//! [`Compact`] and [`Padded`]. Given the same summation order, all layouts
//! produce the same numbers.
//!
//! # Dangling nodes
//!
//! The score of a node without outbound arcs is not propagated anywhere: the
//! rank it holds leaks out of the system and the scores no longer sum to
//! one. The [`Dangling`] policy decides what to do with it:
//! [`Discard`](Dangling::Discard) lets it leak, whereas
//! [`Redistribute`](Dangling::Redistribute) spreads it uniformly, adding
//! *d* ∑_(*j* dangling) *xⱼ* / *n* to the baseline of every node (in the dense
//! formulation, dangling columns of *M* are filled with *d*/*n*). The
//! per-node engines discard by default, the dense engine redistributes by
//! default; [`Params::dangling`] overrides the default of any engine.
//!
//! # Stopping criteria
//!
//! After each sweep the engine evaluates a composable [`Predicate`] on the
//! iteration number and on the [`Distance`] between the two generations
//! (see the [`preds`] module). There is no implicit bound on the number of
//! iterations: combine a norm with [`MaxIter`](preds::MaxIter) if
//! convergence is not guaranteed (e.g., when *d* ≥ 1).
//!
//! # Invalid parameters
//!
//! An engine run on an empty graph, with no threads, or with a damping
//! factor that is not positive and finite returns [`None`] without
//! allocating anything.
//!
//! [`Predicate`]: predicates::Predicate

pub mod convergence;
pub mod preds;
pub mod store;

mod dense;
mod parallel;
mod sequential;
mod unrolled;

pub use convergence::Distance;
pub use dense::{DenseMatrix, TransitionMatrix};
pub use parallel::Parallel;
pub use sequential::Sequential;
pub use store::{Compact, Generations, Layout, Padded, ScoreStore};
pub use unrolled::Unrolled;

use crate::utils::Granularity;
use dsi_progress_logger::{ProgressLog, no_logging};
use predicates::Predicate;
use rankgraph::traits::RankGraph;
use rayon::prelude::*;

/// Selects what happens to the rank of dangling nodes.
///
/// See the [module-level documentation](self) for the details.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dangling {
    /// The rank of dangling nodes is lost at each sweep.
    Discard,
    /// The rank of dangling nodes is distributed uniformly to all nodes.
    Redistribute,
}

impl std::fmt::Display for Dangling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dangling::Discard => f.write_str("discard"),
            Dangling::Redistribute => f.write_str("redistribute"),
        }
    }
}

/// The reason why an engine refused to run.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum InvalidParams {
    #[error("the graph has no nodes")]
    NoNodes,
    #[error("the number of threads must be positive")]
    NoThreads,
    #[error("the damping factor must be positive and finite, got {0}")]
    Damping(f64),
}

/// Parameters shared by all engines.
///
/// Parameters are set via chained setters and checked only when an engine
/// runs: see [`check`](Params::check).
///
/// ```
/// use rankgraph_algo::rank::{Dangling, Params};
///
/// let mut params = Params::default();
/// params.damping(0.9).num_threads(2).dangling(Dangling::Redistribute);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    damping: f64,
    num_threads: usize,
    dangling: Option<Dangling>,
    granularity: Granularity,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            damping: Self::DEFAULT_DAMPING,
            num_threads: rayon::current_num_threads().max(1),
            dangling: None,
            granularity: Granularity::default(),
        }
    }
}

impl Params {
    pub const DEFAULT_DAMPING: f64 = 0.85;

    /// Sets the damping factor.
    pub fn damping(&mut self, damping: f64) -> &mut Self {
        self.damping = damping;
        self
    }

    /// Sets the number of worker threads of the parallel engines.
    pub fn num_threads(&mut self, num_threads: usize) -> &mut Self {
        self.num_threads = num_threads;
        self
    }

    /// Sets the dangling-node policy, overriding the engine default.
    pub fn dangling(&mut self, dangling: Dangling) -> &mut Self {
        self.dangling = Some(dangling);
        self
    }

    /// Sets the parallel task granularity.
    ///
    /// The granularity expresses how many
    /// [nodes](Granularity::node_granularity) will be passed to a worker
    /// thread at a time.
    pub fn granularity(&mut self, granularity: Granularity) -> &mut Self {
        self.granularity = granularity;
        self
    }

    /// Checks the parameters against a graph.
    pub fn check(&self, graph: &impl RankGraph) -> Result<(), InvalidParams> {
        if graph.num_nodes() == 0 {
            return Err(InvalidParams::NoNodes);
        }
        if self.num_threads == 0 {
            return Err(InvalidParams::NoThreads);
        }
        if !(self.damping > 0.0 && self.damping.is_finite()) {
            return Err(InvalidParams::Damping(self.damping));
        }
        Ok(())
    }

    /// Checks the parameters, logging the reason of a refusal.
    fn accept(&self, graph: &impl RankGraph) -> bool {
        match self.check(graph) {
            Ok(()) => {
                if self.damping >= 1.0 {
                    log::warn!(
                        "Damping factor {} is not smaller than one: the iteration might not converge",
                        self.damping
                    );
                }
                true
            }
            Err(e) => {
                log::debug!("Not ranking: {e}");
                false
            }
        }
    }
}

/// The outcome of a run: scores in node order, number of sweeps and distance
/// between the last two generations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    scores: Box<[f64]>,
    iterations: usize,
    distance: Distance,
}

impl Ranking {
    pub(crate) fn new(scores: Box<[f64]>, iterations: usize, distance: Distance) -> Self {
        Self {
            scores,
            iterations,
            distance,
        }
    }

    /// Returns the scores, indexed by node.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Consumes the ranking, returning the scores.
    pub fn into_scores(self) -> Box<[f64]> {
        self.scores
    }

    /// Returns the number of sweeps performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns the distance between the last two generations.
    pub fn distance(&self) -> Distance {
        self.distance
    }
}

/// A PageRank engine.
///
/// Engines are built from [`Params`] and can be run on any [`RankGraph`]
/// several times.
pub trait Engine {
    /// The dangling-node policy used when [`Params`] does not specify one.
    const DEFAULT_DANGLING: Dangling;

    /// Returns the parameters of this engine.
    fn params(&self) -> &Params;

    /// Runs the engine until the given predicate is satisfied, logging
    /// progress on `pl`.
    ///
    /// Returns [`None`], without allocating anything, if the
    /// [parameters](Params::check) are invalid for `graph`.
    fn run_with_logging<G: RankGraph + Sync>(
        &self,
        graph: &G,
        predicate: impl Predicate<preds::PredParams>,
        pl: &mut impl ProgressLog,
    ) -> Option<Ranking>;

    /// Runs the engine until the given predicate is satisfied.
    fn run<G: RankGraph + Sync>(
        &self,
        graph: &G,
        predicate: impl Predicate<preds::PredParams>,
    ) -> Option<Ranking> {
        self.run_with_logging(graph, predicate, no_logging![])
    }

    /// Returns the dangling-node policy this engine will use.
    fn dangling(&self) -> Dangling {
        self.params().dangling.unwrap_or(Self::DEFAULT_DANGLING)
    }
}

/// The score every node receives independently of its predecessors.
///
/// This is (1 − *d*) / *n* plus, when dangling rank is redistributed, *d*
/// times the old rank of dangling nodes divided by *n*.
#[derive(Debug)]
pub(crate) struct Baseline {
    teleport: f64,
    spread: f64,
    dangling_nodes: Option<Box<[usize]>>,
}

impl Baseline {
    pub(crate) fn new(graph: &impl RankGraph, damping: f64, dangling: Dangling) -> Self {
        let n = graph.num_nodes();
        let dangling_nodes = match dangling {
            Dangling::Discard => None,
            Dangling::Redistribute => Some(
                (0..n)
                    .filter(|&node| graph.is_dangling(node))
                    .collect::<Box<[_]>>(),
            ),
        };
        if let Some(d) = &dangling_nodes {
            log::info!("{} dangling nodes", d.len());
        }
        Self {
            teleport: (1.0 - damping) / n as f64,
            spread: damping / n as f64,
            dangling_nodes,
        }
    }

    /// Returns the baseline given the old scores.
    pub(crate) fn value(&self, old: impl Fn(usize) -> f64) -> f64 {
        match &self.dangling_nodes {
            None => self.teleport,
            Some(d) => self.teleport + self.spread * d.iter().map(|&j| old(j)).sum::<f64>(),
        }
    }

    /// Returns the baseline given the old scores, summing the dangling rank
    /// in parallel in the current thread pool.
    pub(crate) fn par_value(&self, old: impl Fn(usize) -> f64 + Sync) -> f64 {
        match &self.dangling_nodes {
            None => self.teleport,
            Some(d) => {
                self.teleport
                    + self.spread
                        * d.par_iter()
                            .with_min_len(RAYON_MIN_LEN)
                            .map(|&j| old(j))
                            .sum::<f64>()
            }
        }
    }
}

/// Minimum length of the pieces of a parallel iterator over nodes.
pub(crate) const RAYON_MIN_LEN: usize = 1000;

/// Computes the new score of a node from the old scores of its predecessors.
///
/// A node without predecessors gets just the baseline.
#[inline(always)]
pub(crate) fn node_score<G: RankGraph>(
    graph: &G,
    node: usize,
    baseline: f64,
    damping: f64,
    old: impl Fn(usize) -> f64,
) -> f64 {
    let mut preds = graph.predecessors(node).peekable();
    if preds.peek().is_none() {
        return baseline;
    }
    let mut total = 0.0;
    for j in preds {
        total += old(j) / graph.outdegree(j) as f64;
    }
    baseline + damping * total
}

/// Logs the configuration of a run.
pub(crate) fn log_start(
    engine: &str,
    params: &Params,
    dangling: Dangling,
    predicate: &impl Predicate<preds::PredParams>,
) {
    log::info!("Engine: {engine}");
    log::info!("Damping: {}", params.damping);
    log::info!("Dangling nodes: {dangling}");
    log::info!("Stopping criterion: {predicate}");
}

/// The control loop shared by all engines: runs `sweep` until `predicate`
/// holds, returning the number of sweeps and the last distance.
pub(crate) fn power_iteration(
    predicate: impl Predicate<preds::PredParams>,
    pl: &mut impl ProgressLog,
    mut sweep: impl FnMut() -> Distance,
) -> (usize, Distance) {
    pl.item_name("sweep");
    pl.expected_updates(None);
    pl.start("Computing PageRank...");

    let mut iteration = 0;
    let distance = loop {
        let distance = sweep();
        iteration += 1;

        log::info!("Iteration {}: distance = {}", iteration, distance.l2());
        pl.update_and_display();

        if predicate.eval(&preds::PredParams {
            iteration,
            distance,
        }) {
            break distance;
        }
    };

    pl.done();
    (iteration, distance)
}
