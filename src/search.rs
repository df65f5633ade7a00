//! Depth-first branch-and-bound search for minimal chains.
//!
//! The search grows a [`Chain`] one step at a time. At each node it generates the candidate
//! steps (see [`CandidateGenerator`]), optionally ranks them with the cost engine, and
//! recurses into each of them in order, backtracking as soon as the chain can no longer
//! beat the best known length.
//!
//! # Canonical enumeration
//!
//! Every candidate value is marked *seen* when the node iterates over it, and stays marked
//! until the node returns. Later siblings therefore never add a value that an earlier sibling
//! already tried: each set of steps is explored in one order only. When a candidate is a
//! target, later siblings are cut off altogether, since they could no longer produce it.
//!
//! # Resuming and splitting
//!
//! The indices chosen at each depth form the *choices* vector. It addresses a node
//! deterministically, so a [`ResumeCursor`] can skip the part of the tree before a given path
//! ([`CursorMode::Resume`]) or confine the search to the subtree below it
//! ([`CursorMode::Chunk`]). [`SearchContext::plan`] lists the prefixes of a given depth, and
//! chunks over those prefixes partition the search.
//!
//! # Example
//!
//! ```
//! use boolean_chains::config::SearchConfig;
//! use boolean_chains::function::Function;
//! use boolean_chains::search::SearchContext;
//!
//! let target = Function::new(2, 0b0001);
//! let config = SearchConfig::new(2, vec![target], 5);
//! let mut search = SearchContext::new(config).unwrap();
//! let report = search.run().unwrap();
//! assert_eq!(report.best_length, Some(3));
//! ```

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::bitset::{BitSet, IndexSet};
use crate::candidates::CandidateGenerator;
use crate::chain::Chain;
use crate::config::{SearchConfig, SearchMode, StopPolicy};
use crate::cost::CostTable;
use crate::error::{ChainError, Result};
use crate::expression::Expression;
use crate::function::Function;
use crate::resume::{format_path, CursorMode, ResumeCursor, Step};
use crate::stats::SearchStats;

/// Number of nodes between two reads of the clock.
const PROGRESS_PERIOD: u64 = 4096;

/// Receives solutions and progress reports while the search runs.
pub trait SearchObserver {
    /// Called for every reported solution; `improved` is set for a new best length.
    fn on_solution(&mut self, chain: &Chain, choices: &[usize], improved: bool) {
        let _ = (chain, choices, improved);
    }

    /// Called periodically with the current position in the search tree.
    fn on_progress(&mut self, choices: &[usize], best: Option<usize>, stats: &SearchStats) {
        let _ = (choices, best, stats);
    }
}

/// Logs solutions and progress at `info` level.
#[derive(Debug, Default)]
pub struct LogObserver;

impl SearchObserver for LogObserver {
    fn on_solution(&mut self, chain: &Chain, choices: &[usize], improved: bool) {
        let kind = if improved { "new best" } else { "tie" };
        info!(
            "{} chain of length {} at [{}]",
            kind,
            chain.len(),
            format_path(choices)
        );
        for entry in chain.entries() {
            info!("  {}", chain.render_entry(entry));
        }
    }

    fn on_progress(&mut self, choices: &[usize], best: Option<usize>, stats: &SearchStats) {
        info!("{}", progress_line(choices, best, stats));
    }
}

/// One progress line: `choices [best: L] nodes`.
pub fn progress_line(choices: &[usize], best: Option<usize>, stats: &SearchStats) -> String {
    let best = best.map_or_else(|| "-".to_string(), |b| b.to_string());
    format!(
        "{} [best: {}] {} nodes",
        format_path(choices),
        best,
        stats.nodes
    )
}

/// A complete chain found by the search.
#[derive(Debug, Clone)]
pub struct Solution {
    pub chain: Chain,
    pub choices: Vec<usize>,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

/// Why the search returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Outcome {
    /// The whole tree (or everything after the resume path) was explored.
    Completed,
    /// The subtree below the chunk path was explored.
    ChunkCompleted,
    /// Stopped at the first solution.
    FirstSolution,
    /// Stopped by the stop flag.
    Interrupted,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub best_length: Option<usize>,
    /// Solutions of the best length (all of them, or only the improving ones, per policy).
    pub solutions: Vec<Solution>,
    pub stats: SearchStats,
    pub outcome: Outcome,
    /// Choices of the node where an interrupted search stopped; resuming there loses no work.
    pub stopped_at: Option<Vec<usize>>,
}

/// Result of [`SearchContext::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Chunk paths in enumeration order.
    pub prefixes: Vec<Vec<usize>>,
    /// [`Outcome::Completed`], or [`Outcome::Interrupted`] if the list is partial.
    pub outcome: Outcome,
    /// Where an interrupted planning run stopped.
    pub stopped_at: Option<Vec<usize>>,
}

impl Plan {
    /// Whether the prefixes cover the whole search.
    pub fn is_complete(&self) -> bool {
        self.outcome == Outcome::Completed
    }
}

/// State of one search: the chain under construction, the seen set and the best length.
#[derive(Debug)]
pub struct SearchContext {
    config: SearchConfig,
    chain: Chain,
    seen: BitSet,
    choices: Vec<usize>,
    fulfilled: usize,
    best: Option<usize>,
    solutions: Vec<Solution>,
    stats: SearchStats,
    cursor: ResumeCursor,
    stop: Arc<AtomicBool>,
    generator: CandidateGenerator,
    halt: Option<Outcome>,
    plan_depth: Option<usize>,
    plan: Vec<Vec<usize>>,
    stopped_at: Option<Vec<usize>>,
    last_progress: Instant,
}

impl SearchContext {
    /// Validates `config` and sets up the chain of seeds.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let chain = Chain::with_seeds(config.seeds.iter().copied(), config.targets.iter().copied());

        let mut seen = BitSet::new(Function::space_size(config.inputs));
        seen.insert(0);
        for f in chain.functions() {
            seen.insert(f.index());
        }
        let fulfilled = chain.fulfilled_targets();

        Ok(Self {
            config,
            chain,
            seen,
            choices: Vec::new(),
            fulfilled,
            best: None,
            solutions: Vec::new(),
            stats: SearchStats::default(),
            cursor: ResumeCursor::default(),
            stop: Arc::new(AtomicBool::new(false)),
            generator: CandidateGenerator::new(),
            halt: None,
            plan_depth: None,
            plan: Vec::new(),
            stopped_at: None,
            last_progress: Instant::now(),
        })
    }

    pub fn with_cursor(mut self, cursor: ResumeCursor) -> Self {
        self.cursor = cursor;
        self
    }

    /// Uses an externally owned stop flag, e.g. one set from a signal handler.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn best_length(&self) -> Option<usize> {
        self.best
    }

    /// Runs the search, logging solutions and progress.
    pub fn run(&mut self) -> Result<SearchReport> {
        self.run_with(&mut LogObserver)
    }

    /// Runs the search, reporting solutions and progress to `observer`.
    pub fn run_with(&mut self, observer: &mut dyn SearchObserver) -> Result<SearchReport> {
        self.validate_resume()?;
        self.reset();

        info!(
            "searching chains of length <= {} from {} seeds for {} targets ({:?}, {})",
            self.config.max_length,
            self.chain.len(),
            self.chain.targets().len(),
            self.config.mode,
            self.config.policy
        );
        if !self.cursor.is_empty() {
            info!("starting at {}", self.cursor);
        }

        self.explore(observer);

        let outcome = self.halt.unwrap_or(match self.cursor.mode() {
            CursorMode::Chunk if !self.cursor.is_empty() => Outcome::ChunkCompleted,
            _ => Outcome::Completed,
        });
        info!(
            "search finished ({:?}) after {} nodes, best length {:?}",
            outcome, self.stats.nodes, self.best
        );

        Ok(SearchReport {
            best_length: self.best,
            solutions: std::mem::take(&mut self.solutions),
            stats: self.stats.clone(),
            outcome,
            stopped_at: self.stopped_at.take(),
        })
    }

    /// Lists the choice prefixes of length `depth` that survive the bound check.
    ///
    /// Each prefix is a valid chunk path. Solutions found above `depth` are reported to the
    /// log; they are not part of any chunk. The planning run never stops at a solution, but
    /// the stop flag interrupts it, leaving a partial list (see [`Plan::is_complete`]).
    pub fn plan(&mut self, depth: usize) -> Result<Plan> {
        self.plan_with(depth, &mut LogObserver)
    }

    pub fn plan_with(
        &mut self,
        depth: usize,
        observer: &mut dyn SearchObserver,
    ) -> Result<Plan> {
        let max = self.max_steps();
        if depth > max {
            return Err(ChainError::ResumeTooLong { len: depth, max });
        }

        let cursor = std::mem::take(&mut self.cursor);
        self.reset();
        self.plan_depth = Some(depth);
        self.explore(observer);
        self.plan_depth = None;
        self.cursor = cursor;

        let prefixes = std::mem::take(&mut self.plan);
        let outcome = self.halt.unwrap_or(Outcome::Completed);
        if outcome == Outcome::Completed {
            info!("planned {} chunks at depth {}", prefixes.len(), depth);
        } else {
            warn!(
                "planning at depth {} stopped ({:?}) after {} chunks",
                depth,
                outcome,
                prefixes.len()
            );
        }
        Ok(Plan {
            prefixes,
            outcome,
            stopped_at: self.stopped_at.take(),
        })
    }

    fn reset(&mut self) {
        self.best = None;
        self.solutions.clear();
        self.stats = SearchStats::default();
        self.halt = None;
        self.plan.clear();
        self.stopped_at = None;
        self.last_progress = Instant::now();
    }

    /// Number of steps that fit after the seeds.
    fn max_steps(&self) -> usize {
        self.config.max_length - self.config.seeds.len()
    }

    /// The policy in effect; planning always keeps ties so that no chunk is dropped.
    fn policy(&self) -> StopPolicy {
        if self.plan_depth.is_some() {
            StopPolicy::AllTies
        } else {
            self.config.policy
        }
    }

    fn limit(&self) -> usize {
        let max = self.config.max_length;
        match (self.best, self.policy()) {
            (None, _) => max,
            (Some(best), StopPolicy::AllTies) => best.min(max),
            (Some(best), StopPolicy::Improve | StopPolicy::FirstSolution) => {
                best.saturating_sub(1).min(max)
            }
        }
    }

    fn unfulfilled(&self) -> usize {
        self.chain.targets().len() - self.fulfilled
    }

    /// Ordered candidates of the current node and the number of extra steps they force.
    ///
    /// The list ends at the first target: later siblings are never explored.
    fn node_candidates(&mut self) -> (Vec<Expression>, usize) {
        let mut candidates = self.generator.generate(&self.chain, &self.seen);
        let mut extra = 0;

        if let SearchMode::Hungry { beam } = self.config.mode {
            let table: CostTable = CostTable::compute(&self.chain);
            let sizes = table.level_sizes();
            self.stats
                .record_cost_levels(&sizes, (0..sizes.len()).map(|r| table.tries(r)));

            // Only level 1 is exact: without a target in it, a non-target step comes first.
            let unfulfilled: Vec<Function> = self
                .chain
                .targets()
                .iter()
                .copied()
                .filter(|&t| !self.chain.contains(t))
                .collect();
            if !unfulfilled.is_empty() && unfulfilled.iter().all(|&t| table.cost(t) != Some(1)) {
                extra = 1;
            }

            candidates = rank(&table, &unfulfilled, candidates);
            if let Some(beam) = beam {
                candidates.truncate(beam);
            }
        }

        if let Some(pos) = candidates
            .iter()
            .position(|e| self.chain.is_target(e.evaluate()))
        {
            candidates.truncate(pos + 1);
        }
        (candidates, extra)
    }

    /// Walks the cursor path once, checking that every index exists.
    fn validate_resume(&mut self) -> Result<()> {
        let path = self.cursor.path().to_vec();
        let max = self.max_steps();
        if path.len() > max {
            return Err(ChainError::ResumeTooLong {
                len: path.len(),
                max,
            });
        }

        let mut marked: Vec<Vec<Expression>> = Vec::new();
        let mut result = Ok(());
        for (depth, &index) in path.iter().enumerate() {
            let (candidates, _) = if self.unfulfilled() == 0 {
                (Vec::new(), 0)
            } else {
                self.node_candidates()
            };
            if index >= candidates.len() {
                result = Err(ChainError::ResumeOutOfRange {
                    depth,
                    index,
                    available: candidates.len(),
                });
                break;
            }
            for expr in &candidates[..=index] {
                self.seen.insert(expr.evaluate().index());
            }
            let expr = candidates[index];
            if self.chain.is_target(expr.evaluate()) {
                self.fulfilled += 1;
            }
            self.chain.add(expr);
            marked.push(candidates[..=index].to_vec());
        }

        for exprs in marked.into_iter().rev() {
            if let Some(entry) = self.chain.remove_last() {
                if self.chain.is_target(entry.function) {
                    self.fulfilled -= 1;
                }
            }
            for expr in exprs {
                self.seen.remove(expr.evaluate().index());
            }
        }
        result
    }

    fn report_progress(&mut self, observer: &mut dyn SearchObserver) {
        if self.stats.nodes % PROGRESS_PERIOD != 0 {
            return;
        }
        let now = Instant::now();
        if now.duration_since(self.last_progress) >= self.config.progress_interval {
            self.last_progress = now;
            observer.on_progress(&self.choices, self.best, &self.stats);
        }
    }

    fn record_solution(&mut self, observer: &mut dyn SearchObserver) {
        let len = self.chain.len();
        let improved = self.best.map_or(true, |best| len < best);
        if !improved {
            let tie = self.best == Some(len) && self.policy() == StopPolicy::AllTies;
            if !tie {
                return;
            }
        } else {
            debug!("best length {:?} -> {}", self.best, len);
            self.best = Some(len);
            self.solutions.clear();
            self.stats.improvements += 1;
        }

        self.stats.solutions += 1;
        self.solutions.push(Solution {
            chain: self.chain.clone(),
            choices: self.choices.clone(),
        });
        observer.on_solution(&self.chain, &self.choices, improved);

        if self.policy() == StopPolicy::FirstSolution {
            self.halt = Some(Outcome::FirstSolution);
        }
    }

    fn explore(&mut self, observer: &mut dyn SearchObserver) {
        self.stats.nodes += 1;
        if self.stop.load(Ordering::Relaxed) {
            self.halt = Some(Outcome::Interrupted);
            self.stopped_at = Some(self.choices.clone());
            return;
        }
        self.report_progress(observer);

        let unfulfilled = self.unfulfilled();
        if unfulfilled == 0 {
            self.record_solution(observer);
            return;
        }
        let len = self.chain.len();
        if len + unfulfilled > self.limit() {
            return;
        }
        if self.plan_depth == Some(self.choices.len()) {
            self.plan.push(self.choices.clone());
            return;
        }

        let (candidates, extra) = self.node_candidates();
        if len + unfulfilled + extra > self.limit() {
            return;
        }
        self.stats.record_branching(len, candidates.len());

        let mut iterated = 0;
        for (i, &expr) in candidates.iter().enumerate() {
            let f = expr.evaluate();
            self.seen.insert(f.index());
            iterated = i + 1;

            match self.cursor.decide(&self.choices, i) {
                Step::Skip => continue,
                Step::Stop => {
                    self.halt = Some(Outcome::ChunkCompleted);
                    break;
                }
                Step::Explore => {}
            }

            let is_target = self.chain.is_target(f);
            let after = unfulfilled - usize::from(is_target);
            if len + 1 + after > self.limit() {
                continue;
            }

            self.chain.add(expr);
            self.fulfilled += usize::from(is_target);
            self.choices.push(i);

            self.explore(observer);

            self.choices.pop();
            self.fulfilled -= usize::from(is_target);
            self.chain.remove_last();

            if self.halt.is_some() {
                break;
            }
        }

        for expr in &candidates[..iterated] {
            self.seen.remove(expr.evaluate().index());
        }
    }
}

/// Orders candidates by the cheapest unfulfilled target they start, then by how many
/// targets they start, then by generation order.
fn rank(table: &CostTable, unfulfilled: &[Function], candidates: Vec<Expression>) -> Vec<Expression> {
    let mut keyed: Vec<_> = candidates
        .into_iter()
        .enumerate()
        .map(|(pos, expr)| {
            let mut cheapest = u32::MAX;
            let mut freq = 0usize;
            if let Some(index) = table.first_index(expr.evaluate()) {
                for &t in unfulfilled {
                    if table.footprint(t).contains(index) {
                        freq += 1;
                        if let Some(cost) = table.cost(t) {
                            cheapest = cheapest.min(cost);
                        }
                    }
                }
            }
            ((cheapest, Reverse(freq), pos), expr)
        })
        .collect();
    keyed.sort_by_key(|&(key, _)| key);
    keyed.into_iter().map(|(_, expr)| expr).collect()
}
