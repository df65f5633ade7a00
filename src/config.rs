//! Search configuration.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::error::{ChainError, Result};
use crate::function::{Function, MAX_INPUTS};

/// How candidates are ordered at each node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum SearchMode {
    /// Candidates in generation order.
    #[default]
    Exhaustive,
    /// Candidates ranked by the cost engine, optionally truncated to the `beam` best ones.
    ///
    /// A beam makes the search incomplete.
    Hungry { beam: Option<usize> },
}

impl SearchMode {
    pub fn is_hungry(&self) -> bool {
        matches!(self, SearchMode::Hungry { .. })
    }
}

/// Which solutions are reported once one has been found.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum StopPolicy {
    /// Report every chain of the best known length.
    #[default]
    AllTies,
    /// Report only strictly shorter chains.
    Improve,
    /// Stop at the first complete chain.
    FirstSolution,
}

impl fmt::Display for StopPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StopPolicy::AllTies => "all-ties",
            StopPolicy::Improve => "improve",
            StopPolicy::FirstSolution => "first",
        };
        write!(f, "{}", name)
    }
}

/// Problem and search parameters.
///
/// Use [`SearchConfig::default()`] for the seven-segment display problem.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of input variables.
    pub inputs: u32,
    /// Functions the chain starts with.
    pub seeds: Vec<Function>,
    /// Functions the chain must contain.
    pub targets: Vec<Function>,
    /// Longest chain considered, seeds included.
    pub max_length: usize,
    pub mode: SearchMode,
    pub policy: StopPolicy,
    /// Minimal time between two progress reports.
    pub progress_interval: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::seven_segment()
    }
}

impl SearchConfig {
    /// A problem over the canonical projections of `inputs` variables.
    ///
    /// An unsupported `inputs` leaves the seeds empty; [`validate`][Self::validate] reports it.
    pub fn new(inputs: u32, targets: Vec<Function>, max_length: usize) -> Self {
        let seeds = if (1..=MAX_INPUTS).contains(&inputs) {
            Function::projections(inputs)
        } else {
            Vec::new()
        };
        Self {
            inputs,
            seeds,
            targets,
            max_length,
            mode: SearchMode::default(),
            policy: StopPolicy::default(),
            progress_interval: Duration::from_secs(10),
        }
    }

    /// The seven segments of a hexadecimal display driven by a 4-bit digit.
    pub fn seven_segment() -> Self {
        let mask = Function::mask(4);
        let targets = [
            !0b1011_0111_1110_0011u32,
            !0b1111_1001_1110_0100,
            !0b1101_1111_1111_0100,
            !0b1011_0110_1101_1110,
            !0b1010_0010_1011_1111,
            !0b1000_1111_1111_0011,
            0b0011_1110_1111_1111,
        ]
        .into_iter()
        .map(|bits| Function::new(4, bits & mask))
        .collect();
        Self::new(4, targets, 22)
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_policy(mut self, policy: StopPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Checks that the problem is well formed.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_INPUTS).contains(&self.inputs) {
            return Err(ChainError::InvalidInputs {
                inputs: self.inputs,
            });
        }
        if self.seeds.is_empty() {
            return Err(ChainError::NoSeeds);
        }
        if self.targets.is_empty() {
            return Err(ChainError::NoTargets);
        }

        let mut seen = HashSet::new();
        for &f in self.seeds.iter().chain(&self.targets) {
            if f.inputs() != self.inputs {
                return Err(ChainError::ArityMismatch {
                    function: f,
                    expected: self.inputs,
                    found: f.inputs(),
                });
            }
        }
        for &f in &self.seeds {
            if !seen.insert(f) {
                return Err(ChainError::DuplicateSeed(f));
            }
        }
        for &t in &self.targets {
            if t.is_zero() {
                return Err(ChainError::ConstantTarget(t));
            }
        }

        if self.max_length < self.seeds.len() {
            return Err(ChainError::MaxLengthTooSmall {
                max_length: self.max_length,
                seeds: self.seeds.len(),
            });
        }
        Ok(())
    }
}
