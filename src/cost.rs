//! Knuth's Algorithm L over a chain snapshot.
//!
//! [`CostTable`] runs the footprint variant: every function gets a cost (the number of
//! additional steps after the chain that produce it) and a footprint, the set of first
//! steps that some chain of that cost starts with. Two operands whose footprints overlap
//! can share that first step, which saves one step.
//!
//! The costs are upper bounds on the exact cost of a function. Costs 0 and 1 are exact:
//! level 1 is precisely the set of functions reachable in one step.
//!
//! [`FormulaLengths`] runs the plain recurrence without footprints, which yields the minimal
//! formula (tree) length of every function together with one witnessing expression.

use std::collections::HashMap;

use log::debug;

use crate::bitset::{BitSet, IndexSet};
use crate::candidates::CandidateGenerator;
use crate::chain::Chain;
use crate::expression::{Expression, Operator};
use crate::function::Function;

/// Cost of a function that has not been reached.
pub const INFINITY: u32 = u32::MAX;

/// Result of Algorithm L with footprints.
///
/// The footprint backend is generic; the dense [`BitSet`] is the default.
#[derive(Debug, Clone)]
pub struct CostTable<S = BitSet> {
    costs: Vec<u32>,
    footprints: Vec<S>,
    levels: Vec<Vec<Function>>,
    first_expressions: Vec<Expression>,
    first_index: HashMap<Function, usize>,
    /// Number of operand pairs combined in each round.
    tries: Vec<u64>,
    unknown: usize,
}

impl<S: IndexSet> CostTable<S> {
    /// Runs Algorithm L rooted at `chain`, whose entries all count as cost 0.
    ///
    /// The computation stops early once every target of the chain has a finite cost.
    ///
    /// # Panics
    ///
    /// Panics if the chain is empty.
    pub fn compute(chain: &Chain) -> Self {
        let first = chain.get(0).expect("cannot compute costs of an empty chain");
        let size = Function::space_size(first.function.inputs());

        let mut table = Self {
            costs: vec![INFINITY; size],
            footprints: vec![S::default(); size],
            levels: vec![Vec::new(), Vec::new()],
            first_expressions: Vec::new(),
            first_index: HashMap::new(),
            tries: vec![0, 0],
            unknown: size,
        };

        // The constant false function is never a useful step.
        table.costs[0] = 0;
        table.unknown -= 1;

        // L1. Initialize.
        for f in chain.functions() {
            if table.costs[f.index()] == INFINITY {
                table.unknown -= 1;
            }
            table.costs[f.index()] = 0;
            table.levels[0].push(f);
        }

        let mut excluded = BitSet::empty();
        excluded.insert(0);
        for (i, expr) in CandidateGenerator::new()
            .generate(chain, &excluded)
            .into_iter()
            .enumerate()
        {
            let f = expr.evaluate();
            table.costs[f.index()] = 1;
            table.footprints[f.index()].insert(i);
            table.levels[1].push(f);
            table.first_index.insert(f, i);
            table.first_expressions.push(expr);
            table.unknown -= 1;
        }
        table.tries[1] = (chain.len() * chain.len().saturating_sub(1) / 2) as u64;

        // L2. Loop over r = 2, 3, ...
        let mut r = 2;
        while !table.is_done(chain, r) {
            table.round(r);
            r += 1;
        }

        debug!(
            "algorithm L: {} rounds, level sizes {:?}, {} unknown",
            r - 1,
            table.level_sizes(),
            table.unknown
        );
        table
    }

    fn is_done(&self, chain: &Chain, r: usize) -> bool {
        if self.unknown == 0 {
            return true;
        }
        let targets = chain.targets();
        if !targets.is_empty() && targets.iter().all(|&t| self.costs[t.index()] != INFINITY) {
            return true;
        }
        // Round r combines levels j <= k with j + k = r - 1.
        let top = self.levels.iter().rposition(|l| !l.is_empty()).unwrap_or(0);
        r - 1 > 2 * top
    }

    fn round(&mut self, r: usize) {
        while self.levels.len() <= r {
            self.levels.push(Vec::new());
        }
        while self.tries.len() <= r {
            self.tries.push(0);
        }

        // L3. Loop over j = [(r-1)/2], ..., 0 and k = r - 1 - j.
        for j in (0..=(r - 1) / 2).rev() {
            let k = r - 1 - j;

            // L4. Loop over all g in level j and h in level k.
            // Lists may grow (and shrink) while they are scanned, so the bounds are re-read.
            let mut gi = 0;
            while gi < self.levels[j].len() {
                let g = self.levels[j][gi];
                let mut hi = if j == k { gi + 1 } else { 0 };
                while hi < self.levels[k].len() {
                    let h = self.levels[k][hi];
                    self.tries[r] += 1;

                    let mut v = self.footprints[g.index()].clone();
                    let fh = &self.footprints[h.index()];
                    let u = if v.is_disjoint(fh) {
                        v.union_with(fh);
                        r as u32
                    } else {
                        v.intersect_with(fh);
                        r as u32 - 1
                    };

                    // L5. Loop over all results f.
                    for op in Operator::ALL {
                        self.update(op.apply(g, h), u, &v);
                    }
                    hi += 1;
                }
                gi += 1;
            }
        }
    }

    fn update(&mut self, f: Function, u: u32, v: &S) {
        let i = f.index();
        let current = self.costs[i];
        if current == INFINITY {
            self.costs[i] = u;
            self.footprints[i] = v.clone();
            self.levels[u as usize].push(f);
            self.unknown -= 1;
        } else if current > u {
            let old = &mut self.levels[current as usize];
            if let Some(pos) = old.iter().position(|&x| x == f) {
                old.remove(pos);
            }
            self.levels[u as usize].push(f);
            self.costs[i] = u;
            self.footprints[i] = v.clone();
        } else if current == u {
            self.footprints[i].union_with(v);
        }
    }

    /// Cost of `f`, or `None` if it was not reached.
    pub fn cost(&self, f: Function) -> Option<u32> {
        match self.costs[f.index()] {
            INFINITY => None,
            c => Some(c),
        }
    }

    /// Costs indexed by truth table; unreached functions hold [`INFINITY`].
    pub fn costs(&self) -> &[u32] {
        &self.costs
    }

    pub fn footprint(&self, f: Function) -> &S {
        &self.footprints[f.index()]
    }

    /// Functions currently assigned cost `r`.
    pub fn level(&self, r: usize) -> &[Function] {
        match self.levels.get(r) {
            Some(level) => level,
            None => &[],
        }
    }

    pub fn level_sizes(&self) -> Vec<usize> {
        self.levels.iter().map(Vec::len).collect()
    }

    /// The level-1 expressions, in candidate generation order.
    ///
    /// Footprints hold indices into this list.
    pub fn first_expressions(&self) -> &[Expression] {
        &self.first_expressions
    }

    /// Position of a level-1 function in [`first_expressions`][Self::first_expressions].
    pub fn first_index(&self, f: Function) -> Option<usize> {
        self.first_index.get(&f).copied()
    }

    /// Number of operand pairs combined in round `r`.
    pub fn tries(&self, r: usize) -> u64 {
        self.tries.get(r).copied().unwrap_or(0)
    }

    /// Number of functions without a finite cost.
    pub fn unknown(&self) -> usize {
        self.unknown
    }
}

/// Minimal formula lengths (plain Algorithm L).
#[derive(Debug, Clone)]
pub struct FormulaLengths {
    lengths: Vec<u32>,
    witnesses: Vec<Option<Expression>>,
    levels: Vec<Vec<Function>>,
}

impl FormulaLengths {
    /// Runs the recurrence rooted at `chain`, stopping early once all targets are known.
    pub fn compute(chain: &Chain) -> Self {
        let first = chain.get(0).expect("cannot compute lengths of an empty chain");
        let size = Function::space_size(first.function.inputs());

        let mut lengths = vec![INFINITY; size];
        let mut witnesses = vec![None; size];
        let mut levels: Vec<Vec<Function>> = vec![Vec::new()];
        let mut unknown = size - 1;
        lengths[0] = 0;
        for f in chain.functions() {
            if lengths[f.index()] == INFINITY {
                unknown -= 1;
            }
            lengths[f.index()] = 0;
            levels[0].push(f);
        }

        let targets = chain.targets();
        for r in 1.. {
            let top = levels.iter().rposition(|l| !l.is_empty()).unwrap_or(0);
            let targets_known =
                !targets.is_empty() && targets.iter().all(|t| lengths[t.index()] != INFINITY);
            if unknown == 0 || targets_known || r - 1 > 2 * top {
                break;
            }
            levels.push(Vec::new());

            for j in 0..r {
                let k = r - 1 - j;
                if k < j {
                    break;
                }
                for gi in 0..levels[j].len() {
                    let start = if j == k { gi + 1 } else { 0 };
                    for hi in start..levels[k].len() {
                        let (g, h) = (levels[j][gi], levels[k][hi]);
                        for op in Operator::ALL {
                            let expr = Expression::binary(op, g, h);
                            let f = expr.evaluate();
                            if lengths[f.index()] == INFINITY {
                                lengths[f.index()] = r as u32;
                                witnesses[f.index()] = Some(expr);
                                levels[r].push(f);
                                unknown -= 1;
                            }
                        }
                    }
                }
            }
        }

        Self {
            lengths,
            witnesses,
            levels,
        }
    }

    pub fn length(&self, f: Function) -> Option<u32> {
        match self.lengths[f.index()] {
            INFINITY => None,
            l => Some(l),
        }
    }

    /// The expression that first produced `f`; `None` for seeds and unreached functions.
    pub fn witness(&self, f: Function) -> Option<Expression> {
        self.witnesses[f.index()]
    }

    pub fn level_sizes(&self) -> Vec<usize> {
        self.levels.iter().map(Vec::len).collect()
    }
}
