//! Enumeration of the functions one step away from a chain.

use crate::bitset::{BitSet, IndexSet};
use crate::chain::Chain;
use crate::expression::{Expression, Operator};

/// Produces the new functions reachable from a chain in a single step.
///
/// For every pair `j < k` of entries (`j` outer, `k` inner) the operators are applied in
/// [`Operator::ALL`] order. A result is kept if it is not in the chain, not excluded by the
/// caller, and was not produced earlier in the same pass.
#[derive(Debug, Default)]
pub struct CandidateGenerator {
    /// Values produced during the current pass; emptied again before returning.
    scratch: BitSet,
}

impl CandidateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates of `chain`, skipping everything in `excluded`.
    pub fn generate(&mut self, chain: &Chain, excluded: &BitSet) -> Vec<Expression> {
        let mut candidates = Vec::new();
        self.generate_into(chain, excluded, &mut candidates);
        candidates
    }

    /// Like [`generate`][Self::generate], appending to `out` to reuse its allocation.
    pub fn generate_into(&mut self, chain: &Chain, excluded: &BitSet, out: &mut Vec<Expression>) {
        let start = out.len();
        let entries = chain.entries();
        for (j, g) in entries.iter().enumerate() {
            for h in &entries[j + 1..] {
                for op in Operator::ALL {
                    let expr = Expression::binary(op, g.function, h.function);
                    let f = expr.evaluate();
                    if excluded.contains(f.index()) || chain.contains(f) {
                        continue;
                    }
                    if !self.scratch.insert(f.index()) {
                        continue;
                    }
                    out.push(expr);
                }
            }
        }
        for expr in &out[start..] {
            self.scratch.remove(expr.evaluate().index());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use test_log::test;

    use crate::function::Function;

    fn seeds(inputs: u32) -> Chain {
        Chain::with_seeds(Function::projections(inputs), [])
    }

    #[test]
    fn test_two_inputs() {
        let chain = Chain::with_seeds([Function::new(2, 0b1100), Function::new(2, 0b1010)], []);
        let mut gen = CandidateGenerator::new();
        let got: Vec<u32> = gen
            .generate(&chain, &BitSet::empty())
            .iter()
            .map(|e| e.evaluate().bits())
            .collect();
        assert_eq!(got, vec![0b1000, 0b1110, 0b0110, 0b0100, 0b0010]);
    }

    #[test]
    fn test_no_duplicates_no_chain_values() {
        let mut chain = seeds(3);
        let mut gen = CandidateGenerator::new();
        let mut excluded = BitSet::empty();
        excluded.insert(0);

        for _ in 0..3 {
            let candidates = gen.generate(&chain, &excluded);
            assert!(!candidates.is_empty());
            let mut values = HashSet::new();
            for expr in &candidates {
                let f = expr.evaluate();
                assert!(!chain.contains(f), "{} is already in the chain", f);
                assert!(!f.is_zero());
                assert!(values.insert(f), "{} generated twice", f);
            }
            chain.add(candidates[candidates.len() / 2]);
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        // x1 & x2 == x1 when x1 is a subset of x2: the result is skipped, and later
        // duplicates keep the position of the first occurrence.
        let a = Function::new(2, 0b1000);
        let b = Function::new(2, 0b1100);
        let c = Function::new(2, 0b0100);
        let chain = Chain::with_seeds([a, b, c], []);
        let mut gen = CandidateGenerator::new();
        let candidates = gen.generate(&chain, &BitSet::empty());

        // (a, b): a & b = a (in chain), a | b = b (in chain), a ^ b = c (in chain),
        // a > b = 0, a < b = c (in chain).
        assert_eq!(candidates[0], Expression::binary(Operator::AndNot, a, b));
        let zero = Function::zero(2);
        assert_eq!(candidates.iter().filter(|e| e.evaluate() == zero).count(), 1);
    }

    #[test]
    fn test_excluded_values_skipped() {
        let chain = seeds(2);
        let mut gen = CandidateGenerator::new();
        let all = gen.generate(&chain, &BitSet::empty());
        let mut excluded = BitSet::empty();
        excluded.insert(all[0].evaluate().index());
        let rest = gen.generate(&chain, &excluded);
        assert_eq!(rest, all[1..].to_vec());
    }

    #[test]
    fn test_scratch_is_cleaned() {
        let chain = seeds(3);
        let mut gen = CandidateGenerator::new();
        let first = gen.generate(&chain, &BitSet::empty());
        let second = gen.generate(&chain, &BitSet::empty());
        assert_eq!(first, second);
        assert!(gen.scratch.is_empty());
    }
}
