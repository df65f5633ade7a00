use std::fmt;

/// Running count, sum, minimum and maximum of a series of samples.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub n: u64,
    pub sum: u64,
    pub min: u64,
    pub max: u64,
}

impl Tally {
    pub fn record(&mut self, value: u64) {
        if self.n == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.n += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.sum as f64 / self.n as f64
    }
}

/// Counters collected during a search.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Number of search nodes entered.
    pub nodes: u64,
    /// Number of solutions reported.
    pub solutions: u64,
    /// Number of strictly shorter solutions.
    pub improvements: u64,
    /// Number of candidates per expanded node, by chain length.
    pub branching: Vec<Tally>,
    /// Cost engine level sizes, by cost (hungry mode only).
    pub cost_levels: Vec<Tally>,
    /// Cost engine operand pairs, by round (hungry mode only).
    pub cost_tries: Vec<u64>,
}

impl SearchStats {
    pub fn record_branching(&mut self, length: usize, candidates: usize) {
        if self.branching.len() <= length {
            self.branching.resize(length + 1, Tally::default());
        }
        self.branching[length].record(candidates as u64);
    }

    pub fn record_cost_levels(&mut self, sizes: &[usize], tries: impl IntoIterator<Item = u64>) {
        if self.cost_levels.len() < sizes.len() {
            self.cost_levels.resize(sizes.len(), Tally::default());
        }
        for (tally, &size) in self.cost_levels.iter_mut().zip(sizes) {
            tally.record(size as u64);
        }
        for (r, t) in tries.into_iter().enumerate() {
            if self.cost_tries.len() <= r {
                self.cost_tries.resize(r + 1, 0);
            }
            self.cost_tries[r] += t;
        }
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nodes: {}", self.nodes)?;
        writeln!(
            f,
            "solutions: {} ({} improvements)",
            self.solutions, self.improvements
        )?;

        writeln!(f, "branching:")?;
        writeln!(
            f,
            "  {:>6} {:>12} {:>10} {:>6} {:>6}",
            "length", "nodes", "mean", "min", "max"
        )?;
        for (length, t) in self.branching.iter().enumerate() {
            if t.n == 0 {
                continue;
            }
            writeln!(
                f,
                "  {:>6} {:>12} {:>10.2} {:>6} {:>6}",
                length,
                t.n,
                t.mean(),
                t.min,
                t.max
            )?;
        }

        if !self.cost_levels.is_empty() {
            writeln!(f, "cost levels:")?;
            writeln!(
                f,
                "  {:>4} {:>10} {:>6} {:>6} {:>14}",
                "cost", "mean", "min", "max", "tries"
            )?;
            for (r, t) in self.cost_levels.iter().enumerate() {
                writeln!(
                    f,
                    "  {:>4} {:>10.2} {:>6} {:>6} {:>14}",
                    r,
                    t.mean(),
                    t.min,
                    t.max,
                    self.cost_tries.get(r).copied().unwrap_or(0)
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_tally() {
        let mut t = Tally::default();
        assert_eq!(t.mean(), 0.0);
        for v in [5, 2, 8] {
            t.record(v);
        }
        assert_eq!(t, Tally { n: 3, sum: 15, min: 2, max: 8 });
        assert_eq!(t.mean(), 5.0);
    }

    #[test]
    fn test_branching_and_display() {
        let mut stats = SearchStats::default();
        stats.nodes = 3;
        stats.record_branching(4, 10);
        stats.record_branching(5, 20);
        stats.record_branching(5, 30);
        assert_eq!(stats.branching.len(), 6);
        assert_eq!(stats.branching[5].sum, 50);

        let text = stats.to_string();
        assert!(text.starts_with("nodes: 3\n"));
        assert!(text.contains("branching:"));
        assert!(!text.contains("cost levels:"));

        stats.record_cost_levels(&[4, 10, 3], [0, 6, 40]);
        stats.record_cost_levels(&[5, 12], [0, 10]);
        assert_eq!(stats.cost_levels[0].n, 2);
        assert_eq!(stats.cost_levels[2].n, 1);
        assert_eq!(stats.cost_tries, vec![0, 16, 40]);
        assert!(stats.to_string().contains("cost levels:"));
    }
}
