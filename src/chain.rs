//! The chain under construction.
//!
//! A [`Chain`] is an ordered list of distinct functions. The first entries are constants
//! (the seeds); every later entry combines two earlier ones. The search grows and shrinks the
//! chain strictly as a stack: every [`Chain::add`] is undone by exactly one
//! [`Chain::remove_last`] in LIFO order.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::expression::Expression;
use crate::function::Function;

/// One position of a chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChainEntry {
    pub index: usize,
    pub function: Function,
    pub expression: Expression,
}

impl ChainEntry {
    pub fn new(index: usize, expression: Expression) -> Self {
        Self {
            index,
            function: expression.evaluate(),
            expression,
        }
    }

    /// Symbolic name of the entry, `x1` for the first one.
    pub fn name(&self) -> String {
        format!("x{}", self.index + 1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chain {
    entries: Vec<ChainEntry>,
    lookup: HashMap<Function, usize>,
    targets: Vec<Function>,
    target_lookup: HashSet<Function>,
}

impl Chain {
    pub fn new(targets: impl IntoIterator<Item = Function>) -> Self {
        let mut chain = Self::default();
        for f in targets {
            chain.add_target(f);
        }
        chain
    }

    /// Creates a chain holding the given seeds as constants.
    pub fn with_seeds(
        seeds: impl IntoIterator<Item = Function>,
        targets: impl IntoIterator<Item = Function>,
    ) -> Self {
        let mut chain = Self::new(targets);
        for f in seeds {
            chain.add(Expression::Constant(f));
        }
        chain
    }

    pub fn add_target(&mut self, f: Function) {
        if self.target_lookup.insert(f) {
            self.targets.push(f);
        }
    }

    /// Appends the value of `expr` and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if the value is already part of the chain.
    pub fn add(&mut self, expr: Expression) -> usize {
        let index = self.entries.len();
        let entry = ChainEntry::new(index, expr);
        if let Some(previous) = self.lookup.insert(entry.function, index) {
            panic!(
                "function {} is already in the chain at x{}",
                entry.function,
                previous + 1
            );
        }
        self.entries.push(entry);
        index
    }

    /// Removes the most recently added entry.
    pub fn remove_last(&mut self) -> Option<ChainEntry> {
        let entry = self.entries.pop()?;
        self.lookup.remove(&entry.function);
        Some(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ChainEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&ChainEntry> {
        self.entries.last()
    }

    /// Values of all entries in chain order.
    pub fn functions(&self) -> impl Iterator<Item = Function> + '_ {
        self.entries.iter().map(|e| e.function)
    }

    pub fn contains(&self, f: Function) -> bool {
        self.lookup.contains_key(&f)
    }

    pub fn index_of(&self, f: Function) -> Option<usize> {
        self.lookup.get(&f).copied()
    }

    pub fn targets(&self) -> &[Function] {
        &self.targets
    }

    pub fn is_target(&self, f: Function) -> bool {
        self.target_lookup.contains(&f)
    }

    /// Number of targets currently present in the chain.
    pub fn fulfilled_targets(&self) -> usize {
        self.targets.iter().filter(|&&t| self.contains(t)).count()
    }

    pub fn is_complete(&self) -> bool {
        self.fulfilled_targets() == self.targets.len()
    }

    /// Name of the entry holding `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f` is not in the chain: expressions only ever refer to earlier entries.
    pub fn name_of(&self, f: Function) -> String {
        match self.lookup.get(&f) {
            Some(&index) => self.entries[index].name(),
            None => panic!("function {} is not part of the chain", f),
        }
    }

    /// One trace line, e.g. `x5 = x1 & x2 = 0000000000001111 [target]`.
    pub fn render_entry(&self, entry: &ChainEntry) -> String {
        let name = entry.name();
        let is_target = if self.is_target(entry.function) {
            " [target]"
        } else {
            ""
        };
        match entry.expression {
            Expression::Constant(f) => format!("{name} = {f}{is_target}"),
            Expression::Binary(op, g, h) => format!(
                "{name} = {} {} {} = {}{is_target}",
                self.name_of(g),
                op,
                self.name_of(h),
                entry.function
            ),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "chain ({}):", self.len())?;
        for entry in &self.entries {
            writeln!(f, "  {}", self.render_entry(entry))?;
        }
        Ok(())
    }
}
