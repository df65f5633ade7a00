//! # boolean-chains: minimal Boolean chains in Rust
//!
//! **`boolean-chains`** searches for the shortest *Boolean chain* computing a set of target
//! functions.
//!
//! ## What is a Boolean chain?
//!
//! A Boolean chain is a straight-line program over truth tables. It starts with a few given
//! functions (usually the input variables), and every further step combines two earlier
//! entries with one of five binary operators: AND, OR, XOR, AND-NOT and NOT-AND. A chain
//! *computes* a target if the target's truth table appears among its entries. The length of
//! the shortest chain computing a function is a measure of its circuit complexity.
//!
//! ## Key Features
//!
//! - **Exhaustive search**: a depth-first branch-and-bound enumeration with canonical
//!   ordering, so each set of steps is tried once.
//! - **Resumable**: every node is addressed by its *choices* vector, which can resume an
//!   interrupted search or split it into independent chunks.
//! - **Cost engine**: Knuth's Algorithm L with footprints ranks the candidate steps in
//!   *hungry* mode.
//!
//! ## Basic Usage
//!
//! ```rust
//! use boolean_chains::config::SearchConfig;
//! use boolean_chains::function::Function;
//! use boolean_chains::search::SearchContext;
//!
//! // Parity of three variables, over the projections 0x0F, 0x33 and 0x55.
//! let parity = Function::new(3, 0x69);
//! let config = SearchConfig::new(3, vec![parity], 6);
//!
//! let mut search = SearchContext::new(config).unwrap();
//! let report = search.run().unwrap();
//!
//! // Three inputs plus two XOR steps.
//! assert_eq!(report.best_length, Some(5));
//! println!("{}", report.solutions[0].chain);
//! ```
//!
//! ## Core Components
//!
//! - **[`search`]**: the [`SearchContext`][crate::search::SearchContext] and the search itself.
//! - **[`cost`]**: the cost and footprint tables.
//! - **[`chain`]**, **[`function`]**, **[`expression`]**: the data model.

pub mod bitset;
pub mod candidates;
pub mod chain;
pub mod config;
pub mod cost;
pub mod error;
pub mod expression;
pub mod function;
pub mod resume;
pub mod search;
pub mod stats;
