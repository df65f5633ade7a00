use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use test_log::test;

use boolean_chains::chain::Chain;
use boolean_chains::config::{SearchConfig, SearchMode, StopPolicy};
use boolean_chains::cost::CostTable;
use boolean_chains::expression::Operator;
use boolean_chains::function::Function;
use boolean_chains::resume::ResumeCursor;
use boolean_chains::search::{Outcome, SearchContext, SearchObserver, SearchReport};

fn three_input_problem() -> SearchConfig {
    // Full adder: sum and carry.
    let (a, b, c) = (0x0F, 0x33, 0x55);
    let sum = Function::new(3, a ^ b ^ c);
    let carry = Function::new(3, (a & b) | (c & (a ^ b)));
    SearchConfig::new(3, vec![sum, carry], 8)
}

fn run(config: SearchConfig, cursor: ResumeCursor) -> SearchReport {
    SearchContext::new(config)
        .unwrap()
        .with_cursor(cursor)
        .run()
        .unwrap()
}

/// Choice vectors of the solutions of length `length`.
fn paths_of_length(reports: &[SearchReport], length: usize) -> BTreeSet<Vec<usize>> {
    reports
        .iter()
        .flat_map(|r| r.solutions.iter())
        .filter(|s| s.len() == length)
        .map(|s| s.choices.clone())
        .collect()
}

#[test]
fn test_two_input_and() {
    let target = Function::new(2, 0b1000);
    let mut config = SearchConfig::new(2, vec![target], 4);
    config.seeds = vec![Function::new(2, 0b1100), Function::new(2, 0b1010)];

    let chain = Chain::with_seeds(config.seeds.clone(), [target]);
    let table: CostTable = CostTable::compute(&chain);
    assert_eq!(table.cost(target), Some(1));

    let report = run(config, ResumeCursor::default());
    assert_eq!(report.best_length, Some(3));
    assert_eq!(report.solutions.len(), 1);
}

#[test]
fn test_parity_of_four() {
    let parity = Function::new(4, 0x6996);
    let config = SearchConfig::new(4, vec![parity], 7);

    let chain = Chain::with_seeds(config.seeds.clone(), [parity]);
    let table: CostTable = CostTable::compute(&chain);
    assert!(table.cost(parity).unwrap() <= 3);

    let report = run(config, ResumeCursor::default());
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.best_length, Some(7));
    assert!(!report.solutions.is_empty());
    for solution in &report.solutions {
        for entry in &solution.chain.entries()[4..] {
            assert_eq!(entry.expression.operator(), Some(Operator::Xor));
        }
    }
}

#[test]
fn test_hungry_parity_of_four() {
    let parity = Function::new(4, 0x6996);
    let config = SearchConfig::new(4, vec![parity], 7)
        .with_mode(SearchMode::Hungry { beam: Some(4) })
        .with_policy(StopPolicy::FirstSolution);
    let report = run(config, ResumeCursor::default());
    assert_eq!(report.outcome, Outcome::FirstSolution);
    assert_eq!(report.best_length, Some(7));
}

#[test]
fn test_hungry_agrees_with_exhaustive() {
    let exhaustive = run(three_input_problem(), ResumeCursor::default());
    let hungry = run(
        three_input_problem().with_mode(SearchMode::Hungry { beam: None }),
        ResumeCursor::default(),
    );
    assert_eq!(exhaustive.best_length, Some(8));
    assert_eq!(hungry.best_length, exhaustive.best_length);
}

#[test]
fn test_chunks_reproduce_full_search() {
    let full = run(three_input_problem(), ResumeCursor::default());
    let best = full.best_length.unwrap();
    let expected = paths_of_length(std::slice::from_ref(&full), best);
    assert_eq!(expected.len(), full.solutions.len());

    for depth in [1, 2] {
        let plan = SearchContext::new(three_input_problem())
            .unwrap()
            .plan(depth)
            .unwrap()
            .prefixes;
        assert!(!plan.is_empty());
        assert!(plan.windows(2).all(|w| w[0] < w[1]), "plan is not ordered");

        let chunks: Vec<SearchReport> = plan
            .iter()
            .map(|prefix| run(three_input_problem(), ResumeCursor::chunk(prefix.clone())))
            .collect();
        assert!(chunks.iter().all(|r| r.outcome == Outcome::ChunkCompleted));
        for (prefix, report) in plan.iter().zip(&chunks) {
            for solution in &report.solutions {
                assert!(solution.choices.starts_with(prefix));
            }
        }

        let chunk_best = chunks.iter().filter_map(|r| r.best_length).min();
        assert_eq!(chunk_best, Some(best));
        assert_eq!(paths_of_length(&chunks, best), expected, "depth {}", depth);
    }
}

#[test]
fn test_resume_matches_later_chunks() {
    let plan = SearchContext::new(three_input_problem())
        .unwrap()
        .plan(1)
        .unwrap()
        .prefixes;
    assert!(plan.len() >= 2);
    let start = plan[plan.len() / 2][0];

    let resumed = run(three_input_problem(), ResumeCursor::resume(vec![start]));
    assert_eq!(resumed.outcome, Outcome::Completed);

    let chunks: Vec<SearchReport> = plan
        .iter()
        .filter(|prefix| prefix[0] >= start)
        .map(|prefix| run(three_input_problem(), ResumeCursor::chunk(prefix.clone())))
        .collect();
    let best = chunks.iter().filter_map(|r| r.best_length).min();
    assert_eq!(resumed.best_length, best);

    if let Some(best) = best {
        let resumed_paths = paths_of_length(std::slice::from_ref(&resumed), best);
        assert_eq!(resumed_paths, paths_of_length(&chunks, best));
        assert!(resumed_paths.iter().all(|p| p[0] >= start));
    }
}

#[test]
fn test_resume_at_solution_finds_it_first() {
    let full = run(three_input_problem(), ResumeCursor::default());
    let last = full.solutions.last().unwrap();
    let resumed = run(
        three_input_problem().with_policy(StopPolicy::FirstSolution),
        ResumeCursor::resume(last.choices.clone()),
    );
    assert_eq!(resumed.solutions[0].choices, last.choices);
}

#[test]
fn test_interrupt_from_another_thread() {
    let mut search = SearchContext::new(SearchConfig::seven_segment()).unwrap();
    let stop = search.stop_flag();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        stop.store(true, Ordering::Relaxed);
    });

    let report = search.run().unwrap();
    handle.join().unwrap();

    assert_eq!(report.outcome, Outcome::Interrupted);
    assert!(report.stats.nodes > 1);
    assert_eq!(search.chain().len(), 4);
    let best = report.best_length.unwrap_or(usize::MAX);
    assert!(report.solutions.iter().all(|s| s.len() == best));
}

/// Raises the stop flag once the first solution is seen.
struct StopAfterFirst {
    stop: Arc<AtomicBool>,
}

impl SearchObserver for StopAfterFirst {
    fn on_solution(&mut self, _chain: &Chain, _choices: &[usize], _improved: bool) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[test]
fn test_resume_from_stop_position_loses_nothing() {
    let full = run(three_input_problem(), ResumeCursor::default());
    let best = full.best_length.unwrap();
    assert!(full.solutions.len() >= 2);

    let mut search = SearchContext::new(three_input_problem()).unwrap();
    let mut observer = StopAfterFirst {
        stop: search.stop_flag(),
    };
    let first = search.run_with(&mut observer).unwrap();
    assert_eq!(first.outcome, Outcome::Interrupted);
    assert_eq!(first.solutions.len(), 1);
    let stopped_at = first.stopped_at.clone().unwrap();
    assert!(stopped_at > first.solutions[0].choices);

    let rest = run(three_input_problem(), ResumeCursor::resume(stopped_at));
    assert_eq!(rest.outcome, Outcome::Completed);
    assert_eq!(rest.stopped_at, None);
    assert_eq!(
        paths_of_length(&[first, rest], best),
        paths_of_length(std::slice::from_ref(&full), best)
    );
}
