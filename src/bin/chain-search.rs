use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::bail;

use boolean_chains::chain::Chain;
use boolean_chains::config::{SearchConfig, SearchMode, StopPolicy};
use boolean_chains::function::Function;
use boolean_chains::resume::{format_path, ResumeCursor};
use boolean_chains::search::{progress_line, SearchContext, SearchObserver};
use boolean_chains::stats::SearchStats;

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Policy {
    /// Report every chain of the best length.
    AllTies,
    /// Report strictly shorter chains only.
    Improve,
    /// Stop at the first chain found.
    First,
}

impl From<Policy> for StopPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::AllTies => StopPolicy::AllTies,
            Policy::Improve => StopPolicy::Improve,
            Policy::First => StopPolicy::FirstSolution,
        }
    }
}

/// Searches for minimal Boolean chains.
///
/// Without targets, solves the seven-segment display problem.
#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Resume vector: candidate indices per depth, separated by spaces or commas.
    #[arg(value_name = "INDEX")]
    resume: Vec<String>,

    /// Only search the subtree below the resume vector.
    #[arg(short, long)]
    chunk: bool,

    /// Number of input variables.
    #[arg(long, value_name = "INT", default_value_t = 4)]
    inputs: u32,

    /// Seed function (repeatable); defaults to the input projections.
    #[arg(long = "seed", value_name = "TRUTH-TABLE")]
    seeds: Vec<String>,

    /// Target function (repeatable), as `0x…`, `0b…` or decimal.
    #[arg(long = "target", value_name = "TRUTH-TABLE")]
    targets: Vec<String>,

    /// Longest chain considered, seeds included.
    ///
    /// Defaults to 22 for the seven-segment problem. With `--target`, defaults to
    /// seeds + 2 * targets + 4, which leaves room for two steps per target and four shared ones.
    #[arg(long, value_name = "INT")]
    max_length: Option<usize>,

    /// Rank candidates with the cost engine.
    #[arg(long)]
    hungry: bool,

    /// Keep only the best candidates at each node (hungry mode; makes the search incomplete).
    #[arg(long, value_name = "INT", requires = "hungry")]
    beam: Option<usize>,

    /// Which solutions to report.
    #[arg(long, value_enum, default_value = "all-ties")]
    policy: Policy,

    /// Print the chunk vectors of the given depth instead of searching.
    #[arg(long, value_name = "DEPTH")]
    plan: Option<usize>,

    /// Seconds between progress lines.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    progress_secs: u64,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Prints every solution as soon as it is found.
struct PrintObserver;

impl SearchObserver for PrintObserver {
    fn on_solution(&mut self, chain: &Chain, choices: &[usize], improved: bool) {
        let kind = if improved { "New best" } else { "Tie" };
        println!("{} ({}) at [{}]:", kind, chain.len(), format_path(choices));
        for entry in chain.entries() {
            println!("  {}", chain.render_entry(entry));
        }
        let _ = std::io::stdout().flush();
    }

    fn on_progress(&mut self, choices: &[usize], best: Option<usize>, stats: &SearchStats) {
        println!("{}", progress_line(choices, best, stats));
        let _ = std::io::stdout().flush();
    }
}

fn parse_resume(args: &[String]) -> color_eyre::Result<Vec<usize>> {
    let mut path = Vec::new();
    for arg in args {
        for part in arg.split(|c: char| c == ',' || c.is_whitespace()) {
            if part.is_empty() {
                continue;
            }
            match part.parse::<usize>() {
                Ok(index) => path.push(index),
                Err(e) => bail!("invalid resume index '{}': {}", part, e),
            }
        }
    }
    Ok(path)
}

fn parse_functions(inputs: u32, texts: &[String]) -> color_eyre::Result<Vec<Function>> {
    let mut functions = Vec::new();
    for text in texts {
        functions.push(Function::parse(inputs, text)?);
    }
    Ok(functions)
}

/// Chain length bound used when `--target` is given without `--max-length`.
fn default_max_length(seeds: usize, targets: usize) -> usize {
    seeds + 2 * targets + 4
}

fn build_config(args: &Cli) -> color_eyre::Result<SearchConfig> {
    let mut config = if args.targets.is_empty() {
        if args.inputs != 4 {
            bail!("targets are required for {} inputs", args.inputs);
        }
        SearchConfig::seven_segment()
    } else {
        let targets = parse_functions(args.inputs, &args.targets)?;
        SearchConfig::new(args.inputs, targets, 0)
    };

    if !args.seeds.is_empty() {
        config.seeds = parse_functions(args.inputs, &args.seeds)?;
    }
    config.max_length = match args.max_length {
        Some(max_length) => max_length,
        None if args.targets.is_empty() => config.max_length,
        None => default_max_length(config.seeds.len(), config.targets.len()),
    };
    config.mode = if args.hungry {
        SearchMode::Hungry { beam: args.beam }
    } else {
        SearchMode::Exhaustive
    };
    config.policy = args.policy.into();
    config.progress_interval = Duration::from_secs(args.progress_secs);
    Ok(config)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    let level = if args.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let config = build_config(&args)?;
    println!("inputs = {}", config.inputs);
    println!(
        "seeds = [{}]",
        config.seeds.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
    );
    println!(
        "targets = [{}]",
        config.targets.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
    );
    println!("max length = {}", config.max_length);

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::Relaxed);
        })?;
    }

    let path = parse_resume(&args.resume)?;
    let cursor = if args.chunk {
        ResumeCursor::chunk(path)
    } else {
        ResumeCursor::resume(path)
    };

    let mut search = SearchContext::new(config)?
        .with_cursor(cursor)
        .with_stop_flag(stop);

    if let Some(depth) = args.plan {
        let plan = search.plan_with(depth, &mut PrintObserver)?;
        for prefix in &plan.prefixes {
            println!("{}", format_path(prefix));
        }
        if plan.is_complete() {
            println!("{} chunks", plan.prefixes.len());
        } else {
            println!(
                "incomplete plan ({:?}): {} chunks listed before stopping",
                plan.outcome,
                plan.prefixes.len()
            );
            if let Some(path) = &plan.stopped_at {
                println!("stopped at [{}]", format_path(path));
            }
        }
        return Ok(());
    }

    let report = search.run_with(&mut PrintObserver)?;

    println!();
    println!("outcome: {:?}", report.outcome);
    if let Some(path) = &report.stopped_at {
        println!("resume vector: {}", format_path(path));
    }
    match report.best_length {
        Some(best) => println!(
            "best length: {} ({} chains kept)",
            best,
            report.solutions.len()
        ),
        None => println!("no chain found"),
    }
    print!("{}", report.stats);

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
