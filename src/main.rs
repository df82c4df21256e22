//! Lazor Puzzle Solver
//!
//! Loads a `.bff` puzzle, searches block placements until every target point
//! is lit by a laser, and prints (optionally renders) the solved board.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::LazyLock;
use std::time::Instant;

use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use lazor::grid::format_board;
use lazor::tracer::DEFAULT_STEP_BUDGET;
use lazor::{bff, render, Board, Outcome, Puzzle, Solution, Solver, SolverConfig, Tracer};

/// Places blocks on a Lazor grid so every target is lit.
#[derive(Parser)]
#[command(name = "lazor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for a placement that lights every target.
    Solve(SolveArgs),
    /// Print the puzzle summary, board and placeable cells.
    Inspect {
        /// Puzzle file (.bff)
        puzzle: PathBuf,
    },
    /// Print how many candidate placements the puzzle has.
    Count {
        /// Puzzle file (.bff)
        puzzle: PathBuf,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// Puzzle file (.bff)
    puzzle: PathBuf,

    /// Give up after evaluating this many candidates
    #[arg(short, long)]
    max_attempts: Option<u64>,

    /// Worker threads; more than one races workers over disjoint candidates
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Lattice steps allowed per laser trace
    #[arg(long, default_value_t = DEFAULT_STEP_BUDGET)]
    step_budget: usize,

    /// Write a PNG of the solved board to this path
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,
}

/// Exit status when the search ran but found nothing.
const EXIT_UNSOLVED: u8 = 1;
/// Exit status for unreadable or invalid puzzles.
const EXIT_LOAD_ERROR: u8 = 2;
/// Exit status for aborted searches and render failures.
const EXIT_RUNTIME_ERROR: u8 = 3;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, eta {eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Solve(args) => run_solve(args),
        Command::Inspect { puzzle } => run_inspect(&puzzle),
        Command::Count { puzzle } => run_count(&puzzle),
    }
}

/// Installs a stderr subscriber; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints an error and its source chain to stderr.
fn report(context: &str, error: &dyn Error) {
    eprintln!("{context}: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}

fn load(path: &Path) -> Result<Puzzle, ExitCode> {
    bff::load(path).map_err(|error| {
        report("Failed to load puzzle", &error);
        ExitCode::from(EXIT_LOAD_ERROR)
    })
}

/// Summarises the puzzle inputs and search space.
fn describe_puzzle(puzzle: &Puzzle) -> String {
    let grid = puzzle.grid();
    let targets: Vec<String> = puzzle.targets().iter().map(|t| t.to_string()).collect();
    format!(
        "Grid: {} rows x {} columns\nBlocks: {}\nLasers: {}\nTargets: {}\nCandidates: {}\n",
        grid.rows(),
        grid.columns(),
        puzzle.inventory(),
        puzzle.lasers().len(),
        targets.join(" "),
        puzzle.candidate_count()
    )
}

fn format_solution(solution: &Solution) -> String {
    format!(
        "Solved after {} attempts:\n{}",
        solution.attempts,
        format_board(&solution.grid)
    )
}

fn progress_bar(puzzle: &Puzzle, max_attempts: Option<u64>) -> ProgressBar {
    let total = u64::try_from(puzzle.candidate_count()).unwrap_or(u64::MAX);
    let length = max_attempts.map_or(total, |cap| cap.min(total));
    let bar = ProgressBar::new(length);
    bar.set_style(PROGRESS_STYLE.clone());
    bar
}

/// Solves the puzzle, verifies and prints the result, optionally rendering it.
fn run_solve(args: SolveArgs) -> ExitCode {
    let puzzle = match load(&args.puzzle) {
        Ok(puzzle) => puzzle,
        Err(code) => return code,
    };
    print!("{}", describe_puzzle(&puzzle));

    let config = SolverConfig::default()
        .with_max_attempts(args.max_attempts)
        .with_step_budget(args.step_budget)
        .with_workers(args.workers);
    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        progress_bar(&puzzle, args.max_attempts)
    };

    let started = Instant::now();
    let outcome = match Solver::new(&puzzle, config).with_progress(progress).solve() {
        Ok(outcome) => outcome,
        Err(error) => {
            report("Search aborted", &error);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };
    let elapsed = started.elapsed();

    let solution = match outcome {
        Outcome::Solved(solution) => solution,
        Outcome::Exhausted { attempts } => {
            println!("\nNo solution: all {attempts} candidates rejected ({elapsed:.2?})");
            return ExitCode::from(EXIT_UNSOLVED);
        }
        Outcome::CapReached { attempts } => {
            println!("\nNo solution within {attempts} attempts; search incomplete ({elapsed:.2?})");
            return ExitCode::from(EXIT_UNSOLVED);
        }
    };

    println!("\n{}", format_solution(&solution));
    println!("Elapsed: {elapsed:.2?}");

    match puzzle.missed_targets(&solution.grid, &Tracer::new(config.step_budget)) {
        Ok(missed) if missed.is_empty() => println!("Verified: every target is lit"),
        Ok(missed) => {
            let missed: Vec<String> = missed.iter().map(|p| p.to_string()).collect();
            eprintln!("Verification failed, missed targets: {}", missed.join(" "));
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
        Err(error) => {
            report("Verification aborted", &error);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }

    if let Some(path) = args.image {
        let rendered = render::render_png(
            &solution.grid,
            puzzle.lasers(),
            &solution.traces,
            puzzle.targets(),
            &path,
        );
        if let Err(error) = rendered {
            report("Failed to render solution", &error);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
        println!("Wrote {}", path.display());
    }

    ExitCode::SUCCESS
}

/// Prints the puzzle summary, board and the cells blocks may go in.
fn run_inspect(path: &Path) -> ExitCode {
    let puzzle = match load(path) {
        Ok(puzzle) => puzzle,
        Err(code) => return code,
    };
    print!("{}", describe_puzzle(&puzzle));
    println!("\n{}", format_board(puzzle.grid()));

    let slots: Vec<String> = puzzle
        .grid()
        .placeable_cells()
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    println!("Placeable cells: {}", slots.join(" "));
    ExitCode::SUCCESS
}

/// Prints the number of candidate placements.
fn run_count(path: &Path) -> ExitCode {
    match load(path) {
        Ok(puzzle) => {
            println!("{} candidates", puzzle.candidate_count());
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORNERS: &str = include_str!("../puzzles/corners.bff");

    #[test]
    fn test_solution_report_snapshot() {
        let puzzle = bff::parse(CORNERS).unwrap();
        let outcome = Solver::new(&puzzle, SolverConfig::default()).solve().unwrap();
        let solution = outcome.solution().unwrap();

        let output = format!("{}\n{}", describe_puzzle(&puzzle), format_solution(solution));
        insta::assert_snapshot!(output, @r"
        Grid: 3 rows x 3 columns
        Blocks: A=0 B=3 C=0
        Lasers: 2
        Targets: (3, 2) (3, 4)
        Candidates: 84

        Solved after 32 attempts:
        o B B
        o o o
        B o o
        ");
    }

    #[test]
    fn test_cli_parses_solve_flags() {
        let cli = Cli::try_parse_from([
            "lazor", "-vv", "solve", "puzzle.bff", "--max-attempts", "50", "-w", "4", "-q",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Solve(args) => {
                assert_eq!(args.max_attempts, Some(50));
                assert_eq!(args.workers, 4);
                assert_eq!(args.step_budget, DEFAULT_STEP_BUDGET);
                assert!(args.quiet);
                assert!(args.image.is_none());
            }
            _ => panic!("expected the solve subcommand"),
        }
    }
}
