//! CLI entry point for the water sort solver.
//!
//! Usage:
//!   water-sort-solver solve <puzzle.json> [options]
//!   water-sort-solver solve --stdin [options]
//!   water-sort-solver demo [options]
//!   water-sort-solver verify <puzzle.json> --moves <moves.json>
//!
//! Options:
//!   --format <json|text>  Output format (default: json)
//!   --no-prune            Also try pours between two sorted tubes
//!   -v, --verbose         Log search progress to stderr

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use water_sort_solver::{
    execute, solve_with_config, Move, PuzzleConfig, SearchOutcome, SolverConfig, SolverResult,
};

#[derive(Parser)]
#[command(name = "water-sort-solver")]
#[command(about = "Exhaustive depth-first solver for water sort puzzles")]
#[command(version)]
struct Cli {
    /// Log search progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a puzzle file
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Also try pours between two sorted tubes
        #[arg(long)]
        no_prune: bool,
    },

    /// Solve the built-in reference puzzle
    Demo {
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Also try pours between two sorted tubes
        #[arg(long)]
        no_prune: bool,
    },

    /// Replay a move list against a puzzle and check that it sorts every tube
    Verify {
        /// Path to puzzle JSON file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to a JSON list of moves, e.g. [{"from": 0, "to": 2}]
        #[arg(long, value_name = "MOVES")]
        moves: PathBuf,
    },
}

/// Output format for a solve run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<Move>>,
    states_visited: usize,
    duplicates_pruned: usize,
    max_depth: usize,
    time_elapsed_ms: u64,
}

/// Output format for a verify run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOutput {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves_applied: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Returns whether the puzzle was solved (or the move list verified)
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Solve {
            file,
            stdin,
            format,
            no_prune,
        } => {
            let json_content = read_input(file.as_deref(), stdin)?;
            let puzzle: PuzzleConfig =
                serde_json::from_str(&json_content).context("Error parsing puzzle JSON")?;
            solve_puzzle(&puzzle, format, no_prune)
        }
        Commands::Demo { format, no_prune } => {
            let puzzle =
                PuzzleConfig::reference().context("Error parsing built-in reference puzzle")?;
            solve_puzzle(&puzzle, format, no_prune)
        }
        Commands::Verify { file, moves } => {
            let json_content = read_input(Some(file.as_path()), false)?;
            let puzzle: PuzzleConfig =
                serde_json::from_str(&json_content).context("Error parsing puzzle JSON")?;
            let moves_content = read_input(Some(moves.as_path()), false)?;
            let moves: Vec<Move> =
                serde_json::from_str(&moves_content).context("Error parsing moves JSON")?;

            let output = verify_moves(&puzzle, &moves)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(output.valid)
        }
    }
}

fn read_input(file: Option<&Path>, stdin: bool) -> Result<String> {
    if stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if let Some(path) = file {
        fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
    } else {
        bail!("Must provide either a file path or --stdin")
    }
}

fn solve_puzzle(puzzle: &PuzzleConfig, format: OutputFormat, no_prune: bool) -> Result<bool> {
    let initial = puzzle.initial_state()?;
    info!(
        "solving {:?} with {} tubes",
        puzzle.id,
        initial.tube_count()
    );

    let config = SolverConfig {
        prune_sorted_pairs: !no_prune,
    };
    let result = solve_with_config(&initial, &config);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&format_result(&result))?)
        }
        OutputFormat::Text => print!("{}", render_text(&result)),
    }
    Ok(result.outcome.is_solved())
}

fn verify_moves(puzzle: &PuzzleConfig, moves: &[Move]) -> Result<VerifyOutput> {
    let initial = puzzle.initial_state()?;
    let output = match execute(&initial, moves) {
        Ok(result) => VerifyOutput {
            valid: result.finished,
            moves_applied: Some(result.moves_applied),
            reason: (!result.finished).then(|| "tubes not sorted after the last move".to_string()),
        },
        Err(e) => VerifyOutput {
            valid: false,
            moves_applied: None,
            reason: Some(e.to_string()),
        },
    };
    Ok(output)
}

fn format_result(result: &SolverResult) -> SolveOutput {
    let moves = result.outcome.moves().map(<[Move]>::to_vec);
    SolveOutput {
        solved: result.outcome.is_solved(),
        move_count: moves.as_ref().map(Vec::len),
        moves,
        states_visited: result.stats.states_visited,
        duplicates_pruned: result.stats.duplicates_pruned,
        max_depth: result.stats.max_depth,
        time_elapsed_ms: result.time_elapsed_ms,
    }
}

fn render_text(result: &SolverResult) -> String {
    match &result.outcome {
        SearchOutcome::NoSolution => "No solution found.\n".to_string(),
        SearchOutcome::Solved(moves) => {
            let mut out = format!("Solvable in {} moves:\n", moves.len());
            for mv in moves {
                out.push_str(&format!("{}\n", mv));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use water_sort_solver::{Color, GameState};

    fn two_color_puzzle() -> PuzzleConfig {
        PuzzleConfig {
            id: "two-colors".to_string(),
            title: String::new(),
            tubes: vec![
                vec![Color::Red, Color::Blue, Color::Red, Color::Blue],
                vec![Color::Blue, Color::Red, Color::Blue, Color::Red],
                vec![],
            ],
        }
    }

    #[test]
    fn test_render_text() {
        let initial = GameState::from_colors(vec![vec![Color::Red; 3], vec![Color::Red]]).unwrap();
        let result = solve_with_config(&initial, &SolverConfig::default());
        assert_eq!(render_text(&result), "Solvable in 1 moves:\n0 -> 1\n");

        let stuck = GameState::from_colors(vec![vec![Color::Red, Color::Blue]]).unwrap();
        let result = solve_with_config(&stuck, &SolverConfig::default());
        assert_eq!(render_text(&result), "No solution found.\n");
    }

    #[test]
    fn test_format_result_json() {
        let initial = two_color_puzzle().initial_state().unwrap();
        let result = solve_with_config(&initial, &SolverConfig::default());
        let value = serde_json::to_value(format_result(&result)).unwrap();

        assert_eq!(value["solved"], true);
        assert_eq!(value["moveCount"], 7);
        assert_eq!(value["moves"][0]["from"], 0);
        assert_eq!(value["moves"][0]["to"], 2);
    }

    #[test]
    fn test_verify_moves() {
        let puzzle = two_color_puzzle();
        let moves: Vec<Move> = serde_json::from_str(
            r#"[{"from":0,"to":2},{"from":1,"to":0},{"from":1,"to":2},{"from":0,"to":1},
                {"from":0,"to":2},{"from":1,"to":0},{"from":1,"to":2}]"#,
        )
        .unwrap();
        let output = verify_moves(&puzzle, &moves).unwrap();
        assert!(output.valid);
        assert_eq!(output.moves_applied, Some(7));

        let output = verify_moves(&puzzle, &moves[..2]).unwrap();
        assert!(!output.valid);
        assert!(output.reason.is_some());

        let output = verify_moves(&puzzle, &[Move::new(0, 9)]).unwrap();
        assert!(!output.valid);
        assert_eq!(output.moves_applied, None);
    }
}
