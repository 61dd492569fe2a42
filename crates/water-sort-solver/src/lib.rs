//! Water sort puzzle solver.
//!
//! This crate provides an exhaustive depth-first solver that either finds
//! a sequence of pours sorting every tube, or proves that none exists.
//! A replay engine checks move lists against a starting board.

pub mod error;
pub mod executor;
pub mod pruning;
pub mod puzzle;
pub mod solver;

// Re-export main types
pub use error::PuzzleError;
pub use executor::{execute, verify_solution, ExecutionResult};
pub use puzzle::{Color, GameState, Move, PuzzleConfig, Tube, REFERENCE_PUZZLE, TUBE_CAPACITY};
pub use solver::{solve, solve_with_config, SearchOutcome, SearchStats, SolverConfig, SolverResult};
