//! Move replay.
//!
//! Applies a move list to a copy of an initial state, step by step, so a
//! solution can be checked independently of the search that produced it.

use log::debug;

use crate::error::PuzzleError;
use crate::puzzle::{GameState, Move};

/// Result of replaying a move list
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub final_state: GameState,
    pub moves_applied: usize,
    pub finished: bool,
}

/// Replay `moves` against a copy of `initial`.
///
/// Stops at the first move that names a missing tube or is not a legal
/// pour. The initial state is never modified.
pub fn execute(initial: &GameState, moves: &[Move]) -> Result<ExecutionResult, PuzzleError> {
    let mut state = initial.clone();
    let tube_count = state.tube_count();

    for (step, mv) in moves.iter().enumerate() {
        if mv.from >= tube_count || mv.to >= tube_count {
            return Err(PuzzleError::MoveOutOfRange {
                step,
                from: mv.from,
                to: mv.to,
                tube_count,
            });
        }
        if !state.pour(mv.from, mv.to) {
            return Err(PuzzleError::IllegalMove {
                step,
                from: mv.from,
                to: mv.to,
            });
        }
    }

    let finished = state.is_finished();
    debug!("replayed {} moves, finished: {}", moves.len(), finished);

    Ok(ExecutionResult {
        final_state: state,
        moves_applied: moves.len(),
        finished,
    })
}

/// Check that `moves` is a legal sequence that finishes the puzzle
pub fn verify_solution(initial: &GameState, moves: &[Move]) -> bool {
    matches!(execute(initial, moves), Ok(result) if result.finished)
}
