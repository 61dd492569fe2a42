//! Errors raised while building a puzzle or replaying moves against it.
//!
//! The search itself never fails: "no solution" is an ordinary outcome.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("tube {tube} holds {units} units, more than a tube can hold")]
    TubeOverflow { tube: usize, units: usize },

    #[error("move {step} ({from} -> {to}) is out of range for {tube_count} tubes")]
    MoveOutOfRange {
        step: usize,
        from: usize,
        to: usize,
        tube_count: usize,
    },

    #[error("move {step} ({from} -> {to}) is not a legal pour")]
    IllegalMove { step: usize, from: usize, to: usize },
}
