//! Move ordering and pruning rules for the solver.
//!
//! The search tries every ordered pair of tubes. The rule here only skips
//! pairs that cannot help, so turning it off changes the amount of work but
//! never whether a solution is found.

use crate::puzzle::GameState;

/// Ordered tube pairs `(from, to)` with `from != to`, `from` outermost.
pub fn ordered_pairs(tube_count: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..tube_count)
        .flat_map(move |from| (0..tube_count).map(move |to| (from, to)))
        .filter(|&(from, to)| from != to)
}

/// Pair at position `cursor` of the full `tube_count * tube_count` grid,
/// self-pairs included. Lets a search frame resume where it stopped.
pub fn pair_at(cursor: usize, tube_count: usize) -> Option<(usize, usize)> {
    if tube_count == 0 || cursor >= tube_count * tube_count {
        return None;
    }
    Some((cursor / tube_count, cursor % tube_count))
}

/// Pouring between two sorted tubes can never help
pub fn should_skip_pair(state: &GameState, from: usize, to: usize) -> bool {
    match (state.tube(from), state.tube(to)) {
        (Some(a), Some(b)) => a.is_monochromatic() && b.is_monochromatic(),
        _ => true,
    }
}
