//! Exhaustive depth-first solver with visited-state memoization.
//!
//! The search runs on an explicit stack of frames rather than recursion.
//! Each frame holds a board and a cursor into the ordered tube pairs it has
//! yet to try, so states are explored in exactly the order a recursive
//! backtracking search would explore them, without call-stack depth limits.
//!
//! Every child state is a fresh copy of its parent. A frame's board is never
//! mutated once pushed, so backtracking is just popping the frame.

use std::collections::HashSet;
use std::time::Instant;

use log::debug;

use crate::pruning::{pair_at, should_skip_pair};
use crate::puzzle::{GameState, Move};

/// Log progress every this many expanded states
const PROGRESS_INTERVAL: usize = 100_000;

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Skip pours between two tubes that are both already sorted
    pub prune_sorted_pairs: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            prune_sorted_pairs: true,
        }
    }
}

/// What the search found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// No sequence of pours sorts the puzzle
    NoSolution,
    /// Moves in application order. Empty if the puzzle started sorted.
    Solved(Vec<Move>),
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }

    pub fn moves(&self) -> Option<&[Move]> {
        match self {
            SearchOutcome::Solved(moves) => Some(moves),
            SearchOutcome::NoSolution => None,
        }
    }
}

/// Counters collected during one search run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States the search descended into, the initial state included
    pub states_expanded: usize,
    /// Size of the visited set when the search stopped
    pub states_visited: usize,
    /// Legal pours whose result was already in the visited set
    pub duplicates_pruned: usize,
    pub pours_attempted: usize,
    pub max_depth: usize,
}

/// Result of the solver search
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
    /// Time elapsed in milliseconds
    pub time_elapsed_ms: u64,
}

/// A frame in the search: a board and the next tube pair to try from it
#[derive(Debug, Clone)]
struct SearchFrame {
    state: GameState,
    /// Index into the `n * n` pair grid, self-pairs included
    cursor: usize,
}

impl SearchFrame {
    fn new(state: GameState) -> Self {
        Self { state, cursor: 0 }
    }

    /// Advance the cursor to the next pour that yields an unvisited state.
    fn next_child(
        &mut self,
        visited: &HashSet<GameState>,
        config: &SolverConfig,
        stats: &mut SearchStats,
    ) -> Option<(Move, GameState)> {
        let tube_count = self.state.tube_count();

        while let Some((from, to)) = pair_at(self.cursor, tube_count) {
            self.cursor += 1;
            if from == to {
                continue;
            }
            if config.prune_sorted_pairs && should_skip_pair(&self.state, from, to) {
                continue;
            }

            stats.pours_attempted += 1;
            let mv = Move::new(from, to);
            let Some(next) = self.state.apply(mv) else {
                continue;
            };
            if visited.contains(&next) {
                stats.duplicates_pruned += 1;
                continue;
            }
            return Some((mv, next));
        }
        None
    }
}

/// Search for any sequence of pours that sorts `initial`, using the
/// default configuration.
pub fn solve(initial: &GameState) -> SearchOutcome {
    solve_with_config(initial, &SolverConfig::default()).outcome
}

/// Search for any sequence of pours that sorts `initial`.
///
/// The search is exhaustive: `NoSolution` means no reachable state is
/// sorted. The solution found is the first one in depth-first order, not
/// necessarily the shortest.
pub fn solve_with_config(initial: &GameState, config: &SolverConfig) -> SolverResult {
    let start_time = Instant::now();

    let mut stats = SearchStats {
        states_expanded: 1,
        ..Default::default()
    };
    // The initial state is not recorded, only states reached by a pour.
    let mut visited: HashSet<GameState> = HashSet::new();
    let mut moves: Vec<Move> = Vec::new();

    if initial.is_finished() {
        return SolverResult {
            outcome: SearchOutcome::Solved(moves),
            stats,
            time_elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
    }

    // Invariant: moves.len() == stack.len() - 1
    let mut stack: Vec<SearchFrame> = vec![SearchFrame::new(initial.clone())];

    while let Some(frame) = stack.last_mut() {
        match frame.next_child(&visited, config, &mut stats) {
            Some((mv, next)) => {
                visited.insert(next.clone());
                moves.push(mv);
                stats.states_expanded += 1;
                stats.max_depth = stats.max_depth.max(moves.len());

                if stats.states_expanded % PROGRESS_INTERVAL == 0 {
                    debug!(
                        "expanded {} states, depth {}, {} duplicates pruned",
                        stats.states_expanded,
                        moves.len(),
                        stats.duplicates_pruned
                    );
                }

                if next.is_finished() {
                    stats.states_visited = visited.len();
                    debug!(
                        "solved in {} moves after expanding {} states",
                        moves.len(),
                        stats.states_expanded
                    );
                    return SolverResult {
                        outcome: SearchOutcome::Solved(moves),
                        stats,
                        time_elapsed_ms: start_time.elapsed().as_millis() as u64,
                    };
                }
                stack.push(SearchFrame::new(next));
            }
            None => {
                // Backtrack. The visited entry for this frame's state stays.
                stack.pop();
                moves.pop();
            }
        }
    }

    stats.states_visited = visited.len();
    debug!(
        "search exhausted after expanding {} states",
        stats.states_expanded
    );
    SolverResult {
        outcome: SearchOutcome::NoSolution,
        stats,
        time_elapsed_ms: start_time.elapsed().as_millis() as u64,
    }
}
