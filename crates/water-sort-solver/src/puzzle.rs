//! Puzzle representation types: colors, tubes, board states and moves.
//!
//! `PuzzleConfig` deserializes directly from the JSON puzzle files. The
//! search itself works on `GameState`, which clones cheaply and hashes
//! structurally so it can key the visited set.

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::PuzzleError;

/// Number of units a tube holds when full.
pub const TUBE_CAPACITY: usize = 4;

/// The reference puzzle shipped with the crate.
pub const REFERENCE_PUZZLE: &str = include_str!("../puzzles/reference.json");

/// Liquid color
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Yellow,
    Orange,
    Violet,
    Vine,
    Salmon,
    Grey,
    Lime,
    Red,
    Green,
    Purple,
    Brown,
    Blue,
}

impl Color {
    pub const ALL: [Color; 12] = [
        Color::Yellow,
        Color::Orange,
        Color::Violet,
        Color::Vine,
        Color::Salmon,
        Color::Grey,
        Color::Lime,
        Color::Red,
        Color::Green,
        Color::Purple,
        Color::Brown,
        Color::Blue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Color::Yellow => "yellow",
            Color::Orange => "orange",
            Color::Violet => "violet",
            Color::Vine => "vine",
            Color::Salmon => "salmon",
            Color::Grey => "grey",
            Color::Lime => "lime",
            Color::Red => "red",
            Color::Green => "green",
            Color::Purple => "purple",
            Color::Brown => "brown",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stack of liquid units, bottom first. Never holds more than
/// `TUBE_CAPACITY` units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Tube {
    units: SmallVec<[Color; TUBE_CAPACITY]>,
}

impl Tube {
    /// Create an empty tube
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tube from units listed bottom to top.
    /// Returns `None` if there are more units than fit.
    pub fn from_units<I: IntoIterator<Item = Color>>(units: I) -> Option<Self> {
        let units: SmallVec<[Color; TUBE_CAPACITY]> = units.into_iter().collect();
        if units.len() > TUBE_CAPACITY {
            return None;
        }
        Some(Self { units })
    }

    pub fn units(&self) -> &[Color] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.units.len() >= TUBE_CAPACITY
    }

    pub fn free_space(&self) -> usize {
        TUBE_CAPACITY.saturating_sub(self.units.len())
    }

    /// The unit that would be poured next
    pub fn top(&self) -> Option<Color> {
        self.units.last().copied()
    }

    /// Length of the contiguous run of the top color
    pub fn top_run_len(&self) -> usize {
        match self.top() {
            None => 0,
            Some(top) => self.units.iter().rev().take_while(|&&c| c == top).count(),
        }
    }

    /// Check whether pouring into `dest` would move anything
    pub fn can_pour_into(&self, dest: &Tube) -> bool {
        match self.top() {
            None => false,
            Some(color) => !dest.is_full() && dest.top().map_or(true, |top| top == color),
        }
    }

    /// Pour the top run of this tube into `dest`, stopping early if `dest`
    /// fills up. Returns false and leaves both tubes untouched when the pour
    /// is not legal.
    pub fn pour_into(&mut self, dest: &mut Tube) -> bool {
        if !self.can_pour_into(dest) {
            return false;
        }
        let Some(color) = self.top() else {
            return false;
        };
        while self.top() == Some(color) && !dest.is_full() {
            self.units.pop();
            dest.units.push(color);
        }
        true
    }

    /// Empty, or full with a single color. A partially filled tube never
    /// counts, even when uniform.
    pub fn is_monochromatic(&self) -> bool {
        match self.units.first() {
            None => true,
            Some(&bottom) => self.is_full() && self.units.iter().all(|&c| c == bottom),
        }
    }
}

impl fmt::Display for Tube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, color) in self.units.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", color)?;
        }
        f.write_str("]")
    }
}

/// A pour from one tube index to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// The full board: every tube, in index order.
///
/// Equality and hashing are structural and order-sensitive, so two boards
/// that only differ by which slot holds which tube are different states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GameState {
    tubes: Vec<Tube>,
}

impl GameState {
    pub fn new(tubes: Vec<Tube>) -> Self {
        Self { tubes }
    }

    /// Build a state from per-tube color lists, each listed bottom to top
    pub fn from_colors<I, T>(tubes: I) -> Result<Self, PuzzleError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[Color]>,
    {
        let tubes = tubes
            .into_iter()
            .enumerate()
            .map(|(index, units)| {
                let units = units.as_ref();
                Tube::from_units(units.iter().copied()).ok_or(PuzzleError::TubeOverflow {
                    tube: index,
                    units: units.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tubes })
    }

    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    pub fn tube(&self, index: usize) -> Option<&Tube> {
        self.tubes.get(index)
    }

    pub fn tube_count(&self) -> usize {
        self.tubes.len()
    }

    /// Every tube is sorted
    pub fn is_finished(&self) -> bool {
        self.tubes.iter().all(Tube::is_monochromatic)
    }

    /// Pour tube `from` into tube `to` in place.
    ///
    /// Returns false without touching the state for a self-pour, an index
    /// past the last tube, or an illegal pour.
    pub fn pour(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.tubes.len() || to >= self.tubes.len() {
            return false;
        }
        let (source, dest) = if from < to {
            let (low, high) = self.tubes.split_at_mut(to);
            (&mut low[from], &mut high[0])
        } else {
            let (low, high) = self.tubes.split_at_mut(from);
            (&mut high[0], &mut low[to])
        };
        source.pour_into(dest)
    }

    /// Copy the state and apply `mv` to the copy. `None` if the pour is
    /// not legal.
    pub fn apply(&self, mv: Move) -> Option<GameState> {
        let mut next = self.clone();
        next.pour(mv.from, mv.to).then_some(next)
    }

    /// Count units per color
    pub fn color_counts(&self) -> BTreeMap<Color, usize> {
        let mut counts = BTreeMap::new();
        for tube in &self.tubes {
            for &color in tube.units() {
                *counts.entry(color).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Colors whose unit count can never fill whole tubes
    pub fn unbalanced_colors(&self) -> Vec<(Color, usize)> {
        self.color_counts()
            .into_iter()
            .filter(|(_, count)| count % TUBE_CAPACITY != 0)
            .collect()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tube) in self.tubes.iter().enumerate() {
            writeln!(f, "{:>2}: {}", i, tube)?;
        }
        Ok(())
    }
}

/// The puzzle file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Tube contents, bottom to top
    pub tubes: Vec<Vec<Color>>,
}

impl PuzzleConfig {
    /// Parse the built-in reference puzzle
    pub fn reference() -> serde_json::Result<Self> {
        serde_json::from_str(REFERENCE_PUZZLE)
    }

    /// Build the initial state, warning about colors that cannot be sorted
    pub fn initial_state(&self) -> Result<GameState, PuzzleError> {
        let state = GameState::from_colors(&self.tubes)?;
        for (color, count) in state.unbalanced_colors() {
            warn!(
                "puzzle {:?}: {} has {} units, not a multiple of {}; it can never be sorted",
                self.id, color, count, TUBE_CAPACITY
            );
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use super::Color::{Blue, Red};

    fn tube(units: &[Color]) -> Tube {
        Tube::from_units(units.iter().copied()).unwrap()
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_empty_tube_is_monochromatic() {
        assert!(Tube::new().is_monochromatic());
    }

    #[test]
    fn test_partial_tube_is_never_monochromatic() {
        assert!(!tube(&[Red]).is_monochromatic());
        assert!(!tube(&[Red, Red]).is_monochromatic());
        assert!(!tube(&[Red, Red, Red]).is_monochromatic());
        assert!(!tube(&[Red, Blue, Red]).is_monochromatic());
    }

    #[test]
    fn test_full_tube_monochromatic_only_when_uniform() {
        assert!(tube(&[Red, Red, Red, Red]).is_monochromatic());
        assert!(!tube(&[Red, Red, Red, Blue]).is_monochromatic());
        assert!(!tube(&[Blue, Red, Red, Red]).is_monochromatic());
    }

    #[test]
    fn test_from_units_rejects_overflow() {
        assert!(Tube::from_units([Red; 5]).is_none());
        assert_eq!(Tube::from_units([Red; 4]).map(|t| t.len()), Some(4));
    }

    #[test]
    fn test_top_run_len() {
        assert_eq!(Tube::new().top_run_len(), 0);
        assert_eq!(tube(&[Red, Blue, Blue]).top_run_len(), 2);
        assert_eq!(tube(&[Blue, Red, Blue]).top_run_len(), 1);
        assert_eq!(tube(&[Red, Red, Red, Red]).top_run_len(), 4);
        assert_eq!(tube(&[Red, Blue, Blue]).free_space(), 1);
    }

    #[test]
    fn test_failed_pours_leave_tubes_untouched() {
        // destination full
        let mut source = tube(&[Red]);
        let mut dest = tube(&[Red, Red, Red, Red]);
        assert!(!source.pour_into(&mut dest));
        assert_eq!(source, tube(&[Red]));
        assert_eq!(dest, tube(&[Red, Red, Red, Red]));

        // source empty
        let mut source = Tube::new();
        let mut dest = tube(&[Red]);
        assert!(!source.pour_into(&mut dest));
        assert!(source.is_empty());
        assert_eq!(dest, tube(&[Red]));

        // top colors differ
        let mut source = tube(&[Red, Blue]);
        let mut dest = tube(&[Red]);
        assert!(!source.pour_into(&mut dest));
        assert_eq!(source, tube(&[Red, Blue]));
        assert_eq!(dest, tube(&[Red]));
    }

    #[test]
    fn test_pour_moves_whole_top_run() {
        let mut source = tube(&[Blue, Red, Red]);
        let mut dest = Tube::new();
        assert!(source.pour_into(&mut dest));
        assert_eq!(source, tube(&[Blue]));
        assert_eq!(dest, tube(&[Red, Red]));
    }

    #[test]
    fn test_full_run_into_empty_tube() {
        let mut source = tube(&[Red, Red, Red, Red]);
        let mut dest = Tube::new();
        assert!(source.pour_into(&mut dest));
        assert!(source.is_empty());
        assert_eq!(dest.len(), 4);
    }

    #[test]
    fn test_partial_pour_is_a_success() {
        let mut source = tube(&[Red, Red, Red]);
        let mut dest = tube(&[Blue, Red]);
        assert!(source.pour_into(&mut dest));
        assert_eq!(source, tube(&[Red]));
        assert_eq!(dest, tube(&[Blue, Red, Red, Red]));
    }

    #[test]
    fn test_state_self_pour_is_rejected() {
        let mut state = GameState::from_colors(vec![vec![Red, Blue], vec![]]).unwrap();
        let before = state.clone();
        assert!(!state.pour(0, 0));
        assert!(!state.pour(0, 7));
        assert!(!state.pour(7, 0));
        assert_eq!(state, before);
    }

    #[test]
    fn test_state_pour_in_both_directions() {
        let mut state = GameState::from_colors(vec![vec![Red], vec![], vec![Blue]]).unwrap();
        assert!(state.pour(2, 1));
        assert_eq!(state.tube(1), Some(&tube(&[Blue])));
        assert!(state.tube(2).map_or(false, Tube::is_empty));

        // red and blue tops never mix, whichever side is lower
        assert!(!state.pour(0, 1));
        assert!(!state.pour(1, 0));
        assert!(state.pour(0, 2));
        assert_eq!(state.tube(2), Some(&tube(&[Red])));
    }

    #[test]
    fn test_apply_leaves_original_untouched() {
        let state = GameState::from_colors(vec![vec![Red, Blue], vec![]]).unwrap();
        let next = state.apply(Move::new(0, 1)).unwrap();
        assert_eq!(state.tube(0), Some(&tube(&[Red, Blue])));
        assert_eq!(next.tube(0), Some(&tube(&[Red])));
        assert_eq!(next.tube(1), Some(&tube(&[Blue])));
        assert!(state.apply(Move::new(1, 0)).is_none());
    }

    #[test]
    fn test_state_equality_and_hash() {
        let a = GameState::from_colors(vec![vec![Red, Blue], vec![Blue]]).unwrap();
        let b = GameState::from_colors(vec![vec![Red, Blue], vec![Blue]]).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let altered = GameState::from_colors(vec![vec![Blue, Red], vec![Blue]]).unwrap();
        assert_ne!(a, altered);

        // tube order matters
        let swapped = GameState::from_colors(vec![vec![Blue], vec![Red, Blue]]).unwrap();
        assert_ne!(a, swapped);
    }

    #[test]
    fn test_is_finished() {
        let sorted = GameState::from_colors(vec![vec![Red; 4], vec![], vec![Blue; 4]]).unwrap();
        assert!(sorted.is_finished());
        let unsorted = GameState::from_colors(vec![vec![Red; 3], vec![Red]]).unwrap();
        assert!(!unsorted.is_finished());
    }

    #[test]
    fn test_from_colors_reports_overflowing_tube() {
        let err = GameState::from_colors(vec![vec![Red], vec![Blue; 5]]).unwrap_err();
        assert_eq!(err, PuzzleError::TubeOverflow { tube: 1, units: 5 });
    }

    #[test]
    fn test_unbalanced_colors() {
        let state = GameState::from_colors(vec![vec![Red, Red, Blue], vec![Red, Red]]).unwrap();
        assert_eq!(state.color_counts().get(&Red), Some(&4));
        assert_eq!(state.unbalanced_colors(), vec![(Blue, 1)]);
    }

    #[test]
    fn test_parse_puzzle_config() {
        let json = r#"{"id": "tiny", "tubes": [["red", "blue"], []]}"#;
        let puzzle: PuzzleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(puzzle.title, "");
        let state = puzzle.initial_state().unwrap();
        assert_eq!(state.tube_count(), 2);
        assert_eq!(state.tube(0).and_then(Tube::top), Some(Blue));
    }

    #[test]
    fn test_display() {
        let state = GameState::from_colors(vec![vec![Red, Blue], vec![]]).unwrap();
        assert_eq!(state.to_string(), " 0: [red blue]\n 1: []\n");
        assert_eq!(Move::new(3, 12).to_string(), "3 -> 12");
    }
}
