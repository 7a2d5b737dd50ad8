//! Per-color tile tallies and scoring.

use crate::types::{COLOR_COUNT, Color};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Tiles needed of one color to earn a point.
pub const TILES_PER_POINT: u32 = 3;

/// Number of tiles collected per color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collected {
    counts: [u32; COLOR_COUNT],
}

impl Collected {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tally from raw per-color counts, indexed by [`Color::slot`].
    pub fn from_counts(counts: [u32; COLOR_COUNT]) -> Self {
        Self { counts }
    }

    /// Raw per-color counts.
    pub fn counts(&self) -> &[u32; COLOR_COUNT] {
        &self.counts
    }

    /// Count for one color.
    pub fn count(&self, color: Color) -> u32 {
        self.counts[color.slot()]
    }

    /// Records one tile of `color`.
    pub fn add(&mut self, color: Color) {
        self.counts[color.slot()] += 1;
    }

    /// Adds another tally into this one.
    pub fn merge(&mut self, other: &Collected) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            *mine += theirs;
        }
    }

    /// Total tiles of all colors.
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Score: one point per full set of three tiles of a color.
    ///
    /// Colors never carry remainders into each other.
    pub fn score(&self) -> u32 {
        self.counts.iter().map(|count| count / TILES_PER_POINT).sum()
    }

    /// Per-color counts as `(color, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Color, u32)> + '_ {
        Color::iter().map(|color| (color, self.count(color)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_of_one_color_scores_one() {
        assert_eq!(Collected::from_counts([0, 0, 0, 0, 5, 0]).score(), 1);
    }

    #[test]
    fn test_colors_score_independently() {
        assert_eq!(Collected::from_counts([4, 0, 0, 0, 6, 0]).score(), 3);
        assert_eq!(Collected::from_counts([2, 2, 2, 2, 2, 2]).score(), 0);
    }

    #[test]
    fn test_merge_accumulates() {
        let mut total = Collected::new();
        total.add(Color::Red);
        total.merge(&Collected::from_counts([0, 0, 2, 0, 0, 1]));
        assert_eq!(total.count(Color::Red), 3);
        assert_eq!(total.count(Color::Green), 1);
        assert_eq!(total.total(), 4);
        assert_eq!(total.score(), 1);
    }
}
