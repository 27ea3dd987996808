use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;

use super::grid::Grid;

/// Built-in 13x11 maps. Corners and the cells next to them stay free so every
/// start position has room to move.
const LAYOUTS: [[&str; 11]; 3] = [
    [
        "...0.0.0.0...",
        ".0.........0.",
        ".............",
        ".0..0.0.0..0.",
        ".............",
        "0..0.0.0.0..0",
        ".............",
        ".0..0.0.0..0.",
        ".............",
        ".0.........0.",
        "...0.0.0.0...",
    ],
    [
        "..0.0...0.0..",
        ".............",
        "0.0.0.0.0.0.0",
        ".............",
        "..0..000..0..",
        ".0.0.....0.0.",
        "..0..000..0..",
        ".............",
        "0.0.0.0.0.0.0",
        ".............",
        "..0.0...0.0..",
    ],
    [
        "....0...0....",
        ".0.0.0.0.0.0.",
        "0...........0",
        ".0.0.0.0.0.0.",
        "..0..0.0..0..",
        "0.....0.....0",
        "..0..0.0..0..",
        ".0.0.0.0.0.0.",
        "0...........0",
        ".0.0.0.0.0.0.",
        "....0...0....",
    ],
];

static GRIDS: Lazy<Vec<Grid>> = Lazy::new(|| {
    LAYOUTS
        .iter()
        .filter_map(|rows| Grid::from_rows(rows).ok())
        .collect()
});

pub fn builtin_layouts() -> &'static [Grid] {
    &GRIDS
}

/// Pick one of the built-in layouts at random.
pub fn random_layout<R: Rng + ?Sized>(rng: &mut R) -> Grid {
    builtin_layouts()
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| Grid::empty(super::rules::WIDTH, super::rules::HEIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::arena::rules::{HEIGHT, START_POSITIONS, WIDTH};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_layout_has_the_arena_size_and_free_corners() {
        assert_eq!(builtin_layouts().len(), LAYOUTS.len());
        for grid in builtin_layouts() {
            assert_eq!(grid.width(), WIDTH);
            assert_eq!(grid.height(), HEIGHT);
            assert!(grid.box_count() > 0);
            for corner in START_POSITIONS {
                assert!(!grid.is_box(corner.x, corner.y));
            }
        }
    }

    #[test]
    fn seeded_choice_is_reproducible() {
        let first = random_layout(&mut StdRng::seed_from_u64(7));
        let second = random_layout(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
    }
}
