// THEORY:
// The `smoother` is the spatial clean-up stage. A thermal sensor with a handful of
// pixels produces isolated single-pixel flickers far more often than real objects,
// which always cover some connected area. The smoother therefore drops every
// foreground pixel that has no foreground neighbor.
//
// Key principles:
// 1.  **Single pass**: one application, not iterated to a fixed point.
// 2.  **Order independence**: neighbors are read from the raw mask and decisions are
//     written into a separate output mask, so the traversal order never matters.
// 3.  **Boundaries are empty**: nothing beyond the grid edge counts as a neighbor.

use serde::{Deserialize, Serialize};

/// Which neighbors keep a foreground pixel alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Up, down, left and right.
    #[default]
    Four,
    /// The four edge neighbors plus the diagonals.
    Eight,
}

const FOUR_NEIGHBORS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const EIGHT_NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl Connectivity {
    fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &FOUR_NEIGHBORS,
            Connectivity::Eight => &EIGHT_NEIGHBORS,
        }
    }
}

/// Clears isolated foreground pixels of `raw` into `smoothed`.
///
/// Both masks are row-major `width * height` grids.
pub fn remove_isolated(
    raw: &[bool],
    smoothed: &mut [bool],
    width: usize,
    height: usize,
    connectivity: Connectivity,
) {
    debug_assert_eq!(raw.len(), width * height);
    debug_assert_eq!(smoothed.len(), raw.len());

    for y in 0..height {
        for x in 0..width {
            let index = y * width + x;
            smoothed[index] =
                raw[index] && has_foreground_neighbor(raw, x, y, width, height, connectivity);
        }
    }
}

fn has_foreground_neighbor(
    mask: &[bool],
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    connectivity: Connectivity,
) -> bool {
    connectivity.offsets().iter().any(|&(dx, dy)| {
        match (x.checked_add_signed(dx), y.checked_add_signed(dy)) {
            (Some(nx), Some(ny)) if nx < width && ny < height => mask[ny * width + nx],
            _ => false,
        }
    })
}
