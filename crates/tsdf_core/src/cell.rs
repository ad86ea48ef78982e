//! Cell sampling
//!
//! Assembles the 8 corners of one cube from a pair of adjacent slabs, in
//! the corner order the lookup tables expect.

use tsdf_math::Vec3;

use crate::slab::Slab;

/// Corner offsets as `[slab, row, column]`
///
/// `slab` 0 is the current slab, 1 the next slab along the scan axis.
/// This ordering must match [`EDGES`](crate::lookup_tables::EDGES).
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 1], // Corner 0
    [1, 0, 1], // Corner 1
    [1, 0, 0], // Corner 2
    [0, 0, 0], // Corner 3
    [0, 1, 1], // Corner 4
    [1, 1, 1], // Corner 5
    [1, 1, 0], // Corner 6
    [0, 1, 0], // Corner 7
];

/// The 8 corners of one cube: world positions and scalar values
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    pub positions: [Vec3; 8],
    pub values: [f32; 8],
}

/// Two adjacent slabs and where they sit in the volume
#[derive(Clone, Copy, Debug)]
pub struct SlabPair<'a> {
    /// Slab at `current_index` along the scan axis
    pub current: &'a Slab,
    /// Slab at `next_index` along the scan axis
    pub next: &'a Slab,
    pub current_index: usize,
    pub next_index: usize,
    /// Volume samples between adjacent slab entries
    pub stride: usize,
}

impl<'a> SlabPair<'a> {
    /// Pair two slabs
    pub fn new(
        current: &'a Slab,
        next: &'a Slab,
        current_index: usize,
        next_index: usize,
        stride: usize,
    ) -> Self {
        debug_assert_eq!(current.width(), next.width());
        Self {
            current,
            next,
            current_index,
            next_index,
            stride,
        }
    }

    /// Whether all 8 corners of cell `(j, k)` were read by the last loads
    pub fn corners_filled(&self, j: usize, k: usize) -> bool {
        if self.current.is_complete() && self.next.is_complete() {
            return true;
        }
        CORNER_OFFSETS.iter().all(|&[slab, dj, dk]| {
            let source = if slab == 0 { self.current } else { self.next };
            source.is_filled(j + dj, k + dk)
        })
    }

    /// Sample the cell whose lowest row/column corner is `(j, k)`
    ///
    /// `j` and `k` are subsampled indices in `[0, width - 2]`.
    pub fn cell(&self, j: usize, k: usize) -> Cell {
        let mut cell = Cell::default();

        for (corner, [slab, dj, dk]) in CORNER_OFFSETS.iter().copied().enumerate() {
            let (source, scan_index) = if slab == 0 {
                (self.current, self.current_index)
            } else {
                (self.next, self.next_index)
            };
            let row = j + dj;
            let col = k + dk;

            cell.values[corner] = source.get(row, col);
            cell.positions[corner] = Vec3::new(
                scan_index as f32,
                (row * self.stride) as f32,
                (col * self.stride) as f32,
            );
        }

        cell
    }
}
