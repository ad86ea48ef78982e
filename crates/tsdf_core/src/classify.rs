//! Cube classification
//!
//! Turns a cell's corner values into its 8-bit configuration index and the
//! set of edges the isosurface crosses.

use bitflags::bitflags;

use crate::cell::Cell;
use crate::lookup_tables::{self, EDGE_TABLE};

bitflags! {
    /// Set of cube edges crossed by the isosurface
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EdgeMask: u16 {
        const E0 = 1 << 0;
        const E1 = 1 << 1;
        const E2 = 1 << 2;
        const E3 = 1 << 3;
        const E4 = 1 << 4;
        const E5 = 1 << 5;
        const E6 = 1 << 6;
        const E7 = 1 << 7;
        const E8 = 1 << 8;
        const E9 = 1 << 9;
        const E10 = 1 << 10;
        const E11 = 1 << 11;
    }
}

impl EdgeMask {
    /// Whether edge `edge` (0-11) is crossed
    #[inline]
    pub fn has_edge(self, edge: usize) -> bool {
        edge < 12 && self.bits() & (1 << edge) != 0
    }

    /// Indices of crossed edges, ascending
    pub fn edges(self) -> impl Iterator<Item = usize> {
        (0..12).filter(move |&edge| self.has_edge(edge))
    }
}

/// 8-bit cube configuration: bit `b` set iff corner `b` is inside
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CubeIndex(u8);

impl CubeIndex {
    /// Classify corner values against `isolevel`; equality counts as inside
    #[inline]
    pub fn from_values(values: &[f32; 8], isolevel: f32) -> Self {
        let mut index = 0u8;
        for (corner, &value) in values.iter().enumerate() {
            if value <= isolevel {
                index |= 1 << corner;
            }
        }
        Self(index)
    }

    /// Wrap a raw configuration index
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw configuration index
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether corner `corner` (0-7) is inside
    #[inline]
    pub fn is_inside(self, corner: usize) -> bool {
        corner < 8 && self.0 & (1 << corner) != 0
    }

    /// Edges crossed for this configuration
    #[inline]
    pub fn edge_mask(self) -> EdgeMask {
        EdgeMask::from_bits_truncate(EDGE_TABLE[self.0 as usize])
    }

    /// Edge-index triples of the triangulation, in table order
    pub fn triangles(self) -> impl Iterator<Item = [usize; 3]> {
        lookup_tables::triangles(self.0 as usize)
    }
}

/// Classify a cell
///
/// Returns `None` when no edge is crossed: the cell lies entirely inside or
/// entirely outside the surface and contributes nothing.
#[inline]
pub fn classify(cell: &Cell, isolevel: f32) -> Option<(CubeIndex, EdgeMask)> {
    let index = CubeIndex::from_values(&cell.values, isolevel);
    let mask = index.edge_mask();
    if mask.is_empty() {
        None
    } else {
        Some((index, mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_outside() {
        let index = CubeIndex::from_values(&[1.0; 8], 0.0);
        assert_eq!(index.bits(), 0);
        assert!(index.edge_mask().is_empty());
    }

    #[test]
    fn test_all_inside() {
        let index = CubeIndex::from_values(&[-1.0; 8], 0.0);
        assert_eq!(index.bits(), 255);
        assert!(index.edge_mask().is_empty());
    }

    #[test]
    fn test_equality_counts_as_inside() {
        let mut values = [1.0; 8];
        values[5] = 0.25;
        let index = CubeIndex::from_values(&values, 0.25);
        assert_eq!(index.bits(), 1 << 5);
        assert!(index.is_inside(5));
        assert!(!index.is_inside(4));
    }

    #[test]
    fn test_bit_per_corner() {
        // Every single-corner and a spread of mixed patterns
        for pattern in 0..=255u8 {
            let values: [f32; 8] =
                std::array::from_fn(|b| if pattern & (1 << b) != 0 { -0.5 } else { 0.5 });
            let index = CubeIndex::from_values(&values, 0.0);
            assert_eq!(index.bits(), pattern);
            for b in 0..8 {
                assert_eq!(index.is_inside(b), values[b] <= 0.0);
            }
        }
    }

    #[test]
    fn test_corner_0_mask() {
        let index = CubeIndex::from_bits(1);
        let mask = index.edge_mask();
        assert_eq!(mask, EdgeMask::E0 | EdgeMask::E3 | EdgeMask::E8);
        assert_eq!(mask.edges().collect::<Vec<_>>(), vec![0, 3, 8]);
        assert!(mask.has_edge(8));
        assert!(!mask.has_edge(1));
        assert!(!mask.has_edge(12));
    }

    #[test]
    fn test_classify_skips_uniform_cells() {
        let cell = Cell {
            values: [2.0; 8],
            ..Cell::default()
        };
        assert!(classify(&cell, 0.0).is_none());

        let cell = Cell {
            values: [-2.0; 8],
            ..Cell::default()
        };
        assert!(classify(&cell, 0.0).is_none());
    }

    #[test]
    fn test_classify_crossing_cell() {
        let mut values = [1.0; 8];
        values[6] = -1.0;
        let cell = Cell {
            values,
            ..Cell::default()
        };
        let (index, mask) = classify(&cell, 0.0).expect("cell crosses the surface");
        assert_eq!(index.bits(), 64);
        assert_eq!(mask, EdgeMask::E5 | EdgeMask::E6 | EdgeMask::E10);
        assert_eq!(index.triangles().count(), 1);
    }
}
