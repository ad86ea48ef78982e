//! Edge interpolation
//!
//! Places a surface vertex on each crossed edge, or rejects the edge when
//! the jump between its corner values is too large to be a real surface.
//! Large jumps show up where a TSDF's truncation band ends, and
//! interpolating across them produces spurious sheets.

use tsdf_math::Vec3;

use crate::cell::Cell;
use crate::classify::EdgeMask;
use crate::lookup_tables::EDGES;
use crate::settings::InterpolationParams;

/// A vertex on one cube edge
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum EdgeVertex {
    /// Not computed for this cell, or rejected as a discontinuity
    #[default]
    Invalid,
    /// Interpolated surface point
    Valid(Vec3),
}

impl EdgeVertex {
    /// Whether this vertex may be used in a triangle
    #[inline]
    pub fn is_valid(self) -> bool {
        matches!(self, EdgeVertex::Valid(_))
    }

    /// Position, if valid
    #[inline]
    pub fn position(self) -> Option<Vec3> {
        match self {
            EdgeVertex::Valid(p) => Some(p),
            EdgeVertex::Invalid => None,
        }
    }
}

/// Interpolate where the isosurface crosses the edge `p1 -> p2`
///
/// Rules, first match wins:
/// 1. `|val1 - val2| > max_jump`: invalid.
/// 2. `val1` within `epsilon` of `isolevel`: `p1`.
/// 3. `val2` within `epsilon` of `isolevel`: `p2`.
/// 4. `val1` within `epsilon` of `val2`: `p1`.
/// 5. Otherwise `p1 + mu * (p2 - p1)` with `mu = (isolevel - val1) / (val2 - val1)`.
#[inline]
pub fn interpolate_edge(
    isolevel: f32,
    p1: Vec3,
    p2: Vec3,
    val1: f32,
    val2: f32,
    params: &InterpolationParams,
) -> EdgeVertex {
    if (val1 - val2).abs() > params.max_jump {
        return EdgeVertex::Invalid;
    }
    if (isolevel - val1).abs() < params.epsilon {
        return EdgeVertex::Valid(p1);
    }
    if (isolevel - val2).abs() < params.epsilon {
        return EdgeVertex::Valid(p2);
    }
    if (val1 - val2).abs() < params.epsilon {
        return EdgeVertex::Valid(p1);
    }

    let mu = (isolevel - val1) / (val2 - val1);
    EdgeVertex::Valid(p1.lerp(p2, mu))
}

/// The 12 edge slots of one cell
///
/// Slots start [`EdgeVertex::Invalid`]; only edges in the mask passed to
/// [`compute`](Self::compute) are filled, so nothing carries over between
/// cells.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeVertices([EdgeVertex; 12]);

impl EdgeVertices {
    /// Interpolate every edge in `mask`
    pub fn compute(
        cell: &Cell,
        mask: EdgeMask,
        isolevel: f32,
        params: &InterpolationParams,
    ) -> Self {
        let mut slots = [EdgeVertex::Invalid; 12];

        for edge in mask.edges() {
            let [a, b] = EDGES[edge];
            slots[edge] = interpolate_edge(
                isolevel,
                cell.positions[a],
                cell.positions[b],
                cell.values[a],
                cell.values[b],
                params,
            );
        }

        Self(slots)
    }

    /// Vertex on edge `edge` (0-11)
    #[inline]
    pub fn get(&self, edge: usize) -> EdgeVertex {
        self.0[edge]
    }

    /// All 12 slots
    pub fn as_slice(&self) -> &[EdgeVertex] {
        &self.0
    }
}
