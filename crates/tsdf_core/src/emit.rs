//! Triangle emission
//!
//! Walks the triangle table for a classified cell and sends its triangles
//! to a sink. A cell is all-or-nothing: if any edge its triangulation uses
//! was rejected, none of its triangles are emitted.

use crate::classify::CubeIndex;
use crate::interpolate::EdgeVertices;
use crate::mesh::{MeshSink, Triangle};

/// What one cell contributed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellOutcome {
    /// Entirely inside or outside; nothing to do
    Empty,
    /// Triangulation referenced an invalid edge; nothing emitted
    Rejected,
    /// A corner was not read from the stream; nothing emitted
    Incomplete,
    /// This many triangles were emitted
    Emitted(usize),
}

/// Whether every edge the triangulation of `index` uses holds a valid vertex
pub fn triangulation_is_valid(index: CubeIndex, vertices: &EdgeVertices) -> bool {
    index
        .triangles()
        .all(|tri| tri.iter().all(|&edge| vertices.get(edge).is_valid()))
}

/// Emit the triangles of one classified cell
pub fn emit_triangles<S: MeshSink + ?Sized>(
    index: CubeIndex,
    vertices: &EdgeVertices,
    sink: &mut S,
) -> CellOutcome {
    if !triangulation_is_valid(index, vertices) {
        return CellOutcome::Rejected;
    }

    let mut emitted = 0;
    for [e0, e1, e2] in index.triangles() {
        // Validated above
        let (Some(a), Some(b), Some(c)) = (
            vertices.get(e0).position(),
            vertices.get(e1).position(),
            vertices.get(e2).position(),
        ) else {
            continue;
        };
        sink.push_triangle(Triangle::new(a, b, c));
        emitted += 1;
    }

    CellOutcome::Emitted(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::classify::classify;
    use crate::interpolate::EdgeVertex;
    use crate::settings::InterpolationParams;
    use tsdf_math::Vec3;

    fn unit_cell(values: [f32; 8]) -> Cell {
        // Geometry from the corner convention: x = slab, y = row, z = column
        let offsets = crate::cell::CORNER_OFFSETS;
        Cell {
            positions: std::array::from_fn(|i| {
                let [s, r, c] = offsets[i];
                Vec3::new(s as f32, r as f32, c as f32)
            }),
            values,
        }
    }

    fn run(cell: &Cell) -> (CellOutcome, Vec<Triangle>) {
        let mut out = Vec::new();
        let outcome = match classify(cell, 0.0) {
            None => CellOutcome::Empty,
            Some((index, mask)) => {
                let vertices =
                    EdgeVertices::compute(cell, mask, 0.0, &InterpolationParams::default());
                emit_triangles(index, &vertices, &mut out)
            }
        };
        (outcome, out)
    }

    #[test]
    fn test_single_corner_emits_one_triangle() {
        let mut values = [0.3; 8];
        values[0] = -0.3;
        let (outcome, triangles) = run(&unit_cell(values));

        assert_eq!(outcome, CellOutcome::Emitted(1));
        // Edges 0, 8, 3 are the three edges touching corner 0 at (0, 0, 1)
        let expected = Triangle::new(
            Vec3::new(0.5, 0.0, 1.0),
            Vec3::new(0.0, 0.5, 1.0),
            Vec3::new(0.0, 0.0, 0.5),
        );
        assert_eq!(triangles, vec![expected]);
    }

    #[test]
    fn test_every_single_corner_case() {
        for corner in 0..8 {
            let mut values = [0.3; 8];
            values[corner] = -0.3;
            let cell = unit_cell(values);
            let (outcome, triangles) = run(&cell);
            assert_eq!(outcome, CellOutcome::Emitted(1), "corner {}", corner);

            // Each vertex is the midpoint of an edge leaving that corner
            let origin = cell.positions[corner];
            for v in triangles[0].vertices {
                assert!(((v - origin).length() - 0.5).abs() < 1e-6, "corner {}", corner);
            }
        }
    }

    #[test]
    fn test_uniform_cell_is_empty() {
        let (outcome, triangles) = run(&unit_cell([0.4; 8]));
        assert_eq!(outcome, CellOutcome::Empty);
        assert!(triangles.is_empty());
    }

    #[test]
    fn test_discontinuity_rejects_whole_cell() {
        // Two corners inside: a quad made of two triangles. The edges leaving
        // corner 1 jump by 1.0 and poison the whole cell.
        let mut values = [0.3; 8];
        values[0] = -0.3;
        values[1] = -0.7;
        let (outcome, triangles) = run(&unit_cell(values));
        assert_eq!(outcome, CellOutcome::Rejected);
        assert!(triangles.is_empty());
    }

    #[test]
    fn test_two_corner_quad() {
        let mut values = [0.3; 8];
        values[0] = -0.3;
        values[1] = -0.3;
        let (outcome, triangles) = run(&unit_cell(values));
        assert_eq!(outcome, CellOutcome::Emitted(2));
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn test_stale_slots_are_not_trusted() {
        // Vertices computed for corner 0 do not cover corner 6's edges
        let index = CubeIndex::from_bits(1 << 6);
        let mut values = [0.3; 8];
        values[0] = -0.3;
        let cell = unit_cell(values);
        let mask = CubeIndex::from_bits(1).edge_mask();
        let vertices =
            EdgeVertices::compute(&cell, mask, 0.0, &InterpolationParams::default());

        assert!(!triangulation_is_valid(index, &vertices));
        let mut out: Vec<Triangle> = Vec::new();
        assert_eq!(emit_triangles(index, &vertices, &mut out), CellOutcome::Rejected);
    }

    #[test]
    fn test_only_referenced_edges_are_validated() {
        let index = CubeIndex::from_bits(1);
        assert_eq!(index.triangles().flatten().collect::<Vec<_>>(), vec![0, 8, 3]);
        assert!(!triangulation_is_valid(index, &EdgeVertices::default()));

        let mut values = [0.3; 8];
        values[0] = -0.3;
        let vertices = EdgeVertices::compute(
            &unit_cell(values),
            index.edge_mask(),
            0.0,
            &InterpolationParams::default(),
        );
        // Edge 5 was never computed; the triangulation does not need it
        assert_eq!(vertices.get(5), EdgeVertex::Invalid);
        assert!(triangulation_is_valid(index, &vertices));
    }
}
