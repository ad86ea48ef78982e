//! Mesh output
//!
//! The engine hands triangles to a [`MeshSink`] and knows nothing else about
//! where they go. [`Mesh`] is the default sink: an ordered triangle soup
//! with no shared vertices.

use bytemuck::{Pod, Zeroable};
use tsdf_math::Vec3;

/// One output triangle, winding as given by the triangle table
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Triangle {
    pub vertices: [Vec3; 3],
}

impl Triangle {
    /// Create a triangle from three vertices
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { vertices: [a, b, c] }
    }

    /// The 9 coordinates, vertex by vertex
    pub fn to_floats(&self) -> [f32; 9] {
        let [a, b, c] = self.vertices;
        [a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z]
    }
}

/// Receives triangles in emission order
pub trait MeshSink {
    /// Append one triangle
    fn push_triangle(&mut self, triangle: Triangle);
}

impl MeshSink for Vec<Triangle> {
    fn push_triangle(&mut self, triangle: Triangle) {
        self.push(triangle);
    }
}

impl<S: MeshSink + ?Sized> MeshSink for &mut S {
    fn push_triangle(&mut self, triangle: Triangle) {
        (**self).push_triangle(triangle);
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Edge lengths of the box
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Append-only triangle soup
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for `capacity` triangles
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices (three per triangle, none shared)
    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// True if no triangle has been emitted
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangles in emission order
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Iterate triangles in emission order
    pub fn iter(&self) -> std::slice::Iter<'_, Triangle> {
        self.triangles.iter()
    }

    /// Flat coordinate view: 9 floats per triangle
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.triangles)
    }

    /// Bounding box of all vertices, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let mut vertices = self.triangles.iter().flat_map(|t| t.vertices);
        let first = vertices.next()?;
        let (min, max) = vertices.fold((first, first), |(min, max), v| {
            (min.min_components(v), max.max_components(v))
        });
        Some(Bounds { min, max })
    }

    /// Consume the mesh, returning its triangles
    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }
}

impl MeshSink for Mesh {
    fn push_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }
}

impl<'a> IntoIterator for &'a Mesh {
    type Item = &'a Triangle;
    type IntoIter = std::slice::Iter<'a, Triangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.triangles.iter()
    }
}
