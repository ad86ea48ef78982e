//! Streaming isosurface extraction for TSDF volumes
//!
//! This crate turns a cubic scalar volume, read once front to back, into a
//! triangle soup using Marching Cubes:
//!
//! - [`ScalarSource`] - Forward-only stream of scalars ([`RawScalarReader`], [`SliceSource`])
//! - [`SlabReader`] - Keeps two subsampled planes of the volume in memory
//! - [`SlabPair`] / [`Cell`] - The 8 corners of one cube
//! - [`classify`] - Cube configuration index and crossed edges
//! - [`interpolate_edge`] - Surface vertex on an edge, rejecting discontinuities
//! - [`emit_triangles`] - All-or-nothing triangulation of one cell
//! - [`Extractor`] - Drives the scan and reports [`ExtractionStats`]
//! - [`Mesh`] - Ordered triangle soup, the default [`MeshSink`]
//! - [`DenseVolume`] - Whole-volume extraction over in-memory samples

pub mod lookup_tables;
mod settings;
mod error;
mod source;
mod slab;
mod cell;
mod classify;
mod interpolate;
mod emit;
mod mesh;
mod extractor;
mod volume;

pub use settings::{
    ExtractionSettings, InterpolationParams, SettingsError, DEFAULT_DIMENSION, DEFAULT_EPSILON,
    DEFAULT_MAX_JUMP,
};
pub use error::ExtractError;
pub use source::{encode_scalars, ByteOrder, RawScalarReader, ScalarSource, SliceSource};
pub use slab::{Slab, SlabReader};
pub use cell::{Cell, SlabPair, CORNER_OFFSETS};
pub use classify::{classify, CubeIndex, EdgeMask};
pub use interpolate::{interpolate_edge, EdgeVertex, EdgeVertices};
pub use emit::{emit_triangles, triangulation_is_valid, CellOutcome};
pub use mesh::{Bounds, Mesh, MeshSink, Triangle};
pub use extractor::{extract_mesh, process_slab_pair, Extraction, ExtractionStats, Extractor, ScanState};
pub use volume::DenseVolume;

// Re-export the vector type used for vertex positions
pub use tsdf_math::Vec3;
