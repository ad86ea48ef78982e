//! Whole-volume extraction
//!
//! [`DenseVolume`] holds every sample in memory and slices slabs out of it
//! directly instead of streaming them. It runs the same cell pipeline as
//! the streaming [`Extractor`](crate::Extractor), so for a complete volume
//! both produce the same mesh.

use crate::cell::SlabPair;
use crate::error::ExtractError;
use crate::extractor::{process_slab_pair, ExtractionStats};
use crate::mesh::MeshSink;
use crate::settings::ExtractionSettings;
use crate::slab::Slab;
use crate::source::{ByteOrder, ScalarSource, encode_scalars};

/// A cubic volume of scalars, stored `[i][j][k]` with `k` fastest
#[derive(Clone, Debug, PartialEq)]
pub struct DenseVolume {
    dimension: usize,
    values: Vec<f32>,
}

impl DenseVolume {
    /// Wrap `dimension^3` samples in stream order
    pub fn new(dimension: usize, values: Vec<f32>) -> Result<Self, ExtractError> {
        let expected = dimension * dimension * dimension;
        if values.len() != expected {
            return Err(ExtractError::VolumeSize {
                expected,
                got: values.len(),
            });
        }
        Ok(Self { dimension, values })
    }

    /// Build a volume by evaluating `f(i, j, k)` at every sample
    pub fn from_fn<F>(dimension: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let mut values = Vec::with_capacity(dimension * dimension * dimension);
        for i in 0..dimension {
            for j in 0..dimension {
                for k in 0..dimension {
                    values.push(f(i, j, k));
                }
            }
        }
        Self { dimension, values }
    }

    /// Read a complete volume from a stream
    pub fn from_source<S: ScalarSource>(
        mut source: S,
        dimension: usize,
    ) -> Result<Self, ExtractError> {
        let expected = dimension * dimension * dimension;
        let mut values = Vec::with_capacity(expected);
        while values.len() < expected {
            match source.next_scalar() {
                Some(value) => values.push(value),
                None => break,
            }
        }
        Self::new(dimension, values)
    }

    /// Samples along each axis
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// All samples in stream order
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Sample at `(i, j, k)`
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f32 {
        let d = self.dimension;
        self.values[(i * d + j) * d + k]
    }

    /// Subsampled plane `i`, keeping rows and columns that are multiples of
    /// `stride`
    pub fn slab(&self, i: usize, stride: usize) -> Slab {
        let stride = stride.max(1);
        let width = self.dimension.div_ceil(stride);
        let mut values = Vec::with_capacity(width * width);
        for j in (0..self.dimension).step_by(stride) {
            for k in (0..self.dimension).step_by(stride) {
                values.push(self.get(i, j, k));
            }
        }
        Slab::from_values(width, values)
    }

    /// Serialise as a raw volume file
    pub fn to_bytes(&self, byte_order: ByteOrder) -> Vec<u8> {
        encode_scalars(&self.values, byte_order)
    }

    /// Extract the isosurface, sending triangles to `sink`
    ///
    /// `settings.dimension` must match the volume.
    pub fn extract<M: MeshSink + ?Sized>(
        &self,
        settings: &ExtractionSettings,
        sink: &mut M,
    ) -> Result<ExtractionStats, ExtractError> {
        if let Some(err) = settings.validate().into_iter().next() {
            return Err(err.into());
        }
        if settings.dimension != self.dimension {
            return Err(ExtractError::VolumeSize {
                expected: settings.volume_len(),
                got: self.values.len(),
            });
        }

        let mut stats = ExtractionStats::default();
        let mut current = self.slab(0, settings.stride);
        let mut current_index = 0;
        stats.slabs_loaded = 1;

        for index in settings.scan_indices() {
            let next = self.slab(index, settings.stride);
            stats.slabs_loaded += 1;

            let pair = SlabPair::new(&current, &next, current_index, index, settings.stride);
            process_slab_pair(&pair, settings, &mut stats, sink);

            current = next;
            current_index = index;
        }

        Ok(stats)
    }
}
