//! Slabs and the streaming slab reader
//!
//! A [`Slab`] is one subsampled plane of the volume. The [`SlabReader`]
//! keeps exactly two of them alive (current and next), so memory stays
//! proportional to one plane regardless of the volume depth.

use crate::settings::ExtractionSettings;
use crate::source::ScalarSource;

/// One subsampled `width x width` plane of scalar samples
///
/// Each slot also records whether its value was read by the most recent
/// load. Slots the stream could not supply keep their old value but are
/// marked unfilled.
#[derive(Clone, Debug, PartialEq)]
pub struct Slab {
    width: usize,
    values: Vec<f32>,
    filled: Vec<bool>,
    complete: bool,
}

impl Slab {
    /// Create a zero-filled slab with no slot read yet
    pub fn new(width: usize) -> Self {
        Self {
            width,
            values: vec![0.0; width * width],
            filled: vec![false; width * width],
            complete: width == 0,
        }
    }

    /// Create a fully filled slab from row-major values
    ///
    /// # Panics
    /// Panics if `values.len() != width * width`.
    pub fn from_values(width: usize, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), width * width, "slab must be width x width");
        Self {
            width,
            filled: vec![true; values.len()],
            values,
            complete: true,
        }
    }

    /// Samples per row and per column
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Sample at row `j`, column `k` (subsampled indices)
    #[inline]
    pub fn get(&self, j: usize, k: usize) -> f32 {
        self.values[j * self.width + k]
    }

    /// Row-major samples
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Whether the sample at row `j`, column `k` was read by the last load
    #[inline]
    pub fn is_filled(&self, j: usize, k: usize) -> bool {
        self.filled[j * self.width + k]
    }

    /// True if every slot was read by the last load
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Read one full `dimension x dimension` plane from `source`, keeping
    /// samples whose row and column are multiples of `stride`
    ///
    /// Every scalar of the plane is consumed in stream order. Slots whose
    /// scalar could not be read keep their previous value and are marked
    /// unfilled. Returns the number of scalars the source failed to supply.
    pub fn fill_from<S: ScalarSource>(
        &mut self,
        source: &mut S,
        dimension: usize,
        stride: usize,
    ) -> usize {
        let mut missing = 0;
        self.filled.fill(false);

        for j in 0..dimension {
            for k in 0..dimension {
                let Some(value) = source.next_scalar() else {
                    missing += 1;
                    continue;
                };
                if j % stride == 0 && k % stride == 0 {
                    let slot = (j / stride) * self.width + k / stride;
                    self.values[slot] = value;
                    self.filled[slot] = true;
                }
            }
        }

        self.complete = self.filled.iter().all(|&filled| filled);
        missing
    }

    /// Overwrite this slab with another of the same width
    fn copy_from(&mut self, other: &Slab) {
        self.values.copy_from_slice(&other.values);
        self.filled.copy_from_slice(&other.filled);
        self.complete = other.complete;
    }
}

/// Streams a volume two slabs at a time
///
/// Call order: [`load_first_slab`](Self::load_first_slab) once, then for
/// each scan step [`load_next_slab`](Self::load_next_slab), use the pair,
/// and [`rotate`](Self::rotate).
pub struct SlabReader<S> {
    source: S,
    dimension: usize,
    stride: usize,
    current: Slab,
    next: Slab,
    current_index: usize,
    next_index: usize,
    /// Next plane the stream cursor will deliver
    cursor_plane: usize,
    slabs_loaded: usize,
    missing_scalars: usize,
}

impl<S: ScalarSource> SlabReader<S> {
    /// Create a reader over `source`; nothing is read until the first load
    pub fn new(source: S, settings: &ExtractionSettings) -> Self {
        let width = settings.slab_width();
        Self {
            source,
            dimension: settings.dimension,
            stride: settings.stride.max(1),
            current: Slab::new(width),
            next: Slab::new(width),
            current_index: 0,
            next_index: 0,
            cursor_plane: 0,
            slabs_loaded: 0,
            missing_scalars: 0,
        }
    }

    /// Read plane 0 into the current slab
    pub fn load_first_slab(&mut self) {
        debug_assert_eq!(self.cursor_plane, 0, "first slab already loaded");
        let missing = self.current.fill_from(&mut self.source, self.dimension, self.stride);
        self.record_missing(missing, 0);
        self.current_index = 0;
        self.next_index = 0;
        self.cursor_plane = 1;
        self.slabs_loaded += 1;
    }

    /// Discard the `stride - 1` intermediate planes and read the plane
    /// `stride` steps past the current slab into the next slab
    pub fn load_next_slab(&mut self) {
        let target = self.current_index + self.stride;
        debug_assert!(self.cursor_plane <= target, "stream cursor passed the target plane");

        let plane_len = self.dimension * self.dimension;
        let to_skip = target.saturating_sub(self.cursor_plane) * plane_len;
        let skipped = self.source.skip_scalars(to_skip);
        self.record_missing(to_skip - skipped, target);

        let missing = self.next.fill_from(&mut self.source, self.dimension, self.stride);
        self.record_missing(missing, target);

        self.next_index = target;
        self.cursor_plane = target + 1;
        self.slabs_loaded += 1;
    }

    /// Make the next slab the current one
    ///
    /// The next slab keeps a copy of its samples, so a later short read
    /// leaves it holding the most recent plane rather than an older one.
    pub fn rotate(&mut self) {
        self.current.copy_from(&self.next);
        self.current_index = self.next_index;
    }

    /// Current (previous along the scan axis) slab
    pub fn current(&self) -> &Slab {
        &self.current
    }

    /// Next slab
    pub fn next(&self) -> &Slab {
        &self.next
    }

    /// Absolute scan index of the current slab
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Absolute scan index of the next slab
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Number of slabs read so far (including the first)
    pub fn slabs_loaded(&self) -> usize {
        self.slabs_loaded
    }

    /// Number of scalars the stream failed to supply so far
    pub fn missing_scalars(&self) -> usize {
        self.missing_scalars
    }

    /// Consume the reader, returning the source
    pub fn into_source(self) -> S {
        self.source
    }

    fn record_missing(&mut self, missing: usize, plane: usize) {
        if missing == 0 {
            return;
        }
        if self.missing_scalars == 0 {
            log::warn!(
                "Volume stream ran short at plane {}; cells touching unread samples are skipped",
                plane
            );
        }
        self.missing_scalars += missing;
    }
}
