//! Extraction settings
//!
//! [`ExtractionSettings`] is the run context's immutable half: the volume
//! dimension, the decimation stride, the isolevel and the edge-interpolation
//! heuristics. Settings are checked with [`ExtractionSettings::validate`]
//! before a run starts.

/// Default edge length of the cubic volume
pub const DEFAULT_DIMENSION: usize = 512;

/// Default discontinuity threshold between adjacent samples
pub const DEFAULT_MAX_JUMP: f32 = 0.8;

/// Default tolerance for snapping to a corner
pub const DEFAULT_EPSILON: f32 = 1e-5;

/// Heuristics used when placing a vertex on a crossed edge
///
/// The defaults are tuned to a TSDF truncated at roughly one unit; volumes
/// with a different truncation band will want a different `max_jump`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolationParams {
    /// Edges whose corner values differ by more than this are rejected
    pub max_jump: f32,
    /// Tolerance for "value equals isolevel" and "values are equal"
    pub epsilon: f32,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            max_jump: DEFAULT_MAX_JUMP,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Settings for one extraction run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractionSettings {
    /// Samples per axis of the cubic volume (N)
    pub dimension: usize,
    /// Keep every `stride`-th sample along each axis
    pub stride: usize,
    /// Surface threshold; values `<=` isolevel are inside
    pub isolevel: f32,
    /// Edge interpolation heuristics
    pub interpolation: InterpolationParams,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            stride: 1,
            isolevel: 0.0,
            interpolation: InterpolationParams::default(),
        }
    }
}

impl ExtractionSettings {
    /// Create settings with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the volume dimension
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the decimation stride
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Set the isolevel
    pub fn with_isolevel(mut self, isolevel: f32) -> Self {
        self.isolevel = isolevel;
        self
    }

    /// Set the discontinuity threshold
    pub fn with_max_jump(mut self, max_jump: f32) -> Self {
        self.interpolation.max_jump = max_jump;
        self
    }

    /// Set the snapping tolerance
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.interpolation.epsilon = epsilon;
        self
    }

    /// Number of samples kept along each in-slab axis
    ///
    /// Positions `0, stride, 2*stride, ...` below `dimension` are kept.
    pub fn slab_width(&self) -> usize {
        if self.stride == 0 {
            return 0;
        }
        self.dimension.div_ceil(self.stride)
    }

    /// Number of cells along each in-slab axis: `dimension / stride - 1`
    ///
    /// When `stride` does not divide `dimension`, the last kept sample on
    /// each axis belongs to no cell.
    pub fn cells_per_axis(&self) -> usize {
        if self.stride == 0 {
            return 0;
        }
        (self.dimension / self.stride).saturating_sub(1)
    }

    /// Number of cells visited for each slab pair
    pub fn cells_per_slab_pair(&self) -> usize {
        let cells = self.cells_per_axis();
        cells * cells
    }

    /// Absolute scan-axis indices at which a new slab is processed
    ///
    /// The first slab (index 0) is loaded before the scan and is not included.
    pub fn scan_indices(&self) -> impl Iterator<Item = usize> {
        let stride = self.stride.max(1);
        (stride..self.dimension).step_by(stride)
    }

    /// Number of scalars in the complete volume
    pub fn volume_len(&self) -> usize {
        self.dimension * self.dimension * self.dimension
    }

    /// Validate the settings, returning all errors found
    ///
    /// Returns an empty vector if the settings are usable.
    pub fn validate(&self) -> Vec<SettingsError> {
        let mut errors = Vec::new();

        if self.dimension == 0 {
            errors.push(SettingsError::ZeroDimension);
        }
        if self.stride == 0 {
            errors.push(SettingsError::ZeroStride);
        } else if self.dimension > 0 && self.cells_per_axis() == 0 {
            errors.push(SettingsError::TooFewSamples {
                dimension: self.dimension,
                stride: self.stride,
            });
        }
        if !self.isolevel.is_finite() {
            errors.push(SettingsError::NonFiniteIsolevel(self.isolevel));
        }
        let max_jump = self.interpolation.max_jump;
        if max_jump.is_nan() || max_jump <= 0.0 {
            errors.push(SettingsError::NonPositiveMaxJump(max_jump));
        }
        let epsilon = self.interpolation.epsilon;
        if epsilon.is_nan() || epsilon < 0.0 {
            errors.push(SettingsError::NegativeEpsilon(epsilon));
        }

        errors
    }
}

/// A problem with [`ExtractionSettings`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsError {
    /// Volume dimension is zero
    ZeroDimension,
    /// Stride is zero
    ZeroStride,
    /// `dimension / stride` is below 2, so there are no cells
    TooFewSamples { dimension: usize, stride: usize },
    /// Isolevel is NaN or infinite
    NonFiniteIsolevel(f32),
    /// Discontinuity threshold is zero, negative or NaN
    NonPositiveMaxJump(f32),
    /// Snapping tolerance is negative or NaN
    NegativeEpsilon(f32),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::ZeroDimension => write!(f, "Volume dimension must be positive"),
            SettingsError::ZeroStride => write!(f, "Stride must be positive"),
            SettingsError::TooFewSamples { dimension, stride } => write!(
                f,
                "Stride {} leaves no cells along an axis of a {}-sample volume",
                stride, dimension
            ),
            SettingsError::NonFiniteIsolevel(v) => write!(f, "Isolevel must be finite, got {}", v),
            SettingsError::NonPositiveMaxJump(v) => {
                write!(f, "Discontinuity threshold must be positive, got {}", v)
            }
            SettingsError::NegativeEpsilon(v) => {
                write!(f, "Epsilon must not be negative, got {}", v)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ExtractionSettings::default();
        assert_eq!(settings.dimension, 512);
        assert_eq!(settings.stride, 1);
        assert_eq!(settings.isolevel, 0.0);
        assert_eq!(settings.interpolation.max_jump, 0.8);
        assert_eq!(settings.interpolation.epsilon, 1e-5);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_builder() {
        let settings = ExtractionSettings::new()
            .with_dimension(8)
            .with_stride(2)
            .with_isolevel(0.5)
            .with_max_jump(2.0)
            .with_epsilon(0.0);
        assert_eq!(settings.dimension, 8);
        assert_eq!(settings.stride, 2);
        assert_eq!(settings.isolevel, 0.5);
        assert_eq!(settings.interpolation.max_jump, 2.0);
        assert_eq!(settings.interpolation.epsilon, 0.0);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_slab_geometry() {
        let settings = ExtractionSettings::new().with_dimension(8).with_stride(2);
        assert_eq!(settings.slab_width(), 4);
        assert_eq!(settings.cells_per_slab_pair(), 9);
        assert_eq!(settings.scan_indices().collect::<Vec<_>>(), vec![2, 4, 6]);
        assert_eq!(settings.volume_len(), 512);

        let full = ExtractionSettings::new().with_dimension(512);
        assert_eq!(full.slab_width(), 512);
        assert_eq!(full.cells_per_slab_pair(), 511 * 511);
        assert_eq!(full.scan_indices().count(), 511);
    }

    #[test]
    fn test_uneven_stride_cell_range() {
        // Samples 0, 3, 6 survive but only 7 / 3 - 1 = 1 cell per axis
        let settings = ExtractionSettings::new().with_dimension(7).with_stride(3);
        assert_eq!(settings.slab_width(), 3);
        assert_eq!(settings.cells_per_axis(), 1);
        assert_eq!(settings.cells_per_slab_pair(), 1);
        assert_eq!(settings.scan_indices().collect::<Vec<_>>(), vec![3, 6]);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_uneven_stride_without_cells() {
        // 5 / 3 - 1 = 0 even though samples 0 and 3 survive
        let settings = ExtractionSettings::new().with_dimension(5).with_stride(3);
        assert_eq!(settings.slab_width(), 2);
        assert_eq!(settings.cells_per_axis(), 0);
        assert_eq!(
            settings.validate(),
            vec![SettingsError::TooFewSamples { dimension: 5, stride: 3 }]
        );
    }

    #[test]
    fn test_zero_stride() {
        let settings = ExtractionSettings::new().with_stride(0);
        assert_eq!(settings.validate(), vec![SettingsError::ZeroStride]);
        assert_eq!(settings.slab_width(), 0);
        assert_eq!(settings.cells_per_axis(), 0);
        assert_eq!(settings.cells_per_slab_pair(), 0);
    }

    #[test]
    fn test_zero_dimension() {
        let settings = ExtractionSettings::new().with_dimension(0);
        assert_eq!(settings.validate(), vec![SettingsError::ZeroDimension]);
    }

    #[test]
    fn test_stride_too_large() {
        let settings = ExtractionSettings::new().with_dimension(4).with_stride(4);
        assert_eq!(
            settings.validate(),
            vec![SettingsError::TooFewSamples { dimension: 4, stride: 4 }]
        );
    }

    #[test]
    fn test_bad_heuristics() {
        let settings = ExtractionSettings::new()
            .with_isolevel(f32::NAN)
            .with_max_jump(0.0)
            .with_epsilon(-1.0);
        let errors = settings.validate();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], SettingsError::NonFiniteIsolevel(_)));
        assert_eq!(errors[1], SettingsError::NonPositiveMaxJump(0.0));
        assert_eq!(errors[2], SettingsError::NegativeEpsilon(-1.0));
    }

    #[test]
    fn test_infinite_max_jump_disables_rejection() {
        let settings = ExtractionSettings::new().with_max_jump(f32::INFINITY);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_error_display() {
        let msg = SettingsError::TooFewSamples { dimension: 4, stride: 8 }.to_string();
        assert!(msg.contains("Stride 8"));
        assert!(msg.contains("4-sample"));
        assert_eq!(SettingsError::ZeroStride.to_string(), "Stride must be positive");
    }
}
