//! Streaming extraction
//!
//! [`Extractor`] drives one pass over the volume: it loads the first slab,
//! then for every `stride`-th plane loads the next slab, runs every cell of
//! the slab pair through classify -> interpolate -> emit, and rotates.
//!
//! Triangles reach the sink in scan order (plane, then row, then column),
//! and within a cell in triangle-table order, so identical input always
//! produces an identical mesh.

use crate::cell::SlabPair;
use crate::classify::classify;
use crate::emit::{emit_triangles, CellOutcome};
use crate::error::ExtractError;
use crate::interpolate::EdgeVertices;
use crate::mesh::{Mesh, MeshSink};
use crate::settings::ExtractionSettings;
use crate::slab::SlabReader;
use crate::source::ScalarSource;

/// Counters for one extraction run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Slabs read from the stream, including the first
    pub slabs_loaded: usize,
    /// Cells sampled
    pub cells_visited: usize,
    /// Cells that crossed the surface and emitted their triangulation
    pub cells_processed: usize,
    /// Cells that crossed the surface but used a rejected edge
    pub cells_rejected: usize,
    /// Cells skipped because a corner was missing from the stream
    pub cells_incomplete: usize,
    /// Triangles emitted
    pub triangles: usize,
    /// Scalars the stream failed to supply
    pub missing_scalars: usize,
}

impl ExtractionStats {
    /// Account for one cell
    pub fn record(&mut self, outcome: CellOutcome) {
        self.cells_visited += 1;
        match outcome {
            CellOutcome::Empty => {}
            CellOutcome::Rejected => self.cells_rejected += 1,
            CellOutcome::Incomplete => self.cells_incomplete += 1,
            CellOutcome::Emitted(count) => {
                self.cells_processed += 1;
                self.triangles += count;
            }
        }
    }
}

/// Result of [`extract_mesh`]
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    pub mesh: Mesh,
    pub stats: ExtractionStats,
}

/// Where the scan is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// Nothing read yet
    ScanningFirstSlab,
    /// About to read the slab at this scan index
    ScanningNextSlab(usize),
    /// Slab pair ending at this scan index is loaded; cells are next
    ProcessingCellRow(usize),
    /// The scan axis is exhausted
    Done,
}

/// Run every cell of a slab pair through the pipeline
///
/// Cells are visited row by row (`j`), then column by column (`k`), over
/// `settings.cells_per_axis()` cells per axis. Cells with a corner the
/// stream never supplied are skipped.
pub fn process_slab_pair<M: MeshSink + ?Sized>(
    pair: &SlabPair<'_>,
    settings: &ExtractionSettings,
    stats: &mut ExtractionStats,
    sink: &mut M,
) {
    let cells = settings.cells_per_axis();
    for j in 0..cells {
        for k in 0..cells {
            if !pair.corners_filled(j, k) {
                stats.record(CellOutcome::Incomplete);
                continue;
            }
            let cell = pair.cell(j, k);
            let outcome = match classify(&cell, settings.isolevel) {
                None => CellOutcome::Empty,
                Some((index, mask)) => {
                    let vertices = EdgeVertices::compute(
                        &cell,
                        mask,
                        settings.isolevel,
                        &settings.interpolation,
                    );
                    emit_triangles(index, &vertices, sink)
                }
            };
            stats.record(outcome);
        }
    }
}

/// Streaming Marching-Cubes extraction over a scalar source
pub struct Extractor<S> {
    settings: ExtractionSettings,
    reader: SlabReader<S>,
    state: ScanState,
    stats: ExtractionStats,
}

impl<S: ScalarSource> Extractor<S> {
    /// Create an extractor; fails if the settings cannot produce a scan
    pub fn new(source: S, settings: ExtractionSettings) -> Result<Self, ExtractError> {
        if let Some(err) = settings.validate().into_iter().next() {
            return Err(err.into());
        }

        Ok(Self {
            reader: SlabReader::new(source, &settings),
            settings,
            state: ScanState::ScanningFirstSlab,
            stats: ExtractionStats::default(),
        })
    }

    /// Settings for this run
    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Current position in the scan
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Counters so far
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// Scan the whole volume, sending triangles to `sink`
    pub fn run<M: MeshSink + ?Sized>(self, sink: &mut M) -> ExtractionStats {
        self.run_with_progress(sink, |_, _| {})
    }

    /// Scan the whole volume, calling `progress` after each slab pair with
    /// the scan index just completed and the counters so far
    pub fn run_with_progress<M, F>(mut self, sink: &mut M, mut progress: F) -> ExtractionStats
    where
        M: MeshSink + ?Sized,
        F: FnMut(usize, &ExtractionStats),
    {
        log::info!(
            "Extracting isosurface at {} from a {}^3 volume (stride {})",
            self.settings.isolevel,
            self.settings.dimension,
            self.settings.stride
        );

        while self.state != ScanState::Done {
            let before = self.state;
            self.step(sink);
            if let ScanState::ProcessingCellRow(index) = before {
                progress(index, &self.stats);
            }
        }

        log::info!(
            "A total of {} cubes are processed, {} triangles emitted",
            self.stats.cells_processed,
            self.stats.triangles
        );
        if self.stats.cells_rejected > 0 {
            log::debug!(
                "{} cells rejected at discontinuities",
                self.stats.cells_rejected
            );
        }
        if self.stats.cells_incomplete > 0 {
            log::warn!(
                "{} cells skipped for samples missing from the stream",
                self.stats.cells_incomplete
            );
        }

        self.stats
    }

    /// Advance the state machine by one transition
    fn step<M: MeshSink + ?Sized>(&mut self, sink: &mut M) {
        self.state = match self.state {
            ScanState::ScanningFirstSlab => {
                self.reader.load_first_slab();
                self.sync_reader_stats();
                self.after_slab(0)
            }
            ScanState::ScanningNextSlab(index) => {
                log::debug!(
                    "Scanning layer {}/{}",
                    index,
                    self.settings.dimension - self.settings.stride
                );
                self.reader.load_next_slab();
                self.sync_reader_stats();
                debug_assert_eq!(self.reader.next_index(), index);
                ScanState::ProcessingCellRow(index)
            }
            ScanState::ProcessingCellRow(index) => {
                let pair = SlabPair::new(
                    self.reader.current(),
                    self.reader.next(),
                    self.reader.current_index(),
                    self.reader.next_index(),
                    self.settings.stride,
                );
                process_slab_pair(&pair, &self.settings, &mut self.stats, sink);
                self.reader.rotate();
                self.after_slab(index)
            }
            ScanState::Done => ScanState::Done,
        };
    }

    fn after_slab(&self, index: usize) -> ScanState {
        let next = index + self.settings.stride;
        if next < self.settings.dimension {
            ScanState::ScanningNextSlab(next)
        } else {
            ScanState::Done
        }
    }

    fn sync_reader_stats(&mut self) {
        self.stats.slabs_loaded = self.reader.slabs_loaded();
        self.stats.missing_scalars = self.reader.missing_scalars();
    }
}

/// Extract the isosurface of a streamed volume into a new [`Mesh`]
pub fn extract_mesh<S: ScalarSource>(
    source: S,
    settings: ExtractionSettings,
) -> Result<Extraction, ExtractError> {
    let extractor = Extractor::new(source, settings)?;
    let mut mesh = Mesh::new();
    let stats = extractor.run(&mut mesh);
    Ok(Extraction { mesh, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsError;
    use crate::source::SliceSource;

    /// Signed distance to the plane x = 1.5, truncated at 0.3
    fn layered(dimension: usize) -> Vec<f32> {
        let mut values = Vec::new();
        for i in 0..dimension {
            for _ in 0..dimension * dimension {
                values.push((i as f32 - 1.5).clamp(-0.3, 0.3));
            }
        }
        values
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let values = layered(4);
        let settings = ExtractionSettings::new().with_dimension(4).with_stride(0);
        let result = Extractor::new(SliceSource::new(&values), settings);
        assert!(matches!(
            result.err(),
            Some(ExtractError::InvalidSettings(SettingsError::ZeroStride))
        ));
    }

    #[test]
    fn test_state_machine_sequence() {
        let values = layered(4);
        let settings = ExtractionSettings::new().with_dimension(4).with_stride(2);
        let mut extractor = Extractor::new(SliceSource::new(&values), settings).unwrap();
        let mut mesh = Mesh::new();

        assert_eq!(extractor.state(), ScanState::ScanningFirstSlab);
        extractor.step(&mut mesh);
        assert_eq!(extractor.state(), ScanState::ScanningNextSlab(2));
        extractor.step(&mut mesh);
        assert_eq!(extractor.state(), ScanState::ProcessingCellRow(2));
        extractor.step(&mut mesh);
        assert_eq!(extractor.state(), ScanState::Done);
        extractor.step(&mut mesh);
        assert_eq!(extractor.state(), ScanState::Done);
        assert_eq!(extractor.stats().slabs_loaded, 2);
    }

    #[test]
    fn test_layered_volume_makes_a_flat_sheet() {
        let values = layered(4);
        let settings = ExtractionSettings::new().with_dimension(4);
        let Extraction { mesh, stats } =
            extract_mesh(SliceSource::new(&values), settings).unwrap();

        // Only the pair (1, 2) straddles x = 1.5: 3x3 cells, 2 triangles each
        assert_eq!(stats.slabs_loaded, 4);
        assert_eq!(stats.cells_visited, 27);
        assert_eq!(stats.cells_processed, 9);
        assert_eq!(stats.triangles, 18);
        assert_eq!(mesh.triangle_count(), 18);
        for triangle in mesh.iter() {
            for v in triangle.vertices {
                assert!((v.x - 1.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_progress_reports_each_pair() {
        let values = layered(4);
        let settings = ExtractionSettings::new().with_dimension(4);
        let extractor = Extractor::new(SliceSource::new(&values), settings).unwrap();
        let mut mesh = Mesh::new();
        let mut seen = Vec::new();
        extractor.run_with_progress(&mut mesh, |index, stats| {
            seen.push((index, stats.triangles));
        });
        assert_eq!(seen, vec![(1, 0), (2, 18), (3, 18)]);
    }

    #[test]
    fn test_stats_record() {
        let mut stats = ExtractionStats::default();
        stats.record(CellOutcome::Empty);
        stats.record(CellOutcome::Rejected);
        stats.record(CellOutcome::Emitted(3));
        stats.record(CellOutcome::Incomplete);
        assert_eq!(stats.cells_visited, 4);
        assert_eq!(stats.cells_rejected, 1);
        assert_eq!(stats.cells_incomplete, 1);
        assert_eq!(stats.cells_processed, 1);
        assert_eq!(stats.triangles, 3);
    }
}
