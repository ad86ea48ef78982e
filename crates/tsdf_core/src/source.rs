//! Sequential scalar streams
//!
//! The extraction engine only ever needs "the next scalar" from its input.
//! [`ScalarSource`] captures that, [`RawScalarReader`] implements it over a
//! headerless binary stream of `f32` and [`SliceSource`] over values that
//! are already in memory.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde::{Serialize, Deserialize};

/// A forward-only stream of scalar samples
pub trait ScalarSource {
    /// Read the next scalar
    ///
    /// Returns `None` once the stream cannot supply a value. Sources do not
    /// recover after returning `None`.
    fn next_scalar(&mut self) -> Option<f32>;

    /// Read and discard up to `count` scalars, returning how many were read
    fn skip_scalars(&mut self, count: usize) -> usize {
        let mut skipped = 0;
        while skipped < count && self.next_scalar().is_some() {
            skipped += 1;
        }
        skipped
    }
}

impl<S: ScalarSource + ?Sized> ScalarSource for &mut S {
    fn next_scalar(&mut self) -> Option<f32> {
        (**self).next_scalar()
    }

    fn skip_scalars(&mut self, count: usize) -> usize {
        (**self).skip_scalars(count)
    }
}

/// Byte order of the scalars in a raw volume file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Byte order of the machine running the extraction
    #[default]
    Native,
    /// Little-endian
    Little,
    /// Big-endian
    Big,
}

impl ByteOrder {
    /// Decode one scalar
    #[inline]
    pub fn decode(self, bytes: [u8; 4]) -> f32 {
        match self {
            ByteOrder::Native => f32::from_ne_bytes(bytes),
            ByteOrder::Little => f32::from_le_bytes(bytes),
            ByteOrder::Big => f32::from_be_bytes(bytes),
        }
    }

    /// Encode one scalar
    #[inline]
    pub fn encode(self, value: f32) -> [u8; 4] {
        match self {
            ByteOrder::Native => value.to_ne_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }
}

/// Reads `f32` scalars from a headerless binary stream
pub struct RawScalarReader<R> {
    reader: R,
    byte_order: ByteOrder,
    scalars_read: usize,
    exhausted: bool,
}

impl RawScalarReader<BufReader<File>> {
    /// Open a raw volume file for buffered sequential reading
    pub fn open<P: AsRef<Path>>(path: P, byte_order: ByteOrder) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), byte_order))
    }
}

impl<R: Read> RawScalarReader<R> {
    /// Wrap a reader
    pub fn new(reader: R, byte_order: ByteOrder) -> Self {
        Self {
            reader,
            byte_order,
            scalars_read: 0,
            exhausted: false,
        }
    }

    /// Number of scalars successfully read so far
    pub fn scalars_read(&self) -> usize {
        self.scalars_read
    }

    /// True once a read has failed
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<R: Read> ScalarSource for RawScalarReader<R> {
    fn next_scalar(&mut self) -> Option<f32> {
        if self.exhausted {
            return None;
        }

        let mut bytes = [0u8; 4];
        match self.reader.read_exact(&mut bytes) {
            Ok(()) => {
                self.scalars_read += 1;
                Some(self.byte_order.decode(bytes))
            }
            Err(e) => {
                self.exhausted = true;
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    log::debug!("Volume stream ended after {} scalars", self.scalars_read);
                } else {
                    log::warn!("Volume read failed after {} scalars: {}", self.scalars_read, e);
                }
                None
            }
        }
    }
}

/// Streams scalars from an in-memory slice
#[derive(Clone, Debug)]
pub struct SliceSource<'a> {
    values: &'a [f32],
    position: usize,
}

impl<'a> SliceSource<'a> {
    /// Stream `values` from the start
    pub fn new(values: &'a [f32]) -> Self {
        Self { values, position: 0 }
    }

    /// Number of scalars not yet read
    pub fn remaining(&self) -> usize {
        self.values.len() - self.position
    }
}

impl ScalarSource for SliceSource<'_> {
    fn next_scalar(&mut self) -> Option<f32> {
        let value = self.values.get(self.position).copied()?;
        self.position += 1;
        Some(value)
    }

    fn skip_scalars(&mut self, count: usize) -> usize {
        let skipped = count.min(self.remaining());
        self.position += skipped;
        skipped
    }
}

/// Serialise scalars into the raw volume layout
pub fn encode_scalars(values: &[f32], byte_order: ByteOrder) -> Vec<u8> {
    values.iter().flat_map(|&v| byte_order.encode(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_byte_order_roundtrip() {
        for order in [ByteOrder::Native, ByteOrder::Little, ByteOrder::Big] {
            assert_eq!(order.decode(order.encode(-0.375)), -0.375);
        }
        assert_eq!(ByteOrder::Little.encode(1.0), [0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(ByteOrder::Big.encode(1.0), [0x3f, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn test_raw_reader_reads_in_order() {
        let bytes = encode_scalars(&[0.5, -1.0, 2.25], ByteOrder::Little);
        let mut reader = RawScalarReader::new(Cursor::new(bytes), ByteOrder::Little);
        assert_eq!(reader.next_scalar(), Some(0.5));
        assert_eq!(reader.next_scalar(), Some(-1.0));
        assert_eq!(reader.next_scalar(), Some(2.25));
        assert_eq!(reader.next_scalar(), None);
        assert_eq!(reader.scalars_read(), 3);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_raw_reader_partial_scalar_is_missing() {
        let mut bytes = encode_scalars(&[0.5], ByteOrder::Big);
        bytes.extend_from_slice(&[0x3f, 0x80]);
        let mut reader = RawScalarReader::new(Cursor::new(bytes), ByteOrder::Big);
        assert_eq!(reader.next_scalar(), Some(0.5));
        assert_eq!(reader.next_scalar(), None);
        // Stays exhausted
        assert_eq!(reader.next_scalar(), None);
        assert_eq!(reader.scalars_read(), 1);
    }

    #[test]
    fn test_skip_scalars_default() {
        let bytes = encode_scalars(&[1.0, 2.0, 3.0, 4.0], ByteOrder::Native);
        let mut reader = RawScalarReader::new(Cursor::new(bytes), ByteOrder::Native);
        assert_eq!(reader.skip_scalars(3), 3);
        assert_eq!(reader.next_scalar(), Some(4.0));
        assert_eq!(reader.skip_scalars(5), 0);
    }

    #[test]
    fn test_slice_source() {
        let values = [1.0, 2.0, 3.0];
        let mut source = SliceSource::new(&values);
        assert_eq!(source.next_scalar(), Some(1.0));
        assert_eq!(source.skip_scalars(10), 2);
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.next_scalar(), None);
    }

    #[test]
    fn test_mut_ref_is_a_source() {
        let values = [7.0];
        let mut source = SliceSource::new(&values);
        let by_ref = &mut source;
        fn first<S: ScalarSource>(mut s: S) -> Option<f32> {
            s.next_scalar()
        }
        assert_eq!(first(by_ref), Some(7.0));
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_open_missing_file() {
        let result = RawScalarReader::open("/nonexistent/dir/tsdf.bin", ByteOrder::Native);
        assert_eq!(result.err().map(|e| e.kind()), Some(io::ErrorKind::NotFound));
    }
}
