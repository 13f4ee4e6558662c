//! # Circle File Format
//!
//! Serialization and deserialization for trained circle sets.
//!
//! ## Format
//!
//! All integers and floats little-endian.
//!
//! ```text
//! [Header: 25 bytes]
//!   - Magic: "HCS\0" (4 bytes)
//!   - Version: u32 (4 bytes)
//!   - Dimensionality: u32 (4 bytes)
//!   - Class count: u32 (4 bytes)
//!   - Metric: u8 (0=Euclidean, 1=Manhattan, 2=Cubic)
//!   - Circle count: u64 (8 bytes)
//!
//! [Circles: count * (12 + 4 * dimensionality) bytes]
//!   For each circle, in insertion order:
//!     - Radius: f32
//!     - Class: i32
//!     - Point count: i32
//!     - Center: dimensionality * f32
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let bytes = SerializedCircles::from_model(&model).to_bytes()?;
//! std::fs::write("model.hcs", bytes)?;
//!
//! let bytes = std::fs::read("model.hcs")?;
//! let model = SerializedCircles::from_bytes(&bytes)?.into_model()?;
//! ```

use std::io::{Cursor, Read, Write};

use crate::core::{CircleRecord, CircleSet, MetricKind};
use crate::ports::{StoreError, StoreResult};

/// Magic bytes for circle files
pub const MAGIC: &[u8; 4] = b"HCS\0";

/// Current format version
pub const VERSION: u32 = 1;

const HEADER_LEN: usize = 4 + 4 + 4 + 4 + 1 + 8;

/// Decoded circle file
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedCircles {
    pub version: u32,
    pub dimensionality: u32,
    pub num_classes: u32,
    pub metric: MetricKind,
    pub records: Vec<CircleRecord>,
}

impl SerializedCircles {
    /// Snapshot a trained model
    pub fn from_model(model: &CircleSet) -> Self {
        Self {
            version: VERSION,
            dimensionality: model.dimensionality() as u32,
            num_classes: model.num_classes() as u32,
            metric: model.metric(),
            records: model.to_records(),
        }
    }

    /// Rebuild the model; classifies identically to the one saved
    pub fn into_model(self) -> StoreResult<CircleSet> {
        let model = CircleSet::from_records(
            self.records,
            self.num_classes as usize,
            self.dimensionality as usize,
            self.metric,
        )?;
        Ok(model)
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        let dims = self.dimensionality as usize;
        let mut buf =
            Vec::with_capacity(HEADER_LEN + self.records.len() * CircleRecord::byte_len(dims));

        // Header
        buf.write_all(MAGIC)?;
        buf.write_all(&self.version.to_le_bytes())?;
        buf.write_all(&self.dimensionality.to_le_bytes())?;
        buf.write_all(&self.num_classes.to_le_bytes())?;
        buf.write_all(&[self.metric.to_u8()])?;
        buf.write_all(&(self.records.len() as u64).to_le_bytes())?;

        for (i, record) in self.records.iter().enumerate() {
            if record.center.len() != dims {
                return Err(StoreError::Corrupted(format!(
                    "circle {} has {} dimensions, expected {}",
                    i,
                    record.center.len(),
                    dims
                )));
            }

            buf.write_all(&record.radius.to_le_bytes())?;
            buf.write_all(&record.class.to_le_bytes())?;
            buf.write_all(&record.point_count.to_le_bytes())?;
            for &v in &record.center {
                buf.write_all(&v.to_le_bytes())?;
            }
        }

        Ok(buf)
    }

    /// Deserialize from bytes
    pub fn from_bytes(data: &[u8]) -> StoreResult<Self> {
        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(StoreError::InvalidMagic);
        }

        let version = read_u32(&mut cursor)?;
        if version != VERSION {
            return Err(StoreError::UnsupportedVersion(version));
        }

        let dimensionality = read_u32(&mut cursor)?;
        let num_classes = read_u32(&mut cursor)?;

        let mut metric_byte = [0u8; 1];
        cursor.read_exact(&mut metric_byte)?;
        let metric = MetricKind::from_u8(metric_byte[0])
            .ok_or_else(|| StoreError::Corrupted(format!("Invalid metric: {}", metric_byte[0])))?;

        let mut count_bytes = [0u8; 8];
        cursor.read_exact(&mut count_bytes)?;
        let count = u64::from_le_bytes(count_bytes);

        // the body must be exactly count records long
        let dims = dimensionality as usize;
        let body = (data.len() - HEADER_LEN) as u64;
        let record_len = CircleRecord::byte_len(dims) as u64;
        if count.checked_mul(record_len) != Some(body) {
            return Err(StoreError::Corrupted(format!(
                "{} circles of {} bytes do not fit {} body bytes",
                count, record_len, body
            )));
        }

        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let radius = read_f32(&mut cursor)?;
            let class = read_i32(&mut cursor)?;
            let point_count = read_i32(&mut cursor)?;

            let mut center = Vec::with_capacity(dims);
            for _ in 0..dims {
                center.push(read_f32(&mut cursor)?);
            }

            records.push(CircleRecord {
                radius,
                class,
                point_count,
                center,
            });
        }

        Ok(Self {
            version,
            dimensionality,
            num_classes,
            metric,
            records,
        })
    }
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> StoreResult<u32> {
    let mut bytes = [0u8; 4];
    cursor.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_i32(cursor: &mut Cursor<&[u8]>) -> StoreResult<i32> {
    let mut bytes = [0u8; 4];
    cursor.read_exact(&mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

fn read_f32(cursor: &mut Cursor<&[u8]>) -> StoreResult<f32> {
    let mut bytes = [0u8; 4];
    cursor.read_exact(&mut bytes)?;
    Ok(f32::from_le_bytes(bytes))
}
