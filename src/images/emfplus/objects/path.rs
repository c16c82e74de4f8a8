//! Path objects.
//!
//! Point coordinates come in three encodings selected by [`PathPointFlags`]:
//! plain `PointF`, 16-bit integer points, or relative points whose
//! coordinates are variable-length deltas from the previous point. Point
//! types are either one byte per point or run-length encoded.

use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::header::RecordType;
use crate::images::emfplus::objects::skip_padding;
use crate::images::emfplus::types::{Decode, GraphicsVersion, Point, PointF, ensure_elements};
use bitflags::bitflags;
use serde::Serialize;
use smallvec::SmallVec;

bitflags! {
    /// Encoding of a path's points and point types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct PathPointFlags: u32 {
        /// Points are relative `PointR` deltas
        const RELATIVE = 0x0000_0800;
        /// Point types are run-length encoded
        const RLE = 0x0000_1000;
        /// Points are 16-bit integers
        const COMPRESSED = 0x0000_4000;
    }
}

wire_enum! {
    /// Kind of a path point (low three bits of a point type byte).
    pub enum PathPointKind: u8 {
        Start = 0,
        Line = 1,
        Bezier = 3,
    }
}

/// One point type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathPointType {
    pub kind: PathPointKind,
    pub dash_mode: bool,
    pub marker: bool,
    pub close_subpath: bool,
}

impl PathPointType {
    fn parse(raw: u8, offset: usize) -> Result<Self> {
        Ok(Self {
            kind: PathPointKind::parse("PathPointType", raw & 0x07, offset)?,
            dash_mode: raw & 0x10 != 0,
            marker: raw & 0x20 != 0,
            close_subpath: raw & 0x80 != 0,
        })
    }
}

/// Points in the encoding they were stored with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathPoints {
    Float(Vec<PointF>),
    Integer(Vec<Point>),
    /// Relative points, already accumulated into absolute coordinates
    Relative(Vec<(i32, i32)>),
}

impl PathPoints {
    pub fn len(&self) -> usize {
        match self {
            PathPoints::Float(points) => points.len(),
            PathPoints::Integer(points) => points.len(),
            PathPoints::Relative(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Points as floating-point coordinates.
    pub fn to_point_f(&self) -> Vec<PointF> {
        match self {
            PathPoints::Float(points) => points.clone(),
            PathPoints::Integer(points) => points
                .iter()
                .map(|p| PointF {
                    x: f32::from(p.x),
                    y: f32::from(p.y),
                })
                .collect(),
            PathPoints::Relative(points) => points
                .iter()
                .map(|&(x, y)| PointF {
                    x: x as f32,
                    y: y as f32,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathObject {
    pub version: GraphicsVersion,
    pub point_flags: PathPointFlags,
    pub points: PathPoints,
    pub point_types: Vec<PathPointType>,
}

impl PathObject {
    /// Decode a path that extends to the end of `cursor`.
    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;
        let count = cursor.read_u32()? as usize;
        let point_flags = PathPointFlags::from_bits_retain(cursor.read_u32()?);

        let points = if point_flags.contains(PathPointFlags::RELATIVE) {
            ensure_elements(cursor, count, 2)?;
            PathPoints::Relative(read_relative_points(cursor, count)?)
        } else if point_flags.contains(PathPointFlags::COMPRESSED) {
            ensure_elements(cursor, count, 4)?;
            PathPoints::Integer((0..count).map(|_| Point::decode(cursor)).collect::<Result<_>>()?)
        } else {
            ensure_elements(cursor, count, 8)?;
            PathPoints::Float((0..count).map(|_| PointF::decode(cursor)).collect::<Result<_>>()?)
        };

        let point_types = if point_flags.contains(PathPointFlags::RLE) {
            read_rle_types(cursor, count)?
        } else {
            ensure_elements(cursor, count, 1)?;
            let offset = cursor.position();
            cursor
                .read_bytes(count)?
                .iter()
                .enumerate()
                .map(|(i, &raw)| PathPointType::parse(raw, offset + i))
                .collect::<Result<_>>()?
        };

        skip_padding(cursor)?;
        Ok(Self {
            version,
            point_flags,
            points,
            point_types,
        })
    }
}

/// Read one `PointR` coordinate: a 7-bit value in one byte, or a 15-bit
/// big-endian value in two bytes when the high bit of the first is set.
fn read_relative_coordinate(cursor: &mut BinaryCursor<'_>) -> Result<i32> {
    let first = cursor.read_u8()?;
    if first & 0x80 == 0 {
        // Sign-extend from 7 bits
        Ok(i32::from(((first << 1) as i8) >> 1))
    } else {
        let second = cursor.read_u8()?;
        let raw = (u16::from(first & 0x7F) << 8) | u16::from(second);
        Ok(i32::from(((raw << 1) as i16) >> 1))
    }
}

fn read_relative_points(cursor: &mut BinaryCursor<'_>, count: usize) -> Result<Vec<(i32, i32)>> {
    let mut points = Vec::with_capacity(count);
    let (mut x, mut y) = (0i32, 0i32);
    for _ in 0..count {
        x = x.wrapping_add(read_relative_coordinate(cursor)?);
        y = y.wrapping_add(read_relative_coordinate(cursor)?);
        points.push((x, y));
    }
    Ok(points)
}

/// Expand run-length encoded point types to exactly `count` entries.
fn read_rle_types(cursor: &mut BinaryCursor<'_>, count: usize) -> Result<Vec<PathPointType>> {
    let mut runs: SmallVec<[(usize, PathPointType); 8]> = SmallVec::new();
    let mut total = 0usize;
    while total < count {
        let offset = cursor.position();
        let header = cursor.read_u8()?;
        let raw_type = cursor.read_u8()?;

        let run = usize::from(header & 0x3F);
        let mut point_type = PathPointType::parse(raw_type, offset + 1)?;
        if header & 0x80 != 0 {
            point_type.kind = PathPointKind::Bezier;
        }
        total += run;
        if total > count {
            return Err(Error::SizeInvariantViolation {
                offset,
                record: RecordType::Object,
                detail: format!("point type runs cover {total} points, path has {count}"),
            });
        }
        runs.push((run, point_type));
    }

    let mut types = Vec::with_capacity(count);
    for (run, point_type) in runs {
        types.extend(std::iter::repeat_n(point_type, run));
    }
    Ok(types)
}
