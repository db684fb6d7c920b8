//! Point pool codec.
//!
//! The point pool is a flat, order-significant array shared by every hull of
//! one part. Each entry is 16 bytes: three `f32` position components and a
//! `u32` submesh id.

use crate::cursor::{Reader, Writer};
use crate::error::SurResult;
use crate::types::SurfacePoint;

/// Encoded size of one point in bytes.
pub const POINT_SIZE: usize = 16;

/// Read `count` points, advancing the cursor by exactly `16 * count` bytes.
pub fn read_points(r: &mut Reader<'_>, count: usize) -> SurResult<Vec<SurfacePoint>> {
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        points.push(SurfacePoint {
            position: r.vec3()?,
            mesh_id: r.u32()?,
        });
    }
    Ok(points)
}

pub fn write_points(points: &[SurfacePoint], w: &mut Writer) {
    for point in points {
        w.vec3(point.position);
        w.u32(point.mesh_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurError;
    use glam::Vec3;

    #[test]
    fn test_read_points() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        bytes.extend_from_slice(&2.0f32.to_le_bytes());
        bytes.extend_from_slice(&(-3.0f32).to_le_bytes());
        bytes.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());

        let mut r = Reader::new(&bytes);
        let points = read_points(&mut r, 1).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].position, Vec3::new(1.0, 2.0, -3.0));
        assert_eq!(points[0].mesh_id, 0xDEAD_BEEF);
        assert_eq!(r.position(), POINT_SIZE);
    }

    #[test]
    fn test_read_points_truncated() {
        let bytes = [0u8; POINT_SIZE + 3];
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            read_points(&mut r, 2),
            Err(SurError::TruncatedStream { .. })
        ));
    }

    #[test]
    fn test_write_then_read() {
        let points = vec![
            SurfacePoint::new(Vec3::new(0.5, -0.5, 10.0), 1),
            SurfacePoint::new(Vec3::ZERO, 2),
        ];
        let mut w = Writer::new();
        write_points(&points, &mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), points.len() * POINT_SIZE);

        let mut r = Reader::new(&bytes);
        assert_eq!(read_points(&mut r, 2).unwrap(), points);
    }
}
