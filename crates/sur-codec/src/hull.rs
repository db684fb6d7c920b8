//! Hull codec: id, type tag, and face list.
//!
//! The second header word packs the type tag into its low byte and a
//! redundant "reference vertex" word count into the high 24 bits. That
//! count is derived from the face count, so it is recomputed on encode and
//! deliberately not part of the round-trip equality contract.

use crate::cursor::{Reader, Writer};
use crate::error::{SurError, SurResult};
use crate::face::{read_face, write_face};
use crate::types::SurfaceHull;

/// Largest face count the signed 16-bit count field can carry.
pub const MAX_FACES: usize = i16::MAX as usize;

pub fn read_hull(r: &mut Reader<'_>) -> SurResult<SurfaceHull> {
    let id = r.u32()?;
    let packed = r.u32()?;
    #[allow(clippy::cast_possible_truncation)]
    let kind = (packed & 0xFF) as u8;
    // High 24 bits: reference vertex word count, recomputed on write.
    let face_count = r.i16()?;
    let unknown = r.u16()?;

    if face_count < 0 {
        return Err(SurError::CorruptFormat {
            context: "hull",
            detail: format!("negative face count {face_count}"),
        });
    }

    let mut faces = Vec::with_capacity(face_count as usize);
    let mut long_count = 0;
    for _ in 0..face_count {
        faces.push(read_face(r, &mut long_count)?);
    }

    Ok(SurfaceHull {
        id,
        kind,
        unknown,
        faces,
    })
}

pub fn write_hull(hull: &SurfaceHull, w: &mut Writer) -> SurResult<()> {
    let face_count = hull.faces.len();
    if face_count > MAX_FACES {
        return Err(SurError::FormatLimitExceeded {
            context: "hull face count",
            value: face_count as i64,
            max: MAX_FACES as i64,
        });
    }

    // 12-byte prologue plus 6 bytes per face, rounded down to 32-bit words.
    let ref_words = (12 + face_count as u32 * 6) / 4;

    w.u32(hull.id);
    w.u32(u32::from(hull.kind) | (ref_words << 8));
    #[allow(clippy::cast_possible_truncation)]
    w.u16(face_count as u16);
    w.u16(hull.unknown);

    let mut edge_count = 0;
    for face in &hull.faces {
        write_face(face, &mut edge_count, w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::FACE_SIZE;
    use crate::types::{FaceSide, HULL_LEAF, SurfaceFace};

    fn one_face_hull() -> SurfaceHull {
        SurfaceHull {
            id: 0x1122_3344,
            kind: HULL_LEAF,
            unknown: 0xBEEF,
            faces: vec![SurfaceFace {
                index: 0,
                opposite: 1,
                flag: false,
                sides: [
                    FaceSide {
                        point: 0,
                        shared: -1,
                        flag: false,
                    },
                    FaceSide {
                        point: 1,
                        shared: -1,
                        flag: false,
                    },
                    FaceSide {
                        point: 2,
                        shared: -1,
                        flag: false,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_wire_layout() {
        let mut w = Writer::new();
        write_hull(&one_face_hull(), &mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 12 + FACE_SIZE);

        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 0x1122_3344);
        // Type 4 in the low byte, (12 + 6) / 4 = 4 words above it.
        assert_eq!(
            u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            u32::from(HULL_LEAF) | (4 << 8)
        );
        assert_eq!(u16::from_le_bytes(bytes[8..10].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(bytes[10..12].try_into().unwrap()), 0xBEEF);
    }

    #[test]
    fn test_round_trip() {
        let hull = one_face_hull();
        let mut w = Writer::new();
        write_hull(&hull, &mut w).unwrap();
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        let out = read_hull(&mut r).unwrap();
        assert_eq!(out, hull);
        assert_eq!(r.position(), bytes.len());

        // Re-encoding the decoded hull reproduces the bytes exactly.
        let mut w2 = Writer::new();
        write_hull(&out, &mut w2).unwrap();
        assert_eq!(w2.into_bytes(), bytes);
    }

    #[test]
    fn test_edge_counter_threads_across_faces() {
        // Edges pair across the two faces; a per-face counter reset would
        // produce different shared values after a round trip.
        let mut hull = one_face_hull();
        let mut second = hull.faces[0];
        second.index = 1;
        for (i, side) in hull.faces[0].sides.iter_mut().enumerate() {
            side.shared = 3 + i as i32;
        }
        for (i, side) in second.sides.iter_mut().enumerate() {
            side.shared = i as i32;
        }
        hull.faces.push(second);

        let mut w = Writer::new();
        write_hull(&hull, &mut w).unwrap();
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(read_hull(&mut r).unwrap(), hull);
    }

    #[test]
    fn test_negative_face_count_rejected() {
        let mut w = Writer::new();
        w.u32(1);
        w.u32(4);
        w.u16(0xFFFF); // -1 as i16
        w.u16(0);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            read_hull(&mut r),
            Err(SurError::CorruptFormat { context: "hull", .. })
        ));
    }

    #[test]
    fn test_face_count_limit() {
        let mut hull = one_face_hull();
        hull.faces = vec![SurfaceFace::default(); MAX_FACES + 1];
        let mut w = Writer::new();
        assert!(matches!(
            write_hull(&hull, &mut w),
            Err(SurError::FormatLimitExceeded { .. })
        ));
    }
}
