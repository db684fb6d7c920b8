//! Face codec: one triangle per four 32-bit words.
//!
//! Each face is a header word followed by three side words. A side stores a
//! point index and a signed delta locating the reverse edge pair elsewhere
//! in the hull, relative to a rolling counter.
//!
//! The two directions use different counter bases, and both must be
//! reproduced exactly:
//!
//! - **decode** counts 32-bit *words* (`long_count`): one increment per side
//!   plus one per face, covering the header word. The raw delta lands on a
//!   word position, which `w - w / 4` converts to a logical edge index
//!   (three edges per four words).
//! - **encode** counts logical *edges* (`edge_count`): one increment per
//!   side only. `shared + shared / 3` converts the target edge index back
//!   to a word position.
//!
//! Collapsing the two counters into one looks equivalent and is not; see
//! the cross-face vectors in the tests below.

use crate::cursor::{Reader, Writer};
use crate::error::{SurError, SurResult};
use crate::types::{FaceSide, SurfaceFace};

/// Encoded size of one face in bytes.
pub const FACE_SIZE: usize = 16;

/// Largest value of the 12-bit header index fields.
pub const MAX_FACE_INDEX: u32 = 0xFFF;

// Side deltas are sign-extended from bit 14.
const DELTA_MIN: i32 = -0x4000;
const DELTA_MAX: i32 = 0x3FFF;

/// Read one face, threading the hull-wide word counter.
pub fn read_face(r: &mut Reader<'_>, long_count: &mut i32) -> SurResult<SurfaceFace> {
    let header = r.u32()?;
    let mut face = SurfaceFace {
        index: header & MAX_FACE_INDEX,
        opposite: (header >> 12) & MAX_FACE_INDEX,
        flag: header >> 31 != 0,
        sides: [FaceSide::default(); 3],
    };

    for side in &mut face.sides {
        let point = r.u16()?;
        let packed = r.u16()?;

        let mut delta = i32::from(packed & 0x3FFF);
        if packed & 0x4000 != 0 {
            delta |= !0x3FFF;
        }

        // Word position of the referenced edge, then word -> edge.
        let edge_offset = *long_count + delta;
        *side = FaceSide {
            point,
            shared: edge_offset - edge_offset / 4,
            flag: packed & 0x8000 != 0,
        };
        *long_count += 1;
    }
    // Account for the header word.
    *long_count += 1;

    Ok(face)
}

/// Write one face, threading the hull-wide edge counter.
pub fn write_face(face: &SurfaceFace, edge_count: &mut i32, w: &mut Writer) -> SurResult<()> {
    if face.index > MAX_FACE_INDEX {
        return Err(SurError::FormatLimitExceeded {
            context: "face index",
            value: i64::from(face.index),
            max: i64::from(MAX_FACE_INDEX),
        });
    }
    if face.opposite > MAX_FACE_INDEX {
        return Err(SurError::FormatLimitExceeded {
            context: "face opposite index",
            value: i64::from(face.opposite),
            max: i64::from(MAX_FACE_INDEX),
        });
    }

    w.u32(face.index | (face.opposite << 12) | (u32::from(face.flag) << 31));

    for side in &face.sides {
        // Edge -> word on both ends of the subtraction.
        let delta = side.shared - *edge_count + side.shared / 3 - *edge_count / 3;
        if !(DELTA_MIN..=DELTA_MAX).contains(&delta) {
            return Err(SurError::FormatLimitExceeded {
                context: "edge adjacency delta",
                value: i64::from(delta),
                max: i64::from(DELTA_MAX),
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let packed = (delta & 0x7FFF) as u16 | (u16::from(side.flag) << 15);
        w.u16(side.point);
        w.u16(packed);
        *edge_count += 1;
    }

    Ok(())
}
