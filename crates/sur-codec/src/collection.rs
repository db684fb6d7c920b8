//! Container codec: the `vers` header and the part sequence.
//!
//! A collection is a magic tag, a floating-point format version, and then
//! part records back to back until the end of the stream. Parts are keyed
//! by id; the map is ordered so encoding is deterministic.

use std::collections::BTreeMap;

use crate::cursor::{Reader, Writer};
use crate::error::{SurError, SurResult};
use crate::part::{read_part, write_part};
use crate::types::SurfacePart;

pub const TAG_VERS: u32 = u32::from_le_bytes(*b"vers");

/// Format version written by this encoder and by every known tool.
pub const VERSION: f32 = 2.0;

/// Decode an entire collection, strictly.
///
/// Any part error is returned as-is; callers wanting to salvage the
/// readable parts of a damaged file should drive [`read_part`] themselves,
/// which positions the cursor past a recoverably-corrupt part.
pub fn decode_collection(data: &[u8]) -> SurResult<(f32, BTreeMap<u32, SurfacePart>)> {
    let mut r = Reader::new(data);
    let version = decode_header(&mut r)?;
    let mut parts = BTreeMap::new();
    while !r.at_end() {
        let part = read_part(&mut r)?;
        parts.insert(part.id, part);
    }
    Ok((version, parts))
}

/// Read and validate the `vers` header, leaving the cursor at the first
/// part record.
pub fn decode_header(r: &mut Reader<'_>) -> SurResult<f32> {
    let tag = r.u32()?;
    if tag != TAG_VERS {
        return Err(SurError::UnsupportedTag { tag });
    }
    r.f32()
}

/// Encode a collection. Parts are emitted in ascending id order.
pub fn encode_collection(
    version: f32,
    parts: &BTreeMap<u32, SurfacePart>,
) -> SurResult<Vec<u8>> {
    let mut w = Writer::new();
    w.u32(TAG_VERS);
    w.f32(version);
    for part in parts.values() {
        write_part(part, &mut w)?;
    }
    Ok(w.into_bytes())
}
