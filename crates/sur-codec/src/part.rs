//! Surface part codec: the top-level per-id record.
//!
//! A part is an id, a section count, and that many tagged sections. The
//! `surf` section carries the whole hull/point/node subtree behind a
//! 48-byte header whose size and offset fields can only be filled in after
//! the subtree has been written, so encoding reserves the header and
//! back-patches it last.

use crate::cursor::{Reader, Writer};
use crate::error::{SurError, SurResult};
use crate::node::{read_tree, write_tree};
use crate::point::{POINT_SIZE, read_points};
use crate::types::{SurfacePart, scale_from_byte, scale_to_byte};

pub const TAG_SURF: u32 = u32::from_le_bytes(*b"surf");
pub const TAG_EXTS: u32 = u32::from_le_bytes(*b"exts");
pub const TAG_NOT_FIXED: u32 = u32::from_le_bytes(*b"!fxd");
pub const TAG_HPID: u32 = u32::from_le_bytes(*b"hpid");

/// Fixed `surf` header length, not counting the size field before it.
const HEADER_SIZE: usize = 48;

/// The header stores the section size in 24 bits.
const MAX_SECTION: usize = 1 << 24;

/// Decode one part record.
///
/// On a structurally corrupt `surf` payload whose section end is known and
/// in-bounds, the remaining sections of the part are still consumed before
/// the error is returned, leaving the cursor at the next part record so a
/// collection loader can discard just this part. Truncation errors give no
/// such guarantee.
pub fn read_part(r: &mut Reader<'_>) -> SurResult<SurfacePart> {
    let id = r.u32()?;
    let section_count = r.u32()?;
    let mut part = SurfacePart {
        id,
        ..SurfacePart::default()
    };
    let mut have_surf = false;
    let mut deferred = None;

    for _ in 0..section_count {
        let tag = r.u32()?;
        match tag {
            TAG_SURF => {
                let size = usize::try_from(r.i32()?).map_err(|_| SurError::CorruptFormat {
                    context: "surf section",
                    detail: format!("negative section size in part {id:08x}"),
                })?;
                let start = r.position();
                let end = start + size;
                if end > r.len() {
                    return Err(SurError::TruncatedStream {
                        expected: end,
                        actual: r.len(),
                    });
                }
                match read_surf_payload(r, &mut part, start, end) {
                    Ok(()) => have_surf = true,
                    Err(e) if e.is_recoverable() => {
                        deferred = Some(SurError::CorruptFormat {
                            context: "part",
                            detail: format!("part {id:08x}: {e}"),
                        });
                    }
                    Err(e) => return Err(e),
                }
                r.seek(end)?;
            }
            TAG_EXTS => {
                part.extents_min = r.vec3()?;
                part.extents_max = r.vec3()?;
            }
            TAG_NOT_FIXED => part.dynamic = true,
            TAG_HPID => {
                let count = r.u32()?;
                for _ in 0..count {
                    part.hardpoint_ids.push(r.u32()?);
                }
            }
            // Unrecognized tags carry no payload in this grammar; ignore
            // them and read the next tag.
            _ => {}
        }
    }

    if let Some(e) = deferred {
        return Err(e);
    }
    if !have_surf {
        return Err(SurError::CorruptFormat {
            context: "part",
            detail: format!("part {id:08x} has no surf section"),
        });
    }
    Ok(part)
}

fn read_surf_payload(
    r: &mut Reader<'_>,
    part: &mut SurfacePart,
    start: usize,
    end: usize,
) -> SurResult<()> {
    if end - start < HEADER_SIZE {
        return Err(SurError::CorruptFormat {
            context: "surf header",
            detail: format!("section of {} bytes cannot hold the header", end - start),
        });
    }

    part.center = r.vec3()?;
    part.inertia = r.vec3()?;
    part.radius = r.f32()?;
    // Low byte: uniform scale fraction. High 24 bits: section length again,
    // which doubles as the end of the node region.
    let packed = r.u32()?;
    #[allow(clippy::cast_possible_truncation)]
    {
        part.scale = scale_from_byte((packed & 0xFF) as u8);
    }
    let nodes_end = start + (packed >> 8) as usize;
    let nodes_start = start + r.u32()? as usize;
    part.unknown = r.vec3()?;

    if nodes_start < start + HEADER_SIZE
        || nodes_start > nodes_end
        || nodes_end > end
    {
        return Err(SurError::CorruptFormat {
            context: "surf header",
            detail: format!(
                "node region [{nodes_start}, {nodes_end}] outside section [{start}, {end}]"
            ),
        });
    }

    let (root, points_start) = read_tree(r, start, nodes_start, nodes_end)?;
    part.root = root;

    if let Some(points_start) = points_start {
        let pool_len = nodes_start - points_start;
        if !pool_len.is_multiple_of(POINT_SIZE) {
            return Err(SurError::CorruptFormat {
                context: "point pool",
                detail: format!("pool of {pool_len} bytes is not a whole number of points"),
            });
        }
        r.seek(points_start)?;
        part.points = read_points(r, pool_len / POINT_SIZE)?;
    }
    Ok(())
}

/// Encode one part record.
///
/// Marker and list sections are emitted only when meaningful: `!fxd` for
/// dynamic parts, `hpid` for a non-empty hardpoint list. `exts` and `surf`
/// are always present.
pub fn write_part(part: &SurfacePart, w: &mut Writer) -> SurResult<()> {
    let mut section_count = 2u32;
    if part.dynamic {
        section_count += 1;
    }
    if !part.hardpoint_ids.is_empty() {
        section_count += 1;
    }

    w.u32(part.id);
    w.u32(section_count);
    if part.dynamic {
        w.u32(TAG_NOT_FIXED);
    }
    w.u32(TAG_EXTS);
    w.vec3(part.extents_min);
    w.vec3(part.extents_max);
    w.u32(TAG_SURF);
    write_surf_section(part, w)?;
    if !part.hardpoint_ids.is_empty() {
        w.u32(TAG_HPID);
        let count = u32::try_from(part.hardpoint_ids.len()).map_err(|_| {
            SurError::FormatLimitExceeded {
                context: "hardpoint id count",
                value: part.hardpoint_ids.len() as i64,
                max: i64::from(u32::MAX),
            }
        })?;
        w.u32(count);
        for hardpoint in &part.hardpoint_ids {
            w.u32(*hardpoint);
        }
    }
    Ok(())
}

fn write_surf_section(part: &SurfacePart, w: &mut Writer) -> SurResult<()> {
    let size_pos = w.position();
    let start = size_pos + 4;
    w.zeros(4 + HEADER_SIZE);

    let nodes_start = write_tree(w, part)?;
    let end = w.position();
    let size = end - start;
    if size >= MAX_SECTION {
        return Err(SurError::FormatLimitExceeded {
            context: "surf section size",
            value: size as i64,
            max: (MAX_SECTION - 1) as i64,
        });
    }

    w.seek(size_pos)?;
    #[allow(clippy::cast_possible_truncation)]
    let size = size as u32;
    w.u32(size);
    w.vec3(part.center);
    w.vec3(part.inertia);
    w.f32(part.radius);
    w.u32((size << 8) | u32::from(scale_to_byte(part.scale)));
    #[allow(clippy::cast_possible_truncation)]
    w.u32((nodes_start - start) as u32);
    w.vec3(part.unknown);
    debug_assert_eq!(w.position(), start + HEADER_SIZE);
    w.seek(end)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        FaceSide, HULL_LEAF, HULL_WRAP, SurfaceFace, SurfaceHull, SurfaceNode, SurfacePoint,
    };
    use glam::Vec3;

    fn triangle_hull(id: u32, kind: u8, first_point: u16) -> SurfaceHull {
        let mut face = SurfaceFace {
            opposite: 1,
            ..SurfaceFace::default()
        };
        for (i, side) in face.sides.iter_mut().enumerate() {
            *side = FaceSide {
                point: first_point + i as u16,
                shared: -1,
                flag: false,
            };
        }
        SurfaceHull {
            id,
            kind,
            unknown: 0,
            faces: vec![face],
        }
    }

    // Scale 0.5 is exactly 125/250, so node bounds survive quantization.
    fn leaf_node(id: u32, first_point: u16) -> SurfaceNode {
        SurfaceNode {
            hull: Some(triangle_hull(id, HULL_LEAF, first_point)),
            radius: 2.0,
            scale: Vec3::splat(0.5),
            ..SurfaceNode::default()
        }
    }

    fn simple_part() -> SurfacePart {
        SurfacePart {
            id: 0x0042_4242,
            center: Vec3::new(0.5, 0.25, -0.75),
            inertia: Vec3::new(1.0, 2.0, 3.0),
            radius: 5.5,
            scale: 1.0,
            unknown: Vec3::ZERO,
            extents_min: Vec3::splat(-1.0),
            extents_max: Vec3::splat(1.0),
            points: (0..3)
                .map(|i| SurfacePoint::new(Vec3::new(f32::from(i as u8), 0.0, 0.0), 0x0042_4242))
                .collect(),
            root: leaf_node(0x0042_4242, 0),
            ..SurfacePart::default()
        }
    }

    fn encode(part: &SurfacePart) -> Vec<u8> {
        let mut w = Writer::new();
        write_part(part, &mut w).unwrap();
        w.into_bytes()
    }

    #[test]
    fn test_single_hull_part_round_trip_byte_identical() {
        let part = simple_part();
        let bytes = encode(&part);

        let mut r = Reader::new(&bytes);
        let decoded = read_part(&mut r).unwrap();
        assert_eq!(r.position(), bytes.len());
        assert_eq!(decoded, part);

        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_fixed_part_omits_marker_section() {
        let part = simple_part();
        let bytes = encode(&part);
        assert!(
            !bytes.windows(4).any(|win| win == b"!fxd"),
            "static part must not emit !fxd"
        );
    }

    #[test]
    fn test_dynamic_marker_has_no_payload() {
        let mut part = simple_part();
        part.dynamic = true;
        let bytes = encode(&part);

        // The marker is the first section and is immediately followed by
        // the next section's tag.
        assert_eq!(&bytes[8..12], b"!fxd");
        assert_eq!(&bytes[12..16], b"exts");

        let mut r = Reader::new(&bytes);
        let decoded = read_part(&mut r).unwrap();
        assert!(decoded.dynamic);
        assert_eq!(decoded, part);
    }

    #[test]
    fn test_hardpoint_ids_round_trip() {
        let mut part = simple_part();
        part.hardpoint_ids = vec![0xAAAA_0001, 0xAAAA_0002, 0xAAAA_0003];
        let bytes = encode(&part);
        assert!(bytes.windows(4).any(|win| win == b"hpid"));

        let mut r = Reader::new(&bytes);
        assert_eq!(read_part(&mut r).unwrap(), part);
    }

    #[test]
    fn test_unknown_tag_is_skipped() {
        let part = simple_part();
        let bytes = encode(&part);

        // Splice an unrecognized zero-payload tag in front of the existing
        // sections and bump the section count.
        let mut patched = Vec::new();
        patched.extend_from_slice(&bytes[0..4]);
        let count = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        patched.extend_from_slice(&(count + 1).to_le_bytes());
        patched.extend_from_slice(b"odd!");
        patched.extend_from_slice(&bytes[8..]);

        let mut r = Reader::new(&patched);
        assert_eq!(read_part(&mut r).unwrap(), part);
        assert_eq!(r.position(), patched.len());
    }

    #[test]
    fn test_wrap_part_round_trip() {
        let mut part = simple_part();
        part.points = (0..6)
            .map(|i| SurfacePoint::new(Vec3::new(f32::from(i as u8), 1.0, 0.0), part.id))
            .collect();
        part.root = SurfaceNode {
            hull: Some(triangle_hull(part.id, HULL_WRAP, 0)),
            left: Some(Box::new(leaf_node(1, 0))),
            right: Some(Box::new(leaf_node(2, 3))),
            radius: 4.0,
            scale: Vec3::splat(0.5),
            ..SurfaceNode::default()
        };

        let bytes = encode(&part);
        let mut r = Reader::new(&bytes);
        let decoded = read_part(&mut r).unwrap();

        // The wrap hull id is recomputed on encode; everything else must
        // survive, and the decoded form must be a byte-stable fixpoint.
        assert_eq!(decoded.points, part.points);
        assert_eq!(decoded.root.left, part.root.left);
        assert_eq!(decoded.root.right, part.root.right);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_corrupt_tree_leaves_cursor_at_part_end() {
        let part = simple_part();
        let mut bytes = encode(&part);

        // Locate the node region via the header: the surf section starts
        // after id, count, and the exts section.
        let surf_start = 8 + 4 + 24 + 4 + 4;
        let bits_start =
            u32::from_le_bytes(bytes[surf_start + 32..surf_start + 36].try_into().unwrap());
        let nodes_start = surf_start + bits_start as usize;
        // An in-bounds node record needs a sane hull offset; break it.
        bytes[nodes_start + 4..nodes_start + 8].copy_from_slice(&0x00FF_FFF0i32.to_le_bytes());

        let mut r = Reader::new(&bytes);
        let err = read_part(&mut r).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(r.position(), bytes.len());
    }

    #[test]
    fn test_missing_surf_section_rejected() {
        let mut w = Writer::new();
        w.u32(0x1234);
        w.u32(1);
        w.u32(TAG_NOT_FIXED);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert!(matches!(
            read_part(&mut r),
            Err(SurError::CorruptFormat { context: "part", .. })
        ));
    }

    #[test]
    fn test_truncated_surf_section_is_fatal() {
        let part = simple_part();
        let bytes = encode(&part);
        let mut r = Reader::new(&bytes[..bytes.len() - 10]);
        assert!(matches!(
            read_part(&mut r),
            Err(SurError::TruncatedStream { .. })
        ));
    }
}
