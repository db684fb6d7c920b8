//! BVH tree serialization.
//!
//! The tree is stored as `[node][hull, earlier in the stream][left subtree,
//! immediately after the node][right subtree, at an explicit relative
//! offset]`. A node's left child needs no offset field: it begins right
//! after the 28-byte node record. The right child can live anywhere later
//! in the node region, so its offset is emitted as a placeholder and
//! patched once the child is actually written.
//!
//! Both directions walk the tree with the same explicit stack (pop, push
//! right, push left) so the reader revisits nodes in exactly the order the
//! writer emitted them. Depth is bounded by the input, not the call stack.

use glam::Vec3;

use crate::cursor::{Reader, Writer};
use crate::error::{SurError, SurResult};
use crate::hull::{read_hull, write_hull};
use crate::point::write_points;
use crate::types::{SurfaceNode, SurfacePart, scale_from_byte, scale_to_byte};

/// Encoded size of one node: two offset words plus the 20-byte body.
pub const NODE_SIZE: usize = 28;

/// Largest point pool addressable by the `u16` point index fields.
pub const MAX_POINTS: usize = 0x1_0000;

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn read_node_body(r: &mut Reader<'_>) -> SurResult<SurfaceNode> {
    let center = r.vec3()?;
    let radius = r.f32()?;
    let scale = Vec3::new(
        scale_from_byte(r.u8()?),
        scale_from_byte(r.u8()?),
        scale_from_byte(r.u8()?),
    );
    let unknown = r.u8()?;
    Ok(SurfaceNode {
        center,
        radius,
        scale,
        unknown,
        hull: None,
        left: None,
        right: None,
    })
}

fn write_node_body(node: &SurfaceNode, w: &mut Writer) {
    w.vec3(node.center);
    w.f32(node.radius);
    w.u8(scale_to_byte(node.scale.x));
    w.u8(scale_to_byte(node.scale.y));
    w.u8(scale_to_byte(node.scale.z));
    w.u8(node.unknown);
}

fn offset_i32(value: usize, context: &'static str) -> SurResult<i32> {
    i32::try_from(value).map_err(|_| SurError::FormatLimitExceeded {
        context,
        value: value as i64,
        max: i64::from(i32::MAX),
    })
}

/// Decode the node region of one `surf` section.
///
/// `section_start` is the position right after the section's size field;
/// node offsets must stay within `[nodes_start, nodes_end]` and hull offsets
/// within `[section_start, nodes_start)` or the tree is unreadable.
///
/// Returns the root and, when any hull was present, the absolute start of
/// the point pool recorded by the hulls' leading offset fields.
pub(crate) fn read_tree(
    r: &mut Reader<'_>,
    section_start: usize,
    nodes_start: usize,
    nodes_end: usize,
) -> SurResult<(SurfaceNode, Option<usize>)> {
    let region = nodes_end.checked_sub(nodes_start).ok_or_else(|| {
        SurError::CorruptFormat {
            context: "node region",
            detail: format!("node region [{nodes_start}, {nodes_end}] is inverted"),
        }
    })?;
    // Every node occupies NODE_SIZE bytes, so more pops than this means the
    // offsets loop back on themselves.
    let max_nodes = region / NODE_SIZE;

    let mut nodes: Vec<Option<SurfaceNode>> = Vec::new();
    let mut parents: Vec<Option<(usize, Side)>> = Vec::new();
    let mut points_start = None;

    let mut stack: Vec<(Option<(usize, Side)>, usize)> = vec![(None, nodes_start)];
    while let Some((parent, offset)) = stack.pop() {
        if offset < nodes_start || offset > nodes_end {
            return Err(SurError::CorruptFormat {
                context: "node",
                detail: format!("node offset {offset} outside [{nodes_start}, {nodes_end}]"),
            });
        }
        if nodes.len() >= max_nodes {
            return Err(SurError::CorruptFormat {
                context: "node",
                detail: format!("more than {max_nodes} nodes in a {region}-byte region"),
            });
        }

        r.seek(offset)?;
        let right_rel = r.i32()?;
        let hull_rel = r.i32()?;
        let mut node = read_node_body(r)?;
        // The left child, if any, begins immediately after the node body.
        let left_offset = r.position();

        if hull_rel != 0 {
            let hull_offset = offset as i64 + i64::from(hull_rel);
            if hull_offset > 0 {
                let hull_offset = usize::try_from(hull_offset).unwrap_or(usize::MAX);
                if hull_offset < section_start || hull_offset >= nodes_start {
                    return Err(SurError::CorruptFormat {
                        context: "hull",
                        detail: format!(
                            "hull offset {hull_offset} outside [{section_start}, {nodes_start})"
                        ),
                    });
                }
                r.seek(hull_offset)?;
                let points_rel = r.i32()?;
                let points_abs = hull_offset as i64 + i64::from(points_rel);
                if points_abs < section_start as i64 || points_abs > nodes_start as i64 {
                    return Err(SurError::CorruptFormat {
                        context: "point pool",
                        detail: format!(
                            "points offset {points_abs} outside [{section_start}, {nodes_start}]"
                        ),
                    });
                }
                #[allow(clippy::cast_sign_loss)]
                {
                    points_start = Some(points_abs as usize);
                }
                node.hull = Some(read_hull(r)?);
            }
        }

        // Only wrap hulls (and hull-less interior nodes) have children; a
        // node carrying an ordinary convex piece is a leaf.
        let descend = node.hull.as_ref().is_none_or(|hull| hull.is_wrap());

        let index = nodes.len();
        nodes.push(Some(node));
        parents.push(parent);

        if descend {
            if right_rel != 0 {
                let right_offset = offset as i64 + i64::from(right_rel);
                let right_offset = usize::try_from(right_offset).map_err(|_| {
                    SurError::CorruptFormat {
                        context: "node",
                        detail: format!("negative right-child offset {right_offset}"),
                    }
                })?;
                stack.push((Some((index, Side::Right)), right_offset));
            }
            stack.push((Some((index, Side::Left)), left_offset));
        }
    }

    // Children always have higher indices than their parents, so walking
    // backwards reattaches whole subtrees bottom-up.
    for index in (1..nodes.len()).rev() {
        let Some(node) = nodes[index].take() else {
            continue;
        };
        let Some((parent, side)) = parents[index] else {
            continue;
        };
        if let Some(parent) = nodes[parent].as_mut() {
            match side {
                Side::Left => parent.left = Some(Box::new(node)),
                Side::Right => parent.right = Some(Box::new(node)),
            }
        }
    }

    let root = nodes
        .first_mut()
        .and_then(Option::take)
        .ok_or_else(|| SurError::CorruptFormat {
            context: "node",
            detail: "empty node region".to_string(),
        })?;
    Ok((root, points_start))
}

/// Encode the hulls, point pool, and node region of one `surf` section.
///
/// The writer must already be positioned where the first hull belongs
/// (right after the 48-byte part header). Hulls go first — non-wrap hulls
/// in node traversal order, the root's wrap hull last — then the point
/// pool, then the nodes, patching right-child offsets and each hull's
/// points-start field retroactively.
///
/// Returns the absolute start of the node region for the header back-patch.
pub(crate) fn write_tree(w: &mut Writer, part: &SurfacePart) -> SurResult<usize> {
    if part.points.len() > MAX_POINTS {
        return Err(SurError::FormatLimitExceeded {
            context: "point pool",
            value: part.points.len() as i64,
            max: MAX_POINTS as i64,
        });
    }
    // A wrap hull anywhere but the root is not representable: the reader
    // treats every non-root wrap as an interior node, and the writer has
    // nowhere to park its nodes-start patch.
    let mut check = vec![(&part.root, true)];
    while let Some((node, is_root)) = check.pop() {
        if !is_root
            && let Some(hull) = &node.hull
            && hull.is_wrap()
        {
            return Err(SurError::CorruptFormat {
                context: "encode",
                detail: "wrap hull on a non-root node".to_string(),
            });
        }
        if let Some(right) = &node.right {
            check.push((right, false));
        }
        if let Some(left) = &node.left {
            check.push((left, false));
        }
    }

    let hulls = part.hulls(true);
    let mut hull_offsets = Vec::with_capacity(hulls.len());
    for hull in &hulls {
        hull_offsets.push(w.position());
        w.u32(0); // points-start, patched below
        write_hull(hull, w)?;
    }

    let points_start = w.position();
    write_points(&part.points, w);
    let nodes_start = w.position();

    for (hull, &offset) in hulls.iter().zip(&hull_offsets) {
        w.seek(offset)?;
        w.i32(offset_i32(points_start - offset, "points offset")?);
        if hull.is_wrap() {
            // Lands on the wrap hull's id field: the on-disk wrap record
            // stores the node-region offset there instead of an id.
            w.i32(offset_i32(nodes_start - offset, "nodes offset")?);
        }
    }
    w.seek(nodes_start)?;

    let mut next_leaf = 0;
    // (position of the parent's right-offset word, or 0 for root and left
    // children which need no patch)
    let mut stack: Vec<(usize, &SurfaceNode)> = vec![(0, &part.root)];
    while let Some((parent_patch, node)) = stack.pop() {
        let offset = w.position();
        if parent_patch > 0 {
            w.seek(parent_patch)?;
            w.i32(offset_i32(offset - parent_patch, "right-child offset")?);
            w.seek(offset)?;
        }
        w.i32(0); // right child, patched when it is written

        match &node.hull {
            None => w.i32(0),
            Some(hull) => {
                let hull_offset = if hull.is_wrap() {
                    hull_offsets.last().copied()
                } else {
                    let i = next_leaf;
                    next_leaf += 1;
                    hull_offsets.get(i).copied()
                };
                let Some(hull_offset) = hull_offset else {
                    return Err(SurError::CorruptFormat {
                        context: "encode",
                        detail: "node hull missing from traversal order".to_string(),
                    });
                };
                // Hulls precede nodes in the stream, hence negative.
                w.i32(-offset_i32(offset - hull_offset, "hull offset")?);
            }
        }

        write_node_body(node, w);

        if let Some(right) = &node.right {
            stack.push((offset, right));
        }
        if let Some(left) = &node.left {
            stack.push((0, left));
        }
    }

    Ok(nodes_start)
}
