//! Triangle-mesh extraction from decoded parts.
//!
//! Physics and debug rendering want each convex piece as a plain vertex
//! and index list. Faces address the part-wide point pool, so extraction
//! re-indexes each hull against its own compact vertex list, keeping the
//! first-use order of the pool indices.

use glam::Vec3;
use sur_codec::{SurfaceHull, SurfacePart};

use crate::error::{Error, Result};

/// One convex hull flattened to an indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct HullMesh {
    /// Mesh-group id the hull collides for.
    pub id: u32,
    /// Hull-local vertex positions, in first-use order.
    pub vertices: Vec<Vec3>,
    /// Counter-clockwise triangles indexing into `vertices`.
    pub triangles: Vec<[u32; 3]>,
}

/// Flatten every leaf hull of a part. The wrap hull is a bounding volume,
/// not collision geometry, and is not included.
pub fn leaf_hulls(part: &SurfacePart) -> Result<Vec<HullMesh>> {
    part.hulls(false)
        .into_iter()
        .map(|hull| hull_mesh(part, hull))
        .collect()
}

fn hull_mesh(part: &SurfacePart, hull: &SurfaceHull) -> Result<HullMesh> {
    let mut pool_indices: Vec<u16> = Vec::new();
    let mut vertices = Vec::new();
    let mut triangles = Vec::with_capacity(hull.faces.len());

    for face in &hull.faces {
        let mut triangle = [0u32; 3];
        for (corner, side) in triangle.iter_mut().zip(&face.sides) {
            let local = match pool_indices.iter().position(|&p| p == side.point) {
                Some(local) => local,
                None => {
                    let point = part.points.get(usize::from(side.point)).ok_or_else(|| {
                        Error::InvalidData {
                            context: "hull",
                            detail: format!(
                                "hull {:08x} references point {} of {}",
                                hull.id,
                                side.point,
                                part.points.len()
                            ),
                        }
                    })?;
                    pool_indices.push(side.point);
                    vertices.push(point.position);
                    vertices.len() - 1
                }
            };
            #[allow(clippy::cast_possible_truncation)]
            {
                *corner = local as u32;
            }
        }
        triangles.push(triangle);
    }

    Ok(HullMesh {
        id: hull.id,
        vertices,
        triangles,
    })
}
