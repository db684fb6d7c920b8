//! Data model for decoded SUR trees.
//!
//! Ownership is strictly tree-shaped: a [`SurfacePart`] owns its BVH root,
//! each [`SurfaceNode`] optionally owns a hull and two children, and hulls
//! own their faces. The point pool is owned by the part and shared by index
//! across all of its hulls.

use glam::Vec3;

/// Hull type tag for an ordinary convex leaf piece.
pub const HULL_LEAF: u8 = 4;
/// Hull type tag for the wrap hull bounding the whole part.
pub const HULL_WRAP: u8 = 5;

/// Denominator for byte-packed `[0, 1]` fractions (scale fields).
pub const SCALE_DENOM: f32 = 250.0;

/// Quantize a `[0, 1]` fraction to its wire byte.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scale_to_byte(value: f32) -> u8 {
    (value * SCALE_DENOM) as u8
}

/// Expand a wire byte back into a `[0, 1]` fraction.
#[must_use]
pub fn scale_from_byte(byte: u8) -> f32 {
    f32::from(byte) / SCALE_DENOM
}

/// One entry of a part's shared point pool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfacePoint {
    pub position: Vec3,
    /// Id of the submesh this point originated from.
    pub mesh_id: u32,
}

impl SurfacePoint {
    #[must_use]
    pub fn new(position: Vec3, mesh_id: u32) -> Self {
        Self { position, mesh_id }
    }
}

/// One side (directed edge) of a triangular face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceSide {
    /// Index into the owning part's point pool.
    pub point: u16,
    /// Index of the reverse edge pair elsewhere in the hull, counted in
    /// logical edges (three per face). Stored on the wire as a delta
    /// against a rolling counter; see the face codec.
    pub shared: i32,
    pub flag: bool,
}

/// One triangle of a hull.
///
/// Side order is significant: it defines the winding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceFace {
    /// 12-bit index field from the header word (the face's own position in
    /// the hull's face list in known files).
    pub index: u32,
    /// 12-bit field naming the face opposite this one. Not reinterpreted;
    /// carried through unchanged.
    pub opposite: u32,
    pub flag: bool,
    pub sides: [FaceSide; 3],
}

/// One convex piece: a named group of triangular faces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SurfaceHull {
    pub id: u32,
    /// Type tag: [`HULL_LEAF`], [`HULL_WRAP`], or an unrecognized value
    /// carried through opaquely.
    pub kind: u8,
    /// Opaque preserved field.
    pub unknown: u16,
    /// Face order is the emission order, not a set.
    pub faces: Vec<SurfaceFace>,
}

impl SurfaceHull {
    #[must_use]
    pub fn is_wrap(&self) -> bool {
        self.kind == HULL_WRAP
    }
}

/// One node of a part's bounding-volume hierarchy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceNode {
    pub center: Vec3,
    pub radius: f32,
    /// Anisotropic box scale, each component in `[0, 1]` (byte fractions of
    /// 250 on the wire).
    pub scale: Vec3,
    /// Opaque preserved field.
    pub unknown: u8,
    pub hull: Option<SurfaceHull>,
    pub left: Option<Box<SurfaceNode>>,
    pub right: Option<Box<SurfaceNode>>,
}

impl SurfaceNode {
    /// Axis-aligned bounds derived from the sphere and scale box.
    #[must_use]
    pub fn boundary(&self) -> (Vec3, Vec3) {
        let extent = self.scale * self.radius;
        (self.center - extent, self.center + extent)
    }

    /// Set center, radius, and scale from axis-aligned bounds.
    pub fn set_boundary(&mut self, minimum: Vec3, maximum: Vec3) {
        let size = maximum - minimum;
        self.center = (minimum + maximum) / 2.0;
        self.radius = size.length() / 2.0;
        self.scale = if self.radius > 0.0 {
            size / (2.0 * self.radius)
        } else {
            Vec3::ZERO
        };
    }
}

/// Top-level collision record for one named submesh group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfacePart {
    /// Unique within one collection; correlates to a mesh-group id in the
    /// owning model.
    pub id: u32,
    pub center: Vec3,
    pub inertia: Vec3,
    pub radius: f32,
    /// Uniform scale in `[0, 1]` (byte fraction of 250 on the wire).
    pub scale: f32,
    /// Trailing header vector with undocumented meaning; preserved so an
    /// unmodified part re-encodes byte-for-byte.
    pub unknown: Vec3,
    pub extents_min: Vec3,
    pub extents_max: Vec3,
    /// Set by the presence of a `!fxd` marker section; absent means fixed.
    pub dynamic: bool,
    pub hardpoint_ids: Vec<u32>,
    /// Flat pool of points referenced by index from every hull's faces.
    pub points: Vec<SurfacePoint>,
    pub root: SurfaceNode,
}

impl SurfacePart {
    /// Collect the part's hulls in serialization order.
    ///
    /// This is an explicit-stack pre-order walk, left child first, gathering
    /// every non-wrap hull. With `include_wrap` the root's wrap hull is
    /// appended last, matching where the writer places it in the stream.
    #[must_use]
    pub fn hulls(&self, include_wrap: bool) -> Vec<&SurfaceHull> {
        let mut hulls = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Some(right) = &node.right {
                stack.push(right);
            }
            if let Some(left) = &node.left {
                stack.push(left);
            }
            if let Some(hull) = &node.hull
                && !hull.is_wrap()
            {
                hulls.push(hull);
            }
        }
        if include_wrap
            && let Some(hull) = &self.root.hull
            && hull.is_wrap()
        {
            hulls.push(hull);
        }
        hulls
    }
}
