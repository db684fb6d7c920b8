//! Codec for the SUR collision geometry container.
//!
//! A SUR stream is a small versioned container of per-part records, each
//! carrying a bounding-volume hierarchy over convex hulls plus a shared
//! point pool, all addressed by stream-relative byte offsets. This crate
//! decodes that layout into an owned tree model and encodes the model back,
//! reproducing the original bytes exactly for an unmodified round trip.
//!
//! [`decode_collection`] and [`encode_collection`] are the whole-stream
//! entry points; [`read_part`] and [`write_part`] work record by record for
//! callers that want to salvage damaged files part by part.

mod collection;
mod cursor;
mod error;
mod face;
mod hull;
mod node;
mod part;
mod point;
mod types;

pub use collection::{TAG_VERS, VERSION, decode_collection, decode_header, encode_collection};
pub use cursor::{Reader, Writer};
pub use error::{SurError, SurResult};
pub use face::{FACE_SIZE, MAX_FACE_INDEX};
pub use hull::MAX_FACES;
pub use node::{MAX_POINTS, NODE_SIZE};
pub use part::{TAG_EXTS, TAG_HPID, TAG_NOT_FIXED, TAG_SURF, read_part, write_part};
pub use point::POINT_SIZE;
pub use types::{
    FaceSide, HULL_LEAF, HULL_WRAP, SCALE_DENOM, SurfaceFace, SurfaceHull, SurfaceNode,
    SurfacePart, SurfacePoint, scale_from_byte, scale_to_byte,
};
