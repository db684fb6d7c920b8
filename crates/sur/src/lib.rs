//! High-level loader for SUR collision files.
//!
//! This crate sits on top of [`sur_codec`] and adds the file-shaped
//! conveniences: loading from disk with per-part damage recovery, saving
//! deterministically, and flattening convex hulls into triangle meshes for
//! physics or debug rendering.
//!
//! # Example
//!
//! ```ignore
//! use sur::SurFile;
//!
//! let file = SurFile::open("ship.sur")?;
//! for (id, part) in &file.surfaces {
//!     let meshes = sur::leaf_hulls(part)?;
//!     println!("{id:08x}: {} hulls", meshes.len());
//! }
//! ```

mod error;
mod file;
mod hulls;

pub use error::{Error, Result};
pub use file::SurFile;
pub use hulls::{HullMesh, leaf_hulls};

// Re-export the model types for convenience.
pub use sur_codec::{
    FaceSide, HULL_LEAF, HULL_WRAP, SurfaceFace, SurfaceHull, SurfaceNode, SurfacePart,
    SurfacePoint,
};
