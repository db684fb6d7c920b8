//! Whole-file loading and saving.

use std::collections::BTreeMap;
use std::path::Path;

use sur_codec::{Reader, SurfacePart, decode_header, encode_collection, read_part};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// One SUR collision file: a format version and its parts, keyed by id.
///
/// Parts iterate in ascending id order, which is also the order they are
/// written, so saving an unmodified file reproduces its canonical byte
/// form.
#[derive(Debug, Clone, PartialEq)]
pub struct SurFile {
    pub version: f32,
    pub surfaces: BTreeMap<u32, SurfacePart>,
}

impl Default for SurFile {
    fn default() -> Self {
        Self {
            version: sur_codec::VERSION,
            surfaces: BTreeMap::new(),
        }
    }
}

impl SurFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a SUR file from bytes, salvaging what it can.
    ///
    /// Parts with structurally corrupt geometry are logged and dropped;
    /// the codec guarantees the cursor lands on the next part record after
    /// such a failure, so one bad part does not take the file down.
    /// Truncation and an unrecognized container magic are still fatal.
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        let version = decode_header(&mut r)?;
        let mut surfaces = BTreeMap::new();
        while !r.at_end() {
            match read_part(&mut r) {
                Ok(part) => {
                    debug!(
                        id = part.id,
                        hulls = part.hulls(false).len(),
                        points = part.points.len(),
                        "loaded part"
                    );
                    surfaces.insert(part.id, part);
                }
                Err(e) if e.is_recoverable() => {
                    warn!("skipping unreadable part: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Self { version, surfaces })
    }

    /// Load a SUR file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read(&data)
    }

    /// Encode the file to its byte form.
    pub fn write(&self) -> Result<Vec<u8>> {
        Ok(encode_collection(self.version, &self.surfaces)?)
    }

    /// Encode and write the file to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = self.write()?;
        std::fs::write(path, data).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look up the part for one mesh-group id.
    #[must_use]
    pub fn part(&self, id: u32) -> Option<&SurfacePart> {
        self.surfaces.get(&id)
    }
}
