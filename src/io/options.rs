//! Tee configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default amount pulled per [`crate::Tee::next_chunk`] call (8KB)
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Options controlling one tee pass
///
/// Missing fields take their default when deserialized:
/// ```
/// use teeio::TeeOptions;
///
/// let opts = TeeOptions::from_json(r#"{ "sync_on_close": true }"#).unwrap();
/// assert!(opts.sync_on_close);
/// assert_eq!(opts.chunk_size, teeio::DEFAULT_CHUNK_SIZE);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeeOptions {
    /// Upper bound on the bytes produced per chunk; zero is treated as one
    pub chunk_size: usize,
    /// Sync file-backed destinations to storage before closing them
    pub sync_on_close: bool,
}

impl Default for TeeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            sync_on_close: false,
        }
    }
}

impl TeeOptions {
    /// Parse options from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize options to compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Set the chunk size
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set whether file destinations are synced before closing
    pub fn sync_on_close(mut self, sync: bool) -> Self {
        self.sync_on_close = sync;
        self
    }

    pub(crate) fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}
