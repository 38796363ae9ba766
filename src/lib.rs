//! # teeio
//!
//! Small composable data-access primitives: lazy byte [`Source`]s, byte
//! [`Destination`]s, and a [`Tee`] that copies everything it reads into a
//! destination while handing it to the caller unchanged.
//!
//! ```
//! use teeio::{length_of, PathSource, read_text, Charset, Tee};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("tee.txt");
//! let text = "Hello, товарищ äÄ üÜ öÖ and ß";
//!
//! let copied = length_of(Tee::from_text(text, &path)).unwrap();
//! assert_eq!(copied, text.len() as u64);
//! assert_eq!(read_text(&PathSource::new(&path), Charset::utf_8()).unwrap(), text);
//! ```

pub mod error;
pub mod io;

pub use error::{Result, TeeError};
pub use io::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_loads() {
        let opts = TeeOptions::default();
        assert_eq!(opts.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(EncodingChoice::default().resolve().unwrap(), Charset::utf_8());
        let tee = Tee::from_bytes(&b""[..], SharedBuffer::new());
        assert_eq!(tee.state(), TeeState::Idle);
    }
}
