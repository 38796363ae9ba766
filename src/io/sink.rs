//! Byte destinations
//!
//! A [`Destination`] is a closed set of places a copy can go: a file path,
//! an already open file handle, or caller-supplied [`Output`] logic. Opening
//! it consumes it, so one destination yields at most one [`SinkStream`].

use std::fmt;
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, TeeError};

/// Caller logic that produces a writable byte stream when asked
///
/// Implemented for any `FnMut() -> io::Result<W>` closure.
pub trait Output {
    fn stream(&mut self) -> io::Result<Box<dyn Write + Send>>;
}

impl<F, W> Output for F
where
    F: FnMut() -> io::Result<W>,
    W: Write + Send + 'static,
{
    fn stream(&mut self) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(self()?))
    }
}

/// Where a copy is written
pub enum Destination {
    /// Created if missing, truncated if present
    File(PathBuf),
    /// Truncated and rewound before the first write
    Handle(File),
    Output(Box<dyn Output + Send>),
}

impl Destination {
    /// Caller-supplied destination
    pub fn output(output: impl Output + Send + 'static) -> Self {
        Self::Output(Box::new(output))
    }

    /// Acquire the writable stream
    ///
    /// Every failure is reported as [`TeeError::SinkUnavailable`].
    pub fn open(self) -> Result<SinkStream> {
        let kind = match self {
            Self::File(path) => {
                let file = File::options()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&path)
                    .map_err(TeeError::SinkUnavailable)?;
                tracing::debug!(path = %path.display(), "opened file destination");
                StreamKind::File(file)
            }
            Self::Handle(mut file) => {
                file.set_len(0).map_err(TeeError::SinkUnavailable)?;
                file.seek(SeekFrom::Start(0))
                    .map_err(TeeError::SinkUnavailable)?;
                tracing::debug!("truncated file handle destination");
                StreamKind::File(file)
            }
            Self::Output(mut output) => {
                let writer = output.stream().map_err(TeeError::SinkUnavailable)?;
                tracing::debug!("opened output destination");
                StreamKind::Output(writer)
            }
        };
        Ok(SinkStream { kind })
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Handle(file) => f.debug_tuple("Handle").field(file).finish(),
            Self::Output(_) => f.write_str("Output(..)"),
        }
    }
}

impl From<PathBuf> for Destination {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for Destination {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<&PathBuf> for Destination {
    fn from(path: &PathBuf) -> Self {
        Self::File(path.clone())
    }
}

impl From<&str> for Destination {
    fn from(path: &str) -> Self {
        Self::File(PathBuf::from(path))
    }
}

impl From<String> for Destination {
    fn from(path: String) -> Self {
        Self::File(PathBuf::from(path))
    }
}

impl From<File> for Destination {
    fn from(file: File) -> Self {
        Self::Handle(file)
    }
}

impl From<SharedBuffer> for Destination {
    fn from(buffer: SharedBuffer) -> Self {
        Self::output(move || -> io::Result<SharedBuffer> {
            buffer.clear();
            Ok(buffer.clone())
        })
    }
}

/// An opened destination; closed when [`SinkStream::close`] runs or when dropped
pub struct SinkStream {
    kind: StreamKind,
}

enum StreamKind {
    File(File),
    Output(Box<dyn Write + Send>),
}

impl SinkStream {
    fn writer(&mut self) -> &mut dyn Write {
        match &mut self.kind {
            StreamKind::File(file) => file as &mut dyn Write,
            StreamKind::Output(writer) => writer.as_mut(),
        }
    }

    /// Write every byte of `data`
    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.writer()
            .write_all(data)
            .map_err(TeeError::SinkUnavailable)
    }

    /// Flush and release the stream
    ///
    /// With `sync` set, file-backed streams are also synced to storage.
    pub fn close(mut self, sync: bool) -> Result<()> {
        self.writer().flush().map_err(TeeError::SinkUnavailable)?;
        if let (true, StreamKind::File(file)) = (sync, &self.kind) {
            file.sync_all().map_err(TeeError::SinkUnavailable)?;
        }
        Ok(())
    }
}

/// Cloneable in-memory output; every clone appends to the same bytes
///
/// # Examples
/// ```
/// use teeio::{length_of, SharedBuffer, Tee};
///
/// let buffer = SharedBuffer::new();
/// let tee = Tee::from_text("copied", buffer.clone());
/// assert_eq!(length_of(tee).unwrap(), 6);
/// assert_eq!(buffer.to_string_lossy(), "copied");
/// ```
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the bytes written so far
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// Contents as UTF-8, malformed sequences replaced
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discard the contents for every clone
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_destination_creates_and_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, b"previous, much longer content").unwrap();

        let mut stream = Destination::from(path.as_path()).open().unwrap();
        stream.write_all(b"new").unwrap();
        stream.close(false).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_handle_destination_is_rewound() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("handle.txt");
        fs::write(&path, b"stale stale stale").unwrap();
        let mut file = File::options().read(true).write(true).open(&path).unwrap();
        file.seek(SeekFrom::End(0)).unwrap();

        let mut stream = Destination::from(file).open().unwrap();
        stream.write_all(b"fresh").unwrap();
        stream.close(true).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"fresh");
    }

    #[test]
    fn test_unopenable_path_is_sink_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.txt");
        match Destination::from(path).open() {
            Err(TeeError::SinkUnavailable(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_output_failure_is_sink_unavailable() {
        let destination = Destination::output(|| -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"))
        });
        assert!(matches!(
            destination.open(),
            Err(TeeError::SinkUnavailable(_))
        ));
    }

    #[test]
    fn test_shared_buffer_destination() {
        let buffer = SharedBuffer::new();
        let mut stream = Destination::from(buffer.clone()).open().unwrap();
        stream.write_all(b"abc").unwrap();
        stream.write_all(b"def").unwrap();
        stream.close(false).unwrap();
        assert_eq!(buffer.contents(), b"abcdef");
    }
}
