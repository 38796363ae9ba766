//! Copy-while-read composition
//!
//! A [`Tee`] is read like any other reader, and everything it hands out is
//! also written to a [`Destination`]. Nothing happens until the first pull:
//! that pull opens the destination, then the source, and every later pull
//! reads one run from the source, writes it to the destination, and returns
//! it unchanged. The destination is flushed and closed once the source is
//! exhausted, or closed as soon as either side fails.
//!
//! # Examples
//! ```
//! use teeio::{length_of, Charset, Tee};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("copy.txt");
//!
//! let tee = Tee::from_text_with("Grüße", &path, Charset::utf_8()).unwrap();
//! assert!(!path.exists());
//!
//! assert_eq!(length_of(tee).unwrap(), 7);
//! assert_eq!(std::fs::read_to_string(&path).unwrap(), "Grüße");
//! ```

use std::io::{self, Read};
use std::mem;

use super::drain::Drain;
use super::encoding::EncodingChoice;
use super::options::TeeOptions;
use super::sink::{Destination, SinkStream};
use super::source::{BytesSource, Source, TextSource};
use crate::error::{Result, TeeError};

/// Where a [`Tee`] is in its single pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeeState {
    /// Constructed; nothing opened
    Idle,
    /// Destination open, source being pulled
    Copying,
    /// Source exhausted, destination closed
    Complete,
    /// A pull failed, destination closed
    Failed,
}

enum Stage<R> {
    Idle(Destination),
    Copying { reader: R, sink: SinkStream },
    Complete,
    Failed,
}

/// A source that writes everything it produces into a destination
pub struct Tee<S: Source> {
    source: S,
    stage: Stage<S::Reader>,
    options: TeeOptions,
    copied: u64,
}

impl<S: Source> Tee<S> {
    /// Pair a source with a destination; nothing is opened yet
    pub fn new(source: S, destination: impl Into<Destination>) -> Self {
        Self {
            source,
            stage: Stage::Idle(destination.into()),
            options: TeeOptions::default(),
            copied: 0,
        }
    }

    /// Replace the default options
    pub fn with_options(mut self, options: TeeOptions) -> Self {
        self.options = options;
        self
    }

    /// Options in effect for this pass
    pub fn options(&self) -> &TeeOptions {
        &self.options
    }

    /// Current stage of the pass
    pub fn state(&self) -> TeeState {
        match self.stage {
            Stage::Idle(_) => TeeState::Idle,
            Stage::Copying { .. } => TeeState::Copying,
            Stage::Complete => TeeState::Complete,
            Stage::Failed => TeeState::Failed,
        }
    }

    /// Bytes written to the destination so far
    pub fn bytes_copied(&self) -> u64 {
        self.copied
    }

    /// Produce the next unit of at most `chunk_size` bytes
    ///
    /// Returns `None` once the source is exhausted, and on every call after.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let mut chunk = vec![0u8; self.options.effective_chunk_size()];
        let n = self.pull(&mut chunk)?;
        if n == 0 {
            return Ok(None);
        }
        chunk.truncate(n);
        Ok(Some(chunk))
    }

    /// Run the copy to completion and return the number of bytes produced
    ///
    /// Pulls in units of `chunk_size`, the same as repeated [`Tee::next_chunk`] calls.
    pub fn consume(&mut self) -> Result<u64> {
        let chunk_size = self.options.effective_chunk_size();
        Drain::with_buffer_size(self, chunk_size).length()
    }

    fn pull(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Stage::Idle(_) = self.stage {
            self.start()?;
        }

        let step = match &mut self.stage {
            Stage::Copying { reader, sink } => copy_step(reader, sink, buf),
            _ => return Ok(0),
        };

        match step {
            Ok(0) => self.finish().map(|()| 0),
            Ok(n) => {
                self.copied += n as u64;
                tracing::trace!(bytes = n, total = self.copied, "copied chunk");
                Ok(n)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    // Idle -> Copying; the destination opens before the source is touched
    fn start(&mut self) -> Result<()> {
        let destination = match mem::replace(&mut self.stage, Stage::Failed) {
            Stage::Idle(destination) => destination,
            other => {
                self.stage = other;
                return Ok(());
            }
        };

        let sink = destination.open().map_err(|err| self.fail(err))?;
        let reader = match self.source.reader() {
            Ok(reader) => reader,
            Err(err) => {
                drop(sink);
                return Err(self.fail(err));
            }
        };

        tracing::debug!("tee destination opened, copying");
        self.stage = Stage::Copying { reader, sink };
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Stage::Copying { sink, .. } = mem::replace(&mut self.stage, Stage::Complete) {
            sink.close(self.options.sync_on_close)
                .map_err(|err| self.fail(err))?;
            tracing::debug!(bytes = self.copied, "tee complete, destination closed");
        }
        Ok(())
    }

    fn fail(&mut self, err: TeeError) -> TeeError {
        if let Stage::Copying { sink, .. } = mem::replace(&mut self.stage, Stage::Failed) {
            // the original error wins over a failing flush
            let _ = sink.close(false);
        }
        tracing::warn!(error = %err, bytes = self.copied, "tee failed, destination closed");
        err
    }
}

fn copy_step<R: Read>(reader: &mut R, sink: &mut SinkStream, buf: &mut [u8]) -> Result<usize> {
    let n = loop {
        match reader.read(buf) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TeeError::from(e)),
        }
    };
    if n > 0 {
        sink.write_all(&buf[..n])?;
    }
    Ok(n)
}

impl<B: AsRef<[u8]> + Clone> Tee<BytesSource<B>> {
    /// Raw bytes, copied untouched
    pub fn from_bytes(bytes: B, destination: impl Into<Destination>) -> Self {
        Self::new(BytesSource::new(bytes), destination)
    }
}

impl<T: AsRef<str> + Clone> Tee<TextSource<T>> {
    /// Text encoded as UTF-8
    pub fn from_text(text: T, destination: impl Into<Destination>) -> Self {
        Self::new(TextSource::new(text), destination)
    }

    /// Text in the given encoding; an unknown name fails here, before anything is opened
    pub fn from_text_with(
        text: T,
        destination: impl Into<Destination>,
        encoding: impl Into<EncodingChoice>,
    ) -> Result<Self> {
        let source = TextSource::with_encoding(text, encoding)?;
        Ok(Self::new(source, destination))
    }
}

impl<S: Source> Read for Tee<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.pull(buf).map_err(io::Error::from)
    }
}
