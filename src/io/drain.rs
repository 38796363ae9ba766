//! Full consumption of readers and sources
//!
//! Draining a [`crate::Tee`] is how a copy is forced to completion: the byte
//! count returned equals what was written to its destination.

use std::io::{self, Read};

use super::encoding::Charset;
use super::source::Source;
use crate::error::{Result, TeeError};

/// Buffer size used while draining (8KB)
pub const DRAIN_BUFFER_SIZE: usize = 8 * 1024;

/// Consumes a reader to the end, chunk by chunk
pub struct Drain<R> {
    reader: R,
    buffer_size: usize,
}

impl<R: Read> Drain<R> {
    /// Drain with the default buffer size
    pub fn new(reader: R) -> Self {
        Self::with_buffer_size(reader, DRAIN_BUFFER_SIZE)
    }

    /// Drain with a custom buffer size; zero is treated as one
    pub fn with_buffer_size(reader: R, buffer_size: usize) -> Self {
        Self {
            reader,
            buffer_size: buffer_size.max(1),
        }
    }

    /// Fold every chunk into an accumulator
    pub fn fold<F, T>(&mut self, init: T, mut fold_fn: F) -> Result<T>
    where
        F: FnMut(T, &[u8]) -> Result<T>,
    {
        let mut acc = init;
        let mut buffer = vec![0u8; self.buffer_size];

        loop {
            let n = match self.reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(TeeError::from(e)),
            };
            acc = fold_fn(acc, &buffer[..n])?;
        }

        Ok(acc)
    }

    /// Total number of bytes left in the reader
    pub fn length(&mut self) -> Result<u64> {
        self.fold(0u64, |acc, chunk| Ok(acc + chunk.len() as u64))
    }

    /// Give back the reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Drain `reader` and return how many bytes it produced
pub fn length_of<R: Read>(reader: R) -> Result<u64> {
    Drain::new(reader).length()
}

/// Read a whole source and decode it with `charset`
pub fn read_text<S: Source>(source: &S, charset: Charset) -> Result<String> {
    let reader = source.reader()?;
    let bytes = Drain::new(reader).fold(Vec::new(), |mut acc, chunk| {
        acc.extend_from_slice(chunk);
        Ok(acc)
    })?;
    Ok(charset.decode(&bytes))
}
