//! Byte producers
//!
//! A [`Source`] describes some content and hands out a fresh reader over it
//! each time [`Source::reader`] is called. Building a source never touches
//! an external resource; the work happens when the reader is pulled.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use super::encoding::{Charset, CharsetEncoder, EncodingChoice};
use crate::error::{Result, TeeError};

/// Amount of UTF-8 text converted per encoder step
const ENCODE_STEP: usize = 4 * 1024;

/// A restartable producer of bytes
pub trait Source {
    type Reader: Read;

    /// Open an independent stream over the content, from the start
    fn reader(&self) -> Result<Self::Reader>;
}

impl<S: Source + ?Sized> Source for &S {
    type Reader = S::Reader;

    fn reader(&self) -> Result<Self::Reader> {
        (**self).reader()
    }
}

/// Raw bytes, yielded untouched
#[derive(Clone, Debug)]
pub struct BytesSource<B> {
    bytes: B,
}

impl<B: AsRef<[u8]> + Clone> BytesSource<B> {
    /// Wrap bytes owned or borrowed by the caller
    pub fn new(bytes: B) -> Self {
        Self { bytes }
    }
}

impl<B: AsRef<[u8]> + Clone> Source for BytesSource<B> {
    type Reader = Cursor<B>;

    fn reader(&self) -> Result<Self::Reader> {
        Ok(Cursor::new(self.bytes.clone()))
    }
}

/// Character data with the charset it will be encoded in
///
/// # Examples
/// ```
/// use std::io::Read;
/// use teeio::{Source, TextSource};
///
/// let source = TextSource::with_encoding("ß", "utf-16be").unwrap();
/// let mut bytes = Vec::new();
/// source.reader().unwrap().read_to_end(&mut bytes).unwrap();
/// assert_eq!(bytes, [0x00, 0xDF]);
/// ```
#[derive(Clone, Debug)]
pub struct TextSource<T> {
    text: T,
    charset: Charset,
}

impl<T: AsRef<str> + Clone> TextSource<T> {
    /// Text encoded as UTF-8
    pub fn new(text: T) -> Self {
        Self::with_charset(text, Charset::utf_8())
    }

    /// Text in an already resolved charset
    pub fn with_charset(text: T, charset: Charset) -> Self {
        Self { text, charset }
    }

    /// Resolve `encoding` now, so an unknown name fails before any I/O
    pub fn with_encoding(text: T, encoding: impl Into<EncodingChoice>) -> Result<Self> {
        let charset = encoding.into().resolve()?;
        Ok(Self::with_charset(text, charset))
    }

    /// Charset the text is encoded in
    pub fn charset(&self) -> Charset {
        self.charset
    }
}

impl TextSource<String> {
    /// Collect a character slice, then resolve `encoding`
    pub fn from_chars(chars: &[char], encoding: impl Into<EncodingChoice>) -> Result<Self> {
        Self::with_encoding(chars.iter().collect::<String>(), encoding)
    }
}

impl<T: AsRef<str> + Clone> Source for TextSource<T> {
    type Reader = EncodingReader<T>;

    fn reader(&self) -> Result<Self::Reader> {
        Ok(EncodingReader::new(self.text.clone(), self.charset))
    }
}

/// Reader that encodes text step by step as bytes are requested
pub struct EncodingReader<T> {
    text: T,
    // byte offset of the next unencoded character
    pos: usize,
    encoder: CharsetEncoder,
    pending: Vec<u8>,
    offset: usize,
    finished: bool,
}

impl<T: AsRef<str>> EncodingReader<T> {
    /// Reader positioned at the first character of `text`
    pub fn new(text: T, charset: Charset) -> Self {
        Self {
            text,
            pos: 0,
            encoder: charset.new_encoder(),
            pending: Vec::new(),
            offset: 0,
            finished: false,
        }
    }

    fn refill(&mut self) {
        self.pending.clear();
        self.offset = 0;

        let text = self.text.as_ref();
        let rest = &text[self.pos..];
        let mut end = rest.len().min(ENCODE_STEP);
        while !rest.is_char_boundary(end) {
            end += 1;
        }

        self.pos += end;
        let last = self.pos == text.len();
        self.encoder.encode(&rest[..end], last, &mut self.pending);
        self.finished = last;
    }
}

impl<T: AsRef<str>> Read for EncodingReader<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.offset == self.pending.len() {
            if self.finished {
                return Ok(0);
            }
            self.refill();
        }

        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

/// A file read from disk, opened only when a reader is requested
#[derive(Clone, Debug)]
pub struct PathSource {
    path: PathBuf,
}

impl PathSource {
    /// Remember the path; the file is not opened here
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path the reader opens
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for PathSource {
    type Reader = File;

    fn reader(&self) -> Result<Self::Reader> {
        File::open(&self.path).map_err(TeeError::SourceUnavailable)
    }
}

/// Content produced by caller-supplied logic
///
/// Errors from the factory or from the reader it returns are reported as
/// [`TeeError::SourceUnavailable`].
pub struct ReaderSource<F> {
    open: F,
}

impl<F, R> ReaderSource<F>
where
    F: Fn() -> io::Result<R>,
    R: Read,
{
    /// Wrap a factory that opens a fresh reader per call
    pub fn new(open: F) -> Self {
        Self { open }
    }
}

impl<F, R> Source for ReaderSource<F>
where
    F: Fn() -> io::Result<R>,
    R: Read,
{
    type Reader = R;

    fn reader(&self) -> Result<Self::Reader> {
        (self.open)().map_err(TeeError::SourceUnavailable)
    }
}
