//! Character set resolution and text to byte conversion
//!
//! A caller picks an encoding in one of three ways: a concrete [`Charset`],
//! a name looked up in the WHATWG label table, or nothing at all (UTF-8).
//! [`EncodingChoice::resolve`] turns any of them into one [`Charset`].
//!
//! # Examples
//! ```
//! use teeio::{Charset, EncodingChoice};
//!
//! let by_name = EncodingChoice::from("utf-8").resolve().unwrap();
//! assert_eq!(by_name, Charset::utf_8());
//! assert_eq!(EncodingChoice::Default.resolve().unwrap(), Charset::utf_8());
//! assert!(Charset::for_name("no-such-charset").is_err());
//! ```

use std::fmt;

use encoding_rs::{Encoder, EncoderResult, Encoding};

use crate::error::{Result, TeeError};

/// Byte written in place of a character the target set cannot represent
pub const UNMAPPABLE_REPLACEMENT: u8 = b'?';

/// A concrete character set
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset(&'static Encoding);

impl Charset {
    /// UTF-8, the default for text
    pub fn utf_8() -> Self {
        Self(encoding_rs::UTF_8)
    }

    /// UTF-16, little endian, no byte order mark
    pub fn utf_16le() -> Self {
        Self(encoding_rs::UTF_16LE)
    }

    /// UTF-16, big endian, no byte order mark
    pub fn utf_16be() -> Self {
        Self(encoding_rs::UTF_16BE)
    }

    /// windows-1252, also what the `latin1` label resolves to
    pub fn windows_1252() -> Self {
        Self(encoding_rs::WINDOWS_1252)
    }

    /// Look up a charset by label (`"UTF-8"`, `"latin1"`, `"koi8-r"`, ...)
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn for_name(name: &str) -> Result<Self> {
        Encoding::for_label_no_replacement(name.as_bytes())
            .map(Self)
            .ok_or_else(|| TeeError::encoding(name))
    }

    /// Canonical name; [`Charset::for_name`] maps it back to `self`
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Underlying `encoding_rs` table
    pub fn encoding(&self) -> &'static Encoding {
        self.0
    }

    /// Start a streaming conversion from characters to bytes
    pub fn new_encoder(&self) -> CharsetEncoder {
        let kind = if self.0 == encoding_rs::UTF_16LE {
            EncoderKind::Utf16 { big_endian: false }
        } else if self.0 == encoding_rs::UTF_16BE {
            EncoderKind::Utf16 { big_endian: true }
        } else {
            EncoderKind::Table(self.0.new_encoder())
        };
        CharsetEncoder { kind }
    }

    /// Encode a whole string in one go
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len());
        self.new_encoder().encode(text, true, &mut out);
        out
    }

    /// Decode bytes, replacing malformed sequences with U+FFFD
    pub fn decode(&self, bytes: &[u8]) -> String {
        self.0.decode_without_bom_handling(bytes).0.into_owned()
    }
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf_8()
    }
}

/// The WHATWG `replacement` pseudo-encoding has no name of its own to look
/// up, so it becomes UTF-8, which is what it encodes to.
impl From<&'static Encoding> for Charset {
    fn from(encoding: &'static Encoding) -> Self {
        if encoding == encoding_rs::REPLACEMENT {
            return Self::utf_8();
        }
        Self(encoding)
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Streaming characters-to-bytes converter for one [`Charset`]
pub struct CharsetEncoder {
    kind: EncoderKind,
}

enum EncoderKind {
    // encoding_rs only emits UTF-8 for the UTF-16 family
    Utf16 { big_endian: bool },
    Table(Encoder),
}

impl CharsetEncoder {
    /// Append the encoding of `chars` to `out`
    ///
    /// `last` must be set on the final call so stateful encodings can return
    /// to their initial shift state.
    pub fn encode(&mut self, chars: &str, last: bool, out: &mut Vec<u8>) {
        match &mut self.kind {
            EncoderKind::Utf16 { big_endian } => {
                out.reserve(chars.len() * 2);
                for unit in chars.encode_utf16() {
                    let bytes = if *big_endian {
                        unit.to_be_bytes()
                    } else {
                        unit.to_le_bytes()
                    };
                    out.extend_from_slice(&bytes);
                }
            }
            EncoderKind::Table(encoder) => {
                let mut remaining = chars;
                loop {
                    let needed = encoder
                        .max_buffer_length_from_utf8_without_replacement(remaining.len())
                        .unwrap_or(remaining.len() * 4 + 16);
                    out.reserve(needed);

                    let (result, read) =
                        encoder.encode_from_utf8_to_vec_without_replacement(remaining, out, last);
                    remaining = &remaining[read..];

                    match result {
                        EncoderResult::InputEmpty => break,
                        EncoderResult::OutputFull => continue,
                        EncoderResult::Unmappable(_) => out.push(UNMAPPABLE_REPLACEMENT),
                    }
                }
            }
        }
    }
}

/// How the caller asked for text to be encoded
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EncodingChoice {
    /// UTF-8
    #[default]
    Default,
    Charset(Charset),
    Name(String),
}

impl EncodingChoice {
    /// Resolve to a concrete charset, failing on an unknown name
    pub fn resolve(&self) -> Result<Charset> {
        match self {
            Self::Default => Ok(Charset::utf_8()),
            Self::Charset(charset) => Ok(*charset),
            Self::Name(name) => Charset::for_name(name),
        }
    }
}

impl From<Charset> for EncodingChoice {
    fn from(charset: Charset) -> Self {
        Self::Charset(charset)
    }
}

impl From<&'static Encoding> for EncodingChoice {
    fn from(encoding: &'static Encoding) -> Self {
        Self::Charset(Charset::from(encoding))
    }
}

impl From<&str> for EncodingChoice {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for EncodingChoice {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<T: Into<EncodingChoice>> From<Option<T>> for EncodingChoice {
    fn from(choice: Option<T>) -> Self {
        choice.map_or(Self::Default, Into::into)
    }
}
