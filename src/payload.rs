//! Input model: named payloads waiting to be archived

use crate::buffer::{latin1_bytes, latin1_len};
use crate::error::{Result, ZipError};
use std::any::{type_name, Any};
use std::borrow::Cow;

/// File contents accepted by the archive builder
///
/// Text is stored as one byte per character using the low 8 bits of each code
/// point (Latin-1 transcription). Characters above U+00FF are truncated, so
/// anything that is not ASCII/Latin-1 should be encoded to bytes by the caller
/// first (for example with `str::as_bytes` for UTF-8).
///
/// "Character" means Unicode scalar value: a character outside the Basic
/// Multilingual Plane such as U+1F600 becomes one byte. Writers that work on
/// UTF-16 code units (JavaScript's `charCodeAt`) emit two bytes for it, one
/// per surrogate, so output only matches theirs byte for byte for text made
/// of BMP characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bytes(Vec<u8>),
    Text(String),
}

impl Payload {
    /// Coerce a dynamically typed value into a payload.
    ///
    /// Byte-like values (`Vec<u8>`, `Box<[u8]>`, `&'static [u8]`) and text-like
    /// values (`String`, `&'static str`, `Box<str>`) are accepted, as is an
    /// existing [`Payload`]. Anything else is rejected with
    /// [`ZipError::UnsupportedPayloadType`] naming the type.
    pub fn coerce<T: Any>(value: T) -> Result<Payload> {
        let boxed: Box<dyn Any> = Box::new(value);

        let boxed = match boxed.downcast::<Payload>() {
            Ok(payload) => return Ok(*payload),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<Vec<u8>>() {
            Ok(bytes) => return Ok(Payload::Bytes(*bytes)),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<Box<[u8]>>() {
            Ok(bytes) => return Ok(Payload::Bytes(bytes.into_vec())),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<&'static [u8]>() {
            Ok(bytes) => return Ok(Payload::Bytes(bytes.to_vec())),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<String>() {
            Ok(text) => return Ok(Payload::Text(*text)),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<Box<str>>() {
            Ok(text) => return Ok(Payload::Text(text.into_string())),
            Err(other) => other,
        };
        match boxed.downcast::<&'static str>() {
            Ok(text) => Ok(Payload::Text(text.to_string())),
            Err(_) => Err(ZipError::UnsupportedPayloadType(type_name::<T>().to_string())),
        }
    }

    /// Number of bytes the payload occupies in the archive
    pub fn len(&self) -> usize {
        match self {
            Payload::Bytes(bytes) => bytes.len(),
            Payload::Text(text) => latin1_len(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The payload as raw bytes; text goes through the Latin-1 transcription.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Payload::Bytes(bytes) => Cow::Borrowed(bytes),
            Payload::Text(text) => Cow::Owned(latin1_bytes(text)),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(bytes: &[u8; N]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Payload {
    fn from(bytes: [u8; N]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

/// A named payload to be appended to an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    pub data: Option<Payload>,
}

impl PendingFile {
    pub fn new(name: impl Into<String>, data: impl Into<Payload>) -> Self {
        Self {
            name: name.into(),
            data: Some(data.into()),
        }
    }

    /// Build an entry from a dynamically typed payload, see [`Payload::coerce`]
    pub fn from_any<T: Any>(name: impl Into<String>, data: T) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            data: Some(Payload::coerce(data)?),
        })
    }

    /// Check the entry and return its payload bytes
    pub(crate) fn validate(&self) -> Result<Cow<'_, [u8]>> {
        if self.name.is_empty() {
            return Err(ZipError::InvalidEntry(
                "file name must have at least one character".to_string(),
            ));
        }
        let data = self.data.as_ref().ok_or_else(|| {
            ZipError::InvalidEntry(format!("entry '{}' is missing its data", self.name))
        })?;
        Ok(data.to_bytes())
    }
}
