//! Error implementations

use std::fmt::Display;

use serde::{de, ser};
use thiserror::Error;

/// Result alias used throughout the codecs.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure an encode or decode call can produce.
///
/// Codecs fail fast: the first error encountered is returned unmodified
/// through the whole recursive encode/decode chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A value does not fit the width declared for it.
    #[error("{what} out of range: {detail}")]
    OutOfRange { what: &'static str, detail: String },

    /// The input ran out in the middle of a value.
    #[error("unexpected end of input at offset {at}: need {need} bytes, {remaining} remaining")]
    UnexpectedEof {
        at: usize,
        need: usize,
        remaining: usize,
    },

    /// A string field did not hold valid UTF-8.
    #[error("invalid utf-8 in string at offset {at}")]
    InvalidUtf8 { at: usize },

    /// An option presence byte other than `0` or `1` under the strict policy.
    #[error("invalid presence byte {byte:#04x} at offset {at}")]
    InvalidPresence { at: usize, byte: u8 },

    /// A `char` field did not hold a unicode scalar value.
    #[error("invalid char scalar {value:#x} at offset {at}")]
    InvalidChar { at: usize, value: u32 },

    /// Values nest deeper than [crate::Config::max_depth] allows.
    #[error("nesting deeper than {limit} levels at offset {at}")]
    DepthLimitExceeded { at: usize, limit: usize },

    /// A length-prefixed collection element occupied no bytes, so its count
    /// is not bounded by the input.
    #[error("zero-sized element in length-prefixed collection at offset {at}")]
    ZeroSizedElement { at: usize },

    /// The value was decoded but bytes were left over.
    #[error("{remaining} trailing bytes after value")]
    TrailingBytes { remaining: usize },

    /// A sequence was serialized without knowing its length up front.
    #[error("sequence length must be known before serialization")]
    UnknownLength,

    /// The format carries no type information, so the caller must drive decoding.
    #[error("wire format is not self-describing")]
    NotSelfDescribing,

    /// The discriminant byte does not index a declared variant.
    #[error("unknown discriminant {discriminant} for {type_id} ({declared} variants declared)")]
    UnknownVariant {
        type_id: String,
        discriminant: u8,
        declared: usize,
    },

    /// The schema itself is broken. This is a programming error.
    #[error("schema: {0}")]
    Schema(#[from] SchemaError),

    /// A dynamic value does not conform to its declared type.
    #[error("value does not match schema: {0}")]
    Mismatch(String),

    /// The type uses a construct the wire format has no encoding for.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// Messages raised by `Serialize`/`Deserialize` impls.
    #[error("{0}")]
    Custom(String),
}

/// Schema definition defects, raised while building or resolving a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("type `{0}` has no registry entry")]
    Unresolved(String),

    #[error("type `{0}` is defined twice with different layouts")]
    Duplicate(String),

    #[error("enum `{type_id}` declares {count} variants, at most 256 fit a u8 discriminant")]
    TooManyVariants { type_id: String, count: usize },

    #[error("type `{0}` contains itself without a sequence or option in between")]
    UnboundedRecursion(String),

    #[error("`{owner}` is a sequence of `{element}`, which encodes to zero bytes")]
    ZeroSizedElement { owner: String, element: String },
}

/// The error categories callers are expected to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Range,
    Format,
    UnknownVariant,
    Schema,
    Mismatch,
    Custom,
}

impl Error {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::OutOfRange { .. } => ErrorKind::Range,
            Error::UnexpectedEof { .. }
            | Error::InvalidUtf8 { .. }
            | Error::InvalidPresence { .. }
            | Error::InvalidChar { .. }
            | Error::DepthLimitExceeded { .. }
            | Error::ZeroSizedElement { .. }
            | Error::TrailingBytes { .. }
            | Error::UnknownLength
            | Error::NotSelfDescribing => ErrorKind::Format,
            Error::UnknownVariant { .. } => ErrorKind::UnknownVariant,
            Error::Schema(_) => ErrorKind::Schema,
            Error::Mismatch(_) => ErrorKind::Mismatch,
            Error::Unsupported(_) | Error::Custom(_) => ErrorKind::Custom,
        }
    }

    pub(crate) fn out_of_range(what: &'static str, detail: impl Display) -> Self {
        Error::OutOfRange {
            what,
            detail: detail.to_string(),
        }
    }

    pub(crate) fn mismatch(detail: impl Display) -> Self {
        Error::Mismatch(detail.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Custom(msg.to_string())
    }
}
