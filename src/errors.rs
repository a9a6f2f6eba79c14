//! Error types for schema compilation, encoding and decoding.

use thiserror::Error;

/// Errors produced when compiling a schema description into a [crate::schema::Schema].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A type that requires a parameter received none.
    #[error("type `{ty}` requires a parameter")]
    MissingParam { ty: &'static str },
    /// A parameter outside the type's allowed domain.
    #[error("invalid parameter `{param}` for type `{ty}`")]
    InvalidParam { ty: &'static str, param: String },
    /// The schema names a type absent from the alias table.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// The `{charset}` section has fewer than two characters or is given to a type other
    /// than char/varchar.
    #[error("invalid charset for type `{ty}`")]
    InvalidCharset { ty: &'static str },
    /// The textual schema or JSON descriptor could not be read.
    #[error("malformed schema `{text}`: {reason}")]
    Syntax { text: String, reason: &'static str },
}

/// Errors produced while packing a value into the bitstream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// Enum index or value outside `[0, count)`.
    #[error("enum value {value} is outside 0..{count}")]
    EnumRange { value: String, count: usize },
    /// A character absent from its declared charset.
    #[error("character {ch:?} is not in charset {{{charset}}}")]
    CharsetMiss { ch: char, charset: String },
    /// The value cannot be represented in the declared width.
    #[error("value {value} cannot be encoded as {ty}({bits})")]
    NumericEncoding {
        value: String,
        ty: &'static str,
        bits: u32,
    },
    /// The value has the wrong shape for the schema node.
    #[error("expected {expected}, found {found}")]
    ValueMismatch {
        expected: &'static str,
        found: String,
    },
    /// A keyed or positional value is absent and its node has no default.
    #[error("missing value for `{0}`")]
    MissingValue(String),
    /// A length does not fit the declared length prefix.
    #[error("length {len} exceeds the maximum of {max}")]
    LengthOverflow { len: usize, max: usize },
}

/// Errors produced when reading bits from a byte slice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Requested bit range is beyond the end of the data.
    #[error("truncated input: needed {needed} bits at bit {bit_pos}, only {available} available")]
    TruncatedInput {
        bit_pos: usize,
        needed: usize,
        available: usize,
    },
    /// More than 64 bits were requested in a single read.
    #[error("cannot read more than 64 bits at once")]
    TooManyBitsRead,
}

/// Errors produced while unpacking a value from the bitstream or its framing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Read(#[from] ReadError),
    /// Decoded enum index is outside `[0, count)`.
    #[error("decoded enum index {index} is outside 0..{count}")]
    EnumRange { index: u64, count: usize },
    /// Decoded charset index has no character.
    #[error("decoded charset index {index} is outside a charset of {len} characters")]
    CharsetIndex { index: u64, len: usize },
    /// Decoded code units do not form valid text.
    #[error("decoded text is not valid: {0}")]
    InvalidText(String),
    /// A `json` payload did not parse.
    #[error("decoded json is not valid: {0}")]
    InvalidJson(String),
    /// The framed input could not be turned back into bytes.
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// The framed input does not match the requested format.
    #[error("input does not match format `{0}`")]
    FormatMismatch(&'static str),
}

/// A format name that [crate::frame::Format] does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format `{0}`")]
pub struct UnknownFormat(pub String);

/// Any failure surfaced by the top-level [crate::encode] / [crate::decode] calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<ReadError> for Error {
    fn from(value: ReadError) -> Self {
        Error::Decode(DecodeError::Read(value))
    }
}
