//! Rendering of packed bytes for transport, and the inverse.
//!
//! Text formats carry one character per byte (U+0000..=U+00FF).

use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    bits::bytes_to_bit_strings,
    errors::{DecodeError, UnknownFormat},
};

/// Output framing selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Byte string with `\` and newline backslash-escaped.
    #[default]
    Escaped,
    /// Raw byte string.
    NoEscape,
    /// Standard-alphabet base64 with padding.
    Base64,
    /// One 8-character `'0'/'1'` string per byte.
    Bits,
}

impl Format {
    pub fn name(&self) -> &'static str {
        match self {
            Format::Escaped => "escaped",
            Format::NoEscape => "noescape",
            Format::Base64 => "base64",
            Format::Bits => "bits",
        }
    }
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "escaped" => Ok(Format::Escaped),
            "noescape" => Ok(Format::NoEscape),
            "base64" => Ok(Format::Base64),
            "bits" => Ok(Format::Bits),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Framed output of an encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Text(String),
    Bits(Vec<String>),
}

impl Encoded {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Encoded::Text(text) => Some(text),
            Encoded::Bits(_) => None,
        }
    }

    pub fn as_bits(&self) -> Option<&[String]> {
        match self {
            Encoded::Bits(bits) => Some(bits),
            Encoded::Text(_) => None,
        }
    }
}

impl From<String> for Encoded {
    fn from(value: String) -> Self {
        Encoded::Text(value)
    }
}

impl From<&str> for Encoded {
    fn from(value: &str) -> Self {
        Encoded::Text(value.to_string())
    }
}

impl From<Vec<String>> for Encoded {
    fn from(value: Vec<String>) -> Self {
        Encoded::Bits(value)
    }
}

pub fn render(bytes: &[u8], format: Format) -> Encoded {
    match format {
        Format::Bits => Encoded::Bits(bytes_to_bit_strings(bytes)),
        Format::Base64 => Encoded::Text(STANDARD.encode(bytes)),
        Format::NoEscape => Encoded::Text(bytes.iter().map(|b| char::from(*b)).collect()),
        Format::Escaped => {
            let mut text = String::with_capacity(bytes.len());
            for byte in bytes {
                match byte {
                    b'\\' => text.push_str("\\\\"),
                    b'\n' => text.push_str("\\n"),
                    other => text.push(char::from(*other)),
                }
            }
            Encoded::Text(text)
        }
    }
}

/// Recovers the packed bytes from framed input.
pub fn unframe(input: &Encoded, format: Format) -> Result<Vec<u8>, DecodeError> {
    match (input, format) {
        (Encoded::Bits(chunks), Format::Bits) => chunks.iter().map(|c| parse_bit_chunk(c)).collect(),
        (Encoded::Text(text), Format::Base64) => STANDARD
            .decode(text.trim())
            .map_err(|e| DecodeError::MalformedInput(e.to_string())),
        (Encoded::Text(text), Format::NoEscape) => text.chars().map(latin1).collect(),
        (Encoded::Text(text), Format::Escaped) => unescape(text),
        (_, format) => Err(DecodeError::FormatMismatch(format.name())),
    }
}

fn parse_bit_chunk(chunk: &str) -> Result<u8, DecodeError> {
    if chunk.len() != 8 || !chunk.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(DecodeError::MalformedInput(format!(
            "`{chunk}` is not an 8-bit binary string"
        )));
    }

    u8::from_str_radix(chunk, 2).map_err(|e| DecodeError::MalformedInput(e.to_string()))
}

fn latin1(ch: char) -> Result<u8, DecodeError> {
    u8::try_from(ch).map_err(|_| {
        DecodeError::MalformedInput(format!("character {ch:?} does not stand for a byte"))
    })
}

/// Reverses `\\`, `\n` and `\"` escapes; any other escape is rejected.
fn unescape(text: &str) -> Result<Vec<u8>, DecodeError> {
    let mut bytes = Vec::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            bytes.push(latin1(ch)?);
            continue;
        }

        match chars.next() {
            Some('\\') => bytes.push(b'\\'),
            Some('n') => bytes.push(b'\n'),
            Some('"') => bytes.push(b'"'),
            Some(other) => {
                return Err(DecodeError::MalformedInput(format!(
                    "unknown escape `\\{other}`"
                )));
            }
            None => {
                return Err(DecodeError::MalformedInput(
                    "dangling escape at end of input".to_string(),
                ));
            }
        }
    }

    Ok(bytes)
}
