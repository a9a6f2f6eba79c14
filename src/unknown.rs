//! Schema-less mode: a type tag in front of every value.
//!
//! The tag is a 3-bit index into `[bool, int, uint, float, bigint, char, varchar, ESC]`.
//! `ESC` is followed by a 2-bit index into `[biguint, array, json, ESC2]`; `ESC2` is
//! reserved. Some tags carry a short parameter field right after the index:
//!
//! | tag            | parameter bits                                  |
//! |----------------|-------------------------------------------------|
//! | int / uint     | 2-bit index into widths `[8, 16, 32, 64]`       |
//! | float          | 1 bit, `0` = 32-bit, `1` = 64-bit               |
//! | bigint/biguint | 1 reserved bit, always `0`                      |
//! | varchar        | 1 bit, `1` = 8-bit length, `0` = chained length |
//!
//! The payload is then written by the same handler an explicit schema would use.

use tracing::debug;

use crate::{
    bits::{BitReader, BitWriter},
    codec::{Decoder, Encoder},
    errors::{DecodeError, EncodeError, ReadError},
    schema::{ScalarSchema, Schema},
    types::TypeKind,
    value::Value,
};

const PRIMARY_BITS: usize = 3;
const SECONDARY_BITS: usize = 2;
const ESCAPE: u64 = 7;

const WIDTHS: [u32; 4] = [8, 16, 32, 64];
const WIDTH_BITS: usize = 2;

/// Array tags a decode may nest before the input is rejected.
pub(crate) const MAX_DEPTH: usize = 128;

/// Category inferred for a value, with the parameter its tag carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Bool,
    Int(u32),
    Uint(u32),
    Float(u32),
    BigInt,
    Char,
    VarChar { short: bool },
    BigUint,
    Array,
    Json,
}

impl Tag {
    /// Picks the narrowest tag that round-trips `value` exactly. Integral floats take an
    /// integer tag, and other floats take 32 bits only when the value survives an f32
    /// round trip unchanged.
    fn classify(value: &Value) -> Tag {
        match value {
            Value::Bool(_) => Tag::Bool,
            Value::BigInt(_) => Tag::BigInt,
            Value::BigUint(v) if *v <= i64::MAX as u64 => Tag::BigInt,
            Value::BigUint(_) => Tag::BigUint,
            Value::Int(v) => Tag::Int(signed_width(*v)),
            Value::UInt(v) => Tag::Uint(unsigned_width(*v)),
            Value::Float(v) => match value.as_i128() {
                Some(i) if (i64::MIN as i128..0).contains(&i) => Tag::Int(signed_width(i as i64)),
                Some(i) if (0..=u64::MAX as i128).contains(&i) => {
                    Tag::Uint(unsigned_width(i as u64))
                }
                _ if (*v as f32) as f64 == *v => Tag::Float(32),
                _ => Tag::Float(64),
            },
            Value::String(s) if s.chars().any(|c| c as u32 > 0xFF) => Tag::Json,
            Value::String(s) => match s.chars().count() {
                1 => Tag::Char,
                len => Tag::VarChar { short: len <= 255 },
            },
            Value::Array(_) => Tag::Array,
            Value::Null | Value::Object(_) | Value::Map(_) | Value::Set(_) => Tag::Json,
        }
    }

    /// Primary index and, for escaped tags, the secondary index.
    fn codes(self) -> (u64, Option<u64>) {
        match self {
            Tag::Bool => (0, None),
            Tag::Int(_) => (1, None),
            Tag::Uint(_) => (2, None),
            Tag::Float(_) => (3, None),
            Tag::BigInt => (4, None),
            Tag::Char => (5, None),
            Tag::VarChar { .. } => (6, None),
            Tag::BigUint => (ESCAPE, Some(0)),
            Tag::Array => (ESCAPE, Some(1)),
            Tag::Json => (ESCAPE, Some(2)),
        }
    }

    fn write(self, writer: &mut BitWriter) {
        let (primary, secondary) = self.codes();
        writer.write_bits(primary, PRIMARY_BITS);
        if let Some(secondary) = secondary {
            writer.write_bits(secondary, SECONDARY_BITS);
        }

        match self {
            Tag::Int(bits) | Tag::Uint(bits) => {
                let index = WIDTHS.iter().position(|w| *w == bits).unwrap_or(WIDTHS.len() - 1);
                writer.write_bits(index as u64, WIDTH_BITS);
            }
            Tag::Float(bits) => writer.write_bit(bits == 64),
            Tag::BigInt | Tag::BigUint => writer.write_bit(false),
            Tag::VarChar { short } => writer.write_bit(short),
            Tag::Bool | Tag::Char | Tag::Array | Tag::Json => {}
        }
    }

    fn read(reader: &mut BitReader) -> Result<Tag, DecodeError> {
        let tag = match reader.read_bits(PRIMARY_BITS)? {
            0 => Tag::Bool,
            1 => Tag::Int(read_width(reader)?),
            2 => Tag::Uint(read_width(reader)?),
            3 => Tag::Float(if reader.read_bit()? { 64 } else { 32 }),
            4 => {
                reader.read_bit()?;
                Tag::BigInt
            }
            5 => Tag::Char,
            6 => Tag::VarChar {
                short: reader.read_bit()?,
            },
            _ => match reader.read_bits(SECONDARY_BITS)? {
                0 => {
                    reader.read_bit()?;
                    Tag::BigUint
                }
                1 => Tag::Array,
                2 => Tag::Json,
                _ => return Err(DecodeError::MalformedInput("reserved type tag".to_string())),
            },
        };

        Ok(tag)
    }

    /// The schema an explicit caller would have used for this category.
    fn schema(self) -> Schema {
        let scalar = match self {
            Tag::Bool => ScalarSchema::bare(TypeKind::Bool),
            Tag::Int(bits) => ScalarSchema::with_width(TypeKind::Int, bits, None),
            Tag::Uint(bits) => ScalarSchema::with_width(TypeKind::Uint, bits, None),
            Tag::Float(bits) => ScalarSchema::with_width(TypeKind::Float, bits, None),
            Tag::BigInt => ScalarSchema::with_width(TypeKind::BigInt, 64, None),
            Tag::BigUint => ScalarSchema::with_width(TypeKind::BigUint, 64, None),
            Tag::Char => ScalarSchema::bare(TypeKind::Char),
            Tag::VarChar { short: true } => ScalarSchema::with_width(TypeKind::VarChar, 255, None),
            Tag::VarChar { short: false } => ScalarSchema::bare(TypeKind::VarChar),
            Tag::Json => ScalarSchema::bare(TypeKind::Json),
            Tag::Array => return Schema::list(Schema::Unknown),
        };

        Schema::Scalar(scalar)
    }
}

fn read_width(reader: &mut BitReader) -> Result<u32, ReadError> {
    Ok(WIDTHS[reader.read_bits(WIDTH_BITS)? as usize])
}

/// Smallest width whose two's-complement range holds `v`.
fn signed_width(v: i64) -> u32 {
    WIDTHS
        .into_iter()
        .find(|&bits| bits == 64 || (-(1i64 << (bits - 1))..1i64 << (bits - 1)).contains(&v))
        .unwrap_or(64)
}

fn unsigned_width(v: u64) -> u32 {
    WIDTHS
        .into_iter()
        .find(|&bits| bits == 64 || v < 1u64 << bits)
        .unwrap_or(64)
}

/// Writes the type tag of `value`, then its payload.
pub(crate) fn encode(encoder: &mut Encoder, value: &Value) -> Result<(), EncodeError> {
    let tag = Tag::classify(value);
    debug!(?tag, kind = value.kind_name(), "classified schema-less value");

    tag.write(&mut encoder.writer);
    encoder.encode_node(&tag.schema(), value)
}

/// Reads a type tag, then its payload. Nested arrays stop at [MAX_DEPTH] levels.
pub(crate) fn decode(decoder: &mut Decoder) -> Result<Value, DecodeError> {
    let tag = Tag::read(&mut decoder.reader)?;
    debug!(?tag, depth = decoder.depth, "read schema-less tag");

    if tag != Tag::Array {
        return decoder.decode(&tag.schema());
    }

    if decoder.depth >= MAX_DEPTH {
        return Err(DecodeError::MalformedInput(format!(
            "arrays nested deeper than {MAX_DEPTH} levels"
        )));
    }

    decoder.depth += 1;
    let value = decoder.decode(&tag.schema());
    decoder.depth -= 1;

    value
}
