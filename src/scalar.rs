//! Per-type pack/unpack algorithms for scalar schema nodes.
//!
//! Every handler reads or writes the bitstream only; composites live in [crate::codec].
//! Multi-bit fields are big-endian (MSB first).

use crate::{
    bits::{BitReader, BitWriter, index_width, low_bits, sign_extend},
    errors::{DecodeError, EncodeError, ReadError},
    schema::{EnumDomain, ScalarSchema},
    value::Value,
};

/// Chunk value that signals another length chunk follows, for a chunk of `chunk_bits`.
fn chunk_max(chunk_bits: usize) -> usize {
    (1usize << chunk_bits) - 1
}

/// Writes `len` as repeated `chunk_bits` fields; a full chunk means "more follow".
pub fn write_chained_length(writer: &mut BitWriter, len: usize, chunk_bits: usize) {
    let max = chunk_max(chunk_bits);
    let mut remaining = len;

    while remaining >= max {
        writer.write_bits(max as u64, chunk_bits);
        remaining -= max;
    }

    writer.write_bits(remaining as u64, chunk_bits);
}

/// Sums `chunk_bits` fields until one is below the chunk maximum.
pub fn read_chained_length(reader: &mut BitReader, chunk_bits: usize) -> Result<usize, ReadError> {
    let max = chunk_max(chunk_bits) as u64;
    let mut len = 0usize;

    loop {
        let chunk = reader.read_bits(chunk_bits)?;
        len = len.saturating_add(chunk as usize);

        if chunk < max {
            return Ok(len);
        }
    }
}

fn write_text_length(writer: &mut BitWriter, len: usize, short: bool) -> Result<(), EncodeError> {
    if short {
        if len > 255 {
            return Err(EncodeError::LengthOverflow { len, max: 255 });
        }
        writer.write_bits(len as u64, 8);
    } else {
        write_chained_length(writer, len, 16);
    }

    Ok(())
}

fn read_text_length(reader: &mut BitReader, short: bool) -> Result<usize, ReadError> {
    if short {
        Ok(reader.read_bits(8)? as usize)
    } else {
        read_chained_length(reader, 16)
    }
}

fn numeric_error(value: &Value, ty: &'static str, bits: u32) -> EncodeError {
    EncodeError::NumericEncoding {
        value: value.to_string(),
        ty,
        bits,
    }
}

fn mismatch(expected: &'static str, value: &Value) -> EncodeError {
    EncodeError::ValueMismatch {
        expected,
        found: value.to_string(),
    }
}

pub fn encode_bool(
    writer: &mut BitWriter,
    schema: &ScalarSchema,
    value: &Value,
) -> Result<(), EncodeError> {
    let (truthy, falsy) = schema.bool_pair();

    if value.matches(&truthy) {
        writer.write_bit(true);
    } else if value.matches(&falsy) {
        writer.write_bit(false);
    } else {
        return Err(mismatch("one of the bool values", value));
    }

    Ok(())
}

pub fn decode_bool(reader: &mut BitReader, schema: &ScalarSchema) -> Result<Value, DecodeError> {
    let (truthy, falsy) = schema.bool_pair();
    Ok(if reader.read_bit()? { truthy } else { falsy })
}

/// Bits used by an enum of `count` values: ⌊log₂(count − 1)⌋ + 1, at least one.
pub fn enum_width(count: usize) -> usize {
    index_width(count).max(1)
}

pub fn encode_enum(
    writer: &mut BitWriter,
    schema: &ScalarSchema,
    value: &Value,
) -> Result<(), EncodeError> {
    let domain = schema.enum_domain();
    let count = domain.count();

    let index = match domain {
        EnumDomain::Bound(_) => value
            .as_i128()
            .filter(|index| (0..count as i128).contains(index))
            .map(|index| index as usize),
        EnumDomain::Values(values) => values.iter().position(|v| v.matches(value)),
    };

    let index = index.ok_or_else(|| EncodeError::EnumRange {
        value: value.to_string(),
        count,
    })?;

    writer.write_bits(index as u64, enum_width(count));
    Ok(())
}

pub fn decode_enum(reader: &mut BitReader, schema: &ScalarSchema) -> Result<Value, DecodeError> {
    let domain = schema.enum_domain();
    let count = domain.count();
    let index = reader.read_bits(enum_width(count))?;

    if index >= count as u64 {
        return Err(DecodeError::EnumRange { index, count });
    }

    Ok(match domain {
        EnumDomain::Bound(_) => Value::UInt(index),
        EnumDomain::Values(values) => values[index as usize].clone(),
    })
}

/// Two's-complement field of `bits` bits.
pub fn encode_signed(
    writer: &mut BitWriter,
    value: &Value,
    bits: u32,
    ty: &'static str,
) -> Result<(), EncodeError> {
    let limit = 1i128 << (bits - 1);
    let v = value
        .as_i128()
        .filter(|v| (-limit..limit).contains(v))
        .ok_or_else(|| numeric_error(value, ty, bits))?;

    writer.write_bits(low_bits(v as i64 as u64, bits as usize), bits as usize);
    Ok(())
}

pub fn decode_signed(reader: &mut BitReader, bits: u32) -> Result<i64, ReadError> {
    Ok(sign_extend(reader.read_bits(bits as usize)?, bits as usize))
}

/// Unsigned field of `bits` bits.
pub fn encode_unsigned(
    writer: &mut BitWriter,
    value: &Value,
    bits: u32,
    ty: &'static str,
) -> Result<(), EncodeError> {
    let v = value
        .as_i128()
        .filter(|v| (0..1i128 << bits).contains(v))
        .ok_or_else(|| numeric_error(value, ty, bits))?;

    writer.write_bits(v as u64, bits as usize);
    Ok(())
}

pub fn decode_unsigned(reader: &mut BitReader, bits: u32) -> Result<u64, ReadError> {
    reader.read_bits(bits as usize)
}

/// IEEE 754 field of 32 or 64 bits. Finite values that overflow 32 bits are rejected.
pub fn encode_float(writer: &mut BitWriter, value: &Value, bits: u32) -> Result<(), EncodeError> {
    let v = value
        .as_f64()
        .ok_or_else(|| numeric_error(value, "float", bits))?;

    if bits == 32 {
        let narrowed = v as f32;
        if v.is_finite() && narrowed.is_infinite() {
            return Err(numeric_error(value, "float", bits));
        }
        writer.write_bits(narrowed.to_bits() as u64, 32);
    } else {
        writer.write_bits(v.to_bits(), 64);
    }

    Ok(())
}

pub fn decode_float(reader: &mut BitReader, bits: u32) -> Result<f64, ReadError> {
    if bits == 32 {
        Ok(f32::from_bits(reader.read_bits(32)? as u32) as f64)
    } else {
        Ok(f64::from_bits(reader.read_bits(64)?))
    }
}

fn write_charset_char(
    writer: &mut BitWriter,
    charset: &str,
    ch: char,
) -> Result<(), EncodeError> {
    let index = charset
        .chars()
        .position(|c| c == ch)
        .ok_or_else(|| EncodeError::CharsetMiss {
            ch,
            charset: charset.to_string(),
        })?;

    writer.write_bits(index as u64, index_width(charset.chars().count()));
    Ok(())
}

fn read_charset_char(reader: &mut BitReader, charset: &str) -> Result<char, DecodeError> {
    let len = charset.chars().count();
    let index = reader.read_bits(index_width(len))?;

    charset
        .chars()
        .nth(index as usize)
        .ok_or(DecodeError::CharsetIndex { index, len })
}

/// One character: charset index when a charset is set, else an 8-bit code.
fn write_char(
    writer: &mut BitWriter,
    schema: &ScalarSchema,
    ch: char,
    value: &Value,
) -> Result<(), EncodeError> {
    match schema.charset() {
        Some(charset) => write_charset_char(writer, charset, ch),
        None => {
            let code = u8::try_from(ch as u32)
                .map_err(|_| numeric_error(value, schema.kind().name(), 8))?;
            writer.write_bits(code as u64, 8);
            Ok(())
        }
    }
}

fn read_char(reader: &mut BitReader, schema: &ScalarSchema) -> Result<char, DecodeError> {
    match schema.charset() {
        Some(charset) => read_charset_char(reader, charset),
        None => Ok(char::from(reader.read_bits(8)? as u8)),
    }
}

pub fn encode_char(
    writer: &mut BitWriter,
    schema: &ScalarSchema,
    value: &Value,
) -> Result<(), EncodeError> {
    let mut chars = value.as_str().map(str::chars).into_iter().flatten();

    match (chars.next(), chars.next()) {
        (Some(ch), None) => write_char(writer, schema, ch, value),
        _ => Err(mismatch("a single character", value)),
    }
}

pub fn decode_char(reader: &mut BitReader, schema: &ScalarSchema) -> Result<Value, DecodeError> {
    Ok(Value::String(read_char(reader, schema)?.to_string()))
}

/// Flag bit for "two code units follow", then each UTF-16 unit as a 16-bit field.
pub fn encode_wchar(writer: &mut BitWriter, value: &Value) -> Result<(), EncodeError> {
    let units: Vec<u16> = match value.as_str() {
        Some(s) => s.encode_utf16().collect(),
        None => return Err(mismatch("a wide character", value)),
    };

    if units.is_empty() || units.len() > 2 {
        return Err(mismatch("one or two UTF-16 code units", value));
    }

    writer.write_bit(units.len() == 2);
    for unit in units {
        encode_unsigned(writer, &Value::UInt(unit as u64), 16, "wchar")?;
    }

    Ok(())
}

pub fn decode_wchar(reader: &mut BitReader) -> Result<Value, DecodeError> {
    let pair = reader.read_bit()?;
    let mut units = vec![decode_unsigned(reader, 16)? as u16];

    if pair {
        units.push(decode_unsigned(reader, 16)? as u16);
    }

    String::from_utf16(&units)
        .map(Value::String)
        .map_err(|e| DecodeError::InvalidText(e.to_string()))
}

/// Length prefix (8-bit for `(255)`, chained 16-bit otherwise), then one field per character.
pub fn encode_varchar(
    writer: &mut BitWriter,
    schema: &ScalarSchema,
    value: &Value,
) -> Result<(), EncodeError> {
    let text = value.as_str().ok_or_else(|| mismatch("a string", value))?;

    write_text_length(writer, text.chars().count(), schema.short_length())?;
    for ch in text.chars() {
        write_char(writer, schema, ch, value)?;
    }

    Ok(())
}

pub fn decode_varchar(reader: &mut BitReader, schema: &ScalarSchema) -> Result<Value, DecodeError> {
    let len = read_text_length(reader, schema.short_length())?;
    let mut text = String::with_capacity(len.min(reader.remaining() / 8));

    for _ in 0..len {
        text.push(read_char(reader, schema)?);
    }

    Ok(Value::String(text))
}

/// JSON text carried as its UTF-8 bytes with the varchar length rules.
pub fn encode_json(
    writer: &mut BitWriter,
    schema: &ScalarSchema,
    value: &Value,
) -> Result<(), EncodeError> {
    let text = value.to_json().to_string();

    write_text_length(writer, text.len(), schema.short_length())?;
    for byte in text.bytes() {
        writer.write_bits(byte as u64, 8);
    }

    Ok(())
}

pub fn decode_json(reader: &mut BitReader, schema: &ScalarSchema) -> Result<Value, DecodeError> {
    let len = read_text_length(reader, schema.short_length())?;
    let mut bytes = Vec::with_capacity(len.min(reader.remaining() / 8));

    for _ in 0..len {
        bytes.push(reader.read_bits(8)? as u8);
    }

    let text = String::from_utf8(bytes).map_err(|e| DecodeError::InvalidText(e.to_string()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

    Ok(Value::from_json(&json))
}
