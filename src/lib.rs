//! # bitson
//!
//! Schema-driven, bit-packed serialization of dynamic values.
//!
//! Every field is packed with exactly its declared width: a `bool` is one bit, an
//! `enum(5)` three, a `varchar{0123456789ABCDEF}` four bits per character. Schemas are
//! compiled once from text (`int(16)`, `enum("a", "b")[a]`, `varchar(255){abc}`) or from
//! JSON descriptors, and reused for every call. Without a schema each value is prefixed
//! with a short type tag, so the decoder can rebuild it on its own.
//!
//! ## Example
//!
//! ```
//! use bitson::{Format, Schema, Value};
//! use serde_json::json;
//!
//! let schema = Schema::from_json(&json!({"id": "uint(16)", "name": "varchar(255)"})).unwrap();
//! let value = Value::from_json(&json!({"id": 7, "name": "bits"}));
//!
//! let packed = bitson::encode(&schema, &value, Format::Base64).unwrap();
//! assert_eq!(bitson::decode(&schema, &packed, Format::Base64).unwrap(), value);
//!
//! let packed = bitson::encode(&Schema::Unknown, &Value::from(1001u32), Format::Bits).unwrap();
//! assert_eq!(
//!     bitson::decode(&Schema::Unknown, &packed, Format::Bits).unwrap(),
//!     Value::UInt(1001)
//! );
//! ```

pub mod bits;
pub mod charset;
pub mod codec;
pub mod errors;
pub mod frame;
pub mod parser;
pub mod scalar;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod types;
mod unknown;
pub mod value;

use tracing::trace;

pub use crate::{
    codec::{Decoder, Encoder},
    errors::Error,
    frame::{Encoded, Format},
    schema::{Param, ScalarSchema, Schema, config},
    value::Value,
};

/// Packs `value` with `schema` and frames the bytes as `format`.
pub fn encode(schema: &Schema, value: &Value, format: Format) -> Result<Encoded, Error> {
    let mut encoder = Encoder::new();
    encoder.encode(schema, value)?;

    let bits = encoder.bit_len();
    let bytes = encoder.finish();
    trace!(bits, bytes = bytes.len(), %format, "encoded value");

    Ok(frame::render(&bytes, format))
}

/// Unframes `input` as `format` and unpacks one value with `schema`.
///
/// Several values written back to back into one buffer are read with a [Decoder].
pub fn decode(schema: &Schema, input: &Encoded, format: Format) -> Result<Value, Error> {
    let bytes = frame::unframe(input, format)?;

    let mut decoder = Decoder::new(&bytes);
    let value = decoder.decode(schema)?;
    trace!(bits = decoder.bit_pos(), bytes = bytes.len(), %format, "decoded value");

    Ok(value)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::errors::{DecodeError, EncodeError, ReadError, SchemaError};

    const FORMATS: [Format; 4] = [Format::Escaped, Format::NoEscape, Format::Base64, Format::Bits];

    fn bits(schema: &str, value: Value) -> Vec<String> {
        let schema = Schema::compile(schema).unwrap();
        match encode(&schema, &value, Format::Bits).unwrap() {
            Encoded::Bits(bits) => bits,
            Encoded::Text(text) => panic!("expected bits, got {text:?}"),
        }
    }

    #[test]
    fn test_concrete_bit_layouts() {
        assert_eq!(bits("bool", Value::Bool(true)), vec!["10000000"]);
        assert_eq!(bits("enum(5)", Value::from(2u8)), vec!["01000000"]);
    }

    #[test]
    fn test_every_format_round_trips() {
        let schema = Schema::from_json(&json!({
            "id": "uint(32)",
            "label": "varchar",
            "pos": ["float(32)", "float(32)"],
            "extra": ""
        }))
        .unwrap();
        let value = Value::from_json(&json!({
            "id": 92,
            "label": "line\\with\nescapes",
            "pos": [1.5, -0.25],
            "extra": {"any": ["thing", 1]}
        }));

        for format in FORMATS {
            let packed = encode(&schema, &value, format).unwrap();
            assert_eq!(decode(&schema, &packed, format).unwrap(), value, "{format}");
        }
    }

    #[test]
    fn test_schemaless_integer() {
        for format in FORMATS {
            let packed = encode(&Schema::Unknown, &Value::from(1001u32), format).unwrap();
            assert_eq!(decode(&Schema::Unknown, &packed, format).unwrap(), Value::UInt(1001));
        }
    }

    #[test]
    fn test_errors_reach_the_caller() {
        let schema = Schema::compile("enum(3)").unwrap();
        assert!(matches!(
            encode(&schema, &Value::from(3u8), Format::Escaped),
            Err(Error::Encode(EncodeError::EnumRange { .. }))
        ));
        assert!(matches!(
            Schema::compile("int(7)").map_err(Error::from),
            Err(Error::Schema(SchemaError::InvalidParam { .. }))
        ));
        assert!(matches!(
            decode(&Schema::compile("uint(16)").unwrap(), &Encoded::from("a"), Format::NoEscape),
            Err(Error::Decode(DecodeError::Read(ReadError::TruncatedInput { .. })))
        ));
        assert!(matches!(
            decode(&schema, &Encoded::from("a"), Format::Bits),
            Err(Error::Decode(DecodeError::FormatMismatch("bits")))
        ));
    }

    #[test]
    fn test_config_output_compiles() {
        let text = config("string", Some(Value::from(255u8).into()), None, Some(charset::NUMERIC))
            .unwrap();
        assert_eq!(text, "varchar(255){0123456789}");

        let schema = Schema::compile(&text).unwrap();
        let packed = encode(&schema, &Value::from("2024"), Format::Escaped).unwrap();
        assert_eq!(decode(&schema, &packed, Format::Escaped).unwrap(), Value::from("2024"));
    }

    proptest! {
        #[test]
        fn prop_byte_count_matches_bits(values in proptest::collection::vec(any::<i16>(), 0..40)) {
            let schema = Schema::list(Schema::compile("int(16)").unwrap());
            let value = Value::from(values);

            let mut encoder = Encoder::new();
            encoder.encode(&schema, &value).unwrap();
            let expected = encoder.bit_len().div_ceil(8);

            for format in FORMATS {
                let packed = encode(&schema, &value, format).unwrap();
                prop_assert_eq!(frame::unframe(&packed, format).unwrap().len(), expected);
            }
        }
    }
}
