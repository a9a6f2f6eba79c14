//! Encoder and decoder contexts.
//!
//! Each context owns the bit buffer of one top-level call and is threaded through every
//! recursive step, so independent calls never share a cursor. Composite nodes are handled
//! here; scalar leaves are delegated to [crate::scalar] and the empty schema to
//! [crate::unknown].

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    bits::{BitReader, BitWriter},
    errors::{DecodeError, EncodeError},
    scalar::{self, read_chained_length, write_chained_length},
    schema::{ScalarSchema, Schema},
    types::{TypeKind, TypedArrayKind},
    unknown,
    value::Value,
};

/// Element schema of a set declared without nodes.
static UNKNOWN: Schema = Schema::Unknown;

/// Number of bits in each chunk of a list length prefix.
const LIST_CHUNK_BITS: usize = 8;

/// Longest list whose element layout takes no bits. Such a list is bounded by its
/// length prefix alone, not by the input size.
const MAX_EMPTY_ELEMENTS: usize = u16::MAX as usize;

/// Bit-packing context for one or more values written back to back.
#[derive(Debug, Default)]
pub struct Encoder {
    pub(crate) writer: BitWriter,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.writer.bit_len()
    }

    /// Consumes the encoder, returning the bytes written padded to a byte boundary.
    pub fn finish(self) -> Vec<u8> {
        self.writer.into_bytes()
    }

    /// Appends `value` laid out by `schema`. A `Null` value falls back to the node's default.
    pub fn encode(&mut self, schema: &Schema, value: &Value) -> Result<(), EncodeError> {
        self.encode_slot(schema, Some(value), || "value".to_string())
    }

    /// Encodes a positional or keyed slot, substituting the node default for an absent
    /// or `Null` value.
    fn encode_slot(
        &mut self,
        node: &Schema,
        value: Option<&Value>,
        slot: impl FnOnce() -> String,
    ) -> Result<(), EncodeError> {
        let value = match value {
            Some(v) if !v.is_null() => v,
            _ => match (node.default_value(), value) {
                (Some(default), _) => default,
                (None, Some(null)) if accepts_null(node) => null,
                (None, _) => return Err(EncodeError::MissingValue(slot())),
            },
        };

        self.encode_node(node, value)
    }

    pub(crate) fn encode_node(
        &mut self,
        schema: &Schema,
        value: &Value,
    ) -> Result<(), EncodeError> {
        match schema {
            Schema::Unknown => unknown::encode(self, value),
            Schema::Scalar(scalar) => self.encode_scalar(scalar, value),
            Schema::Tuple(nodes) => self.encode_tuple(nodes, value),
            Schema::List(element) => self.encode_list(element, value),
            Schema::Struct(fields) => {
                for (key, node) in fields {
                    self.encode_slot(node, field(value, key)?, || key.clone())?;
                }
                Ok(())
            }
            Schema::Mapping(entries) => {
                for (key, node) in entries {
                    self.encode_slot(node, entry(value, key)?, || key.to_string())?;
                }
                Ok(())
            }
            Schema::Set(nodes) => match nodes.as_slice() {
                [] => self.encode_list(&UNKNOWN, value),
                [element] => self.encode_list(element, value),
                nodes => self.encode_tuple(nodes, value),
            },
        }
    }

    fn encode_scalar(&mut self, schema: &ScalarSchema, value: &Value) -> Result<(), EncodeError> {
        let writer = &mut self.writer;

        match schema.kind() {
            TypeKind::Bool => scalar::encode_bool(writer, schema, value),
            TypeKind::Enum => scalar::encode_enum(writer, schema, value),
            TypeKind::Int => scalar::encode_signed(writer, value, schema.width(), "int"),
            TypeKind::Uint => scalar::encode_unsigned(writer, value, schema.width(), "uint"),
            TypeKind::Float => scalar::encode_float(writer, value, schema.width()),
            TypeKind::BigInt => scalar::encode_signed(writer, value, 64, "bigint"),
            TypeKind::BigUint => scalar::encode_unsigned(writer, value, 64, "biguint"),
            TypeKind::Char => scalar::encode_char(writer, schema, value),
            TypeKind::WChar => scalar::encode_wchar(writer, value),
            TypeKind::VarChar => scalar::encode_varchar(writer, schema, value),
            TypeKind::Json => scalar::encode_json(writer, schema, value),
            TypeKind::TypedArray(kind) => {
                let items = sequence(value, "an array")?;
                let count = typed_array_count(schema);

                if items.len() > count {
                    debug!(count, given = items.len(), "ignoring extra typed array elements");
                }

                for i in 0..count {
                    let element = typed_array_element(schema, kind, i);
                    self.encode_slot(&element, items.get(i), || format!("[{i}]"))?;
                }
                Ok(())
            }
        }
    }

    fn encode_tuple(&mut self, nodes: &[Schema], value: &Value) -> Result<(), EncodeError> {
        let items = sequence(value, "an array")?;

        if items.len() > nodes.len() {
            debug!(arity = nodes.len(), given = items.len(), "ignoring extra tuple elements");
        }

        for (i, node) in nodes.iter().enumerate() {
            self.encode_slot(node, items.get(i), || format!("[{i}]"))?;
        }

        Ok(())
    }

    /// Chained 8-bit length, then every element with the same node.
    fn encode_list(&mut self, element: &Schema, value: &Value) -> Result<(), EncodeError> {
        let items = sequence(value, "an array")?;

        if items.len() > MAX_EMPTY_ELEMENTS && takes_no_bits(element) {
            return Err(EncodeError::LengthOverflow {
                len: items.len(),
                max: MAX_EMPTY_ELEMENTS,
            });
        }

        write_chained_length(&mut self.writer, items.len(), LIST_CHUNK_BITS);
        for (i, item) in items.iter().enumerate() {
            self.encode_slot(element, Some(item), || format!("[{i}]"))?;
        }

        Ok(())
    }
}

/// Nodes for which `Null` is a value rather than an absent slot. Containers read it as
/// "every slot absent", so their own slot defaults apply.
fn accepts_null(node: &Schema) -> bool {
    match node {
        Schema::Scalar(scalar) => matches!(scalar.kind(), TypeKind::Json | TypeKind::TypedArray(_)),
        _ => true,
    }
}

/// Whether every value of `node` encodes to zero bits: fixed composites with no
/// fields, or whose fields all take no bits.
fn takes_no_bits(node: &Schema) -> bool {
    match node {
        Schema::Tuple(nodes) => nodes.iter().all(takes_no_bits),
        Schema::Struct(fields) => fields.iter().all(|(_, node)| takes_no_bits(node)),
        Schema::Mapping(entries) => entries.iter().all(|(_, node)| takes_no_bits(node)),
        Schema::Set(nodes) if nodes.len() > 1 => nodes.iter().all(takes_no_bits),
        _ => false,
    }
}

/// Elements of an array-like value. `Null` is an empty sequence so slot defaults apply.
fn sequence<'v>(value: &'v Value, expected: &'static str) -> Result<&'v [Value], EncodeError> {
    match value {
        Value::Array(items) | Value::Set(items) => Ok(items),
        Value::Null => Ok(&[]),
        other => Err(EncodeError::ValueMismatch {
            expected,
            found: other.kind_name().to_string(),
        }),
    }
}

/// Looks up a struct field by name in an object or a string-keyed map.
fn field<'v>(value: &'v Value, key: &str) -> Result<Option<&'v Value>, EncodeError> {
    match value {
        Value::Object(fields) => Ok(fields.get(key)),
        Value::Map(entries) => Ok(entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)),
        Value::Null => Ok(None),
        other => Err(EncodeError::ValueMismatch {
            expected: "an object",
            found: other.kind_name().to_string(),
        }),
    }
}

/// Looks up a mapping entry; object keys are matched against the key's text.
fn entry<'v>(value: &'v Value, key: &Value) -> Result<Option<&'v Value>, EncodeError> {
    match value {
        Value::Map(entries) => Ok(entries.iter().find(|(k, _)| k.matches(key)).map(|(_, v)| v)),
        Value::Object(fields) => Ok(match key {
            Value::String(name) => fields.get(name),
            other => fields.get(&other.to_string()),
        }),
        Value::Null => Ok(None),
        other => Err(EncodeError::ValueMismatch {
            expected: "a map",
            found: other.kind_name().to_string(),
        }),
    }
}

fn typed_array_count(schema: &ScalarSchema) -> usize {
    schema.width().max(1) as usize
}

/// Element node `i` of a typed array. A list default is spread across the elements,
/// any other default is shared by all of them.
fn typed_array_element(schema: &ScalarSchema, kind: TypedArrayKind, i: usize) -> Schema {
    let (element, bits) = kind.element();
    let default = match schema.default() {
        Some(Value::Array(items)) => items.get(i).cloned(),
        other => other.cloned(),
    };

    Schema::Scalar(ScalarSchema::with_width(element, bits, default))
}

/// Bit-unpacking context over one buffer. Calling [Decoder::decode] repeatedly reads
/// consecutive values from where the previous call stopped.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    pub(crate) reader: BitReader<'a>,
    /// Schema-less arrays currently open around the cursor.
    pub(crate) depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: BitReader::new(data),
            depth: 0,
        }
    }

    /// Bits consumed so far.
    pub fn bit_pos(&self) -> usize {
        self.reader.bit_pos()
    }

    /// Bits left in the buffer, including trailing padding.
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    pub fn decode(&mut self, schema: &Schema) -> Result<Value, DecodeError> {
        match schema {
            Schema::Unknown => unknown::decode(self),
            Schema::Scalar(scalar) => self.decode_scalar(scalar),
            Schema::Tuple(nodes) => self.decode_tuple(nodes).map(Value::Array),
            Schema::List(element) => self.decode_list(element).map(Value::Array),
            Schema::Struct(fields) => {
                let mut object = IndexMap::with_capacity(fields.len());
                for (key, node) in fields {
                    object.insert(key.clone(), self.decode(node)?);
                }
                Ok(Value::Object(object))
            }
            Schema::Mapping(entries) => {
                let mut map = Vec::with_capacity(entries.len());
                for (key, node) in entries {
                    map.push((key.clone(), self.decode(node)?));
                }
                Ok(Value::Map(map))
            }
            Schema::Set(nodes) => {
                let items = match nodes.as_slice() {
                    [] => self.decode_list(&UNKNOWN)?,
                    [element] => self.decode_list(element)?,
                    nodes => self.decode_tuple(nodes)?,
                };
                Ok(Value::Set(items))
            }
        }
    }

    fn decode_scalar(&mut self, schema: &ScalarSchema) -> Result<Value, DecodeError> {
        let reader = &mut self.reader;

        let value = match schema.kind() {
            TypeKind::Bool => scalar::decode_bool(reader, schema)?,
            TypeKind::Enum => scalar::decode_enum(reader, schema)?,
            TypeKind::Int => Value::integer(scalar::decode_signed(reader, schema.width())?),
            TypeKind::Uint => Value::UInt(scalar::decode_unsigned(reader, schema.width())?),
            TypeKind::Float => Value::Float(scalar::decode_float(reader, schema.width())?),
            TypeKind::BigInt => Value::BigInt(scalar::decode_signed(reader, 64)?),
            TypeKind::BigUint => Value::BigUint(scalar::decode_unsigned(reader, 64)?),
            TypeKind::Char => scalar::decode_char(reader, schema)?,
            TypeKind::WChar => scalar::decode_wchar(reader)?,
            TypeKind::VarChar => scalar::decode_varchar(reader, schema)?,
            TypeKind::Json => scalar::decode_json(reader, schema)?,
            TypeKind::TypedArray(kind) => {
                let count = typed_array_count(schema);
                let mut items = Vec::with_capacity(count.min(self.reader.remaining()));
                for i in 0..count {
                    items.push(self.decode(&typed_array_element(schema, kind, i))?);
                }
                Value::Array(items)
            }
        };

        Ok(value)
    }

    fn decode_tuple(&mut self, nodes: &[Schema]) -> Result<Vec<Value>, DecodeError> {
        nodes.iter().map(|node| self.decode(node)).collect()
    }

    fn decode_list(&mut self, element: &Schema) -> Result<Vec<Value>, DecodeError> {
        let len = read_chained_length(&mut self.reader, LIST_CHUNK_BITS)?;
        if len > MAX_EMPTY_ELEMENTS && takes_no_bits(element) {
            return Err(DecodeError::MalformedInput(format!(
                "list of {len} empty elements exceeds {MAX_EMPTY_ELEMENTS}"
            )));
        }

        let mut items = Vec::with_capacity(len.min(self.reader.remaining()));

        for _ in 0..len {
            items.push(self.decode(element)?);
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{bits::bytes_to_bit_strings, errors::ReadError};

    fn schema(text: &str) -> Schema {
        Schema::compile(text).unwrap()
    }

    fn bits_of(schema: &Schema, value: &Value) -> String {
        let mut encoder = Encoder::new();
        encoder.encode(schema, value).unwrap();
        let len = encoder.bit_len();
        bytes_to_bit_strings(&encoder.finish()).concat()[..len].to_string()
    }

    fn round_trip(schema: &Schema, value: &Value) -> Value {
        let mut encoder = Encoder::new();
        encoder.encode(schema, value).unwrap();
        let bits = encoder.bit_len();
        let bytes = encoder.finish();
        assert_eq!(bytes.len(), bits.div_ceil(8));

        let mut decoder = Decoder::new(&bytes);
        let decoded = decoder.decode(schema).unwrap();
        assert_eq!(decoder.bit_pos(), bits, "decode consumed a different bit count");
        decoded
    }

    #[test]
    fn test_bool_true_is_one_bit() {
        assert_eq!(bits_of(&schema("bool"), &Value::Bool(true)), "1");
    }

    #[test]
    fn test_enum_of_five() {
        assert_eq!(bits_of(&schema("enum(5)"), &Value::from(2u8)), "010");
    }

    #[test]
    fn test_int8_tuple() {
        let tuple = Schema::from_json(&json!(["int(8)", "int(8)", "int(8)", "int(8)"])).unwrap();
        let value = Value::from(vec![52u8, 42, 32, 22]);
        assert_eq!(round_trip(&tuple, &value), value);
    }

    #[test]
    fn test_struct_of_varchars() {
        let structure =
            Schema::from_json(&json!({"key1": "varchar", "key2": "varchar(255)"})).unwrap();
        let value = Value::from_json(&json!({"key1": "key1", "key2": "second key"}));
        assert_eq!(round_trip(&structure, &value), value);
    }

    #[test]
    fn test_list_of_300_bytes() {
        let list = Schema::list(schema("uint(8)"));
        let value = Value::from((0..300u32).map(|i| (i % 256) as u8).collect::<Vec<_>>());

        let mut encoder = Encoder::new();
        encoder.encode(&list, &value).unwrap();
        assert_eq!(encoder.bit_len(), 16 + 300 * 8);

        assert_eq!(round_trip(&list, &value), value);
    }

    #[test]
    fn test_list_lengths_at_chunk_boundary() {
        let list = Schema::list(schema("bool"));
        for len in [0usize, 254, 255, 256, 510] {
            let value = Value::from(vec![true; len]);
            assert_eq!(round_trip(&list, &value), value, "len {len}");
        }
    }

    #[test]
    fn test_string_of_70000_chars() {
        let text: String = "abcdefghij".repeat(7_000);
        let value = Value::from(text);
        assert_eq!(round_trip(&schema("varchar"), &value), value);
    }

    #[test]
    fn test_scalar_boundaries() {
        let cases = [
            ("int(8)", vec![Value::from(-128i64), Value::from(-1i64), Value::from(0u8), Value::from(127u8)]),
            ("int(32)", vec![Value::from(i32::MIN), Value::from(i32::MAX)]),
            ("uint(16)", vec![Value::from(0u8), Value::from(u16::MAX)]),
            ("uint(32)", vec![Value::from(u32::MAX)]),
            ("bigint", vec![Value::BigInt(i64::MIN), Value::BigInt(-1), Value::BigInt(i64::MAX)]),
            ("biguint", vec![Value::BigUint(0), Value::BigUint(u64::MAX)]),
            ("float(64)", vec![Value::Float(-0.5), Value::Float(f64::MAX)]),
            ("float(32)", vec![Value::Float(1.5), Value::Float(-2.25)]),
            ("char", vec![Value::from("a"), Value::from("ÿ")]),
            ("wchar", vec![Value::from("€"), Value::from("😀")]),
            ("varchar(255)", vec![Value::from(""), Value::from("x".repeat(255))]),
            ("enum('a', 'b', 'c')", vec![Value::from("a"), Value::from("c")]),
        ];

        for (text, values) in cases {
            let node = schema(text);
            for value in values {
                assert_eq!(round_trip(&node, &value), value, "{text}");
            }
        }
    }

    #[test]
    fn test_struct_uses_declaration_order() {
        let structure = Schema::structure([("b", schema("uint(8)")), ("a", schema("bool"))]);
        let value = Value::from_json(&json!({"a": true, "b": 3}));
        assert_eq!(bits_of(&structure, &value), "000000111");
    }

    #[test]
    fn test_missing_key_uses_default() {
        let structure = Schema::structure([("n", schema("uint(8)[9]")), ("s", schema("varchar(255)"))]);
        let value = Value::from_json(&json!({"s": "hi"}));
        assert_eq!(
            round_trip(&structure, &value),
            Value::from_json(&json!({"n": 9, "s": "hi"}))
        );
    }

    #[test]
    fn test_missing_key_without_default() {
        let structure = Schema::structure([("n", schema("uint(8)"))]);
        let mut encoder = Encoder::new();
        assert_eq!(
            encoder.encode(&structure, &Value::Object(IndexMap::new())),
            Err(EncodeError::MissingValue("n".to_string()))
        );
    }

    #[test]
    fn test_null_top_level_uses_default() {
        assert_eq!(round_trip(&schema("int(16)[-7]"), &Value::Null), Value::Int(-7));
    }

    #[test]
    fn test_tuple_extra_elements_ignored() {
        let tuple = Schema::tuple(vec![schema("uint(8)"), schema("uint(8)")]);
        let value = Value::from(vec![1u8, 2, 3]);
        assert_eq!(round_trip(&tuple, &value), Value::from(vec![1u8, 2]));
    }

    #[test]
    fn test_tuple_rejects_scalar_input() {
        let tuple = Schema::tuple(vec![schema("uint(8)"), schema("uint(8)")]);
        let mut encoder = Encoder::new();
        assert!(matches!(
            encoder.encode(&tuple, &Value::from(1u8)),
            Err(EncodeError::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_mapping_round_trip() {
        let mapping = Schema::mapping([
            (Value::from(1u8), schema("varchar(255)")),
            (Value::from("flag"), schema("bool")),
        ]);
        let value = Value::Map(vec![
            (Value::from("flag"), Value::Bool(true)),
            (Value::Float(1.0), Value::from("one")),
        ]);

        assert_eq!(
            round_trip(&mapping, &value),
            Value::Map(vec![
                (Value::from(1u8), Value::from("one")),
                (Value::from("flag"), Value::Bool(true)),
            ])
        );
    }

    #[test]
    fn test_mapping_accepts_object_input() {
        let mapping = Schema::mapping([(Value::from("a"), schema("uint(8)")), (Value::from(2u8), schema("bool"))]);
        let value = Value::from_json(&json!({"a": 5, "2": false}));
        assert_eq!(
            round_trip(&mapping, &value),
            Value::Map(vec![
                (Value::from("a"), Value::from(5u8)),
                (Value::from(2u8), Value::Bool(false)),
            ])
        );
    }

    #[test]
    fn test_set_layouts() {
        let uniform = Schema::set(vec![schema("uint(8)")]);
        let value = Value::Set(vec![Value::from(1u8), Value::from(2u8), Value::from(3u8)]);
        assert_eq!(round_trip(&uniform, &value), value);

        let fixed = Schema::set(vec![schema("uint(8)"), schema("bool")]);
        let value = Value::Set(vec![Value::from(7u8), Value::Bool(false)]);
        assert_eq!(bits_of(&fixed, &value), "000001110");
        assert_eq!(round_trip(&fixed, &value), value);
    }

    #[test]
    fn test_typed_array_expands_to_elements() {
        let arr = schema("int16array(3)");
        let value = Value::from(vec![-1i16, 0, 300]);
        let mut encoder = Encoder::new();
        encoder.encode(&arr, &value).unwrap();
        assert_eq!(encoder.bit_len(), 48);
        assert_eq!(round_trip(&arr, &value), value);
    }

    #[test]
    fn test_typed_array_without_default() {
        let mut encoder = Encoder::new();
        assert_eq!(
            encoder.encode(&schema("uint8array"), &Value::Null),
            Err(EncodeError::MissingValue("[0]".to_string()))
        );
        assert_eq!(round_trip(&schema("uint8array"), &Value::from(vec![9u8])), Value::from(vec![9u8]));
    }

    #[test]
    fn test_typed_array_default_spread() {
        let arr = schema("uint8array(3)[4, 5, 6]");
        assert_eq!(round_trip(&arr, &Value::from(vec![1u8])), Value::from(vec![1u8, 5, 6]));

        let shared = schema("float64array(2)[0.5]");
        assert_eq!(round_trip(&shared, &Value::Null), Value::from(vec![0.5f64, 0.5]));
    }

    #[test]
    fn test_json_node() {
        let value = Value::from_json(&json!({"nested": [1, {"k": null}], "s": "x"}));
        assert_eq!(round_trip(&schema("json"), &value), value);
        assert_eq!(round_trip(&schema("json(255)"), &Value::Null), Value::Null);
    }

    #[test]
    fn test_sequential_decodes_share_buffer() {
        let node = schema("uint(8)");
        let mut encoder = Encoder::new();
        for v in [10u8, 20, 30] {
            encoder.encode(&node, &Value::from(v)).unwrap();
        }
        let bytes = encoder.finish();

        let mut decoder = Decoder::new(&bytes);
        let values: Vec<Value> = (0..3).map(|_| decoder.decode(&node).unwrap()).collect();
        assert_eq!(values, vec![Value::from(10u8), Value::from(20u8), Value::from(30u8)]);
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_truncated_input() {
        let bytes = [0xFF];
        let mut decoder = Decoder::new(&bytes);
        assert!(matches!(
            decoder.decode(&schema("uint(16)")),
            Err(DecodeError::Read(ReadError::TruncatedInput { needed: 16, available: 8, .. }))
        ));
    }

    #[test]
    fn test_huge_list_length_is_truncated_not_allocated() {
        let bytes = [0xFF; 64];
        let mut decoder = Decoder::new(&bytes);
        assert!(matches!(
            decoder.decode(&Schema::list(schema("uint(32)"))),
            Err(DecodeError::Read(ReadError::TruncatedInput { .. }))
        ));
    }

    #[test]
    fn test_large_typed_array_on_short_input() {
        let arr = schema("uint8array(4000000000)");
        let bytes = [0u8; 2];
        let mut decoder = Decoder::new(&bytes);
        assert!(matches!(
            decoder.decode(&arr),
            Err(DecodeError::Read(ReadError::TruncatedInput { .. }))
        ));
    }

    #[test]
    fn test_list_of_empty_elements_is_bounded() {
        let empty = Schema::structure(Vec::<(String, Schema)>::new());
        let nested = Schema::Tuple(vec![Schema::Tuple(vec![]), empty.clone()]);

        for element in [Schema::Tuple(vec![]), empty, nested] {
            let list = Schema::list(element);
            let mut bytes = vec![0xFFu8; 4095];
            bytes.push(0x00);
            assert!(matches!(
                Decoder::new(&bytes).decode(&list),
                Err(DecodeError::MalformedInput(_))
            ));

            let mut encoder = Encoder::new();
            let value = Value::Array(vec![Value::Null; MAX_EMPTY_ELEMENTS + 1]);
            assert_eq!(
                encoder.encode(&list, &value),
                Err(EncodeError::LengthOverflow {
                    len: MAX_EMPTY_ELEMENTS + 1,
                    max: MAX_EMPTY_ELEMENTS
                })
            );
        }
    }

    #[test]
    fn test_short_list_of_empty_elements() {
        let list = Schema::list(Schema::Tuple(vec![]));
        let value = Value::Array(vec![Value::Array(vec![]); 3]);
        assert_eq!(bits_of(&list, &value), "00000011");
        assert_eq!(round_trip(&list, &value), value);
    }

    #[test]
    fn test_decoded_struct_keeps_declaration_order() {
        let structure = Schema::structure([
            ("b", schema("uint(8)")),
            ("a", schema("bool")),
            ("c", schema("char")),
        ]);
        let value = Value::from_json(&json!({"a": true, "c": "x", "b": 3}));

        let decoded = round_trip(&structure, &value);
        let Value::Object(fields) = &decoded else {
            panic!("expected object");
        };
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(decoded.to_string(), r#"{"b":3,"a":true,"c":"x"}"#);
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_single_node_tuple_is_a_list() {
        let tuple = Schema::tuple(vec![schema("uint(8)")]);
        assert_eq!(tuple, Schema::list(schema("uint(8)")));

        let value = Value::from(vec![1u8, 2, 3]);
        assert_eq!(round_trip(&tuple, &value), value);
    }

    proptest! {
        #[test]
        fn prop_int32_round_trip(v in any::<i32>()) {
            let value = Value::from(v);
            prop_assert_eq!(round_trip(&schema("int(32)"), &value), value);
        }

        #[test]
        fn prop_latin1_varchar_round_trip(text in "[\\x20-\\x7e\\u{a0}-\\u{ff}]{0,300}") {
            let value = Value::from(text);
            prop_assert_eq!(round_trip(&schema("varchar"), &value), value);
        }

        #[test]
        fn prop_charset_varchar_round_trip(text in "[0-9A-F]{0,255}") {
            let node = schema("varchar(255){0123456789ABCDEF}");
            let value = Value::from(text.clone());

            let mut encoder = Encoder::new();
            encoder.encode(&node, &value).unwrap();
            prop_assert_eq!(encoder.bit_len(), 8 + text.len() * 4);
            prop_assert_eq!(round_trip(&node, &value), value);
        }

        #[test]
        fn prop_list_round_trip(items in proptest::collection::vec(any::<u16>(), 0..600)) {
            let value = Value::from(items);
            prop_assert_eq!(round_trip(&Schema::list(schema("uint(16)")), &value), value);
        }
    }
}
