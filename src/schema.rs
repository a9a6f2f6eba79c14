//! Schema: the parsed, validated description that drives both encode and decode.
//!
//! Textual scalar schemas (`int(8)`, `enum("a", "b")`, `varchar(255){abc}`) are
//! compiled once into a [ScalarSchema]; composites are built structurally, either
//! with the [Schema] constructors or from a JSON descriptor via [Schema::from_json].

use std::{fmt, str::FromStr};

use crate::{
    errors::SchemaError,
    parser,
    types::{ParamRule, TypeKind},
    value::Value,
};

/// Parameter section of a scalar schema. A one-element list is always [Param::Single].
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Single(Value),
    List(Vec<Value>),
}

impl Param {
    /// All parameter values, in declaration order.
    pub fn values(&self) -> &[Value] {
        match self {
            Param::Single(v) => std::slice::from_ref(v),
            Param::List(vs) => vs,
        }
    }

    fn single(&self) -> Option<&Value> {
        match self {
            Param::Single(v) => Some(v),
            Param::List(_) => None,
        }
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        Param::Single(value)
    }
}

impl From<Vec<Value>> for Param {
    fn from(mut values: Vec<Value>) -> Self {
        if values.len() == 1 {
            Param::Single(values.remove(0))
        } else {
            Param::List(values)
        }
    }
}

/// Value domain of an enum field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnumDomain<'a> {
    /// Integers in `[0, bound)`.
    Bound(usize),
    /// Index into a list of literal values.
    Values(&'a [Value]),
}

impl EnumDomain<'_> {
    pub fn count(&self) -> usize {
        match self {
            EnumDomain::Bound(n) => *n,
            EnumDomain::Values(values) => values.len(),
        }
    }
}

/// A validated scalar schema node: `type[(param)][[default]][{charset}]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSchema {
    kind: TypeKind,
    param: Option<Param>,
    default: Option<Value>,
    charset: Option<String>,
}

impl ScalarSchema {
    /// Builds a scalar node, validating the parameter against the type's domain.
    /// Types with exactly one valid width default to it when the parameter is omitted.
    pub fn new(
        kind: TypeKind,
        param: Option<Param>,
        default: Option<Value>,
        charset: Option<String>,
    ) -> Result<Self, SchemaError> {
        let ty = kind.name();

        // A one-character alphabet would index with zero bits.
        if let Some(charset) = &charset {
            let text_type = matches!(kind, TypeKind::Char | TypeKind::VarChar);
            if charset.chars().nth(1).is_none() || !text_type {
                return Err(SchemaError::InvalidCharset { ty });
            }
        }

        let invalid = |param: &Param| SchemaError::InvalidParam {
            ty,
            param: render_list(param.values()),
        };

        let param = match (kind.param_rule(), param) {
            (ParamRule::Domain, None) => return Err(SchemaError::MissingParam { ty }),
            (ParamRule::Width { domain, required }, None) => match (domain, required) {
                ([only], true) => Some(Param::Single(Value::UInt(*only as u64))),
                (_, true) => return Err(SchemaError::MissingParam { ty }),
                (_, false) => None,
            },
            (_, None) => None,
            (ParamRule::None, Some(p)) => return Err(invalid(&p)),
            (ParamRule::Pair, Some(p)) => {
                if p.values().len() != 2 {
                    return Err(invalid(&p));
                }
                Some(p)
            }
            (ParamRule::Domain, Some(p)) => {
                if let Some(bound) = p.single().and_then(Value::as_i128) {
                    if bound < 1 || bound > u32::MAX as i128 {
                        return Err(invalid(&p));
                    }
                    Some(Param::Single(Value::UInt(bound as u64)))
                } else if p.values().is_empty() {
                    return Err(invalid(&p));
                } else {
                    Some(p)
                }
            }
            (ParamRule::Width { domain, .. }, Some(p)) => {
                match p.single().and_then(Value::as_i128) {
                    Some(width) if domain.iter().any(|d| *d as i128 == width) => {
                        Some(Param::Single(Value::UInt(width as u64)))
                    }
                    _ => return Err(invalid(&p)),
                }
            }
            (ParamRule::Count, Some(p)) => match p.single().and_then(Value::as_i128) {
                Some(count) if count >= 1 && count <= u32::MAX as i128 => {
                    Some(Param::Single(Value::UInt(count as u64)))
                }
                _ => return Err(invalid(&p)),
            },
        };

        Ok(Self {
            kind,
            param,
            default,
            charset,
        })
    }

    /// A numeric node of any width, bypassing the declared domain. Used for the
    /// 64-bit plain integers of schema-less mode and for typed-array elements.
    pub(crate) fn with_width(kind: TypeKind, bits: u32, default: Option<Value>) -> Self {
        Self {
            kind,
            param: Some(Param::Single(Value::UInt(bits as u64))),
            default,
            charset: None,
        }
    }

    pub(crate) fn bare(kind: TypeKind) -> Self {
        Self {
            kind,
            param: None,
            default: None,
            charset: None,
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn param(&self) -> Option<&Param> {
        self.param.as_ref()
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Declared bit width of a numeric node, or the count of a typed array.
    pub fn width(&self) -> u32 {
        self.param
            .as_ref()
            .and_then(Param::single)
            .and_then(Value::as_i128)
            .unwrap_or(0) as u32
    }

    /// Whether a varchar/json length fits in a single 8-bit prefix.
    pub fn short_length(&self) -> bool {
        self.width() == 255
    }

    /// Truthy and falsy values of a bool node.
    pub fn bool_pair(&self) -> (Value, Value) {
        match self.param.as_ref().map(Param::values) {
            Some([truthy, falsy]) => (truthy.clone(), falsy.clone()),
            _ => (Value::Bool(true), Value::Bool(false)),
        }
    }

    /// Domain of an enum node.
    pub fn enum_domain(&self) -> EnumDomain<'_> {
        match &self.param {
            Some(Param::Single(Value::UInt(bound))) => EnumDomain::Bound(*bound as usize),
            Some(p) => EnumDomain::Values(p.values()),
            None => EnumDomain::Bound(0),
        }
    }
}

impl FromStr for ScalarSchema {
    type Err = SchemaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parsed = parser::parse_scalar(text)?;
        let kind = TypeKind::from_alias(parsed.name)
            .ok_or_else(|| SchemaError::UnknownType(parsed.name.to_string()))?;

        let default = parsed.default.map(|mut values| {
            if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            }
        });

        ScalarSchema::new(kind, parsed.param.map(Param::from), default, parsed.charset)
    }
}

/// Renders the canonical textual form, which [ScalarSchema::from_str] reads back.
impl fmt::Display for ScalarSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;

        if let Some(param) = &self.param {
            write!(f, "({})", render_list(param.values()))?;
        }

        match &self.default {
            Some(Value::Array(items)) => write!(f, "[{}]", render_list(items))?,
            Some(value) => write!(f, "[{}]", render_literal(value))?,
            None => {}
        }

        if let Some(charset) = &self.charset {
            write!(f, "{{{charset}}}")?;
        }

        Ok(())
    }
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains('"') => format!("'{s}'"),
        Value::String(s) => format!("\"{s}\""),
        Value::Float(v) => format!("{v:?}"),
        other => other.to_string(),
    }
}

fn render_list(values: &[Value]) -> String {
    values
        .iter()
        .map(render_literal)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A schema node. Composite variants are fixed when the schema is built and never
/// re-derived from the shape of the value being encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Empty schema: values carry their own type tag.
    Unknown,
    Scalar(ScalarSchema),
    /// Fixed arity, one node per position.
    Tuple(Vec<Schema>),
    /// Variable arity, length-prefixed, one element node.
    List(Box<Schema>),
    /// Keyed structure, encoded in declaration order without a length prefix.
    Struct(Vec<(String, Schema)>),
    /// Key-value collection; the schema carries every key.
    Mapping(Vec<(Value, Schema)>),
    /// Set-like collection, laid out like an array of its nodes.
    Set(Vec<Schema>),
}

impl Schema {
    /// Compiles a textual scalar schema. The empty string is [Schema::Unknown].
    pub fn compile(text: &str) -> Result<Self, SchemaError> {
        if text.trim().is_empty() {
            return Ok(Schema::Unknown);
        }

        Ok(Schema::Scalar(text.parse()?))
    }

    /// Builds a schema from a JSON descriptor: a string is a textual scalar, an object
    /// a [Schema::Struct], and an array a [Schema::List] (one element) or [Schema::Tuple].
    pub fn from_json(json: &serde_json::Value) -> Result<Self, SchemaError> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Schema::Unknown),
            Json::String(text) => Schema::compile(text),
            Json::Array(items) => Ok(Schema::array(
                items
                    .iter()
                    .map(Schema::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Json::Object(fields) => Ok(Schema::Struct(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), Schema::from_json(v)?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?,
            )),
            other => Err(SchemaError::Syntax {
                text: other.to_string(),
                reason: "schema descriptors are strings, arrays or objects",
            }),
        }
    }

    /// Array rule: no nodes or one node is a variable [Schema::List], more is a [Schema::Tuple].
    pub fn array(mut nodes: Vec<Schema>) -> Self {
        match nodes.len() {
            0 => Schema::List(Box::new(Schema::Unknown)),
            1 => Schema::List(Box::new(nodes.remove(0))),
            _ => Schema::Tuple(nodes),
        }
    }

    /// Positional nodes under the array rule: fewer than two nodes give a uniform
    /// [Schema::List]. A fixed arity-1 tuple is spelled `Schema::Tuple(vec![node])`.
    pub fn tuple(nodes: Vec<Schema>) -> Self {
        Schema::array(nodes)
    }

    pub fn list(element: Schema) -> Self {
        Schema::List(Box::new(element))
    }

    pub fn structure<K: Into<String>>(fields: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Schema::Struct(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    pub fn mapping<K: Into<Value>>(entries: impl IntoIterator<Item = (K, Schema)>) -> Self {
        Schema::Mapping(entries.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    pub fn set(nodes: Vec<Schema>) -> Self {
        Schema::Set(nodes)
    }

    /// Default value of a scalar node, if any. Typed-array defaults belong to their
    /// elements, not to the array as a whole.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Schema::Scalar(scalar) if !matches!(scalar.kind(), TypeKind::TypedArray(_)) => {
                scalar.default()
            }
            _ => None,
        }
    }
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Schema::compile(text)
    }
}

impl From<ScalarSchema> for Schema {
    fn from(value: ScalarSchema) -> Self {
        Schema::Scalar(value)
    }
}

/// Validates a structured scalar description and renders its canonical text.
pub fn config(
    ty: &str,
    param: Option<Param>,
    default: Option<Value>,
    charset: Option<&str>,
) -> Result<String, SchemaError> {
    let kind = TypeKind::from_alias(ty).ok_or_else(|| SchemaError::UnknownType(ty.to_string()))?;
    let scalar = ScalarSchema::new(kind, param, default, charset.map(str::to_string))?;
    Ok(scalar.to_string())
}
