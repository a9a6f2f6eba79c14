//! Canonical type tags, the alias table and per-type parameter domains.

/// Canonical scalar type of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    Enum,
    Int,
    Uint,
    Float,
    BigInt,
    BigUint,
    Char,
    WChar,
    VarChar,
    Json,
    TypedArray(TypedArrayKind),
}

/// Homogeneous numeric array types, each expanding to a tuple of one element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

/// How a type treats its `(param)` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRule {
    /// No parameter is accepted.
    None,
    /// Optional pair of values standing for true and false.
    Pair,
    /// Required value list, or a positive integer bound.
    Domain,
    /// A width drawn from `domain`; `required` widths with a single valid value default to it.
    Width {
        domain: &'static [u32],
        required: bool,
    },
    /// Optional positive element count.
    Count,
}

impl TypedArrayKind {
    /// Element type and width of each array slot.
    pub fn element(&self) -> (TypeKind, u32) {
        match self {
            TypedArrayKind::Int8 => (TypeKind::Int, 8),
            TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => (TypeKind::Uint, 8),
            TypedArrayKind::Int16 => (TypeKind::Int, 16),
            TypedArrayKind::Uint16 => (TypeKind::Uint, 16),
            TypedArrayKind::Int32 => (TypeKind::Int, 32),
            TypedArrayKind::Uint32 => (TypeKind::Uint, 32),
            TypedArrayKind::Float32 => (TypeKind::Float, 32),
            TypedArrayKind::Float64 => (TypeKind::Float, 64),
            TypedArrayKind::BigInt64 => (TypeKind::BigInt, 64),
            TypedArrayKind::BigUint64 => (TypeKind::BigUint, 64),
        }
    }
}

impl TypeKind {
    /// Canonical lowercase name used when rendering schema text.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Enum => "enum",
            TypeKind::Int => "int",
            TypeKind::Uint => "uint",
            TypeKind::Float => "float",
            TypeKind::BigInt => "bigint",
            TypeKind::BigUint => "biguint",
            TypeKind::Char => "char",
            TypeKind::WChar => "wchar",
            TypeKind::VarChar => "varchar",
            TypeKind::Json => "json",
            TypeKind::TypedArray(kind) => match kind {
                TypedArrayKind::Int8 => "int8array",
                TypedArrayKind::Uint8 => "uint8array",
                TypedArrayKind::Uint8Clamped => "uint8clampedarray",
                TypedArrayKind::Int16 => "int16array",
                TypedArrayKind::Uint16 => "uint16array",
                TypedArrayKind::Int32 => "int32array",
                TypedArrayKind::Uint32 => "uint32array",
                TypedArrayKind::Float32 => "float32array",
                TypedArrayKind::Float64 => "float64array",
                TypedArrayKind::BigInt64 => "bigint64array",
                TypedArrayKind::BigUint64 => "biguint64array",
            },
        }
    }

    /// Resolves a type name or alias, case-insensitively.
    pub fn from_alias(name: &str) -> Option<TypeKind> {
        let kind = match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" | "b" => TypeKind::Bool,
            "enum" | "enumeration" | "e" => TypeKind::Enum,
            "int" | "integer" | "signed" | "sint" | "i" => TypeKind::Int,
            "uint" | "unsigned" | "uinteger" | "u" => TypeKind::Uint,
            "float" | "double" | "real" | "f" => TypeKind::Float,
            "bigint" | "long" | "int64" => TypeKind::BigInt,
            "biguint" | "ulong" | "uint64" => TypeKind::BigUint,
            "char" | "character" | "c" => TypeKind::Char,
            "wchar" | "widechar" | "wc" => TypeKind::WChar,
            "varchar" | "string" | "str" | "text" | "s" => TypeKind::VarChar,
            "json" | "j" => TypeKind::Json,
            "int8array" => TypeKind::TypedArray(TypedArrayKind::Int8),
            "uint8array" => TypeKind::TypedArray(TypedArrayKind::Uint8),
            "uint8clampedarray" => TypeKind::TypedArray(TypedArrayKind::Uint8Clamped),
            "int16array" => TypeKind::TypedArray(TypedArrayKind::Int16),
            "uint16array" => TypeKind::TypedArray(TypedArrayKind::Uint16),
            "int32array" => TypeKind::TypedArray(TypedArrayKind::Int32),
            "uint32array" => TypeKind::TypedArray(TypedArrayKind::Uint32),
            "float32array" => TypeKind::TypedArray(TypedArrayKind::Float32),
            "float64array" => TypeKind::TypedArray(TypedArrayKind::Float64),
            "bigint64array" => TypeKind::TypedArray(TypedArrayKind::BigInt64),
            "biguint64array" => TypeKind::TypedArray(TypedArrayKind::BigUint64),
            _ => return None,
        };

        Some(kind)
    }

    pub fn param_rule(&self) -> ParamRule {
        match self {
            TypeKind::Bool => ParamRule::Pair,
            TypeKind::Enum => ParamRule::Domain,
            TypeKind::Int | TypeKind::Uint => ParamRule::Width {
                domain: &[8, 16, 32],
                required: true,
            },
            TypeKind::Float => ParamRule::Width {
                domain: &[32, 64],
                required: true,
            },
            TypeKind::BigInt | TypeKind::BigUint => ParamRule::Width {
                domain: &[64],
                required: true,
            },
            TypeKind::VarChar | TypeKind::Json => ParamRule::Width {
                domain: &[255],
                required: false,
            },
            TypeKind::Char | TypeKind::WChar => ParamRule::None,
            TypeKind::TypedArray(_) => ParamRule::Count,
        }
    }
}
