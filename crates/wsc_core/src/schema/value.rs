//! Dynamic values checked against a registry at encode time.

use std::fmt::{self, Display};

/// A value of some registered or primitive type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I64(i64),
    Bool(bool),
    String(String),
    FixedBytes(Vec<u8>),
    Sequence(Vec<Value>),
    Option(Option<Box<Value>>),
    Struct(StructValue),
    Variant(VariantValue),
}

impl Value {
    pub fn some(value: impl Into<Value>) -> Self {
        Value::Option(Some(Box::new(value.into())))
    }

    pub fn none() -> Self {
        Value::Option(None)
    }

    /// A `Vec<u8>` value.
    pub fn byte_sequence(bytes: &[u8]) -> Self {
        Value::Sequence(bytes.iter().copied().map(Value::U8).collect())
    }

    /// Short name of the value's shape, for mismatch reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::FixedBytes(_) => "fixed bytes",
            Value::Sequence(_) => "sequence",
            Value::Option(_) => "option",
            Value::Struct(_) => "struct",
            Value::Variant(_) => "variant",
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_variant(&self) -> Option<&VariantValue> {
        match self {
            Value::Variant(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty: ty => $variant: ident),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )+
    };
}

value_from! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i64 => I64,
    bool => Bool,
    String => String,
    StructValue => Struct,
    VariantValue => Variant,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        Value::FixedBytes(v.to_vec())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::FixedBytes(v) => write!(f, "0x{}", hex::encode(v)),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Option(None) => f.write_str("None"),
            Value::Option(Some(inner)) => write!(f, "Some({})", inner),
            Value::Struct(s) => write!(f, "{}", s),
            Value::Variant(v) => write!(f, "{}", v),
        }
    }
}

/// Named field values of a struct, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(field, value)| (field == name).then_some(value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, Value)> for StructValue {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Display for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}: {}", sep, name, value)?;
        }
        f.write_str(" }")
    }
}

/// The single selected variant of an enum and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantValue {
    pub name: String,
    pub payload: StructValue,
}

impl VariantValue {
    pub fn new(name: impl Into<String>, payload: StructValue) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// A variant without payload.
    pub fn unit(name: impl Into<String>) -> Self {
        Self::new(name, StructValue::new())
    }
}

impl Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.payload.is_empty() {
            write!(f, " {}", self.payload)?;
        }
        Ok(())
    }
}
