//! Schema model: type references, struct and enum layouts, and the
//! [WireSchema] trait that derives them from Rust type definitions.
//!
//! A schema is a set of named layouts held in a [Registry]. Field and variant
//! order is part of the wire format: fields are written in declaration order
//! and a variant's discriminant is its position in the declaration.

use std::fmt::{self, Display};

mod codec;
mod registry;
mod value;

pub use codec::SchemaCodec;
pub use registry::{Registry, RegistryBuilder};
pub use value::{StructValue, Value, VariantValue};

/// Fixed-width and length-prefixed leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    U8,
    U16,
    U32,
    U64,
    I64,
    Bool,
    String,
}

impl PrimitiveKind {
    /// Encoded size, `None` for strings.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            PrimitiveKind::U8 | PrimitiveKind::Bool => Some(1),
            PrimitiveKind::U16 => Some(2),
            PrimitiveKind::U32 => Some(4),
            PrimitiveKind::U64 | PrimitiveKind::I64 => Some(8),
            PrimitiveKind::String => None,
        }
    }
}

impl Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::String => "string",
        };
        f.write_str(s)
    }
}

/// The declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(PrimitiveKind),
    /// Exactly N raw bytes.
    FixedBytes(usize),
    /// u32 element count followed by the elements.
    Sequence(Box<TypeRef>),
    /// Presence byte followed by the payload when present.
    Option(Box<TypeRef>),
    /// Another registry entry.
    Named(String),
}

impl TypeRef {
    pub const U8: TypeRef = TypeRef::Primitive(PrimitiveKind::U8);
    pub const U16: TypeRef = TypeRef::Primitive(PrimitiveKind::U16);
    pub const U32: TypeRef = TypeRef::Primitive(PrimitiveKind::U32);
    pub const U64: TypeRef = TypeRef::Primitive(PrimitiveKind::U64);
    pub const I64: TypeRef = TypeRef::Primitive(PrimitiveKind::I64);
    pub const BOOL: TypeRef = TypeRef::Primitive(PrimitiveKind::Bool);
    pub const STRING: TypeRef = TypeRef::Primitive(PrimitiveKind::String);

    pub fn fixed(len: usize) -> Self {
        TypeRef::FixedBytes(len)
    }

    pub fn sequence(element: TypeRef) -> Self {
        TypeRef::Sequence(Box::new(element))
    }

    pub fn option(inner: TypeRef) -> Self {
        TypeRef::Option(Box::new(inner))
    }

    pub fn named(type_id: impl Into<String>) -> Self {
        TypeRef::Named(type_id.into())
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(kind) => write!(f, "{}", kind),
            TypeRef::FixedBytes(len) => write!(f, "[u8; {}]", len),
            TypeRef::Sequence(element) => write!(f, "Vec<{}>", element),
            TypeRef::Option(inner) => write!(f, "Option<{}>", inner),
            TypeRef::Named(type_id) => f.write_str(type_id),
        }
    }
}

/// One named field of a struct layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
}

/// Ordered fields of a struct, or of a variant's payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructLayout {
    pub fields: Vec<FieldDescriptor>,
}

impl StructLayout {
    /// An empty layout. Used as is, this is the payload of a unit variant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Declaration order is encode order.
    pub fn field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn is_unit(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Display for StructLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}: {}", sep, field.name, field.ty)?;
        }
        f.write_str(" }")
    }
}

/// One variant of an enum layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDescriptor {
    pub name: String,
    pub payload: StructLayout,
}

/// Ordered variants of an enum. A variant's position is its discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumLayout {
    pub variants: Vec<VariantDescriptor>,
}

impl EnumLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variant carrying `payload`.
    pub fn variant(mut self, name: impl Into<String>, payload: StructLayout) -> Self {
        self.variants.push(VariantDescriptor {
            name: name.into(),
            payload,
        });
        self
    }

    /// Append a variant with no payload.
    pub fn unit_variant(self, name: impl Into<String>) -> Self {
        self.variant(name, StructLayout::new())
    }

    /// Position of the variant called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.name == name)
    }
}

impl Display for EnumLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, variant) in self.variants.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, variant.name)?;
            if !variant.payload.is_unit() {
                write!(f, " {}", variant.payload)?;
            }
        }
        f.write_str(" }")
    }
}

/// The layout registered under a type id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEntry {
    Struct(StructLayout),
    Enum(EnumLayout),
}

impl RegistryEntry {
    /// All field layouts reachable without going through another entry:
    /// the struct itself, or every variant payload.
    pub(crate) fn layouts(&self) -> Vec<&StructLayout> {
        match self {
            RegistryEntry::Struct(layout) => vec![layout],
            RegistryEntry::Enum(layout) => layout.variants.iter().map(|v| &v.payload).collect(),
        }
    }
}

/// Types that know their own wire layout.
///
/// Implemented for the primitive types, `[u8; N]`, `Vec<T>`, `Option<T>` and
/// `Box<T>`. User types get an implementation from `#[derive(WireSchema)]`,
/// which mirrors the field and variant order serde's derive writes.
pub trait WireSchema {
    /// Reference to this type as it appears in a field declaration.
    fn type_ref() -> TypeRef;

    /// Add this type's entry, and the entries of everything it refers to.
    ///
    /// Must do nothing if the entry is already present, so recursive types
    /// terminate.
    fn register(builder: &mut RegistryBuilder) {
        let _ = builder;
    }
}

macro_rules! primitive_schema {
    ($($ty: ty => $kind: ident),+ $(,)?) => {
        $(
            impl WireSchema for $ty {
                fn type_ref() -> TypeRef {
                    TypeRef::Primitive(PrimitiveKind::$kind)
                }
            }
        )+
    };
}

primitive_schema! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i64 => I64,
    bool => Bool,
    String => String,
}

impl<const N: usize> WireSchema for [u8; N] {
    fn type_ref() -> TypeRef {
        TypeRef::FixedBytes(N)
    }
}

impl<T: WireSchema> WireSchema for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::sequence(T::type_ref())
    }

    fn register(builder: &mut RegistryBuilder) {
        T::register(builder)
    }
}

impl<T: WireSchema> WireSchema for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::option(T::type_ref())
    }

    fn register(builder: &mut RegistryBuilder) {
        T::register(builder)
    }
}

impl<T: WireSchema> WireSchema for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }

    fn register(builder: &mut RegistryBuilder) {
        T::register(builder)
    }
}
