//! Struct and variant codecs driven by registry entries.

use crate::{
    codec::{self, ByteViewer},
    config::{Config, TrailingPolicy},
    err::{Error, Result},
};

use super::{
    EnumLayout, PrimitiveKind, Registry, RegistryEntry, StructLayout, StructValue, TypeRef, Value,
    VariantValue,
};

/// Encodes and decodes [Value]s against the layouts of a [Registry].
///
/// Holds only shared references, so any number of codecs can run over the
/// same registry concurrently.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCodec<'r> {
    registry: &'r Registry,
    config: Config,
}

impl<'r> SchemaCodec<'r> {
    pub fn new(registry: &'r Registry, config: Config) -> Self {
        Self { registry, config }
    }

    /// Encode a root value of the registered type `type_id`.
    pub fn serialize(&self, type_id: &str, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_value(&TypeRef::named(type_id), value, &mut out)?;
        log::trace!("serialized {} as {} bytes", type_id, out.len());

        Ok(out)
    }

    /// Decode a root value of the registered type `type_id`.
    pub fn deserialize(&self, type_id: &str, bytes: &[u8]) -> Result<Value> {
        let (value, used) = self.deserialize_prefix(type_id, bytes)?;

        match (self.config.trailing, bytes.len() - used) {
            (TrailingPolicy::Allow, _) | (TrailingPolicy::Reject, 0) => Ok(value),
            (TrailingPolicy::Reject, remaining) => Err(Error::TrailingBytes { remaining }),
        }
    }

    /// Decode one value from the front of `bytes`, returning it with the
    /// number of bytes it occupied.
    pub fn deserialize_prefix(&self, type_id: &str, bytes: &[u8]) -> Result<(Value, usize)> {
        let mut input = ByteViewer::from_slice(bytes);
        let value = self.decode_value(&TypeRef::named(type_id), &mut input)?;
        log::trace!("deserialized {} from {} bytes", type_id, input.offset());

        Ok((value, input.offset()))
    }

    /// Append the encoding of `value` as type `ty`.
    pub fn encode_value(&self, ty: &TypeRef, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        self.encode_at(ty, value, out, 0)
    }

    /// Read one value of type `ty`.
    pub fn decode_value(&self, ty: &TypeRef, input: &mut ByteViewer<'_>) -> Result<Value> {
        self.decode_at(ty, input, 0)
    }

    /// One nesting level below `depth`, unless that passes the limit.
    fn descend(&self, depth: usize, at: usize) -> Result<usize> {
        match depth < self.config.max_depth {
            true => Ok(depth + 1),
            false => Err(Error::DepthLimitExceeded {
                at,
                limit: self.config.max_depth,
            }),
        }
    }

    fn encode_at(&self, ty: &TypeRef, value: &Value, out: &mut Vec<u8>, depth: usize) -> Result<()> {
        match (ty, value) {
            (TypeRef::Primitive(kind), value) => encode_primitive(*kind, value, out),
            (TypeRef::FixedBytes(len), Value::FixedBytes(bytes)) => {
                codec::encode_fixed_bytes(out, bytes, *len)
            }
            (TypeRef::Sequence(element), Value::Sequence(items)) => {
                let depth = self.descend(depth, out.len())?;
                codec::encode_sequence(out, items, |out, item| {
                    self.encode_at(element, item, out, depth)
                })
            }
            (TypeRef::Option(inner), Value::Option(opt)) => {
                let depth = self.descend(depth, out.len())?;
                codec::encode_option(out, opt.as_deref(), |out, v| {
                    self.encode_at(inner, v, out, depth)
                })
            }
            (TypeRef::Named(type_id), value) => {
                let depth = self.descend(depth, out.len())?;
                match (self.registry.resolve(type_id)?, value) {
                    (RegistryEntry::Struct(layout), Value::Struct(s)) => {
                        self.encode_struct(type_id, layout, s, out, depth)
                    }
                    (RegistryEntry::Enum(layout), Value::Variant(v)) => {
                        self.encode_variant(type_id, layout, v, out, depth)
                    }
                    (RegistryEntry::Struct(_), value) => {
                        Err(expected(format_args!("struct {}", type_id), value))
                    }
                    (RegistryEntry::Enum(_), value) => {
                        Err(expected(format_args!("enum {}", type_id), value))
                    }
                }
            }
            (ty, value) => Err(expected(ty, value)),
        }
    }

    fn decode_at(&self, ty: &TypeRef, input: &mut ByteViewer<'_>, depth: usize) -> Result<Value> {
        match ty {
            TypeRef::Primitive(kind) => decode_primitive(*kind, input),
            TypeRef::FixedBytes(len) => {
                codec::decode_fixed_bytes(input, *len).map(|b| Value::FixedBytes(b.to_vec()))
            }
            TypeRef::Sequence(element) => {
                let depth = self.descend(depth, input.offset())?;
                codec::decode_sequence(input, |input| self.decode_at(element, input, depth))
                    .map(Value::Sequence)
            }
            TypeRef::Option(inner) => {
                let depth = self.descend(depth, input.offset())?;
                codec::decode_option(input, self.config.presence, |input| {
                    self.decode_at(inner, input, depth).map(Box::new)
                })
                .map(Value::Option)
            }
            TypeRef::Named(type_id) => {
                let depth = self.descend(depth, input.offset())?;
                match self.registry.resolve(type_id)? {
                    RegistryEntry::Struct(layout) => {
                        self.decode_struct(layout, input, depth).map(Value::Struct)
                    }
                    RegistryEntry::Enum(layout) => self
                        .decode_variant(type_id, layout, input, depth)
                        .map(Value::Variant),
                }
            }
        }
    }

    /// Encode every declared field in order. The value must carry exactly the
    /// declared fields, in any order.
    fn encode_struct(
        &self,
        type_id: &str,
        layout: &StructLayout,
        value: &StructValue,
        out: &mut Vec<u8>,
        depth: usize,
    ) -> Result<()> {
        if let Some((extra, _)) = value
            .iter()
            .find(|(name, _)| !layout.fields.iter().any(|f| f.name == *name))
        {
            return Err(Error::mismatch(format_args!(
                "{} has no field `{}`",
                type_id, extra
            )));
        }
        if value.len() != layout.fields.len() {
            // every name is declared, so the surplus is a repeat
            if let Some(missing) = layout.fields.iter().find(|f| value.get(&f.name).is_none()) {
                return Err(missing_field(type_id, &missing.name));
            }
            return Err(Error::mismatch(format_args!(
                "{} has repeated fields",
                type_id
            )));
        }

        for field in &layout.fields {
            let field_value = value
                .get(&field.name)
                .ok_or_else(|| missing_field(type_id, &field.name))?;
            self.encode_at(&field.ty, field_value, out, depth)?;
        }

        Ok(())
    }

    /// Decode every declared field in order.
    fn decode_struct(
        &self,
        layout: &StructLayout,
        input: &mut ByteViewer<'_>,
        depth: usize,
    ) -> Result<StructValue> {
        let mut value = StructValue::new();
        for field in &layout.fields {
            value = value.with(field.name.clone(), self.decode_at(&field.ty, input, depth)?);
        }

        Ok(value)
    }

    /// Write the variant's position, then its payload.
    fn encode_variant(
        &self,
        type_id: &str,
        layout: &EnumLayout,
        value: &VariantValue,
        out: &mut Vec<u8>,
        depth: usize,
    ) -> Result<()> {
        let index = layout.position(&value.name).ok_or_else(|| {
            Error::mismatch(format_args!("{} has no variant `{}`", type_id, value.name))
        })?;
        let variant = &layout.variants[index];

        codec::encode_discriminant(out, index)?;
        self.encode_struct(
            &format!("{}::{}", type_id, variant.name),
            &variant.payload,
            &value.payload,
            out,
            depth,
        )
    }

    /// Read a discriminant, then the payload of the variant it selects.
    fn decode_variant(
        &self,
        type_id: &str,
        layout: &EnumLayout,
        input: &mut ByteViewer<'_>,
        depth: usize,
    ) -> Result<VariantValue> {
        let discriminant = codec::decode_discriminant(input)?;
        let variant = layout
            .variants
            .get(discriminant as usize)
            .ok_or_else(|| Error::UnknownVariant {
                type_id: type_id.to_string(),
                discriminant,
                declared: layout.variants.len(),
            })?;

        let payload = self.decode_struct(&variant.payload, input, depth)?;

        Ok(VariantValue::new(variant.name.clone(), payload))
    }
}

fn encode_primitive(kind: PrimitiveKind, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match (kind, value) {
        (PrimitiveKind::U8, Value::U8(v)) => codec::encode_u8(out, *v),
        (PrimitiveKind::U16, Value::U16(v)) => codec::encode_u16(out, *v),
        (PrimitiveKind::U32, Value::U32(v)) => codec::encode_u32(out, *v),
        (PrimitiveKind::U64, Value::U64(v)) => codec::encode_u64(out, *v),
        (PrimitiveKind::I64, Value::I64(v)) => codec::encode_i64(out, *v),
        (PrimitiveKind::Bool, Value::Bool(v)) => codec::encode_bool(out, *v),
        (PrimitiveKind::String, Value::String(v)) => codec::encode_string(out, v)?,
        (kind, value) => return Err(expected(kind, value)),
    }

    Ok(())
}

fn decode_primitive(kind: PrimitiveKind, input: &mut ByteViewer<'_>) -> Result<Value> {
    let value = match kind {
        PrimitiveKind::U8 => Value::U8(codec::decode_u8(input)?),
        PrimitiveKind::U16 => Value::U16(codec::decode_u16(input)?),
        PrimitiveKind::U32 => Value::U32(codec::decode_u32(input)?),
        PrimitiveKind::U64 => Value::U64(codec::decode_u64(input)?),
        PrimitiveKind::I64 => Value::I64(codec::decode_i64(input)?),
        PrimitiveKind::Bool => Value::Bool(codec::decode_bool(input)?),
        PrimitiveKind::String => Value::String(codec::decode_string(input)?),
    };

    Ok(value)
}

fn expected(ty: impl std::fmt::Display, found: &Value) -> Error {
    Error::mismatch(format_args!("expected {}, found {}", ty, found.kind_name()))
}

fn missing_field(type_id: &str, field: &str) -> Error {
    Error::mismatch(format_args!("{} is missing field `{}`", type_id, field))
}
