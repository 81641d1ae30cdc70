//! Implementation of [serde::de::Deserializer] for [WireDeserializer]

use serde::de::{
    self, value::U32Deserializer, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess,
    SeqAccess, VariantAccess,
};

use crate::{
    codec::{self, ByteViewer},
    config::{Config, TrailingPolicy},
    err::{Error, Result},
};

/// This data structure reads back the bytes written by
/// [super::ser::WireSerializer].
///
/// Structs/enums to be deserialized need to derive [serde::Deserialize].
/// The wire carries no type information, so every read is driven by the
/// shape of the target type.
pub struct WireDeserializer<'de> {
    input: ByteViewer<'de>,
    config: Config,
    depth: usize,
}

impl<'de> WireDeserializer<'de> {
    pub fn with_config(s: &'de [u8], config: Config) -> Self {
        Self {
            input: ByteViewer::from_slice(s),
            config,
            depth: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.input.offset()
    }

    /// Check the input is exhausted, as far as the trailing policy demands.
    pub fn end(&self) -> Result<()> {
        match (self.config.trailing, self.input.distance_to_end()) {
            (TrailingPolicy::Allow, _) | (TrailingPolicy::Reject, 0) => Ok(()),
            (TrailingPolicy::Reject, remaining) => Err(Error::TrailingBytes { remaining }),
        }
    }

    /// Run `f` one nesting level deeper, unless that passes the limit.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.config.max_depth {
            return Err(Error::DepthLimitExceeded {
                at: self.input.offset(),
                limit: self.config.max_depth,
            });
        }

        self.depth += 1;
        let res = f(self);
        self.depth -= 1;

        res
    }
}

/// Impl deserialize for fixed-width numeric primitives
macro_rules! deserialize_numeric {
    ($fn_name: ident: $decode: path => $visitor_fn: ident as $data_type: ty) => {
        fn $fn_name<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            let v = $decode(&mut self.input)?;
            visitor.$visitor_fn(v as $data_type)
        }
    };
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut WireDeserializer<'de> {
    type Error = Error;

    fn is_human_readable(&self) -> bool {
        false
    }

    // nothing on the wire says what comes next
    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::NotSelfDescribing)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_bool(codec::decode_bool(&mut self.input)?)
    }

    deserialize_numeric! {deserialize_i8: codec::decode_u8 => visit_i8 as i8}
    deserialize_numeric! {deserialize_i16: codec::decode_u16 => visit_i16 as i16}
    deserialize_numeric! {deserialize_i32: codec::decode_u32 => visit_i32 as i32}
    deserialize_numeric! {deserialize_i64: codec::decode_i64 => visit_i64 as i64}
    deserialize_numeric! {deserialize_i128: codec::decode_u128 => visit_i128 as i128}

    deserialize_numeric! {deserialize_u8: codec::decode_u8 => visit_u8 as u8}
    deserialize_numeric! {deserialize_u16: codec::decode_u16 => visit_u16 as u16}
    deserialize_numeric! {deserialize_u32: codec::decode_u32 => visit_u32 as u32}
    deserialize_numeric! {deserialize_u64: codec::decode_u64 => visit_u64 as u64}
    deserialize_numeric! {deserialize_u128: codec::decode_u128 => visit_u128 as u128}

    fn deserialize_f32<V>(self, _: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::Unsupported("floating point values"))
    }

    fn deserialize_f64<V>(self, _: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::Unsupported("floating point values"))
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let at = self.input.offset();
        let value = codec::decode_u32(&mut self.input)?;

        match char::from_u32(value) {
            Some(c) => visitor.visit_char(c),
            None => Err(Error::InvalidChar { at, value }),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_str(codec::decode_str(&mut self.input)?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(codec::decode_bytes(&mut self.input)?)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.nested(|des| {
            match codec::decode_presence(&mut des.input, des.config.presence)? {
                true => visitor.visit_some(des),
                false => visitor.visit_none(),
            }
        })
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.nested(|des| visitor.visit_newtype_struct(des))
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.nested(|des| {
            let len = codec::decode_length(&mut des.input)?;
            visitor.visit_seq(CollectionsAccessor::prefixed(des, len))
        })
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(CollectionsAccessor::fields(self, len))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.nested(|des| visitor.visit_seq(CollectionsAccessor::fields(des, len)))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.nested(|des| {
            let len = codec::decode_length(&mut des.input)?;
            visitor.visit_map(CollectionsAccessor::prefixed(des, len))
        })
    }

    // structs are tuples of their fields
    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.nested(|des| visitor.visit_seq(CollectionsAccessor::fields(des, fields.len())))
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.nested(|des| {
            let discriminant = codec::decode_discriminant(&mut des.input)?;

            if discriminant as usize >= variants.len() {
                return Err(Error::UnknownVariant {
                    type_id: name.to_string(),
                    discriminant,
                    declared: variants.len(),
                });
            }

            visitor.visit_enum(VariantAccessor {
                des,
                index: discriminant as u32,
            })
        })
    }

    fn deserialize_identifier<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::NotSelfDescribing)
    }

    fn deserialize_ignored_any<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::NotSelfDescribing)
    }
}

/// This wrapper contains implementations for accessing collections.
///
/// The number of elements is always known before the first one is read,
/// either from a length prefix or from the shape of the target type.
struct CollectionsAccessor<'a, 'de: 'a> {
    des: &'a mut WireDeserializer<'de>,
    remaining: usize,

    /// The count came from the input, so every element must consume some of it.
    prefixed: bool,
    entry_start: usize,
}

impl<'a, 'de> CollectionsAccessor<'a, 'de> {
    /// Elements of a sequence or map, counted by a length prefix.
    fn prefixed(des: &'a mut WireDeserializer<'de>, len: usize) -> Self {
        Self::new(des, len, true)
    }

    /// Fields of a tuple or struct, counted by the type.
    fn fields(des: &'a mut WireDeserializer<'de>, len: usize) -> Self {
        Self::new(des, len, false)
    }

    fn new(des: &'a mut WireDeserializer<'de>, len: usize, prefixed: bool) -> Self {
        let entry_start = des.offset();
        Self {
            des,
            remaining: len,
            prefixed,
            entry_start,
        }
    }

    /// Fail if a length-prefixed entry read no bytes.
    fn check_progress(&self) -> Result<()> {
        match self.prefixed && self.des.offset() == self.entry_start {
            true => Err(Error::ZeroSizedElement {
                at: self.entry_start,
            }),
            false => Ok(()),
        }
    }
}

impl<'a, 'de> SeqAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        self.entry_start = self.des.offset();
        let value = seed.deserialize(&mut *self.des)?;
        self.check_progress()?;

        Ok(Some(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining.min(self.des.input.distance_to_end()))
    }
}

impl<'a, 'de> MapAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        self.entry_start = self.des.offset();
        seed.deserialize(&mut *self.des).map(Some)
    }

    // key and value together must read something
    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let value = seed.deserialize(&mut *self.des)?;
        self.check_progress()?;

        Ok(value)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining.min(self.des.input.distance_to_end()))
    }
}

/// Hands an already validated discriminant to the enum's visitor.
struct VariantAccessor<'a, 'de: 'a> {
    des: &'a mut WireDeserializer<'de>,
    index: u32,
}

impl<'a, 'de> EnumAccess<'de> for VariantAccessor<'a, 'de> {
    type Error = Error;

    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: DeserializeSeed<'de>,
    {
        let index: U32Deserializer<Error> = self.index.into_deserializer();
        let val = seed.deserialize(index)?;

        Ok((val, self))
    }
}

impl<'a, 'de> VariantAccess<'de> for VariantAccessor<'a, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self.des)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self.des, len, visitor)
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self.des, fields.len(), visitor)
    }
}
