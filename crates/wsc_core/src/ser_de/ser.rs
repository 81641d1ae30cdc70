//! Implementation of [serde::ser::Serializer] for [WireSerializer]

use serde::{ser, Serialize};

use crate::{
    codec,
    err::{Error, Result},
};

/// This data structure contains the serialized bytes of any arbitrary data structure.
///
/// Structs/enums to be serialized need to derive [serde::Serialize].
/// Fields are written back to back in declaration order, with no type tags,
/// delimiters or padding.
#[derive(Debug, Default)]
pub struct WireSerializer {
    pub(crate) output: Vec<u8>,
}

impl WireSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize into an existing buffer, appending after its contents.
    pub fn with_output(output: Vec<u8>) -> Self {
        Self { output }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.output
    }
}

/// Impl serialize for primitives
macro_rules! serialize_numeric_primitive {
    ($fn_name: ident, $num_type: ty => $encode: path as $conv_type: ty) => {
        fn $fn_name(self, v: $num_type) -> Result<Self::Ok> {
            $encode(&mut self.output, v as $conv_type);
            Ok(())
        }
    };
}

impl<'a> ser::Serializer for &'a mut WireSerializer {
    type Ok = ();

    type Error = Error;

    type SerializeSeq = Self;

    type SerializeTuple = Self;

    type SerializeTupleStruct = Self;

    type SerializeTupleVariant = Self;

    type SerializeMap = Self;

    type SerializeStruct = Self;

    type SerializeStructVariant = Self;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        codec::encode_bool(&mut self.output, v);
        Ok(())
    }

    // signed values are written as their two's-complement pattern
    serialize_numeric_primitive! {serialize_i8, i8 => codec::encode_u8 as u8}
    serialize_numeric_primitive! {serialize_i16, i16 => codec::encode_u16 as u16}
    serialize_numeric_primitive! {serialize_i32, i32 => codec::encode_u32 as u32}
    serialize_numeric_primitive! {serialize_i64, i64 => codec::encode_i64 as i64}
    serialize_numeric_primitive! {serialize_i128, i128 => codec::encode_u128 as u128}

    serialize_numeric_primitive! {serialize_u8, u8 => codec::encode_u8 as u8}
    serialize_numeric_primitive! {serialize_u16, u16 => codec::encode_u16 as u16}
    serialize_numeric_primitive! {serialize_u32, u32 => codec::encode_u32 as u32}
    serialize_numeric_primitive! {serialize_u64, u64 => codec::encode_u64 as u64}
    serialize_numeric_primitive! {serialize_u128, u128 => codec::encode_u128 as u128}

    fn serialize_f32(self, _: f32) -> Result<Self::Ok> {
        Err(Error::Unsupported("floating point values"))
    }

    fn serialize_f64(self, _: f64) -> Result<Self::Ok> {
        Err(Error::Unsupported("floating point values"))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        codec::encode_u32(&mut self.output, v as u32);
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        codec::encode_string(&mut self.output, v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        codec::encode_bytes(&mut self.output, v)
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        codec::encode_presence(&mut self.output, false);
        Ok(())
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok>
    where
        T: Serialize,
    {
        codec::encode_presence(&mut self.output, true);
        value.serialize(self)
    }

    // units carry no bytes at all
    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok> {
        self.serialize_unit()
    }

    // serialize the index of a unit variant
    fn serialize_unit_variant(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
    ) -> Result<Self::Ok> {
        codec::encode_discriminant(&mut self.output, variant_index as usize)
    }

    // serialize the inner value
    fn serialize_newtype_struct<T: ?Sized>(self, _: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: Serialize,
    {
        value.serialize(self)
    }

    // serialize the index, then the inner variant
    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _: &'static str,
        variant_index: u32,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok>
    where
        T: Serialize,
    {
        codec::encode_discriminant(&mut self.output, variant_index as usize)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        let len = len.ok_or(Error::UnknownLength)?;
        codec::encode_length(&mut self.output, len, "sequence")?;
        Ok(self)
    }

    // tuples and fixed arrays have a static length, nothing to prefix
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_tuple(len)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        codec::encode_discriminant(&mut self.output, variant_index as usize)?;
        self.serialize_tuple(len)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        let len = len.ok_or(Error::UnknownLength)?;
        codec::encode_length(&mut self.output, len, "map")?;
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        _variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        codec::encode_discriminant(&mut self.output, variant_index as usize)?;
        self.serialize_struct(name, len)
    }
}

impl<'a> ser::SerializeSeq for &'a mut WireSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut WireSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut WireSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut WireSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut WireSerializer {
    type Ok = ();

    type Error = Error;

    // entries are written as key then value, the count was written up front
    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<()>
    where
        T: Serialize,
    {
        key.serialize(&mut **self)
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut WireSerializer {
    type Ok = ();

    type Error = Error;

    // field names are part of the schema, not the wire
    fn serialize_field<T: ?Sized>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut WireSerializer {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, _key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<Self::Ok> {
        Ok(())
    }
}
