//! Primitive and composite codecs.
//!
//! These are the leaf building blocks of the wire format. Both the
//! schema-driven [crate::schema] codec and the serde [crate::ser_de] format
//! are built from them, so the two always agree byte for byte.
//!
//! | Construct | Layout |
//! |---|---|
//! | u8/u16/u32/u64 | 1/2/4/8 bytes, little-endian |
//! | bool | 1 byte, `0x00` or `0x01` |
//! | i64 | 8 bytes, two's-complement bit pattern |
//! | string | u32 byte length + UTF-8 bytes |
//! | fixed array[N] | exactly N bytes |
//! | sequence | u32 element count + elements |
//! | option | presence byte + payload iff present |

pub mod consts;
mod viewer;

pub use viewer::ByteViewer;

use crate::{
    config::FlagPolicy,
    err::{Error, Result},
};

use self::consts::{Discriminant, LengthPrefix};

/// Impl encode/decode for fixed-width unsigned integers
macro_rules! numeric_codec {
    ($encode: ident, $decode: ident, $num_type: ty) => {
        #[doc = concat!("Write a `", stringify!($num_type), "` as little-endian bytes.")]
        pub fn $encode(out: &mut Vec<u8>, v: $num_type) {
            out.extend(v.to_le_bytes());
        }

        #[doc = concat!("Read a little-endian `", stringify!($num_type), "`.")]
        pub fn $decode(input: &mut ByteViewer<'_>) -> Result<$num_type> {
            const NUM_BYTES: usize = std::mem::size_of::<$num_type>();
            let bytes = input.next_bytes_fixed::<NUM_BYTES>()?;
            Ok(<$num_type>::from_le_bytes(bytes))
        }
    };
}

numeric_codec! {encode_u8, decode_u8, u8}
numeric_codec! {encode_u16, decode_u16, u16}
numeric_codec! {encode_u32, decode_u32, u32}
numeric_codec! {encode_u64, decode_u64, u64}
numeric_codec! {encode_u128, decode_u128, u128}

/// The two's-complement 64-bit pattern of a signed value.
pub fn to_twos_complement(value: i64) -> u64 {
    value as u64
}

/// Reinterpret a 64-bit pattern as a two's-complement signed value.
pub fn from_twos_complement(bits: u64) -> i64 {
    bits as i64
}

/// Write a signed 64-bit value as its two's-complement pattern.
pub fn encode_i64(out: &mut Vec<u8>, v: i64) {
    encode_u64(out, to_twos_complement(v));
}

/// Read 8 little-endian bytes and reinterpret them as a signed value.
pub fn decode_i64(input: &mut ByteViewer<'_>) -> Result<i64> {
    decode_u64(input).map(from_twos_complement)
}

pub fn encode_bool(out: &mut Vec<u8>, v: bool) {
    out.push(match v {
        true => consts::BOOL_TRUE,
        false => consts::BOOL_FALSE,
    });
}

/// Any nonzero byte decodes as `true`.
pub fn decode_bool(input: &mut ByteViewer<'_>) -> Result<bool> {
    Ok(input.next_byte()? != consts::BOOL_FALSE)
}

/// Write a `u32` length or element count.
pub fn encode_length(out: &mut Vec<u8>, len: usize, what: &'static str) -> Result<()> {
    let len = LengthPrefix::try_from(len).map_err(|_| {
        Error::out_of_range(what, format!("length {} does not fit a u32 prefix", len))
    })?;
    encode_u32(out, len);

    Ok(())
}

/// Read a `u32` length or element count.
pub fn decode_length(input: &mut ByteViewer<'_>) -> Result<usize> {
    Ok(decode_u32(input)? as usize)
}

/// Writes the length of the byte slice, then the slice.
pub fn encode_bytes(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    encode_length(out, bytes.len(), "byte sequence")?;
    out.extend(bytes);

    Ok(())
}

/// Reads a length-prefixed byte slice.
pub fn decode_bytes<'de>(input: &mut ByteViewer<'de>) -> Result<&'de [u8]> {
    let len = decode_length(input)?;
    input.next_bytes(len)
}

pub fn encode_string(out: &mut Vec<u8>, v: &str) -> Result<()> {
    encode_length(out, v.len(), "string")?;
    out.extend(v.as_bytes());

    Ok(())
}

/// Read a length-prefixed UTF-8 string, borrowing from the input.
pub fn decode_str<'de>(input: &mut ByteViewer<'de>) -> Result<&'de str> {
    let len = decode_length(input)?;
    let at = input.offset();
    let bytes = input.next_bytes(len)?;

    std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { at })
}

pub fn decode_string(input: &mut ByteViewer<'_>) -> Result<String> {
    decode_str(input).map(str::to_owned)
}

/// Write exactly `len` raw bytes with no prefix.
pub fn encode_fixed_bytes(out: &mut Vec<u8>, value: &[u8], len: usize) -> Result<()> {
    if value.len() != len {
        return Err(Error::out_of_range(
            "fixed array",
            format!("expected {} bytes, got {}", len, value.len()),
        ));
    }
    out.extend(value);

    Ok(())
}

pub fn decode_fixed_bytes<'de>(input: &mut ByteViewer<'de>, len: usize) -> Result<&'de [u8]> {
    input.next_bytes(len)
}

/// Write the element count, then every element in order.
pub fn encode_sequence<T, F>(out: &mut Vec<u8>, values: &[T], mut encode_elem: F) -> Result<()>
where
    F: FnMut(&mut Vec<u8>, &T) -> Result<()>,
{
    encode_length(out, values.len(), "sequence")?;
    values.iter().try_for_each(|v| encode_elem(out, v))
}

/// Read the element count, then exactly that many elements.
pub fn decode_sequence<'de, T, F>(input: &mut ByteViewer<'de>, mut decode_elem: F) -> Result<Vec<T>>
where
    F: FnMut(&mut ByteViewer<'de>) -> Result<T>,
{
    let count = decode_length(input)?;

    // the count is untrusted, cap the preallocation by what the input could hold
    let mut values = Vec::with_capacity(count.min(input.distance_to_end()));
    for _ in 0..count {
        let at = input.offset();
        values.push(decode_elem(input)?);

        // otherwise a 4 byte count could demand 2^32 elements from nothing
        if input.offset() == at {
            return Err(Error::ZeroSizedElement { at });
        }
    }

    Ok(values)
}

pub fn encode_presence(out: &mut Vec<u8>, present: bool) {
    out.push(match present {
        true => consts::OPTION_SOME,
        false => consts::OPTION_NONE,
    });
}

/// Read an option presence byte under the given policy.
pub fn decode_presence(input: &mut ByteViewer<'_>, policy: FlagPolicy) -> Result<bool> {
    let at = input.offset();
    let byte = input.next_byte()?;

    match (byte, policy) {
        (consts::OPTION_NONE, _) => Ok(false),
        (consts::OPTION_SOME, _) => Ok(true),
        (_, FlagPolicy::Lenient) => Ok(true),
        (_, FlagPolicy::Strict) => Err(Error::InvalidPresence { at, byte }),
    }
}

/// Write `0x00` for `None`, or `0x01` followed by the payload.
pub fn encode_option<T, F>(out: &mut Vec<u8>, value: Option<&T>, encode_inner: F) -> Result<()>
where
    T: ?Sized,
    F: FnOnce(&mut Vec<u8>, &T) -> Result<()>,
{
    encode_presence(out, value.is_some());
    match value {
        Some(v) => encode_inner(out, v),
        None => Ok(()),
    }
}

pub fn decode_option<'de, T, F>(
    input: &mut ByteViewer<'de>,
    policy: FlagPolicy,
    decode_inner: F,
) -> Result<Option<T>>
where
    F: FnOnce(&mut ByteViewer<'de>) -> Result<T>,
{
    match decode_presence(input, policy)? {
        true => decode_inner(input).map(Some),
        false => Ok(None),
    }
}

/// Write a variant's position as its discriminant byte.
pub fn encode_discriminant(out: &mut Vec<u8>, index: usize) -> Result<()> {
    let disc = Discriminant::try_from(index).map_err(|_| {
        Error::out_of_range("discriminant", format!("variant index {} exceeds 255", index))
    })?;
    out.push(disc);

    Ok(())
}

pub fn decode_discriminant(input: &mut ByteViewer<'_>) -> Result<Discriminant> {
    input.next_byte()
}
