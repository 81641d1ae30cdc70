//! Serialization and deserialization of typed values.
//!
//! This is a [serde] data format producing exactly the wire layout of the
//! schema-driven codec in [crate::schema]: a `#[derive(Serialize)]` struct and
//! the equivalent registry entry encode to the same bytes.

use crate::{
    config::{Config, TrailingPolicy},
    err::Result,
};

mod de;
mod ser;

pub use de::WireDeserializer;
pub use ser::WireSerializer;

/// Serialize a data structure to a vector of bytes
pub fn to_bytes<T>(value: &T) -> Result<Vec<u8>>
where
    T: serde::Serialize + ?Sized,
{
    let mut serializer = WireSerializer::new();

    value.serialize(&mut serializer)?;
    log::trace!("serialized {} bytes", serializer.output.len());

    Ok(serializer.into_inner())
}

/// Serialize a data structure, appending to an existing buffer.
///
/// On error the buffer is left as it was.
pub fn to_writer_vec<T>(output: &mut Vec<u8>, value: &T) -> Result<()>
where
    T: serde::Serialize + ?Sized,
{
    let mut serializer = WireSerializer::with_output(std::mem::take(output));
    let start = serializer.output.len();

    let res = value.serialize(&mut serializer);
    *output = serializer.into_inner();
    if res.is_err() {
        output.truncate(start);
    }

    res
}

/// Deserialize a data structure from a slice of bytes.
///
/// The slice must hold exactly one value, leftover bytes are an error.
pub fn from_bytes<'a, T>(bytes: &'a [u8]) -> Result<T>
where
    T: serde::Deserialize<'a>,
{
    from_bytes_with(bytes, Config::default())
}

/// Deserialize a data structure with explicit decode options.
pub fn from_bytes_with<'a, T>(bytes: &'a [u8], config: Config) -> Result<T>
where
    T: serde::Deserialize<'a>,
{
    let mut deserializer = WireDeserializer::with_config(bytes, config);

    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    log::trace!("deserialized {} bytes", deserializer.offset());

    Ok(value)
}

/// Deserialize one value from the front of `bytes`.
///
/// Returns the value and the number of bytes it occupied, whatever follows is
/// left for the caller.
pub fn from_bytes_prefix<'a, T>(bytes: &'a [u8], config: Config) -> Result<(T, usize)>
where
    T: serde::Deserialize<'a>,
{
    let mut deserializer =
        WireDeserializer::with_config(bytes, config.trailing(TrailingPolicy::Allow));

    let value = T::deserialize(&mut deserializer)?;

    Ok((value, deserializer.offset()))
}

/// Serializing and deserializing tests
#[cfg(test)]
mod tests {
    use std::{
        collections::{BTreeMap, HashMap},
        fmt::Debug,
    };

    use super::*;
    use crate::{
        config::FlagPolicy,
        err::{Error, ErrorKind},
    };
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
    struct S {
        item: bool,
        number: i32,
        s: String,
    }

    /// Performs a ser-de process
    fn ser_de_loop<T: Debug + PartialEq + Serialize + for<'a> Deserialize<'a>>(input: T) -> Vec<u8> {
        let ser = to_bytes(&input).unwrap();
        let des: T = from_bytes(&ser).unwrap();

        assert_eq!(input, des);
        ser
    }

    #[test]
    fn test_ser_de_map() {
        let map: HashMap<String, i32> = HashMap::from([
            ("asd".to_string(), 10_000),
            ("how about that 👏👏👏".to_string(), 69),
        ]);
        ser_de_loop(map);

        let ordered = BTreeMap::from([(1_u8, true), (2, false)]);
        let bytes = ser_de_loop(ordered);
        assert_eq!(bytes, [2, 0, 0, 0, 1, 1, 2, 0]);
    }

    /// Testing ser_de of sequences, like vectors and tuples
    #[test]
    fn test_ser_de_seq() {
        let bytes = ser_de_loop(vec![100_u32, 200, 300, 400]);
        assert_eq!(&bytes[..4], [4, 0, 0, 0]);
        assert_eq!(bytes.len(), 4 + 4 * 4);

        // tuples have a static length and no prefix
        let bytes = ser_de_loop((12_u8, 100_u16, 20000_u32));
        assert_eq!(bytes, [12, 100, 0, 0x20, 0x4e, 0, 0]);

        let bytes = ser_de_loop([7_u8; 32]);
        assert_eq!(bytes, vec![7_u8; 32]);
    }

    /// Testing ser_de of structs
    #[test]
    fn test_ser_de_struct() {
        let s = S {
            item: false,
            number: -2,
            s: "asd".to_string(),
        };
        let bytes = ser_de_loop(s);
        assert_eq!(
            bytes,
            [0, 0xfe, 0xff, 0xff, 0xff, 3, 0, 0, 0, b'a', b's', b'd']
        );
    }

    #[test]
    fn test_ser_de_enum() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        enum E {
            This,
            That(bool),
            WhatEver((i32, bool)),
            IDontCare { a: bool, b: i8, c: String },
        }

        assert_eq!(ser_de_loop(E::This), [0]);
        assert_eq!(ser_de_loop(E::That(false)), [1, 0]);
        assert_eq!(ser_de_loop(E::WhatEver((10, true))), [2, 10, 0, 0, 0, 1]);
        ser_de_loop(E::IDontCare {
            a: true,
            b: i8::MAX,
            c: "Hello How are You".to_string(),
        });

        let err = from_bytes::<E>(&[4]).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownVariant {
                type_id: "E".to_string(),
                discriminant: 4,
                declared: 4,
            }
        );
    }

    #[test]
    fn test_ser_de_option_and_unit() {
        assert_eq!(ser_de_loop(None::<u64>), [0]);
        assert_eq!(ser_de_loop(Some(9_u64)), [1, 9, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(ser_de_loop(()), Vec::<u8>::new());

        let err = from_bytes::<Option<u8>>(&[2, 5]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let lenient = Config::new().presence(FlagPolicy::Lenient);
        assert_eq!(from_bytes_with::<Option<u8>>(&[2, 5], lenient), Ok(Some(5)));
    }

    #[test]
    fn test_ser_de_bytes_match_sequences() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Blob {
            #[serde(with = "serde_bytes")]
            data: Vec<u8>,
        }

        let as_bytes = ser_de_loop(Blob {
            data: vec![1, 2, 3, 4],
        });
        let as_seq = to_bytes(&vec![1_u8, 2, 3, 4]).unwrap();
        assert_eq!(as_bytes, as_seq);
    }

    #[test]
    fn test_ser_de_borrowed() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Borrowed<'a> {
            name: &'a str,
            #[serde(with = "serde_bytes")]
            raw: &'a [u8],
        }

        let value = Borrowed {
            name: "hi",
            raw: &[9, 8],
        };
        let bytes = to_bytes(&value).unwrap();
        let des: Borrowed<'_> = from_bytes(&bytes).unwrap();
        assert_eq!(des, value);
    }

    #[test]
    fn test_trailing_and_prefix() {
        let mut bytes = to_bytes(&5_u16).unwrap();
        to_writer_vec(&mut bytes, "hi").unwrap();

        let err = from_bytes::<u16>(&bytes).unwrap_err();
        assert_eq!(err, Error::TrailingBytes { remaining: 6 });

        let (first, used): (u16, usize) = from_bytes_prefix(&bytes, Config::default()).unwrap();
        assert_eq!((first, used), (5, 2));
        let second: String = from_bytes(&bytes[used..]).unwrap();
        assert_eq!(second, "hi");
    }

    #[test]
    fn test_failed_write_leaves_buffer() {
        let mut bytes = vec![0xaa];
        let err = to_writer_vec(&mut bytes, &(1_u8, 2.5_f32)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Custom);
        assert_eq!(bytes, [0xaa]);
    }

    #[test]
    fn test_truncated_struct() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Tail {
            head: u8,
            tail: u64,
        }

        let bytes = to_bytes(&Tail { head: 1, tail: 2 }).unwrap();
        let err = from_bytes::<Tail>(&bytes[..bytes.len() - 3]).unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedEof {
                at: 1,
                need: 8,
                remaining: 5
            }
        );
    }

    #[test]
    fn test_nesting_limit() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Chain {
            next: Option<Box<Chain>>,
        }

        // each presence byte opens one more link, two levels per link
        let mut deep = vec![0x01; 1_000_000];
        deep.push(0x00);
        let err = from_bytes::<Chain>(&deep).unwrap_err();
        assert_eq!(err, Error::DepthLimitExceeded { at: 64, limit: 128 });
        assert_eq!(err.kind(), ErrorKind::Format);

        let mut shallow = vec![0x01; 63];
        shallow.push(0x00);
        let chain: Chain = from_bytes(&shallow).unwrap();
        assert_eq!(to_bytes(&chain).unwrap(), shallow);

        let narrow = Config::new().max_depth(4);
        assert!(from_bytes_with::<Chain>(&[0x01, 0x00], narrow).is_ok());
        assert_eq!(
            from_bytes_with::<Chain>(&[0x01, 0x01, 0x00], narrow),
            Err(Error::DepthLimitExceeded { at: 2, limit: 4 })
        );
    }

    #[test]
    fn test_collections_of_empty_elements() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Unit;

        let bytes = 20_000_000_u32.to_le_bytes();
        let err = from_bytes::<Vec<Unit>>(&bytes).unwrap_err();
        assert_eq!(err, Error::ZeroSizedElement { at: 4 });
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = from_bytes::<BTreeMap<(), ()>>(&bytes).unwrap_err();
        assert_eq!(err, Error::ZeroSizedElement { at: 4 });

        // empty fields are fine when the type fixes their count
        assert_eq!(ser_de_loop((Unit, 1_u8, ())), [1]);
        assert_eq!(from_bytes::<Vec<Unit>>(&[0, 0, 0, 0]), Ok(vec![]));
    }

    #[test]
    fn test_chars() {
        assert_eq!(ser_de_loop('é'), [0xe9, 0, 0, 0]);

        let err = from_bytes::<char>(&[0x00, 0xd8, 0, 0]).unwrap_err();
        assert_eq!(err, Error::InvalidChar { at: 0, value: 0xd800 });
    }
}
