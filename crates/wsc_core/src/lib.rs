//! Schema-driven binary serialization.
//!
//! Values are written as a fixed, padding-free little-endian layout:
//! fields back to back in declaration order, strings and sequences behind a
//! `u32` length, options behind a presence byte, enum variants behind a `u8`
//! discriminant equal to their declaration position.
//!
//! There are two ways in:
//! - [schema]: describe types as [schema::RegistryEntry] layouts (by hand or
//!   with `#[derive(WireSchema)]`) and encode dynamic [schema::Value]s.
//! - [ser_de]: encode any `serde` type directly. Both produce identical bytes.

// lets the derive macro's `::wsc_core` paths resolve inside this crate
extern crate self as wsc_core;

pub mod codec;
mod config;
mod err;
pub mod schema;
pub mod ser_de;

pub use config::{Config, FlagPolicy, TrailingPolicy, DEFAULT_MAX_DEPTH};
pub use err::{Error, ErrorKind, Result, SchemaError};
pub use wsc_macros::WireSchema;
