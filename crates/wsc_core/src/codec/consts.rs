//! Shared constants between encoding and decoding logic.

/// Presence byte written for an absent option.
pub const OPTION_NONE: u8 = 0;
/// Presence byte written for a present option.
pub const OPTION_SOME: u8 = 1;

pub const BOOL_FALSE: u8 = 0;
pub const BOOL_TRUE: u8 = 1;

/// Length prefix of strings and element count of sequences and maps.
pub type LengthPrefix = u32;

/// Enum discriminants are the variant's position, written as a single byte.
pub type Discriminant = u8;

/// Largest number of variants an enum can declare.
pub const MAX_VARIANTS: usize = Discriminant::MAX as usize + 1;
