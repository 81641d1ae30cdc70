//! Account state stored by the demo program.

use serde::{Deserialize, Serialize};
use wsc_core::WireSchema;

/// Magic bytes leading every serialized [DemoAccount].
pub const ACCOUNT_DISCRIMINATOR: [u8; 8] = *b"BORSHDEM";
pub const DISCRIMINATOR_LEN: usize = ACCOUNT_DISCRIMINATOR.len();

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, WireSchema)]
pub struct NestedStruct {
    pub count: u32,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, WireSchema)]
pub enum SimpleEnum {
    #[default]
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, WireSchema)]
pub enum DataEnum {
    Amount { value: u64 },
    Name { label: String },
}

impl Default for DataEnum {
    fn default() -> Self {
        Self::Amount { value: 0 }
    }
}

/// Raw bytes of a 32-byte public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, WireSchema)]
pub struct PubkeyBytes {
    pub bytes: [u8; 32],
}

impl From<[u8; 32]> for PubkeyBytes {
    fn from(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }
}

/// One field of every supported wire construct.
///
/// Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, WireSchema)]
pub struct DemoState {
    pub primitive_u8: u8,
    pub primitive_u16: u16,
    pub primitive_u32: u32,
    pub primitive_u64: u64,
    pub primitive_i64: i64,
    pub primitive_bool: bool,
    pub fixed_pubkey_bytes: [u8; 32],
    pub text: String,
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
    pub keys: Vec<PubkeyBytes>,
    pub simple_enum: SimpleEnum,
    pub data_enum: DataEnum,
    pub maybe_amount: Option<u64>,
    pub nested: NestedStruct,
}

/// The state as it is laid out in account storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, WireSchema)]
pub struct DemoAccount {
    pub discriminator: [u8; 8],
    pub data: DemoState,
}

impl DemoAccount {
    pub fn new(data: DemoState) -> Self {
        Self {
            discriminator: ACCOUNT_DISCRIMINATOR,
            data,
        }
    }

    pub fn has_valid_discriminator(&self) -> bool {
        self.discriminator == ACCOUNT_DISCRIMINATOR
    }
}
