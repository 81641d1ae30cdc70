//! Demo account and instruction definitions, shared by everything that
//! reads or writes them.
//!
//! The types derive both the serde traits and [WireSchema], so they can be
//! encoded directly or described to the dynamic codec through [registry].

pub mod instruction;
pub mod state;

use std::sync::OnceLock;

use wsc_core::{
    schema::{Registry, RegistryBuilder},
    ser_de, Result, SchemaError,
};

pub use instruction::DemoInstruction;
pub use state::{
    DataEnum, DemoAccount, DemoState, NestedStruct, PubkeyBytes, SimpleEnum,
    ACCOUNT_DISCRIMINATOR, DISCRIMINATOR_LEN,
};
pub use wsc_core::{self, WireSchema};

/// Default constants used by the demo consumers.
pub mod defaults {

    /// The type decoded when none is given
    pub const DEFAULT_TYPE: &str = "DemoAccount";

    /// [crate::zeroed_state] inside an account, encoded.
    pub const ZEROED_ACCOUNT_HEX: &str = concat!(
        "424f52534844454d",
        "01",
        "0200",
        "03000000",
        "0400000000000000",
        "fbffffffffffffff",
        "01",
        "0000000000000000000000000000000000000000000000000000000000000000",
        "00000000",
        "00000000",
        "00000000",
        "00",
        "00",
        "0000000000000000",
        "00",
        "00000000",
        "00000000",
    );

    /// [crate::example_update], encoded.
    pub const UPDATE_INSTRUCTION_HEX: &str = concat!(
        "01",
        "0500000000000000",
        "01",
        "02000000",
        "6869",
        "01",
        "0900000000000000",
    );
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The registry holding every demo type.
///
/// Built on first access and never modified afterwards.
///
/// # Panics
/// If the derived layouts do not form a valid registry, which is a defect in
/// the type definitions rather than in any input.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        build_registry().unwrap_or_else(|err| panic!("invalid demo schema: {}", err))
    })
}

/// Build a fresh registry of the demo types.
pub fn build_registry() -> std::result::Result<Registry, SchemaError> {
    let mut builder = RegistryBuilder::new();
    builder
        .register::<DemoAccount>()
        .register::<DemoInstruction>();

    let registry = builder.build()?;
    log::debug!("demo registry holds {} types", registry.len());

    Ok(registry)
}

pub fn serialize_account(account: &DemoAccount) -> Result<Vec<u8>> {
    ser_de::to_bytes(account)
}

/// Decode an account. The whole buffer must be consumed.
pub fn deserialize_account(bytes: &[u8]) -> Result<DemoAccount> {
    ser_de::from_bytes(bytes)
}

pub fn serialize_instruction(instruction: &DemoInstruction) -> Result<Vec<u8>> {
    ser_de::to_bytes(instruction)
}

/// Decode an instruction. The whole buffer must be consumed.
pub fn deserialize_instruction(bytes: &[u8]) -> Result<DemoInstruction> {
    ser_de::from_bytes(bytes)
}

/// Smallest non-trivial state: one value per primitive, everything else empty.
pub fn zeroed_state() -> DemoState {
    DemoState {
        primitive_u8: 1,
        primitive_u16: 2,
        primitive_u32: 3,
        primitive_u64: 4,
        primitive_i64: -5,
        primitive_bool: true,
        fixed_pubkey_bytes: [0; 32],
        text: String::new(),
        data: Vec::new(),
        keys: Vec::new(),
        simple_enum: SimpleEnum::First,
        data_enum: DataEnum::Amount { value: 0 },
        maybe_amount: None,
        nested: NestedStruct::default(),
    }
}

/// A state with every container populated.
pub fn sample_state() -> DemoState {
    DemoState {
        primitive_u8: 0xff,
        primitive_u16: 0xbeef,
        primitive_u32: 70_000,
        primitive_u64: u64::MAX,
        primitive_i64: i64::MIN,
        primitive_bool: false,
        fixed_pubkey_bytes: [7; 32],
        text: "sample text".to_string(),
        data: vec![0xde, 0xad, 0xbe, 0xef],
        keys: vec![PubkeyBytes::from([1; 32]), PubkeyBytes::from([2; 32])],
        simple_enum: SimpleEnum::Third,
        data_enum: DataEnum::Name {
            label: "named".to_string(),
        },
        maybe_amount: Some(42),
        nested: NestedStruct {
            count: 3,
            note: "nested".to_string(),
        },
    }
}

/// The `Update` instruction with small example values.
pub fn example_update() -> DemoInstruction {
    DemoInstruction::Update {
        new_u64: 5,
        new_bool: true,
        new_text: "hi".to_string(),
        new_option: Some(9),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contents() {
        let registry = registry();

        assert_eq!(
            registry.type_ids().collect::<Vec<_>>(),
            [
                "DataEnum",
                "DemoAccount",
                "DemoInstruction",
                "DemoState",
                "NestedStruct",
                "PubkeyBytes",
                "SimpleEnum",
            ]
        );
        assert!(std::ptr::eq(registry, super::registry()));
    }

    #[test]
    fn test_zeroed_account_bytes() {
        let bytes = serialize_account(&DemoAccount::new(zeroed_state())).unwrap();
        assert_eq!(hex::encode(bytes), defaults::ZEROED_ACCOUNT_HEX);
    }
}
