//! End-to-end encoding of the demo types, through both the typed serde path
//! and the registry-driven dynamic codec.

use rand::{distributions::Alphanumeric, Rng};
use wsc::{
    defaults, deserialize_account, deserialize_instruction, example_update, registry,
    sample_state, serialize_account, serialize_instruction, zeroed_state, DataEnum, DemoAccount,
    DemoInstruction, DemoState, NestedStruct, PubkeyBytes, SimpleEnum,
};
use wsc_core::{
    schema::{StructValue, TypeRef, Value, VariantValue},
    ser_de, Config, Error, ErrorKind, FlagPolicy, TrailingPolicy,
};

#[test]
fn test_zeroed_account_vector() {
    let account = DemoAccount::new(zeroed_state());
    let bytes = serialize_account(&account).unwrap();

    assert_eq!(hex::encode(&bytes), defaults::ZEROED_ACCOUNT_HEX);
    assert_eq!(deserialize_account(&bytes).unwrap(), account);
}

#[test]
fn test_zeroed_account_dynamic() {
    let bytes = hex::decode(defaults::ZEROED_ACCOUNT_HEX).unwrap();
    let value = registry().deserialize("DemoAccount", &bytes).unwrap();

    let account = value.as_struct().unwrap();
    assert_eq!(
        account.get("discriminator"),
        Some(&Value::FixedBytes(b"BORSHDEM".to_vec()))
    );

    let state = account.get("data").and_then(Value::as_struct).unwrap();
    assert_eq!(state.len(), 14);
    assert_eq!(state.get("primitive_i64"), Some(&Value::I64(-5)));
    assert_eq!(state.get("primitive_bool"), Some(&Value::Bool(true)));
    assert_eq!(state.get("keys"), Some(&Value::Sequence(vec![])));
    assert_eq!(state.get("maybe_amount"), Some(&Value::none()));
    assert_eq!(
        state.get("simple_enum"),
        Some(&Value::Variant(VariantValue::unit("First")))
    );
    assert_eq!(
        state.get("data_enum"),
        Some(&Value::Variant(VariantValue::new(
            "Amount",
            StructValue::new().with("value", 0_u64)
        )))
    );

    assert_eq!(registry().serialize("DemoAccount", &value).unwrap(), bytes);
}

#[test]
fn test_update_instruction_vector() {
    let bytes = serialize_instruction(&example_update()).unwrap();
    assert_eq!(hex::encode(&bytes), defaults::UPDATE_INSTRUCTION_HEX);
    assert_eq!(deserialize_instruction(&bytes).unwrap(), example_update());

    let value = Value::Variant(VariantValue::new(
        "Update",
        StructValue::new()
            .with("new_u64", 5_u64)
            .with("new_bool", true)
            .with("new_text", "hi")
            .with("new_option", Value::some(9_u64)),
    ));
    assert_eq!(registry().serialize("DemoInstruction", &value).unwrap(), bytes);
    assert_eq!(registry().deserialize("DemoInstruction", &bytes).unwrap(), value);
}

#[test]
fn test_instruction_discriminants() {
    let validate = serialize_instruction(&DemoInstruction::Validate { expected_u8: 1 }).unwrap();
    assert_eq!(validate, [0x02, 0x01]);

    let initialize = serialize_instruction(&DemoInstruction::Initialize {
        data: zeroed_state(),
    })
    .unwrap();
    assert_eq!(initialize[0], 0x00);
    // the state encoding follows the account discriminator
    assert_eq!(
        hex::encode(&initialize[1..]),
        &defaults::ZEROED_ACCOUNT_HEX[16..]
    );
}

#[test]
fn test_unknown_discriminant() {
    // one past the last declared variant
    let bytes = [0x03, 0x01];

    let err = deserialize_instruction(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownVariant);

    let err = registry().deserialize("DemoInstruction", &bytes).unwrap_err();
    assert_eq!(
        err,
        Error::UnknownVariant {
            type_id: "DemoInstruction".to_string(),
            discriminant: 3,
            declared: 3,
        }
    );
}

#[test]
fn test_truncated_buffers() {
    let update = serialize_instruction(&example_update()).unwrap();
    let truncated = &update[..update.len() - 3];

    assert_eq!(
        deserialize_instruction(truncated).unwrap_err().kind(),
        ErrorKind::Format
    );
    assert_eq!(
        registry()
            .deserialize("DemoInstruction", truncated)
            .unwrap_err()
            .kind(),
        ErrorKind::Format
    );

    let account = serialize_account(&DemoAccount::new(sample_state())).unwrap();
    for len in 0..account.len() {
        let err = deserialize_account(&account[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format, "prefix of {} bytes", len);
    }
}

#[test]
fn test_trailing_bytes() {
    let mut bytes = serialize_instruction(&example_update()).unwrap();
    let len = bytes.len();
    bytes.push(0xaa);

    assert_eq!(
        deserialize_instruction(&bytes).unwrap_err(),
        Error::TrailingBytes { remaining: 1 }
    );

    let allowed = Config::new().trailing(TrailingPolicy::Allow);
    let decoded: DemoInstruction = ser_de::from_bytes_with(&bytes, allowed).unwrap();
    assert_eq!(decoded, example_update());

    let (value, consumed) = registry()
        .codec(Config::default())
        .deserialize_prefix("DemoInstruction", &bytes)
        .unwrap();
    assert_eq!(consumed, len);
    assert_eq!(value.as_variant().map(|v| v.name.as_str()), Some("Update"));
}

#[test]
fn test_presence_policy() {
    let mut bytes = serialize_instruction(&example_update()).unwrap();
    // presence byte of `new_option`
    let presence = bytes.len() - 9;
    assert_eq!(bytes[presence], 0x01);
    bytes[presence] = 0x02;

    let err = deserialize_instruction(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);

    let lenient = Config::new().presence(FlagPolicy::Lenient);
    let decoded: DemoInstruction = ser_de::from_bytes_with(&bytes, lenient).unwrap();
    assert_eq!(decoded, example_update());
    assert!(registry()
        .codec(lenient)
        .deserialize("DemoInstruction", &bytes)
        .is_ok());
}

#[test]
fn test_sample_state_typed_matches_dynamic() {
    let account = DemoAccount::new(sample_state());
    let bytes = serialize_account(&account).unwrap();

    let value = registry().deserialize("DemoAccount", &bytes).unwrap();
    assert_eq!(registry().serialize("DemoAccount", &value).unwrap(), bytes);

    let state = value.as_struct().and_then(|s| s.get("data")).unwrap();
    assert_eq!(
        state.as_struct().and_then(|s| s.get("data")),
        Some(&Value::byte_sequence(&[0xde, 0xad, 0xbe, 0xef]))
    );
    assert_eq!(
        state.as_struct().and_then(|s| s.get("primitive_i64")),
        Some(&Value::I64(i64::MIN))
    );
}

#[test]
fn test_random_round_trip() {
    let mut rng = rand::thread_rng();

    for _ in 0..200 {
        let account = DemoAccount::new(random_state(&mut rng));

        let bytes = serialize_account(&account).unwrap();
        assert_eq!(deserialize_account(&bytes).unwrap(), account);

        let value = registry().deserialize("DemoAccount", &bytes).unwrap();
        assert_eq!(registry().serialize("DemoAccount", &value).unwrap(), bytes);
    }
}

#[test]
fn test_registry_layouts() {
    let registry = registry();

    assert_eq!(
        registry.describe("PubkeyBytes").unwrap(),
        "struct PubkeyBytes { bytes: [u8; 32] }"
    );
    assert_eq!(
        registry.describe("DataEnum").unwrap(),
        "enum DataEnum { Amount { value: u64 }, Name { label: string } }"
    );
    assert_eq!(
        registry.describe("DemoInstruction").unwrap(),
        "enum DemoInstruction { Initialize { data: DemoState }, \
         Update { new_u64: u64, new_bool: bool, new_text: string, new_option: Option<u64> }, \
         Validate { expected_u8: u8 } }"
    );
    assert_eq!(registry.describe("Missing"), None);

    assert_eq!(registry.fixed_size(&TypeRef::named("PubkeyBytes")), Ok(Some(32)));
    assert_eq!(registry.fixed_size(&TypeRef::named("SimpleEnum")), Ok(Some(1)));
    assert_eq!(registry.fixed_size(&TypeRef::named("DataEnum")), Ok(None));
    assert_eq!(registry.fixed_size(&TypeRef::named("DemoAccount")), Ok(None));
}

fn random_state(rng: &mut impl Rng) -> DemoState {
    DemoState {
        primitive_u8: rng.gen(),
        primitive_u16: rng.gen(),
        primitive_u32: rng.gen(),
        primitive_u64: rng.gen(),
        primitive_i64: rng.gen(),
        primitive_bool: rng.gen(),
        fixed_pubkey_bytes: rng.gen(),
        text: random_string(rng),
        data: (0..rng.gen_range(0..64)).map(|_| rng.gen()).collect(),
        keys: (0..rng.gen_range(0..4))
            .map(|_| PubkeyBytes::from(rng.gen::<[u8; 32]>()))
            .collect(),
        simple_enum: match rng.gen_range(0..3) {
            0 => SimpleEnum::First,
            1 => SimpleEnum::Second,
            _ => SimpleEnum::Third,
        },
        data_enum: match rng.gen_bool(0.5) {
            true => DataEnum::Amount { value: rng.gen() },
            false => DataEnum::Name {
                label: random_string(rng),
            },
        },
        maybe_amount: rng.gen_bool(0.5).then(|| rng.gen()),
        nested: NestedStruct {
            count: rng.gen(),
            note: random_string(rng),
        },
    }
}

fn random_string(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(0..24);
    rng.sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
