mod args;

use args::{CliArgs, Command};
use clap::Parser;
use thiserror::Error;
use wsc::{
    defaults,
    wsc_core::{self, Config, FlagPolicy, TrailingPolicy},
    DemoAccount,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("no type `{0}` in the registry")]
    UnknownType(String),

    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error(transparent)]
    Codec(#[from] wsc_core::Error),
}

fn main() -> Result<(), CliError> {
    match std::env::var("RUST_LOG") {
        Ok(_) => (),
        Err(_) => std::env::set_var("RUST_LOG", "info"),
    }
    pretty_env_logger::init();

    let args = CliArgs::parse();

    match args.command {
        Command::Schema { type_id } => schema(type_id.as_deref()),
        Command::Demo => demo(),
        Command::Decode {
            type_id,
            hex,
            lenient_presence,
            allow_trailing,
        } => {
            let mut config = Config::new();
            if lenient_presence {
                config = config.presence(FlagPolicy::Lenient);
            }
            if allow_trailing {
                config = config.trailing(TrailingPolicy::Allow);
            }
            decode(&type_id, &hex, config)
        }
    }
}

fn schema(type_id: Option<&str>) -> Result<(), CliError> {
    let registry = wsc::registry();

    match type_id {
        Some(type_id) => {
            let layout = registry
                .describe(type_id)
                .ok_or_else(|| CliError::UnknownType(type_id.to_string()))?;
            println!("{}", layout);
        }
        None => {
            for type_id in registry.type_ids() {
                if let Some(layout) = registry.describe(type_id) {
                    println!("{}", layout);
                }
            }
        }
    }

    Ok(())
}

fn demo() -> Result<(), CliError> {
    let account = DemoAccount::new(wsc::zeroed_state());
    let account_bytes = wsc::serialize_account(&account)?;
    let account_hex = hex::encode(&account_bytes);

    println!("account bytes (hex): {}", account_hex);
    println!("matches expected: {}", account_hex == defaults::ZEROED_ACCOUNT_HEX);

    let instruction = wsc::example_update();
    let instruction_hex = hex::encode(wsc::serialize_instruction(&instruction)?);
    println!("{} instruction (hex): {}", instruction.name(), instruction_hex);
    println!(
        "matches expected: {}",
        instruction_hex == defaults::UPDATE_INSTRUCTION_HEX
    );

    let decoded = wsc::deserialize_account(&account_bytes)?;
    println!("decoded discriminator valid: {}", decoded.has_valid_discriminator());
    println!("decoded enum tag: {:?}", decoded.data.simple_enum);
    log::debug!("round trip equal: {}", decoded == account);

    Ok(())
}

fn decode(type_id: &str, input: &str, config: Config) -> Result<(), CliError> {
    let registry = wsc::registry();
    if registry.get(type_id).is_none() {
        return Err(CliError::UnknownType(type_id.to_string()));
    }

    let input: String = input.split_whitespace().collect();
    let input = input.strip_prefix("0x").unwrap_or(&input);
    let bytes = hex::decode(input)?;
    log::info!("decoding {} bytes as {}", bytes.len(), type_id);

    let value = registry.codec(config).deserialize(type_id, &bytes)?;
    println!("{}", value);

    Ok(())
}
