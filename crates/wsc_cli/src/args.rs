//! Command-line args

use clap::{Parser, Subcommand};

/// Inspect the demo schemas and their wire encoding.
#[derive(Parser)]
#[clap(version, about)]
pub(crate) struct CliArgs {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the registered types, or print the layout of one.
    Schema {
        /// The type to describe
        type_id: Option<String>,
    },

    /// Encode the demo account and update instruction and check them
    /// against their known encodings.
    Demo,

    /// Decode a hex buffer as a registered type.
    Decode {
        /// The type to decode
        #[clap(short, long = "type")]
        #[clap(default_value = wsc::defaults::DEFAULT_TYPE)]
        type_id: String,

        /// The encoded value, optionally prefixed with `0x`
        hex: String,

        /// Treat any nonzero option presence byte as present
        #[clap(long)]
        lenient_presence: bool,

        /// Ignore bytes left over after the value
        #[clap(long)]
        allow_trailing: bool,
    },
}
