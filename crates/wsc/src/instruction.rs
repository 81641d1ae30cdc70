//! Instructions accepted by the demo program.

use serde::{Deserialize, Serialize};
use wsc_core::WireSchema;

use crate::state::DemoState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, WireSchema)]
pub enum DemoInstruction {
    /// Creates the account and stores the full state.
    Initialize { data: DemoState },
    /// Replaces fields without changing the serialized length.
    Update {
        new_u64: u64,
        new_bool: bool,
        new_text: String,
        new_option: Option<u64>,
    },
    /// Checks a field of the stored state.
    Validate { expected_u8: u8 },
}

impl DemoInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "Initialize",
            Self::Update { .. } => "Update",
            Self::Validate { .. } => "Validate",
        }
    }
}
