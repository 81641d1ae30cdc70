//! Decoder configuration.

/// How a flag byte outside `{0, 1}` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagPolicy {
    /// Anything other than `0` or `1` is a format error.
    #[default]
    Strict,

    /// Any nonzero byte counts as set.
    Lenient,
}

/// What happens to input left over after the root value is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingPolicy {
    /// Leftover bytes are a format error.
    #[default]
    Reject,

    /// Leftover bytes are ignored.
    Allow,
}

/// Default for [Config::max_depth].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options shared by the schema-driven and serde codecs.
///
/// Booleans always decode leniently (any nonzero byte is `true`),
/// only option presence bytes follow [Config::presence].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub presence: FlagPolicy,
    pub trailing: TrailingPolicy,

    /// How many options, sequences, structs and variants may nest inside
    /// each other. Each level costs a stack frame, and recursive types are
    /// otherwise bounded only by the input.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presence: FlagPolicy::default(),
            trailing: TrailingPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for option presence bytes.
    pub fn presence(mut self, policy: FlagPolicy) -> Self {
        self.presence = policy;
        self
    }

    /// Set the policy for leftover input.
    pub fn trailing(mut self, policy: TrailingPolicy) -> Self {
        self.trailing = policy;
        self
    }

    /// Set the nesting limit.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
