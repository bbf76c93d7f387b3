//! Codec configuration.

use serde::{Deserialize, Serialize};

/// What to do when a pair-list map repeats a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Fail with [`CodecError::DuplicateKey`](crate::CodecError::DuplicateKey).
    #[default]
    Reject,
    /// Keep the last value, at the position of the first occurrence.
    LastWins,
}

/// Options shared by every call of a [`Codec`](crate::Codec).
///
/// Deserializable so that a host can embed it in its own configuration:
///
/// ```
/// use fabric_json_codec::{CodecOptions, DuplicateKeyPolicy};
///
/// let options: CodecOptions =
///     serde_json::from_str(r#"{"max_depth": 32, "duplicate_keys": "last_wins"}"#).unwrap();
/// assert_eq!(options.max_depth, 32);
/// assert_eq!(options.duplicate_keys, DuplicateKeyPolicy::LastWins);
/// assert!(options.reject_trailing_content);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Maximum nesting of objects and arrays, on decode and encode.
    pub max_depth: usize,
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Fail when anything but whitespace follows the top-level value.
    pub reject_trailing_content: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_depth: 128,
            duplicate_keys: DuplicateKeyPolicy::Reject,
            reject_trailing_content: true,
        }
    }
}

impl CodecOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }

    pub fn with_reject_trailing_content(mut self, reject: bool) -> Self {
        self.reject_trailing_content = reject;
        self
    }
}
