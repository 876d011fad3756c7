//! Compiler configuration.
//!
//! Provides [`UpdateExpressionConfig`]. The defaults reproduce the classic
//! behavior of string-based update helpers: any `SET` string containing an
//! arithmetic sign is read as a delta.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// How `SET` string values containing `+` or `-` are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeltaDetection {
    /// Every such string must be a valid `attr +/- n` delta; anything else
    /// is a malformed-delta error.
    #[default]
    Strict,
    /// Such strings are deltas when they parse as one and plain strings
    /// otherwise.
    Lenient,
    /// Strings are always plain values; only `UpdateValue::Delta` is a delta.
    Disabled,
}

/// Update-expression compiler configuration.
///
/// # Examples
///
/// ```
/// use rustack_dynamodb_update::config::{DeltaDetection, UpdateExpressionConfig};
///
/// let config = UpdateExpressionConfig::builder()
///     .delta_detection(DeltaDetection::Lenient)
///     .build();
/// assert_eq!(config.max_token_len, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpressionConfig {
    /// Interpretation of sign-bearing `SET` strings.
    #[builder(default)]
    #[serde(default)]
    pub delta_detection: DeltaDetection,

    /// Maximum length of the normalized part of a generated placeholder.
    #[builder(default = 64)]
    #[serde(default = "default_max_token_len")]
    pub max_token_len: usize,
}

impl Default for UpdateExpressionConfig {
    fn default() -> Self {
        Self {
            delta_detection: DeltaDetection::default(),
            max_token_len: default_max_token_len(),
        }
    }
}

fn default_max_token_len() -> usize {
    64
}
