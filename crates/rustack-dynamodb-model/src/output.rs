//! Output envelope of the update-expression compiler.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::update::UpdateAction;

/// Compiled update merged with the caller's pass-through fields.
///
/// `expression_attribute_values` is `None` for a `REMOVE` update: that
/// clause references names only, and DynamoDB rejects unused value
/// placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateOutput<R = serde_json::Map<String, serde_json::Value>> {
    /// The compiled update expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_expression: Option<String>,

    /// The caller's action, kept only when there was nothing to compile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_action: Option<UpdateAction>,

    /// Name placeholders, including any supplied by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_names: Option<HashMap<String, String>>,

    /// Value placeholders, including any supplied by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,

    /// Every other request field, unchanged.
    #[serde(flatten)]
    pub rest: R,
}
