//! Input envelopes for building update requests.
//!
//! [`UpdateInput`] is what a caller hands to the update-expression compiler;
//! [`UpdateItemInput`] is the `UpdateItem` request the compiled expression
//! ends up in. Optional fields are omitted when `None` and empty maps are
//! omitted to keep payloads minimal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::update::{UpdateAction, UpdateMap};

/// Declarative update request.
///
/// Fields other than the four update fields are carried in `rest` and passed
/// through the compiler untouched. `rest` defaults to a JSON object so that
/// arbitrary request fields survive a deserialize/compile/serialize cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateInput<R = serde_json::Map<String, serde_json::Value>> {
    /// Attributes to update, in clause order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateMap>,

    /// Clause to compile the update map into (defaults to `SET`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_action: Option<UpdateAction>,

    /// Name placeholders already in use by the request, to be extended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_names: Option<HashMap<String, String>>,

    /// Value placeholders already in use by the request, to be extended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression_attribute_values: Option<HashMap<String, AttributeValue>>,

    /// Every other request field.
    #[serde(flatten)]
    pub rest: R,
}

/// Determines what values are returned by `UpdateItem`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReturnValue {
    /// Nothing is returned.
    #[default]
    #[serde(rename = "NONE")]
    None,
    /// All attributes as they were before the update.
    #[serde(rename = "ALL_OLD")]
    AllOld,
    /// Only the updated attributes, as they were before the update.
    #[serde(rename = "UPDATED_OLD")]
    UpdatedOld,
    /// All attributes as they are after the update.
    #[serde(rename = "ALL_NEW")]
    AllNew,
    /// Only the updated attributes, as they are after the update.
    #[serde(rename = "UPDATED_NEW")]
    UpdatedNew,
}

/// Input for the `UpdateItem` operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemInput {
    /// The name of the table containing the item to update.
    pub table_name: String,

    /// The primary key of the item to be updated.
    pub key: HashMap<String, AttributeValue>,

    /// An expression that defines one or more attributes to be updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_expression: Option<String>,

    /// A condition that must be satisfied for the update to succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,

    /// Substitution tokens for attribute names in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: HashMap<String, String>,

    /// Substitution tokens for attribute values in an expression.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: HashMap<String, AttributeValue>,

    /// Determines the attributes to return after the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
}
