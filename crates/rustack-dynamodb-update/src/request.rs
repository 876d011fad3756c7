//! Merging compiled updates into `UpdateItem` requests.

use std::collections::HashMap;

use rustack_dynamodb_model::{AttributeValue, UpdateAction, UpdateItemInput, UpdateMap};
use tracing::debug;

use crate::compiler::{CompiledUpdate, UpdateExpressionCompiler, merge_names, merge_values};
use crate::error::UpdateExpressionResult;

/// Build a fresh `UpdateItem` request around a compiled update.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn update_item_input(
    table_name: impl Into<String>,
    key: HashMap<String, AttributeValue>,
    compiled: CompiledUpdate,
) -> UpdateItemInput {
    UpdateItemInput {
        table_name: table_name.into(),
        key,
        update_expression: Some(compiled.expression),
        expression_attribute_names: compiled.names,
        expression_attribute_values: compiled.values.unwrap_or_default(),
        ..Default::default()
    }
}

/// Set the request's update expression and merge in its placeholders.
///
/// The request may already carry placeholders for its condition expression.
/// A token bound to a different target on each side is a conflict.
pub fn apply_to_update_item(
    mut input: UpdateItemInput,
    compiled: CompiledUpdate,
) -> UpdateExpressionResult<UpdateItemInput> {
    input.expression_attribute_names =
        merge_names(&input.expression_attribute_names, &compiled.names)?;
    if let Some(values) = &compiled.values {
        input.expression_attribute_values =
            merge_values(&input.expression_attribute_values, values)?;
    }
    debug!(
        table = %input.table_name,
        expression = %compiled.expression,
        names = input.expression_attribute_names.len(),
        values = input.expression_attribute_values.len(),
        "applied update expression to request"
    );
    input.update_expression = Some(compiled.expression);
    Ok(input)
}

/// Compile `update` against the request's own placeholder tables and apply it.
///
/// Seeding the namer with the request's tables means condition placeholders
/// are reused rather than conflicting.
pub fn compile_into_update_item(
    compiler: &UpdateExpressionCompiler,
    input: UpdateItemInput,
    update: &UpdateMap,
    action: &UpdateAction,
) -> UpdateExpressionResult<UpdateItemInput> {
    let compiled = compiler.compile(
        update,
        action,
        &input.expression_attribute_names,
        &input.expression_attribute_values,
    )?;
    apply_to_update_item(input, compiled)
}
