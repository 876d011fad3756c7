//! Clause compiler: update maps to DynamoDB update-expression clauses.
//!
//! Each action has its own clause grammar:
//!
//! | Action | Entry | Example |
//! |--------|-------|---------|
//! | `SET` | `#n = :v` or `#n = #n + :v` | `SET #name = :Jane, #age = #age + :1` |
//! | `ADD` | `#n :v` | `ADD #score :5` |
//! | `DELETE` | `#n :v` | `DELETE #tags :ss_1c2b3a4d` |
//! | `REMOVE` | `#n` | `REMOVE #a, #b` |
//!
//! Entries are joined with `, ` in update-map order and prefixed with the
//! action keyword. Placeholder tables supplied by the caller are copied and
//! extended, never modified.

use std::collections::HashMap;

use rustack_dynamodb_model::{
    AttributeValue, OperandOrder, UpdateAction, UpdateInput, UpdateMap, UpdateOutput, UpdateValue,
};
use tracing::debug;

use crate::config::UpdateExpressionConfig;
use crate::delta::{check_magnitude, classify};
use crate::error::{UpdateExpressionError, UpdateExpressionResult};
use crate::placeholder::PlaceholderNamer;

/// A compiled update expression with its placeholder tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledUpdate {
    /// The update expression, e.g. `SET #age = #age + :1`.
    pub expression: String,
    /// Name placeholders (`#token` -> attribute name).
    pub names: HashMap<String, String>,
    /// Value placeholders (`:token` -> value); `None` for a pure `REMOVE`.
    pub values: Option<HashMap<String, AttributeValue>>,
}

impl CompiledUpdate {
    /// Combine two compiled updates into one expression.
    ///
    /// Clauses are concatenated with a space and the placeholder tables are
    /// merged into new tables.
    pub fn merge(self, other: Self) -> UpdateExpressionResult<Self> {
        let expression = [self.expression, other.expression]
            .into_iter()
            .filter(|e| !e.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let names = merge_names(&self.names, &other.names)?;
        let values = match (self.values, other.values) {
            (None, None) => None,
            (ours, theirs) => Some(merge_values(
                &ours.unwrap_or_default(),
                &theirs.unwrap_or_default(),
            )?),
        };
        Ok(Self {
            expression,
            names,
            values,
        })
    }
}

/// Compiles [`UpdateMap`]s into update expressions.
///
/// The compiler holds configuration only, so one instance can be shared
/// freely across threads.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpressionCompiler {
    config: UpdateExpressionConfig,
}

impl UpdateExpressionCompiler {
    /// Create a compiler with the given configuration.
    #[must_use]
    pub fn new(config: UpdateExpressionConfig) -> Self {
        Self { config }
    }

    /// Compile one update map under one action.
    ///
    /// `names` and `values` are existing placeholder tables to extend, for
    /// example those of a condition expression in the same request.
    #[allow(clippy::implicit_hasher)]
    pub fn compile(
        &self,
        update: &UpdateMap,
        action: &UpdateAction,
        names: &HashMap<String, String>,
        values: &HashMap<String, AttributeValue>,
    ) -> UpdateExpressionResult<CompiledUpdate> {
        let namer = PlaceholderNamer::seeded(names, values, self.config.max_token_len);
        self.compile_with(namer, update, action)
    }

    /// Compile several clauses into a single expression.
    ///
    /// All clauses share one namer, so an attribute named in more than one
    /// clause resolves to the same placeholder. Empty update maps are
    /// skipped. The value table is omitted only when every compiled clause is
    /// `REMOVE`.
    #[allow(clippy::implicit_hasher)]
    pub fn compile_many(
        &self,
        clauses: &[(UpdateAction, &UpdateMap)],
        names: &HashMap<String, String>,
        values: &HashMap<String, AttributeValue>,
    ) -> UpdateExpressionResult<CompiledUpdate> {
        let mut namer = PlaceholderNamer::seeded(names, values, self.config.max_token_len);
        let mut compiled = Vec::with_capacity(clauses.len());
        let mut only_remove = None;
        for (action, update) in clauses {
            if update.is_empty() {
                continue;
            }
            compiled.push(self.compile_clause(&mut namer, update, action)?);
            only_remove = Some(only_remove.unwrap_or(true) && *action == UpdateAction::Remove);
        }

        let (names, values) = namer.into_tables();
        Ok(CompiledUpdate {
            expression: compiled.join(" "),
            names,
            values: (only_remove != Some(true)).then_some(values),
        })
    }

    /// Compile an [`UpdateInput`] envelope.
    ///
    /// Without an update map the input passes through unchanged. Otherwise
    /// the action defaults to `SET`, the caller's placeholder tables are
    /// extended, and `rest` is returned untouched.
    pub fn apply<R>(&self, input: UpdateInput<R>) -> UpdateExpressionResult<UpdateOutput<R>> {
        let UpdateInput {
            update,
            update_action,
            expression_attribute_names,
            expression_attribute_values,
            rest,
        } = input;

        let Some(update) = update else {
            return Ok(UpdateOutput {
                update_expression: None,
                update_action,
                expression_attribute_names,
                expression_attribute_values,
                rest,
            });
        };

        let action = update_action.unwrap_or_default();
        let namer = PlaceholderNamer::from_tables(
            expression_attribute_names.unwrap_or_default(),
            expression_attribute_values.unwrap_or_default(),
            self.config.max_token_len,
        );
        let compiled = self.compile_with(namer, &update, &action)?;

        Ok(UpdateOutput {
            update_expression: Some(compiled.expression),
            update_action: None,
            expression_attribute_names: Some(compiled.names),
            expression_attribute_values: compiled.values,
            rest,
        })
    }

    fn compile_with(
        &self,
        mut namer: PlaceholderNamer,
        update: &UpdateMap,
        action: &UpdateAction,
    ) -> UpdateExpressionResult<CompiledUpdate> {
        let expression = self.compile_clause(&mut namer, update, action)?;
        let (names, values) = namer.into_tables();
        Ok(CompiledUpdate {
            expression,
            names,
            values: (*action != UpdateAction::Remove).then_some(values),
        })
    }

    fn compile_clause(
        &self,
        namer: &mut PlaceholderNamer,
        update: &UpdateMap,
        action: &UpdateAction,
    ) -> UpdateExpressionResult<String> {
        let entries: Vec<String> = match action {
            UpdateAction::Set => update
                .iter()
                .map(|(name, value)| self.set_entry(namer, name, value))
                .collect::<UpdateExpressionResult<_>>()?,
            UpdateAction::Add | UpdateAction::Delete => update
                .iter()
                .map(|(name, value)| {
                    let operand = plain_operand(action, name, value)?;
                    let name_token = namer.name_token(name);
                    let value_token = namer.value_token(&operand);
                    Ok(format!("{name_token} {value_token}"))
                })
                .collect::<UpdateExpressionResult<_>>()?,
            UpdateAction::Remove => update.keys().map(|name| namer.name_token(name)).collect(),
            UpdateAction::Unrecognized(_) => Vec::new(),
        };

        let keyword = action.keyword();
        let expression = if entries.is_empty() {
            keyword.to_owned()
        } else {
            format!("{keyword} {}", entries.join(", "))
        };
        debug!(
            action = %action,
            entries = entries.len(),
            expression = %expression,
            "compiled update clause"
        );
        Ok(expression)
    }

    fn set_entry(
        &self,
        namer: &mut PlaceholderNamer,
        name: &str,
        value: &UpdateValue,
    ) -> UpdateExpressionResult<String> {
        let name_token = namer.name_token(name);
        match classify(name, value, self.config.delta_detection)? {
            UpdateValue::Delta(delta) => {
                check_magnitude(name, &delta)?;
                let value_token = namer.value_token(&delta.magnitude_value());
                let (lhs, rhs) = match delta.order {
                    OperandOrder::AttributeFirst => (&name_token, &value_token),
                    OperandOrder::AttributeLast => (&value_token, &name_token),
                };
                Ok(format!("{name_token} = {lhs} {} {rhs}", delta.sign))
            }
            UpdateValue::Value(v) => {
                let value_token = namer.value_token(&v);
                Ok(format!("{name_token} = {value_token}"))
            }
        }
    }
}

/// The operand of an `ADD` or `DELETE` entry. Strings are never read as
/// deltas here; a structured delta is only meaningful for `ADD`.
fn plain_operand(
    action: &UpdateAction,
    name: &str,
    value: &UpdateValue,
) -> UpdateExpressionResult<AttributeValue> {
    match value {
        UpdateValue::Value(v) => Ok(v.clone()),
        UpdateValue::Delta(delta) if *action == UpdateAction::Add => {
            check_magnitude(name, delta)?;
            Ok(delta.signed_value())
        }
        UpdateValue::Delta(_) => Err(UpdateExpressionError::InvalidOperand {
            action: action.keyword().to_owned(),
            attribute: name.to_owned(),
            message: "a delta cannot be removed from a set".to_owned(),
        }),
    }
}

/// Compile an [`UpdateInput`] with the default configuration.
pub fn get_update_expression<R>(input: UpdateInput<R>) -> UpdateExpressionResult<UpdateOutput<R>> {
    UpdateExpressionCompiler::default().apply(input)
}

/// Merge two name tables into a new one.
#[allow(clippy::implicit_hasher)]
pub fn merge_names(
    base: &HashMap<String, String>,
    other: &HashMap<String, String>,
) -> UpdateExpressionResult<HashMap<String, String>> {
    merge_tables(base, other)
}

/// Merge two value tables into a new one.
#[allow(clippy::implicit_hasher)]
pub fn merge_values(
    base: &HashMap<String, AttributeValue>,
    other: &HashMap<String, AttributeValue>,
) -> UpdateExpressionResult<HashMap<String, AttributeValue>> {
    merge_tables(base, other)
}

fn merge_tables<T: Clone + PartialEq>(
    base: &HashMap<String, T>,
    other: &HashMap<String, T>,
) -> UpdateExpressionResult<HashMap<String, T>> {
    let mut merged = base.clone();
    for (token, target) in other {
        match merged.get(token) {
            Some(existing) if existing != target => {
                return Err(UpdateExpressionError::PlaceholderConflict {
                    placeholder: token.clone(),
                });
            }
            Some(_) => {}
            None => {
                merged.insert(token.clone(), target.clone());
            }
        }
    }
    Ok(merged)
}
