//! Errors produced while compiling update expressions.

/// Errors produced while compiling or merging update expressions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateExpressionError {
    /// A delta's numeric operand is missing or not a finite decimal.
    #[error("Malformed delta for attribute '{attribute}': '{expression}' is not <attribute> +/- <number>")]
    MalformedDelta {
        /// The attribute being updated.
        attribute: String,
        /// The offending delta text.
        expression: String,
    },
    /// A value cannot be used with the requested action.
    #[error("Invalid operand for {action} on attribute '{attribute}': {message}")]
    InvalidOperand {
        /// The action keyword.
        action: String,
        /// The attribute being updated.
        attribute: String,
        /// Explanation.
        message: String,
    },
    /// Two placeholder tables bind the same token to different targets.
    #[error("Placeholder {placeholder} is bound to two different targets")]
    PlaceholderConflict {
        /// The conflicting token.
        placeholder: String,
    },
}

/// Convenience result type for update-expression operations.
pub type UpdateExpressionResult<T> = Result<T, UpdateExpressionError>;

impl UpdateExpressionError {
    pub(crate) fn malformed_delta(attribute: &str, expression: &str) -> Self {
        Self::MalformedDelta {
            attribute: attribute.to_owned(),
            expression: expression.to_owned(),
        }
    }
}
