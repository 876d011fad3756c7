//! Delta strings: `"count + 2"`, `"balance - 10"`, `"100 - stock"`.
//!
//! A delta string names the attribute being updated on one side of a single
//! `+` or `-` operator and a decimal literal on the other. This module
//! recovers the sign, the operand order and the numeric magnitude, turning
//! the string into a structured [`Delta`].

use rustack_dynamodb_model::{AttributeValue, Delta, DeltaSign, OperandOrder, UpdateValue};
use tracing::trace;

use crate::config::DeltaDetection;
use crate::error::{UpdateExpressionError, UpdateExpressionResult};

/// Integers at or beyond this magnitude keep their literal digits.
const MAX_EXACT_INTEGER: f64 = 1e15;

/// The first `+` or `-` in `raw`, if any.
#[must_use]
pub fn detect_sign(raw: &str) -> Option<DeltaSign> {
    raw.chars().find_map(DeltaSign::from_char)
}

/// Extract the numeric operand of a delta string.
///
/// Removes the first occurrence of `attribute`, then the operator adjacent to
/// it, and parses what is left as a decimal. A leading sign on the literal
/// itself is preserved, so `"age + -3"` yields `-3`.
pub fn parse_delta(expr: &str, attribute: &str) -> UpdateExpressionResult<f64> {
    parse_operand(expr, attribute).map(|(_, value)| value)
}

/// Parse a delta string for `attribute` into a structured [`Delta`].
///
/// Either operand order is accepted: `attribute <sign> n` or
/// `n <sign> attribute`.
pub fn parse_delta_expression(attribute: &str, raw: &str) -> UpdateExpressionResult<Delta> {
    let expr = raw.trim();
    let (order, sign) = locate_operator(expr, attribute)
        .ok_or_else(|| UpdateExpressionError::malformed_delta(attribute, raw))?;
    let (literal, value) = parse_operand(expr, attribute)?;

    Ok(Delta {
        sign,
        magnitude: canonical_number(&literal, value),
        order,
    })
}

/// Decide how a `SET` value is compiled: as a delta or as a plain value.
///
/// Structured deltas pass through. A string containing a sign character is
/// read as a delta string according to `detection`.
pub fn classify(
    attribute: &str,
    value: &UpdateValue,
    detection: DeltaDetection,
) -> UpdateExpressionResult<UpdateValue> {
    let UpdateValue::Value(AttributeValue::S(raw)) = value else {
        return Ok(value.clone());
    };
    if detection == DeltaDetection::Disabled || detect_sign(raw).is_none() {
        return Ok(value.clone());
    }

    match parse_delta_expression(attribute, raw) {
        Ok(delta) => {
            trace!(
                attribute,
                raw = %raw,
                sign = %delta.sign,
                magnitude = %delta.magnitude,
                "string value read as delta"
            );
            Ok(UpdateValue::Delta(delta))
        }
        Err(_) if detection == DeltaDetection::Lenient => Ok(value.clone()),
        Err(e) => Err(e),
    }
}

/// Check that a structured delta carries a finite decimal magnitude.
pub fn check_magnitude(attribute: &str, delta: &Delta) -> UpdateExpressionResult<()> {
    match delta.magnitude.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(()),
        _ => Err(UpdateExpressionError::malformed_delta(
            attribute,
            &format!("{attribute} {} {}", delta.sign, delta.magnitude),
        )),
    }
}

/// Format a number, preferring integer representation when the value is integral.
#[must_use]
pub fn format_number(v: f64) -> String {
    // Safe to truncate: integral and well within i64 range.
    #[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
    if v == v.trunc() && v.abs() < MAX_EXACT_INTEGER {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Find which side of the operator the attribute is on.
fn locate_operator(expr: &str, attribute: &str) -> Option<(OperandOrder, DeltaSign)> {
    if attribute.is_empty() {
        return None;
    }
    if let Some(rest) = expr.strip_prefix(attribute) {
        if let Some(sign) = rest.trim_start().chars().next().and_then(DeltaSign::from_char) {
            return Some((OperandOrder::AttributeFirst, sign));
        }
    }
    if let Some(head) = expr.strip_suffix(attribute) {
        if let Some(sign) = head.trim_end().chars().next_back().and_then(DeltaSign::from_char) {
            return Some((OperandOrder::AttributeLast, sign));
        }
    }
    None
}

/// Returns the numeric literal left after stripping name and operator, and its value.
fn parse_operand(expr: &str, attribute: &str) -> UpdateExpressionResult<(String, f64)> {
    let without_name = if attribute.is_empty() {
        expr.to_owned()
    } else {
        expr.replacen(attribute, "", 1)
    };
    let rest = without_name.trim();

    // The operator sits where the attribute was removed: trailing for
    // `n - attr`, leading for `attr - n`.
    let literal = match rest.chars().next_back().and_then(DeltaSign::from_char) {
        Some(sign) => rest.strip_suffix(sign.as_char()),
        None => rest.strip_prefix(['+', '-']),
    }
    .unwrap_or(rest)
    .trim();

    match literal.parse::<f64>() {
        Ok(v) if !literal.is_empty() && v.is_finite() => Ok((literal.to_owned(), v)),
        _ => Err(UpdateExpressionError::malformed_delta(attribute, expr)),
    }
}

/// Canonical `N` text for a parsed literal. Large integers keep their digits
/// since `f64` cannot represent them exactly.
fn canonical_number(literal: &str, value: f64) -> String {
    let digits = literal.strip_prefix(['+', '-']).unwrap_or(literal);
    let is_integer = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    if is_integer && value.abs() >= MAX_EXACT_INTEGER {
        let trimmed = digits.trim_start_matches('0');
        let sign = if literal.starts_with('-') { "-" } else { "" };
        format!("{sign}{trimmed}")
    } else {
        format_number(value)
    }
}
