//! Placeholder generation for expression attribute names and values.
//!
//! Name placeholders are `#` followed by the attribute name with every
//! character outside `[A-Za-z0-9_]` replaced by `_`. Value placeholders are
//! `:` followed by a normalized rendering of the value itself. A name or value
//! seen before (including ones the caller pre-seeded) gets its existing
//! token back; a token already bound to something else is suffixed with
//! `_2`, `_3`, ... until it is free.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use rustack_dynamodb_model::AttributeValue;
use tracing::trace;

/// Sigil introducing an expression attribute name.
pub const NAME_SIGIL: char = '#';

/// Sigil introducing an expression attribute value.
pub const VALUE_SIGIL: char = ':';

/// Allocates placeholder tokens for one compilation.
///
/// The namer owns copies of the tables it extends; the caller's tables are
/// never touched.
#[derive(Debug, Clone)]
pub struct PlaceholderNamer {
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
    name_index: HashMap<String, String>,
    value_index: HashMap<AttributeValue, String>,
    max_token_len: usize,
}

impl PlaceholderNamer {
    /// Create a namer with empty tables.
    #[must_use]
    pub fn new(max_token_len: usize) -> Self {
        Self::seeded(&HashMap::new(), &HashMap::new(), max_token_len)
    }

    /// Create a namer that extends copies of existing tables.
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn seeded(
        names: &HashMap<String, String>,
        values: &HashMap<String, AttributeValue>,
        max_token_len: usize,
    ) -> Self {
        Self::from_tables(names.clone(), values.clone(), max_token_len)
    }

    /// Create a namer that extends tables it takes ownership of.
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn from_tables(
        names: HashMap<String, String>,
        values: HashMap<String, AttributeValue>,
        max_token_len: usize,
    ) -> Self {
        Self {
            name_index: invert(&names),
            value_index: invert(&values),
            names,
            values,
            max_token_len: max_token_len.max(1),
        }
    }

    /// Return the placeholder for an attribute name, allocating it if needed.
    pub fn name_token(&mut self, raw: &str) -> String {
        if let Some(token) = self.name_index.get(raw) {
            return token.clone();
        }

        let base = format!("{NAME_SIGIL}{}", normalize(raw, self.max_token_len, "attr"));
        let token = free_token(base, |t| self.names.contains_key(t));
        self.names.insert(token.clone(), raw.to_owned());
        self.name_index.insert(raw.to_owned(), token.clone());
        token
    }

    /// Return the placeholder for a value, allocating it if needed.
    pub fn value_token(&mut self, value: &AttributeValue) -> String {
        if let Some(token) = self.value_index.get(value) {
            return token.clone();
        }

        let stem = value_stem(value, self.max_token_len);
        let base = format!("{VALUE_SIGIL}{}", normalize(&stem, self.max_token_len, "val"));
        let token = free_token(base, |t| self.values.contains_key(t));
        self.values.insert(token.clone(), value.clone());
        self.value_index.insert(value.clone(), token.clone());
        token
    }

    /// The name table built so far.
    #[must_use]
    pub fn names(&self) -> &HashMap<String, String> {
        &self.names
    }

    /// The value table built so far.
    #[must_use]
    pub fn values(&self) -> &HashMap<String, AttributeValue> {
        &self.values
    }

    /// Consume the namer, returning `(names, values)`.
    #[must_use]
    pub fn into_tables(self) -> (HashMap<String, String>, HashMap<String, AttributeValue>) {
        (self.names, self.values)
    }
}

/// Build a target -> token index. When a target is bound to several tokens
/// the smallest token wins, so reuse does not depend on map iteration order.
fn invert<T: Clone + Eq + Hash>(table: &HashMap<String, T>) -> HashMap<T, String> {
    let mut index: HashMap<T, String> = HashMap::with_capacity(table.len());
    for (token, target) in table {
        index
            .entry(target.clone())
            .and_modify(|existing| {
                if token.as_str() < existing.as_str() {
                    existing.clone_from(token);
                }
            })
            .or_insert_with(|| token.clone());
    }
    index
}

fn free_token(base: String, taken: impl Fn(&str) -> bool) -> String {
    if !taken(&base) {
        return base;
    }
    let mut n = 2_usize;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken(&candidate) {
            trace!(base = %base, token = %candidate, "placeholder collision, suffixed");
            return candidate;
        }
        n += 1;
    }
}

/// Keep `[A-Za-z0-9_]`, map everything else to `_`, cap the length.
fn normalize(raw: &str, max_len: usize, fallback: &str) -> String {
    let normalized: String = raw
        .chars()
        .take(max_len)
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if normalized.is_empty() {
        fallback.to_owned()
    } else {
        normalized
    }
}

/// Human-readable rendering of a value before normalization.
fn value_stem(value: &AttributeValue, max_len: usize) -> String {
    match value {
        AttributeValue::S(s) | AttributeValue::N(s) => {
            if s.chars().count() <= max_len {
                s.clone()
            } else {
                // Leave room for `_` plus eight hex digits.
                let keep = max_len.saturating_sub(9);
                let prefix: String = s.chars().take(keep).collect();
                format!("{prefix}_{:08x}", crc32fast::hash(s.as_bytes()))
            }
        }
        AttributeValue::Bool(b) => b.to_string(),
        AttributeValue::Null(_) => "null".to_owned(),
        other => format!(
            "{}_{:08x}",
            other.type_descriptor().to_ascii_lowercase(),
            content_crc(other)
        ),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn content_crc(value: &AttributeValue) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    value.hash(&mut hasher);
    hasher.finish() as u32
}
