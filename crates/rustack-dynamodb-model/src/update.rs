//! Declarative update model.
//!
//! An [`UpdateMap`] describes what should happen to an item's top-level
//! attributes under a single [`UpdateAction`]. Each entry is either a plain
//! value or a [`Delta`] relative to the attribute's current value.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::attribute_value::AttributeValue;

// ---------------------------------------------------------------------------
// Update action
// ---------------------------------------------------------------------------

/// The update-expression clause an [`UpdateMap`] is compiled into.
///
/// Keywords are matched case-insensitively. Anything else is carried as
/// [`UpdateAction::Unrecognized`] and compiles to the bare keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateAction {
    /// `SET`: assign values, optionally as `attr + n` / `attr - n`.
    #[default]
    Set,
    /// `ADD`: add to a number or union into a set.
    Add,
    /// `DELETE`: remove elements from a set.
    Delete,
    /// `REMOVE`: drop attributes from the item.
    Remove,
    /// A keyword this crate does not know how to compile.
    Unrecognized(String),
}

impl UpdateAction {
    /// Parse an action keyword.
    #[must_use]
    pub fn parse(keyword: &str) -> Self {
        if keyword.eq_ignore_ascii_case("SET") {
            Self::Set
        } else if keyword.eq_ignore_ascii_case("ADD") {
            Self::Add
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            Self::Delete
        } else if keyword.eq_ignore_ascii_case("REMOVE") {
            Self::Remove
        } else {
            Self::Unrecognized(keyword.to_owned())
        }
    }

    /// The keyword that prefixes the compiled clause.
    #[must_use]
    pub fn keyword(&self) -> &str {
        match self {
            Self::Set => "SET",
            Self::Add => "ADD",
            Self::Delete => "DELETE",
            Self::Remove => "REMOVE",
            Self::Unrecognized(keyword) => keyword,
        }
    }
}

impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for UpdateAction {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for UpdateAction {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for UpdateAction {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<UpdateAction> for String {
    fn from(action: UpdateAction) -> Self {
        match action {
            UpdateAction::Unrecognized(keyword) => keyword,
            other => other.keyword().to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Deltas
// ---------------------------------------------------------------------------

/// Arithmetic sign of a [`Delta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaSign {
    /// `+`
    #[serde(rename = "+")]
    Plus,
    /// `-`
    #[serde(rename = "-")]
    Minus,
}

impl DeltaSign {
    /// Map `+` / `-` to a sign.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            _ => None,
        }
    }

    /// The sign character.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

impl fmt::Display for DeltaSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Which side of the sign the attribute itself sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperandOrder {
    /// `attr + n`
    #[default]
    AttributeFirst,
    /// `n - attr`
    AttributeLast,
}

/// An update relative to the attribute's current value.
///
/// The sign lives in [`Delta::sign`]; [`Delta::magnitude`] is the operand
/// exactly as it will be bound to the value placeholder, so `age - 3` has
/// sign `-` and magnitude `3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Delta {
    /// Arithmetic sign written between the two operands.
    pub sign: DeltaSign,
    /// Numeric operand, string-encoded like `AttributeValue::N`.
    pub magnitude: String,
    /// Operand order in the emitted clause.
    #[serde(default)]
    pub order: OperandOrder,
}

impl Delta {
    /// Create a delta of the form `attr <sign> magnitude`.
    #[must_use]
    pub fn new(sign: DeltaSign, magnitude: impl fmt::Display) -> Self {
        Self {
            sign,
            magnitude: magnitude.to_string(),
            order: OperandOrder::AttributeFirst,
        }
    }

    /// `attr + by`
    #[must_use]
    pub fn increment(by: impl fmt::Display) -> Self {
        Self::new(DeltaSign::Plus, by)
    }

    /// `attr - by`
    #[must_use]
    pub fn decrement(by: impl fmt::Display) -> Self {
        Self::new(DeltaSign::Minus, by)
    }

    /// Set the operand order.
    #[must_use]
    pub fn with_order(mut self, order: OperandOrder) -> Self {
        self.order = order;
        self
    }

    /// The operand bound to the value placeholder.
    #[must_use]
    pub fn magnitude_value(&self) -> AttributeValue {
        AttributeValue::N(self.magnitude.clone())
    }

    /// The magnitude with the sign folded in, as an `ADD` operand.
    #[must_use]
    pub fn signed_value(&self) -> AttributeValue {
        let magnitude = self.magnitude.trim();
        let signed = match self.sign {
            DeltaSign::Plus => magnitude.to_owned(),
            DeltaSign::Minus => match magnitude.strip_prefix('-') {
                Some(positive) => positive.to_owned(),
                None if is_zero(magnitude) => magnitude.to_owned(),
                None => format!("-{magnitude}"),
            },
        };
        AttributeValue::N(signed)
    }
}

#[allow(clippy::float_cmp)]
fn is_zero(number: &str) -> bool {
    number.parse::<f64>().is_ok_and(|v| v == 0.0)
}

// ---------------------------------------------------------------------------
// Update values
// ---------------------------------------------------------------------------

/// The right-hand side of one update-map entry.
///
/// On the wire a delta is written as `{"Delta": {"Sign": "+", "Magnitude": "2"}}`;
/// anything else is a plain `AttributeValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UpdateValueRepr", into = "UpdateValueRepr")]
pub enum UpdateValue {
    /// A value assigned, added or deleted as-is.
    Value(AttributeValue),
    /// An arithmetic update relative to the current value.
    Delta(Delta),
}

impl UpdateValue {
    /// Returns the plain value, if this is not a delta.
    #[must_use]
    pub fn as_value(&self) -> Option<&AttributeValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Delta(_) => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum UpdateValueRepr {
    Delta {
        #[serde(rename = "Delta")]
        delta: Delta,
    },
    Value(AttributeValue),
}

impl From<UpdateValueRepr> for UpdateValue {
    fn from(repr: UpdateValueRepr) -> Self {
        match repr {
            UpdateValueRepr::Delta { delta } => Self::Delta(delta),
            UpdateValueRepr::Value(v) => Self::Value(v),
        }
    }
}

impl From<UpdateValue> for UpdateValueRepr {
    fn from(value: UpdateValue) -> Self {
        match value {
            UpdateValue::Delta(delta) => Self::Delta { delta },
            UpdateValue::Value(v) => Self::Value(v),
        }
    }
}

impl From<Delta> for UpdateValue {
    fn from(delta: Delta) -> Self {
        Self::Delta(delta)
    }
}

macro_rules! impl_from_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for UpdateValue {
                fn from(v: $ty) -> Self {
                    Self::Value(AttributeValue::from(v))
                }
            }
        )*
    };
}

impl_from_value!(AttributeValue, String, &str, bool, i32, i64, u32, u64, usize, f64);

// ---------------------------------------------------------------------------
// Update map
// ---------------------------------------------------------------------------

/// Insertion-ordered map of attribute name to [`UpdateValue`].
///
/// Clauses are emitted in insertion order. Inserting an existing name
/// replaces its value and keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateMap {
    entries: Vec<(String, UpdateValue)>,
}

impl UpdateMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the previous value for `name`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<UpdateValue>,
    ) -> Option<UpdateValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder-style [`UpdateMap::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<UpdateValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up the value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UpdateValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UpdateValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<UpdateValue>> FromIterator<(K, V)> for UpdateMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for UpdateMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UpdateMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(UpdateMapVisitor)
    }
}

struct UpdateMapVisitor;

impl<'de> Visitor<'de> for UpdateMapVisitor {
    type Value = UpdateMap;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of attribute names to update values")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut map = UpdateMap::new();
        while let Some((name, value)) = access.next_entry::<String, UpdateValue>()? {
            map.insert(name, value);
        }
        Ok(map)
    }
}
