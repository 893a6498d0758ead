//! Attribute payloads.
//!
//! [`Values`] is an ordered name -> value mapping. Three states are kept
//! apart and must never be conflated:
//!
//! - *absent*: the name was never set; it is omitted from the wire payload
//!   and from generated XML
//! - *explicitly empty list*: present, renders as `[]`
//! - *explicit scalar*: present, including `false`, `0` and `""`
//!
//! The `*_optional` builders take an [`Option`]; `None` is the only thing
//! that omits a value.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Text value.
    String(String),
    /// Integral value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
}

impl Scalar {
    /// Wire form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Int(i) => Value::Number(Number::from(*i)),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A value in a payload: scalar, list of scalars, or nested payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValue {
    /// Single scalar.
    Scalar(Scalar),
    /// List of scalars; may be empty.
    List(Vec<Scalar>),
    /// Nested payload.
    Object(Values),
}

impl ModelValue {
    /// Text of a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean scalar, also accepting the strings `true`/`false`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(b)) => Some(*b),
            Self::Scalar(Scalar::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Integral scalar, also accepting numeric strings.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Scalar(Scalar::Int(i)) => Some(*i),
            Self::Scalar(Scalar::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Items of a list value.
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Nested payload of an object value.
    pub fn as_object(&self) -> Option<&Values> {
        match self {
            Self::Object(values) => Some(values),
            _ => None,
        }
    }

    /// Wire form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(s) => s.to_json(),
            Self::List(items) => Value::Array(items.iter().map(Scalar::to_json).collect()),
            Self::Object(values) => values.to_json(),
        }
    }
}

impl fmt::Display for ModelValue {
    /// Text used for XML attributes and element bodies.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::List(items) => {
                let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", joined.join(","))
            }
            Self::Object(values) => write!(f, "{}", values.to_json()),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }

            impl From<$ty> for ModelValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

scalar_from! {
    &str => |v| Scalar::String(v.to_string()),
    String => |v| Scalar::String(v),
    &String => |v| Scalar::String(v.clone()),
    bool => |v| Scalar::Bool(v),
    i32 => |v| Scalar::Int(i64::from(v)),
    i64 => |v| Scalar::Int(v),
    u32 => |v| Scalar::Int(i64::from(v)),
}

impl From<Scalar> for ModelValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Values> for ModelValue {
    fn from(value: Values) -> Self {
        Self::Object(value)
    }
}

/// Ordered attribute payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values {
    entries: Vec<(String, ModelValue)>,
}

impl Values {
    /// A payload with no attributes.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a nested payload from a string map; `None` yields an empty payload.
    pub fn from_map(map: Option<&BTreeMap<String, String>>) -> Self {
        map.into_iter()
            .flatten()
            .fold(Self::empty(), |values, (key, value)| values.and(key, value))
    }

    /// Always include `name`.
    ///
    /// Setting a name that is already present replaces its value and keeps
    /// its original position.
    pub fn and(mut self, name: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.set(name.into(), value.into());
        self
    }

    /// Include `name` unless `value` is `None`.
    pub fn and_optional<T: Into<ModelValue>>(self, name: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(value) => self.and(name, value),
            None => self,
        }
    }

    /// Include a nested payload unless it is `None` or empty.
    pub fn and_object_optional(self, name: impl Into<String>, nested: Option<Values>) -> Self {
        match nested {
            Some(nested) if !nested.is_empty() => self.and(name, nested),
            _ => self,
        }
    }

    /// Always include a list, even an empty one.
    pub fn and_list<T, I>(self, name: impl Into<String>, items: I) -> Self
    where
        T: Into<Scalar>,
        I: IntoIterator<Item = T>,
    {
        let list = items.into_iter().map(Into::into).collect();
        self.and(name, ModelValue::List(list))
    }

    /// Include a list unless it is `None`; `Some(vec![])` is included.
    pub fn and_list_optional<T: Into<Scalar>>(
        self,
        name: impl Into<String>,
        items: Option<Vec<T>>,
    ) -> Self {
        match items {
            Some(items) => self.and_list(name, items),
            None => self,
        }
    }

    /// A new payload with `other` layered on top: keys in `other` win.
    ///
    /// Neither `self` nor `other` is modified.
    #[must_use]
    pub fn merge(&self, other: &Values) -> Values {
        let mut merged = self.clone();
        for (name, value) in &other.entries {
            merged.set(name.clone(), value.clone());
        }
        merged
    }

    /// Value of `name`, `None` when absent.
    pub fn get(&self, name: &str) -> Option<&ModelValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no attribute is present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Wire form: a JSON object.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.entries {
            object.insert(name.clone(), value.to_json());
        }
        Value::Object(object)
    }

    fn set(&mut self, name: String, value: ModelValue) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }
}
