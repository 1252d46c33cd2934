use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{FieldError, FormError};

/// Key under which the aggregate flag is serialized next to the field lists.
pub const IS_ERROR_KEY: &str = "isError";

/// Violations for a single field, in constraint registration order.
pub type FieldErrorList = Vec<FieldError>;

// ─── FieldState ─────────────────────────────────────────────────────────────

/// Current values of every field, in definition order.
///
/// Backed by an insertion-ordered JSON map. Replacing a value keeps the
/// field's original position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldState(Map<String, Value>);

impl FieldState {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Builder-style insert, handy for assembling initial state.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub(crate) fn replace(&mut self, field: &str, value: Value) {
        if let Some(slot) = self.0.get_mut(field) {
            *slot = value;
        }
    }
}

impl From<Map<String, Value>> for FieldState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for FieldState {
    type Error = FormError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(FormError::NotAnObject {
                found: value_kind(&other),
            }),
        }
    }
}

pub(crate) fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─── FormErrors ─────────────────────────────────────────────────────────────

/// Per-field violation lists plus the aggregate `is_error` flag.
///
/// The set of fields is fixed when the value is created; lists can only be
/// replaced for fields that already exist. `is_error` is recomputed every
/// time a list changes and has no setter of its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormErrors {
    is_error: bool,
    fields: Vec<(String, FieldErrorList)>,
}

impl FormErrors {
    /// All-empty state for the given fields.
    pub fn empty<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_error: false,
            fields: names
                .into_iter()
                .map(|n| (n.into(), FieldErrorList::new()))
                .collect(),
        }
    }

    /// Assemble from complete per-field lists. Duplicate names keep the last
    /// list at the first position.
    pub fn from_lists<I, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldErrorList)>,
        S: Into<String>,
    {
        let mut out = Self {
            is_error: false,
            fields: Vec::new(),
        };
        for (name, list) in lists {
            let name = name.into();
            match out.fields.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = list,
                None => out.fields.push((name, list)),
            }
        }
        out.recompute();
        out
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn field(&self, name: &str) -> Option<&[FieldError]> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, list)| list.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.fields.iter().map(|(n, l)| (n.as_str(), l.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of `self` with `name`'s list replaced and the aggregate
    /// recomputed. Unknown names leave the copy unchanged.
    pub fn with_field(&self, name: &str, list: FieldErrorList) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.fields.iter_mut().find(|(n, _)| n == name) {
            slot.1 = list;
            next.recompute();
        }
        next
    }

    /// Total number of violations across all fields.
    pub fn count(&self) -> usize {
        self.fields.iter().map(|(_, l)| l.len()).sum()
    }

    fn recompute(&mut self) {
        self.is_error = self.fields.iter().any(|(_, l)| !l.is_empty());
    }
}

impl Serialize for FormErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(IS_ERROR_KEY, &self.is_error)?;
        for (name, list) in &self.fields {
            map.serialize_entry(name, list)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FormErrors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FormErrorsVisitor;

        impl<'de> Visitor<'de> for FormErrorsVisitor {
            type Value = FormErrors;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to error lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FormErrors, A::Error> {
                let mut lists = Vec::new();
                let mut flag = None;
                while let Some(key) = access.next_key::<String>()? {
                    if key == IS_ERROR_KEY {
                        flag = Some(access.next_value::<bool>()?);
                    } else {
                        lists.push((key, access.next_value::<FieldErrorList>()?));
                    }
                }
                let errors = FormErrors::from_lists(lists);
                // The flag is derived; a stored value that disagrees is corrupt.
                if let Some(flag) = flag
                    && flag != errors.is_error
                {
                    return Err(de::Error::custom(format!(
                        "{} is {} but the field lists say {}",
                        IS_ERROR_KEY, flag, errors.is_error
                    )));
                }
                Ok(errors)
            }
        }

        deserializer.deserialize_map(FormErrorsVisitor)
    }
}
