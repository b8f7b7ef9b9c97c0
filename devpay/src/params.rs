//! Request parameters and the nested-to-flat form transform.
//!
//! The API takes `application/x-www-form-urlencoded` bodies, so nested maps
//! are written in bracket notation:
//!
//! ```text
//! {"amount": 2000, "card": {"number": "4242", "exp_month": 10}}
//!   => amount=2000&card[number]=4242&card[exp_month]=10
//! ```
//!
//! # Examples
//!
//! ```
//! use devpay::params::Params;
//! use serde_json::json;
//!
//! let params = Params::new()
//!     .set("amount", 2000)
//!     .set("currency", "usd")
//!     .set("card", json!({"number": "4242424242424242", "exp_month": 10}));
//!
//! let mut pairs = params.to_form_pairs();
//! pairs.sort();
//! assert_eq!(pairs[0], ("amount".to_owned(), "2000".to_owned()));
//! assert_eq!(pairs[1], ("card[exp_month]".to_owned(), "10".to_owned()));
//! assert_eq!(pairs[2], ("card[number]".to_owned(), "4242424242424242".to_owned()));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DevPayError, Result};

/// Untyped request parameters.
///
/// Values may be nested maps; they are flattened just before encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Adds a parameter, builder style.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Inserts a parameter, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a parameter.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true if `key` is present (even with a `null` value).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the parameters, returning the underlying map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Checks that every key in `required` is present.
    ///
    /// # Errors
    ///
    /// Returns [`DevPayError::MissingParameter`] naming the first absent key.
    pub fn require(&self, required: &[&str]) -> Result<()> {
        match required.iter().find(|key| !self.0.contains_key(**key)) {
            Some(missing) => Err(DevPayError::MissingParameter((*missing).to_owned())),
            None => Ok(()),
        }
    }

    /// Flattens nested maps into bracket-notation keys. See [`flatten`].
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, Value)> {
        flatten(&self.0)
    }

    /// Flattens and renders every value as a form string. See [`to_form_pairs`].
    #[must_use]
    pub fn to_form_pairs(&self) -> Vec<(String, String)> {
        to_form_pairs(&self.0)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Params {
    type Error = DevPayError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DevPayError::InvalidInput(format!(
                "parameters must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Flattens nested maps into `outer[inner]` keys, recursively.
///
/// Non-map values, arrays included, pass through unchanged. Empty nested maps
/// contribute no pairs. The order of the result follows map iteration order
/// and carries no meaning.
#[must_use]
pub fn flatten(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::with_capacity(map.len());
    flatten_into(None, map, &mut out);
    out
}

fn flatten_into(prefix: Option<&str>, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let key = match prefix {
            Some(outer) => format!("{outer}[{key}]"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_into(Some(&key), inner, out),
            other => out.push((key, other.clone())),
        }
    }
}

/// Flattens `map` and renders each value as a form field string.
///
/// - strings are sent verbatim
/// - numbers and booleans use their JSON text
/// - `null` becomes the empty string
/// - arrays become one `key[]` field per element
#[must_use]
pub fn to_form_pairs(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in flatten(map) {
        match value {
            Value::Array(items) => {
                let key = format!("{key}[]");
                pairs.extend(items.iter().map(|item| (key.clone(), render_value(item))));
            }
            other => pairs.push((key, render_value(&other))),
        }
    }
    pairs
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}


#[cfg(test)]
mod proptest_flatten {
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    use super::flatten;

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(|n| json!(n)),
            any::<bool>().prop_map(Value::Bool),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ]
    }

    fn nested() -> impl Strategy<Value = Value> {
        leaf().prop_recursive(4, 32, 4, |inner| {
            prop::collection::btree_map("[a-z_]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        })
    }

    fn top_level() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::btree_map("[a-z_]{1,6}", nested(), 0..6)
            .prop_map(|m| m.into_iter().collect())
    }

    fn count_leaves(value: &Value) -> usize {
        match value {
            Value::Object(map) => map.values().map(count_leaves).sum(),
            _ => 1,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_flatten_leaves_no_objects(map in top_level()) {
            for (_, value) in flatten(&map) {
                prop_assert!(!value.is_object());
            }
        }

        #[test]
        fn test_flatten_preserves_leaf_count(map in top_level()) {
            let expected: usize = map.values().map(count_leaves).sum();
            prop_assert_eq!(flatten(&map).len(), expected);
        }

        #[test]
        fn test_flatten_keys_are_unique_bracket_paths(map in top_level()) {
            let pairs = flatten(&map);
            let mut seen = std::collections::HashSet::new();
            for (key, _) in &pairs {
                prop_assert!(seen.insert(key.clone()), "duplicate key {}", key);
                let root = key.split('[').next().unwrap_or_default();
                prop_assert!(map.contains_key(root));
                prop_assert_eq!(key.matches('[').count(), key.matches(']').count());
            }
        }
    }
}
