//! Ordered attribute maps attached to telemetry records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered mapping from attribute keys to decoded JSON values.
///
/// Keys are case-sensitive and unique, and keep the order in which they were
/// decoded. Absence of a key is distinct from a key holding an explicit
/// `null`.
///
/// # Example
///
/// ```
/// use shared::models::AttributeMap;
///
/// let tags = AttributeMap::new()
///     .with("http.request.method", "GET")
///     .with("http.response.status_code", 200);
///
/// assert_eq!(tags.get_string("http.request.method"), Some("GET".to_string()));
/// assert_eq!(tags.get_string("http.response.status_code"), Some("200".to_string()));
/// assert_eq!(tags.get_string("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(Map<String, Value>);

impl AttributeMap {
    /// Creates an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true if the key is present, regardless of its value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the value for a key in its string form.
    ///
    /// Scalar values coerce to their text representation (numbers and bools
    /// included); `null`, arrays, and objects yield `None`.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        scalar_to_string(self.0.get(key)?)
    }

    /// Returns the string form of a value, or the default when the key is
    /// absent or not a scalar.
    #[must_use]
    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Returns an integer value for a key.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key)?.as_i64()
    }

    /// Returns a floating-point value for a key.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key)?.as_f64()
    }

    /// Returns a boolean value for a key.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key)?.as_bool()
    }

    /// Flattens the scalar-valued entries into a string map, preserving key
    /// order and dropping nested and collection values.
    #[must_use]
    pub fn primitive_values(&self) -> IndexMap<String, String> {
        self.0
            .iter()
            .filter_map(|(key, value)| Some((key.clone(), scalar_to_string(value)?)))
            .collect()
    }

    /// Iterates over all entries in decoded order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Adds an attribute, returning the map for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.0.insert(
            key.into(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
        self
    }
}

impl From<Map<String, Value>> for AttributeMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_string_coerces_scalars() {
        let map = AttributeMap::new()
            .with("text", "hello")
            .with("count", 42)
            .with("ratio", 1.5)
            .with("flag", true);

        assert_eq!(map.get_string("text"), Some("hello".to_string()));
        assert_eq!(map.get_string("count"), Some("42".to_string()));
        assert_eq!(map.get_string("ratio"), Some("1.5".to_string()));
        assert_eq!(map.get_string("flag"), Some("true".to_string()));
    }

    #[test]
    fn test_get_string_rejects_non_scalars() {
        let map = AttributeMap::new()
            .with("nested", json!({"a": 1}))
            .with("list", json!([1, 2]))
            .with("nothing", Value::Null);

        assert_eq!(map.get_string("nested"), None);
        assert_eq!(map.get_string("list"), None);
        assert_eq!(map.get_string("nothing"), None);
        assert_eq!(map.get_string("missing"), None);
    }

    #[test]
    fn test_present_null_is_distinct_from_absence() {
        let map = AttributeMap::new().with("nothing", Value::Null);

        assert!(map.contains_key("nothing"));
        assert!(!map.contains_key("missing"));
    }

    #[test]
    fn test_get_string_or_default() {
        let map = AttributeMap::new().with("key", "value");

        assert_eq!(map.get_string_or("key", "fallback"), "value");
        assert_eq!(map.get_string_or("missing", "fallback"), "fallback");
        assert_eq!(map.get_string_or("missing", ""), "");
    }

    #[test]
    fn test_typed_accessors() {
        let map = AttributeMap::new()
            .with("count", 42)
            .with("ratio", 1.5)
            .with("flag", false);

        assert_eq!(map.get_i64("count"), Some(42));
        assert_eq!(map.get_f64("ratio"), Some(1.5));
        assert_eq!(map.get_bool("flag"), Some(false));
        assert_eq!(map.get_i64("ratio"), None);
        assert_eq!(map.get_bool("count"), None);
    }

    #[test]
    fn test_primitive_values_drops_nested() {
        let map = AttributeMap::new()
            .with("first", "a")
            .with("nested", json!({"x": 1}))
            .with("second", 2);

        let primitives = map.primitive_values();

        assert_eq!(primitives.len(), 2);
        assert_eq!(primitives.get("first"), Some(&"a".to_string()));
        assert_eq!(primitives.get("second"), Some(&"2".to_string()));
    }

    #[test]
    fn test_primitive_values_preserves_order() {
        let map = AttributeMap::new()
            .with("z", 1)
            .with("a", 2)
            .with("m", 3);

        let primitives = map.primitive_values();
        let keys: Vec<&str> = primitives.keys().map(String::as_str).collect();

        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_deserialization_preserves_order() {
        let map: AttributeMap =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mu": 3}"#).unwrap();

        let keys: Vec<&str> = map.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let first = AttributeMap::new().with("a", 1).with("b", 2);
        let second = AttributeMap::new().with("b", 2).with("a", 1);

        assert_eq!(first, second);
    }
}
