//! Flat parameter table backing `%name%` placeholders.

use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use tracing::debug;

/// Parameter table.
///
/// Holds raw parameter values until [`ParameterBag::resolve`] is called, after
/// which every stored value is fully substituted and unescaped. Resolution is
/// memoized: further calls are no-ops until the bag is cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    parameters: Map<String, Value>,
    resolved: bool,
}

impl ParameterBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag holding every entry of `parameters`.
    pub fn from_map(parameters: Map<String, Value>) -> Self {
        let mut bag = Self::new();
        bag.add(parameters);
        bag
    }

    /// Set every entry of `parameters`, in order.
    pub fn add(&mut self, parameters: Map<String, Value>) {
        for (name, value) in parameters {
            self.set(name, value);
        }
    }

    /// All parameters.
    pub fn all(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Remove every parameter. The bag is unresolved afterwards.
    pub fn clear(&mut self) {
        self.parameters.clear();
        self.resolved = false;
    }

    /// Get a parameter.
    pub fn get(&self, name: &str) -> ConfigResult<&Value> {
        self.parameters
            .get(name)
            .ok_or_else(|| ConfigError::not_found(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.parameters.shift_remove(name)
    }

    /// Set a parameter, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.parameters.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Replace placeholders in every parameter.
    ///
    /// On error the bag keeps its raw values and stays unresolved.
    pub fn resolve(&mut self) -> ConfigResult<()> {
        if self.resolved {
            return Ok(());
        }

        let mut parameters = Map::with_capacity(self.parameters.len());
        for (name, value) in &self.parameters {
            let value = self.resolve_value(value, &[])?;
            parameters.insert(name.clone(), Self::unescape_value(value));
        }

        debug!(count = parameters.len(), "Resolved parameters");
        self.parameters = parameters;
        self.resolved = true;
        Ok(())
    }

    /// Double every `%` in the strings reachable from `value`.
    pub fn escape_value(value: Value) -> Value {
        map_strings(value, &|s| s.replace('%', "%%"))
    }

    /// Collapse every `%%` in the strings reachable from `value`.
    pub fn unescape_value(value: Value) -> Value {
        map_strings(value, &|s| s.replace("%%", "%"))
    }
}

fn map_strings(value: Value, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| map_strings(v, f)).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, map_strings(v, f)))
                .collect(),
        ),
        other => other,
    }
}

/// Name of a value's type, as reported in interpolation errors.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> ParameterBag {
        match value {
            Value::Object(map) => ParameterBag::from_map(map),
            _ => panic!("expected a mapping"),
        }
    }

    #[test]
    fn test_set_overwrites() {
        let mut params = ParameterBag::new();
        params.set("name", json!("first"));
        params.set("name", json!("second"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("name").unwrap(), &json!("second"));
    }

    #[test]
    fn test_add_preserves_order() {
        let params = bag(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<_> = params.all().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_get_missing_parameter() {
        let params = ParameterBag::new();
        match params.get("missing") {
            Err(ConfigError::ParameterNotFound { key }) => assert_eq!(key, "missing"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_has_and_remove() {
        let mut params = bag(json!({"a": 1, "b": 2}));
        assert!(params.has("a"));
        assert_eq!(params.remove("a"), Some(json!(1)));
        assert!(!params.has("a"));
        assert_eq!(params.remove("a"), None);
        assert!(params.has("b"));
    }

    #[test]
    fn test_clear_resets_resolved() {
        let mut params = bag(json!({"a": "x"}));
        params.resolve().unwrap();
        assert!(params.is_resolved());

        params.clear();
        assert!(params.is_empty());
        assert!(!params.is_resolved());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut params = bag(json!({
            "percent": "100%%",
            "alias": "%percent%",
            "sentence": "It is %percent% done"
        }));
        params.resolve().unwrap();
        let once = params.clone();
        params.resolve().unwrap();
        assert_eq!(params, once);
        assert_eq!(params.get("percent").unwrap(), &json!("100%"));
        assert_eq!(params.get("alias").unwrap(), &json!("100%"));
        assert_eq!(params.get("sentence").unwrap(), &json!("It is 100% done"));
    }

    #[test]
    fn test_failed_resolve_leaves_bag_unresolved() {
        let mut params = bag(json!({"a": "%missing%"}));
        assert!(params.resolve().is_err());
        assert!(!params.is_resolved());
        assert_eq!(params.get("a").unwrap(), &json!("%missing%"));
    }

    #[test]
    fn test_escape_round_trip() {
        let original = json!({
            "rate": "50% off",
            "list": ["%a%", "100%%", 3, null],
            "nested": {"flag": true, "text": "%%%"}
        });
        let escaped = ParameterBag::escape_value(original.clone());
        assert_eq!(escaped["rate"], json!("50%% off"));
        assert_eq!(escaped["list"][1], json!("100%%%%"));
        assert_eq!(ParameterBag::unescape_value(escaped), original);
    }

    #[test]
    fn test_escape_leaves_non_strings() {
        assert_eq!(ParameterBag::escape_value(json!(42)), json!(42));
        assert_eq!(ParameterBag::unescape_value(json!(false)), json!(false));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_name(&json!(null)), "null");
        assert_eq!(type_name(&json!(true)), "boolean");
        assert_eq!(type_name(&json!(1)), "integer");
        assert_eq!(type_name(&json!(1.5)), "double");
        assert_eq!(type_name(&json!([1])), "array");
        assert_eq!(type_name(&json!({"a": 1})), "mapping");
    }
}
