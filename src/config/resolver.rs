//! Placeholder resolution over the parameter table.
//!
//! A string that is exactly one `%name%` placeholder is replaced by the
//! parameter value itself, keeping its type. Placeholders embedded in longer
//! text are replaced by the parameter's string form, which only strings and
//! numbers have. `%%` is an escaped percent sign and is left for
//! [`ParameterBag::unescape_value`] to collapse.
//!
//! Cycles are caught with an explicit resolving set: the keys currently being
//! substituted on the path from the original value, in visiting order.

use super::parameters::{ParameterBag, type_name};
use crate::error::{ConfigError, ConfigResult};
use regex_lite::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;

static FULL_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^%([^%\s]+)%$").expect("valid placeholder regex"));

static PLACEHOLDER_OR_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%%|%([^%\s]+)%").expect("valid placeholder regex"));

impl ParameterBag {
    /// Replace placeholders anywhere inside `value`.
    ///
    /// `resolving` holds the keys already being resolved by the caller; pass
    /// `&[]` from outside.
    pub fn resolve_value(&self, value: &Value, resolving: &[String]) -> ConfigResult<Value> {
        match value {
            Value::Object(map) => {
                let mut resolved = Map::with_capacity(map.len());
                for (key, item) in map {
                    let key = self.resolve_key(key, resolving)?;
                    resolved.insert(key, self.resolve_value(item, resolving)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, resolving))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::Array),
            Value::String(s) => self.resolve_string(s, resolving),
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
        }
    }

    /// Replace placeholders in a single string.
    ///
    /// Returns the parameter value unchanged in type for a full match, and a
    /// string otherwise.
    pub fn resolve_string(&self, value: &str, resolving: &[String]) -> ConfigResult<Value> {
        if let Some(key) = FULL_PLACEHOLDER
            .captures(value)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
        {
            let resolving = enter(key, resolving)?;
            let parameter = self.get(key)?;
            return if self.is_resolved() {
                Ok(parameter.clone())
            } else {
                self.resolve_value(parameter, &resolving)
            };
        }

        self.resolve_inside_string(value, resolving)
            .map(Value::String)
    }

    fn resolve_inside_string(&self, value: &str, resolving: &[String]) -> ConfigResult<String> {
        let mut result = String::with_capacity(value.len());
        let mut last = 0;

        for caps in PLACEHOLDER_OR_ESCAPE.captures_iter(value) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            result.push_str(&value[last..whole.start()]);
            last = whole.end();

            // %% stays escaped
            let Some(key) = caps.get(1).map(|m| m.as_str()) else {
                result.push_str("%%");
                continue;
            };

            if resolving.iter().any(|k| k == key) {
                return Err(circular(key, resolving));
            }

            let parameter = self.get(key)?;
            let text = interpolated(parameter, key, value)?;

            if self.is_resolved() {
                result.push_str(&text);
            } else {
                let mut nested = resolving.to_vec();
                nested.push(key.to_string());
                let resolved = self.resolve_string(&text, &nested)?;
                result.push_str(&interpolated(&resolved, key, value)?);
            }
        }

        result.push_str(&value[last..]);
        Ok(result)
    }

    /// Resolve a mapping key, which must come out as a string or a number.
    pub fn resolve_key(&self, key: &str, resolving: &[String]) -> ConfigResult<String> {
        let resolved = self.resolve_string(key, resolving)?;
        // Only a full placeholder can yield a non-string
        let name = FULL_PLACEHOLDER
            .captures(key)
            .and_then(|caps| caps.get(1))
            .map_or(key, |m| m.as_str());
        interpolated(&resolved, name, key)
    }
}

/// Push `key` onto a copy of the resolving set, failing if it is already there.
fn enter(key: &str, resolving: &[String]) -> ConfigResult<Vec<String>> {
    if resolving.iter().any(|k| k == key) {
        return Err(circular(key, resolving));
    }
    let mut nested = resolving.to_vec();
    nested.push(key.to_string());
    Ok(nested)
}

fn circular(key: &str, resolving: &[String]) -> ConfigError {
    let mut chain = resolving.to_vec();
    chain.push(key.to_string());
    ConfigError::CircularReference { chain }
}

/// String form of a value embedded in a larger string.
fn interpolated(value: &Value, key: &str, containing: &str) -> ConfigResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(number_text(n)),
        other => Err(ConfigError::InterpolationType {
            key: key.to_string(),
            found: type_name(other),
            value: containing.to_string(),
        }),
    }
}

/// Integral floats drop their fraction: `2.0` reads as `2`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
