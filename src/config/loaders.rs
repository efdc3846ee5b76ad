//! File format loaders.
//!
//! Each loader turns a file into a raw [`Value`] tree. The
//! [`DelegatingLoader`] picks the first registered loader that supports a path.

use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Parses one configuration syntax.
pub trait FileLoader: fmt::Debug {
    /// Whether this loader handles `path`.
    fn supports(&self, path: &Path) -> bool;

    /// Parse `path` into a raw tree.
    fn load(&self, path: &Path) -> ConfigResult<Value>;
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

fn read(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
}

/// Loads `.json` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileLoader;

impl FileLoader for JsonFileLoader {
    fn supports(&self, path: &Path) -> bool {
        has_extension(path, &["json"])
    }

    fn load(&self, path: &Path) -> ConfigResult<Value> {
        let content = read(path)?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Loads `.yaml` and `.yml` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFileLoader;

impl FileLoader for YamlFileLoader {
    fn supports(&self, path: &Path) -> bool {
        has_extension(path, &["yaml", "yml"])
    }

    fn load(&self, path: &Path) -> ConfigResult<Value> {
        let content = read(path)?;
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        yaml_to_json(yaml).map_err(|reason| ConfigError::Yaml {
            path: path.to_path_buf(),
            source: <serde_yaml::Error as serde::de::Error>::custom(reason),
        })
    }
}

/// Convert a YAML tree, stringifying scalar mapping keys.
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("unsupported non-finite number: {}", n))?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Null => String::new(),
                    other => return Err(format!("unsupported mapping key: {:?}", other)),
                };
                map.insert(key, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Loads `.toml` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFileLoader;

impl FileLoader for TomlFileLoader {
    fn supports(&self, path: &Path) -> bool {
        has_extension(path, &["toml"])
    }

    fn load(&self, path: &Path) -> ConfigResult<Value> {
        let content = read(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The loaders registered when none are configured.
pub fn default_loaders() -> Vec<Box<dyn FileLoader>> {
    vec![
        Box::new(JsonFileLoader),
        Box::new(YamlFileLoader),
        Box::new(TomlFileLoader),
    ]
}

/// Dispatches to the first loader that supports a path.
#[derive(Debug, Default)]
pub struct DelegatingLoader {
    loaders: Vec<Box<dyn FileLoader>>,
}

impl DelegatingLoader {
    pub fn new(loaders: Vec<Box<dyn FileLoader>>) -> Self {
        Self { loaders }
    }

    pub fn push(&mut self, loader: Box<dyn FileLoader>) {
        self.loaders.push(loader);
    }

    pub fn loaders(&self) -> &[Box<dyn FileLoader>] {
        &self.loaders
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// The first loader supporting `path`, if any.
    pub fn resolve(&self, path: &Path) -> Option<&dyn FileLoader> {
        self.loaders
            .iter()
            .find(|loader| loader.supports(path))
            .map(|loader| loader.as_ref())
    }
}

impl FileLoader for DelegatingLoader {
    fn supports(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    fn load(&self, path: &Path) -> ConfigResult<Value> {
        self.resolve(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?
            .load(path)
    }
}
