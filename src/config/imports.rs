//! Import directive handling.
//!
//! The imports directive takes one of three shapes:
//!
//! ```yaml
//! imports: base.yml                  # one file, merged at the root
//! imports: [base.yml, local.yml]     # several files, merged in order
//! imports: { database: db.yml }      # nested under the given key
//! ```
//!
//! Values in the importing file win over imported ones. Each import is merged
//! beneath the tree built so far, so earlier imports win over later ones.

use super::loader::ConfigLoader;
use super::merge::merge;
use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

impl ConfigLoader {
    /// Merge every file named by the imports directive of `values`, then drop
    /// the directive.
    pub(super) fn load_imports(
        &mut self,
        mut values: Map<String, Value>,
        original_file: &Path,
    ) -> ConfigResult<Map<String, Value>> {
        let key = self.options().imports_key().to_string();
        let Some(imports) = values.shift_remove(&key) else {
            return Ok(values);
        };

        match imports {
            Value::Null => {}
            Value::String(path) => {
                let imported = self.load_import(&path, original_file)?;
                values = merge(values, imported);
            }
            Value::Array(paths) => {
                for path in paths {
                    let Value::String(path) = path else {
                        return Err(invalid_import(original_file, "import paths must be strings"));
                    };
                    let imported = self.load_import(&path, original_file)?;
                    values = merge(values, imported);
                }
            }
            Value::Object(entries) => {
                for (target, path) in entries {
                    let Value::String(path) = path else {
                        return Err(invalid_import(
                            original_file,
                            format!("import path for \"{}\" must be a string", target),
                        ));
                    };
                    let imported = self.load_import(&path, original_file)?;
                    let mut nested = Map::new();
                    nested.insert(target, Value::Object(imported));
                    values = merge(values, nested);
                }
            }
            Value::Bool(_) | Value::Number(_) => {
                return Err(invalid_import(
                    original_file,
                    format!("\"{}\" must be a path, a list or a mapping", key),
                ));
            }
        }

        Ok(values)
    }

    /// Parse one imported file.
    ///
    /// Absolute paths that exist are used as is; anything else is relative to
    /// the directory of the importing file.
    fn load_import(&mut self, path: &str, original_file: &Path) -> ConfigResult<Map<String, Value>> {
        debug!(import = %path, from = %original_file.display(), "Loading import");

        let candidate = Path::new(path);
        if is_absolute_path(path) && candidate.exists() {
            return self.parse_file(candidate);
        }

        let base = original_file.parent().unwrap_or_else(|| Path::new(""));
        self.parse_file(&base.join(path))
    }
}

fn invalid_import(file: &Path, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidImport {
        file: file.to_path_buf(),
        reason: reason.into(),
    }
}

/// Whether `file` is absolute on any platform, or a URI.
pub fn is_absolute_path(file: &str) -> bool {
    let bytes = file.as_bytes();
    match bytes.first() {
        None => return false,
        Some(b'/' | b'\\') => return true,
        Some(_) => {}
    }

    // C:\ or C:/
    if bytes.len() > 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
    {
        return true;
    }

    has_uri_scheme(file)
}

/// `scheme:rest`, where a purely numeric rest is a port rather than a scheme.
fn has_uri_scheme(file: &str) -> bool {
    let Some((scheme, rest)) = file.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid_scheme && !rest.is_empty() && !rest.bytes().all(|b| b.is_ascii_digit())
}
