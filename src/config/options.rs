//! Options controlling how the loader treats directives.

use serde::{Deserialize, Serialize};

/// Loader options.
///
/// Every field has a default, so an options block can be deserialized from a
/// partial YAML/JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Follow the imports directive.
    pub enable_imports: bool,

    /// Register and resolve the parameters block.
    pub enable_parameters: bool,

    /// Whether consumers should register services from the configuration.
    /// Nothing in the loader itself depends on it.
    pub enable_services: bool,

    /// Key of the imports directive.
    pub imports_key: String,

    /// Key of the parameters block.
    pub parameters_key: String,

    /// Whether consumers should receive the parameter bag rather than a raw map.
    pub use_parameter_bag: bool,

    /// Keep the parameter bag between `load` calls instead of starting empty.
    pub reuse_parameters: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enable_imports: true,
            enable_parameters: true,
            enable_services: true,
            imports_key: default_imports_key(),
            parameters_key: default_parameters_key(),
            use_parameter_bag: true,
            reuse_parameters: false,
        }
    }
}

fn default_imports_key() -> String {
    "imports".to_string()
}

fn default_parameters_key() -> String {
    "parameters".to_string()
}

impl Options {
    pub fn imports_enabled(&self) -> bool {
        self.enable_imports
    }

    pub fn set_enable_imports(&mut self, enabled: bool) -> &mut Self {
        self.enable_imports = enabled;
        self
    }

    pub fn parameters_enabled(&self) -> bool {
        self.enable_parameters
    }

    pub fn set_enable_parameters(&mut self, enabled: bool) -> &mut Self {
        self.enable_parameters = enabled;
        self
    }

    pub fn services_enabled(&self) -> bool {
        self.enable_services
    }

    pub fn set_enable_services(&mut self, enabled: bool) -> &mut Self {
        self.enable_services = enabled;
        self
    }

    pub fn imports_key(&self) -> &str {
        &self.imports_key
    }

    pub fn set_imports_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.imports_key = key.into();
        self
    }

    pub fn parameters_key(&self) -> &str {
        &self.parameters_key
    }

    pub fn set_parameters_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.parameters_key = key.into();
        self
    }

    /// Parameter bag usage only applies when parameters are enabled at all.
    pub fn use_parameter_bag(&self) -> bool {
        self.enable_parameters && self.use_parameter_bag
    }

    pub fn set_use_parameter_bag(&mut self, enabled: bool) -> &mut Self {
        self.use_parameter_bag = enabled;
        self
    }

    pub fn reuse_parameters(&self) -> bool {
        self.reuse_parameters
    }

    pub fn set_reuse_parameters(&mut self, enabled: bool) -> &mut Self {
        self.reuse_parameters = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(options.imports_enabled());
        assert!(options.parameters_enabled());
        assert!(options.services_enabled());
        assert_eq!(options.imports_key(), "imports");
        assert_eq!(options.parameters_key(), "parameters");
        assert!(options.use_parameter_bag());
        assert!(!options.reuse_parameters());
    }

    #[test]
    fn test_parameter_bag_requires_parameters() {
        let mut options = Options::default();
        options.set_enable_parameters(false);
        assert!(!options.use_parameter_bag());
    }

    #[test]
    fn test_chained_setters() {
        let mut options = Options::default();
        options
            .set_imports_key("include")
            .set_parameters_key("vars")
            .set_enable_services(false);
        assert_eq!(options.imports_key(), "include");
        assert_eq!(options.parameters_key(), "vars");
        assert!(!options.services_enabled());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let options: Options = serde_yaml::from_str("imports_key: include\n").unwrap();
        assert_eq!(options.imports_key(), "include");
        assert_eq!(options.parameters_key(), "parameters");
        assert!(options.imports_enabled());
    }
}
