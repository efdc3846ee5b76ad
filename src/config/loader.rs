//! Configuration loader.
//!
//! Parses a file, follows its imports, registers its parameters block and
//! substitutes placeholders across the whole tree. With a cache attached, the
//! resolved tree is persisted and served from the cache while it is fresh.

use super::cache::{ConfigCache, FileConfigCache, FileResource};
use super::loaders::{DelegatingLoader, FileLoader, default_loaders};
use super::options::Options;
use super::parameters::ParameterBag;
use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads and resolves configuration files.
///
/// A loader owns its parameter bag, options and resource list; `load` takes
/// `&mut self`, so one loader serves one call at a time.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Optional cache for resolved configurations
    cache: Option<Box<dyn ConfigCache>>,
    /// Format loaders; the defaults are appended after these on first use
    loader: DelegatingLoader,
    loader_initialized: bool,
    options: Options,
    parameters: ParameterBag,
    /// Files that contributed to the last load
    resources: Vec<FileResource>,
    /// Files currently being parsed, outermost first
    importing: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader without a cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader caching resolved configurations at `cache_path`.
    pub fn with_cache(cache_path: impl Into<PathBuf>, debug: bool) -> Self {
        let mut loader = Self::new();
        loader.set_cache(Box::new(FileConfigCache::new(cache_path, debug)));
        loader
    }

    /// Load a configuration, from the cache when it is fresh.
    pub fn load(&mut self, file: impl AsRef<Path>) -> ConfigResult<Value> {
        let file = file.as_ref();
        self.resources.clear();
        if !self.options.reuse_parameters() {
            self.parameters.clear();
        }

        let Some(cache) = self.cache.take() else {
            return self.load_file(file);
        };
        let result = self.load_cached(file, cache.as_ref());
        self.cache = Some(cache);
        result
    }

    fn load_cached(&mut self, file: &Path, cache: &dyn ConfigCache) -> ConfigResult<Value> {
        if cache.is_fresh() {
            debug!(file = %file.display(), "Configuration cache is fresh");
        } else {
            let configuration = self.load_file(file)?;
            self.write_cache(cache, &configuration)?;
        }

        read_cached(cache.path())
    }

    /// Write a resolved configuration to the cache, if one is set.
    pub fn export(&self, configuration: &Value) -> ConfigResult<()> {
        match &self.cache {
            Some(cache) => self.write_cache(cache.as_ref(), configuration),
            None => Ok(()),
        }
    }

    fn write_cache(&self, cache: &dyn ConfigCache, configuration: &Value) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(configuration)?;
        cache.write(&content, &self.resources)?;
        info!(
            path = %cache.path().display(),
            resources = self.resources.len(),
            "Wrote configuration cache"
        );
        Ok(())
    }

    /// Parse a file and resolve its parameters, bypassing the cache.
    pub fn load_file(&mut self, file: &Path) -> ConfigResult<Value> {
        self.init_loader();
        let mut configuration = self.parse_file(file)?;

        if self.options.parameters_enabled() {
            let key = self.options.parameters_key();
            match configuration.get(key) {
                Some(Value::Object(parameters)) => {
                    self.parameters.add(parameters.clone());
                    self.parameters.resolve()?;
                }
                Some(Value::Null) | None => {}
                Some(_) => {
                    return Err(ConfigError::InvalidParameters {
                        key: key.to_string(),
                    });
                }
            }

            configuration = self.resolve(configuration)?;
        }

        Ok(Value::Object(configuration))
    }

    /// Parse a file and everything it imports.
    pub(super) fn parse_file(&mut self, file: &Path) -> ConfigResult<Map<String, Value>> {
        let identity = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
        if self.importing.contains(&identity) {
            let mut chain = self.importing.clone();
            chain.push(identity);
            return Err(ConfigError::ImportCycle { chain });
        }

        self.importing.push(identity);
        let result = self.parse_file_inner(file);
        self.importing.pop();
        result
    }

    fn parse_file_inner(&mut self, file: &Path) -> ConfigResult<Map<String, Value>> {
        debug!(file = %file.display(), "Parsing configuration file");

        let mut values = match self.loader.load(file)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(ConfigError::NotAMapping(file.to_path_buf())),
        };

        if !values.is_empty() && self.options.imports_enabled() {
            values = self.load_imports(values, file)?;
        }

        self.resources.push(FileResource::new(file));
        Ok(values)
    }

    /// Substitute parameters across the whole tree.
    fn resolve(&self, configuration: Map<String, Value>) -> ConfigResult<Map<String, Value>> {
        let mut values = Map::with_capacity(configuration.len());
        for (key, value) in configuration {
            let key = self.parameters.resolve_key(&key, &[])?;
            let value = self.parameters.resolve_value(&value, &[])?;
            values.insert(key, ParameterBag::unescape_value(value));
        }
        Ok(values)
    }

    /// Append the JSON, YAML and TOML loaders behind any registered ones, once.
    fn init_loader(&mut self) {
        if self.loader_initialized {
            return;
        }
        for loader in default_loaders() {
            self.loader.push(loader);
        }
        self.loader_initialized = true;
    }

    pub fn cache(&self) -> Option<&dyn ConfigCache> {
        self.cache.as_deref()
    }

    pub fn set_cache(&mut self, cache: Box<dyn ConfigCache>) {
        self.cache = Some(cache);
    }

    /// Registered format loaders.
    pub fn loaders(&self) -> &[Box<dyn FileLoader>] {
        self.loader.loaders()
    }

    /// Register a format loader. Earlier loaders take precedence.
    pub fn add_loader(&mut self, loader: Box<dyn FileLoader>) -> &mut Self {
        self.loader.push(loader);
        self
    }

    pub fn set_loaders(&mut self, loaders: Vec<Box<dyn FileLoader>>) {
        self.loader = DelegatingLoader::new(loaders);
        self.loader_initialized = false;
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    pub fn parameters(&self) -> &ParameterBag {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterBag {
        &mut self.parameters
    }

    /// Files parsed during the last load, imports before their importer.
    pub fn resources(&self) -> &[FileResource] {
        &self.resources
    }
}

fn read_cached(path: &Path) -> ConfigResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}
