//! Configuration loading with imports and parameters.
//!
//! A configuration file is parsed into a tree, the files named by its
//! `imports` directive are merged beneath it, and `%name%` placeholders are
//! replaced with values from its `parameters` block.
//!
//! ## Merge Strategy
//! - Mappings: deep merge key by key, importing file wins
//! - Everything else (sequences included): importing file replaces
//!
//! ## Placeholders
//! - `%name%` as a whole string: replaced by the parameter value, any type
//! - `%name%` inside text: replaced by the parameter as a string
//! - `%%`: a literal `%`

mod cache;
mod imports;
mod loader;
mod loaders;
mod merge;
mod options;
mod parameters;
mod resolver;

pub use cache::{ConfigCache, FileConfigCache, FileResource};
pub use imports::is_absolute_path;
pub use loader::ConfigLoader;
pub use loaders::{
    DelegatingLoader, FileLoader, JsonFileLoader, TomlFileLoader, YamlFileLoader, default_loaders,
};
pub use merge::{deep_merge, deep_merge_maps, merge};
pub use options::Options;
pub use parameters::{ParameterBag, type_name};
