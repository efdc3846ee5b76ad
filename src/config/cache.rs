//! Freshness-checked cache for resolved configurations.
//!
//! The cached artifact is the resolved tree serialized as JSON. Alongside it,
//! a `<artifact>.meta` file lists every configuration file that contributed
//! to it, so a stale source can invalidate the cache.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// A file that contributed to a resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResource {
    pub path: PathBuf,
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the file still exists and was not modified after `timestamp`.
    pub fn is_fresh(&self, timestamp: SystemTime) -> bool {
        modified(&self.path).is_some_and(|mtime| mtime <= timestamp)
    }
}

impl fmt::Display for FileResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Storage for a resolved configuration.
pub trait ConfigCache: fmt::Debug {
    /// Whether the stored artifact can be used as is.
    fn is_fresh(&self) -> bool;

    /// Persist `content` along with the resources it was built from.
    fn write(&self, content: &str, resources: &[FileResource]) -> ConfigResult<()>;

    /// Location of the stored artifact.
    fn path(&self) -> &Path;
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    resources: Vec<FileResource>,
}

/// Cache stored as a file on disk.
///
/// Outside debug mode an existing artifact is always fresh. In debug mode the
/// artifact is fresh only while none of its resources changed after it was
/// written.
#[derive(Debug, Clone)]
pub struct FileConfigCache {
    path: PathBuf,
    debug: bool,
}

impl FileConfigCache {
    pub fn new(path: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            path: path.into(),
            debug,
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Path of the resource list written next to the artifact.
    pub fn meta_path(&self) -> PathBuf {
        let mut meta = self.path.clone().into_os_string();
        meta.push(".meta");
        PathBuf::from(meta)
    }

    fn read_meta(&self) -> Option<CacheMeta> {
        let content = std::fs::read_to_string(self.meta_path()).ok()?;
        serde_json::from_str(&content).ok()
    }
}

impl ConfigCache for FileConfigCache {
    fn is_fresh(&self) -> bool {
        let Some(timestamp) = modified(&self.path) else {
            return false;
        };

        if !self.debug {
            return true;
        }

        let Some(meta) = self.read_meta() else {
            debug!(path = %self.path.display(), "Cache metadata missing or unreadable");
            return false;
        };

        match meta.resources.iter().find(|r| !r.is_fresh(timestamp)) {
            Some(stale) => {
                debug!(resource = %stale, "Cache is stale");
                false
            }
            None => true,
        }
    }

    fn write(&self, content: &str, resources: &[FileResource]) -> ConfigResult<()> {
        write_atomic(&self.path, content.as_bytes())?;

        if self.debug {
            let meta = CacheMeta {
                resources: resources.to_vec(),
            };
            let json = serde_json::to_string_pretty(&meta)?;
            write_atomic(&self.meta_path(), json.as_bytes())?;
        }

        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Write through a sibling temp file so readers never see a partial artifact.
fn write_atomic(path: &Path, content: &[u8]) -> ConfigResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.tmp", std::process::id()));
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, content).map_err(|e| ConfigError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ConfigError::io(path, e)
    })
}
