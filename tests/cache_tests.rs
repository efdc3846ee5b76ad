//! Integration tests for loading through the configuration cache.

use paramconf::config::{ConfigCache, ConfigLoader, FileConfigCache};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Backdate a file so a cache written afterwards is strictly newer.
fn set_mtime(path: &Path, time: SystemTime) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

#[test]
fn test_cache_miss_writes_resolved_artifact() {
    let temp = TempDir::new().unwrap();
    let app = write(
        temp.path(),
        "app.yml",
        "parameters:\n  name: app\ntitle: \"%name% server\"\n",
    );
    let cache_path = temp.path().join("var/cache/config.json");

    let mut loader = ConfigLoader::with_cache(&cache_path, false);
    let config = loader.load(&app).unwrap();
    assert_eq!(config["title"], json!("app server"));

    let cached: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cache_path).unwrap()).unwrap();
    assert_eq!(cached, config);
}

#[test]
fn test_fresh_cache_bypasses_parsing() {
    let temp = TempDir::new().unwrap();
    let app = write(temp.path(), "app.yml", "value: 1\n");
    let cache_path = temp.path().join("config.json");

    let mut loader = ConfigLoader::with_cache(&cache_path, false);
    assert_eq!(loader.load(&app).unwrap(), json!({"value": 1}));
    assert_eq!(loader.resources().len(), 1);

    fs::remove_file(&app).unwrap();
    assert_eq!(loader.load(&app).unwrap(), json!({"value": 1}));
    assert!(loader.resources().is_empty());
}

#[test]
fn test_debug_cache_reloads_changed_sources() {
    let temp = TempDir::new().unwrap();
    let base = write(temp.path(), "base.yml", "value: old\n");
    let app = write(temp.path(), "app.yml", "imports: base.yml\n");
    let past = SystemTime::now() - Duration::from_secs(120);
    set_mtime(&base, past);
    set_mtime(&app, past);

    let cache_path = temp.path().join("config.json");
    let mut loader = ConfigLoader::with_cache(&cache_path, true);
    assert_eq!(loader.load(&app).unwrap(), json!({"value": "old"}));
    assert!(loader.cache().unwrap().is_fresh());

    fs::write(&base, "value: new\n").unwrap();
    set_mtime(&base, SystemTime::now() + Duration::from_secs(120));
    assert!(!loader.cache().unwrap().is_fresh());
    assert_eq!(loader.load(&app).unwrap(), json!({"value": "new"}));
}

#[test]
fn test_non_debug_cache_ignores_changed_sources() {
    let temp = TempDir::new().unwrap();
    let app = write(temp.path(), "app.yml", "value: old\n");
    set_mtime(&app, SystemTime::now() - Duration::from_secs(120));

    let cache_path = temp.path().join("config.json");
    let mut loader = ConfigLoader::with_cache(&cache_path, false);
    loader.load(&app).unwrap();

    fs::write(&app, "value: new\n").unwrap();
    set_mtime(&app, SystemTime::now() + Duration::from_secs(120));
    assert_eq!(loader.load(&app).unwrap(), json!({"value": "old"}));
}

#[test]
fn test_custom_cache_collaborator() {
    let temp = TempDir::new().unwrap();
    let app = write(temp.path(), "app.yml", "value: 2\n");
    let cache = FileConfigCache::new(temp.path().join("custom.json"), true);

    let mut loader = ConfigLoader::new();
    loader.set_cache(Box::new(cache.clone()));
    loader.load(&app).unwrap();

    let meta = fs::read_to_string(cache.meta_path()).unwrap();
    assert!(meta.contains("app.yml"));
    assert_eq!(loader.cache().unwrap().path(), cache.path());
}
