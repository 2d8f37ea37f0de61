//! Unit tests for configuration loading and graceful degradation
//!
//! Tests that manipulate IDREC_DATA_FOLDER are marked #[serial] so they do
//! not race on the process environment.

use idrec_common::config::{
    CompiledDefaults, ConfigSource, ConverterKind, DataFolderInitializer, DataFolderResolver,
    TomlConfig, DATA_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.data_folder.as_os_str().is_empty());
    assert_eq!(defaults.bind_address, "127.0.0.1:8000");

    #[cfg(target_os = "linux")]
    {
        let path_str = defaults.data_folder.to_string_lossy();
        assert!(path_str.ends_with("idrec"), "Linux default should end in idrec");
    }
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(DATA_FOLDER_ENV);

    let resolver = DataFolderResolver::new("test-module");
    let folder = resolver.resolve(None, &TomlConfig::default());

    assert_eq!(folder, CompiledDefaults::for_current_platform().data_folder);
}

#[test]
#[serial]
fn test_resolver_priority_order() {
    env::remove_var(DATA_FOLDER_ENV);

    let toml = TomlConfig {
        data_folder: Some(PathBuf::from("/tmp/idrec-from-toml")),
        ..TomlConfig::default()
    };
    let resolver = DataFolderResolver::new("test-module");

    // TOML beats compiled default
    assert_eq!(resolver.resolve(None, &toml), PathBuf::from("/tmp/idrec-from-toml"));

    // Environment beats TOML
    env::set_var(DATA_FOLDER_ENV, "/tmp/idrec-from-env");
    assert_eq!(resolver.resolve(None, &toml), PathBuf::from("/tmp/idrec-from-env"));

    // CLI beats everything
    let cli = PathBuf::from("/tmp/idrec-from-cli");
    assert_eq!(resolver.resolve(Some(&cli), &toml), cli);

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let config = TomlConfig::load_or_default(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(ConfigSource::of(Some(&missing)), ConfigSource::Missing(missing.clone()));
}

#[test]
fn test_config_source_reported_after_loading() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("idrec-ai.toml");
    std::fs::write(&path, "bind_address = \"0.0.0.0:9000\"\n").unwrap();

    // Loading is silent; the source is reported separately
    let config = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:9000"));
    assert_eq!(ConfigSource::of(Some(&path)), ConfigSource::File(path.clone()));

    assert_eq!(TomlConfig::load_or_default(None).unwrap(), TomlConfig::default());
    assert_eq!(ConfigSource::of(None), ConfigSource::NoConfigDir);
}

#[test]
fn test_partial_config_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("idrec-ai.toml");
    std::fs::write(
        &path,
        r#"
bind_address = "0.0.0.0:9000"

[converter]
kind = "command"
command = "docling"
args = ["--to", "md", "--output", "-"]

[extractor]
model = "llama3.1:8b"
"#,
    )
    .unwrap();

    let config = TomlConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:9000"));
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.converter.kind, ConverterKind::Command);
    assert_eq!(config.converter.command.as_deref(), Some("docling"));
    assert_eq!(config.converter.args.len(), 4);
    assert_eq!(config.converter.timeout_secs, 120);
    assert_eq!(config.extractor.model, "llama3.1:8b");
    assert_eq!(config.extractor.url, "http://127.0.0.1:11434");
}

#[test]
fn test_malformed_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "bind_address = [unterminated").unwrap();

    assert!(TomlConfig::load_or_default(Some(&path)).is_err());
}

#[test]
fn test_initializer_creates_directory_idempotently() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("nested").join("data");

    let initializer = DataFolderInitializer::new(root.clone());
    assert!(!initializer.database_exists());

    initializer.ensure_directory_exists().unwrap();
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("idrec.db"));
}
