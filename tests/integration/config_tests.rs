use dupagent::config::{Config, DEFAULT_EXTENSIONS};
use figment::providers::Serialized;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Defaults only, so environment overrides from other tests cannot leak in
    let figment = figment::Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert!(!config.include_hidden);
    assert!(!config.include_empty);
    assert_eq!(config.extensions, DEFAULT_EXTENSIONS.map(String::from).to_vec());
    assert_eq!(config.chunk_size, 4096);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DUPAGENT_INCLUDE_HIDDEN", "true");
    std::env::set_var("DUPAGENT_CHUNK_SIZE", "65536");

    use figment::{providers::Env, Figment};
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPAGENT_").split("__"));

    let config: Config = figment.extract().unwrap();

    assert!(config.include_hidden);
    assert_eq!(config.chunk_size, 65536);

    std::env::remove_var("DUPAGENT_INCLUDE_HIDDEN");
    std::env::remove_var("DUPAGENT_CHUNK_SIZE");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
include_empty = true
extensions = ["pdf", "docx"]
"#;
    fs::write(&config_path, toml_content).unwrap();

    use figment::{
        providers::{Format, Toml},
        Figment,
    };
    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));

    let config: Config = figment.extract().unwrap();

    assert!(config.include_empty);
    assert_eq!(config.extensions, vec!["pdf".to_string(), "docx".to_string()]);
    assert_eq!(config.chunk_size, 4096);
}

#[test]
fn test_config_save_and_reload() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        include_empty: true,
        extensions: vec!["mp3".to_string()],
        ..Config::default()
    };
    config.save_to(&config_path).unwrap();
    assert!(config_path.exists());

    let loaded = Config::load_from(Some(&config_path)).unwrap();
    assert!(loaded.include_empty);
    assert_eq!(loaded.extensions, vec!["mp3".to_string()]);
}

#[test]
fn test_config_missing_file_uses_defaults() {
    let loaded = Config::load_from(Some(Path::new("/nonexistent/dupagent/config.toml"))).unwrap();
    assert_eq!(loaded.extensions.len(), DEFAULT_EXTENSIONS.len());
    assert!(!loaded.include_empty);
}

#[test]
fn test_config_invalid_toml_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "extensions = not-a-list").unwrap();

    assert!(Config::load_from(Some(&config_path)).is_err());
}

#[test]
fn test_config_drives_scan_options() {
    let config = Config {
        include_hidden: true,
        extensions: vec![".PNG".to_string()],
        chunk_size: 0,
        ..Config::default()
    };
    let options = config.scan_options();

    assert!(!options.ignore_hidden);
    assert!(options.ignore_zero_byte);
    assert!(options.allows_extension(Path::new("shot.png")));
    assert!(!options.allows_extension(Path::new("shot.jpg")));
    assert_eq!(options.chunk_size, 1);
}
