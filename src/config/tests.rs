use super::*;
use std::fs::File;
use std::io::Write;
use tempfile::{tempdir, TempDir};

/// Helper function to create a test configuration file
fn create_test_config_file(dir: &TempDir, content: &str) -> PathBuf {
    let config_path = dir.path().join("config.toml");
    let mut file = File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    config_path
}

/// Tests for Config::apply_update
#[test]
fn test_apply_update_with_all_values() {
    let config = base_config(None);

    let update = ConfigUpdate {
        host: Some("127.0.0.1".to_string()),
        port: Some(9000),
        database_url: Some("updated.db".to_string()),
        recipes_path: Some("data/recipes.json".to_string()),
        image_base_url: Some("https://cdn.example.com/img".to_string()),
        llm_url: Some("http://nim:8000/v1".to_string()),
        llm_model: Some("other-model".to_string()),
        llm_api_key: Some("secret".to_string()),
        llm_temperature: Some(0.2),
        llm_max_tokens: Some(512),
        embeddings_url: Some("http://embed:8001/v1".to_string()),
        embeddings_model: Some("other-embedder".to_string()),
        request_timeout_secs: Some(30),
        index_on_startup: Some(false),
        server_url: Some("http://ignored".to_string()),
    };

    let updated = config.apply_update(update);

    assert_eq!(updated.host, "127.0.0.1");
    assert_eq!(updated.port, 9000);
    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.recipes_path, "data/recipes.json");
    assert_eq!(updated.image_base_url, "https://cdn.example.com/img");
    assert_eq!(updated.llm_url, "http://nim:8000/v1");
    assert_eq!(updated.llm_model, "other-model");
    assert_eq!(updated.llm_api_key.as_deref(), Some("secret"));
    assert_eq!(updated.llm_temperature, 0.2);
    assert_eq!(updated.llm_max_tokens, 512);
    assert_eq!(updated.embeddings_url, "http://embed:8001/v1");
    assert_eq!(updated.embeddings_model, "other-embedder");
    assert_eq!(updated.request_timeout_secs, 30);
    assert!(!updated.index_on_startup);
}

#[test]
fn test_apply_update_with_partial_values() {
    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        port: Some(3000),
        ..Default::default()
    };

    let updated = base_config(None).apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.port, 3000);
    assert_eq!(updated.host, "0.0.0.0"); // Unchanged
    assert_eq!(updated.llm_max_tokens, 300); // Unchanged
}

#[test]
fn test_apply_update_keeps_api_key_without_override() {
    let mut config = base_config(None);
    config.llm_api_key = Some("from-file".to_string());

    let updated = config.apply_update(ConfigUpdate::default());

    assert_eq!(updated.llm_api_key.as_deref(), Some("from-file"));
}

#[test]
fn test_apply_update_with_no_values() {
    let config = base_config(None);
    let updated = config.clone().apply_update(ConfigUpdate::default());
    assert_eq!(updated, config);
}

/// Tests for derived values
#[test]
fn test_request_timeout_conversion() {
    let mut config = base_config(None);
    config.request_timeout_secs = 45;
    assert_eq!(config.request_timeout(), Duration::from_secs(45));
}

#[test]
fn test_bind_address() {
    let config = base_config(None);
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
}

/// Tests for base_config
#[test]
fn test_base_config_defaults() {
    let config = base_config(None);

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.database_url, "culinairy.db");
    assert_eq!(config.recipes_path, "recipes_updated.json");
    assert_eq!(config.image_base_url, "/images");
    assert_eq!(config.llm_url, "http://localhost:8000/v1");
    assert_eq!(config.llm_model, "nvidia/llama-3.1-nemotron-nano-8b-v1");
    assert_eq!(config.llm_api_key, None);
    assert_eq!(config.llm_temperature, 0.7);
    assert_eq!(config.llm_max_tokens, 300);
    assert_eq!(config.embeddings_url, "http://localhost:8001/v1");
    assert_eq!(config.embeddings_model, "nvidia/llama-3.2-nv-embedqa-1b-v2");
    assert_eq!(config.request_timeout_secs, 300);
    assert!(config.index_on_startup);
}

#[test]
fn test_base_config_with_path() {
    let temp_dir = tempdir().unwrap();
    let config = base_config(Some(temp_dir.path().to_path_buf()));

    let expected_db_path = temp_dir.path().join("culinairy.db").to_string_lossy().to_string();
    assert_eq!(config.database_url, expected_db_path);
    assert_eq!(config.port, 8080);
}

/// Tests for config_from_args
#[test]
fn test_config_from_args_with_values() {
    let args = CliArgs {
        port: Some(8181),
        database_url: Some("args.db".to_string()),
        llm_url: Some("http://nim.local/v1".to_string()),
        index_on_startup: Some(false),
        debug: true,
        ..Default::default()
    };

    let update = config_from_args(args);

    assert_eq!(update.port, Some(8181));
    assert_eq!(update.database_url, Some("args.db".to_string()));
    assert_eq!(update.llm_url, Some("http://nim.local/v1".to_string()));
    assert_eq!(update.index_on_startup, Some(false));
    assert_eq!(update.host, None);
    assert_eq!(update.server_url, None);
}

#[test]
fn test_config_from_args_with_no_values() {
    assert_eq!(config_from_args(CliArgs::default()), ConfigUpdate::default());
}

#[test]
fn test_cli_args_parse_flags() {
    let args = CliArgs::try_parse_from([
        "culinairy",
        "--port",
        "9090",
        "--llm-temperature",
        "0.3",
        "--index-on-startup",
        "false",
        "--log-json",
    ])
    .unwrap();

    assert_eq!(args.port, Some(9090));
    assert_eq!(args.llm_temperature, Some(0.3));
    assert_eq!(args.index_on_startup, Some(false));
    assert!(args.log_json);
}

/// Tests for config_from_file - successful cases
#[test]
fn test_config_from_file_with_no_path() {
    let update = config_from_file(None).unwrap();
    assert_eq!(update, ConfigUpdate::default());
}

#[test]
fn test_config_from_file_with_valid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        port = 8181
        llm_url = "http://nim.internal:8000/v1"
        llm_temperature = 0.5
        index_on_startup = false
        server_url = "http://localhost:8181"
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    let result = config_from_file(Some(config_path));

    assert!(result.is_ok(), "Failed to parse config file: {}", result.err().unwrap());
    let update = result.unwrap();
    assert_eq!(update.database_url, Some("file.db".to_string()));
    assert_eq!(update.port, Some(8181));
    assert_eq!(update.llm_url, Some("http://nim.internal:8000/v1".to_string()));
    assert_eq!(update.llm_temperature, Some(0.5));
    assert_eq!(update.index_on_startup, Some(false));
    assert_eq!(update.server_url, Some("http://localhost:8181".to_string()));
    assert_eq!(update.host, None);
}

#[test]
fn test_config_from_file_with_partial_values() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        recipes_path = "recipes.json"
        # Intentionally missing other fields
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    let update = config_from_file(Some(config_path)).unwrap();
    assert_eq!(update.recipes_path, Some("recipes.json".to_string()));
    assert_eq!(update.database_url, None);
    assert_eq!(update.port, None);
}

/// Tests for config_from_file - failure cases
#[test]
fn test_config_from_file_with_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        port = "not a number" # Type error
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    assert!(config_from_file(Some(config_path)).is_err());
}

#[test]
fn test_config_from_file_with_nonexistent_file() {
    let temp_dir = tempdir().unwrap();
    let nonexistent_path = temp_dir.path().join("nonexistent_config.toml");

    let update = config_from_file(Some(nonexistent_path)).unwrap();
    assert_eq!(update, ConfigUpdate::default());
}

/// Tests for layering
#[test]
fn test_config_precedence() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        ..Default::default()
    };

    let file_config = ConfigUpdate {
        database_url: Some("file.db".to_string()),
        port: Some(9000),
        ..Default::default()
    };

    let config = base_config(None)
        .apply_update(file_config)
        .apply_update(config_from_args(args));

    // Args override file values, which override base values
    assert_eq!(config.database_url, "args.db");
    assert_eq!(config.port, 9000); // From file
    assert_eq!(config.llm_max_tokens, 300); // From base
}
