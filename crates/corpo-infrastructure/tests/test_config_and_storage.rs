use corpo_core::auth::TokenPair;
use corpo_core::config::{ENV_API_BASE_URL, ENV_STORAGE_DIR};
use corpo_core::storage::{KeyValueStore, PersistedBlob, TOKEN_STORAGE_KEY};
use corpo_infrastructure::{ConfigService, CorpoPaths, FileKeyValueStore};
use std::sync::Arc;
use tempfile::TempDir;

fn service(temp_dir: &TempDir) -> ConfigService {
    ConfigService::new(CorpoPaths::new(Some(temp_dir.path())))
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = service(&temp_dir).load_with(|_| None).unwrap();

    assert_eq!(config.api_base_url, "http://localhost:3000");
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_init_default_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let service = service(&temp_dir);

    let (path, written) = service.init_default(false).unwrap();
    assert!(written);
    assert!(path.exists());

    // Second init leaves the existing file alone
    std::fs::write(&path, "api_base_url = \"https://agents.example.com/\"\n").unwrap();
    let (_, written) = service.init_default(false).unwrap();
    assert!(!written);

    let config = service.load_with(|_| None).unwrap();
    assert_eq!(config.api_base_url, "https://agents.example.com");
}

#[test]
fn test_environment_wins_over_file() {
    let temp_dir = TempDir::new().unwrap();
    let service = service(&temp_dir);
    service.init_default(false).unwrap();

    let storage = temp_dir.path().join("elsewhere");
    let storage_str = storage.to_string_lossy().to_string();
    let config = service
        .load_with(|key| match key {
            k if k == ENV_API_BASE_URL => Some("http://10.0.0.5:8080".to_string()),
            k if k == ENV_STORAGE_DIR => Some(storage_str.clone()),
            _ => None,
        })
        .unwrap();

    assert_eq!(config.api_base_url, "http://10.0.0.5:8080");
    assert_eq!(service.storage_dir(&config).unwrap(), storage);
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let service = service(&temp_dir);
    let path = service.config_path().unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "api_base_url = [").unwrap();

    let err = service.load_with(|_| None).unwrap_err();
    assert!(matches!(err, corpo_core::CorpoError::Config(_)));
}

#[test]
fn test_tokens_survive_a_new_store_instance() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("storage");

    let first: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&dir));
    PersistedBlob::<TokenPair>::new(first, TOKEN_STORAGE_KEY)
        .save(&TokenPair {
            access_token: "T1".to_string(),
            refresh_token: Some("R1".to_string()),
        })
        .unwrap();

    let second: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&dir));
    let tokens = PersistedBlob::<TokenPair>::new(second, TOKEN_STORAGE_KEY)
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(tokens.access_token, "T1");
    assert_eq!(tokens.refresh_token.as_deref(), Some("R1"));
}
