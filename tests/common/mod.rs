use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use josai::history::SessionStore;
use josai::storage::JsonFileStorage;

#[allow(dead_code)]
pub fn create_temp_store() -> (SessionStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let path = tmp.path().join("jos-ai-chat-history.json");
    let storage = JsonFileStorage::new_with_path(path).expect("failed to create json storage");
    (SessionStore::new(storage), tmp)
}

#[allow(dead_code)]
pub fn reopen(tmp: &TempDir) -> SessionStore {
    let path = tmp.path().join("jos-ai-chat-history.json");
    SessionStore::new(JsonFileStorage::new_with_path(path).expect("failed to reopen storage"))
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("josai.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
