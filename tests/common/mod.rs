use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use voxdash::config::ApiConfig;
use voxdash::store::SledStore;
use voxdash::ApiClient;

#[allow(dead_code)]
pub fn create_temp_store() -> (Arc<SledStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SledStore::open(tmp.path().join("state.db")).expect("failed to open sled store");
    (Arc::new(store), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("voxdash.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// `ApiClient` pointed at a mock server, backed by a fresh temp store.
#[allow(dead_code)]
pub fn client_for(base_url: &str) -> (ApiClient<Arc<SledStore>>, TempDir) {
    let (store, tmp) = create_temp_store();
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    let client = ApiClient::new(&config, store).expect("failed to build api client");
    (client, tmp)
}
