use crate::deploy::DeployClient;
use crate::storage::FileStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: FileStore,
    /// `None` when no deployment API is configured
    pub deployer: Option<DeployClient>,
}

#[cfg(test)]
pub(crate) async fn test_state(
    storage_dir: &std::path::Path,
    deploy: Option<crate::config::DeployConfig>,
) -> AppState {
    let store = FileStore::open(storage_dir)
        .await
        .expect("Failed to open test storage");
    let deployer = deploy
        .as_ref()
        .map(|deploy| DeployClient::from_config(deploy).expect("Failed to build deploy client"));

    AppState { store, deployer }
}
