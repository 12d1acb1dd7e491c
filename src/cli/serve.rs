use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{config, error, info, management::LocalStore, server};

/// Runs the mock backend over the local store until interrupted.
pub async fn serve(addr: Option<String>) {
    let addr = addr.unwrap_or_else(config::server_addr);
    let dir = config::data_dir();
    info!("Serving local store at {}", dir.display());

    let store = Arc::new(Mutex::new(LocalStore::new(dir)));
    if let Err(e) = server::start_api_server(store, &addr).await {
        error!("Mock backend on {} stopped. Err: {}", addr, e);
    }
}
