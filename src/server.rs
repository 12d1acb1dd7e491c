use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::{io, net::SocketAddr, str::FromStr};
use tokio::net::TcpListener;

use crate::{api, api::SharedStore, info};

/// Routes of the mock backend over a shared store.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/uploads/{file_name}", post(api::upload))
        .route("/files/{name}", get(api::file))
        .route("/{collection}", get(api::list).post(api::create))
        .route(
            "/{collection}/{id}",
            get(api::fetch)
                .patch(api::update)
                .put(api::update)
                .delete(api::delete),
        )
        .layer(Extension(store))
}

/// Serves the mock backend on an already bound listener until it fails.
pub async fn serve(listener: TcpListener, store: SharedStore) -> io::Result<()> {
    axum::serve(listener, router(store)).await
}

pub async fn start_api_server(store: SharedStore, addr: &str) -> io::Result<()> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let listener = TcpListener::bind(&addr).await?;
    info!("Mock backend listening on http://{}", listener.local_addr()?);
    serve(listener, store).await
}
