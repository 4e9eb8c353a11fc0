//! Relay backend: creates checkout preferences on behalf of browser-facing
//! hosts so the provider credential never leaves the server.

pub mod server;

use crate::domain::ports::CheckoutGatewayRef;
use crate::error::Result;
use server::RelayState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Handle to a running relay backend.
pub struct RelayHandle {
    pub url: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RelayHandle {
    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

/// Binds `listen_addr` and serves the relay routes in the background.
pub async fn start(listen_addr: SocketAddr, gateway: CheckoutGatewayRef) -> Result<RelayHandle> {
    let app = server::router(Arc::new(RelayState { gateway }));
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    let url = format!("http://{}", listener.local_addr()?);
    info!(%url, "relay listening");

    let (shutdown, rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await
            .ok();
    });

    Ok(RelayHandle {
        url,
        shutdown,
        task,
    })
}
