//! HTTP server assembly

use crate::state::AppState;
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// API server: the router plus its operational layers
#[derive(Clone)]
pub struct Server {
    router: Router,
}

impl Server {
    pub fn new(state: AppState, cors_enabled: bool, timeout: Duration) -> Self {
        let mut router = crate::routes::router(state)
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(timeout));

        if cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        Self { router }
    }

    /// The assembled router, for embedding or in-process testing
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind and serve until the process is stopped
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "management API listening");
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
