pub mod cors;
pub mod routes;
pub mod state;

use crate::app::cors::{cors_middleware, CorsPolicy};
use crate::app::state::AppState;
use crate::utils::error::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::future::Future;
use tokio::net::TcpListener;

pub fn router(state: AppState, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/predict", post(routes::predict))
        .route("/news", get(routes::news))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(middleware::from_fn_with_state(cors, cors_middleware))
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
