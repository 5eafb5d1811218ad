pub mod error;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::admin::admin_auth_middleware;
use state::AppState;

/// Assemble the `/api` routes plus Swagger UI
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Admin Routes - bearer session required (login excepted)
    // ==========================================================================
    let admin_routes = Router::new()
        .route("/orders", get(handlers::list_orders))
        .route("/orders/update", post(handlers::update_order))
        .route(
            "/orders/{order_id}",
            patch(handlers::patch_order).delete(handlers::delete_order),
        )
        .route("/orders/{order_id}/status", post(handlers::set_order_status))
        .route("/orders/{order_id}/history", get(handlers::order_history))
        .route("/services", post(handlers::create_service))
        .route(
            "/services/{id}",
            put(handlers::update_service).delete(handlers::delete_service),
        )
        .route_layer(from_fn_with_state(state.clone(), admin_auth_middleware))
        .route("/login", post(handlers::admin_login));

    // ==========================================================================
    // Storefront Routes
    // ==========================================================================
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/services", get(handlers::list_services))
        .route("/orders", post(handlers::create_order))
        .route("/orders/confirm", post(handlers::confirm_order))
        .route("/orders/{order_id}", get(handlers::get_order))
        .route("/user/orders/{user_id}", get(handlers::list_user_orders))
        .route("/chat", post(handlers::chat))
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until Ctrl-C
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            port
        )
    })?;

    tracing::info!("Storefront listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
