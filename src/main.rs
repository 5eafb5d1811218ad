//! Mars Storefront server
//!
//! ```text
//! config/<env>.yaml ─▶ logging ─▶ SQLite + migrations ─▶ seed catalog ─▶ axum
//! ```
//!
//! Flags: `--env/-e <name>` (default `dev`), `--port <n>`.

use std::sync::Arc;

use anyhow::Context;
use mars_storefront::admin::AdminAuth;
use mars_storefront::catalog::CatalogService;
use mars_storefront::chat::{ChatCompletion, GeminiChat};
use mars_storefront::config::AppConfig;
use mars_storefront::db::Database;
use mars_storefront::gateway::{run_server, state::AppState};
use mars_storefront::logging::init_logging;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }
    let _log_guard = init_logging(&config)?;

    tracing::info!(
        "Starting Mars Storefront v{} ({}) in {} mode",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env
    );

    let db = Database::connect(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    db.migrate().await.context("Failed to apply migrations")?;

    if config.catalog.seed_defaults {
        let seeded = CatalogService::new(db.pool().clone())
            .seed_defaults()
            .await
            .context("Failed to seed catalog")?;
        if seeded > 0 {
            tracing::info!(count = seeded, "Seeded default catalog");
        }
    }

    let admin = AdminAuth::from_config(&config.admin).context("Invalid admin configuration")?;
    let chat: Option<Arc<dyn ChatCompletion>> = GeminiChat::from_config(&config.chat)
        .context("Invalid chat configuration")?
        .map(|c| Arc::new(c) as Arc<dyn ChatCompletion>);

    let state = Arc::new(AppState::new(Arc::new(db), admin, chat));
    run_server(&config.gateway.host, config.gateway.port, state).await
}
