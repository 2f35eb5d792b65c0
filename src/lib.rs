//! Biblio application library
//!
//! Wires the books module into the module registry and runs the HTTP server.

use anyhow::Context;
use biblio_db::Database;
use biblio_kernel::{InitCtx, ModuleRegistry, Settings};

pub mod modules;

/// Build a registry with every project module registered against `db`
pub async fn build_registry(db: &Database) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, db)
        .await
        .context("failed to register modules")?;
    Ok(registry)
}

/// Run the application until a shutdown signal arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "biblio bootstrap starting"
    );

    let db = Database::connect(&settings.database)
        .await
        .context("failed to open database")?;
    let registry = build_registry(&db).await?;

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!(
        modules = registry.module_count(),
        "biblio bootstrap complete"
    );

    let served = biblio_http::start_server(&registry, &settings.server).await;
    registry.stop_modules().await?;
    served
}
