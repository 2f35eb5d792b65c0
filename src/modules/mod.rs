pub mod books;

use biblio_db::Database;
use biblio_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub async fn register_all(registry: &mut ModuleRegistry, db: &Database) -> anyhow::Result<()> {
    registry.register(books::create_module(db).await?)?;
    Ok(())
}
