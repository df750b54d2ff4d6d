/// PostgreSQL plumbing
///
/// Connection pooling and schema migrations for the PostgreSQL store. The
/// queries themselves live in [`crate::store::postgres`].
///
/// # Modules
///
/// - `pool`: connection pool creation, health check and shutdown
/// - `migrations`: embedded migration runner for the workspace `migrations/` directory
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::migrations::run_migrations;
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig::new(std::env::var("DATABASE_URL")?)).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
