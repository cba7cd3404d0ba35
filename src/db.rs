use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const SCHEMA: &str = include_str!("schema.sql");

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_url).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

/// Ensure the contacts table exists. Not a migration system: one idempotent
/// batch that provisions the embedded store at startup.
pub fn init_schema(pool: &DbPool) {
    let conn = pool
        .get()
        .expect("Failed to get DB connection for schema init");
    conn.execute_batch(SCHEMA).expect("Failed to apply schema");
    log::info!("Database schema ready");
}
