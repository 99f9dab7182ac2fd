//! Global database pool

use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect to the database and store the pool for process-wide access.
/// Panics if the connection fails or the pool was already initialized.
pub async fn init_db(database_url: String) {
    let pool = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    DB_POOL
        .set(pool)
        .expect("Database pool already initialized");
}

pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("Database pool not initialized")
}

/// Apply the schema. Every statement is CREATE ... IF NOT EXISTS, so this is
/// safe to run on every startup.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let ddl = include_str!("schema.sql");
    for stmt in ddl.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        db.execute(Statement::from_string(
            db.get_database_backend(),
            stmt.to_string(),
        ))
        .await?;
    }
    Ok(())
}
