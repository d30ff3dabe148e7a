//! Local relational store for classrooms, teams, and assignments
//!
//! Holds the records that mirror groups on the access-control platform.
//! External permission state is owned by the platform; this store keeps
//! the relational side (roles, team linkage, lifecycle flags).

pub mod entities;
pub mod migrator;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Connect to the database at the given URL (sqlite or postgres)
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_string());
    // An in-memory SQLite database exists per connection; a second pooled
    // connection would see empty tables.
    let max_connections = if url.contains(":memory:") { 1 } else { 10 };
    options
        .max_connections(max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("Connected to database");
    Ok(db)
}

/// Run all pending migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
