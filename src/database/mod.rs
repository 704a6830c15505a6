// Copyright 2023 Remi Bernotavicius

use diesel::connection::SimpleConnection as _;
use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod models;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn establish_connection(path: impl AsRef<Path>) -> crate::Result<Connection> {
    let mut connection = Connection::establish(path.as_ref().to_str().unwrap())?;

    // SQLite doesn't enforce foreign keys unless asked per-connection.
    connection.batch_execute("PRAGMA foreign_keys = ON")?;

    let applied = connection.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("applied {} pending schema migrations", applied.len());
    }
    Ok(connection)
}

/// The id the last insert on this connection was assigned.
pub(crate) fn last_insert_rowid(conn: &mut Connection) -> diesel::QueryResult<i32> {
    diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>(
        "last_insert_rowid()",
    ))
    .get_result(conn)
}

#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    establish_connection(":memory:").unwrap()
}

#[test]
fn migrations() {
    let mut conn = Connection::establish(":memory:").unwrap();
    let applied = conn.run_pending_migrations(MIGRATIONS).unwrap();
    assert!(!applied.is_empty());

    conn.revert_all_migrations(MIGRATIONS).unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
}
