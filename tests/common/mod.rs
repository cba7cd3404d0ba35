//! Shared test infrastructure.
//!
//! # Test Database Setup
//! - `setup_test_db()` - temp-dir SQLite file with the schema applied,
//!   for model-layer tests working on a bare `Connection`
//! - `setup_test_pool()` - same, behind the `r2d2` pool the handlers use
//!
//! Returned `TempDir`s must be kept alive for the database to remain valid.

use rusqlite::Connection;
use tempfile::TempDir;

use rolodex::db::{self, DbPool, SCHEMA};
use rolodex::models::contact::{self, NewContact};

pub fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let conn = Connection::open(&db_path).expect("Failed to open test DB");

    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
        .expect("Failed to set pragmas");
    conn.execute_batch(SCHEMA).expect("Failed to apply schema");

    (dir, conn)
}

pub fn setup_test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let pool = db::init_pool(db_path.to_str().expect("db path not utf-8"));
    db::init_schema(&pool);
    (dir, pool)
}

pub fn insert_contact(conn: &Connection, name: &str, email: &str, phone: &str) -> i64 {
    let new = NewContact {
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
    };
    contact::create(conn, &new).expect("Failed to insert contact")
}

pub fn count_contacts(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
        .expect("Failed to count contacts")
}
