#![cfg(feature = "rusqlite")]
#![allow(dead_code)]

use rusqlite::Connection;
use sqlpack::Model;

/// Opens an in-memory database with the test tables created.
#[macro_export]
macro_rules! setup_test_db {
    () => {{ $crate::common::setup_db() }};
}

pub fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    create_tables(&conn);
    conn
}

fn create_tables(conn: &Connection) {
    conn.execute(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL DEFAULT 'none'
        )",
        [],
    )
    .expect("Failed to create users table");

    // Composite key for multi-column identifiers
    conn.execute(
        "CREATE TABLE memberships (
            user_id INTEGER NOT NULL,
            group_id INTEGER NOT NULL,
            role TEXT NOT NULL DEFAULT 'member',
            PRIMARY KEY (user_id, group_id)
        )",
        [],
    )
    .expect("Failed to create memberships table");
}

pub fn users() -> Model {
    Model::new("users", ["id", "name", "email"]).with_primary_key("id")
}

pub fn memberships() -> Model {
    Model::new("memberships", ["user_id", "group_id", "role"])
        .with_primary_key(["user_id", "group_id"])
}

/// User names in id order.
pub fn user_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM users ORDER BY id")
        .expect("Failed to prepare select");
    stmt.query_map([], |row| row.get(0))
        .expect("Failed to query users")
        .collect::<Result<_, _>>()
        .expect("Failed to read users")
}

/// `('u0')`, `('u1')`, ... each value set being six bytes for n < 10.
pub fn name_values(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("('u{i}')")).collect()
}
