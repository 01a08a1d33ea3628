#![cfg(feature = "postgres-sync")]

use postgres::{Client, NoTls};
use sqlpack::postgres::PostgresDriver;
use sqlpack::{Entry, ImportOptions, Importer, Model, Value};

/// Connects to `DATABASE_URL` with a fresh schema, or skips when no server
/// is reachable.
fn connect(schema_name: &str) -> Option<Client> {
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        "host=localhost user=postgres password=postgres dbname=sqlpack_test".into()
    });

    let Ok(mut client) = Client::connect(&url, NoTls) else {
        eprintln!("PostgreSQL not available, skipping");
        return None;
    };
    client
        .batch_execute(&format!(
            "DROP SCHEMA IF EXISTS \"{schema_name}\" CASCADE;
             CREATE SCHEMA \"{schema_name}\";
             SET search_path TO \"{schema_name}\";
             CREATE TABLE users (id SERIAL PRIMARY KEY, name TEXT NOT NULL UNIQUE);"
        ))
        .expect("setup test schema");
    Some(client)
}

fn users() -> Model {
    Model::new("users", ["id", "name"]).with_primary_key("id")
}

fn names(client: &mut Client) -> Vec<String> {
    client
        .query("SELECT name FROM users ORDER BY id", &[])
        .expect("select users")
        .iter()
        .map(|row| row.get(0))
        .collect()
}

#[test]
fn test_returning_ids() {
    let Some(client) = connect("sqlpack_returning") else {
        return;
    };
    let users = users();
    let options = ImportOptions::default();
    let mut importer = Importer::new(PostgresDriver::new(client)).unwrap();

    let template = importer.insert_template(&users, &["name"], &options).unwrap();
    let result = importer
        .import(&template, &["('a')", "('b')"], &options, Some(&users))
        .unwrap();

    assert_eq!(result.statement_count, 1);
    assert_eq!(
        result.identifiers,
        [Entry::Scalar(Value::from("1")), Entry::Scalar(Value::from("2"))]
    );
}

#[test]
fn test_empty_returning_result_keeps_columns() {
    let Some(mut client) = connect("sqlpack_empty_returning") else {
        return;
    };
    client
        .batch_execute("INSERT INTO users (name) VALUES ('a')")
        .unwrap();
    let mut driver = PostgresDriver::new(client);

    let result = sqlpack::Executor::execute(
        &mut driver,
        "INSERT INTO users (name) VALUES ('a') ON CONFLICT DO NOTHING RETURNING \"id\"",
    )
    .unwrap();

    assert!(result.rows.is_empty());
    assert_eq!(result.columns, ["id"]);
}

#[test]
fn test_split_inside_callers_transaction() {
    let Some(mut client) = connect("sqlpack_caller_tx") else {
        return;
    };
    client
        .batch_execute("BEGIN; INSERT INTO users (name) VALUES ('outer')")
        .unwrap();
    let users = users();
    let options = ImportOptions::default();
    // Room for two value sets per statement
    let driver = PostgresDriver::new(client).with_max_statement_bytes(60);
    let mut importer = Importer::new(driver).unwrap();

    let template = importer.insert_template(&users, &["name"], &options).unwrap();
    let failed = importer.import(
        &template,
        &["('u0')", "('u1')", "('outer')"],
        &options,
        Some(&users),
    );
    assert!(failed.is_err());

    // Only the batch was undone; the caller's insert commits with their
    // transaction.
    let client = importer.driver_mut().client();
    client.batch_execute("COMMIT").unwrap();
    assert_eq!(names(client), ["outer"]);
}
