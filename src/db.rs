//! The local SQLite store for user preferences.
//!
//! Expense and preset data live in the PCS backend. The only state kept
//! locally is a small key-value table of UI preferences.

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

/// Create the tables used by the application if they do not exist.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_preference_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

fn create_preference_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS preference (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Get the raw value stored under `key`, or `None` if nothing is stored.
pub fn get_preference(key: &str, connection: &Connection) -> Result<Option<String>, Error> {
    let value = connection
        .query_row(
            "SELECT value FROM preference WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;

    Ok(value)
}

/// Store `value` under `key`, replacing any previous value.
pub fn set_preference(key: &str, value: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO preference (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;

    Ok(())
}
