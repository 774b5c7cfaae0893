use crate::error::KeyMapperError;
use crate::schema::{self, Migration, OLDEST_SCHEMA_VERSION, SCHEMA_VERSION};
use log::{info, Level};
use logging_timer::timer;
use rusqlite::{Connection, OptionalExtension};

/// The schema version recorded in `meta`, or `None` for a store that has never
/// been initialized.
pub fn read_schema_version(conn: &Connection) -> Result<Option<u32>, KeyMapperError> {
    let meta_exists: bool = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'meta'",
        [],
        |row| row.get::<_, i64>(0),
    )? > 0;

    if !meta_exists {
        return Ok(None);
    }

    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    match stored {
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| KeyMapperError::Error(format!("Stored schema version '{}' is not a number", value))),
        None => Ok(None),
    }
}

/// Upgrade the store at `conn` from schema version `from` to `to`.
///
/// Every step runs inside a single transaction: either the store ends at `to`
/// or it is left exactly as it was. A request with `from == to` touches nothing.
pub fn migrate(conn: &mut Connection, from: u32, to: u32) -> Result<(), KeyMapperError> {
    if from == to {
        return Ok(());
    }
    check_version_order(from, to)?;

    let _tmr = timer!(Level::Debug; "migrate", "{} → {}", from, to);
    info!("Migrating keymap store from schema version {} to {}", from, to);

    let tx = conn.transaction()?;
    for version in from..to {
        let migration = schema::migration_for(version).ok_or_else(|| {
            KeyMapperError::VersionOrderError(format!("No migration registered from version {}", version))
        })?;

        run_step(&tx, migration).map_err(|e| KeyMapperError::MigrationError {
            from: migration.from,
            to: migration.to,
            source: Box::new(e),
        })?;
    }
    tx.commit()?;

    info!("Keymap store is at schema version {}", to);
    Ok(())
}

fn check_version_order(from: u32, to: u32) -> Result<(), KeyMapperError> {
    if from < OLDEST_SCHEMA_VERSION {
        return Err(KeyMapperError::VersionOrderError(format!(
            "Schema version {} is older than the oldest supported version {}",
            from, OLDEST_SCHEMA_VERSION
        )));
    }
    if to < from {
        return Err(KeyMapperError::VersionOrderError(format!(
            "Cannot downgrade from schema version {} to {}",
            from, to
        )));
    }
    if to > SCHEMA_VERSION {
        return Err(KeyMapperError::VersionOrderError(format!(
            "Schema version {} is newer than the supported version {}",
            to, SCHEMA_VERSION
        )));
    }
    Ok(())
}

fn run_step(conn: &Connection, migration: &Migration) -> Result<(), KeyMapperError> {
    let _tmr = timer!(Level::Trace; "run_step", "{} → {}", migration.from, migration.to);

    expect_version(conn, migration.from)?;

    if let Some(sql) = migration.pre_sql {
        conn.execute_batch(sql)?;
    }
    if let Some(code_fn) = migration.code_fn {
        code_fn(conn)?;
    }
    if let Some(sql) = migration.post_sql {
        conn.execute_batch(sql)?;
    }

    expect_version(conn, migration.to)
}

fn expect_version(conn: &Connection, expected: u32) -> Result<(), KeyMapperError> {
    match read_schema_version(conn)? {
        Some(version) if version == expected => Ok(()),
        Some(version) => Err(KeyMapperError::Error(format!(
            "Expected schema version {}, store is at {}",
            expected, version
        ))),
        None => Err(KeyMapperError::Error("Schema version missing".to_string())),
    }
}
