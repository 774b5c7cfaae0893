use crate::error::KeyMapperError;
use crate::migration;
use crate::schema::{CREATE_SCHEMA_SQL, SCHEMA_VERSION};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// One row as stored, with every column in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub columns: Vec<(String, Value)>,
}

impl StoredRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the store at `path`, creating or migrating it to the current
    /// schema version before returning.
    pub fn open(path: &Path) -> Result<Self, KeyMapperError> {
        let conn = Connection::open(path)?;
        info!("Database opened at: {}", path.display());
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, KeyMapperError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open the existing store at `path` as it is. A missing file is an
    /// error, not a new store.
    pub fn open_without_migrating(path: &Path) -> Result<Self, KeyMapperError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Result<Self, KeyMapperError> {
        let mut db = Self { conn };
        db.ensure_schema()?;
        Ok(db)
    }

    fn ensure_schema(&mut self) -> Result<(), KeyMapperError> {
        match self.schema_version()? {
            None => {
                if table_exists(&self.conn, "keymaps")? {
                    return Err(KeyMapperError::Error(
                        "Store has a keymaps table but no schema version".to_string(),
                    ));
                }
                info!("Creating keymap store at schema version {}", SCHEMA_VERSION);
                self.conn.execute_batch(CREATE_SCHEMA_SQL)?;
                Ok(())
            }
            Some(SCHEMA_VERSION) => Ok(()),
            Some(version) if version > SCHEMA_VERSION => Err(KeyMapperError::VersionOrderError(format!(
                "Store is at schema version {}, this build supports up to {}",
                version, SCHEMA_VERSION
            ))),
            Some(version) => migration::migrate(&mut self.conn, version, SCHEMA_VERSION),
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run one or more SQL statements that return no rows.
    pub fn execute(&self, sql: &str) -> Result<(), KeyMapperError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn query_all(&self, table: &str) -> Result<Vec<StoredRow>, KeyMapperError> {
        query_all(&self.conn, table)
    }

    pub fn schema_version(&self) -> Result<Option<u32>, KeyMapperError> {
        migration::read_schema_version(&self.conn)
    }

    /// Migrate from the stored version to `to`.
    pub fn migrate_to(&mut self, to: u32) -> Result<(), KeyMapperError> {
        let from = self
            .schema_version()?
            .ok_or_else(|| KeyMapperError::Error("Schema version missing".to_string()))?;
        if from == to {
            warn!("Store is already at schema version {}", to);
        }
        migration::migrate(&mut self.conn, from, to)
    }
}

/// Every row of `table`, in rowid order.
pub fn query_all(conn: &Connection, table: &str) -> Result<Vec<StoredRow>, KeyMapperError> {
    if !is_identifier(table) {
        return Err(KeyMapperError::Error(format!("Invalid table name '{}'", table)));
    }

    let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\" ORDER BY rowid", table))?;
    let names: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();

    let rows = stmt
        .query_map([], |row| {
            let mut columns = Vec::with_capacity(names.len());
            for (index, name) in names.iter().enumerate() {
                columns.push((name.clone(), row.get::<_, Value>(index)?));
            }
            Ok(StoredRow { columns })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, KeyMapperError> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}
