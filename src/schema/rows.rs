use crate::error::KeyMapperError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Which column set the `keymaps` table has at the version being migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Columns {
    /// Versions 2–8.
    Base,
    /// Versions 9 and later.
    WithUid,
}

/// A `keymaps` row with its JSON columns still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapRow {
    pub id: i64,
    pub trigger: String,
    pub action_list: String,
    pub constraint_list: String,
    pub constraint_mode: i64,
    pub flags: i64,
    pub folder_name: Option<String>,
    pub is_enabled: bool,
    pub uid: Option<String>,
}

const BASE_COLUMNS: &str =
    "id, trigger, action_list, constraint_list, constraint_mode, flags, folder_name, is_enabled";

impl KeymapRow {
    fn from_row(row: &Row, columns: Columns) -> rusqlite::Result<Self> {
        Ok(KeymapRow {
            id: row.get(0)?,
            trigger: row.get(1)?,
            action_list: row.get(2)?,
            constraint_list: row.get(3)?,
            constraint_mode: row.get(4)?,
            flags: row.get(5)?,
            folder_name: row.get(6)?,
            is_enabled: row.get(7)?,
            uid: match columns {
                Columns::Base => None,
                Columns::WithUid => Some(row.get(8)?),
            },
        })
    }
}

pub fn load_keymaps(conn: &Connection, columns: Columns) -> Result<Vec<KeymapRow>, KeyMapperError> {
    let sql = match columns {
        Columns::Base => format!("SELECT {} FROM keymaps ORDER BY id ASC", BASE_COLUMNS),
        Columns::WithUid => format!("SELECT {}, uid FROM keymaps ORDER BY id ASC", BASE_COLUMNS),
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| KeymapRow::from_row(row, columns))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn load_keymap(conn: &Connection, columns: Columns, id: i64) -> Result<Option<KeymapRow>, KeyMapperError> {
    let sql = match columns {
        Columns::Base => format!("SELECT {} FROM keymaps WHERE id = ?", BASE_COLUMNS),
        Columns::WithUid => format!("SELECT {}, uid FROM keymaps WHERE id = ?", BASE_COLUMNS),
    };

    let row = conn
        .query_row(&sql, [id], |row| KeymapRow::from_row(row, columns))
        .optional()?;

    Ok(row)
}

pub fn update_keymap(conn: &Connection, row: &KeymapRow) -> Result<(), KeyMapperError> {
    let updated = match &row.uid {
        None => conn.execute(
            "UPDATE keymaps
             SET trigger = ?, action_list = ?, constraint_list = ?, constraint_mode = ?,
                 flags = ?, folder_name = ?, is_enabled = ?
             WHERE id = ?",
            params![
                row.trigger,
                row.action_list,
                row.constraint_list,
                row.constraint_mode,
                row.flags,
                row.folder_name,
                row.is_enabled,
                row.id,
            ],
        )?,
        Some(uid) => conn.execute(
            "UPDATE keymaps
             SET trigger = ?, action_list = ?, constraint_list = ?, constraint_mode = ?,
                 flags = ?, folder_name = ?, is_enabled = ?, uid = ?
             WHERE id = ?",
            params![
                row.trigger,
                row.action_list,
                row.constraint_list,
                row.constraint_mode,
                row.flags,
                row.folder_name,
                row.is_enabled,
                uid,
                row.id,
            ],
        )?,
    };

    if updated != 1 {
        return Err(KeyMapperError::transformation(
            row.id,
            format!("expected to update 1 row, updated {}", updated),
        ));
    }
    Ok(())
}

/// Load every keymap, run `transform` over it and write it back in place.
///
/// All rows are decoded and transformed before the first write, so a bad row
/// fails the step before anything is touched. Returns the number of rows written.
pub fn rewrite_keymaps<F>(conn: &Connection, columns: Columns, mut transform: F) -> Result<usize, KeyMapperError>
where
    F: FnMut(KeymapRow) -> Result<KeymapRow, KeyMapperError>,
{
    let rows = load_keymaps(conn, columns)?;

    let mut rewritten = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.id;
        let new_row = transform(row)?;
        if new_row.id != id {
            return Err(KeyMapperError::transformation(
                id,
                format!("transformer changed the id to {}", new_row.id),
            ));
        }
        rewritten.push(new_row);
    }

    for row in &rewritten {
        debug!("Rewriting keymap {}", row.id);
        update_keymap(conn, row)?;
    }

    Ok(rewritten.len())
}
