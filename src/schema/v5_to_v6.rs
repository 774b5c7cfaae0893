use crate::error::KeyMapperError;
use crate::model::{self, v2, v6};
use log::info;
use rusqlite::Connection;

use super::rows::{self, Columns, KeymapRow};

/// Schema Upgrade: Version 5 → 6
///
/// Every flag left on the keymap after 4→5 describes the trigger, so the
/// `flags` column moves into `trigger.flags` and the column is zeroed.
pub const UPGRADE_5_TO_6_POST_SQL: &str = r#"
UPDATE meta SET value = '6' WHERE key = 'schema_version';
"#;

pub fn migrate_5_to_6(conn: &Connection) -> Result<(), KeyMapperError> {
    let count = rows::rewrite_keymaps(conn, Columns::Base, transform)?;
    info!("Migration 5→6: Moved keymap flags into the trigger of {} keymaps", count);
    Ok(())
}

pub fn transform(row: KeymapRow) -> Result<KeymapRow, KeyMapperError> {
    let old: v2::Trigger = model::decode(row.id, "trigger", &row.trigger)?;

    let trigger = v6::Trigger {
        keys: old.keys,
        extras: old.extras,
        mode: old.mode,
        flags: row.flags,
    };

    Ok(KeymapRow {
        trigger: model::encode(&trigger)?,
        flags: 0,
        ..row
    })
}
