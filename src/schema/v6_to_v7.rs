use crate::error::KeyMapperError;
use crate::model::flags::TRIGGER_TO_KEY;
use crate::model::{self, v6, v7};
use log::info;
use rusqlite::Connection;

use super::rows::{self, Columns, KeymapRow};

/// Schema Upgrade: Version 6 → 7
///
/// Trigger keys get their own `flags`. "Don't override the default action"
/// becomes "do not consume key event" on each key, so a later edit can turn it
/// off for one key without touching the others.
pub const UPGRADE_6_TO_7_POST_SQL: &str = r#"
UPDATE meta SET value = '7' WHERE key = 'schema_version';
"#;

pub fn migrate_6_to_7(conn: &Connection) -> Result<(), KeyMapperError> {
    let count = rows::rewrite_keymaps(conn, Columns::Base, transform)?;
    info!("Migration 6→7: Added key flags to {} keymaps", count);
    Ok(())
}

pub fn transform(row: KeymapRow) -> Result<KeymapRow, KeyMapperError> {
    let old: v6::Trigger = model::decode(row.id, "trigger", &row.trigger)?;

    let key_flags = TRIGGER_TO_KEY.translate(old.flags);
    let trigger = v7::Trigger {
        keys: old
            .keys
            .into_iter()
            .map(|key| v7::TriggerKey {
                key_code: key.key_code,
                device_id: key.device_id,
                click_type: key.click_type,
                flags: key_flags,
            })
            .collect(),
        extras: old.extras,
        mode: old.mode,
        flags: TRIGGER_TO_KEY.strip(old.flags),
    };

    Ok(KeymapRow {
        trigger: model::encode(&trigger)?,
        ..row
    })
}
