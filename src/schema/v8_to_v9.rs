use crate::error::KeyMapperError;
use crate::model::v9::new_uid;
use crate::model::{self, v2, v7, v9};
use log::info;
use rusqlite::Connection;

use super::rows::{self, Columns, KeymapRow};

/// Schema Upgrade: Version 8 → 9
///
/// Phase 1 (pre-SQL):
///   - Adds the `uid` column, temporarily blank.
///
/// Phase 2 (Rust code):
///   - Gives every keymap, trigger key and action a fresh uid. Nothing stored
///     before version 9 has one, so none are derived from existing data.
///
/// Phase 3 (post-SQL):
///   - Creates the unique index on `uid` and updates schema version to 9.
pub const UPGRADE_8_TO_9_PRE_SQL: &str = r#"
--
-- Schema Upgrade: Version 8 → 9 (Pre-SQL Phase)
--
ALTER TABLE keymaps ADD COLUMN uid TEXT NOT NULL DEFAULT '';
"#;

pub const UPGRADE_8_TO_9_POST_SQL: &str = r#"
CREATE UNIQUE INDEX index_keymaps_uid ON keymaps (uid);

UPDATE meta SET value = '9' WHERE key = 'schema_version';
"#;

pub fn migrate_8_to_9(conn: &Connection) -> Result<(), KeyMapperError> {
    // The new column is read as blank and then filled in.
    let count = rows::rewrite_keymaps(conn, Columns::Base, |row| transform(row, new_uid))?;
    info!("Migration 8→9: Assigned uids to {} keymaps", count);
    Ok(())
}

/// Assign uids using `uid` as the generator.
pub fn transform<F>(row: KeymapRow, mut uid: F) -> Result<KeymapRow, KeyMapperError>
where
    F: FnMut() -> String,
{
    let old_trigger: v7::Trigger = model::decode(row.id, "trigger", &row.trigger)?;
    let old_actions: Vec<v2::Action> = model::decode(row.id, "action_list", &row.action_list)?;

    let trigger = v9::Trigger {
        keys: old_trigger
            .keys
            .into_iter()
            .map(|key| v9::TriggerKey {
                key_code: key.key_code,
                device_id: key.device_id,
                click_type: key.click_type,
                flags: key.flags,
                uid: uid(),
            })
            .collect(),
        extras: old_trigger.extras,
        mode: old_trigger.mode,
        flags: old_trigger.flags,
    };

    let actions: Vec<v9::Action> = old_actions
        .into_iter()
        .map(|action| v9::Action {
            action_type: action.action_type,
            data: action.data,
            extras: action.extras,
            flags: action.flags,
            uid: uid(),
        })
        .collect();

    Ok(KeymapRow {
        trigger: model::encode(&trigger)?,
        action_list: model::encode(&actions)?,
        uid: Some(uid()),
        ..row
    })
}
