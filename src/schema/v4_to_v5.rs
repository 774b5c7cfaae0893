use crate::error::KeyMapperError;
use crate::model::flags::KEYMAP_TO_ACTION;
use crate::model::{self, v2};
use log::info;
use rusqlite::Connection;

use super::rows::{self, Columns, KeymapRow};

/// Schema Upgrade: Version 4 → 5
///
/// Repeat and the "performing action" toast become per-action options:
/// - the keymap bits in `KEYMAP_TO_ACTION` are set on every action and cleared
///   on the keymap, other keymap bits stay where they are.
/// - the repeat timing extras move from the trigger onto every action.
pub const UPGRADE_4_TO_5_POST_SQL: &str = r#"
UPDATE meta SET value = '5' WHERE key = 'schema_version';
"#;

/// Trigger extras that belong to actions from version 5.
pub const EXTRAS_MOVED_TO_ACTIONS: &[&str] = &["extra_hold_down_until_repeat_delay", "extra_repeat_delay"];

pub fn migrate_4_to_5(conn: &Connection) -> Result<(), KeyMapperError> {
    let count = rows::rewrite_keymaps(conn, Columns::Base, transform)?;
    info!("Migration 4→5: Moved repeat options onto the actions of {} keymaps", count);
    Ok(())
}

pub fn transform(row: KeymapRow) -> Result<KeymapRow, KeyMapperError> {
    let mut trigger: v2::Trigger = model::decode(row.id, "trigger", &row.trigger)?;
    let mut actions: Vec<v2::Action> = model::decode(row.id, "action_list", &row.action_list)?;

    let (moved, kept): (Vec<v2::Extra>, Vec<v2::Extra>) = trigger
        .extras
        .into_iter()
        .partition(|extra| EXTRAS_MOVED_TO_ACTIONS.contains(&extra.id.as_str()));
    trigger.extras = kept;

    let action_bits = KEYMAP_TO_ACTION.translate(row.flags);
    for action in &mut actions {
        action.flags |= action_bits;
        action.extras.extend(moved.iter().cloned());
    }

    Ok(KeymapRow {
        trigger: model::encode(&trigger)?,
        action_list: model::encode(&actions)?,
        flags: KEYMAP_TO_ACTION.strip(row.flags),
        ..row
    })
}
