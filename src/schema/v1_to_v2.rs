use crate::error::KeyMapperError;
use crate::model::flags::{self, V1_TO_ACTION, V1_TO_KEYMAP};
use crate::model::{self, v1, v2};
use log::{debug, info};
use rusqlite::{params, Connection};

/// Schema Upgrade: Version 1 → 2
///
/// Phase 1 (pre-SQL):
///   - Creates `new_keymaps` with JSON `trigger`, `action_list` and
///     `constraint_list` columns.
///
/// Phase 2 (Rust code):
///   - Converts each old row into one row per trigger in its `trigger_list`.
///   - Folds the single old action (`action_type`, `action_data`,
///     `action_extras`) into a one-element action list.
///   - Splits the shared old flags column between the keymap, the action and
///     the keys' click type.
///
/// Phase 3 (post-SQL):
///   - Replaces `keymaps` with `new_keymaps` and updates schema version to 2.
pub const UPGRADE_1_TO_2_PRE_SQL: &str = r#"
--
-- Schema Upgrade: Version 1 → 2 (Pre-SQL Phase)
--
CREATE TABLE new_keymaps (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    trigger TEXT NOT NULL,
    action_list TEXT NOT NULL,
    constraint_list TEXT NOT NULL,
    constraint_mode INTEGER NOT NULL,
    flags INTEGER NOT NULL,
    folder_name TEXT,
    is_enabled INTEGER NOT NULL
);
"#;

pub const UPGRADE_1_TO_2_POST_SQL: &str = r#"
DROP TABLE keymaps;

ALTER TABLE new_keymaps RENAME TO keymaps;

UPDATE meta SET value = '2' WHERE key = 'schema_version';
"#;

/// Old action tags and the tag each one becomes.
const ACTION_TYPES: &[(&str, &str)] = &[
    ("APP", "APP"),
    ("APP_SHORTCUT", "APP_SHORTCUT"),
    ("KEY", model::ACTION_TYPE_KEY_EVENT),
    ("KEYCODE", model::ACTION_TYPE_KEY_EVENT),
    ("TEXT_BLOCK", "TEXT_BLOCK"),
    ("URL", "URL"),
    ("SYSTEM_ACTION", "SYSTEM_ACTION"),
];

/// A row of the version 1 `keymaps` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRow {
    pub id: i64,
    pub trigger_list: String,
    pub flags: i64,
    pub is_enabled: bool,
    pub action_type: Option<String>,
    pub action_data: Option<String>,
    pub action_extras: Option<String>,
}

/// One version 2 keymap built from a legacy row, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedKeymap {
    pub trigger: v2::Trigger,
    pub action_list: Vec<v2::Action>,
    pub flags: i64,
    pub is_enabled: bool,
}

/// Rust code phase: fill `new_keymaps` from `keymaps`.
pub fn migrate_1_to_2(conn: &Connection) -> Result<(), KeyMapperError> {
    let rows = load_legacy_rows(conn)?;
    info!("Migration 1→2: Converting {} keymaps...", rows.len());

    let mut next_id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
    let mut split_off = Vec::new();

    let mut insert_stmt = conn.prepare(
        "INSERT INTO new_keymaps (
            id, trigger, action_list, constraint_list, constraint_mode, flags, folder_name, is_enabled
        ) VALUES (?, ?, ?, '[]', ?, ?, NULL, ?)",
    )?;

    for row in &rows {
        let mut converted = convert_row(row)?.into_iter();

        // convert_row never returns an empty list
        if let Some(first) = converted.next() {
            insert_converted(&mut insert_stmt, row.id, &first)?;
        }
        split_off.extend(converted.map(|keymap| (row.id, keymap)));
    }

    for (source_id, keymap) in &split_off {
        debug!(
            "Migration 1→2: Keymap {} has an extra trigger, stored as keymap {}",
            source_id, next_id
        );
        insert_converted(&mut insert_stmt, next_id, keymap)?;
        next_id += 1;
    }

    info!(
        "Migration 1→2: Wrote {} keymaps ({} split from multi-trigger rows)",
        rows.len() + split_off.len(),
        split_off.len()
    );

    Ok(())
}

fn insert_converted(
    stmt: &mut rusqlite::Statement<'_>,
    id: i64,
    keymap: &ConvertedKeymap,
) -> Result<(), KeyMapperError> {
    stmt.execute(params![
        id,
        model::encode(&keymap.trigger)?,
        model::encode(&keymap.action_list)?,
        model::CONSTRAINT_MODE_AND,
        keymap.flags,
        keymap.is_enabled,
    ])?;
    Ok(())
}

fn load_legacy_rows(conn: &Connection) -> Result<Vec<LegacyRow>, KeyMapperError> {
    let mut stmt = conn.prepare(
        "SELECT id, trigger_list, flags, is_enabled, action_type, action_data, action_extras
         FROM keymaps
         ORDER BY id ASC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(LegacyRow {
                id: row.get(0)?,
                trigger_list: row.get(1)?,
                flags: row.get(2)?,
                is_enabled: row.get(3)?,
                action_type: row.get(4)?,
                action_data: row.get(5)?,
                action_extras: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Convert one legacy row. Returns one keymap per trigger, and always at least one.
pub fn convert_row(row: &LegacyRow) -> Result<Vec<ConvertedKeymap>, KeyMapperError> {
    let triggers: Vec<v1::Trigger> = model::decode(row.id, "trigger_list", &row.trigger_list)?;
    let action_list = convert_action(row)?;

    let click_type = if flags::has_flag(row.flags, flags::v1::FLAG_LONG_PRESS) {
        model::CLICK_TYPE_LONG_PRESS
    } else {
        model::CLICK_TYPE_SHORT_PRESS
    };
    let keymap_flags = V1_TO_KEYMAP.translate(row.flags);

    let new_triggers = if triggers.is_empty() {
        vec![convert_trigger(&[], click_type)]
    } else {
        triggers
            .iter()
            .map(|t| convert_trigger(&t.keys, click_type))
            .collect()
    };

    Ok(new_triggers
        .into_iter()
        .map(|trigger| ConvertedKeymap {
            trigger,
            action_list: action_list.clone(),
            flags: keymap_flags,
            is_enabled: row.is_enabled,
        })
        .collect())
}

fn convert_trigger(key_codes: &[i64], click_type: i64) -> v2::Trigger {
    let keys: Vec<v2::TriggerKey> = key_codes
        .iter()
        .map(|&key_code| v2::TriggerKey {
            key_code,
            device_id: model::DEVICE_ID_ANY_DEVICE.to_owned(),
            click_type,
        })
        .collect();

    let mode = if keys.len() > 1 {
        model::MODE_PARALLEL
    } else {
        model::MODE_SEQUENCE
    };

    v2::Trigger {
        keys,
        extras: Vec::new(),
        mode,
    }
}

/// Version 1 stores wrote an absent action either as SQL NULL or as the text `NULL`.
fn stored_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| *text != "NULL")
}

fn convert_action(row: &LegacyRow) -> Result<Vec<v2::Action>, KeyMapperError> {
    let Some(old_type) = stored_text(&row.action_type) else {
        return Ok(Vec::new());
    };

    let action_type = ACTION_TYPES
        .iter()
        .find(|(old, _)| *old == old_type)
        .map(|(_, new)| (*new).to_owned())
        .ok_or_else(|| {
            KeyMapperError::transformation(row.id, format!("unknown action type '{}'", old_type))
        })?;

    let data = row.action_data.clone().ok_or_else(|| {
        KeyMapperError::transformation(row.id, format!("{} action has no data", old_type))
    })?;

    let extras: Vec<v2::Extra> = match stored_text(&row.action_extras) {
        Some(text) => model::decode(row.id, "action_extras", text)?,
        None => Vec::new(),
    };

    Ok(vec![v2::Action {
        action_type,
        data,
        extras,
        flags: V1_TO_ACTION.translate(row.flags),
    }])
}
