use crate::error::KeyMapperError;
use crate::model::flags::keymap::FLAG_REPEAT_ACTIONS;
use crate::model::{self, v2};
use log::info;
use rusqlite::Connection;

use super::rows::{self, Columns, KeymapRow};

/// Schema Upgrade: Version 2 → 3
///
/// Key event actions used to repeat while the trigger was held. Version 3 makes
/// that opt-in through a keymap flag, so keymaps with a key event action get
/// the flag to keep behaving the same. No JSON changes shape.
pub const UPGRADE_2_TO_3_POST_SQL: &str = r#"
UPDATE meta SET value = '3' WHERE key = 'schema_version';
"#;

pub fn migrate_2_to_3(conn: &Connection) -> Result<(), KeyMapperError> {
    let count = rows::rewrite_keymaps(conn, Columns::Base, transform)?;
    info!("Migration 2→3: Checked {} keymaps for key event actions", count);
    Ok(())
}

pub fn transform(row: KeymapRow) -> Result<KeymapRow, KeyMapperError> {
    let actions: Vec<v2::Action> = model::decode(row.id, "action_list", &row.action_list)?;

    let has_key_event = actions
        .iter()
        .any(|a| a.action_type == model::ACTION_TYPE_KEY_EVENT);

    Ok(KeymapRow {
        flags: if has_key_event {
            row.flags | FLAG_REPEAT_ACTIONS
        } else {
            row.flags
        },
        ..row
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::migrate;
    use crate::schema::fixtures::{self, Expected};

    const THIS: &str = model::DEVICE_ID_THIS_DEVICE;

    #[test]
    fn test_migrate_2_to_3_fixture() {
        let t1 = format!(
            r#"{{"extras":[{{"data":"610","id":"extra_repeat_delay"}}],"keys":[{{"clickType":0,"deviceId":"{THIS}","keyCode":25}}],"mode":1}}"#
        );
        let t2 = r#"{"extras":[],"keys":[],"mode":1}"#;
        let t3 = format!(
            r#"{{"extras":[],"keys":[{{"clickType":0,"deviceId":"{THIS}","keyCode":25}},{{"clickType":0,"deviceId":"{THIS}","keyCode":24}}],"mode":0}}"#
        );
        let t4 = format!(
            r#"{{"extras":[],"keys":[{{"clickType":1,"deviceId":"{THIS}","keyCode":25}},{{"clickType":1,"deviceId":"{THIS}","keyCode":24}}],"mode":0}}"#
        );
        let a1 = r#"[{"data":"10","extras":[],"flags":0,"type":"KEY_EVENT"}]"#;
        let a3 = r#"[{"data":"enable_mobile_data","extras":[],"flags":0,"type":"SYSTEM_ACTION"}]"#;
        let a4 = r#"[{"data":"14","extras":[],"flags":0,"type":"KEY_EVENT"}]"#;

        let mut conn = fixtures::legacy_connection(2);
        fixtures::insert_keymap(&conn, 1, &t1, a1, "[]", 1);
        fixtures::insert_keymap(&conn, 2, t2, "[]", "[]", 0);
        fixtures::insert_keymap(&conn, 3, &t3, a3, "[]", 0);
        fixtures::insert_keymap(&conn, 4, &t4, a4, "[]", 0);

        migrate(&mut conn, 2, 3).unwrap();

        fixtures::assert_keymaps(
            &conn,
            &[
                Expected::v2(1, &t1, a1, "[]", 1, 17, None),
                Expected::v2(2, t2, "[]", "[]", 1, 0, None),
                Expected::v2(3, &t3, a3, "[]", 1, 0, None),
                Expected::v2(4, &t4, a4, "[]", 1, 16, None),
            ],
        );
    }

    #[test]
    fn test_zero_flags_without_key_events_stay_zero() {
        let row = fixtures::keymap_row(1, r#"{"extras":[],"keys":[],"mode":1}"#, "[]", 0);
        assert_eq!(transform(row).unwrap().flags, 0);
    }
}
