use crate::error::KeyMapperError;
use crate::model::flags::ACTION_TO_TRIGGER;
use crate::model::{self, v9};
use log::info;
use rusqlite::Connection;

use super::rows::{self, Columns, KeymapRow};

/// Schema Upgrade: Version 9 → 10
///
/// The "performing action" toast is shown once per trigger, not once per
/// action. The bits in `ACTION_TO_TRIGGER` are cleared on every action, and set
/// on the trigger when any action in the list carried them. Uids are kept.
pub const UPGRADE_9_TO_10_POST_SQL: &str = r#"
UPDATE meta SET value = '10' WHERE key = 'schema_version';
"#;

pub fn migrate_9_to_10(conn: &Connection) -> Result<(), KeyMapperError> {
    let count = rows::rewrite_keymaps(conn, Columns::WithUid, transform)?;
    info!("Migration 9→10: Moved action toast flags onto the trigger of {} keymaps", count);
    Ok(())
}

pub fn transform(row: KeymapRow) -> Result<KeymapRow, KeyMapperError> {
    let mut trigger: v9::Trigger = model::decode(row.id, "trigger", &row.trigger)?;
    let mut actions: Vec<v9::Action> = model::decode(row.id, "action_list", &row.action_list)?;

    let gathered = actions
        .iter()
        .fold(0, |acc, action| acc | ACTION_TO_TRIGGER.translate(action.flags));
    trigger.flags |= gathered;

    for action in &mut actions {
        action.flags = ACTION_TO_TRIGGER.strip(action.flags);
    }

    Ok(KeymapRow {
        trigger: model::encode(&trigger)?,
        action_list: model::encode(&actions)?,
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
    fn test_migrate_9_to_10_fixture() {
        let key = format!(
            r#"[{{"clickType":0,"deviceId":"{THIS}","flags":0,"keyCode":25,"uid":"9d5d6f0b-1b9a-44ba-9406-1caaacea05de"}}]"#
        );
        let trigger = |flags: i64, keys: &str| format!(r#"{{"extras":[],"flags":{flags},"keys":{keys},"mode":2}}"#);

        let a1 = |flags: i64| {
            format!(r#"[{{"data":"com.google.android.contacts","extras":[],"flags":{flags},"type":"APP","uid":"dc2d8c69-aaa5-4471-b981-17cba7677c1a"}}]"#)
        };
        let a2 = |flags: i64| {
            format!(r#"[{{"data":"com.discord","extras":[],"flags":{flags},"type":"APP","uid":"86c78374-59ce-4050-94a4-299f4778658f"}}]"#)
        };
        let a3 = |f1: i64, f3: i64| {
            format!(
                r#"[{{"data":"com.google.android.vr.home","extras":[],"flags":{f1},"type":"APP","uid":"ca5b18ee-2673-4443-b2a7-cedef2c455b2"}},{{"data":"com.google.android.calendar","extras":[],"flags":0,"type":"APP","uid":"d274a5a8-f48e-4fbf-acbd-ed3c4b4ff377"}},{{"data":"enable_mobile_data","extras":[],"flags":{f3},"type":"SYSTEM_ACTION","uid":"f6b2afc5-4265-403d-8a0f-4eacf245286f"}}]"#
            )
        };

        let mut conn = fixtures::legacy_connection(9);
        fixtures::insert_keymap_with_uid(&conn, 1, &trigger(0, "[]"), &a1(2), "", "d314e9e8-fac9-43e7-b540-0b9c0bfb4238");
        fixtures::insert_keymap_with_uid(&conn, 2, &trigger(1, &key), &a2(2), "", "b854ece7-2f0e-45c4-9cf3-bb5aa4fad288");
        fixtures::insert_keymap_with_uid(&conn, 3, &trigger(0, "[]"), &a3(2, 2), "", "75ab7552-c175-4df4-9f50-1a9b86e717cc");

        migrate(&mut conn, 9, 10).unwrap();

        fixtures::assert_keymaps(
            &conn,
            &[
                Expected::v9(1, &trigger(16, "[]"), &a1(0), "[]", 1, 0, Some(""), "d314e9e8-fac9-43e7-b540-0b9c0bfb4238"),
                Expected::v9(2, &trigger(17, &key), &a2(0), "[]", 1, 0, Some(""), "b854ece7-2f0e-45c4-9cf3-bb5aa4fad288"),
                Expected::v9(3, &trigger(16, "[]"), &a3(0, 0), "[]", 1, 0, Some(""), "75ab7552-c175-4df4-9f50-1a9b86e717cc"),
            ],
        );
    }

    #[test]
    fn test_no_toast_leaves_trigger_flags_alone() {
        let mut row = fixtures::keymap_row(
            1,
            r#"{"extras":[],"flags":1,"keys":[],"mode":2}"#,
            r#"[{"data":"a","extras":[],"flags":5,"type":"APP","uid":"x"}]"#,
            0,
        );
        row.uid = Some("keymap".to_owned());

        let migrated = transform(row).unwrap();
        let trigger: v9::Trigger = serde_json::from_str(&migrated.trigger).unwrap();
        let actions: Vec<v9::Action> = serde_json::from_str(&migrated.action_list).unwrap();
        assert_eq!(trigger.flags, 1);
        assert_eq!(actions[0].flags, 5);
        assert_eq!(actions[0].uid, "x");
        assert_eq!(migrated.uid.as_deref(), Some("keymap"));
    }
}
