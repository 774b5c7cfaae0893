use crate::error::KeyMapperError;
use crate::model::{self, v2};
use log::info;
use rusqlite::Connection;

use super::rows::{self, Columns, KeymapRow};

/// Schema Upgrade: Version 3 → 4
///
/// Adds the "undefined" trigger mode. A trigger with fewer than two keys can't
/// meaningfully be parallel or a sequence, so it becomes undefined.
pub const UPGRADE_3_TO_4_POST_SQL: &str = r#"
UPDATE meta SET value = '4' WHERE key = 'schema_version';
"#;

pub fn migrate_3_to_4(conn: &Connection) -> Result<(), KeyMapperError> {
    let count = rows::rewrite_keymaps(conn, Columns::Base, transform)?;
    info!("Migration 3→4: Remapped trigger modes of {} keymaps", count);
    Ok(())
}

/// The version 4 mode for a version 3 trigger.
pub fn remap_mode(mode: i64, key_count: usize) -> Option<i64> {
    match mode {
        model::MODE_PARALLEL | model::MODE_SEQUENCE if key_count <= 1 => Some(model::MODE_UNDEFINED),
        model::MODE_PARALLEL | model::MODE_SEQUENCE => Some(mode),
        _ => None,
    }
}

pub fn transform(row: KeymapRow) -> Result<KeymapRow, KeyMapperError> {
    let mut trigger: v2::Trigger = model::decode(row.id, "trigger", &row.trigger)?;

    trigger.mode = remap_mode(trigger.mode, trigger.keys.len()).ok_or_else(|| {
        KeyMapperError::transformation(row.id, format!("unknown trigger mode {}", trigger.mode))
    })?;

    Ok(KeymapRow {
        trigger: model::encode(&trigger)?,
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
    fn test_migrate_3_to_4_fixture() {
        let keys_25 = format!(r#"[{{"clickType":0,"deviceId":"{THIS}","keyCode":25}}]"#);
        let t1 = |mode: i64| {
            format!(r#"{{"extras":[{{"data":"610","id":"extra_repeat_delay"}}],"keys":{keys_25},"mode":{mode}}}"#)
        };
        let t2 = |mode: i64| format!(r#"{{"extras":[],"keys":[],"mode":{mode}}}"#);
        let t3 = format!(
            r#"{{"extras":[],"keys":[{{"clickType":0,"deviceId":"{THIS}","keyCode":25}},{{"clickType":0,"deviceId":"{THIS}","keyCode":24}}],"mode":0}}"#
        );
        let t4 = format!(
            r#"{{"extras":[],"keys":[{{"clickType":1,"deviceId":"{THIS}","keyCode":25}},{{"clickType":1,"deviceId":"{THIS}","keyCode":24}}],"mode":0}}"#
        );
        let a1 = r#"[{"data":"10","extras":[],"flags":0,"type":"KEY_EVENT"}]"#;
        let a3 = r#"[{"data":"enable_mobile_data","extras":[],"flags":0,"type":"SYSTEM_ACTION"}]"#;
        let a4 = r#"[{"data":"14","extras":[],"flags":0,"type":"KEY_EVENT"}]"#;

        let mut conn = fixtures::legacy_connection(3);
        fixtures::insert_keymap(&conn, 1, &t1(1), a1, "[]", 17);
        fixtures::insert_keymap(&conn, 2, &t2(1), "[]", "[]", 0);
        fixtures::insert_keymap(&conn, 3, &t3, a3, "[]", 0);
        fixtures::insert_keymap(&conn, 4, &t4, a4, "[]", 16);

        migrate(&mut conn, 3, 4).unwrap();

        fixtures::assert_keymaps(
            &conn,
            &[
                Expected::v2(1, &t1(2), a1, "[]", 1, 17, None),
                Expected::v2(2, &t2(2), "[]", "[]", 1, 0, None),
                Expected::v2(3, &t3, a3, "[]", 1, 0, None),
                Expected::v2(4, &t4, a4, "[]", 1, 16, None),
            ],
        );
    }

    #[test]
    fn test_remap_mode_table() {
        assert_eq!(remap_mode(model::MODE_SEQUENCE, 0), Some(model::MODE_UNDEFINED));
        assert_eq!(remap_mode(model::MODE_PARALLEL, 1), Some(model::MODE_UNDEFINED));
        assert_eq!(remap_mode(model::MODE_SEQUENCE, 3), Some(model::MODE_SEQUENCE));
        assert_eq!(remap_mode(model::MODE_PARALLEL, 2), Some(model::MODE_PARALLEL));
        assert_eq!(remap_mode(7, 2), None);
    }

    #[test]
    fn test_unknown_mode_is_a_transformation_error() {
        let row = fixtures::keymap_row(8, r#"{"extras":[],"keys":[],"mode":9}"#, "[]", 0);
        let err = transform(row).unwrap_err();
        assert!(matches!(err, KeyMapperError::TransformationError { row_id: 8, .. }));
    }
}
