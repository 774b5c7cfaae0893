use crate::error::KeyMapperError;
use crate::model::{self, v2, v8};
use log::info;
use rusqlite::Connection;
use strum::{AsRefStr, EnumString};

use super::rows::{self, Columns, KeymapRow};

/// Schema Upgrade: Version 7 → 8
///
/// Constraint types are renamed to their lower case identifiers and the
/// untyped `data` payload becomes a named extra, so constraints with more than
/// one parameter can be stored the same way as actions.
pub const UPGRADE_7_TO_8_POST_SQL: &str = r#"
UPDATE meta SET value = '8' WHERE key = 'schema_version';
"#;

pub const EXTRA_PACKAGE_NAME: &str = "extra_package_name";
pub const EXTRA_BT_ADDRESS: &str = "extra_bluetooth_device_address";

/// Constraint types as stored up to version 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LegacyConstraintType {
    AppForeground,
    AppNotForeground,
    BtDeviceConnected,
    BtDeviceDisconnected,
    ScreenOn,
    ScreenOff,
}

/// Constraint types from version 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConstraintType {
    AppForeground,
    AppNotForeground,
    BtDeviceConnected,
    BtDeviceDisconnected,
    ScreenOn,
    ScreenOff,
}

impl LegacyConstraintType {
    /// The new type and the extra its `data` payload moves into, if any.
    pub fn upgrade(self) -> (ConstraintType, Option<&'static str>) {
        match self {
            Self::AppForeground => (ConstraintType::AppForeground, Some(EXTRA_PACKAGE_NAME)),
            Self::AppNotForeground => (ConstraintType::AppNotForeground, Some(EXTRA_PACKAGE_NAME)),
            Self::BtDeviceConnected => (ConstraintType::BtDeviceConnected, Some(EXTRA_BT_ADDRESS)),
            Self::BtDeviceDisconnected => (ConstraintType::BtDeviceDisconnected, Some(EXTRA_BT_ADDRESS)),
            Self::ScreenOn => (ConstraintType::ScreenOn, None),
            Self::ScreenOff => (ConstraintType::ScreenOff, None),
        }
    }
}

pub fn migrate_7_to_8(conn: &Connection) -> Result<(), KeyMapperError> {
    let count = rows::rewrite_keymaps(conn, Columns::Base, transform)?;
    info!("Migration 7→8: Converted the constraints of {} keymaps", count);
    Ok(())
}

pub fn transform(row: KeymapRow) -> Result<KeymapRow, KeyMapperError> {
    let old: Vec<v2::Constraint> = model::decode(row.id, "constraint_list", &row.constraint_list)?;

    let constraints = old
        .into_iter()
        .map(|c| convert_constraint(row.id, c))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(KeymapRow {
        constraint_list: model::encode(&constraints)?,
        ..row
    })
}

fn convert_constraint(row_id: i64, old: v2::Constraint) -> Result<v8::Constraint, KeyMapperError> {
    let legacy_type: LegacyConstraintType = old.constraint_type.parse().map_err(|_| {
        KeyMapperError::transformation(
            row_id,
            format!("unknown constraint type '{}'", old.constraint_type),
        )
    })?;

    let (new_type, payload_extra) = legacy_type.upgrade();

    let mut extras = Vec::with_capacity(old.extras.len() + 1);
    if let Some(extra_id) = payload_extra {
        if old.data.is_empty() {
            return Err(KeyMapperError::transformation(
                row_id,
                format!("{} constraint has no payload", legacy_type.as_ref()),
            ));
        }
        extras.push(v2::Extra::new(extra_id, old.data));
    }
    extras.extend(old.extras);

    Ok(v8::Constraint {
        constraint_type: new_type.as_ref().to_owned(),
        extras,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::migrate;
    use crate::schema::fixtures::{self, Expected};

    const TRIGGER: &str = r#"{"extras":[],"flags":0,"keys":[],"mode":2}"#;

    #[test]
    fn test_migrate_7_to_8_moves_payloads_into_extras() {
        let before = r#"[
            {"type":"APP_FOREGROUND","data":"com.android.chrome","extras":[]},
            {"type":"BT_DEVICE_CONNECTED","data":"00:11:22:33:44:55","extras":[{"id":"extra_bluetooth_device_name","data":"Headphones"}]},
            {"type":"SCREEN_OFF","data":"","extras":[]}
        ]"#;
        let after = r#"[
            {"type":"app_foreground","extras":[{"id":"extra_package_name","data":"com.android.chrome"}]},
            {"type":"bt_device_connected","extras":[{"id":"extra_bluetooth_device_address","data":"00:11:22:33:44:55"},{"id":"extra_bluetooth_device_name","data":"Headphones"}]},
            {"type":"screen_off","extras":[]}
        ]"#;

        let mut conn = fixtures::legacy_connection(7);
        fixtures::insert_keymap(&conn, 1, TRIGGER, "[]", before, 0);
        fixtures::insert_keymap(&conn, 2, TRIGGER, "[]", "[]", 0);

        migrate(&mut conn, 7, 8).unwrap();

        fixtures::assert_keymaps(
            &conn,
            &[
                Expected::v2(1, TRIGGER, "[]", after, 1, 0, None),
                Expected::v2(2, TRIGGER, "[]", "[]", 1, 0, None),
            ],
        );
    }

    #[test]
    fn test_type_names_round_trip_through_strum() {
        assert_eq!(
            "APP_NOT_FOREGROUND".parse::<LegacyConstraintType>().unwrap(),
            LegacyConstraintType::AppNotForeground
        );
        assert_eq!(ConstraintType::BtDeviceDisconnected.as_ref(), "bt_device_disconnected");
        assert!("app_foreground".parse::<LegacyConstraintType>().is_err());
    }

    #[test]
    fn test_unknown_constraint_type_is_rejected() {
        let mut row = fixtures::keymap_row(5, TRIGGER, "[]", 0);
        row.constraint_list = r#"[{"type":"WIFI_CONNECTED","data":"home","extras":[]}]"#.to_owned();
        assert!(matches!(
            transform(row).unwrap_err(),
            KeyMapperError::TransformationError { row_id: 5, .. }
        ));
    }

    #[test]
    fn test_missing_payload_is_rejected() {
        let mut row = fixtures::keymap_row(6, TRIGGER, "[]", 0);
        row.constraint_list = r#"[{"type":"APP_FOREGROUND","data":"","extras":[]}]"#.to_owned();
        assert!(matches!(
            transform(row).unwrap_err(),
            KeyMapperError::TransformationError { row_id: 6, .. }
        ));
    }
}
