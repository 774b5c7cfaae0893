//! Legacy stores and row assertions shared by the migration tests.

use crate::database::{self, StoredRow};
use crate::json_compare;
use crate::migration;
use rusqlite::{params, Connection};
use std::path::Path;

use super::rows::{self, Columns, KeymapRow};

const META_SQL: &str = r#"
CREATE TABLE meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

const KEYMAPS_V1_SQL: &str = r#"
CREATE TABLE keymaps (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    trigger_list TEXT NOT NULL,
    flags INTEGER NOT NULL,
    is_enabled INTEGER NOT NULL,
    action_type TEXT,
    action_data TEXT,
    action_extras TEXT
);
"#;

const KEYMAPS_V2_SQL: &str = r#"
CREATE TABLE keymaps (
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

const KEYMAPS_V9_SQL: &str = r#"
CREATE TABLE keymaps (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    trigger TEXT NOT NULL,
    action_list TEXT NOT NULL,
    constraint_list TEXT NOT NULL,
    constraint_mode INTEGER NOT NULL,
    flags INTEGER NOT NULL,
    folder_name TEXT,
    is_enabled INTEGER NOT NULL,
    uid TEXT NOT NULL
);

CREATE UNIQUE INDEX index_keymaps_uid ON keymaps (uid);
"#;

/// An in-memory store with the `keymaps` table as it was at `version`.
pub fn legacy_connection(version: u32) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_legacy(&conn, version);
    conn
}

/// Same as `legacy_connection`, stored in a file at `path`.
pub fn legacy_file(path: &Path, version: u32) -> Connection {
    let conn = Connection::open(path).unwrap();
    init_legacy(&conn, version);
    conn
}

fn init_legacy(conn: &Connection, version: u32) {
    conn.execute_batch(META_SQL).unwrap();
    conn.execute(
        "INSERT INTO meta (key, value) VALUES ('schema_version', ?)",
        [version.to_string()],
    )
    .unwrap();

    let keymaps_sql = match version {
        1 => KEYMAPS_V1_SQL,
        2..=8 => KEYMAPS_V2_SQL,
        _ => KEYMAPS_V9_SQL,
    };
    conn.execute_batch(keymaps_sql).unwrap();
}

pub fn insert_v1(conn: &Connection, id: i64, trigger_list: &str, flags: i64, action: Option<(&str, &str, &str)>) {
    conn.execute(
        "INSERT INTO keymaps (id, trigger_list, flags, is_enabled, action_type, action_data, action_extras)
         VALUES (?, ?, ?, 1, ?, ?, ?)",
        params![
            id,
            trigger_list,
            flags,
            action.map(|a| a.0),
            action.map(|a| a.1),
            action.map(|a| a.2),
        ],
    )
    .unwrap();
}

/// Insert a version 2–8 row with default constraint mode, no folder, enabled.
pub fn insert_keymap(conn: &Connection, id: i64, trigger: &str, action_list: &str, constraint_list: &str, flags: i64) {
    conn.execute(
        "INSERT INTO keymaps (id, trigger, action_list, constraint_list, constraint_mode, flags, folder_name, is_enabled)
         VALUES (?, ?, ?, ?, 1, ?, NULL, 1)",
        params![id, trigger, action_list, constraint_list, flags],
    )
    .unwrap();
}

/// Insert a version 9+ row with no constraints, no keymap flags, enabled.
pub fn insert_keymap_with_uid(
    conn: &Connection,
    id: i64,
    trigger: &str,
    action_list: &str,
    folder_name: &str,
    uid: &str,
) {
    conn.execute(
        "INSERT INTO keymaps (id, trigger, action_list, constraint_list, constraint_mode, flags, folder_name, is_enabled, uid)
         VALUES (?, ?, ?, '[]', 1, 0, ?, 1, ?)",
        params![id, trigger, action_list, folder_name, uid],
    )
    .unwrap();
}

pub fn keymap_row(id: i64, trigger: &str, action_list: &str, flags: i64) -> KeymapRow {
    KeymapRow {
        id,
        trigger: trigger.to_owned(),
        action_list: action_list.to_owned(),
        constraint_list: "[]".to_owned(),
        constraint_mode: 1,
        flags,
        folder_name: None,
        is_enabled: true,
        uid: None,
    }
}

pub fn snapshot(conn: &Connection) -> Vec<StoredRow> {
    database::query_all(conn, "keymaps").unwrap()
}

pub fn stored_version(conn: &Connection) -> u32 {
    migration::read_schema_version(conn).unwrap().unwrap()
}

/// The expected state of one row after a migration.
pub struct Expected {
    id: i64,
    trigger: String,
    action_list: String,
    constraint_list: String,
    constraint_mode: i64,
    flags: i64,
    folder_name: Option<String>,
    uid: Option<String>,
}

impl Expected {
    pub fn v2(
        id: i64,
        trigger: &str,
        action_list: &str,
        constraint_list: &str,
        constraint_mode: i64,
        flags: i64,
        folder_name: Option<&str>,
    ) -> Self {
        Expected {
            id,
            trigger: trigger.to_owned(),
            action_list: action_list.to_owned(),
            constraint_list: constraint_list.to_owned(),
            constraint_mode,
            flags,
            folder_name: folder_name.map(str::to_owned),
            uid: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn v9(
        id: i64,
        trigger: &str,
        action_list: &str,
        constraint_list: &str,
        constraint_mode: i64,
        flags: i64,
        folder_name: Option<&str>,
        uid: &str,
    ) -> Self {
        Expected {
            uid: Some(uid.to_owned()),
            ..Self::v2(id, trigger, action_list, constraint_list, constraint_mode, flags, folder_name)
        }
    }
}

/// Assert the store holds exactly `expected`, comparing JSON columns structurally.
pub fn assert_keymaps(conn: &Connection, expected: &[Expected]) {
    let columns = if expected.iter().any(|e| e.uid.is_some()) {
        Columns::WithUid
    } else {
        Columns::Base
    };
    let actual = rows::load_keymaps(conn, columns).unwrap();

    assert_eq!(actual.len(), expected.len(), "row count doesn't match");

    for (index, (actual, expected)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(actual.id, expected.id, "id at row {}", index);
        assert_eq!(actual.constraint_mode, expected.constraint_mode, "constraint_mode at row {}", index);
        assert_eq!(actual.flags, expected.flags, "flags at row {}", index);
        assert_eq!(actual.folder_name, expected.folder_name, "folder_name at row {}", index);
        assert!(actual.is_enabled, "is_enabled at row {}", index);
        if expected.uid.is_some() {
            assert_eq!(actual.uid, expected.uid, "uid at row {}", index);
        }

        for (column, actual_json, expected_json) in [
            ("trigger", &actual.trigger, &expected.trigger),
            ("action_list", &actual.action_list, &expected.action_list),
            ("constraint_list", &actual.constraint_list, &expected.constraint_list),
        ] {
            if let Err(mismatch) = json_compare::compare_text(
                expected_json,
                &format!("expected {} at row {}", column, index),
                actual_json,
                &format!("migrated {} at row {}", column, index),
            ) {
                panic!("{}", mismatch);
            }
        }
    }
}
