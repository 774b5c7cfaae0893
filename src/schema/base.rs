/// Schema for a brand new store, at the current schema version.
pub const CREATE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', '10');

CREATE TABLE IF NOT EXISTS keymaps (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    trigger TEXT NOT NULL,          -- JSON object: keys, extras, mode, flags
    action_list TEXT NOT NULL,      -- JSON array of actions
    constraint_list TEXT NOT NULL,  -- JSON array of constraints
    constraint_mode INTEGER NOT NULL,
    flags INTEGER NOT NULL,
    folder_name TEXT,
    is_enabled INTEGER NOT NULL,
    uid TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS index_keymaps_uid ON keymaps (uid);
"#;
