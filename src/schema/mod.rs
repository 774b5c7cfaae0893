mod base;
pub mod rows;
pub mod v1_to_v2;
pub mod v2_to_v3;
pub mod v3_to_v4;
pub mod v4_to_v5;
pub mod v5_to_v6;
pub mod v6_to_v7;
pub mod v7_to_v8;
pub mod v8_to_v9;
pub mod v9_to_v10;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::error::KeyMapperError;
use rusqlite::Connection;

/// Function type for migration code that transforms data during schema upgrades.
pub type MigrationFn = fn(&Connection) -> Result<(), KeyMapperError>;

pub use base::CREATE_SCHEMA_SQL;

/// The schema version this build reads and writes.
pub const SCHEMA_VERSION: u32 = 10;

/// The oldest schema version that can be migrated.
pub const OLDEST_SCHEMA_VERSION: u32 = 1;

/// Migration descriptor supporting 3-phase migrations:
/// - pre_sql: SQL batch to run before Rust code (optional)
/// - code_fn: Rust function that rewrites the stored rows (optional)
/// - post_sql: SQL batch to run after Rust code (optional)
///
/// Every keymap migration rewrites JSON, so all of them carry a `code_fn`.
/// The schema version bump always lives in the last SQL phase.
pub struct Migration {
    pub from: u32,
    pub to: u32,
    pub pre_sql: Option<&'static str>,
    pub code_fn: Option<MigrationFn>,
    pub post_sql: Option<&'static str>,
}

impl Migration {
    /// A migration whose schema change fits in SQL around the row rewrite.
    pub const fn with_code(
        from: u32,
        pre_sql: Option<&'static str>,
        code_fn: MigrationFn,
        post_sql: &'static str,
    ) -> Self {
        Self {
            from,
            to: from + 1,
            pre_sql,
            code_fn: Some(code_fn),
            post_sql: Some(post_sql),
        }
    }
}

pub const MIGRATION_1_TO_2: Migration = Migration::with_code(
    1,
    Some(v1_to_v2::UPGRADE_1_TO_2_PRE_SQL),
    v1_to_v2::migrate_1_to_2,
    v1_to_v2::UPGRADE_1_TO_2_POST_SQL,
);
pub const MIGRATION_2_TO_3: Migration =
    Migration::with_code(2, None, v2_to_v3::migrate_2_to_3, v2_to_v3::UPGRADE_2_TO_3_POST_SQL);
pub const MIGRATION_3_TO_4: Migration =
    Migration::with_code(3, None, v3_to_v4::migrate_3_to_4, v3_to_v4::UPGRADE_3_TO_4_POST_SQL);
pub const MIGRATION_4_TO_5: Migration =
    Migration::with_code(4, None, v4_to_v5::migrate_4_to_5, v4_to_v5::UPGRADE_4_TO_5_POST_SQL);
pub const MIGRATION_5_TO_6: Migration =
    Migration::with_code(5, None, v5_to_v6::migrate_5_to_6, v5_to_v6::UPGRADE_5_TO_6_POST_SQL);
pub const MIGRATION_6_TO_7: Migration =
    Migration::with_code(6, None, v6_to_v7::migrate_6_to_7, v6_to_v7::UPGRADE_6_TO_7_POST_SQL);
pub const MIGRATION_7_TO_8: Migration =
    Migration::with_code(7, None, v7_to_v8::migrate_7_to_8, v7_to_v8::UPGRADE_7_TO_8_POST_SQL);
pub const MIGRATION_8_TO_9: Migration = Migration::with_code(
    8,
    Some(v8_to_v9::UPGRADE_8_TO_9_PRE_SQL),
    v8_to_v9::migrate_8_to_9,
    v8_to_v9::UPGRADE_8_TO_9_POST_SQL,
);
pub const MIGRATION_9_TO_10: Migration =
    Migration::with_code(9, None, v9_to_v10::migrate_9_to_10, v9_to_v10::UPGRADE_9_TO_10_POST_SQL);

/// The registered (n, n + 1) migration starting at `from`.
pub fn migration_for(from: u32) -> Option<&'static Migration> {
    match from {
        1 => Some(&MIGRATION_1_TO_2),
        2 => Some(&MIGRATION_2_TO_3),
        3 => Some(&MIGRATION_3_TO_4),
        4 => Some(&MIGRATION_4_TO_5),
        5 => Some(&MIGRATION_5_TO_6),
        6 => Some(&MIGRATION_6_TO_7),
        7 => Some(&MIGRATION_7_TO_8),
        8 => Some(&MIGRATION_8_TO_9),
        9 => Some(&MIGRATION_9_TO_10),
        _ => None,
    }
}
