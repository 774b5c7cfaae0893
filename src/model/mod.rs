//! Stored JSON shapes, one module per shape era.
//!
//! A shape module is named after the first schema version that uses it and
//! stays in effect until the next module takes over:
//!
//! | module | trigger | action | constraint |
//! |--------|---------|--------|------------|
//! | `v1`   | 1       | 1      | -          |
//! | `v2`   | 2–5     | 2–8    | 2–7        |
//! | `v6`   | 6       |        |            |
//! | `v7`   | 7–8     |        |            |
//! | `v8`   |         |        | 8–10       |
//! | `v9`   | 9–10    | 9–10   |            |
//!
//! Transformers convert between two concrete shapes, never through a shared
//! evolving type.

use crate::error::KeyMapperError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod flags;
pub mod v1;
pub mod v2;
pub mod v6;
pub mod v7;
pub mod v8;
pub mod v9;

/// Shapes used by the current schema version.
pub mod current {
    pub use super::v2::Extra;
    pub use super::v8::Constraint;
    pub use super::v9::{Action, Trigger, TriggerKey};
}

pub const DEVICE_ID_ANY_DEVICE: &str = "io.github.sds100.keymapper.ANY_DEVICE";
pub const DEVICE_ID_THIS_DEVICE: &str = "io.github.sds100.keymapper.THIS_DEVICE";

pub const CLICK_TYPE_SHORT_PRESS: i64 = 0;
pub const CLICK_TYPE_LONG_PRESS: i64 = 1;
pub const CLICK_TYPE_DOUBLE_PRESS: i64 = 2;

pub const MODE_PARALLEL: i64 = 0;
pub const MODE_SEQUENCE: i64 = 1;
/// Only exists from schema version 4.
pub const MODE_UNDEFINED: i64 = 2;

pub const CONSTRAINT_MODE_AND: i64 = 1;
pub const CONSTRAINT_MODE_OR: i64 = 2;

pub const ACTION_TYPE_KEY_EVENT: &str = "KEY_EVENT";

/// Decode one stored JSON column under the shape `T`.
pub fn decode<T: DeserializeOwned>(row_id: i64, column: &'static str, text: &str) -> Result<T, KeyMapperError> {
    serde_json::from_str(text).map_err(|e| KeyMapperError::parse(row_id, column, e))
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, KeyMapperError> {
    serde_json::to_string(value)
        .map_err(|e| KeyMapperError::Error(format!("Failed to serialize keymap JSON: {}", e)))
}
