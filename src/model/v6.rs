use serde::{Deserialize, Serialize};

use super::v2::{Extra, TriggerKey};

/// The keymap flags now live on the trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
    pub keys: Vec<TriggerKey>,
    pub extras: Vec<Extra>,
    pub mode: i64,
    pub flags: i64,
}
