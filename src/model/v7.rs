use serde::{Deserialize, Serialize};

use super::v2::Extra;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct TriggerKey {
    pub key_code: i64,
    pub device_id: String,
    pub click_type: i64,
    pub flags: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
    pub keys: Vec<TriggerKey>,
    pub extras: Vec<Extra>,
    pub mode: i64,
    pub flags: i64,
}
