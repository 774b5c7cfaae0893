use serde::{Deserialize, Serialize};

/// One element of the version 1 `trigger_list` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
    pub keys: Vec<i64>,
}
