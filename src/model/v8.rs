use serde::{Deserialize, Serialize};

use super::v2::Extra;

/// A constraint's payload is carried by a typed extra, not a `data` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constraint {
    #[serde(rename = "type")]
    pub constraint_type: String,
    pub extras: Vec<Extra>,
}
