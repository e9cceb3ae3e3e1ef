use serde::{Deserialize, Serialize};

/// Contact label as returned by the labels API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    #[serde(default)]
    pub key: Option<String>,
    pub display_name: String,
}
