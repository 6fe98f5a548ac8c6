//! Session user record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The signed-in user. At most one exists per store instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
    #[serde(default)]
    pub joined_community_ids: BTreeSet<String>,
}

impl SessionUser {
    pub fn has_joined(&self, community_id: &str) -> bool {
        self.joined_community_ids.contains(community_id)
    }
}
