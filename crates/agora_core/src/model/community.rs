//! Community records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Membership figure attached to a community.
///
/// Seeded data carries a plain count, while some surfaces attach the
/// expanded member id list instead. Both shapes are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Membership {
    Count(u64),
    Members(Vec<String>),
}

impl Membership {
    /// Returns the number of members regardless of representation.
    pub fn count(&self) -> u64 {
        match self {
            Self::Count(count) => *count,
            Self::Members(members) => members.len() as u64,
        }
    }
}

impl Default for Membership {
    fn default() -> Self {
        Self::Count(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "memberCount")]
    pub members: Membership,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub created_at: i64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Community {
    pub fn member_count(&self) -> u64 {
        self.members.count()
    }
}

#[cfg(test)]
mod tests {
    use super::Membership;

    #[test]
    fn membership_count_covers_both_shapes() {
        assert_eq!(Membership::Count(42).count(), 42);
        assert_eq!(
            Membership::Members(vec!["u1".to_string(), "u2".to_string()]).count(),
            2
        );
    }

    #[test]
    fn membership_deserializes_from_number_or_list() {
        let count: Membership = serde_json::from_str("7").expect("number should parse");
        assert_eq!(count, Membership::Count(7));

        let members: Membership =
            serde_json::from_str(r#"["a","b","c"]"#).expect("list should parse");
        assert_eq!(members.count(), 3);
    }
}
