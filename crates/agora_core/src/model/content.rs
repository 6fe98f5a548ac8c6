//! Posts and comments.
//!
//! # Invariants
//! - `Post::comment_count` is maintained incrementally by comment creation and
//!   is never recomputed from the comments slice.
//! - `vote_score` only ever moves by vote deltas.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Denormalized author record attached to posts handed to UI surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    /// Soft reference; may point at a community that does not exist.
    pub community_id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_username: String,
    pub created_at: i64,
    pub vote_score: i64,
    pub comment_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl Post {
    /// Builds the author record from the stamped author fields.
    pub fn derived_author(&self) -> Author {
        Author {
            id: self.author_id.clone(),
            username: self.author_username.clone(),
            avatar_ref: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Soft reference to the parent post.
    pub post_id: String,
    pub author_id: String,
    pub author_username: String,
    pub content: String,
    pub created_at: i64,
    pub vote_score: i64,
}
