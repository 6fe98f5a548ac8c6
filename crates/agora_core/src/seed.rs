//! Demonstration seed data.
//!
//! These literals are the registry defaults for the built-in store, which
//! makes them the exact values every prerendered page observes.
//!
//! # Invariants
//! - Seeded `comment_count` values match the seeded comments per post.
//! - Timestamps are fixed literals, never the current clock.

use crate::model::community::{Community, Membership};
use crate::model::content::{Comment, Post};
use crate::model::user::SessionUser;
use crate::model::vote::VoteBook;
use std::collections::BTreeSet;

const SEED_EPOCH_MS: i64 = 1_704_067_200_000;
const DAY_MS: i64 = 86_400_000;

/// Initial value for every registered slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Seed {
    pub communities: Vec<Community>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub current_user: Option<SessionUser>,
    pub votes: VoteBook,
}

impl Seed {
    /// Seed with every slice empty and no session user.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in demonstration data shared by all admin surfaces.
    pub fn demo() -> Self {
        Self {
            communities: vec![
                community(
                    "1",
                    "Rust Learners",
                    "Questions, answers and war stories from people picking up Rust.",
                    1_284,
                    0,
                    &["programming", "rust"],
                ),
                community(
                    "2",
                    "Home Espresso",
                    "Grinders, baskets and dialing in shots at home.",
                    312,
                    3,
                    &["coffee", "hobby"],
                ),
                community(
                    "3",
                    "Trail Running",
                    "Routes, gear and race reports.",
                    97,
                    7,
                    &["outdoors", "running"],
                ),
            ],
            posts: vec![
                post(
                    "101",
                    "1",
                    "Borrow checker finally clicked",
                    "Thinking in terms of who owns the data made everything easier.",
                    ("seed-user-1", "ferris"),
                    10,
                    42,
                    2,
                    &["ownership"],
                ),
                post(
                    "102",
                    "1",
                    "Favourite crates for CLIs?",
                    "Looking for argument parsing and logging recommendations.",
                    ("seed-user-2", "crab_walker"),
                    11,
                    17,
                    1,
                    &["cli", "crates"],
                ),
                post(
                    "201",
                    "2",
                    "Channeling with a new basket",
                    "Switched to a precision basket and shots are running fast.",
                    ("seed-user-3", "crema"),
                    12,
                    5,
                    0,
                    &["espresso"],
                ),
            ],
            comments: vec![
                comment(
                    "1001",
                    "101",
                    ("seed-user-2", "crab_walker"),
                    "Same here, took a couple of weeks.",
                    13,
                    4,
                ),
                comment(
                    "1002",
                    "101",
                    ("seed-user-3", "crema"),
                    "Lifetimes were the last piece for me.",
                    14,
                    2,
                ),
                comment(
                    "1003",
                    "102",
                    ("seed-user-1", "ferris"),
                    "Clap and tracing are hard to beat.",
                    15,
                    6,
                ),
            ],
            current_user: None,
            votes: VoteBook::new(),
        }
    }
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn community(
    id: &str,
    name: &str,
    description: &str,
    members: u64,
    age_days: i64,
    tag_values: &[&str],
) -> Community {
    Community {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        members: Membership::Count(members),
        image_ref: None,
        created_at: SEED_EPOCH_MS + age_days * DAY_MS,
        tags: tags(tag_values),
    }
}

#[allow(clippy::too_many_arguments)]
fn post(
    id: &str,
    community_id: &str,
    title: &str,
    content: &str,
    (author_id, author_username): (&str, &str),
    day: i64,
    vote_score: i64,
    comment_count: u64,
    tag_values: &[&str],
) -> Post {
    Post {
        id: id.to_string(),
        community_id: community_id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        author_id: author_id.to_string(),
        author_username: author_username.to_string(),
        created_at: SEED_EPOCH_MS + day * DAY_MS,
        vote_score,
        comment_count,
        image_ref: None,
        tags: tags(tag_values),
        author: None,
    }
}

fn comment(
    id: &str,
    post_id: &str,
    (author_id, author_username): (&str, &str),
    content: &str,
    day: i64,
    vote_score: i64,
) -> Comment {
    Comment {
        id: id.to_string(),
        post_id: post_id.to_string(),
        author_id: author_id.to_string(),
        author_username: author_username.to_string(),
        content: content.to_string(),
        created_at: SEED_EPOCH_MS + day * DAY_MS,
        vote_score,
    }
}

#[cfg(test)]
mod tests {
    use super::Seed;

    #[test]
    fn demo_comment_counts_match_seeded_comments() {
        let seed = Seed::demo();
        for post in &seed.posts {
            let live = seed
                .comments
                .iter()
                .filter(|comment| comment.post_id == post.id)
                .count() as u64;
            assert_eq!(post.comment_count, live, "post {} count drifted", post.id);
        }
    }

    #[test]
    fn demo_seed_has_no_session_user() {
        assert!(Seed::demo().current_user.is_none());
    }
}
