//! Forum use-case service.
//!
//! # Responsibility
//! - Provide list/get pass-throughs with author enrichment.
//! - Create communities, posts and comments stamped with the session user.
//! - Apply votes as deltas against a per-user ledger.
//! - Manage session bootstrap and community membership.
//!
//! # Invariants
//! - `Post::comment_count` grows by exactly one per created comment, in the
//!   same call that appends the comment.
//! - A repeat vote adjusts `vote_score` by `new - old`, never by `new`.
//! - Joined community ids behave as a set.

use crate::model::community::{Community, Membership};
use crate::model::content::{Comment, Post};
use crate::model::user::SessionUser;
use crate::model::vote::{VoteTarget, VoteValue};
use crate::model::{new_record_id, now_epoch_ms};
use crate::selectors;
use crate::store::{Next, Store, StoreError, COMMENTS, COMMUNITIES, CURRENT_USER, POSTS, VOTES};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for forum use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Operation requires a session user and none is signed in.
    NotAuthenticated,
    /// Mutation attempted before the store was hydrated.
    NotHydrated,
    /// Vote value outside `-1..=1`.
    InvalidVote(i64),
    /// Required text input is blank.
    InvalidInput(&'static str),
    /// Store-level wiring failure.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "operation requires a signed-in user"),
            Self::NotHydrated => write!(f, "store is not hydrated; mutations are unavailable"),
            Self::InvalidVote(value) => write!(f, "vote value must be -1, 0 or 1, got {value}"),
            Self::InvalidInput(details) => write!(f, "invalid input: {details}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Session bootstrap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub username: String,
    pub email: String,
    pub avatar_ref: Option<String>,
}

/// Request model for creating a community.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
    pub image_ref: Option<String>,
    pub tags: Vec<String>,
}

/// Request model for creating a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub community_id: String,
    pub title: String,
    pub content: String,
    pub image_ref: Option<String>,
    pub tags: Vec<String>,
}

/// Forum service facade over one store.
#[derive(Clone)]
pub struct ForumService {
    store: Store,
}

impl ForumService {
    /// Creates a service bound to the given store handle.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Signs in a fresh session user, replacing any current one.
    pub fn sign_in(&self, request: SignIn) -> ServiceResult<SessionUser> {
        self.require_hydrated()?;
        let username = require_text(&request.username, "username must not be blank")?;
        let email = require_text(&request.email, "email must not be blank")?;

        let user = SessionUser {
            id: new_record_id(),
            username,
            email,
            avatar_ref: request.avatar_ref,
            joined_community_ids: BTreeSet::new(),
        };
        self.store.write(&CURRENT_USER, Some(user.clone()))?;
        info!(
            "event=session_sign_in module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Clears the session user. Returns whether one was signed in.
    pub fn sign_out(&self) -> ServiceResult<bool> {
        self.require_hydrated()?;
        let previous = self.store.read(&CURRENT_USER)?;
        self.store.write(&CURRENT_USER, None::<SessionUser>)?;
        info!(
            "event=session_sign_out module=service status=ok had_user={}",
            previous.is_some()
        );
        Ok(previous.is_some())
    }

    pub fn current_user(&self) -> ServiceResult<Option<SessionUser>> {
        Ok(self.store.read(&CURRENT_USER)?)
    }

    pub fn list_communities(&self) -> ServiceResult<Vec<Community>> {
        Ok(self.store.read(&COMMUNITIES)?)
    }

    pub fn get_community(&self, id: &str) -> ServiceResult<Option<Community>> {
        Ok(selectors::community_by_id(&self.store, id)?)
    }

    /// Communities the session user has joined; empty when signed out.
    pub fn joined_communities(&self) -> ServiceResult<Vec<Community>> {
        let Some(user) = self.store.read(&CURRENT_USER)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .store
            .read(&COMMUNITIES)?
            .into_iter()
            .filter(|community| user.has_joined(&community.id))
            .collect())
    }

    /// Lists posts, optionally scoped to one community, with authors attached.
    pub fn list_posts(&self, community_id: Option<&str>) -> ServiceResult<Vec<Post>> {
        let posts = match community_id {
            Some(id) => selectors::posts_by_community(&self.store, id)?,
            None => self.store.read(&POSTS)?,
        };
        self.with_authors(posts)
    }

    pub fn get_post(&self, id: &str) -> ServiceResult<Option<Post>> {
        match selectors::post_by_id(&self.store, id)? {
            Some(post) => Ok(self.with_authors(vec![post])?.pop()),
            None => Ok(None),
        }
    }

    pub fn list_comments(&self, post_id: Option<&str>) -> ServiceResult<Vec<Comment>> {
        match post_id {
            Some(id) => Ok(selectors::comments_by_post(&self.store, id)?),
            None => Ok(self.store.read(&COMMENTS)?),
        }
    }

    /// Creates a community; the creator becomes its first member.
    pub fn create_community(&self, request: NewCommunity) -> ServiceResult<Community> {
        let mut user = self.require_user()?;
        let name = require_text(&request.name, "community name must not be blank")?;

        let community = Community {
            id: new_record_id(),
            name,
            description: request.description.trim().to_string(),
            members: Membership::Count(1),
            image_ref: request.image_ref,
            created_at: now_epoch_ms(),
            tags: normalize_tags(&request.tags),
        };
        user.joined_community_ids.insert(community.id.clone());

        let appended = community.clone();
        self.store.write(
            &COMMUNITIES,
            Next::update(move |communities: &Vec<Community>| {
                let mut next = communities.clone();
                next.push(appended);
                next
            }),
        )?;
        self.store.write(&CURRENT_USER, Some(user))?;
        info!(
            "event=community_create module=service status=ok community_id={}",
            community.id
        );
        Ok(community)
    }

    /// Creates a post authored by the session user.
    ///
    /// The community reference is not checked; dangling ids are tolerated.
    pub fn create_post(&self, request: NewPost) -> ServiceResult<Post> {
        let user = self.require_user()?;
        let title = require_text(&request.title, "post title must not be blank")?;
        let content = require_text(&request.content, "post content must not be blank")?;

        let post = Post {
            id: new_record_id(),
            community_id: request.community_id.trim().to_string(),
            title,
            content,
            author_id: user.id.clone(),
            author_username: user.username.clone(),
            created_at: now_epoch_ms(),
            vote_score: 0,
            comment_count: 0,
            image_ref: request.image_ref,
            tags: normalize_tags(&request.tags),
            author: None,
        };

        let appended = post.clone();
        self.store.write(
            &POSTS,
            Next::update(move |posts: &Vec<Post>| {
                let mut next = posts.clone();
                next.push(appended);
                next
            }),
        )?;
        info!(
            "event=post_create module=service status=ok post_id={} community_id={}",
            post.id, post.community_id
        );
        Ok(post)
    }

    /// Appends a comment and bumps the parent post's `comment_count` by one.
    ///
    /// A comment on an unknown post is stored without touching any count.
    pub fn create_comment(&self, post_id: &str, content: &str) -> ServiceResult<Comment> {
        let user = self.require_user()?;
        let content = require_text(content, "comment content must not be blank")?;

        let comment = Comment {
            id: new_record_id(),
            post_id: post_id.trim().to_string(),
            author_id: user.id,
            author_username: user.username,
            content,
            created_at: now_epoch_ms(),
            vote_score: 0,
        };

        let appended = comment.clone();
        self.store.write(
            &COMMENTS,
            Next::update(move |comments: &Vec<Comment>| {
                let mut next = comments.clone();
                next.push(appended);
                next
            }),
        )?;
        let parent_id = comment.post_id.clone();
        self.store.write(
            &POSTS,
            Next::update(move |posts: &Vec<Post>| {
                let mut next = posts.clone();
                if let Some(post) = next.iter_mut().find(|post| post.id == parent_id) {
                    post.comment_count += 1;
                }
                next
            }),
        )?;
        info!(
            "event=comment_create module=service status=ok comment_id={} post_id={}",
            comment.id, comment.post_id
        );
        Ok(comment)
    }

    /// Records the session user's vote on a post.
    ///
    /// Returns the post's new score, or `None` when the post is unknown.
    pub fn vote_post(&self, post_id: &str, value: i64) -> ServiceResult<Option<i64>> {
        self.cast_vote(VoteTarget::PostId(post_id.to_string()), value)
    }

    /// Records the session user's vote on a comment.
    ///
    /// Returns the comment's new score, or `None` when the comment is unknown.
    pub fn vote_comment(&self, comment_id: &str, value: i64) -> ServiceResult<Option<i64>> {
        self.cast_vote(VoteTarget::CommentId(comment_id.to_string()), value)
    }

    /// Adds `community_id` to the joined set. Returns whether it changed.
    pub fn join_community(&self, community_id: &str) -> ServiceResult<bool> {
        let mut user = self.require_user()?;
        let changed = user.joined_community_ids.insert(community_id.to_string());
        if changed {
            self.store.write(&CURRENT_USER, Some(user))?;
        }
        info!(
            "event=community_join module=service status=ok community_id={community_id} changed={changed}"
        );
        Ok(changed)
    }

    /// Removes `community_id` from the joined set. Returns whether it changed.
    pub fn leave_community(&self, community_id: &str) -> ServiceResult<bool> {
        let mut user = self.require_user()?;
        let changed = user.joined_community_ids.remove(community_id);
        if changed {
            self.store.write(&CURRENT_USER, Some(user))?;
        }
        info!(
            "event=community_leave module=service status=ok community_id={community_id} changed={changed}"
        );
        Ok(changed)
    }

    fn cast_vote(&self, target: VoteTarget, value: i64) -> ServiceResult<Option<i64>> {
        let user = self.require_user()?;
        let value = VoteValue::try_from(value).map_err(|err| ServiceError::InvalidVote(err.0))?;

        let exists = match &target {
            VoteTarget::PostId(id) => selectors::post_by_id(&self.store, id)?.is_some(),
            VoteTarget::CommentId(id) => selectors::comment_by_id(&self.store, id)?.is_some(),
        };
        if !exists {
            debug!(
                "event=vote_cast module=service status=skipped target={} target_id={} reason=unknown_target",
                target.kind(),
                target.id()
            );
            return Ok(None);
        }

        let mut votes = self.store.read(&VOTES)?;
        let delta = votes.cast(&user.id, target.clone(), value);
        self.store.write(&VOTES, votes)?;

        let score = match &target {
            VoteTarget::PostId(id) => {
                let mut posts = self.store.read(&POSTS)?;
                let score = apply_delta(
                    posts.iter_mut().find(|post| &post.id == id).map(|post| &mut post.vote_score),
                    delta,
                );
                self.store.write(&POSTS, posts)?;
                score
            }
            VoteTarget::CommentId(id) => {
                let mut comments = self.store.read(&COMMENTS)?;
                let score = apply_delta(
                    comments
                        .iter_mut()
                        .find(|comment| &comment.id == id)
                        .map(|comment| &mut comment.vote_score),
                    delta,
                );
                self.store.write(&COMMENTS, comments)?;
                score
            }
        };
        info!(
            "event=vote_cast module=service status=ok target={} target_id={} delta={delta}",
            target.kind(),
            target.id()
        );
        Ok(score)
    }

    fn with_authors(&self, mut posts: Vec<Post>) -> ServiceResult<Vec<Post>> {
        let current = self.store.read(&CURRENT_USER)?;
        for post in posts.iter_mut().filter(|post| post.author.is_none()) {
            let mut author = post.derived_author();
            if let Some(user) = current.as_ref().filter(|user| user.id == post.author_id) {
                author.avatar_ref = user.avatar_ref.clone();
            }
            post.author = Some(author);
        }
        Ok(posts)
    }

    fn require_hydrated(&self) -> ServiceResult<()> {
        if self.store.is_hydrated() {
            Ok(())
        } else {
            Err(ServiceError::NotHydrated)
        }
    }

    fn require_user(&self) -> ServiceResult<SessionUser> {
        self.require_hydrated()?;
        self.store
            .read(&CURRENT_USER)?
            .ok_or(ServiceError::NotAuthenticated)
    }
}

/// Normalizes tag input: trims, collapses inner whitespace, lowercases and
/// deduplicates. Blank tags are dropped.
pub fn normalize_tags(tags: &[String]) -> BTreeSet<String> {
    tags.iter()
        .map(|tag| WHITESPACE_RE.replace_all(tag.trim(), " ").to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn require_text(value: &str, details: &'static str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(details));
    }
    Ok(trimmed.to_string())
}

fn apply_delta(score: Option<&mut i64>, delta: i64) -> Option<i64> {
    score.map(|score| {
        *score += delta;
        *score
    })
}
