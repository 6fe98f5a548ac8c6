//! Derived read-only views over store slices.
//!
//! # Invariants
//! - Every call re-reads and re-filters the full slice; nothing is cached.
//! - Unknown ids produce an empty list or `None`, never an error.
//! - Results keep slice order.

use crate::model::community::Community;
use crate::model::content::{Comment, Post};
use crate::store::{Store, StoreResult, COMMENTS, COMMUNITIES, POSTS};

pub fn posts_by_community(store: &Store, community_id: &str) -> StoreResult<Vec<Post>> {
    Ok(store
        .read(&POSTS)?
        .into_iter()
        .filter(|post| post.community_id == community_id)
        .collect())
}

pub fn comments_by_post(store: &Store, post_id: &str) -> StoreResult<Vec<Comment>> {
    Ok(store
        .read(&COMMENTS)?
        .into_iter()
        .filter(|comment| comment.post_id == post_id)
        .collect())
}

pub fn community_by_id(store: &Store, id: &str) -> StoreResult<Option<Community>> {
    Ok(store
        .read(&COMMUNITIES)?
        .into_iter()
        .find(|community| community.id == id))
}

pub fn post_by_id(store: &Store, id: &str) -> StoreResult<Option<Post>> {
    Ok(store.read(&POSTS)?.into_iter().find(|post| post.id == id))
}

pub fn comment_by_id(store: &Store, id: &str) -> StoreResult<Option<Comment>> {
    Ok(store
        .read(&COMMENTS)?
        .into_iter()
        .find(|comment| comment.id == id))
}

#[cfg(test)]
mod tests {
    use super::{comments_by_post, community_by_id, post_by_id, posts_by_community};
    use crate::store::StoreProvider;

    #[test]
    fn selectors_filter_demo_seed() {
        let provider = StoreProvider::mount_default().expect("mount");
        let store = provider.store();

        assert_eq!(posts_by_community(&store, "1").expect("posts").len(), 2);
        assert_eq!(comments_by_post(&store, "101").expect("comments").len(), 2);
        assert_eq!(
            community_by_id(&store, "2")
                .expect("community")
                .map(|community| community.name),
            Some("Home Espresso".to_string())
        );
    }

    #[test]
    fn unknown_ids_are_absent_not_errors() {
        let provider = StoreProvider::mount_default().expect("mount");
        let store = provider.store();

        assert!(posts_by_community(&store, "missing").expect("posts").is_empty());
        assert!(comments_by_post(&store, "missing").expect("comments").is_empty());
        assert!(community_by_id(&store, "missing").expect("community").is_none());
        assert!(post_by_id(&store, "missing").expect("post").is_none());
    }
}
