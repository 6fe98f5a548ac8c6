//! Shared state core for the Agora admin application.
//! Every UI surface reads and writes forum data through this crate.

pub mod logging;
pub mod model;
pub mod seed;
pub mod selectors;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::community::{Community, Membership};
pub use model::content::{Author, Comment, Post};
pub use model::user::SessionUser;
pub use model::vote::{Vote, VoteBook, VoteTarget, VoteValue};
pub use seed::Seed;
pub use service::forum_service::{
    normalize_tags, ForumService, NewCommunity, NewPost, ServiceError, ServiceResult, SignIn,
};
pub use store::{
    AtomKey, AtomRegistry, HydrationPhase, KeyResolution, Next, SliceName, Store, StoreConfig,
    StoreError, StoreProvider, StoreResult, Versioned, WriteOutcome,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
