use agora_core::store::{COMMENTS, COMMUNITIES, CURRENT_USER, POSTS, VOTES};
use agora_core::{
    AtomRegistry, ForumService, HydrationPhase, NewPost, Post, Seed, ServiceError, SignIn,
    StoreConfig, StoreError, StoreProvider, WriteOutcome,
};

fn mount(boundary: &str) -> StoreProvider {
    StoreProvider::mount(AtomRegistry::builtin(), StoreConfig::with_boundary(boundary))
        .expect("provider should mount")
}

#[test]
fn reads_match_registry_defaults_before_and_right_after_commit() {
    let provider = mount("gate-defaults");
    let store = provider.store();
    let seed = Seed::demo();

    assert_eq!(store.read(&COMMUNITIES).unwrap(), seed.communities);
    assert_eq!(store.read(&POSTS).unwrap(), seed.posts);
    assert_eq!(store.read(&COMMENTS).unwrap(), seed.comments);
    assert_eq!(store.read(&CURRENT_USER).unwrap(), seed.current_user);
    assert_eq!(store.read(&VOTES).unwrap(), seed.votes);

    assert!(provider.commit());

    assert_eq!(store.read(&COMMUNITIES).unwrap(), seed.communities);
    assert_eq!(store.read(&POSTS).unwrap(), seed.posts);
    assert_eq!(store.read(&COMMENTS).unwrap(), seed.comments);
    assert_eq!(store.read(&CURRENT_USER).unwrap(), seed.current_user);
    assert_eq!(store.read(&VOTES).unwrap(), seed.votes);
}

#[test]
fn server_and_first_client_render_are_byte_identical() {
    let server = mount("gate-server");
    let client = mount("gate-client");

    let server_html = server.store().render_snapshot().unwrap();
    let client_first_paint = client.store().render_snapshot().unwrap();
    assert_eq!(server_html, client_first_paint);

    client.commit();
    let client_hydrated = client.store().render_snapshot().unwrap();
    assert_eq!(server_html, client_hydrated);
}

#[test]
fn snapshot_renders_every_slice_by_name() {
    let provider = mount("gate-snapshot");
    let rendered: serde_json::Value =
        serde_json::from_str(&provider.store().render_snapshot().unwrap()).unwrap();
    for name in ["communities", "posts", "comments", "currentUser", "votes"] {
        assert!(rendered.get(name).is_some(), "snapshot is missing {name}");
    }
    assert!(rendered["currentUser"].is_null());
    assert_eq!(rendered["posts"][0]["communityId"], "1");
}

#[test]
fn prerender_writes_are_discarded() {
    let provider = mount("gate-discard");
    let store = provider.store();

    let outcome = store.write(&POSTS, Vec::<Post>::new()).unwrap();
    assert_eq!(outcome, WriteOutcome::Discarded);
    assert_eq!(store.read(&POSTS).unwrap(), Seed::demo().posts);

    provider.commit();
    assert_eq!(store.read(&POSTS).unwrap(), Seed::demo().posts);
}

#[test]
fn service_mutations_require_hydration() {
    let provider = mount("gate-service");
    let service = ForumService::new(provider.store());

    let err = service
        .sign_in(SignIn {
            username: "early".to_string(),
            email: "early@example.invalid".to_string(),
            avatar_ref: None,
        })
        .unwrap_err();
    assert_eq!(err, ServiceError::NotHydrated);

    let err = service
        .create_post(NewPost {
            community_id: "1".to_string(),
            title: "too soon".to_string(),
            content: "before hydration".to_string(),
            ..NewPost::default()
        })
        .unwrap_err();
    assert_eq!(err, ServiceError::NotHydrated);
    assert_eq!(provider.phase(), HydrationPhase::Prerender);
}

#[test]
fn handles_share_one_state_and_providers_do_not() {
    let first = mount("gate-first");
    let second = mount("gate-second");
    first.commit();
    second.commit();

    let a = first.store();
    let b = first.store();
    assert!(a.same_store(&b));
    assert!(!a.same_store(&second.store()));

    a.write(&POSTS, Vec::<Post>::new()).unwrap();
    assert!(b.read(&POSTS).unwrap().is_empty());
    assert_eq!(second.store().read(&POSTS).unwrap(), Seed::demo().posts);
}

#[test]
fn handles_outliving_their_provider_cannot_write() {
    let provider = mount("gate-remount");
    provider.commit();
    let stale = ForumService::new(provider.store());
    drop(provider);

    let remounted = mount("gate-remount");
    remounted.commit();
    assert!(!stale.store().is_mounted());
    assert!(remounted.store().is_mounted());

    let err = stale
        .sign_in(SignIn {
            username: "ghost".to_string(),
            email: "ghost@example.invalid".to_string(),
            avatar_ref: None,
        })
        .unwrap_err();
    assert_eq!(err, ServiceError::Store(StoreError::Unmounted));

    let err = stale
        .store()
        .write(&POSTS, Vec::<Post>::new())
        .unwrap_err();
    assert_eq!(err, StoreError::Unmounted);

    assert_eq!(stale.store().read(&POSTS).unwrap(), Seed::demo().posts);
    assert_eq!(remounted.store().read(&POSTS).unwrap(), Seed::demo().posts);
    assert!(stale.current_user().unwrap().is_none());
}
