//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `agora_core` linkage and run one prerender/hydrate/mutate pass.
//! - Keep output deterministic apart from generated ids.

use agora_core::{
    default_log_level, init_logging, ForumService, LogTarget, NewPost, SignIn, StoreProvider,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("agora_cli failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    init_logging(default_log_level(), LogTarget::Stderr)?;
    println!("agora_core ping={}", agora_core::ping());
    println!("agora_core version={}", agora_core::core_version());

    let provider = StoreProvider::mount_default()?;
    let service = ForumService::new(provider.store());
    let prerender = provider.store().render_snapshot()?;
    println!("prerender_bytes={}", prerender.len());

    provider.commit();
    let first_paint = provider.store().render_snapshot()?;
    println!("hydration_consistent={}", prerender == first_paint);

    let user = service.sign_in(SignIn {
        username: "smoke".to_string(),
        email: "smoke@example.invalid".to_string(),
        avatar_ref: None,
    })?;
    let post = service.create_post(NewPost {
        community_id: "1".to_string(),
        title: "Smoke test".to_string(),
        content: "Created by agora_cli.".to_string(),
        ..NewPost::default()
    })?;
    service.vote_post(&post.id, 1)?;
    service.create_comment(&post.id, "first")?;

    let stored = service
        .get_post(&post.id)?
        .ok_or("created post missing from store")?;
    let community_posts = service.list_posts(Some("1"))?.len();
    println!(
        "user={} post_score={} post_comments={} community_1_posts={}",
        user.username, stored.vote_score, stored.comment_count, community_posts
    );
    info!(
        "event=cli_smoke module=cli status=ok post_id={} post_score={} post_comments={} community_posts={community_posts}",
        post.id, stored.vote_score, stored.comment_count
    );
    Ok(())
}
