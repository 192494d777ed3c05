use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{catalog, cli, error, info, management::RedirectGuard, success, types::PkceToken};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>, return_to: Option<String>) {
    let machine = cli::session::build_machine().await;
    let guard = RedirectGuard::new(machine.session_store());

    // remember where to land, invalid targets are silently dropped
    if let Some(target) = return_to {
        guard.store_redirect_url(&target).await;
    }

    let Some(tokens) = catalog::auth::authorize(shared_state).await else {
        error!("Authentication failed or timed out.");
    };

    let profile = match machine.login(tokens).await {
        Ok(profile) => profile,
        Err(e) => error!("Authentication failed: {}", e),
    };
    success!(
        "Authentication successful. Signed in as {}.",
        profile.username
    );

    let Some(target) = guard.get_and_clear().await else {
        return;
    };

    if target == "/collection" || target.starts_with("/collection?") {
        let query = target
            .strip_prefix("/collection")
            .unwrap_or("")
            .trim_start_matches('?');
        let params = cli::collection::CollectionParams::from_query_string(query);
        cli::collection::browse_with_machine(machine, params).await;
    } else {
        info!("Continue where you left off: {}", target);
    }
}
