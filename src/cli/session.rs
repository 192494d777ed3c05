use std::sync::Arc;

use crate::{
    catalog::auth::CatalogTokenClient,
    error, info,
    management::{FileStore, KeyValueStore, MemoryStore, SessionPhase, SessionStateMachine},
    success, warning,
};

/// Wires up the session state machine the way every command uses it: a
/// durable on-disk store, a process-scoped session store, and the real
/// catalog token client. Runs the startup transition before returning.
pub(crate) async fn build_machine() -> Arc<SessionStateMachine> {
    let durable: Arc<dyn KeyValueStore> = Arc::new(FileStore::new("durable"));
    let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let exchange = Arc::new(CatalogTokenClient::new());

    let machine = SessionStateMachine::new(durable, session, exchange);
    if let Err(e) = machine.start().await {
        error!("Failed to read session state: {}", e);
    }
    let _ = machine.spawn_store_listener();

    machine
}

pub(crate) fn require_authenticated(machine: &Arc<SessionStateMachine>) {
    match machine.snapshot().phase {
        SessionPhase::Authenticated => {}
        SessionPhase::WelcomeBack => {
            error!("Session was signed out. Run vinylcli session continue to resume.");
        }
        SessionPhase::OfflineLocked => {
            error!("Cannot continue offline without a cached profile. Reconnect and try again.");
        }
        SessionPhase::SignedOut => {
            error!("Not authenticated. Run vinylcli auth first.");
        }
    }
}

pub async fn status() {
    let machine = build_machine().await;
    let snapshot = machine.snapshot();

    match snapshot.phase {
        SessionPhase::Authenticated => {
            info!("Session: active");
            if let Some(profile) = snapshot.profile {
                info!(
                    "Signed in as {username} (id {id})",
                    username = profile.username,
                    id = profile.id
                );
            }
        }
        SessionPhase::WelcomeBack => {
            info!("Session: signed out, credentials kept");
            if let Some(profile) = snapshot.profile {
                info!("Last signed in as {username}", username = profile.username);
            }
            info!("Run vinylcli session continue to resume.");
        }
        SessionPhase::OfflineLocked => {
            warning!("Session: cannot continue offline, no cached profile is available.");
        }
        SessionPhase::SignedOut => {
            info!("Session: signed out");
        }
    }
}

pub async fn continue_session() {
    let machine = build_machine().await;

    if machine.snapshot().phase == SessionPhase::Authenticated {
        info!("Session is already active.");
        return;
    }

    match machine.continue_session().await {
        Ok(profile) => success!("Welcome back, {}!", profile.username),
        Err(e) => error!("Cannot resume session: {}", e),
    }
}

pub async fn sign_out() {
    let machine = build_machine().await;

    if machine.snapshot().phase == SessionPhase::SignedOut {
        info!("No active session.");
        return;
    }

    match machine.sign_out().await {
        Ok(()) => success!("Signed out. Resume later with vinylcli session continue."),
        Err(e) => error!("Failed to sign out: {}", e),
    }
}

pub async fn disconnect() {
    let machine = build_machine().await;
    machine.disconnect().await;
    success!("Disconnected. Stored credentials and preferences were removed.");
}

pub async fn set_avatar(source: String) {
    let machine = build_machine().await;
    require_authenticated(&machine);

    match machine.set_avatar_source(&source).await {
        Ok(()) => success!("Avatar source set to {}.", source),
        Err(e) => error!("Failed to save preference: {}", e),
    }
}
