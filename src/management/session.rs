use std::{fmt, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::{
    sync::{Mutex, broadcast, watch},
    task::JoinHandle,
};

use crate::{
    management::store::{KEY_AUTH, KEY_PREFERENCES, KeyValueStore, StoreChange, StoreError},
    types::{Preferences, Profile, SessionRecord, Tokens},
};

const TOKEN_REFRESH_MARGIN_SECS: u64 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    SignedOut,
    WelcomeBack,
    Authenticated,
    OfflineLocked,
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub profile: Option<Profile>,
}

#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    Offline(String),
    Service(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthorized => write!(f, "the catalog service rejected the credentials"),
            AuthError::Offline(e) => write!(f, "the catalog service is unreachable: {e}", e = e),
            AuthError::Service(e) => write!(f, "the catalog service misbehaved: {e}", e = e),
        }
    }
}

impl std::error::Error for AuthError {}

#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn validate(&self, tokens: &Tokens) -> Result<Profile, AuthError>;
    async fn refresh(&self, tokens: &Tokens) -> Result<Tokens, AuthError>;
}

pub struct SessionStateMachine {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    exchange: Arc<dyn TokenExchange>,
    state: Mutex<SessionRecord>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl SessionStateMachine {
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        exchange: Arc<dyn TokenExchange>,
    ) -> Arc<Self> {
        let (snapshot, _) = watch::channel(SessionSnapshot {
            phase: SessionPhase::SignedOut,
            profile: None,
        });

        Arc::new(Self {
            durable,
            session,
            exchange,
            state: Mutex::new(SessionRecord::default()),
            snapshot,
        })
    }

    pub async fn start(&self) -> Result<SessionPhase, StoreError> {
        let record = self.read_auth_record().await?;

        let Some(tokens) = record.tokens.clone() else {
            self.publish(SessionPhase::SignedOut, None);
            return Ok(SessionPhase::SignedOut);
        };

        if !record.session_active {
            // stored tokens with an ended session resume without touching the network
            let profile = record.cached_profile.clone();
            self.commit(record).await;
            self.publish(SessionPhase::WelcomeBack, profile);
            return Ok(SessionPhase::WelcomeBack);
        }

        match self.exchange.validate(&tokens).await {
            Ok(profile) => {
                let mut updated = record;
                updated.cached_profile = Some(profile.clone());
                // a failed profile write must not block an otherwise valid session
                let _ = self.write_auth_record(&updated).await;
                self.commit(updated).await;
                self.publish(SessionPhase::Authenticated, Some(profile));
                Ok(SessionPhase::Authenticated)
            }
            Err(AuthError::Unauthorized) => {
                self.disconnect().await;
                Ok(SessionPhase::SignedOut)
            }
            Err(_) => {
                // the service is unreachable, fall back to whatever we cached
                if let Some(profile) = record.cached_profile.clone() {
                    self.commit(record).await;
                    self.publish(SessionPhase::Authenticated, Some(profile));
                    Ok(SessionPhase::Authenticated)
                } else {
                    self.commit(record).await;
                    self.publish(SessionPhase::OfflineLocked, None);
                    Ok(SessionPhase::OfflineLocked)
                }
            }
        }
    }

    pub async fn login(&self, tokens: Tokens) -> Result<Profile, AuthError> {
        let profile = self.exchange.validate(&tokens).await?;

        let record = SessionRecord {
            tokens: Some(tokens),
            session_active: true,
            cached_profile: Some(profile.clone()),
        };
        self.write_auth_record(&record)
            .await
            .map_err(|e| AuthError::Service(e.to_string()))?;

        self.commit(record).await;
        self.publish(SessionPhase::Authenticated, Some(profile.clone()));
        Ok(profile)
    }

    pub async fn sign_out(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.tokens.is_none() {
            return Ok(());
        }
        state.session_active = false;
        let record = state.clone();
        drop(state);

        self.write_auth_record(&record).await?;
        self.session.clear().await?;
        self.publish(SessionPhase::WelcomeBack, record.cached_profile);
        Ok(())
    }

    pub async fn continue_session(&self) -> Result<Profile, AuthError> {
        let state = self.state.lock().await;
        let Some(tokens) = state.tokens.clone() else {
            return Err(AuthError::Unauthorized);
        };
        drop(state);

        match self.exchange.validate(&tokens).await {
            Ok(profile) => {
                let record = SessionRecord {
                    tokens: Some(tokens),
                    session_active: true,
                    cached_profile: Some(profile.clone()),
                };
                self.write_auth_record(&record)
                    .await
                    .map_err(|e| AuthError::Service(e.to_string()))?;

                self.commit(record).await;
                self.publish(SessionPhase::Authenticated, Some(profile.clone()));
                Ok(profile)
            }
            Err(AuthError::Unauthorized) => {
                self.disconnect().await;
                Err(AuthError::Unauthorized)
            }
            // unreachable service leaves the resume offer standing
            Err(e) => Err(e),
        }
    }

    pub async fn disconnect(&self) {
        // per-account state must never leak into the next login
        let _ = self.durable.remove(KEY_AUTH).await;
        let _ = self.durable.remove(KEY_PREFERENCES).await;
        let _ = self.session.clear().await;

        self.commit(SessionRecord::default()).await;
        self.publish(SessionPhase::SignedOut, None);
    }

    pub async fn valid_access_token(&self) -> Result<String, AuthError> {
        let state = self.state.lock().await;
        let Some(tokens) = state.tokens.clone() else {
            return Err(AuthError::Unauthorized);
        };
        drop(state);

        if !token_expired(&tokens) {
            return Ok(tokens.access_token);
        }

        match self.exchange.refresh(&tokens).await {
            Ok(new_tokens) => {
                let access_token = new_tokens.access_token.clone();
                let mut state = self.state.lock().await;
                state.tokens = Some(new_tokens);
                let record = state.clone();
                drop(state);
                let _ = self.write_auth_record(&record).await;
                Ok(access_token)
            }
            Err(AuthError::Unauthorized) => {
                self.disconnect().await;
                Err(AuthError::Unauthorized)
            }
            // a stale token is still worth presenting, the service gets the last word
            Err(_) => Ok(tokens.access_token),
        }
    }

    pub async fn apply_store_change(&self, change: &StoreChange) {
        if change.key != KEY_AUTH {
            return;
        }

        let record: Option<SessionRecord> = change
            .value
            .clone()
            .and_then(|value| serde_json::from_value(value).ok());

        match record {
            None | Some(SessionRecord { tokens: None, .. }) => {
                // another instance disconnected, mirror the cleanup locally
                {
                    let state = self.state.lock().await;
                    if state.tokens.is_none()
                        && self.snapshot.borrow().phase == SessionPhase::SignedOut
                    {
                        return;
                    }
                }
                let _ = self.session.clear().await;
                self.commit(SessionRecord::default()).await;
                self.publish(SessionPhase::SignedOut, None);
            }
            Some(record) if !record.session_active => {
                // another instance signed out but kept its tokens
                {
                    let state = self.state.lock().await;
                    if *state == record && self.snapshot.borrow().phase == SessionPhase::WelcomeBack
                    {
                        return;
                    }
                }
                let profile = record.cached_profile.clone();
                let _ = self.session.clear().await;
                self.commit(record).await;
                self.publish(SessionPhase::WelcomeBack, profile);
            }
            Some(record) => {
                // another instance logged in or rotated its tokens
                {
                    let state = self.state.lock().await;
                    if *state == record
                        && self.snapshot.borrow().phase == SessionPhase::Authenticated
                    {
                        return;
                    }
                }
                let profile = record.cached_profile.clone();
                self.commit(record).await;
                self.publish(SessionPhase::Authenticated, profile);
            }
        }
    }

    pub fn spawn_store_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let machine = Arc::clone(self);
        let mut events = machine.durable.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(change) => machine.apply_store_change(&change).await,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn session_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.session)
    }

    pub async fn preferences(&self) -> Preferences {
        match self.durable.get(KEY_PREFERENCES).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_default(),
            _ => Preferences::default(),
        }
    }

    pub async fn set_avatar_source(&self, source: &str) -> Result<(), StoreError> {
        let mut preferences = self.preferences().await;
        preferences.avatar_source = Some(source.to_string());
        self.durable
            .set(KEY_PREFERENCES, serde_json::to_value(&preferences)?)
            .await
    }

    async fn commit(&self, record: SessionRecord) {
        let mut state = self.state.lock().await;
        *state = record;
    }

    fn publish(&self, phase: SessionPhase, profile: Option<Profile>) {
        self.snapshot.send_replace(SessionSnapshot { phase, profile });
    }

    async fn read_auth_record(&self) -> Result<SessionRecord, StoreError> {
        let value = self.durable.get(KEY_AUTH).await?;
        // a corrupt record reads as signed out rather than an error
        Ok(value
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default())
    }

    async fn write_auth_record(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.durable
            .set(KEY_AUTH, serde_json::to_value(record)?)
            .await
    }
}

fn token_expired(tokens: &Tokens) -> bool {
    let now = Utc::now().timestamp() as u64;
    now >= (tokens.obtained_at + tokens.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN_SECS)
}
