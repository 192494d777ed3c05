mod redirect;
mod session;
mod store;

pub use redirect::RedirectGuard;
pub use redirect::is_valid_redirect_url;
pub use session::AuthError;
pub use session::SessionPhase;
pub use session::SessionSnapshot;
pub use session::SessionStateMachine;
pub use session::TokenExchange;
pub use store::FileStore;
pub use store::KEY_AUTH;
pub use store::KEY_PREFERENCES;
pub use store::KEY_REDIRECT;
pub use store::KeyValueStore;
pub use store::MemoryStore;
pub use store::StoreChange;
pub use store::StoreError;
