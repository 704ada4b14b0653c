pub mod app;
pub mod auth;
pub mod types;

pub use app::{App, AppOptions, JournalError};
pub use auth::{AccessPolicy, AuthError, Registry};
pub use types::{short_id, AuthMode, Draft, Identity, Role, Theme, Thought, View, VISITOR};
