//! Application state controller.
//!
//! [`App`] owns the in-memory journal: theme, session, registry and thoughts.
//! State is loaded once in [`App::load`]; every mutation updates memory first
//! and then re-persists the slice it touched through the [`Persister`].
//! Authoring rights are not checked here; callers gate on
//! [`Role::can_author`](super::types::Role::can_author).

use std::sync::Arc;

use thiserror::Error;

use super::auth::{AccessPolicy, AuthError, Registry};
use super::types::{AuthMode, Draft, Identity, Theme, Thought, View, VISITOR};
use crate::enhance::{enhance_or_passthrough, Enhancer};
use crate::storage::{
    self, KeyValueStore, PersistencePolicy, Persister, REGISTERED_USERS_KEY, THEME_KEY,
    THOUGHTS_KEY, USER_KEY,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("a thought needs text or an image")]
    EmptyThought,

    #[error("no thought matches id {0}")]
    ThoughtNotFound(String),

    #[error("id prefix {0} matches more than one thought")]
    AmbiguousId(String),
}

/// Construction options for [`App::load`].
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub policy: AccessPolicy,
    pub persistence: PersistencePolicy,
}

pub struct App {
    persister: Persister,
    enhancer: Arc<dyn Enhancer>,
    policy: AccessPolicy,
    theme: Theme,
    session: Identity,
    view: View,
    registry: Registry,
    thoughts: Vec<Thought>,
}

impl App {
    /// Load persisted state. Missing or unreadable keys fall back to defaults.
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        enhancer: Arc<dyn Enhancer>,
        options: AppOptions,
    ) -> Self {
        let persister = Persister::new(store, options.persistence);
        let policy = options.policy;

        let (theme, user, thoughts, users) = tokio::join!(
            load_key::<Theme>(&persister, THEME_KEY),
            load_key::<String>(&persister, USER_KEY),
            load_key::<Vec<Thought>>(&persister, THOUGHTS_KEY),
            load_key::<Vec<String>>(&persister, REGISTERED_USERS_KEY),
        );

        let (session, view) = match user.filter(|u| !u.is_empty() && u != VISITOR) {
            Some(name) => (policy.identity(&name), View::Authenticated),
            None => (policy.visitor(), View::Landing),
        };

        let thoughts = thoughts.unwrap_or_default();
        let registry = Registry::new(users.unwrap_or_default());

        tracing::info!(
            backend = persister.store().backend(),
            thoughts = thoughts.len(),
            users = registry.names().len(),
            session = %session.name,
            "journal loaded"
        );

        Self {
            persister,
            enhancer,
            policy,
            theme: theme.unwrap_or_default(),
            session,
            view,
            registry,
            thoughts,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn session(&self) -> &Identity {
        &self.session
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn registered_users(&self) -> &[String] {
        self.registry.names()
    }

    /// Thoughts in display order, newest first.
    pub fn thoughts(&self) -> &[Thought] {
        &self.thoughts
    }

    pub fn thought(&self, id: &str) -> Option<&Thought> {
        self.thoughts.iter().find(|t| t.id == id)
    }

    pub async fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.persist(THEME_KEY, &self.theme).await;
    }

    pub async fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled()).await;
        self.theme
    }

    /// Submit the login or registration form. Valid from either view; from
    /// `Authenticated` it acts as re-authentication.
    pub async fn authenticate(&mut self, mode: AuthMode, name: &str) -> Result<&Identity, AuthError> {
        let identity = self.policy.admit(mode, name, &mut self.registry)?;

        if mode == AuthMode::Register {
            tracing::info!(user = %identity.name, "user registered");
            self.persist(REGISTERED_USERS_KEY, self.registry.names()).await;
        }

        tracing::info!(user = %identity.name, role = ?identity.role, "session started");
        self.session = identity;
        self.view = View::Authenticated;
        self.persist(USER_KEY, &self.session.name).await;
        Ok(&self.session)
    }

    /// Enter the main view anonymously. Nothing is persisted.
    pub fn continue_as_visitor(&mut self) {
        self.session = self.policy.visitor();
        self.view = View::Authenticated;
    }

    pub async fn logout(&mut self) {
        tracing::info!(user = %self.session.name, "session ended");
        self.session = self.policy.visitor();
        self.view = View::Landing;
        self.persist(USER_KEY, VISITOR).await;
    }

    /// Create a thought from a draft and prepend it.
    ///
    /// Enhancement runs only when requested and the text is non-empty; its
    /// failure leaves the trimmed text as-is with no tags.
    pub async fn add_thought(&mut self, draft: Draft) -> Result<Thought, JournalError> {
        let Draft {
            text,
            image,
            enhance,
        } = draft;
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return Err(JournalError::EmptyThought);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().timestamp_millis();

        let (content, tags, ai_enhanced) = if enhance && !text.is_empty() {
            let outcome = enhance_or_passthrough(self.enhancer.as_ref(), text).await;
            (outcome.polished, outcome.tags, outcome.enhanced)
        } else {
            (text.to_string(), Vec::new(), false)
        };

        let thought = Thought {
            id,
            content,
            timestamp,
            tags,
            ai_enhanced,
            image,
        };

        tracing::info!(
            id = %thought.id,
            ai_enhanced = thought.ai_enhanced,
            has_image = thought.image.is_some(),
            "thought added"
        );

        self.thoughts.insert(0, thought.clone());
        self.persist_thoughts().await;
        Ok(thought)
    }

    /// Replace the content of a thought. Returns `Ok(false)` without touching
    /// anything when the new content is blank.
    pub async fn edit_thought(&mut self, id: &str, content: &str) -> Result<bool, JournalError> {
        let content = content.trim();
        let thought = self
            .thoughts
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| JournalError::ThoughtNotFound(id.to_string()))?;

        if content.is_empty() {
            return Ok(false);
        }

        thought.content = content.to_string();
        tracing::info!(id, "thought edited");
        self.persist_thoughts().await;
        Ok(true)
    }

    pub async fn delete_thought(&mut self, id: &str) -> Result<Thought, JournalError> {
        let index = self
            .thoughts
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| JournalError::ThoughtNotFound(id.to_string()))?;

        let removed = self.thoughts.remove(index);
        tracing::info!(id, "thought deleted");
        self.persist_thoughts().await;
        Ok(removed)
    }

    /// Resolve a full id or a unique id prefix.
    pub fn resolve_id(&self, prefix: &str) -> Result<String, JournalError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(JournalError::ThoughtNotFound(prefix.to_string()));
        }
        if let Some(exact) = self.thought(prefix) {
            return Ok(exact.id.clone());
        }

        let mut matches = self.thoughts.iter().filter(|t| t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Ok(only.id.clone()),
            (Some(_), Some(_)) => Err(JournalError::AmbiguousId(prefix.to_string())),
            (None, _) => Err(JournalError::ThoughtNotFound(prefix.to_string())),
        }
    }

    /// Wait for every queued write to reach the store.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// Flush and stop background persistence.
    pub async fn close(self) {
        self.persister.flush().await;
        self.persister.shutdown().await;
    }

    async fn persist_thoughts(&self) {
        self.persist(THOUGHTS_KEY, &self.thoughts).await;
    }

    async fn persist<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Some(encoded) = storage::encode(key, value) {
            self.persister.put(key, encoded).await;
        }
    }
}

async fn load_key<T: serde::de::DeserializeOwned>(persister: &Persister, key: &str) -> Option<T> {
    storage::decode(key, persister.get(key).await?)
}
