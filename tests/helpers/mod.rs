#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mindstream::enhance::{Disabled, EnhanceError, Enhancement, Enhancer};
use mindstream::journal::{AccessPolicy, App, AppOptions};
use mindstream::storage::{KeyValueStore, MemoryStore, PersistencePolicy};

pub const ADMIN: &str = "Leslie Lyu";

/// Enhancer with a fixed answer that counts how often it was called.
pub struct FakeEnhancer {
    reply: Option<Enhancement>,
    pub calls: AtomicUsize,
}

impl FakeEnhancer {
    /// Always succeeds with the given polish and tags.
    pub fn answering(polished: &str, tags: &[&str]) -> Self {
        Self {
            reply: Some(Enhancement {
                polished: polished.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails like a broken network call.
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Enhancer for FakeEnhancer {
    async fn enhance(&self, _text: &str) -> Result<Enhancement, EnhanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(EnhanceError::EmptyResponse)
    }
}

pub fn options(persistence: PersistencePolicy) -> AppOptions {
    AppOptions {
        policy: AccessPolicy::new(ADMIN),
        persistence,
    }
}

/// Load an app over `store` with enhancement disabled and write-through persistence.
pub async fn load_app(store: Arc<dyn KeyValueStore>) -> App {
    App::load(store, Arc::new(Disabled), options(PersistencePolicy::WriteThrough)).await
}

/// Load an app over `store` with the given enhancer.
pub async fn load_app_with(store: Arc<dyn KeyValueStore>, enhancer: Arc<dyn Enhancer>) -> App {
    App::load(store, enhancer, options(PersistencePolicy::WriteThrough)).await
}

/// A fresh in-memory store.
pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}
