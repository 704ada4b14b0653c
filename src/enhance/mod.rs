//! AI polish and auto-tagging of journal text.
//!
//! Provides the [`Enhancer`] trait, a Gemini implementation, and
//! [`enhance_or_passthrough`], which is the only entry point the journal uses:
//! it never fails, degrading to the original text with no tags.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EnhanceConfig;

/// Upper bound on tags kept from a single enhancement.
pub const MAX_TAGS: usize = 3;

/// What the model returns: a polished rewrite and topic tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enhancement {
    pub polished: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no text")]
    EmptyResponse,

    #[error("response was not the expected JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[async_trait]
pub trait Enhancer: Send + Sync {
    async fn enhance(&self, text: &str) -> Result<Enhancement, EnhanceError>;
}

/// Enhancer used when no credential is configured.
pub struct Disabled;

#[async_trait]
impl Enhancer for Disabled {
    async fn enhance(&self, _text: &str) -> Result<Enhancement, EnhanceError> {
        Err(EnhanceError::MissingCredential)
    }
}

/// Result of [`enhance_or_passthrough`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhanceOutcome {
    pub polished: String,
    pub tags: Vec<String>,
    /// `true` only when the service answered with usable text.
    pub enhanced: bool,
}

impl EnhanceOutcome {
    fn passthrough(text: &str) -> Self {
        Self {
            polished: text.to_string(),
            tags: Vec::new(),
            enhanced: false,
        }
    }
}

/// Run an enhancement, falling back to `text` unchanged with no tags on any error.
pub async fn enhance_or_passthrough(enhancer: &dyn Enhancer, text: &str) -> EnhanceOutcome {
    match enhancer.enhance(text).await {
        Ok(enhancement) => {
            let polished = enhancement.polished.trim();
            if polished.is_empty() {
                tracing::error!("enhancement returned empty text, keeping original");
                return EnhanceOutcome::passthrough(text);
            }
            let tags = normalize_tags(&enhancement.tags);
            tracing::info!(tags = ?tags, "thought enhanced");
            EnhanceOutcome {
                polished: polished.to_string(),
                tags,
                enhanced: true,
            }
        }
        Err(EnhanceError::MissingCredential) => {
            tracing::warn!("no API key found, skipping AI enhancement");
            EnhanceOutcome::passthrough(text)
        }
        Err(e) => {
            tracing::error!(error = %e, "AI enhancement failed, keeping original");
            EnhanceOutcome::passthrough(text)
        }
    }
}

/// Lowercase, trim, strip a leading `#`, drop empties and repeats, keep at most [`MAX_TAGS`].
pub fn normalize_tags(raw: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(MAX_TAGS);
    for tag in raw {
        let tag = tag.trim().trim_start_matches('#').trim().to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

/// Create an enhancer from config: Gemini when an API key is set, otherwise [`Disabled`].
pub fn create_enhancer(config: &EnhanceConfig) -> std::sync::Arc<dyn Enhancer> {
    match config.api_key() {
        Some(key) => std::sync::Arc::new(gemini::GeminiEnhancer::new(
            key,
            &config.model,
            &config.base_url,
        )),
        None => std::sync::Arc::new(Disabled),
    }
}
