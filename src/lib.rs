//! MindStream: a single-author journal.
//!
//! One author writes short "thoughts", optionally with an image and an AI
//! polish that also suggests up to three tags. Everyone else can register a
//! name, log in, or browse as a visitor. State lives in a small SQLite
//! key-value table and is mirrored from memory after every change.
//!
//! # Modules
//!
//! - [`config`]: configuration loading from TOML files and environment variables
//! - [`db`]: SQLite database opening, schema, and health checks
//! - [`storage`]: the key-value persistence port, its backends, and the write policy
//! - [`enhance`]: AI polish and tagging with graceful fallback
//! - [`images`]: downscaling image attachments into `data:` URIs
//! - [`journal`]: the application state controller, sessions, and roles
//! - [`render`]: terminal rendering of the thought list
//! - [`shell`]: interactive session over any reader/writer pair

pub mod config;
pub mod db;
pub mod enhance;
pub mod images;
pub mod journal;
pub mod render;
pub mod shell;
pub mod storage;
