//! Delivers remote media to Telegram chats.
//!
//! Given media already resolved to fetchable URLs, the [`uploader`] module
//! downloads each file, decides how it fits the endpoint's upload limits,
//! sends it (alone or as album groups) and falls back to plain links when a
//! file cannot be delivered.

pub mod config;
pub mod errors;
pub mod media;
pub mod security;
pub mod uploader;
