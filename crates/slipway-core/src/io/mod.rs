//! Streaming network IO for release artifacts.

pub mod download;
