//! # repo-context
//!
//! Turns a GitHub repository identifier and a natural-language question into
//! a small, ranked set of file excerpts for a downstream language model.
//!
//! ## Architecture
//!
//! ```text
//!     identifier, query
//!            │
//!            ▼
//!   ┌──────────────────┐   malformed → InvalidIdentifier
//!   │ Identifier parse │
//!   └────────┬─────────┘
//!            ▼
//!   ┌──────────────────┐   over quota → RateLimited{retry_after}
//!   │   Rate limiter   │   (global sliding window)
//!   └────────┬─────────┘
//!            ▼
//!   ┌──────────────────┐   hit
//!   │  Repository LRU  │─────────────────────────┐
//!   │  (single-flight) │                         │
//!   └────────┬─────────┘                         │
//!            │ miss                              │
//!            ▼                                   │
//!   ┌──────────────────┐                         │
//!   │ Tree fetch       │ default branch,         │
//!   └────────┬─────────┘ eligible blobs          │
//!            ▼                                   │
//!   ┌──────────────────┐                         │
//!   │ Raw downloads    │ bounded concurrency,    │
//!   └────────┬─────────┘ failures skipped        │
//!            ▼                                   │
//!   ┌──────────────────┐                         │
//!   │ Summarize        │                         │
//!   └────────┬─────────┘                         │
//!            ▼                                   │
//!   ┌──────────────────┐                         │
//!   │ Embed + index    │──▶ cached ──────────────┤
//!   └──────────────────┘                         ▼
//!                                      ┌───────────────────┐
//!                                      │  Query retrieval  │
//!                                      │  embed query,     │
//!                                      │  k-NN (L2),       │
//!                                      │  nearest first    │
//!                                      └─────────┬─────────┘
//!                                                ▼
//!                                         ordered excerpts
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for limits, GitHub and the embedding provider
//! - [`error`] - `ContextError`, the request-level error taxonomy
//! - [`models`] - Shared data types: `RepoKey`, `FileRecord`, `Summary`, `Excerpt`, request/response types
//! - [`rate_limit`] - Global sliding-window admission control
//! - [`github`] - Identifier parsing, tree listing, concurrent raw downloads
//! - [`summarize`] - Deterministic per-file digests by content kind
//! - [`llm::embeddings`] - Batch embedding via Ollama or OpenAI-compatible APIs
//! - [`search::vector`] - Exact flat L2 vector index
//! - [`search::index`] - Per-repository index build and query retrieval
//! - [`cache`] - Bounded LRU of built indexes with per-key single-flight builds
//! - [`engine`] - `ContextEngine::get_context`, the public contract
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state holding the engine

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod github;
pub mod llm;
pub mod models;
pub mod rate_limit;
pub mod search;
pub mod state;
pub mod summarize;
