//! # norm-assist
//!
//! A Rust web service that answers free-text questions about three normative
//! document collections (circular notices, coded operational instructions,
//! and a regulation subdivided into articles) stored as heterogeneous JSON
//! documents.
//!
//! ## Architecture
//!
//! Each request flows through a fixed pipeline:
//!
//! ```text
//!                ┌──────────────┐
//!                │  User Query  │
//!                └──────┬───────┘
//!                       │
//!                       ▼
//!            ┌─────────────────────┐
//!            │ Intent Classifier   │  LLM call #1: query → structured
//!            │ (kind, type, kw, yr)│  intent, JSON-only contract
//!            └──────────┬──────────┘
//!                       │ unknown / empty intent → fixed reply, no store access
//!                       ▼
//!            ┌─────────────────────┐
//!            │   Query Compiler    │  intent → predicate tree per
//!            │ (shortcut, kw, year)│  target collection
//!            └──────────┬──────────┘
//!                       │
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!    ┌──────────┐ ┌────────────┐ ┌───────────┐
//!    │ Notices  │ │Instructions│ │Regulation │   concurrent per-collection
//!    └─────┬────┘ └─────┬──────┘ └─────┬─────┘   fetch / count / latest scan
//!          └────────────┼──────────────┘
//!                       ▼
//!            ┌─────────────────────┐
//!            │ Normalize + Dedupe  │  unique by id, nulls pruned,
//!            └──────────┬──────────┘  dates as ISO-8601 strings
//!                       │ zero records → fixed reply, no synthesis
//!                       ▼
//!            ┌─────────────────────┐
//!            │ Answer Synthesizer  │  LLM call #2: context + metadata
//!            └──────────┬──────────┘  → prose answer
//!                       ▼
//!              { results, answer }
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, data dir, and LLM settings
//! - [`models`] - Shared data types: `Intent`, `DocumentRecord`, request/response types
//! - [`error`] - Request-level error taxonomy
//! - [`store`] - `DocumentStore` trait and the JSON-file-backed `MemoryStore`
//! - [`search::predicate`] - Boolean predicate trees evaluated over JSON documents
//! - [`search::compile`] - Intent → predicate compilation (identifier shortcut, keyword and year clauses)
//! - [`search::dispatch`] - Collection resolution and concurrent fetch/count/latest strategies
//! - [`search::latest`] - Coded-title parsing and max-sequence resolution for instructions
//! - [`search::normalize`] - Deduplication and field coercion into typed records
//! - [`llm`] - `Classifier`/`Synthesizer` traits and their Ollama/OpenAI-backed implementations
//! - [`pipeline`] - The orchestration state machine tying classification, retrieval and synthesis together
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state holding the store, HTTP client and config

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod state;
pub mod store;
