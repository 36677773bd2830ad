//! # Labelkit
//!
//! **A media and text annotation backend.**
//!
//! Labelkit stores named annotation projects, shape-annotated images
//! (rectangles, polygons, segmentation outlines), and entity-span
//! annotations over free text, served over a JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────┐
//! │ HTTP (axum)  │──▶│ Annotation Engine │──▶│  SQLite  │
//! │ upload/query │   │  (labelkit-core)  │   │ WAL+JSON │
//! └──────────────┘   └───────────────────┘   └──────────┘
//! ```
//!
//! The engine crate owns every invariant: shape validation, literal
//! entity matching, content-keyed image dedup, and difference-checked
//! text-record persistence. This crate is the plumbing around it.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema creation (idempotent) |
//! | [`sqlite_store`] | SQLite implementation of the engine's `Store` trait |
//! | [`server`] | JSON HTTP server (axum) with CORS |

pub mod config;
pub mod db;
pub mod migrate;
pub mod server;
pub mod sqlite_store;

pub use sqlite_store::SqliteStore;
