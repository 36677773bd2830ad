//! # Labelkit Core
//!
//! Shared logic for the Labelkit annotation engine: data models, shape
//! validation, entity matching, the store abstraction, and the
//! content-keyed image reconciler.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or HTTP
//! dependencies. Everything with real invariants lives here; transport
//! and persistence backends plug in through the [`store::Store`] trait.
//!
//! ## Data Flow
//!
//! 1. Callers submit shape annotations, which are decoded into the
//!    tagged [`models::ShapeAnnotation`] type and checked by [`shape`].
//! 2. Image uploads run through [`reconcile`], which deduplicates by
//!    content identity within a project and replaces annotation lists
//!    wholesale on repeat uploads.
//! 3. Text annotation requests run through [`entity`] (pure span
//!    matching) and [`annotate`] (difference-checked persistence).
//! 4. [`labels`] derives the distinct label definitions in use for a
//!    project from its stored spans.

pub mod annotate;
pub mod entity;
pub mod error;
pub mod labels;
pub mod models;
pub mod projects;
pub mod reconcile;
pub mod shape;
pub mod store;

pub use error::EngineError;
