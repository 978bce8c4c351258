//! JSON REST API for kindred.
//!
//! Exposes an axum [`Router`] backed by any [`kindred_core::store::FamilyStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility; the
//! requester of a removal is the `{id}` path segment.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kindred_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod labels;
pub mod members;
pub mod persons;
pub mod tree;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use kindred_core::store::FamilyStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: FamilyStore + 'static,
{
  Router::new()
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route("/persons/{id}", get(persons::get_one::<S>))
    // Read models
    .route("/persons/{id}/tree", get(tree::tree::<S>))
    .route("/persons/{id}/tree/extended", get(tree::extended::<S>))
    .route("/persons/{id}/graph", get(tree::graph::<S>))
    // Membership
    .route("/persons/{id}/members", post(members::add::<S>))
    .route("/persons/{id}/members/{target}", delete(members::remove::<S>))
    // Taxonomy
    .route("/labels", get(labels::resolve::<S>))
    .with_state(store)
}
