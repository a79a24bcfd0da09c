//! JSON REST API over the back-office tables.
//!
//! Exposes an axum [`Router`] backed by any
//! [`ecclesia_core::store::DataService`]. Every table is reachable under
//! its snake_case name; regions and districts also serve their nested
//! overview tree.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", ecclesia_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod rows;
pub mod trees;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{Router, routing::get};
use ecclesia_core::store::DataService;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DataService + 'static,
{
  Router::new()
    .route("/{table}", get(rows::list::<S>).post(rows::create::<S>))
    .route(
      "/{table}/{id}",
      get(rows::get_one::<S>)
        .patch(rows::patch_one::<S>)
        .delete(rows::delete_one::<S>),
    )
    .route("/{table}/{id}/tree", get(trees::handler::<S>))
    .with_state(store)
}
