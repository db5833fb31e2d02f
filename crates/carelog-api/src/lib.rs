//! JSON REST API for carelog.
//!
//! Exposes an axum [`Router`] backed by an [`Analyzer`] over any
//! [`carelog_core::store::CareStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", carelog_api::api_router(analyzer.clone()))
//! ```

pub mod alerts;
pub mod analysis;
pub mod check_ins;
pub mod children;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use carelog_core::{Analyzer, store::CareStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `analyzer`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(analyzer: Arc<Analyzer<S>>) -> Router<()>
where
  S: CareStore + 'static,
{
  Router::new()
    // Children
    .route("/children", post(children::create::<S>))
    .route("/children/{id}", get(children::get_one::<S>))
    // Check-ins
    .route("/check-ins", post(check_ins::create::<S>))
    .route("/children/{id}/check-ins", get(check_ins::list::<S>))
    // Analysis
    .route("/children/{id}/analysis", post(analysis::run::<S>))
    // Alerts
    .route("/health-alerts/timeline/{child_id}", get(alerts::timeline::<S>))
    .route("/health-alerts/unread-count/{child_id}", get(alerts::unread_count::<S>))
    .route("/health-alerts/{id}/read", put(alerts::set_read::<S>))
    .route("/health-alerts/{id}", axum::routing::delete(alerts::delete::<S>))
    .with_state(analyzer)
}
