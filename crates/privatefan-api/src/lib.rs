//! JSON REST API for PrivateFan.
//!
//! Exposes an axum [`Router`] backed by any
//! [`privatefan_core::store::PlatformStore`]. TLS and transport concerns are
//! the caller's responsibility; the admin session is checked here.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", privatefan_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod explore;
pub mod extract;
pub mod notifications;
pub mod notify;
pub mod posts;
pub mod subscriptions;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use privatefan_core::store::PlatformStore;

pub use auth::AdminCredentials;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Tunables that shape handler behaviour.
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
  /// Most notifications kept per recipient.
  pub notification_retention: usize,
}

impl Default for ApiSettings {
  fn default() -> Self { Self { notification_retention: 200 } }
}

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub admin:    Arc<AdminCredentials>,
  pub settings: ApiSettings,
}

// Not derived: the derive would demand `S: Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      admin:    Arc::clone(&self.admin),
      settings: self.settings,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: PlatformStore + 'static,
{
  Router::new()
    // Subscriptions
    .route(
      "/subscriptions",
      get(subscriptions::list::<S>)
        .post(subscriptions::request::<S>)
        .patch(subscriptions::decide::<S>)
        .delete(subscriptions::revoke::<S>),
    )
    .route("/subscriptions/status", get(subscriptions::status::<S>))
    // Posts
    .route(
      "/posts",
      get(posts::list::<S>)
        .post(posts::create::<S>)
        .patch(posts::toggle_like::<S>)
        .delete(posts::delete::<S>),
    )
    .route("/posts/feed", get(posts::feed::<S>))
    .route("/explore", get(explore::handler::<S>))
    // Notifications
    .route("/notifications", get(notifications::list::<S>).patch(notifications::mark_read::<S>))
    // Profiles
    .route("/users", post(users::create::<S>))
    .route("/profile", get(users::profile::<S>).put(users::update_profile::<S>))
    .route("/creators", get(users::creators::<S>))
    // Admin
    .route("/admin/login", post(auth::login::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
