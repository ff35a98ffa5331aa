//! The `PlatformStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `privatefan-store-sqlite`). Higher layers (`privatefan-api`) depend on this
//! abstraction, not on any concrete backend.
//!
//! Natural keys are enforced by the backend, not by callers looking before
//! they write: one subscription per (fan, creator), one like per
//! (post, fan), one like notification per (recipient, sender, post).

use std::future::Future;

use uuid::Uuid;

use crate::{
  notification::{NewNotification, Notification},
  post::{ExploreQuery, LikeToggle, NewPost, Post, PostCard},
  subscription::{
    CreatorEntry, Decision, NewSubscription, RequestOutcome, SubscriberEntry, Subscription,
  },
  user::{NewUser, ProfileUpdate, User},
};

/// Abstraction over a PrivateFan storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PlatformStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Store a new profile. Returns `None` if the email is already taken.
  fn create_user(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Apply a partial edit. Returns the updated profile, or `None` if no user
  /// has that email.
  fn update_profile<'a>(
    &'a self,
    email: &'a str,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Creators whose name contains `search` (case-insensitive), or all
  /// creators when `search` is `None`.
  fn list_creators<'a>(
    &'a self,
    search: Option<&'a str>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + 'a;

  // ── Posts ─────────────────────────────────────────────────────────────

  fn create_post(
    &self,
    post: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Hard-delete a post and its likes. Returns `false` if it did not exist.
  fn delete_post(
    &self,
    post_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Every post by one creator, newest first, with no visibility filtering.
  fn creator_posts<'a>(
    &'a self,
    creator_email: &'a str,
  ) -> impl Future<Output = Result<Vec<PostCard>, Self::Error>> + Send + 'a;

  /// Every post on the platform, newest first.
  fn all_posts(&self) -> impl Future<Output = Result<Vec<PostCard>, Self::Error>> + Send + '_;

  /// Published posts, newest first. With a fan, only posts by creators the
  /// fan holds an approved subscription to (possibly none).
  fn feed_posts<'a>(
    &'a self,
    fan_email: Option<&'a str>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<PostCard>, Self::Error>> + Send + 'a;

  /// Public, published posts that carry an image.
  fn explore_posts<'a>(
    &'a self,
    query: &'a ExploreQuery,
  ) -> impl Future<Output = Result<Vec<PostCard>, Self::Error>> + Send + 'a;

  /// Flip `fan_email`'s like on a post. Returns `None` if the post does not
  /// exist.
  fn toggle_like<'a>(
    &'a self,
    post_id: Uuid,
    fan_email: &'a str,
  ) -> impl Future<Output = Result<Option<LikeToggle>, Self::Error>> + Send + 'a;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Create a pending request unless the pair already has a record.
  fn request_subscription(
    &self,
    request: NewSubscription,
  ) -> impl Future<Output = Result<RequestOutcome, Self::Error>> + Send + '_;

  /// Approve or reject the pair's pending request. Returns `false` when there
  /// was no pending request to act on.
  fn decide_subscription<'a>(
    &'a self,
    fan_email: &'a str,
    creator_email: &'a str,
    decision: Decision,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete the pair's record whatever its status. Returns `false` if there
  /// was none.
  fn revoke_subscription<'a>(
    &'a self,
    fan_email: &'a str,
    creator_email: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn get_subscription<'a>(
    &'a self,
    fan_email: &'a str,
    creator_email: &'a str,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + 'a;

  /// A creator's pending requests, newest request first.
  fn pending_requests<'a>(
    &'a self,
    creator_email: &'a str,
  ) -> impl Future<Output = Result<Vec<SubscriberEntry>, Self::Error>> + Send + 'a;

  /// A creator's approved subscribers, most recently approved first.
  fn subscribers<'a>(
    &'a self,
    creator_email: &'a str,
  ) -> impl Future<Output = Result<Vec<SubscriberEntry>, Self::Error>> + Send + 'a;

  /// A fan's approved subscriptions with the creators' profiles.
  fn fan_subscriptions<'a>(
    &'a self,
    fan_email: &'a str,
  ) -> impl Future<Output = Result<Vec<CreatorEntry>, Self::Error>> + Send + 'a;

  /// Emails of the creators a fan holds an approved subscription to.
  fn approved_creators<'a>(
    &'a self,
    fan_email: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  /// Every subscription record, newest request first.
  fn all_subscriptions(
    &self,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Store a batch of notifications. Returns how many were written.
  fn add_notifications(
    &self,
    notifications: Vec<NewNotification>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Store a notification unless an identical (recipient, sender, type,
  /// related id) one exists. Returns whether it was written.
  fn add_notification_once(
    &self,
    notification: NewNotification,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// A recipient's notifications, newest first.
  fn notifications_for<'a>(
    &'a self,
    recipient_email: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + 'a;

  /// Returns `false` if no notification has that id.
  fn mark_read(
    &self,
    notification_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete all but the newest `keep` notifications of a recipient. Returns
  /// how many were deleted.
  fn prune_notifications<'a>(
    &'a self,
    recipient_email: &'a str,
    keep: usize,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}
