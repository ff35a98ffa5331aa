//! Posts, the content units creators publish.
//!
//! The owning creator's name is copied onto the post when it is created and is
//! not kept in sync with later profile edits. The creator's profile image, on
//! the other hand, is joined in at read time (see [`PostCard`]).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
  #[default]
  Published,
  Draft,
  Scheduled,
}

impl PostStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PostStatus::Published => "published",
      PostStatus::Draft => "draft",
      PostStatus::Scheduled => "scheduled",
    }
  }
}

impl FromStr for PostStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "published" => Ok(PostStatus::Published),
      "draft" => Ok(PostStatus::Draft),
      "scheduled" => Ok(PostStatus::Scheduled),
      other => Err(Error::UnknownDiscriminant { kind: "post status", value: other.to_owned() }),
    }
  }
}

/// Who may see a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  /// Anyone, subscribed or not.
  #[default]
  Public,
  /// Only fans holding an approved subscription to the creator.
  Private,
}

impl Visibility {
  pub fn as_str(self) -> &'static str {
    match self {
      Visibility::Public => "public",
      Visibility::Private => "private",
    }
  }
}

impl FromStr for Visibility {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "public" => Ok(Visibility::Public),
      "private" => Ok(Visibility::Private),
      other => Err(Error::UnknownDiscriminant { kind: "visibility", value: other.to_owned() }),
    }
  }
}

// ─── Post ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
  pub post_id:       Uuid,
  pub title:         String,
  pub description:   String,
  pub image_url:     Option<String>,
  pub creator_email: String,
  pub creator_name:  String,
  pub status:        PostStatus,
  pub visibility:    Visibility,
  /// Always equal to `liked_by.len()`.
  pub likes:         i64,
  /// Emails of the fans who currently like this post. Each appears at most once.
  pub liked_by:      Vec<String>,
  /// Never incremented.
  pub views:         i64,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Post {
  pub fn is_liked_by(&self, fan_email: &str) -> bool {
    self.liked_by.iter().any(|e| e == fan_email)
  }

  pub fn has_image(&self) -> bool { self.image_url.as_deref().is_some_and(|u| !u.is_empty()) }
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub title:         String,
  pub description:   String,
  pub image_url:     Option<String>,
  pub creator_email: String,
  pub creator_name:  String,
  pub status:        PostStatus,
  pub visibility:    Visibility,
}

impl NewPost {
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if self.creator_email.is_empty() {
      return Err(Error::MissingField("creator email"));
    }
    Ok(())
  }
}

/// A post as it appears in listings: the stored post plus read-time
/// projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCard {
  #[serde(flatten)]
  pub post:                  Post,
  /// The creator's current profile image, if the creator has one.
  pub creator_profile_image: Option<String>,
  /// Whether the requesting viewer likes this post. Absent for anonymous
  /// listings.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub is_liked:              Option<bool>,
}

impl PostCard {
  /// Fill in [`PostCard::is_liked`] for `viewer`, if there is one.
  pub fn for_viewer(mut self, viewer: Option<&str>) -> Self {
    self.is_liked = viewer.map(|v| self.post.is_liked_by(v));
    self
  }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
  /// The post's like counter after the toggle.
  pub likes:    i64,
  /// Whether the fan likes the post after the toggle.
  pub is_liked: bool,
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`PlatformStore::explore_posts`](crate::store::PlatformStore::explore_posts).
#[derive(Debug, Clone, Default)]
pub struct ExploreQuery {
  /// Case-insensitive substring matched against title, description and
  /// creator name. `None` asks for a random sample instead.
  pub search: Option<String>,
  pub limit:  usize,
}
