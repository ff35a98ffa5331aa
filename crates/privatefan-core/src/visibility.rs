//! The content visibility gate.
//!
//! Evaluated per request from the viewer's subscription status; nothing here
//! is cached.

use crate::post::{Post, PostCard, Visibility};

/// How much of one creator's catalogue a viewer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  /// Anonymous viewers and fans without an approved subscription.
  PublicOnly,
  /// Fans holding an approved subscription to the creator.
  Subscriber,
  /// The creator looking at their own posts.
  Owner,
}

impl Access {
  /// Work out the access `viewer` has to `creator_email`'s posts, given
  /// whether that viewer holds an approved subscription.
  pub fn resolve(viewer: Option<&str>, creator_email: &str, approved: bool) -> Self {
    match viewer {
      Some(v) if v == creator_email => Access::Owner,
      Some(_) if approved => Access::Subscriber,
      _ => Access::PublicOnly,
    }
  }

  pub fn can_see(self, post: &Post) -> bool {
    match self {
      Access::Owner | Access::Subscriber => true,
      Access::PublicOnly => post.visibility == Visibility::Public,
    }
  }
}

/// Drop every card `access` does not allow, keeping order.
pub fn visible(cards: Vec<PostCard>, access: Access) -> Vec<PostCard> {
  cards.into_iter().filter(|c| access.can_see(&c.post)).collect()
}
