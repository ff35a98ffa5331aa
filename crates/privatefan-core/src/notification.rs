//! Notifications: fan-out records written as a side effect of other actions.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, post::Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
  NewPost,
  Like,
  SubscriptionRequest,
}

impl NotificationKind {
  pub fn as_str(self) -> &'static str {
    match self {
      NotificationKind::NewPost => "new_post",
      NotificationKind::Like => "like",
      NotificationKind::SubscriptionRequest => "subscription_request",
    }
  }
}

impl FromStr for NotificationKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "new_post" => Ok(NotificationKind::NewPost),
      "like" => Ok(NotificationKind::Like),
      "subscription_request" => Ok(NotificationKind::SubscriptionRequest),
      other => Err(Error::UnknownDiscriminant {
        kind:  "notification type",
        value: other.to_owned(),
      }),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub notification_id: Uuid,
  pub recipient_email: String,
  pub sender_email:    String,
  #[serde(rename = "type")]
  pub kind:            NotificationKind,
  /// The post a `new_post` or `like` notification is about.
  pub related_id:      Option<Uuid>,
  pub message:         String,
  pub is_read:         bool,
  pub created_at:      DateTime<Utc>,
}

/// A notification that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
  pub recipient_email: String,
  pub sender_email:    String,
  pub kind:            NotificationKind,
  pub related_id:      Option<Uuid>,
  pub message:         String,
}

impl NewNotification {
  /// Tell `subscriber` that `post`'s creator published it.
  pub fn new_post(post: &Post, subscriber: &str) -> Self {
    let what = if post.has_image() { "photo" } else { "update" };
    Self {
      recipient_email: subscriber.to_owned(),
      sender_email:    post.creator_email.clone(),
      kind:            NotificationKind::NewPost,
      related_id:      Some(post.post_id),
      message:         format!("{} posted a new {what}", post.creator_name),
    }
  }

  /// Tell `post`'s creator that `fan_email` liked it.
  pub fn like(post: &Post, fan_email: &str) -> Self {
    Self {
      recipient_email: post.creator_email.clone(),
      sender_email:    fan_email.to_owned(),
      kind:            NotificationKind::Like,
      related_id:      Some(post.post_id),
      message:         format!("{fan_email} liked your post \"{}\"", post.title),
    }
  }

  /// Tell `creator_email` that a fan asked to subscribe.
  pub fn subscription_request(
    fan_email: &str,
    fan_name: Option<&str>,
    creator_email: &str,
  ) -> Self {
    let who = fan_name.filter(|n| !n.is_empty()).unwrap_or(fan_email);
    Self {
      recipient_email: creator_email.to_owned(),
      sender_email:    fan_email.to_owned(),
      kind:            NotificationKind::SubscriptionRequest,
      related_id:      None,
      message:         format!("{who} requested to subscribe"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::post::{PostStatus, Visibility};

  fn post(image_url: Option<&str>) -> Post {
    let now = Utc::now();
    Post {
      post_id:       Uuid::new_v4(),
      title:         "Sunset".into(),
      description:   String::new(),
      image_url:     image_url.map(str::to_owned),
      creator_email: "c@x.com".into(),
      creator_name:  "Cleo".into(),
      status:        PostStatus::Published,
      visibility:    Visibility::Public,
      likes:         0,
      liked_by:      vec![],
      views:         0,
      created_at:    now,
      updated_at:    now,
    }
  }

  #[test]
  fn new_post_wording_depends_on_image() {
    let n = NewNotification::new_post(&post(Some("/uploads/a.png")), "f@x.com");
    assert_eq!(n.message, "Cleo posted a new photo");
    assert_eq!(n.recipient_email, "f@x.com");
    assert_eq!(n.sender_email, "c@x.com");

    let n = NewNotification::new_post(&post(Some("")), "f@x.com");
    assert_eq!(n.message, "Cleo posted a new update");
  }

  #[test]
  fn like_goes_to_the_creator() {
    let p = post(None);
    let n = NewNotification::like(&p, "f@x.com");
    assert_eq!(n.recipient_email, "c@x.com");
    assert_eq!(n.related_id, Some(p.post_id));
    assert_eq!(n.message, "f@x.com liked your post \"Sunset\"");
  }

  #[test]
  fn subscription_request_falls_back_to_email() {
    let n = NewNotification::subscription_request("f@x.com", Some(""), "c@x.com");
    assert_eq!(n.message, "f@x.com requested to subscribe");
    let n = NewNotification::subscription_request("f@x.com", Some("Finn"), "c@x.com");
    assert_eq!(n.message, "Finn requested to subscribe");
    assert_eq!(n.kind, NotificationKind::SubscriptionRequest);
  }
}
