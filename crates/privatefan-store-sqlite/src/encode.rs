//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order in SQL matches chronological order. UUIDs are stored
//! as hyphenated lowercase strings. Enumerations use their wire names.

use chrono::{DateTime, SecondsFormat, Utc};
use privatefan_core::{
  notification::Notification,
  post::{Post, PostCard},
  subscription::Subscription,
  user::User,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Build a `%needle%` pattern for `LIKE ... ESCAPE '\'`, escaping the
/// wildcards in `needle`.
pub fn like_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for c in needle.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "email, full_name, role, bio, profile_image, subscription_rate, created_at, updated_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub email:             String,
  pub full_name:         String,
  pub role:              String,
  pub bio:               Option<String>,
  pub profile_image:     Option<String>,
  pub subscription_rate: f64,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawUser {
  /// Read [`USER_COLUMNS`] starting at column `at`.
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(RawUser {
      email:             row.get(at)?,
      full_name:         row.get(at + 1)?,
      role:              row.get(at + 2)?,
      bio:               row.get(at + 3)?,
      profile_image:     row.get(at + 4)?,
      subscription_rate: row.get(at + 5)?,
      created_at:        row.get(at + 6)?,
      updated_at:        row.get(at + 7)?,
    })
  }

  /// Like [`RawUser::read`], for the nullable side of a `LEFT JOIN`.
  pub fn read_joined(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<Self>> {
    match row.get::<_, Option<String>>(at)? {
      Some(_) => Self::read(row, at).map(Some),
      None => Ok(None),
    }
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      email:             self.email,
      full_name:         self.full_name,
      role:              self.role.parse()?,
      bio:               self.bio,
      profile_image:     self.profile_image,
      subscription_rate: self.subscription_rate,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Posts ───────────────────────────────────────────────────────────────────

/// Selects everything a [`PostCard`] needs. Callers append `WHERE`/`ORDER BY`.
pub const POST_CARD_SELECT: &str = "
SELECT p.post_id, p.title, p.description, p.image_url, p.creator_email,
       p.creator_name, p.status, p.visibility, p.likes, p.views,
       p.created_at, p.updated_at,
       (SELECT json_group_array(l.fan_email) FROM post_likes l
         WHERE l.post_id = p.post_id) AS liked_by,
       u.profile_image
  FROM posts p
  LEFT JOIN users u ON u.email = p.creator_email AND u.role = 'creator'";

/// Raw values read from a [`POST_CARD_SELECT`] row.
pub struct RawPostCard {
  pub post_id:               String,
  pub title:                 String,
  pub description:           String,
  pub image_url:             Option<String>,
  pub creator_email:         String,
  pub creator_name:          String,
  pub status:                String,
  pub visibility:            String,
  pub likes:                 i64,
  pub views:                 i64,
  pub created_at:            String,
  pub updated_at:            String,
  pub liked_by:              String,
  pub creator_profile_image: Option<String>,
}

impl RawPostCard {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawPostCard {
      post_id:               row.get(0)?,
      title:                 row.get(1)?,
      description:           row.get(2)?,
      image_url:             row.get(3)?,
      creator_email:         row.get(4)?,
      creator_name:          row.get(5)?,
      status:                row.get(6)?,
      visibility:            row.get(7)?,
      likes:                 row.get(8)?,
      views:                 row.get(9)?,
      created_at:            row.get(10)?,
      updated_at:            row.get(11)?,
      liked_by:              row.get(12)?,
      creator_profile_image: row.get(13)?,
    })
  }

  pub fn into_card(self) -> Result<PostCard> {
    let post = Post {
      post_id:       decode_uuid(&self.post_id)?,
      title:         self.title,
      description:   self.description,
      image_url:     self.image_url,
      creator_email: self.creator_email,
      creator_name:  self.creator_name,
      status:        self.status.parse()?,
      visibility:    self.visibility.parse()?,
      likes:         self.likes,
      liked_by:      serde_json::from_str(&self.liked_by)?,
      views:         self.views,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    };
    Ok(PostCard { post, creator_profile_image: self.creator_profile_image, is_liked: None })
  }
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

pub const SUBSCRIPTION_COLUMNS: &str =
  "s.fan_email, s.fan_name, s.creator_email, s.status, s.requested_at, s.approved_at";

/// Raw values read from a `subscriptions` row.
pub struct RawSubscription {
  pub fan_email:     String,
  pub fan_name:      Option<String>,
  pub creator_email: String,
  pub status:        String,
  pub requested_at:  String,
  pub approved_at:   Option<String>,
}

impl RawSubscription {
  /// Read [`SUBSCRIPTION_COLUMNS`] from the start of the row.
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawSubscription {
      fan_email:     row.get(0)?,
      fan_name:      row.get(1)?,
      creator_email: row.get(2)?,
      status:        row.get(3)?,
      requested_at:  row.get(4)?,
      approved_at:   row.get(5)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      fan_email:     self.fan_email,
      fan_name:      self.fan_name,
      creator_email: self.creator_email,
      status:        self.status.parse()?,
      requested_at:  decode_dt(&self.requested_at)?,
      approved_at:   self.approved_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub const NOTIFICATION_COLUMNS: &str = "notification_id, recipient_email, sender_email, kind, \
                                        related_id, message, is_read, created_at";

/// Raw values read from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub recipient_email: String,
  pub sender_email:    String,
  pub kind:            String,
  pub related_id:      Option<String>,
  pub message:         String,
  pub is_read:         bool,
  pub created_at:      String,
}

impl RawNotification {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawNotification {
      notification_id: row.get(0)?,
      recipient_email: row.get(1)?,
      sender_email:    row.get(2)?,
      kind:            row.get(3)?,
      related_id:      row.get(4)?,
      message:         row.get(5)?,
      is_read:         row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      recipient_email: self.recipient_email,
      sender_email:    self.sender_email,
      kind:            self.kind.parse()?,
      related_id:      self.related_id.as_deref().map(decode_uuid).transpose()?,
      message:         self.message,
      is_read:         self.is_read,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
