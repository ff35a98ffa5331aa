//! [`SqliteStore`]: the SQLite implementation of [`PlatformStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use privatefan_core::{
  notification::{NewNotification, Notification},
  post::{ExploreQuery, LikeToggle, NewPost, Post, PostCard},
  store::PlatformStore,
  subscription::{
    CreatorEntry, Decision, NewSubscription, RequestOutcome, SubscriberEntry, Subscription,
    SubscriptionStatus,
  },
  user::{NewUser, ProfileUpdate, Role, User},
};

use crate::{
  Result,
  encode::{
    NOTIFICATION_COLUMNS, POST_CARD_SELECT, RawNotification, RawPostCard, RawSubscription,
    RawUser, SUBSCRIPTION_COLUMNS, USER_COLUMNS, encode_dt, encode_uuid, like_pattern,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A PrivateFan store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a post-card query with the given `WHERE`/`ORDER BY`/`LIMIT` tail.
  async fn query_cards(&self, tail: String, params: Vec<Value>) -> Result<Vec<PostCard>> {
    let raws: Vec<RawPostCard> = self
      .conn
      .call(move |conn| {
        let sql = format!("{POST_CARD_SELECT} {tail}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawPostCard::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPostCard::into_card).collect()
  }

  /// Subscriptions for one creator in one status, joined with the fans'
  /// profiles.
  async fn creator_side(
    &self,
    creator_email: &str,
    status: SubscriptionStatus,
    order_by: &'static str,
  ) -> Result<Vec<SubscriberEntry>> {
    let creator = creator_email.to_owned();
    let status_str = status.as_str();

    let raws: Vec<(RawSubscription, Option<RawUser>)> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SUBSCRIPTION_COLUMNS}, {user_cols}
             FROM subscriptions s
             LEFT JOIN users u ON u.email = s.fan_email
            WHERE s.creator_email = ?1 AND s.status = ?2
            ORDER BY {order_by}",
          user_cols = prefixed_user_columns(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![creator, status_str], |row| {
            Ok((RawSubscription::read(row)?, RawUser::read_joined(row, 6)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(sub, fan)| {
        Ok(SubscriberEntry {
          subscription: sub.into_subscription()?,
          fan_details:  fan.map(RawUser::into_user).transpose()?,
        })
      })
      .collect()
  }

  async fn read_user(&self, email: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
              rusqlite::params![email],
              |row| RawUser::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

/// [`USER_COLUMNS`] qualified with the `u.` alias.
fn prefixed_user_columns() -> String {
  USER_COLUMNS
    .split(", ")
    .map(|c| format!("u.{c}"))
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── PlatformStore impl ──────────────────────────────────────────────────────

impl PlatformStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let now = Utc::now();
    let user = User {
      email:             input.email,
      full_name:         input.full_name,
      role:              input.role,
      bio:               None,
      profile_image:     None,
      subscription_rate: 0.0,
      created_at:        now,
      updated_at:        now,
    };

    let email = user.email.clone();
    let name = user.full_name.clone();
    let role = user.role.as_str();
    let at_str = encode_dt(now);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO users (email, full_name, role, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![email, name, role, at_str],
        )?)
      })
      .await?;

    Ok((inserted == 1).then_some(user))
  }

  async fn get_user(&self, email: &str) -> Result<Option<User>> {
    self.read_user(email.to_owned()).await
  }

  async fn update_profile(&self, email: &str, update: ProfileUpdate) -> Result<Option<User>> {
    let email = email.to_owned();
    let at_str = encode_dt(Utc::now());
    let (set_bio, bio) = (update.bio.is_some(), update.bio.flatten());
    let (set_image, image) = (update.profile_image.is_some(), update.profile_image.flatten());

    let changed = self
      .conn
      .call({
        let email = email.clone();
        move |conn| {
          Ok(conn.execute(
            "UPDATE users
                SET full_name         = COALESCE(?2, full_name),
                    bio               = CASE WHEN ?3 THEN ?4 ELSE bio END,
                    profile_image     = CASE WHEN ?5 THEN ?6 ELSE profile_image END,
                    subscription_rate = COALESCE(?7, subscription_rate),
                    updated_at        = ?8
              WHERE email = ?1",
            rusqlite::params![
              email,
              update.full_name,
              set_bio,
              bio,
              set_image,
              image,
              update.subscription_rate,
              at_str,
            ],
          )?)
        }
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.read_user(email).await
  }

  async fn list_creators(&self, search: Option<&str>, limit: usize) -> Result<Vec<User>> {
    let pattern = search.map(like_pattern);
    let role = Role::Creator.as_str();
    let limit_val = limit as i64;

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {USER_COLUMNS} FROM users
            WHERE role = ?1
              AND (?2 IS NULL OR full_name LIKE ?2 ESCAPE '\\')
            ORDER BY created_at, rowid
            LIMIT ?3"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![role, pattern, limit_val], |row| RawUser::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let now = Utc::now();
    let post = Post {
      post_id:       Uuid::new_v4(),
      title:         input.title,
      description:   input.description,
      image_url:     input.image_url,
      creator_email: input.creator_email,
      creator_name:  input.creator_name,
      status:        input.status,
      visibility:    input.visibility,
      likes:         0,
      liked_by:      vec![],
      views:         0,
      created_at:    now,
      updated_at:    now,
    };

    let id_str        = encode_uuid(post.post_id);
    let title         = post.title.clone();
    let description   = post.description.clone();
    let image_url     = post.image_url.clone();
    let creator_email = post.creator_email.clone();
    let creator_name  = post.creator_name.clone();
    let status        = post.status.as_str();
    let visibility    = post.visibility.as_str();
    let at_str        = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (
             post_id, title, description, image_url, creator_email,
             creator_name, status, visibility, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            id_str,
            title,
            description,
            image_url,
            creator_email,
            creator_name,
            status,
            visibility,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
    let cards = self
      .query_cards("WHERE p.post_id = ?1".to_owned(), vec![encode_uuid(post_id).into()])
      .await?;
    Ok(cards.into_iter().next().map(|c| c.post))
  }

  async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(post_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM posts WHERE post_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn creator_posts(&self, creator_email: &str) -> Result<Vec<PostCard>> {
    self
      .query_cards(
        "WHERE p.creator_email = ?1 ORDER BY p.created_at DESC, p.rowid DESC".to_owned(),
        vec![creator_email.to_owned().into()],
      )
      .await
  }

  async fn all_posts(&self) -> Result<Vec<PostCard>> {
    self
      .query_cards("ORDER BY p.created_at DESC, p.rowid DESC".to_owned(), vec![])
      .await
  }

  async fn feed_posts(&self, fan_email: Option<&str>, limit: usize) -> Result<Vec<PostCard>> {
    self
      .query_cards(
        "WHERE p.status = 'published'
           AND (?1 IS NULL OR p.creator_email IN (
                 SELECT s.creator_email FROM subscriptions s
                  WHERE s.fan_email = ?1 AND s.status = 'approved'))
         ORDER BY p.created_at DESC, p.rowid DESC
         LIMIT ?2"
          .to_owned(),
        vec![fan_email.map(str::to_owned).into(), (limit as i64).into()],
      )
      .await
  }

  async fn explore_posts(&self, query: &ExploreQuery) -> Result<Vec<PostCard>> {
    let pattern = query.search.as_deref().map(like_pattern);
    // Searches come back newest first; browsing gets a random sample.
    let order = if pattern.is_some() { "p.created_at DESC, p.rowid DESC" } else { "RANDOM()" };

    self
      .query_cards(
        format!(
          "WHERE p.visibility = 'public'
             AND p.status = 'published'
             AND p.image_url IS NOT NULL AND p.image_url <> ''
             AND (?1 IS NULL
                  OR p.title        LIKE ?1 ESCAPE '\\'
                  OR p.description  LIKE ?1 ESCAPE '\\'
                  OR p.creator_name LIKE ?1 ESCAPE '\\')
           ORDER BY {order}
           LIMIT ?2"
        ),
        vec![pattern.into(), (query.limit as i64).into()],
      )
      .await
  }

  async fn toggle_like(&self, post_id: Uuid, fan_email: &str) -> Result<Option<LikeToggle>> {
    let id_str = encode_uuid(post_id);
    let fan = fan_email.to_owned();
    let at_str = encode_dt(Utc::now());

    let toggled = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM posts WHERE post_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let removed = tx.execute(
          "DELETE FROM post_likes WHERE post_id = ?1 AND fan_email = ?2",
          rusqlite::params![id_str, fan],
        )?;
        let is_liked = removed == 0;
        if is_liked {
          tx.execute(
            "INSERT INTO post_likes (post_id, fan_email, liked_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![id_str, fan, at_str],
          )?;
        }

        let delta: i64 = if is_liked { 1 } else { -1 };
        let likes: i64 = tx.query_row(
          "UPDATE posts SET likes = likes + ?2 WHERE post_id = ?1 RETURNING likes",
          rusqlite::params![id_str, delta],
          |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(Some(LikeToggle { likes, is_liked }))
      })
      .await?;

    Ok(toggled)
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn request_subscription(&self, request: NewSubscription) -> Result<RequestOutcome> {
    let subscription = Subscription {
      fan_email:     request.fan_email,
      fan_name:      request.fan_name,
      creator_email: request.creator_email,
      status:        SubscriptionStatus::Pending,
      requested_at:  Utc::now(),
      approved_at:   None,
    };

    let fan = subscription.fan_email.clone();
    let fan_name = subscription.fan_name.clone();
    let creator = subscription.creator_email.clone();
    let at_str = encode_dt(subscription.requested_at);

    // `None` when the insert went through, otherwise the status of the
    // record that was already there.
    let existing: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT INTO subscriptions (fan_email, fan_name, creator_email, status, requested_at)
           VALUES (?1, ?2, ?3, 'pending', ?4)
           ON CONFLICT(fan_email, creator_email) DO NOTHING",
          rusqlite::params![fan, fan_name, creator, at_str],
        )?;
        let existing = if inserted == 1 {
          None
        } else {
          Some(tx.query_row(
            "SELECT status FROM subscriptions WHERE fan_email = ?1 AND creator_email = ?2",
            rusqlite::params![fan, creator],
            |row| row.get(0),
          )?)
        };
        tx.commit()?;
        Ok(existing)
      })
      .await?;

    Ok(match existing {
      None => RequestOutcome::Created(subscription),
      Some(status) => match status.parse::<SubscriptionStatus>()? {
        SubscriptionStatus::Pending => RequestOutcome::AlreadyPending,
        SubscriptionStatus::Approved => RequestOutcome::AlreadySubscribed,
      },
    })
  }

  async fn decide_subscription(
    &self,
    fan_email: &str,
    creator_email: &str,
    decision: Decision,
  ) -> Result<bool> {
    let fan = fan_email.to_owned();
    let creator = creator_email.to_owned();
    let at_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        let changed = match decision {
          Decision::Approve => conn.execute(
            "UPDATE subscriptions
                SET status = 'approved', approved_at = ?3
              WHERE fan_email = ?1 AND creator_email = ?2 AND status = 'pending'",
            rusqlite::params![fan, creator, at_str],
          )?,
          Decision::Reject => conn.execute(
            "DELETE FROM subscriptions
              WHERE fan_email = ?1 AND creator_email = ?2 AND status = 'pending'",
            rusqlite::params![fan, creator],
          )?,
        };
        Ok(changed)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn revoke_subscription(&self, fan_email: &str, creator_email: &str) -> Result<bool> {
    let fan = fan_email.to_owned();
    let creator = creator_email.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subscriptions WHERE fan_email = ?1 AND creator_email = ?2",
          rusqlite::params![fan, creator],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn get_subscription(
    &self,
    fan_email: &str,
    creator_email: &str,
  ) -> Result<Option<Subscription>> {
    let fan = fan_email.to_owned();
    let creator = creator_email.to_owned();

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions s
                  WHERE s.fan_email = ?1 AND s.creator_email = ?2"
              ),
              rusqlite::params![fan, creator],
              RawSubscription::read,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn pending_requests(&self, creator_email: &str) -> Result<Vec<SubscriberEntry>> {
    self
      .creator_side(creator_email, SubscriptionStatus::Pending, "s.requested_at DESC")
      .await
  }

  async fn subscribers(&self, creator_email: &str) -> Result<Vec<SubscriberEntry>> {
    self
      .creator_side(creator_email, SubscriptionStatus::Approved, "s.approved_at DESC")
      .await
  }

  async fn fan_subscriptions(&self, fan_email: &str) -> Result<Vec<CreatorEntry>> {
    let fan = fan_email.to_owned();

    let raws: Vec<(RawSubscription, Option<RawUser>)> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SUBSCRIPTION_COLUMNS}, {user_cols}
             FROM subscriptions s
             LEFT JOIN users u ON u.email = s.creator_email
            WHERE s.fan_email = ?1 AND s.status = 'approved'
            ORDER BY s.approved_at DESC",
          user_cols = prefixed_user_columns(),
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![fan], |row| {
            Ok((RawSubscription::read(row)?, RawUser::read_joined(row, 6)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(sub, creator)| {
        Ok(CreatorEntry {
          subscription:    sub.into_subscription()?,
          creator_details: creator.map(RawUser::into_user).transpose()?,
        })
      })
      .collect()
  }

  async fn approved_creators(&self, fan_email: &str) -> Result<Vec<String>> {
    let fan = fan_email.to_owned();

    let creators = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT creator_email FROM subscriptions
            WHERE fan_email = ?1 AND status = 'approved'
            ORDER BY approved_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![fan], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(creators)
  }

  async fn all_subscriptions(&self) -> Result<Vec<Subscription>> {
    let raws: Vec<RawSubscription> = self
      .conn
      .call(|conn| {
        let sql = format!(
          "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions s
            ORDER BY s.requested_at DESC, s.approved_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawSubscription::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn add_notifications(&self, notifications: Vec<NewNotification>) -> Result<usize> {
    if notifications.is_empty() {
      return Ok(0);
    }
    let at_str = encode_dt(Utc::now());

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO notifications (
               notification_id, recipient_email, sender_email, kind,
               related_id, message, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for n in &notifications {
            written += stmt.execute(rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              n.recipient_email,
              n.sender_email,
              n.kind.as_str(),
              n.related_id.map(encode_uuid),
              n.message,
              at_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    Ok(written)
  }

  async fn add_notification_once(&self, n: NewNotification) -> Result<bool> {
    let id_str = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO notifications (
             notification_id, recipient_email, sender_email, kind,
             related_id, message, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            n.recipient_email,
            n.sender_email,
            n.kind.as_str(),
            n.related_id.map(encode_uuid),
            n.message,
            at_str,
          ],
        )?)
      })
      .await?;

    Ok(inserted == 1)
  }

  async fn notifications_for(
    &self,
    recipient_email: &str,
    limit: usize,
  ) -> Result<Vec<Notification>> {
    let recipient = recipient_email.to_owned();
    let limit_val = limit as i64;

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE recipient_email = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![recipient, limit_val], RawNotification::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn mark_read(&self, notification_id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(notification_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1 WHERE notification_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn prune_notifications(&self, recipient_email: &str, keep: usize) -> Result<usize> {
    let recipient = recipient_email.to_owned();
    let keep_val = keep as i64;

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM notifications
            WHERE recipient_email = ?1
              AND notification_id NOT IN (
                SELECT notification_id FROM notifications
                 WHERE recipient_email = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2)",
          rusqlite::params![recipient, keep_val],
        )?)
      })
      .await?;

    if deleted > 0 {
      tracing::debug!(recipient = %recipient_email, deleted, "pruned notifications");
    }
    Ok(deleted)
  }
}
