//! SQL schema for the PrivateFan SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    email             TEXT PRIMARY KEY,
    full_name         TEXT NOT NULL,
    role              TEXT NOT NULL,          -- 'creator' | 'fan'
    bio               TEXT,
    profile_image     TEXT,
    subscription_rate REAL NOT NULL DEFAULT 0 CHECK (subscription_rate >= 0),
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

-- creator_name is copied from the creator at insert time and never refreshed.
CREATE TABLE IF NOT EXISTS posts (
    post_id       TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL DEFAULT '',
    image_url     TEXT,
    creator_email TEXT NOT NULL,
    creator_name  TEXT NOT NULL,
    status        TEXT NOT NULL,              -- 'published' | 'draft' | 'scheduled'
    visibility    TEXT NOT NULL,              -- 'public' | 'private'
    likes         INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
    views         INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- The liked-by set. posts.likes always equals the row count per post.
CREATE TABLE IF NOT EXISTS post_likes (
    post_id   TEXT NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    fan_email TEXT NOT NULL,
    liked_at  TEXT NOT NULL,
    PRIMARY KEY (post_id, fan_email)
);

-- At most one record per (fan, creator); absence means no subscription.
CREATE TABLE IF NOT EXISTS subscriptions (
    fan_email     TEXT NOT NULL,
    fan_name      TEXT,
    creator_email TEXT NOT NULL,
    status        TEXT NOT NULL,              -- 'pending' | 'approved'
    requested_at  TEXT NOT NULL,
    approved_at   TEXT,
    PRIMARY KEY (fan_email, creator_email),
    CHECK ((status = 'approved') = (approved_at IS NOT NULL))
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    recipient_email TEXT NOT NULL,
    sender_email    TEXT NOT NULL,
    kind            TEXT NOT NULL,            -- 'new_post' | 'like' | 'subscription_request'
    related_id      TEXT,
    message         TEXT NOT NULL,
    is_read         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

-- A fan liking, unliking and liking again notifies the creator once.
CREATE UNIQUE INDEX IF NOT EXISTS notifications_like_once
    ON notifications(recipient_email, sender_email, kind, related_id)
    WHERE kind = 'like';

CREATE INDEX IF NOT EXISTS posts_creator_idx         ON posts(creator_email, created_at);
CREATE INDEX IF NOT EXISTS posts_created_idx         ON posts(created_at);
CREATE INDEX IF NOT EXISTS subscriptions_creator_idx ON subscriptions(creator_email, status);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx
    ON notifications(recipient_email, created_at);

PRAGMA user_version = 1;
";
