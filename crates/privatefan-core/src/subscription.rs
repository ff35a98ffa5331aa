//! Subscriptions: the fan-to-creator relationship and its approval workflow.
//!
//! A (fan, creator) pair is in one of three states:
//!
//! ```text
//!            request             approve
//!  absent ───────────▶ pending ───────────▶ approved
//!     ▲                   │                    │
//!     └──── reject/revoke ┘◀────── revoke ─────┘
//! ```
//!
//! `absent` is represented by the lack of a stored record. Nothing ever moves
//! back to `pending` once it has left it; a fresh request after a reject or
//! revoke starts a new record.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, user::User};

/// Stored state of a subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
  Pending,
  Approved,
}

impl SubscriptionStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      SubscriptionStatus::Pending => "pending",
      SubscriptionStatus::Approved => "approved",
    }
  }
}

impl FromStr for SubscriptionStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "pending" => Ok(SubscriptionStatus::Pending),
      "approved" => Ok(SubscriptionStatus::Approved),
      other => Err(Error::UnknownDiscriminant {
        kind:  "subscription status",
        value: other.to_owned(),
      }),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
  pub fan_email:     String,
  pub fan_name:      Option<String>,
  pub creator_email: String,
  pub status:        SubscriptionStatus,
  pub requested_at:  DateTime<Utc>,
  /// Set when, and only when, the request is approved.
  pub approved_at:   Option<DateTime<Utc>>,
}

impl Subscription {
  pub fn is_approved(&self) -> bool { self.status == SubscriptionStatus::Approved }
}

/// Input for a fan's subscription request.
#[derive(Debug, Clone)]
pub struct NewSubscription {
  pub fan_email:     String,
  pub fan_name:      Option<String>,
  pub creator_email: String,
}

/// What happened to a subscription request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
  /// A new pending record was stored.
  Created(Subscription),
  /// The pair already has a pending request; nothing was written.
  AlreadyPending,
  /// The pair already has an approved subscription; nothing was written.
  AlreadySubscribed,
}

/// An administrator's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Approve,
  Reject,
}

impl FromStr for Decision {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "approve" => Ok(Decision::Approve),
      "reject" => Ok(Decision::Reject),
      other => Err(Error::UnknownDiscriminant { kind: "decision", value: other.to_owned() }),
    }
  }
}

// ─── Joined views ────────────────────────────────────────────────────────────

/// A subscription seen from the creator's side, with the fan's profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberEntry {
  #[serde(flatten)]
  pub subscription: Subscription,
  pub fan_details:  Option<User>,
}

/// A subscription seen from the fan's side, with the creator's profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorEntry {
  #[serde(flatten)]
  pub subscription:    Subscription,
  pub creator_details: Option<User>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_approve_and_reject_are_decisions() {
    assert_eq!("approve".parse::<Decision>().unwrap(), Decision::Approve);
    assert_eq!("reject".parse::<Decision>().unwrap(), Decision::Reject);
    assert!("Approve".parse::<Decision>().is_err());
    assert!("revoke".parse::<Decision>().is_err());
  }

  #[test]
  fn subscriber_entry_flattens_the_subscription() {
    let entry = SubscriberEntry {
      subscription: Subscription {
        fan_email:     "f@x.com".into(),
        fan_name:      Some("Fan".into()),
        creator_email: "c@x.com".into(),
        status:        SubscriptionStatus::Pending,
        requested_at:  Utc::now(),
        approved_at:   None,
      },
      fan_details:  None,
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["fanEmail"], "f@x.com");
    assert_eq!(json["status"], "pending");
    assert!(json["approvedAt"].is_null());
    assert!(json["fanDetails"].is_null());
  }
}
