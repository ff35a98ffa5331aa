//! Users, the identity records behind fans and creators.
//!
//! Credentials are not part of this model; verifying who is making a request
//! happens outside the platform core.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which side of the platform a user is on. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Creator,
  Fan,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Creator => "creator",
      Role::Fan => "fan",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "creator" => Ok(Role::Creator),
      "fan" => Ok(Role::Fan),
      other => Err(Error::UnknownDiscriminant { kind: "role", value: other.to_owned() }),
    }
  }
}

/// A user's public profile, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub email:             String,
  pub full_name:         String,
  #[serde(rename = "userType")]
  pub role:              Role,
  pub bio:               Option<String>,
  pub profile_image:     Option<String>,
  /// Monthly price in the platform currency. Only meaningful for creators.
  pub subscription_rate: f64,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input for creating a user profile.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:     String,
  pub full_name: String,
  pub role:      Role,
}

/// A partial profile edit. `None` leaves the stored value untouched.
///
/// `bio` and `profile_image` are nullable columns: `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
  pub full_name:         Option<String>,
  pub bio:               Option<Option<String>>,
  pub profile_image:     Option<Option<String>>,
  pub subscription_rate: Option<f64>,
}

impl ProfileUpdate {
  /// Reject rates that are negative, NaN or infinite, and drop an empty name.
  pub fn validated(mut self) -> Result<Self> {
    if let Some(rate) = self.subscription_rate
      && (!rate.is_finite() || rate < 0.0)
    {
      return Err(Error::InvalidSubscriptionRate(rate));
    }
    if self.full_name.as_deref().is_some_and(str::is_empty) {
      self.full_name = None;
    }
    Ok(self)
  }
}
