//! The admin session: HTTP Basic credentials checked against an argon2 hash.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin/login` | Body: `{"email":…,"password":…}` |

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use privatefan_core::store::PlatformStore;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  ApiState,
  error::ApiError,
  extract::{JsonBody, present},
};

/// The one administrator this instance accepts.
#[derive(Clone)]
pub struct AdminCredentials {
  pub email:         String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AdminCredentials {
  pub fn check(&self, email: &str, password: &str) -> bool {
    if email != self.email {
      return false;
    }
    let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
      tracing::error!("admin password hash is not a valid PHC string");
      return false;
    };
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  }
}

/// Marker: present in a handler means the request carried a valid admin
/// session.
pub struct Admin;

/// Verify the admin session directly from headers, for handlers where only
/// some requests need it.
pub fn verify_admin(headers: &HeaderMap, admin: &AdminCredentials) -> Result<Admin, ApiError> {
  let encoded = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;
  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  if !admin.check(email, password) {
    return Err(ApiError::Unauthorized);
  }
  Ok(Admin)
}

impl<S> FromRequestParts<ApiState<S>> for Admin
where
  S: PlatformStore,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_admin(&parts.headers, &state.admin)
  }
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `POST /admin/login`
pub async fn login<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let (Some(email), Some(password)) = (present(&body.email), present(&body.password)) else {
    return Err(ApiError::BadRequest("Email and password are required".into()));
  };

  if !state.admin.check(email, password) {
    tracing::warn!(%email, "rejected admin login");
    return Err(ApiError::InvalidCredentials);
  }

  Ok(Json(json!({
    "message": "Admin login successful",
    "admin": { "email": state.admin.email, "role": "admin", "name": "Admin" },
  })))
}
