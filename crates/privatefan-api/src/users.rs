//! Handlers for profiles and creator discovery.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: `{"email","fullName","userType"}`; 409 on a taken email |
//! | `GET`  | `/profile?email=` | 404 if not found |
//! | `PUT`  | `/profile` | Partial update; absent fields are left alone, `null` clears `bio`/`profileImage` |
//! | `GET`  | `/creators?email=` | One creator |
//! | `GET`  | `/creators[?search=]` | Name search over creators |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use privatefan_core::{
  store::PlatformStore,
  user::{NewUser, ProfileUpdate, Role},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  ApiState,
  error::ApiError,
  extract::{JsonBody, QueryParams, nullable, present, required},
};

/// Most creators a search returns.
pub const CREATOR_LIMIT: usize = 20;

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub email:     Option<String>,
  pub full_name: Option<String>,
  pub user_type: Option<String>,
}

/// `POST /users`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let email = required(&body.email, "email")?;
  let full_name = required(&body.full_name, "fullName")?;
  let role: Role = required(&body.user_type, "userType")?
    .parse()
    .map_err(|_| ApiError::BadRequest("Invalid user type".into()))?;

  let user = state
    .store
    .create_user(NewUser { email: email.to_owned(), full_name: full_name.to_owned(), role })
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::Conflict {
      message: "User already exists with this email".into(),
      status:  None,
    })?;
  tracing::info!(%email, %role, "user created");

  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "User created successfully", "user": user })),
  ))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProfileParams {
  pub email: Option<String>,
}

/// `GET /profile?email=`
pub async fn profile<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<ProfileParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let email = required(&params.email, "email")?;
  let user = state
    .store
    .get_user(email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

  Ok(Json(json!({ "user": user })))
}

/// A subscription rate as sent by a form: a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RateInput {
  Number(f64),
  Text(String),
}

impl RateInput {
  /// A blank string means no change. Unparsable text becomes NaN so that
  /// validation rejects it.
  pub fn value(&self) -> Option<f64> {
    match self {
      RateInput::Number(n) => Some(*n),
      RateInput::Text(t) if t.trim().is_empty() => None,
      RateInput::Text(t) => Some(t.trim().parse().unwrap_or(f64::NAN)),
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  pub email:             Option<String>,
  pub full_name:         Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub bio:               Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub profile_image:     Option<Option<String>>,
  pub subscription_rate: Option<RateInput>,
}

/// `PUT /profile`
pub async fn update_profile<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let email = required(&body.email, "email")?;
  let update = ProfileUpdate {
    full_name:         body.full_name.clone(),
    bio:               body.bio.clone(),
    profile_image:     body.profile_image.clone(),
    subscription_rate: body.subscription_rate.as_ref().and_then(RateInput::value),
  }
  .validated()?;

  let user = state
    .store
    .update_profile(email, update)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

  Ok(Json(json!({ "message": "Profile updated successfully", "user": user })))
}

// ─── Creators ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreatorParams {
  pub email:  Option<String>,
  pub search: Option<String>,
}

/// `GET /creators?email=` or `GET /creators[?search=]`
pub async fn creators<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<CreatorParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  if let Some(email) = present(&params.email) {
    let creator = state
      .store
      .get_user(email)
      .await
      .map_err(ApiError::store)?
      .filter(|u| u.role == Role::Creator)
      .ok_or_else(|| ApiError::NotFound("Creator not found".into()))?;
    return Ok(Json(json!({ "creator": creator })));
  }

  let creators = state
    .store
    .list_creators(present(&params.search), CREATOR_LIMIT)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "creators": creators })))
}
