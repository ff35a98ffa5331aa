//! Handlers for `/notifications` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/notifications?recipientEmail=` | Newest first; `fanEmail` is accepted as an alias |
//! | `PATCH` | `/notifications` | Body: `{"notificationId":…}`; marks it read |

use axum::{Json, extract::State};
use privatefan_core::store::PlatformStore;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{JsonBody, QueryParams, present, required},
};

/// Most notifications a listing returns.
pub const LIST_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub recipient_email: Option<String>,
  pub fan_email:       Option<String>,
}

/// `GET /notifications?recipientEmail=`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let recipient = present(&params.recipient_email)
    .or(present(&params.fan_email))
    .ok_or_else(|| ApiError::BadRequest("recipientEmail is required".into()))?;

  let notifications = state
    .store
    .notifications_for(recipient, LIST_LIMIT)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "notifications": notifications })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadBody {
  pub notification_id: Option<String>,
}

/// `PATCH /notifications`
pub async fn mark_read<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<MarkReadBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let raw = required(&body.notification_id, "notificationId")?;
  let id: Uuid = raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("invalid notification id: {raw}")))?;

  if !state.store.mark_read(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound("Notification not found".into()));
  }

  Ok(Json(json!({ "message": "Marked as read" })))
}
