//! Handlers for the subscription workflow.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/subscriptions` | Fan requests; 409 if a record exists |
//! | `PATCH`  | `/subscriptions` | Admin approves or rejects a pending request |
//! | `DELETE` | `/subscriptions?fanEmail=&creatorEmail=` | Revoke, whatever the state |
//! | `GET`    | `/subscriptions?type=…` | Query views, see [`list`] |
//! | `GET`    | `/subscriptions/status?fanEmail=&creatorEmail=` | `pending`, `approved` or `null` |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use privatefan_core::{
  notification::NewNotification,
  store::PlatformStore,
  subscription::{Decision, NewSubscription, RequestOutcome, SubscriptionStatus},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  ApiState,
  auth::{Admin, verify_admin},
  error::ApiError,
  extract::{JsonBody, QueryParams, present, required},
  notify,
};

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
  pub fan_email:     Option<String>,
  pub fan_name:      Option<String>,
  pub creator_email: Option<String>,
}

/// `POST /subscriptions`
pub async fn request<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<RequestBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let fan_email = required(&body.fan_email, "fanEmail")?;
  let creator_email = required(&body.creator_email, "creatorEmail")?;
  let fan_name = present(&body.fan_name);

  let outcome = state
    .store
    .request_subscription(NewSubscription {
      fan_email:     fan_email.to_owned(),
      fan_name:      fan_name.map(str::to_owned),
      creator_email: creator_email.to_owned(),
    })
    .await
    .map_err(ApiError::store)?;

  match outcome {
    RequestOutcome::Created(_) => {
      tracing::info!(fan = %fan_email, creator = %creator_email, "subscription requested");
      notify::emit(&state, vec![NewNotification::subscription_request(
        fan_email,
        fan_name,
        creator_email,
      )])
      .await;
      Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Subscription request sent", "status": SubscriptionStatus::Pending })),
      ))
    }
    RequestOutcome::AlreadyPending => Err(ApiError::Conflict {
      message: "Request already pending".into(),
      status:  Some(SubscriptionStatus::Pending),
    }),
    RequestOutcome::AlreadySubscribed => Err(ApiError::Conflict {
      message: "Already subscribed".into(),
      status:  Some(SubscriptionStatus::Approved),
    }),
  }
}

// ─── Decide ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideBody {
  pub fan_email:     Option<String>,
  pub creator_email: Option<String>,
  pub action:        Option<String>,
}

/// `PATCH /subscriptions`
///
/// Deciding on a pair with no pending request changes nothing and still
/// answers 200.
pub async fn decide<S>(
  _: Admin,
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<DecideBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let fan_email = required(&body.fan_email, "fanEmail")?;
  let creator_email = required(&body.creator_email, "creatorEmail")?;
  let decision: Decision = present(&body.action)
    .and_then(|a| a.parse().ok())
    .ok_or_else(|| ApiError::BadRequest("Action must be approve or reject".into()))?;

  let changed = state
    .store
    .decide_subscription(fan_email, creator_email, decision)
    .await
    .map_err(ApiError::store)?;

  if changed {
    tracing::info!(fan = %fan_email, creator = %creator_email, ?decision, "subscription decided");
  } else {
    tracing::warn!(
      fan = %fan_email,
      creator = %creator_email,
      ?decision,
      "no pending request to decide on"
    );
  }

  let message = match decision {
    Decision::Approve => "Subscription approved",
    Decision::Reject => "Subscription rejected",
  };
  Ok(Json(json!({ "message": message })))
}

// ─── Revoke ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairParams {
  pub fan_email:     Option<String>,
  pub creator_email: Option<String>,
}

/// `DELETE /subscriptions?fanEmail=&creatorEmail=`
pub async fn revoke<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<PairParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let fan_email = required(&params.fan_email, "fanEmail")?;
  let creator_email = required(&params.creator_email, "creatorEmail")?;

  let removed = state
    .store
    .revoke_subscription(fan_email, creator_email)
    .await
    .map_err(ApiError::store)?;
  if removed {
    tracing::info!(fan = %fan_email, creator = %creator_email, "subscription revoked");
  }

  Ok(Json(json!({ "message": "Subscription removed" })))
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// `GET /subscriptions/status?fanEmail=&creatorEmail=`
pub async fn status<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<PairParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let fan_email = required(&params.fan_email, "fanEmail")?;
  let creator_email = required(&params.creator_email, "creatorEmail")?;

  let subscription = state
    .store
    .get_subscription(fan_email, creator_email)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "status": subscription.map(|s| s.status) })))
}

// ─── Query views ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  #[serde(rename = "type")]
  pub view:          Option<String>,
  pub creator_email: Option<String>,
  pub fan_email:     Option<String>,
}

/// `GET /subscriptions`
///
/// Checked in order:
/// 1. `type=requests&creatorEmail=` → `{requests}`
/// 2. `type=subscribers&creatorEmail=` → `{subscribers}`
/// 3. `fanEmail=&type=my_subscriptions` → `{subscriptions}` with creator profiles
/// 4. `fanEmail=` → `{subscribedCreators}`
/// 5. `type=all` (admin) → `{subscriptions}`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let view = present(&params.view);
  let store = &state.store;

  if let Some(creator) = present(&params.creator_email) {
    match view {
      Some("requests") => {
        let requests = store.pending_requests(creator).await.map_err(ApiError::store)?;
        return Ok(Json(json!({ "requests": requests })));
      }
      Some("subscribers") => {
        let subscribers = store.subscribers(creator).await.map_err(ApiError::store)?;
        return Ok(Json(json!({ "subscribers": subscribers })));
      }
      _ => {}
    }
  }

  if let Some(fan) = present(&params.fan_email) {
    if view == Some("my_subscriptions") {
      let subscriptions = store.fan_subscriptions(fan).await.map_err(ApiError::store)?;
      return Ok(Json(json!({ "subscriptions": subscriptions })));
    }
    let creators = store.approved_creators(fan).await.map_err(ApiError::store)?;
    return Ok(Json(json!({ "subscribedCreators": creators })));
  }

  if view == Some("all") {
    verify_admin(&headers, &state.admin)?;
    let subscriptions = store.all_subscriptions().await.map_err(ApiError::store)?;
    return Ok(Json(json!({ "subscriptions": subscriptions })));
  }

  Err(ApiError::BadRequest("Invalid parameters".into()))
}
