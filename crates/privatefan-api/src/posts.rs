//! Handlers for `/posts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/posts?creatorEmail=&fanEmail=` | A creator's posts through the visibility gate |
//! | `GET`    | `/posts?view=admin` | Every post; admin only |
//! | `POST`   | `/posts` | Create; notifies approved subscribers |
//! | `PATCH`  | `/posts` | Body: `{"postId":…,"fanEmail":…}`; toggles a like |
//! | `DELETE` | `/posts?postId=` | 404 if not found |
//! | `GET`    | `/posts/feed?fanEmail=` | Published posts of approved creators |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use privatefan_core::{
  notification::NewNotification,
  post::{NewPost, PostCard, PostStatus, Visibility},
  store::PlatformStore,
  visibility::{Access, visible},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  ApiState,
  auth::verify_admin,
  error::ApiError,
  extract::{JsonBody, QueryParams, present, required},
  notify,
};

/// Most posts a feed returns.
pub const FEED_LIMIT: usize = 50;

fn parse_post_id(raw: &str) -> Result<Uuid, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("invalid post id: {raw}")))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub creator_email: Option<String>,
  pub fan_email:     Option<String>,
  pub view:          Option<String>,
}

/// `GET /posts?creatorEmail=&fanEmail=` or `GET /posts?view=admin`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  if present(&params.view) == Some("admin") {
    verify_admin(&headers, &state.admin)?;
    let posts = state.store.all_posts().await.map_err(ApiError::store)?;
    return Ok(Json(json!({ "posts": posts })));
  }

  let creator = required(&params.creator_email, "creatorEmail")?;
  let viewer = present(&params.fan_email);

  let approved = match viewer {
    Some(fan) if fan != creator => state
      .store
      .get_subscription(fan, creator)
      .await
      .map_err(ApiError::store)?
      .is_some_and(|s| s.is_approved()),
    _ => false,
  };
  let access = Access::resolve(viewer, creator, approved);

  let cards = state.store.creator_posts(creator).await.map_err(ApiError::store)?;
  let posts: Vec<PostCard> = visible(cards, access)
    .into_iter()
    .map(|c| c.for_viewer(viewer))
    .collect();

  Ok(Json(json!({ "posts": posts })))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub title:         Option<String>,
  pub description:   Option<String>,
  pub image_url:     Option<String>,
  pub creator_email: Option<String>,
  pub creator_name:  Option<String>,
  pub status:        Option<PostStatus>,
  pub visibility:    Option<Visibility>,
}

/// `POST /posts`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlatformStore,
{
  let title = required(&body.title, "title")?;
  let creator_email = required(&body.creator_email, "creatorEmail")?;

  // Fall back to the profile name, then the email.
  let creator_name = match present(&body.creator_name) {
    Some(name) => name.to_owned(),
    None => state
      .store
      .get_user(creator_email)
      .await
      .map_err(ApiError::store)?
      .map(|u| u.full_name)
      .unwrap_or_else(|| creator_email.to_owned()),
  };

  let input = NewPost {
    title: title.to_owned(),
    description: body.description.clone().unwrap_or_default(),
    image_url: present(&body.image_url).map(str::to_owned),
    creator_email: creator_email.to_owned(),
    creator_name,
    status: body.status.unwrap_or_default(),
    visibility: body.visibility.unwrap_or_default(),
  };
  input.validate()?;

  let post = state.store.create_post(input).await.map_err(ApiError::store)?;
  tracing::info!(post = %post.post_id, creator = %post.creator_email, "post created");

  // Fan-out failures are logged inside `notify`; the post stands either way.
  match state.store.subscribers(creator_email).await {
    Ok(subscribers) => {
      let notes = subscribers
        .iter()
        .map(|s| NewNotification::new_post(&post, &s.subscription.fan_email))
        .collect();
      notify::emit(&state, notes).await;
    }
    Err(e) => tracing::warn!(error = %e, "failed to load subscribers for fan-out"),
  }

  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Post created successfully", "post": post })),
  ))
}

// ─── Like toggle ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeBody {
  pub post_id:   Option<String>,
  pub fan_email: Option<String>,
}

/// `PATCH /posts`: toggles `fanEmail`'s like on `postId`.
pub async fn toggle_like<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<LikeBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let post_id = parse_post_id(required(&body.post_id, "postId")?)?;
  let fan_email = required(&body.fan_email, "fanEmail")?;

  let toggle = state
    .store
    .toggle_like(post_id, fan_email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

  if toggle.is_liked {
    match state.store.get_post(post_id).await {
      Ok(Some(post)) => notify::emit_once(&state, NewNotification::like(&post, fan_email)).await,
      Ok(None) => {}
      Err(e) => tracing::warn!(error = %e, "failed to load post for like notification"),
    }
  }

  Ok(Json(json!({
    "message": "Success",
    "likes": toggle.likes,
    "isLiked": toggle.is_liked,
  })))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
  pub post_id: Option<String>,
}

/// `DELETE /posts?postId=`
pub async fn delete<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<DeleteParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let post_id = parse_post_id(required(&params.post_id, "postId")?)?;

  let deleted = state.store.delete_post(post_id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound("Post not found".into()));
  }
  tracing::info!(post = %post_id, "post deleted");

  Ok(Json(json!({ "message": "Post deleted successfully" })))
}

// ─── Feed ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
  pub fan_email: Option<String>,
}

/// `GET /posts/feed?fanEmail=`
///
/// A fan with no approved subscriptions gets an empty list. Without
/// `fanEmail` every published post is eligible.
pub async fn feed<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<FeedParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let fan = present(&params.fan_email);
  let posts: Vec<PostCard> = state
    .store
    .feed_posts(fan, FEED_LIMIT)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|c| c.for_viewer(fan))
    .collect();

  Ok(Json(json!({ "posts": posts })))
}
