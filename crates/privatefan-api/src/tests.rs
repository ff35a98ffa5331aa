//! Router-level tests against an in-memory SQLite store.

use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version, password_hash::SaltString};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{DateTime, Utc};
use privatefan_store_sqlite::SqliteStore;
use rand_core::OsRng;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AdminCredentials, ApiSettings, ApiState, api_router};

const CREATOR: &str = "cara@x.io";
const FAN: &str = "fred@x.io";
const OTHER_FAN: &str = "olga@x.io";

async fn make_state(retention: usize) -> ApiState<SqliteStore> {
  // Cheap parameters; verification reads them back out of the PHC string.
  let params = Params::new(1024, 1, 1, None).unwrap();
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();

  ApiState {
    store:    Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    admin:    Arc::new(AdminCredentials {
      email:         "admin@x.io".to_string(),
      password_hash: hash,
    }),
    settings: ApiSettings { notification_retention: retention },
  }
}

fn admin_header() -> String { format!("Basic {}", B64.encode("admin@x.io:secret")) }

async fn call(
  state: &ApiState<SqliteStore>,
  method: &str,
  uri: &str,
  admin: bool,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if admin {
    builder = builder.header(header::AUTHORIZATION, admin_header());
  }
  let req = match body {
    Some(b) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = api_router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

async fn signup(state: &ApiState<SqliteStore>, email: &str, name: &str, user_type: &str) {
  let (status, _) = call(
    state,
    "POST",
    "/users",
    false,
    Some(json!({ "email": email, "fullName": name, "userType": user_type })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
}

async fn subscribe(state: &ApiState<SqliteStore>, fan: &str) -> (StatusCode, Value) {
  call(
    state,
    "POST",
    "/subscriptions",
    false,
    Some(json!({ "fanEmail": fan, "fanName": "Fred", "creatorEmail": CREATOR })),
  )
  .await
}

async fn decide(state: &ApiState<SqliteStore>, fan: &str, action: &str) -> (StatusCode, Value) {
  call(
    state,
    "PATCH",
    "/subscriptions",
    true,
    Some(json!({ "fanEmail": fan, "creatorEmail": CREATOR, "action": action })),
  )
  .await
}

async fn status_of(state: &ApiState<SqliteStore>, fan: &str) -> Value {
  let uri = format!("/subscriptions/status?fanEmail={fan}&creatorEmail={CREATOR}");
  let (status, body) = call(state, "GET", &uri, false, None).await;
  assert_eq!(status, StatusCode::OK);
  body["status"].clone()
}

async fn create_post(state: &ApiState<SqliteStore>, title: &str, visibility: &str) -> String {
  let (status, body) = call(
    state,
    "POST",
    "/posts",
    false,
    Some(json!({
      "title": title,
      "imageUrl": format!("https://img.example/{title}.jpg"),
      "creatorEmail": CREATOR,
      "visibility": visibility,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["post"]["postId"].as_str().unwrap().to_owned()
}

fn titles(body: &Value) -> Vec<String> {
  body["posts"]
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["title"].as_str().unwrap().to_owned())
    .collect()
}

async fn notifications(state: &ApiState<SqliteStore>, recipient: &str) -> Vec<Value> {
  let uri = format!("/notifications?recipientEmail={recipient}");
  let (status, body) = call(state, "GET", &uri, false, None).await;
  assert_eq!(status, StatusCode::OK);
  body["notifications"].as_array().unwrap().clone()
}

// ── Subscription workflow ────────────────────────────────────────────────────

#[tokio::test]
async fn subscription_request_approve_and_revoke() {
  let state = make_state(200).await;

  let (status, body) = subscribe(&state, FAN).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body, json!({ "message": "Subscription request sent", "status": "pending" }));
  assert_eq!(status_of(&state, FAN).await, "pending");

  let (status, body) = subscribe(&state, FAN).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body, json!({ "error": "Request already pending", "status": "pending" }));

  let (status, body) = decide(&state, FAN, "approve").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Subscription approved");
  assert_eq!(status_of(&state, FAN).await, "approved");

  let (status, body) = subscribe(&state, FAN).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["status"], "approved");

  let uri = format!("/subscriptions?fanEmail={FAN}&creatorEmail={CREATOR}");
  let (status, body) = call(&state, "DELETE", &uri, false, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Subscription removed");
  assert_eq!(status_of(&state, FAN).await, Value::Null);
}

#[tokio::test]
async fn request_notifies_the_creator() {
  let state = make_state(200).await;
  subscribe(&state, FAN).await;
  subscribe(&state, FAN).await;

  let notes = notifications(&state, CREATOR).await;
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0]["type"], "subscription_request");
  assert_eq!(notes[0]["message"], "Fred requested to subscribe");
  assert_eq!(notes[0]["isRead"], false);
}

#[tokio::test]
async fn reject_removes_the_request() {
  let state = make_state(200).await;
  subscribe(&state, FAN).await;

  let (status, body) = decide(&state, FAN, "reject").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Subscription rejected");
  assert_eq!(status_of(&state, FAN).await, Value::Null);
}

#[tokio::test]
async fn deciding_nothing_pending_is_a_quiet_success() {
  let state = make_state(200).await;
  let (status, _) = decide(&state, FAN, "approve").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(status_of(&state, FAN).await, Value::Null);
}

#[tokio::test]
async fn decide_validates_action_and_session() {
  let state = make_state(200).await;
  subscribe(&state, FAN).await;

  let (status, body) = decide(&state, FAN, "maybe").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Action must be approve or reject");

  let req = Request::builder()
    .method("PATCH")
    .uri("/subscriptions")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(
      json!({ "fanEmail": FAN, "creatorEmail": CREATOR, "action": "approve" }).to_string(),
    ))
    .unwrap();
  let resp = api_router(state.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

  assert_eq!(status_of(&state, FAN).await, "pending");
}

#[tokio::test]
async fn subscription_query_views() {
  let state = make_state(200).await;
  signup(&state, CREATOR, "Cara", "creator").await;
  signup(&state, FAN, "Fred", "fan").await;
  subscribe(&state, FAN).await;
  subscribe(&state, OTHER_FAN).await;
  decide(&state, FAN, "approve").await;

  let uri = format!("/subscriptions?type=requests&creatorEmail={CREATOR}");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  let requests = body["requests"].as_array().unwrap();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0]["fanEmail"], OTHER_FAN);
  assert_eq!(requests[0]["fanDetails"], Value::Null);

  let uri = format!("/subscriptions?type=subscribers&creatorEmail={CREATOR}");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  let subscribers = body["subscribers"].as_array().unwrap();
  assert_eq!(subscribers.len(), 1);
  assert_eq!(subscribers[0]["fanDetails"]["fullName"], "Fred");
  let stamp = |key: &str| -> DateTime<Utc> {
    serde_json::from_value(subscribers[0][key].clone()).unwrap()
  };
  assert!(stamp("approvedAt") >= stamp("requestedAt"));

  let uri = format!("/subscriptions?fanEmail={FAN}&type=my_subscriptions");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(body["subscriptions"][0]["creatorDetails"]["fullName"], "Cara");

  let uri = format!("/subscriptions?fanEmail={FAN}");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(body, json!({ "subscribedCreators": [CREATOR] }));

  let (status, _) = call(&state, "GET", "/subscriptions?type=all", false, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, body) = call(&state, "GET", "/subscriptions?type=all", true, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["subscriptions"].as_array().unwrap().len(), 2);

  let (status, body) = call(&state, "GET", "/subscriptions?type=requests", false, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Invalid parameters");
}

#[tokio::test]
async fn subscribe_requires_both_parties() {
  let state = make_state(200).await;
  let (status, body) = call(
    &state,
    "POST",
    "/subscriptions",
    false,
    Some(json!({ "fanEmail": FAN, "creatorEmail": "" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "creatorEmail is required");
}

// ── Posts, visibility & likes ────────────────────────────────────────────────

#[tokio::test]
async fn private_posts_need_an_approved_subscription() {
  let state = make_state(200).await;
  create_post(&state, "open", "public").await;
  create_post(&state, "locked", "private").await;
  subscribe(&state, FAN).await;
  subscribe(&state, OTHER_FAN).await;
  decide(&state, FAN, "approve").await;

  let uri = format!("/posts?creatorEmail={CREATOR}&fanEmail={FAN}");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(titles(&body), ["locked", "open"]);
  assert_eq!(body["posts"][0]["isLiked"], false);

  // Still pending.
  let uri = format!("/posts?creatorEmail={CREATOR}&fanEmail={OTHER_FAN}");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(titles(&body), ["open"]);

  let uri = format!("/posts?creatorEmail={CREATOR}");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(titles(&body), ["open"]);
  assert!(body["posts"][0].get("isLiked").is_none());

  let uri = format!("/posts?creatorEmail={CREATOR}&fanEmail={CREATOR}");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(titles(&body).len(), 2);
}

#[tokio::test]
async fn admin_post_listing_needs_a_session() {
  let state = make_state(200).await;
  create_post(&state, "open", "public").await;
  create_post(&state, "locked", "private").await;

  let (status, _) = call(&state, "GET", "/posts?view=admin", false, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, body) = call(&state, "GET", "/posts?view=admin", true, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(titles(&body).len(), 2);

  let (status, _) = call(&state, "GET", "/posts", false, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn creator_name_falls_back_to_profile_then_email() {
  let state = make_state(200).await;
  create_post(&state, "anon", "public").await;
  signup(&state, CREATOR, "Cara", "creator").await;
  create_post(&state, "named", "public").await;

  let uri = format!("/posts?creatorEmail={CREATOR}");
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(body["posts"][0]["creatorName"], "Cara");
  assert_eq!(body["posts"][1]["creatorName"], CREATOR);
}

#[tokio::test]
async fn new_posts_notify_approved_subscribers_only() {
  let state = make_state(200).await;
  signup(&state, CREATOR, "Cara", "creator").await;
  subscribe(&state, FAN).await;
  subscribe(&state, OTHER_FAN).await;
  decide(&state, FAN, "approve").await;

  create_post(&state, "sunset", "public").await;

  let notes = notifications(&state, FAN).await;
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0]["type"], "new_post");
  assert_eq!(notes[0]["message"], "Cara posted a new photo");
  assert!(notifications(&state, OTHER_FAN).await.is_empty());
}

#[tokio::test]
async fn like_toggle_notifies_once() {
  let state = make_state(200).await;
  let post_id = create_post(&state, "sunset", "public").await;
  let like = json!({ "postId": post_id, "fanEmail": FAN });

  let (status, body) = call(&state, "PATCH", "/posts", false, Some(like.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "message": "Success", "likes": 1, "isLiked": true }));

  let (_, body) = call(&state, "PATCH", "/posts", false, Some(like.clone())).await;
  assert_eq!(body["likes"], 0);
  assert_eq!(body["isLiked"], false);

  let (_, body) = call(&state, "PATCH", "/posts", false, Some(like)).await;
  assert_eq!(body["likes"], 1);

  let likes: Vec<_> = notifications(&state, CREATOR)
    .await
    .into_iter()
    .filter(|n| n["type"] == "like")
    .collect();
  assert_eq!(likes.len(), 1);
  assert_eq!(likes[0]["message"], format!("{FAN} liked your post \"sunset\""));
}

#[tokio::test]
async fn like_and_delete_report_missing_posts() {
  let state = make_state(200).await;
  let missing = uuid::Uuid::new_v4();

  let (status, body) = call(
    &state,
    "PATCH",
    "/posts",
    false,
    Some(json!({ "postId": missing, "fanEmail": FAN })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Post not found");

  let (status, _) = call(
    &state,
    "PATCH",
    "/posts",
    false,
    Some(json!({ "postId": "not-a-uuid", "fanEmail": FAN })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = call(&state, "DELETE", &format!("/posts?postId={missing}"), false, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let post_id = create_post(&state, "doomed", "public").await;
  let (status, body) = call(&state, "DELETE", &format!("/posts?postId={post_id}"), false, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Post deleted successfully");
}

#[tokio::test]
async fn feed_follows_approved_subscriptions() {
  let state = make_state(200).await;
  create_post(&state, "first", "public").await;
  create_post(&state, "second", "private").await;

  let uri = format!("/posts/feed?fanEmail={FAN}");
  let (status, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "posts": [] }));

  subscribe(&state, FAN).await;
  decide(&state, FAN, "approve").await;
  let (_, body) = call(&state, "GET", &uri, false, None).await;
  assert_eq!(titles(&body), ["second", "first"]);
}

#[tokio::test]
async fn explore_search_and_sample() {
  let state = make_state(200).await;
  create_post(&state, "Sunset", "public").await;
  create_post(&state, "Mountains", "public").await;
  create_post(&state, "SunsetSecret", "private").await;

  let (_, body) = call(&state, "GET", "/explore?search=sunset", false, None).await;
  assert_eq!(titles(&body), ["Sunset"]);

  let (_, body) = call(&state, "GET", "/explore", false, None).await;
  let mut sample = titles(&body);
  sample.sort();
  assert_eq!(sample, ["Mountains", "Sunset"]);
}

// ── Notifications ────────────────────────────────────────────────────────────

#[tokio::test]
async fn mark_read_flips_one_notification() {
  let state = make_state(200).await;
  subscribe(&state, FAN).await;
  let notes = notifications(&state, CREATOR).await;
  let id = notes[0]["notificationId"].as_str().unwrap().to_owned();

  let (status, body) =
    call(&state, "PATCH", "/notifications", false, Some(json!({ "notificationId": id }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Marked as read");
  assert_eq!(notifications(&state, CREATOR).await[0]["isRead"], true);

  let (status, _) = call(
    &state,
    "PATCH",
    "/notifications",
    false,
    Some(json!({ "notificationId": uuid::Uuid::new_v4() })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_are_capped_per_recipient() {
  let state = make_state(2).await;
  for fan in ["a@x.io", "b@x.io", "c@x.io"] {
    subscribe(&state, fan).await;
  }

  let notes = notifications(&state, CREATOR).await;
  assert_eq!(notes.len(), 2);
  assert_eq!(notes[0]["senderEmail"], "c@x.io");
  assert_eq!(notes[1]["senderEmail"], "b@x.io");

  // `fanEmail` works as an alias.
  let (_, body) = call(&state, "GET", &format!("/notifications?fanEmail={CREATOR}"), false, None).await;
  assert_eq!(body["notifications"].as_array().unwrap().len(), 2);
}

// ── Profiles ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn user_creation_rules() {
  let state = make_state(200).await;
  signup(&state, CREATOR, "Cara", "creator").await;

  let (status, body) = call(
    &state,
    "POST",
    "/users",
    false,
    Some(json!({ "email": CREATOR, "fullName": "Again", "userType": "fan" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"], "User already exists with this email");

  let (status, body) = call(
    &state,
    "POST",
    "/users",
    false,
    Some(json!({ "email": FAN, "fullName": "Fred", "userType": "admin" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Invalid user type");
}

#[tokio::test]
async fn profile_updates_are_partial() {
  let state = make_state(200).await;
  signup(&state, CREATOR, "Cara", "creator").await;

  let (status, body) = call(
    &state,
    "PUT",
    "/profile",
    false,
    Some(json!({ "email": CREATOR, "fullName": "", "bio": "Landscapes", "subscriptionRate": 4.5 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Profile updated successfully");
  assert_eq!(body["user"]["fullName"], "Cara");
  assert_eq!(body["user"]["bio"], "Landscapes");
  assert_eq!(body["user"]["subscriptionRate"], 4.5);

  let (status, _) = call(
    &state,
    "PUT",
    "/profile",
    false,
    Some(json!({ "email": CREATOR, "subscriptionRate": -1.0 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = call(
    &state,
    "PUT",
    "/profile",
    false,
    Some(json!({ "email": CREATOR, "subscriptionRate": "4.99" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["user"]["subscriptionRate"], 4.99);

  let (status, body) = call(
    &state,
    "PUT",
    "/profile",
    false,
    Some(json!({ "email": CREATOR, "subscriptionRate": "cheap" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Subscription rate must be a non-negative number");

  let (status, body) = call(
    &state,
    "PUT",
    "/profile",
    false,
    Some(json!({ "email": CREATOR, "subscriptionRate": "", "bio": null })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["user"]["subscriptionRate"], 4.99);
  assert_eq!(body["user"]["bio"], Value::Null);

  let (status, body) = call(&state, "GET", "/profile?email=nobody@x.io", false, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn blank_post_title_is_rejected() {
  let state = make_state(200).await;
  let (status, body) = call(
    &state,
    "POST",
    "/posts",
    false,
    Some(json!({ "title": "   ", "creatorEmail": CREATOR })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Title is required");
}

#[tokio::test]
async fn profile_image_shows_up_on_existing_posts() {
  let state = make_state(200).await;
  signup(&state, CREATOR, "Cara", "creator").await;
  create_post(&state, "sunset", "public").await;

  call(
    &state,
    "PUT",
    "/profile",
    false,
    Some(json!({ "email": CREATOR, "profileImage": "https://img.example/cara.png" })),
  )
  .await;

  let (_, body) = call(&state, "GET", "/explore", false, None).await;
  assert_eq!(body["posts"][0]["creatorProfileImage"], "https://img.example/cara.png");
}

#[tokio::test]
async fn creator_lookup_and_search() {
  let state = make_state(200).await;
  signup(&state, CREATOR, "Cara Lens", "creator").await;
  signup(&state, FAN, "Fred", "fan").await;

  let (status, body) = call(&state, "GET", &format!("/creators?email={CREATOR}"), false, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["creator"]["userType"], "creator");

  let (status, body) = call(&state, "GET", &format!("/creators?email={FAN}"), false, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Creator not found");

  let (_, body) = call(&state, "GET", "/creators?search=LENS", false, None).await;
  assert_eq!(body["creators"].as_array().unwrap().len(), 1);
  let (_, body) = call(&state, "GET", "/creators?search=fred", false, None).await;
  assert!(body["creators"].as_array().unwrap().is_empty());
}

// ── Admin & malformed input ──────────────────────────────────────────────────

#[tokio::test]
async fn admin_login() {
  let state = make_state(200).await;

  let (status, body) = call(
    &state,
    "POST",
    "/admin/login",
    false,
    Some(json!({ "email": "admin@x.io", "password": "secret" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Admin login successful");
  assert_eq!(body["admin"]["role"], "admin");

  let (status, body) = call(
    &state,
    "POST",
    "/admin/login",
    false,
    Some(json!({ "email": "admin@x.io", "password": "nope" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "Invalid admin credentials");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
  let state = make_state(200).await;
  let req = Request::builder()
    .method("POST")
    .uri("/subscriptions")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = api_router(state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert!(body["error"].is_string());
}
