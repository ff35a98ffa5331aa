//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use privatefan_core::subscription::SubscriptionStatus;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid input: {0}")]
  Invalid(#[from] privatefan_core::Error),

  /// No admin session, or a wrong one.
  #[error("unauthorized")]
  Unauthorized,

  /// The admin login form was filled in wrongly.
  #[error("invalid admin credentials")]
  InvalidCredentials,

  #[error("not found: {0}")]
  NotFound(String),

  /// The request clashes with an existing record. `status` reports the
  /// state of that record when it is a subscription.
  #[error("conflict: {message}")]
  Conflict {
    message: String,
    status:  Option<SubscriptionStatus>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Invalid(e) => (StatusCode::BAD_REQUEST, json!({ "error": client_message(&e) })),
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"privatefan\""),
        );
        return res;
      }
      ApiError::InvalidCredentials => {
        (StatusCode::UNAUTHORIZED, json!({ "error": "Invalid admin credentials" }))
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::Conflict { message, status: None } => {
        (StatusCode::CONFLICT, json!({ "error": message }))
      }
      ApiError::Conflict { message, status: Some(s) } => {
        (StatusCode::CONFLICT, json!({ "error": message, "status": s }))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal server error" }))
      }
    };
    (status, Json(body)).into_response()
  }
}

/// The wording clients see for a rejected input.
fn client_message(error: &privatefan_core::Error) -> String {
  use privatefan_core::Error;
  match error {
    Error::UnknownDiscriminant { kind, .. } => format!("Invalid {kind}"),
    Error::InvalidSubscriptionRate(_) => "Subscription rate must be a non-negative number".into(),
    Error::MissingField(field) => {
      let mut chars = field.chars();
      match chars.next() {
        Some(first) => format!("{}{} is required", first.to_uppercase(), chars.as_str()),
        None => "A required field is missing".into(),
      }
    }
    Error::Serialization(_) => "Invalid request body".into(),
  }
}

#[cfg(test)]
mod tests {
  use privatefan_core::Error;

  use super::*;

  #[test]
  fn core_errors_get_readable_messages() {
    assert_eq!(client_message(&Error::MissingField("title")), "Title is required");
    assert_eq!(client_message(&Error::MissingField("creator email")), "Creator email is required");
    assert_eq!(
      client_message(&Error::InvalidSubscriptionRate(f64::NAN)),
      "Subscription rate must be a non-negative number"
    );
    assert_eq!(
      client_message(&Error::UnknownDiscriminant { kind: "role", value: "x".into() }),
      "Invalid role"
    );
  }
}
