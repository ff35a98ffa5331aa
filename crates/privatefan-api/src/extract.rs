//! Extractors whose rejections come back as `{"error": ...}` bodies, plus
//! helpers for the loosely-typed string fields the API accepts.

use axum::extract::{FromRequest, FromRequestParts};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

/// [`axum::Json`] with an [`ApiError`] rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// [`axum::extract::Query`] with an [`ApiError`] rejection.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// The value of an optional string field, treating `""` as absent.
pub fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|v| !v.is_empty())
}

/// Like [`present`], but a missing value is a 400.
pub fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ApiError> {
  present(value).ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

/// For `Option<Option<T>>` body fields with `#[serde(default)]`: an absent
/// key stays `None`, an explicit `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_strings_count_as_missing() {
    assert_eq!(present(&Some("a@x.io".into())), Some("a@x.io"));
    assert_eq!(present(&Some(String::new())), None);
    assert_eq!(present(&None), None);

    let err = required(&Some(String::new()), "fanEmail").unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(m) if m == "fanEmail is required"));
  }

  #[derive(Debug, Deserialize)]
  struct Patch {
    #[serde(default, deserialize_with = "nullable")]
    bio: Option<Option<String>>,
  }

  #[test]
  fn null_differs_from_absent() {
    let absent: Patch = serde_json::from_str("{}").unwrap();
    assert_eq!(absent.bio, None);
    let cleared: Patch = serde_json::from_str(r#"{"bio":null}"#).unwrap();
    assert_eq!(cleared.bio, Some(None));
    let set: Patch = serde_json::from_str(r#"{"bio":"hi"}"#).unwrap();
    assert_eq!(set.bio, Some(Some("hi".to_owned())));
  }
}
