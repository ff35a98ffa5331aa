//! Handler for `GET /explore`: public post discovery.
//!
//! Only public, published posts with an image are surfaced. With `search`
//! the newest matches come back; without it, a random sample.

use axum::{Json, extract::State};
use privatefan_core::{
  post::{ExploreQuery, PostCard},
  store::PlatformStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
  ApiState,
  error::ApiError,
  extract::{QueryParams, present},
};

pub const SEARCH_LIMIT: usize = 50;
pub const SAMPLE_SIZE: usize = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreParams {
  pub search:    Option<String>,
  pub fan_email: Option<String>,
}

/// `GET /explore?search=&fanEmail=`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  QueryParams(params): QueryParams<ExploreParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PlatformStore,
{
  let search = present(&params.search).map(str::to_owned);
  let limit = if search.is_some() { SEARCH_LIMIT } else { SAMPLE_SIZE };
  let viewer = present(&params.fan_email);

  let posts: Vec<PostCard> = state
    .store
    .explore_posts(&ExploreQuery { search, limit })
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|c| c.for_viewer(viewer))
    .collect();

  Ok(Json(json!({ "posts": posts })))
}
