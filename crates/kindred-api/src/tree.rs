//! Read-model handlers: the leveled tree, the extended tree and its graph
//! projection.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kindred_core::{
  extended::ExtendedTree, projector::GraphView, store::FamilyStore, tree::FamilyTree,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /persons/{id}/tree`
pub async fn tree<S: FamilyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<FamilyTree>, ApiError> {
  Ok(Json(store.get_tree(id).await.map_err(ApiError::from_store)?))
}

/// `GET /persons/{id}/tree/extended`
pub async fn extended<S: FamilyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ExtendedTree>, ApiError> {
  Ok(Json(store.extended_tree(id).await.map_err(ApiError::from_store)?))
}

/// `GET /persons/{id}/graph`
pub async fn graph<S: FamilyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GraphView>, ApiError> {
  Ok(Json(store.graph(id).await.map_err(ApiError::from_store)?))
}
