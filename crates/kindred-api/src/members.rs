//! Handlers for `/persons/{id}/members`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/persons/{id}/members` | Body: `{"relationship":"son","person":{...}}` |
//! | `DELETE` | `/persons/{id}/members/{target}` | 404 unless `{id}` is related to `{target}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kindred_core::{kind::RelationshipKind, person::NewPerson, store::FamilyStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AddBody {
  /// What the new member is to `{id}`, e.g. `"adoptive_mother"`.
  pub relationship: String,
  pub person:       NewPerson,
}

/// `POST /persons/{id}/members`
pub async fn add<S: FamilyStore>(
  State(store): State<Arc<S>>,
  Path(inviter_id): Path<Uuid>,
  Json(body): Json<AddBody>,
) -> Result<impl IntoResponse, ApiError> {
  let kind = RelationshipKind::parse(&body.relationship)?;
  let person = store
    .add_member(inviter_id, kind, body.person)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `DELETE /persons/{id}/members/{target}`
pub async fn remove<S: FamilyStore>(
  State(store): State<Arc<S>>,
  Path((requester_id, target_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
  store
    .remove_member(target_id, requester_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
