//! Handlers for `/persons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons` | Every person, ordered by name |
//! | `POST` | `/persons` | Body: a `NewPerson`; 409 on a taken email |
//! | `GET`  | `/persons/{id}` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use kindred_core::{
  person::{NewPerson, Person},
  store::FamilyStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /persons`
pub async fn list<S: FamilyStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Person>>, ApiError> {
  let persons = store.list_persons().await.map_err(ApiError::from_store)?;
  Ok(Json(persons))
}

/// `POST /persons`
pub async fn create<S: FamilyStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  let person = store.add_person(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /persons/{id}`
pub async fn get_one<S: FamilyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError> {
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}
