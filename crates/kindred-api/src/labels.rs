//! `GET /labels`: resolve a kinship name without touching any person.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use kindred_core::{
  store::FamilyStore,
  taxonomy::{KinKey, LabelGender, Lineage, Subcategory},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LabelParams {
  pub level:       i32,
  pub gender:      LabelGender,
  #[serde(default)]
  pub subcategory: Subcategory,
  #[serde(default)]
  pub lineage:     Lineage,
}

#[derive(Debug, Serialize)]
pub struct Label {
  pub level: i32,
  pub label: String,
}

/// `GET /labels?level=4&gender=male[&subcategory=step][&lineage=collateral]`
pub async fn resolve<S: FamilyStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<LabelParams>,
) -> Result<Json<Label>, ApiError> {
  let label = store.taxonomy().resolve(KinKey {
    level:       params.level,
    gender:      params.gender,
    subcategory: params.subcategory,
    lineage:     params.lineage,
  });
  Ok(Json(Label { level: params.level, label }))
}
