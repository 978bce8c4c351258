//! [`KinGraph`] over a borrowed SQLite connection.

use kindred_core::{extended::KinGraph, fact::DirectType, person::Person};
use rusqlite::Connection;
use uuid::Uuid;

use crate::{Error, Result, query};

/// Primitive parent-of edges come from the `persons` parent references;
/// married-to edges from `direct_relationships`.
pub struct ConnGraph<'c>(pub &'c Connection);

impl KinGraph for ConnGraph<'_> {
  type Error = Error;

  fn person(&self, id: Uuid) -> Result<Option<Person>> { query::get_person(self.0, id) }

  fn children(&self, id: Uuid) -> Result<Vec<Person>> { query::children_of(self.0, id) }

  fn spouses(&self, id: Uuid) -> Result<Vec<(Person, DirectType)>> {
    Ok(
      query::direct_relatives(self.0, id)?
        .into_iter()
        .map(|r| (r.person, r.fact.relationship))
        .collect(),
    )
  }
}
