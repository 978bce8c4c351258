//! The write half of the membership mutator. Callers run these on an open
//! transaction and commit only on `Ok`.

use kindred_core::{
  Error as CoreError,
  kind::RelationshipKind,
  mutator::{MemberPlan, plan_member},
  person::NewPerson,
  taxonomy::Taxonomy,
};
use rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use crate::{Result, query};

/// Reject a duplicate email or a dangling parent reference before anything
/// is written.
pub fn check_new_person(conn: &Connection, attributes: &NewPerson) -> Result<()> {
  attributes.validate()?;
  if let Some(email) = attributes.normalized_email()
    && query::find_person_by_email(conn, &email)?.is_some()
  {
    return Err(CoreError::EmailInUse(email).into());
  }
  for parent_id in attributes.parents().ids() {
    query::require_person(conn, parent_id)?;
  }
  Ok(())
}

/// Create the new member and every derived fact. Returns the applied plan.
pub fn add_member(
  conn: &Connection,
  taxonomy: &Taxonomy,
  inviter_id: Uuid,
  kind: RelationshipKind,
  attributes: NewPerson,
) -> Result<MemberPlan> {
  let inviter = query::require_person(conn, inviter_id)?;
  check_new_person(conn, &attributes)?;

  let relatives = query::indirect_relatives(conn, inviter_id)?;
  let plan = plan_member(taxonomy, &inviter, kind, attributes, &relatives)?;

  query::insert_person(conn, &plan.person)?;
  if let Some(refs) = plan.inviter_parents {
    query::set_parents(conn, inviter_id, refs)?;
  }
  for (sibling_id, refs) in &plan.sibling_parents {
    query::set_parents(conn, *sibling_id, *refs)?;
  }
  if let Some(pair) = &plan.direct {
    query::insert_direct_pair(conn, pair)?;
  }

  let mut written = 0usize;
  for pair in &plan.indirect {
    let (f, r) = (&pair.forward, &pair.reverse);
    if query::indirect_fact(conn, f.subject_id, f.related_id)?.is_some()
      || query::indirect_fact(conn, r.subject_id, r.related_id)?.is_some()
    {
      debug!(subject = %f.subject_id, related = %f.related_id, "pair exists, skipping");
      continue;
    }
    query::insert_indirect_pair(conn, pair)?;
    written += 1;
  }
  debug!(
    member = %plan.person.person_id,
    pairs = written,
    propagated = written.saturating_sub(1),
    "wrote indirect pairs"
  );

  Ok(plan)
}

/// Delete `target_id` and all of its facts; returns the fact rows removed.
pub fn remove_member(conn: &Connection, target_id: Uuid, requester_id: Uuid) -> Result<usize> {
  if !query::is_related(conn, requester_id, target_id)? {
    return Err(CoreError::NotRelated { target: target_id, requester: requester_id }.into());
  }
  let removed = query::delete_facts_involving(conn, target_id)?;
  query::delete_person(conn, target_id)?;
  Ok(removed)
}
