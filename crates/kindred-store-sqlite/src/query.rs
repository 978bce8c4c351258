//! Synchronous queries over a borrowed connection.
//!
//! Everything here runs inside a `tokio_rusqlite` closure, usually on a
//! [`rusqlite::Transaction`] (which derefs to [`Connection`]).

use kindred_core::{
  Error as CoreError,
  fact::{DirectFact, DirectPair, IndirectFact, IndirectPair, Related},
  person::{ParentRefs, Person},
  taxonomy::RelationshipTypeDefinition,
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    DIRECT_WIDTH, INDIRECT_WIDTH, PERSON_COLUMNS, RawDefinition, RawDirect, RawIndirect,
    RawPerson, encode_date, encode_dt, encode_uuid,
  },
};

// ─── Persons ─────────────────────────────────────────────────────────────────

pub fn insert_person(conn: &Connection, p: &Person) -> Result<()> {
  conn.execute(
    "INSERT INTO persons (
       person_id, first_name, middle_name, last_name, email, gender,
       date_of_birth, father_id, mother_id, location, is_deceased, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    params![
      encode_uuid(p.person_id),
      p.first_name,
      p.middle_name,
      p.last_name,
      p.email,
      p.gender.as_ref(),
      p.date_of_birth.map(encode_date),
      p.father_id.map(encode_uuid),
      p.mother_id.map(encode_uuid),
      p.location,
      p.is_deceased,
      encode_dt(p.created_at),
    ],
  )?;
  Ok(())
}

fn person_where(conn: &Connection, clause: &str, value: String) -> Result<Option<Person>> {
  let sql = format!("SELECT {PERSON_COLUMNS} FROM persons p WHERE {clause}");
  let raw = conn
    .query_row(&sql, params![value], |row| RawPerson::read(row, 0))
    .optional()?;
  raw.map(RawPerson::into_person).transpose()
}

fn persons_where(conn: &Connection, clause: &str, value: Option<String>) -> Result<Vec<Person>> {
  let sql = format!(
    "SELECT {PERSON_COLUMNS} FROM persons p {clause}
     ORDER BY p.last_name, p.first_name, p.person_id"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = match value {
    Some(v) => stmt
      .query_map(params![v], |row| RawPerson::read(row, 0))?
      .collect::<rusqlite::Result<Vec<_>>>()?,
    None => stmt
      .query_map([], |row| RawPerson::read(row, 0))?
      .collect::<rusqlite::Result<Vec<_>>>()?,
  };
  raws.into_iter().map(RawPerson::into_person).collect()
}

pub fn get_person(conn: &Connection, id: Uuid) -> Result<Option<Person>> {
  person_where(conn, "p.person_id = ?1", encode_uuid(id))
}

/// Like [`get_person`], but a missing person is an error.
pub fn require_person(conn: &Connection, id: Uuid) -> Result<Person> {
  get_person(conn, id)?.ok_or_else(|| CoreError::PersonNotFound(id).into())
}

/// `email` must already be normalised.
pub fn find_person_by_email(conn: &Connection, email: &str) -> Result<Option<Person>> {
  person_where(conn, "p.email = ?1", email.to_owned())
}

pub fn list_persons(conn: &Connection) -> Result<Vec<Person>> {
  persons_where(conn, "", None)
}

/// Persons whose father or mother reference is `id`.
pub fn children_of(conn: &Connection, id: Uuid) -> Result<Vec<Person>> {
  persons_where(conn, "WHERE p.father_id = ?1 OR p.mother_id = ?1", Some(encode_uuid(id)))
}

pub fn set_parents(conn: &Connection, id: Uuid, refs: ParentRefs) -> Result<()> {
  conn.execute(
    "UPDATE persons SET father_id = ?2, mother_id = ?3 WHERE person_id = ?1",
    params![encode_uuid(id), refs.father_id.map(encode_uuid), refs.mother_id.map(encode_uuid)],
  )?;
  Ok(())
}

pub fn delete_person(conn: &Connection, id: Uuid) -> Result<usize> {
  Ok(conn.execute("DELETE FROM persons WHERE person_id = ?1", params![encode_uuid(id)])?)
}

// ─── Relationship facts ──────────────────────────────────────────────────────

fn insert_direct(conn: &Connection, f: &DirectFact) -> Result<()> {
  conn.execute(
    "INSERT INTO direct_relationships (subject_id, related_id, relationship_type)
     VALUES (?1, ?2, ?3)",
    params![encode_uuid(f.subject_id), encode_uuid(f.related_id), f.relationship.as_ref()],
  )?;
  Ok(())
}

fn insert_indirect(conn: &Connection, f: &IndirectFact) -> Result<()> {
  conn.execute(
    "INSERT INTO indirect_relationships (
       subject_id, related_id, relationship_level, relationship_type, lineage, subcategory
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      encode_uuid(f.subject_id),
      encode_uuid(f.related_id),
      f.level,
      f.relationship,
      f.lineage.as_ref(),
      f.subcategory.as_ref(),
    ],
  )?;
  Ok(())
}

/// Validate and write both rows. Atomic only when `conn` is a transaction.
pub fn insert_direct_pair(conn: &Connection, pair: &DirectPair) -> Result<()> {
  pair.validate()?;
  for row in pair.rows() {
    insert_direct(conn, row)?;
  }
  Ok(())
}

pub fn insert_indirect_pair(conn: &Connection, pair: &IndirectPair) -> Result<()> {
  pair.validate()?;
  for row in pair.rows() {
    insert_indirect(conn, row)?;
  }
  Ok(())
}

pub fn direct_fact(conn: &Connection, subject: Uuid, related: Uuid) -> Result<Option<DirectFact>> {
  let raw = conn
    .query_row(
      "SELECT subject_id, related_id, relationship_type FROM direct_relationships
       WHERE subject_id = ?1 AND related_id = ?2",
      params![encode_uuid(subject), encode_uuid(related)],
      RawDirect::read,
    )
    .optional()?;
  raw.map(RawDirect::into_fact).transpose()
}

pub fn indirect_fact(
  conn: &Connection,
  subject: Uuid,
  related: Uuid,
) -> Result<Option<IndirectFact>> {
  let raw = conn
    .query_row(
      "SELECT subject_id, related_id, relationship_level, relationship_type, lineage, subcategory
       FROM indirect_relationships WHERE subject_id = ?1 AND related_id = ?2",
      params![encode_uuid(subject), encode_uuid(related)],
      RawIndirect::read,
    )
    .optional()?;
  raw.map(RawIndirect::into_fact).transpose()
}

/// Direct facts of `subject`, joined with the person on the related end.
pub fn direct_relatives(conn: &Connection, subject: Uuid) -> Result<Vec<Related<DirectFact>>> {
  let sql = format!(
    "SELECT f.subject_id, f.related_id, f.relationship_type, {PERSON_COLUMNS}
     FROM direct_relationships f
     JOIN persons p ON p.person_id = f.related_id
     WHERE f.subject_id = ?1"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params![encode_uuid(subject)], |row| {
      Ok((RawDirect::read(row)?, RawPerson::read(row, DIRECT_WIDTH)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws
    .into_iter()
    .map(|(fact, person)| Ok(Related { fact: fact.into_fact()?, person: person.into_person()? }))
    .collect()
}

/// Indirect facts of `subject`, joined with the person on the related end.
pub fn indirect_relatives(
  conn: &Connection,
  subject: Uuid,
) -> Result<Vec<Related<IndirectFact>>> {
  let sql = format!(
    "SELECT f.subject_id, f.related_id, f.relationship_level, f.relationship_type,
            f.lineage, f.subcategory, {PERSON_COLUMNS}
     FROM indirect_relationships f
     JOIN persons p ON p.person_id = f.related_id
     WHERE f.subject_id = ?1
     ORDER BY f.relationship_level DESC, p.person_id"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params![encode_uuid(subject)], |row| {
      Ok((RawIndirect::read(row)?, RawPerson::read(row, INDIRECT_WIDTH)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws
    .into_iter()
    .map(|(fact, person)| Ok(Related { fact: fact.into_fact()?, person: person.into_person()? }))
    .collect()
}

/// Whether `subject` holds any fact, direct or indirect, toward `related`.
pub fn is_related(conn: &Connection, subject: Uuid, related: Uuid) -> Result<bool> {
  let found: Option<i64> = conn
    .query_row(
      "SELECT 1 FROM direct_relationships WHERE subject_id = ?1 AND related_id = ?2
       UNION ALL
       SELECT 1 FROM indirect_relationships WHERE subject_id = ?1 AND related_id = ?2
       LIMIT 1",
      params![encode_uuid(subject), encode_uuid(related)],
      |row| row.get(0),
    )
    .optional()?;
  Ok(found.is_some())
}

/// Every fact row with `id` on either side; returns the number deleted.
pub fn delete_facts_involving(conn: &Connection, id: Uuid) -> Result<usize> {
  let id = encode_uuid(id);
  let direct = conn.execute(
    "DELETE FROM direct_relationships WHERE subject_id = ?1 OR related_id = ?1",
    params![id],
  )?;
  let indirect = conn.execute(
    "DELETE FROM indirect_relationships WHERE subject_id = ?1 OR related_id = ?1",
    params![id],
  )?;
  Ok(direct + indirect)
}

// ─── Taxonomy catalog ────────────────────────────────────────────────────────

pub fn count_definitions(conn: &Connection) -> Result<i64> {
  Ok(conn.query_row("SELECT COUNT(*) FROM relationship_types", [], |row| row.get(0))?)
}

pub fn load_definitions(conn: &Connection) -> Result<Vec<RelationshipTypeDefinition>> {
  let mut stmt = conn.prepare(
    "SELECT name, level, gender, category, subcategory, lineage,
            reciprocal_name, is_active, sort_order
     FROM relationship_types ORDER BY sort_order, name",
  )?;
  let raws = stmt
    .query_map([], RawDefinition::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawDefinition::into_definition).collect()
}

/// Replace the whole catalog.
pub fn replace_definitions(conn: &Connection, defs: &[RelationshipTypeDefinition]) -> Result<()> {
  conn.execute("DELETE FROM relationship_types", [])?;
  let mut stmt = conn.prepare(
    "INSERT INTO relationship_types (
       name, level, gender, category, subcategory, lineage,
       reciprocal_name, is_active, sort_order
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
  )?;
  for d in defs {
    stmt.execute(params![
      d.name,
      d.level,
      d.gender.to_string(),
      d.category.as_ref(),
      d.subcategory.as_ref(),
      d.lineage.as_ref(),
      d.reciprocal_name,
      d.is_active,
      d.sort_order,
    ])?;
  }
  Ok(())
}
