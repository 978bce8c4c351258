//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, dates are `YYYY-MM-DD`, UUIDs are
//! hyphenated lowercase strings and enums use their lowercase names.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use kindred_core::{
  fact::{DirectFact, IndirectFact},
  person::Person,
  taxonomy::RelationshipTypeDefinition,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

/// Parse one of the lowercase enum columns.
fn decode_enum<T: FromStr>(column: &'static str, value: String) -> Result<T> {
  value.parse().map_err(|_| Error::Decode { column, value })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Person columns, in the order [`RawPerson::read`] expects, for a `persons`
/// table aliased as `p`.
pub const PERSON_COLUMNS: &str = "p.person_id, p.first_name, p.middle_name, \
  p.last_name, p.email, p.gender, p.date_of_birth, p.father_id, p.mother_id, \
  p.location, p.is_deceased, p.created_at";

const PERSON_WIDTH: usize = 12;

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub person_id:     String,
  pub first_name:    String,
  pub middle_name:   Option<String>,
  pub last_name:     String,
  pub email:         Option<String>,
  pub gender:        String,
  pub date_of_birth: Option<String>,
  pub father_id:     Option<String>,
  pub mother_id:     Option<String>,
  pub location:      Option<String>,
  pub is_deceased:   bool,
  pub created_at:    String,
}

impl RawPerson {
  /// Read [`PERSON_COLUMNS`] starting at column `at`.
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:     row.get(at)?,
      first_name:    row.get(at + 1)?,
      middle_name:   row.get(at + 2)?,
      last_name:     row.get(at + 3)?,
      email:         row.get(at + 4)?,
      gender:        row.get(at + 5)?,
      date_of_birth: row.get(at + 6)?,
      father_id:     row.get(at + 7)?,
      mother_id:     row.get(at + 8)?,
      location:      row.get(at + 9)?,
      is_deceased:   row.get(at + 10)?,
      created_at:    row.get(at + PERSON_WIDTH - 1)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:     decode_uuid(&self.person_id)?,
      first_name:    self.first_name,
      middle_name:   self.middle_name,
      last_name:     self.last_name,
      email:         self.email,
      gender:        decode_enum("gender", self.gender)?,
      date_of_birth: self.date_of_birth.as_deref().map(decode_date).transpose()?,
      father_id:     decode_opt_uuid(self.father_id)?,
      mother_id:     decode_opt_uuid(self.mother_id)?,
      location:      self.location,
      is_deceased:   self.is_deceased,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values from a `direct_relationships` row.
pub struct RawDirect {
  pub subject_id:   String,
  pub related_id:   String,
  pub relationship: String,
}

impl RawDirect {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { subject_id: row.get(0)?, related_id: row.get(1)?, relationship: row.get(2)? })
  }

  pub fn into_fact(self) -> Result<DirectFact> {
    Ok(DirectFact {
      subject_id:   decode_uuid(&self.subject_id)?,
      related_id:   decode_uuid(&self.related_id)?,
      relationship: decode_enum("relationship_type", self.relationship)?,
    })
  }
}

/// Width of the fact columns preceding any joined person columns.
pub const DIRECT_WIDTH: usize = 3;
pub const INDIRECT_WIDTH: usize = 6;

/// Raw values from an `indirect_relationships` row.
pub struct RawIndirect {
  pub subject_id:   String,
  pub related_id:   String,
  pub level:        i32,
  pub relationship: String,
  pub lineage:      String,
  pub subcategory:  String,
}

impl RawIndirect {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:   row.get(0)?,
      related_id:   row.get(1)?,
      level:        row.get(2)?,
      relationship: row.get(3)?,
      lineage:      row.get(4)?,
      subcategory:  row.get(5)?,
    })
  }

  pub fn into_fact(self) -> Result<IndirectFact> {
    Ok(IndirectFact {
      subject_id:   decode_uuid(&self.subject_id)?,
      related_id:   decode_uuid(&self.related_id)?,
      level:        self.level,
      relationship: self.relationship,
      lineage:      decode_enum("lineage", self.lineage)?,
      subcategory:  decode_enum("subcategory", self.subcategory)?,
    })
  }
}

/// Raw values from a `relationship_types` row.
pub struct RawDefinition {
  pub name:            String,
  pub level:           i32,
  pub gender:          String,
  pub category:        String,
  pub subcategory:     String,
  pub lineage:         String,
  pub reciprocal_name: String,
  pub is_active:       bool,
  pub sort_order:      i32,
}

impl RawDefinition {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      name:            row.get(0)?,
      level:           row.get(1)?,
      gender:          row.get(2)?,
      category:        row.get(3)?,
      subcategory:     row.get(4)?,
      lineage:         row.get(5)?,
      reciprocal_name: row.get(6)?,
      is_active:       row.get(7)?,
      sort_order:      row.get(8)?,
    })
  }

  pub fn into_definition(self) -> Result<RelationshipTypeDefinition> {
    Ok(RelationshipTypeDefinition {
      name:            self.name,
      level:           self.level,
      gender:          decode_enum("gender", self.gender)?,
      category:        decode_enum("category", self.category)?,
      subcategory:     decode_enum("subcategory", self.subcategory)?,
      lineage:         decode_enum("lineage", self.lineage)?,
      reciprocal_name: self.reciprocal_name,
      is_active:       self.is_active,
      sort_order:      self.sort_order,
    })
  }
}
