//! Relationship facts: the stored, directed rows that connect two persons.
//!
//! Every fact exists as a reciprocal pair: one row per direction, written and
//! removed together. Direct facts record marriage/partnership; indirect facts
//! record leveled kinship derived at write time.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  person::{Gender, Person},
  taxonomy::{Lineage, Subcategory},
};

// ─── Direct ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DirectType {
  Husband,
  Wife,
  Partner,
}

impl DirectType {
  /// The spouse term for a person of `gender`.
  pub fn for_gender(gender: Gender) -> Self {
    match gender {
      Gender::Male => Self::Husband,
      Gender::Female => Self::Wife,
      Gender::Other => Self::Partner,
    }
  }

  /// The type of the reverse row, where the other party has `gender`.
  /// Partnership stays a partnership in both directions.
  pub fn reciprocal(self, gender: Gender) -> Self {
    match self {
      Self::Partner => Self::Partner,
      Self::Husband | Self::Wife => Self::for_gender(gender),
    }
  }
}

/// `related_id` is `subject_id`'s `relationship`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectFact {
  pub subject_id:   Uuid,
  pub related_id:   Uuid,
  pub relationship: DirectType,
}

/// Both rows of a marriage/partnership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectPair {
  pub forward: DirectFact,
  pub reverse: DirectFact,
}

impl DirectPair {
  /// `b` is `a`'s `type_for_a`; `a` is `b`'s `type_for_b`.
  pub fn new(a: Uuid, b: Uuid, type_for_a: DirectType, type_for_b: DirectType) -> Self {
    Self {
      forward: DirectFact { subject_id: a, related_id: b, relationship: type_for_a },
      reverse: DirectFact { subject_id: b, related_id: a, relationship: type_for_b },
    }
  }

  pub fn validate(&self) -> Result<()> {
    let (f, r) = (&self.forward, &self.reverse);
    if f.subject_id == f.related_id {
      return Err(Error::Validation("a person cannot be related to themselves".into()));
    }
    if f.subject_id != r.related_id || f.related_id != r.subject_id {
      return Err(Error::Validation("direct pair rows must mirror each other".into()));
    }
    Ok(())
  }

  pub fn rows(&self) -> [&DirectFact; 2] { [&self.forward, &self.reverse] }
}

// ─── Indirect ────────────────────────────────────────────────────────────────

/// `related_id` stands `level` generations from `subject_id` (positive =
/// ancestor) and is `subject_id`'s `relationship`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndirectFact {
  pub subject_id:   Uuid,
  pub related_id:   Uuid,
  pub level:        i32,
  pub relationship: String,
  #[serde(default)]
  pub lineage:      Lineage,
  #[serde(default)]
  pub subcategory:  Subcategory,
}

/// Both rows of a leveled kinship; levels are negated across the pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectPair {
  pub forward: IndirectFact,
  pub reverse: IndirectFact,
}

impl IndirectPair {
  /// `b` is `level` generations from `a` and is `a`'s `type_for_a`;
  /// `a` is `b`'s `type_for_b` at `-level`.
  pub fn new(
    a: Uuid,
    b: Uuid,
    level: i32,
    type_for_a: String,
    type_for_b: String,
    lineage: Lineage,
    subcategory: Subcategory,
  ) -> Self {
    Self {
      forward: IndirectFact {
        subject_id: a,
        related_id: b,
        level,
        relationship: type_for_a,
        lineage,
        subcategory,
      },
      reverse: IndirectFact {
        subject_id: b,
        related_id: a,
        level: -level,
        relationship: type_for_b,
        lineage,
        subcategory,
      },
    }
  }

  pub fn validate(&self) -> Result<()> {
    let (f, r) = (&self.forward, &self.reverse);
    if f.subject_id == f.related_id {
      return Err(Error::Validation("a person cannot be related to themselves".into()));
    }
    if f.subject_id != r.related_id || f.related_id != r.subject_id {
      return Err(Error::Validation("indirect pair rows must mirror each other".into()));
    }
    if f.level.checked_neg() != Some(r.level) {
      return Err(Error::Validation(format!(
        "reciprocal levels must negate each other, got {} and {}",
        f.level, r.level
      )));
    }
    if f.lineage != r.lineage || f.subcategory != r.subcategory {
      return Err(Error::Validation("pair rows must share lineage and subcategory".into()));
    }
    if f.relationship.is_empty() || r.relationship.is_empty() {
      return Err(Error::Validation("relationship type must not be empty".into()));
    }
    Ok(())
  }

  pub fn rows(&self) -> [&IndirectFact; 2] { [&self.forward, &self.reverse] }
}

// ─── Related ─────────────────────────────────────────────────────────────────

/// A fact joined with the person on its `related_id` end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Related<F> {
  pub fact:   F,
  pub person: Person,
}
