//! Planning for membership changes.
//!
//! The store gathers the inviter and the inviter's existing indirect facts
//! inside its transaction, hands them to [`plan_member`], and writes the
//! resulting [`MemberPlan`] before committing. Nothing here touches storage.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
  Error, Result,
  fact::{DirectPair, IndirectFact, IndirectPair, Related},
  kind::{Addition, RelationshipKind},
  person::{Gender, NewPerson, ParentRefs, Person},
  taxonomy::{KinKey, Lineage, Subcategory, Taxonomy},
};

/// Every write needed to add one member.
#[derive(Debug, Clone)]
pub struct MemberPlan {
  /// The new person, with parent references already wired.
  pub person:          Person,
  /// New parent references for the inviter, when adding a parent.
  pub inviter_parents: Option<ParentRefs>,
  /// Full siblings of the inviter whose empty slot the new parent fills.
  pub sibling_parents: Vec<(Uuid, ParentRefs)>,
  pub direct:          Option<DirectPair>,
  /// The inviter pair first, then one pair per propagated relative.
  pub indirect:        Vec<IndirectPair>,
}

/// Compute the writes for adding `attributes` as the inviter's `kind`.
///
/// `relatives` are the inviter's indirect facts joined with the related
/// person. The caller has already checked email uniqueness and that any
/// referenced parent ids exist.
pub fn plan_member(
  taxonomy: &Taxonomy,
  inviter: &Person,
  kind: RelationshipKind,
  attributes: NewPerson,
  relatives: &[Related<IndirectFact>],
) -> Result<MemberPlan> {
  attributes.validate()?;
  let gender = kind.resolve_gender(attributes.gender)?;
  let mut person = attributes.into_person(gender);

  let (level, subcategory) = match kind.spec().addition {
    Addition::Direct(relationship) => {
      let direct = DirectPair::new(
        inviter.person_id,
        person.person_id,
        relationship,
        relationship.reciprocal(inviter.gender),
      );
      return Ok(MemberPlan {
        person,
        inviter_parents: None,
        sibling_parents: Vec::new(),
        direct: Some(direct),
        indirect: Vec::new(),
      });
    }
    Addition::Indirect { level, subcategory } => (level, subcategory),
  };

  let inviter_parents = wire_parents(inviter, &mut person, level, subcategory)?;
  let sibling_parents = match inviter_parents {
    Some(_) => wire_siblings(&person, relatives),
    None => Vec::new(),
  };

  let mut indirect = vec![IndirectPair::new(
    inviter.person_id,
    person.person_id,
    level,
    taxonomy.resolve(KinKey::lineal(level, person.gender).with_subcategory(subcategory)),
    taxonomy.resolve(KinKey::lineal(-level, inviter.gender).with_subcategory(subcategory)),
    Lineage::Lineal,
    subcategory,
  )];

  let mut seen = HashSet::from([inviter.person_id, person.person_id]);
  for relative in relatives {
    let existing = &relative.fact;
    if !seen.insert(existing.related_id) {
      continue;
    }
    let Some(combined) = combine(subcategory, existing.subcategory) else {
      continue;
    };
    let Some((new_level, lineage)) =
      propagate(level, subcategory, existing.level, existing.lineage, existing.subcategory)
    else {
      continue;
    };
    let key = KinKey {
      level: new_level,
      gender: relative.person.gender.into(),
      subcategory: combined,
      lineage,
    };
    indirect.push(IndirectPair::new(
      person.person_id,
      existing.related_id,
      new_level,
      taxonomy.resolve(key),
      taxonomy.resolve(key.reversed(person.gender)),
      lineage,
      combined,
    ));
  }

  Ok(MemberPlan { person, inviter_parents, sibling_parents, direct: None, indirect })
}

/// The new parent also fills the matching empty slot of every full sibling
/// of the inviter.
fn wire_siblings(
  parent: &Person,
  relatives: &[Related<IndirectFact>],
) -> Vec<(Uuid, ParentRefs)> {
  let mut seen = HashSet::new();
  let mut updates = Vec::new();
  for relative in relatives {
    let fact = &relative.fact;
    let full_sibling = fact.level == 0
      && fact.lineage == Lineage::Lineal
      && fact.subcategory == Subcategory::Blood;
    if !full_sibling || !seen.insert(fact.related_id) {
      continue;
    }
    let mut refs = relative.person.parents();
    let slot = match parent.gender {
      Gender::Male => &mut refs.father_id,
      Gender::Female => &mut refs.mother_id,
      Gender::Other => return Vec::new(),
    };
    if slot.is_none() {
      *slot = Some(parent.person_id);
      updates.push((fact.related_id, refs));
    }
  }
  updates
}

/// Set the primitive parent-of edges implied by adding a parent, child or
/// sibling. Returns the inviter's updated references when they change.
fn wire_parents(
  inviter: &Person,
  person: &mut Person,
  level: i32,
  subcategory: Subcategory,
) -> Result<Option<ParentRefs>> {
  let primitive = matches!(subcategory, Subcategory::Blood | Subcategory::Adoption);
  if !primitive {
    return Ok(None);
  }

  match level {
    1 => {
      let mut refs = inviter.parents();
      let slot = match person.gender {
        Gender::Male => &mut refs.father_id,
        Gender::Female => &mut refs.mother_id,
        Gender::Other => return Ok(None),
      };
      if slot.is_some() {
        return Err(Error::Conflict(format!(
          "{} already has a recorded {}",
          inviter.person_id,
          if person.gender == Gender::Male { "father" } else { "mother" },
        )));
      }
      *slot = Some(person.person_id);
      Ok(Some(refs))
    }
    -1 => {
      let slot = match inviter.gender {
        Gender::Male => &mut person.father_id,
        Gender::Female => &mut person.mother_id,
        Gender::Other => return Ok(None),
      };
      match *slot {
        Some(existing) if existing != inviter.person_id => Err(Error::Validation(
          "supplied parent reference contradicts the inviter".into(),
        )),
        _ => {
          *slot = Some(inviter.person_id);
          Ok(None)
        }
      }
    }
    0 if subcategory == Subcategory::Blood => {
      person.father_id = person.father_id.or(inviter.father_id);
      person.mother_id = person.mother_id.or(inviter.mother_id);
      Ok(None)
    }
    _ => Ok(None),
  }
}

/// The subcategory of a fact derived through an existing one. Relations by
/// marriage do not propagate.
fn combine(added: Subcategory, existing: Subcategory) -> Option<Subcategory> {
  use Subcategory::{Blood, Half, Marriage, Step};
  match (added, existing) {
    (_, Marriage) | (Marriage, _) => None,
    (Step, _) | (_, Step) => Some(Step),
    (Half, _) | (_, Half) => Some(Half),
    _ => Some(Blood),
  }
}

/// What the new member becomes to an existing relative of the inviter.
///
/// `added` is the new member's level relative to the inviter; `existing` is
/// the relative's level relative to the inviter, held through `via`. Returns
/// the relative's level relative to the new member, or `None` when no fact
/// follows.
pub fn propagate(
  added: i32,
  subcategory: Subcategory,
  existing: i32,
  lineage: Lineage,
  via: Subcategory,
) -> Option<(i32, Lineage)> {
  use Lineage::{Collateral, Lineal};
  let shares_ancestry = !matches!(subcategory, Subcategory::Step | Subcategory::Half);
  // A half or step relative need not descend from a newly added parent.
  let inherits_parent = shares_ancestry && !matches!(via, Subcategory::Step | Subcategory::Half);

  match added {
    // New child of the inviter.
    -1 => match (lineage, existing) {
      (Lineal, l) if l >= 1 => Some((l + 1, Lineal)),
      (Lineal, 0) => Some((1, Collateral)),
      (Collateral, l) if l >= 1 => Some((l + 1, Collateral)),
      (Lineal, -1) => Some((0, Lineal)),
      (Lineal, l) if l <= -2 => Some((l + 1, Collateral)),
      (Collateral, -1) if shares_ancestry => Some((0, Collateral)),
      _ => None,
    },
    // New parent of the inviter.
    1 => match (lineage, existing) {
      (Lineal, l) if l <= -1 => Some((l - 1, Lineal)),
      (Lineal, 0) if inherits_parent => Some((-1, Lineal)),
      (Collateral, l) if l <= -1 && inherits_parent => Some((l - 1, Lineal)),
      _ => None,
    },
    // New sibling of the inviter.
    0 => match (lineage, existing) {
      (Lineal, l) if l >= 0 && shares_ancestry => Some((l, Lineal)),
      (Lineal, l) if l < 0 => Some((l, Collateral)),
      (Collateral, l) if shares_ancestry => Some((l, Collateral)),
      _ => None,
    },
    _ => None,
  }
}
