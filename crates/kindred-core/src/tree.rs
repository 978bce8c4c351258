//! The family tree read model, computed from stored facts on every read,
//! never stored itself.

use std::{cmp::Reverse, collections::HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  fact::{DirectFact, IndirectFact, Related},
  person::{ParentRefs, Person},
  taxonomy::{KinKey, Lineage, Taxonomy},
};

/// One relative as seen from the subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
  pub user:         Person,
  pub relationship: String,
  /// `None` for spouses and partners.
  pub level:        Option<i32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lineage:      Option<Lineage>,
  /// For descendants beyond children: which of the subject's descendants
  /// this person's own parent references point at.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_link:  Option<ParentRefs>,
}

/// Ancestors, descendants and adjacent relatives of one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyTree {
  pub subject:       Person,
  /// Closest generation first: parents, then grandparents.
  pub ancestors:     Vec<TreeEntry>,
  /// Closest generation first: children, then grandchildren.
  pub descendants:   Vec<TreeEntry>,
  /// Spouses and partners, then siblings, then other same-generation kin.
  pub adjacent:      Vec<TreeEntry>,
  #[serde(rename = "totalMembers")]
  pub total_members: usize,
}

impl FamilyTree {
  pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
    self.ancestors.iter().chain(&self.descendants).chain(&self.adjacent)
  }
}

/// Buckets and orders a subject's facts.
pub struct TreeBuilder<'t> {
  taxonomy: &'t Taxonomy,
}

impl<'t> TreeBuilder<'t> {
  pub fn new(taxonomy: &'t Taxonomy) -> Self { Self { taxonomy } }

  pub fn build(
    &self,
    subject: Person,
    direct: Vec<Related<DirectFact>>,
    indirect: Vec<Related<IndirectFact>>,
  ) -> FamilyTree {
    let mut ancestors = Vec::new();
    let mut descendants = Vec::new();
    let mut adjacent: Vec<TreeEntry> = direct
      .into_iter()
      .map(|r| TreeEntry {
        relationship: r.fact.relationship.to_string(),
        level: None,
        lineage: None,
        parent_link: None,
        user: r.person,
      })
      .collect();

    for Related { fact, person } in indirect {
      let relationship = if fact.relationship.is_empty() {
        self.taxonomy.resolve(KinKey {
          level:       fact.level,
          gender:      person.gender.into(),
          subcategory: fact.subcategory,
          lineage:     fact.lineage,
        })
      } else {
        fact.relationship
      };
      let entry = TreeEntry {
        user: person,
        relationship,
        level: Some(fact.level),
        lineage: Some(fact.lineage),
        parent_link: None,
      };
      match fact.level {
        l if l > 0 => ancestors.push(entry),
        l if l < 0 => descendants.push(entry),
        _ => adjacent.push(entry),
      }
    }

    let descendant_ids: HashSet<Uuid> =
      descendants.iter().map(|e| e.user.person_id).collect();
    for entry in &mut descendants {
      if entry.level.is_some_and(|l| l <= -2) {
        let link = ParentRefs {
          father_id: entry.user.father_id.filter(|id| descendant_ids.contains(id)),
          mother_id: entry.user.mother_id.filter(|id| descendant_ids.contains(id)),
        };
        entry.parent_link = (!link.is_empty()).then_some(link);
      }
    }

    ancestors.sort_by(|a, b| {
      (a.level, name_key(&a.user)).cmp(&(b.level, name_key(&b.user)))
    });
    descendants.sort_by(|a, b| {
      (Reverse(a.level), name_key(&a.user))
        .cmp(&(Reverse(b.level), name_key(&b.user)))
    });
    adjacent.sort_by(|a, b| {
      (adjacent_rank(a), name_key(&a.user)).cmp(&(adjacent_rank(b), name_key(&b.user)))
    });

    let total_members = 1 + ancestors.len() + descendants.len() + adjacent.len();
    FamilyTree { subject, ancestors, descendants, adjacent, total_members }
  }
}

fn name_key(p: &Person) -> (&str, &str, Uuid) {
  (&p.last_name, &p.first_name, p.person_id)
}

fn adjacent_rank(e: &TreeEntry) -> u8 {
  match (e.level, e.lineage) {
    (None, _) => 0,
    (Some(_), Some(Lineage::Lineal)) => 1,
    _ => 2,
  }
}
