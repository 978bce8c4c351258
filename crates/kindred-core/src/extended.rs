//! The extended tree: named relative groups computed by walking the
//! primitive parent-of and married-to edges.
//!
//! Every group is a fixed, template-driven walk of at most three hops, e.g.
//! cousins = children of siblings of parents. There is no open-ended search.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  fact::DirectType,
  person::Person,
  taxonomy::{KinKey, Subcategory, Taxonomy},
};

/// Read access to the primitive edges of the kinship graph.
pub trait KinGraph {
  type Error;

  fn person(&self, id: Uuid) -> Result<Option<Person>, Self::Error>;

  /// Persons whose father or mother reference is `id`.
  fn children(&self, id: Uuid) -> Result<Vec<Person>, Self::Error>;

  /// Persons married to or partnered with `id`, with what they are to `id`.
  fn spouses(&self, id: Uuid) -> Result<Vec<(Person, DirectType)>, Self::Error>;

  fn parents(&self, person: &Person) -> Result<Vec<Person>, Self::Error> {
    let mut out = Vec::new();
    for id in person.parents().ids() {
      if let Some(parent) = self.person(id)? {
        out.push(parent);
      }
    }
    Ok(out)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinEntry {
  pub user:         Person,
  pub relationship: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedTree {
  pub parents:          Vec<KinEntry>,
  pub grandparents:     Vec<KinEntry>,
  pub children:         Vec<KinEntry>,
  pub grandchildren:    Vec<KinEntry>,
  pub spouses:          Vec<KinEntry>,
  pub siblings:         Vec<KinEntry>,
  pub aunts_uncles:     Vec<KinEntry>,
  pub cousins:          Vec<KinEntry>,
  pub nieces_nephews:   Vec<KinEntry>,
  pub parents_in_law:   Vec<KinEntry>,
  pub siblings_in_law:  Vec<KinEntry>,
  pub children_in_law:  Vec<KinEntry>,
}

/// A de-duplicated group that never contains the subject.
struct Group {
  subject: Uuid,
  seen:    HashSet<Uuid>,
  entries: Vec<KinEntry>,
}

impl Group {
  fn new(subject: Uuid) -> Self {
    Self { subject, seen: HashSet::new(), entries: Vec::new() }
  }

  fn push(&mut self, person: Person, relationship: String) {
    if person.person_id != self.subject && self.seen.insert(person.person_id) {
      self.entries.push(KinEntry { user: person, relationship });
    }
  }

  fn people(&self) -> impl Iterator<Item = &Person> {
    self.entries.iter().map(|e| &e.user)
  }

  fn finish(mut self) -> Vec<KinEntry> {
    self.entries.sort_by(|a, b| {
      (&a.user.last_name, &a.user.first_name, a.user.person_id)
        .cmp(&(&b.user.last_name, &b.user.first_name, b.user.person_id))
    });
    self.entries
  }
}

/// Siblings of `person`: other children of either parent. Half when the two
/// do not share both parents.
fn siblings_of<G: KinGraph>(
  graph: &G,
  person: &Person,
) -> Result<Vec<(Person, Subcategory)>, G::Error> {
  let mut seen = HashSet::from([person.person_id]);
  let mut out = Vec::new();
  for parent in graph.parents(person)? {
    for sibling in graph.children(parent.person_id)? {
      if !seen.insert(sibling.person_id) {
        continue;
      }
      let full = sibling.father_id.is_some()
        && sibling.mother_id.is_some()
        && sibling.parents() == person.parents();
      let sub = if full { Subcategory::Blood } else { Subcategory::Half };
      out.push((sibling, sub));
    }
  }
  Ok(out)
}

/// Build the extended tree for `subject_id`; `None` if the subject is
/// unknown.
pub fn build_extended<G: KinGraph>(
  graph: &G,
  taxonomy: &Taxonomy,
  subject_id: Uuid,
) -> Result<Option<ExtendedTree>, G::Error> {
  let Some(subject) = graph.person(subject_id)? else {
    return Ok(None);
  };
  let lineal = |level: i32, p: &Person| taxonomy.resolve(KinKey::lineal(level, p.gender));
  let collateral = |level: i32, p: &Person| taxonomy.resolve(KinKey::collateral(level, p.gender));
  let in_law = |level: i32, p: &Person| {
    taxonomy.resolve(KinKey::lineal(level, p.gender).with_subcategory(Subcategory::Marriage))
  };

  let group = || Group::new(subject_id);
  let (mut parents, mut grandparents) = (group(), group());
  let (mut children, mut grandchildren) = (group(), group());
  let (mut spouses, mut siblings) = (group(), group());
  let (mut aunts_uncles, mut cousins, mut nieces_nephews) = (group(), group(), group());
  let (mut parents_in_law, mut siblings_in_law, mut children_in_law) = (group(), group(), group());

  // parent, parent → parent
  for parent in graph.parents(&subject)? {
    for grandparent in graph.parents(&parent)? {
      let label = lineal(2, &grandparent);
      grandparents.push(grandparent, label);
    }
    // parent → sibling → child
    for (aunt, sub) in siblings_of(graph, &parent)? {
      for cousin in graph.children(aunt.person_id)? {
        let label = collateral(0, &cousin);
        cousins.push(cousin, label);
      }
      let label = taxonomy.resolve(KinKey::collateral(1, aunt.gender).with_subcategory(sub));
      aunts_uncles.push(aunt, label);
    }
    let label = lineal(1, &parent);
    parents.push(parent, label);
  }

  // child → child, child → spouse
  for child in graph.children(subject_id)? {
    for grandchild in graph.children(child.person_id)? {
      let label = lineal(-2, &grandchild);
      grandchildren.push(grandchild, label);
    }
    for (spouse, _) in graph.spouses(child.person_id)? {
      let label = in_law(-1, &spouse);
      children_in_law.push(spouse, label);
    }
    let label = lineal(-1, &child);
    children.push(child, label);
  }

  // sibling → child, sibling → spouse
  for (sibling, sub) in siblings_of(graph, &subject)? {
    for nibling in graph.children(sibling.person_id)? {
      let label = collateral(-1, &nibling);
      nieces_nephews.push(nibling, label);
    }
    for (spouse, _) in graph.spouses(sibling.person_id)? {
      let label = in_law(0, &spouse);
      siblings_in_law.push(spouse, label);
    }
    let label = taxonomy.resolve(KinKey::lineal(0, sibling.gender).with_subcategory(sub));
    siblings.push(sibling, label);
  }

  // spouse → parent, spouse → sibling
  for (spouse, relationship) in graph.spouses(subject_id)? {
    for parent in graph.parents(&spouse)? {
      let label = in_law(1, &parent);
      parents_in_law.push(parent, label);
    }
    for (sibling, _) in siblings_of(graph, &spouse)? {
      let label = in_law(0, &sibling);
      siblings_in_law.push(sibling, label);
    }
    spouses.push(spouse, relationship.to_string());
  }

  // A spouse's parent who is also the subject's parent stays a parent.
  let parent_ids: HashSet<Uuid> = parents.people().map(|p| p.person_id).collect();
  parents_in_law.entries.retain(|e| !parent_ids.contains(&e.user.person_id));
  let sibling_ids: HashSet<Uuid> = siblings.people().map(|p| p.person_id).collect();
  siblings_in_law.entries.retain(|e| !sibling_ids.contains(&e.user.person_id));

  Ok(Some(ExtendedTree {
    parents:         parents.finish(),
    grandparents:    grandparents.finish(),
    children:        children.finish(),
    grandchildren:   grandchildren.finish(),
    spouses:         spouses.finish(),
    siblings:        siblings.finish(),
    aunts_uncles:    aunts_uncles.finish(),
    cousins:         cousins.finish(),
    nieces_nephews:  nieces_nephews.finish(),
    parents_in_law:  parents_in_law.finish(),
    siblings_in_law: siblings_in_law.finish(),
    children_in_law: children_in_law.finish(),
  }))
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, convert::Infallible};

  use super::*;
  use crate::person::{Gender, NewPerson};

  #[derive(Default)]
  struct MemoryGraph {
    people:    HashMap<Uuid, Person>,
    marriages: Vec<(Uuid, Uuid)>,
  }

  impl MemoryGraph {
    fn add(&mut self, first: &str, gender: Gender, father: Option<&Person>, mother: Option<&Person>) -> Person {
      let mut p = NewPerson::new(first, "Doe").into_person(gender);
      p.father_id = father.map(|f| f.person_id);
      p.mother_id = mother.map(|m| m.person_id);
      self.people.insert(p.person_id, p.clone());
      p
    }

    fn marry(&mut self, a: &Person, b: &Person) {
      self.marriages.push((a.person_id, b.person_id));
    }
  }

  impl KinGraph for MemoryGraph {
    type Error = Infallible;

    fn person(&self, id: Uuid) -> Result<Option<Person>, Infallible> {
      Ok(self.people.get(&id).cloned())
    }

    fn children(&self, id: Uuid) -> Result<Vec<Person>, Infallible> {
      Ok(
        self
          .people
          .values()
          .filter(|p| p.father_id == Some(id) || p.mother_id == Some(id))
          .cloned()
          .collect(),
      )
    }

    fn spouses(&self, id: Uuid) -> Result<Vec<(Person, DirectType)>, Infallible> {
      Ok(
        self
          .marriages
          .iter()
          .filter_map(|&(a, b)| {
            if a == id {
              Some(b)
            } else if b == id {
              Some(a)
            } else {
              None
            }
          })
          .filter_map(|other| self.people.get(&other).cloned())
          .map(|p| {
            let t = DirectType::for_gender(p.gender);
            (p, t)
          })
          .collect(),
      )
    }
  }

  fn names(entries: &[KinEntry]) -> Vec<(&str, &str)> {
    let mut v: Vec<_> =
      entries.iter().map(|e| (e.user.first_name.as_str(), e.relationship.as_str())).collect();
    v.sort();
    v
  }

  /// Three generations around `me`, with in-laws on both sides.
  fn family() -> (MemoryGraph, Person) {
    let mut g = MemoryGraph::default();
    let grandpa = g.add("Grandpa", Gender::Male, None, None);
    let grandma = g.add("Grandma", Gender::Female, None, None);
    let dad = g.add("Dad", Gender::Male, Some(&grandpa), Some(&grandma));
    let uncle = g.add("Uncle", Gender::Male, Some(&grandpa), Some(&grandma));
    let _cousin = g.add("Cousin", Gender::Female, Some(&uncle), None);
    let mom = g.add("Mom", Gender::Female, None, None);
    let me = g.add("Me", Gender::Male, Some(&dad), Some(&mom));
    let sis = g.add("Sis", Gender::Female, Some(&dad), Some(&mom));
    let _half = g.add("Half", Gender::Male, Some(&dad), None);
    let _niece = g.add("Niece", Gender::Female, None, Some(&sis));
    let sis_husband = g.add("Bro-in-law", Gender::Male, None, None);
    g.marry(&sis, &sis_husband);
    let wife_dad = g.add("Wife-dad", Gender::Male, None, None);
    let wife = g.add("Wife", Gender::Female, Some(&wife_dad), None);
    let _wife_sis = g.add("Wife-sis", Gender::Female, Some(&wife_dad), None);
    g.marry(&me, &wife);
    let son = g.add("Son", Gender::Male, Some(&me), Some(&wife));
    let _grandson = g.add("Grandson", Gender::Male, Some(&son), None);
    let son_wife = g.add("Son-wife", Gender::Female, None, None);
    g.marry(&son, &son_wife);
    (g, me)
  }

  #[test]
  fn unknown_subject_is_none() {
    let g = MemoryGraph::default();
    assert!(build_extended(&g, &Taxonomy::default(), Uuid::new_v4()).unwrap().is_none());
  }

  #[test]
  fn lineal_groups() {
    let (g, me) = family();
    let tree = build_extended(&g, &Taxonomy::default(), me.person_id).unwrap().unwrap();
    assert_eq!(names(&tree.parents), vec![("Dad", "father"), ("Mom", "mother")]);
    assert_eq!(names(&tree.grandparents), vec![("Grandma", "grandmother"), ("Grandpa", "grandfather")]);
    assert_eq!(names(&tree.children), vec![("Son", "son")]);
    assert_eq!(names(&tree.grandchildren), vec![("Grandson", "grandson")]);
  }

  #[test]
  fn collateral_groups() {
    let (g, me) = family();
    let tree = build_extended(&g, &Taxonomy::default(), me.person_id).unwrap().unwrap();
    assert_eq!(names(&tree.siblings), vec![("Half", "half-brother"), ("Sis", "sister")]);
    assert_eq!(names(&tree.aunts_uncles), vec![("Uncle", "uncle")]);
    assert_eq!(names(&tree.cousins), vec![("Cousin", "cousin")]);
    assert_eq!(names(&tree.nieces_nephews), vec![("Niece", "niece")]);
  }

  #[test]
  fn marriage_groups() {
    let (g, me) = family();
    let tree = build_extended(&g, &Taxonomy::default(), me.person_id).unwrap().unwrap();
    assert_eq!(names(&tree.spouses), vec![("Wife", "wife")]);
    assert_eq!(names(&tree.parents_in_law), vec![("Wife-dad", "father-in-law")]);
    assert_eq!(
      names(&tree.siblings_in_law),
      vec![("Bro-in-law", "brother-in-law"), ("Wife-sis", "sister-in-law")]
    );
    assert_eq!(names(&tree.children_in_law), vec![("Son-wife", "daughter-in-law")]);
  }

  #[test]
  fn subject_never_appears() {
    let (g, me) = family();
    let tree = build_extended(&g, &Taxonomy::default(), me.person_id).unwrap().unwrap();
    let all = [
      &tree.parents, &tree.grandparents, &tree.children, &tree.grandchildren, &tree.spouses,
      &tree.siblings, &tree.aunts_uncles, &tree.cousins, &tree.nieces_nephews,
      &tree.parents_in_law, &tree.siblings_in_law, &tree.children_in_law,
    ];
    assert!(all.iter().flat_map(|g| g.iter()).all(|e| e.user.person_id != me.person_id));
  }
}
