//! Integration tests for `SqliteStore` against an in-memory database.

use kindred_core::{
  Classify, ErrorClass,
  fact::{DirectPair, DirectType, IndirectPair},
  kind::RelationshipKind,
  person::{Gender, NewPerson, Person},
  store::FamilyStore,
  taxonomy::{
    Category, KinKey, LabelGender, Lineage, RelationshipTypeDefinition, Subcategory, Taxonomy,
  },
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn person(s: &SqliteStore, first: &str, gender: Gender) -> Person {
  s.add_person(NewPerson::new(first, "Doe").with_gender(gender))
    .await
    .unwrap()
}

async fn add(s: &SqliteStore, inviter: &Person, kind: RelationshipKind, first: &str) -> Person {
  s.add_member(inviter.person_id, kind, NewPerson::new(first, "Doe"))
    .await
    .unwrap()
}

/// Every fact in the store has its mirror with a negated level and a label
/// resolved for the other party.
async fn assert_reciprocal(s: &SqliteStore) {
  let taxonomy = s.taxonomy();
  for a in s.list_persons().await.unwrap() {
    for r in s.indirect_facts(a.person_id).await.unwrap() {
      let f = &r.fact;
      assert_ne!(f.subject_id, f.related_id);
      let back = s
        .indirect_fact(f.related_id, f.subject_id)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("missing reverse of {} -> {}", f.subject_id, f.related_id));
      assert_eq!(back.level, -f.level);
      assert_eq!((back.lineage, back.subcategory), (f.lineage, f.subcategory));
      let expected = taxonomy.resolve(KinKey {
        level:       -f.level,
        gender:      a.gender.into(),
        subcategory: f.subcategory,
        lineage:     f.lineage,
      });
      assert_eq!(back.relationship, expected);
    }
    for r in s.direct_facts(a.person_id).await.unwrap() {
      let back = s
        .direct_fact(r.fact.related_id, r.fact.subject_id)
        .await
        .unwrap()
        .unwrap();
      if r.fact.relationship != DirectType::Partner {
        assert_eq!(back.relationship, DirectType::for_gender(a.gender));
      }
    }
  }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;
  let p = s
    .add_person(NewPerson::new("Ada", "Lovelace").with_email("  Ada@Example.com "))
    .await
    .unwrap();
  assert_eq!(p.email.as_deref(), Some("ada@example.com"));
  assert_eq!(p.gender, Gender::Other);

  let fetched = s.get_person(p.person_id).await.unwrap().unwrap();
  assert_eq!(fetched, p);
  let by_email = s.find_person_by_email("ADA@example.com").await.unwrap();
  assert_eq!(by_email.map(|p| p.person_id), Some(p.person_id));
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  assert!(s.get_person(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn add_person_rejects_unknown_parent() {
  let s = store().await;
  let mut input = NewPerson::new("Orphan", "Doe");
  input.father_id = Some(Uuid::new_v4());
  let err = s.add_person(input).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
  assert!(s.list_persons().await.unwrap().is_empty());
}

// ─── Relationship store ──────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_pair_is_a_conflict() {
  let s = store().await;
  let a = person(&s, "A", Gender::Male).await;
  let b = person(&s, "B", Gender::Female).await;
  let pair = || {
    IndirectPair::new(
      a.person_id,
      b.person_id,
      0,
      "sister".into(),
      "brother".into(),
      Lineage::Lineal,
      Subcategory::Blood,
    )
  };
  s.create_indirect_pair(pair()).await.unwrap();
  let err = s.create_indirect_pair(pair()).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::Conflict);
  assert_eq!(s.indirect_facts(a.person_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn self_relation_is_rejected() {
  let s = store().await;
  let a = person(&s, "A", Gender::Male).await;
  let err = s
    .create_direct_pair(DirectPair::new(a.person_id, a.person_id, DirectType::Wife, DirectType::Husband))
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Validation);

  let err = s
    .create_indirect_pair(IndirectPair::new(
      a.person_id,
      a.person_id,
      0,
      "brother".into(),
      "brother".into(),
      Lineage::Lineal,
      Subcategory::Blood,
    ))
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Validation);
  assert!(s.indirect_facts(a.person_id).await.unwrap().is_empty());
  assert!(s.direct_facts(a.person_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn pair_with_unknown_person_is_not_found() {
  let s = store().await;
  let a = person(&s, "A", Gender::Male).await;
  let err = s
    .create_direct_pair(DirectPair::new(a.person_id, Uuid::new_v4(), DirectType::Wife, DirectType::Husband))
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn remove_all_facts_counts_both_directions() {
  let s = store().await;
  let a = person(&s, "A", Gender::Male).await;
  let b = person(&s, "B", Gender::Female).await;
  s.create_direct_pair(DirectPair::new(a.person_id, b.person_id, DirectType::Wife, DirectType::Husband))
    .await
    .unwrap();
  assert_eq!(s.remove_all_facts_involving(a.person_id).await.unwrap(), 2);
  assert!(s.direct_facts(b.person_id).await.unwrap().is_empty());
}

// ─── Tree ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stored_father_is_first_ancestor() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  let q = person(&s, "Q", Gender::Male).await;
  let g = person(&s, "G", Gender::Female).await;
  s.create_indirect_pair(IndirectPair::new(
    p.person_id,
    g.person_id,
    2,
    "grandmother".into(),
    "grandson".into(),
    Lineage::Lineal,
    Subcategory::Blood,
  ))
  .await
  .unwrap();
  s.create_indirect_pair(IndirectPair::new(
    p.person_id,
    q.person_id,
    1,
    "father".into(),
    "son".into(),
    Lineage::Lineal,
    Subcategory::Blood,
  ))
  .await
  .unwrap();

  let tree = s.get_tree(p.person_id).await.unwrap();
  assert_eq!(tree.ancestors.len(), 2);
  assert_eq!(tree.ancestors[0].user.person_id, q.person_id);
  assert_eq!(tree.ancestors[0].level, Some(1));
  assert_eq!(tree.ancestors[0].relationship, "father");
  assert_eq!(tree.total_members, 3);
}

#[tokio::test]
async fn tree_of_unknown_subject_is_not_found() {
  let s = store().await;
  let err = s.get_tree(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn lone_subject_has_empty_tree() {
  let s = store().await;
  let p = person(&s, "P", Gender::Female).await;
  let tree = s.get_tree(p.person_id).await.unwrap();
  assert_eq!(tree.total_members, 1);
  assert!(tree.entries().next().is_none());
}

// ─── Add member ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn son_of_someone_with_a_father_gets_a_grandfather() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  let g = add(&s, &p, RelationshipKind::Father, "G").await;
  let n = add(&s, &p, RelationshipKind::Son, "N").await;

  let up = s.indirect_fact(n.person_id, g.person_id).await.unwrap().unwrap();
  assert_eq!((up.level, up.relationship.as_str()), (2, "grandfather"));
  let down = s.indirect_fact(g.person_id, n.person_id).await.unwrap().unwrap();
  assert_eq!((down.level, down.relationship.as_str()), (-2, "grandson"));

  assert_eq!(n.father_id, Some(p.person_id));
  let p = s.get_person(p.person_id).await.unwrap().unwrap();
  assert_eq!(p.father_id, Some(g.person_id));
  assert_reciprocal(&s).await;
}

#[tokio::test]
async fn husband_creates_one_direct_pair_only() {
  let s = store().await;
  let p = person(&s, "P", Gender::Female).await;
  add(&s, &p, RelationshipKind::Father, "F").await;
  let h = add(&s, &p, RelationshipKind::Husband, "H").await;

  let direct = s.direct_facts(p.person_id).await.unwrap();
  assert_eq!(direct.len(), 1);
  assert_eq!(direct[0].fact.relationship, DirectType::Husband);
  let back = s.direct_fact(h.person_id, p.person_id).await.unwrap().unwrap();
  assert_eq!(back.relationship, DirectType::Wife);
  assert!(s.indirect_facts(h.person_id).await.unwrap().is_empty());

  let tree = s.get_tree(p.person_id).await.unwrap();
  assert_eq!(tree.adjacent[0].relationship, "husband");
  assert_eq!(tree.adjacent[0].level, None);
}

#[tokio::test]
async fn duplicate_email_rolls_back() {
  let s = store().await;
  let p = s
    .add_person(NewPerson::new("P", "Doe").with_email("p@example.com"))
    .await
    .unwrap();
  let err = s
    .add_member(
      p.person_id,
      RelationshipKind::Sister,
      NewPerson::new("S", "Doe").with_email("P@example.com"),
    )
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Conflict);
  assert_eq!(s.list_persons().await.unwrap().len(), 1);
  assert!(s.indirect_facts(p.person_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn occupied_parent_slot_rolls_back() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  add(&s, &p, RelationshipKind::Mother, "M").await;
  let err = s
    .add_member(p.person_id, RelationshipKind::Mother, NewPerson::new("M2", "Doe"))
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Conflict);
  assert_eq!(s.list_persons().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_inviter_is_not_found() {
  let s = store().await;
  let err = s
    .add_member(Uuid::new_v4(), RelationshipKind::Son, NewPerson::new("N", "Doe"))
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn mismatched_gender_is_a_validation_error() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  let err = s
    .add_member(
      p.person_id,
      RelationshipKind::Daughter,
      NewPerson::new("D", "Doe").with_gender(Gender::Male),
    )
    .await
    .unwrap_err();
  assert_eq!(err.class(), ErrorClass::Validation);
}

#[tokio::test]
async fn family_propagates_across_generations() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  let f = add(&s, &p, RelationshipKind::Father, "F").await;
  let gf = add(&s, &f, RelationshipKind::Father, "GF").await;
  let b = add(&s, &p, RelationshipKind::Brother, "B").await;
  let son = add(&s, &p, RelationshipKind::Son, "S").await;
  let grandson = add(&s, &son, RelationshipKind::Son, "GS").await;

  // The brother shares the father and the grandfather.
  assert_eq!(b.father_id, Some(f.person_id));
  let b_f = s.indirect_fact(b.person_id, f.person_id).await.unwrap().unwrap();
  assert_eq!(b_f.relationship, "father");

  // The son sees his uncle on the collateral line.
  let uncle = s.indirect_fact(son.person_id, b.person_id).await.unwrap().unwrap();
  assert_eq!((uncle.level, uncle.lineage, uncle.relationship.as_str()), (1, Lineage::Collateral, "uncle"));

  // The grandson reaches three generations up.
  let top = s.indirect_fact(grandson.person_id, f.person_id).await.unwrap().unwrap();
  assert_eq!((top.level, top.relationship.as_str()), (3, "great-grandfather"));
  let grand_uncle = s.indirect_fact(grandson.person_id, b.person_id).await.unwrap().unwrap();
  assert_eq!(grand_uncle.relationship, "granduncle");

  let tree = s.get_tree(p.person_id).await.unwrap();
  let levels: Vec<_> = tree.ancestors.iter().map(|e| e.level.unwrap()).collect();
  assert!(levels.windows(2).all(|w| w[0] <= w[1]));
  let levels: Vec<_> = tree.descendants.iter().map(|e| e.level.unwrap()).collect();
  assert_eq!(levels, vec![-1, -2]);
  assert_eq!(tree.descendants[1].parent_link.and_then(|l| l.father_id), Some(son.person_id));
  assert_eq!(
    tree.total_members,
    1 + tree.ancestors.len() + tree.descendants.len() + tree.adjacent.len()
  );
  assert!(tree.ancestors.iter().any(|e| e.user.person_id == gf.person_id));
  assert_reciprocal(&s).await;
}

#[tokio::test]
async fn step_sibling_shares_no_parents() {
  let s = store().await;
  let p = person(&s, "P", Gender::Female).await;
  add(&s, &p, RelationshipKind::Father, "F").await;
  let step = add(&s, &p, RelationshipKind::Stepbrother, "SB").await;
  assert_eq!(step.father_id, None);
  let fact = s.indirect_fact(p.person_id, step.person_id).await.unwrap().unwrap();
  assert_eq!(fact.relationship, "stepbrother");
  assert_eq!(s.indirect_facts(step.person_id).await.unwrap().len(), 1);
  assert_reciprocal(&s).await;
}

#[tokio::test]
async fn father_added_after_siblings_skips_half_and_step() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  let half = add(&s, &p, RelationshipKind::HalfBrother, "H").await;
  let step = add(&s, &p, RelationshipKind::Stepsister, "SS").await;
  let f = add(&s, &p, RelationshipKind::Father, "F").await;

  assert!(s.indirect_fact(f.person_id, half.person_id).await.unwrap().is_none());
  assert!(s.indirect_fact(f.person_id, step.person_id).await.unwrap().is_none());
  let half = s.get_person(half.person_id).await.unwrap().unwrap();
  assert_eq!(half.father_id, None);
  assert_eq!(s.indirect_facts(f.person_id).await.unwrap().len(), 1);
  assert_reciprocal(&s).await;
}

#[tokio::test]
async fn parents_added_after_a_brother_become_his_parents() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  let b = add(&s, &p, RelationshipKind::Brother, "B").await;
  let f = add(&s, &p, RelationshipKind::Father, "F").await;
  let m = add(&s, &p, RelationshipKind::Mother, "M").await;

  let b = s.get_person(b.person_id).await.unwrap().unwrap();
  assert_eq!(b.father_id, Some(f.person_id));
  assert_eq!(b.mother_id, Some(m.person_id));
  let son = s.indirect_fact(f.person_id, b.person_id).await.unwrap().unwrap();
  assert_eq!((son.level, son.relationship.as_str()), (-1, "son"));

  let ext = s.extended_tree(p.person_id).await.unwrap();
  assert_eq!(ext.parents.len(), 2);
  assert_eq!(ext.siblings.len(), 1);
  assert_eq!(ext.siblings[0].user.person_id, b.person_id);
  let brother_view = s.extended_tree(b.person_id).await.unwrap();
  assert_eq!(brother_view.parents.len(), 2);
  assert_reciprocal(&s).await;
}

#[tokio::test]
async fn child_added_after_a_nephew_is_his_cousin() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  let sib = add(&s, &p, RelationshipKind::Sister, "Sib").await;
  let nephew = add(&s, &sib, RelationshipKind::Son, "N").await;
  let c = add(&s, &p, RelationshipKind::Son, "C").await;

  let cousin = s.indirect_fact(c.person_id, nephew.person_id).await.unwrap().unwrap();
  assert_eq!(
    (cousin.level, cousin.lineage, cousin.relationship.as_str()),
    (0, Lineage::Collateral, "cousin")
  );
  let aunt = s.indirect_fact(c.person_id, sib.person_id).await.unwrap().unwrap();
  assert_eq!(aunt.relationship, "aunt");

  let tree = s.get_tree(c.person_id).await.unwrap();
  assert!(tree.adjacent.iter().any(|e| e.user.person_id == nephew.person_id));
  assert_reciprocal(&s).await;
}

/// The same family built in two orders stores the same facts and agrees
/// with the parent-edge walk.
#[tokio::test]
async fn insertion_order_does_not_change_the_family() {
  async fn labels(s: &SqliteStore, subject: &Person) -> Vec<(String, String)> {
    let mut out: Vec<_> = s
      .indirect_facts(subject.person_id)
      .await
      .unwrap()
      .into_iter()
      .map(|r| (r.person.first_name, r.fact.relationship))
      .collect();
    out.sort();
    out
  }

  let parents_first = store().await;
  let p1 = person(&parents_first, "P", Gender::Male).await;
  add(&parents_first, &p1, RelationshipKind::Father, "F").await;
  add(&parents_first, &p1, RelationshipKind::Mother, "M").await;
  let b1 = add(&parents_first, &p1, RelationshipKind::Brother, "B").await;
  add(&parents_first, &b1, RelationshipKind::Daughter, "D").await;

  let parents_last = store().await;
  let p2 = person(&parents_last, "P", Gender::Male).await;
  let b2 = add(&parents_last, &p2, RelationshipKind::Brother, "B").await;
  add(&parents_last, &b2, RelationshipKind::Daughter, "D").await;
  add(&parents_last, &p2, RelationshipKind::Father, "F").await;
  add(&parents_last, &p2, RelationshipKind::Mother, "M").await;

  assert_reciprocal(&parents_first).await;
  assert_reciprocal(&parents_last).await;
  assert_eq!(labels(&parents_first, &p1).await, labels(&parents_last, &p2).await);
  assert_eq!(labels(&parents_first, &b1).await, labels(&parents_last, &b2).await);

  for (s, p) in [(&parents_first, &p1), (&parents_last, &p2)] {
    let tree = s.get_tree(p.person_id).await.unwrap();
    let ext = s.extended_tree(p.person_id).await.unwrap();
    let ancestors = tree.ancestors.iter().filter(|e| e.level == Some(1)).count();
    assert_eq!(ancestors, ext.parents.len());
    let siblings = tree
      .adjacent
      .iter()
      .filter(|e| e.level == Some(0) && e.relationship == "brother")
      .count();
    assert_eq!(siblings, ext.siblings.len());
    let nieces = tree.descendants.iter().filter(|e| e.relationship == "niece").count()
      + tree.adjacent.iter().filter(|e| e.relationship == "niece").count();
    assert_eq!(nieces, ext.nieces_nephews.len());
  }
}

// ─── Remove member ───────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_unrelated_person_is_not_found() {
  let s = store().await;
  let a = person(&s, "A", Gender::Male).await;
  let b = person(&s, "B", Gender::Male).await;
  let err = s.remove_member(b.person_id, a.person_id).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
  let missing = s.remove_member(Uuid::new_v4(), a.person_id).await.unwrap_err();
  assert_eq!(missing.class(), ErrorClass::NotFound);
  assert!(s.get_person(b.person_id).await.unwrap().is_some());
}

#[tokio::test]
async fn remove_member_cascades() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  let f = add(&s, &p, RelationshipKind::Father, "F").await;
  add(&s, &p, RelationshipKind::Sister, "S").await;
  add(&s, &p, RelationshipKind::Wife, "W").await;

  s.remove_member(f.person_id, p.person_id).await.unwrap();

  assert!(s.get_person(f.person_id).await.unwrap().is_none());
  for other in s.list_persons().await.unwrap() {
    assert_ne!(other.father_id, Some(f.person_id));
    assert!(s.indirect_fact(other.person_id, f.person_id).await.unwrap().is_none());
    assert!(s.direct_fact(other.person_id, f.person_id).await.unwrap().is_none());
  }
  assert!(s.indirect_facts(f.person_id).await.unwrap().is_empty());
  assert_reciprocal(&s).await;
}

// ─── Extended tree & graph ───────────────────────────────────────────────────

#[tokio::test]
async fn extended_tree_walks_parent_edges() {
  let s = store().await;
  let p = person(&s, "P", Gender::Male).await;
  add(&s, &p, RelationshipKind::Father, "F").await;
  add(&s, &p, RelationshipKind::Mother, "M").await;
  let b = add(&s, &p, RelationshipKind::Brother, "B").await;
  let nephew = add(&s, &b, RelationshipKind::Son, "N").await;
  let w = add(&s, &p, RelationshipKind::Wife, "W").await;

  let ext = s.extended_tree(p.person_id).await.unwrap();
  assert_eq!(ext.parents.len(), 2);
  assert_eq!(ext.siblings.len(), 1);
  assert_eq!(ext.siblings[0].relationship, "brother");
  assert_eq!(ext.nieces_nephews[0].user.person_id, nephew.person_id);
  assert_eq!(ext.spouses[0].user.person_id, w.person_id);
  assert_eq!(ext.spouses[0].relationship, "wife");

  let brother_view = s.extended_tree(b.person_id).await.unwrap();
  assert_eq!(brother_view.siblings_in_law[0].user.person_id, w.person_id);
  assert_eq!(brother_view.siblings_in_law[0].relationship, "sister-in-law");
}

#[tokio::test]
async fn graph_has_a_node_per_member() {
  let s = store().await;
  let p = person(&s, "P", Gender::Female).await;
  let son = add(&s, &p, RelationshipKind::Son, "S").await;
  add(&s, &son, RelationshipKind::Daughter, "D").await;

  let tree = s.get_tree(p.person_id).await.unwrap();
  let graph = s.graph(p.person_id).await.unwrap();
  assert_eq!(graph.nodes.len(), tree.total_members);
  assert!(graph.edges.iter().any(|e| e.source == son.person_id && e.relationship == "parent"));
}

// ─── Taxonomy ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_is_seeded_and_beyond_range_still_resolves() {
  let s = store().await;
  let t = s.taxonomy();
  assert_eq!(t.definitions().len(), Taxonomy::default().definitions().len());
  assert_eq!(t.resolve_label(4, LabelGender::Male), "great-great-grandfather");
  assert_eq!(
    t.resolve_label(-7, LabelGender::Female),
    "great-great-great-great-great-granddaughter"
  );
}

#[tokio::test]
async fn catalog_override_persists_across_reopen() {
  let path = std::env::temp_dir().join(format!("kindred-{}.db", Uuid::new_v4()));
  let custom = Taxonomy::new(vec![RelationshipTypeDefinition {
    name:            "papa".into(),
    level:           1,
    gender:          LabelGender::Male,
    category:        Category::Indirect,
    subcategory:     Subcategory::Blood,
    lineage:         Lineage::Lineal,
    reciprocal_name: "child".into(),
    is_active:       true,
    sort_order:      1,
  }]);

  {
    let s = SqliteStore::open_with_taxonomy(&path, Some(custom)).await.unwrap();
    assert_eq!(s.taxonomy().resolve_label(1, LabelGender::Male), "papa");
  }
  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.taxonomy().definitions().len(), 1);
  assert_eq!(reopened.taxonomy().resolve_label(1, LabelGender::Male), "papa");
  assert_eq!(reopened.taxonomy().resolve_label(1, LabelGender::Female), "mother");
  drop(reopened);
  let _ = std::fs::remove_file(&path);
}
