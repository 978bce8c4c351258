//! The `FamilyStore` trait.
//!
//! Implemented by storage backends (e.g. `kindred-store-sqlite`). The HTTP
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify,
  extended::ExtendedTree,
  fact::{DirectFact, DirectPair, IndirectFact, IndirectPair, Related},
  kind::RelationshipKind,
  person::{NewPerson, Person},
  projector::GraphView,
  taxonomy::Taxonomy,
  tree::FamilyTree,
};

/// Abstraction over a kindred store backend.
///
/// Relationship facts are only ever written in reciprocal pairs, and every
/// multi-row write is atomic: on error nothing is persisted.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FamilyStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// The taxonomy labels are resolved against.
  fn taxonomy(&self) -> &Taxonomy;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Create an unrelated person. The gender defaults to `other`.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Lookup by normalised email.
  fn find_person_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Relationship store ────────────────────────────────────────────────

  /// Persist both rows of a marriage/partnership, or neither.
  fn create_direct_pair(
    &self,
    pair: DirectPair,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist both rows of a leveled kinship, or neither.
  fn create_indirect_pair(
    &self,
    pair: IndirectPair,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every fact where `id` is on either side; returns rows removed.
  fn remove_all_facts_involving(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn direct_facts(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Related<DirectFact>>, Self::Error>> + Send + '_;

  fn indirect_facts(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Related<IndirectFact>>, Self::Error>> + Send + '_;

  fn direct_fact(
    &self,
    subject_id: Uuid,
    related_id: Uuid,
  ) -> impl Future<Output = Result<Option<DirectFact>, Self::Error>> + Send + '_;

  fn indirect_fact(
    &self,
    subject_id: Uuid,
    related_id: Uuid,
  ) -> impl Future<Output = Result<Option<IndirectFact>, Self::Error>> + Send + '_;

  // ── Read models ───────────────────────────────────────────────────────

  /// Fails with a not-found error if the subject does not exist.
  fn get_tree(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<FamilyTree, Self::Error>> + Send + '_;

  fn extended_tree(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<ExtendedTree, Self::Error>> + Send + '_;

  fn graph(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<GraphView, Self::Error>> + Send + '_;

  // ── Membership ────────────────────────────────────────────────────────

  /// Create `attributes` as the inviter's `kind` and propagate the implied
  /// kinship to the inviter's relatives, in one transaction.
  fn add_member(
    &self,
    inviter_id: Uuid,
    kind: RelationshipKind,
    attributes: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Delete `target_id` and all of its facts. The requester must hold a
  /// fact toward the target; otherwise the call fails as not-found without
  /// revealing whether the target exists.
  fn remove_member(
    &self,
    target_id: Uuid,
    requester_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
