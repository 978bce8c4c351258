//! The SQLite implementation of [`FamilyStore`]: [`SqliteStore`].

use std::{path::Path, sync::Arc};

use kindred_core::{
  Classify, ErrorClass,
  extended::{ExtendedTree, build_extended},
  fact::{DirectFact, DirectPair, IndirectFact, IndirectPair, Related},
  kind::RelationshipKind,
  person::{Gender, NewPerson, Person},
  projector::{GraphView, project},
  store::FamilyStore,
  taxonomy::{Taxonomy, default_catalog},
  tree::{FamilyTree, TreeBuilder},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{Error, Result, graph::ConnGraph, membership, query, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A kindred store backed by a single SQLite file.
///
/// Cloning is cheap; the connection handle and taxonomy are shared.
#[derive(Clone)]
pub struct SqliteStore {
  conn:     tokio_rusqlite::Connection,
  taxonomy: Arc<Taxonomy>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_taxonomy(path, None).await
  }

  /// Open a store, replacing its persisted catalog with `taxonomy` when
  /// given. Without one, the default catalog is seeded into an empty
  /// `relationship_types` table and whatever the table holds is loaded.
  pub async fn open_with_taxonomy(
    path: impl AsRef<Path>,
    taxonomy: Option<Taxonomy>,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, taxonomy).await
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, None).await
  }

  async fn init(conn: tokio_rusqlite::Connection, seed: Option<Taxonomy>) -> Result<Self> {
    let definitions = conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        let tx = conn.transaction()?;
        match seed {
          Some(taxonomy) => query::replace_definitions(&tx, taxonomy.definitions())?,
          None if query::count_definitions(&tx)? == 0 => {
            query::replace_definitions(&tx, &default_catalog())?
          }
          None => {}
        }
        let definitions = query::load_definitions(&tx)?;
        tx.commit()?;
        Ok(definitions)
      })
      .await?;
    debug!(definitions = definitions.len(), "loaded relationship types");
    Ok(Self { conn, taxonomy: Arc::new(Taxonomy::new(definitions)) })
  }
}

fn log_rejection(op: &'static str, e: &Error) {
  match e.class() {
    ErrorClass::Transaction => warn!(op, error = %e, "store operation rolled back"),
    _ => warn!(op, error = %e, "store operation rejected"),
  }
}

// ─── FamilyStore impl ────────────────────────────────────────────────────────

impl FamilyStore for SqliteStore {
  type Error = Error;

  fn taxonomy(&self) -> &Taxonomy { &self.taxonomy }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        membership::check_new_person(&tx, &input)?;
        let gender = input.gender.unwrap_or(Gender::Other);
        let person = input.into_person(gender);
        query::insert_person(&tx, &person)?;
        tx.commit()?;
        Ok(person)
      })
      .await
      .map_err(Error::from)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    Ok(self.conn.call(move |conn| Ok(query::get_person(conn, id)?)).await?)
  }

  async fn find_person_by_email(&self, email: &str) -> Result<Option<Person>> {
    let email = email.trim().to_lowercase();
    Ok(
      self
        .conn
        .call(move |conn| Ok(query::find_person_by_email(conn, &email)?))
        .await?,
    )
  }

  async fn list_persons(&self) -> Result<Vec<Person>> {
    Ok(self.conn.call(|conn| Ok(query::list_persons(conn)?)).await?)
  }

  // ── Relationship store ────────────────────────────────────────────────────

  async fn create_direct_pair(&self, pair: DirectPair) -> Result<()> {
    pair.validate()?;
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        query::require_person(&tx, pair.forward.subject_id)?;
        query::require_person(&tx, pair.forward.related_id)?;
        query::insert_direct_pair(&tx, &pair)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    debug!("wrote direct pair");
    Ok(())
  }

  async fn create_indirect_pair(&self, pair: IndirectPair) -> Result<()> {
    pair.validate()?;
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        query::require_person(&tx, pair.forward.subject_id)?;
        query::require_person(&tx, pair.forward.related_id)?;
        query::insert_indirect_pair(&tx, &pair)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    debug!("wrote indirect pair");
    Ok(())
  }

  async fn remove_all_facts_involving(&self, id: Uuid) -> Result<usize> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          let removed = query::delete_facts_involving(&tx, id)?;
          tx.commit()?;
          Ok(removed)
        })
        .await?,
    )
  }

  async fn direct_facts(&self, subject_id: Uuid) -> Result<Vec<Related<DirectFact>>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(query::direct_relatives(conn, subject_id)?))
        .await?,
    )
  }

  async fn indirect_facts(&self, subject_id: Uuid) -> Result<Vec<Related<IndirectFact>>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(query::indirect_relatives(conn, subject_id)?))
        .await?,
    )
  }

  async fn direct_fact(&self, subject_id: Uuid, related_id: Uuid) -> Result<Option<DirectFact>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(query::direct_fact(conn, subject_id, related_id)?))
        .await?,
    )
  }

  async fn indirect_fact(
    &self,
    subject_id: Uuid,
    related_id: Uuid,
  ) -> Result<Option<IndirectFact>> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(query::indirect_fact(conn, subject_id, related_id)?))
        .await?,
    )
  }

  // ── Read models ───────────────────────────────────────────────────────────

  async fn get_tree(&self, subject_id: Uuid) -> Result<FamilyTree> {
    let (subject, direct, indirect) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let subject = query::require_person(&tx, subject_id)?;
        let direct = query::direct_relatives(&tx, subject_id)?;
        let indirect = query::indirect_relatives(&tx, subject_id)?;
        Ok((subject, direct, indirect))
      })
      .await?;
    Ok(TreeBuilder::new(&self.taxonomy).build(subject, direct, indirect))
  }

  async fn extended_tree(&self, subject_id: Uuid) -> Result<ExtendedTree> {
    let taxonomy = Arc::clone(&self.taxonomy);
    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          let tree = build_extended(&ConnGraph(&tx), &taxonomy, subject_id)?
            .ok_or(kindred_core::Error::PersonNotFound(subject_id))
            .map_err(Error::from)?;
          Ok(tree)
        })
        .await?,
    )
  }

  async fn graph(&self, subject_id: Uuid) -> Result<GraphView> {
    let tree = self.get_tree(subject_id).await?;
    Ok(project(&tree))
  }

  // ── Membership ────────────────────────────────────────────────────────────

  async fn add_member(
    &self,
    inviter_id: Uuid,
    kind: RelationshipKind,
    attributes: NewPerson,
  ) -> Result<Person> {
    let taxonomy = Arc::clone(&self.taxonomy);
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let plan = membership::add_member(&tx, &taxonomy, inviter_id, kind, attributes)?;
        tx.commit()?;
        Ok(plan)
      })
      .await
      .map_err(Error::from);

    match result {
      Ok(plan) => {
        info!(
          inviter = %inviter_id,
          member = %plan.person.person_id,
          %kind,
          relatives = plan.indirect.len().saturating_sub(1),
          "added family member"
        );
        Ok(plan.person)
      }
      Err(e) => {
        log_rejection("add_member", &e);
        Err(e)
      }
    }
  }

  async fn remove_member(&self, target_id: Uuid, requester_id: Uuid) -> Result<()> {
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let removed = membership::remove_member(&tx, target_id, requester_id)?;
        tx.commit()?;
        Ok(removed)
      })
      .await
      .map_err(Error::from);

    match result {
      Ok(removed) => {
        info!(member = %target_id, requester = %requester_id, facts = removed, "removed family member");
        Ok(())
      }
      Err(e) => {
        log_rejection("remove_member", &e);
        Err(e)
      }
    }
  }
}
