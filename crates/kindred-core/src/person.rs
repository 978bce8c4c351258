//! Person records and the attributes accepted when creating one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

/// A person's gender as recorded on their profile.
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
pub enum Gender {
  Male,
  Female,
  Other,
}

/// The direct-parent references of a person, i.e. the primitive parent-of edges
/// the extended tree walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRefs {
  pub father_id: Option<Uuid>,
  pub mother_id: Option<Uuid>,
}

impl ParentRefs {
  pub fn ids(&self) -> impl Iterator<Item = Uuid> {
    self.father_id.into_iter().chain(self.mother_id)
  }

  pub fn is_empty(&self) -> bool {
    self.father_id.is_none() && self.mother_id.is_none()
  }
}

/// A member of a family tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:     Uuid,
  pub first_name:    String,
  pub middle_name:   Option<String>,
  pub last_name:     String,
  /// Unique across the store when present; stored trimmed and lowercased.
  pub email:         Option<String>,
  pub gender:        Gender,
  pub date_of_birth: Option<NaiveDate>,
  pub father_id:     Option<Uuid>,
  pub mother_id:     Option<Uuid>,
  pub location:      Option<String>,
  pub is_deceased:   bool,
  /// Server-assigned timestamp.
  pub created_at:    DateTime<Utc>,
}

impl Person {
  pub fn parents(&self) -> ParentRefs {
    ParentRefs { father_id: self.father_id, mother_id: self.mother_id }
  }

  pub fn display_name(&self) -> String {
    match &self.middle_name {
      Some(middle) if !middle.is_empty() => {
        format!("{} {} {}", self.first_name, middle, self.last_name)
      }
      _ => format!("{} {}", self.first_name, self.last_name),
    }
  }
}

// ─── NewPerson ───────────────────────────────────────────────────────────────

/// Input to registration and to [`crate::store::FamilyStore::add_member`].
/// `person_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPerson {
  pub first_name:    String,
  #[serde(default)]
  pub middle_name:   Option<String>,
  pub last_name:     String,
  #[serde(default)]
  pub email:         Option<String>,
  /// May be omitted when the relationship kind implies one.
  #[serde(default)]
  pub gender:        Option<Gender>,
  #[serde(default)]
  pub date_of_birth: Option<NaiveDate>,
  #[serde(default)]
  pub father_id:     Option<Uuid>,
  #[serde(default)]
  pub mother_id:     Option<Uuid>,
  #[serde(default)]
  pub location:      Option<String>,
  #[serde(default)]
  pub is_deceased:   bool,
}

impl NewPerson {
  /// Convenience constructor with all optional fields empty.
  pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      ..Self::default()
    }
  }

  pub fn with_email(mut self, email: impl Into<String>) -> Self {
    self.email = Some(email.into());
    self
  }

  pub fn with_gender(mut self, gender: Gender) -> Self {
    self.gender = Some(gender);
    self
  }

  /// The email as it will be stored, or `None` if absent or blank.
  pub fn normalized_email(&self) -> Option<String> {
    self
      .email
      .as_deref()
      .map(str::trim)
      .filter(|e| !e.is_empty())
      .map(str::to_lowercase)
  }

  /// The referenced parent ids, which must name existing persons.
  pub fn parents(&self) -> ParentRefs {
    ParentRefs { father_id: self.father_id, mother_id: self.mother_id }
  }

  pub fn validate(&self) -> Result<()> {
    if self.first_name.trim().is_empty() {
      return Err(Error::Validation("first_name is required".into()));
    }
    if self.last_name.trim().is_empty() {
      return Err(Error::Validation("last_name is required".into()));
    }
    if let Some(email) = self.normalized_email()
      && !is_plausible_email(&email)
    {
      return Err(Error::Validation(format!("malformed email: {email:?}")));
    }
    if self.father_id.is_some() && self.father_id == self.mother_id {
      return Err(Error::Validation(
        "father_id and mother_id must differ".into(),
      ));
    }
    Ok(())
  }

  /// Build the persisted record. Call [`NewPerson::validate`] first.
  pub fn into_person(self, gender: Gender) -> Person {
    let email = self.normalized_email();
    Person {
      person_id: Uuid::new_v4(),
      first_name: self.first_name.trim().to_owned(),
      middle_name: self.middle_name.filter(|m| !m.trim().is_empty()),
      last_name: self.last_name.trim().to_owned(),
      email,
      gender,
      date_of_birth: self.date_of_birth,
      father_id: self.father_id,
      mother_id: self.mother_id,
      location: self.location,
      is_deceased: self.is_deceased,
      created_at: Utc::now(),
    }
  }
}

fn is_plausible_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && domain.contains('.') && !domain.contains('@')
    }
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_is_normalized() {
    let p = NewPerson::new("Ada", "Byron").with_email("  Ada@Example.COM ");
    assert_eq!(p.normalized_email().as_deref(), Some("ada@example.com"));
  }

  #[test]
  fn blank_email_is_treated_as_absent() {
    let p = NewPerson::new("Ada", "Byron").with_email("   ");
    assert!(p.normalized_email().is_none());
    assert!(p.validate().is_ok());
  }

  #[test]
  fn missing_names_fail_validation() {
    assert!(matches!(
      NewPerson::new(" ", "Byron").validate(),
      Err(Error::Validation(_))
    ));
    assert!(matches!(
      NewPerson::new("Ada", "").validate(),
      Err(Error::Validation(_))
    ));
  }

  #[test]
  fn malformed_email_fails_validation() {
    let p = NewPerson::new("Ada", "Byron").with_email("not-an-email");
    assert!(matches!(p.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn display_name_includes_middle_name() {
    let mut p = NewPerson::new("Ada", "Byron").into_person(Gender::Female);
    assert_eq!(p.display_name(), "Ada Byron");
    p.middle_name = Some("Augusta".into());
    assert_eq!(p.display_name(), "Ada Augusta Byron");
  }
}
