//! The closed set of relationship kinds a member can be added as.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  Error, Result,
  fact::DirectType,
  person::Gender,
  taxonomy::{Category, Subcategory},
};

/// What the new member is to the inviter.
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
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelationshipKind {
  Father,
  Mother,
  Son,
  Daughter,
  Brother,
  Sister,
  Husband,
  Wife,
  Partner,
  Stepfather,
  Stepmother,
  Stepson,
  Stepdaughter,
  Stepbrother,
  Stepsister,
  AdoptiveFather,
  AdoptiveMother,
  AdoptedSon,
  AdoptedDaughter,
  HalfBrother,
  HalfSister,
}

/// How a kind is wired into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addition {
  /// Married/partnered to the inviter; never propagates.
  Direct(DirectType),
  /// `level` is the new member's generation relative to the inviter.
  Indirect { level: i32, subcategory: Subcategory },
}

/// One row of the kind table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
  pub category:    Category,
  pub addition:    Addition,
  /// The gender the new member must have, if the kind implies one.
  pub gender:      Option<Gender>,
}

impl RelationshipKind {
  pub fn spec(self) -> KindSpec {
    use Gender::{Female as F, Male as M};
    use RelationshipKind as K;
    use Subcategory::{Adoption, Blood, Half, Step};

    let (addition, gender) = match self {
      K::Husband => (Addition::Direct(DirectType::Husband), Some(M)),
      K::Wife => (Addition::Direct(DirectType::Wife), Some(F)),
      K::Partner => (Addition::Direct(DirectType::Partner), None),
      K::Father => (indirect(1, Blood), Some(M)),
      K::Mother => (indirect(1, Blood), Some(F)),
      K::Son => (indirect(-1, Blood), Some(M)),
      K::Daughter => (indirect(-1, Blood), Some(F)),
      K::Brother => (indirect(0, Blood), Some(M)),
      K::Sister => (indirect(0, Blood), Some(F)),
      K::Stepfather => (indirect(1, Step), Some(M)),
      K::Stepmother => (indirect(1, Step), Some(F)),
      K::Stepson => (indirect(-1, Step), Some(M)),
      K::Stepdaughter => (indirect(-1, Step), Some(F)),
      K::Stepbrother => (indirect(0, Step), Some(M)),
      K::Stepsister => (indirect(0, Step), Some(F)),
      K::AdoptiveFather => (indirect(1, Adoption), Some(M)),
      K::AdoptiveMother => (indirect(1, Adoption), Some(F)),
      K::AdoptedSon => (indirect(-1, Adoption), Some(M)),
      K::AdoptedDaughter => (indirect(-1, Adoption), Some(F)),
      K::HalfBrother => (indirect(0, Half), Some(M)),
      K::HalfSister => (indirect(0, Half), Some(F)),
    };
    let category = match addition {
      Addition::Direct(_) => Category::Direct,
      Addition::Indirect { .. } => Category::Indirect,
    };
    KindSpec { category, addition, gender }
  }

  /// Parse a relationship-type string; unknown strings are a validation
  /// failure.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s.trim()).map_err(|_| Error::UnknownRelationshipType(s.to_owned()))
  }

  /// The gender the new member will have, given what the caller supplied.
  pub fn resolve_gender(self, supplied: Option<Gender>) -> Result<Gender> {
    match (self.spec().gender, supplied) {
      (Some(required), Some(given)) if required != given => Err(Error::Validation(format!(
        "a {self} must have gender {required}, got {given}"
      ))),
      (Some(required), _) => Ok(required),
      (None, Some(given)) => Ok(given),
      (None, None) => Ok(Gender::Other),
    }
  }
}

const fn indirect(level: i32, subcategory: Subcategory) -> Addition {
  Addition::Indirect { level, subcategory }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn every_kind_parses_from_its_name() {
    for kind in RelationshipKind::iter() {
      assert_eq!(RelationshipKind::parse(kind.as_ref()).unwrap(), kind);
    }
    assert_eq!(RelationshipKind::parse("adoptive_father").unwrap(), RelationshipKind::AdoptiveFather);
    assert_eq!(RelationshipKind::parse(" stepson ").unwrap(), RelationshipKind::Stepson);
  }

  #[test]
  fn unknown_kind_is_a_validation_error() {
    assert!(matches!(
      RelationshipKind::parse("second_cousin_twice_removed"),
      Err(Error::UnknownRelationshipType(_))
    ));
  }

  #[test]
  fn spouses_are_direct() {
    for kind in [RelationshipKind::Husband, RelationshipKind::Wife, RelationshipKind::Partner] {
      assert_eq!(kind.spec().category, Category::Direct);
    }
  }

  #[test]
  fn levels_follow_generation() {
    let level = |k: RelationshipKind| match k.spec().addition {
      Addition::Indirect { level, .. } => level,
      Addition::Direct(_) => panic!("{k} is direct"),
    };
    assert_eq!(level(RelationshipKind::Mother), 1);
    assert_eq!(level(RelationshipKind::AdoptedSon), -1);
    assert_eq!(level(RelationshipKind::HalfSister), 0);
    assert_eq!(level(RelationshipKind::Stepfather), 1);
  }

  #[test]
  fn gender_requirement_is_enforced() {
    assert_eq!(RelationshipKind::Father.resolve_gender(None).unwrap(), Gender::Male);
    assert!(RelationshipKind::Father.resolve_gender(Some(Gender::Female)).is_err());
    assert_eq!(RelationshipKind::Partner.resolve_gender(None).unwrap(), Gender::Other);
    assert_eq!(
      RelationshipKind::Partner.resolve_gender(Some(Gender::Female)).unwrap(),
      Gender::Female
    );
  }
}
