//! The kinship taxonomy: a catalog of relationship names keyed by signed
//! generation level, gender, subcategory and lineage, backed by a dynamic
//! generator that covers every level the catalog leaves out.
//!
//! Level sign convention: positive = the related person is an ancestor (1 =
//! parent, 2 = grandparent), negative = descendant, zero = same generation.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Result, person::Gender};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The gender a relationship name applies to.
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
pub enum LabelGender {
  Male,
  Female,
  #[strum(to_string = "neutral", serialize = "other")]
  #[serde(alias = "other")]
  Neutral,
}

impl From<Gender> for LabelGender {
  fn from(g: Gender) -> Self {
    match g {
      Gender::Male => Self::Male,
      Gender::Female => Self::Female,
      Gender::Other => Self::Neutral,
    }
  }
}

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
pub enum Category {
  /// Marriage or partnership.
  Direct,
  /// Any leveled kinship.
  Indirect,
}

/// Which variant of a relation applies. Never affects level arithmetic.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Subcategory {
  #[default]
  Blood,
  Marriage,
  Adoption,
  Step,
  Half,
}

/// The branch of the tree a relation runs along.
///
/// `Lineal` is the direct parent/child line; at level 0 it names siblings.
/// `Collateral` is the uncle/nephew/cousin line.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Lineage {
  #[default]
  Lineal,
  Collateral,
}

/// Everything that selects a relationship name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KinKey {
  pub level:       i32,
  pub gender:      LabelGender,
  pub subcategory: Subcategory,
  pub lineage:     Lineage,
}

impl KinKey {
  /// A blood relation on the direct line.
  pub fn lineal(level: i32, gender: impl Into<LabelGender>) -> Self {
    Self {
      level,
      gender: gender.into(),
      subcategory: Subcategory::Blood,
      lineage: Lineage::Lineal,
    }
  }

  pub fn collateral(level: i32, gender: impl Into<LabelGender>) -> Self {
    Self { lineage: Lineage::Collateral, ..Self::lineal(level, gender) }
  }

  pub fn with_subcategory(self, subcategory: Subcategory) -> Self {
    Self { subcategory, ..self }
  }

  /// The same relation seen from the other party, who has `gender`.
  pub fn reversed(self, gender: impl Into<LabelGender>) -> Self {
    Self { level: -self.level, gender: gender.into(), ..self }
  }
}

// ─── Definitions ─────────────────────────────────────────────────────────────

/// One catalog entry. Several entries may share a level; gender, subcategory
/// and lineage disambiguate, and `sort_order` breaks any remaining tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipTypeDefinition {
  pub name:            String,
  pub level:           i32,
  pub gender:          LabelGender,
  pub category:        Category,
  pub subcategory:     Subcategory,
  #[serde(default)]
  pub lineage:         Lineage,
  /// The gender-neutral name of the reverse relation.
  pub reciprocal_name: String,
  #[serde(default = "default_active")]
  pub is_active:       bool,
  #[serde(default)]
  pub sort_order:      i32,
}

fn default_active() -> bool { true }

impl RelationshipTypeDefinition {
  pub fn key(&self) -> KinKey {
    KinKey {
      level:       self.level,
      gender:      self.gender,
      subcategory: self.subcategory,
      lineage:     self.lineage,
    }
  }
}

// ─── Taxonomy ────────────────────────────────────────────────────────────────

/// The immutable catalog plus the dynamic generation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
  definitions: Vec<RelationshipTypeDefinition>,
}

impl Default for Taxonomy {
  fn default() -> Self { Self::new(default_catalog()) }
}

impl Taxonomy {
  pub fn new(definitions: Vec<RelationshipTypeDefinition>) -> Self {
    Self { definitions }
  }

  /// Parse a catalog from a JSON array of definitions.
  pub fn from_json(json: &str) -> Result<Self> {
    Ok(Self::new(serde_json::from_str(json)?))
  }

  pub fn definitions(&self) -> &[RelationshipTypeDefinition] {
    &self.definitions
  }

  pub fn definition(&self, name: &str) -> Option<&RelationshipTypeDefinition> {
    self.definitions.iter().find(|d| d.name == name)
  }

  /// Catalog-only lookup of an indirect relation; `None` when no active
  /// entry matches.
  pub fn lookup(&self, key: KinKey) -> Option<&RelationshipTypeDefinition> {
    self
      .definitions
      .iter()
      .filter(|d| {
        d.is_active
          && d.category == Category::Indirect
          && d.level == key.level
          && d.subcategory == key.subcategory
          && d.lineage == key.lineage
          && (d.gender == key.gender || d.gender == LabelGender::Neutral)
      })
      .min_by_key(|d| (d.gender != key.gender, d.sort_order))
  }

  /// The name for `key`. Total: falls through to dynamic generation.
  pub fn resolve(&self, key: KinKey) -> String {
    self
      .lookup(key)
      .map(|d| d.name.clone())
      .unwrap_or_else(|| generate(key))
  }

  /// Blood relation on the direct line; `resolve_label(4, Male)` is
  /// `"great-great-grandfather"`.
  pub fn resolve_label(&self, level: i32, gender: LabelGender) -> String {
    self.resolve(KinKey::lineal(level, gender))
  }

  /// The gendered reciprocal of a named relation, seen by a party of
  /// `gender`. `None` when `name` is not in the catalog.
  pub fn reciprocal_of(&self, name: &str, gender: LabelGender) -> Option<String> {
    let def = self.definition(name)?;
    Some(match def.category {
      Category::Direct if def.gender == LabelGender::Neutral => def.reciprocal_name.clone(),
      Category::Direct => direct_name(gender).to_owned(),
      Category::Indirect => self.resolve(def.key().reversed(gender)),
    })
  }
}

fn direct_name(gender: LabelGender) -> &'static str {
  match gender {
    LabelGender::Male => "husband",
    LabelGender::Female => "wife",
    LabelGender::Neutral => "partner",
  }
}

// ─── Dynamic generation ──────────────────────────────────────────────────────

/// `(male, female, neutral)`.
type Terms = (&'static str, &'static str, &'static str);

fn pick(terms: Terms, gender: LabelGender) -> &'static str {
  match gender {
    LabelGender::Male => terms.0,
    LabelGender::Female => terms.1,
    LabelGender::Neutral => terms.2,
  }
}

/// `near` at distance 1, `far` at 2, and `great-` repeated `distance - 2`
/// times onto `far` beyond that.
fn graded(distance: u32, near: Terms, far: Terms, gender: LabelGender) -> String {
  match distance {
    0 | 1 => pick(near, gender).to_owned(),
    n => format!("{}{}", "great-".repeat((n - 2) as usize), pick(far, gender)),
  }
}

fn blood_term(level: i32, lineage: Lineage, gender: LabelGender) -> String {
  let up = level > 0;
  let distance = level.unsigned_abs();
  match (lineage, level) {
    (Lineage::Lineal, 0) => pick(("brother", "sister", "sibling"), gender).into(),
    (Lineage::Collateral, 0) => "cousin".into(),
    (Lineage::Lineal, _) if up => graded(
      distance,
      ("father", "mother", "parent"),
      ("grandfather", "grandmother", "grandparent"),
      gender,
    ),
    (Lineage::Lineal, _) => graded(
      distance,
      ("son", "daughter", "child"),
      ("grandson", "granddaughter", "grandchild"),
      gender,
    ),
    (Lineage::Collateral, _) if up => graded(
      distance,
      ("uncle", "aunt", "pibling"),
      ("granduncle", "grandaunt", "grandpibling"),
      gender,
    ),
    (Lineage::Collateral, _) => graded(
      distance,
      ("nephew", "niece", "nibling"),
      ("grandnephew", "grandniece", "grandnibling"),
      gender,
    ),
  }
}

/// Generate a name for any key without consulting the catalog.
pub fn generate(key: KinKey) -> String {
  let blood = blood_term(key.level, key.lineage, key.gender);
  match key.subcategory {
    Subcategory::Blood => blood,
    Subcategory::Step => format!("step-{blood}"),
    Subcategory::Half => format!("half-{blood}"),
    Subcategory::Adoption if key.level > 0 => format!("adoptive {blood}"),
    Subcategory::Adoption => format!("adopted {blood}"),
    Subcategory::Marriage => format!("{blood}-in-law"),
  }
}

// ─── Default catalog ─────────────────────────────────────────────────────────

struct Seed {
  level:       i32,
  subcategory: Subcategory,
  lineage:     Lineage,
  names:       Terms,
}

const SEEDS: &[Seed] = &[
  seed(3, Subcategory::Blood, Lineage::Lineal, ("great-grandfather", "great-grandmother", "great-grandparent")),
  seed(2, Subcategory::Blood, Lineage::Lineal, ("grandfather", "grandmother", "grandparent")),
  seed(1, Subcategory::Blood, Lineage::Lineal, ("father", "mother", "parent")),
  seed(0, Subcategory::Blood, Lineage::Lineal, ("brother", "sister", "sibling")),
  seed(-1, Subcategory::Blood, Lineage::Lineal, ("son", "daughter", "child")),
  seed(-2, Subcategory::Blood, Lineage::Lineal, ("grandson", "granddaughter", "grandchild")),
  seed(-3, Subcategory::Blood, Lineage::Lineal, ("great-grandson", "great-granddaughter", "great-grandchild")),
  seed(2, Subcategory::Blood, Lineage::Collateral, ("granduncle", "grandaunt", "grandpibling")),
  seed(1, Subcategory::Blood, Lineage::Collateral, ("uncle", "aunt", "pibling")),
  seed(-1, Subcategory::Blood, Lineage::Collateral, ("nephew", "niece", "nibling")),
  seed(-2, Subcategory::Blood, Lineage::Collateral, ("grandnephew", "grandniece", "grandnibling")),
  seed(1, Subcategory::Step, Lineage::Lineal, ("stepfather", "stepmother", "stepparent")),
  seed(0, Subcategory::Step, Lineage::Lineal, ("stepbrother", "stepsister", "stepsibling")),
  seed(-1, Subcategory::Step, Lineage::Lineal, ("stepson", "stepdaughter", "stepchild")),
  seed(1, Subcategory::Adoption, Lineage::Lineal, ("adoptive father", "adoptive mother", "adoptive parent")),
  seed(-1, Subcategory::Adoption, Lineage::Lineal, ("adopted son", "adopted daughter", "adopted child")),
  seed(0, Subcategory::Half, Lineage::Lineal, ("half-brother", "half-sister", "half-sibling")),
  seed(1, Subcategory::Marriage, Lineage::Lineal, ("father-in-law", "mother-in-law", "parent-in-law")),
  seed(0, Subcategory::Marriage, Lineage::Lineal, ("brother-in-law", "sister-in-law", "sibling-in-law")),
  seed(-1, Subcategory::Marriage, Lineage::Lineal, ("son-in-law", "daughter-in-law", "child-in-law")),
];

const fn seed(level: i32, subcategory: Subcategory, lineage: Lineage, names: Terms) -> Seed {
  Seed { level, subcategory, lineage, names }
}

/// The catalog shipped with the engine.
pub fn default_catalog() -> Vec<RelationshipTypeDefinition> {
  let genders = [LabelGender::Male, LabelGender::Female, LabelGender::Neutral];
  let mut defs = Vec::new();
  let mut sort_order = 0;

  for gender in [LabelGender::Male, LabelGender::Female] {
    sort_order += 1;
    defs.push(RelationshipTypeDefinition {
      name: direct_name(gender).to_owned(),
      level: 0,
      gender,
      category: Category::Direct,
      subcategory: Subcategory::Marriage,
      lineage: Lineage::Lineal,
      reciprocal_name: "partner".into(),
      is_active: true,
      sort_order,
    });
  }
  defs.push(RelationshipTypeDefinition {
    name: "partner".into(),
    level: 0,
    gender: LabelGender::Neutral,
    category: Category::Direct,
    subcategory: Subcategory::Marriage,
    lineage: Lineage::Lineal,
    reciprocal_name: "partner".into(),
    is_active: true,
    sort_order: sort_order + 1,
  });

  for s in SEEDS {
    for gender in genders {
      sort_order += 10;
      defs.push(RelationshipTypeDefinition {
        name: pick(s.names, gender).to_owned(),
        level: s.level,
        gender,
        category: Category::Indirect,
        subcategory: s.subcategory,
        lineage: s.lineage,
        reciprocal_name: String::new(),
        is_active: true,
        sort_order,
      });
    }
  }

  // The cousin entry is shared by all genders.
  defs.push(RelationshipTypeDefinition {
    name: "cousin".into(),
    level: 0,
    gender: LabelGender::Neutral,
    category: Category::Indirect,
    subcategory: Subcategory::Blood,
    lineage: Lineage::Collateral,
    reciprocal_name: "cousin".into(),
    is_active: true,
    sort_order: sort_order + 10,
  });

  let partial = Taxonomy::new(defs);
  partial
    .definitions
    .iter()
    .map(|d| match d.category {
      Category::Direct => d.clone(),
      Category::Indirect => RelationshipTypeDefinition {
        reciprocal_name: partial.resolve(d.key().reversed(LabelGender::Neutral)),
        ..d.clone()
      },
    })
    .collect()
}
