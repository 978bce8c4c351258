//! Projects a [`FamilyTree`] into a node/edge structure for graph renderers.
//! Layout is left entirely to the consumer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  person::{Gender, Person},
  tree::{FamilyTree, TreeEntry},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
  pub id:           Uuid,
  pub label:        String,
  pub gender:       Gender,
  /// `None` for the subject itself.
  pub relationship: Option<String>,
  pub level:        Option<i32>,
  pub is_subject:   bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
  pub source:       Uuid,
  pub target:       Uuid,
  pub relationship: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
  pub nodes: Vec<GraphNode>,
  pub edges: Vec<GraphEdge>,
}

fn node(person: &Person, entry: Option<&TreeEntry>) -> GraphNode {
  GraphNode {
    id:           person.person_id,
    label:        person.display_name(),
    gender:       person.gender,
    relationship: entry.map(|e| e.relationship.clone()),
    level:        entry.map_or(Some(0), |e| e.level),
    is_subject:   entry.is_none(),
  }
}

/// One node per member, one subject→member edge per entry, and a
/// parent→descendant edge for each recorded parent link.
pub fn project(tree: &FamilyTree) -> GraphView {
  let subject_id = tree.subject.person_id;
  let mut nodes = vec![node(&tree.subject, None)];
  let mut edges = Vec::new();
  let mut seen = HashSet::from([subject_id]);

  for entry in tree.entries() {
    let id = entry.user.person_id;
    if seen.insert(id) {
      nodes.push(node(&entry.user, Some(entry)));
    }
    edges.push(GraphEdge {
      source:       subject_id,
      target:       id,
      relationship: entry.relationship.clone(),
    });
    if let Some(link) = entry.parent_link {
      for parent in link.ids() {
        edges.push(GraphEdge {
          source:       parent,
          target:       id,
          relationship: "parent".into(),
        });
      }
    }
  }

  GraphView { nodes, edges }
}
