//! Prefix trie over package paths.
//!
//! Nodes live in an arena and refer to each other by index, which lets an
//! inserted package adopt existing subtrees without juggling ownership. Every
//! node except the root carries the package it represents and the value
//! attached to it. Edges are keyed by the path suffix from the parent node
//! (`b/c` on the edge from `a` to `a/b/c`).
//!
//! Matching is by whole path components: `a/b` is a prefix of `a/b/c` but
//! not of `a/bc`. Siblings are never prefixes of each other, so a lookup
//! descends along at most one edge per level.

use thiserror::Error;
use tracing::trace;

use crate::label::PackageName;

/// Errors raised by trie insertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
  /// The package is already present with a different value.
  #[error("overwrite package: {0}")]
  DuplicateKey(PackageName),
}

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
struct Node<V> {
  entry: Option<(PackageName, V)>,
  edges: Vec<(String, NodeId)>,
}

impl<V> Node<V> {
  fn empty() -> Self {
    Self {
      entry: None,
      edges: Vec::new(),
    }
  }
}

enum Step {
  Exact(NodeId),
  Descend(NodeId),
  Attach { adopted: Vec<usize> },
}

/// A mapping from package paths to values with longest-prefix lookup.
#[derive(Debug, Clone)]
pub struct PackageTrie<V> {
  nodes: Vec<Node<V>>,
  /// Non-root node ids in insertion order.
  inserted: Vec<NodeId>,
}

impl<V> Default for PackageTrie<V> {
  fn default() -> Self {
    Self {
      nodes: vec![Node::empty()],
      inserted: Vec::new(),
    }
  }
}

impl<V> PackageTrie<V> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.inserted.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inserted.is_empty()
  }

  /// Insert `value` for `package`.
  ///
  /// Descending from the root, each child is compared against `package`:
  /// - the child path equals `package`: the entry is already present, and
  ///   re-inserting an equal value is a no-op while a different value is a
  ///   [`TrieError::DuplicateKey`];
  /// - the child path is a prefix of `package`: descend into the child;
  /// - `package` is a prefix of the child path: the new node is inserted
  ///   between, adopting every such child under a shortened suffix.
  ///
  /// The resulting shape does not depend on the order of insertion.
  pub fn insert(&mut self, package: &PackageName, value: V) -> Result<(), TrieError>
  where
    V: PartialEq,
  {
    let target = package.as_str();
    let mut node = ROOT;

    loop {
      let step = self.step_towards(node, target);
      match step {
        Step::Exact(child) => return self.merge(child, package, value),
        Step::Descend(child) => {
          trace!(package = %package, via = %self.node_path(child), "descending");
          node = child;
        }
        Step::Attach { adopted } => {
          self.attach(node, package, value, adopted);
          return Ok(());
        }
      }
    }
  }

  fn step_towards(&self, node: NodeId, target: &str) -> Step {
    let path = self.node_path(node);
    let mut adopted = Vec::new();

    for (idx, (suffix, child)) in self.nodes[node].edges.iter().enumerate() {
      let child_path = join(path, suffix);
      if child_path == target {
        return Step::Exact(*child);
      }
      if is_path_prefix(&child_path, target) {
        return Step::Descend(*child);
      }
      if is_path_prefix(target, &child_path) {
        adopted.push(idx);
      }
    }

    Step::Attach { adopted }
  }

  fn merge(&mut self, node: NodeId, package: &PackageName, value: V) -> Result<(), TrieError>
  where
    V: PartialEq,
  {
    match &self.nodes[node].entry {
      Some((_, existing)) if *existing == value => Ok(()),
      Some(_) => Err(TrieError::DuplicateKey(package.clone())),
      None => {
        self.nodes[node].entry = Some((package.clone(), value));
        self.inserted.push(node);
        Ok(())
      }
    }
  }

  fn attach(&mut self, parent: NodeId, package: &PackageName, value: V, adopted: Vec<usize>) {
    let target = package.as_str();
    let parent_suffix = suffix_after(self.node_path(parent), target).to_string();
    let mut node = Node {
      entry: Some((package.clone(), value)),
      edges: Vec::new(),
    };

    // Remove from the back so the remaining indices stay valid.
    for idx in adopted.into_iter().rev() {
      let (_, child) = self.nodes[parent].edges.remove(idx);
      let suffix = suffix_after(target, self.node_path(child)).to_string();
      trace!(package = %package, adopted = %self.node_path(child), "splitting edge");
      node.edges.push((suffix, child));
    }
    node.edges.reverse();

    let id = self.nodes.len();
    self.nodes.push(node);
    self.nodes[parent].edges.push((parent_suffix, id));
    self.inserted.push(id);
  }

  /// Find the most specific inserted package that is `package` or one of its
  /// ancestors. Returns `None` when no inserted package matches.
  pub fn search(&self, package: &PackageName) -> Option<(&PackageName, &V)> {
    let target = package.as_str();
    let mut node = ROOT;

    'descend: loop {
      let path = self.node_path(node);
      for (suffix, child) in &self.nodes[node].edges {
        if is_path_prefix(&join(path, suffix), target) {
          node = *child;
          continue 'descend;
        }
      }
      break;
    }

    self.nodes[node].entry.as_ref().map(|(name, value)| (name, value))
  }

  /// Exact lookup.
  pub fn get(&self, package: &PackageName) -> Option<&V> {
    self
      .search(package)
      .and_then(|(name, value)| (name == package).then_some(value))
  }

  pub fn contains(&self, package: &PackageName) -> bool {
    self.get(package).is_some()
  }

  /// Entries in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &V)> {
    self
      .inserted
      .iter()
      .filter_map(|&id| self.nodes[id].entry.as_ref().map(|(name, value)| (name, value)))
  }

  fn node_path(&self, node: NodeId) -> &str {
    self.nodes[node].entry.as_ref().map_or("", |(name, _)| name.as_str())
  }
}

fn join(parent: &str, suffix: &str) -> String {
  if parent.is_empty() {
    suffix.to_string()
  } else {
    format!("{}/{}", parent, suffix)
  }
}

fn is_path_prefix(prefix: &str, path: &str) -> bool {
  if prefix.is_empty() {
    return true;
  }
  match path.strip_prefix(prefix) {
    Some(rest) => rest.is_empty() || rest.starts_with('/'),
    None => false,
  }
}

/// `path` with the leading `prefix/` removed. `prefix` must be a path prefix.
fn suffix_after<'a>(prefix: &str, path: &'a str) -> &'a str {
  let rest = &path[prefix.len()..];
  rest.strip_prefix('/').unwrap_or(rest)
}
