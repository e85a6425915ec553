//! Generic topological scheduling.
//!
//! [`topological_sort`] orders any finite node set given a function that maps
//! each node to the nodes it depends on. It is used twice when computing a
//! build order: once over rules and once over variants.
//!
//! The sort is Kahn's algorithm with a FIFO ready queue. The queue is seeded
//! in input order and dependents are released in input order, so the same
//! input always yields the same output.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;
use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use tracing::warn;

/// The nodes could not all be ordered because some of them form a cycle.
///
/// `members` holds one strongly connected component of the nodes left
/// unscheduled, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError<N> {
  members: Vec<N>,
}

impl<N> CycleError<N> {
  pub fn members(&self) -> &[N] {
    &self.members
  }

  pub fn into_members(self) -> Vec<N> {
    self.members
  }

  pub fn map<M>(self, f: impl FnMut(N) -> M) -> CycleError<M> {
    CycleError {
      members: self.members.into_iter().map(f).collect(),
    }
  }
}

impl<N: fmt::Display> fmt::Display for CycleError<N> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("dependency cycle detected")?;
    for (idx, member) in self.members.iter().enumerate() {
      let sep = if idx == 0 { ": " } else { ", " };
      write!(f, "{}{}", sep, member)?;
    }
    Ok(())
  }
}

impl<N: fmt::Debug + fmt::Display> std::error::Error for CycleError<N> {}

/// Order `nodes` so that every node comes after the nodes it depends on.
///
/// `neighbors` returns what a node depends on. Self-references are ignored,
/// as are neighbors that are not part of `nodes`. Repeated input nodes count
/// once, at their first position.
///
/// # Errors
///
/// Returns [`CycleError`] when fewer nodes can be ordered than were given,
/// which happens exactly when the dependency relation has a cycle.
pub fn topological_sort<N, I, F>(nodes: impl IntoIterator<Item = N>, mut neighbors: F) -> Result<Vec<N>, CycleError<N>>
where
  N: Clone + Eq + Hash,
  F: FnMut(&N) -> I,
  I: IntoIterator<Item = N>,
{
  let nodes: IndexSet<N> = nodes.into_iter().collect();
  let count = nodes.len();

  let mut pending = vec![0usize; count];
  let mut depends_on: Vec<Vec<usize>> = vec![Vec::new(); count];
  let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];

  for (idx, node) in nodes.iter().enumerate() {
    let mut seen = HashSet::new();
    for neighbor in neighbors(node) {
      let Some(dep) = nodes.get_index_of(&neighbor) else {
        continue;
      };
      if dep == idx || !seen.insert(dep) {
        continue;
      }
      pending[idx] += 1;
      depends_on[idx].push(dep);
      dependents[dep].push(idx);
    }
  }

  let mut ready: VecDeque<usize> = (0..count).filter(|&idx| pending[idx] == 0).collect();
  let mut sorted = Vec::with_capacity(count);

  while let Some(idx) = ready.pop_front() {
    sorted.push(idx);
    for &dependent in &dependents[idx] {
      pending[dependent] -= 1;
      if pending[dependent] == 0 {
        ready.push_back(dependent);
      }
    }
  }

  if sorted.len() != count {
    let members = cycle_members(&pending, &depends_on);
    warn!(
      unscheduled = count - sorted.len(),
      cycle_len = members.len(),
      "dependency cycle detected"
    );
    return Err(CycleError {
      members: members.into_iter().map(|idx| nodes[idx].clone()).collect(),
    });
  }

  Ok(sorted.into_iter().map(|idx| nodes[idx].clone()).collect())
}

/// Pick the strongly connected component among unscheduled nodes that
/// contains the earliest input node.
fn cycle_members(pending: &[usize], depends_on: &[Vec<usize>]) -> Vec<usize> {
  let stuck: Vec<usize> = (0..pending.len()).filter(|&idx| pending[idx] > 0).collect();

  let mut graph = DiGraph::<usize, ()>::new();
  let mut index = HashMap::new();
  for &idx in &stuck {
    index.insert(idx, graph.add_node(idx));
  }
  for &idx in &stuck {
    for dep in &depends_on[idx] {
      if let Some(&from) = index.get(dep) {
        graph.add_edge(from, index[&idx], ());
      }
    }
  }

  tarjan_scc(&graph)
    .into_iter()
    .filter(|component| component.len() > 1)
    .map(|component| {
      let mut members: Vec<usize> = component.into_iter().map(|node| graph[node]).collect();
      members.sort_unstable();
      members
    })
    .min_by_key(|members| members[0])
    .unwrap_or(stuck)
}
