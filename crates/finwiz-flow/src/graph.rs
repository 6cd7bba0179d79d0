//! Stage dependency ordering

use crate::error::{FlowError, Result};
use std::collections::{HashMap, HashSet};

/// A named node and the nodes it runs after
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub after: Vec<String>,
}

impl Node {
    pub fn new(name: impl Into<String>, after: &[&str]) -> Self {
        Self {
            name: name.into(),
            after: after.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Indices of `nodes` in execution order.
///
/// Among stages whose dependencies are done, the one declared first runs
/// first, so independent stages keep their declaration order.
pub fn execution_order(nodes: &[Node]) -> Result<Vec<usize>> {
    let mut index = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if index.insert(node.name.as_str(), i).is_some() {
            return Err(FlowError::DuplicateStage(node.name.clone()));
        }
    }

    let mut pending = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        let unique: HashSet<&str> = node.after.iter().map(String::as_str).collect();
        for dependency in unique {
            let &d = index
                .get(dependency)
                .ok_or_else(|| FlowError::UnknownDependency {
                    stage: node.name.clone(),
                    dependency: dependency.to_string(),
                })?;
            pending[i] += 1;
            dependents[d].push(i);
        }
    }

    let mut done = vec![false; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    while order.len() < nodes.len() {
        let Some(next) = (0..nodes.len()).find(|&i| !done[i] && pending[i] == 0) else {
            let stuck = nodes
                .iter()
                .zip(&done)
                .filter(|(_, done)| !**done)
                .map(|(n, _)| n.name.clone())
                .collect();
            return Err(FlowError::Cycle(stuck));
        };
        done[next] = true;
        order.push(next);
        for &dependent in &dependents[next] {
            pending[dependent] -= 1;
        }
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(nodes: &[Node]) -> Vec<&str> {
        execution_order(nodes)
            .unwrap()
            .into_iter()
            .map(|i| nodes[i].name.as_str())
            .collect()
    }

    #[test]
    fn test_declaration_order_among_ready_stages() {
        let nodes = vec![
            Node::new("report", &["stock", "etf", "crypto"]),
            Node::new("stock", &[]),
            Node::new("etf", &["stock"]),
            Node::new("crypto", &["etf"]),
        ];
        assert_eq!(names(&nodes), vec!["stock", "etf", "crypto", "report"]);

        let independent = vec![Node::new("b", &[]), Node::new("a", &[]), Node::new("c", &["a"])];
        assert_eq!(names(&independent), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rejects_invalid_graphs() {
        let cycle = vec![
            Node::new("a", &["c"]),
            Node::new("b", &["a"]),
            Node::new("c", &["b"]),
            Node::new("d", &[]),
        ];
        match execution_order(&cycle) {
            Err(FlowError::Cycle(stages)) => assert_eq!(stages, vec!["a", "b", "c"]),
            other => panic!("expected cycle, got {other:?}"),
        }

        let unknown = vec![Node::new("a", &["ghost"])];
        assert!(matches!(
            execution_order(&unknown),
            Err(FlowError::UnknownDependency { .. })
        ));

        let duplicate = vec![Node::new("a", &[]), Node::new("a", &[])];
        assert!(matches!(
            execution_order(&duplicate),
            Err(FlowError::DuplicateStage(name)) if name == "a"
        ));

        let self_loop = vec![Node::new("a", &["a"])];
        assert!(matches!(execution_order(&self_loop), Err(FlowError::Cycle(_))));
    }

    #[test]
    fn test_repeated_dependency_counts_once() {
        let nodes = vec![Node::new("a", &[]), Node::new("b", &["a", "a"])];
        assert_eq!(names(&nodes), vec!["a", "b"]);
    }
}
