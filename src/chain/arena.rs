//! Arena of nodes addressed by [`NodeId`].
//!
//! Each node stores only the id of its upstream, so the arena owns every node
//! and links never form ownership cycles. Link-level cycles are rejected by
//! [`Chain::link`] and [`Chain::link_many`].

use std::fmt;

use tracing::{debug, trace};

use super::{ChainError, Node, Transform};

/// Stable index of a node inside the [`Chain`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub struct Chain<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T: Clone + Default> Chain<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unlinked node. `None` makes it a pass-through.
    pub fn add(&mut self, label: impl Into<String>, transform: Option<Transform<T>>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(label, transform));
        id
    }

    pub fn node(&mut self, label: impl Into<String>, f: impl Fn(T) -> T + 'static) -> NodeId {
        self.add(label, Some(Box::new(f)))
    }

    pub fn passthrough(&mut self, label: impl Into<String>) -> NodeId {
        self.add(label, None)
    }

    /// Set `node`'s upstream, replacing any previous link.
    ///
    /// Fails without touching the chain if the link would make `node` reachable
    /// from itself.
    pub fn link(&mut self, node: NodeId, upstream: NodeId) -> Result<(), ChainError> {
        let label = self.get(node)?.label();
        let upstream_label = self.get(upstream)?.label();
        if node == upstream {
            return Err(ChainError::SelfLink(label.to_string()));
        }
        debug!(node = %label, upstream = %upstream_label, "linking");

        // The chain is acyclic before this call, so the walk ends at a head.
        let mut cursor = Some(upstream);
        while let Some(id) = cursor {
            if id == node {
                let previous = self.get(node)?.upstream();
                self.get_mut(node)?.set_upstream(Some(upstream));
                let path = self.cycle_path(node);
                self.get_mut(node)?.set_upstream(previous);
                return Err(ChainError::Cycle { path });
            }
            cursor = self.get(id)?.upstream();
        }

        self.get_mut(node)?.set_upstream(Some(upstream));
        Ok(())
    }

    /// Apply `(node, upstream)` links as one batch, checking acyclicity once
    /// over the whole chain.
    ///
    /// Either every link is applied or none is.
    pub fn link_many(&mut self, links: &[(NodeId, NodeId)]) -> Result<(), ChainError> {
        for &(node, upstream) in links {
            let label = self.get(node)?.label();
            self.get(upstream)?;
            if node == upstream {
                return Err(ChainError::SelfLink(label.to_string()));
            }
        }

        let mut previous = Vec::with_capacity(links.len());
        for &(node, upstream) in links {
            let current = self.get_mut(node)?;
            previous.push((node, current.upstream()));
            current.set_upstream(Some(upstream));
        }

        if let Some(start) = self.find_cycle() {
            let path = self.cycle_path(start);
            for (node, upstream) in previous.into_iter().rev() {
                self.get_mut(node)?.set_upstream(upstream);
            }
            return Err(ChainError::Cycle { path });
        }

        debug!(links = links.len(), "linked batch");
        Ok(())
    }

    /// Link `ids` head first: every node takes the previous one as upstream.
    pub fn pipeline(&mut self, ids: &[NodeId]) -> Result<(), ChainError> {
        let links: Vec<(NodeId, NodeId)> = ids.windows(2).map(|pair| (pair[1], pair[0])).collect();
        self.link_many(&links)
    }

    /// Drop `node`'s upstream, making it a chain head.
    pub fn unlink(&mut self, node: NodeId) -> Result<Option<NodeId>, ChainError> {
        let node = self.get_mut(node)?;
        let previous = node.upstream();
        node.set_upstream(None);
        Ok(previous)
    }

    /// Seed a node's input. Overwritten on `eval` if the node has an upstream.
    pub fn assign(&mut self, node: NodeId, value: T) -> Result<(), ChainError> {
        self.get_mut(node)?.assign(value);
        Ok(())
    }

    pub fn run(&mut self, node: NodeId) -> Result<(), ChainError> {
        self.get_mut(node)?.run();
        Ok(())
    }

    /// Replace `node`'s transform. `None` turns it into a pass-through.
    ///
    /// Outputs are not recomputed until the next `run` or `eval`.
    pub fn set_transform(
        &mut self,
        node: NodeId,
        transform: Option<Transform<T>>,
    ) -> Result<(), ChainError> {
        self.get_mut(node)?.set_transform(transform);
        Ok(())
    }

    /// Evaluate the upstream prefix of `node` depth-first, then `node` itself.
    ///
    /// Nothing is cached: every call re-runs the whole prefix. Nodes
    /// downstream of `node` are never touched.
    pub fn eval(&mut self, node: NodeId) -> Result<T, ChainError> {
        if let Some(upstream) = self.get(node)?.upstream() {
            let value = self.eval(upstream)?;
            self.get_mut(node)?.assign(value);
        }
        let current = self.get_mut(node)?;
        current.run();
        trace!(node = %current.label(), "evaluated");
        Ok(current.output().clone())
    }
}

impl<T> Chain<T> {
    pub fn get(&self, node: NodeId) -> Result<&Node<T>, ChainError> {
        self.nodes.get(node.0).ok_or(ChainError::UnknownNode(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut Node<T>, ChainError> {
        self.nodes.get_mut(node.0).ok_or(ChainError::UnknownNode(node))
    }

    pub fn label(&self, node: NodeId) -> Result<&str, ChainError> {
        Ok(self.get(node)?.label())
    }

    pub fn input(&self, node: NodeId) -> Result<&T, ChainError> {
        Ok(self.get(node)?.input())
    }

    pub fn output(&self, node: NodeId) -> Result<&T, ChainError> {
        Ok(self.get(node)?.output())
    }

    pub fn upstream(&self, node: NodeId) -> Result<Option<NodeId>, ChainError> {
        Ok(self.get(node)?.upstream())
    }

    /// Follow upstream links until a node without one.
    pub fn head_of(&self, node: NodeId) -> Result<NodeId, ChainError> {
        let mut current = node;
        while let Some(up) = self.get(current)?.upstream() {
            current = up;
        }
        Ok(current)
    }

    /// Number of links between `node` and its chain head (recursion depth of `eval`).
    pub fn depth(&self, node: NodeId) -> Result<usize, ChainError> {
        let mut depth = 0;
        let mut current = node;
        while let Some(up) = self.get(current)?.upstream() {
            current = up;
            depth += 1;
        }
        Ok(depth)
    }

    /// Some node on a cycle, if the links contain one.
    ///
    /// Every node is walked at most once: walks stop at nodes already proven
    /// to reach a head.
    fn find_cycle(&self) -> Option<NodeId> {
        #[derive(Copy, Clone, PartialEq, Eq)]
        enum Mark {
            Unseen,
            Temp,
            Perm,
        }

        let mut marks = vec![Mark::Unseen; self.nodes.len()];
        let mut walk = Vec::new();
        for start in 0..self.nodes.len() {
            walk.clear();
            let mut cursor = Some(start);
            while let Some(i) = cursor {
                match marks[i] {
                    Mark::Perm => break,
                    Mark::Temp => return Some(NodeId(i)),
                    Mark::Unseen => {
                        marks[i] = Mark::Temp;
                        walk.push(i);
                        cursor = self.nodes[i].upstream().map(|id| id.0);
                    }
                }
            }
            for &i in &walk {
                marks[i] = Mark::Perm;
            }
        }
        None
    }

    /// Labels from `start` around its cycle back to `start`.
    fn cycle_path(&self, start: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let Ok(node) = self.get(id) else { break };
            path.push(node.label().to_string());
            if id == start && path.len() > 1 {
                break;
            }
            cursor = node.upstream();
        }
        path
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.nodes).finish()
    }
}
