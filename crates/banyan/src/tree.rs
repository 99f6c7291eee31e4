//! Arena-backed rooted tree built from flat `(id, parent)` records.
//!
//! Nodes live in a `Vec` and refer to each other by [`NodeIdx`]; the parent link is a plain
//! index so there is never a second owner of a node.

use crate::error::{Error, Result};
use crate::geom::{Point, point};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Stable node identity from the input: either a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(v) => write!(f, "{v}"),
            NodeKey::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for NodeKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One input row. Unknown fields (e.g. a redundant `children` list) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: NodeKey,
    #[serde(default)]
    pub parent: Option<NodeKey>,
}

impl Record {
    pub fn root(id: impl Into<NodeKey>) -> Self {
        Self {
            id: id.into(),
            parent: None,
        }
    }

    pub fn child(id: impl Into<NodeKey>, parent: impl Into<NodeKey>) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeKey,
    parent: Option<NodeIdx>,
    children: Vec<NodeIdx>,
    depth: usize,
    position: Point,
}

impl Node {
    pub fn id(&self) -> &NodeKey {
        &self.id
    }

    pub fn parent(&self) -> Option<NodeIdx> {
        self.parent
    }

    /// Children in input order.
    pub fn children(&self) -> &[NodeIdx] {
        &self.children
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn position(&self) -> Point {
        self.position
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeIdx,
    by_key: FxHashMap<NodeKey, NodeIdx>,
}

impl Tree {
    /// Links `records` into a tree. Node indices follow record order.
    pub fn from_records(records: &[Record]) -> Result<Self> {
        let mut by_key: FxHashMap<NodeKey, NodeIdx> = FxHashMap::default();
        by_key.reserve(records.len());
        for (i, r) in records.iter().enumerate() {
            if by_key.insert(r.id.clone(), NodeIdx(i)).is_some() {
                return Err(Error::DuplicateId { id: r.id.clone() });
            }
        }

        let mut parents: Vec<Option<NodeIdx>> = Vec::with_capacity(records.len());
        for r in records {
            let parent = match &r.parent {
                None => None,
                Some(p) => Some(*by_key.get(p).ok_or_else(|| Error::DanglingReference {
                    id: r.id.clone(),
                    parent: p.clone(),
                })?),
            };
            parents.push(parent);
        }

        let roots: Vec<usize> = parents
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.is_none().then_some(i))
            .collect();
        let [root] = roots.as_slice() else {
            return Err(Error::MalformedTree {
                roots: roots.len(),
                unreachable: 0,
            });
        };
        let root = NodeIdx(*root);

        let mut nodes: Vec<Node> = records
            .iter()
            .zip(&parents)
            .map(|(r, p)| Node {
                id: r.id.clone(),
                parent: *p,
                children: Vec::new(),
                depth: 0,
                position: point(0.0, 0.0),
            })
            .collect();
        for (i, p) in parents.iter().enumerate() {
            if let Some(p) = p {
                nodes[p.0].children.push(NodeIdx(i));
            }
        }

        let tree = Self {
            nodes,
            root,
            by_key,
        };

        // With exactly one root, anything unreachable sits on a parent cycle.
        let reachable = tree.breadth_first().len();
        if reachable != tree.len() {
            return Err(Error::MalformedTree {
                roots: 1,
                unreachable: tree.len() - reachable,
            });
        }

        Ok(tree)
    }

    pub fn root(&self) -> NodeIdx {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0]
    }

    pub fn get(&self, key: &NodeKey) -> Option<NodeIdx> {
        self.by_key.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIdx(i), n))
    }

    pub fn position(&self, idx: NodeIdx) -> Point {
        self.nodes[idx.0].position
    }

    /// Positions are the only mutable part of a built tree.
    pub fn set_position(&mut self, idx: NodeIdx, position: Point) {
        self.nodes[idx.0].position = position;
    }

    pub(crate) fn set_depth(&mut self, idx: NodeIdx, depth: usize) {
        self.nodes[idx.0].depth = depth;
    }

    pub fn child_count(&self, idx: NodeIdx) -> usize {
        self.nodes[idx.0].children.len()
    }

    /// Nodes in breadth-first order from the root, siblings in input order.
    pub fn breadth_first(&self) -> Vec<NodeIdx> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root]);
        while let Some(v) = queue.pop_front() {
            out.push(v);
            queue.extend(self.nodes[v.0].children.iter().copied());
        }
        out
    }

    /// Nodes in depth-first pre-order from the root, siblings in input order.
    pub fn depth_first(&self) -> Vec<NodeIdx> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(self.nodes[v.0].children.iter().rev().copied());
        }
        out
    }

    /// `(parent, child)` pairs, one per non-root node, in depth-first order.
    pub fn edges(&self) -> Vec<(NodeIdx, NodeIdx)> {
        self.depth_first()
            .into_iter()
            .filter_map(|v| self.nodes[v.0].parent.map(|p| (p, v)))
            .collect()
    }

    /// Leaves from left to right.
    pub fn leaves(&self) -> Vec<NodeIdx> {
        self.depth_first()
            .into_iter()
            .filter(|v| self.nodes[v.0].children.is_empty())
            .collect()
    }

    /// Number of nodes in each node's subtree (itself included), indexed by [`NodeIdx::index`].
    pub fn subtree_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![1usize; self.nodes.len()];
        for v in self.breadth_first().into_iter().rev() {
            if let Some(p) = self.nodes[v.0].parent {
                sizes[p.0] += sizes[v.0];
            }
        }
        sizes
    }

    /// Node positions keyed by id, in input order.
    pub fn positions(&self) -> IndexMap<NodeKey, Point> {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), n.position))
            .collect()
    }
}
