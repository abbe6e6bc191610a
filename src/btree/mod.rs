//! B-tree of minimum degree `t` over integer keys
//!
//! This module provides a classic (CLRS-style) B-tree that stores keys in
//! both internal nodes and leaves. It supports:
//! - Single-pass deletion that keeps every node on the descent path above
//!   the minimum occupancy before stepping into it
//! - Proactive-split insertion
//! - Membership queries and in-order iteration
//!
//! Nodes live in an index arena; slots freed by merges and root collapse
//! are recycled through a free list.

mod error;
mod insert;
mod node;
mod rebalance;
mod remove;
mod shape;


pub use error::{BTreeError, BTreeResult};
pub use node::{Node, NodeId};
pub use shape::NodeShape;

/// Key type stored in the tree
pub type Key = i64;

/// Default minimum degree
pub const DEFAULT_MIN_DEGREE: usize = 3;

/// B-tree data structure
///
/// Minimum degree `t` means:
/// - Every node holds at most `2t - 1` keys
/// - Every node except the root holds at least `t - 1` keys
/// - An internal node with `n` keys has `n + 1` children
/// - All leaves sit at the same depth
#[derive(Debug)]
pub struct BTree {
    /// Root node ID (None if tree is empty)
    root: Option<NodeId>,

    /// Minimum degree, fixed for the lifetime of the tree
    min_degree: usize,

    /// Node storage
    nodes: Vec<Option<Node>>,

    /// Free list for recycling released nodes
    free_list: Vec<NodeId>,

    /// Total number of keys in the tree
    len: usize,
}

impl BTree {
    /// Create a new empty B-tree with the given minimum degree
    ///
    /// # Arguments
    /// * `t` - The minimum degree (must be >= 2, and `2t` must fit in a `usize`)
    ///
    /// # Returns
    /// * `Ok(BTree)` - A new empty B-tree
    /// * `Err(BTreeError)` - If the degree is invalid
    pub fn new(t: usize) -> BTreeResult<Self> {
        if t < 2 || t.checked_mul(2).is_none() {
            return Err(BTreeError::InvalidDegree(t));
        }

        Ok(Self {
            root: None,
            min_degree: t,
            nodes: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        })
    }

    /// Get the minimum degree
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Maximum keys in any node
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Minimum keys in any node except the root
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Get number of keys in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    /// Get tree height (1 for a single leaf, 0 for an empty tree)
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;

        while let Some(node) = current.and_then(|id| self.get_node(id)) {
            height += 1;
            current = if node.leaf {
                None
            } else {
                node.children.first().copied()
            };
        }

        height
    }

    // ========== Node Management ==========

    /// Allocate a new node, returning its ID
    pub(crate) fn allocate_node(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            let id = self.nodes.len();
            self.nodes.push(Some(node));
            id
        }
    }

    /// Destroy a node, returning its contents and recycling its slot
    pub(crate) fn release_node(&mut self, id: NodeId) -> BTreeResult<Node> {
        let node = self
            .nodes
            .get_mut(id)
            .and_then(Option::take)
            .ok_or(BTreeError::NodeNotFound(id))?;
        self.free_list.push(id);
        Ok(node)
    }

    /// Get a reference to a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).and_then(|n| n.as_ref())
    }

    pub(crate) fn node(&self, id: NodeId) -> BTreeResult<&Node> {
        self.get_node(id).ok_or(BTreeError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> BTreeResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .and_then(|n| n.as_mut())
            .ok_or(BTreeError::NodeNotFound(id))
    }

    /// Get the root node ID
    pub fn root_node_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes currently allocated
    pub fn live_node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    // ========== Search Operations ==========

    /// Check whether the tree holds `key`
    pub fn contains(&self, key: Key) -> bool {
        let mut current = self.root;

        while let Some(node) = current.and_then(|id| self.get_node(id)) {
            let i = node.find_k(key);
            if node.holds_at(i, key) {
                return true;
            }
            if node.leaf {
                return false;
            }
            current = node.children.get(i).copied();
        }

        false
    }

    /// Smallest key in the tree
    pub fn first_key(&self) -> Option<Key> {
        self.root.and_then(|root| self.min_key(root).ok())
    }

    /// Largest key in the tree
    pub fn last_key(&self) -> Option<Key> {
        self.root.and_then(|root| self.max_key(root).ok())
    }

    // ========== Iterator ==========

    /// Iterate over all keys in order
    pub fn iter(&self) -> Keys<'_> {
        Keys::new(self)
    }
}

impl Default for BTree {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DEGREE).expect("Default degree is valid")
    }
}

/// In-order iterator over B-tree keys
pub struct Keys<'a> {
    tree: &'a BTree,
    /// Path from the root: each entry is a node and the index of the next
    /// key to yield from it
    stack: Vec<(NodeId, usize)>,
}

impl<'a> Keys<'a> {
    fn new(tree: &'a BTree) -> Self {
        let mut keys = Self {
            tree,
            stack: Vec::new(),
        };
        if let Some(root) = tree.root {
            keys.push_left_spine(root);
        }
        keys
    }

    fn push_left_spine(&mut self, mut id: NodeId) {
        let tree = self.tree;
        while let Some(node) = tree.get_node(id) {
            self.stack.push((id, 0));
            match node.children.first() {
                Some(&child) if !node.leaf => id = child,
                _ => break,
            }
        }
    }
}

impl Iterator for Keys<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let (id, idx) = *self.stack.last()?;
            let node = tree.get_node(id)?;

            if idx >= node.n() {
                self.stack.pop();
                continue;
            }

            let key = node.keys[idx];
            if let Some(top) = self.stack.last_mut() {
                top.1 += 1;
            }
            // Leaves have no children, so this only descends from internal nodes
            if let Some(&child) = node.children.get(idx + 1) {
                self.push_left_spine(child);
            }
            return Some(key);
        }
    }
}
