use super::Key;
use super::error::{BTreeError, BTreeResult};

/// Node identifier (index into node storage)
pub type NodeId = usize;

/// Upper bound on the keys reserved up front for a new node
///
/// Nodes of very large degree grow on demand past this.
const MAX_RESERVED_KEYS: usize = 255;

/// Keys reserved for a node of minimum degree `t`
fn reserved_keys(t: usize) -> usize {
    t.saturating_mul(2).saturating_sub(1).min(MAX_RESERVED_KEYS)
}

/// B-tree node
///
/// A node with `n` keys holds them in `keys[0..n]` in strictly increasing
/// order. Internal nodes hold exactly `n + 1` children; leaves hold none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Sorted keys
    pub keys: Vec<Key>,
    /// Child node IDs (empty for leaves)
    pub children: Vec<NodeId>,
    /// Whether this node has children
    pub leaf: bool,
}

impl Node {
    /// Create an empty leaf sized for minimum degree `t`
    pub fn new_leaf(t: usize) -> Self {
        Self {
            keys: Vec::with_capacity(reserved_keys(t)),
            children: Vec::new(),
            leaf: true,
        }
    }

    /// Create an empty internal node sized for minimum degree `t`
    pub fn new_internal(t: usize) -> Self {
        let keys = reserved_keys(t);
        Self {
            keys: Vec::with_capacity(keys),
            children: Vec::with_capacity(keys + 1),
            leaf: false,
        }
    }

    /// Number of keys in use
    pub fn n(&self) -> usize {
        self.keys.len()
    }

    /// Return the smallest index `i` such that `i == n` or `k <= keys[i]`
    ///
    /// If `i < n && keys[i] == k` the key lives in this node, otherwise
    /// `children[i]` is the subtree that would contain it.
    pub fn find_k(&self, k: Key) -> usize {
        self.keys.partition_point(|&key| key < k)
    }

    /// Check whether `keys[i]` is exactly `k`
    pub fn holds_at(&self, i: usize, k: Key) -> bool {
        self.keys.get(i) == Some(&k)
    }

    /// Remove the key at index `i` from a leaf, returning it
    pub fn remove_leaf_key(&mut self, i: usize) -> BTreeResult<Key> {
        if !self.leaf {
            return Err(BTreeError::Precondition(
                "remove_leaf_key called on an internal node".to_string(),
            ));
        }
        if i >= self.n() {
            return Err(BTreeError::Precondition(format!(
                "remove_leaf_key index {} out of range (n = {})",
                i,
                self.n()
            )));
        }
        Ok(self.keys.remove(i))
    }

    /// Remove the key at index `i` and the child at index `j` from an internal node
    ///
    /// The two indices are independent: merging a child with its right
    /// sibling drops `(i, i + 1)`, merging with its left sibling drops
    /// `(i - 1, i)`.
    pub fn remove_internal_key(&mut self, i: usize, j: usize) -> BTreeResult<(Key, NodeId)> {
        if self.leaf {
            return Err(BTreeError::Precondition(
                "remove_internal_key called on a leaf".to_string(),
            ));
        }
        if i >= self.n() || j > self.n() {
            return Err(BTreeError::Precondition(format!(
                "remove_internal_key indices ({}, {}) out of range (n = {})",
                i,
                j,
                self.n()
            )));
        }
        let key = self.keys.remove(i);
        let child = self.children.remove(j);
        Ok((key, child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(keys: &[Key]) -> Node {
        let mut node = Node::new_leaf(3);
        node.keys.extend_from_slice(keys);
        node
    }

    #[test]
    fn test_reservation_is_bounded() {
        assert!(Node::new_leaf(3).keys.capacity() >= 5);
        assert!(Node::new_internal(3).children.capacity() >= 6);

        // Degenerate and huge degrees neither underflow nor over-allocate
        assert_eq!(Node::new_leaf(0).keys.capacity(), 0);
        assert!(Node::new_internal(0).children.capacity() >= 1);
        let node = Node::new_internal(usize::MAX);
        assert!(node.keys.capacity() < 1 << 16);
        assert!(node.children.capacity() < 1 << 16);
    }

    #[test]
    fn test_find_k() {
        let node = leaf(&[3, 7, 12]);

        assert_eq!(node.find_k(1), 0);
        assert_eq!(node.find_k(3), 0);
        assert_eq!(node.find_k(5), 1);
        assert_eq!(node.find_k(7), 1);
        assert_eq!(node.find_k(12), 2);
        assert_eq!(node.find_k(15), 3); // past the end selects the last child
    }

    #[test]
    fn test_find_k_empty_node() {
        let node = Node::new_leaf(2);
        assert_eq!(node.find_k(42), 0);
        assert!(!node.holds_at(0, 42));
    }

    #[test]
    fn test_holds_at() {
        let node = leaf(&[3, 7, 12]);
        let i = node.find_k(7);
        assert!(node.holds_at(i, 7));
        let i = node.find_k(8);
        assert!(!node.holds_at(i, 8));
    }

    #[test]
    fn test_remove_leaf_key() {
        let mut node = leaf(&[3, 7, 12, 20]);

        assert_eq!(node.remove_leaf_key(1).unwrap(), 7);
        assert_eq!(node.keys, vec![3, 12, 20]);
        assert_eq!(node.n(), 3);

        assert_eq!(node.remove_leaf_key(2).unwrap(), 20);
        assert_eq!(node.keys, vec![3, 12]);
    }

    #[test]
    fn test_remove_leaf_key_rejects_bad_calls() {
        let mut node = leaf(&[3]);
        assert!(matches!(
            node.remove_leaf_key(1),
            Err(BTreeError::Precondition(_))
        ));

        let mut internal = Node::new_internal(2);
        internal.keys.push(5);
        internal.children.extend([0, 1]);
        assert!(matches!(
            internal.remove_leaf_key(0),
            Err(BTreeError::Precondition(_))
        ));
        assert_eq!(internal.keys, vec![5]);
    }

    #[test]
    fn test_remove_internal_key_independent_indices() {
        let mut node = Node::new_internal(3);
        node.keys.extend([10, 20, 30]);
        node.children.extend([100, 101, 102, 103]);

        // Separator and right-hand child
        assert_eq!(node.remove_internal_key(1, 2).unwrap(), (20, 102));
        assert_eq!(node.keys, vec![10, 30]);
        assert_eq!(node.children, vec![100, 101, 103]);

        // Separator and left-hand child
        assert_eq!(node.remove_internal_key(1, 1).unwrap(), (30, 101));
        assert_eq!(node.keys, vec![10]);
        assert_eq!(node.children, vec![100, 103]);
    }

    #[test]
    fn test_remove_internal_key_rejects_bad_calls() {
        let mut node = leaf(&[1, 2]);
        assert!(node.remove_internal_key(0, 1).is_err());

        let mut node = Node::new_internal(2);
        node.keys.push(5);
        node.children.extend([0, 1]);
        assert!(node.remove_internal_key(1, 1).is_err());
        assert!(node.remove_internal_key(0, 2).is_err());
        assert_eq!(node.n(), 1);
        assert_eq!(node.children.len(), 2);
    }
}
