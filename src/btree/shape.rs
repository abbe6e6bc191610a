//! Owned tree shapes and the structural auditor
//!
//! A [`NodeShape`] describes a subtree by value, independent of arena slot
//! numbers. It is how fixtures with an exact layout are built and how the
//! shell prints a tree.

use serde::{Deserialize, Serialize};

use super::error::{BTreeError, BTreeResult};
use super::{BTree, Key, Node, NodeId};

/// Owned description of a subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeShape {
    pub keys: Vec<Key>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeShape>,
}

impl NodeShape {
    pub fn leaf(keys: &[Key]) -> Self {
        Self {
            keys: keys.to_vec(),
            children: Vec::new(),
        }
    }

    pub fn internal(keys: &[Key], children: Vec<NodeShape>) -> Self {
        Self {
            keys: keys.to_vec(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Running totals collected while auditing
#[derive(Default)]
struct Audit {
    leaf_depth: Option<usize>,
    keys: usize,
    nodes: usize,
}

impl BTree {
    /// Build a tree of minimum degree `t` from an explicit shape
    ///
    /// The result is audited; a shape that breaks any B-tree invariant is
    /// rejected with [`BTreeError::InvariantViolation`].
    pub fn from_shape(t: usize, shape: NodeShape) -> BTreeResult<Self> {
        let mut tree = Self::new(t)?;
        let root = tree.build_node(shape);
        tree.root = Some(root);
        tree.len = tree.iter().count();
        tree.check_invariants()?;
        Ok(tree)
    }

    fn build_node(&mut self, shape: NodeShape) -> NodeId {
        let t = self.min_degree;
        let mut node = if shape.is_leaf() {
            Node::new_leaf(t)
        } else {
            Node::new_internal(t)
        };
        node.keys = shape.keys;
        for child in shape.children {
            let id = self.build_node(child);
            node.children.push(id);
        }
        self.allocate_node(node)
    }

    /// Capture the current tree as an owned shape
    pub fn shape(&self) -> BTreeResult<Option<NodeShape>> {
        self.root.map(|root| self.shape_of(root)).transpose()
    }

    fn shape_of(&self, id: NodeId) -> BTreeResult<NodeShape> {
        let node = self.node(id)?;
        let children = node
            .children
            .iter()
            .map(|&child| self.shape_of(child))
            .collect::<BTreeResult<Vec<_>>>()?;
        Ok(NodeShape {
            keys: node.keys.clone(),
            children,
        })
    }

    /// Verify every structural invariant of the tree
    ///
    /// Checks key-count bounds, strict key ordering within the bounds set by
    /// ancestors, child counts, equal leaf depth, the cached length, and that
    /// every allocated node is reachable from the root.
    pub fn check_invariants(&self) -> BTreeResult<()> {
        let mut audit = Audit::default();

        if let Some(root) = self.root {
            self.check_node(root, 0, None, None, &mut audit)?;
        }

        if audit.keys != self.len {
            return Err(BTreeError::InvariantViolation(format!(
                "tree reports {} keys but holds {}",
                self.len, audit.keys
            )));
        }
        if audit.nodes != self.live_node_count() {
            return Err(BTreeError::InvariantViolation(format!(
                "{} nodes allocated but only {} reachable from the root",
                self.live_node_count(),
                audit.nodes
            )));
        }

        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<Key>,
        upper: Option<Key>,
        audit: &mut Audit,
    ) -> BTreeResult<()> {
        let node = self.node(id)?;
        let n = node.n();
        let violation = |msg: String| Err(BTreeError::InvariantViolation(msg));

        audit.nodes += 1;
        audit.keys += n;

        if n > self.max_keys() {
            return violation(format!("node {} holds {} keys (max {})", id, n, self.max_keys()));
        }
        if depth == 0 && n == 0 {
            return violation(format!("root {} holds no keys", id));
        }
        if depth > 0 && n < self.min_keys() {
            return violation(format!("node {} holds {} keys (min {})", id, n, self.min_keys()));
        }
        if !node.keys.windows(2).all(|w| w[0] < w[1]) {
            return violation(format!("node {} keys are not strictly increasing", id));
        }
        if let (Some(lo), Some(&first)) = (lower, node.keys.first()) {
            if first <= lo {
                return violation(format!("node {} key {} not above bound {}", id, first, lo));
            }
        }
        if let (Some(hi), Some(&last)) = (upper, node.keys.last()) {
            if last >= hi {
                return violation(format!("node {} key {} not below bound {}", id, last, hi));
            }
        }

        if node.leaf {
            if !node.children.is_empty() {
                return violation(format!("leaf {} has children", id));
            }
            match audit.leaf_depth {
                None => audit.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return violation(format!(
                        "leaf {} at depth {} but other leaves at depth {}",
                        id, depth, expected
                    ));
                }
                Some(_) => {}
            }
            return Ok(());
        }

        if node.children.len() != n + 1 {
            return violation(format!(
                "internal node {} has {} keys but {} children",
                id,
                n,
                node.children.len()
            ));
        }

        for (i, &child) in node.children.iter().enumerate() {
            let lo = if i == 0 { lower } else { Some(node.keys[i - 1]) };
            let hi = if i == n { upper } else { Some(node.keys[i]) };
            self.check_node(child, depth + 1, lo, hi, audit)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NodeShape {
        NodeShape::internal(
            &[10, 20],
            vec![
                NodeShape::leaf(&[1, 5]),
                NodeShape::leaf(&[12]),
                NodeShape::leaf(&[25, 30, 40]),
            ],
        )
    }

    #[test]
    fn test_from_shape_round_trip() {
        let tree = BTree::from_shape(2, sample()).unwrap();

        assert_eq!(tree.len(), 8);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.live_node_count(), 4);
        assert_eq!(tree.shape().unwrap(), Some(sample()));
    }

    #[test]
    fn test_empty_tree_shape() {
        let tree = BTree::new(2).unwrap();
        assert_eq!(tree.shape().unwrap(), None);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_shape_json() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"keys":[10,20],"children":[{"keys":[1,5]},{"keys":[12]},{"keys":[25,30,40]}]}"#
        );

        let parsed: NodeShape = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_rejects_underfull_child() {
        let shape = NodeShape::internal(&[10], vec![NodeShape::leaf(&[5]), NodeShape::leaf(&[15])]);
        // Fine with t = 2, but t = 3 needs two keys per non-root node
        assert!(BTree::from_shape(2, shape.clone()).is_ok());
        assert!(matches!(
            BTree::from_shape(3, shape),
            Err(BTreeError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_rejects_overfull_node() {
        let shape = NodeShape::leaf(&[1, 2, 3, 4]);
        assert!(matches!(
            BTree::from_shape(2, shape),
            Err(BTreeError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_rejects_misplaced_key() {
        // 15 belongs to the right of separator 10
        let shape = NodeShape::internal(
            &[10],
            vec![NodeShape::leaf(&[5, 15]), NodeShape::leaf(&[20])],
        );
        assert!(BTree::from_shape(2, shape).is_err());
    }

    #[test]
    fn test_rejects_unsorted_keys() {
        assert!(BTree::from_shape(2, NodeShape::leaf(&[3, 1])).is_err());
        assert!(BTree::from_shape(2, NodeShape::leaf(&[3, 3])).is_err());
    }

    #[test]
    fn test_rejects_wrong_child_count() {
        let shape = NodeShape::internal(
            &[10],
            vec![
                NodeShape::leaf(&[5]),
                NodeShape::leaf(&[15]),
                NodeShape::leaf(&[25]),
            ],
        );
        assert!(BTree::from_shape(2, shape).is_err());
    }

    #[test]
    fn test_rejects_uneven_leaf_depth() {
        let shape = NodeShape::internal(
            &[10],
            vec![
                NodeShape::leaf(&[5]),
                NodeShape::internal(&[20], vec![NodeShape::leaf(&[15]), NodeShape::leaf(&[25])]),
            ],
        );
        assert!(BTree::from_shape(2, shape).is_err());
    }

    #[test]
    fn test_rejects_empty_root() {
        assert!(BTree::from_shape(2, NodeShape::leaf(&[])).is_err());
    }

    #[test]
    fn test_detects_leaked_node() {
        let mut tree = BTree::from_shape(2, sample()).unwrap();
        tree.allocate_node(Node::new_leaf(2));
        assert!(matches!(
            tree.check_invariants(),
            Err(BTreeError::InvariantViolation(_))
        ));
    }
}
