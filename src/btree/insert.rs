//! Proactive-split insertion
//!
//! Any full node met on the way down is split before the descent enters it,
//! so a leaf always has room when the key reaches it.

use super::error::{BTreeError, BTreeResult};
use super::{BTree, Key, Node, NodeId};

impl BTree {
    // ========== Insert Operations ==========

    /// Insert a key into the tree
    /// Returns false if the key was already present
    pub fn insert(&mut self, key: Key) -> BTreeResult<bool> {
        if self.contains(key) {
            return Ok(false);
        }

        let root = match self.root {
            Some(root) => root,
            None => {
                // Create first leaf as root
                let mut leaf = Node::new_leaf(self.min_degree);
                leaf.keys.push(key);
                self.root = Some(self.allocate_node(leaf));
                self.len = 1;
                return Ok(true);
            }
        };

        let mut x = root;
        if self.node(root)?.n() == self.max_keys() {
            // Grow a new root above the full one, then split it
            let mut new_root = Node::new_internal(self.min_degree);
            new_root.children.push(root);
            x = self.allocate_node(new_root);
            self.root = Some(x);
            self.split_child(x, 0)?;
        }

        loop {
            let (mut i, leaf) = {
                let node = self.node(x)?;
                (node.find_k(key), node.leaf)
            };

            if leaf {
                self.node_mut(x)?.keys.insert(i, key);
                break;
            }

            let child = self.child_at(x, i)?;
            if self.node(child)?.n() == self.max_keys() {
                self.split_child(x, i)?;
                if key > self.node(x)?.keys[i] {
                    i += 1;
                }
            }
            x = self.child_at(x, i)?;
        }

        self.len += 1;
        Ok(true)
    }

    /// Split the full child `i` of `x` around its median key
    ///
    /// The median moves up into `x` at index `i`, the upper half becomes a
    /// new node at `children[i + 1]`.
    fn split_child(&mut self, x: NodeId, i: usize) -> BTreeResult<()> {
        let t = self.min_degree;
        let y = self.child_at(x, i)?;

        let (median, right) = {
            let full = self.node_mut(y)?;
            if full.n() != 2 * t - 1 {
                return Err(BTreeError::Precondition(format!(
                    "split_child on node {} with {} keys",
                    y,
                    full.n()
                )));
            }

            let mut right = if full.leaf {
                Node::new_leaf(t)
            } else {
                Node::new_internal(t)
            };
            right.keys.extend(full.keys.drain(t..));
            if !full.leaf {
                right.children.extend(full.children.drain(t..));
            }
            let median = full
                .keys
                .pop()
                .ok_or_else(|| BTreeError::InvalidState(format!("node {} has no median", y)))?;
            (median, right)
        };

        let z = self.allocate_node(right);
        let parent = self.node_mut(x)?;
        parent.keys.insert(i, median);
        parent.children.insert(i + 1, z);

        Ok(())
    }

    fn child_at(&self, x: NodeId, i: usize) -> BTreeResult<NodeId> {
        self.node(x)?
            .children
            .get(i)
            .copied()
            .ok_or_else(|| BTreeError::InvalidState(format!("node {} has no child {}", x, i)))
    }
}
