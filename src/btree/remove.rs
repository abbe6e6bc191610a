//! Single-pass deletion
//!
//! The descent never steps into a node holding only `t - 1` keys: such a
//! child is first topped up by a rotation from a sibling or merged with one.
//! Whatever node the key is finally removed from can therefore lose a key
//! without underflowing, and no second pass back up the tree is needed.

use super::error::{BTreeError, BTreeResult};
use super::{BTree, Key, NodeId};

impl BTree {
    // ========== Delete Operations ==========

    /// Delete `key` from the tree
    ///
    /// Returns true if the key was present. Deleting an absent key, or
    /// deleting from an empty tree, leaves the tree unchanged.
    pub fn remove(&mut self, key: Key) -> BTreeResult<bool> {
        let Some(root) = self.root else {
            return Ok(false);
        };

        // The descent rebalances as it goes, so only start it when the key
        // is known to be present
        if !self.contains(key) {
            return Ok(false);
        }

        let removed = self.remove_from(root, key)?;
        if removed {
            self.len -= 1;
        }

        self.collapse_root()?;

        Ok(removed)
    }

    /// Delete `key` from the subtree rooted at `start`
    fn remove_from(&mut self, start: NodeId, key: Key) -> BTreeResult<bool> {
        let t = self.min_degree;
        let mut x = start;
        let mut key = key;

        loop {
            let (i, found, leaf) = {
                let node = self.node(x)?;
                let i = node.find_k(key);
                (i, node.holds_at(i, key), node.leaf)
            };

            match (found, leaf) {
                // Found in a leaf: every node above already has room to spare
                (true, true) => {
                    self.node_mut(x)?.remove_leaf_key(i)?;
                    return Ok(true);
                }

                // Found in an internal node
                (true, false) => {
                    let (left, right) = self.children_around(x, i)?;

                    if self.node(left)?.n() >= t {
                        let predecessor = self.max_key(left)?;
                        self.node_mut(x)?.keys[i] = predecessor;
                        key = predecessor;
                        x = left;
                    } else if self.node(right)?.n() >= t {
                        let successor = self.min_key(right)?;
                        self.node_mut(x)?.keys[i] = successor;
                        key = successor;
                        x = right;
                    } else {
                        // Both sides are at the minimum: fold the key down
                        // between them and keep looking in the merged node
                        let separator = self.node(x)?.keys[i];
                        self.merge_left(left, right, separator)?;
                        self.node_mut(x)?.remove_internal_key(i, i + 1)?;
                        x = left;
                    }
                }

                // Reached a leaf without finding it
                (false, true) => return Ok(false),

                (false, false) => {
                    x = self.prepare_descent(x, i)?;
                }
            }
        }
    }

    /// Make sure `children[i]` of `x` can give up a key, returning the node
    /// the descent should continue into
    ///
    /// The right sibling is consulted before the left one for both rotation
    /// and merging.
    fn prepare_descent(&mut self, x: NodeId, i: usize) -> BTreeResult<NodeId> {
        let (next, left_sibling, right_sibling) = {
            let node = self.node(x)?;
            let next = *node.children.get(i).ok_or_else(|| {
                BTreeError::InvalidState(format!("node {} has no child {}", x, i))
            })?;
            let left = i.checked_sub(1).and_then(|j| node.children.get(j).copied());
            let right = node.children.get(i + 1).copied();
            (next, left, right)
        };

        if self.node(next)?.n() > self.min_keys() {
            return Ok(next);
        }

        if let Some(right) = right_sibling {
            if self.node(right)?.n() > self.min_keys() {
                self.swap_right(x, next, right, i)?;
                return Ok(next);
            }
        }

        if let Some(left) = left_sibling {
            if self.node(left)?.n() > self.min_keys() {
                self.swap_left(x, next, left, i - 1)?;
                return Ok(next);
            }
        }

        if let Some(right) = right_sibling {
            let separator = self.node(x)?.keys[i];
            self.merge_left(next, right, separator)?;
            self.node_mut(x)?.remove_internal_key(i, i + 1)?;
            return Ok(next);
        }

        if let Some(left) = left_sibling {
            let separator = self.node(x)?.keys[i - 1];
            self.merge_left(left, next, separator)?;
            self.node_mut(x)?.remove_internal_key(i - 1, i)?;
            return Ok(left);
        }

        Err(BTreeError::InvalidState(format!(
            "internal node {} has a single child",
            x
        )))
    }

    fn children_around(&self, x: NodeId, i: usize) -> BTreeResult<(NodeId, NodeId)> {
        let node = self.node(x)?;
        match (node.children.get(i), node.children.get(i + 1)) {
            (Some(&left), Some(&right)) => Ok((left, right)),
            _ => Err(BTreeError::InvalidState(format!(
                "node {} has no children around key {}",
                x, i
            ))),
        }
    }

    /// Replace an emptied root with its only child, or empty the tree
    fn collapse_root(&mut self) -> BTreeResult<()> {
        let Some(root) = self.root else {
            return Ok(());
        };

        let node = self.node(root)?;
        if node.n() > 0 {
            return Ok(());
        }

        let replacement = if node.leaf {
            None
        } else {
            Some(*node.children.first().ok_or_else(|| {
                BTreeError::InvalidState(format!("empty internal root {} has no child", root))
            })?)
        };

        self.release_node(root)?;
        self.root = replacement;

        Ok(())
    }

    // ========== Boundary Keys ==========

    /// Return the largest key in the subtree rooted at `x`
    pub(crate) fn max_key(&self, x: NodeId) -> BTreeResult<Key> {
        let mut current = x;
        loop {
            let node = self.node(current)?;
            if node.leaf {
                return node
                    .keys
                    .last()
                    .copied()
                    .ok_or_else(|| BTreeError::InvalidState(format!("leaf {} is empty", current)));
            }
            // An internal node with n keys has children 0..=n
            current = *node.children.get(node.n()).ok_or_else(|| {
                BTreeError::InvalidState(format!("node {} is missing its last child", current))
            })?;
        }
    }

    /// Return the smallest key in the subtree rooted at `x`
    pub(crate) fn min_key(&self, x: NodeId) -> BTreeResult<Key> {
        let mut current = x;
        loop {
            let node = self.node(current)?;
            if node.leaf {
                return node
                    .keys
                    .first()
                    .copied()
                    .ok_or_else(|| BTreeError::InvalidState(format!("leaf {} is empty", current)));
            }
            current = *node.children.first().ok_or_else(|| {
                BTreeError::InvalidState(format!("node {} has no children", current))
            })?;
        }
    }
}
