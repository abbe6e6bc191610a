//! Merge and rotation primitives used by deletion
//!
//! All four operators validate their preconditions before touching any node,
//! so a rejected call leaves the tree exactly as it was.

use std::iter;

use super::error::{BTreeError, BTreeResult};
use super::{BTree, Key, NodeId};

impl BTree {
    // ========== Merge Operators ==========

    /// Merge key `k` and all keys and children of `y` into `y`'s LEFT sibling `x`
    ///
    /// Both nodes must hold exactly `t - 1` keys, so `x` ends up full with
    /// `2t - 1` keys. `y` is destroyed.
    pub(crate) fn merge_left(&mut self, x: NodeId, y: NodeId, k: Key) -> BTreeResult<()> {
        self.check_mergeable(x, y)?;

        let donor = self.release_node(y)?;
        let survivor = self.node_mut(x)?;
        survivor.keys.push(k);
        survivor.keys.extend(donor.keys);
        survivor.children.extend(donor.children);

        Ok(())
    }

    /// Merge key `k` and all keys and children of `y` into `y`'s RIGHT sibling `x`
    ///
    /// Mirror of [`BTree::merge_left`]: `y`'s content is placed in front of
    /// `x`'s own, with `k` between them. `y` is destroyed.
    // Deletion always keeps the left node of a merged pair
    #[allow(dead_code)]
    pub(crate) fn merge_right(&mut self, x: NodeId, y: NodeId, k: Key) -> BTreeResult<()> {
        self.check_mergeable(x, y)?;

        let donor = self.release_node(y)?;
        let survivor = self.node_mut(x)?;
        survivor
            .keys
            .splice(0..0, donor.keys.into_iter().chain(iter::once(k)));
        survivor.children.splice(0..0, donor.children);

        Ok(())
    }

    fn check_mergeable(&self, x: NodeId, y: NodeId) -> BTreeResult<()> {
        if x == y {
            return Err(BTreeError::Precondition(format!(
                "cannot merge node {} into itself",
                x
            )));
        }

        let min = self.min_keys();
        let survivor = self.node(x)?;
        let donor = self.node(y)?;

        if survivor.leaf != donor.leaf {
            return Err(BTreeError::Precondition(format!(
                "cannot merge siblings of different heights ({} and {})",
                x, y
            )));
        }
        if survivor.n() != min || donor.n() != min {
            return Err(BTreeError::Precondition(format!(
                "merge requires {} keys on both sides, found {} and {}",
                min,
                survivor.n(),
                donor.n()
            )));
        }

        Ok(())
    }

    // ========== Rotation Operators ==========

    /// Give `y` an extra key by rotating one in from its LEFT sibling `z`
    ///
    /// The separator `x.keys[i]` moves down to become `y`'s first key, `z`'s
    /// last key moves up to replace it, and for internal nodes `z`'s last
    /// child becomes `y`'s first child.
    pub(crate) fn swap_left(
        &mut self,
        x: NodeId,
        y: NodeId,
        z: NodeId,
        i: usize,
    ) -> BTreeResult<()> {
        self.check_rotation(x, z, y, i, z)?;

        let (borrowed_key, borrowed_child) = {
            let donor = self.node_mut(z)?;
            let key = donor.keys.pop().ok_or_else(|| {
                BTreeError::InvalidState(format!("donor node {} has no keys", z))
            })?;
            (key, donor.children.pop())
        };

        let separator = std::mem::replace(&mut self.node_mut(x)?.keys[i], borrowed_key);

        let target = self.node_mut(y)?;
        target.keys.insert(0, separator);
        if let Some(child) = borrowed_child {
            target.children.insert(0, child);
        }

        Ok(())
    }

    /// Give `y` an extra key by rotating one in from its RIGHT sibling `z`
    ///
    /// Mirror of [`BTree::swap_left`]: `z`'s first key moves up into
    /// `x.keys[i]` and `z`'s first child becomes `y`'s last child.
    pub(crate) fn swap_right(
        &mut self,
        x: NodeId,
        y: NodeId,
        z: NodeId,
        i: usize,
    ) -> BTreeResult<()> {
        self.check_rotation(x, y, z, i, z)?;

        let (borrowed_key, borrowed_child) = {
            let donor = self.node_mut(z)?;
            let key = donor.keys.remove(0);
            let child = if donor.leaf {
                None
            } else {
                Some(donor.children.remove(0))
            };
            (key, child)
        };

        let separator = std::mem::replace(&mut self.node_mut(x)?.keys[i], borrowed_key);

        let target = self.node_mut(y)?;
        target.keys.push(separator);
        if let Some(child) = borrowed_child {
            target.children.push(child);
        }

        Ok(())
    }

    /// Validate a rotation across separator `i` of `parent`
    ///
    /// `left` and `right` must be `parent.children[i]` and
    /// `parent.children[i + 1]`; `donor` is whichever of them gives up a key.
    fn check_rotation(
        &self,
        parent: NodeId,
        left: NodeId,
        right: NodeId,
        i: usize,
        donor: NodeId,
    ) -> BTreeResult<()> {
        let node = self.node(parent)?;
        if node.leaf || i >= node.n() {
            return Err(BTreeError::Precondition(format!(
                "separator {} is not a valid index in internal node {}",
                i, parent
            )));
        }
        if node.children.get(i) != Some(&left) || node.children.get(i + 1) != Some(&right) {
            return Err(BTreeError::Precondition(format!(
                "nodes {} and {} are not split by separator {} of node {}",
                left, right, i, parent
            )));
        }

        let receiver = if donor == left { right } else { left };
        let donor_node = self.node(donor)?;
        let receiver_node = self.node(receiver)?;

        if donor_node.leaf != receiver_node.leaf {
            return Err(BTreeError::Precondition(format!(
                "cannot rotate between siblings of different heights ({} and {})",
                left, right
            )));
        }
        if donor_node.n() <= self.min_keys() {
            return Err(BTreeError::Precondition(format!(
                "donor node {} has no spare key ({} keys)",
                donor,
                donor_node.n()
            )));
        }
        if receiver_node.n() >= self.max_keys() {
            return Err(BTreeError::Precondition(format!(
                "receiving node {} is full",
                receiver
            )));
        }

        Ok(())
    }
}
