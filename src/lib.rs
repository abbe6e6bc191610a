pub mod btree;

pub use btree::{BTree, BTreeError, BTreeResult, Key, Node, NodeId, NodeShape};
