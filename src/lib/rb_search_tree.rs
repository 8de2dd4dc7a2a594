use std::fmt::Display;
use std::io::Write;

use crate::rb_error::{RenderError, TreeError};
use crate::RbTreeMap;

/// A balanced search tree as seen by code that may hand it absent keys.
///
/// Every keyed operation takes an `Option` and fails with [`TreeError::NullKey`] on
/// `None` before it looks at the tree. Traversals return owned snapshots.
pub trait SearchTree<K, V> {
    /// Adds a key-value pair. Fails with [`TreeError::DuplicateKey`] if the key is present.
    fn insert(&mut self, key: Option<K>, value: V) -> Result<(), TreeError>;

    /// Removes a key. Returns `Ok(false)` if it was not present.
    fn remove(&mut self, key: Option<&K>) -> Result<bool, TreeError>;

    /// Value stored under `key`, or [`TreeError::KeyNotFound`].
    fn get(&self, key: Option<&K>) -> Result<&V, TreeError>;

    /// Whether `key` is stored.
    fn contains(&self, key: Option<&K>) -> Result<bool, TreeError>;

    /// Number of stored keys.
    fn num_keys(&self) -> usize;

    /// Number of levels holding keys.
    fn height(&self) -> usize;

    /// Key at the root, `None` for an empty tree.
    fn key_at_root(&self) -> Option<K>;

    /// Key of the left child of the node holding `key`.
    fn key_of_left_child_of(&self, key: Option<&K>) -> Result<Option<K>, TreeError>;

    /// Key of the right child of the node holding `key`.
    fn key_of_right_child_of(&self, key: Option<&K>) -> Result<Option<K>, TreeError>;

    /// Keys in ascending order.
    fn in_order_traversal(&self) -> Vec<K>;

    /// Keys in pre-order.
    fn pre_order_traversal(&self) -> Vec<K>;

    /// Keys in post-order.
    fn post_order_traversal(&self) -> Vec<K>;

    /// Keys level by level.
    fn level_order_traversal(&self) -> Vec<K>;

    /// Draws the tree, legend first, to `sink`.
    fn print(&self, sink: &mut dyn Write) -> Result<(), RenderError>;
}

fn owned<K: Clone>(keys: Vec<&K>) -> Vec<K> {
    keys.into_iter().cloned().collect()
}

impl<K, V> SearchTree<K, V> for RbTreeMap<K, V>
where
    K: Ord + Clone + Display,
{
    fn insert(&mut self, key: Option<K>, value: V) -> Result<(), TreeError> {
        let key = key.ok_or(TreeError::NullKey)?;
        RbTreeMap::insert(self, key, value)
    }

    fn remove(&mut self, key: Option<&K>) -> Result<bool, TreeError> {
        let key = key.ok_or(TreeError::NullKey)?;
        Ok(RbTreeMap::remove(self, key).is_some())
    }

    fn get(&self, key: Option<&K>) -> Result<&V, TreeError> {
        let key = key.ok_or(TreeError::NullKey)?;
        RbTreeMap::get(self, key)
    }

    fn contains(&self, key: Option<&K>) -> Result<bool, TreeError> {
        let key = key.ok_or(TreeError::NullKey)?;
        Ok(self.contains_key(key))
    }

    fn num_keys(&self) -> usize {
        self.len()
    }

    fn height(&self) -> usize {
        RbTreeMap::height(self)
    }

    fn key_at_root(&self) -> Option<K> {
        self.root_key().cloned()
    }

    fn key_of_left_child_of(&self, key: Option<&K>) -> Result<Option<K>, TreeError> {
        let key = key.ok_or(TreeError::NullKey)?;
        Ok(self.left_child_key(key)?.cloned())
    }

    fn key_of_right_child_of(&self, key: Option<&K>) -> Result<Option<K>, TreeError> {
        let key = key.ok_or(TreeError::NullKey)?;
        Ok(self.right_child_key(key)?.cloned())
    }

    fn in_order_traversal(&self) -> Vec<K> {
        owned(self.in_order())
    }

    fn pre_order_traversal(&self) -> Vec<K> {
        owned(self.pre_order())
    }

    fn post_order_traversal(&self) -> Vec<K> {
        owned(self.post_order())
    }

    fn level_order_traversal(&self) -> Vec<K> {
        owned(self.level_order())
    }

    fn print(&self, sink: &mut dyn Write) -> Result<(), RenderError> {
        RbTreeMap::print(self, sink)
    }
}
