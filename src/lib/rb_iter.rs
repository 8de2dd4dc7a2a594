use std::collections::VecDeque;

use crate::rb_node::{Direction, NodeArena, NodeId};
use crate::RbTreeMap;

/// In-order iterator over the entries of a [`RbTreeMap`].
pub struct Iter<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    // Nodes whose left subtree is done but which have not been yielded yet.
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(map: &'a RbTreeMap<K, V>) -> Self {
        let mut iter = Iter {
            nodes: &map.nodes,
            stack: Vec::new(),
            remaining: map.len(),
        };
        if let Some(r) = map.root {
            iter.push_leftmost(r);
        }
        iter
    }

    fn push_leftmost(&mut self, mut id: NodeId) {
        self.stack.push(id);
        while let Some(left) = self.nodes[id][Direction::Left] {
            self.stack.push(left);
            id = left;
        }
    }

    fn next_id(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(right) = self.nodes[id][Direction::Right] {
            self.push_leftmost(right);
        }
        self.remaining = self.remaining.saturating_sub(1);
        Some(id)
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        self.next_id().map(|id| (&nodes[id].key, &nodes[id].value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> IntoIterator for &'a RbTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> RbTreeMap<K, V> {
    /// Returns an iterator over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Keys in ascending order.
    pub fn in_order(&self) -> Vec<&K> {
        self.iter().map(|(k, _)| k).collect()
    }

    /// Keys in pre-order: node, left subtree, right subtree.
    pub fn pre_order(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            keys.push(&self.nodes[id].key);
            // Right goes first so that left is popped first.
            stack.extend(self.nodes[id][Direction::Right]);
            stack.extend(self.nodes[id][Direction::Left]);
        }
        keys
    }

    /// Keys in post-order: left subtree, right subtree, node.
    pub fn post_order(&self) -> Vec<&K> {
        // Node, right, left reversed.
        let mut keys = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            keys.push(&self.nodes[id].key);
            stack.extend(self.nodes[id][Direction::Left]);
            stack.extend(self.nodes[id][Direction::Right]);
        }
        keys.reverse();
        keys
    }

    /// Keys level by level from the root, each level left to right.
    pub fn level_order(&self) -> Vec<&K> {
        self.levels()
            .into_iter()
            .flatten()
            .map(|id| &self.nodes[id].key)
            .collect()
    }

    /// Node ids grouped by depth, each level left to right.
    pub(super) fn levels(&self) -> Vec<Vec<NodeId>> {
        let mut levels = Vec::new();
        let mut queue: VecDeque<(NodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();
        while let Some((id, depth)) = queue.pop_front() {
            if levels.len() == depth {
                levels.push(Vec::new());
            }
            levels[depth].push(id);
            for child in self.nodes[id].children.into_iter().flatten() {
                queue.push_back((child, depth + 1));
            }
        }
        levels
    }

    /// Node ids in ascending key order.
    pub(super) fn in_order_ids(&self) -> Vec<NodeId> {
        let mut iter = self.iter();
        std::iter::from_fn(|| iter.next_id()).collect()
    }
}
