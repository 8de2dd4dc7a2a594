//! A red-black tree map, with a renderer that draws the exact shape of the tree as text.
#![warn(missing_docs)]

use std::borrow::Borrow;
use std::cmp::Ordering;

use log::{debug, trace};

mod rb_error;
mod rb_iter;
mod rb_layout;
mod rb_node;
mod rb_search_tree;

pub use rb_error::{RenderError, TreeError};
pub use rb_iter::Iter;
pub use rb_layout::RenderStyle;
pub use rb_node::Color;
pub use rb_search_tree::SearchTree;

use rb_node::{Direction, NodeArena, NodeId};

/// An ordered map backed by a red-black tree.
pub struct RbTreeMap<K, V> {
    nodes: NodeArena<K, V>,
    root: Option<NodeId>,
    length: usize,
}

impl<K, V> RbTreeMap<K, V> {
    /// Creates a new empty map.
    pub fn new() -> Self {
        RbTreeMap {
            nodes: NodeArena::new(),
            root: None,
            length: 0,
        }
    }

    /// Returns the number of keys in the map.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the map contains no keys.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.length = 0;
    }

    /// Number of levels holding keys: 0 when empty, 1 for a lone root.
    pub fn height(&self) -> usize {
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        let mut height = 0;
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            for child in self.nodes[id].children.into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// Returns the key stored at the root.
    pub fn root_key(&self) -> Option<&K> {
        self.root.map(|r| &self.nodes[r].key)
    }

    /// Moves `pivot` one level down towards `dir`, raising its child on the other side.
    /// Returns the raised node, which now sits where `pivot` was.
    fn rotate(&mut self, pivot: NodeId, dir: Direction) -> NodeId {
        let rising_side = dir.opposite();
        let Some(riser) = self.nodes[pivot][rising_side] else {
            return pivot;
        };
        let inner = self.nodes[riser][dir];
        let parent = self.nodes[pivot].parent;
        let side = self.nodes.side_of(pivot);

        self.nodes.link(pivot, rising_side, inner);
        self.nodes.link(riser, dir, Some(pivot));
        self.nodes[riser].parent = parent;
        match (parent, side) {
            (Some(p), Some(side)) => self.nodes[p][side] = Some(riser),
            _ => self.root = Some(riser),
        }
        trace!("rotate {:?} at slot {}", dir, pivot.index());
        riser
    }

    /// Puts `new` where `old` hangs (its parent's child slot, or the root).
    fn replace_in_parent(&mut self, old: NodeId, new: Option<NodeId>) {
        let parent = self.nodes[old].parent;
        match (parent, self.nodes.side_of(old)) {
            (Some(p), Some(side)) => self.nodes[p][side] = new,
            _ => self.root = new,
        }
        if let Some(n) = new {
            self.nodes[n].parent = parent;
        }
    }
}

impl<K, V> Default for RbTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RbTreeMap<K, V>
where
    K: Ord,
{
    fn find<Q: ?Sized + Ord>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
    {
        let mut current = self.root;
        while let Some(id) = current {
            current = match key.cmp(self.nodes[id].key.borrow()) {
                Ordering::Less => self.nodes[id][Direction::Left],
                Ordering::Greater => self.nodes[id][Direction::Right],
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Returns a reference to the value stored under `key`.
    pub fn get<Q: ?Sized + Ord>(&self, key: &Q) -> Result<&V, TreeError>
    where
        K: Borrow<Q>,
    {
        self.find(key)
            .map(|id| &self.nodes[id].value)
            .ok_or(TreeError::KeyNotFound)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut<Q: ?Sized + Ord>(&mut self, key: &Q) -> Result<&mut V, TreeError>
    where
        K: Borrow<Q>,
    {
        let id = self.find(key).ok_or(TreeError::KeyNotFound)?;
        Ok(&mut self.nodes[id].value)
    }

    /// Returns true if `key` is stored in the map.
    pub fn contains_key<Q: ?Sized + Ord>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
    {
        self.find(key).is_some()
    }

    /// Color of the node holding `key`.
    pub fn color_of<Q: ?Sized + Ord>(&self, key: &Q) -> Result<Color, TreeError>
    where
        K: Borrow<Q>,
    {
        self.find(key)
            .map(|id| self.nodes[id].color)
            .ok_or(TreeError::KeyNotFound)
    }

    /// Key of the left child of the node holding `key`, `None` if it has no left child.
    pub fn left_child_key<Q: ?Sized + Ord>(&self, key: &Q) -> Result<Option<&K>, TreeError>
    where
        K: Borrow<Q>,
    {
        self.child_key(key, Direction::Left)
    }

    /// Key of the right child of the node holding `key`, `None` if it has no right child.
    pub fn right_child_key<Q: ?Sized + Ord>(&self, key: &Q) -> Result<Option<&K>, TreeError>
    where
        K: Borrow<Q>,
    {
        self.child_key(key, Direction::Right)
    }

    fn child_key<Q: ?Sized + Ord>(&self, key: &Q, dir: Direction) -> Result<Option<&K>, TreeError>
    where
        K: Borrow<Q>,
    {
        let id = self.find(key).ok_or(TreeError::KeyNotFound)?;
        Ok(self.nodes[id][dir].map(|c| &self.nodes[c].key))
    }

    /// Inserts a key-value pair.
    ///
    /// Fails with [`TreeError::DuplicateKey`] if the key is already present, in which case
    /// the map is left as it was.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), TreeError> {
        let Some(mut current) = self.root else {
            let id = self.nodes.alloc(key, value, None, Color::Black);
            self.root = Some(id);
            self.length += 1;
            return Ok(());
        };

        let dir = loop {
            let dir = match key.cmp(&self.nodes[current].key) {
                Ordering::Less => Direction::Left,
                Ordering::Greater => Direction::Right,
                Ordering::Equal => return Err(TreeError::DuplicateKey),
            };
            match self.nodes[current][dir] {
                Some(next) => current = next,
                None => break dir,
            }
        };

        let id = self.nodes.alloc(key, value, Some(current), Color::Red);
        self.nodes[current][dir] = Some(id);
        self.length += 1;
        self.insert_fixup(id);
        Ok(())
    }

    fn insert_fixup(&mut self, mut node: NodeId) {
        loop {
            let Some(parent) = self.nodes[node].parent else {
                break;
            };
            if self.nodes[parent].color == Color::Black {
                break;
            }
            // A red parent is never the root, so there is a grandparent.
            let (Some(grandparent), Some(parent_side)) =
                (self.nodes[parent].parent, self.nodes.side_of(parent))
            else {
                break;
            };
            let uncle = self.nodes[grandparent][parent_side.opposite()];

            if self.nodes.color_of(uncle).is_red() {
                trace!("insert fixup: red uncle, recolor and continue at grandparent");
                self.nodes[parent].color = Color::Black;
                if let Some(u) = uncle {
                    self.nodes[u].color = Color::Black;
                }
                if self.root != Some(grandparent) {
                    self.nodes[grandparent].color = Color::Red;
                }
                node = grandparent;
                continue;
            }

            let mut top = parent;
            if self.nodes.side_of(node) != Some(parent_side) {
                trace!("insert fixup: zig-zag, rotate at parent");
                self.rotate(parent, parent_side);
                top = node;
            }
            trace!("insert fixup: straight line, rotate at grandparent");
            self.rotate(grandparent, parent_side.opposite());
            self.nodes[top].color = Color::Black;
            self.nodes[grandparent].color = Color::Red;
            break;
        }

        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }
    }

    /// Removes a key from the map, returning its value if it was present.
    pub fn remove<Q: ?Sized + Ord>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
    {
        let Some(id) = self.find(key) else {
            debug!("remove: key not present, {} keys unchanged", self.length);
            return None;
        };
        let (_, value) = self.remove_node(id);
        Some(value)
    }

    fn remove_node(&mut self, id: NodeId) -> (K, V) {
        let mut target = id;
        if let (Some(_), Some(right)) = (self.nodes[id][Direction::Left], self.nodes[id][Direction::Right]) {
            // The successor has no left child, so removing it is one of the simple cases.
            let successor = self.nodes.extreme(right, Direction::Left);
            self.nodes.swap_entries(id, successor);
            target = successor;
        }

        let child = self.nodes[target][Direction::Left].or(self.nodes[target][Direction::Right]);
        match child {
            Some(c) => {
                // Only a black node with a single red leaf child gets here.
                self.replace_in_parent(target, Some(c));
                self.nodes[c].color = Color::Black;
            }
            None => {
                if self.nodes[target].color == Color::Black {
                    self.remove_fixup(target);
                }
                self.replace_in_parent(target, None);
            }
        }

        self.length -= 1;
        let node = self.nodes.release(target, &mut self.root);
        (node.key, node.value)
    }

    /// Restores equal black-height before the black leaf `node` is detached.
    fn remove_fixup(&mut self, mut node: NodeId) {
        loop {
            let (Some(parent), Some(side)) = (self.nodes[node].parent, self.nodes.side_of(node))
            else {
                break;
            };
            let far_side = side.opposite();
            let Some(mut sibling) = self.nodes[parent][far_side] else {
                break;
            };

            if self.nodes[sibling].color == Color::Red {
                trace!("remove fixup: red sibling, rotate at parent");
                self.nodes[sibling].color = Color::Black;
                self.nodes[parent].color = Color::Red;
                self.rotate(parent, side);
                let Some(next) = self.nodes[parent][far_side] else {
                    break;
                };
                sibling = next;
            }

            let near = self.nodes[sibling][side];
            let far = self.nodes[sibling][far_side];
            if !self.nodes.color_of(near).is_red() && !self.nodes.color_of(far).is_red() {
                self.nodes[sibling].color = Color::Red;
                if self.nodes[parent].color == Color::Red {
                    trace!("remove fixup: black nephews, absorbed by red parent");
                    self.nodes[parent].color = Color::Black;
                    break;
                }
                trace!("remove fixup: black nephews, continue at parent");
                node = parent;
                continue;
            }

            if !self.nodes.color_of(far).is_red() {
                trace!("remove fixup: near nephew red, rotate at sibling");
                if let Some(n) = near {
                    self.nodes[n].color = Color::Black;
                }
                self.nodes[sibling].color = Color::Red;
                self.rotate(sibling, far_side);
                let Some(next) = self.nodes[parent][far_side] else {
                    break;
                };
                sibling = next;
            }

            trace!("remove fixup: far nephew red, rotate at parent");
            self.nodes[sibling].color = self.nodes[parent].color;
            self.nodes[parent].color = Color::Black;
            if let Some(f) = self.nodes[sibling][far_side] {
                self.nodes[f].color = Color::Black;
            }
            self.rotate(parent, side);
            break;
        }
    }
}
