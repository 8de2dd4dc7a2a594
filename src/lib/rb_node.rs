use std::ops::{Index, IndexMut};

/// Color bit of a red-black node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// A red node. Never the root, never the parent of another red node.
    Red,
    /// A black node. Counted by the black-height.
    Black,
}

impl Color {
    /// Returns true for [`Color::Red`].
    pub fn is_red(self) -> bool {
        self == Color::Red
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    Left,
    Right,
}

impl Direction {
    pub(super) fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn slot(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
        }
    }
}

/// Handle of a node inside a [`NodeArena`]. Only valid until the next removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct NodeId(usize);

impl NodeId {
    pub(super) fn index(self) -> usize {
        self.0
    }
}

pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) parent: Option<NodeId>,
    pub(super) children: [Option<NodeId>; 2],
    pub(super) color: Color,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, parent: Option<NodeId>, color: Color) -> Self {
        Node {
            key,
            value,
            parent,
            children: [None, None],
            color,
        }
    }

    pub(super) fn has_child(&self, dir: Direction) -> bool {
        self.children[dir.slot()].is_some()
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children == [None, None]
    }
}

impl<K, V> Index<Direction> for Node<K, V> {
    type Output = Option<NodeId>;

    fn index(&self, dir: Direction) -> &Self::Output {
        &self.children[dir.slot()]
    }
}

impl<K, V> IndexMut<Direction> for Node<K, V> {
    fn index_mut(&mut self, dir: Direction) -> &mut Self::Output {
        &mut self.children[dir.slot()]
    }
}

/// Dense storage for the tree's nodes. Children own nothing here: every link is a
/// plain index and the arena is the only owner.
pub(super) struct NodeArena<K, V> {
    nodes: Vec<Node<K, V>>,
}

impl<K, V> NodeArena<K, V> {
    pub(super) fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    pub(super) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(super) fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Nodes in slot order, so the n-th item is the node behind the n-th `NodeId`.
    pub(super) fn iter(&self) -> std::slice::Iter<'_, Node<K, V>> {
        self.nodes.iter()
    }

    pub(super) fn alloc(&mut self, key: K, value: V, parent: Option<NodeId>, color: Color) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(key, value, parent, color));
        id
    }

    /// Color of an optional node. Absent children count as black.
    pub(super) fn color_of(&self, id: Option<NodeId>) -> Color {
        id.map_or(Color::Black, |id| self[id].color)
    }

    /// Which side of its parent `id` hangs on, `None` for the root.
    pub(super) fn side_of(&self, id: NodeId) -> Option<Direction> {
        let parent = self[id].parent?;
        if self[parent][Direction::Left] == Some(id) {
            Some(Direction::Left)
        } else {
            Some(Direction::Right)
        }
    }

    /// Hangs `child` under `parent` on side `dir`, fixing the back-reference too.
    pub(super) fn link(&mut self, parent: NodeId, dir: Direction, child: Option<NodeId>) {
        self[parent][dir] = child;
        if let Some(c) = child {
            self[c].parent = Some(parent);
        }
    }

    /// Walks `dir` children from `id` until there are none left.
    pub(super) fn extreme(&self, mut id: NodeId, dir: Direction) -> NodeId {
        while let Some(next) = self[id][dir] {
            id = next;
        }
        id
    }

    /// Exchanges the key/value payloads of two distinct nodes, leaving links and colors alone.
    pub(super) fn swap_entries(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (head, tail) = self.nodes.split_at_mut(hi);
        let (x, y) = (&mut head[lo], &mut tail[0]);
        std::mem::swap(&mut x.key, &mut y.key);
        std::mem::swap(&mut x.value, &mut y.value);
    }

    /// Frees a node that is no longer referenced by any link.
    ///
    /// The last node of the arena is moved into the freed slot, so every link to it
    /// (its parent's child slot or `root`, and its children's parent slots) is
    /// rewritten to the new index.
    pub(super) fn release(&mut self, id: NodeId, root: &mut Option<NodeId>) -> Node<K, V> {
        let last = NodeId(self.nodes.len() - 1);
        let node = self.nodes.swap_remove(id.0);
        if id != last {
            let moved_parent = self[id].parent;
            let moved_children = self[id].children;
            match moved_parent {
                Some(p) => {
                    let dir = if self[p][Direction::Left] == Some(last) {
                        Direction::Left
                    } else {
                        Direction::Right
                    };
                    self[p][dir] = Some(id);
                }
                None => *root = Some(id),
            }
            for child in moved_children.into_iter().flatten() {
                self[child].parent = Some(id);
            }
        }
        node
    }
}

impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.0]
    }
}
