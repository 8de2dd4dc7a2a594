//! Text rendering of the tree's exact shape.
//!
//! Every level of the tree gets one line. A parent and its children are joined by
//! diagonal edges that are exactly as many rows tall as the parent is offset
//! horizontally from each child, both children sit at the same distance from the
//! parent, and reading the tokens left to right gives the keys in order. Within
//! those rules the layout is as narrow as a greedy bottom-up pass can make it.

use std::fmt::Display;
use std::io::Write;

use log::debug;

use crate::rb_error::RenderError;
use crate::rb_node::{Color, Direction, NodeArena, NodeId};
use crate::RbTreeMap;

/// Every token is the key text wrapped in one color marker on each side.
const MARKER_CHARS: usize = 2;

/// Characters used when drawing a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    /// Wraps the token of a red node.
    pub red_marker: char,
    /// Wraps the token of a black node.
    pub black_marker: char,
    /// Left-pads key text shorter than the widest key.
    pub pad: char,
    /// Whether `print` writes the marker legend above the tree.
    pub legend: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            red_marker: '*',
            black_marker: '+',
            pad: '0',
            legend: true,
        }
    }
}

impl RenderStyle {
    fn marker(&self, color: Color) -> char {
        match color {
            Color::Red => self.red_marker,
            Color::Black => self.black_marker,
        }
    }

    fn legend_line(&self) -> String {
        format!(
            "Note: \"{}\" denotes Red node, while \"{}\" denotes Black node.",
            self.red_marker, self.black_marker
        )
    }
}

/// Per-node scratch of one render pass.
#[derive(Debug, Clone, Copy, Default)]
struct NodeLayout {
    /// Rows of edges below the node, and the horizontal gap to each child.
    spacing_factor: usize,
    /// Column of the node's first token character.
    left_offset: usize,
    depth: usize,
}

struct Layout<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    levels: Vec<Vec<NodeId>>,
    scratch: Vec<NodeLayout>,
    chars_per_key: usize,
}

impl<'a, K, V> Layout<'a, K, V> {
    fn new(map: &'a RbTreeMap<K, V>, chars_per_key: usize) -> Self {
        let levels = map.levels();
        let mut scratch = vec![NodeLayout::default(); map.nodes.len()];
        for (depth, level) in levels.iter().enumerate() {
            for id in level {
                scratch[id.index()].depth = depth;
            }
        }
        Layout {
            nodes: &map.nodes,
            levels,
            scratch,
            chars_per_key,
        }
    }

    fn spacing(&self, id: NodeId) -> usize {
        self.scratch[id.index()].spacing_factor
    }

    fn depth(&self, id: NodeId) -> usize {
        self.scratch[id.index()].depth
    }

    /// How far the subtree at `start` reaches towards `dir`, measured from `start`'s own
    /// token. Follows the `dir` spine while the next node still has a `dir` child.
    fn spine_extent(&self, start: Option<NodeId>, dir: Direction) -> usize {
        let Some(mut id) = start else {
            return 0;
        };
        let mut extent = self.spacing(id) + self.chars_per_key;
        while let Some(next) = self.nodes[id][dir] {
            if !self.nodes[next].has_child(dir) {
                break;
            }
            id = next;
            extent += self.spacing(id) + self.chars_per_key;
        }
        extent
    }

    /// True when a grandchild would end up underneath the node if its children sat
    /// right next to it.
    fn has_inner_grandchild(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        let left_inner = node[Direction::Left].is_some_and(|l| self.nodes[l].has_child(Direction::Right));
        let right_inner = node[Direction::Right].is_some_and(|r| self.nodes[r].has_child(Direction::Left));
        left_inner || right_inner
    }

    fn own_spacing(&self, id: NodeId) -> usize {
        if self.nodes[id].is_leaf() || !self.has_inner_grandchild(id) {
            return 0;
        }
        let node = &self.nodes[id];
        self.spine_extent(node[Direction::Left], Direction::Right)
            .max(self.spine_extent(node[Direction::Right], Direction::Left))
    }

    /// Bottom-up: each level takes the widest spacing any of its nodes needs, so
    /// siblings and cousins all draw their edges equally long.
    fn fill_spacing_factors(&mut self) {
        for depth in (0..self.levels.len()).rev() {
            let widest = self.levels[depth]
                .iter()
                .map(|&id| self.own_spacing(id))
                .max()
                .unwrap_or(0);
            for &id in &self.levels[depth] {
                self.scratch[id.index()].spacing_factor = widest;
            }
        }
    }

    /// Places the nodes of `order` left to right, each relative to the one before it.
    fn assign_offsets(&mut self, order: &[NodeId]) -> Result<(), RenderError> {
        let mut prev: Option<NodeId> = None;
        for &cur in order {
            let offset = match prev {
                None => 0,
                Some(p) => self.offset_after(p, cur)?,
            };
            self.scratch[cur.index()].left_offset = offset;
            prev = Some(cur);
        }
        Ok(())
    }

    fn offset_after(&self, prev: NodeId, cur: NodeId) -> Result<usize, RenderError> {
        let cpk = self.chars_per_key as isize;
        let prev_offset = self.scratch[prev.index()].left_offset as isize;
        let spacing = |id: NodeId| self.spacing(id) as isize;
        let extent = |start: Option<NodeId>, dir: Direction| self.spine_extent(start, dir) as isize;

        let offset = if self.nodes[prev].parent == Some(cur) {
            // prev is cur's left child
            prev_offset + spacing(cur) + cpk
        } else if self.nodes[cur].parent == Some(prev) {
            // cur is prev's right child
            prev_offset + spacing(prev) + cpk
        } else if self.depth(cur) > self.depth(prev) {
            // cur is the leftmost node under prev's right child
            prev_offset + spacing(prev) - extent(self.nodes[prev][Direction::Right], Direction::Left) + cpk
        } else if self.depth(cur) < self.depth(prev) {
            // prev is the rightmost node under cur's left child
            prev_offset + cpk + spacing(cur) - extent(self.nodes[cur][Direction::Left], Direction::Right)
        } else {
            return Err(RenderError::MalformedTree);
        };
        usize::try_from(offset).map_err(|_| RenderError::MalformedTree)
    }

    fn token(&self, id: NodeId, text: &str, style: &RenderStyle) -> String {
        let marker = style.marker(self.nodes[id].color);
        let width = self.chars_per_key - MARKER_CHARS;
        let mut token = String::with_capacity(self.chars_per_key);
        token.push(marker);
        token.extend(std::iter::repeat(style.pad).take(width.saturating_sub(text.chars().count())));
        token.push_str(text);
        token.push(marker);
        token
    }

    fn emit(&self, texts: &[String], style: &RenderStyle) -> Vec<String> {
        let mut lines = Vec::new();
        for level in &self.levels {
            let mut line = String::new();
            let mut column = 0;
            // (direction, column) of every edge leaving this level
            let mut edges: Vec<(Direction, isize)> = Vec::new();

            for &id in level {
                let offset = self.scratch[id.index()].left_offset;
                if self.nodes[id].has_child(Direction::Left) {
                    edges.push((Direction::Left, offset as isize));
                }
                if self.nodes[id].has_child(Direction::Right) {
                    edges.push((Direction::Right, (offset + self.chars_per_key - 1) as isize));
                }
                line.extend(std::iter::repeat(' ').take(offset.saturating_sub(column)));
                line.push_str(&self.token(id, &texts[id.index()], style));
                column = offset + self.chars_per_key;
            }
            lines.push(line);

            if edges.is_empty() {
                continue;
            }
            let rows = level.first().map_or(0, |&id| self.spacing(id));
            for _ in 0..rows {
                for edge in edges.iter_mut() {
                    match edge.0 {
                        Direction::Left => edge.1 -= 1,
                        Direction::Right => edge.1 += 1,
                    }
                }
                let mut row = String::new();
                let mut column: isize = 0;
                for &(dir, position) in &edges {
                    while column < position {
                        row.push(' ');
                        column += 1;
                    }
                    row.push(match dir {
                        Direction::Left => '/',
                        Direction::Right => '\\',
                    });
                    column += 1;
                }
                lines.push(row);
            }
        }
        lines
    }
}

impl<K, V> RbTreeMap<K, V> {
    /// Renders the tree with the default style, using each key's `Display` text.
    pub fn render(&self) -> Result<Vec<String>, RenderError>
    where
        K: Display,
    {
        self.render_with(&RenderStyle::default(), |k| k.to_string())
    }

    /// Renders the tree, one `String` per output row.
    ///
    /// `key_text` turns a key into the text placed between the two color markers;
    /// shorter texts are padded to the widest one. An empty tree renders to no rows.
    pub fn render_with<F>(&self, style: &RenderStyle, key_text: F) -> Result<Vec<String>, RenderError>
    where
        F: Fn(&K) -> String,
    {
        if self.root.is_none() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = self.nodes.iter().map(|node| key_text(&node.key)).collect();
        let widest = texts.iter().map(|t| t.chars().count()).max().unwrap_or(0);

        let mut layout = Layout::new(self, widest + MARKER_CHARS);
        layout.fill_spacing_factors();
        layout.assign_offsets(&self.in_order_ids())?;
        let lines = layout.emit(&texts, style);

        debug!(
            "rendered {} keys: {} levels, {} chars per key, {} rows, {} columns",
            self.len(),
            layout.levels.len(),
            layout.chars_per_key,
            lines.len(),
            lines.iter().map(|l| l.chars().count()).max().unwrap_or(0)
        );
        Ok(lines)
    }

    /// Writes the legend and the rendered tree to `sink` with the default style.
    pub fn print<W: Write + ?Sized>(&self, sink: &mut W) -> Result<(), RenderError>
    where
        K: Display,
    {
        self.print_with(sink, &RenderStyle::default(), |k| k.to_string())
    }

    /// Writes the rendered tree to `sink`, preceded by the legend and a blank line when
    /// `style.legend` is set.
    pub fn print_with<W, F>(&self, sink: &mut W, style: &RenderStyle, key_text: F) -> Result<(), RenderError>
    where
        W: Write + ?Sized,
        F: Fn(&K) -> String,
    {
        let lines = self.render_with(style, key_text)?;
        if style.legend {
            writeln!(sink, "{}", style.legend_line())?;
            writeln!(sink)?;
        }
        for line in lines {
            writeln!(sink, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(keys: &[u32]) -> RbTreeMap<u32, u32> {
        let mut map = RbTreeMap::new();
        for &k in keys {
            map.insert(k, k).unwrap();
        }
        map
    }

    /// (column, key) of every token on the node rows of a default-style rendering.
    fn token_columns(lines: &[String]) -> Vec<(usize, u32)> {
        let mut found = Vec::new();
        for line in lines {
            let chars: Vec<char> = line.chars().collect();
            let mut i = 0;
            while i < chars.len() {
                let c = chars[i];
                if c == '*' || c == '+' {
                    let end = i + 1 + chars[i + 1..].iter().position(|&e| e == c).unwrap();
                    let key: String = chars[i + 1..end].iter().collect();
                    found.push((i, key.parse().unwrap()));
                    i = end + 1;
                } else {
                    i += 1;
                }
            }
        }
        found
    }

    #[test]
    fn test_render_empty_tree() {
        let map: RbTreeMap<u32, u32> = RbTreeMap::new();
        assert!(map.render().unwrap().is_empty());
    }

    #[test]
    fn test_render_single_node() {
        let map = tree_of(&[7]);
        assert_eq!(map.render().unwrap(), vec!["+7+"]);
    }

    #[test]
    fn test_render_three_nodes_needs_no_edges() {
        let map = tree_of(&[10, 20, 30]);
        assert_eq!(map.render().unwrap(), vec!["    +20+", "*10*    *30*"]);
    }

    #[test]
    fn test_render_pads_short_keys() {
        let map = tree_of(&[5, 10]);
        assert_eq!(map.render().unwrap(), vec!["+05+", "    *10*"]);
    }

    #[test]
    fn test_render_spreads_crossing_subtrees() {
        // 2(1, 4(3, 5)): 3 would sit under 2 without spacing.
        let map = tree_of(&[1, 2, 3, 4, 5]);
        let expected = vec![
            "      +2+".to_string(),
            "     /   \\".to_string(),
            "    /     \\".to_string(),
            "   /       \\".to_string(),
            format!("+1+{}+4+", " ".repeat(9)),
            "         *3*   *5*".to_string(),
        ];
        assert_eq!(map.render().unwrap(), expected);
    }

    #[test]
    fn test_render_is_deterministic_and_read_only() {
        let map = tree_of(&(1..=14).collect::<Vec<_>>());
        let before = (map.len(), map.height(), map.in_order(), map.pre_order(), map.level_order());

        let first = map.render().unwrap();
        let second = map.render().unwrap();
        assert_eq!(first, second);

        let after = (map.len(), map.height(), map.in_order(), map.pre_order(), map.level_order());
        assert_eq!(before, after);
    }

    #[test]
    fn test_render_with_custom_style_and_text() {
        let map = tree_of(&[5, 10]);
        let style = RenderStyle {
            red_marker: 'r',
            black_marker: 'b',
            pad: ' ',
            legend: false,
        };
        let lines = map.render_with(&style, |k| format!("k{}", k)).unwrap();
        assert_eq!(lines, vec!["b k5b", "     rk10r"]);
    }

    #[test]
    fn test_print_writes_legend() {
        let map = tree_of(&[7]);
        let mut out = Vec::new();
        map.print(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Note: \"*\" denotes Red node, while \"+\" denotes Black node.\n\n+7+\n"
        );
    }

    #[test]
    fn test_print_without_legend() {
        let map = tree_of(&[10, 20, 30]);
        let style = RenderStyle {
            legend: false,
            ..RenderStyle::default()
        };
        let mut out = Vec::new();
        map.print_with(&mut out, &style, |k| k.to_string()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "    +20+\n*10*    *30*\n");
    }

    #[test]
    fn test_one_node_row_per_level() {
        let map = tree_of(&(1..=40).collect::<Vec<_>>());
        let lines = map.render().unwrap();
        let node_rows = lines
            .iter()
            .filter(|l| l.contains('*') || l.contains('+'))
            .count();
        assert_eq!(node_rows, map.height());
        assert_eq!(token_columns(&lines).len(), map.len());
    }

    #[test]
    fn test_tokens_read_in_key_order() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(2024);
        for round in 0..30 {
            let mut map = RbTreeMap::new();
            for _ in 0..rng.gen_range(1..80) {
                let _ = map.insert(rng.gen_range(0..500u32), ());
            }
            if round % 2 == 1 {
                for _ in 0..20 {
                    map.remove(&rng.gen_range(0..500u32));
                }
            }

            let lines = map.render().unwrap();
            let mut tokens = token_columns(&lines);
            tokens.sort_unstable();
            let keys: Vec<u32> = tokens.iter().map(|&(_, k)| k).collect();
            let expected: Vec<u32> = map.in_order().into_iter().copied().collect();
            assert_eq!(keys, expected, "round {}", round);
        }
    }

    #[test]
    fn test_children_sit_symmetrically() {
        let map = tree_of(&[50, 20, 80, 10, 30, 70, 90, 25, 35, 65, 5, 1, 33, 36, 75]);
        let widest = map.nodes.iter().map(|n| n.key.to_string().len()).max().unwrap();
        let mut layout = Layout::new(&map, widest + MARKER_CHARS);
        layout.fill_spacing_factors();
        layout.assign_offsets(&map.in_order_ids()).unwrap();

        let cpk = layout.chars_per_key;
        for level in &layout.levels {
            let spacing = layout.spacing(level[0]);
            for &id in level {
                assert_eq!(layout.spacing(id), spacing);
                let offset = layout.scratch[id.index()].left_offset;
                if let Some(l) = map.nodes[id][Direction::Left] {
                    assert_eq!(layout.scratch[l.index()].left_offset + spacing + cpk, offset);
                }
                if let Some(r) = map.nodes[id][Direction::Right] {
                    assert_eq!(layout.scratch[r.index()].left_offset, offset + spacing + cpk);
                }
            }
        }
    }

    #[test]
    fn test_offsets_reject_misplaced_neighbours() {
        let map = tree_of(&[10, 20, 30]);
        let mut layout = Layout::new(&map, 4);
        layout.fill_spacing_factors();

        // Two siblings are never adjacent in key order.
        let left = map.find(&10).unwrap();
        let right = map.find(&30).unwrap();
        let err = layout.assign_offsets(&[left, right]).unwrap_err();
        assert!(matches!(err, RenderError::MalformedTree));
    }
}
