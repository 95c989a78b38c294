//! Arena-backed red-black tree keyed by physical offset.

use super::iter::Iter;
use super::weight::{Measure, Metric, Weight};
use std::cmp::Ordering;
use std::ops::{Bound, RangeBounds};

/// Index of a node in the arena.
pub(super) type NodeId = usize;

/// Node color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Clone, Debug)]
pub(super) struct Node<V> {
    pub(super) key: usize,
    pub(super) value: V,
    pub(super) color: Color,
    pub(super) left: Option<NodeId>,
    pub(super) right: Option<NodeId>,
    pub(super) parent: Option<NodeId>,
    /// Weight of `value` alone.
    pub(super) weight: Weight,
    /// Weight of the subtree rooted here.
    pub(super) total: Weight,
}

/// Result of [`IndexTree::seek`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seek<'a, V> {
    pub key: usize,
    pub value: &'a V,
    /// Combined weight of every node ordered before this one.
    pub before: Weight,
}

/// Red-black tree mapping unique `usize` keys to payloads.
///
/// Nodes live in a `Vec` and link to each other by index, with `None` as the
/// absent child. Removing a node swap-removes it from the arena and relinks
/// whichever node took its slot, so the arena never holds dead entries.
///
/// Every node caches the [`Weight`] of its subtree, which makes prefix sums
/// and offset seeks O(log n) alongside the usual search, insert, remove.
#[derive(Clone, Debug)]
pub struct IndexTree<V> {
    pub(super) nodes: Vec<Node<V>>,
    pub(super) root: Option<NodeId>,
}

impl<V> Default for IndexTree<V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }
}

impl<V: Measure> IndexTree<V> {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Payload stored under `key`.
    #[must_use]
    pub fn get(&self, key: usize) -> Option<&V> {
        self.find(key).map(|id| &self.nodes[id].value)
    }

    /// Whether a node with `key` exists.
    #[must_use]
    pub fn contains_key(&self, key: usize) -> bool {
        self.find(key).is_some()
    }

    /// Insert `value` under `key`.
    ///
    /// Keys are unique: inserting an existing key replaces its payload in
    /// place and returns the previous one.
    pub fn insert(&mut self, key: usize, value: V) -> Option<V> {
        let mut parent = None;
        let mut cur = self.root;
        let mut go_left = false;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            match key.cmp(&node.key) {
                Ordering::Less => {
                    parent = Some(id);
                    go_left = true;
                    cur = node.left;
                }
                Ordering::Greater => {
                    parent = Some(id);
                    go_left = false;
                    cur = node.right;
                }
                Ordering::Equal => return Some(self.replace_value(id, value)),
            }
        }

        let weight = value.measure();
        let id = self.nodes.len();
        self.nodes.push(Node {
            key,
            value,
            color: Color::Red,
            left: None,
            right: None,
            parent,
            weight,
            total: weight,
        });
        match parent {
            None => self.root = Some(id),
            Some(p) if go_left => self.nodes[p].left = Some(id),
            Some(p) => self.nodes[p].right = Some(id),
        }
        self.refresh_upward(parent);
        self.insert_fixup(id);
        None
    }

    /// Replace the payload under `key` without touching the tree shape.
    ///
    /// Returns `false` when the key is absent.
    pub fn update(&mut self, key: usize, value: V) -> bool {
        match self.find(key) {
            Some(id) => {
                self.replace_value(id, value);
                true
            }
            None => false,
        }
    }

    /// Remove the node with `key`, returning its payload.
    pub fn remove(&mut self, key: usize) -> Option<V> {
        let id = self.find(key)?;
        self.unlink(id);
        Some(self.release(id))
    }

    /// Visit every `(key, payload)` pair in ascending key order.
    pub fn traverse_in_order<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &V),
    {
        for (key, value) in self.iter() {
            visit(key, value);
        }
    }

    /// Iterate in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self, self.root.map(|r| self.minimum(r)), Bound::Unbounded)
    }

    /// Iterate over the nodes whose keys fall in `range`.
    #[must_use]
    pub fn range<R>(&self, range: R) -> Iter<'_, V>
    where
        R: RangeBounds<usize>,
    {
        let start = match range.start_bound() {
            Bound::Included(&k) => self.lower_bound(k),
            Bound::Excluded(&k) => k.checked_add(1).and_then(|k| self.lower_bound(k)),
            Bound::Unbounded => self.root.map(|r| self.minimum(r)),
        };
        Iter::new(self, start, range.end_bound().cloned())
    }

    /// Smallest key and its payload.
    #[must_use]
    pub fn first(&self) -> Option<(usize, &V)> {
        let id = self.minimum(self.root?);
        Some((self.nodes[id].key, &self.nodes[id].value))
    }

    /// Largest key and its payload.
    #[must_use]
    pub fn last(&self) -> Option<(usize, &V)> {
        let id = self.maximum(self.root?);
        Some((self.nodes[id].key, &self.nodes[id].value))
    }

    /// Greatest key `<= key` and its payload.
    #[must_use]
    pub fn floor(&self, key: usize) -> Option<(usize, &V)> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if node.key <= key {
                best = Some(id);
                cur = node.right;
            } else {
                cur = node.left;
            }
        }
        best.map(|id| (self.nodes[id].key, &self.nodes[id].value))
    }

    /// Combined weight of the whole tree.
    #[must_use]
    pub fn total(&self) -> Weight {
        self.total_of(self.root)
    }

    /// Combined weight of every node with a key below `key`.
    #[must_use]
    pub fn prefix(&self, key: usize) -> Weight {
        let mut acc = Weight::ZERO;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if node.key < key {
                acc += self.total_of(node.left) + node.weight;
                cur = node.right;
            } else {
                cur = node.left;
            }
        }
        acc
    }

    /// Find the node whose span contains `target` along `metric`.
    ///
    /// Spans are laid end to end in key order. A node matches when
    /// `before <= target < before + weight`; zero-weight nodes never match.
    /// Returns `None` once `target` reaches the tree total.
    #[must_use]
    pub fn seek(&self, target: usize, metric: Metric) -> Option<Seek<'_, V>> {
        let mut remaining = target;
        let mut before = Weight::ZERO;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            let left = self.total_of(node.left);
            let left_len = left.get(metric);
            if remaining < left_len {
                cur = node.left;
                continue;
            }
            let own = node.weight.get(metric);
            if remaining < left_len + own {
                return Some(Seek {
                    key: node.key,
                    value: &node.value,
                    before: before + left,
                });
            }
            remaining -= left_len + own;
            before += left + node.weight;
            cur = node.right;
        }
        None
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[must_use]
    pub fn height(&self) -> usize {
        fn walk<V>(tree: &IndexTree<V>, id: Option<NodeId>) -> usize {
            id.map_or(0, |id| {
                let node = &tree.nodes[id];
                1 + walk(tree, node.left).max(walk(tree, node.right))
            })
        }
        walk(self, self.root)
    }

    fn find(&self, key: usize) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            cur = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    fn lower_bound(&self, key: usize) -> Option<NodeId> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if node.key >= key {
                best = Some(id);
                cur = node.left;
            } else {
                cur = node.right;
            }
        }
        best
    }

    fn replace_value(&mut self, id: NodeId, value: V) -> V {
        let weight = value.measure();
        let old = std::mem::replace(&mut self.nodes[id].value, value);
        self.nodes[id].weight = weight;
        self.refresh_upward(Some(id));
        old
    }

    // ------------------------------------------------------------------
    // Link helpers
    // ------------------------------------------------------------------

    fn color(&self, id: Option<NodeId>) -> Color {
        id.map_or(Color::Black, |id| self.nodes[id].color)
    }

    fn set_color(&mut self, id: Option<NodeId>, color: Color) {
        if let Some(id) = id {
            self.nodes[id].color = color;
        }
    }

    pub(super) fn total_of(&self, id: Option<NodeId>) -> Weight {
        id.map_or(Weight::ZERO, |id| self.nodes[id].total)
    }

    fn refresh(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let total = self.total_of(node.left) + node.weight + self.total_of(node.right);
        self.nodes[id].total = total;
    }

    fn refresh_upward(&mut self, mut cur: Option<NodeId>) {
        while let Some(id) = cur {
            self.refresh(id);
            cur = self.nodes[id].parent;
        }
    }

    pub(super) fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn maximum(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    pub(super) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.minimum(right));
        }
        let mut child = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].right != Some(child) {
                break;
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = new,
            Some(p) => self.nodes[p].right = new,
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].right else {
            return;
        };
        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
        self.refresh(x);
        self.refresh(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].left else {
            return;
        };
        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(x);
        }
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
        self.refresh(x);
        self.refresh(y);
    }

    // ------------------------------------------------------------------
    // Rebalancing
    // ------------------------------------------------------------------

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.nodes[z].parent {
            if self.nodes[p].color == Color::Black {
                break;
            }
            // A red parent is never the root.
            let Some(g) = self.nodes[p].parent else {
                break;
            };

            if self.nodes[g].left == Some(p) {
                let uncle = self.nodes[g].right;
                if self.color(uncle) == Color::Red {
                    self.nodes[p].color = Color::Black;
                    self.set_color(uncle, Color::Black);
                    self.nodes[g].color = Color::Red;
                    z = g;
                } else {
                    let (child, parent) = if self.nodes[p].right == Some(z) {
                        self.rotate_left(p);
                        (p, z)
                    } else {
                        (z, p)
                    };
                    z = child;
                    self.nodes[parent].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_right(g);
                }
            } else {
                let uncle = self.nodes[g].left;
                if self.color(uncle) == Color::Red {
                    self.nodes[p].color = Color::Black;
                    self.set_color(uncle, Color::Black);
                    self.nodes[g].color = Color::Red;
                    z = g;
                } else {
                    let (child, parent) = if self.nodes[p].left == Some(z) {
                        self.rotate_right(p);
                        (p, z)
                    } else {
                        (z, p)
                    };
                    z = child;
                    self.nodes[parent].color = Color::Black;
                    self.nodes[g].color = Color::Red;
                    self.rotate_left(g);
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }

    fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        let parent = self.nodes[u].parent;
        self.replace_child(parent, u, v);
        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    /// Splice `z` out of the tree. The node stays in the arena, detached.
    fn unlink(&mut self, z: NodeId) {
        let z_left = self.nodes[z].left;
        let z_right = self.nodes[z].right;
        let mut removed_color = self.nodes[z].color;
        let x;
        let x_parent;

        match (z_left, z_right) {
            (None, _) => {
                x = z_right;
                x_parent = self.nodes[z].parent;
                self.transplant(z, z_right);
            }
            (Some(_), None) => {
                x = z_left;
                x_parent = self.nodes[z].parent;
                self.transplant(z, z_left);
            }
            (Some(left), Some(right)) => {
                let y = self.minimum(right);
                removed_color = self.nodes[y].color;
                x = self.nodes[y].right;
                if self.nodes[y].parent == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self.nodes[y].parent;
                    self.transplant(y, x);
                    self.nodes[y].right = Some(right);
                    self.nodes[right].parent = Some(y);
                }
                self.transplant(z, Some(y));
                self.nodes[y].left = Some(left);
                self.nodes[left].parent = Some(y);
                self.nodes[y].color = self.nodes[z].color;
            }
        }

        self.refresh_upward(x_parent);
        if removed_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }

        let node = &mut self.nodes[z];
        node.left = None;
        node.right = None;
        node.parent = None;
    }

    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && self.color(x) == Color::Black {
            let Some(p) = parent else {
                break;
            };

            if self.nodes[p].left == x {
                let mut w = self.nodes[p].right;
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    w = self.nodes[p].right;
                }
                let Some(mut s) = w else {
                    x = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                };
                if self.color(self.nodes[s].left) == Color::Black
                    && self.color(self.nodes[s].right) == Color::Black
                {
                    self.nodes[s].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if self.color(self.nodes[s].right) == Color::Black {
                        self.set_color(self.nodes[s].left, Color::Black);
                        self.nodes[s].color = Color::Red;
                        self.rotate_right(s);
                        let Some(next) = self.nodes[p].right else {
                            break;
                        };
                        s = next;
                    }
                    self.nodes[s].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    self.set_color(self.nodes[s].right, Color::Black);
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let mut w = self.nodes[p].left;
                if self.color(w) == Color::Red {
                    self.set_color(w, Color::Black);
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    w = self.nodes[p].left;
                }
                let Some(mut s) = w else {
                    x = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                };
                if self.color(self.nodes[s].left) == Color::Black
                    && self.color(self.nodes[s].right) == Color::Black
                {
                    self.nodes[s].color = Color::Red;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if self.color(self.nodes[s].left) == Color::Black {
                        self.set_color(self.nodes[s].right, Color::Black);
                        self.nodes[s].color = Color::Red;
                        self.rotate_left(s);
                        let Some(next) = self.nodes[p].left else {
                            break;
                        };
                        s = next;
                    }
                    self.nodes[s].color = self.nodes[p].color;
                    self.nodes[p].color = Color::Black;
                    self.set_color(self.nodes[s].left, Color::Black);
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        self.set_color(x, Color::Black);
    }

    /// Drop a detached node from the arena and return its payload.
    fn release(&mut self, id: NodeId) -> V {
        let last = self.nodes.len() - 1;
        if id != last {
            // `last` moves into slot `id`; repoint everything that links to it.
            let moved = &self.nodes[last];
            let (parent, left, right) = (moved.parent, moved.left, moved.right);
            match parent {
                None => self.root = Some(id),
                Some(p) if self.nodes[p].left == Some(last) => self.nodes[p].left = Some(id),
                Some(p) => self.nodes[p].right = Some(id),
            }
            for child in [left, right].into_iter().flatten() {
                self.nodes[child].parent = Some(id);
            }
        }
        self.nodes.swap_remove(id).value
    }
}

impl<'a, V: Measure> IntoIterator for &'a IndexTree<V> {
    type Item = (usize, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
