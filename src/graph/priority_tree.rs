//! Priority search tree over keyed 2-D points.
//!
//! Each node holds the highest-Y point of its subtree (max-heap on Y) and a
//! `border` X value: every point of the left subtree has `x <= border`, every
//! point of the right subtree has `x > border`. Mutations append to or remove
//! from the flat item list and rebuild the whole tree into a fresh node arena.

use std::cmp::Ordering;

use crate::geometry::Point;

/// Something that can be stored in a [`PriorityTree`].
pub trait TreeItem {
    type Key: PartialEq;

    fn key(&self) -> Self::Key;
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

impl TreeItem for Point {
    type Key = (u64, u64);

    fn key(&self) -> Self::Key {
        self.bits()
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    item: usize,
    border: f64,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PriorityTree<T> {
    items: Vec<T>,
    nodes: Vec<TreeNode>,
    root: Option<usize>,
}

impl<T> Default for PriorityTree<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            nodes: Vec::new(),
            root: None,
        }
    }
}

impl<T: TreeItem> PriorityTree<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut tree = Self::new();
        tree.build(items);
        tree
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item with the largest Y.
    pub fn root(&self) -> Option<&T> {
        self.root.map(|idx| &self.items[self.nodes[idx].item])
    }

    /// Items in the order they were inserted.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Replaces the contents with `items` and builds the tree from scratch.
    pub fn build(&mut self, items: impl IntoIterator<Item = T>) {
        self.items = items.into_iter().collect();
        self.rebuild();
    }

    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        self.rebuild();
    }

    /// Removes the first item at exactly `(x, y)`.
    pub fn remove(&mut self, x: f64, y: f64) -> Option<T> {
        let pos = self
            .items
            .iter()
            .position(|item| item.x() == x && item.y() == y)?;
        let removed = self.items.remove(pos);
        self.rebuild();
        Some(removed)
    }

    pub fn remove_by_key(&mut self, key: &T::Key) -> Option<T> {
        let pos = self.items.iter().position(|item| item.key() == *key)?;
        let removed = self.items.remove(pos);
        self.rebuild();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.nodes.clear();
        self.root = None;
    }

    /// Exact coordinate lookup.
    pub fn find(&self, x: f64, y: f64) -> Option<&T> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            let item = &self.items[node.item];
            if item.x() == x && item.y() == y {
                return Some(item);
            }
            // Everything below has a Y no larger than this node's.
            if item.y() < y {
                return None;
            }
            current = if node.border >= x {
                node.left
            } else {
                node.right
            };
        }
        None
    }

    /// Linear scan over the item list.
    pub fn find_by_key(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == *key)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.find(x, y).is_some()
    }

    /// All items inside the closed rectangle `[x1, x2] x [y1, y2]`.
    ///
    /// Recursion is pruned on `y1` and the node borders only; `y2` filters
    /// the visited nodes but never stops a descent.
    pub fn interval_find(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<&T> {
        let mut found = Vec::new();
        self.interval_find_from(self.root, (x1, y1, x2, y2), &mut found);
        found
    }

    fn interval_find_from<'a>(
        &'a self,
        node: Option<usize>,
        rect: (f64, f64, f64, f64),
        found: &mut Vec<&'a T>,
    ) {
        let Some(idx) = node else {
            return;
        };
        let (x1, y1, x2, y2) = rect;
        let node = &self.nodes[idx];
        let item = &self.items[node.item];
        if item.x() >= x1 && item.x() <= x2 && item.y() >= y1 && item.y() <= y2 {
            found.push(item);
        }
        if node.left.is_some() && y1 <= item.y() && x1 <= node.border {
            self.interval_find_from(node.left, rect, found);
        }
        if node.right.is_some() && y1 <= item.y() && x2 > node.border {
            self.interval_find_from(node.right, rect, found);
        }
    }

    /// Pre-order walk: node, left subtree, right subtree.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }

    fn rebuild(&mut self) {
        let mut nodes = Vec::with_capacity(self.items.len());
        let order = (0..self.items.len()).collect();
        let root = build_subtree(&self.items, order, &mut nodes);
        self.nodes = nodes;
        self.root = root;
    }
}

fn by_y<T: TreeItem>(items: &[T]) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |a: &usize, b: &usize| items[*a].y().total_cmp(&items[*b].y())
}

fn by_x<T: TreeItem>(items: &[T]) -> impl Fn(&usize, &usize) -> Ordering + '_ {
    move |a: &usize, b: &usize| items[*a].x().total_cmp(&items[*b].x())
}

fn build_subtree<T: TreeItem>(
    items: &[T],
    mut order: Vec<usize>,
    nodes: &mut Vec<TreeNode>,
) -> Option<usize> {
    // Stable sorts: among equal Y the last inserted item becomes the node.
    order.sort_by(by_y(items));
    let top = order.pop()?;
    let slot = nodes.len();
    nodes.push(TreeNode {
        item: top,
        border: items[top].x(),
        left: None,
        right: None,
    });
    if order.is_empty() {
        return Some(slot);
    }

    order.sort_by(by_x(items));
    let border = items[order[order.len() / 2]].x();
    let (left, right): (Vec<usize>, Vec<usize>) =
        order.into_iter().partition(|idx| items[*idx].x() <= border);
    let left = build_subtree(items, left, nodes);
    let right = build_subtree(items, right, nodes);

    let node = &mut nodes[slot];
    node.border = border;
    node.left = left;
    node.right = right;
    Some(slot)
}

pub struct Iter<'a, T> {
    tree: &'a PriorityTree<T>,
    stack: Vec<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = &self.tree.nodes[idx];
        if let Some(right) = node.right {
            self.stack.push(right);
        }
        if let Some(left) = node.left {
            self.stack.push(left);
        }
        Some(&self.tree.items[node.item])
    }
}

impl<'a, T: TreeItem> IntoIterator for &'a PriorityTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn points(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    /// Checks the heap and partition properties of every node, returning the
    /// number of nodes reached from the root.
    fn assert_invariants(tree: &PriorityTree<Point>) -> usize {
        fn subtree(tree: &PriorityTree<Point>, node: Option<usize>, out: &mut Vec<Point>) {
            if let Some(idx) = node {
                let n = &tree.nodes[idx];
                out.push(tree.items[n.item]);
                subtree(tree, n.left, out);
                subtree(tree, n.right, out);
            }
        }

        for node in &tree.nodes {
            let owner = tree.items[node.item];
            let mut left = Vec::new();
            let mut right = Vec::new();
            subtree(tree, node.left, &mut left);
            subtree(tree, node.right, &mut right);
            for p in left.iter().chain(right.iter()) {
                assert!(p.y <= owner.y, "heap violated: {p:?} under {owner:?}");
            }
            for p in &left {
                assert!(p.x <= node.border, "left {p:?} beyond border {}", node.border);
            }
            for p in &right {
                assert!(p.x > node.border, "right {p:?} within border {}", node.border);
            }
        }
        let mut all = Vec::new();
        subtree(tree, tree.root, &mut all);
        all.len()
    }

    fn shape(tree: &PriorityTree<Point>) -> Vec<(u64, u64, u64)> {
        fn walk(tree: &PriorityTree<Point>, node: Option<usize>, out: &mut Vec<(u64, u64, u64)>) {
            match node {
                Some(idx) => {
                    let n = &tree.nodes[idx];
                    let (x, y) = tree.items[n.item].bits();
                    out.push((x, y, n.border.to_bits()));
                    walk(tree, n.left, out);
                    walk(tree, n.right, out);
                }
                None => out.push((u64::MAX, u64::MAX, u64::MAX)),
            }
        }
        let mut out = Vec::new();
        walk(tree, tree.root, &mut out);
        out
    }

    #[test]
    fn empty_tree_finds_nothing() {
        let tree: PriorityTree<Point> = PriorityTree::new();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.find(0.0, 0.0).is_none());
        assert!(tree.interval_find(-1.0, -1.0, 1.0, 1.0).is_empty());
        assert_eq!(tree.iter().count(), 0);
    }

    #[test]
    fn single_point_is_a_degenerate_leaf() {
        let tree = PriorityTree::from_items(points(&[(3.0, 4.0)]));
        assert_eq!(tree.root(), Some(&Point::new(3.0, 4.0)));
        assert_eq!(tree.nodes[0].border, 3.0);
        assert!(tree.nodes[0].left.is_none() && tree.nodes[0].right.is_none());
    }

    #[test]
    fn root_is_highest_y_and_border_is_median_x() {
        let tree = PriorityTree::from_items(points(&[
            (10.0, 1.0),
            (20.0, 2.0),
            (30.0, 9.0),
            (40.0, 3.0),
            (50.0, 4.0),
        ]));
        assert_eq!(tree.root(), Some(&Point::new(30.0, 9.0)));
        // Remaining X: 10, 20, 40, 50 -> median index 2.
        assert_eq!(tree.nodes[tree.root.unwrap()].border, 40.0);
        assert_eq!(assert_invariants(&tree), 5);
    }

    #[test]
    fn find_by_key_scans_items() {
        let tree = PriorityTree::from_items(points(&[(1.0, 1.0), (2.0, 5.0)]));
        let key = Point::new(2.0, 5.0).key();
        assert_eq!(tree.find_by_key(&key), Some(&Point::new(2.0, 5.0)));
        assert!(tree.find_by_key(&Point::new(5.0, 2.0).key()).is_none());
    }

    #[test]
    fn remove_last_point_empties_tree() {
        let mut tree = PriorityTree::from_items(points(&[(1.0, 1.0)]));
        assert_eq!(tree.remove(1.0, 1.0), Some(Point::new(1.0, 1.0)));
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.find(1.0, 1.0).is_none());
    }

    #[test]
    fn remove_missing_point_is_noop() {
        let mut tree = PriorityTree::from_items(points(&[(1.0, 1.0), (4.0, 2.0)]));
        let before = shape(&tree);
        assert!(tree.remove(9.0, 9.0).is_none());
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn iter_visits_root_first_then_left_then_right() {
        let tree = PriorityTree::from_items(points(&[(1.0, 1.0), (5.0, 10.0), (9.0, 2.0)]));
        let order: Vec<Point> = tree.iter().copied().collect();
        assert_eq!(order[0], Point::new(5.0, 10.0));
        assert_eq!(order.len(), 3);
        // border is 9.0 (median of [1, 9]), so both land on the left chain
        assert_eq!(order[1], Point::new(9.0, 2.0));
        assert_eq!(order[2], Point::new(1.0, 1.0));
    }

    #[test]
    fn interval_find_includes_boundaries() {
        let tree = PriorityTree::from_items(points(&[
            (0.0, 0.0),
            (5.0, 5.0),
            (10.0, 10.0),
            (10.0, 0.0),
        ]));
        let mut found: Vec<Point> = tree
            .interval_find(5.0, 0.0, 10.0, 5.0)
            .into_iter()
            .copied()
            .collect();
        found.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        assert_eq!(found, points(&[(5.0, 5.0), (10.0, 0.0)]));
    }

    #[test]
    fn clear_resets_everything() {
        let mut tree = PriorityTree::from_items(points(&[(1.0, 1.0), (2.0, 2.0)]));
        tree.clear();
        assert_eq!(tree.len(), 0);
        assert!(tree.root().is_none());
        assert!(!tree.contains(1.0, 1.0));
    }

    fn unique_points(max: usize) -> impl Strategy<Value = Vec<Point>> {
        prop::collection::vec((-40i32..40, -40i32..40), 0..max).prop_map(|coords| {
            let mut seen = HashSet::new();
            coords
                .into_iter()
                .filter(|c| seen.insert(*c))
                .map(|(x, y)| Point::new(x as f64, y as f64))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn invariants_hold_through_mutations(pts in unique_points(60)) {
            let mut tree = PriorityTree::new();
            for p in &pts {
                tree.insert(*p);
                prop_assert_eq!(assert_invariants(&tree), tree.len());
            }
            for p in &pts {
                prop_assert!(tree.remove(p.x, p.y).is_some());
                prop_assert_eq!(assert_invariants(&tree), tree.len());
            }
            prop_assert!(tree.is_empty());
        }

        #[test]
        fn find_matches_membership(pts in unique_points(60), probe in (-45i32..45, -45i32..45)) {
            let tree = PriorityTree::from_items(pts.clone());
            for p in &pts {
                prop_assert_eq!(tree.find(p.x, p.y), Some(p));
            }
            let probe = Point::new(probe.0 as f64, probe.1 as f64);
            prop_assert_eq!(tree.find(probe.x, probe.y).is_some(), pts.contains(&probe));
        }

        #[test]
        fn interval_find_matches_linear_scan(
            pts in unique_points(80),
            a in (-45i32..45, -45i32..45),
            b in (-45i32..45, -45i32..45),
        ) {
            let tree = PriorityTree::from_items(pts.clone());
            let (x1, x2) = (a.0.min(b.0) as f64, a.0.max(b.0) as f64);
            let (y1, y2) = (a.1.min(b.1) as f64, a.1.max(b.1) as f64);
            let mut expected: Vec<(u64, u64)> = pts
                .iter()
                .filter(|p| p.x >= x1 && p.x <= x2 && p.y >= y1 && p.y <= y2)
                .map(|p| p.bits())
                .collect();
            let mut actual: Vec<(u64, u64)> = tree
                .interval_find(x1, y1, x2, y2)
                .into_iter()
                .map(|p| p.bits())
                .collect();
            expected.sort_unstable();
            actual.sort_unstable();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn insert_then_remove_restores_shape(pts in unique_points(40), extra in (50i32..90, 50i32..90)) {
            let mut tree = PriorityTree::from_items(pts);
            let before = shape(&tree);
            let extra = Point::new(extra.0 as f64, extra.1 as f64);
            tree.insert(extra);
            prop_assert!(tree.contains(extra.x, extra.y));
            tree.remove(extra.x, extra.y);
            prop_assert_eq!(shape(&tree), before);
        }
    }
}
