//! Nested hierarchy built from a flat collection of items.
//!
//! Building a tree knows nothing about where the items came from. It groups
//! items by their parent identifier and attaches children to parents,
//! preserving the input order of siblings.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};
use tracing::{instrument, warn};

use crate::domain::{Item, ItemId};

/// An item together with its materialised children.
///
/// Dropping, cloning, comparing and formatting all walk the subtree with an
/// explicit stack, so arbitrarily deep hierarchies are safe to handle.
pub struct TreeNode {
    /// The item at this node.
    pub item: Item,
    /// Child nodes, in the order they appeared in the input.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates a node with no children.
    #[must_use]
    pub const fn leaf(item: Item) -> Self {
        Self {
            item,
            children: Vec::new(),
        }
    }

    /// Walks this subtree in pre-order, yielding each node with its depth
    /// below this one.
    #[must_use]
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(self, 0)],
        }
    }

    /// The number of nodes in this subtree, including this one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    /// Always `false`: a node contains at least itself.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Pre-order walk over a subtree. See [`TreeNode::walk`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<(&'a TreeNode, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        Some((depth, node))
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl Clone for TreeNode {
    fn clone(&self) -> Self {
        let mut nodes = Vec::new();
        let mut stack = vec![(self, None)];
        while let Some((node, attach_to)) = stack.pop() {
            let position = nodes.len();
            nodes.push((node.item.clone(), attach_to));
            stack.extend(node.children.iter().rev().map(|child| (child, Some(position))));
        }
        // Exactly one root: the first node pushed.
        assemble(nodes)
            .pop()
            .unwrap_or_else(|| Self::leaf(self.item.clone()))
    }
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((left, right)) = stack.pop() {
            if left.item != right.item || left.children.len() != right.children.len() {
                return false;
            }
            stack.extend(left.children.iter().zip(&right.children));
        }
        true
    }
}

impl Eq for TreeNode {}

impl fmt::Debug for TreeNode {
    /// Formats the subtree as a flat pre-order list of `(depth, item)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.walk().map(|(depth, node)| (depth, &node.item)))
            .finish()
    }
}

/// Builds nodes from a pre-order list of items, each naming the position of
/// the entry it hangs from. Returns the roots in order.
fn assemble(nodes: Vec<(Item, Option<usize>)>) -> Vec<TreeNode> {
    // In reverse pre-order every node's descendants are complete before the
    // node itself is built.
    let mut pending: Vec<Vec<TreeNode>> = std::iter::repeat_with(Vec::new)
        .take(nodes.len())
        .collect();
    let mut roots = Vec::new();
    for (position, (item, attach_to)) in nodes.into_iter().enumerate().rev() {
        let mut children = std::mem::take(&mut pending[position]);
        children.reverse();
        let node = TreeNode { item, children };
        match attach_to {
            Some(parent) => pending[parent].push(node),
            None => roots.push(node),
        }
    }
    roots.reverse();
    roots
}

/// Builds a nested hierarchy from a flat collection of items.
///
/// The returned sequence holds only the roots. An item is a root when it has
/// no parent, or when its parent does not exist in the collection.
///
/// Items that sit on a parent cycle (and everything below them) cannot be
/// reached from any root and are dropped. Each item is placed at most once,
/// so the build always terminates.
#[must_use]
#[instrument(level = "debug", skip_all, fields(items = items.len()))]
pub fn build_tree(items: &[Item]) -> Vec<TreeNode> {
    let ids: HashSet<ItemId> = items.iter().map(|item| item.id).collect();

    // Item indices grouped by parent id, in input order.
    let mut children_of: HashMap<ItemId, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match item.parent {
            Some(parent) if ids.contains(&parent) => {
                children_of.entry(parent).or_default().push(index);
            }
            _ => roots.push(index),
        }
    }

    // Pre-order walk with an explicit stack. Each entry records the position
    // in `order` of the node it hangs from.
    let mut visited = vec![false; items.len()];
    let mut order: Vec<(Item, Option<usize>)> = Vec::with_capacity(items.len());
    let mut stack: Vec<(usize, Option<usize>)> =
        roots.iter().rev().map(|&index| (index, None)).collect();

    while let Some((index, attach_to)) = stack.pop() {
        if visited[index] {
            continue;
        }
        visited[index] = true;
        let position = order.len();
        order.push((items[index].clone(), attach_to));

        if let Some(children) = children_of.get(&items[index].id) {
            stack.extend(
                children
                    .iter()
                    .rev()
                    .filter(|&&child| !visited[child])
                    .map(|&child| (child, Some(position))),
            );
        }
    }

    let dropped = items.len() - order.len();
    if dropped > 0 {
        warn!(dropped, "items unreachable from any root were left out of the tree");
    }

    assemble(order)
}

/// Returns every group of items whose parent references form a cycle.
///
/// Each group is sorted, and the groups themselves are sorted. An item that
/// names itself as its own parent forms a group of one.
#[must_use]
pub fn cycles(items: &[Item]) -> Vec<Vec<ItemId>> {
    let mut graph: DiGraphMap<ItemId, ()> = DiGraphMap::with_capacity(items.len(), items.len());
    for item in items {
        graph.add_node(item.id);
    }
    // Edges point from child to parent.
    for item in items {
        if let Some(parent) = item.parent {
            if graph.contains_node(parent) {
                graph.add_edge(item.id, parent, ());
            }
        }
    }

    let mut cycles = Vec::new();
    for mut component in tarjan_scc(&graph) {
        if component.len() > 1 {
            component.sort();
            cycles.push(component);
            continue;
        }

        let Some(&node) = component.first() else {
            continue;
        };

        if graph.contains_edge(node, node) {
            cycles.push(vec![node]);
        }
    }

    cycles.sort();
    cycles
}
