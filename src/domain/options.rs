//! Flattening a hierarchy into display-ordered, indented options.

use std::borrow::Cow;

use serde::Serialize;

use crate::domain::{build_tree, Item, ItemId, TreeNode};

/// The prefix repeated once per level of depth in an option label.
pub const DEFAULT_INDENT: &str = "— ";

/// A display-ready entry in a selection control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// The identifier of the item this option selects.
    pub key: ItemId,
    /// The indented, unescaped label.
    pub label: String,
}

impl SelectOption {
    /// Creates an option.
    #[must_use]
    pub fn new(key: ItemId, label: impl Into<String>) -> Self {
        Self {
            key,
            label: label.into(),
        }
    }
}

/// A depth-first, pre-order walk over a hierarchy yielding options.
///
/// A node is yielded before its children, and children in their stored
/// order. The walk borrows the tree and can be cloned or recreated to start
/// over; it always yields the same sequence for the same tree.
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    indent: &'a str,
    stack: Vec<(&'a TreeNode, usize)>,
}

impl<'a> Flatten<'a> {
    /// Walks `roots` using [`DEFAULT_INDENT`].
    #[must_use]
    pub fn new(roots: &'a [TreeNode]) -> Self {
        Self::with_indent(roots, DEFAULT_INDENT)
    }

    /// Walks `roots`, prefixing each label with `indent` once per level.
    #[must_use]
    pub fn with_indent(roots: &'a [TreeNode], indent: &'a str) -> Self {
        Self {
            indent,
            stack: roots.iter().rev().map(|node| (node, 0)).collect(),
        }
    }
}

impl Iterator for Flatten<'_> {
    type Item = SelectOption;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        Some(SelectOption {
            key: node.item.id,
            label: label(self.indent, depth, &node.item.display_name()),
        })
    }
}

/// Flattens a hierarchy into options using [`DEFAULT_INDENT`].
#[must_use]
pub fn flatten(roots: &[TreeNode]) -> Vec<SelectOption> {
    Flatten::new(roots).collect()
}

/// Builds the hierarchy for `items` and flattens it in one step.
#[must_use]
pub fn options_from_items(items: &[Item], indent: &str) -> Vec<SelectOption> {
    let tree = build_tree(items);
    Flatten::with_indent(&tree, indent).collect()
}

/// Formats an option label: `indent` repeated `depth` times, then the
/// unescaped name.
#[must_use]
pub fn label(indent: &str, depth: usize, name: &str) -> String {
    let name = unescape(name);
    let mut label = String::with_capacity(indent.len() * depth + name.len());
    for _ in 0..depth {
        label.push_str(indent);
    }
    label.push_str(&name);
    label
}

const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// Decodes the HTML entities the host escapes titles with.
///
/// Only `&amp;`, `&lt;`, `&gt;`, `&quot;` and `&#39;` are decoded, in a
/// single pass; any other text, including other entities, is left as is.
#[must_use]
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        match ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, decoded)) => {
                out.push(*decoded);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
