//! Domain models for hierarchical pickers.
//!
//! This module contains the core types: flat items with parent references,
//! the tree built from them, the indented options flattened from the tree,
//! and the reconciliation of options with the current selection and search.

/// Items, identifiers and titles.
pub mod item;
pub use item::{Item, ItemId, Title};

mod tree;
pub use tree::{build_tree, cycles, TreeNode, Walk};

/// Flattening trees into display-ordered options.
pub mod options;
pub use options::{flatten, options_from_items, Flatten, SelectOption, DEFAULT_INDENT};

mod reconcile;
pub use reconcile::{is_searching, reconcile, SelectionRecord, View};

mod config;
pub use config::{Config, ConfigError};
