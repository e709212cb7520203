//! Hierarchical parent pickers
//!
//! Flat items with parent references are built into a tree, flattened into
//! indented options, and reconciled with the current selection and search.

pub mod domain;
pub use domain::{
    build_tree, cycles, flatten, reconcile, Config, Item, ItemId, SelectOption, SelectionRecord,
    TreeNode, View,
};

pub mod picker;
pub use picker::{Debouncer, ParentEdit, Picker, PickerState, PostType};

/// Loading items from JSON.
pub mod storage;
pub use storage::LoadError;
