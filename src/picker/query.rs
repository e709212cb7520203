use serde::Serialize;

use crate::domain::ItemId;

/// The fields requested for each item.
pub const FIELDS: &str = "id,title,parent";

/// Sort direction of a collection query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// The collection query the host runs to fetch candidate parents.
///
/// Serializes to the host's query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionQuery {
    /// Maximum number of items to return.
    pub per_page: u32,
    /// The item being edited, which cannot be its own parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<ItemId>,
    /// Excludes the children of the item being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_exclude: Option<ItemId>,
    /// The field items are sorted by.
    pub orderby: &'static str,
    /// Sort direction.
    pub order: Order,
    /// The fields to return for each item.
    #[serde(rename = "_fields")]
    pub fields: &'static str,
    /// Search text, when the user is narrowing the results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl CollectionQuery {
    /// A query for the first `per_page` items in menu order.
    #[must_use]
    pub const fn new(per_page: u32) -> Self {
        Self {
            per_page,
            exclude: None,
            parent_exclude: None,
            orderby: "menu_order",
            order: Order::Asc,
            fields: FIELDS,
            search: None,
        }
    }

    /// Excludes `item` and its children from the results.
    #[must_use]
    pub const fn excluding(mut self, item: Option<ItemId>) -> Self {
        self.exclude = item;
        self.parent_exclude = item;
        self
    }

    /// Narrows the results to items matching `search`.
    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search;
        self
    }
}
