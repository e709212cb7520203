//! Deciding what a picker displays from its options, selection and search.

use std::borrow::Cow;

use serde::Serialize;
use tracing::debug;

use crate::domain::{
    item::display_name,
    options::{unescape, SelectOption},
    Item, ItemId, Title,
};

/// The record for the current selection, resolved independently of the
/// option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRecord {
    /// The identifier of the selected item.
    pub id: ItemId,
    /// The selected item's title.
    pub title: Title,
}

impl SelectionRecord {
    /// Creates a record whose raw and rendered titles are both `title`.
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(id),
            title: Title::new(title),
        }
    }

    /// The name shown for the selected item.
    #[must_use]
    pub fn display_name(&self) -> Cow<'_, str> {
        display_name(self.id, &self.title)
    }

    /// Whether `text` is what the input shows for this record.
    fn is_shown_as(&self, text: &str) -> bool {
        text == self.title.raw || text == self.title.rendered
    }
}

impl From<&Item> for SelectionRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
        }
    }
}

/// The render-ready state of a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    /// The options to list, in display order.
    pub options: Vec<SelectOption>,
    /// The position of the current selection in `options`, if present.
    pub selected_index: Option<usize>,
    /// The text to show in the input.
    pub input_text: String,
}

impl View {
    /// The option matching the current selection, if it is listed.
    #[must_use]
    pub fn selected(&self) -> Option<&SelectOption> {
        self.selected_index.and_then(|index| self.options.get(index))
    }

    /// The option to present as selected.
    ///
    /// This is the current selection when it is listed, otherwise the first
    /// option. Falling back to the first option is for display only; it does
    /// not change the selection.
    #[must_use]
    pub fn provisional(&self) -> Option<&SelectOption> {
        self.selected().or_else(|| self.options.first())
    }
}

/// Whether `search_text` narrows the options rather than echoing the
/// current selection.
///
/// Any non-empty text is a search when no selection record is loaded.
#[must_use]
pub fn is_searching(search_text: &str, record: Option<&SelectionRecord>) -> bool {
    !search_text.is_empty() && record.is_none_or(|record| !record.is_shown_as(search_text))
}

/// Reconciles an option list with the current selection and search.
///
/// While searching, `options` are returned unchanged. Otherwise, if the
/// selected item is missing from `options` and its record is loaded, an
/// option for it is put first so the selection stays visible. A record for
/// a different item than `selection` is stale and never listed.
///
/// `input_text` is the record's raw title when a record is loaded, else the
/// search text.
#[must_use]
pub fn reconcile(
    mut options: Vec<SelectOption>,
    selection: Option<ItemId>,
    record: Option<&SelectionRecord>,
    search_text: &str,
) -> View {
    if !is_searching(search_text, record) {
        if let (Some(selected), Some(record)) = (selection, record) {
            let listed = options.iter().any(|option| option.key == selected);
            if !listed && record.id == selected {
                debug!(%selected, "listing current selection missing from options");
                options.insert(
                    0,
                    SelectOption::new(record.id, unescape(&record.display_name())),
                );
            }
        }
    }

    let selected_index =
        selection.and_then(|selected| options.iter().position(|option| option.key == selected));

    let input_text = record.map_or_else(|| search_text.to_string(), |record| record.title.raw.clone());

    View {
        options,
        selected_index,
        input_text,
    }
}
