use std::{borrow::Cow, fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// The identifier of an item in a hierarchical collection.
///
/// Identifiers are unique within a single collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw numeric identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// The title of an item, as stored and as rendered by the host.
///
/// Either form may be empty when the host omits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    /// The title as the user typed it.
    pub raw: String,
    /// The title as the host renders it. May contain HTML entities.
    pub rendered: String,
}

impl Title {
    /// A title whose raw and rendered forms are the same text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let rendered = text.into();
        Self {
            raw: rendered.clone(),
            rendered,
        }
    }
}

/// A flat record with an identifier and an optional parent identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The item's identifier.
    pub id: ItemId,
    /// The identifier of the parent item, if any.
    ///
    /// A parent that does not exist in the collection is treated as absent.
    pub parent: Option<ItemId>,
    /// The item's title.
    pub title: Title,
}

impl Item {
    /// Creates an item whose raw and rendered titles are both `title`.
    #[must_use]
    pub fn new(id: u64, parent: Option<u64>, title: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            parent: parent.map(ItemId),
            title: Title::new(title),
        }
    }

    /// The name shown for this item.
    ///
    /// Falls back to `#<id> (no title)` when the rendered title is empty.
    #[must_use]
    pub fn display_name(&self) -> Cow<'_, str> {
        display_name(self.id, &self.title)
    }
}

pub(crate) fn display_name(id: ItemId, title: &Title) -> Cow<'_, str> {
    if title.rendered.is_empty() {
        Cow::Owned(format!("#{id} (no title)"))
    } else {
        Cow::Borrowed(&title.rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_uses_rendered_title() {
        let item = Item::new(3, None, "About");
        assert_eq!(item.display_name(), "About");
    }

    #[test]
    fn missing_title_falls_back_to_id() {
        let item = Item {
            id: ItemId::new(42),
            parent: None,
            title: Title::default(),
        };
        assert_eq!(item.display_name(), "#42 (no title)");
    }

    #[test]
    fn raw_title_alone_is_not_displayed() {
        let item = Item {
            id: ItemId::new(7),
            parent: None,
            title: Title {
                raw: "Draft".to_string(),
                rendered: String::new(),
            },
        };
        assert_eq!(item.display_name(), "#7 (no title)");
    }

    #[test]
    fn item_id_parses_from_str() {
        assert_eq!(" 12 ".parse::<ItemId>().unwrap(), ItemId::new(12));
        assert!("twelve".parse::<ItemId>().is_err());
    }
}
