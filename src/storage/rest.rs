use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use serde::Deserialize;

use crate::domain::{Item, ItemId, SelectionRecord, Title};

/// Errors that can occur when loading items from REST-shaped JSON.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file was not found.
    #[error("file not found")]
    NotFound,
    /// An I/O error occurred.
    #[error("failed to read items: {0}")]
    Io(#[from] io::Error),
    /// The JSON could not be parsed.
    #[error("failed to parse items: {0}")]
    Json(#[from] serde_json::Error),
    /// A record lookup returned an empty array.
    #[error("record lookup returned no records")]
    NoRecord,
}

/// A record as the host's REST API returns it.
#[derive(Debug, Deserialize)]
struct Record {
    id: ItemId,
    #[serde(default, deserialize_with = "parent_from_rest")]
    parent: Option<ItemId>,
    #[serde(default)]
    title: RestTitle,
}

/// Titles arrive either as a `{raw, rendered}` object or, without edit
/// context, as a plain rendered string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RestTitle {
    Plain(String),
    Fields {
        #[serde(default)]
        raw: Option<String>,
        #[serde(default)]
        rendered: Option<String>,
    },
}

impl Default for RestTitle {
    fn default() -> Self {
        Self::Fields {
            raw: None,
            rendered: None,
        }
    }
}

impl From<RestTitle> for Title {
    fn from(title: RestTitle) -> Self {
        match title {
            RestTitle::Plain(text) => Self::new(text),
            RestTitle::Fields { raw, rendered } => {
                let rendered = rendered.unwrap_or_default();
                Self {
                    raw: raw.unwrap_or_else(|| rendered.clone()),
                    rendered,
                }
            }
        }
    }
}

impl From<Record> for Item {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            parent: record.parent,
            title: record.title.into(),
        }
    }
}

/// The REST API uses `0` for "no parent".
fn parent_from_rest<'de, D>(deserializer: D) -> Result<Option<ItemId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let parent = Option::<u64>::deserialize(deserializer)?;
    Ok(parent.filter(|&id| id != 0).map(ItemId::new))
}

/// Parses a JSON array of REST records into items.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or a record has no `id`.
pub fn parse_items(json: &str) -> Result<Vec<Item>, LoadError> {
    let records: Vec<Record> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Item::from).collect())
}

/// Reads a JSON array of REST records into items.
///
/// # Errors
///
/// Returns an error if reading fails or the JSON is malformed.
pub fn read_items<R: Read>(reader: R) -> Result<Vec<Item>, LoadError> {
    let records: Vec<Record> = serde_json::from_reader(reader)?;
    Ok(records.into_iter().map(Item::from).collect())
}

/// Loads items from a JSON file.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if the file does not exist, or another
/// error if it cannot be read or parsed.
pub fn load_items(path: &Path) -> Result<Vec<Item>, LoadError> {
    read_items(BufReader::new(open(path)?))
}

/// Loads a single selection record from a JSON file.
///
/// The host answers record lookups with a one-element array; a bare record
/// object is accepted too.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, and
/// [`LoadError::NoRecord`] if an array holds no records.
pub fn load_record(path: &Path) -> Result<SelectionRecord, LoadError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Record),
        Many(Vec<Record>),
    }

    let record = match serde_json::from_reader(BufReader::new(open(path)?))? {
        OneOrMany::One(record) => record,
        OneOrMany::Many(records) => records.into_iter().next().ok_or(LoadError::NoRecord)?,
    };
    Ok(SelectionRecord::from(&Item::from(record)))
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|io_error| match io_error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(io_error),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_rest_records() {
        let items = parse_items(
            r#"[
                {"id": 1, "parent": 0, "title": {"raw": "About", "rendered": "About"}},
                {"id": 2, "parent": 1, "title": {"raw": "R&D", "rendered": "R&amp;D"}}
            ]"#,
        )
        .unwrap();

        assert_eq!(items[0], Item::new(1, None, "About"));
        assert_eq!(items[1].parent, Some(ItemId::new(1)));
        assert_eq!(items[1].title.raw, "R&D");
        assert_eq!(items[1].title.rendered, "R&amp;D");
    }

    #[test]
    fn missing_fields_default() {
        let items = parse_items(r#"[{"id": 4}, {"id": 5, "title": {"rendered": "Shown"}}]"#).unwrap();

        assert_eq!(items[0].parent, None);
        assert_eq!(items[0].display_name(), "#4 (no title)");
        assert_eq!(items[1].title.raw, "Shown");
    }

    #[test]
    fn null_parent_is_no_parent() {
        let items = parse_items(r#"[{"id": 4, "parent": null, "title": "Plain"}]"#).unwrap();

        assert_eq!(items[0], Item::new(4, None, "Plain"));
    }

    #[test]
    fn record_without_id_is_an_error() {
        let result = parse_items(r#"[{"parent": 1}]"#);
        assert!(matches!(result, Err(LoadError::Json(_))));
    }

    #[test]
    fn load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let result = load_items(&tmp.path().join("items.json"));
        assert!(matches!(result, Err(LoadError::NotFound)));
    }

    #[test]
    fn load_record_from_lookup_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{"id": 9, "title": {"raw": "Contact", "rendered": "Contact"}}]"#)
            .unwrap();

        let record = load_record(file.path()).unwrap();

        assert_eq!(record, SelectionRecord::new(9, "Contact"));
    }

    #[test]
    fn load_record_from_empty_lookup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();

        let result = load_record(file.path());
        assert!(matches!(result, Err(LoadError::NoRecord)));
    }
}
