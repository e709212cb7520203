/// Reading items and selection records from the host's REST-shaped JSON.
pub mod rest;

pub use rest::{load_items, load_record, parse_items, read_items, LoadError};
