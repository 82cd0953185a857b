//! Service boundaries: the remote list and the user directory.
//!
//! Each boundary is a trait with a REST implementation and an in-memory one.
//! The in-memory pair follows the same contracts and backs the tests and
//! the console demo.

pub mod directory;
pub mod list;
pub mod memory;

pub use directory::{DirectoryService, SpDirectoryService};
pub use list::{ListService, Row, SpListService};
pub use memory::{InMemoryDirectory, InMemoryList};

use serde_json::Value;

/// Strip the verbose-mode `{"d": ...}` envelope, if present
pub(crate) fn unwrap_verbose(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("d") => {
            map.remove("d").unwrap_or(Value::Null)
        }
        other => other,
    }
}
