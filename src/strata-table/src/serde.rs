//! JSON representation of tables.
//!
//! A table maps to a JSON object keyed by entry name. Every entry is an
//! object naming the [`Kind`](strata_types::Kind) of the value and its
//! elements:
//!
//! ```json
//! {
//!     "Health": { "type": "Integer", "value": 5 },
//!     "Names": { "type": "String", "value": ["a", "b"] },
//!     "Child": { "type": "Table", "value": { "X": { "type": "Float", "value": 1.5 } } }
//! }
//! ```
//!
//! A single element is written as a scalar, any other count as an
//! array. Floats are written as JSON numbers while vectors, matrices
//! and pointers use their text form. Tables serialize through
//! [`serde::Serialize`], which skips the [`SELF_KEY`](crate::table::SELF_KEY)
//! entry, and load back through [`load`].

use std::io;

use thiserror::Error;

use crate::Table;

mod de;
pub use de::load;

mod ser;

/// Errors that may occur while loading tables from JSON.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred while reading the input.
    #[error("{0}")]
    Io(#[from] io::Error),

    /// The input is not valid JSON.
    #[error("{0}")]
    Json(serde_json::Error),

    /// A table operation driven by the input failed.
    #[error("{0}")]
    Table(#[from] crate::Error),

    /// The input named an unknown kind.
    #[error("{0}")]
    Types(#[from] strata_types::Error),

    /// The input is valid JSON but does not describe table entries.
    #[error("malformed entry '{0}': {1}")]
    Malformed(String, &'static str),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match value.classify() {
            Category::Io => Self::Io(value.into()),
            _ => Self::Json(value),
        }
    }
}

/// Loads a new table from JSON read from `reader`.
pub fn from_reader<R: io::Read>(reader: R) -> Result<Table, Error> {
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let table = Table::new();
    load(&table, &json)?;
    Ok(table)
}

/// Loads a new table from a JSON string.
pub fn from_str(data: &str) -> Result<Table, Error> {
    let json: serde_json::Value = serde_json::from_str(data)?;
    let table = Table::new();
    load(&table, &json)?;
    Ok(table)
}
