//! Hierarchical tables of runtime-typed values.
//!
//! The building blocks are:
//!
//! - [`Value`], a container of homogeneous elements whose [`Kind`] is
//!   chosen at runtime and which either owns its storage or aliases
//!   memory owned by someone else.
//!
//! - [`Table`], an ordered, name-keyed collection of values which owns
//!   nested child tables and knows its parent.
//!
//! - [`attributed`], which binds the entries of a table to the members
//!   of a Rust struct as described by its registered [`Field`]s.
//!
//! With the `serde` feature enabled, tables can additionally be loaded
//! from and serialized to JSON.
//!
//! [`Kind`]: strata_types::Kind
//! [`Field`]: strata_types::Field

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]

pub use strata_types;

pub mod attributed;
pub use attributed::{Attributes, Reflected};

mod error;
pub use error::Error;

#[cfg(feature = "serde")]
pub mod serde;

pub mod table;
pub use table::Table;

pub mod value;
pub use value::Value;
