//! Static layout metadata for reflected classes.
//!
//! A class describes the members it wants to expose by name through a
//! list of [`Field`]s. Each field names a [`Kind`], a repeat count and
//! the byte offset of the member inside the class.
//!
//! These descriptions are collected in a [`Registry`], keyed by
//! [`ClassId`]. A class may extend another registered class, in which
//! case its full field list is the concatenation of every ancestor's
//! fields, base-first.
//!
//! Most code uses the per-thread catalog in [`global`] rather than
//! passing a [`Registry`] around explicitly.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use thiserror::Error;

mod class;
pub use class::*;

mod field;
pub use field::*;

pub mod global;

mod kind;
pub use kind::*;

mod registry;
pub use registry::*;

/// Errors that may occur when working with the [`Registry`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A class was registered a second time.
    #[error("class '{0}' is already registered")]
    AlreadyRegistered(ClassId),

    /// A class was looked up without being registered.
    #[error("class '{0}' is not registered")]
    NotRegistered(ClassId),

    /// A textual kind name did not match any [`Kind`].
    #[error("unknown kind name: {0}")]
    UnknownKind(std::string::String),
}
