use strata_types::Kind;
use thiserror::Error;

/// Errors that may occur when working with values and tables.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The kind of a value was already fixed to something else.
    #[error("value kind is fixed to {current}, cannot change it to {requested}")]
    TypeFrozen { current: Kind, requested: Kind },

    /// A size-changing operation was attempted on external storage.
    #[error("value refers to external storage and cannot be resized")]
    NotMutable,

    /// The operation needs a value with a fixed kind.
    #[error("operation requires the value kind to be set")]
    UnknownType,

    /// An element index was out of bounds.
    #[error("index {index} is out of range for {len} elements")]
    IndexOutOfRange { index: usize, len: usize },

    /// An element was requested as a different kind than stored.
    #[error("requested {requested} element from a value of kind {actual}")]
    KindMismatch { requested: Kind, actual: Kind },

    /// Text could not be parsed into an element.
    #[error("failed to parse {kind} from '{input}'")]
    Parse { kind: Kind, input: String },

    /// Elements of the kind have no textual form.
    #[error("{0} elements have no textual form")]
    NoText(Kind),

    /// Nested tables cannot live in external storage.
    #[error("nested tables cannot be bound to external storage")]
    ExternalTable,

    /// An entry name was empty.
    #[error("entry names must not be empty")]
    EmptyKey,

    /// A table was asked to adopt itself.
    #[error("a table cannot adopt itself")]
    SelfAdoption,

    /// A table was asked to adopt one of its ancestors.
    #[error("a table cannot adopt one of its ancestors")]
    AncestorAdoption,

    /// An entry that should hold nested tables holds something else.
    #[error("entry '{0}' exists and is not a table")]
    NotATable(String),

    /// An extra attribute would shadow a declared one.
    #[error("attribute '{0}' is declared by the class")]
    AlreadyDeclared(String),

    /// A declared attribute is missing from the table.
    #[error("attribute '{0}' is missing from the table")]
    MissingEntry(String),

    /// A declared field does not fit into the class it describes.
    #[error("field '{0}' lies outside of its class or is misaligned")]
    FieldLayout(String),

    /// Misuse of the class registry.
    #[error("{0}")]
    Types(#[from] strata_types::Error),
}
