use smartstring::alias::String;

use super::Kind;

/// Describes a member of a reflected class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// The name under which the member is exposed.
    pub name: String,
    /// The element kind of the member.
    pub kind: Kind,
    /// How many consecutive elements the member holds.
    ///
    /// For [`Kind::Table`] fields, this is the number of child tables
    /// created on population.
    pub count: usize,
    /// Byte offset of the member from the start of the class.
    ///
    /// Ignored for [`Kind::Table`] fields.
    pub offset: usize,
}

impl Field {
    /// Creates a new field descriptor.
    pub fn new(name: &str, kind: Kind, count: usize, offset: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            count,
            offset,
        }
    }

    /// Creates a descriptor for a single-element member.
    pub fn scalar(name: &str, kind: Kind, offset: usize) -> Self {
        Self::new(name, kind, 1, offset)
    }

    /// Creates a descriptor for a nested table entry holding one child.
    pub fn table(name: &str) -> Self {
        Self::new(name, Kind::Table, 1, 0)
    }

    /// Whether the field aliases class memory.
    #[inline]
    pub fn is_aliased(&self) -> bool {
        !self.kind.is_table()
    }
}
