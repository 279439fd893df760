use std::{fmt, str::FromStr};

use super::Error;

/// The element type a value holds once it has been fixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Kind {
    /// 32-bit signed integers.
    Integer,
    /// 32-bit floating point numbers.
    Float,
    /// Owned UTF-8 strings.
    String,
    /// Four-component float vectors.
    #[cfg_attr(feature = "serde", serde(rename = "Vector4"))]
    Vector,
    /// 4x4 float matrices.
    #[cfg_attr(feature = "serde", serde(rename = "Matrix4"))]
    Matrix,
    /// Non-owning pointers to foreign objects.
    Pointer,
    /// Nested tables owned by the value.
    Table,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 7] = [
        Kind::Integer,
        Kind::Float,
        Kind::String,
        Kind::Vector,
        Kind::Matrix,
        Kind::Pointer,
        Kind::Table,
    ];

    /// Gets the canonical name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Integer => "Integer",
            Kind::Float => "Float",
            Kind::String => "String",
            Kind::Vector => "Vector4",
            Kind::Matrix => "Matrix4",
            Kind::Pointer => "Pointer",
            Kind::Table => "Table",
        }
    }

    /// Looks up a kind by its canonical name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Whether values of this kind own nested tables.
    #[inline]
    pub const fn is_table(self) -> bool {
        matches!(self, Kind::Table)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::UnknownKind(s.to_owned()))
    }
}
