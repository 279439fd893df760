use strata_types::Kind;

use super::{Mat4, ObjectRef, Vec4};
use crate::Error;

mod sealed {
    pub trait Sealed {}
}

/// A type that can be stored as an element of a [`Value`](super::Value).
///
/// This is implemented for [`i32`], [`f32`], [`String`], [`Vec4`],
/// [`Mat4`] and [`ObjectRef`], one for each non-table [`Kind`].
pub trait Element: Clone + Default + PartialEq + std::fmt::Debug + sealed::Sealed + 'static {
    /// The kind of values storing this element type.
    const KIND: Kind;

    /// Renders the element to its textual form.
    fn render(&self) -> String;

    /// Parses an element from its textual form.
    fn parse(text: &str) -> Result<Self, Error>;

    /// The comparison used when two whole values are compared.
    ///
    /// Numeric kinds compare bit patterns here.
    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

fn parse_error(kind: Kind, input: &str) -> Error {
    Error::Parse {
        kind,
        input: input.to_owned(),
    }
}

impl sealed::Sealed for i32 {}
impl Element for i32 {
    const KIND: Kind = Kind::Integer;

    fn render(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self, Error> {
        text.trim()
            .parse()
            .map_err(|_| parse_error(Self::KIND, text))
    }
}

impl sealed::Sealed for f32 {}
impl Element for f32 {
    const KIND: Kind = Kind::Float;

    fn render(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self, Error> {
        text.trim()
            .parse()
            .map_err(|_| parse_error(Self::KIND, text))
    }

    fn same(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl sealed::Sealed for String {}
impl Element for String {
    const KIND: Kind = Kind::String;

    fn render(&self) -> String {
        self.clone()
    }

    fn parse(text: &str) -> Result<Self, Error> {
        Ok(text.to_owned())
    }
}

impl sealed::Sealed for Vec4 {}
impl Element for Vec4 {
    const KIND: Kind = Kind::Vector;

    fn render(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self, Error> {
        text.parse()
    }

    fn same(&self, other: &Self) -> bool {
        self.bits_eq(other)
    }
}

impl sealed::Sealed for Mat4 {}
impl Element for Mat4 {
    const KIND: Kind = Kind::Matrix;

    fn render(&self) -> String {
        self.to_string()
    }

    fn parse(text: &str) -> Result<Self, Error> {
        text.parse()
    }

    fn same(&self, other: &Self) -> bool {
        self.bits_eq(other)
    }
}

impl sealed::Sealed for ObjectRef {}
impl Element for ObjectRef {
    const KIND: Kind = Kind::Pointer;

    fn render(&self) -> String {
        match self.get() {
            Some(object) => object.describe(),
            None => "nullptr".to_owned(),
        }
    }

    fn parse(_text: &str) -> Result<Self, Error> {
        Err(Error::NoText(Self::KIND))
    }
}
