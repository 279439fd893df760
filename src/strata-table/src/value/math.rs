use std::{fmt, str::FromStr};

use strata_types::Kind;

use crate::Error;

/// A four-component vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec4 {
    /// The X coordinate.
    pub x: f32,
    /// The Y coordinate.
    pub y: f32,
    /// The Z coordinate.
    pub z: f32,
    /// The W coordinate.
    pub w: f32,
}

impl Vec4 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new vector from its components.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Gets the components as an array.
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Compares the bit patterns of both vectors.
    pub fn bits_eq(&self, other: &Self) -> bool {
        bits_eq(&self.to_array(), &other.to_array())
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("vec4")?;
        write_tuple(f, &self.to_array())
    }
}

impl FromStr for Vec4 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || Error::Parse {
            kind: Kind::Vector,
            input: s.to_owned(),
        };

        let inner = s.trim().strip_prefix("vec4").ok_or_else(fail)?;
        let mut cursor = Cursor(inner);
        let components = cursor.tuple().ok_or_else(fail)?;
        cursor.end().ok_or_else(fail)?;

        Ok(components.into())
    }
}

/// A 4x4 matrix stored as four columns.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mat4 {
    /// The columns of the matrix.
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    /// The all-zero matrix.
    pub const ZERO: Self = Self { cols: [[0.0; 4]; 4] };

    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a matrix from its columns.
    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Compares the bit patterns of both matrices.
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.cols
            .iter()
            .zip(&other.cols)
            .all(|(a, b)| bits_eq(a, b))
    }
}

impl fmt::Display for Mat4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mat4x4(")?;
        for (i, col) in self.cols.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write_tuple(f, col)?;
        }
        f.write_str(")")
    }
}

impl FromStr for Mat4 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || Error::Parse {
            kind: Kind::Matrix,
            input: s.to_owned(),
        };

        let inner = s.trim().strip_prefix("mat4x4").ok_or_else(fail)?;
        let mut cursor = Cursor(inner);
        cursor.eat('(').ok_or_else(fail)?;

        let mut cols = [[0.0; 4]; 4];
        for (i, col) in cols.iter_mut().enumerate() {
            if i != 0 {
                cursor.eat(',').ok_or_else(fail)?;
            }
            *col = cursor.tuple().ok_or_else(fail)?;
        }

        cursor.eat(')').ok_or_else(fail)?;
        cursor.end().ok_or_else(fail)?;

        Ok(Self { cols })
    }
}

fn bits_eq(a: &[f32; 4], b: &[f32; 4]) -> bool {
    a.iter().zip(b).all(|(a, b)| a.to_bits() == b.to_bits())
}

fn write_tuple(f: &mut fmt::Formatter<'_>, values: &[f32; 4]) -> fmt::Result {
    let [a, b, c, d] = values;
    write!(f, "({a}, {b}, {c}, {d})")
}

// A tiny scanner over the textual vector and matrix forms.
struct Cursor<'a>(&'a str);

impl Cursor<'_> {
    fn eat(&mut self, c: char) -> Option<()> {
        self.0 = self.0.trim_start().strip_prefix(c)?;
        Some(())
    }

    fn end(&self) -> Option<()> {
        self.0.trim().is_empty().then_some(())
    }

    fn tuple(&mut self) -> Option<[f32; 4]> {
        self.eat('(')?;
        let (body, rest) = self.0.split_once(')')?;
        self.0 = rest;

        let mut out = [0.0; 4];
        let mut parts = body.split(',');
        for slot in &mut out {
            *slot = parts.next()?.trim().parse().ok()?;
        }

        parts.next().is_none().then_some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_text() {
        let v = Vec4::new(1.0, -2.5, 0.125, 4.0);
        assert_eq!(v.to_string(), "vec4(1, -2.5, 0.125, 4)");
        assert_eq!("  vec4( 1,-2.5 , 0.125,4 ) ".parse::<Vec4>().unwrap(), v);
        assert!("vec4(1, 2, 3)".parse::<Vec4>().is_err());
        assert!("vec4(1, 2, 3, 4, 5)".parse::<Vec4>().is_err());
        assert!("vec3(1, 2, 3)".parse::<Vec4>().is_err());
    }

    #[test]
    fn matrix_text() {
        let m = Mat4::IDENTITY;
        assert_eq!(
            m.to_string(),
            "mat4x4((1, 0, 0, 0), (0, 1, 0, 0), (0, 0, 1, 0), (0, 0, 0, 1))"
        );
        assert_eq!(m.to_string().parse::<Mat4>().unwrap(), m);
        assert!("mat4x4((1, 0, 0, 0))".parse::<Mat4>().is_err());
    }

    #[test]
    fn signed_zero_is_distinct() {
        let a = Vec4::new(0.0, 0.0, 0.0, 0.0);
        let b = Vec4::new(-0.0, 0.0, 0.0, 0.0);
        assert_eq!(a, b);
        assert!(!a.bits_eq(&b));
    }
}
