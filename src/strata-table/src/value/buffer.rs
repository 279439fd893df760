use std::{ptr::NonNull, slice};

use crate::Error;

/// Backing storage for the elements of a single kind.
pub(crate) enum Buffer<T> {
    /// Heap storage owned by the value.
    Owned(Vec<T>),
    /// Storage owned by someone else.
    External { ptr: NonNull<T>, len: usize },
}

impl<T> Buffer<T> {
    pub fn len(&self) -> usize {
        match self {
            Self::Owned(v) => v.len(),
            Self::External { len, .. } => *len,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Self::External { .. })
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Owned(v) => v,
            // SAFETY: `Value::bind_external` makes the caller vouch for
            // `len` initialized elements at `ptr`.
            Self::External { ptr, len } => unsafe { slice::from_raw_parts(ptr.as_ptr(), *len) },
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Self::Owned(v) => v,
            // SAFETY: See `as_slice`.
            Self::External { ptr, len } => unsafe {
                slice::from_raw_parts_mut(ptr.as_ptr(), *len)
            },
        }
    }

    /// Gets the owned storage for size-changing operations.
    pub fn owned(&mut self) -> Result<&mut Vec<T>, Error> {
        match self {
            Self::Owned(v) => Ok(v),
            Self::External { .. } => Err(Error::NotMutable),
        }
    }
}

impl<T: Clone> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Owned(v) => Self::Owned(v.clone()),
            &Self::External { ptr, len } => Self::External { ptr, len },
        }
    }
}

/// Grows the allocation of `vec` so it can hold `capacity` elements.
pub(crate) fn reserve_total<T>(vec: &mut Vec<T>, capacity: usize) {
    vec.reserve_exact(capacity.saturating_sub(vec.len()));
}
