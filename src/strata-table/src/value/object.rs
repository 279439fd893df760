use std::{any::Any, fmt, ptr::NonNull};

/// A foreign object which values may point to.
///
/// This is the hook through which pointer elements are compared and
/// rendered to text.
pub trait Object: Any {
    /// Gets `self` as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Compares `self` to another object.
    ///
    /// Defaults to identity.
    fn equals(&self, other: &dyn Object) -> bool {
        std::ptr::addr_eq(self as *const Self, other as *const dyn Object)
    }

    /// Produces a textual description of the object.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_owned()
    }
}

/// A non-owning, nullable pointer to an [`Object`].
#[derive(Clone, Copy, Default)]
pub struct ObjectRef(Option<NonNull<dyn Object>>);

impl ObjectRef {
    /// The null pointer.
    pub const fn null() -> Self {
        Self(None)
    }

    /// Creates a pointer to `object`.
    ///
    /// # Safety
    ///
    /// `object` must stay alive and in place for as long as the
    /// returned pointer, or any value holding a copy of it, is used.
    pub unsafe fn new(object: &(dyn Object + 'static)) -> Self {
        Self(Some(NonNull::from(object)))
    }

    /// Whether this is the null pointer.
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Gets the object pointed to, if any.
    pub fn get(&self) -> Option<&dyn Object> {
        // SAFETY: `ObjectRef::new` requires the pointee to outlive us.
        self.0.map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Whether both pointers refer to the same address.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self.0, other.0) {
            (Some(a), Some(b)) => std::ptr::addr_eq(a.as_ptr(), b.as_ptr()),
            (None, None) => true,
            _ => false,
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }

        match (self.get(), other.get()) {
            (Some(a), Some(b)) => a.equals(b),
            _ => false,
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ptr) => write!(f, "ObjectRef({:p})", ptr.as_ptr()),
            None => f.write_str("ObjectRef(null)"),
        }
    }
}
