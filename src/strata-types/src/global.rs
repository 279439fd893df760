//! The per-thread class catalog.
//!
//! Reflected objects are single-threaded, so every thread owns its own
//! [`Registry`] which is created on first use. Classes registered on
//! one thread are not visible on any other; code that shares class
//! layouts across threads should build a [`Registry`] and pass it to
//! the `_in` variants of the binder instead. Call [`clear`] to reset
//! the catalog explicitly.

use std::cell::RefCell;

use super::{ClassId, Error, Field, Registry};

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::new());
}

/// Runs `f` with shared access to the catalog.
///
/// # Panics
///
/// Panics when called from inside [`with_mut`].
pub fn with<R>(f: impl FnOnce(&Registry) -> R) -> R {
    REGISTRY.with(|r| f(&r.borrow()))
}

/// Runs `f` with exclusive access to the catalog.
///
/// # Panics
///
/// Panics when the catalog is already borrowed by [`with`] or
/// [`with_mut`] further up the stack.
pub fn with_mut<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    REGISTRY.with(|r| f(&mut r.borrow_mut()))
}

/// See [`Registry::add`].
pub fn add(class: ClassId, fields: Vec<Field>, base: Option<ClassId>) -> Result<(), Error> {
    with_mut(|r| r.add(class, fields, base))
}

/// See [`Registry::register`].
pub fn register<T: 'static>(fields: Vec<Field>) -> Result<(), Error> {
    with_mut(|r| r.register::<T>(fields))
}

/// See [`Registry::register_derived`].
pub fn register_derived<T: 'static, B: 'static>(fields: Vec<Field>) -> Result<(), Error> {
    with_mut(|r| r.register_derived::<T, B>(fields))
}

/// See [`Registry::fields_for`].
pub fn fields_for(class: ClassId) -> Vec<Field> {
    with(|r| r.fields_for(class))
}

/// See [`Registry::field_by_name`].
pub fn field_by_name(class: ClassId, name: &str) -> Option<Field> {
    with(|r| r.field_by_name(class, name))
}

/// See [`Registry::contains`].
pub fn contains(class: ClassId) -> bool {
    with(|r| r.contains(class))
}

/// See [`Registry::remove`].
pub fn remove(class: ClassId) -> bool {
    with_mut(|r| r.remove(class).is_some())
}

/// See [`Registry::clear`].
pub fn clear() {
    with_mut(Registry::clear)
}

/// See [`Registry::len`].
pub fn len() -> usize {
    with(Registry::len)
}
