//! Binding table entries to the members of Rust structs.
//!
//! A reflected type embeds [`Attributes`] and registers its member
//! layout as a list of [`Field`]s with the class catalog. Populating an
//! instance then creates one table entry per field, base class fields
//! first:
//!
//! - fields of [`Kind::Table`] get child tables owned by the entry,
//! - all other fields become external values aliasing the member at
//!   the field's byte offset.
//!
//! Entry zero is always [`SELF_KEY`], a pointer to the instance itself.
//! Entries added at runtime through [`Attributes::append_extra`] always
//! own their storage.
//!
//! # Address stability
//!
//! Aliasing entries hold raw pointers into the instance. Whenever an
//! instance ends up at a new address, be it through a copy or a move,
//! [`Reflected::rebind`] must run before its table is used again. The
//! copy helpers on [`Reflected`] do that as their last step.

use std::{alloc::Layout, fmt, mem, ptr::NonNull, sync::Arc};

use strata_types::{ClassId, Field, Kind, Registry, global};

use crate::{
    Error, Table,
    table::{EntryMut, SELF_KEY},
    value::{Object, ObjectRef, element_layout},
};

/// The attribute table embedded in every reflected instance.
pub struct Attributes {
    table: Table,
    class: ClassId,
}

impl Attributes {
    /// Creates empty attributes for instances of `T`.
    pub fn new<T: 'static>() -> Self {
        Self::for_class(ClassId::of::<T>())
    }

    /// Creates empty attributes for instances of `class`.
    pub fn for_class(class: ClassId) -> Self {
        Self {
            table: Table::new(),
            class,
        }
    }

    /// Gets the class the attributes were created for.
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Gets the attribute table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Whether the table has an entry named `name`.
    pub fn is_attribute(&self, name: &str) -> bool {
        self.table.index_of(name).is_some()
    }

    /// Whether `name` is declared by the class or one of its bases.
    pub fn is_declared(&self, name: &str) -> bool {
        global::with(|r| self.is_declared_in(r, name))
    }

    /// Like [`Attributes::is_declared`], consulting `registry`.
    pub fn is_declared_in(&self, registry: &Registry, name: &str) -> bool {
        name == SELF_KEY || registry.field_by_name(self.class, name).is_some()
    }

    /// Whether `name` is an entry of the table without being declared.
    pub fn is_extra(&self, name: &str) -> bool {
        global::with(|r| self.is_extra_in(r, name))
    }

    /// Like [`Attributes::is_extra`], consulting `registry`.
    pub fn is_extra_in(&self, registry: &Registry, name: &str) -> bool {
        self.is_attribute(name) && !self.is_declared_in(registry, name)
    }

    /// Adds an owned entry that is not part of the class layout.
    ///
    /// Fails when `name` is declared by the class.
    pub fn append_extra(&self, name: &str) -> Result<EntryMut<'_>, Error> {
        global::with(|r| self.append_extra_in(r, name))
    }

    /// Like [`Attributes::append_extra`], consulting `registry`.
    pub fn append_extra_in(&self, registry: &Registry, name: &str) -> Result<EntryMut<'_>, Error> {
        if self.is_declared_in(registry, name) {
            return Err(Error::AlreadyDeclared(name.to_owned()));
        }

        self.table.append(name)
    }

    /// Gets the names of all declared entries, in table order.
    pub fn declared(&self) -> Vec<Arc<str>> {
        global::with(|r| self.declared_in(r))
    }

    /// Like [`Attributes::declared`], consulting `registry`.
    pub fn declared_in(&self, registry: &Registry) -> Vec<Arc<str>> {
        let mut names = self.table.names();
        names.retain(|name| self.is_declared_in(registry, name));
        names
    }

    /// Gets the names of all extra entries, in table order.
    pub fn extras(&self) -> Vec<Arc<str>> {
        global::with(|r| self.extras_in(r))
    }

    /// Like [`Attributes::extras`], consulting `registry`.
    pub fn extras_in(&self, registry: &Registry) -> Vec<Arc<str>> {
        let mut names = self.table.names();
        names.retain(|name| !self.is_declared_in(registry, name));
        names
    }
}

impl Clone for Attributes {
    /// Deep-copies the table. Aliasing entries keep pointing at the
    /// source instance until rebound.
    fn clone(&self) -> Self {
        Self {
            table: self.table.deep_copy(),
            class: self.class,
        }
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attributes")
            .field("class", &self.class)
            .field("table", &self.table)
            .finish()
    }
}

/// A type whose members are exposed through an attribute table.
pub trait Reflected: Object + Sized {
    /// Gets the embedded attributes.
    fn attributes(&self) -> &Attributes;

    /// Fills the attribute table from the class catalog.
    ///
    /// # Safety
    ///
    /// `self` must neither move nor be dropped while aliasing entries of
    /// its table, or clones of them, are still in use. After a move,
    /// [`Reflected::rebind`] has to run before the table is used again.
    unsafe fn populate(&mut self) -> Result<(), Error> {
        let fields = global::with(|r| fields_in(r, self.attributes().class()))?;
        // SAFETY: Forwarded to the caller.
        unsafe { bind(self, &fields, true) }
    }

    /// Like [`Reflected::populate`], consulting `registry`.
    ///
    /// # Safety
    ///
    /// See [`Reflected::populate`].
    unsafe fn populate_in(&mut self, registry: &Registry) -> Result<(), Error> {
        let fields = fields_in(registry, self.attributes().class())?;
        // SAFETY: Forwarded to the caller.
        unsafe { bind(self, &fields, true) }
    }

    /// Points every aliasing entry, and the self reference, at the
    /// current address of `self`.
    ///
    /// # Safety
    ///
    /// See [`Reflected::populate`].
    unsafe fn rebind(&mut self) -> Result<(), Error> {
        let fields = global::with(|r| fields_in(r, self.attributes().class()))?;
        // SAFETY: Forwarded to the caller.
        unsafe { bind(self, &fields, false) }
    }

    /// Like [`Reflected::rebind`], consulting `registry`.
    ///
    /// # Safety
    ///
    /// See [`Reflected::populate`].
    unsafe fn rebind_in(&mut self, registry: &Registry) -> Result<(), Error> {
        let fields = fields_in(registry, self.attributes().class())?;
        // SAFETY: Forwarded to the caller.
        unsafe { bind(self, &fields, false) }
    }

    /// Clones `self` into a new box and rebinds the clone.
    ///
    /// # Safety
    ///
    /// The returned box is subject to the contract of
    /// [`Reflected::populate`].
    unsafe fn duplicate(&self) -> Result<Box<Self>, Error>
    where
        Self: Clone,
    {
        let mut copy = Box::new(self.clone());
        // SAFETY: Forwarded to the caller.
        unsafe { copy.rebind()? };
        Ok(copy)
    }

    /// Overwrites `self` with a clone of `other` and rebinds it.
    ///
    /// # Safety
    ///
    /// See [`Reflected::populate`].
    unsafe fn assign_from(&mut self, other: &Self) -> Result<(), Error>
    where
        Self: Clone,
    {
        self.clone_from(other);
        // SAFETY: Forwarded to the caller.
        unsafe { self.rebind() }
    }

    /// Moves `self` into a new box and rebinds it there.
    ///
    /// # Safety
    ///
    /// The returned box is subject to the contract of
    /// [`Reflected::populate`].
    unsafe fn relocate(self) -> Result<Box<Self>, Error> {
        let mut boxed = Box::new(self);
        // SAFETY: Forwarded to the caller.
        unsafe { boxed.rebind()? };
        Ok(boxed)
    }
}

/// Compares a reflected instance to another object by attributes.
///
/// Suitable as the body of [`Object::equals`] for reflected types.
pub fn equals<T: Reflected>(this: &T, other: &dyn Object) -> bool {
    other
        .as_any()
        .downcast_ref::<T>()
        .is_some_and(|other| this.attributes() == other.attributes())
}

fn fields_in(registry: &Registry, class: ClassId) -> Result<Vec<Field>, Error> {
    if !registry.contains(class) {
        return Err(strata_types::Error::NotRegistered(class).into());
    }

    Ok(registry.fields_for(class))
}

fn check_layout(field: &Field, layout: Layout, base: NonNull<u8>, size: usize) -> Result<(), Error> {
    let end = layout
        .size()
        .checked_mul(field.count)
        .and_then(|len| len.checked_add(field.offset));
    let aligned = base.as_ptr().addr().wrapping_add(field.offset) % layout.align() == 0;

    match end {
        Some(end) if end <= size && aligned => Ok(()),
        _ => Err(Error::FieldLayout(field.name.to_string())),
    }
}

// Creates or updates the entries of `instance`'s table for `fields`.
//
// SAFETY: The caller upholds the contract of `Reflected::populate`.
unsafe fn bind<T: Reflected>(instance: &mut T, fields: &[Field], populate: bool) -> Result<(), Error> {
    let size = mem::size_of::<T>();
    let base = NonNull::from(&mut *instance).cast::<u8>();
    let table = instance.attributes().table().clone();

    // SAFETY: The caller keeps `instance` alive and in place.
    let this = unsafe { ObjectRef::new(&*instance) };
    table.append(SELF_KEY)?.assign(this)?;

    for field in fields {
        if !field.is_aliased() {
            if populate {
                table.append(&field.name)?.set_kind(Kind::Table)?;
                for _ in 0..field.count {
                    table.append_table(&field.name)?;
                }
            }
            continue;
        }

        let layout = element_layout(field.kind).ok_or(Error::ExternalTable)?;
        check_layout(field, layout, base, size)?;

        let mut value = if populate {
            table.append(&field.name)?
        } else {
            table
                .find_mut(&field.name)
                .ok_or_else(|| Error::MissingEntry(field.name.to_string()))?
        };

        // SAFETY: `check_layout` verified that the field is aligned and
        // lies within `instance`, which the caller keeps in place.
        unsafe {
            value.bind_external(base.add(field.offset), field.kind, field.count)?;
        }
    }

    log::debug!(
        "{} {} attributes of '{}'",
        if populate { "Populated" } else { "Rebound" },
        fields.len(),
        instance.attributes().class()
    );

    Ok(())
}
