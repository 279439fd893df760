//! Runtime-typed containers of homogeneous elements.
//!
//! A [`Value`] starts out without a kind. Once [`Value::set_kind`],
//! [`Value::assign`] or [`Value::bind_external`] has fixed its [`Kind`],
//! it can never change again. Appending to a value without a kind
//! fails.
//!
//! Elements either live in storage owned by the value, or in memory
//! owned by somebody else (see [`Value::bind_external`]). External
//! values can be read and written in place, but never resized.

use std::{alloc::Layout, any::Any, fmt, mem, ptr::NonNull, rc::Weak};

use strata_types::Kind;

use crate::{
    Error,
    table::{Node, Table},
};

mod buffer;
use buffer::{Buffer, reserve_total};

mod element;
pub use element::Element;

mod growth;
pub use growth::*;

mod math;
pub use math::*;

mod object;
pub use object::*;

enum Storage {
    Unset,
    Integer(Buffer<i32>),
    Float(Buffer<f32>),
    String(Buffer<String>),
    Vector(Buffer<Vec4>),
    Matrix(Buffer<Mat4>),
    Pointer(Buffer<ObjectRef>),
    Table(Vec<Table>),
}

// Dispatches over the arms of a `Storage`, binding the element buffer
// or the list of child tables.
macro_rules! with_buffer {
    ($storage:expr, $buf:ident => $body:expr, $tables:ident => $tables_body:expr, _ => $unset:expr) => {
        match $storage {
            Storage::Integer($buf) => $body,
            Storage::Float($buf) => $body,
            Storage::String($buf) => $body,
            Storage::Vector($buf) => $body,
            Storage::Matrix($buf) => $body,
            Storage::Pointer($buf) => $body,
            Storage::Table($tables) => $tables_body,
            Storage::Unset => $unset,
        }
    };
}

// Dispatches over a `Kind`, aliasing `$t` to its element type.
macro_rules! with_element {
    ($kind:expr, $t:ident => $body:expr, table => $table:expr) => {
        match $kind {
            Kind::Integer => {
                type $t = i32;
                $body
            }
            Kind::Float => {
                type $t = f32;
                $body
            }
            Kind::String => {
                type $t = String;
                $body
            }
            Kind::Vector => {
                type $t = Vec4;
                $body
            }
            Kind::Matrix => {
                type $t = Mat4;
                $body
            }
            Kind::Pointer => {
                type $t = ObjectRef;
                $body
            }
            Kind::Table => $table,
        }
    };
}

impl Storage {
    fn empty(kind: Kind) -> Self {
        match kind {
            Kind::Integer => Self::Integer(Buffer::Owned(Vec::new())),
            Kind::Float => Self::Float(Buffer::Owned(Vec::new())),
            Kind::String => Self::String(Buffer::Owned(Vec::new())),
            Kind::Vector => Self::Vector(Buffer::Owned(Vec::new())),
            Kind::Matrix => Self::Matrix(Buffer::Owned(Vec::new())),
            Kind::Pointer => Self::Pointer(Buffer::Owned(Vec::new())),
            Kind::Table => Self::Table(Vec::new()),
        }
    }

    fn from_buffer<T: Element>(buffer: Buffer<T>) -> Self {
        let mut storage = Self::empty(T::KIND);
        if let Some(slot) = storage.buffer_mut::<T>() {
            *slot = buffer;
        }
        storage
    }

    fn kind(&self) -> Option<Kind> {
        let kind = match self {
            Self::Unset => return None,
            Self::Integer(..) => Kind::Integer,
            Self::Float(..) => Kind::Float,
            Self::String(..) => Kind::String,
            Self::Vector(..) => Kind::Vector,
            Self::Matrix(..) => Kind::Matrix,
            Self::Pointer(..) => Kind::Pointer,
            Self::Table(..) => Kind::Table,
        };
        Some(kind)
    }

    fn len(&self) -> usize {
        with_buffer!(self, b => b.len(), t => t.len(), _ => 0)
    }

    fn is_external(&self) -> bool {
        with_buffer!(self, b => b.is_external(), _t => false, _ => false)
    }

    fn buffer<T: Element>(&self) -> Option<&Buffer<T>> {
        let any: &dyn Any = with_buffer!(self, b => b, _t => return None, _ => return None);
        any.downcast_ref()
    }

    fn buffer_mut<T: Element>(&mut self) -> Option<&mut Buffer<T>> {
        let any: &mut dyn Any = with_buffer!(self, b => b, _t => return None, _ => return None);
        any.downcast_mut()
    }
}

impl Clone for Storage {
    fn clone(&self) -> Self {
        match self {
            Self::Unset => Self::Unset,
            Self::Integer(b) => Self::Integer(b.clone()),
            Self::Float(b) => Self::Float(b.clone()),
            Self::String(b) => Self::String(b.clone()),
            Self::Vector(b) => Self::Vector(b.clone()),
            Self::Matrix(b) => Self::Matrix(b.clone()),
            Self::Pointer(b) => Self::Pointer(b.clone()),
            Self::Table(tables) => Self::Table(tables.iter().map(Table::deep_copy).collect()),
        }
    }
}

/// A runtime-typed container of zero or more elements of one [`Kind`].
///
/// Cloning an owning value copies every element, including a deep
/// copy of nested tables. Cloning an external value produces another
/// reference to the same external memory.
pub struct Value {
    storage: Storage,
    capacity: usize,
}

impl Value {
    /// Creates an empty value without a kind.
    pub const fn new() -> Self {
        Self {
            storage: Storage::Unset,
            capacity: 0,
        }
    }

    /// Creates an empty value of the given kind.
    pub fn with_kind(kind: Kind) -> Self {
        let mut value = Self::new();
        value.storage = Storage::empty(kind);
        value
    }

    /// Gets the kind of the value, if fixed yet.
    pub fn kind(&self) -> Option<Kind> {
        self.storage.kind()
    }

    /// Gets the number of elements.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the value holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the number of element slots available without growing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the elements live in memory the value does not own.
    pub fn is_external(&self) -> bool {
        self.storage.is_external()
    }

    /// Fixes the kind of the value.
    ///
    /// Setting the kind it already has is a no-op; any other kind fails
    /// once one is set.
    pub fn set_kind(&mut self, kind: Kind) -> Result<(), Error> {
        match self.kind() {
            None => {
                self.storage = Storage::empty(kind);
                Ok(())
            }
            Some(current) if current == kind => Ok(()),
            Some(current) => Err(Error::TypeFrozen {
                current,
                requested: kind,
            }),
        }
    }

    /// Grows or shrinks the value to `len` elements.
    ///
    /// New elements are zeroed or empty. New nested tables become
    /// children of the table this value belongs to once the borrow of
    /// the entry ends. Capacity never shrinks.
    pub fn resize(&mut self, len: usize) -> Result<(), Error> {
        let capacity = self.capacity.max(len);
        with_buffer!(
            &mut self.storage,
            b => {
                let vec = b.owned()?;
                reserve_total(vec, capacity);
                vec.resize_with(len, Default::default);
            },
            tables => {
                if len < tables.len() {
                    release(tables.drain(len..));
                } else {
                    reserve_total(tables, capacity);
                    tables.resize_with(len, Table::new);
                }
            },
            _ => return Err(Error::UnknownType)
        );

        self.capacity = capacity;
        Ok(())
    }

    /// Makes room for at least `capacity` elements.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), Error> {
        with_buffer!(
            &mut self.storage,
            b => reserve_total(b.owned()?, capacity),
            tables => reserve_total(tables, capacity),
            _ => return Err(Error::UnknownType)
        );

        self.capacity = self.capacity.max(capacity);
        Ok(())
    }

    /// Removes all elements, keeping the kind and capacity.
    pub fn clear(&mut self) -> Result<(), Error> {
        with_buffer!(
            &mut self.storage,
            b => b.owned()?.clear(),
            tables => release(tables.drain(..)),
            _ => ()
        );

        Ok(())
    }

    /// Points the value at `len` elements of `kind` at `ptr`.
    ///
    /// Any owned storage is released first. The kind must be unset or
    /// equal to `kind`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `len` initialized and properly aligned
    /// elements of the element type of `kind`. That memory must stay
    /// valid for as long as this value, or any clone of it, is used.
    pub unsafe fn bind_external(
        &mut self,
        ptr: NonNull<u8>,
        kind: Kind,
        len: usize,
    ) -> Result<(), Error> {
        with_element!(
            kind,
            T => unsafe { self.bind_slice::<T>(ptr.cast(), len) },
            table => Err(Error::ExternalTable)
        )
    }

    /// Typed variant of [`Value::bind_external`].
    ///
    /// # Safety
    ///
    /// Same as [`Value::bind_external`].
    pub unsafe fn bind_slice<T: Element>(&mut self, ptr: NonNull<T>, len: usize) -> Result<(), Error> {
        if let Some(current) = self.kind() {
            if current != T::KIND {
                return Err(Error::TypeFrozen {
                    current,
                    requested: T::KIND,
                });
            }
        }

        self.storage = Storage::from_buffer(Buffer::External { ptr, len });
        self.capacity = len;
        Ok(())
    }

    /// Appends an element, growing by a single slot when full.
    pub fn push<T: Element>(&mut self, value: T) -> Result<(), Error> {
        self.push_with(value, &Increment)
    }

    /// Appends an element, consulting `growth` when the value is full.
    pub fn push_with<T, G>(&mut self, value: T, growth: &G) -> Result<(), Error>
    where
        T: Element,
        G: GrowthPolicy + ?Sized,
    {
        self.check_kind(T::KIND)?;

        let capacity = self.capacity;
        let vec = self
            .storage
            .buffer_mut::<T>()
            .ok_or(Error::UnknownType)?
            .owned()?;

        if vec.len() >= capacity {
            let grown = growth.grow(vec.len(), capacity).max(capacity + 1);
            reserve_total(vec, grown);
            self.capacity = grown;
        }

        vec.push(value);
        Ok(())
    }

    /// Removes the last element, reporting whether there was one.
    pub fn remove_last(&mut self) -> Result<bool, Error> {
        let removed = with_buffer!(
            &mut self.storage,
            b => b.owned()?.pop().is_some(),
            tables => {
                let last = tables.pop();
                let removed = last.is_some();
                release(last);
                removed
            },
            _ => false
        );

        Ok(removed)
    }

    /// Removes the element at `index`, shifting all following ones down.
    pub fn remove_at(&mut self, index: usize) -> Result<(), Error> {
        with_buffer!(
            &mut self.storage,
            b => {
                let vec = b.owned()?;
                check_index(index, vec.len())?;
                vec.remove(index);
            },
            tables => {
                check_index(index, tables.len())?;
                release([tables.remove(index)]);
            },
            _ => return Err(Error::UnknownType)
        );

        Ok(())
    }

    /// Removes the first element equal to `value`, reporting whether
    /// one was found.
    pub fn remove<T: Element>(&mut self, value: &T) -> Result<bool, Error> {
        if self.is_external() {
            return Err(Error::NotMutable);
        }

        let position = self.as_slice::<T>()?.iter().position(|e| e == value);
        match position {
            Some(index) => self.remove_at(index).map(|()| true),
            None => Ok(false),
        }
    }

    /// Makes this a single-element value holding `value`.
    ///
    /// External values keep their size and get the first element
    /// overwritten instead.
    pub fn assign<T: Element>(&mut self, value: T) -> Result<(), Error> {
        self.set_kind(T::KIND)?;
        if !self.is_external() {
            self.resize(1)?;
        }
        self.set(value, 0)
    }

    /// Gets all elements as a slice.
    pub fn as_slice<T: Element>(&self) -> Result<&[T], Error> {
        self.check_kind(T::KIND)?;
        self.storage
            .buffer::<T>()
            .map(Buffer::as_slice)
            .ok_or(Error::UnknownType)
    }

    /// Gets all elements as a mutable slice.
    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T], Error> {
        self.check_kind(T::KIND)?;
        self.storage
            .buffer_mut::<T>()
            .map(Buffer::as_mut_slice)
            .ok_or(Error::UnknownType)
    }

    /// Gets the element at `index`.
    pub fn get<T: Element>(&self, index: usize) -> Result<&T, Error> {
        let elements = self.as_slice()?;
        elements.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: elements.len(),
        })
    }

    /// Gets the element at `index` mutably.
    pub fn get_mut<T: Element>(&mut self, index: usize) -> Result<&mut T, Error> {
        let elements = self.as_mut_slice()?;
        let len = elements.len();
        elements
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    /// Overwrites the element at `index`.
    pub fn set<T: Element>(&mut self, value: T, index: usize) -> Result<(), Error> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Gets the first element.
    pub fn front<T: Element>(&self) -> Result<&T, Error> {
        self.get(0)
    }

    /// Gets the last element.
    pub fn back<T: Element>(&self) -> Result<&T, Error> {
        let elements = self.as_slice()?;
        elements.last().ok_or(Error::IndexOutOfRange { index: 0, len: 0 })
    }

    /// Finds the index of the first element equal to `value`.
    ///
    /// Values of another kind never contain `value`.
    pub fn index_of<T: Element>(&self, value: &T) -> Option<usize> {
        self.as_slice::<T>().ok()?.iter().position(|e| e == value)
    }

    /// Renders the element at `index` to text.
    pub fn render(&self, index: usize) -> Result<String, Error> {
        let kind = self.kind().ok_or(Error::UnknownType)?;
        with_element!(
            kind,
            T => self.get::<T>(index).map(|e| e.render()),
            table => Err(Error::NoText(Kind::Table))
        )
    }

    /// Parses `text` and stores the result at `index`.
    pub fn set_from_text(&mut self, text: &str, index: usize) -> Result<(), Error> {
        let kind = self.kind().ok_or(Error::UnknownType)?;
        with_element!(
            kind,
            T => {
                let element = <T as Element>::parse(text)?;
                self.set(element, index)
            },
            table => Err(Error::NoText(Kind::Table))
        )
    }

    /// Parses `text` and appends the result.
    pub fn push_from_text(&mut self, text: &str) -> Result<(), Error> {
        let kind = self.kind().ok_or(Error::UnknownType)?;
        with_element!(
            kind,
            T => {
                let element = <T as Element>::parse(text)?;
                self.push(element)
            },
            table => Err(Error::NoText(Kind::Table))
        )
    }

    /// Gets the nested tables held by the value.
    ///
    /// Values of other kinds yield an empty slice.
    pub fn tables(&self) -> &[Table] {
        match &self.storage {
            Storage::Table(tables) => tables,
            _ => &[],
        }
    }

    /// Gets the nested table at `index`.
    pub fn table(&self, index: usize) -> Result<Table, Error> {
        self.check_kind(Kind::Table)?;
        let tables = self.tables();
        tables.get(index).cloned().ok_or(Error::IndexOutOfRange {
            index,
            len: tables.len(),
        })
    }

    /// Removes the nested table at `index` and hands it out as a root.
    pub fn detach_table(&mut self, index: usize) -> Result<Table, Error> {
        self.check_kind(Kind::Table)?;
        let Storage::Table(tables) = &mut self.storage else {
            return Err(Error::UnknownType);
        };

        check_index(index, tables.len())?;
        let child = tables.remove(index);
        child.set_parent(Weak::new());

        Ok(child)
    }

    /// Moves the value out, leaving an unset value behind.
    ///
    /// Nested tables in the returned value have no parent.
    pub fn take(&mut self) -> Value {
        let value = mem::take(self);
        release(value.tables().iter().cloned());
        value
    }

    // The parent link of `child` is left to the caller.
    pub(crate) fn push_table(&mut self, child: Table) -> Result<(), Error> {
        self.set_kind(Kind::Table)?;

        let capacity = self.capacity;
        let Storage::Table(tables) = &mut self.storage else {
            return Err(Error::UnknownType);
        };

        if tables.len() >= capacity {
            reserve_total(tables, capacity + 1);
            self.capacity = capacity + 1;
        }

        tables.push(child);

        Ok(())
    }

    pub(crate) fn position_of(&self, child: &Table) -> Option<usize> {
        self.tables().iter().position(|t| t.ptr_eq(child))
    }

    pub(crate) fn set_owner(&self, owner: &Weak<Node>) {
        for child in self.tables() {
            child.set_parent(owner.clone());
        }
    }

    // Detaches every nested table rejected by `keep` and returns them.
    pub(crate) fn retain_tables(&mut self, mut keep: impl FnMut(&Table) -> bool) -> Vec<Table> {
        let Storage::Table(tables) = &mut self.storage else {
            return Vec::new();
        };

        let mut rejected = Vec::new();
        tables.retain(|child| {
            let kept = keep(child);
            if !kept {
                child.set_parent(Weak::new());
                rejected.push(child.clone());
            }
            kept
        });

        rejected
    }

    pub(crate) fn drain_tables(&mut self, out: &mut Vec<Table>) {
        if let Storage::Table(tables) = &mut self.storage {
            for child in tables.drain(..) {
                child.set_parent(Weak::new());
                out.push(child);
            }
        }
    }

    fn check_kind(&self, requested: Kind) -> Result<(), Error> {
        match self.kind() {
            Some(actual) if actual == requested => Ok(()),
            Some(actual) => Err(Error::KindMismatch { requested, actual }),
            None => Err(Error::UnknownType),
        }
    }
}

/// Gets the memory layout of a single element of `kind`.
///
/// Nested tables have no layout since they cannot be external.
pub(crate) fn element_layout(kind: Kind) -> Option<Layout> {
    with_element!(kind, T => Some(Layout::new::<T>()), table => None)
}

fn check_index(index: usize, len: usize) -> Result<(), Error> {
    if index < len {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index, len })
    }
}

fn release(tables: impl IntoIterator<Item = Table>) {
    for child in tables {
        child.set_parent(Weak::new());
    }
}

fn same_elements<T: Element>(a: &Value, b: &Value) -> bool {
    match (a.as_slice::<T>(), b.as_slice::<T>()) {
        (Ok(a), Ok(b)) => a.iter().zip(b).all(|(x, y)| x.same(y)),
        _ => false,
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            capacity: self.capacity,
        }
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        // Tables that outlive us through other handles become roots.
        release(self.tables().iter().cloned());
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.kind() != other.kind() || self.len() != other.len() {
            return false;
        }

        let Some(kind) = self.kind() else {
            return true;
        };

        with_element!(
            kind,
            T => same_elements::<T>(self, other),
            table => self.tables().iter().zip(other.tables()).all(|(a, b)| a == b)
        )
    }
}

impl<T: Element> From<T> for Value {
    fn from(element: T) -> Self {
        std::iter::once(element).collect()
    }
}

impl<T: Element> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let elements: Vec<T> = iter.into_iter().collect();

        let mut value = Self::new();
        value.capacity = elements.len();
        value.storage = Storage::from_buffer(Buffer::Owned(elements));
        value
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Value");
        s.field("kind", &self.kind());
        s.field("external", &self.is_external());
        with_buffer!(
            &self.storage,
            b => s.field("elements", &b.as_slice()),
            tables => s.field("elements", tables),
            _ => &mut s
        );
        s.finish()
    }
}
