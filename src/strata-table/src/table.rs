//! Hierarchical, name-keyed tables of [`Value`]s.
//!
//! A [`Table`] is a cheap handle to a shared node holding an ordered
//! list of named entries. Entries of [`Kind::Table`] own child tables,
//! which point back to their parent through a weak link. The nested
//! tables form a strict tree: [`Table::adopt`] detaches a child from
//! its old parent and rejects adoptions that would create a cycle.
//!
//! # Borrowing
//!
//! Entries are handed out as [`Ref`] and [`EntryMut`] guards. Holding
//! such a guard while mutating the same table panics, the same way a
//! [`RefCell`] does.
//!
//! Nested tables moved into an entry through an [`EntryMut`] are
//! parented to the table when the guard is dropped. A table that would
//! end up inside itself is detached from the entry instead.

use std::{
    cell::{Ref, RefCell, RefMut},
    fmt, mem,
    ops::{Deref, DerefMut},
    rc::{Rc, Weak},
    sync::Arc,
};

use indexmap::IndexMap;
use strata_types::Kind;

use crate::{Error, Value};

/// The name of the entry through which reflected objects refer to
/// themselves.
///
/// It is ignored when comparing tables.
pub const SELF_KEY: &str = "this";

/// The ordered entries of a table.
pub type Entries = IndexMap<Arc<str>, Value>;

pub(crate) struct Node {
    entries: RefCell<Entries>,
    parent: RefCell<Weak<Node>>,
}

impl Drop for Node {
    fn drop(&mut self) {
        // Tear down deep hierarchies iteratively rather than recursively.
        let mut stack = Vec::new();
        drain_children(self.entries.get_mut(), &mut stack);

        while let Some(table) = stack.pop() {
            if let Ok(mut node) = Rc::try_unwrap(table.0) {
                drain_children(node.entries.get_mut(), &mut stack);
            }
        }
    }
}

fn drain_children(entries: &mut Entries, out: &mut Vec<Table>) {
    for value in entries.values_mut() {
        value.drain_tables(out);
    }
}

/// A handle to a table.
///
/// Cloning a [`Table`] produces another handle to the same table; use
/// [`Table::deep_copy`] to duplicate the structure itself.
#[derive(Clone)]
pub struct Table(Rc<Node>);

impl Table {
    /// Creates a new, empty root table.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new root table with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Rc::new(Node {
            entries: RefCell::new(IndexMap::with_capacity(capacity)),
            parent: RefCell::new(Weak::new()),
        }))
    }

    /// Whether both handles refer to the same table.
    pub fn ptr_eq(&self, other: &Table) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Gets the number of entries.
    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the table which owns this one, if any.
    pub fn parent(&self) -> Option<Table> {
        self.0.parent.borrow().upgrade().map(Table)
    }

    /// Borrows all entries in insertion order.
    pub fn entries(&self) -> Ref<'_, Entries> {
        self.0.entries.borrow()
    }

    /// Gets the entry names in insertion order.
    pub fn names(&self) -> Vec<Arc<str>> {
        self.entries().keys().cloned().collect()
    }

    /// Gets the value named `name` from this table only.
    pub fn find(&self, name: &str) -> Option<Ref<'_, Value>> {
        Ref::filter_map(self.entries(), |e| e.get(name)).ok()
    }

    /// Mutable variant of [`Table::find`].
    pub fn find_mut(&self, name: &str) -> Option<EntryMut<'_>> {
        RefMut::filter_map(self.0.entries.borrow_mut(), |e| e.get_mut(name))
            .ok()
            .map(|value| EntryMut { table: self, value })
    }

    /// Gets the value at position `index`.
    pub fn get(&self, index: usize) -> Option<Ref<'_, Value>> {
        Ref::filter_map(self.entries(), |e| e.get_index(index).map(|(_, v)| v)).ok()
    }

    /// Mutable variant of [`Table::get`].
    pub fn get_mut(&self, index: usize) -> Option<EntryMut<'_>> {
        RefMut::filter_map(self.0.entries.borrow_mut(), |e| {
            e.get_index_mut(index).map(|(_, v)| v)
        })
        .ok()
        .map(|value| EntryMut { table: self, value })
    }

    /// Gets the name of the entry at position `index`.
    pub fn name_at(&self, index: usize) -> Option<Arc<str>> {
        self.entries().get_index(index).map(|(k, _)| k.clone())
    }

    /// Gets the position of the entry named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries().get_index_of(name)
    }

    /// Looks up `name` here and then in every ancestor in turn.
    ///
    /// Returns the table holding the entry together with the entry's
    /// position in it.
    pub fn search(&self, name: &str) -> Option<(Table, usize)> {
        let mut table = self.clone();
        loop {
            if let Some(index) = table.index_of(name) {
                return Some((table, index));
            }
            table = table.parent()?;
        }
    }

    /// Gets the value named `name`, creating an unset one if missing.
    pub fn append(&self, name: &str) -> Result<EntryMut<'_>, Error> {
        self.append_entry(name).map(|(value, _)| value)
    }

    /// Like [`Table::append`], also reporting whether the entry was
    /// created by this call.
    pub fn append_entry(&self, name: &str) -> Result<(EntryMut<'_>, bool), Error> {
        if name.is_empty() {
            return Err(Error::EmptyKey);
        }

        let mut entries = self.0.entries.borrow_mut();
        let (index, created) = match entries.get_index_of(name) {
            Some(index) => (index, false),
            None => (entries.insert_full(Arc::from(name), Value::new()).0, true),
        };

        let value = RefMut::map(entries, |e| &mut e[index]);
        Ok((EntryMut { table: self, value }, created))
    }

    /// Creates a new child table and appends it to the entry `name`.
    ///
    /// The entry is created if missing; an existing entry must hold
    /// tables or have no kind yet.
    pub fn append_table(&self, name: &str) -> Result<Table, Error> {
        let mut value = self.append(name)?;
        ensure_table(&mut value, name)?;

        let child = Table::new();
        value.push_table(child.clone())?;

        Ok(child)
    }

    /// Moves `child` into the entry `name` of this table.
    ///
    /// `child` is detached from its current parent first, if any.
    pub fn adopt(&self, child: &Table, name: &str) -> Result<(), Error> {
        if self.ptr_eq(child) {
            return Err(Error::SelfAdoption);
        }
        if self.is_descendant_of(child) {
            return Err(Error::AncestorAdoption);
        }
        if name.is_empty() {
            return Err(Error::EmptyKey);
        }
        if let Some(value) = self.find(name) {
            ensure_kind(&value, name)?;
        }

        child.orphan();

        let mut value = self.append(name)?;
        ensure_table(&mut value, name)?;
        value.push_table(child.clone())?;

        log::debug!("Adopted table as '{name}' ({} elements)", value.len());
        Ok(())
    }

    /// Detaches this table from its parent without destroying it.
    ///
    /// Does nothing for root tables.
    pub fn orphan(&self) {
        let Some(parent) = self.parent() else {
            return;
        };

        match parent.find_contained(self) {
            Some((entry, index)) => {
                if let Some(mut value) = parent.get_mut(entry) {
                    if let Err(e) = value.detach_table(index) {
                        log::warn!("Failed to detach table from its parent: {e}");
                    }
                }
            }
            None => log::warn!("Table is not contained in its recorded parent"),
        }

        self.set_parent(Weak::new());
    }

    /// Removes the table at `index` of the entry `name` and returns it
    /// as a root.
    pub fn detach(&self, name: &str, index: usize) -> Result<Table, Error> {
        let mut value = self
            .find_mut(name)
            .ok_or_else(|| Error::MissingEntry(name.to_owned()))?;
        value.detach_table(index)
    }

    /// Locates `child` among the nested tables of this table.
    ///
    /// Returns the position of the entry and the element index.
    pub fn find_contained(&self, child: &Table) -> Option<(usize, usize)> {
        self.entries()
            .values()
            .enumerate()
            .find_map(|(entry, value)| value.position_of(child).map(|index| (entry, index)))
    }

    /// Whether `other` is reachable by walking up from this table.
    pub fn is_descendant_of(&self, other: &Table) -> bool {
        let mut current = self.parent();
        while let Some(table) = current {
            if table.ptr_eq(other) {
                return true;
            }
            current = table.parent();
        }

        false
    }

    /// Whether this table is reachable by walking up from `other`.
    pub fn is_ancestor_of(&self, other: &Table) -> bool {
        other.is_descendant_of(self)
    }

    /// Removes all entries, destroying nested tables not referenced
    /// from elsewhere.
    pub fn clear(&self) {
        let entries = mem::take(&mut *self.0.entries.borrow_mut());
        drop(entries);
    }

    /// Creates a structural copy of this table and everything nested
    /// inside of it.
    ///
    /// The copy is a root table.
    pub fn deep_copy(&self) -> Table {
        let copy = Table::with_capacity(self.len());
        let owner = Rc::downgrade(&copy.0);

        let entries: Entries = self
            .entries()
            .iter()
            .map(|(name, value)| {
                let value = value.clone();
                value.set_owner(&owner);
                (name.clone(), value)
            })
            .collect();

        *copy.0.entries.borrow_mut() = entries;
        copy
    }

    /// Replaces the entries of this table with a deep copy of `other`.
    ///
    /// The parent of this table is unaffected.
    pub fn copy_from(&self, other: &Table) {
        if self.ptr_eq(other) {
            return;
        }

        let copy = other.deep_copy();
        self.take_entries(&copy);
    }

    /// Moves all entries of `other` into this table, replacing what
    /// was there before.
    ///
    /// Tables nested in the moved entries are re-parented to this
    /// table; `other` is left empty.
    pub fn move_from(&self, other: &Table) -> Result<(), Error> {
        if self.ptr_eq(other) {
            return Ok(());
        }
        if self.is_descendant_of(other) {
            return Err(Error::AncestorAdoption);
        }

        self.take_entries(other);
        Ok(())
    }

    pub(crate) fn set_parent(&self, parent: Weak<Node>) {
        *self.0.parent.borrow_mut() = parent;
    }

    fn take_entries(&self, other: &Table) {
        let entries = mem::take(&mut *other.0.entries.borrow_mut());
        let owner = Rc::downgrade(&self.0);
        for value in entries.values() {
            value.set_owner(&owner);
        }

        let old = mem::replace(&mut *self.0.entries.borrow_mut(), entries);
        drop(old);
    }
}

/// A mutable borrow of a single entry of a [`Table`].
///
/// Dereferences to the entry's [`Value`].
pub struct EntryMut<'a> {
    table: &'a Table,
    value: RefMut<'a, Value>,
}

impl Deref for EntryMut<'_> {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.value
    }
}

impl DerefMut for EntryMut<'_> {
    fn deref_mut(&mut self) -> &mut Value {
        &mut self.value
    }
}

impl Drop for EntryMut<'_> {
    fn drop(&mut self) {
        let table = self.table;
        let cyclic = self
            .value
            .retain_tables(|child| !child.ptr_eq(table) && !table.is_descendant_of(child));
        if !cyclic.is_empty() {
            log::warn!("Detached {} table(s) that would contain themselves", cyclic.len());
        }

        self.value.set_owner(&Rc::downgrade(&table.0));
    }
}

impl fmt::Debug for EntryMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.value, f)
    }
}

fn ensure_kind(value: &Value, name: &str) -> Result<(), Error> {
    match value.kind() {
        None | Some(Kind::Table) => Ok(()),
        Some(_) => Err(Error::NotATable(name.to_owned())),
    }
}

fn ensure_table(value: &mut Value, name: &str) -> Result<(), Error> {
    ensure_kind(value, name)?;
    value.set_kind(Kind::Table)
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }

        let (a, b) = (self.entries(), other.entries());
        a.len() == b.len()
            && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| {
                ka == kb && (&**ka == SELF_KEY || va == vb)
            })
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.entries.try_borrow() {
            Ok(entries) => f.debug_map().entries(entries.iter()).finish(),
            Err(_) => f.write_str("Table(<borrowed>)"),
        }
    }
}
