use std::collections::HashMap;

use super::{ClassId, Error, Field};

/// Layout metadata of a single registered class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// The class itself.
    pub class: ClassId,
    /// The fields declared directly by the class, in order.
    pub fields: Vec<Field>,
    /// The class this one extends, if any.
    pub base: Option<ClassId>,
}

/// A catalog of [`TypeInfo`]s keyed by class identity.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: HashMap<ClassId, TypeInfo>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the fields of `class`, optionally extending `base`.
    ///
    /// Fails when `class` was already registered.
    pub fn add(
        &mut self,
        class: ClassId,
        fields: Vec<Field>,
        base: Option<ClassId>,
    ) -> Result<(), Error> {
        if self.types.contains_key(&class) {
            return Err(Error::AlreadyRegistered(class));
        }

        log::debug!(
            "Registering class '{class}' with {} fields (base: {base:?})",
            fields.len()
        );
        self.types.insert(
            class,
            TypeInfo {
                class,
                fields,
                base,
            },
        );

        Ok(())
    }

    /// Registers the fields of `T`.
    pub fn register<T: 'static>(&mut self, fields: Vec<Field>) -> Result<(), Error> {
        self.add(ClassId::of::<T>(), fields, None)
    }

    /// Registers the fields of `T` as an extension of `B`.
    pub fn register_derived<T: 'static, B: 'static>(
        &mut self,
        fields: Vec<Field>,
    ) -> Result<(), Error> {
        self.add(ClassId::of::<T>(), fields, Some(ClassId::of::<B>()))
    }

    /// Gets the metadata registered for `class`.
    pub fn get(&self, class: ClassId) -> Option<&TypeInfo> {
        self.types.get(&class)
    }

    /// Walks the extension chain of `class`, starting at `class` itself.
    ///
    /// The walk ends at the first class that is not registered. A chain
    /// that loops back onto itself is cut off before the repeat.
    pub fn chain(&self, class: ClassId) -> impl Iterator<Item = &TypeInfo> {
        let mut next = Some(class);
        let mut seen = Vec::new();

        std::iter::from_fn(move || {
            let info = self.types.get(&next?)?;
            if seen.contains(&info.class) {
                return None;
            }

            seen.push(info.class);
            next = info.base;
            Some(info)
        })
    }

    /// Gets the full field list of `class`, base-first.
    ///
    /// An unregistered class yields an empty list.
    pub fn fields_for(&self, class: ClassId) -> Vec<Field> {
        let chain: Vec<_> = self.chain(class).collect();
        chain
            .into_iter()
            .rev()
            .flat_map(|info| info.fields.iter().cloned())
            .collect()
    }

    /// Finds a field by name anywhere in the extension chain of `class`.
    pub fn field_by_name(&self, class: ClassId, name: &str) -> Option<Field> {
        self.fields_for(class).into_iter().find(|f| f.name.as_str() == name)
    }

    /// Removes `class` from the registry, returning its metadata.
    pub fn remove(&mut self, class: ClassId) -> Option<TypeInfo> {
        let info = self.types.remove(&class);
        if info.is_some() {
            log::debug!("Removed class '{class}'");
        }

        info
    }

    /// Whether `class` is registered.
    pub fn contains(&self, class: ClassId) -> bool {
        self.types.contains_key(&class)
    }

    /// Removes every registered class.
    pub fn clear(&mut self) {
        log::debug!("Clearing {} registered classes", self.types.len());
        self.types.clear();
    }

    /// Gets the number of registered classes.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no class is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
