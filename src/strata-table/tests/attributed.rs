use std::{any::Any, mem::offset_of};

use strata_table::{
    Attributes, Error, Reflected, attributed,
    strata_types::{ClassId, Field, Kind, Registry, global},
    value::{Object, Vec4},
};

#[derive(Clone)]
#[repr(C)]
struct Counter {
    attributes: Attributes,
    count: i32,
}

impl Counter {
    fn new() -> Result<Self, Error> {
        let class = ClassId::of::<Self>();
        if !global::contains(class) {
            global::register::<Self>(vec![Field::scalar("Count", Kind::Integer, offset_of!(Self, count))])?;
        }

        Ok(Self {
            attributes: Attributes::new::<Self>(),
            count: 0,
        })
    }

    fn count_ptr(&self) -> Result<*const i32, Error> {
        let value = self
            .attributes
            .table()
            .find("Count")
            .ok_or(Error::MissingEntry("Count".into()))?;
        Ok(value.as_slice::<i32>()?.as_ptr())
    }
}

impl Object for Counter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equals(&self, other: &dyn Object) -> bool {
        attributed::equals(self, other)
    }
}

impl Reflected for Counter {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

#[derive(Clone)]
#[repr(C)]
struct Entity {
    attributes: Attributes,
    name: String,
    position: Vec4,
}

#[derive(Clone)]
#[repr(C)]
struct Actor {
    entity: Entity,
    health: i32,
    speeds: [f32; 3],
}

impl Actor {
    fn new() -> Self {
        Self {
            entity: Entity {
                attributes: Attributes::new::<Actor>(),
                name: String::from("actor"),
                position: Vec4::ZERO,
            },
            health: 100,
            speeds: [1.0, 2.0, 3.0],
        }
    }
}

impl Object for Actor {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Reflected for Actor {
    fn attributes(&self) -> &Attributes {
        &self.entity.attributes
    }
}

fn actor_registry() -> Result<Registry, Error> {
    let mut registry = Registry::new();
    registry.register::<Entity>(vec![
        Field::scalar("Name", Kind::String, offset_of!(Entity, name)),
        Field::scalar("Position", Kind::Vector, offset_of!(Entity, position)),
    ])?;
    registry.register_derived::<Actor, Entity>(vec![
        Field::scalar("Health", Kind::Integer, offset_of!(Actor, health)),
        Field::new("Speeds", Kind::Float, 3, offset_of!(Actor, speeds)),
        Field::new("Inventory", Kind::Table, 2, 0),
    ])?;

    Ok(registry)
}

#[test]
fn aliasing_is_bidirectional() -> Result<(), Error> {
    let mut a = Counter::new()?;
    unsafe { a.populate()? };

    let table = a.attributes.table().clone();
    table.append("Count")?.set(5i32, 0)?;
    assert_eq!(a.count, 5);

    a.count = 7;
    assert_eq!(table.find("Count").map(|v| v.render(0)), Some(Ok("7".into())));

    Ok(())
}

#[test]
fn duplicate_rebinds_to_copy() -> Result<(), Error> {
    let mut a = Counter::new()?;
    unsafe { a.populate()? };
    a.attributes.table().append("Count")?.set(5i32, 0)?;

    let b = unsafe { a.duplicate()? };
    b.attributes.table().append("Count")?.set(9i32, 0)?;

    assert_eq!(a.count, 5);
    assert_eq!(b.count, 9);
    assert_eq!(b.count_ptr()?, &b.count as *const i32);
    assert_eq!(a.count_ptr()?, &a.count as *const i32);

    Ok(())
}

#[test]
fn self_entry_points_at_instance() -> Result<(), Error> {
    let mut a = Counter::new()?;
    unsafe { a.populate()? };

    let b = unsafe { a.duplicate()? };
    for counter in [&a, &*b] {
        let table = counter.attributes.table();
        assert_eq!(table.index_of("this"), Some(0));

        let this = table.find("this").ok_or(Error::MissingEntry("this".into()))?;
        let object = this.get::<strata_table::value::ObjectRef>(0)?.get();
        let object = object.and_then(|o| o.as_any().downcast_ref::<Counter>());
        assert!(object.is_some_and(|o| std::ptr::eq(o, counter)));
    }

    Ok(())
}

#[test]
fn assign_and_relocate() -> Result<(), Error> {
    let mut a = Counter::new()?;
    unsafe { a.populate()? };
    a.count = 3;

    let mut c = Counter::new()?;
    unsafe { c.populate()? };
    unsafe { c.assign_from(&a)? };
    assert_eq!(c.count, 3);
    assert_eq!(c.count_ptr()?, &c.count as *const i32);

    let moved = unsafe { c.relocate()? };
    assert_eq!(moved.count_ptr()?, &moved.count as *const i32);
    assert_eq!(moved.attributes, a.attributes);

    Ok(())
}

#[test]
fn extras_cannot_shadow_fields() -> Result<(), Error> {
    let mut a = Counter::new()?;
    unsafe { a.populate()? };

    a.attributes.append_extra("Hello")?.assign(String::from("world"))?;
    assert!(a.attributes.is_attribute("Hello"));
    assert!(a.attributes.is_extra("Hello"));
    assert!(!a.attributes.is_declared("Hello"));

    assert!(a.attributes.is_declared("Count"));
    assert!(a.attributes.is_declared("this"));
    assert!(!a.attributes.is_extra("Count"));
    assert_eq!(a.attributes.append_extra("Count").err(), Some(Error::AlreadyDeclared("Count".into())));

    let names = |names: Vec<std::sync::Arc<str>>| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
    assert_eq!(names(a.attributes.declared()), ["this", "Count"]);
    assert_eq!(names(a.attributes.extras()), ["Hello"]);

    // Extras are owned and copied along with the instance.
    let b = unsafe { a.duplicate()? };
    b.attributes.table().append("Hello")?.assign(String::from("moon"))?;
    assert!(!b.attributes.table().find("Hello").is_some_and(|v| v.is_external()));
    assert_eq!(
        a.attributes.table().find("Hello").map(|v| v.render(0)),
        Some(Ok("world".into()))
    );

    Ok(())
}

#[test]
fn populate_follows_base_chain() -> Result<(), Error> {
    let registry = actor_registry()?;
    let mut actor = Actor::new();
    unsafe { actor.populate_in(&registry)? };

    let table = actor.attributes().table().clone();
    let names: Vec<_> = table.names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, ["this", "Name", "Position", "Health", "Speeds", "Inventory"]);

    let inventory = table.find("Inventory").ok_or(Error::MissingEntry("Inventory".into()))?;
    assert_eq!(inventory.kind(), Some(Kind::Table));
    assert_eq!(inventory.len(), 2);
    assert!(inventory.tables().iter().all(|t| t.parent().is_some_and(|p| p.ptr_eq(&table))));
    drop(inventory);

    assert_eq!(table.find("Speeds").map(|v| v.len()), Some(3));
    table.append("Speeds")?.set(4.5f32, 2)?;
    table.append("Name")?.set(String::from("hero"), 0)?;
    table.append("Position")?.set_from_text("vec4(1, 2, 3, 4)", 0)?;

    assert_eq!(actor.speeds, [1.0, 2.0, 4.5]);
    assert_eq!(actor.entity.name, "hero");
    assert_eq!(actor.entity.position, Vec4::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(table.find("Health").map(|v| v.render(0)), Some(Ok("100".into())));

    assert!(actor.attributes().is_declared_in(&registry, "Position"));
    assert!(!actor.attributes().is_declared("Position"));

    Ok(())
}

#[test]
fn rebind_requires_entries() -> Result<(), Error> {
    let registry = actor_registry()?;
    let mut actor = Actor::new();

    assert_eq!(
        unsafe { actor.rebind_in(&registry) },
        Err(Error::MissingEntry("Name".into()))
    );
    assert_eq!(
        unsafe { actor.populate_in(&Registry::new()) },
        Err(Error::Types(strata_table::strata_types::Error::NotRegistered(
            ClassId::of::<Actor>()
        )))
    );

    Ok(())
}

#[test]
fn invalid_layouts_are_rejected() -> Result<(), Error> {
    let mut outside = Registry::new();
    outside.register::<Counter>(vec![Field::new("Count", Kind::Integer, 16, offset_of!(Counter, count))])?;

    let mut a = Counter::new()?;
    let outside_result = unsafe { a.populate_in(&outside) };
    assert_eq!(outside_result, Err(Error::FieldLayout("Count".into())));

    let mut misaligned = Registry::new();
    misaligned.register::<Counter>(vec![Field::scalar("Count", Kind::Integer, offset_of!(Counter, count) + 1)])?;

    let mut b = Counter::new()?;
    let misaligned_result = unsafe { b.populate_in(&misaligned) };
    assert_eq!(misaligned_result, Err(Error::FieldLayout("Count".into())));

    Ok(())
}
