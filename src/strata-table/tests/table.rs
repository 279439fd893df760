use std::mem;

use strata_table::{Error, Table, Value, strata_types::Kind};

#[test]
fn append_is_idempotent() -> Result<(), Error> {
    let table = Table::new();

    let (mut value, created) = table.append_entry("Health")?;
    assert!(created);
    assert_eq!(value.push(10i32), Err(Error::UnknownType));
    value.set_kind(Kind::Integer)?;
    value.push(10i32)?;
    drop(value);

    let (value, created) = table.append_entry("Health")?;
    assert!(!created);
    assert_eq!(value.as_slice::<i32>()?, [10]);
    drop(value);

    assert_eq!(table.len(), 1);
    assert_eq!(table.append("").err(), Some(Error::EmptyKey));

    Ok(())
}

#[test]
fn entries_keep_insertion_order() -> Result<(), Error> {
    let table = Table::new();
    for name in ["Zeta", "Alpha", "Mu"] {
        table.append(name)?;
    }
    table.append("Alpha")?;

    let names: Vec<_> = table.names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, ["Zeta", "Alpha", "Mu"]);
    assert_eq!(table.index_of("Mu"), Some(2));
    assert_eq!(table.name_at(1).as_deref(), Some("Alpha"));
    assert!(table.get(3).is_none());

    Ok(())
}

#[test]
fn append_table_sets_parent() -> Result<(), Error> {
    let root = Table::new();
    let first = root.append_table("Children")?;
    let second = root.append_table("Children")?;

    assert!(first.parent().is_some_and(|p| p.ptr_eq(&root)));
    assert!(second.parent().is_some_and(|p| p.ptr_eq(&root)));

    let children = root.find("Children").map(|v| v.len());
    assert_eq!(children, Some(2));
    assert_eq!(root.find_contained(&second), Some((0, 1)));

    root.append("Health")?.assign(5i32)?;
    assert_eq!(root.append_table("Health"), Err(Error::NotATable("Health".into())));

    Ok(())
}

#[test]
fn adoption_cycles_are_rejected() -> Result<(), Error> {
    let a = Table::new();
    let b = a.append_table("B")?;
    let c = b.append_table("C")?;

    assert_eq!(a.adopt(&a, "Self"), Err(Error::SelfAdoption));
    assert_eq!(c.adopt(&a, "Up"), Err(Error::AncestorAdoption));
    assert_eq!(b.adopt(&a, "Up"), Err(Error::AncestorAdoption));

    assert!(a.is_ancestor_of(&c));
    assert!(c.is_descendant_of(&a));
    assert!(!a.is_descendant_of(&c));

    // Nothing moved.
    assert!(c.parent().is_some_and(|p| p.ptr_eq(&b)));
    assert_eq!(a.find("Up").map(|v| v.len()), None);

    Ok(())
}

#[test]
fn adopt_rejects_bad_names() -> Result<(), Error> {
    let parent = Table::new();
    let child = Table::new();

    parent.append("Speed")?.assign(1.0f32)?;
    assert_eq!(parent.adopt(&child, "Speed"), Err(Error::NotATable("Speed".into())));
    assert_eq!(parent.adopt(&child, ""), Err(Error::EmptyKey));
    assert!(child.parent().is_none());

    // Entries without a kind become table entries.
    parent.append("Slot")?;
    parent.adopt(&child, "Slot")?;
    assert_eq!(parent.find("Slot").and_then(|v| v.kind()), Some(Kind::Table));

    Ok(())
}

#[test]
fn adopt_then_orphan() -> Result<(), Error> {
    let parent = Table::new();
    let child = Table::new();

    parent.adopt(&child, "X")?;
    assert!(child.parent().is_some_and(|p| p.ptr_eq(&parent)));
    {
        let value = parent.find("X").ok_or(Error::MissingEntry("X".into()))?;
        assert_eq!(value.len(), 1);
        assert!(value.table(0)?.ptr_eq(&child));
    }

    child.orphan();
    assert!(child.parent().is_none());
    assert_eq!(parent.find_contained(&child), None);
    assert_eq!(parent.find("X").map(|v| v.len()), Some(0));

    // Orphaning a root is a no-op.
    child.orphan();

    Ok(())
}

#[test]
fn orphan_and_readopt() -> Result<(), Error> {
    let root = Table::new();
    let other = Table::new();

    let child = root.append_table("Children")?;
    child.append("Name")?.assign(String::from("child"))?;

    child.orphan();
    assert_eq!(root.find("Children").map(|v| v.len()), Some(0));
    assert!(child.parent().is_none());

    other.adopt(&child, "Moved")?;
    assert!(child.parent().is_some_and(|p| p.ptr_eq(&other)));
    assert_eq!(child.find("Name").map(|v| v.render(0)), Some(Ok("child".into())));

    Ok(())
}

#[test]
fn adopt_moves_between_parents() -> Result<(), Error> {
    let first = Table::new();
    let second = Table::new();

    let child = first.append_table("Slot")?;
    second.adopt(&child, "Slot")?;

    assert_eq!(first.find("Slot").map(|v| v.len()), Some(0));
    assert_eq!(second.find_contained(&child), Some((0, 0)));

    let detached = second.detach("Slot", 0)?;
    assert!(detached.ptr_eq(&child));
    assert!(child.parent().is_none());
    assert_eq!(second.detach("Nope", 0), Err(Error::MissingEntry("Nope".into())));

    Ok(())
}

#[test]
fn search_walks_up() -> Result<(), Error> {
    let root = Table::new();
    root.append("Gravity")?.assign(9.81f32)?;
    let middle = root.append_table("Level")?;
    middle.append("Name")?.assign(String::from("cave"))?;
    let leaf = middle.append_table("Room")?;

    let (owner, index) = leaf.search("Gravity").ok_or(Error::MissingEntry("Gravity".into()))?;
    assert!(owner.ptr_eq(&root));
    assert_eq!(index, 0);

    let (owner, _) = leaf.search("Name").ok_or(Error::MissingEntry("Name".into()))?;
    assert!(owner.ptr_eq(&middle));

    assert!(leaf.search("Missing").is_none());
    assert!(leaf.find("Gravity").is_none());

    Ok(())
}

#[test]
fn equality_ignores_self_entry() -> Result<(), Error> {
    let build = |this: i32| -> Result<Table, Error> {
        let table = Table::new();
        table.append("this")?.assign(this)?;
        table.append("Health")?.assign(3i32)?;
        table.append_table("Child")?.append("Name")?.assign(String::from("x"))?;
        Ok(table)
    };

    let a = build(1)?;
    let b = build(2)?;
    assert_eq!(a, b);

    b.append_table("Child")?;
    assert_ne!(a, b);

    Ok(())
}

#[test]
fn deep_copy_is_independent() -> Result<(), Error> {
    let root = Table::new();
    root.append("Health")?.assign(3i32)?;
    let child = root.append_table("Child")?;
    child.append("Name")?.assign(String::from("a"))?;

    let copy = root.deep_copy();
    assert_eq!(copy, root);
    assert!(copy.parent().is_none());

    let copied_child = copy.find("Child").ok_or(Error::MissingEntry("Child".into()))?.table(0)?;
    assert!(!copied_child.ptr_eq(&child));
    assert!(copied_child.parent().is_some_and(|p| p.ptr_eq(&copy)));

    copied_child.append("Name")?.assign(String::from("b"))?;
    assert_eq!(child.find("Name").map(|v| v.render(0)), Some(Ok("a".into())));
    assert_ne!(copy, root);

    Ok(())
}

#[test]
fn copy_and_move_assignment() -> Result<(), Error> {
    let source = Table::new();
    source.append("Health")?.assign(3i32)?;
    let child = source.append_table("Child")?;

    let target = Table::new();
    target.append("Stale")?;
    target.copy_from(&source);
    assert_eq!(target, source);
    assert!(target.find("Stale").is_none());

    let moved = Table::new();
    moved.move_from(&source)?;
    assert!(source.is_empty());
    assert!(child.parent().is_some_and(|p| p.ptr_eq(&moved)));
    assert_eq!(moved, target);

    let nested = moved.append_table("Nested")?;
    assert_eq!(nested.move_from(&moved), Err(Error::AncestorAdoption));

    Ok(())
}

#[test]
fn dropped_parent_leaves_roots() -> Result<(), Error> {
    let child = {
        let root = Table::new();
        root.append_table("Child")?
    };
    assert!(child.parent().is_none());

    let value_child = {
        let mut value = Value::with_kind(Kind::Table);
        value.resize(1)?;
        value.table(0)?
    };
    assert!(value_child.parent().is_none());

    Ok(())
}

#[test]
fn deep_hierarchies_drop_iteratively() -> Result<(), Error> {
    let root = Table::new();
    let mut current = root.clone();
    for _ in 0..100_000 {
        current = current.append_table("Next")?;
    }
    drop(current);
    drop(root);

    Ok(())
}

#[test]
fn replaced_entries_keep_parent_links() -> Result<(), Error> {
    let root = Table::new();

    *root.append("Kids")? = Value::with_kind(Kind::Table);
    let child = root.append_table("Kids")?;
    assert!(child.parent().is_some_and(|p| p.ptr_eq(&root)));

    root.find_mut("Kids").ok_or(Error::MissingEntry("Kids".into()))?.resize(3)?;
    let grown = root.find("Kids").ok_or(Error::MissingEntry("Kids".into()))?.table(2)?;
    assert!(grown.is_descendant_of(&root));

    child.orphan();
    assert_eq!(root.find("Kids").map(|v| v.len()), Some(2));

    Ok(())
}

#[test]
fn moved_entries_cannot_form_cycles() -> Result<(), Error> {
    let root = Table::new();
    let child = root.append_table("Kids")?;

    let kids = root.find_mut("Kids").ok_or(Error::MissingEntry("Kids".into()))?.take();
    assert!(child.parent().is_none());

    *child.append("Loop")? = kids;
    assert_eq!(child.find("Loop").map(|v| v.len()), Some(0));
    assert_eq!(child.find_contained(&child), None);
    assert!(child.parent().is_none());

    Ok(())
}

#[test]
fn swapped_entries_stay_a_tree() -> Result<(), Error> {
    let root = Table::new();
    let middle = root.append_table("Middle")?;
    let leaf = middle.append_table("Leaf")?;
    leaf.append("Below")?.set_kind(Kind::Table)?;

    mem::swap(
        &mut *root.find_mut("Middle").ok_or(Error::MissingEntry("Middle".into()))?,
        &mut *leaf.find_mut("Below").ok_or(Error::MissingEntry("Below".into()))?,
    );

    // `middle` would have ended up below its own descendant.
    assert_eq!(leaf.find("Below").map(|v| v.len()), Some(0));
    assert!(middle.parent().is_none());
    assert!(leaf.is_descendant_of(&middle));
    assert!(!leaf.is_descendant_of(&root));
    assert_eq!(root.find("Middle").map(|v| v.len()), Some(0));

    Ok(())
}
