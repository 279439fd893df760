#![cfg(feature = "serde")]

use std::{any::Any, mem::offset_of};

use serde_json::json;
use strata_table::{
    Attributes, Reflected, Table,
    serde::{self as json_io, Error},
    strata_types::{Field, Kind, Registry},
    value::{Object, ObjectRef, Vec4},
};

#[test]
fn load_and_serialize_are_stable() -> Result<(), Error> {
    let input = json!({
        "Health": { "type": "Integer", "value": 5 },
        "Names": { "type": "String", "value": ["a", "b"] },
        "Speed": { "type": "Float", "value": 1.5 },
        "Position": { "type": "Vector4", "value": "vec4(1, 2, 3, 4)" },
        "Empty": { "type": "Integer", "value": [] },
        "Unset": { "type": null, "value": null },
        "Target": { "type": "Pointer", "value": "nullptr" },
        "Child": {
            "type": "Table",
            "value": { "X": { "type": "Float", "value": [0.1, -2.0] } }
        },
        "Items": {
            "type": "Table",
            "value": [
                { "Id": { "type": "Integer", "value": 1 } },
                { "Id": { "type": "Integer", "value": 2 } }
            ]
        }
    });

    let table = Table::new();
    json_io::load(&table, &input)?;

    assert_eq!(table.find("Health").map(|v| v.render(0)), Some(Ok("5".into())));
    assert_eq!(table.find("Names").map(|v| v.len()), Some(2));
    assert_eq!(table.find("Unset").map(|v| v.kind()), Some(None));
    assert_eq!(table.find("Items").map(|v| v.len()), Some(2));

    let position = table.find("Position").map(|v| v.get::<Vec4>(0).copied());
    assert_eq!(position, Some(Ok(Vec4::new(1.0, 2.0, 3.0, 4.0))));

    let target = table.find("Target").map(|v| v.get::<ObjectRef>(0).map(ObjectRef::is_null));
    assert_eq!(target, Some(Ok(true)));

    let output: serde_json::Value = serde_json::from_str(&serde_json::to_string(&table)?)?;
    assert_eq!(output, input);

    Ok(())
}

#[test]
fn from_str_builds_tree() -> Result<(), Error> {
    let table = json_io::from_str(
        r#"{ "Level": { "type": "Table", "value": { "Room": { "type": "Table", "value": {} } } } }"#,
    )?;

    let level = table
        .find("Level")
        .ok_or(Error::Malformed("Level".into(), "missing"))?
        .table(0)?;
    assert!(level.parent().is_some_and(|p| p.ptr_eq(&table)));
    assert_eq!(level.find("Room").map(|v| v.len()), Some(1));

    Ok(())
}

#[test]
fn class_key_is_skipped() -> Result<(), Error> {
    let table = json_io::from_str(
        r#"{ "class": "Player", "Health": { "type": "integer", "value": "12" } }"#,
    )?;

    assert_eq!(table.len(), 1);
    assert_eq!(table.find("Health").map(|v| v.render(0)), Some(Ok("12".into())));

    Ok(())
}

#[test]
fn loading_extends_owned_entries() -> Result<(), Error> {
    let table = Table::new();
    table.append("Scores")?.assign(1i32)?;

    json_io::load(&table, &json!({ "Scores": { "type": "Integer", "value": [2, 3] } }))?;
    assert_eq!(table.find("Scores").map(|v| v.len()), Some(3));

    Ok(())
}

#[test]
fn kinds_serialize_by_canonical_name() -> Result<(), Error> {
    let names = serde_json::to_value(Kind::ALL)?;
    assert_eq!(
        names,
        json!(["Integer", "Float", "String", "Vector4", "Matrix4", "Pointer", "Table"])
    );

    Ok(())
}

#[test]
fn malformed_input() -> Result<(), Error> {
    let table = Table::new();

    let result = json_io::load(&table, &json!([1, 2]));
    assert!(matches!(result, Err(Error::Malformed(..))));

    let result = json_io::load(&table, &json!({ "A": { "value": 1 } }));
    assert!(matches!(result, Err(Error::Malformed(name, _)) if name == "A"));

    let result = json_io::load(&table, &json!({ "B": { "type": "Quaternion", "value": 1 } }));
    assert!(matches!(result, Err(Error::Types(_))));

    let result = json_io::load(&table, &json!({ "C": { "type": "Integer", "value": "x" } }));
    assert!(matches!(result, Err(Error::Table(strata_table::Error::Parse { .. }))));

    let result = json_io::load(&table, &json!({ "C": { "type": "Float", "value": 1 } }));
    assert!(matches!(result, Err(Error::Table(strata_table::Error::TypeFrozen { .. }))));

    let result = json_io::load(&table, &json!({ "D": { "type": "Integer", "value": [true] } }));
    assert!(matches!(result, Err(Error::Malformed(..))));

    let result = json_io::from_str("{ not json");
    assert!(matches!(result, Err(Error::Json(_))));

    Ok(())
}

#[repr(C)]
struct Stats {
    attributes: Attributes,
    levels: [i32; 2],
}

impl Object for Stats {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Reflected for Stats {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

#[test]
fn external_entries_are_overwritten() -> Result<(), Error> {
    let mut registry = Registry::new();
    registry.register::<Stats>(vec![Field::new("Levels", Kind::Integer, 2, offset_of!(Stats, levels))])?;

    let mut stats = Stats {
        attributes: Attributes::new::<Stats>(),
        levels: [0, 0],
    };
    unsafe { stats.populate_in(&registry)? };

    let table = stats.attributes.table().clone();
    json_io::load(&table, &json!({ "Levels": { "type": "Integer", "value": [7, 8] } }))?;
    assert_eq!(stats.levels, [7, 8]);

    let result = json_io::load(&table, &json!({ "Levels": { "type": "Integer", "value": [1, 2, 3] } }));
    assert!(matches!(
        result,
        Err(Error::Table(strata_table::Error::IndexOutOfRange { index: 2, len: 2 }))
    ));

    // The self entry stays out of the output.
    let output = serde_json::to_value(&table)?;
    assert_eq!(output, json!({ "Levels": { "type": "Integer", "value": [1, 2] } }));

    Ok(())
}
