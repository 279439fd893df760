use std::{borrow::Cow, slice};

use serde_json::{Map, Value as Json};
use strata_types::Kind;

use super::Error;
use crate::{Table, Value, value::ObjectRef};

// Names the class of the described object. Tables are never turned
// into class instances from data, so the key is skipped.
const CLASS_KEY: &str = "class";

const NULL_POINTER: &str = "nullptr";

/// Loads the entries described by `json` into `table`.
///
/// Loading into existing entries extends them: owned values get the
/// parsed elements appended, external values are overwritten in place
/// starting at element zero.
pub fn load(table: &Table, json: &Json) -> Result<(), Error> {
    let entries = json
        .as_object()
        .ok_or_else(|| Error::Malformed(String::new(), "expected an object of entries"))?;

    load_entries(table, entries)
}

fn load_entries(table: &Table, entries: &Map<String, Json>) -> Result<(), Error> {
    for (name, entry) in entries {
        if name == CLASS_KEY {
            log::warn!("Skipping class {entry}; tables are not instantiated from data");
            continue;
        }

        load_entry(table, name, entry)?;
    }

    Ok(())
}

fn load_entry(table: &Table, name: &str, entry: &Json) -> Result<(), Error> {
    let entry = entry
        .as_object()
        .ok_or_else(|| Error::Malformed(name.to_owned(), "expected an object"))?;

    let kind: Kind = match entry.get("type") {
        Some(Json::Null) => {
            table.append(name)?;
            return Ok(());
        }
        Some(Json::String(kind)) => kind.parse()?,
        _ => return Err(Error::Malformed(name.to_owned(), "missing type")),
    };
    let elements = element_list(entry.get("value"));

    if kind.is_table() {
        table.append(name)?.set_kind(Kind::Table)?;
        for child in elements {
            let entries = child
                .as_object()
                .ok_or_else(|| Error::Malformed(name.to_owned(), "expected a table object"))?;

            load_entries(&table.append_table(name)?, entries)?;
        }
        return Ok(());
    }

    let mut value = table.append(name)?;
    value.set_kind(kind)?;

    let external = value.is_external();
    for (index, element) in elements.iter().enumerate() {
        if kind == Kind::Pointer {
            store_pointer(&mut value, name, element, index, external)?;
            continue;
        }

        let text = element_text(name, element)?;
        if external {
            value.set_from_text(&text, index)?;
        } else {
            value.push_from_text(&text)?;
        }
    }

    Ok(())
}

fn element_list(value: Option<&Json>) -> &[Json] {
    match value {
        None | Some(Json::Null) => &[],
        Some(Json::Array(items)) => items,
        Some(single) => slice::from_ref(single),
    }
}

fn element_text<'a>(name: &str, element: &'a Json) -> Result<Cow<'a, str>, Error> {
    match element {
        Json::String(text) => Ok(Cow::Borrowed(text)),
        Json::Number(number) => Ok(Cow::Owned(number.to_string())),
        _ => Err(Error::Malformed(name.to_owned(), "expected a number or a string")),
    }
}

// Pointers have no text form, only null pointers can be restored.
fn store_pointer(value: &mut Value, name: &str, element: &Json, index: usize, external: bool) -> Result<(), Error> {
    match element {
        Json::Null => {}
        Json::String(text) if text == NULL_POINTER => {}
        _ => return Err(Error::Malformed(name.to_owned(), "only null pointers can be loaded")),
    }

    if external {
        value.set(ObjectRef::null(), index)?;
    } else {
        value.push(ObjectRef::null())?;
    }
    Ok(())
}
