use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use strata_types::Kind;

use crate::{
    Table, Value,
    table::SELF_KEY,
    value::{Element, Mat4, ObjectRef, Vec4},
};

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();

        let mut map = serializer.serialize_map(None)?;
        for (name, value) in entries.iter().filter(|(name, _)| &***name != SELF_KEY) {
            map.serialize_entry(&**name, value)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", &self.kind())?;
        map.serialize_entry("value", &Elements(self))?;
        map.end()
    }
}

struct Elements<'a>(&'a Value);

impl Serialize for Elements<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        let Some(kind) = value.kind() else {
            return serializer.serialize_none();
        };

        match kind {
            Kind::Integer => one_or_many(serializer, slice::<i32, S>(value)?),
            Kind::Float => {
                let floats = slice::<f32, S>(value)?;
                one_or_many(serializer, floats.iter().copied().map(Float))
            }
            Kind::String => one_or_many(serializer, slice::<String, S>(value)?),
            Kind::Vector => rendered(serializer, slice::<Vec4, S>(value)?),
            Kind::Matrix => rendered(serializer, slice::<Mat4, S>(value)?),
            Kind::Pointer => rendered(serializer, slice::<ObjectRef, S>(value)?),
            Kind::Table => one_or_many(serializer, value.tables()),
        }
    }
}

// Floats without a JSON number representation fall back to text.
struct Float(f32);

impl Serialize for Float {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f32(self.0)
        } else {
            serializer.serialize_str(&self.0.render())
        }
    }
}

fn slice<T: Element, S: Serializer>(value: &Value) -> Result<&[T], S::Error> {
    value.as_slice::<T>().map_err(S::Error::custom)
}

fn rendered<T: Element, S: Serializer>(serializer: S, elements: &[T]) -> Result<S::Ok, S::Error> {
    one_or_many(serializer, elements.iter().map(T::render))
}

fn one_or_many<S, I>(serializer: S, items: I) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    I::Item: Serialize,
{
    let mut items = items.into_iter();
    if items.len() == 1 {
        if let Some(item) = items.next() {
            return item.serialize(serializer);
        }
    }

    serializer.collect_seq(items)
}
