//! Canonical argument encoding
//!
//! Every serialized value becomes a tagged `serde_json::Value` node of the form
//! `[tag, payload..]`. Values that plain JSON would merge stay distinct: floats
//! keep their exact bits (so `inf`, `-inf` and `NaN` differ), and `None`,
//! `Some(())` and `()` all get their own tag. Map and struct entries are sorted
//! by their encoded key, so iteration order never changes the encoding.

use serde::ser::{self, Serialize};
use serde_json::{json, Error, Value};

/// Encodes `value` into its canonical tagged form.
pub(crate) fn to_canonical<T>(value: &T) -> Result<Value, Error>
where
    T: Serialize + ?Sized,
{
    value.serialize(Canonical)
}

struct Canonical;

fn integer(n: impl ToString) -> Value {
    json!(["int", n.to_string()])
}

fn float(n: f64) -> Value {
    json!(["float", format!("{:016x}", n.to_bits())])
}

fn variant_node(name: &str, payload: Option<Value>) -> Value {
    match payload {
        Some(payload) => json!(["variant", name, payload]),
        None => json!(["variant", name]),
    }
}

impl ser::Serializer for Canonical {
    type Ok = Value;
    type Error = Error;
    type SerializeSeq = SeqNode;
    type SerializeTuple = SeqNode;
    type SerializeTupleStruct = SeqNode;
    type SerializeTupleVariant = SeqNode;
    type SerializeMap = MapNode;
    type SerializeStruct = MapNode;
    type SerializeStructVariant = MapNode;

    fn serialize_bool(self, v: bool) -> Result<Value, Error> {
        Ok(json!(["bool", v]))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, Error> {
        Ok(integer(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, Error> {
        Ok(float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, Error> {
        Ok(float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, Error> {
        Ok(json!(["str", v.to_string()]))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Error> {
        Ok(json!(["str", v]))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, Error> {
        Ok(json!(["bytes", hex::encode(v)]))
    }

    fn serialize_none(self) -> Result<Value, Error> {
        Ok(json!(["none"]))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, Error>
    where
        T: Serialize + ?Sized,
    {
        let inner = value.serialize(Canonical)?;
        Ok(json!(["some", inner]))
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Ok(json!(["unit"]))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> {
        Ok(json!(["unit"]))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(variant_node(variant, None))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value, Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error>
    where
        T: Serialize + ?Sized,
    {
        let inner = value.serialize(Canonical)?;
        Ok(variant_node(variant, Some(inner)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqNode, Error> {
        Ok(SeqNode::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqNode, Error> {
        Ok(SeqNode::new(None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqNode, Error> {
        Ok(SeqNode::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqNode, Error> {
        Ok(SeqNode::new(Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapNode, Error> {
        Ok(MapNode::new(None, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapNode, Error> {
        Ok(MapNode::new(None, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<MapNode, Error> {
        Ok(MapNode::new(Some(variant), len))
    }
}

// == Sequences ==
struct SeqNode {
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl SeqNode {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        Self {
            variant,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.items.push(value.serialize(Canonical)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let node = json!(["seq", Value::Array(self.items)]);
        match self.variant {
            Some(name) => variant_node(name, Some(node)),
            None => node,
        }
    }
}

impl ser::SerializeSeq for SeqNode {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqNode {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqNode {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqNode {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(self.finish())
    }
}

// == Maps and Structs ==
struct MapNode {
    variant: Option<&'static str>,
    /// (sort key, encoded key, encoded value)
    entries: Vec<(String, Value, Value)>,
    pending_key: Option<Value>,
}

impl MapNode {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        Self {
            variant,
            entries: Vec::with_capacity(len),
            pending_key: None,
        }
    }

    fn insert(&mut self, key: Value, value: Value) {
        self.entries.push((key.to_string(), key, value));
    }

    fn field<T>(&mut self, name: &'static str, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let value = value.serialize(Canonical)?;
        self.insert(json!(["str", name]), value);
        Ok(())
    }

    fn finish(mut self) -> Value {
        self.entries.sort_by(|a, b| a.0.cmp(&b.0));
        let pairs = self
            .entries
            .into_iter()
            .map(|(_, key, value)| Value::Array(vec![key, value]))
            .collect();
        let node = json!(["map", Value::Array(pairs)]);
        match self.variant {
            Some(name) => variant_node(name, Some(node)),
            None => node,
        }
    }
}

impl ser::SerializeMap for MapNode {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.pending_key = Some(key.serialize(Canonical)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| <Error as ser::Error>::custom("map value without a key"))?;
        let value = value.serialize(Canonical)?;
        self.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for MapNode {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for MapNode {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(self.finish())
    }
}
