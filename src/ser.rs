//! Lowering of `Serialize` values into the [`FormValue`] tree.
//!
//! [`ValueSerializer`] is the encoder's view of runtime types: serde tells it
//! whether a value is a scalar, a struct, a map, a sequence or an enum, and
//! the serializer records that shape. Indirection disappears on the way:
//!
//! - `Option::None` becomes [`FormValue::Null`], which the encoder skips
//! - `Some(x)`, `Box<T>`, `&T`, `Rc<T>` and newtype structs serialize as the inner value
//! - unit variants become their variant name, as serde_json does
//! - tuples and tuple structs become sequences
//!
//! ## Usage
//!
//! ```rust
//! use serde_multipart::{to_value, FormValue, Number};
//!
//! let value = to_value(&Some(Box::new(69u8))).unwrap();
//! assert_eq!(value, FormValue::Number(Number::U64(69)));
//!
//! let value = to_value(&Option::<i32>::None).unwrap();
//! assert!(value.is_null());
//! ```

use crate::file::{CapturedFile, FILE_TOKEN};
use crate::value::VariantKind;
use crate::{Error, FormValue, Number, Result};
use serde::{ser, Serialize};

/// Serializer producing a [`FormValue`].
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<FormValue>,
}

pub struct SerializeTupleVariant {
    name: &'static str,
    index: u32,
    variant: &'static str,
    vec: Vec<FormValue>,
}

pub struct SerializeMap {
    entries: Vec<(FormValue, FormValue)>,
    current_key: Option<FormValue>,
}

pub struct SerializeStruct {
    name: &'static str,
    fields: Vec<(&'static str, FormValue)>,
}

pub struct SerializeStructVariant {
    name: &'static str,
    index: u32,
    variant: &'static str,
    fields: Vec<(&'static str, FormValue)>,
}

impl ser::Serializer for ValueSerializer {
    type Ok = FormValue;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<FormValue> {
        Ok(FormValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<FormValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<FormValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<FormValue> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<FormValue> {
        Ok(FormValue::Number(Number::I64(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<FormValue> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<FormValue> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<FormValue> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<FormValue> {
        Ok(FormValue::Number(Number::U64(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<FormValue> {
        Ok(FormValue::Number(Number::F32(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<FormValue> {
        Ok(FormValue::Number(Number::F64(v)))
    }

    fn serialize_char(self, v: char) -> Result<FormValue> {
        Ok(FormValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<FormValue> {
        Ok(FormValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<FormValue> {
        Ok(FormValue::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<FormValue> {
        Ok(FormValue::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<FormValue>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<FormValue> {
        Ok(FormValue::Unit)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<FormValue> {
        Ok(FormValue::Unit)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<FormValue> {
        Ok(FormValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<FormValue>
    where
        T: ?Sized + Serialize,
    {
        if name == FILE_TOKEN {
            let payload = value.serialize(ValueSerializer)?;
            return CapturedFile::from_payload(payload).map(FormValue::File);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<FormValue>
    where
        T: ?Sized + Serialize,
    {
        Ok(FormValue::Variant {
            name,
            index: variant_index,
            variant,
            kind: VariantKind::Newtype,
            value: Box::new(to_form_value(value)?),
        })
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            name,
            index: variant_index,
            variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            name,
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            name,
            index: variant_index,
            variant,
            fields: Vec::with_capacity(len),
        })
    }
}

impl SerializeVec {
    fn new(capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_form_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<FormValue> {
        Ok(FormValue::Seq(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<FormValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<FormValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_form_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<FormValue> {
        Ok(FormValue::Variant {
            name: self.name,
            index: self.index,
            variant: self.variant,
            kind: VariantKind::Tuple,
            value: Box::new(FormValue::Seq(self.vec)),
        })
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        // Key categories are checked by the encoder, not here, so that a
        // mapping nested inside a JSON-encoded field keeps its integer keys.
        self.current_key = Some(to_form_value(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.push((key, to_form_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<FormValue> {
        Ok(FormValue::Map(self.entries))
    }
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push((key, to_form_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<FormValue> {
        Ok(FormValue::Struct {
            name: self.name,
            fields: self.fields,
        })
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = FormValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields.push((key, to_form_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<FormValue> {
        Ok(FormValue::Variant {
            name: self.name,
            index: self.index,
            variant: self.variant,
            kind: VariantKind::Struct,
            value: Box::new(FormValue::Struct {
                name: self.variant,
                fields: self.fields,
            }),
        })
    }
}

fn to_form_value<T: Serialize + ?Sized>(value: &T) -> Result<FormValue> {
    value.serialize(ValueSerializer)
}
