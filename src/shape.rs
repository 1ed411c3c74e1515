//! Shape guard and field discovery through a custom serde `Serializer`.
//!
//! Serializing the target is the only reflection available: the top level must
//! arrive as `serialize_struct`, and each field is probed with a second
//! serializer that accepts strings (and newtypes around them) and reports the
//! kind of anything else.

use serde::ser::{self, Serialize};

use crate::error::{ShapeError, TagfigError};

/// One serialized field, in declaration order. `Err` carries the kind name of
/// a field that is not a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordField {
    pub name: &'static str,
    pub value: Result<String, &'static str>,
}

/// Precondition for every operation: `value` must be a struct.
///
/// Rejects `None` (the absent reference), plain scalars and strings,
/// sequences, maps, tuple and unit structs, and enum variants. Field kinds are
/// not checked here; see [`describe`](crate::describe).
pub fn check_shape<T: Serialize + ?Sized>(value: &T) -> Result<(), TagfigError> {
    inspect(value)?;
    Ok(())
}

pub(crate) fn inspect<T: Serialize + ?Sized>(value: &T) -> Result<Vec<RecordField>, ShapeError> {
    let mut out = Vec::new();
    value.serialize(RecordSerializer { out: &mut out })?;
    Ok(out)
}

impl ser::Error for ShapeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ShapeError::Custom(msg.to_string())
    }
}

struct RecordSerializer<'a> {
    out: &'a mut Vec<RecordField>,
}

type Reject = ser::Impossible<(), ShapeError>;

impl<'a> ser::Serializer for RecordSerializer<'a> {
    type Ok = ();
    type Error = ShapeError;
    type SerializeSeq = Reject;
    type SerializeTuple = Reject;
    type SerializeTupleStruct = Reject;
    type SerializeTupleVariant = Reject;
    type SerializeMap = Reject;
    type SerializeStruct = RecordFields<'a>;
    type SerializeStructVariant = Reject;

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.out.reserve(len);
        Ok(RecordFields { out: self.out })
    }

    fn serialize_bool(self, _v: bool) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_i8(self, _v: i8) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_i16(self, _v: i16) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_i32(self, _v: i32) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_i64(self, _v: i64) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_u8(self, _v: u8) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_u16(self, _v: u16) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_u32(self, _v: u32) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_u64(self, _v: u64) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_f32(self, _v: f32) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_f64(self, _v: f64) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_char(self, _v: char) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_str(self, _v: &str) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_none(self) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_unit(self) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(ShapeError::NotAStruct)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(ShapeError::NotAStruct)
    }
}

// --- SerializeStruct ---

struct RecordFields<'a> {
    out: &'a mut Vec<RecordField>,
}

impl<'a> ser::SerializeStruct for RecordFields<'a> {
    type Ok = ();
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        let value = match value.serialize(FieldSerializer) {
            Ok(s) => Ok(s),
            Err(FieldError::Kind(kind)) => Err(kind),
            Err(FieldError::Custom(msg)) => return Err(ShapeError::Custom(msg)),
        };
        self.out.push(RecordField { name: key, value });
        Ok(())
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// --- Field serializer (accepts strings, names every other kind) ---

#[derive(Debug)]
enum FieldError {
    Kind(&'static str),
    Custom(String),
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Kind(kind) => write!(f, "unsupported field kind: {kind}"),
            FieldError::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for FieldError {}

impl ser::Error for FieldError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        FieldError::Custom(msg.to_string())
    }
}

struct FieldSerializer;

type NotString = ser::Impossible<String, FieldError>;

impl ser::Serializer for FieldSerializer {
    type Ok = String;
    type Error = FieldError;
    type SerializeSeq = NotString;
    type SerializeTuple = NotString;
    type SerializeTupleStruct = NotString;
    type SerializeTupleVariant = NotString;
    type SerializeMap = NotString;
    type SerializeStruct = NotString;
    type SerializeStructVariant = NotString;

    fn serialize_str(self, v: &str) -> Result<String, Self::Error> {
        Ok(v.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, Self::Error> {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<String, Self::Error> {
        Err(FieldError::Kind("bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_i16(self, _v: i16) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_i32(self, _v: i32) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_i64(self, _v: i64) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_i128(self, _v: i128) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_u8(self, _v: u8) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_u16(self, _v: u16) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_u32(self, _v: u32) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_u64(self, _v: u64) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_u128(self, _v: u128) -> Result<String, Self::Error> {
        Err(FieldError::Kind("integer"))
    }

    fn serialize_f32(self, _v: f32) -> Result<String, Self::Error> {
        Err(FieldError::Kind("float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String, Self::Error> {
        Err(FieldError::Kind("float"))
    }

    fn serialize_char(self, _v: char) -> Result<String, Self::Error> {
        Err(FieldError::Kind("char"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, Self::Error> {
        Err(FieldError::Kind("bytes"))
    }

    // Option is rejected whether or not it holds a value, so the outcome does
    // not depend on the field's current contents.
    fn serialize_none(self) -> Result<String, Self::Error> {
        Err(FieldError::Kind("option"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<String, Self::Error> {
        Err(FieldError::Kind("option"))
    }

    fn serialize_unit(self) -> Result<String, Self::Error> {
        Err(FieldError::Kind("unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, Self::Error> {
        Err(FieldError::Kind("unit"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<String, Self::Error> {
        Err(FieldError::Kind("enum"))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, Self::Error> {
        Err(FieldError::Kind("enum"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(FieldError::Kind("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(FieldError::Kind("sequence"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(FieldError::Kind("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(FieldError::Kind("enum"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(FieldError::Kind("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(FieldError::Kind("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(FieldError::Kind("enum"))
    }
}
