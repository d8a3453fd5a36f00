// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary layouts and the schema-driven codec.
//!
//! A [`Schema`] is the composed byte layout of one concrete type:
//!
//! - struct: fields concatenated in declaration order, no padding
//! - vector: ULEB128 element count, then the elements
//! - option: one discriminant byte (0 = none, 1 = some), then the payload
//! - primitives: fixed-width little-endian
//!
//! Phantom type arguments never appear in a schema.

use crate::error::{ReifyError, Result};
use crate::primitive::{BcsReader, BcsWriter, Primitive};
use crate::type_tag::StructTag;
use crate::value::{MoveStruct, MoveValue};

/// Character set accepted by a string leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrKind {
    Utf8,
    Ascii,
}

/// Binary layout of a concrete type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Primitive(Primitive),
    /// Length-prefixed string bytes.
    Str(StrKind),
    Vector(Box<Schema>),
    Option(Box<Schema>),
    Struct(StructSchema),
}

/// Layout of a struct: its full tag plus ordered field layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSchema {
    pub tag: StructTag,
    pub fields: Vec<FieldSchema>,
}

/// One struct field in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: String,
    pub schema: Schema,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

impl Schema {
    pub fn vector(elem: Schema) -> Self {
        Self::Vector(Box::new(elem))
    }

    pub fn option(inner: Schema) -> Self {
        Self::Option(Box::new(inner))
    }

    pub fn struct_of(tag: StructTag, fields: Vec<FieldSchema>) -> Self {
        Self::Struct(StructSchema { tag, fields })
    }

    /// Smallest possible encoded size in bytes.
    pub fn min_size(&self) -> usize {
        match self {
            Self::Primitive(p) => p.size(),
            Self::Str(_) | Self::Vector(_) | Self::Option(_) => 1,
            Self::Struct(s) => s.fields.iter().map(|f| f.schema.min_size()).sum(),
        }
    }

    /// Encode a value according to this layout.
    pub fn encode(&self, value: &MoveValue) -> Result<Vec<u8>> {
        let mut writer = BcsWriter::new();
        self.encode_into(value, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decode exactly one value; trailing bytes are an error.
    pub fn decode(&self, bytes: &[u8]) -> Result<MoveValue> {
        let mut reader = BcsReader::new(bytes);
        let value = self.decode_from(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }

    fn encode_into(&self, value: &MoveValue, w: &mut BcsWriter) -> Result<()> {
        match (self, value) {
            (Self::Primitive(p), _) => encode_primitive(*p, value, w),
            (Self::Str(kind), MoveValue::String(s)) => {
                if *kind == StrKind::Ascii && !s.is_ascii() {
                    return Err(ReifyError::MalformedValue(format!(
                        "non-ASCII character in ascii string {:?}",
                        s
                    )));
                }
                w.write_bytes(s.as_bytes())
            }
            (Self::Vector(elem), MoveValue::Vector(items)) => {
                w.write_len(items.len())?;
                for item in items {
                    elem.encode_into(item, w)?;
                }
                Ok(())
            }
            (Self::Option(inner), MoveValue::Option(opt)) => match opt {
                None => {
                    w.write_u8(0);
                    Ok(())
                }
                Some(v) => {
                    w.write_u8(1);
                    inner.encode_into(v, w)
                }
            },
            (Self::Struct(layout), MoveValue::Struct(s)) => layout.encode_into(s, w),
            _ => Err(shape_error(self, value)),
        }
    }

    fn decode_from(&self, r: &mut BcsReader<'_>) -> Result<MoveValue> {
        match self {
            Self::Primitive(p) => decode_primitive(*p, r),
            Self::Str(kind) => {
                let bytes = r.read_bytes()?;
                if *kind == StrKind::Ascii && !bytes.is_ascii() {
                    return Err(ReifyError::MalformedBinary(
                        "non-ASCII byte in ascii string".into(),
                    ));
                }
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| ReifyError::MalformedBinary(format!("invalid UTF-8: {}", e)))?;
                Ok(MoveValue::String(s.to_string()))
            }
            Self::Vector(elem) => {
                let len = r.read_len()?;
                // preallocate no more than the remaining input can hold
                let cap = len.min(r.remaining() / elem.min_size().max(1));
                let mut items = Vec::with_capacity(cap);
                for _ in 0..len {
                    items.push(elem.decode_from(r)?);
                }
                Ok(MoveValue::Vector(items))
            }
            Self::Option(inner) => match r.read_u8()? {
                0 => Ok(MoveValue::Option(None)),
                1 => Ok(MoveValue::Option(Some(Box::new(inner.decode_from(r)?)))),
                b => Err(ReifyError::MalformedBinary(format!(
                    "invalid option discriminant {}",
                    b
                ))),
            },
            Self::Struct(layout) => Ok(MoveValue::Struct(layout.decode_from(r)?)),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Primitive(p) => p.name().to_string(),
            Self::Str(StrKind::Utf8) => "string".into(),
            Self::Str(StrKind::Ascii) => "ascii string".into(),
            Self::Vector(_) => "vector".into(),
            Self::Option(_) => "option".into(),
            Self::Struct(s) => s.tag.to_string(),
        }
    }
}

impl StructSchema {
    /// Encode a struct instance.
    pub fn encode(&self, value: &MoveStruct) -> Result<Vec<u8>> {
        let mut writer = BcsWriter::new();
        self.encode_into(value, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Decode exactly one struct instance; trailing bytes are an error.
    pub fn decode(&self, bytes: &[u8]) -> Result<MoveStruct> {
        let mut reader = BcsReader::new(bytes);
        let value = self.decode_from(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }

    fn decode_from(&self, r: &mut BcsReader<'_>) -> Result<MoveStruct> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            fields.push((field.name.clone(), field.schema.decode_from(r)?));
        }
        Ok(MoveStruct::from_parts(self.tag.clone(), fields))
    }

    fn encode_into(&self, value: &MoveStruct, w: &mut BcsWriter) -> Result<()> {
        if value.type_tag() != &self.tag {
            return Err(ReifyError::mismatch(
                self.tag.to_string(),
                value.type_tag().to_string(),
            ));
        }
        if value.fields().len() != self.fields.len() {
            return Err(ReifyError::MalformedValue(format!(
                "{} has {} fields, value has {}",
                self.tag,
                self.fields.len(),
                value.fields().len()
            )));
        }
        for (layout, (name, field_value)) in self.fields.iter().zip(value.fields()) {
            if &layout.name != name {
                return Err(ReifyError::MalformedValue(format!(
                    "{}: expected field {} at this position, found {}",
                    self.tag, layout.name, name
                )));
            }
            layout.schema.encode_into(field_value, w)?;
        }
        Ok(())
    }
}

fn shape_error(schema: &Schema, value: &MoveValue) -> ReifyError {
    ReifyError::MalformedValue(format!(
        "expected {}, found {}",
        schema.describe(),
        value.kind_name()
    ))
}

fn encode_primitive(p: Primitive, value: &MoveValue, w: &mut BcsWriter) -> Result<()> {
    match (p, value) {
        (Primitive::Bool, MoveValue::Bool(v)) => w.write_bool(*v),
        (Primitive::U8, MoveValue::U8(v)) => w.write_u8(*v),
        (Primitive::U16, MoveValue::U16(v)) => w.write_u16(*v),
        (Primitive::U32, MoveValue::U32(v)) => w.write_u32(*v),
        (Primitive::U64, MoveValue::U64(v)) => w.write_u64(*v),
        (Primitive::U128, MoveValue::U128(v)) => w.write_u128(*v),
        (Primitive::U256, MoveValue::U256(v)) => w.write_u256(v),
        (Primitive::Address, MoveValue::Address(v)) => w.write_address(v),
        _ => return Err(shape_error(&Schema::Primitive(p), value)),
    }
    Ok(())
}

fn decode_primitive(p: Primitive, r: &mut BcsReader<'_>) -> Result<MoveValue> {
    Ok(match p {
        Primitive::Bool => MoveValue::Bool(r.read_bool()?),
        Primitive::U8 => MoveValue::U8(r.read_u8()?),
        Primitive::U16 => MoveValue::U16(r.read_u16()?),
        Primitive::U32 => MoveValue::U32(r.read_u32()?),
        Primitive::U64 => MoveValue::U64(r.read_u64()?),
        Primitive::U128 => MoveValue::U128(r.read_u128()?),
        Primitive::U256 => MoveValue::U256(r.read_u256()?),
        Primitive::Address => MoveValue::Address(r.read_address()?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Address;

    fn point_schema() -> Schema {
        Schema::struct_of(
            StructTag::new("0x1::geo::Point", vec![]).unwrap(),
            vec![
                FieldSchema::new("x", Schema::Primitive(Primitive::U32)),
                FieldSchema::new("y", Schema::Primitive(Primitive::U32)),
            ],
        )
    }

    fn point(x: u32, y: u32) -> MoveValue {
        MoveValue::Struct(MoveStruct::from_parts(
            StructTag::new("0x1::geo::Point", vec![]).unwrap(),
            vec![("x".into(), x.into()), ("y".into(), y.into())],
        ))
    }

    #[test]
    fn test_struct_layout_is_field_order() {
        let bytes = point_schema().encode(&point(1, 2)).unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(point_schema().decode(&bytes).unwrap(), point(1, 2));
        assert_eq!(point_schema().min_size(), 8);
    }

    #[test]
    fn test_vector_and_option_layout() {
        let schema = Schema::vector(Schema::option(Schema::Primitive(Primitive::U16)));
        let value = MoveValue::Vector(vec![
            MoveValue::from(Some(0x0102u16)),
            MoveValue::Option(None),
        ]);
        let bytes = schema.encode(&value).unwrap();
        assert_eq!(bytes, vec![2, 1, 0x02, 0x01, 0]);
        assert_eq!(schema.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_strings() {
        let schema = Schema::Str(StrKind::Utf8);
        let bytes = schema.encode(&MoveValue::from("héllo")).unwrap();
        assert_eq!(bytes[0], 6);
        assert_eq!(schema.decode(&bytes).unwrap(), MoveValue::from("héllo"));

        let ascii = Schema::Str(StrKind::Ascii);
        assert!(ascii.encode(&MoveValue::from("héllo")).is_err());
        assert!(ascii.decode(&bytes).is_err());
        assert!(schema.decode(&[2, 0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_wide_integers_and_address() {
        let schema = Schema::struct_of(
            StructTag::new("0x1::w::W", vec![]).unwrap(),
            vec![
                FieldSchema::new("a", Schema::Primitive(Primitive::Address)),
                FieldSchema::new("b", Schema::Primitive(Primitive::U128)),
            ],
        );
        let value = MoveValue::Struct(MoveStruct::from_parts(
            StructTag::new("0x1::w::W", vec![]).unwrap(),
            vec![
                ("a".into(), Address::from_u8(1).into()),
                ("b".into(), 1u128.into()),
            ],
        ));
        let bytes = schema.encode(&value).unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(bytes[31], 1);
        assert_eq!(bytes[32], 1);
        assert_eq!(schema.decode(&bytes).unwrap(), value);
    }

    #[test]
    fn test_decode_errors() {
        let schema = point_schema();
        assert!(matches!(
            schema.decode(&[1, 0, 0, 0, 2]),
            Err(ReifyError::MalformedBinary(_))
        ));
        assert!(matches!(
            schema.decode(&[1, 0, 0, 0, 2, 0, 0, 0, 9]),
            Err(ReifyError::MalformedBinary(_))
        ));

        // count claims 3 elements, only 2 present
        let vec_schema = Schema::vector(Schema::Primitive(Primitive::U8));
        assert!(matches!(
            vec_schema.decode(&[3, 1, 2]),
            Err(ReifyError::MalformedBinary(_))
        ));
        // huge count with tiny buffer must fail, not allocate
        assert!(vec_schema.decode(&[0xff, 0xff, 0xff, 0xff, 0x0f]).is_err());

        let opt = Schema::option(Schema::Primitive(Primitive::U8));
        assert!(opt.decode(&[2, 0]).is_err());
    }

    #[test]
    fn test_encode_shape_errors() {
        let schema = point_schema();
        assert!(matches!(
            schema.encode(&MoveValue::U8(1)),
            Err(ReifyError::MalformedValue(_))
        ));

        let other = MoveValue::Struct(MoveStruct::from_parts(
            StructTag::new("0x1::geo::Other", vec![]).unwrap(),
            vec![("x".into(), 1u32.into()), ("y".into(), 2u32.into())],
        ));
        assert!(matches!(
            schema.encode(&other),
            Err(ReifyError::TypeMismatch { .. })
        ));

        let swapped = MoveValue::Struct(MoveStruct::from_parts(
            StructTag::new("0x1::geo::Point", vec![]).unwrap(),
            vec![("y".into(), 1u32.into()), ("x".into(), 2u32.into())],
        ));
        assert!(schema.encode(&swapped).is_err());
    }
}
