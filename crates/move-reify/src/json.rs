// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Plain JSON encoding.
//!
//! | Type                         | JSON form                          |
//! |------------------------------|------------------------------------|
//! | `bool`                       | `true` / `false`                   |
//! | `u8`, `u16`, `u32`           | number                             |
//! | `u64`, `u128`, `u256`        | decimal string                     |
//! | `address`, `ID`, `UID`       | `0x` + 64 lowercase hex digits     |
//! | `String`, ascii `String`, `Url` | string                          |
//! | `vector<T>`                  | array                              |
//! | `Option<T>`                  | `null` or the inner form           |
//! | struct                       | object with one key per field      |
//!
//! Decoding is lenient where it is lossless: integers of any width accept
//! either a number or a decimal string, `vector<u8>` also accepts a
//! `0x`-prefixed hex string, and `UID` accepts `{ "id": "0x…" }`.
//!
//! A top-level envelope adds `$typeName` (bare name) and, for generic
//! types, `$typeArgs` (canonical argument tags).

use crate::error::{ReifyError, Result};
use crate::primitive::{Address, Primitive, U256};
use crate::reified::{Builtin, BuiltinReified, Reified, StructReified};
use crate::type_tag::{canonical_struct_name, canonicalize, compose_type_name};
use crate::value::{MoveStruct, MoveValue};
use serde_json::{Map, Value};

/// Envelope key holding the bare type name.
pub const TYPE_NAME_KEY: &str = "$typeName";
/// Envelope key holding the type argument tags.
pub const TYPE_ARGS_KEY: &str = "$typeArgs";

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

pub(crate) fn decode_field(r: &Reified, v: &Value) -> Result<MoveValue> {
    match r {
        Reified::Primitive(p) => decode_primitive(*p, v),
        Reified::Vector(elem) => decode_vector(elem, v),
        Reified::Builtin(b) => decode_builtin(b, v),
        Reified::Struct(s) => Ok(MoveValue::Struct(decode_struct_fields(s, v)?)),
    }
}

pub(crate) fn decode_primitive(p: Primitive, v: &Value) -> Result<MoveValue> {
    let bad = || {
        ReifyError::MalformedValue(format!("expected {} JSON value, found {}", p, v))
    };
    Ok(match p {
        Primitive::Bool => MoveValue::Bool(v.as_bool().ok_or_else(bad)?),
        Primitive::U8 => MoveValue::U8(unsigned(v).and_then(|n| n.try_into().ok()).ok_or_else(bad)?),
        Primitive::U16 => {
            MoveValue::U16(unsigned(v).and_then(|n| n.try_into().ok()).ok_or_else(bad)?)
        }
        Primitive::U32 => {
            MoveValue::U32(unsigned(v).and_then(|n| n.try_into().ok()).ok_or_else(bad)?)
        }
        Primitive::U64 => {
            MoveValue::U64(unsigned(v).and_then(|n| n.try_into().ok()).ok_or_else(bad)?)
        }
        Primitive::U128 => MoveValue::U128(unsigned(v).ok_or_else(bad)?),
        Primitive::U256 => MoveValue::U256(match v {
            Value::String(s) => s.parse::<U256>()?,
            Value::Number(n) => U256::from(n.as_u64().ok_or_else(bad)?),
            _ => return Err(bad()),
        }),
        Primitive::Address => MoveValue::Address(parse_address(v).ok_or_else(bad)??),
    })
}

/// Non-negative integer from a JSON number or a decimal string.
fn unsigned(v: &Value) -> Option<u128> {
    match v {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

fn parse_address(v: &Value) -> Option<Result<Address>> {
    v.as_str().map(str::parse)
}

fn decode_vector(elem: &Reified, v: &Value) -> Result<MoveValue> {
    match v {
        Value::Array(items) => Ok(MoveValue::Vector(
            items
                .iter()
                .map(|item| elem.from_json_field(item))
                .collect::<Result<_>>()?,
        )),
        Value::String(s) if *elem == Reified::Primitive(Primitive::U8) => {
            let digits = s.strip_prefix("0x").ok_or_else(|| {
                ReifyError::MalformedValue(format!("expected 0x-prefixed hex bytes, found {:?}", s))
            })?;
            let bytes = hex::decode(digits)
                .map_err(|e| ReifyError::MalformedValue(format!("invalid hex bytes: {}", e)))?;
            Ok(MoveValue::Vector(bytes.into_iter().map(MoveValue::U8).collect()))
        }
        _ => Err(ReifyError::MalformedValue(format!(
            "expected JSON array for vector<{}>, found {}",
            elem, v
        ))),
    }
}

fn decode_builtin(b: &BuiltinReified, v: &Value) -> Result<MoveValue> {
    let bad = || {
        ReifyError::MalformedValue(format!("expected {} JSON value, found {}", b.type_tag(), v))
    };
    match b.kind() {
        Builtin::Utf8String => Ok(MoveValue::String(v.as_str().ok_or_else(bad)?.to_string())),
        Builtin::AsciiString | Builtin::Url => match v.as_str() {
            Some(s) if s.is_ascii() => Ok(MoveValue::String(s.to_string())),
            _ => Err(bad()),
        },
        Builtin::Id => Ok(MoveValue::Address(parse_address(v).ok_or_else(bad)??)),
        Builtin::Uid => {
            let inner = v.get("id").unwrap_or(v);
            Ok(MoveValue::Address(parse_address(inner).ok_or_else(bad)??))
        }
        Builtin::Option(inner) => match v {
            Value::Null => Ok(MoveValue::Option(None)),
            other => Ok(MoveValue::Option(Some(Box::new(inner.from_json_field(other)?)))),
        },
    }
}

pub(crate) fn is_option(r: &Reified) -> bool {
    matches!(r, Reified::Builtin(b) if matches!(b.kind(), Builtin::Option(_)))
}

pub(crate) fn decode_struct_fields(s: &StructReified, v: &Value) -> Result<MoveStruct> {
    let obj = v.as_object().ok_or_else(|| {
        ReifyError::MalformedValue(format!(
            "expected JSON object for {}, found {}",
            s.type_tag(),
            v
        ))
    })?;
    let mut fields = Vec::with_capacity(s.fields().len());
    for (name, r) in s.fields() {
        let value = match obj.get(name) {
            Some(field) => r.from_json_field(field)?,
            None if is_option(r) => MoveValue::Option(None),
            None => {
                return Err(ReifyError::MalformedValue(format!(
                    "{}: missing field {}",
                    s.type_tag(),
                    name
                )))
            }
        };
        fields.push((name.clone(), value));
    }
    Ok(MoveStruct::from_parts(s.type_tag().clone(), fields))
}

/// Check `$typeName` / `$typeArgs` against the descriptor, then decode fields.
pub(crate) fn decode_envelope(s: &StructReified, v: &Value) -> Result<MoveStruct> {
    let (name, args) = read_envelope(v)?;
    let expected_args = s.type_tag().type_arg_strings();
    let found_name = canonical_struct_name(&name)
        .map_err(|_| ReifyError::mismatch(s.type_name(), name.clone()))?;
    if found_name != s.type_name() || args != expected_args {
        return Err(ReifyError::mismatch(
            s.full_type_name(),
            compose_type_name(&name, &args),
        ));
    }
    decode_struct_fields(s, v)
}

/// Bare name and canonical argument tags of a JSON envelope.
pub(crate) fn read_envelope(v: &Value) -> Result<(String, Vec<String>)> {
    let name = v
        .get(TYPE_NAME_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ReifyError::MalformedValue(format!("missing string {} in JSON envelope", TYPE_NAME_KEY))
        })?;
    let args = match v.get(TYPE_ARGS_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item.as_str() {
                Some(tag) => canonicalize(tag),
                None => Err(ReifyError::MalformedValue(format!(
                    "{} entries must be strings, found {}",
                    TYPE_ARGS_KEY, item
                ))),
            })
            .collect::<Result<_>>()?,
        Some(other) => {
            return Err(ReifyError::MalformedValue(format!(
                "{} must be an array, found {}",
                TYPE_ARGS_KEY, other
            )))
        }
    };
    Ok((name.to_string(), args))
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

pub(crate) fn encode_field(r: &Reified, value: &MoveValue) -> Result<Value> {
    match (r, value) {
        (Reified::Primitive(p), v) => encode_primitive(*p, v).ok_or_else(|| r.shape_error(v)),
        (Reified::Vector(elem), MoveValue::Vector(items)) => Ok(Value::Array(
            items
                .iter()
                .map(|item| elem.to_json_field(item))
                .collect::<Result<_>>()?,
        )),
        (Reified::Builtin(b), v) => match (b.kind(), v) {
            (Builtin::Utf8String, MoveValue::String(s)) => Ok(Value::String(s.clone())),
            (Builtin::AsciiString | Builtin::Url, MoveValue::String(s)) if s.is_ascii() => {
                Ok(Value::String(s.clone()))
            }
            (Builtin::Id | Builtin::Uid, MoveValue::Address(a)) => {
                Ok(Value::String(a.to_hex_literal()))
            }
            (Builtin::Option(inner), MoveValue::Option(opt)) => match opt {
                Some(v) => inner.to_json_field(v),
                None => Ok(Value::Null),
            },
            _ => Err(r.shape_error(v)),
        },
        (Reified::Struct(s), MoveValue::Struct(v)) => encode_struct_fields(s, v),
        _ => Err(r.shape_error(value)),
    }
}

fn encode_primitive(p: Primitive, value: &MoveValue) -> Option<Value> {
    Some(match (p, value) {
        (Primitive::Bool, MoveValue::Bool(v)) => Value::Bool(*v),
        (Primitive::U8, MoveValue::U8(v)) => Value::from(*v),
        (Primitive::U16, MoveValue::U16(v)) => Value::from(*v),
        (Primitive::U32, MoveValue::U32(v)) => Value::from(*v),
        (Primitive::U64, MoveValue::U64(v)) => Value::String(v.to_string()),
        (Primitive::U128, MoveValue::U128(v)) => Value::String(v.to_string()),
        (Primitive::U256, MoveValue::U256(v)) => Value::String(v.to_string()),
        (Primitive::Address, MoveValue::Address(v)) => Value::String(v.to_hex_literal()),
        _ => return None,
    })
}

pub(crate) fn encode_struct_fields(s: &StructReified, value: &MoveStruct) -> Result<Value> {
    Ok(Value::Object(encode_field_map(s, value)?))
}

fn encode_field_map(s: &StructReified, value: &MoveStruct) -> Result<Map<String, Value>> {
    if value.type_tag() != s.type_tag() {
        return Err(ReifyError::mismatch(
            s.full_type_name(),
            value.type_tag().to_string(),
        ));
    }
    let mut map = Map::new();
    for (name, r) in s.fields() {
        let field = value.field(name).ok_or_else(|| {
            ReifyError::MalformedValue(format!("{}: missing field {}", s.type_tag(), name))
        })?;
        map.insert(name.clone(), r.to_json_field(field)?);
    }
    Ok(map)
}

pub(crate) fn encode_envelope(s: &StructReified, value: &MoveStruct) -> Result<Value> {
    let mut map = encode_field_map(s, value)?;
    map.insert(TYPE_NAME_KEY.into(), Value::String(s.type_name().to_string()));
    let args = s.type_tag().type_arg_strings();
    if !args.is_empty() {
        map.insert(
            TYPE_ARGS_KEY.into(),
            Value::Array(args.into_iter().map(Value::String).collect()),
        );
    }
    Ok(Value::Object(map))
}
