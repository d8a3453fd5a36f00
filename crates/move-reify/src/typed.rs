// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed-fields trees.
//!
//! RPC sources return object contents with a type string at every struct
//! level:
//!
//! ```json
//! { "type": "0x2::coin::Coin<0x2::sui::SUI>",
//!   "fields": { "id": { "id": "0x5" }, "balance": "100" } }
//! ```
//!
//! [`TypedNode::from_json`] validates the shape of the whole tree up front.
//! Decoding a struct node compares its declared tag with the descriptor
//! before any field is touched.
//!
//! Two framework shapes are flattened by RPC and accepted as such: a
//! `Balance<T>` may be its bare amount, and an `Option<T>` may be either
//! `{ type: Option<T>, fields: { vec: [..] } }`, null, or the inner value
//! itself (including a typed struct node of `T`).

use crate::error::{ReifyError, Result};
use crate::framework;
use crate::json::{self, is_option};
use crate::loader::is_instance_of;
use crate::primitive::Primitive;
use crate::reified::{Builtin, BuiltinReified, Reified, StructReified};
use crate::type_tag::TypeTag;
use crate::value::{MoveStruct, MoveValue};
use serde_json::Value;
use std::collections::BTreeMap;

const TYPE_KEY: &str = "type";
const FIELDS_KEY: &str = "fields";

/// One node of a typed-fields tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedNode {
    Null,
    /// Boolean, number or string.
    Leaf(Value),
    Vector(Vec<TypedNode>),
    /// A struct with its declared type tag.
    Struct {
        type_tag: String,
        fields: BTreeMap<String, TypedNode>,
    },
    /// An object without a declared type (`{ "id": "0x…" }`).
    Object(BTreeMap<String, TypedNode>),
}

impl TypedNode {
    /// Convert a JSON tree, rejecting unrecognized shapes.
    ///
    /// An object with both `type` and `fields` is a struct node; extra keys
    /// next to them (`dataType`, `hasPublicTransfer`) are ignored.
    pub fn from_json(v: &Value) -> Result<Self> {
        Ok(match v {
            Value::Null => Self::Null,
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Self::Leaf(v.clone()),
            Value::Array(items) => {
                Self::Vector(items.iter().map(Self::from_json).collect::<Result<_>>()?)
            }
            Value::Object(map) => match (map.get(TYPE_KEY), map.get(FIELDS_KEY)) {
                (Some(Value::String(tag)), Some(Value::Object(fields))) => Self::Struct {
                    type_tag: tag.clone(),
                    fields: convert_map(fields)?,
                },
                (_, Some(_)) => {
                    return Err(ReifyError::MalformedValue(format!(
                        "typed struct node needs a string {:?} and an object {:?}",
                        TYPE_KEY, FIELDS_KEY
                    )))
                }
                _ => Self::Object(convert_map(map)?),
            },
        })
    }

    /// Declared tag of a struct node.
    pub fn type_tag(&self) -> Option<&str> {
        match self {
            Self::Struct { type_tag, .. } => Some(type_tag),
            _ => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&TypedNode> {
        match self {
            Self::Struct { fields, .. } | Self::Object(fields) => fields.get(name),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Leaf(_) => "leaf",
            Self::Vector(_) => "vector",
            Self::Struct { .. } => "struct",
            Self::Object(_) => "object",
        }
    }
}

fn convert_map(map: &serde_json::Map<String, Value>) -> Result<BTreeMap<String, TypedNode>> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), TypedNode::from_json(v)?)))
        .collect()
}

fn unexpected(r: &Reified, node: &TypedNode) -> ReifyError {
    ReifyError::MalformedValue(format!(
        "expected {}, found typed {} node",
        r,
        node.kind_name()
    ))
}

pub(crate) fn decode_node(r: &Reified, node: &TypedNode) -> Result<MoveValue> {
    match (r, node) {
        (Reified::Primitive(p), TypedNode::Leaf(v)) => json::decode_primitive(*p, v),
        (Reified::Vector(elem), TypedNode::Vector(items)) => Ok(MoveValue::Vector(
            items
                .iter()
                .map(|item| elem.from_typed_field(item))
                .collect::<Result<_>>()?,
        )),
        // byte vectors may arrive in their compact string form
        (Reified::Vector(elem), TypedNode::Leaf(v @ Value::String(_)))
            if **elem == Reified::Primitive(Primitive::U8) =>
        {
            r.from_json_field(v)
        }
        (Reified::Builtin(b), _) => decode_builtin(r, b, node),
        (Reified::Struct(s), TypedNode::Leaf(v)) if s.type_name() == framework::BALANCE => {
            Ok(MoveValue::Struct(decode_balance_amount(s, v)?))
        }
        (Reified::Struct(s), _) => Ok(MoveValue::Struct(decode_struct(s, node)?)),
        _ => Err(unexpected(r, node)),
    }
}

fn decode_builtin(r: &Reified, b: &BuiltinReified, node: &TypedNode) -> Result<MoveValue> {
    match (b.kind(), node) {
        (Builtin::Option(_), TypedNode::Null) => Ok(MoveValue::Option(None)),
        // `{ type: Option<T>, fields: { vec: [..] } }`
        (Builtin::Option(inner), TypedNode::Struct { type_tag, fields })
            if is_instance_of(type_tag, framework::OPTION) =>
        {
            check_tag(&r.type_tag(), type_tag)?;
            match fields.get("vec") {
                Some(TypedNode::Vector(items)) if items.is_empty() => Ok(MoveValue::Option(None)),
                Some(TypedNode::Vector(items)) if items.len() == 1 => Ok(MoveValue::Option(Some(
                    Box::new(inner.from_typed_field(&items[0])?),
                ))),
                _ => Err(ReifyError::MalformedValue(format!(
                    "{}: expected vec of at most one element",
                    type_tag
                ))),
            }
        }
        (Builtin::Option(inner), other) => Ok(MoveValue::Option(Some(Box::new(
            inner.from_typed_field(other)?,
        )))),
        (Builtin::Uid, TypedNode::Object(fields) | TypedNode::Struct { fields, .. }) => {
            match fields.get("id") {
                Some(TypedNode::Leaf(v)) => r.from_json_field(v),
                Some(nested @ TypedNode::Struct { .. }) => {
                    // `{ id: { type: ID, fields: { id: "0x…" } } }` style
                    match nested.field("id").or_else(|| nested.field("bytes")) {
                        Some(TypedNode::Leaf(v)) => r.from_json_field(v),
                        _ => Err(unexpected(r, node)),
                    }
                }
                _ => Err(unexpected(r, node)),
            }
        }
        (_, TypedNode::Leaf(v)) => r.from_json_field(v),
        _ => Err(unexpected(r, node)),
    }
}

/// `Balance<T>` flattened to its amount (`"balance": "1000"`).
fn decode_balance_amount(s: &StructReified, v: &Value) -> Result<MoveStruct> {
    match s.fields() {
        [(name, Reified::Primitive(Primitive::U64))] => Ok(MoveStruct::from_parts(
            s.type_tag().clone(),
            vec![(name.clone(), json::decode_primitive(Primitive::U64, v)?)],
        )),
        _ => Err(ReifyError::MalformedValue(format!(
            "expected typed struct node for {}, found leaf node",
            s.type_tag()
        ))),
    }
}

fn check_tag(expected: &TypeTag, found: &str) -> Result<()> {
    let parsed: TypeTag = found
        .parse()
        .map_err(|_| ReifyError::mismatch(expected.to_string(), found))?;
    if &parsed != expected {
        return Err(ReifyError::mismatch(expected.to_string(), found));
    }
    Ok(())
}

/// Decode a struct node after checking its declared type.
pub(crate) fn decode_struct(s: &StructReified, node: &TypedNode) -> Result<MoveStruct> {
    let (type_tag, fields) = match node {
        TypedNode::Struct { type_tag, fields } => (type_tag, fields),
        other => {
            return Err(ReifyError::MalformedValue(format!(
                "expected typed struct node for {}, found {} node",
                s.type_tag(),
                other.kind_name()
            )))
        }
    };
    check_tag(&TypeTag::Struct(s.type_tag().clone()), type_tag)?;

    let mut decoded = Vec::with_capacity(s.fields().len());
    for (name, r) in s.fields() {
        let value = match fields.get(name) {
            Some(field) => r.from_typed_field(field)?,
            None if is_option(r) => MoveValue::Option(None),
            None => {
                return Err(ReifyError::MalformedValue(format!(
                    "{}: missing field {}",
                    s.type_tag(),
                    name
                )))
            }
        };
        decoded.push((name.clone(), value));
    }
    Ok(MoveStruct::from_parts(s.type_tag().clone(), decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Address;
    use crate::reified::{FieldType, StructDef, TypeArg};
    use crate::type_tag::StructTag;
    use serde_json::json;
    use std::sync::Arc;

    fn pair() -> Arc<StructReified> {
        StructDef::builder("0x3::pair::Pair")
            .type_param("A")
            .phantom_param("P")
            .field("first", FieldType::Param(0))
            .field("items", FieldType::vector(Primitive::U64.into()))
            .build()
            .unwrap()
            .reified(vec![
                Primitive::U8.into(),
                TypeArg::phantom("0x2::sui::SUI").unwrap(),
            ])
            .unwrap()
    }

    #[test]
    fn test_node_shapes() {
        let node = TypedNode::from_json(&json!({
            "dataType": "moveObject",
            "type": "0x3::pair::Pair<u8, 0x2::sui::SUI>",
            "fields": { "first": 1, "items": ["2", "3"], "extra": { "id": "0x1" } }
        }))
        .unwrap();
        assert_eq!(node.type_tag(), Some("0x3::pair::Pair<u8, 0x2::sui::SUI>"));
        assert!(matches!(node.field("extra"), Some(TypedNode::Object(_))));
        assert!(matches!(node.field("items"), Some(TypedNode::Vector(v)) if v.len() == 2));

        assert!(TypedNode::from_json(&json!({ "type": 5, "fields": {} })).is_err());
        assert!(TypedNode::from_json(&json!({ "fields": {} })).is_err());
        assert!(TypedNode::from_json(&json!({ "type": "x", "fields": [] })).is_err());
    }

    #[test]
    fn test_decode_checks_type_first() {
        let r = pair();
        let ok = json!({
            "type": "0x0003::pair::Pair<u8,0x02::sui::SUI>",
            "fields": { "first": 1, "items": ["2", "3"] }
        });
        let value = r.from_typed_fields(&ok).unwrap();
        assert_eq!(value.field("first"), Some(&MoveValue::U8(1)));
        assert_eq!(
            value.field("items"),
            Some(&MoveValue::from(vec![2u64, 3]))
        );

        // wrong phantom argument, fields would otherwise decode
        let wrong_arg = json!({
            "type": "0x3::pair::Pair<u8, 0x2::usdc::USDC>",
            "fields": { "first": 1, "items": [] }
        });
        assert!(matches!(
            r.from_typed_fields(&wrong_arg),
            Err(ReifyError::TypeMismatch { .. })
        ));

        // wrong name with broken fields: mismatch wins
        let wrong_name = json!({
            "type": "0x3::pair::Other<u8, 0x2::sui::SUI>",
            "fields": { "first": "not a number" }
        });
        assert!(matches!(
            r.from_typed_fields(&wrong_name),
            Err(ReifyError::TypeMismatch { .. })
        ));

        let untyped = json!({ "first": 1, "items": [] });
        assert!(matches!(
            r.from_typed_fields(&untyped),
            Err(ReifyError::MalformedValue(_))
        ));
    }

    #[test]
    fn test_unparseable_declared_type_is_a_mismatch() {
        let r = pair();
        for tag in ["0x3::pair::Pair<u8", "not a type", "Pair<u8, 0x2::sui::SUI>"] {
            let node = json!({ "type": tag, "fields": { "first": 1, "items": [] } });
            assert!(matches!(
                r.from_typed_fields(&node),
                Err(ReifyError::TypeMismatch { ref found, .. }) if found == tag
            ));
        }
    }

    #[test]
    fn test_balance_amount_leaf() {
        let balance = crate::framework::balance_def()
            .reified(vec![TypeArg::phantom("0x2::sui::SUI").unwrap()])
            .unwrap();
        let r = Reified::Struct(Arc::clone(&balance));

        let leaf = TypedNode::from_json(&json!("1000")).unwrap();
        let value = r.from_typed_field(&leaf).unwrap();
        let s = value.as_struct().unwrap();
        assert_eq!(s.type_tag(), balance.type_tag());
        assert_eq!(s.field("value"), Some(&MoveValue::U64(1000)));

        let nested = TypedNode::from_json(&json!({
            "type": "0x2::balance::Balance<0x2::sui::SUI>",
            "fields": { "value": "1000" }
        }))
        .unwrap();
        assert_eq!(r.from_typed_field(&nested).unwrap(), value);

        assert!(r.from_typed_field(&TypedNode::from_json(&json!("-1")).unwrap()).is_err());
        // other structs still need a typed node
        let p = Reified::Struct(pair());
        assert!(matches!(
            p.from_typed_field(&leaf),
            Err(ReifyError::MalformedValue(_))
        ));
    }

    #[test]
    fn test_option_of_struct_accepts_inner_node() {
        let inner = pair();
        let opt = crate::framework::option(Reified::Struct(Arc::clone(&inner)));
        let node = TypedNode::from_json(&json!({
            "type": "0x3::pair::Pair<u8, 0x2::sui::SUI>",
            "fields": { "first": 7, "items": ["1"] }
        }))
        .unwrap();
        let value = opt.from_typed_field(&node).unwrap();
        let MoveValue::Option(Some(boxed)) = &value else {
            panic!("expected Some, got {:?}", value);
        };
        assert_eq!(boxed.as_struct().unwrap().field("first"), Some(&MoveValue::U8(7)));

        let wrapped = TypedNode::from_json(&json!({
            "type": "0x1::option::Option<0x3::pair::Pair<u8, 0x2::sui::SUI>>",
            "fields": { "vec": [{
                "type": "0x3::pair::Pair<u8, 0x2::sui::SUI>",
                "fields": { "first": 7, "items": ["1"] }
            }] }
        }))
        .unwrap();
        assert_eq!(opt.from_typed_field(&wrapped).unwrap(), value);

        // a node of some other struct is checked against the inner type
        let other = TypedNode::from_json(&json!({
            "type": "0x3::pair::Other<u8, 0x2::sui::SUI>",
            "fields": { "first": 7, "items": [] }
        }))
        .unwrap();
        assert!(matches!(
            opt.from_typed_field(&other),
            Err(ReifyError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_builtin_nodes() {
        let uid = Reified::builtin(
            StructTag::new("0x2::object::UID", vec![]).unwrap(),
            Builtin::Uid,
        );
        let expected = MoveValue::Address(Address::from_u8(9));
        let plain = TypedNode::from_json(&json!({ "id": "0x9" })).unwrap();
        assert_eq!(uid.from_typed_field(&plain).unwrap(), expected);
        let leaf = TypedNode::from_json(&json!("0x9")).unwrap();
        assert_eq!(uid.from_typed_field(&leaf).unwrap(), expected);

        let opt_tag = StructTag::new("0x1::option::Option", vec![Primitive::U64.into()]).unwrap();
        let opt = Reified::builtin(opt_tag, Builtin::Option(Primitive::U64.into()));
        let some = TypedNode::from_json(&json!({
            "type": "0x1::option::Option<u64>",
            "fields": { "vec": ["4"] }
        }))
        .unwrap();
        assert_eq!(
            opt.from_typed_field(&some).unwrap(),
            MoveValue::from(Some(4u64))
        );
        assert_eq!(
            opt.from_typed_field(&TypedNode::Null).unwrap(),
            MoveValue::Option(None)
        );
        let leaf = TypedNode::from_json(&json!("4")).unwrap();
        assert_eq!(
            opt.from_typed_field(&leaf).unwrap(),
            MoveValue::from(Some(4u64))
        );
        let wrong = TypedNode::from_json(&json!({
            "type": "0x1::option::Option<u8>",
            "fields": { "vec": [] }
        }))
        .unwrap();
        assert!(opt.from_typed_field(&wrong).is_err());
    }
}
