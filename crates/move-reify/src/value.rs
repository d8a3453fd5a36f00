// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoded values.

use crate::primitive::{Address, U256};
use crate::type_tag::StructTag;

/// A decoded on-chain value.
///
/// Well-known framework wrappers collapse to leaves: `0x1::string::String`
/// becomes [`MoveValue::String`], `0x2::object::UID` becomes
/// [`MoveValue::Address`], `0x1::option::Option<T>` becomes
/// [`MoveValue::Option`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    Address(Address),
    String(String),
    Vector(Vec<MoveValue>),
    Option(Option<Box<MoveValue>>),
    Struct(MoveStruct),
}

impl MoveValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::U8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::U128(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[MoveValue]> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Bytes of a `vector<u8>` value.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        self.as_vector()?.iter().map(MoveValue::as_u8).collect()
    }

    pub fn as_struct(&self) -> Option<&MoveStruct> {
        match self {
            Self::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Short shape name used in error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
            Self::U256(_) => "u256",
            Self::Address(_) => "address",
            Self::String(_) => "string",
            Self::Vector(_) => "vector",
            Self::Option(_) => "option",
            Self::Struct(_) => "struct",
        }
    }
}

impl From<bool> for MoveValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for MoveValue {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

impl From<u16> for MoveValue {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}

impl From<u32> for MoveValue {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<u64> for MoveValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<u128> for MoveValue {
    fn from(v: u128) -> Self {
        Self::U128(v)
    }
}

impl From<U256> for MoveValue {
    fn from(v: U256) -> Self {
        Self::U256(v)
    }
}

impl From<Address> for MoveValue {
    fn from(v: Address) -> Self {
        Self::Address(v)
    }
}

impl From<&str> for MoveValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for MoveValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<MoveStruct> for MoveValue {
    fn from(v: MoveStruct) -> Self {
        Self::Struct(v)
    }
}

impl<T: Into<MoveValue>> From<Vec<T>> for MoveValue {
    fn from(v: Vec<T>) -> Self {
        Self::Vector(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<MoveValue>> From<Option<T>> for MoveValue {
    fn from(v: Option<T>) -> Self {
        Self::Option(v.map(|inner| Box::new(inner.into())))
    }
}

/// An instance of a struct type.
///
/// Only a [`StructReified`](crate::StructReified) can build one, so the
/// recorded tag always equals the tag derived from the struct name and the
/// concrete type arguments. Fields are kept in declaration order.
///
/// Equality compares the tag as well as the fields: two instances that
/// differ only in a phantom argument are not equal. Use
/// [`MoveStruct::fields_eq`] to compare field values alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveStruct {
    type_tag: StructTag,
    fields: Vec<(String, MoveValue)>,
}

impl MoveStruct {
    pub(crate) fn from_parts(type_tag: StructTag, fields: Vec<(String, MoveValue)>) -> Self {
        Self { type_tag, fields }
    }

    /// Full type tag (`0x2::coin::Coin<0x2::sui::SUI>`).
    pub fn type_tag(&self) -> &StructTag {
        &self.type_tag
    }

    /// Bare type name (`0x2::coin::Coin`).
    pub fn type_name(&self) -> &str {
        self.type_tag.name()
    }

    /// Canonical type argument strings.
    pub fn type_args(&self) -> Vec<String> {
        self.type_tag.type_arg_strings()
    }

    pub fn fields(&self) -> &[(String, MoveValue)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&MoveValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Compare field values, ignoring the type tag.
    pub fn fields_eq(&self, other: &MoveStruct) -> bool {
        self.fields == other.fields
    }

    pub fn into_fields(self) -> Vec<(String, MoveValue)> {
        self.fields
    }
}
