// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Well-known framework types.
//!
//! Strings, URLs, object identifiers and options are registered as leaf
//! wrappers: their values are [`MoveValue::String`](crate::MoveValue),
//! [`MoveValue::Address`](crate::MoveValue) and
//! [`MoveValue::Option`](crate::MoveValue) rather than nested structs. Their
//! binary layouts match the framework declarations byte for byte.
//!
//! `Balance`, `Supply` and `Coin` are ordinary declared structs with a
//! phantom currency parameter. `SUI` is the native coin's one-time witness.

use crate::loader::StructLoader;
use crate::primitive::Primitive;
use crate::reified::{Builtin, Factory, FieldType, Reified, StructDef};
use crate::type_tag::StructTag;
use std::sync::{Arc, OnceLock};

pub const UTF8_STRING: &str = "0x1::string::String";
pub const ASCII_STRING: &str = "0x1::ascii::String";
pub const OPTION: &str = "0x1::option::Option";
pub const URL: &str = "0x2::url::Url";
pub const ID: &str = "0x2::object::ID";
pub const UID: &str = "0x2::object::UID";
pub const BALANCE: &str = "0x2::balance::Balance";
pub const SUPPLY: &str = "0x2::balance::Supply";
pub const COIN: &str = "0x2::coin::Coin";
pub const SUI: &str = "0x2::sui::SUI";

fn leaf(name: &str, kind: Builtin) -> Reified {
    Reified::builtin(StructTag::from_canonical(name, Vec::new()), kind)
}

pub fn utf8_string() -> Reified {
    leaf(UTF8_STRING, Builtin::Utf8String)
}

pub fn ascii_string() -> Reified {
    leaf(ASCII_STRING, Builtin::AsciiString)
}

pub fn url() -> Reified {
    leaf(URL, Builtin::Url)
}

pub fn id() -> Reified {
    leaf(ID, Builtin::Id)
}

pub fn uid() -> Reified {
    leaf(UID, Builtin::Uid)
}

/// `0x1::option::Option<inner>`.
pub fn option(inner: Reified) -> Reified {
    let tag = StructTag::from_canonical(OPTION, vec![inner.type_tag()]);
    Reified::builtin(tag, Builtin::Option(inner))
}

fn leaf_factory(name: &str, build: fn() -> Reified) -> Factory {
    Factory::Custom {
        name: name.into(),
        arity: 0,
        build: Arc::new(move |_: &[Reified]| build()),
    }
}

/// Factory for `0x1::option::Option<T>`.
pub fn option_factory() -> Factory {
    Factory::Custom {
        name: OPTION.into(),
        arity: 1,
        build: Arc::new(|args: &[Reified]| option(args[0].clone())),
    }
}

pub fn utf8_string_factory() -> Factory {
    leaf_factory(UTF8_STRING, utf8_string)
}

pub fn uid_factory() -> Factory {
    leaf_factory(UID, uid)
}

/// `Balance<phantom T> { value: u64 }`.
pub fn balance_def() -> Arc<StructDef> {
    static DEF: OnceLock<Arc<StructDef>> = OnceLock::new();
    Arc::clone(DEF.get_or_init(|| {
        #[allow(clippy::expect_used)] // static definition, covered by tests
        let def = StructDef::builder(BALANCE)
            .phantom_param("T")
            .field("value", Primitive::U64)
            .build()
            .expect("Balance definition is valid");
        def
    }))
}

/// `Supply<phantom T> { value: u64 }`.
pub fn supply_def() -> Arc<StructDef> {
    static DEF: OnceLock<Arc<StructDef>> = OnceLock::new();
    Arc::clone(DEF.get_or_init(|| {
        #[allow(clippy::expect_used)] // static definition, covered by tests
        let def = StructDef::builder(SUPPLY)
            .phantom_param("T")
            .field("value", Primitive::U64)
            .build()
            .expect("Supply definition is valid");
        def
    }))
}

/// `Coin<phantom T> { id: UID, balance: Balance<T> }`.
pub fn coin_def() -> Arc<StructDef> {
    static DEF: OnceLock<Arc<StructDef>> = OnceLock::new();
    Arc::clone(DEF.get_or_init(|| {
        #[allow(clippy::expect_used)] // static definition, covered by tests
        let def = StructDef::builder(COIN)
            .phantom_param("T")
            .field("id", FieldType::named(uid_factory(), Vec::new()))
            .field(
                "balance",
                FieldType::of(&balance_def(), vec![FieldType::Param(0)]),
            )
            .build()
            .expect("Coin definition is valid");
        def
    }))
}

/// `SUI { dummy_field: bool }`.
pub fn sui_def() -> Arc<StructDef> {
    static DEF: OnceLock<Arc<StructDef>> = OnceLock::new();
    Arc::clone(DEF.get_or_init(|| {
        #[allow(clippy::expect_used)] // static definition, covered by tests
        let def = StructDef::builder(SUI)
            .field("dummy_field", Primitive::Bool)
            .build()
            .expect("SUI definition is valid");
        def
    }))
}

/// Every framework factory, in registration order.
pub fn factories() -> Vec<Factory> {
    vec![
        utf8_string_factory(),
        leaf_factory(ASCII_STRING, ascii_string),
        leaf_factory(URL, url),
        leaf_factory(ID, id),
        uid_factory(),
        option_factory(),
        Factory::Struct(balance_def()),
        Factory::Struct(supply_def()),
        Factory::Struct(coin_def()),
        Factory::Struct(sui_def()),
    ]
}

/// Register the framework types; names already present are left alone.
pub fn register(loader: &mut StructLoader) {
    for factory in factories() {
        loader.register_factory(factory);
    }
}
