// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// End-to-end decoding
//
// Drives the public surface the way generated bindings do:
//   1. register a package (by hand, through a manifest, or via config)
//   2. resolve a tag string from the wire
//   3. decode binary, typed-fields and JSON payloads of the same object
//
// All three payloads must agree field for field.

#![allow(clippy::unwrap_used)]
#![allow(clippy::uninlined_format_args)]

use move_reify::{
    init_loader_if_needed, is_instance_of, Address, LoaderConfig, Manifest, MemoryObjectSource,
    MoveValue, ObjectSource, Package, Primitive, Reified, ReifyError, StructDef, StructLoader,
    TypeArg,
};
use serde_json::json;
use std::io::Write;

fn register_m(loader: &mut StructLoader) {
    let def = StructDef::builder("M::S")
        .field("id", Primitive::Address)
        .field("value", Primitive::U64)
        .build()
        .unwrap();
    loader.register_struct(def);
}

#[test]
fn same_object_from_every_format() {
    let mut loader = StructLoader::new();
    register_m(&mut loader);
    let s = loader.resolve_struct("M::S").unwrap();

    let value = s
        .new_value(vec![
            ("id", MoveValue::from(Address::from_u8(1))),
            ("value", MoveValue::from(42u64)),
        ])
        .unwrap();

    let bytes = s.to_bytes(&value).unwrap();
    let mut expected = vec![0u8; 31];
    expected.push(1);
    expected.extend_from_slice(&42u64.to_le_bytes());
    assert_eq!(bytes, expected);

    let from_bytes = s.from_bytes(&bytes).unwrap();
    let from_json = loader
        .from_json(&json!({
            "$typeName": "M::S",
            "id": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "value": "42"
        }))
        .unwrap();
    let from_typed = loader
        .from_typed_fields(&json!({
            "type": "M::S",
            "fields": { "id": "0x1", "value": 42 }
        }))
        .unwrap();

    assert!(from_bytes.fields_eq(&value));
    assert!(from_json.fields_eq(&value));
    assert!(from_typed.fields_eq(&value));
    assert_eq!(from_json, from_bytes);
    assert_eq!(from_typed, from_bytes);
}

#[test]
fn coin_from_rpc_shapes() {
    let loader = StructLoader::with_framework();
    let tag = "0x2::coin::Coin<0x2::sui::SUI>";
    let coin = loader.resolve_struct(tag).unwrap();

    let typed = json!({
        "dataType": "moveObject",
        "type": tag,
        "hasPublicTransfer": true,
        "fields": {
            "id": { "id": "0x5" },
            "balance": "1000"
        }
    });
    // RPC flattens a Balance to its amount
    let flattened = coin.from_typed_fields(&typed).unwrap();

    let typed = json!({
        "type": tag,
        "fields": {
            "id": { "id": "0x5" },
            "balance": {
                "type": "0x2::balance::Balance<0x2::sui::SUI>",
                "fields": { "value": "1000" }
            }
        }
    });
    let decoded = coin.from_typed_fields(&typed).unwrap();
    assert_eq!(decoded.field("id"), Some(&MoveValue::Address(Address::from_u8(5))));
    let balance = decoded.field("balance").unwrap().as_struct().unwrap();
    assert_eq!(balance.field("value"), Some(&MoveValue::U64(1000)));
    assert_eq!(balance.type_name(), "0x2::balance::Balance");
    assert_eq!(flattened, decoded);

    let bytes = coin.to_bytes(&decoded).unwrap();
    assert_eq!(bytes.len(), 40);
    assert_eq!(coin.from_bytes(&bytes).unwrap(), decoded);

    let envelope = coin.to_json(&decoded).unwrap();
    assert_eq!(envelope["$typeArgs"], json!(["0x2::sui::SUI"]));
    assert_eq!(envelope["balance"], json!({ "value": "1000" }));
    assert_eq!(loader.from_json(&envelope).unwrap(), decoded);
}

#[test]
fn fetch_through_object_source() {
    let mut loader = StructLoader::with_framework();
    let usdc = StructDef::builder("0x2::usdc::USDC")
        .field("dummy_field", Primitive::Bool)
        .build()
        .unwrap();
    loader.register_struct(usdc);
    let coin = loader.resolve_struct("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
    let balance = coin.fields()[1].1.as_struct().unwrap();
    let value = coin
        .new_value(vec![
            ("id", MoveValue::from(Address::from_u8(9))),
            (
                "balance",
                MoveValue::from(
                    balance
                        .new_value(vec![("value", MoveValue::from(5u64))])
                        .unwrap(),
                ),
            ),
        ])
        .unwrap();

    let mut source = MemoryObjectSource::new();
    let sui_id = Address::from_u8(9);
    let usdc_id = Address::from_u8(10);
    let bytes = coin.to_bytes(&value).unwrap();
    source.insert(sui_id, "0x0002::coin::Coin<0x2::sui::SUI>", bytes.clone());
    source.insert(usdc_id, "0x2::coin::Coin<0x2::usdc::USDC>", bytes);

    assert_eq!(coin.fetch(&source, &sui_id).unwrap(), value);
    assert!(matches!(
        coin.fetch(&source, &usdc_id),
        Err(ReifyError::TypeMismatch { .. })
    ));
    assert!(matches!(
        coin.fetch(&source, &Address::from_u8(11)),
        Err(ReifyError::ObjectNotFound(_))
    ));

    // the loader decodes with whatever type the object declares
    let usdc = loader.fetch_object(&source, &usdc_id).unwrap();
    let usdc = usdc.as_struct().unwrap();
    assert_eq!(usdc.type_args(), vec!["0x2::usdc::USDC".to_string()]);
    assert_eq!(usdc.field("id"), value.field("id"));
    let usdc_balance = usdc.field("balance").unwrap().as_struct().unwrap();
    assert_eq!(usdc_balance.type_args(), vec!["0x2::usdc::USDC".to_string()]);
    assert_eq!(usdc_balance.field("value"), Some(&MoveValue::U64(5)));

    let raw = source.fetch_object(&sui_id).unwrap();
    assert!(is_instance_of(&raw.type_tag, "0x2::coin::Coin"));
    assert!(!is_instance_of(&raw.type_tag, "0x2::balance::Balance"));
}

const VAULT: &str = r#"
[[structs]]
name = "0x42::vault::Receipt"
fields = [{ name = "amount", type = "u64" }]

[[structs]]
name = "0x42::vault::Vault"
type_params = [{ name = "C", phantom = true }, { name = "R" }]
fields = [
    { name = "id", type = "0x2::object::UID" },
    { name = "funds", type = "0x2::balance::Balance<C>" },
    { name = "receipts", type = "vector<R>" },
    { name = "label", type = "0x1::option::Option<0x1::string::String>" },
]
"#;

#[test]
fn manifest_package_via_config() {
    let mut manifest_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    manifest_file.write_all(VAULT.as_bytes()).unwrap();

    let mut config_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        config_file,
        "manifests = [{:?}]",
        manifest_file.path().display().to_string()
    )
    .unwrap();

    let config = LoaderConfig::from_file(config_file.path()).unwrap();
    assert!(config.include_framework);
    let loader = StructLoader::from_config(&config).unwrap();
    assert!(loader.contains("0x42::vault::Vault"));
    assert!(loader.contains("0x2::coin::Coin"));

    let vault = loader
        .resolve_struct("0x42::vault::Vault<0x2::sui::SUI, 0x42::vault::Receipt>")
        .unwrap();
    assert!(vault.type_args()[0].is_phantom());

    let typed = json!({
        "type": "0x42::vault::Vault<0x2::sui::SUI,0x42::vault::Receipt>",
        "fields": {
            "id": { "id": "0xabc" },
            "funds": {
                "type": "0x2::balance::Balance<0x2::sui::SUI>",
                "fields": { "value": "77" }
            },
            "receipts": [
                { "type": "0x42::vault::Receipt", "fields": { "amount": "1" } },
                { "type": "0x42::vault::Receipt", "fields": { "amount": "2" } }
            ],
            "label": null
        }
    });
    let decoded = vault.from_typed_fields(&typed).unwrap();
    assert_eq!(decoded.field("label"), Some(&MoveValue::Option(None)));
    let receipts = decoded.field("receipts").unwrap().as_vector().unwrap();
    assert_eq!(receipts.len(), 2);

    let bytes = vault.to_bytes(&decoded).unwrap();
    // uid + balance + len + 2 receipts + none
    assert_eq!(bytes.len(), 32 + 8 + 1 + 16 + 1);
    assert_eq!(vault.from_bytes(&bytes).unwrap(), decoded);

    let envelope = vault.to_json(&decoded).unwrap();
    assert_eq!(envelope["label"], serde_json::Value::Null);
    assert_eq!(loader.from_json(&envelope).unwrap(), decoded);
}

#[test]
fn manifest_registration_is_append_only() {
    let mut loader = StructLoader::with_framework();
    let manifest = Manifest::from_toml_str(VAULT).unwrap();
    assert_eq!(manifest.register_into(&mut loader).unwrap(), 2);
    assert_eq!(manifest.register_into(&mut loader).unwrap(), 0);

    let replacement = StructDef::builder("0x42::vault::Receipt")
        .field("amount", Primitive::U8)
        .build()
        .unwrap();
    assert!(!loader.register_struct(replacement));
    let receipt = loader.resolve_struct("0x42::vault::Receipt").unwrap();
    assert_eq!(receipt.fields()[0].1, Reified::from(Primitive::U64));
}

#[test]
fn global_loader_is_built_once() {
    fn package(loader: &mut StructLoader) {
        register_m(loader);
    }
    fn other(loader: &mut StructLoader) {
        let def = StructDef::builder("0x77::other::Thing")
            .phantom_param("T")
            .field("n", Primitive::U8)
            .build()
            .unwrap();
        loader.register_struct(def);
    }

    let first = init_loader_if_needed(&[package as Package]);
    let second = init_loader_if_needed(&[other as Package]);
    assert!(std::ptr::eq(first, second));
    assert!(first.contains("M::S"));
    assert!(!first.contains("0x77::other::Thing"));

    let thing = StructDef::builder("0x77::other::Thing")
        .phantom_param("T")
        .field("n", Primitive::U8)
        .build()
        .unwrap()
        .reified(vec![TypeArg::phantom("M::S").unwrap()])
        .unwrap();
    assert_eq!(thing.full_type_name(), "0x77::other::Thing<M::S>");
}
