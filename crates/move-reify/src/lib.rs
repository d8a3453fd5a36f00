// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # move-reify
//!
//! Runtime type reification and multi-format codecs for Move on-chain
//! structs.
//!
//! Every generated binding type delegates to this crate: a struct type,
//! including its generic and phantom parameters, becomes a runtime
//! descriptor that composes a binary layout from its type arguments and
//! decodes values from raw bytes, typed-fields trees or plain JSON, checking
//! the declared type tag against the content on every path.
//!
//! ## Quick Start
//!
//! ```rust
//! use move_reify::{Address, MoveValue, Primitive, StructDef, StructLoader};
//! use serde_json::json;
//!
//! let mut loader = StructLoader::with_framework();
//! let def = StructDef::builder("M::S")
//!     .field("id", Primitive::Address)
//!     .field("value", Primitive::U64)
//!     .build()
//!     .unwrap();
//! loader.register_struct(def);
//!
//! let s = loader.resolve_struct("M::S").unwrap();
//! let value = s
//!     .new_value(vec![
//!         ("id", MoveValue::from(Address::from_u8(1))),
//!         ("value", MoveValue::from(42u64)),
//!     ])
//!     .unwrap();
//!
//! let bytes = s.to_bytes(&value).unwrap();
//! assert_eq!(s.from_bytes(&bytes).unwrap(), value);
//!
//! let json = json!({ "$typeName": "M::S", "id": "0x1", "value": "42" });
//! assert_eq!(s.from_json(&json).unwrap(), value);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |  StructLoader: tag string -> Reified (registry + cache)       |
//! +--------------------------------------------------------------+
//! |  TagNode / TypeTag: parse, canonicalize                       |
//! +--------------------------------------------------------------+
//! |  StructDef + TypeArg -> StructReified (phantom handling)      |
//! +--------------------------------------------------------------+
//! |  Schema (binary) | json (plain JSON) | typed (typed fields)   |
//! +--------------------------------------------------------------+
//! |  Primitive codecs: LE integers, U256, Address, ULEB128        |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StructLoader`] | Name -> factory registry; resolves tag strings |
//! | [`StructDef`] | Static struct declaration with phantom/structural params |
//! | [`StructReified`] | Descriptor of one concrete struct instantiation |
//! | [`Reified`] | Any concrete type descriptor |
//! | [`MoveValue`] / [`MoveStruct`] | Decoded values |
//! | [`TypeTag`] | Canonical parsed type tag |
//! | [`Manifest`] | Declarative binding package (TOML/JSON) |

pub mod error;
pub mod framework;
pub mod json;
pub mod loader;
pub mod manifest;
pub mod primitive;
pub mod reified;
pub mod schema;
pub mod source;
pub mod type_tag;
pub mod typed;
pub mod value;

pub use error::{ReifyError, Result};
pub use json::{TYPE_ARGS_KEY, TYPE_NAME_KEY};
pub use loader::{
    global_loader, init_loader_if_needed, is_instance_of, CacheStats, Package, StructLoader,
    DEFAULT_CACHE_CAPACITY,
};
pub use manifest::{LoaderConfig, Manifest, ManifestError};
pub use primitive::{compress_address, Address, Primitive, U256};
pub use reified::{
    Builtin, BuiltinReified, Factory, FieldDef, FieldType, Reified, StructDef, StructDefBuilder,
    StructReified, TypeArg, TypeParam,
};
pub use schema::{FieldSchema, Schema, StrKind, StructSchema};
pub use source::{MemoryObjectSource, ObjectSource, RawObject};
pub use type_tag::{
    canonicalize, compose_type_name, split_type_name, StructTag, TagNode, TypeTag, MAX_TYPE_DEPTH,
};
pub use typed::TypedNode;
pub use value::{MoveStruct, MoveValue};
