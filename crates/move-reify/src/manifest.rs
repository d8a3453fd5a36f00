// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declarative binding packages and loader configuration.
//!
//! A manifest lists struct declarations so that a package can be registered
//! without hand-written factories:
//!
//! ```toml
//! [[structs]]
//! name = "0x2::balance::Balance"
//! type_params = [{ name = "T", phantom = true }]
//! fields = [{ name = "value", type = "u64" }]
//!
//! [[structs]]
//! name = "0x42::vault::Vault"
//! type_params = [{ name = "C", phantom = true }]
//! fields = [
//!     { name = "id", type = "0x2::object::UID" },
//!     { name = "funds", type = "0x2::balance::Balance<C>" },
//!     { name = "label", type = "0x1::option::Option<0x1::string::String>" },
//! ]
//! ```
//!
//! Field types may name the struct's own parameters, primitives, `vector<…>`,
//! structs declared earlier in the same manifest, and anything already in
//! the target loader.

use crate::error::ReifyError;
use crate::loader::{StructLoader, DEFAULT_CACHE_CAPACITY};
use crate::primitive::Primitive;
use crate::reified::{Factory, FieldType, StructDef};
use crate::type_tag::{canonical_struct_name, TagNode, VECTOR};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Manifest and configuration errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid manifest: {0}")]
    Invalid(String),

    #[error(transparent)]
    Reify(#[from] ReifyError),
}

/// A set of struct declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub structs: Vec<StructEntry>,
}

/// One declared struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructEntry {
    /// Qualified name (`0x2::coin::Coin`).
    pub name: String,

    #[serde(default)]
    pub type_params: Vec<TypeParamEntry>,

    /// Fields in wire order.
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamEntry {
    pub name: String,

    #[serde(default)]
    pub phantom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,

    /// Type tag, possibly naming the struct's type parameters.
    #[serde(rename = "type")]
    pub ty: String,
}

impl Manifest {
    /// Load from a file; `.json` files are JSON, anything else is TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let manifest = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };
        debug!(
            "loaded manifest {} with {} structs",
            path.display(),
            manifest.structs.len()
        );
        Ok(manifest)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Check names without consulting a loader.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.structs.is_empty() {
            return Err(ManifestError::Invalid("No structs declared".into()));
        }

        let mut names = HashSet::new();
        for entry in &self.structs {
            let name = canonical_struct_name(&entry.name)?;
            if !names.insert(name) {
                return Err(ManifestError::Invalid(format!(
                    "Struct {} declared twice",
                    entry.name
                )));
            }

            let mut params = HashSet::new();
            for param in &entry.type_params {
                if !params.insert(param.name.as_str()) {
                    return Err(ManifestError::Invalid(format!(
                        "{}: duplicate type parameter {}",
                        entry.name, param.name
                    )));
                }
            }

            let mut fields = HashSet::new();
            for field in &entry.fields {
                if field.name.is_empty() {
                    return Err(ManifestError::Invalid(format!(
                        "{}: empty field name",
                        entry.name
                    )));
                }
                if !fields.insert(field.name.as_str()) {
                    return Err(ManifestError::Invalid(format!(
                        "{}: duplicate field {}",
                        entry.name, field.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Validate, build and register every struct in declaration order.
    ///
    /// Every entry is built before any is registered, so a failing entry
    /// leaves the loader untouched. Returns the number of newly registered
    /// structs; names already in the loader are skipped.
    pub fn register_into(&self, loader: &mut StructLoader) -> Result<usize, ManifestError> {
        self.validate()?;
        let mut pending: HashMap<String, Factory> = HashMap::new();
        let mut defs = Vec::with_capacity(self.structs.len());
        for entry in &self.structs {
            let def = entry.build_with(loader, &pending)?;
            pending.insert(def.name().to_string(), Factory::Struct(Arc::clone(&def)));
            defs.push(def);
        }

        let mut added = 0;
        for def in defs {
            if loader.register_struct(def) {
                added += 1;
            }
        }
        Ok(added)
    }
}

impl StructEntry {
    /// Build the definition, resolving field types against `loader`.
    pub fn build(&self, loader: &StructLoader) -> Result<Arc<StructDef>, ReifyError> {
        self.build_with(loader, &HashMap::new())
    }

    /// Build, resolving names first against `pending` (structs declared
    /// earlier in the same manifest) and then against `loader`.
    fn build_with(
        &self,
        loader: &StructLoader,
        pending: &HashMap<String, Factory>,
    ) -> Result<Arc<StructDef>, ReifyError> {
        let mut builder = StructDef::builder(self.name.as_str());
        for param in &self.type_params {
            builder = if param.phantom {
                builder.phantom_param(param.name.as_str())
            } else {
                builder.type_param(param.name.as_str())
            };
        }
        for field in &self.fields {
            let node = TagNode::parse(&field.ty)?;
            builder = builder.field(
                field.name.as_str(),
                self.field_type(&node, loader, pending)?,
            );
        }
        builder.build()
    }

    fn field_type(
        &self,
        node: &TagNode,
        loader: &StructLoader,
        pending: &HashMap<String, Factory>,
    ) -> Result<FieldType, ReifyError> {
        if let Some(i) = self.type_params.iter().position(|p| p.name == node.name) {
            if !node.args.is_empty() {
                return Err(ReifyError::ArityMismatch {
                    name: node.name.clone(),
                    expected: 0,
                    got: node.args.len(),
                });
            }
            return Ok(FieldType::Param(i));
        }
        if let Some(p) = Primitive::from_name(&node.name) {
            if !node.args.is_empty() {
                return Err(ReifyError::ArityMismatch {
                    name: node.name.clone(),
                    expected: 0,
                    got: node.args.len(),
                });
            }
            return Ok(FieldType::Primitive(p));
        }
        if node.name == VECTOR {
            if node.args.len() != 1 {
                return Err(ReifyError::ArityMismatch {
                    name: VECTOR.to_string(),
                    expected: 1,
                    got: node.args.len(),
                });
            }
            return Ok(FieldType::vector(self.field_type(&node.args[0], loader, pending)?));
        }

        let factory = canonical_struct_name(&node.name)
            .ok()
            .and_then(|name| pending.get(&name))
            .or_else(|| loader.factory(&node.name))
            .cloned()
            .ok_or_else(|| ReifyError::UnknownType(node.name.clone()))?;
        if factory.arity() != node.args.len() {
            return Err(ReifyError::ArityMismatch {
                name: factory.name().to_string(),
                expected: factory.arity(),
                got: node.args.len(),
            });
        }
        let args = node
            .args
            .iter()
            .map(|arg| self.field_type(arg, loader, pending))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldType::named(factory, args))
    }
}

/// Loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Register the framework types first.
    #[serde(default = "default_true")]
    pub include_framework: bool,

    /// Cache successful resolutions per canonical tag.
    #[serde(default = "default_true")]
    pub cache_resolutions: bool,

    /// Most resolutions kept before the least recently used is evicted.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Manifest files registered in order.
    #[serde(default)]
    pub manifests: Vec<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            include_framework: true,
            cache_resolutions: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            manifests: Vec::new(),
        }
    }
}

impl LoaderConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::MoveValue;
    use std::io::Write;

    const VAULT: &str = r#"
[[structs]]
name = "0x42::vault::Receipt"
fields = [{ name = "amount", type = "u64" }]

[[structs]]
name = "0x42::vault::Vault"
type_params = [{ name = "C", phantom = true }, { name = "T" }]
fields = [
    { name = "id", type = "0x2::object::UID" },
    { name = "funds", type = "0x2::balance::Balance<C>" },
    { name = "label", type = "0x1::option::Option<0x1::string::String>" },
    { name = "receipts", type = "vector<0x42::vault::Receipt>" },
    { name = "extra", type = "T" },
]
"#;

    #[test]
    fn test_register_manifest() {
        let manifest = Manifest::from_toml_str(VAULT).unwrap();
        manifest.validate().unwrap();

        let mut loader = StructLoader::with_framework();
        assert_eq!(manifest.register_into(&mut loader).unwrap(), 2);
        // second registration adds nothing
        assert_eq!(manifest.register_into(&mut loader).unwrap(), 0);

        let vault = loader
            .resolve_struct("0x42::vault::Vault<0x2::sui::SUI, bool>")
            .unwrap();
        assert_eq!(vault.fields().len(), 5);
        assert_eq!(
            vault.fields()[1].1.type_name(),
            "0x2::balance::Balance<0x2::sui::SUI>"
        );

        let mut bytes = vec![0u8; 32];
        bytes.extend(9u64.to_le_bytes());
        bytes.extend([1, 2, b'h', b'i']);
        bytes.extend([1]);
        bytes.extend(3u64.to_le_bytes());
        bytes.push(1);
        let value = vault.from_bytes(&bytes).unwrap();
        assert_eq!(
            value.field("label"),
            Some(&MoveValue::from(Some("hi")))
        );
        assert_eq!(value.field("extra"), Some(&MoveValue::Bool(true)));
        assert_eq!(vault.to_bytes(&value).unwrap(), bytes);
    }

    #[test]
    fn test_phantom_misuse_is_rejected() {
        let bad = Manifest::from_toml_str(
            r#"
[[structs]]
name = "0x42::bad::Bad"
type_params = [{ name = "T", phantom = true }]
fields = [{ name = "v", type = "T" }]
"#,
        )
        .unwrap();
        let mut loader = StructLoader::new();
        assert!(matches!(
            bad.register_into(&mut loader),
            Err(ManifestError::Reify(ReifyError::InvalidDefinition { .. }))
        ));
    }

    #[test]
    fn test_unknown_field_type() {
        let manifest = Manifest::from_toml_str(
            r#"
[[structs]]
name = "0x42::m::S"
fields = [{ name = "v", type = "0x42::m::Missing" }]
"#,
        )
        .unwrap();
        let mut loader = StructLoader::new();
        assert!(matches!(
            manifest.register_into(&mut loader),
            Err(ManifestError::Reify(ReifyError::UnknownType(_)))
        ));
    }

    #[test]
    fn test_failed_registration_leaves_loader_untouched() {
        let manifest = Manifest::from_toml_str(
            r#"
[[structs]]
name = "0x42::m::First"
fields = [{ name = "v", type = "u64" }]

[[structs]]
name = "0x42::m::Second"
fields = [
    { name = "first", type = "0x42::m::First" },
    { name = "v", type = "0x42::m::Missing" },
]
"#,
        )
        .unwrap();
        let mut loader = StructLoader::with_framework();
        let before = loader.len();
        assert!(matches!(
            manifest.register_into(&mut loader),
            Err(ManifestError::Reify(ReifyError::UnknownType(_)))
        ));
        assert_eq!(loader.len(), before);
        assert!(!loader.contains("0x42::m::First"));

        // a struct with no fields fails the whole manifest the same way
        let empty = Manifest::from_toml_str(
            r#"
[[structs]]
name = "0x42::m::First"
fields = [{ name = "v", type = "u64" }]

[[structs]]
name = "0x42::m::Empty"
"#,
        )
        .unwrap();
        assert!(matches!(
            empty.register_into(&mut loader),
            Err(ManifestError::Reify(ReifyError::InvalidDefinition { .. }))
        ));
        assert_eq!(loader.len(), before);
    }

    #[test]
    fn test_validation() {
        assert!(Manifest::default().validate().is_err());

        let dup = Manifest::from_toml_str(
            r#"
[[structs]]
name = "0x1::m::S"
[[structs]]
name = "0x0001::m::S"
"#,
        )
        .unwrap();
        assert!(matches!(dup.validate(), Err(ManifestError::Invalid(_))));

        let dup_field = Manifest::from_toml_str(
            r#"
[[structs]]
name = "0x1::m::S"
fields = [{ name = "a", type = "u8" }, { name = "a", type = "u8" }]
"#,
        )
        .unwrap();
        assert!(dup_field.validate().is_err());
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        toml_file.write_all(VAULT.as_bytes()).unwrap();
        let from_toml = Manifest::from_file(toml_file.path()).unwrap();
        assert_eq!(from_toml.structs.len(), 2);

        let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json_file
            .write_all(serde_json::to_string(&from_toml).unwrap().as_bytes())
            .unwrap();
        let from_json = Manifest::from_file(json_file.path()).unwrap();
        assert_eq!(from_json, from_toml);

        assert!(matches!(
            Manifest::from_file("/nonexistent/manifest.toml"),
            Err(ManifestError::Io(_))
        ));
    }

    #[test]
    fn test_loader_config() {
        let config = LoaderConfig::from_toml_str("cache_resolutions = false").unwrap();
        assert!(config.include_framework);
        assert!(!config.cache_resolutions);
        assert!(config.manifests.is_empty());
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(LoaderConfig::from_toml_str("").unwrap(), LoaderConfig::default());

        let bounded = LoaderConfig::from_toml_str("cache_capacity = 16").unwrap();
        assert_eq!(StructLoader::from_config(&bounded).unwrap().cache_capacity(), 16);
        let off = LoaderConfig::from_toml_str("cache_resolutions = false\ncache_capacity = 16")
            .unwrap();
        assert_eq!(StructLoader::from_config(&off).unwrap().cache_capacity(), 0);
    }

    #[test]
    fn test_loader_from_config() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(VAULT.as_bytes()).unwrap();

        let config = LoaderConfig {
            manifests: vec![file.path().to_path_buf()],
            ..LoaderConfig::default()
        };
        let loader = StructLoader::from_config(&config).unwrap();
        assert!(loader.contains("0x42::vault::Vault"));
        assert!(loader.contains("0x2::coin::Coin"));

        let bare = LoaderConfig {
            include_framework: false,
            ..LoaderConfig::default()
        };
        assert!(StructLoader::from_config(&bare).unwrap().is_empty());
    }
}
