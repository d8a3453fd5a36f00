// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors ("reified types").
//!
//! A [`StructDef`] is the static declaration of a struct: its qualified name,
//! its type parameters (each marked structural or phantom) and its fields in
//! wire order. Applying concrete [`TypeArg`]s to a definition yields a
//! [`StructReified`], the descriptor that decodes, encodes and validates
//! values of exactly that instantiation.
//!
//! Phantom parameters take part in the type tag but never in the layout: a
//! definition that uses a phantom parameter in a structural position is
//! rejected when it is built.
//!
//! # Example
//!
//! ```
//! use move_reify::{MoveValue, Primitive, StructDef, TypeArg};
//!
//! let balance = StructDef::builder("0x2::balance::Balance")
//!     .phantom_param("T")
//!     .field("value", Primitive::U64)
//!     .build()
//!     .unwrap();
//!
//! let sui = balance.reified(vec![TypeArg::phantom("0x2::sui::SUI").unwrap()]).unwrap();
//! assert_eq!(sui.full_type_name(), "0x2::balance::Balance<0x2::sui::SUI>");
//!
//! let value = sui.new_value(vec![("value", MoveValue::from(7u64))]).unwrap();
//! assert_eq!(sui.to_bytes(&value).unwrap(), 7u64.to_le_bytes());
//! ```

use crate::error::{ReifyError, Result};
use crate::json;
use crate::primitive::{Address, Primitive};
use crate::schema::{FieldSchema, Schema, StrKind, StructSchema};
use crate::source::ObjectSource;
use crate::type_tag::{canonical_struct_name, StructTag, TypeTag};
use crate::typed::{self, TypedNode};
use crate::value::{MoveStruct, MoveValue};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// A fully concrete type descriptor.
///
/// Cloning is cheap; struct descriptors are shared behind an [`Arc`].
#[derive(Debug, Clone)]
pub enum Reified {
    Primitive(Primitive),
    Vector(Box<Reified>),
    /// Framework wrapper whose values collapse to a leaf.
    Builtin(Arc<BuiltinReified>),
    Struct(Arc<StructReified>),
}

/// Framework wrappers with a leaf value representation.
#[derive(Debug, Clone)]
pub enum Builtin {
    /// `0x1::string::String`
    Utf8String,
    /// `0x1::ascii::String`
    AsciiString,
    /// `0x2::url::Url`
    Url,
    /// `0x2::object::ID`
    Id,
    /// `0x2::object::UID`
    Uid,
    /// `0x1::option::Option<T>`
    Option(Reified),
}

/// Descriptor of a framework wrapper.
#[derive(Debug)]
pub struct BuiltinReified {
    tag: StructTag,
    kind: Builtin,
}

impl BuiltinReified {
    pub fn type_tag(&self) -> &StructTag {
        &self.tag
    }

    pub fn kind(&self) -> &Builtin {
        &self.kind
    }

    fn schema(&self) -> Schema {
        match &self.kind {
            Builtin::Utf8String => Schema::Str(StrKind::Utf8),
            Builtin::AsciiString | Builtin::Url => Schema::Str(StrKind::Ascii),
            Builtin::Id | Builtin::Uid => Schema::Primitive(Primitive::Address),
            Builtin::Option(inner) => Schema::option(inner.schema()),
        }
    }
}

impl Reified {
    pub fn vector(elem: Reified) -> Self {
        Self::Vector(Box::new(elem))
    }

    /// Descriptor for a framework wrapper with the given tag.
    pub fn builtin(tag: StructTag, kind: Builtin) -> Self {
        Self::Builtin(Arc::new(BuiltinReified { tag, kind }))
    }

    /// Full canonical type tag.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Primitive(p) => TypeTag::Primitive(*p),
            Self::Vector(elem) => TypeTag::vector(elem.type_tag()),
            Self::Builtin(b) => TypeTag::Struct(b.tag.clone()),
            Self::Struct(s) => TypeTag::Struct(s.tag.clone()),
        }
    }

    /// Canonical text of the full type tag.
    pub fn type_name(&self) -> String {
        self.type_tag().to_string()
    }

    pub fn as_struct(&self) -> Option<&Arc<StructReified>> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Composed binary layout.
    pub fn schema(&self) -> Schema {
        match self {
            Self::Primitive(p) => Schema::Primitive(*p),
            Self::Vector(elem) => Schema::vector(elem.schema()),
            Self::Builtin(b) => b.schema(),
            Self::Struct(s) => Schema::Struct(s.schema().clone()),
        }
    }

    pub fn from_bytes(&self, bytes: &[u8]) -> Result<MoveValue> {
        self.schema().decode(bytes)
    }

    pub fn to_bytes(&self, value: &MoveValue) -> Result<Vec<u8>> {
        self.schema().encode(value)
    }

    /// Decode a nested plain-JSON value.
    pub fn from_json_field(&self, field: &Value) -> Result<MoveValue> {
        json::decode_field(self, field)
    }

    /// Encode a value as nested plain JSON.
    pub fn to_json_field(&self, value: &MoveValue) -> Result<Value> {
        json::encode_field(self, value)
    }

    /// Decode a typed-fields node.
    pub fn from_typed_field(&self, node: &TypedNode) -> Result<MoveValue> {
        typed::decode_node(self, node)
    }

    /// Verify that `value` has the shape and type tags of this descriptor.
    pub fn check(&self, value: &MoveValue) -> Result<()> {
        match (self, value) {
            (Self::Primitive(p), v) if primitive_matches(*p, v) => Ok(()),
            (Self::Vector(elem), MoveValue::Vector(items)) => {
                items.iter().try_for_each(|item| elem.check(item))
            }
            (Self::Builtin(b), v) => match (&b.kind, v) {
                (Builtin::Utf8String, MoveValue::String(_)) => Ok(()),
                (Builtin::AsciiString | Builtin::Url, MoveValue::String(s)) if s.is_ascii() => {
                    Ok(())
                }
                (Builtin::Id | Builtin::Uid, MoveValue::Address(_)) => Ok(()),
                (Builtin::Option(inner), MoveValue::Option(opt)) => match opt {
                    Some(v) => inner.check(v),
                    None => Ok(()),
                },
                _ => Err(self.shape_error(value)),
            },
            (Self::Struct(s), MoveValue::Struct(v)) => s.check_struct(v),
            _ => Err(self.shape_error(value)),
        }
    }

    pub(crate) fn shape_error(&self, value: &MoveValue) -> ReifyError {
        ReifyError::MalformedValue(format!(
            "expected {}, found {}",
            self.type_name(),
            value.kind_name()
        ))
    }
}

fn primitive_matches(p: Primitive, value: &MoveValue) -> bool {
    matches!(
        (p, value),
        (Primitive::Bool, MoveValue::Bool(_))
            | (Primitive::U8, MoveValue::U8(_))
            | (Primitive::U16, MoveValue::U16(_))
            | (Primitive::U32, MoveValue::U32(_))
            | (Primitive::U64, MoveValue::U64(_))
            | (Primitive::U128, MoveValue::U128(_))
            | (Primitive::U256, MoveValue::U256(_))
            | (Primitive::Address, MoveValue::Address(_))
    )
}

/// Descriptors compare by their full type tag.
impl PartialEq for Reified {
    fn eq(&self, other: &Self) -> bool {
        self.type_tag() == other.type_tag()
    }
}

impl Eq for Reified {}

impl fmt::Display for Reified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_tag())
    }
}

impl From<Primitive> for Reified {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

// ---------------------------------------------------------------------------
// Type arguments
// ---------------------------------------------------------------------------

/// A concrete type argument.
///
/// Phantom slots only need the tag; structural slots need a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArg {
    Reified(Reified),
    Phantom(TypeTag),
}

impl TypeArg {
    /// Phantom argument from a tag string, for direct instantiation. The tag
    /// is only parsed; [`StructLoader::resolve`](crate::StructLoader::resolve)
    /// instead requires every argument to be registered.
    pub fn phantom(tag: &str) -> Result<Self> {
        Ok(Self::Phantom(tag.parse()?))
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Reified(r) => r.type_tag(),
            Self::Phantom(t) => t.clone(),
        }
    }

    pub fn as_reified(&self) -> Option<&Reified> {
        match self {
            Self::Reified(r) => Some(r),
            Self::Phantom(_) => None,
        }
    }

    pub fn is_phantom(&self) -> bool {
        matches!(self, Self::Phantom(_))
    }

    /// Drop the descriptor, keeping only the tag.
    pub fn into_phantom(self) -> Self {
        match self {
            Self::Reified(r) => Self::Phantom(r.type_tag()),
            phantom => phantom,
        }
    }
}

impl From<Reified> for TypeArg {
    fn from(r: Reified) -> Self {
        Self::Reified(r)
    }
}

impl From<Primitive> for TypeArg {
    fn from(p: Primitive) -> Self {
        Self::Reified(Reified::Primitive(p))
    }
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Closure that builds a descriptor from resolved type arguments.
pub type BuildFn = dyn Fn(&[Reified]) -> Reified + Send + Sync;

/// Something that turns concrete type arguments into a descriptor.
#[derive(Clone)]
pub enum Factory {
    /// A declared struct.
    Struct(Arc<StructDef>),
    /// A hand-written factory; all of its parameters are structural.
    Custom {
        name: Arc<str>,
        arity: usize,
        build: Arc<BuildFn>,
    },
}

impl Factory {
    /// Wrap a closure, canonicalizing `name`.
    pub fn custom<F>(name: &str, arity: usize, build: F) -> Result<Self>
    where
        F: Fn(&[Reified]) -> Reified + Send + Sync + 'static,
    {
        Ok(Self::Custom {
            name: canonical_struct_name(name)?.into(),
            arity,
            build: Arc::new(build),
        })
    }

    /// Canonical bare name.
    pub fn name(&self) -> &str {
        match self {
            Self::Struct(def) => def.name(),
            Self::Custom { name, .. } => name,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Struct(def) => def.arity(),
            Self::Custom { arity, .. } => *arity,
        }
    }

    pub fn is_phantom(&self, index: usize) -> bool {
        match self {
            Self::Struct(def) => def.is_phantom(index),
            Self::Custom { .. } => false,
        }
    }

    /// Build a descriptor.
    ///
    /// # Panics
    ///
    /// Panics if `args.len()` differs from [`Factory::arity`].
    pub fn instantiate(&self, args: Vec<TypeArg>) -> Result<Reified> {
        match self {
            Self::Struct(def) => Ok(Reified::Struct(def.reified(args)?)),
            Self::Custom { name, arity, build } => {
                assert_eq!(
                    args.len(),
                    *arity,
                    "{} expects {} type arguments, got {}",
                    name,
                    arity,
                    args.len()
                );
                let resolved = args
                    .into_iter()
                    .map(|arg| match arg {
                        TypeArg::Reified(r) => Ok(r),
                        TypeArg::Phantom(tag) => Err(ReifyError::mismatch(
                            format!("resolved type argument for {}", name),
                            tag.to_string(),
                        )),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(build(&resolved))
            }
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct(def) => f.debug_tuple("Struct").field(&def.name()).finish(),
            Self::Custom { name, arity, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .field("arity", arity)
                .finish_non_exhaustive(),
        }
    }
}

// ---------------------------------------------------------------------------
// Struct definitions
// ---------------------------------------------------------------------------

/// A declared generic parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub phantom: bool,
}

/// Declared type of a struct field.
#[derive(Debug, Clone)]
pub enum FieldType {
    Primitive(Primitive),
    /// The struct's own type parameter, by index.
    Param(usize),
    Vector(Box<FieldType>),
    /// Another struct or wrapper applied to field types.
    Named {
        factory: Factory,
        args: Vec<FieldType>,
    },
}

impl FieldType {
    pub fn vector(elem: FieldType) -> Self {
        Self::Vector(Box::new(elem))
    }

    pub fn named(factory: Factory, args: Vec<FieldType>) -> Self {
        Self::Named { factory, args }
    }

    /// Field of a declared struct type.
    pub fn of(def: &Arc<StructDef>, args: Vec<FieldType>) -> Self {
        Self::named(Factory::Struct(Arc::clone(def)), args)
    }
}

impl From<Primitive> for FieldType {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

/// A struct field in declaration order.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

/// Static declaration of a struct type.
#[derive(Debug)]
pub struct StructDef {
    name: String,
    type_params: Vec<TypeParam>,
    fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn builder(name: impl Into<String>) -> StructDefBuilder {
        StructDefBuilder::new(name)
    }

    /// Canonical bare name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_params(&self) -> &[TypeParam] {
        &self.type_params
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn is_phantom(&self, index: usize) -> bool {
        self.type_params.get(index).is_some_and(|p| p.phantom)
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Instantiate with concrete type arguments.
    ///
    /// Phantom slots accept either kind of [`TypeArg`] and keep only its
    /// tag. Structural slots require [`TypeArg::Reified`]; a phantom tag
    /// there is a [`ReifyError::TypeMismatch`].
    ///
    /// # Panics
    ///
    /// Panics if the number of arguments differs from the declared arity.
    /// Resolution through a [`StructLoader`](crate::StructLoader) checks
    /// arity first and reports [`ReifyError::ArityMismatch`] instead.
    pub fn reified(self: &Arc<Self>, args: Vec<TypeArg>) -> Result<Arc<StructReified>> {
        assert_eq!(
            args.len(),
            self.type_params.len(),
            "{} expects {} type arguments, got {}",
            self.name,
            self.type_params.len(),
            args.len()
        );

        let mut tags = Vec::with_capacity(args.len());
        let mut structural = Vec::with_capacity(args.len());
        let mut stored = Vec::with_capacity(args.len());
        for (param, arg) in self.type_params.iter().zip(args) {
            tags.push(arg.type_tag());
            if param.phantom {
                structural.push(None);
                stored.push(arg.into_phantom());
                continue;
            }
            match arg {
                TypeArg::Reified(r) => {
                    structural.push(Some(r.clone()));
                    stored.push(TypeArg::Reified(r));
                }
                TypeArg::Phantom(tag) => {
                    return Err(ReifyError::mismatch(
                        format!("resolved type for parameter {} of {}", param.name, self.name),
                        tag.to_string(),
                    ));
                }
            }
        }

        let env = Instantiation {
            owner: &self.name,
            tags: &tags,
            args: &structural,
        };
        let fields = self
            .fields
            .iter()
            .map(|f| Ok((f.name.clone(), env.reify(&f.ty)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Arc::new(StructReified {
            def: Arc::clone(self),
            tag: StructTag::from_canonical(&self.name, tags),
            type_args: stored,
            fields,
            schema: OnceLock::new(),
        }))
    }
}

/// Concrete arguments of one instantiation, used to resolve field types.
struct Instantiation<'a> {
    owner: &'a str,
    tags: &'a [TypeTag],
    args: &'a [Option<Reified>],
}

impl Instantiation<'_> {
    fn tag(&self, ty: &FieldType) -> TypeTag {
        match ty {
            FieldType::Primitive(p) => TypeTag::Primitive(*p),
            FieldType::Param(i) => self.tags[*i].clone(),
            FieldType::Vector(elem) => TypeTag::vector(self.tag(elem)),
            FieldType::Named { factory, args } => TypeTag::Struct(StructTag::from_canonical(
                factory.name(),
                args.iter().map(|a| self.tag(a)).collect(),
            )),
        }
    }

    fn reify(&self, ty: &FieldType) -> Result<Reified> {
        match ty {
            FieldType::Primitive(p) => Ok(Reified::Primitive(*p)),
            FieldType::Param(i) => self.args[*i].clone().ok_or_else(|| {
                ReifyError::invalid_def(self.owner, "phantom parameter used structurally")
            }),
            FieldType::Vector(elem) => Ok(Reified::vector(self.reify(elem)?)),
            FieldType::Named { factory, args } => {
                let mut resolved = Vec::with_capacity(args.len());
                for (j, arg) in args.iter().enumerate() {
                    if factory.is_phantom(j) {
                        resolved.push(TypeArg::Phantom(self.tag(arg)));
                    } else {
                        resolved.push(TypeArg::Reified(self.reify(arg)?));
                    }
                }
                factory.instantiate(resolved)
            }
        }
    }
}

/// Fluent builder for [`StructDef`].
#[derive(Debug)]
pub struct StructDefBuilder {
    name: String,
    type_params: Vec<TypeParam>,
    fields: Vec<FieldDef>,
}

impl StructDefBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Add a structural type parameter.
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(TypeParam {
            name: name.into(),
            phantom: false,
        });
        self
    }

    /// Add a phantom type parameter.
    pub fn phantom_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(TypeParam {
            name: name.into(),
            phantom: true,
        });
        self
    }

    /// Add a field; fields are laid out in the order they are added.
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    /// Validate and freeze the definition.
    pub fn build(self) -> Result<Arc<StructDef>> {
        let name = canonical_struct_name(&self.name)
            .map_err(|e| ReifyError::invalid_def(&self.name, e.to_string()))?;
        // every value occupies at least one byte on the wire
        if self.fields.is_empty() {
            return Err(ReifyError::invalid_def(&name, "struct declares no fields"));
        }

        let mut seen = HashSet::new();
        for param in &self.type_params {
            if !seen.insert(param.name.as_str()) {
                return Err(ReifyError::invalid_def(
                    &name,
                    format!("duplicate type parameter {}", param.name),
                ));
            }
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ReifyError::invalid_def(
                    &name,
                    format!("duplicate field {}", field.name),
                ));
            }
            check_field_type(&name, &self.type_params, &field.name, &field.ty, false)?;
        }

        Ok(Arc::new(StructDef {
            name,
            type_params: self.type_params,
            fields: self.fields,
        }))
    }
}

fn check_field_type(
    owner: &str,
    params: &[TypeParam],
    field: &str,
    ty: &FieldType,
    phantom_ok: bool,
) -> Result<()> {
    match ty {
        FieldType::Primitive(_) => Ok(()),
        FieldType::Param(i) => match params.get(*i) {
            None => Err(ReifyError::invalid_def(
                owner,
                format!("field {} refers to missing type parameter #{}", field, i),
            )),
            Some(p) if p.phantom && !phantom_ok => Err(ReifyError::invalid_def(
                owner,
                format!("phantom parameter {} used structurally in field {}", p.name, field),
            )),
            Some(_) => Ok(()),
        },
        FieldType::Vector(elem) => check_field_type(owner, params, field, elem, phantom_ok),
        FieldType::Named { factory, args } => {
            if args.len() != factory.arity() {
                return Err(ReifyError::invalid_def(
                    owner,
                    format!(
                        "field {}: {} expects {} type arguments, got {}",
                        field,
                        factory.name(),
                        factory.arity(),
                        args.len()
                    ),
                ));
            }
            args.iter().enumerate().try_for_each(|(j, arg)| {
                check_field_type(owner, params, field, arg, phantom_ok || factory.is_phantom(j))
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Struct descriptors
// ---------------------------------------------------------------------------

/// Descriptor of one concrete struct instantiation.
#[derive(Debug)]
pub struct StructReified {
    def: Arc<StructDef>,
    tag: StructTag,
    type_args: Vec<TypeArg>,
    fields: Vec<(String, Reified)>,
    schema: OnceLock<StructSchema>,
}

impl StructReified {
    pub fn definition(&self) -> &Arc<StructDef> {
        &self.def
    }

    /// Bare name (`0x2::coin::Coin`).
    pub fn type_name(&self) -> &str {
        self.tag.name()
    }

    /// Canonical full tag text (`0x2::coin::Coin<0x2::sui::SUI>`).
    pub fn full_type_name(&self) -> String {
        self.tag.to_string()
    }

    pub fn type_tag(&self) -> &StructTag {
        &self.tag
    }

    /// Concrete arguments; phantom slots hold [`TypeArg::Phantom`].
    pub fn type_args(&self) -> &[TypeArg] {
        &self.type_args
    }

    /// Field descriptors in wire order.
    pub fn fields(&self) -> &[(String, Reified)] {
        &self.fields
    }

    /// Struct layout, composed on first use.
    pub fn schema(&self) -> &StructSchema {
        self.schema.get_or_init(|| StructSchema {
            tag: self.tag.clone(),
            fields: self
                .fields
                .iter()
                .map(|(name, r)| FieldSchema::new(name.clone(), r.schema()))
                .collect(),
        })
    }

    /// Whether `tag` names exactly this instantiation.
    pub fn matches_tag(&self, tag: &str) -> bool {
        match tag.parse::<TypeTag>() {
            Ok(TypeTag::Struct(s)) => s == self.tag,
            _ => false,
        }
    }

    /// Build an instance from already-typed field values, given in any
    /// order. Every declared field must be present exactly once.
    pub fn new_value<I, K>(&self, fields: I) -> Result<MoveStruct>
    where
        I: IntoIterator<Item = (K, MoveValue)>,
        K: Into<String>,
    {
        let mut given: Vec<(String, MoveValue)> =
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let mut ordered = Vec::with_capacity(self.fields.len());
        for (name, r) in &self.fields {
            let pos = given.iter().position(|(n, _)| n == name).ok_or_else(|| {
                ReifyError::MalformedValue(format!("{}: missing field {}", self.tag, name))
            })?;
            let (_, value) = given.swap_remove(pos);
            r.check(&value)?;
            ordered.push((name.clone(), value));
        }
        if let Some((extra, _)) = given.first() {
            return Err(ReifyError::MalformedValue(format!(
                "{}: unexpected field {}",
                self.tag, extra
            )));
        }
        Ok(MoveStruct::from_parts(self.tag.clone(), ordered))
    }

    /// Decode from the binary encoding.
    pub fn from_bytes(&self, bytes: &[u8]) -> Result<MoveStruct> {
        self.schema().decode(bytes)
    }

    /// Encode to the binary encoding.
    pub fn to_bytes(&self, value: &MoveStruct) -> Result<Vec<u8>> {
        self.schema().encode(value)
    }

    /// Decode from a typed-fields JSON tree (`{ "type": ..., "fields": ... }`).
    pub fn from_typed_fields(&self, node: &Value) -> Result<MoveStruct> {
        self.from_typed_node(&TypedNode::from_json(node)?)
    }

    pub fn from_typed_node(&self, node: &TypedNode) -> Result<MoveStruct> {
        typed::decode_struct(self, node)
    }

    /// Decode from a plain JSON object with one key per field.
    pub fn from_json_fields(&self, fields: &Value) -> Result<MoveStruct> {
        json::decode_struct_fields(self, fields)
    }

    /// Decode from a JSON envelope carrying `$typeName` and `$typeArgs`.
    pub fn from_json(&self, json: &Value) -> Result<MoveStruct> {
        json::decode_envelope(self, json)
    }

    /// Plain JSON object, one key per field.
    pub fn to_json_field(&self, value: &MoveStruct) -> Result<Value> {
        json::encode_struct_fields(self, value)
    }

    /// JSON envelope with `$typeName`, `$typeArgs` (when generic) and fields.
    pub fn to_json(&self, value: &MoveStruct) -> Result<Value> {
        json::encode_envelope(self, value)
    }

    /// Fetch an object and decode it, checking its type first.
    pub fn fetch(&self, source: &dyn ObjectSource, id: &Address) -> Result<MoveStruct> {
        let raw = source.fetch_object(id)?;
        if !self.matches_tag(&raw.type_tag) {
            return Err(ReifyError::mismatch(self.full_type_name(), raw.type_tag));
        }
        self.from_bytes(&raw.bcs)
    }

    pub(crate) fn check_struct(&self, value: &MoveStruct) -> Result<()> {
        if value.type_tag() != &self.tag {
            return Err(ReifyError::mismatch(
                self.full_type_name(),
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
        for ((name, r), (vname, v)) in self.fields.iter().zip(value.fields()) {
            if name != vname {
                return Err(ReifyError::MalformedValue(format!(
                    "{}: expected field {}, found {}",
                    self.tag, name, vname
                )));
            }
            r.check(v)?;
        }
        Ok(())
    }
}
