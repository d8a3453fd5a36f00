// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-tag parsing and canonicalization.
//!
//! A type tag is either a primitive (`u64`, `address`, ...), `vector<T>`, or a
//! qualified struct name (`0x2::coin::Coin`) optionally followed by generic
//! arguments. Parsing is a two-step process:
//!
//! 1. [`TagNode::parse`] runs a recursive-descent parser over the text and
//!    produces a syntax tree. Commas inside nested `<...>` never split the
//!    outer argument list.
//! 2. [`TypeTag::from_node`] validates the tree and normalizes every address
//!    segment, yielding the canonical form used for all equality checks.
//!
//! The canonical text form has no whitespace and short addresses:
//!
//! ```text
//! 0x00002::coin::Coin< 0x2::sui::SUI >  ->  0x2::coin::Coin<0x2::sui::SUI>
//! ```

use crate::error::{ReifyError, Result};
use crate::primitive::{compress_address, is_address_literal, Primitive};
use std::fmt;
use std::str::FromStr;

/// Name of the built-in generic vector type.
pub const VECTOR: &str = "vector";

/// Deepest generic nesting [`TagNode::parse`] accepts.
pub const MAX_TYPE_DEPTH: usize = 64;

// ---------------------------------------------------------------------------
// Syntax tree
// ---------------------------------------------------------------------------

/// Unvalidated parse tree of a type tag string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNode {
    /// Bare name as written (trimmed).
    pub name: String,
    /// Generic arguments, in order.
    pub args: Vec<TagNode>,
}

impl TagNode {
    /// Parse a full type tag string.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        };
        let node = parser.parse_node(0)?;
        parser.skip_ws();
        if parser.pos != parser.bytes.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(node)
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &str) -> ReifyError {
        ReifyError::bad_tag(self.input, format!("{} at offset {}", reason, self.pos))
    }

    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn parse_node(&mut self, depth: usize) -> Result<TagNode> {
        if depth > MAX_TYPE_DEPTH {
            return Err(self.error("type nesting too deep"));
        }
        self.skip_ws();
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'<' | b'>' | b',') || b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected type name"));
        }
        let name = self.input[start..self.pos].to_string();

        self.skip_ws();
        let mut args = Vec::new();
        if self.peek() == Some(b'<') {
            self.pos += 1;
            loop {
                args.push(self.parse_node(depth + 1)?);
                self.skip_ws();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b'>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '>'")),
                }
            }
        }
        Ok(TagNode { name, args })
    }
}

/// Split a type tag into its bare name and top-level argument strings.
///
/// Arguments are returned as written (trimmed), without canonicalization:
///
/// ```
/// use move_reify::split_type_name;
///
/// let (name, args) = split_type_name("Outer<Inner<u64, address>, vector<u8>>").unwrap();
/// assert_eq!(name, "Outer");
/// assert_eq!(args, vec!["Inner<u64, address>", "vector<u8>"]);
/// ```
pub fn split_type_name(tag: &str) -> Result<(String, Vec<String>)> {
    let tag = tag.trim();
    let open = match tag.find('<') {
        Some(i) => i,
        None => {
            if tag.is_empty() || tag.contains('>') || tag.contains(',') {
                return Err(ReifyError::bad_tag(tag, "invalid bare name"));
            }
            return Ok((tag.to_string(), Vec::new()));
        }
    };
    if !tag.ends_with('>') {
        return Err(ReifyError::bad_tag(tag, "missing closing '>'"));
    }
    let name = tag[..open].trim();
    if name.is_empty() {
        return Err(ReifyError::bad_tag(tag, "empty type name"));
    }
    let inner = &tag[open + 1..tag.len() - 1];

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ReifyError::bad_tag(tag, "unbalanced '>'"))?;
            }
            ',' if depth == 0 => {
                args.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ReifyError::bad_tag(tag, "unbalanced '<'"));
    }
    args.push(inner[start..].trim().to_string());
    if args.iter().any(String::is_empty) {
        return Err(ReifyError::bad_tag(tag, "empty type argument"));
    }
    Ok((name.to_string(), args))
}

// ---------------------------------------------------------------------------
// Canonical tags
// ---------------------------------------------------------------------------

/// Canonicalize a qualified struct name (`0x0002::m::S` -> `0x2::m::S`).
///
/// Only a leading `0x…` segment is treated as an address; named segments
/// such as `M` in `M::S` are kept as written.
pub fn canonical_struct_name(name: &str) -> Result<String> {
    let segments: Vec<&str> = name.split("::").collect();
    if segments.len() < 2 {
        return Err(ReifyError::bad_tag(name, "struct name must be qualified"));
    }
    let mut out = Vec::with_capacity(segments.len());
    for (i, seg) in segments.iter().enumerate() {
        if i == 0 && is_address_literal(seg) {
            out.push(compress_address(seg));
        } else if is_identifier(seg) {
            out.push((*seg).to_string());
        } else {
            return Err(ReifyError::bad_tag(name, format!("invalid segment {:?}", seg)));
        }
    }
    Ok(out.join("::"))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A fully concrete, canonical type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Primitive(Primitive),
    Vector(Box<TypeTag>),
    Struct(StructTag),
}

/// Canonical struct type tag: qualified name plus concrete type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructTag {
    name: String,
    type_args: Vec<TypeTag>,
}

impl StructTag {
    /// Build a struct tag, canonicalizing the name.
    pub fn new(name: &str, type_args: Vec<TypeTag>) -> Result<Self> {
        Ok(Self {
            name: canonical_struct_name(name)?,
            type_args,
        })
    }

    /// Build from a name that is already canonical.
    pub(crate) fn from_canonical(name: &str, type_args: Vec<TypeTag>) -> Self {
        Self {
            name: name.to_string(),
            type_args,
        }
    }

    /// Bare name without type arguments.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_args(&self) -> &[TypeTag] {
        &self.type_args
    }

    /// Canonical text of each type argument.
    pub fn type_arg_strings(&self) -> Vec<String> {
        self.type_args.iter().map(ToString::to_string).collect()
    }
}

impl TypeTag {
    /// `vector<elem>`.
    pub fn vector(elem: TypeTag) -> Self {
        Self::Vector(Box::new(elem))
    }

    /// Validate a parse tree into a canonical tag.
    pub fn from_node(node: &TagNode) -> Result<Self> {
        if let Some(p) = Primitive::from_name(&node.name) {
            if !node.args.is_empty() {
                return Err(ReifyError::ArityMismatch {
                    name: node.name.clone(),
                    expected: 0,
                    got: node.args.len(),
                });
            }
            return Ok(Self::Primitive(p));
        }
        if node.name == VECTOR {
            if node.args.len() != 1 {
                return Err(ReifyError::ArityMismatch {
                    name: VECTOR.to_string(),
                    expected: 1,
                    got: node.args.len(),
                });
            }
            return Ok(Self::vector(Self::from_node(&node.args[0])?));
        }
        let type_args = node
            .args
            .iter()
            .map(Self::from_node)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::Struct(StructTag::new(&node.name, type_args)?))
    }

    /// Bare name: primitive name, `vector`, or the struct's qualified name.
    pub fn name(&self) -> &str {
        match self {
            Self::Primitive(p) => p.name(),
            Self::Vector(_) => VECTOR,
            Self::Struct(s) => s.name(),
        }
    }

    pub fn as_struct(&self) -> Option<&StructTag> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl FromStr for TypeTag {
    type Err = ReifyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_node(&TagNode::parse(s)?)
    }
}

impl From<Primitive> for TypeTag {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.type_args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Vector(elem) => write!(f, "vector<{}>", elem),
            Self::Struct(s) => write!(f, "{}", s),
        }
    }
}

/// Canonical text form of a type tag string.
pub fn canonicalize(tag: &str) -> Result<String> {
    Ok(tag.parse::<TypeTag>()?.to_string())
}

/// Compose a full tag from a bare name and argument tags, no whitespace.
pub fn compose_type_name(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{}<{}>", name, args.join(","))
    }
}
