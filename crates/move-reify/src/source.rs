// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object retrieval.
//!
//! The core never performs I/O. A caller that talks to a node implements
//! [`ObjectSource`] and hands the already-retrieved bytes to the decoder.

use crate::error::{ReifyError, Result};
use crate::primitive::Address;
use std::collections::HashMap;

/// Raw object contents as stored on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    /// Full type tag of the object.
    pub type_tag: String,
    /// Binary encoding of the object's struct value.
    pub bcs: Vec<u8>,
}

/// Supplies raw objects by identifier.
pub trait ObjectSource {
    fn fetch_object(&self, id: &Address) -> Result<RawObject>;
}

/// In-memory object store.
#[derive(Debug, Default)]
pub struct MemoryObjectSource {
    objects: HashMap<Address, RawObject>,
}

impl MemoryObjectSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object, returning the previous one under the same id.
    pub fn insert(
        &mut self,
        id: Address,
        type_tag: impl Into<String>,
        bcs: Vec<u8>,
    ) -> Option<RawObject> {
        self.objects.insert(
            id,
            RawObject {
                type_tag: type_tag.into(),
                bcs,
            },
        )
    }

    pub fn remove(&mut self, id: &Address) -> Option<RawObject> {
        self.objects.remove(id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectSource for MemoryObjectSource {
    fn fetch_object(&self, id: &Address) -> Result<RawObject> {
        self.objects
            .get(id)
            .cloned()
            .ok_or_else(|| ReifyError::ObjectNotFound(id.to_hex_literal()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source() {
        let mut source = MemoryObjectSource::new();
        assert!(source.is_empty());
        let id = Address::from_u8(7);
        assert!(source.insert(id, "0x2::m::S", vec![1, 2]).is_none());
        assert_eq!(source.len(), 1);

        let raw = source.fetch_object(&id).unwrap();
        assert_eq!(raw.type_tag, "0x2::m::S");
        assert_eq!(raw.bcs, vec![1, 2]);

        assert!(matches!(
            source.fetch_object(&Address::from_u8(8)),
            Err(ReifyError::ObjectNotFound(_))
        ));
        assert!(source.remove(&id).is_some());
        assert!(source.is_empty());
    }
}
