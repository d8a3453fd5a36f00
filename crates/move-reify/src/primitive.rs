// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive codec layer.
//!
//! Fixed-width little-endian integers, booleans, 32-byte addresses and
//! ULEB128 length prefixes, plus the lossless textual forms used by JSON:
//! decimal strings for 64-bit and wider integers, `0x`-prefixed lowercase
//! hex for addresses.

use crate::error::{ReifyError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Length of an on-chain address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// Maximum number of bytes a canonical ULEB128 `u32` occupies.
const MAX_ULEB128_BYTES: usize = 5;

/// Built-in primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
}

impl Primitive {
    /// All primitives, in tag order.
    pub const ALL: [Primitive; 8] = [
        Self::Bool,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::U128,
        Self::U256,
        Self::Address,
    ];

    /// Type tag name (`u64`, `address`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::U256 => "u256",
            Self::Address => "address",
        }
    }

    /// Look up a primitive by its tag name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
            Self::U128 => 16,
            Self::U256 | Self::Address => 32,
        }
    }

    /// Whether the JSON form is a decimal string rather than a number.
    pub fn is_wide_integer(&self) -> bool {
        matches!(self, Self::U64 | Self::U128 | Self::U256)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// U256
// ---------------------------------------------------------------------------

/// Unsigned 256-bit integer (four little-endian `u64` limbs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256([u64; 4]);

impl U256 {
    pub const ZERO: U256 = U256([0; 4]);
    pub const MAX: U256 = U256([u64::MAX; 4]);

    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[i * 8..i * 8 + 8]);
            *limb = u64::from_le_bytes(chunk);
        }
        Self(limbs)
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.0.iter().enumerate() {
            out[i * 8..i * 8 + 8].copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    /// `self * mul + add`, or `None` on overflow.
    fn mul_add_small(&self, mul: u64, add: u64) -> Option<Self> {
        let mut out = [0u64; 4];
        let mut carry = add as u128;
        for (i, limb) in self.0.iter().enumerate() {
            let wide = (*limb as u128) * (mul as u128) + carry;
            out[i] = wide as u64;
            carry = wide >> 64;
        }
        if carry != 0 {
            return None;
        }
        Some(Self(out))
    }

    /// Divide by a small divisor, returning quotient and remainder.
    fn div_rem_small(&self, div: u64) -> (Self, u64) {
        let mut out = [0u64; 4];
        let mut rem: u128 = 0;
        for i in (0..4).rev() {
            let cur = (rem << 64) | self.0[i] as u128;
            out[i] = (cur / div as u128) as u64;
            rem = cur % div as u128;
        }
        (Self(out), rem as u64)
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for U256 {
    fn from(v: u64) -> Self {
        Self([v, 0, 0, 0])
    }
}

impl From<u128> for U256 {
    fn from(v: u128) -> Self {
        Self([v as u64, (v >> 64) as u64, 0, 0])
    }
}

impl FromStr for U256 {
    type Err = ReifyError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReifyError::MalformedValue(format!(
                "expected decimal u256, got {:?}",
                s
            )));
        }
        let mut acc = U256::ZERO;
        for b in s.bytes() {
            acc = acc
                .mul_add_small(10, (b - b'0') as u64)
                .ok_or_else(|| ReifyError::MalformedValue(format!("u256 overflow: {}", s)))?;
        }
        Ok(acc)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        // 10^19 is the largest power of ten that fits in a u64.
        const CHUNK: u64 = 10_000_000_000_000_000_000;
        let mut chunks = Vec::new();
        let mut cur = *self;
        while !cur.is_zero() {
            let (q, r) = cur.div_rem_small(CHUNK);
            chunks.push(r);
            cur = q;
        }
        let mut out = String::new();
        for (i, chunk) in chunks.iter().rev().enumerate() {
            if i == 0 {
                out.push_str(&chunk.to_string());
            } else {
                out.push_str(&format!("{:019}", chunk));
            }
        }
        f.write_str(&out)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Fixed 32-byte on-chain address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const ZERO: Address = Address([0; ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Address with the last byte set to `v` (`0x1`, `0x2`, ...).
    pub const fn from_u8(v: u8) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 1] = v;
        Self(bytes)
    }

    /// Full-width form: `0x` followed by 64 lowercase hex digits.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Short form with leading zeros stripped (`0x2`).
    pub fn to_short_string(&self) -> String {
        compress_address(&hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ReifyError;

    /// Accepts `0x`-prefixed or bare hex of up to 64 digits; shorter inputs
    /// are left-padded with zeros.
    fn from_str(s: &str) -> Result<Self> {
        let digits = strip_hex_prefix(s);
        if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
            return Err(ReifyError::MalformedValue(format!(
                "invalid address length: {:?}",
                s
            )));
        }
        let padded = format!("{:0>64}", digits);
        let bytes = hex::decode(padded)
            .map_err(|e| ReifyError::MalformedValue(format!("invalid address {:?}: {}", s, e)))?;
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_literal())
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Canonical short address text: lowercase, no leading zeros, `0x` prefix.
///
/// `0x0000002` and `0x2` both become `0x2`; an all-zero address is `0x0`.
pub fn compress_address(addr: &str) -> String {
    let stripped = strip_hex_prefix(addr).trim_start_matches('0');
    if stripped.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", stripped.to_ascii_lowercase())
    }
}

/// Whether a name segment denotes a numeric address (`0x…`).
pub(crate) fn is_address_literal(segment: &str) -> bool {
    let digits = match segment
        .strip_prefix("0x")
        .or_else(|| segment.strip_prefix("0X"))
    {
        Some(d) => d,
        None => return false,
    };
    !digits.is_empty()
        && digits.len() <= ADDRESS_LENGTH * 2
        && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

// ---------------------------------------------------------------------------
// Binary writer / reader
// ---------------------------------------------------------------------------

/// Append-only little-endian writer.
#[derive(Debug, Default)]
pub(crate) struct BcsWriter {
    buffer: Vec<u8>,
}

impl BcsWriter {
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub(crate) fn write_bool(&mut self, v: bool) {
        self.buffer.push(u8::from(v));
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.buffer.push(v);
    }

    pub(crate) fn write_u16(&mut self, v: u16) {
        self.buffer.extend(&v.to_le_bytes());
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.buffer.extend(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.buffer.extend(&v.to_le_bytes());
    }

    pub(crate) fn write_u128(&mut self, v: u128) {
        self.buffer.extend(&v.to_le_bytes());
    }

    pub(crate) fn write_u256(&mut self, v: &U256) {
        self.buffer.extend(&v.to_le_bytes());
    }

    pub(crate) fn write_address(&mut self, v: &Address) {
        self.buffer.extend(v.as_bytes());
    }

    pub(crate) fn write_len(&mut self, len: usize) -> Result<()> {
        let mut value = u32::try_from(len).map_err(|_| {
            ReifyError::MalformedValue(format!("sequence length {} exceeds u32", len))
        })?;
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return Ok(());
            }
            self.buffer.push(byte | 0x80);
        }
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.buffer.extend(bytes);
        Ok(())
    }
}

/// Cursor over an input buffer.
#[derive(Debug)]
pub(crate) struct BcsReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> BcsReader<'a> {
    pub(crate) fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// Fail if any input is left unread.
    pub(crate) fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ReifyError::MalformedBinary(format!(
                "{} trailing bytes after value",
                n
            ))),
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.read_raw(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub(crate) fn read_raw(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(ReifyError::too_short(count, self.remaining()));
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(ReifyError::MalformedBinary(format!(
                "invalid bool byte 0x{:02x}",
                b
            ))),
        }
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u128(&mut self) -> Result<u128> {
        Ok(u128::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u256(&mut self) -> Result<U256> {
        Ok(U256::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_address(&mut self) -> Result<Address> {
        Ok(Address::new(self.read_array()?))
    }

    /// Read a canonical ULEB128 length that fits in a `u32`.
    pub(crate) fn read_len(&mut self) -> Result<usize> {
        let mut value: u64 = 0;
        for i in 0..MAX_ULEB128_BYTES {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7f) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                if i > 0 && byte == 0 {
                    return Err(ReifyError::MalformedBinary(
                        "non-canonical ULEB128 length".into(),
                    ));
                }
                if value > u32::MAX as u64 {
                    return Err(ReifyError::MalformedBinary(format!(
                        "length {} exceeds u32",
                        value
                    )));
                }
                return Ok(value as usize);
            }
        }
        Err(ReifyError::MalformedBinary("ULEB128 length too long".into()))
    }

    pub(crate) fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_len()?;
        self.read_raw(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        for p in Primitive::ALL {
            assert_eq!(Primitive::from_name(p.name()), Some(p));
        }
        assert_eq!(Primitive::from_name("signer"), None);
        assert!(Primitive::U64.is_wide_integer());
        assert!(!Primitive::U32.is_wide_integer());
        assert_eq!(Primitive::Address.size(), 32);
    }

    #[test]
    fn test_u256_decimal() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let v: U256 = max.parse().unwrap();
        assert_eq!(v, U256::MAX);
        assert_eq!(v.to_string(), max);

        let v: U256 = "340282366920938463463374607431768211456".parse().unwrap();
        assert_eq!(v, U256([0, 0, 1, 0]));
        assert_eq!(U256::from(u128::MAX).to_string(), u128::MAX.to_string());
        assert_eq!(U256::ZERO.to_string(), "0");
        assert_eq!(U256::from(10_000_000_000_000_000_000u128).to_string(), "10000000000000000000");

        assert!("1157920892373161954235709850086879078532699846656405640394575840079131296399360"
            .parse::<U256>()
            .is_err());
        assert!("12a".parse::<U256>().is_err());
        assert!("".parse::<U256>().is_err());
    }

    #[test]
    fn test_u256_ordering_and_bytes() {
        let small = U256::from(u64::MAX);
        let big = U256::from(u128::MAX);
        assert!(small < big);
        assert_eq!(U256::from_le_bytes(big.to_le_bytes()), big);
    }

    #[test]
    fn test_address_parse_and_format() {
        let a: Address = "0x2".parse().unwrap();
        assert_eq!(a, Address::from_u8(2));
        assert_eq!(
            a.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
        assert_eq!(a.to_short_string(), "0x2");

        let b: Address = "0X00000000000000000000000000000000000000000000000000000000000000AB"
            .parse()
            .unwrap();
        assert_eq!(b, Address::from_u8(0xab));

        assert!("0x".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
        assert!(format!("0x{}", "1".repeat(65)).parse::<Address>().is_err());
    }

    #[test]
    fn test_compress_address() {
        assert_eq!(compress_address("0x0000002"), "0x2");
        assert_eq!(compress_address("0x00"), "0x0");
        assert_eq!(compress_address("0xABc"), "0xabc");
        assert!(is_address_literal("0x2"));
        assert!(!is_address_literal("M"));
        assert!(!is_address_literal("0x"));
        assert!(!is_address_literal("0xg1"));
    }

    #[test]
    fn test_uleb128() {
        for len in [0usize, 1, 127, 128, 300, 16_384, u32::MAX as usize] {
            let mut w = BcsWriter::new();
            w.write_len(len).unwrap();
            let bytes = w.into_bytes();
            let mut r = BcsReader::new(&bytes);
            assert_eq!(r.read_len().unwrap(), len);
            r.finish().unwrap();
        }

        let mut w = BcsWriter::new();
        w.write_len(300).unwrap();
        assert_eq!(w.into_bytes(), vec![0xac, 0x02]);

        // 0x80 0x00 encodes zero non-canonically
        assert!(BcsReader::new(&[0x80, 0x00]).read_len().is_err());
        // exceeds u32
        assert!(BcsReader::new(&[0xff, 0xff, 0xff, 0xff, 0x1f]).read_len().is_err());
        // truncated
        assert!(BcsReader::new(&[0x80]).read_len().is_err());
    }

    #[test]
    fn test_reader_short_buffer() {
        let mut r = BcsReader::new(&[1, 2, 3]);
        let err = r.read_u64().unwrap_err();
        assert_eq!(err, ReifyError::too_short(8, 3));
        assert!(BcsReader::new(&[2]).read_bool().is_err());
    }
}
