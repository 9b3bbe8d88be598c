//! Hash functions for both identifier families.
//!
//! Every function lowercases its input first, identifiers are case-insensitive.

use std::{fmt, hash::Hash};

const FNV_OFFSET: u32 = 0x811c9dc5;
const FNV_PRIME: u32 = 0x01000193;

/// 32-bit FNV-1a, used for property names, types and entry keys
pub fn fnv1a(raw: &str) -> u32 {
    raw.to_lowercase()
        .bytes()
        .fold(FNV_OFFSET, |hash, b| (hash ^ b as u32).wrapping_mul(FNV_PRIME))
}

/// 32-bit FNV-1, used for audio event identifiers
pub fn fnv1(raw: &str) -> u32 {
    raw.to_lowercase()
        .bytes()
        .fold(FNV_OFFSET, |hash, b| hash.wrapping_mul(FNV_PRIME) ^ b as u32)
}

/// ELF hash, used for joint names of legacy animations
pub fn elf(raw: &str) -> u32 {
    raw.to_lowercase().bytes().fold(0u32, |hash, b| {
        let hash = (hash << 4).wrapping_add(b as u32);
        let high = hash & 0xF000_0000;
        let hash = if high != 0 { hash ^ (high >> 24) } else { hash };
        hash & !high
    })
}

/// 64-bit xxHash64 with seed 0, used for file paths
pub fn xxh64(raw: &str) -> u64 {
    xxhash_rust::xxh64::xxh64(raw.to_lowercase().as_bytes(), 0)
}

/// A numeric identifier belonging to one of the two hash families
pub trait HashValue:
    Copy + Default + Eq + Ord + Hash + fmt::Debug + fmt::LowerHex + Into<u64>
{
    /// Number of hex digits in the canonical form
    const HEX_DIGITS: usize;

    /// Hash a human readable string
    fn hash_raw(raw: &str) -> Self;

    /// Narrow a table key to this family
    fn from_u64(value: u64) -> Option<Self>;

    /// Parse a hex string of any length that fits
    fn from_hex(hex: &str) -> Option<Self>;

    /// Canonical zero-padded lowercase hex form
    fn to_hex(self) -> String {
        format!("{:0width$x}", self, width = Self::HEX_DIGITS)
    }

    /// Whether `value` is exactly the canonical number of hex digits
    fn is_hash(value: &str) -> bool {
        value.len() == Self::HEX_DIGITS && value.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Treat hex-looking input as a literal hash, hash anything else
    fn raw_or_hex_to_hash(value: &str) -> Self {
        if Self::is_hash(value) {
            if let Some(hash) = Self::from_hex(value) {
                return hash;
            }
        }
        Self::hash_raw(value)
    }
}

impl HashValue for u32 {
    const HEX_DIGITS: usize = 8;

    fn hash_raw(raw: &str) -> Self {
        fnv1a(raw)
    }

    fn from_u64(value: u64) -> Option<Self> {
        u32::try_from(value).ok()
    }

    fn from_hex(hex: &str) -> Option<Self> {
        u32::from_str_radix(hex, 16).ok()
    }
}

impl HashValue for u64 {
    const HEX_DIGITS: usize = 16;

    fn hash_raw(raw: &str) -> Self {
        xxh64(raw)
    }

    fn from_u64(value: u64) -> Option<Self> {
        Some(value)
    }

    fn from_hex(hex: &str) -> Option<Self> {
        u64::from_str_radix(hex, 16).ok()
    }
}

/// Hex form of a raw string for the family `T`
pub fn raw_to_hex<T: HashValue>(raw: &str) -> String {
    T::hash_raw(raw).to_hex()
}
