//! # Backing Word Abstraction
//!
//! Packed values live inside one unsigned machine word. This module provides
//! the `Word` trait over the supported storages (u8/u16/u32/u64) together
//! with their signed twins, so the arithmetic engine can be written once over
//! whole-word bitwise operations.

use core::fmt::Debug;
use core::hash::Hash;
use core::ops::{BitAnd, BitOr, BitXor, Not, Shl, Shr};

use serde::de::DeserializeOwned;
use serde::Serialize;

mod sealed {
    pub trait Sealed {}

    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
    impl Sealed for i8 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// Signed twin of a backing word. Lane values extracted from a packed word
/// are returned at this width, fully sign-extended.
pub trait SignedWord:
    sealed::Sealed
    + Copy
    + Clone
    + Debug
    + Eq
    + Ord
    + Hash
    + Default
    + BitAnd<Output = Self>
    + Shr<u32, Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Width in bits
    const BITS: u32;

    /// Wrapping addition
    fn wrapping_add(self, rhs: Self) -> Self;

    /// Wrapping subtraction
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// Truncating conversion from i64
    fn from_i64(val: i64) -> Self;

    /// Sign-extending conversion to i64
    fn to_i64(self) -> i64;
}

/// Unsigned backing storage for a packed word.
///
/// `Wider` follows the 8 -> 16 -> 32 -> 64 chain and saturates at 64 bits;
/// `Half` walks the chain downwards and saturates at 8 bits. The saturated
/// endpoints only exist to keep the associated types total: conversions that
/// would need them are rejected by const assertions at monomorphization.
pub trait Word:
    sealed::Sealed
    + Copy
    + Clone
    + Debug
    + Eq
    + Hash
    + Default
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Width in bits
    const BITS: u32;

    /// All-zero word
    const ZERO: Self;

    /// The word holding 1
    const ONE: Self;

    /// Signed type of the same width
    type Signed: SignedWord;

    /// Next wider storage (saturating at u64)
    type Wider: Word;

    /// Next narrower storage (saturating at u8)
    type Half: Word;

    /// Truncating conversion from u128
    fn from_u128(val: u128) -> Self;

    /// Zero-extending conversion to u128
    fn to_u128(self) -> u128;

    /// Wrapping addition
    fn wrapping_add(self, rhs: Self) -> Self;

    /// Wrapping subtraction
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// Reinterpret the bits as the signed twin
    fn to_signed(self) -> Self::Signed;
}

macro_rules! impl_signed_word {
    ($t:ty) => {
        impl SignedWord for $t {
            const BITS: u32 = <$t>::BITS;

            #[inline(always)]
            fn wrapping_add(self, rhs: $t) -> $t {
                <$t>::wrapping_add(self, rhs)
            }

            #[inline(always)]
            fn wrapping_sub(self, rhs: $t) -> $t {
                <$t>::wrapping_sub(self, rhs)
            }

            #[inline(always)]
            fn from_i64(val: i64) -> $t {
                val as $t
            }

            #[inline(always)]
            fn to_i64(self) -> i64 {
                self as i64
            }
        }
    };
}

impl_signed_word!(i8);
impl_signed_word!(i16);
impl_signed_word!(i32);
impl_signed_word!(i64);

macro_rules! impl_word {
    ($t:ty, $signed:ty, $wider:ty, $half:ty) => {
        impl Word for $t {
            const BITS: u32 = <$t>::BITS;
            const ZERO: $t = 0;
            const ONE: $t = 1;

            type Signed = $signed;
            type Wider = $wider;
            type Half = $half;

            #[inline(always)]
            fn from_u128(val: u128) -> $t {
                val as $t
            }

            #[inline(always)]
            fn to_u128(self) -> u128 {
                self as u128
            }

            #[inline(always)]
            fn wrapping_add(self, rhs: $t) -> $t {
                <$t>::wrapping_add(self, rhs)
            }

            #[inline(always)]
            fn wrapping_sub(self, rhs: $t) -> $t {
                <$t>::wrapping_sub(self, rhs)
            }

            #[inline(always)]
            fn to_signed(self) -> $signed {
                self as $signed
            }
        }
    };
}

impl_word!(u8, i8, u16, u8);
impl_word!(u16, i16, u32, u8);
impl_word!(u32, i32, u64, u16);
impl_word!(u64, i64, u64, u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wider_chain() {
        assert_eq!(<u8 as Word>::Wider::BITS, 16);
        assert_eq!(<u16 as Word>::Wider::BITS, 32);
        assert_eq!(<u32 as Word>::Wider::BITS, 64);
        // saturates at 64
        assert_eq!(<u64 as Word>::Wider::BITS, 64);
    }

    #[test]
    fn test_half_chain() {
        assert_eq!(<u64 as Word>::Half::BITS, 32);
        assert_eq!(<u32 as Word>::Half::BITS, 16);
        assert_eq!(<u16 as Word>::Half::BITS, 8);
        // saturates at 8
        assert_eq!(<u8 as Word>::Half::BITS, 8);
    }

    #[test]
    fn test_u128_round_trip() {
        assert_eq!(u8::from_u128(0x1FF), 0xFF);
        assert_eq!(u16::from_u128(0xDEAD_BEEF), 0xBEEF);
        assert_eq!(Word::to_u128(0xDEAD_BEEF_u32), 0xDEAD_BEEF);
    }

    #[test]
    fn test_signed_reinterpret() {
        assert_eq!(0xFF_u8.to_signed(), -1);
        assert_eq!(0x80_u8.to_signed(), -128);
        assert_eq!(0x7F_u8.to_signed(), 127);
        assert_eq!(<i8 as SignedWord>::from_i64(-1), -1i8);
        assert_eq!(<i8 as SignedWord>::from_i64(0x1FF).to_i64(), -1);
    }
}
