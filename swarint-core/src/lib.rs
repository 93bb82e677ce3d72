//! # SWAR Packed Signed Integers
//!
//! Small signed integers packed several to a machine word, with word-level
//! arithmetic that processes every lane in one pass.
//!
//! ## Key Features
//! - `BITS`-bit two's-complement lanes plus one carry bit each, packed into
//!   u8/u16/u32/u64
//! - Branchless per-lane add, subtract, negate, pairwise max
//! - Sticky carry bits record which lanes ever overflowed
//! - Horizontal sum and max over the lanes of a word
//! - Width conversions between `(BITS, W)` and `(2 * BITS + 1, W::Wider)`
//!   that never unpack a lane
//! - Invalid layouts rejected at compile time
//!
//! ```
//! use swarint_core::Packed7x32;
//!
//! let a = Packed7x32::encode([1, -2, 3, -4]);
//! let b = Packed7x32::encode([10, 20, 30, 40]);
//! assert_eq!((a + b).decode::<4>(), [11, 18, 33, 36]);
//! assert_eq!((a + b).carry_view(), 0);
//! ```

pub mod layout;
pub mod masks;
pub mod packed;
pub mod word;

mod convert;

pub use layout::{LaneLayout, LayoutError};
pub use packed::PackedInt;
pub use word::{SignedWord, Word};

/// Two 3-bit lanes in a byte
pub type Packed3x8 = PackedInt<3, u8>;

/// Two 7-bit lanes in a u16
pub type Packed7x16 = PackedInt<7, u16>;

/// Four 7-bit lanes in a u32
pub type Packed7x32 = PackedInt<7, u32>;

/// Two 15-bit lanes in a u32
pub type Packed15x32 = PackedInt<15, u32>;

/// Four 15-bit lanes in a u64
pub type Packed15x64 = PackedInt<15, u64>;

/// Two 31-bit lanes in a u64
pub type Packed31x64 = PackedInt<31, u64>;
