//! # Runtime Layout Description
//!
//! `PackedInt` fixes its lane geometry at compile time; `LaneLayout` is the
//! runtime face of the same information, used by drivers and tools that pick
//! a packing from configuration before dispatching to a concrete
//! instantiation. Invalid combinations are rejected up front, never clamped.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::masks;

/// Lane geometry of a packed word: `bits` value bits plus one carry bit per
/// lane inside a `word_bits`-wide unsigned word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneLayout {
    /// Value bits per lane (excludes the carry bit)
    pub bits: u32,
    /// Backing word width (8, 16, 32 or 64)
    pub word_bits: u32,
}

impl LaneLayout {
    /// Create a layout with validation.
    pub const fn new(bits: u32, word_bits: u32) -> Result<Self, LayoutError> {
        let layout = Self { bits, word_bits };
        match layout.validate() {
            Ok(()) => Ok(layout),
            Err(e) => Err(e),
        }
    }

    /// Validate the combination.
    pub const fn validate(&self) -> Result<(), LayoutError> {
        if self.bits == 0 {
            return Err(LayoutError::ZeroBitWidth);
        }
        if !matches!(self.word_bits, 8 | 16 | 32 | 64) {
            return Err(LayoutError::UnsupportedWordWidth(self.word_bits));
        }
        if self.bits + 1 > self.word_bits {
            return Err(LayoutError::NoLaneFits {
                bits: self.bits,
                word_bits: self.word_bits,
            });
        }
        Ok(())
    }

    /// Bits occupied by one lane, carry bit included.
    #[inline]
    pub const fn lane_bits(&self) -> u32 {
        self.bits + 1
    }

    /// Number of lanes the word holds.
    #[inline]
    pub const fn lanes(&self) -> u32 {
        self.word_bits / self.lane_bits()
    }

    /// Bits occupied by lanes; the rest is padding.
    #[inline]
    pub const fn used_bits(&self) -> u32 {
        self.lanes() * self.lane_bits()
    }

    /// Unused high bits of the word.
    #[inline]
    pub const fn padding_bits(&self) -> u32 {
        self.word_bits - self.used_bits()
    }

    /// Smallest and largest value a lane can represent.
    #[inline]
    pub const fn lane_range(&self) -> (i64, i64) {
        let half = 1i64 << (self.bits - 1);
        (-half, half - 1)
    }

    /// Value mask of this layout.
    #[inline]
    pub const fn value_mask(&self) -> u128 {
        masks::value_mask(self.lanes(), self.bits)
    }

    /// Carry mask of this layout.
    #[inline]
    pub const fn carry_mask(&self) -> u128 {
        masks::carry_mask(self.lanes(), self.bits)
    }

    /// Sign mask of this layout.
    #[inline]
    pub const fn sign_mask(&self) -> u128 {
        masks::sign_mask(self.lanes(), self.bits)
    }

    /// Padding mask of this layout.
    #[inline]
    pub const fn padding_mask(&self) -> u128 {
        masks::padding_mask(self.lanes(), self.bits, self.word_bits)
    }
}

impl fmt::Display for LaneLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {}-bit lanes in u{} ({} padding bits)",
            self.lanes(),
            self.bits,
            self.word_bits,
            self.padding_bits(),
        )
    }
}

/// Invalid lane geometry.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    #[error("lane bit width must be nonzero")]
    ZeroBitWidth,

    #[error("unsupported backing word width: {0} bits (expected 8, 16, 32 or 64)")]
    UnsupportedWordWidth(u32),

    #[error("no {bits}-bit lane fits in a u{word_bits} word")]
    NoLaneFits { bits: u32, word_bits: u32 },
}
