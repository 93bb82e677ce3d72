//! # Width Conversions
//!
//! Widening re-packs the lanes of a `PackedInt<BITS, W>` into
//! `PackedInt<2 * BITS + 1, W::Wider>`: the word doubles, each lane doubles
//! (plus the bit freed by dropping every other carry), and the lane count
//! stays the same. Narrowing is the inverse. Both directions shuffle whole
//! lanes with a handful of word-wide masks and shifts; no lane is extracted.
//!
//! The lane permutation: even narrow lanes already sit at their wide lane
//! offset (narrow lane `2k` occupies the low half of wide lane `k`), so only
//! the odd narrow lanes move, in one block shift to the upper half of the
//! word. Widening therefore maps narrow lane `2k` to wide lane `k` and
//! narrow lane `2k + 1` to wide lane `k + ceil(lanes / 2)`; narrowing maps
//! them back.
//!
//! Width pairs that do not satisfy `wide = 2 * narrow + 1`, or storages with
//! no twice-as-wide (or half-as-wide) twin, are rejected at compile time.

use core::marker::PhantomData;
use core::ops::Add;

use crate::masks::{self, lane_spread};
use crate::packed::PackedInt;
use crate::word::Word;

/// Widen one packed word: narrow `bits`-bit lanes to `2 * bits + 1`-bit lanes
/// in a word twice as wide. Carry bits do not survive.
pub(crate) const fn promote(raw: u128, bits: u32, lanes: u32) -> u128 {
    let narrow_stride = bits + 1;
    let wide_bits = 2 * bits + 1;
    let wide_stride = wide_bits + 1;

    let lane_values = (1u128 << bits) - 1;
    let even_mask = lane_spread(lane_values, (lanes + 1) / 2, 2 * narrow_stride);
    let odd_mask = lane_spread(lane_values, lanes / 2, 2 * narrow_stride) << narrow_stride;

    // One block shift moves every odd narrow lane to the upper half of the
    // wide word, landing each on a wide lane boundary.
    let odd_blocks = if lanes % 2 == 0 { lanes - 1 } else { lanes };
    let odd_shift = odd_blocks * narrow_stride;

    let mut v = (raw & even_mask) | ((raw & odd_mask) << odd_shift);

    // Sign extension without looking at any sign bit: filling the upper half
    // of every lane with ones and adding makes negative lanes overflow back
    // to their two's-complement wide form.
    let sign_fill = lane_spread((((1u128 << narrow_stride) - 1) << bits), lanes, wide_stride);
    v = v.wrapping_add(sign_fill);

    // Positive lanes did not overflow; add the inverted bit above the narrow
    // value to push the fill out of them too.
    let positive_fix = lane_spread(1u128 << bits, lanes, wide_stride);
    v = v.wrapping_add((((!v) & masks::value_mask(lanes, wide_bits)) << 1) & positive_fix);

    v & masks::value_mask(lanes, wide_bits)
}

/// Narrow one packed word: `wide_bits`-bit lanes to `(wide_bits - 1) / 2`-bit
/// lanes in a word half as wide. Each lane keeps its low `narrow_bits + 1`
/// bits, so a value needing the extra bit lands it in the narrow carry.
pub(crate) const fn demote(raw: u128, wide_bits: u32, lanes: u32, wide_word_bits: u32) -> u128 {
    let wide_stride = wide_bits + 1;
    let narrow_bits = (wide_bits - 1) / 2;
    let narrow_stride = wide_stride / 2;

    let truncated = raw & masks::truncation_mask(lanes, wide_bits, narrow_bits);

    // Even wide lanes form the lower block; the extra lane of an odd count
    // belongs to it.
    let lower_lanes = (lanes + 1) / 2;
    let lower = (1u128 << (lower_lanes * wide_stride)) - 1;
    let upper = masks::word_mask(wide_word_bits)
        & !lower
        & !masks::padding_mask(lanes, wide_bits, wide_word_bits);

    let upper_blocks = if lanes % 2 == 0 { lanes - 1 } else { lanes };
    let upper_shift = upper_blocks * narrow_stride;

    (truncated & lower) | ((truncated & upper) >> upper_shift)
}

// Compile-time guards for the conversion routes, checked at monomorphization.

struct WidthPair<const NARROW: u32, const WIDE: u32>;

impl<const NARROW: u32, const WIDE: u32> WidthPair<NARROW, WIDE> {
    const WIDENS: () = assert!(
        WIDE == 2 * NARROW + 1,
        "wide lanes must hold twice the narrow bits plus one"
    );
}

struct WidenStorage<W: Word>(PhantomData<W>);

impl<W: Word> WidenStorage<W> {
    const VALID: () = assert!(
        W::Wider::BITS == 2 * W::BITS,
        "backing word has no twice-as-wide storage"
    );
}

struct NarrowStorage<W: Word>(PhantomData<W>);

impl<W: Word> NarrowStorage<W> {
    const VALID: () = assert!(
        2 * W::Half::BITS == W::BITS,
        "backing word has no half-as-wide storage"
    );
}

impl<const BITS: u32, W: Word> PackedInt<BITS, W> {
    /// Re-pack into twice-as-wide lanes in a twice-as-wide word, preserving
    /// every lane value and the lane count. Carry bits are dropped; flagged
    /// lanes carry over their wrapped value only.
    pub fn widen<const WIDE_BITS: u32>(self) -> PackedInt<WIDE_BITS, W::Wider> {
        let _ = WidthPair::<BITS, WIDE_BITS>::WIDENS;
        let _ = WidenStorage::<W>::VALID;

        let raw = promote(self.raw().to_u128(), BITS, Self::LANES);
        PackedInt::from_raw(<W::Wider as Word>::from_u128(raw))
    }

    /// Re-pack into half-as-wide lanes in a half-as-wide word. Each lane is
    /// truncated to its low `NARROW_BITS + 1` bits, with the top surviving
    /// bit landing in the narrow carry. In-range lane values come back
    /// exact; the carry bit is set for any lane whose wide bit `NARROW_BITS`
    /// was one, which includes every negative lane.
    pub fn narrow<const NARROW_BITS: u32>(self) -> PackedInt<NARROW_BITS, W::Half> {
        let _ = WidthPair::<NARROW_BITS, BITS>::WIDENS;
        let _ = NarrowStorage::<W>::VALID;

        let raw = demote(self.raw().to_u128(), BITS, Self::LANES, W::BITS);
        PackedInt::from_raw(<W::Half as Word>::from_u128(raw))
    }
}

// `From` and mixed-width `Add` for the supported routes, so reductions can
// accumulate at double width while streaming narrow operands.
macro_rules! impl_widening {
    ($($nb:literal x $nw:ty => $wb:literal x $ww:ty);* $(;)?) => {$(
        impl From<PackedInt<$nb, $nw>> for PackedInt<$wb, $ww> {
            fn from(narrow: PackedInt<$nb, $nw>) -> Self {
                narrow.widen::<$wb>()
            }
        }

        impl Add<PackedInt<$nb, $nw>> for PackedInt<$wb, $ww> {
            type Output = Self;

            fn add(self, rhs: PackedInt<$nb, $nw>) -> Self {
                self + Self::from(rhs)
            }
        }
    )*};
}

impl_widening! {
    3 x u8 => 7 x u16;
    7 x u16 => 15 x u32;
    15 x u32 => 31 x u64;
}
