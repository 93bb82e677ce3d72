//! # Packed Signed Integers
//!
//! `PackedInt<BITS, W>` stores several `BITS`-bit two's-complement integers
//! contiguously in one unsigned word `W`, each lane followed by one carry
//! bit. All lane arithmetic is performed on the whole word at once: the
//! operators never loop over lanes or branch on their contents, so sequences
//! of packed words can be processed with ordinary bulk transforms and
//! reductions.
//!
//! Lane 0 sits at the least-significant end of the word; `encode` maps input
//! index `i` to lane `i`.
//!
//! Overflow never panics. An add, subtract or negate whose true result does
//! not fit a lane wraps like ordinary two's-complement arithmetic and sets
//! that lane's carry bit. Carry bits are sticky: once set on an operand they
//! survive every subsequent operation.
//!
//! ```
//! use swarint_core::PackedInt;
//!
//! let x = PackedInt::<7, u16>::encode([5, -3]);
//! let y = PackedInt::<7, u16>::encode([1, 4]);
//! let z = x + y;
//! assert_eq!(z.decode::<2>(), [6, 1]);
//! assert_eq!(z.carry_view(), 0);
//! ```

use core::fmt;
use core::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::layout::LaneLayout;
use crate::masks;
use crate::word::{SignedWord, Word};

/// Several `BITS`-bit signed integers packed into one `W`, one carry bit per
/// lane.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct PackedInt<const BITS: u32, W: Word> {
    raw: W,
}

impl<const BITS: u32, W: Word> PackedInt<BITS, W> {
    /// Number of lanes the backing word holds.
    pub const LANES: u32 = W::BITS / (BITS + 1);

    // Rejects invalid geometry at monomorphization; referenced by every
    // constructor.
    const LAYOUT_OK: () = {
        assert!(BITS > 0, "lane bit width must be nonzero");
        assert!(
            W::BITS / (BITS + 1) >= 1,
            "backing word too small for a single lane"
        );
    };

    /// Value bits of every lane.
    pub const VALUE_MASK: u128 = masks::value_mask(Self::LANES, BITS);

    /// Carry bit of every lane.
    pub const CARRY_MASK: u128 = masks::carry_mask(Self::LANES, BITS);

    /// Sign bit of every lane.
    pub const SIGN_MASK: u128 = masks::sign_mask(Self::LANES, BITS);

    /// Unused high bits; always zero in a valid instance.
    pub const PADDING_MASK: u128 = masks::padding_mask(Self::LANES, BITS, W::BITS);

    const LANE_LSB_MASK: u128 = masks::lane_lsb_mask(Self::LANES, BITS);

    #[inline(always)]
    fn mask(m: u128) -> W {
        W::from_u128(m)
    }

    /// All lanes zero, no carries.
    #[inline]
    pub fn new() -> Self {
        let _ = Self::LAYOUT_OK;
        Self { raw: W::ZERO }
    }

    #[inline(always)]
    pub(crate) fn from_raw(raw: W) -> Self {
        let _ = Self::LAYOUT_OK;
        Self { raw }
    }

    #[inline(always)]
    pub(crate) fn raw(self) -> W {
        self.raw
    }

    /// Runtime description of this instantiation's geometry.
    pub fn layout() -> LaneLayout {
        LaneLayout {
            bits: BITS,
            word_bits: W::BITS,
        }
    }

    /// Pack up to `LANES` integers, input index `i` into lane `i`.
    ///
    /// Each input is truncated to its low `BITS` bits (wraparound, not
    /// saturation). Unfilled lanes and all carry bits are zero.
    pub fn encode<const N: usize>(values: [i64; N]) -> Self {
        let _ = Self::LAYOUT_OK;
        assert!(N as u32 <= Self::LANES, "more inputs than lanes");

        let lane_values = (1u128 << BITS) - 1;
        let mut raw = 0u128;
        let mut i = N;
        while i > 0 {
            i -= 1;
            raw <<= BITS + 1;
            raw |= (values[i] as u128) & lane_values;
        }
        Self { raw: W::from_u128(raw) }
    }

    /// Overwrite a single lane, truncating the input to `BITS` bits. Other
    /// lanes and all carry bits are left untouched.
    pub fn set(&mut self, lane: usize, value: i64) {
        assert!((lane as u32) < Self::LANES, "lane index out of range");

        let shift = lane as u32 * (BITS + 1);
        let lane_values = ((1u128 << BITS) - 1) << shift;
        let raw = (self.raw.to_u128() & !lane_values) | (((value as u128) << shift) & lane_values);
        self.raw = W::from_u128(raw);
    }

    /// Read one lane, sign-extended to the backing word's signed twin.
    #[inline]
    pub fn get(&self, lane: usize) -> W::Signed {
        assert!((lane as u32) < Self::LANES, "lane index out of range");

        let lane_values = Self::mask((1u128 << BITS) - 1);
        let val = (self.raw >> (lane as u32 * (BITS + 1))) & lane_values;

        // Branchless sign extension: the lane sign bit, minus one and
        // inverted, replicates the sign across every bit above the lane.
        let ext = (!((val >> (BITS - 1)).wrapping_sub(W::ONE))) << BITS;
        (val | ext).to_signed()
    }

    /// Unpack the first `N` lanes, in encode order.
    pub fn decode<const N: usize>(&self) -> [i64; N] {
        assert!(N as u32 <= Self::LANES, "more outputs than lanes");

        let mut out = [0i64; N];
        for (lane, slot) in out.iter_mut().enumerate() {
            *slot = self.get(lane).to_i64();
        }
        out
    }

    /// The value bits only, carries and padding stripped.
    #[inline]
    pub fn value_view(&self) -> W {
        self.raw & Self::mask(Self::VALUE_MASK)
    }

    /// The carry bits only.
    #[inline]
    pub fn carry_view(&self) -> W {
        self.raw & Self::mask(Self::CARRY_MASK)
    }

    /// Every lane at the smallest representable value, no carries.
    #[inline]
    pub fn min_value() -> Self {
        Self::from_raw(Self::mask(Self::SIGN_MASK))
    }

    /// Every lane at the largest representable value, no carries.
    #[inline]
    pub fn max_value() -> Self {
        Self::from_raw(Self::mask(Self::VALUE_MASK & !Self::SIGN_MASK))
    }

    /// Per-lane maximum of two packed words, without branching.
    ///
    /// Both lane orders of subtraction are formed and their sign bits
    /// inspected; the carry bits of the differences correct for the one case
    /// plain sign inspection gets wrong, negation of the minimum value. The
    /// winning lane is blended in whole, carry bit included.
    pub fn max(self, rhs: Self) -> Self {
        let value_mask = Self::mask(Self::VALUE_MASK);
        let sign_mask = Self::mask(Self::SIGN_MASK);

        let diff_a = Self::from_raw(self.value_view()) + (-Self::from_raw(rhs.value_view()));
        let diff_b = Self::from_raw(rhs.value_view()) + (-Self::from_raw(self.value_view()));

        let carries_at_sign_a = diff_a.carry_view() >> 1;
        let carries_at_sign_b = diff_b.carry_view() >> 1;

        // Lane LSB = 1 where lhs < rhs
        let signs = (((diff_a.raw & sign_mask) & !carries_at_sign_a)
            | ((diff_b.raw & sign_mask) & carries_at_sign_b))
            >> (BITS - 1);

        // Blocks of ones over the lanes where lhs wins
        let mut select = signs.wrapping_add(value_mask) & value_mask;
        select = select | ((select & sign_mask) << 1);

        Self::from_raw((self.raw & select) | (rhs.raw & !select))
    }

    /// Maximum lane value of this word, sign-extended.
    pub fn max_element(&self) -> W::Signed {
        let mut result = self.get(0);
        for lane in 1..Self::LANES as usize {
            // branch-free two-integer max
            let diff = result.wrapping_sub(self.get(lane));
            result = result.wrapping_sub(diff & (diff >> (W::Signed::BITS - 1)));
        }
        result
    }

    /// Wrapping signed sum of every lane. The accumulator is only as wide as
    /// the backing word; widen first if that is not enough.
    pub fn sum(&self) -> W::Signed {
        let mut acc = W::Signed::from_i64(0);
        for lane in 0..Self::LANES as usize {
            acc = acc.wrapping_add(self.get(lane));
        }
        acc
    }
}

impl<const BITS: u32, W: Word> Add for PackedInt<BITS, W> {
    type Output = Self;

    /// Per-lane wrapping addition with overflow recorded in the carry bits.
    #[inline]
    fn add(self, rhs: Self) -> Self {
        let value_mask = Self::mask(Self::VALUE_MASK);
        let sign_mask = Self::mask(Self::SIGN_MASK);

        // Add the value views, not the raw words: a raw carry bit would
        // bleed into the next lane's least-significant bit.
        let lv = self.value_view();
        let rv = rhs.value_view();
        let sum = lv.wrapping_add(rv);

        // Signed overflow iff the operands agree in sign and the sum does
        // not, checked for all lanes at once on the sign bits.
        let overflow = ((lv ^ sum) & (rv ^ sum)) & sign_mask;

        let raw = (sum & value_mask) | (overflow << 1) | self.carry_view() | rhs.carry_view();
        Self::from_raw(raw)
    }
}

impl<const BITS: u32, W: Word> Neg for PackedInt<BITS, W> {
    type Output = Self;

    /// Per-lane two's-complement negation.
    ///
    /// The minimum lane value has no positive counterpart: its bits come
    /// back unchanged and the lane's carry bit is set instead.
    #[inline]
    fn neg(self) -> Self {
        let value_mask = Self::mask(Self::VALUE_MASK);
        let carry_mask = Self::mask(Self::CARRY_MASK);
        let sign_mask = Self::mask(Self::SIGN_MASK);
        let lane_ones = Self::mask(Self::LANE_LSB_MASK);

        let v = self.value_view();
        let negated = (!v) & value_mask;

        // Per-lane +1; a lane overflowing its value bits (only v == 0 does)
        // spills into its own carry bit, never the next lane.
        let minus = negated.wrapping_add(lane_ones);

        // Negation must flip the sign unless it overflowed. An unchanged
        // sign is an error, except where the +1 carry-out already accounts
        // for it (the zero lane).
        let no_sign_change = ((!(v ^ minus)) & sign_mask) << 1;
        let errors = no_sign_change ^ (minus & carry_mask);

        Self::from_raw((minus & value_mask) | errors | self.carry_view())
    }
}

impl<const BITS: u32, W: Word> Sub for PackedInt<BITS, W> {
    type Output = Self;

    /// `a - b` as `a + (-b)`, with carries the negation manufactured on its
    /// own (minimum-value lanes of `b`) masked back out.
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let carry_mask = Self::mask(Self::CARRY_MASK);

        let negated = -rhs;
        let artifacts = negated.carry_view().wrapping_sub(rhs.carry_view()) & carry_mask;

        let sum = self + negated;
        let raw = (sum.raw & !artifacts) | self.carry_view() | rhs.carry_view();
        Self::from_raw(raw)
    }
}

impl<const BITS: u32, W: Word> fmt::Debug for PackedInt<BITS, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedInt<{}, u{}>[", BITS, W::BITS)?;
        for lane in 0..Self::LANES as usize {
            if lane > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.get(lane).to_i64())?;
        }
        write!(f, "; carries: {:#x}]", self.carry_view().to_u128())
    }
}

impl<const BITS: u32, W: Word> fmt::Display for PackedInt<BITS, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.raw.to_u128())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    type FourInts7x32 = PackedInt<7, u32>;

    fn arb_lanes() -> impl Strategy<Value = [i64; 4]> {
        prop::array::uniform4(-64i64..64)
    }

    fn arb_small_lanes() -> impl Strategy<Value = [i64; 4]> {
        // half range, so sums and differences of two values stay in range
        prop::array::uniform4(-32i64..32)
    }

    proptest! {
        #[test]
        fn test_encode_decode_round_trip(xs in arb_lanes()) {
            let v = FourInts7x32::encode(xs);
            prop_assert_eq!(v.decode::<4>(), xs);
            prop_assert_eq!(v.carry_view(), 0);
        }

        #[test]
        fn test_add_commutative(xs in arb_lanes(), ys in arb_lanes()) {
            let a = FourInts7x32::encode(xs);
            let b = FourInts7x32::encode(ys);
            prop_assert_eq!(a + b, b + a);
        }

        #[test]
        fn test_add_matches_scalar(xs in arb_small_lanes(), ys in arb_small_lanes()) {
            let sum = FourInts7x32::encode(xs) + FourInts7x32::encode(ys);
            let expected: Vec<i64> = xs.iter().zip(&ys).map(|(x, y)| x + y).collect();
            prop_assert_eq!(sum.decode::<4>().to_vec(), expected);
            prop_assert_eq!(sum.carry_view(), 0);
        }

        #[test]
        fn test_sub_matches_scalar(xs in arb_small_lanes(), ys in arb_small_lanes()) {
            let out = FourInts7x32::encode(xs) - FourInts7x32::encode(ys);
            let expected: Vec<i64> = xs.iter().zip(&ys).map(|(x, y)| x - y).collect();
            prop_assert_eq!(out.decode::<4>().to_vec(), expected);
            prop_assert_eq!(out.carry_view(), 0);
        }

        #[test]
        fn test_max_commutative(xs in arb_lanes(), ys in arb_lanes()) {
            let a = FourInts7x32::encode(xs);
            let b = FourInts7x32::encode(ys);
            prop_assert_eq!(a.max(b), b.max(a));
        }

        #[test]
        fn test_max_matches_scalar(xs in arb_lanes(), ys in arb_lanes()) {
            let m = FourInts7x32::encode(xs).max(FourInts7x32::encode(ys));
            let expected: Vec<i64> = xs.iter().zip(&ys).map(|(x, y)| *x.max(y)).collect();
            prop_assert_eq!(m.decode::<4>().to_vec(), expected);
        }

        #[test]
        fn test_max_element_matches_scalar(xs in arb_lanes()) {
            let m = FourInts7x32::encode(xs).max_element();
            prop_assert_eq!(i64::from(m), *xs.iter().max().unwrap());
        }

        #[test]
        fn test_sum_matches_scalar(xs in arb_lanes()) {
            let s = FourInts7x32::encode(xs).sum();
            prop_assert_eq!(i64::from(s), xs.iter().sum::<i64>());
        }

        #[test]
        fn test_neg_involution_off_minimum(xs in prop::array::uniform4(-63i64..64)) {
            let v = FourInts7x32::encode(xs);
            prop_assert_eq!(-(-v), v);
        }
    }
}
