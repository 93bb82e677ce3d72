//! # Lane Mask Derivation
//!
//! Every packed layout is described by four structural masks over the backing
//! word: the value bits of every lane, the carry bit of every lane, the sign
//! bit of every lane and the unused padding bits at the top of the word. The
//! masks are pairwise disjoint and together cover the whole word.
//!
//! All functions here are `const fn`s over `(lanes, bits)` in the `u128`
//! domain; callers fold them into associated constants per instantiation, so
//! no mask is ever derived on a hot path.
//!
//! ## Layout (3-bit lanes in a u8)
//!
//! ```text
//! bit:      7   6 5 4   3   2 1 0
//!         [ c1 | v v v | c0 | v v v ]
//! value:    0b0111_0111
//! carry:    0b1000_1000
//! sign:     0b0100_0100
//! padding:  0b0000_0000
//! ```

/// Repeat `pattern` once per lane at the given stride.
pub(crate) const fn lane_spread(pattern: u128, lanes: u32, stride: u32) -> u128 {
    let mut acc = 0u128;
    let mut lane = 0;
    while lane < lanes {
        acc |= pattern << (lane * stride);
        lane += 1;
    }
    acc
}

/// All ones over the low `word_bits` bits.
pub const fn word_mask(word_bits: u32) -> u128 {
    (1u128 << word_bits) - 1
}

/// The `bits` value bits of every lane.
pub const fn value_mask(lanes: u32, bits: u32) -> u128 {
    lane_spread((1u128 << bits) - 1, lanes, bits + 1)
}

/// The single carry bit of every lane (bit `bits` within the lane).
pub const fn carry_mask(lanes: u32, bits: u32) -> u128 {
    lane_spread(1u128 << bits, lanes, bits + 1)
}

/// The sign bit of every lane (bit `bits - 1` within the lane).
pub const fn sign_mask(lanes: u32, bits: u32) -> u128 {
    lane_spread(1u128 << (bits - 1), lanes, bits + 1)
}

/// The least-significant value bit of every lane. Adding this constant to a
/// word increments every lane at once.
pub const fn lane_lsb_mask(lanes: u32, bits: u32) -> u128 {
    lane_spread(1, lanes, bits + 1)
}

/// Unused high bits of a `word_bits`-wide word; must always read as zero.
pub const fn padding_mask(lanes: u32, bits: u32, word_bits: u32) -> u128 {
    let used = lanes * (bits + 1);
    if used >= word_bits {
        0
    } else {
        word_mask(word_bits) & !word_mask(used)
    }
}

/// Per lane of an `old_bits` layout, the `new_bits + 1` low bits surviving a
/// narrowing to `new_bits`-bit lanes (the extra bit lands in the narrow
/// carry position).
pub const fn truncation_mask(lanes: u32, old_bits: u32, new_bits: u32) -> u128 {
    lane_spread((1u128 << (new_bits + 1)) - 1, lanes, old_bits + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_lane_masks() {
        // one 6-bit lane in a u8
        assert_eq!(value_mask(1, 6), 0b0011_1111);
        assert_eq!(carry_mask(1, 6), 0b0100_0000);
        assert_eq!(sign_mask(1, 6), 0b0010_0000);
        assert_eq!(padding_mask(1, 6, 8), 0b1000_0000);
    }

    #[test]
    fn test_two_lane_masks() {
        // two 3-bit lanes in a u8, no padding
        assert_eq!(value_mask(2, 3), 0b0111_0111);
        assert_eq!(carry_mask(2, 3), 0b1000_1000);
        assert_eq!(sign_mask(2, 3), 0b0100_0100);
        assert_eq!(padding_mask(2, 3, 8), 0);
    }

    #[test]
    fn test_lane_lsb_mask() {
        assert_eq!(lane_lsb_mask(2, 3), 0b0001_0001);
        assert_eq!(lane_lsb_mask(4, 7), 0x01_01_01_01);
    }

    #[test]
    fn test_truncation_mask() {
        // two 7-bit lanes narrowed to 3 bits: keep 4 low bits per lane
        assert_eq!(truncation_mask(2, 7, 3), 0x0F0F);
        // six 9-bit lanes narrowed to 4 bits: keep 5 low bits per lane
        assert_eq!(
            truncation_mask(6, 9, 4),
            0b11111_0000011111_0000011111_0000011111_0000011111_0000011111
        );
    }

    #[test]
    fn test_masks_disjoint_and_covering() {
        // exhaustive over every layout with at least one lane
        for &word_bits in &[8u32, 16, 32, 64] {
            for bits in 1..word_bits {
                let lanes = word_bits / (bits + 1);
                if lanes == 0 {
                    continue;
                }
                let v = value_mask(lanes, bits);
                let c = carry_mask(lanes, bits);
                let s = sign_mask(lanes, bits);
                let p = padding_mask(lanes, bits, word_bits);

                assert_eq!(v & c, 0, "value/carry overlap at {bits}/u{word_bits}");
                assert_eq!(v & p, 0, "value/padding overlap at {bits}/u{word_bits}");
                assert_eq!(c & p, 0, "carry/padding overlap at {bits}/u{word_bits}");
                assert_eq!(
                    v | c | p,
                    word_mask(word_bits),
                    "masks do not cover u{word_bits} at bits={bits}"
                );
                assert_eq!(s & v, s, "sign bits must lie inside the value bits");
            }
        }
    }
}
