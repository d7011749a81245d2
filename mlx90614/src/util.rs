// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

/// Check if the n-th bit is set.
///
/// Bits are 0-indexed, from the LSB.
pub(crate) fn is_bit_set(value: u16, index: u32) -> bool {
    (value & (1 << index)) > 0
}

/// Replace the bits of `value` selected by `mask` with those from `field`.
///
/// Bits outside of `mask` are left as they were, as are bits in `field` that are outside of
/// `mask`.
pub(crate) fn replace_bits(value: u16, mask: u16, field: u16) -> u16 {
    (value & !mask) | (field & mask)
}
