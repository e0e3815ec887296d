//! Bit unpacking (`BitUnPack`).
//!
//! Expands densely packed 1/2/4/8-bit units into wider 1/2/4/8/16/32-bit
//! units, optionally adding a bias. Typical use is turning a 1bpp font into
//! 4bpp tiles.
//!
//! The firmware receives the address of a [`BitUnPackParams`] block, not its
//! fields. Output is written in whole 32-bit words; a trailing partial word
//! is dropped.

use bitfield_struct::bitfield;
#[cfg(target_arch = "arm")]
use core::ffi::c_void;

/// Width mask of the bias offset field.
const OFFSET_MASK: u32 = (1 << 31) - 1;

/// Bias word of [`BitUnPackParams`].
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct UnpackBias {
    /// Value added to each unpacked unit.
    #[bits(31)]
    pub offset: u32,
    /// Also add the bias to units that unpacked to zero.
    pub zero: bool,
}

/// Parameter block read by the firmware from the address in `r2`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitUnPackParams {
    /// Source length in bytes.
    pub size: u16,
    /// Width of one source unit: 1, 2, 4 or 8.
    pub in_bits: u8,
    /// Width of one destination unit: 1, 2, 4, 8, 16 or 32.
    pub out_bits: u8,
    pub bias: UnpackBias,
}

impl BitUnPackParams {
    /// Parameters with no bias.
    pub const fn new(size: u16, in_bits: u8, out_bits: u8) -> Self {
        Self {
            size,
            in_bits,
            out_bits,
            bias: UnpackBias::new(),
        }
    }

    /// Add `offset` to every non-zero unit, or to every unit when `zero` is set.
    ///
    /// Only the low 31 bits of `offset` fit in the bias word.
    pub const fn with_bias(mut self, offset: u32, zero: bool) -> Self {
        self.bias = UnpackBias::new()
            .with_offset(offset & OFFSET_MASK)
            .with_zero(zero);
        self
    }

    /// Bytes written to the destination, or `None` for `in_bits == 0`.
    ///
    /// Counts whole 32-bit words only, matching what the firmware stores.
    pub const fn output_len(&self) -> Option<usize> {
        if self.in_bits == 0 {
            return None;
        }
        let units = self.size as usize * 8 / self.in_bits as usize;
        let bits = units * self.out_bits as usize;
        Some(bits / 32 * 4)
    }
}

/// Unpack `src` into `dst` as described by `params`.
///
/// # Safety
///
/// - `src` must be readable for `params.size` bytes.
/// - `dst` must be 4-byte aligned and writable for
///   [`output_len`](BitUnPackParams::output_len) bytes.
/// - Widths outside the documented sets, and `in_bits == 0`, are
///   firmware-defined.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub unsafe fn bit_unpack(src: *const c_void, dst: *mut c_void, params: &BitUnPackParams) {
    unsafe { crate::sys::BitUnPack(src, dst, params) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn params_layout() {
        assert_eq!(size_of::<BitUnPackParams>(), 8);
        assert_eq!(offset_of!(BitUnPackParams, size), 0);
        assert_eq!(offset_of!(BitUnPackParams, in_bits), 2);
        assert_eq!(offset_of!(BitUnPackParams, out_bits), 3);
        assert_eq!(offset_of!(BitUnPackParams, bias), 4);
    }

    #[test]
    fn bias_word() {
        let p = BitUnPackParams::new(4, 1, 4).with_bias(0x7FFF_FFFF, true);
        assert_eq!(p.bias.into_bits(), 0xFFFF_FFFF);
        let p = BitUnPackParams::new(4, 1, 4).with_bias(3, false);
        assert_eq!(p.bias.into_bits(), 3);
        assert!(!p.bias.zero());
    }

    #[test]
    fn oversized_bias_is_truncated() {
        let p = BitUnPackParams::new(1, 1, 4).with_bias(0x8000_0000, false);
        assert_eq!(p.bias.offset(), 0);
        assert!(!p.bias.zero());
        let p = BitUnPackParams::new(1, 1, 4).with_bias(u32::MAX, false);
        assert_eq!(p.bias.offset(), OFFSET_MASK);
        assert_eq!(p.bias.into_bits(), 0x7FFF_FFFF);
    }

    #[test]
    fn output_len() {
        // 1bpp -> 4bpp: 8 source bytes expand to 32 output bytes.
        assert_eq!(BitUnPackParams::new(8, 1, 4).output_len(), Some(32));
        // One byte of nibbles gives two 8-bit units = 16 bits, no full word.
        assert_eq!(BitUnPackParams::new(1, 4, 8).output_len(), Some(0));
        assert_eq!(BitUnPackParams::new(0, 2, 8).output_len(), Some(0));
        assert_eq!(BitUnPackParams::new(4, 0, 8).output_len(), None);
    }
}
