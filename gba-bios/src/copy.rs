//! Firmware block copy and fill (`CpuSet`).
//!
//! The BIOS moves data in 16- or 32-bit units under CPU control. The mode
//! word passed in `r2` packs the unit count, the unit size and whether the
//! source address stays fixed (fill) or advances (copy).
//!
//! # Note
//!
//! Nothing here checks lengths, alignment or overlap. The firmware aligns
//! both addresses down to the unit size and silently ignores a source in
//! the BIOS region; everything else is the caller's responsibility.

use bitfield_struct::bitfield;
#[cfg(target_arch = "arm")]
use core::ffi::c_void;

/// Width mask of the unit count field.
const COUNT_MASK: u32 = (1 << 21) - 1;

/// Mode word for [`cpu_set`].
///
/// | Bits   | Meaning                                 |
/// |--------|-----------------------------------------|
/// | 0..=20 | unit count                              |
/// | 24     | fixed source: fill instead of copy      |
/// | 26     | unit size: 0 = 16-bit, 1 = 32-bit       |
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct CpuSetMode {
    /// Number of 16- or 32-bit units to transfer.
    #[bits(21)]
    pub count: u32,
    #[bits(3)]
    __: u8,
    /// Read the same source unit for every destination unit.
    pub fixed_source: bool,
    #[bits(1)]
    __: u8,
    /// Transfer 32-bit words instead of 16-bit halfwords.
    pub word32: bool,
    #[bits(5)]
    __: u8,
}

impl CpuSetMode {
    /// Copy `count` halfwords. Bits above the 21-bit count are dropped.
    pub const fn copy16(count: u32) -> Self {
        Self::new().with_count(count & COUNT_MASK)
    }

    /// Copy `count` words.
    pub const fn copy32(count: u32) -> Self {
        Self::copy16(count).with_word32(true)
    }

    /// Fill `count` halfwords with the halfword at the source.
    pub const fn fill16(count: u32) -> Self {
        Self::copy16(count).with_fixed_source(true)
    }

    /// Fill `count` words with the word at the source.
    pub const fn fill32(count: u32) -> Self {
        Self::copy32(count).with_fixed_source(true)
    }

    /// Size of one transfer unit in bytes.
    pub const fn unit_bytes(&self) -> u32 {
        if self.word32() { 4 } else { 2 }
    }
}

/// Copy or fill memory through the firmware.
///
/// # Safety
///
/// - `src` must be readable for one unit (fill) or `count` units (copy).
/// - `dst` must be writable for `count` units.
/// - Both must be aligned to the unit size; the firmware rounds them down
///   otherwise.
/// - Overlapping regions are copied unit by unit in ascending order.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub unsafe fn cpu_set(src: *const c_void, dst: *mut c_void, mode: CpuSetMode) {
    unsafe { crate::sys::CpuSet(src, dst, mode.into_bits()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_word_layout() {
        assert_eq!(CpuSetMode::copy16(8).into_bits(), 0x0000_0008);
        assert_eq!(CpuSetMode::copy32(0x10).into_bits(), 0x0400_0010);
        assert_eq!(CpuSetMode::fill16(1).into_bits(), 0x0100_0001);
        assert_eq!(CpuSetMode::fill32(0x1F_FFFF).into_bits(), 0x051F_FFFF);
    }

    #[test]
    fn decode_raw_word() {
        let mode = CpuSetMode::from_bits(0x0500_0100);
        assert_eq!(mode.count(), 0x100);
        assert!(mode.fixed_source());
        assert!(mode.word32());
        assert_eq!(mode.unit_bytes(), 4);
        assert_eq!(CpuSetMode::copy16(1).unit_bytes(), 2);
    }

    #[test]
    fn oversized_count_is_truncated() {
        assert_eq!(CpuSetMode::copy16(0x20_0000).count(), 0);
        assert_eq!(CpuSetMode::copy16(0x20_0000).into_bits(), 0);
        assert_eq!(CpuSetMode::fill32(0x20_0005).into_bits(), 0x0500_0005);
        assert_eq!(CpuSetMode::copy32(u32::MAX).count(), COUNT_MASK);
    }
}
