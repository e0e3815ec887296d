//! Memory/register reset and full system reset.

use bitflags::bitflags;

bitflags! {
    /// Regions cleared by [`register_ram_reset`].
    ///
    /// Clearing [`IWRAM`](Self::IWRAM) leaves the top 0x200 bytes alone;
    /// they hold the firmware stacks and the interrupt vector.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RamResetFlags: u8 {
        /// External work RAM, 256 KiB at `0x0200_0000`.
        const EWRAM = 0x01;
        /// Internal work RAM, 32 KiB at `0x0300_0000`.
        const IWRAM = 0x02;
        const PALETTE = 0x04;
        const VRAM = 0x08;
        const OAM = 0x10;
        /// Serial communication registers.
        const SIO_REG = 0x20;
        /// Sound registers.
        const SOUND_REG = 0x40;
        /// All other I/O registers.
        const REG = 0x80;

        const ALL_RAM = 0x1F;
        const ALL_REG = 0xE0;
        const ALL = 0xFF;
    }
}

/// Clear the memory regions and register groups selected by `flags`.
///
/// Returns once every selected region has been cleared. Unselected regions
/// are left untouched.
///
/// # Safety
///
/// Clearing a region the running program lives in (IWRAM holding `.data`,
/// `.bss` or the stack, EWRAM holding code) destroys that state. The caller
/// must only select regions it no longer relies on.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub unsafe fn register_ram_reset(flags: RamResetFlags) {
    unsafe { crate::sys::RegisterRamReset(flags.bits()) }
}

/// Reboot the console through the firmware boot sequence.
///
/// Does not return.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub fn hard_reset() -> ! {
    unsafe { crate::sys::HardReset() }
}
