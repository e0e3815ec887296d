//! Low-power waits.
//!
//! Halt, Stop and the vertical-blank wait are the only points where the CPU
//! suspends. Each blocks the whole processor until a hardware interrupt and
//! then resumes at the instruction after the call. There is no way to cancel
//! a pending wait.

use num_enum::IntoPrimitive;

/// Value written to `HALTCNT` by [`custom_halt`].
///
/// Bit 7 selects Stop; every other bit pattern halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum HaltMode {
    /// CPU paused until any enabled interrupt.
    Halt = 0x00,
    /// CPU, sound and video stopped until a keypad, serial or cartridge
    /// interrupt.
    Stop = 0x80,
}

impl HaltMode {
    /// Mode the hardware enters for a raw `HALTCNT` byte.
    pub const fn from_haltcnt(value: u8) -> Self {
        if value & 0x80 != 0 {
            HaltMode::Stop
        } else {
            HaltMode::Halt
        }
    }
}

/// Suspend the CPU until the next enabled interrupt.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub fn halt() {
    unsafe { crate::sys::Halt() }
}

/// Enter very-low-power mode until a keypad, serial or cartridge interrupt.
///
/// The display and sound are turned off while stopped. The wake-up source
/// must be enabled in `IE` (and, for the keypad, in `KEYCNT`) beforehand or
/// the console never wakes.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub fn stop() {
    unsafe { crate::sys::Stop() }
}

/// Block until the next vertical-blank interrupt.
///
/// Flags left over from an earlier vertical blank are discarded first, so
/// this always waits for a fresh one. Requires the vertical-blank interrupt
/// to be enabled and an interrupt handler that acknowledges it in
/// [`BIOS_IF`](crate::hw::BIOS_IF).
#[cfg(target_arch = "arm")]
#[inline(always)]
pub fn vblank_intr_wait() {
    unsafe { crate::sys::VBlankIntrWait() }
}

/// Write `flag` to `HALTCNT` through the firmware.
///
/// Accepts a [`HaltMode`] or a raw byte. What happens beyond suspension for
/// bytes other than `0x00` and `0x80` is up to the hardware.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub fn custom_halt(flag: impl Into<u8>) {
    unsafe { crate::sys::CustomHalt(flag.into()) }
}
