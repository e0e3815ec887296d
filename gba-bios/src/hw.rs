//! Memory map and I/O register addresses touched by the firmware routines.
//!
//! The BIOS routines wrapped by this crate operate on fixed regions of the
//! GBA address space. These constants name those regions and the handful of
//! registers the routines read or write, so that callers (and the host-side
//! model) can refer to them symbolically.

// ── Memory Regions ──────────────────────────────────────────────────

/// Firmware ROM (read-only, 16 KiB).
pub const BIOS_BASE: u32 = 0x0000_0000;
/// Size of the firmware ROM.
pub const BIOS_SIZE: u32 = 0x4000;

/// External work RAM (256 KiB).
pub const EWRAM_BASE: u32 = 0x0200_0000;
/// Size of external work RAM.
pub const EWRAM_SIZE: u32 = 0x4_0000;

/// Internal work RAM (32 KiB).
pub const IWRAM_BASE: u32 = 0x0300_0000;
/// Size of internal work RAM.
pub const IWRAM_SIZE: u32 = 0x8000;

/// Tail of IWRAM that [`register_ram_reset`](crate::reset::register_ram_reset)
/// never clears. Holds the firmware stacks and the interrupt vector.
pub const IWRAM_RESERVED: u32 = 0x200;

/// Memory-mapped I/O registers.
pub const IO_BASE: u32 = 0x0400_0000;
/// Size of the I/O register block.
pub const IO_SIZE: u32 = 0x400;

/// Palette RAM (1 KiB).
pub const PALETTE_BASE: u32 = 0x0500_0000;
/// Size of palette RAM.
pub const PALETTE_SIZE: u32 = 0x400;

/// Video RAM (96 KiB).
pub const VRAM_BASE: u32 = 0x0600_0000;
/// Size of video RAM.
pub const VRAM_SIZE: u32 = 0x1_8000;

/// Object attribute memory (1 KiB).
pub const OAM_BASE: u32 = 0x0700_0000;
/// Size of object attribute memory.
pub const OAM_SIZE: u32 = 0x400;

// ── I/O Registers ───────────────────────────────────────────────────

/// Display control.
pub const REG_DISPCNT: u32 = IO_BASE + 0x000;
/// Display status and interrupt control.
pub const REG_DISPSTAT: u32 = IO_BASE + 0x004;
/// Sound PWM control. Bias level lives in bits 1..=9.
pub const REG_SOUNDBIAS: u32 = IO_BASE + 0x088;
/// Interrupt enable.
pub const REG_IE: u32 = IO_BASE + 0x200;
/// Interrupt request flags.
pub const REG_IF: u32 = IO_BASE + 0x202;
/// Interrupt master enable.
pub const REG_IME: u32 = IO_BASE + 0x208;
/// Low-power mode control. Written by the halt routines.
pub const REG_HALTCNT: u32 = IO_BASE + 0x301;

/// Interrupt flags acknowledged by user handlers for `IntrWait`.
pub const BIOS_IF: u32 = IWRAM_BASE + 0x7FF8;

// ── Register Groups Cleared By RAM Reset ────────────────────────────

/// Sound registers (`SOUND1CNT_L` through `FIFO_B`).
pub const SOUND_REGS: core::ops::Range<u32> = 0x060..0x0B0;
/// Serial communication registers (`SIODATA32` through `JOYSTAT`).
pub const SIO_REGS: core::ops::Range<u32> = 0x120..0x160;

/// Sound bias level applied once the ramp finishes.
pub const SOUND_BIAS_LEVEL_MAX: u16 = 0x200;
/// Mask of the bias level bits within `SOUNDBIAS`.
pub const SOUND_BIAS_LEVEL_MASK: u16 = 0x3FE;
