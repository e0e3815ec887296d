//! Typed wrappers for the Game Boy Advance BIOS.
//!
//! The BIOS ROM provides a handful of routines every program needs and the
//! ARM7TDMI cannot do on its own: division, block copies, low-power waits,
//! memory reset. Each function here is a single `svc` (or, for the halt
//! routines in ARM state, a jump to a fixed BIOS address) with the register
//! contract recorded in [`abi`].
//!
//! | Routine            | Function                          |
//! |--------------------|-----------------------------------|
//! | `RegisterRamReset` | [`reset::register_ram_reset`]     |
//! | `Halt`             | [`power::halt`]                   |
//! | `Stop`             | [`power::stop`]                   |
//! | `VBlankIntrWait`   | [`power::vblank_intr_wait`]       |
//! | `Div`              | [`math::div`]                     |
//! | `CpuSet`           | [`copy::cpu_set`]                 |
//! | `BitUnPack`        | [`unpack::bit_unpack`]            |
//! | `SoundBias`        | [`sound::sound_bias`]             |
//! | `HardReset`        | [`reset::hard_reset`]             |
//! | `CustomHalt`       | [`power::custom_halt`]            |
//!
//! # Encoding
//!
//! The entry sequences differ between Thumb and ARM state. The variant is
//! fixed at build time by the target (`thumbv4t-none-eabi` or
//! `armv4t-none-eabi`); see [`abi::Encoding::ACTIVE`]. Both reach the same
//! firmware code.
//!
//! # No validation
//!
//! None of the wrappers check their arguments or report errors. Division by
//! zero, malformed mode words, misaligned or overlapping buffers all do
//! whatever the firmware does with them. Functions that can write arbitrary
//! memory are `unsafe`.
//!
//! # Features
//!
//! - `emulator`: host-side model of the machine and firmware ([`emu`]),
//!   used to test the calling contracts off-device. Implies `std`.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod abi;
pub mod copy;
pub mod hw;
pub mod math;
pub mod power;
pub mod reset;
pub mod sound;
pub mod unpack;

#[cfg(target_arch = "arm")]
pub mod sys;

#[cfg(feature = "emulator")]
pub mod emu;

pub use copy::CpuSetMode;
pub use math::DivResult;
pub use power::HaltMode;
pub use reset::RamResetFlags;
pub use unpack::{BitUnPackParams, UnpackBias};

#[cfg(target_arch = "arm")]
pub use copy::cpu_set;
#[cfg(target_arch = "arm")]
pub use math::div;
#[cfg(target_arch = "arm")]
pub use power::{custom_halt, halt, stop, vblank_intr_wait};
#[cfg(target_arch = "arm")]
pub use reset::{hard_reset, register_ram_reset};
#[cfg(target_arch = "arm")]
pub use sound::sound_bias;
#[cfg(target_arch = "arm")]
pub use unpack::bit_unpack;
