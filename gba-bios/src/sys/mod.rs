//! Raw firmware entry sequences.
//!
//! One `#[inline(always)]` function per BIOS routine, named after the
//! routine. Each is a single `svc` or fixed-address jump with the register
//! contract from [`crate::abi`]. Nothing is validated and nothing is
//! reported back beyond the routine's own outputs.
//!
//! Two variants exist and exactly one is compiled, chosen by the target's
//! instruction encoding:
//!
//! - `thumb`: `thumbv4t-none-eabi`, 8-bit `svc` immediates.
//! - `arm`: `armv4t-none-eabi`, `svc` immediates shifted into bits 16..=23,
//!   and direct jumps for the halt entries.
//!
//! Both reach the same firmware code and have identical observable effects.
//! The differences are in which scratch registers end up clobbered.

#![allow(non_snake_case, clippy::missing_safety_doc)]

#[cfg(target_feature = "thumb-mode")]
mod thumb;
#[cfg(target_feature = "thumb-mode")]
pub use thumb::*;

#[cfg(not(target_feature = "thumb-mode"))]
mod arm;
#[cfg(not(target_feature = "thumb-mode"))]
pub use arm::*;
