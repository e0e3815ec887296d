//! Thumb-state entry sequences: every routine is an `svc` with the BIOS
//! call number as its 8-bit immediate.

use core::arch::asm;
use core::ffi::c_void;

use crate::abi::{Contract, Encoding, Entry, Op};
use crate::math::DivResult;
use crate::unpack::BitUnPackParams;

// Evaluated in `const` operands, so a table mismatch fails the build.
const fn svc(op: Op) -> u32 {
    match Contract::of(op, Encoding::Thumb).entry {
        Entry::Svc(imm) => imm,
        Entry::Jump(_) => panic!("routine is entered by jump"),
    }
}

/// # Safety
///
/// Clears the memory selected by `flags`; see
/// [`register_ram_reset`](crate::reset::register_ram_reset).
#[inline(always)]
pub unsafe fn RegisterRamReset(flags: u8) {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::RegisterRamReset),
            in("r0") flags as u32,
            out("r1") _,
            out("r2") _,
            out("r3") _,
        );
    }
}

#[inline(always)]
pub unsafe fn Halt() {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::Halt),
            out("r0") _,
            out("r1") _,
            out("r2") _,
            out("r3") _,
        );
    }
}

#[inline(always)]
pub unsafe fn Stop() {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::Stop),
            out("r0") _,
            out("r1") _,
            out("r2") _,
            out("r3") _,
        );
    }
}

#[inline(always)]
pub unsafe fn VBlankIntrWait() {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::VblankIntrWait),
            out("r0") _,
            out("r1") _,
            out("r2") _,
            out("r3") _,
        );
    }
}

#[inline(always)]
pub unsafe fn Div(num: i32, denom: i32) -> DivResult {
    let quot: i32;
    let rem: i32;
    let quot_abs: u32;
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::Div),
            inlateout("r0") num => quot,
            inlateout("r1") denom => rem,
            out("r2") _,
            out("r3") quot_abs,
        );
    }
    DivResult {
        quot,
        rem,
        quot_abs,
    }
}

/// # Safety
///
/// See [`cpu_set`](crate::copy::cpu_set).
#[inline(always)]
pub unsafe fn CpuSet(src: *const c_void, dst: *mut c_void, mode: u32) {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::CpuSet),
            in("r0") src,
            in("r1") dst,
            in("r2") mode,
            out("r3") _,
        );
    }
}

/// # Safety
///
/// See [`bit_unpack`](crate::unpack::bit_unpack).
#[inline(always)]
pub unsafe fn BitUnPack(src: *const c_void, dst: *mut c_void, params: *const BitUnPackParams) {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::BitUnpack),
            in("r0") src,
            in("r1") dst,
            in("r2") params,
            out("r3") _,
        );
    }
}

#[inline(always)]
pub unsafe fn SoundBias(level: u32) {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::SoundBias),
            in("r0") level,
            out("r1") _,
            out("r2") _,
            out("r3") _,
        );
    }
}

#[inline(always)]
pub unsafe fn HardReset() -> ! {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::HardReset),
            options(noreturn),
        );
    }
}

#[inline(always)]
pub unsafe fn CustomHalt(flag: u8) {
    unsafe {
        asm!(
            "svc #{n}",
            n = const svc(Op::CustomHalt),
            in("r2") flag as u32,
            out("r0") _,
            out("r1") _,
            out("r3") _,
        );
    }
}
