//! Integer division through the firmware.
//!
//! The ARM7TDMI has no divide instruction. The BIOS provides a signed
//! 32-bit division routine that returns quotient, remainder and the
//! absolute value of the quotient in one call.

/// Result of [`div`], in the order the firmware returns it (`r0`, `r1`, `r3`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DivResult {
    /// Quotient, truncated toward zero.
    pub quot: i32,
    /// Remainder, with the sign of the numerator.
    pub rem: i32,
    /// `|quot|` as an unsigned value.
    pub quot_abs: u32,
}

impl DivResult {
    /// Whether this result satisfies the division identity for `num / denom`.
    ///
    /// `quot * denom + rem == num` (in wrapping arithmetic) and
    /// `quot_abs == |quot|`.
    pub fn is_consistent(&self, num: i32, denom: i32) -> bool {
        self.quot.wrapping_mul(denom).wrapping_add(self.rem) == num
            && self.quot_abs == self.quot.unsigned_abs()
    }
}

/// Divide `num` by `denom`, truncating toward zero.
///
/// `denom == 0` is firmware-defined: the BIOS does not trap, and depending
/// on the numerator it either loops forever or returns meaningless values.
/// This wrapper does not check for it.
#[cfg(target_arch = "arm")]
#[inline(always)]
pub fn div(num: i32, denom: i32) -> DivResult {
    unsafe { crate::sys::Div(num, denom) }
}
