use crate::abi::{Entry, Op};

/// Failure reported by the firmware model.
///
/// Most variants stand for inputs whose effect on hardware is undefined.
/// The model refuses to guess a result for them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmuError {
    #[error("no memory mapped at {addr:#010x}")]
    Unmapped { addr: u32 },
    #[error("write to read-only memory at {addr:#010x}")]
    ReadOnly { addr: u32 },
    #[error("{op:?}: behavior is firmware-defined ({reason})")]
    Unspecified { op: Op, reason: &'static str },
    #[error("{op:?} changed r{reg}, which its contract preserves")]
    ContractViolation { op: Op, reg: usize },
    #[error("{op:?} takes {expected} argument(s), got {got}")]
    BadArgCount {
        op: Op,
        expected: usize,
        got: usize,
    },
    #[error("{op:?} waits for an interrupt that can never arrive")]
    NeverWakes { op: Op },
    #[error("no firmware routine behind {entry:?}")]
    UnknownEntry { entry: Entry },
}
