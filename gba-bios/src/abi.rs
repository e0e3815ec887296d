//! Calling-convention table for the firmware routines.
//!
//! Every routine is entered either through a supervisor call (`svc`) or, for
//! a few power routines in ARM state, by jumping straight into the BIOS with
//! `lr` pointing at the return address. Each entry has a fixed register
//! contract:
//!
//! - **inputs**: registers loaded with arguments before entry
//! - **outputs**: registers holding results after return
//! - **clobbers**: registers whose contents are unpredictable after return
//!
//! Every register not named as an output or clobber is preserved. All
//! routines may also read and write memory.
//!
//! The table below is the single source of truth: the inline assembly in
//! [`crate::sys`] takes its `svc` immediates and jump targets from it, and
//! the host-side model in `emu` drives its register checks from it.
//!
//! | Op                 | Thumb         | ARM                | In       | Out        | Clobbers (Thumb / ARM)  |
//! |--------------------|---------------|--------------------|----------|------------|-------------------------|
//! | `RegisterRamReset` | `svc 0x01`    | `svc 0x010000`     | r0       |            | r1-r3                   |
//! | `Halt`             | `svc 0x02`    | jump `0x1A0`       |          |            | r0-r3 / r2, r12, lr     |
//! | `Stop`             | `svc 0x03`    | jump `0x1A8`       |          |            | r0-r3 / r2, r12, lr     |
//! | `VblankIntrWait`   | `svc 0x05`    | `svc 0x050000`     |          |            | r0-r3                   |
//! | `Div`              | `svc 0x06`    | `svc 0x060000`     | r0, r1   | r0, r1, r3 | r2                      |
//! | `CpuSet`           | `svc 0x0B`    | `svc 0x0B0000`     | r0-r2    |            | r3                      |
//! | `BitUnpack`        | `svc 0x10`    | `svc 0x100000`     | r0-r2    |            | r3                      |
//! | `SoundBias`        | `svc 0x19`    | `svc 0x190000`     | r0       |            | r1-r3                   |
//! | `HardReset`        | `svc 0x26`    | `svc 0x260000`     |          |            | (never returns)         |
//! | `CustomHalt`       | `svc 0x27`    | jump `0x1AC`       | r2       |            | r0, r1, r3 / r12, lr    |

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Instruction encoding the shim is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// 16-bit Thumb state. `svc` carries an 8-bit comment field.
    Thumb,
    /// 32-bit ARM state. The BIOS reads the call number from bits 16..=23
    /// of the 24-bit comment field.
    Arm,
}

impl Encoding {
    /// Encoding selected for this build.
    ///
    /// Follows the target: `thumbv4t-none-eabi` yields [`Encoding::Thumb`],
    /// `armv4t-none-eabi` yields [`Encoding::Arm`].
    pub const ACTIVE: Encoding = if cfg!(target_feature = "thumb-mode") {
        Encoding::Thumb
    } else {
        Encoding::Arm
    };

    /// Literal `svc` operand for a BIOS call number.
    pub const fn svc_operand(self, number: u8) -> u32 {
        match self {
            Encoding::Thumb => number as u32,
            Encoding::Arm => (number as u32) << 16,
        }
    }

    /// Recover the BIOS call number from a literal `svc` operand.
    ///
    /// Mirrors what the firmware's exception handler does: Thumb reads the
    /// low byte, ARM reads bits 16..=23.
    pub const fn svc_number(self, operand: u32) -> u8 {
        match self {
            Encoding::Thumb => operand as u8,
            Encoding::Arm => (operand >> 16) as u8,
        }
    }
}

/// Firmware routines reachable through this crate.
///
/// The discriminant is the BIOS call number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Op {
    RegisterRamReset = 0x01,
    Halt = 0x02,
    Stop = 0x03,
    VblankIntrWait = 0x05,
    Div = 0x06,
    CpuSet = 0x0B,
    BitUnpack = 0x10,
    SoundBias = 0x19,
    HardReset = 0x26,
    CustomHalt = 0x27,
}

impl Op {
    pub const ALL: [Op; 10] = [
        Op::RegisterRamReset,
        Op::Halt,
        Op::Stop,
        Op::VblankIntrWait,
        Op::Div,
        Op::CpuSet,
        Op::BitUnpack,
        Op::SoundBias,
        Op::HardReset,
        Op::CustomHalt,
    ];

    /// Whether control comes back to the caller.
    pub const fn returns(self) -> bool {
        !matches!(self, Op::HardReset)
    }
}

// ── Fixed BIOS entry points ─────────────────────────────────────────

/// `mov r2, #0x00` then fall into the `HALTCNT` store.
pub const HALT_ENTRY: u32 = 0x0000_01A0;
/// `mov r2, #0x80` then fall into the `HALTCNT` store.
pub const STOP_ENTRY: u32 = 0x0000_01A8;
/// `strb r2, [HALTCNT]; bx lr`.
pub const CUSTOM_HALT_ENTRY: u32 = 0x0000_01AC;

/// How control is transferred into the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entry {
    /// Supervisor call with this literal operand.
    Svc(u32),
    /// `mov lr, pc; mov pc, #addr`.
    Jump(u32),
}

impl Entry {
    /// The literal operand placed in the instruction stream.
    pub const fn operand(self) -> u32 {
        match self {
            Entry::Svc(imm) => imm,
            Entry::Jump(addr) => addr,
        }
    }
}

bitflags! {
    /// A set of core registers, bit `n` standing for `rn`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Regs: u16 {
        const R0 = 1 << 0;
        const R1 = 1 << 1;
        const R2 = 1 << 2;
        const R3 = 1 << 3;
        const R4 = 1 << 4;
        const R5 = 1 << 5;
        const R6 = 1 << 6;
        const R7 = 1 << 7;
        const R8 = 1 << 8;
        const R9 = 1 << 9;
        const R10 = 1 << 10;
        const R11 = 1 << 11;
        const R12 = 1 << 12;
        const SP = 1 << 13;
        const LR = 1 << 14;
        const PC = 1 << 15;

        /// Argument/scratch registers of the AAPCS.
        const SCRATCH = Self::R0.bits() | Self::R1.bits() | Self::R2.bits() | Self::R3.bits();
        /// Scratch set of a direct jump into the halt routines.
        const JUMP_SCRATCH = Self::R12.bits() | Self::LR.bits();
    }
}

impl Regs {
    /// Register numbers in ascending order.
    pub fn numbers(self) -> impl Iterator<Item = usize> {
        (0..16).filter(move |n| self.bits() & (1u16 << n) != 0)
    }
}

/// Register contract of one firmware routine under one encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contract {
    pub op: Op,
    pub entry: Entry,
    pub inputs: Regs,
    pub outputs: Regs,
    pub clobbers: Regs,
}

impl Contract {
    /// Look up the contract of `op` when compiled for `encoding`.
    pub const fn of(op: Op, encoding: Encoding) -> Self {
        const NONE: Regs = Regs::empty();

        match (encoding, op) {
            (Encoding::Arm, Op::Halt) => Self::jump(op, HALT_ENTRY, NONE),
            (Encoding::Arm, Op::Stop) => Self::jump(op, STOP_ENTRY, NONE),
            (Encoding::Arm, Op::CustomHalt) => Self {
                op,
                entry: Entry::Jump(CUSTOM_HALT_ENTRY),
                inputs: Regs::R2,
                outputs: NONE,
                clobbers: Regs::JUMP_SCRATCH,
            },
            _ => {
                let (inputs, outputs, clobbers) = match op {
                    Op::RegisterRamReset | Op::SoundBias => {
                        (Regs::R0, NONE, Regs::R1.union(Regs::R2).union(Regs::R3))
                    }
                    Op::Halt | Op::Stop | Op::VblankIntrWait | Op::HardReset => {
                        (NONE, NONE, Regs::SCRATCH)
                    }
                    Op::Div => (
                        Regs::R0.union(Regs::R1),
                        Regs::R0.union(Regs::R1).union(Regs::R3),
                        Regs::R2,
                    ),
                    Op::CpuSet | Op::BitUnpack => {
                        (Regs::R0.union(Regs::R1).union(Regs::R2), NONE, Regs::R3)
                    }
                    Op::CustomHalt => (Regs::R2, NONE, Regs::R0.union(Regs::R1).union(Regs::R3)),
                };
                Self {
                    op,
                    entry: Entry::Svc(encoding.svc_operand(op as u8)),
                    inputs,
                    outputs,
                    clobbers,
                }
            }
        }
    }

    /// Direct-jump halt entries: `r2` selects the mode inside the BIOS.
    const fn jump(op: Op, addr: u32, inputs: Regs) -> Self {
        Self {
            op,
            entry: Entry::Jump(addr),
            inputs,
            outputs: Regs::empty(),
            clobbers: Regs::R2.union(Regs::JUMP_SCRATCH),
        }
    }

    /// Registers whose value survives the call.
    pub const fn preserved(&self) -> Regs {
        self.outputs.union(self.clobbers).complement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumb_svc_numbers() {
        for op in Op::ALL {
            let c = Contract::of(op, Encoding::Thumb);
            assert_eq!(c.entry, Entry::Svc(u8::from(op) as u32));
        }
        assert_eq!(Contract::of(Op::BitUnpack, Encoding::Thumb).entry.operand(), 0x10);
    }

    #[test]
    fn arm_svc_operands_are_shifted() {
        assert_eq!(Contract::of(Op::RegisterRamReset, Encoding::Arm).entry, Entry::Svc(0x01_0000));
        assert_eq!(Contract::of(Op::VblankIntrWait, Encoding::Arm).entry, Entry::Svc(0x05_0000));
        assert_eq!(Contract::of(Op::Div, Encoding::Arm).entry, Entry::Svc(0x06_0000));
        assert_eq!(Contract::of(Op::CpuSet, Encoding::Arm).entry, Entry::Svc(0x0B_0000));
        assert_eq!(Contract::of(Op::BitUnpack, Encoding::Arm).entry, Entry::Svc(0x10_0000));
        assert_eq!(Contract::of(Op::SoundBias, Encoding::Arm).entry, Entry::Svc(0x19_0000));
        assert_eq!(Contract::of(Op::HardReset, Encoding::Arm).entry, Entry::Svc(0x26_0000));
    }

    #[test]
    fn arm_power_routines_jump() {
        assert_eq!(Contract::of(Op::Halt, Encoding::Arm).entry, Entry::Jump(0x1A0));
        assert_eq!(Contract::of(Op::Stop, Encoding::Arm).entry, Entry::Jump(0x1A8));
        assert_eq!(Contract::of(Op::CustomHalt, Encoding::Arm).entry, Entry::Jump(0x1AC));

        let halt = Contract::of(Op::Halt, Encoding::Arm);
        assert_eq!(halt.clobbers, Regs::R2 | Regs::R12 | Regs::LR);
        let custom = Contract::of(Op::CustomHalt, Encoding::Arm);
        assert_eq!(custom.inputs, Regs::R2);
        assert_eq!(custom.clobbers, Regs::R12 | Regs::LR);
    }

    #[test]
    fn div_contract() {
        for enc in [Encoding::Thumb, Encoding::Arm] {
            let c = Contract::of(Op::Div, enc);
            assert_eq!(c.inputs, Regs::R0 | Regs::R1);
            assert_eq!(c.outputs, Regs::R0 | Regs::R1 | Regs::R3);
            assert_eq!(c.clobbers, Regs::R2);
            assert!(!c.preserved().intersects(Regs::SCRATCH));
            assert!(c.preserved().contains(Regs::R4 | Regs::R12 | Regs::LR));
        }
    }

    #[test]
    fn thumb_custom_halt_keeps_r2() {
        let c = Contract::of(Op::CustomHalt, Encoding::Thumb);
        assert_eq!(c.inputs, Regs::R2);
        assert_eq!(c.clobbers, Regs::R0 | Regs::R1 | Regs::R3);
        assert!(c.preserved().contains(Regs::R2));
    }

    #[test]
    fn outputs_never_clobbered() {
        for enc in [Encoding::Thumb, Encoding::Arm] {
            for op in Op::ALL {
                let c = Contract::of(op, enc);
                assert!(!c.outputs.intersects(c.clobbers), "{op:?} {enc:?}");
                assert!(!c.clobbers.intersects(Regs::SP | Regs::PC), "{op:?} {enc:?}");
                assert!(c.inputs.difference(Regs::SCRATCH).is_empty(), "{op:?} {enc:?}");
            }
        }
    }

    #[test]
    fn call_numbers_decode() {
        assert_eq!(Op::try_from(0x27u8).ok(), Some(Op::CustomHalt));
        assert!(Op::try_from(0x04u8).is_err());
        assert_eq!(Encoding::Arm.svc_number(0x0B_0000), 0x0B);
        assert_eq!(Encoding::Thumb.svc_number(0x0B), 0x0B);
    }
}
