//! Host-side model of the machine and its firmware routines.
//!
//! The shim in this crate only runs on the console. To check its contracts
//! on a development host, [`Machine`] models the parts of the system the
//! routines touch: the register file, the memory regions, the I/O registers
//! and interrupt timing. Each routine is entered through the same
//! [`Contract`] table the inline assembly uses, so the register discipline
//! (which slots carry arguments, which carry results, which are trashed) is
//! exercised on every call.
//!
//! # Example
//!
//! ```
//! use gba_bios::abi::Encoding;
//! use gba_bios::emu::{Machine, MachineConfig};
//!
//! let mut m = Machine::new(MachineConfig::new(Encoding::Thumb));
//! let r = m.div(-10, 3).unwrap();
//! assert_eq!((r.quot, r.rem, r.quot_abs), (-3, -1, 3));
//! ```
//!
//! Inputs whose effect on hardware is undefined (division by zero, a zero
//! unpack width, halting with no enabled interrupt) come back as
//! [`EmuError`] instead of an invented result.

mod bus;
mod clock;
mod error;
mod firmware;

pub use bus::Bus;
pub use clock::{CYCLES_PER_FRAME, CYCLES_PER_LINE, Clock, Irq, VBLANK_START};
pub use error::EmuError;

use log::trace;

use crate::abi::{Contract, Encoding, Op};
use crate::copy::CpuSetMode;
use crate::hw;
use crate::math::DivResult;
use crate::reset::RamResetFlags;
use crate::unpack::BitUnPackParams;

/// Initial stack pointer set up by the boot ROM for user mode.
const INITIAL_SP: u32 = 0x0300_7F00;
/// Cartridge entry point.
const ROM_ENTRY: u32 = 0x0800_0000;

/// Settings for a [`Machine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Which entry sequences to model.
    pub encoding: Encoding,
    /// Value written to every clobbered register after a call.
    pub poison: u32,
}

impl MachineConfig {
    pub const fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            poison: 0xDEAD_BEEF,
        }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new(Encoding::ACTIVE)
    }
}

/// How a firmware call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Control came back to the instruction after the call.
    Returned,
    /// The console rebooted; nothing after the call runs.
    Reset,
}

/// State a program can observe after a sequence of calls.
///
/// Registers are left out: which scratch registers end up trashed is the
/// one thing allowed to differ between encodings.
#[derive(Debug, PartialEq, Eq)]
pub struct Observable<'a> {
    pub bus: &'a Bus,
    pub cycles: u64,
    pub last_wake: Option<Irq>,
    pub resets: u32,
}

/// An emulated console.
pub struct Machine {
    config: MachineConfig,
    regs: [u32; 16],
    bus: Bus,
    clock: Clock,
    last_wake: Option<Irq>,
    resets: u32,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Self {
        let mut m = Self {
            config,
            regs: [0; 16],
            bus: Bus::new(),
            clock: Clock::default(),
            last_wake: None,
            resets: 0,
        };
        m.power_on();
        m
    }

    /// Cold-boot state: cleared memory and registers, PC at the cartridge.
    fn power_on(&mut self) {
        self.bus = Bus::new();
        self.regs = [0; 16];
        self.regs[13] = INITIAL_SP;
        self.regs[15] = ROM_ENTRY;
        self.last_wake = None;
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn regs(&self) -> &[u32; 16] {
        &self.regs
    }

    /// Set `r{n}` as caller code would before a call.
    ///
    /// # Panics
    ///
    /// If `n` is not a register number (`n > 15`).
    pub fn set_reg(&mut self, n: usize, value: u32) {
        self.regs[n] = value;
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Source of the interrupt that ended the last wait.
    pub fn last_wake(&self) -> Option<Irq> {
        self.last_wake
    }

    /// Number of times [`hard_reset`](Self::hard_reset) rebooted the machine.
    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Set bits in `IE`.
    pub fn enable_irqs(&mut self, irqs: Irq) -> Result<(), EmuError> {
        let ie = self.bus.read16(hw::REG_IE)?;
        self.bus.write16(hw::REG_IE, ie | irqs.bits())
    }

    /// Raise `irq` once, `delay` cycles from now.
    pub fn raise(&mut self, irq: Irq, delay: u64) {
        self.clock.schedule(irq, delay);
    }

    pub fn observable(&self) -> Observable<'_> {
        Observable {
            bus: &self.bus,
            cycles: self.clock.now(),
            last_wake: self.last_wake,
            resets: self.resets,
        }
    }

    /// Invoke `op` with `args` in its input registers, lowest register first.
    ///
    /// After the routine returns, every clobbered register holds
    /// [`MachineConfig::poison`]. A routine that disturbs a register its
    /// contract preserves is reported as [`EmuError::ContractViolation`].
    pub fn call(&mut self, op: Op, args: &[u32]) -> Result<Outcome, EmuError> {
        self.call_with(Contract::of(op, self.config.encoding), args)
    }

    fn call_with(&mut self, contract: Contract, args: &[u32]) -> Result<Outcome, EmuError> {
        let op = contract.op;
        let expected = contract.inputs.bits().count_ones() as usize;
        if args.len() != expected {
            return Err(EmuError::BadArgCount {
                op,
                expected,
                got: args.len(),
            });
        }
        for (n, &value) in contract.inputs.numbers().zip(args) {
            self.regs[n] = value;
        }
        trace!("{op:?} via {:?} args={args:x?}", contract.entry);

        let before = self.regs;
        let outcome = firmware::enter(self, contract.entry)?;
        if outcome == Outcome::Reset {
            return Ok(outcome);
        }

        for n in contract.clobbers.numbers() {
            self.regs[n] = self.config.poison;
        }
        if let Some(reg) = contract
            .preserved()
            .numbers()
            .find(|&n| self.regs[n] != before[n])
        {
            return Err(EmuError::ContractViolation { op, reg });
        }
        Ok(outcome)
    }

    // ── Typed entry points ──────────────────────────────────────────

    pub fn register_ram_reset(&mut self, flags: RamResetFlags) -> Result<(), EmuError> {
        self.call(Op::RegisterRamReset, &[flags.bits() as u32])?;
        Ok(())
    }

    pub fn halt(&mut self) -> Result<(), EmuError> {
        self.call(Op::Halt, &[])?;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), EmuError> {
        self.call(Op::Stop, &[])?;
        Ok(())
    }

    pub fn vblank_intr_wait(&mut self) -> Result<(), EmuError> {
        self.call(Op::VblankIntrWait, &[])?;
        Ok(())
    }

    pub fn div(&mut self, num: i32, denom: i32) -> Result<DivResult, EmuError> {
        self.call(Op::Div, &[num as u32, denom as u32])?;
        Ok(DivResult {
            quot: self.regs[0] as i32,
            rem: self.regs[1] as i32,
            quot_abs: self.regs[3],
        })
    }

    pub fn cpu_set(&mut self, src: u32, dst: u32, mode: CpuSetMode) -> Result<(), EmuError> {
        self.call(Op::CpuSet, &[src, dst, mode.into_bits()])?;
        Ok(())
    }

    /// Store `params` at `addr` in the layout the firmware reads.
    pub fn write_unpack_params(
        &mut self,
        addr: u32,
        params: &BitUnPackParams,
    ) -> Result<(), EmuError> {
        self.bus.write16(addr, params.size)?;
        self.bus.write8(addr + 2, params.in_bits)?;
        self.bus.write8(addr + 3, params.out_bits)?;
        self.bus.write32(addr + 4, params.bias.into_bits())
    }

    /// Unpack with the parameter block already stored at `params`.
    pub fn bit_unpack(&mut self, src: u32, dst: u32, params: u32) -> Result<(), EmuError> {
        self.call(Op::BitUnpack, &[src, dst, params])?;
        Ok(())
    }

    pub fn sound_bias(&mut self, level: u32) -> Result<(), EmuError> {
        self.call(Op::SoundBias, &[level])?;
        Ok(())
    }

    pub fn hard_reset(&mut self) -> Result<(), EmuError> {
        self.call(Op::HardReset, &[])?;
        Ok(())
    }

    pub fn custom_halt(&mut self, flag: impl Into<u8>) -> Result<(), EmuError> {
        self.call(Op::CustomHalt, &[flag.into() as u32])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Regs;

    fn machines() -> [Machine; 2] {
        [
            Machine::new(MachineConfig::new(Encoding::Thumb)),
            Machine::new(MachineConfig::new(Encoding::Arm)),
        ]
    }

    #[test]
    fn clobbers_are_poisoned() {
        for mut m in machines() {
            m.set_reg(2, 7);
            m.div(10, 3).unwrap();
            assert_eq!(m.regs()[2], 0xDEAD_BEEF);
            assert_eq!(&m.regs()[0..4], &[3, 1, 0xDEAD_BEEF, 3]);
        }
    }

    #[test]
    fn callee_saved_registers_survive() {
        for mut m in machines() {
            for n in 4..=11 {
                m.set_reg(n, 0x1000 + n as u32);
            }
            m.enable_irqs(Irq::VBLANK).unwrap();
            m.halt().unwrap();
            m.vblank_intr_wait().unwrap();
            m.custom_halt(0u8).unwrap();
            for n in 4..=11 {
                assert_eq!(m.regs()[n], 0x1000 + n as u32);
            }
            assert_eq!(m.regs()[13], INITIAL_SP);
        }
    }

    #[test]
    fn arm_halt_trashes_ip_and_lr_only() {
        let mut m = Machine::new(MachineConfig::new(Encoding::Arm));
        m.enable_irqs(Irq::VBLANK).unwrap();
        for n in 0..=3 {
            m.set_reg(n, 0x55);
        }
        m.halt().unwrap();
        let poison = m.config().poison;
        assert_eq!(&m.regs()[0..4], &[0x55, 0x55, poison, 0x55]);
        assert_eq!(m.regs()[12], poison);
        assert_eq!(m.regs()[14], poison);
    }

    #[test]
    fn thumb_custom_halt_keeps_r2() {
        let mut m = Machine::new(MachineConfig::new(Encoding::Thumb));
        m.enable_irqs(Irq::VBLANK).unwrap();
        m.custom_halt(0x00u8).unwrap();
        assert_eq!(m.regs()[2], 0);
        assert!(Contract::of(Op::CustomHalt, Encoding::Thumb).clobbers.contains(Regs::R3));
    }

    #[test]
    fn undeclared_clobber_is_reported() {
        let mut m = Machine::new(MachineConfig::new(Encoding::Arm));
        m.enable_irqs(Irq::VBLANK).unwrap();
        m.set_reg(2, 0x55);
        let narrow = Contract {
            clobbers: Regs::R12 | Regs::LR,
            ..Contract::of(Op::Halt, Encoding::Arm)
        };
        assert_eq!(
            m.call_with(narrow, &[]),
            Err(EmuError::ContractViolation { op: Op::Halt, reg: 2 })
        );
    }

    #[test]
    fn undeclared_jump_scratch_is_reported() {
        let mut m = Machine::new(MachineConfig::new(Encoding::Arm));
        m.enable_irqs(Irq::VBLANK).unwrap();
        let narrow = Contract {
            clobbers: Regs::R2,
            ..Contract::of(Op::Halt, Encoding::Arm)
        };
        assert_eq!(
            m.call_with(narrow, &[]),
            Err(EmuError::ContractViolation { op: Op::Halt, reg: 12 })
        );
    }

    #[test]
    #[should_panic]
    fn set_reg_rejects_non_register() {
        Machine::new(MachineConfig::default()).set_reg(16, 0);
    }

    #[test]
    fn wrong_argument_count() {
        let mut m = Machine::new(MachineConfig::default());
        assert_eq!(
            m.call(Op::Div, &[1]),
            Err(EmuError::BadArgCount {
                op: Op::Div,
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn hard_reset_reboots() {
        let mut m = Machine::new(MachineConfig::default());
        m.bus_mut().write32(hw::EWRAM_BASE, 0xFFFF_FFFF).unwrap();
        m.set_reg(5, 9);
        assert_eq!(m.call(Op::HardReset, &[]), Ok(Outcome::Reset));
        assert_eq!(m.bus().read32(hw::EWRAM_BASE), Ok(0));
        assert_eq!(m.regs()[5], 0);
        assert_eq!(m.regs()[15], ROM_ENTRY);
        assert_eq!(m.resets(), 1);
    }
}
