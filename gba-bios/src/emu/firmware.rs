//! Models of the BIOS routines.
//!
//! Each routine reads its arguments from the register file, acts on the bus
//! and clock, and leaves its results in registers, the way the real routine
//! does. Scratch registers are not tidied up here; [`Machine::call`] poisons
//! them afterwards.

use log::{debug, trace};

use super::clock::Irq;
use super::{EmuError, Machine, Outcome};
use crate::abi::{CUSTOM_HALT_ENTRY, Entry, HALT_ENTRY, Op, STOP_ENTRY};
use crate::copy::CpuSetMode;
use crate::hw;
use crate::power::HaltMode;
use crate::reset::RamResetFlags;
use crate::unpack::UnpackBias;

type RoutineResult = Result<Outcome, EmuError>;

macro_rules! dispatch {
    ($m:ident, $op:expr; $($name:ident),+ $(,)?) => {
        paste::paste! {
            match $op {
                $( Op::$name => [<$name:snake>]($m), )+
            }
        }
    };
}

/// Transfer control into the firmware at `entry`.
pub(super) fn enter(m: &mut Machine, entry: Entry) -> RoutineResult {
    match entry {
        Entry::Svc(operand) => {
            let number = m.config.encoding.svc_number(operand);
            let op = Op::try_from(number).map_err(|_| EmuError::UnknownEntry { entry })?;
            dispatch!(m, op;
                RegisterRamReset,
                Halt,
                Stop,
                VblankIntrWait,
                Div,
                CpuSet,
                BitUnpack,
                SoundBias,
                HardReset,
                CustomHalt,
            )
        }
        Entry::Jump(addr) => {
            // `mov lr, pc` in ARM state reads two instructions ahead.
            m.regs[14] = m.regs[15].wrapping_add(8);
            m.regs[12] = hw::IO_BASE;
            match addr {
                HALT_ENTRY => halt(m),
                STOP_ENTRY => stop(m),
                CUSTOM_HALT_ENTRY => custom_halt(m),
                _ => Err(EmuError::UnknownEntry { entry }),
            }
        }
    }
}

fn register_ram_reset(m: &mut Machine) -> RoutineResult {
    let flags = RamResetFlags::from_bits_retain(m.regs[0] as u8);
    trace!("RegisterRamReset {flags:?}");

    let ram = [
        (RamResetFlags::EWRAM, hw::EWRAM_BASE, hw::EWRAM_SIZE),
        (RamResetFlags::IWRAM, hw::IWRAM_BASE, hw::IWRAM_SIZE - hw::IWRAM_RESERVED),
        (RamResetFlags::PALETTE, hw::PALETTE_BASE, hw::PALETTE_SIZE),
        (RamResetFlags::VRAM, hw::VRAM_BASE, hw::VRAM_SIZE),
        (RamResetFlags::OAM, hw::OAM_BASE, hw::OAM_SIZE),
    ];
    for (flag, base, size) in ram {
        if flags.contains(flag) {
            m.bus.fill(base, size, 0)?;
        }
    }

    if flags.contains(RamResetFlags::SIO_REG) {
        clear_io(m, hw::SIO_REGS.start, hw::SIO_REGS.end)?;
    }
    if flags.contains(RamResetFlags::SOUND_REG) {
        // The bias survives a sound reset.
        let bias = m.bus.read16(hw::REG_SOUNDBIAS)?;
        clear_io(m, hw::SOUND_REGS.start, hw::SOUND_REGS.end)?;
        m.bus.write16(hw::REG_SOUNDBIAS, bias)?;
    }
    if flags.contains(RamResetFlags::REG) {
        clear_io(m, 0, hw::SOUND_REGS.start)?;
        clear_io(m, hw::SOUND_REGS.end, hw::SIO_REGS.start)?;
        clear_io(m, hw::SIO_REGS.end, hw::IO_SIZE)?;
    }
    Ok(Outcome::Returned)
}

fn clear_io(m: &mut Machine, start: u32, end: u32) -> Result<(), EmuError> {
    m.bus.fill(hw::IO_BASE + start, end - start, 0)
}

fn halt(m: &mut Machine) -> RoutineResult {
    m.regs[2] = u8::from(HaltMode::Halt) as u32;
    suspend(m, Op::Halt)
}

fn stop(m: &mut Machine) -> RoutineResult {
    m.regs[2] = u8::from(HaltMode::Stop) as u32;
    suspend(m, Op::Stop)
}

fn custom_halt(m: &mut Machine) -> RoutineResult {
    suspend(m, Op::CustomHalt)
}

/// The shared tail of all halt entries: store `r2` to `HALTCNT` and sleep.
fn suspend(m: &mut Machine, op: Op) -> RoutineResult {
    let value = m.regs[2] as u8;
    m.bus.write8(hw::REG_HALTCNT, value)?;

    let enabled = Irq::from_bits_truncate(m.bus.read16(hw::REG_IE)?);
    let sources = match HaltMode::from_haltcnt(value) {
        HaltMode::Halt => enabled,
        HaltMode::Stop => enabled & Irq::WAKES_FROM_STOP,
    };
    wake_on(m, op, sources)
}

fn wake_on(m: &mut Machine, op: Op, sources: Irq) -> RoutineResult {
    let (at, irq) = m
        .clock
        .wait_for(sources)
        .ok_or(EmuError::NeverWakes { op })?;
    trace!("{op:?} woke at cycle {at} on {irq:?}");
    m.last_wake = Some(irq);
    Ok(Outcome::Returned)
}

fn vblank_intr_wait(m: &mut Machine) -> RoutineResult {
    // IntrWait(discard = 1, flags = VBLANK)
    m.regs[0] = 1;
    m.regs[1] = Irq::VBLANK.bits() as u32;
    m.bus.write16(hw::REG_IME, 1)?;

    let enabled = Irq::from_bits_truncate(m.bus.read16(hw::REG_IE)?);
    if !enabled.contains(Irq::VBLANK) {
        return Err(EmuError::NeverWakes {
            op: Op::VblankIntrWait,
        });
    }

    m.clock.discard_due(Irq::VBLANK);
    wake_on(m, Op::VblankIntrWait, Irq::VBLANK)?;

    let bios_if = m.bus.read16(hw::BIOS_IF)?;
    m.bus.write16(hw::BIOS_IF, bios_if & !Irq::VBLANK.bits())?;
    Ok(Outcome::Returned)
}

fn div(m: &mut Machine) -> RoutineResult {
    let num = m.regs[0] as i32;
    let denom = m.regs[1] as i32;
    if denom == 0 {
        debug!("Div {num} / 0");
        return Err(EmuError::Unspecified {
            op: Op::Div,
            reason: "division by zero",
        });
    }
    let quot = num.wrapping_div(denom);
    m.regs[0] = quot as u32;
    m.regs[1] = num.wrapping_rem(denom) as u32;
    m.regs[3] = quot.unsigned_abs();
    Ok(Outcome::Returned)
}

fn cpu_set(m: &mut Machine) -> RoutineResult {
    let mode = CpuSetMode::from_bits(m.regs[2]);
    let unit = mode.unit_bytes();
    let src = m.regs[0] & !(unit - 1);
    let dst = m.regs[1] & !(unit - 1);
    trace!("CpuSet {src:#010x} -> {dst:#010x} {mode:?}");

    if src & 0x0E00_0000 == 0 {
        debug!("CpuSet source {src:#010x} lies in the BIOS, ignored");
        return Ok(Outcome::Returned);
    }

    for i in 0..mode.count() {
        let from = if mode.fixed_source() { src } else { src + i * unit };
        let to = dst + i * unit;
        if mode.word32() {
            let v = m.bus.read32(from)?;
            m.bus.write32(to, v)?;
        } else {
            let v = m.bus.read16(from)?;
            m.bus.write16(to, v)?;
        }
    }
    Ok(Outcome::Returned)
}

fn bit_unpack(m: &mut Machine) -> RoutineResult {
    let src = m.regs[0];
    let mut dst = m.regs[1] & !3;
    let params = m.regs[2];

    let size = m.bus.read16(params)?;
    let in_bits = m.bus.read8(params + 2)? as u32;
    let out_bits = m.bus.read8(params + 3)? as u32;
    let bias = UnpackBias::from_bits(m.bus.read32(params + 4)?);
    trace!("BitUnPack {src:#010x} -> {dst:#010x} size={size} {in_bits}->{out_bits} {bias:?}");

    let unspecified = |reason: &'static str| -> RoutineResult {
        debug!("BitUnPack: {reason}");
        Err(EmuError::Unspecified {
            op: Op::BitUnpack,
            reason,
        })
    };
    match in_bits {
        0 => return unspecified("zero source unit width"),
        1 | 2 | 4 | 8 => {}
        _ => return unspecified("source unit width not 1, 2, 4 or 8"),
    }
    if !matches!(out_bits, 1 | 2 | 4 | 8 | 16 | 32) {
        return unspecified("destination unit width not 1, 2, 4, 8, 16 or 32");
    }

    let mask = (1u32 << in_bits) - 1;
    let mut word = 0u32;
    let mut filled = 0u32;
    for i in 0..size as u32 {
        let mut byte = m.bus.read8(src + i)? as u32;
        for _ in 0..8 / in_bits {
            let mut unit = byte & mask;
            byte >>= in_bits;
            if unit != 0 || bias.zero() {
                unit = unit.wrapping_add(bias.offset());
            }
            word |= unit << filled;
            filled += out_bits;
            if filled == 32 {
                m.bus.write32(dst, word)?;
                dst += 4;
                word = 0;
                filled = 0;
            }
        }
    }
    Ok(Outcome::Returned)
}

fn sound_bias(m: &mut Machine) -> RoutineResult {
    let target = if m.regs[0] == 0 {
        0
    } else {
        hw::SOUND_BIAS_LEVEL_MAX
    };
    let current = m.bus.read16(hw::REG_SOUNDBIAS)?;
    let next = (current & !hw::SOUND_BIAS_LEVEL_MASK) | target;
    trace!("SoundBias {current:#06x} -> {next:#06x}");
    m.bus.write16(hw::REG_SOUNDBIAS, next)?;
    Ok(Outcome::Returned)
}

fn hard_reset(m: &mut Machine) -> RoutineResult {
    debug!("HardReset after {} cycles", m.clock.now());
    m.power_on();
    m.resets += 1;
    Ok(Outcome::Reset)
}
