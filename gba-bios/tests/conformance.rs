//! Thumb and ARM builds must be indistinguishable to the program: the same
//! sequence of calls leaves memory, I/O, timing and results identical. Only
//! the set of trashed scratch registers may differ.

use gba_bios::abi::{Contract, Encoding, Op, Regs};
use gba_bios::emu::{CYCLES_PER_FRAME, EmuError, Irq, Machine, MachineConfig};
use gba_bios::hw;
use gba_bios::{BitUnPackParams, CpuSetMode, DivResult, HaltMode, RamResetFlags};

#[derive(Debug, Clone, Copy)]
enum Step {
    Reset(RamResetFlags),
    Halt,
    Stop,
    VblankWait,
    Div(i32, i32),
    CpuSet(u32, u32, CpuSetMode),
    Unpack(BitUnPackParams),
    SoundBias(u32),
    CustomHalt(u8),
    HardReset,
    Raise(Irq, u64),
    Enable(Irq),
}

#[derive(Debug, PartialEq, Eq)]
enum Returned {
    Unit,
    Div(DivResult),
}

const UNPACK_SRC: u32 = hw::EWRAM_BASE + 0x1000;
const UNPACK_DST: u32 = hw::VRAM_BASE + 0x4000;
const UNPACK_PARAMS: u32 = hw::IWRAM_BASE + 0x40;

fn run(m: &mut Machine, step: Step) -> Result<Returned, EmuError> {
    match step {
        Step::Reset(flags) => m.register_ram_reset(flags)?,
        Step::Halt => m.halt()?,
        Step::Stop => m.stop()?,
        Step::VblankWait => m.vblank_intr_wait()?,
        Step::Div(n, d) => return m.div(n, d).map(Returned::Div),
        Step::CpuSet(src, dst, mode) => m.cpu_set(src, dst, mode)?,
        Step::Unpack(params) => {
            m.write_unpack_params(UNPACK_PARAMS, &params)?;
            m.bit_unpack(UNPACK_SRC, UNPACK_DST, UNPACK_PARAMS)?
        }
        Step::SoundBias(level) => m.sound_bias(level)?,
        Step::CustomHalt(flag) => m.custom_halt(flag)?,
        Step::HardReset => m.hard_reset()?,
        Step::Raise(irq, delay) => m.raise(irq, delay),
        Step::Enable(irqs) => m.enable_irqs(irqs)?,
    }
    Ok(Returned::Unit)
}

fn seeded(encoding: Encoding) -> Machine {
    let mut m = Machine::new(MachineConfig::new(encoding));
    let seed: Vec<u8> = (0..=255u8).cycle().take(0x2000).collect();
    m.bus_mut().load(hw::EWRAM_BASE, &seed).unwrap();
    m.bus_mut().load(hw::IWRAM_BASE + 0x1000, &seed[..0x400]).unwrap();
    m.bus_mut().load(hw::PALETTE_BASE, &seed[..0x400]).unwrap();
    m
}

fn assert_same(script: &[Step]) {
    let mut thumb = seeded(Encoding::Thumb);
    let mut arm = seeded(Encoding::Arm);

    for (i, &step) in script.iter().enumerate() {
        let a = run(&mut thumb, step);
        let b = run(&mut arm, step);
        assert_eq!(a, b, "step {i} {step:?} returned differently");
        if thumb.observable() != arm.observable() {
            panic!(
                "step {i} {step:?}: state diverged at {:?}, cycles {} vs {}",
                thumb.bus().first_difference(arm.bus()),
                thumb.clock().now(),
                arm.clock().now()
            );
        }
    }
}

#[test]
fn full_script_matches() {
    assert_same(&[
        Step::Enable(Irq::VBLANK | Irq::KEYPAD | Irq::TIMER2),
        Step::Div(1234, 7),
        Step::Div(-1, 1),
        Step::Div(i32::MIN, -1),
        Step::CpuSet(hw::EWRAM_BASE, hw::VRAM_BASE, CpuSetMode::copy32(0x200)),
        Step::CpuSet(hw::EWRAM_BASE + 6, hw::OAM_BASE, CpuSetMode::fill16(0x100)),
        Step::CpuSet(hw::EWRAM_BASE + 1, hw::EWRAM_BASE + 0x11, CpuSetMode::copy16(0x40)),
        Step::Unpack(BitUnPackParams::new(64, 1, 4).with_bias(1, false)),
        Step::Unpack(BitUnPackParams::new(16, 4, 32).with_bias(0x100, true)),
        Step::SoundBias(1),
        Step::VblankWait,
        Step::Raise(Irq::TIMER2, 4000),
        Step::Halt,
        Step::Halt,
        Step::Raise(Irq::KEYPAD, 2 * CYCLES_PER_FRAME),
        Step::Stop,
        Step::CustomHalt(HaltMode::Halt.into()),
        Step::Raise(Irq::KEYPAD, 10),
        Step::CustomHalt(HaltMode::Stop.into()),
        Step::SoundBias(0),
        Step::Reset(RamResetFlags::PALETTE | RamResetFlags::SOUND_REG),
        Step::Reset(RamResetFlags::IWRAM | RamResetFlags::REG),
        Step::Enable(Irq::VBLANK),
        Step::VblankWait,
        Step::HardReset,
        Step::Div(99, 10),
    ]);
}

#[test]
fn failures_match() {
    assert_same(&[
        Step::Div(1, 0),
        Step::Halt,
        Step::Stop,
        Step::VblankWait,
        Step::Unpack(BitUnPackParams::new(4, 0, 8)),
        Step::CpuSet(hw::EWRAM_BASE, hw::OAM_BASE + hw::OAM_SIZE, CpuSetMode::copy32(1)),
    ]);
}

#[test]
fn every_reset_mask_matches() {
    let script: Vec<Step> = (0..=0xFFu8)
        .map(|mask| Step::Reset(RamResetFlags::from_bits_retain(mask)))
        .collect();
    assert_same(&script);
}

#[test]
fn only_scratch_registers_differ() {
    for op in Op::ALL.into_iter().filter(|op| op.returns()) {
        let thumb = Contract::of(op, Encoding::Thumb);
        let arm = Contract::of(op, Encoding::Arm);
        assert_eq!(thumb.inputs, arm.inputs, "{op:?}");
        assert_eq!(thumb.outputs, arm.outputs, "{op:?}");
        let either = thumb.clobbers | arm.clobbers;
        assert!(
            either.difference(Regs::SCRATCH | Regs::JUMP_SCRATCH).is_empty(),
            "{op:?}"
        );
    }
}
