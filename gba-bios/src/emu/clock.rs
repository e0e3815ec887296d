//! Cycle counter and interrupt timing.
//!
//! The only periodic source modelled is the vertical blank: one frame is
//! 228 lines of 1232 cycles, and the blank begins at line 160. Any other
//! interrupt is raised explicitly as a one-shot event.

use bitflags::bitflags;

pub const CYCLES_PER_LINE: u64 = 1232;
pub const LINES_PER_FRAME: u64 = 228;
pub const CYCLES_PER_FRAME: u64 = CYCLES_PER_LINE * LINES_PER_FRAME;
pub const VBLANK_LINE: u64 = 160;
/// Cycle within a frame at which the vertical blank starts.
pub const VBLANK_START: u64 = VBLANK_LINE * CYCLES_PER_LINE;

bitflags! {
    /// Interrupt sources, laid out as in `IE`/`IF`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Irq: u16 {
        const VBLANK = 1 << 0;
        const HBLANK = 1 << 1;
        const VCOUNT = 1 << 2;
        const TIMER0 = 1 << 3;
        const TIMER1 = 1 << 4;
        const TIMER2 = 1 << 5;
        const TIMER3 = 1 << 6;
        const SERIAL = 1 << 7;
        const DMA0 = 1 << 8;
        const DMA1 = 1 << 9;
        const DMA2 = 1 << 10;
        const DMA3 = 1 << 11;
        const KEYPAD = 1 << 12;
        const GAMEPAK = 1 << 13;

        /// Sources still active while stopped.
        const WAKES_FROM_STOP = Self::SERIAL.bits() | Self::KEYPAD.bits() | Self::GAMEPAK.bits();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clock {
    now: u64,
    /// One-shot interrupts, `(cycle, source)`.
    pending: Vec<(u64, Irq)>,
}

impl Clock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn advance(&mut self, cycles: u64) {
        self.now = self.now.saturating_add(cycles);
    }

    /// Raise `irq` once, `delay` cycles from now.
    pub fn schedule(&mut self, irq: Irq, delay: u64) {
        self.pending.push((self.now.saturating_add(delay), irq));
    }

    /// Start of the first vertical blank strictly after now.
    pub fn next_vblank(&self) -> u64 {
        let frame = self.now - self.now % CYCLES_PER_FRAME;
        if self.now % CYCLES_PER_FRAME < VBLANK_START {
            frame + VBLANK_START
        } else {
            frame + CYCLES_PER_FRAME + VBLANK_START
        }
    }

    /// Drop one-shot events for `irq` that are already due.
    pub fn discard_due(&mut self, irq: Irq) {
        let now = self.now;
        self.pending
            .retain(|&(at, src)| at > now || !src.intersects(irq));
    }

    /// Sleep until the earliest interrupt among `sources`.
    ///
    /// Advances the clock to the wake-up cycle and consumes the one-shot
    /// event that caused it. Returns `None` when nothing in `sources` can
    /// ever fire.
    pub fn wait_for(&mut self, sources: Irq) -> Option<(u64, Irq)> {
        let vblank = sources
            .contains(Irq::VBLANK)
            .then(|| (self.next_vblank(), None));
        let event = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, src))| src.intersects(sources))
            .map(|(i, &(at, _))| (at.max(self.now), Some(i)))
            .min_by_key(|&(at, _)| at);

        let (at, slot) = match (vblank, event) {
            (Some(v), Some(e)) if e.0 < v.0 => e,
            (Some(v), _) => v,
            (None, Some(e)) => e,
            (None, None) => return None,
        };
        let irq = match slot {
            Some(i) => self.pending.remove(i).1 & sources,
            None => Irq::VBLANK,
        };
        self.now = at;
        Some((at, irq))
    }
}
