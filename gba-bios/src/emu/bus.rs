//! Flat model of the GBA address space.
//!
//! Each region is a zero-initialized byte array at its base address. Mirrors
//! and open-bus reads are not modelled: anything outside a region is
//! [`EmuError::Unmapped`]. All accesses are little-endian.

use super::EmuError;
use crate::hw;

#[derive(Clone, PartialEq, Eq)]
struct Region {
    name: &'static str,
    base: u32,
    data: Vec<u8>,
    writable: bool,
}

impl Region {
    fn new(name: &'static str, base: u32, size: u32, writable: bool) -> Self {
        Self {
            name,
            base,
            data: vec![0; size as usize],
            writable,
        }
    }

    fn end(&self) -> u64 {
        self.base as u64 + self.data.len() as u64
    }
}

/// The memory regions the firmware routines can reach.
#[derive(Clone, PartialEq, Eq)]
pub struct Bus {
    regions: Vec<Region>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            regions: vec![
                Region::new("bios", hw::BIOS_BASE, hw::BIOS_SIZE, false),
                Region::new("ewram", hw::EWRAM_BASE, hw::EWRAM_SIZE, true),
                Region::new("iwram", hw::IWRAM_BASE, hw::IWRAM_SIZE, true),
                Region::new("io", hw::IO_BASE, hw::IO_SIZE, true),
                Region::new("palette", hw::PALETTE_BASE, hw::PALETTE_SIZE, true),
                Region::new("vram", hw::VRAM_BASE, hw::VRAM_SIZE, true),
                Region::new("oam", hw::OAM_BASE, hw::OAM_SIZE, true),
            ],
        }
    }

    /// Region index and offset for `len` bytes at `addr`.
    fn locate(&self, addr: u32, len: u32) -> Result<(usize, usize), EmuError> {
        let end = addr as u64 + len as u64;
        self.regions
            .iter()
            .position(|r| addr >= r.base && end <= r.end())
            .map(|i| (i, (addr - self.regions[i].base) as usize))
            .ok_or(EmuError::Unmapped { addr })
    }

    fn locate_mut(&mut self, addr: u32, len: u32) -> Result<&mut [u8], EmuError> {
        let (i, off) = self.locate(addr, len)?;
        let region = &mut self.regions[i];
        if !region.writable {
            return Err(EmuError::ReadOnly { addr });
        }
        Ok(&mut region.data[off..off + len as usize])
    }

    /// Borrow `len` bytes at `addr`.
    pub fn slice(&self, addr: u32, len: u32) -> Result<&[u8], EmuError> {
        let (i, off) = self.locate(addr, len)?;
        Ok(&self.regions[i].data[off..off + len as usize])
    }

    pub fn read8(&self, addr: u32) -> Result<u8, EmuError> {
        Ok(self.slice(addr, 1)?[0])
    }

    pub fn read16(&self, addr: u32) -> Result<u16, EmuError> {
        let b = self.slice(addr, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read32(&self, addr: u32) -> Result<u32, EmuError> {
        let b = self.slice(addr, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn write8(&mut self, addr: u32, value: u8) -> Result<(), EmuError> {
        self.locate_mut(addr, 1)?[0] = value;
        Ok(())
    }

    pub fn write16(&mut self, addr: u32, value: u16) -> Result<(), EmuError> {
        self.locate_mut(addr, 2)?.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write32(&mut self, addr: u32, value: u32) -> Result<(), EmuError> {
        self.locate_mut(addr, 4)?.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Copy `bytes` into memory starting at `addr`.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) -> Result<(), EmuError> {
        self.locate_mut(addr, bytes.len() as u32)?
            .copy_from_slice(bytes);
        Ok(())
    }

    /// Set `len` bytes at `addr` to `byte`.
    pub fn fill(&mut self, addr: u32, len: u32, byte: u8) -> Result<(), EmuError> {
        self.locate_mut(addr, len)?.fill(byte);
        Ok(())
    }

    /// Fill every writable region with `byte`.
    pub fn fill_all(&mut self, byte: u8) {
        for region in self.regions.iter_mut().filter(|r| r.writable) {
            region.data.fill(byte);
        }
    }

    /// Lowest address whose byte differs between `self` and `other`.
    pub fn first_difference(&self, other: &Bus) -> Option<u32> {
        self.regions.iter().zip(&other.regions).find_map(|(a, b)| {
            a.data
                .iter()
                .zip(&b.data)
                .position(|(x, y)| x != y)
                .map(|off| a.base + off as u32)
        })
    }
}

impl core::fmt::Debug for Bus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut list = f.debug_list();
        for r in &self.regions {
            list.entry(&format_args!(
                "{}@{:#010x}+{:#x}",
                r.name,
                r.base,
                r.data.len()
            ));
        }
        list.finish()
    }
}
