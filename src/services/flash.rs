//! Flash Service
//!
//! Sector-addressed flash access behind an installable device seam. The
//! simulated backend models NOR flash program semantics: erase fills a
//! sector with 0xFF, programming can only clear bits.

use core::ffi::{c_int, c_uint};

use spin::Mutex;

use super::SvcError;

pub const SECTOR_SIZE: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// DEVICE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

pub trait FlashDevice: Send {
    fn size(&self) -> usize;

    fn sector_size(&self) -> usize {
        SECTOR_SIZE
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), SvcError>;
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), SvcError>;
    fn erase_sector(&mut self, sector: usize) -> Result<(), SvcError>;

    fn erase_range(&mut self, offset: usize, len: usize) -> Result<(), SvcError> {
        let sector = self.sector_size();
        if offset % sector != 0 || len % sector != 0 {
            return Err(SvcError::InvalidArg);
        }
        for s in (offset / sector)..((offset + len) / sector) {
            self.erase_sector(s)?;
        }
        Ok(())
    }

    /// Map a flash window for direct reads. The pointer stays valid until
    /// the matching `unmap`.
    fn map(&mut self, offset: usize, len: usize) -> Result<*const u8, SvcError>;
    fn unmap(&mut self, ptr: *const u8) -> Result<(), SvcError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIMULATED BACKEND
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory flash image. Backing storage is boxed so mapped pointers stay
/// stable across calls that take `&mut self`.
pub struct RamFlash {
    mem: Box<[u8]>,
    mapped: usize,
}

impl RamFlash {
    pub fn new(sectors: usize) -> RamFlash {
        RamFlash {
            mem: vec![0xFF; sectors * SECTOR_SIZE].into_boxed_slice(),
            mapped: 0,
        }
    }

    fn check(&self, offset: usize, len: usize) -> Result<(), SvcError> {
        if offset.checked_add(len).map_or(true, |end| end > self.mem.len()) {
            Err(SvcError::Bounds)
        } else {
            Ok(())
        }
    }
}

impl FlashDevice for RamFlash {
    fn size(&self) -> usize {
        self.mem.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), SvcError> {
        self.check(offset, buf.len())?;
        buf.copy_from_slice(&self.mem[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), SvcError> {
        self.check(offset, data.len())?;
        // NOR program: bits go 1 -> 0 only.
        for (cell, byte) in self.mem[offset..offset + data.len()].iter_mut().zip(data) {
            *cell &= *byte;
        }
        Ok(())
    }

    fn erase_sector(&mut self, sector: usize) -> Result<(), SvcError> {
        let offset = sector * SECTOR_SIZE;
        self.check(offset, SECTOR_SIZE)?;
        self.mem[offset..offset + SECTOR_SIZE].fill(0xFF);
        Ok(())
    }

    fn map(&mut self, offset: usize, len: usize) -> Result<*const u8, SvcError> {
        self.check(offset, len)?;
        self.mapped += 1;
        Ok(self.mem[offset..].as_ptr())
    }

    fn unmap(&mut self, _ptr: *const u8) -> Result<(), SvcError> {
        if self.mapped == 0 {
            return Err(SvcError::BadState);
        }
        self.mapped -= 1;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INSTALLED DEVICE
// ═══════════════════════════════════════════════════════════════════════════════

static DEV: Mutex<Option<Box<dyn FlashDevice>>> = Mutex::new(None);

pub fn install(dev: Box<dyn FlashDevice>) {
    *DEV.lock() = Some(dev);
}

pub fn uninstall() {
    *DEV.lock() = None;
}

pub fn with<R>(f: impl FnOnce(&mut dyn FlashDevice) -> Result<R, SvcError>) -> Result<R, SvcError> {
    match DEV.lock().as_deref_mut() {
        Some(dev) => f(dev),
        None => Err(SvcError::NoDevice),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITY EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

pub extern "C" fn launchpad_flash_size() -> c_uint {
    with(|dev| Ok(dev.size())).unwrap_or(0) as c_uint
}

/// # Safety
/// `buf` must be valid for `len` writable bytes.
pub unsafe extern "C" fn launchpad_flash_read(offset: c_uint, buf: *mut u8, len: c_uint) -> c_int {
    if buf.is_null() {
        return super::STATUS_ERR;
    }
    let slice = core::slice::from_raw_parts_mut(buf, len as usize);
    super::status(with(|dev| dev.read(offset as usize, slice)))
}

/// # Safety
/// `data` must be valid for `len` readable bytes.
pub unsafe extern "C" fn launchpad_flash_write(
    offset: c_uint,
    data: *const u8,
    len: c_uint,
) -> c_int {
    if data.is_null() {
        return super::STATUS_ERR;
    }
    let slice = core::slice::from_raw_parts(data, len as usize);
    super::status(with(|dev| dev.write(offset as usize, slice)))
}

pub extern "C" fn launchpad_flash_erase(sector: c_uint) -> c_int {
    super::status(with(|dev| dev.erase_sector(sector as usize)))
}

pub extern "C" fn launchpad_flash_erase_range(offset: c_uint, len: c_uint) -> c_int {
    super::status(with(|dev| dev.erase_range(offset as usize, len as usize)))
}

pub extern "C" fn launchpad_flash_mmap(offset: c_uint, len: c_uint) -> *const u8 {
    with(|dev| dev.map(offset as usize, len as usize)).unwrap_or(core::ptr::null())
}

pub extern "C" fn launchpad_flash_munmap(ptr: *const u8) -> c_int {
    super::status(with(|dev| dev.unmap(ptr)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erase_then_program_clears_bits_only() {
        let mut flash = RamFlash::new(2);
        flash.erase_sector(0).unwrap();
        flash.write(16, &[0x0F]).unwrap();
        // Second program cannot set bits back.
        flash.write(16, &[0xF0]).unwrap();
        let mut b = [0u8; 1];
        flash.read(16, &mut b).unwrap();
        assert_eq!(b[0], 0x00);
    }

    #[test]
    fn out_of_range_access_is_rejected() {
        let mut flash = RamFlash::new(1);
        let mut buf = [0u8; 8];
        assert_eq!(flash.read(SECTOR_SIZE - 4, &mut buf), Err(SvcError::Bounds));
        assert_eq!(flash.erase_sector(1), Err(SvcError::Bounds));
        assert_eq!(
            flash.erase_range(0, SECTOR_SIZE + 1),
            Err(SvcError::InvalidArg)
        );
    }

    #[test]
    fn map_unmap_balance() {
        let mut flash = RamFlash::new(1);
        let p = flash.map(0, 64).unwrap();
        assert!(!p.is_null());
        flash.unmap(p).unwrap();
        assert_eq!(flash.unmap(p), Err(SvcError::BadState));
    }
}
