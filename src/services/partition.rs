//! Partition Service
//!
//! A fixed table of labeled windows over the flash device. Lookups hand out
//! integer handles; every data operation is clamped to the owning window
//! before it reaches flash.

use core::ffi::{c_char, c_int, c_uint};

use spin::Mutex;

use super::{flash, SvcError};

pub const MAX_PARTITIONS: usize = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum PartKind {
    App = 0,
    Data = 1,
}

#[derive(Clone, Copy, Debug)]
pub struct Partition {
    pub label: &'static str,
    pub kind: PartKind,
    pub offset: usize,
    pub size: usize,
}

static TABLE: Mutex<heapless::Vec<Partition, MAX_PARTITIONS>> =
    Mutex::new(heapless::Vec::new());

/// Replace the partition table. Called once by the registrar during boot.
pub fn install(parts: &[Partition]) -> Result<(), SvcError> {
    let mut table = TABLE.lock();
    table.clear();
    for p in parts {
        table.push(*p).map_err(|_| SvcError::InvalidArg)?;
    }
    Ok(())
}

pub fn uninstall() {
    TABLE.lock().clear();
}

/// Look up a partition by kind and optionally by label. Returns an opaque
/// handle usable with the data operations.
pub fn find(kind: PartKind, label: Option<&str>) -> Option<usize> {
    TABLE
        .lock()
        .iter()
        .position(|p| p.kind == kind && label.map_or(true, |l| l == p.label))
}

pub fn get(handle: usize) -> Result<Partition, SvcError> {
    TABLE.lock().get(handle).copied().ok_or(SvcError::NotFound)
}

fn window(handle: usize, offset: usize, len: usize) -> Result<usize, SvcError> {
    let part = get(handle)?;
    if offset.checked_add(len).map_or(true, |end| end > part.size) {
        return Err(SvcError::Bounds);
    }
    Ok(part.offset + offset)
}

pub fn read(handle: usize, offset: usize, buf: &mut [u8]) -> Result<(), SvcError> {
    let abs = window(handle, offset, buf.len())?;
    flash::with(|dev| dev.read(abs, buf))
}

pub fn write(handle: usize, offset: usize, data: &[u8]) -> Result<(), SvcError> {
    let abs = window(handle, offset, data.len())?;
    flash::with(|dev| dev.write(abs, data))
}

pub fn erase_range(handle: usize, offset: usize, len: usize) -> Result<(), SvcError> {
    let abs = window(handle, offset, len)?;
    flash::with(|dev| dev.erase_range(abs, len))
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITY EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Find a partition; returns a non-negative handle or -1.
///
/// # Safety
/// `label` is either null (match any label) or a NUL-terminated string.
pub unsafe extern "C" fn launchpad_partition_find(kind: c_int, label: *const c_char) -> c_int {
    let kind = match kind {
        0 => PartKind::App,
        1 => PartKind::Data,
        _ => return -1,
    };
    let label = if label.is_null() {
        None
    } else {
        match core::ffi::CStr::from_ptr(label).to_str() {
            Ok(l) => Some(l),
            Err(_) => return -1,
        }
    };
    match find(kind, label) {
        Some(handle) => handle as c_int,
        None => -1,
    }
}

pub extern "C" fn launchpad_partition_size(handle: c_int) -> c_uint {
    if handle < 0 {
        return 0;
    }
    get(handle as usize).map(|p| p.size).unwrap_or(0) as c_uint
}

/// # Safety
/// `buf` must be valid for `len` writable bytes.
pub unsafe extern "C" fn launchpad_partition_read(
    handle: c_int,
    offset: c_uint,
    buf: *mut u8,
    len: c_uint,
) -> c_int {
    if handle < 0 || buf.is_null() {
        return super::STATUS_ERR;
    }
    let slice = core::slice::from_raw_parts_mut(buf, len as usize);
    super::status(read(handle as usize, offset as usize, slice))
}

/// # Safety
/// `data` must be valid for `len` readable bytes.
pub unsafe extern "C" fn launchpad_partition_write(
    handle: c_int,
    offset: c_uint,
    data: *const u8,
    len: c_uint,
) -> c_int {
    if handle < 0 || data.is_null() {
        return super::STATUS_ERR;
    }
    let slice = core::slice::from_raw_parts(data, len as usize);
    super::status(write(handle as usize, offset as usize, slice))
}

pub extern "C" fn launchpad_partition_erase_range(
    handle: c_int,
    offset: c_uint,
    len: c_uint,
) -> c_int {
    if handle < 0 {
        return super::STATUS_ERR;
    }
    super::status(erase_range(handle as usize, offset as usize, len as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test body: the table is process-wide state.
    #[test]
    fn find_and_window_bounds() {
        let parts = [
            Partition {
                label: "boot",
                kind: PartKind::App,
                offset: 0,
                size: 0x1000,
            },
            Partition {
                label: "store",
                kind: PartKind::Data,
                offset: 0x1000,
                size: 0x2000,
            },
        ];
        install(&parts).unwrap();

        assert_eq!(find(PartKind::App, None), Some(0));
        assert_eq!(find(PartKind::Data, Some("store")), Some(1));
        assert_eq!(find(PartKind::Data, Some("boot")), None);

        assert_eq!(window(1, 0, 0x2000), Ok(0x1000));
        assert_eq!(window(1, 0x1FFF, 1), Ok(0x2FFF));
        assert_eq!(window(1, 0x2000, 1), Err(SvcError::Bounds));
        assert_eq!(window(1, usize::MAX, 2), Err(SvcError::Bounds));
        assert_eq!(window(9, 0, 1), Err(SvcError::NotFound));

        uninstall();
    }
}
