//! SD Card Service
//!
//! Mount-state tracking over an installable card backend. `available` also
//! consults the platform feature mask so builds without an SD slot report
//! honestly.

use core::ffi::{c_char, c_int, c_uint};

use spin::Mutex;

use crate::platform::{self, Feature};

use super::SvcError;

pub trait SdCard: Send {
    fn mount(&mut self, path: &str) -> Result<(), SvcError>;
    fn unmount(&mut self) -> Result<(), SvcError>;
    fn capacity_bytes(&self) -> u64;
    fn free_bytes(&self) -> u64;
}

struct SdState {
    card: Option<Box<dyn SdCard>>,
    mounted_at: Option<heapless::String<64>>,
}

static STATE: Mutex<SdState> = Mutex::new(SdState {
    card: None,
    mounted_at: None,
});

pub fn install(card: Box<dyn SdCard>) {
    let mut st = STATE.lock();
    st.card = Some(card);
    st.mounted_at = None;
}

pub fn uninstall() {
    let mut st = STATE.lock();
    st.card = None;
    st.mounted_at = None;
}

pub fn available() -> bool {
    platform::features().has(Feature::SD_CARD) && STATE.lock().card.is_some()
}

pub fn is_mounted() -> bool {
    STATE.lock().mounted_at.is_some()
}

pub fn mount(path: &str) -> Result<(), SvcError> {
    let mut st = STATE.lock();
    if st.mounted_at.is_some() {
        return Err(SvcError::BadState);
    }
    let mut at = heapless::String::new();
    at.push_str(path).map_err(|_| SvcError::InvalidArg)?;
    let card = st.card.as_deref_mut().ok_or(SvcError::NoDevice)?;
    card.mount(path)?;
    st.mounted_at = Some(at);
    Ok(())
}

/// Unmount the card. The path must match the one given at mount time.
pub fn unmount(path: &str) -> Result<(), SvcError> {
    let mut st = STATE.lock();
    match &st.mounted_at {
        None => return Err(SvcError::BadState),
        Some(at) if at.as_str() != path => return Err(SvcError::InvalidArg),
        Some(_) => {}
    }
    let card = st.card.as_deref_mut().ok_or(SvcError::NoDevice)?;
    card.unmount()?;
    st.mounted_at = None;
    Ok(())
}

/// Free bytes on the mounted filesystem; 0 while nothing is mounted.
pub fn free_space() -> u64 {
    let st = STATE.lock();
    if st.mounted_at.is_none() {
        return 0;
    }
    st.card.as_deref().map(SdCard::free_bytes).unwrap_or(0)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITY EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

/// # Safety
/// `path` must be a NUL-terminated string.
pub unsafe extern "C" fn launchpad_sd_mount(path: *const c_char) -> c_int {
    if path.is_null() {
        return super::STATUS_ERR;
    }
    match core::ffi::CStr::from_ptr(path).to_str() {
        Ok(p) => super::status(mount(p)),
        Err(_) => super::STATUS_ERR,
    }
}

/// # Safety
/// `path` must be a NUL-terminated string.
pub unsafe extern "C" fn launchpad_sd_unmount(path: *const c_char) -> c_int {
    if path.is_null() {
        return super::STATUS_ERR;
    }
    match core::ffi::CStr::from_ptr(path).to_str() {
        Ok(p) => super::status(unmount(p)),
        Err(_) => super::STATUS_ERR,
    }
}

pub extern "C" fn launchpad_sd_is_mounted() -> c_int {
    is_mounted() as c_int
}

pub extern "C" fn launchpad_sd_available() -> c_int {
    available() as c_int
}

pub extern "C" fn launchpad_sd_free_space() -> c_uint {
    // Clamp to 32 bits for the module ABI.
    free_space().min(c_uint::MAX as u64) as c_uint
}
