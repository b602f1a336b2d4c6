//! Compiled-in symbol tiers
//!
//! The built-in library tier carries the memory/string/math fallbacks a
//! freestanding module expects to find without linking its own runtime;
//! the platform tier carries host runtime primitives. Both are built once
//! and live for the life of the process; const evaluation cannot take
//! function addresses, so the tables are once-initialized slices with a
//! read-only contract.

use core::ffi::{c_char, c_int};

use spin::Once;

use super::SymEntry;

// ═══════════════════════════════════════════════════════════════════════════════
// LIBRARY SHIMS
// ═══════════════════════════════════════════════════════════════════════════════

/// # Safety
/// `dst` must be valid for `len` writes.
pub unsafe extern "C" fn lp_memset(dst: *mut u8, val: c_int, len: usize) -> *mut u8 {
    if !dst.is_null() {
        core::ptr::write_bytes(dst, val as u8, len);
    }
    dst
}

/// # Safety
/// `src` must be valid for `len` reads, `dst` for `len` writes, and the
/// two ranges must not overlap.
pub unsafe extern "C" fn lp_memcpy(dst: *mut u8, src: *const u8, len: usize) -> *mut u8 {
    if !dst.is_null() && !src.is_null() {
        core::ptr::copy_nonoverlapping(src, dst, len);
    }
    dst
}

/// # Safety
/// Both pointers must be valid for `len` reads.
pub unsafe extern "C" fn lp_memcmp(a: *const u8, b: *const u8, len: usize) -> c_int {
    if a.is_null() || b.is_null() {
        return 0;
    }
    let lhs = core::slice::from_raw_parts(a, len);
    let rhs = core::slice::from_raw_parts(b, len);
    match lhs.cmp(rhs) {
        core::cmp::Ordering::Less => -1,
        core::cmp::Ordering::Equal => 0,
        core::cmp::Ordering::Greater => 1,
    }
}

/// # Safety
/// `s` must point to a NUL-terminated string.
pub unsafe extern "C" fn lp_strlen(s: *const c_char) -> usize {
    if s.is_null() {
        return 0;
    }
    let mut len = 0usize;
    while *s.add(len) != 0 {
        len += 1;
    }
    len
}

// Math fallbacks. Modules built for soft-float targets reference these
// instead of carrying their own implementations.

pub extern "C" fn lp_sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

pub extern "C" fn lp_pow(x: f64, y: f64) -> f64 {
    libm::pow(x, y)
}

pub extern "C" fn lp_fmod(x: f64, y: f64) -> f64 {
    libm::fmod(x, y)
}

pub extern "C" fn lp_floor(x: f64) -> f64 {
    libm::floor(x)
}

pub extern "C" fn lp_fabs(x: f64) -> f64 {
    libm::fabs(x)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLATFORM SHIMS
// ═══════════════════════════════════════════════════════════════════════════════

pub extern "C" fn lp_yield() {
    std::thread::yield_now();
}

pub extern "C" fn lp_sleep_ms(ms: u32) {
    std::thread::sleep(std::time::Duration::from_millis(ms as u64));
}

/// Milliseconds since the Unix epoch, 0 if the clock is unavailable.
pub extern "C" fn lp_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIER TABLES
// ═══════════════════════════════════════════════════════════════════════════════

static LIB_SYMS: Once<Vec<SymEntry>> = Once::new();
static PLATFORM_SYMS: Once<Vec<SymEntry>> = Once::new();

/// Built-in library tier.
pub fn lib_symbols() -> &'static [SymEntry] {
    LIB_SYMS.call_once(|| {
        vec![
            // string/memory
            SymEntry { name: "lp_memset", addr: lp_memset as usize },
            SymEntry { name: "lp_memcpy", addr: lp_memcpy as usize },
            SymEntry { name: "lp_memcmp", addr: lp_memcmp as usize },
            SymEntry { name: "lp_strlen", addr: lp_strlen as usize },
            // math
            SymEntry { name: "lp_sqrt", addr: lp_sqrt as usize },
            SymEntry { name: "lp_pow", addr: lp_pow as usize },
            SymEntry { name: "lp_fmod", addr: lp_fmod as usize },
            SymEntry { name: "lp_floor", addr: lp_floor as usize },
            SymEntry { name: "lp_fabs", addr: lp_fabs as usize },
        ]
    })
}

/// Platform service tier.
pub fn platform_symbols() -> &'static [SymEntry] {
    PLATFORM_SYMS.call_once(|| {
        vec![
            SymEntry { name: "lp_yield", addr: lp_yield as usize },
            SymEntry { name: "lp_sleep_ms", addr: lp_sleep_ms as usize },
            SymEntry { name: "lp_time_ms", addr: lp_time_ms as usize },
            SymEntry {
                name: "lp_log_write",
                addr: crate::services::log::launchpad_log as usize,
            },
            // Console primitives; the richer VTTY surface is exported
            // through the capability list at boot.
            SymEntry {
                name: "lp_console_putc",
                addr: crate::vtty::export::launchpad_vtty_putc as usize,
            },
            SymEntry {
                name: "lp_console_puts",
                addr: crate::vtty::export::launchpad_vtty_puts as usize,
            },
        ]
    })
}
