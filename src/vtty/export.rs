//! VTTY Capability Exports
//!
//! C-ABI trampolines reached by loaded modules through resolved symbol
//! addresses. Every function validates its raw arguments, dispatches to
//! the process-wide multiplexer, and reports failure as a C status code;
//! nothing here panics across the boundary.

use core::ffi::{c_char, c_int};

use super::{with, EventCallback, TtyError};

fn status(res: Result<(), TtyError>) -> c_int {
    match res {
        Ok(()) => 0,
        Err(_) => -1,
    }
}

pub extern "C" fn launchpad_vtty_putc(c: c_char) -> c_int {
    status(with(|v| v.putc(c as u8)))
}

/// Alias kept for modules built against the older name.
pub extern "C" fn launchpad_vtty_putchar(c: c_char) -> c_int {
    launchpad_vtty_putc(c)
}

/// # Safety
/// `s` must be NUL-terminated valid UTF-8 (invalid bytes fail the call).
pub unsafe extern "C" fn launchpad_vtty_puts(s: *const c_char) -> c_int {
    if s.is_null() {
        return -1;
    }
    let cstr = core::ffi::CStr::from_ptr(s);
    match cstr.to_str() {
        Ok(text) => match with(|v| v.puts(text)) {
            Ok(n) => n as c_int,
            Err(_) => -1,
        },
        Err(_) => -1,
    }
}

/// Length-delimited write for modules that do not NUL-terminate.
///
/// # Safety
/// `data` must be valid for `len` reads.
pub unsafe extern "C" fn launchpad_vtty_write(data: *const u8, len: usize) -> c_int {
    if data.is_null() {
        return -1;
    }
    let bytes = core::slice::from_raw_parts(data, len);
    let res: Result<(), TtyError> = with(|v| {
        for &b in bytes {
            v.putc(b)?;
        }
        Ok(())
    });
    match res {
        Ok(()) => len as c_int,
        Err(_) => -1,
    }
}

pub extern "C" fn launchpad_vtty_flush() {
    let _ = with(|v| v.flush());
}

/// Next pending byte, or -1 when none is available or no driver is
/// current.
pub extern "C" fn launchpad_vtty_getc() -> c_int {
    match with(|v| v.getc()) {
        Ok(Some(b)) => b as c_int,
        _ => -1,
    }
}

pub extern "C" fn launchpad_vtty_available() -> c_int {
    match with(|v| v.available()) {
        Ok(true) => 1,
        _ => 0,
    }
}

pub extern "C" fn launchpad_vtty_clear_screen() {
    let _ = with(|v| v.clear_screen());
}

pub extern "C" fn launchpad_vtty_move_cursor(row: c_int, col: c_int) {
    let _ = with(|v| v.move_cursor(row, col));
}

pub extern "C" fn launchpad_vtty_set_baudrate(baud: c_int) -> c_int {
    if baud <= 0 {
        return -1;
    }
    status(with(|v| v.set_baudrate(baud as u32)))
}

pub extern "C" fn launchpad_vtty_is_ready() -> c_int {
    match with(|v| v.is_ready()) {
        Ok(true) => 1,
        _ => 0,
    }
}

pub extern "C" fn launchpad_vtty_set_callback(cb: EventCallback) -> c_int {
    status(with(|v| v.set_callback(cb)))
}

pub extern "C" fn launchpad_vtty_ioctl(cmd: c_int, arg: usize) -> c_int {
    match with(|v| v.ioctl(cmd, arg)) {
        Ok(r) => r,
        Err(_) => -1,
    }
}
