//! Logging Service
//!
//! Leveled logging for the host runtime and for loaded modules. Host code
//! uses the `log_*` macros; modules reach `launchpad_log` through the
//! capability table with a pre-formatted message (C varargs are not part
//! of this ABI).

use core::ffi::{c_char, c_int};
use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};

// ═══════════════════════════════════════════════════════════════════════════════
// LEVELS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Verbose = 5,
}

impl LogLevel {
    pub fn from_raw(raw: c_int) -> LogLevel {
        match raw {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            4 => LogLevel::Debug,
            5 => LogLevel::Verbose,
            // Out-of-range levels log at Info, they are not dropped.
            _ => LogLevel::Info,
        }
    }

    fn letter(self) -> char {
        match self {
            LogLevel::Error => 'E',
            LogLevel::Warn => 'W',
            LogLevel::Info => 'I',
            LogLevel::Debug => 'D',
            LogLevel::Verbose => 'V',
        }
    }
}

/// Runtime-adjustable verbosity ceiling; records above it are discarded.
static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn enabled(level: LogLevel) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SINK
// ═══════════════════════════════════════════════════════════════════════════════

/// Emit one record through the VTTY (stderr while no console is up).
pub fn write(level: LogLevel, tag: &str, args: fmt::Arguments) {
    if !enabled(level) {
        return;
    }
    crate::vtty::print(format_args!("{} ({}) {}\n", level.letter(), tag, args));
}

#[macro_export]
macro_rules! log_error {
    ($tag:expr, $($arg:tt)*) => {
        $crate::services::log::write(
            $crate::services::log::LogLevel::Error, $tag, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($tag:expr, $($arg:tt)*) => {
        $crate::services::log::write(
            $crate::services::log::LogLevel::Warn, $tag, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($tag:expr, $($arg:tt)*) => {
        $crate::services::log::write(
            $crate::services::log::LogLevel::Info, $tag, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($tag:expr, $($arg:tt)*) => {
        $crate::services::log::write(
            $crate::services::log::LogLevel::Debug, $tag, format_args!($($arg)*))
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITY EXPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// Logging entry point for loaded modules. `tag` may be null (defaults to
/// "ELF"); a null message is an error.
///
/// # Safety
/// Non-null pointers must reference NUL-terminated strings.
pub unsafe extern "C" fn launchpad_log(
    level: c_int,
    tag: *const c_char,
    msg: *const c_char,
) -> c_int {
    if msg.is_null() {
        return super::STATUS_ERR;
    }
    let tag = if tag.is_null() {
        "ELF"
    } else {
        core::ffi::CStr::from_ptr(tag).to_str().unwrap_or("ELF")
    };
    let msg = match core::ffi::CStr::from_ptr(msg).to_str() {
        Ok(m) => m,
        Err(_) => return super::STATUS_ERR,
    };
    write(LogLevel::from_raw(level), tag, format_args!("{}", msg));
    super::STATUS_OK
}
