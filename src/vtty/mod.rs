//! Virtual TTY - Console Multiplexer
//!
//! Character I/O for loaded modules goes through one registry of pluggable
//! drivers with a single "current" driver receiving all traffic. A driver
//! advertises capability per operation by overriding the trait method; the
//! default bodies report `Unsupported`, the Rust rendition of a NULL slot
//! in a function-pointer table.

pub mod export;
pub mod stdio;
pub mod uart;

use core::fmt;

use spin::Mutex;

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS AND TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Most operations distinguish "nothing is current" from "the current
/// driver cannot do this"; callers that only care about failure can treat
/// both the same.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TtyError {
    /// No driver is current.
    NoDriver,
    /// The current driver does not implement the operation.
    Unsupported,
    /// The registry already holds the maximum number of drivers.
    RegistryFull,
    /// `set_default` was given an id no registered driver carries.
    UnknownId,
    /// The driver's own `init` refused the registration.
    InitFailed,
    /// The underlying transport failed.
    Io,
}

/// Event callback delivered on driver-specific events (break, overrun, ...).
/// C ABI because loaded modules install their own handlers through the
/// capability exports.
pub type EventCallback = extern "C" fn(i32);

/// Identity of a registered driver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TtyInfo {
    pub id: i32,
    pub kind: &'static str,
}

/// Maximum number of drivers the registry holds.
pub const MAX_DRIVERS: usize = 8;

/// Bounded scratch buffer for `printf`; longer output is truncated, never
/// written out of bounds.
pub const PRINTF_BUF: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// DRIVER INTERFACE
// ═══════════════════════════════════════════════════════════════════════════════

/// A console backend. Only `id` and `kind` are mandatory; every I/O
/// operation is an optional capability.
pub trait TtyDriver: Send {
    fn id(&self) -> i32;
    fn kind(&self) -> &'static str;

    fn init(&mut self) -> Result<(), TtyError> {
        Ok(())
    }
    fn deinit(&mut self) {}

    fn putc(&mut self, _c: u8) -> Result<(), TtyError> {
        Err(TtyError::Unsupported)
    }
    fn puts(&mut self, _s: &str) -> Result<usize, TtyError> {
        Err(TtyError::Unsupported)
    }
    fn flush(&mut self) -> Result<(), TtyError> {
        Err(TtyError::Unsupported)
    }
    /// `Ok(None)` means no byte is pending right now.
    fn getc(&mut self) -> Result<Option<u8>, TtyError> {
        Err(TtyError::Unsupported)
    }
    fn available(&mut self) -> Result<bool, TtyError> {
        Err(TtyError::Unsupported)
    }
    fn clear_screen(&mut self) -> Result<(), TtyError> {
        Err(TtyError::Unsupported)
    }
    fn move_cursor(&mut self, _row: i32, _col: i32) -> Result<(), TtyError> {
        Err(TtyError::Unsupported)
    }
    fn set_baudrate(&mut self, _baud: u32) -> Result<(), TtyError> {
        Err(TtyError::Unsupported)
    }
    fn is_ready(&mut self) -> Result<bool, TtyError> {
        Err(TtyError::Unsupported)
    }
    fn set_callback(&mut self, _cb: EventCallback) -> Result<(), TtyError> {
        Err(TtyError::Unsupported)
    }
    fn ioctl(&mut self, _cmd: i32, _arg: usize) -> Result<i32, TtyError> {
        Err(TtyError::Unsupported)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MULTIPLEXER
// ═══════════════════════════════════════════════════════════════════════════════

/// Driver registry plus current-driver dispatch. An ordinary owned value;
/// the process-wide instance used by the capability exports lives behind
/// `vtty::with`.
pub struct Vtty {
    drivers: heapless::Vec<Box<dyn TtyDriver>, MAX_DRIVERS>,
    current: Option<usize>,
    callback: Option<EventCallback>,
}

impl Vtty {
    pub const fn new() -> Self {
        Self {
            drivers: heapless::Vec::new(),
            current: None,
            callback: None,
        }
    }

    /// Register a driver, running its `init` first. A driver whose init
    /// fails is not added. The registry holds at most [`MAX_DRIVERS`]
    /// drivers; the next attempt fails cleanly without touching the
    /// existing ones.
    pub fn register_driver(&mut self, mut drv: Box<dyn TtyDriver>) -> Result<(), TtyError> {
        if self.drivers.is_full() {
            return Err(TtyError::RegistryFull);
        }
        match drv.init() {
            Ok(()) => {}
            Err(TtyError::Unsupported) => {}
            Err(_) => return Err(TtyError::InitFailed),
        }
        self.drivers.push(drv).map_err(|_| TtyError::RegistryFull)?;
        Ok(())
    }

    /// Make the first driver with matching `id` current.
    pub fn set_default(&mut self, id: i32) -> Result<(), TtyError> {
        match self.drivers.iter().position(|d| d.id() == id) {
            Some(i) => {
                self.current = Some(i);
                Ok(())
            }
            None => Err(TtyError::UnknownId),
        }
    }

    pub fn current_info(&self) -> Option<TtyInfo> {
        let i = self.current?;
        let d = self.drivers.get(i)?;
        Some(TtyInfo {
            id: d.id(),
            kind: d.kind(),
        })
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn list(&self) -> impl Iterator<Item = TtyInfo> + '_ {
        self.drivers.iter().map(|d| TtyInfo {
            id: d.id(),
            kind: d.kind(),
        })
    }

    /// Deinitialize every driver and return to the uninitialized state.
    pub fn deinit(&mut self) {
        for d in self.drivers.iter_mut() {
            d.deinit();
        }
        self.drivers.clear();
        self.current = None;
        self.callback = None;
    }

    fn current_mut(&mut self) -> Result<&mut dyn TtyDriver, TtyError> {
        let i = self.current.ok_or(TtyError::NoDriver)?;
        match self.drivers.get_mut(i) {
            Some(d) => Ok(d.as_mut()),
            None => Err(TtyError::NoDriver),
        }
    }

    // ── Output ────────────────────────────────────────────────────────────

    pub fn putc(&mut self, c: u8) -> Result<(), TtyError> {
        self.current_mut()?.putc(c)
    }

    /// Write a string. A driver without `puts` degrades to a
    /// character-by-character loop over `putc`.
    pub fn puts(&mut self, s: &str) -> Result<usize, TtyError> {
        let drv = self.current_mut()?;
        match drv.puts(s) {
            Err(TtyError::Unsupported) => {
                for b in s.bytes() {
                    drv.putc(b)?;
                }
                Ok(s.len())
            }
            other => other,
        }
    }

    /// Formatted write through a bounded local buffer; output beyond the
    /// buffer is truncated.
    pub fn printf(&mut self, args: fmt::Arguments) -> Result<usize, TtyError> {
        let mut buf = TruncBuf::new();
        // A full buffer stops formatting; the prefix already written is kept.
        let _ = fmt::Write::write_fmt(&mut buf, args);
        self.puts(&buf.inner)
    }

    pub fn flush(&mut self) -> Result<(), TtyError> {
        match self.current_mut()?.flush() {
            Err(TtyError::Unsupported) => Ok(()),
            other => other,
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────

    pub fn getc(&mut self) -> Result<Option<u8>, TtyError> {
        self.current_mut()?.getc()
    }

    /// Whether input is pending. A driver without the probe reports no
    /// input rather than failing.
    pub fn available(&mut self) -> Result<bool, TtyError> {
        match self.current_mut()?.available() {
            Err(TtyError::Unsupported) => Ok(false),
            other => other,
        }
    }

    // ── Screen control ────────────────────────────────────────────────────

    /// Clear the screen, falling back to the ANSI erase sequence when the
    /// driver has no dedicated operation.
    pub fn clear_screen(&mut self) -> Result<(), TtyError> {
        match self.current_mut()?.clear_screen() {
            Err(TtyError::Unsupported) => self.puts("\x1B[2J").map(|_| ()),
            other => other,
        }
    }

    pub fn move_cursor(&mut self, row: i32, col: i32) -> Result<(), TtyError> {
        match self.current_mut()?.move_cursor(row, col) {
            Err(TtyError::Unsupported) => self
                .printf(format_args!("\x1B[{};{}H", row, col))
                .map(|_| ()),
            other => other,
        }
    }

    pub fn set_baudrate(&mut self, baud: u32) -> Result<(), TtyError> {
        self.current_mut()?.set_baudrate(baud)
    }

    // ── Status and extensions ─────────────────────────────────────────────

    /// Readiness probe; a driver without one is considered ready by virtue
    /// of being current.
    pub fn is_ready(&mut self) -> Result<bool, TtyError> {
        match self.current_mut()?.is_ready() {
            Err(TtyError::Unsupported) => Ok(true),
            other => other,
        }
    }

    /// Remember the event callback and forward it to the current driver
    /// when it supports one.
    pub fn set_callback(&mut self, cb: EventCallback) -> Result<(), TtyError> {
        self.callback = Some(cb);
        match self.current_mut() {
            Ok(drv) => match drv.set_callback(cb) {
                Err(TtyError::Unsupported) => Ok(()),
                other => other,
            },
            Err(e) => Err(e),
        }
    }

    pub fn callback(&self) -> Option<EventCallback> {
        self.callback
    }

    pub fn ioctl(&mut self, cmd: i32, arg: usize) -> Result<i32, TtyError> {
        self.current_mut()?.ioctl(cmd, arg)
    }
}

impl Default for Vtty {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded format buffer that keeps the fitting prefix instead of refusing
/// a write that would overflow.
struct TruncBuf {
    inner: heapless::String<PRINTF_BUF>,
}

impl TruncBuf {
    fn new() -> Self {
        Self {
            inner: heapless::String::new(),
        }
    }
}

impl fmt::Write for TruncBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = PRINTF_BUF - self.inner.len();
        if s.len() <= room {
            return self.inner.push_str(s).map_err(|_| fmt::Error);
        }
        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        let _ = self.inner.push_str(&s[..cut]);
        Err(fmt::Error)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROCESS-WIDE INSTANCE
// ═══════════════════════════════════════════════════════════════════════════════

static VTTY: Mutex<Vtty> = Mutex::new(Vtty::new());

/// Run `f` against the process-wide multiplexer. This is the seam the
/// capability exports dispatch through.
pub fn with<R>(f: impl FnOnce(&mut Vtty) -> R) -> R {
    f(&mut VTTY.lock())
}

/// Boot-time policy: a stdio console first, then a buffered serial port,
/// with the serial port as the default sink for module output.
///
/// Failures are collected and logged after the lock is released; the log
/// sink itself goes through [`with`].
pub fn init() {
    let (stdio_ok, serial_ok, default_ok) = with(|v| {
        v.deinit();
        let stdio_ok = v.register_driver(Box::new(stdio::StdioTty::new())).is_ok();
        let serial_ok = v
            .register_driver(Box::new(uart::SerialTty::new(uart::SERIAL_ID, 115_200)))
            .is_ok();
        let default_ok = v.set_default(uart::SERIAL_ID).is_ok();
        (stdio_ok, serial_ok, default_ok)
    });
    if !stdio_ok {
        crate::log_warn!("vtty", "stdio driver rejected");
    }
    if !serial_ok {
        crate::log_warn!("vtty", "serial driver rejected");
    }
    if !default_ok {
        crate::log_warn!("vtty", "no default driver selected");
    }
}

/// Tear down the process-wide multiplexer.
pub fn deinit() {
    with(|v| v.deinit());
}

/// Host-side print helper used by the logging macros. Falls back to the
/// process stderr while no driver is current (early boot).
pub fn print(args: fmt::Arguments) {
    let res = with(|v| v.printf(args));
    if matches!(res, Err(TtyError::NoDriver)) {
        eprint!("{}", args);
    }
}

/// Print through the multiplexer.
#[macro_export]
macro_rules! vprint {
    ($($arg:tt)*) => {
        $crate::vtty::print(format_args!($($arg)*))
    };
}

/// Print a line through the multiplexer.
#[macro_export]
macro_rules! vprintln {
    () => { $crate::vprint!("\n") };
    ($($arg:tt)*) => {
        $crate::vprint!("{}\n", format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn trunc_buf_keeps_the_fitting_prefix() {
        let mut buf = TruncBuf::new();
        let long = "a".repeat(PRINTF_BUF + 10);
        assert!(write!(buf, "{}", long).is_err());
        assert_eq!(buf.inner.len(), PRINTF_BUF);
        assert!(buf.inner.chars().all(|c| c == 'a'));
    }

    #[test]
    fn trunc_buf_cuts_on_char_boundary() {
        let mut buf = TruncBuf::new();
        // 255 ASCII bytes, then a two-byte char that cannot fit whole.
        let head = "b".repeat(PRINTF_BUF - 1);
        assert!(write!(buf, "{}", head).is_ok());
        assert!(write!(buf, "é").is_err());
        assert_eq!(buf.inner.len(), PRINTF_BUF - 1);
    }

    #[test]
    fn trunc_buf_short_writes_pass_through() {
        let mut buf = TruncBuf::new();
        assert!(write!(buf, "boot {}", 3).is_ok());
        assert_eq!(buf.inner.as_str(), "boot 3");
    }
}
