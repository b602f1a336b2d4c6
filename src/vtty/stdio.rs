//! Stdio Console Driver
//!
//! Default console backend bound to the process standard streams. Screen
//! control is done with ANSI escapes; baudrate and ioctl are left
//! unsupported, matching a plain terminal.

use std::io::{Read, Write};

use super::{TtyDriver, TtyError};

pub const STDIO_ID: i32 = 0;

pub struct StdioTty;

impl StdioTty {
    pub const fn new() -> Self {
        StdioTty
    }
}

impl Default for StdioTty {
    fn default() -> Self {
        Self::new()
    }
}

impl TtyDriver for StdioTty {
    fn id(&self) -> i32 {
        STDIO_ID
    }

    fn kind(&self) -> &'static str {
        "stdio"
    }

    fn putc(&mut self, c: u8) -> Result<(), TtyError> {
        std::io::stdout().write_all(&[c]).map_err(|_| TtyError::Io)
    }

    fn puts(&mut self, s: &str) -> Result<usize, TtyError> {
        std::io::stdout()
            .write_all(s.as_bytes())
            .map(|_| s.len())
            .map_err(|_| TtyError::Io)
    }

    fn flush(&mut self) -> Result<(), TtyError> {
        std::io::stdout().flush().map_err(|_| TtyError::Io)
    }

    fn getc(&mut self) -> Result<Option<u8>, TtyError> {
        let mut byte = [0u8; 1];
        match std::io::stdin().read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(_) => Err(TtyError::Io),
        }
    }

    fn available(&mut self) -> Result<bool, TtyError> {
        // stdin is always considered readable here; getc may still block.
        Ok(true)
    }

    fn clear_screen(&mut self) -> Result<(), TtyError> {
        self.puts("\x1B[2J").map(|_| ())
    }

    fn move_cursor(&mut self, row: i32, col: i32) -> Result<(), TtyError> {
        let mut seq: heapless::String<24> = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(&mut seq, format_args!("\x1B[{};{}H", row, col));
        self.puts(&seq).map(|_| ())
    }

    fn is_ready(&mut self) -> Result<bool, TtyError> {
        Ok(true)
    }
}
