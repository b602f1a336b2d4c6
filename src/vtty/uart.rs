//! Buffered Serial Driver
//!
//! Serial-port backend with a bounded receive queue and a transmit buffer.
//! On hardware this fronts a UART; the hosted build keeps the byte queues
//! in memory so interrupt handlers (or tests) can feed the RX side and
//! inspect the TX side.

use heapless::Deque;

use super::{EventCallback, TtyDriver, TtyError};

pub const SERIAL_ID: i32 = 1;

/// RX queue depth in bytes. Incoming bytes beyond this are dropped, the
/// same policy a full UART FIFO applies.
pub const RX_QUEUE_LEN: usize = 64;

pub struct SerialTty {
    id: i32,
    baud: u32,
    ready: bool,
    tx: Vec<u8>,
    rx: Deque<u8, RX_QUEUE_LEN>,
    callback: Option<EventCallback>,
}

impl SerialTty {
    pub fn new(id: i32, baud: u32) -> Self {
        Self {
            id,
            baud,
            ready: false,
            tx: Vec::new(),
            rx: Deque::new(),
            callback: None,
        }
    }

    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Queue a byte on the receive side. Returns false when the queue is
    /// full and the byte was dropped.
    pub fn feed_rx(&mut self, c: u8) -> bool {
        self.rx.push_back(c).is_ok()
    }

    /// Everything transmitted since the last drain.
    pub fn tx_data(&self) -> &[u8] {
        &self.tx
    }

    pub fn drain_tx(&mut self) -> Vec<u8> {
        core::mem::take(&mut self.tx)
    }
}

impl TtyDriver for SerialTty {
    fn id(&self) -> i32 {
        self.id
    }

    fn kind(&self) -> &'static str {
        "serial"
    }

    fn init(&mut self) -> Result<(), TtyError> {
        self.ready = true;
        Ok(())
    }

    fn deinit(&mut self) {
        self.ready = false;
        self.tx.clear();
        self.rx.clear();
        self.callback = None;
    }

    fn putc(&mut self, c: u8) -> Result<(), TtyError> {
        if !self.ready {
            return Err(TtyError::Io);
        }
        self.tx.push(c);
        Ok(())
    }

    fn puts(&mut self, s: &str) -> Result<usize, TtyError> {
        if !self.ready {
            return Err(TtyError::Io);
        }
        self.tx.extend_from_slice(s.as_bytes());
        Ok(s.len())
    }

    fn flush(&mut self) -> Result<(), TtyError> {
        // In-memory transmit completes immediately.
        Ok(())
    }

    fn getc(&mut self) -> Result<Option<u8>, TtyError> {
        if !self.ready {
            return Err(TtyError::Io);
        }
        Ok(self.rx.pop_front())
    }

    fn available(&mut self) -> Result<bool, TtyError> {
        Ok(!self.rx.is_empty())
    }

    fn set_baudrate(&mut self, baud: u32) -> Result<(), TtyError> {
        self.baud = baud;
        Ok(())
    }

    fn is_ready(&mut self) -> Result<bool, TtyError> {
        Ok(self.ready)
    }

    fn set_callback(&mut self, cb: EventCallback) -> Result<(), TtyError> {
        self.callback = Some(cb);
        Ok(())
    }
}
