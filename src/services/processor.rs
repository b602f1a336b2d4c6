//! Processor Service
//!
//! Reset, sleep and identity queries behind a CPU control seam. The
//! simulated backend records every power action so boot flows can be
//! exercised without real hardware.

use core::ffi::{c_int, c_uint};
use std::sync::Arc;

use spin::Mutex;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ResetReason {
    Unknown = 0,
    PowerOn = 1,
    Software = 2,
    Watchdog = 3,
    DeepSleep = 4,
    Brownout = 5,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CpuAction {
    Reboot,
    Halt,
    Sleep(u32),
    DeepSleep(u64),
}

pub trait CpuControl: Send {
    fn reboot(&mut self);
    fn halt(&mut self);
    fn sleep_ms(&mut self, ms: u32);
    fn deep_sleep_us(&mut self, us: u64);
    fn reset_reason(&self) -> ResetReason;
    fn frequency_mhz(&self) -> u32;
    fn cpu_id(&self) -> u32;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SIMULATED BACKEND
// ═══════════════════════════════════════════════════════════════════════════════

/// Records power actions instead of performing them. Clone the action log
/// handle before installing to observe what a boot flow requested.
pub struct SimCpu {
    pub actions: Arc<Mutex<Vec<CpuAction>>>,
    pub reason: ResetReason,
    pub freq_mhz: u32,
}

impl SimCpu {
    pub fn new(reason: ResetReason) -> SimCpu {
        SimCpu {
            actions: Arc::new(Mutex::new(Vec::new())),
            reason,
            freq_mhz: 240,
        }
    }
}

impl CpuControl for SimCpu {
    fn reboot(&mut self) {
        self.actions.lock().push(CpuAction::Reboot);
    }

    fn halt(&mut self) {
        self.actions.lock().push(CpuAction::Halt);
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.actions.lock().push(CpuAction::Sleep(ms));
    }

    fn deep_sleep_us(&mut self, us: u64) {
        self.actions.lock().push(CpuAction::DeepSleep(us));
    }

    fn reset_reason(&self) -> ResetReason {
        self.reason
    }

    fn frequency_mhz(&self) -> u32 {
        self.freq_mhz
    }

    fn cpu_id(&self) -> u32 {
        0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INSTALLED DEVICE
// ═══════════════════════════════════════════════════════════════════════════════

static CPU: Mutex<Option<Box<dyn CpuControl>>> = Mutex::new(None);

pub fn install(cpu: Box<dyn CpuControl>) {
    *CPU.lock() = Some(cpu);
}

pub fn uninstall() {
    *CPU.lock() = None;
}

fn with<R>(fallback: R, f: impl FnOnce(&mut dyn CpuControl) -> R) -> R {
    match CPU.lock().as_deref_mut() {
        Some(cpu) => f(cpu),
        None => fallback,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CAPABILITY EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

pub extern "C" fn launchpad_reboot() -> c_int {
    with(super::STATUS_ERR, |cpu| {
        cpu.reboot();
        super::STATUS_OK
    })
}

pub extern "C" fn launchpad_halt() -> c_int {
    with(super::STATUS_ERR, |cpu| {
        cpu.halt();
        super::STATUS_OK
    })
}

pub extern "C" fn launchpad_sleep(ms: c_uint) -> c_int {
    with(super::STATUS_ERR, |cpu| {
        cpu.sleep_ms(ms);
        super::STATUS_OK
    })
}

pub extern "C" fn launchpad_deep_sleep(us: u64) -> c_int {
    with(super::STATUS_ERR, |cpu| {
        cpu.deep_sleep_us(us);
        super::STATUS_OK
    })
}

pub extern "C" fn launchpad_get_reset_reason() -> c_int {
    with(ResetReason::Unknown as c_int, |cpu| {
        cpu.reset_reason() as c_int
    })
}

pub extern "C" fn launchpad_get_cpu_freq() -> c_uint {
    with(0, |cpu| cpu.frequency_mhz())
}

pub extern "C" fn launchpad_get_cpu_id() -> c_uint {
    with(0, |cpu| cpu.cpu_id())
}
