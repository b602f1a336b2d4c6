//! Peripheral Service Wrappers
//!
//! Pass-through services exposed to loaded modules through the capability
//! table. Each wrapper validates raw arguments, forwards to a pluggable
//! backend, and reports a C status code from the fixed set {0 = ok,
//! 1 = failure}; none of them raises a structured error across the ABI.

pub mod flash;
pub mod log;
pub mod partition;
pub mod processor;
pub mod rootfs;
pub mod sd;

use core::ffi::c_int;

/// Success status shared by every service export.
pub const STATUS_OK: c_int = 0;
/// Generic failure status shared by every service export.
pub const STATUS_ERR: c_int = 1;

/// Failure reasons internal to the service layer; flattened to
/// [`STATUS_ERR`] at the ABI boundary.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SvcError {
    /// No backend installed behind this service.
    NoDevice,
    /// Address or length outside the device/partition window.
    Bounds,
    /// Null pointer or otherwise malformed argument.
    InvalidArg,
    /// Mount-state violation (mount while mounted, unmount while not).
    BadState,
    /// Lookup found nothing.
    NotFound,
    /// The backend itself failed.
    Io,
}

pub(crate) fn status(res: Result<(), SvcError>) -> c_int {
    match res {
        Ok(()) => STATUS_OK,
        Err(_) => STATUS_ERR,
    }
}
