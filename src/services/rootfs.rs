//! Root Filesystem Service
//!
//! A single installable mount hook. The host decides what "mounting the
//! root filesystem" means; modules only see the status code.

use core::ffi::c_int;

use spin::Mutex;

use super::SvcError;

pub trait RootFs: Send {
    fn mount(&mut self) -> Result<(), SvcError>;
}

impl<F> RootFs for F
where
    F: FnMut() -> Result<(), SvcError> + Send,
{
    fn mount(&mut self) -> Result<(), SvcError> {
        self()
    }
}

static ROOTFS: Mutex<Option<Box<dyn RootFs>>> = Mutex::new(None);

pub fn install(fs: Box<dyn RootFs>) {
    *ROOTFS.lock() = Some(fs);
}

pub fn uninstall() {
    *ROOTFS.lock() = None;
}

pub fn mount() -> Result<(), SvcError> {
    match ROOTFS.lock().as_deref_mut() {
        Some(fs) => fs.mount(),
        None => Err(SvcError::NoDevice),
    }
}

pub extern "C" fn launchpad_mount_rootfs() -> c_int {
    let res = mount();
    if let Err(err) = res {
        crate::log_warn!("rootfs", "mount failed: {:?}", err);
    }
    super::status(res)
}
