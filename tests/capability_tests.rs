//! Capability Boot Tests
//!
//! End-to-end: boot the runtime with simulated devices, then reach every
//! service the way a loaded module would, through addresses resolved from
//! the symbol table. Global device seams are shared process state, so the
//! whole flow lives in one test.

use core::ffi::{c_char, c_int, c_uint};
use std::ffi::CString;

use launchpad::platform::PlatformInfo;
use launchpad::services::flash::{RamFlash, SECTOR_SIZE};
use launchpad::services::log::{self, LogLevel};
use launchpad::services::partition::{PartKind, Partition};
use launchpad::services::processor::{CpuAction, ResetReason, SimCpu};
use launchpad::symbol::ResolveOrder;
use launchpad::{launchpad_init_with, HostDevices};

/// Every name boot is expected to publish.
const CURATED: &[&str] = &[
    "launchpad_platform",
    "launchpad_log",
    "launchpad_mount_rootfs",
    "launchpad_flash_size",
    "launchpad_flash_read",
    "launchpad_flash_write",
    "launchpad_flash_erase",
    "launchpad_flash_erase_range",
    "launchpad_flash_mmap",
    "launchpad_flash_munmap",
    "launchpad_partition_find",
    "launchpad_partition_size",
    "launchpad_partition_read",
    "launchpad_partition_write",
    "launchpad_partition_erase_range",
    "launchpad_sd_mount",
    "launchpad_sd_unmount",
    "launchpad_sd_is_mounted",
    "launchpad_sd_available",
    "launchpad_sd_free_space",
    "launchpad_reboot",
    "launchpad_halt",
    "launchpad_sleep",
    "launchpad_deep_sleep",
    "launchpad_get_reset_reason",
    "launchpad_get_cpu_freq",
    "launchpad_get_cpu_id",
    "launchpad_vtty_putc",
    "launchpad_vtty_putchar",
    "launchpad_vtty_puts",
    "launchpad_vtty_write",
    "launchpad_vtty_flush",
    "launchpad_vtty_getc",
    "launchpad_vtty_available",
    "launchpad_vtty_clear_screen",
    "launchpad_vtty_move_cursor",
    "launchpad_vtty_set_baudrate",
    "launchpad_vtty_is_ready",
    "launchpad_vtty_set_callback",
    "launchpad_vtty_ioctl",
];

#[test]
fn test_boot_publishes_and_wires_the_curated_capabilities() {
    let cpu = SimCpu::new(ResetReason::PowerOn);
    let actions = cpu.actions.clone();

    let devices = HostDevices {
        flash: Some(Box::new(RamFlash::new(16))),
        partitions: vec![
            Partition {
                label: "boot",
                kind: PartKind::App,
                offset: 0,
                size: 4 * SECTOR_SIZE,
            },
            Partition {
                label: "data",
                kind: PartKind::Data,
                offset: 4 * SECTOR_SIZE,
                size: 12 * SECTOR_SIZE,
            },
        ],
        sd: None,
        cpu: Some(Box::new(cpu)),
        rootfs: None,
    };

    let runtime = launchpad_init_with(devices, ResolveOrder::BuiltinFirst);
    let symbols = runtime.symbols();

    for name in CURATED {
        let addr = symbols.resolve(name);
        assert!(addr.is_some(), "capability {name} not registered");
        assert_ne!(addr, Some(0), "capability {name} registered at null");
    }
    assert!(symbols.dynamic_count() >= CURATED.len());

    // Descriptor, reached exactly the way a module reaches it.
    let platform: extern "C" fn() -> PlatformInfo =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_platform").unwrap()) };
    let info = platform();
    assert!(info.is_valid());
    assert_eq!(info.loader_name(), "LaunchPad");
    assert_eq!(info.platform_name(), "ESP32");

    // Flash service through the capability table.
    let flash_size: extern "C" fn() -> c_uint =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_flash_size").unwrap()) };
    assert_eq!(flash_size() as usize, 16 * SECTOR_SIZE);

    let flash_erase: extern "C" fn(c_uint) -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_flash_erase").unwrap()) };
    let flash_write: unsafe extern "C" fn(c_uint, *const u8, c_uint) -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_flash_write").unwrap()) };
    let flash_read: unsafe extern "C" fn(c_uint, *mut u8, c_uint) -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_flash_read").unwrap()) };

    assert_eq!(flash_erase(0), 0);
    let payload = b"module data";
    assert_eq!(
        unsafe { flash_write(128, payload.as_ptr(), payload.len() as c_uint) },
        0
    );
    let mut back = [0u8; 11];
    assert_eq!(
        unsafe { flash_read(128, back.as_mut_ptr(), back.len() as c_uint) },
        0
    );
    assert_eq!(&back, payload);
    // Out-of-range read reports failure, not a crash.
    let mut one = [0u8; 1];
    assert_eq!(
        unsafe { flash_read((16 * SECTOR_SIZE) as c_uint, one.as_mut_ptr(), 1) },
        1
    );

    // Partition lookup and windowed access.
    let find: unsafe extern "C" fn(c_int, *const c_char) -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_partition_find").unwrap()) };
    let part_size: extern "C" fn(c_int) -> c_uint =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_partition_size").unwrap()) };
    let part_read: unsafe extern "C" fn(c_int, c_uint, *mut u8, c_uint) -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_partition_read").unwrap()) };

    let label = CString::new("data").unwrap();
    let handle = unsafe { find(1, label.as_ptr()) };
    assert!(handle >= 0);
    assert_eq!(part_size(handle) as usize, 12 * SECTOR_SIZE);

    let missing = CString::new("nvram").unwrap();
    assert_eq!(unsafe { find(1, missing.as_ptr()) }, -1);

    // Reads past the window fail even though the flash behind is larger.
    assert_eq!(
        unsafe {
            part_read(
                handle,
                (12 * SECTOR_SIZE) as c_uint,
                one.as_mut_ptr(),
                1,
            )
        },
        1
    );

    // SD card: platform advertises the slot, but no card is installed.
    let sd_available: extern "C" fn() -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_sd_available").unwrap()) };
    let sd_mount: unsafe extern "C" fn(*const c_char) -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_sd_mount").unwrap()) };
    assert_eq!(sd_available(), 0);
    let mnt = CString::new("/sdcard").unwrap();
    assert_eq!(unsafe { sd_mount(mnt.as_ptr()) }, 1);

    // Root filesystem: nothing installed, the status says so.
    let mount_rootfs: extern "C" fn() -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_mount_rootfs").unwrap()) };
    assert_eq!(mount_rootfs(), 1);

    // Processor control lands on the simulated backend.
    let reboot: extern "C" fn() -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_reboot").unwrap()) };
    let sleep: extern "C" fn(c_uint) -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_sleep").unwrap()) };
    let reset_reason: extern "C" fn() -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_get_reset_reason").unwrap()) };
    assert_eq!(reset_reason(), ResetReason::PowerOn as c_int);
    assert_eq!(reboot(), 0);
    assert_eq!(sleep(250), 0);
    assert_eq!(
        actions.lock().as_slice(),
        &[CpuAction::Reboot, CpuAction::Sleep(250)]
    );

    // Module-facing logging accepts a pre-formatted message.
    let log_fn: unsafe extern "C" fn(c_int, *const c_char, *const c_char) -> c_int =
        unsafe { core::mem::transmute(symbols.resolve("launchpad_log").unwrap()) };
    let tag = CString::new("module").unwrap();
    let msg = CString::new("capability round trip complete").unwrap();
    assert_eq!(unsafe { log_fn(3, tag.as_ptr(), msg.as_ptr()) }, 0);
    assert_eq!(unsafe { log_fn(3, tag.as_ptr(), core::ptr::null()) }, 1);

    runtime.shutdown();
}

#[test]
fn test_log_level_filter() {
    log::set_max_level(LogLevel::Warn);
    assert!(log::enabled(LogLevel::Error));
    assert!(log::enabled(LogLevel::Warn));
    assert!(!log::enabled(LogLevel::Info));
    assert!(!log::enabled(LogLevel::Verbose));
    log::set_max_level(LogLevel::Info);
}

#[test]
fn test_raw_log_levels_clamp_to_info() {
    assert_eq!(LogLevel::from_raw(0), LogLevel::Info);
    assert_eq!(LogLevel::from_raw(3), LogLevel::Info);
    assert_eq!(LogLevel::from_raw(99), LogLevel::Info);
    assert_eq!(LogLevel::from_raw(1), LogLevel::Error);
    assert_eq!(LogLevel::from_raw(5), LogLevel::Verbose);
}
