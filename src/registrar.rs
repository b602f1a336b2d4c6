//! Capability Registrar
//!
//! Boot-time wiring. Installs the host's device backends, brings up the
//! console, then builds the symbol table and registers the curated
//! capability list that loaded modules may call. A capability that fails
//! to register is logged and skipped; boot continues with the rest.

use crate::services::{flash, partition, processor, rootfs, sd};
use crate::symbol::{ResolveOrder, SymbolTable};
use crate::vtty;

// ═══════════════════════════════════════════════════════════════════════════════
// HOST DEVICES
// ═══════════════════════════════════════════════════════════════════════════════

/// Backends the host supplies at boot. Any slot may be left empty; the
/// matching service then answers with its no-device status.
#[derive(Default)]
pub struct HostDevices {
    pub flash: Option<Box<dyn flash::FlashDevice>>,
    pub partitions: Vec<partition::Partition>,
    pub sd: Option<Box<dyn sd::SdCard>>,
    pub cpu: Option<Box<dyn processor::CpuControl>>,
    pub rootfs: Option<Box<dyn rootfs::RootFs>>,
}

/// The booted runtime. Owns the symbol table; services stay reachable
/// through their module-facing exports.
pub struct HostRuntime {
    symbols: SymbolTable,
}

impl HostRuntime {
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Tear down the console and uninstall every device backend. Mostly
    /// useful to harnesses that boot more than once per process.
    pub fn shutdown(self) {
        vtty::deinit();
        flash::uninstall();
        partition::uninstall();
        sd::uninstall();
        processor::uninstall();
        rootfs::uninstall();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BOOT
// ═══════════════════════════════════════════════════════════════════════════════

pub fn launchpad_init(devices: HostDevices) -> HostRuntime {
    launchpad_init_with(devices, ResolveOrder::default())
}

pub fn launchpad_init_with(devices: HostDevices, order: ResolveOrder) -> HostRuntime {
    // Devices first so the console and capabilities land on live backends.
    if let Some(dev) = devices.flash {
        flash::install(dev);
    }
    if !devices.partitions.is_empty() {
        if partition::install(&devices.partitions).is_err() {
            crate::log_warn!("boot", "partition table truncated, too many entries");
        }
    }
    if let Some(card) = devices.sd {
        sd::install(card);
    }
    if let Some(cpu) = devices.cpu {
        processor::install(cpu);
    }
    if let Some(fs) = devices.rootfs {
        rootfs::install(fs);
    }

    vtty::init();

    let mut symbols = SymbolTable::new(order);
    let mut registered = 0usize;
    for &(name, addr) in capability_list() {
        if symbols.register(name, addr) {
            registered += 1;
        } else {
            crate::log_warn!("boot", "could not register capability {}", name);
        }
    }
    crate::log_info!("boot", "registered {} capabilities", registered);

    HostRuntime { symbols }
}

/// The capabilities modules are allowed to link against, by exported name.
fn capability_list() -> &'static [(&'static str, usize)] {
    use crate::platform::launchpad_platform;
    use crate::services::log::launchpad_log;
    use crate::vtty::export::*;

    static LIST: spin::Once<Vec<(&'static str, usize)>> = spin::Once::new();
    LIST.call_once(|| {
        vec![
            ("launchpad_platform", launchpad_platform as usize),
            ("launchpad_log", launchpad_log as usize),
            ("launchpad_mount_rootfs", rootfs::launchpad_mount_rootfs as usize),
            // Flash.
            ("launchpad_flash_size", flash::launchpad_flash_size as usize),
            ("launchpad_flash_read", flash::launchpad_flash_read as usize),
            ("launchpad_flash_write", flash::launchpad_flash_write as usize),
            ("launchpad_flash_erase", flash::launchpad_flash_erase as usize),
            (
                "launchpad_flash_erase_range",
                flash::launchpad_flash_erase_range as usize,
            ),
            ("launchpad_flash_mmap", flash::launchpad_flash_mmap as usize),
            ("launchpad_flash_munmap", flash::launchpad_flash_munmap as usize),
            // Partitions.
            (
                "launchpad_partition_find",
                partition::launchpad_partition_find as usize,
            ),
            (
                "launchpad_partition_size",
                partition::launchpad_partition_size as usize,
            ),
            (
                "launchpad_partition_read",
                partition::launchpad_partition_read as usize,
            ),
            (
                "launchpad_partition_write",
                partition::launchpad_partition_write as usize,
            ),
            (
                "launchpad_partition_erase_range",
                partition::launchpad_partition_erase_range as usize,
            ),
            // SD card.
            ("launchpad_sd_mount", sd::launchpad_sd_mount as usize),
            ("launchpad_sd_unmount", sd::launchpad_sd_unmount as usize),
            ("launchpad_sd_is_mounted", sd::launchpad_sd_is_mounted as usize),
            ("launchpad_sd_available", sd::launchpad_sd_available as usize),
            ("launchpad_sd_free_space", sd::launchpad_sd_free_space as usize),
            // Processor.
            ("launchpad_reboot", processor::launchpad_reboot as usize),
            ("launchpad_halt", processor::launchpad_halt as usize),
            ("launchpad_sleep", processor::launchpad_sleep as usize),
            ("launchpad_deep_sleep", processor::launchpad_deep_sleep as usize),
            (
                "launchpad_get_reset_reason",
                processor::launchpad_get_reset_reason as usize,
            ),
            ("launchpad_get_cpu_freq", processor::launchpad_get_cpu_freq as usize),
            ("launchpad_get_cpu_id", processor::launchpad_get_cpu_id as usize),
            // Console.
            ("launchpad_vtty_putc", launchpad_vtty_putc as usize),
            ("launchpad_vtty_putchar", launchpad_vtty_putchar as usize),
            ("launchpad_vtty_puts", launchpad_vtty_puts as usize),
            ("launchpad_vtty_write", launchpad_vtty_write as usize),
            ("launchpad_vtty_flush", launchpad_vtty_flush as usize),
            ("launchpad_vtty_getc", launchpad_vtty_getc as usize),
            ("launchpad_vtty_available", launchpad_vtty_available as usize),
            (
                "launchpad_vtty_clear_screen",
                launchpad_vtty_clear_screen as usize,
            ),
            (
                "launchpad_vtty_move_cursor",
                launchpad_vtty_move_cursor as usize,
            ),
            (
                "launchpad_vtty_set_baudrate",
                launchpad_vtty_set_baudrate as usize,
            ),
            ("launchpad_vtty_is_ready", launchpad_vtty_is_ready as usize),
            (
                "launchpad_vtty_set_callback",
                launchpad_vtty_set_callback as usize,
            ),
            ("launchpad_vtty_ioctl", launchpad_vtty_ioctl as usize),
        ]
    })
}
