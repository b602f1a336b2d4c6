//! Platform Capability Descriptor
//!
//! A fixed-layout, versioned record that loaded modules query to discover
//! what the host platform offers. The magic number and version triple exist
//! so independently compiled code can validate the record before trusting
//! the feature and hardware bitmasks.

// ═══════════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Descriptor magic, 'LAPF'. A module that resolves `launchpad_platform`
/// checks this before reading anything else.
pub const LAUNCHPAD_MAGIC: u32 = 0x4C41_5046;

pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;
pub const VERSION_PATCH: u16 = 3;

/// Build stamp, yyyymmdd packed as hex.
pub const BUILD_TIMESTAMP: u32 = 0x2025_0823;

// Fixed string field sizes, terminating NUL included.
pub const STR_LEN_LOADER: usize = 32;
pub const STR_LEN_BUILD: usize = 64;
pub const STR_LEN_PLATFORM: usize = 32;
pub const STR_LEN_CUSTOM: usize = 128;

pub const ENDIAN_LITTLE: u8 = 0;
pub const ENDIAN_BIG: u8 = 1;

// ═══════════════════════════════════════════════════════════════════════════════
// FEATURE BITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Feature bitmask: which platform services a loaded module may expect.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Feature(pub u64);

impl Feature {
    pub const NONE: Feature = Feature(0);

    // Communication interfaces
    pub const UART: Feature = Feature(1 << 0);
    pub const SPI: Feature = Feature(1 << 1);
    pub const I2C: Feature = Feature(1 << 2);
    pub const SDIO: Feature = Feature(1 << 3);
    pub const CAN: Feature = Feature(1 << 6);
    pub const ETH: Feature = Feature(1 << 7);
    pub const WIFI: Feature = Feature(1 << 8);
    pub const BLE: Feature = Feature(1 << 9);
    pub const IR: Feature = Feature(1 << 13);
    pub const PWM: Feature = Feature(1 << 14);
    pub const DAC: Feature = Feature(1 << 15);
    pub const VTTY: Feature = Feature(1 << 16);

    // Sensors
    pub const TOUCH: Feature = Feature(1 << 32);

    // Storage
    pub const FLASH: Feature = Feature(1 << 37);
    pub const SD_CARD: Feature = Feature(1 << 38);

    // Power management
    pub const SLEEP_MODE: Feature = Feature(1 << 44);
    pub const WAKEUP_GPIO: Feature = Feature(1 << 45);
    pub const RTC_ALARM: Feature = Feature(1 << 46);

    // Security
    pub const SECURE_BOOT: Feature = Feature(1 << 47);
    pub const HARDWARE_RNG: Feature = Feature(1 << 48);
    pub const AES: Feature = Feature(1 << 49);
    pub const HMAC: Feature = Feature(1 << 51);

    // Debug / system services
    pub const UART_DEBUG: Feature = Feature(1 << 54);
    pub const WATCHDOG: Feature = Feature(1 << 56);
    pub const SYSTEM_TICK: Feature = Feature(1 << 57);

    /// Check whether every bit in `feat` is set.
    pub const fn has(self, feat: Feature) -> bool {
        (self.0 & feat.0) == feat.0
    }

    /// Combine feature sets.
    pub const fn or(self, other: Feature) -> Feature {
        Feature(self.0 | other.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HARDWARE BITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Hardware attribute bitmask: core count, architecture, caches, accelerators.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Hardware(pub u64);

impl Hardware {
    pub const NONE: Hardware = Hardware(0);

    pub const MULTICORE: Hardware = Hardware(1 << 0);
    pub const SINGLECORE: Hardware = Hardware(1 << 1);

    pub const ARCH_ARM: Hardware = Hardware(1 << 2);
    pub const ARCH_XTENSA: Hardware = Hardware(1 << 3);
    pub const ARCH_RISCV: Hardware = Hardware(1 << 4);
    pub const ARCH_X86: Hardware = Hardware(1 << 5);

    pub const XTENSA_LX6: Hardware = Hardware(1 << 15);
    pub const XTENSA_LX7: Hardware = Hardware(1 << 16);

    pub const XTENSA_FPU: Hardware = Hardware(1 << 27);
    pub const XTENSA_CRYPTO: Hardware = Hardware(1 << 28);

    pub const CORE_INORDER: Hardware = Hardware(1 << 34);
    pub const CACHE_L1_I: Hardware = Hardware(1 << 38);
    pub const CACHE_L1_D: Hardware = Hardware(1 << 39);

    pub const RNG: Hardware = Hardware(1 << 46);
    pub const CRYPTO_ACCEL: Hardware = Hardware(1 << 47);

    pub const HARDWARE_DIVIDE: Hardware = Hardware(1 << 56);
    pub const HARDWARE_MULTIPLY: Hardware = Hardware(1 << 57);

    pub const fn has(self, hw: Hardware) -> bool {
        (self.0 & hw.0) == hw.0
    }

    pub const fn or(self, other: Hardware) -> Hardware {
        Hardware(self.0 | other.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DESCRIPTOR RECORD
// ═══════════════════════════════════════════════════════════════════════════════

/// The platform descriptor returned by value to loaded modules.
///
/// Layout is part of the ABI: fixed field order, 8-byte alignment, string
/// fields NUL-padded. Never reorder fields.
#[repr(C, align(8))]
#[derive(Clone, Copy)]
pub struct PlatformInfo {
    pub magic: u32,
    pub version_major: u16,
    pub version_minor: u16,
    pub version_patch: u16,
    pub build_timestamp: u32,

    pub loader_name: [u8; STR_LEN_LOADER],
    pub build_name: [u8; STR_LEN_BUILD],
    pub platform_name: [u8; STR_LEN_PLATFORM],

    pub bitness: u8,
    pub endian: u8,
    pub reserved0: u16,

    pub features: u64,
    pub hardware: u64,

    pub custom_info: [u8; STR_LEN_CUSTOM],
}

impl PlatformInfo {
    /// Sanity check a descriptor the way a loaded module would: magic first,
    /// then make sure the major version is one we understand.
    pub fn is_valid(&self) -> bool {
        self.magic == LAUNCHPAD_MAGIC && self.version_major == VERSION_MAJOR
    }

    pub fn features(&self) -> Feature {
        Feature(self.features)
    }

    pub fn hardware(&self) -> Hardware {
        Hardware(self.hardware)
    }

    pub fn loader_name(&self) -> &str {
        fixed_str_as_str(&self.loader_name)
    }

    pub fn build_name(&self) -> &str {
        fixed_str_as_str(&self.build_name)
    }

    pub fn platform_name(&self) -> &str {
        fixed_str_as_str(&self.platform_name)
    }
}

/// Copy `s` into a NUL-padded fixed field, truncating so the terminating
/// NUL always fits.
const fn fixed_str<const N: usize>(s: &str) -> [u8; N] {
    let bytes = s.as_bytes();
    let mut out = [0u8; N];
    let mut i = 0;
    while i < bytes.len() && i < N - 1 {
        out[i] = bytes[i];
        i += 1;
    }
    out
}

fn fixed_str_as_str(field: &[u8]) -> &str {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    core::str::from_utf8(&field[..end]).unwrap_or("")
}

const PLATFORM_FEATURES: Feature = Feature(
    Feature::UART.0
        | Feature::SPI.0
        | Feature::I2C.0
        | Feature::SDIO.0
        | Feature::CAN.0
        | Feature::VTTY.0
        | Feature::TOUCH.0
        | Feature::FLASH.0
        | Feature::SD_CARD.0
        | Feature::SLEEP_MODE.0
        | Feature::WAKEUP_GPIO.0
        | Feature::RTC_ALARM.0
        | Feature::HARDWARE_RNG.0
        | Feature::AES.0
        | Feature::HMAC.0
        | Feature::SECURE_BOOT.0
        | Feature::UART_DEBUG.0
        | Feature::WATCHDOG.0
        | Feature::SYSTEM_TICK.0,
);

const PLATFORM_HARDWARE: Hardware = Hardware(
    Hardware::MULTICORE.0
        | Hardware::ARCH_XTENSA.0
        | Hardware::XTENSA_LX6.0
        | Hardware::XTENSA_FPU.0
        | Hardware::XTENSA_CRYPTO.0
        | Hardware::CORE_INORDER.0
        | Hardware::CACHE_L1_I.0
        | Hardware::CACHE_L1_D.0
        | Hardware::RNG.0
        | Hardware::CRYPTO_ACCEL.0
        | Hardware::HARDWARE_DIVIDE.0
        | Hardware::HARDWARE_MULTIPLY.0,
);

static PLATFORM_INFO: PlatformInfo = PlatformInfo {
    magic: LAUNCHPAD_MAGIC,
    version_major: VERSION_MAJOR,
    version_minor: VERSION_MINOR,
    version_patch: VERSION_PATCH,
    build_timestamp: BUILD_TIMESTAMP,

    loader_name: fixed_str("LaunchPad"),
    build_name: fixed_str("Developer Build Preview"),
    platform_name: fixed_str("ESP32"),

    bitness: if cfg!(target_pointer_width = "64") { 64 } else { 32 },
    endian: if cfg!(target_endian = "big") { ENDIAN_BIG } else { ENDIAN_LITTLE },
    reserved0: 0,

    features: PLATFORM_FEATURES.0,
    hardware: PLATFORM_HARDWARE.0,

    custom_info: fixed_str(""),
};

/// Descriptor query entry point. Returns a copy by value, per the ABI
/// convention, so modules can never alias host memory through it.
pub extern "C" fn launchpad_platform() -> PlatformInfo {
    PLATFORM_INFO
}

/// Convenience accessor for host-side code that wants the feature mask
/// without going through the C ABI.
pub fn features() -> Feature {
    PLATFORM_INFO.features()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_validates() {
        let info = launchpad_platform();
        assert!(info.is_valid());
        assert_eq!(info.loader_name(), "LaunchPad");
        assert_eq!(info.platform_name(), "ESP32");
    }

    #[test]
    fn fixed_str_truncates_with_nul() {
        let long: [u8; 4] = fixed_str("abcdef");
        assert_eq!(&long, b"abc\0");
    }
}
