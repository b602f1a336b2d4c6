//! ╔═══════════════════════════════════════════════════════════════════════════╗
//! ║                         LAUNCHPAD - HOST RUNTIME                          ║
//! ║                 Boot, Capabilities and Module Execution                   ║
//! ╚═══════════════════════════════════════════════════════════════════════════╝
//!
//! The host side of a loadable-module platform. Boot installs device
//! backends and the virtual console, publishes a curated capability table,
//! and hands modules to a pluggable execution engine for relocation and
//! dispatch.

pub mod loader;
pub mod platform;
pub mod registrar;
pub mod services;
pub mod symbol;
pub mod vtty;

pub use loader::{ExecEngine, ExecError, LoadError, LoadState, ModuleCtx, ModuleLoader};
pub use platform::{Feature, Hardware, PlatformInfo};
pub use registrar::{launchpad_init, launchpad_init_with, HostDevices, HostRuntime};
pub use symbol::{ResolveOrder, SymbolTable};
pub use vtty::{TtyDriver, TtyError, TtyInfo};
