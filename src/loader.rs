//! Module Loader
//!
//! Drives a loadable module through its lifecycle: init, relocation against
//! the symbol table, execution, teardown. The execution engine is pluggable
//! so the same flow serves real relocation backends and harness engines
//! alike. Engine teardown runs on every path, including early failures,
//! because the context is released by `Drop`.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::Path;

use crate::symbol::SymbolTable;

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS AND STATES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExecError {
    /// Engine could not allocate or prepare a context.
    InitFailed,
    /// Image is not in a format the engine accepts.
    BadImage,
    /// Relocation referenced a symbol the table could not resolve.
    UnresolvedSymbol,
    /// Engine ran out of memory mid-operation.
    NoMemory,
    /// The module entry point faulted.
    EntryFault,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoadError {
    /// Module file could not be found or opened.
    Open,
    /// Module file exists but could not be read.
    Read,
    /// Zero-length image.
    Empty,
    /// Operation called out of lifecycle order.
    State,
    Engine(ExecError),
}

impl From<ExecError> for LoadError {
    fn from(err: ExecError) -> LoadError {
        LoadError::Engine(err)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoadState {
    Loaded,
    Relocated,
    /// Entry point is on the stack right now.
    Running,
    Done,
    Failed,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE SEAM
// ═══════════════════════════════════════════════════════════════════════════════

/// Symbol resolver handed to engines during relocation.
pub type Resolver<'r> = &'r dyn Fn(&str) -> Option<usize>;

/// A module execution backend. `Context` carries whatever per-module state
/// the engine needs between stages; the loader never inspects it.
pub trait ExecEngine {
    type Context;

    fn init(&self) -> Result<Self::Context, ExecError>;

    fn relocate(
        &self,
        ctx: &mut Self::Context,
        image: &[u8],
        resolve: Resolver,
    ) -> Result<(), ExecError>;

    /// Run the module entry point. Returns the module's exit code; a
    /// nonzero code is the module's business, not a loader failure.
    fn request(&self, ctx: &mut Self::Context, mode: i32, args: &[&str]) -> Result<i32, ExecError>;

    fn deinit(&self, ctx: Self::Context);
}

// ═══════════════════════════════════════════════════════════════════════════════
// MODULE LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════════

/// A module mid-lifecycle. Holds the engine context; dropping it releases
/// the context through the engine exactly once.
pub struct ModuleCtx<'l, 'buf, E: ExecEngine> {
    engine: &'l E,
    symbols: &'l SymbolTable,
    image: Cow<'buf, [u8]>,
    ctx: Option<E::Context>,
    state: LoadState,
    exit_code: Option<i32>,
}

impl<'l, 'buf, E: ExecEngine> ModuleCtx<'l, 'buf, E> {
    fn new(
        engine: &'l E,
        symbols: &'l SymbolTable,
        image: Cow<'buf, [u8]>,
    ) -> Result<Self, LoadError> {
        if image.is_empty() {
            return Err(LoadError::Empty);
        }
        let ctx = engine.init()?;
        Ok(ModuleCtx {
            engine,
            symbols,
            image,
            ctx: Some(ctx),
            state: LoadState::Loaded,
            exit_code: None,
        })
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Patch the image against the symbol table.
    pub fn relocate(&mut self) -> Result<(), LoadError> {
        if self.state != LoadState::Loaded {
            return Err(LoadError::State);
        }
        let symbols = self.symbols;
        let resolve = |name: &str| symbols.resolve(name);
        let ctx = self.ctx.as_mut().ok_or(LoadError::State)?;
        match self.engine.relocate(ctx, &self.image, &resolve) {
            Ok(()) => {
                self.state = LoadState::Relocated;
                Ok(())
            }
            Err(err) => {
                self.state = LoadState::Failed;
                Err(err.into())
            }
        }
    }

    /// Run the module entry point and record its exit code.
    pub fn execute(&mut self, mode: i32, args: &[&str]) -> Result<i32, LoadError> {
        if self.state != LoadState::Relocated {
            return Err(LoadError::State);
        }
        let ctx = self.ctx.as_mut().ok_or(LoadError::State)?;
        self.state = LoadState::Running;
        match self.engine.request(ctx, mode, args) {
            Ok(code) => {
                self.state = LoadState::Done;
                self.exit_code = Some(code);
                Ok(code)
            }
            Err(err) => {
                self.state = LoadState::Failed;
                Err(err.into())
            }
        }
    }

    /// Release the engine context now instead of at drop.
    pub fn teardown(mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.engine.deinit(ctx);
        }
    }
}

impl<E: ExecEngine> Drop for ModuleCtx<'_, '_, E> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.engine.deinit(ctx);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOADER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct ModuleLoader<'l, E: ExecEngine> {
    engine: E,
    symbols: &'l SymbolTable,
}

impl<'l, E: ExecEngine> ModuleLoader<'l, E> {
    pub fn new(engine: E, symbols: &'l SymbolTable) -> Self {
        ModuleLoader { engine, symbols }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Stage a module from an in-memory image. The image is borrowed, not
    /// copied.
    pub fn load_from_bytes<'buf>(
        &self,
        image: &'buf [u8],
    ) -> Result<ModuleCtx<'_, 'buf, E>, LoadError> {
        ModuleCtx::new(&self.engine, self.symbols, Cow::Borrowed(image))
    }

    /// Stage a module read from the filesystem.
    pub fn load_from_path(&self, path: &Path) -> Result<ModuleCtx<'_, 'static, E>, LoadError> {
        let image = std::fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => LoadError::Open,
            _ => LoadError::Read,
        })?;
        ModuleCtx::new(&self.engine, self.symbols, Cow::Owned(image))
    }

    /// Full lifecycle from an in-memory image. True only when the module
    /// ran and exited with code zero.
    pub fn run_from_bytes(&self, image: &[u8], mode: i32, args: &[&str]) -> bool {
        match self.load_from_bytes(image) {
            Ok(module) => Self::drive(module, mode, args),
            Err(err) => {
                crate::log_warn!("loader", "load failed: {:?}", err);
                false
            }
        }
    }

    /// Full lifecycle from a file on disk.
    pub fn run_from_path(&self, path: &Path, mode: i32, args: &[&str]) -> bool {
        match self.load_from_path(path) {
            Ok(module) => Self::drive(module, mode, args),
            Err(err) => {
                crate::log_warn!("loader", "load of {} failed: {:?}", path.display(), err);
                false
            }
        }
    }

    fn drive(mut module: ModuleCtx<E>, mode: i32, args: &[&str]) -> bool {
        if let Err(err) = module.relocate() {
            crate::log_warn!("loader", "relocation failed: {:?}", err);
            return false;
        }
        let ok = match module.execute(mode, args) {
            Ok(code) => {
                if code != 0 {
                    crate::log_info!("loader", "module exited with code {}", code);
                }
                code == 0
            }
            Err(err) => {
                crate::log_warn!("loader", "execution failed: {:?}", err);
                false
            }
        };
        module.teardown();
        ok
    }
}
