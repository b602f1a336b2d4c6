//! Layered Symbol Table
//!
//! Name → address registry consulted by the relocation engine for every
//! undefined symbol a loaded module references. Three tiers:
//!
//! 1. Built-in library tier: memory/string/math fallbacks, read-only.
//! 2. Platform service tier: host runtime primitives, read-only.
//! 3. Dynamic tier: capability exports registered at boot, owned by the
//!    table for the rest of its lifetime.
//!
//! The table never inspects or dereferences an address; it only stores and
//! returns it.

pub mod builtin;

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRIES
// ═══════════════════════════════════════════════════════════════════════════════

/// One static-tier symbol: a name and the address it resolves to.
#[derive(Clone, Copy, Debug)]
pub struct SymEntry {
    pub name: &'static str,
    pub addr: usize,
}

/// Dynamic-tier entry. The table owns a durable copy of the name so the
/// registration outlives whatever buffer the caller built it from.
#[derive(Clone, Debug)]
struct DynSym {
    name: String,
    addr: usize,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION ORDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Tier precedence for `resolve`.
///
/// The default consults the static tiers first, which means a runtime
/// registration can never override a built-in of the same name. The
/// policy is explicit: construct the table with `DynamicFirst` to let
/// boot-time capabilities shadow built-ins.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ResolveOrder {
    /// Built-in library tier, then platform tier, then dynamic tier.
    #[default]
    BuiltinFirst,
    /// Dynamic tier first, then the static tiers.
    DynamicFirst,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TABLE
// ═══════════════════════════════════════════════════════════════════════════════

/// The layered symbol table. Owned data; share behind a lock if concurrent
/// registration is ever needed (the boot flow is single-threaded).
pub struct SymbolTable {
    lib: &'static [SymEntry],
    platform: &'static [SymEntry],
    dynamic: Vec<DynSym>,
    order: ResolveOrder,
}

impl SymbolTable {
    /// Table with the compiled-in tiers and the given precedence policy.
    pub fn new(order: ResolveOrder) -> Self {
        Self::with_tiers(builtin::lib_symbols(), builtin::platform_symbols(), order)
    }

    /// Table over caller-supplied static tiers. Used by the boot path
    /// indirectly and by tests directly.
    pub fn with_tiers(
        lib: &'static [SymEntry],
        platform: &'static [SymEntry],
        order: ResolveOrder,
    ) -> Self {
        Self {
            lib,
            platform,
            dynamic: Vec::new(),
            order,
        }
    }

    pub fn order(&self) -> ResolveOrder {
        self.order
    }

    /// Register a dynamic symbol. Returns `false` on an empty name, a zero
    /// address, or allocation failure; the existing table is untouched in
    /// every failure case. Duplicate names are accepted on purpose: the
    /// newest registration shadows older ones.
    pub fn register(&mut self, name: &str, addr: usize) -> bool {
        if name.is_empty() || addr == 0 {
            return false;
        }
        if self.dynamic.try_reserve(1).is_err() {
            return false;
        }
        let mut owned = String::new();
        if owned.try_reserve_exact(name.len()).is_err() {
            return false;
        }
        owned.push_str(name);
        self.dynamic.push(DynSym { name: owned, addr });
        true
    }

    /// Resolve a name to an address. Deterministic and side-effect free;
    /// `None` is the not-found sentinel. Exact, case-sensitive match.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        match self.order {
            ResolveOrder::BuiltinFirst => self
                .resolve_static(name)
                .or_else(|| self.resolve_dynamic(name)),
            ResolveOrder::DynamicFirst => self
                .resolve_dynamic(name)
                .or_else(|| self.resolve_static(name)),
        }
    }

    fn resolve_static(&self, name: &str) -> Option<usize> {
        self.lib
            .iter()
            .chain(self.platform.iter())
            .find(|e| e.name == name)
            .map(|e| e.addr)
    }

    fn resolve_dynamic(&self, name: &str) -> Option<usize> {
        // Newest-first scan keeps last-registered-wins shadowing explicit.
        self.dynamic
            .iter()
            .rev()
            .find(|e| e.name == name)
            .map(|e| e.addr)
    }

    /// Number of dynamic registrations (shadowed duplicates included).
    pub fn dynamic_count(&self) -> usize {
        self.dynamic.len()
    }

    /// Dynamic-tier names in registration order, for boot diagnostics.
    pub fn dynamic_names(&self) -> impl Iterator<Item = &str> {
        self.dynamic.iter().map(|e| e.name.as_str())
    }
}
