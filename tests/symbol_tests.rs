//! Symbol Table Tests
//!
//! Registration and lookup across the three tiers, precedence policy, and
//! ownership of registered names.

use launchpad::symbol::{builtin, ResolveOrder, SymbolTable, SymEntry};

static LIB: &[SymEntry] = &[
    SymEntry {
        name: "lib_sqrt",
        addr: 0x1000,
    },
    SymEntry {
        name: "shared",
        addr: 0x1100,
    },
];

static PLAT: &[SymEntry] = &[SymEntry {
    name: "plat_putc",
    addr: 0x2000,
}];

// ═══════════════════════════════════════════════════════════════════════════════
// STATIC TIERS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_static_tiers_resolve_without_registration() {
    let table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::BuiltinFirst);
    assert_eq!(table.resolve("lib_sqrt"), Some(0x1000));
    assert_eq!(table.resolve("plat_putc"), Some(0x2000));
    assert_eq!(table.dynamic_count(), 0);
}

#[test]
fn test_unknown_name_is_none() {
    let table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::BuiltinFirst);
    assert_eq!(table.resolve("no_such_symbol"), None);
    // Exact match only.
    assert_eq!(table.resolve("LIB_SQRT"), None);
    assert_eq!(table.resolve("lib_sqr"), None);
}

#[test]
fn test_compiled_in_tiers_carry_runtime_helpers() {
    let table = SymbolTable::new(ResolveOrder::BuiltinFirst);
    for name in ["lp_memset", "lp_memcpy", "lp_strlen", "lp_sqrt", "lp_time_ms"] {
        let addr = table.resolve(name);
        assert!(addr.is_some(), "missing builtin {name}");
        assert_ne!(addr, Some(0));
    }
    // Console helpers live in the platform tier.
    assert!(builtin::platform_symbols()
        .iter()
        .any(|e| e.name == "lp_console_putc"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// DYNAMIC REGISTRATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_register_and_resolve() {
    let mut table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::BuiltinFirst);
    assert!(table.register("launchpad_log", 0xA000));
    assert_eq!(table.resolve("launchpad_log"), Some(0xA000));
    assert_eq!(table.dynamic_count(), 1);
}

#[test]
fn test_register_rejects_empty_name_and_null_addr() {
    let mut table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::BuiltinFirst);
    assert!(!table.register("", 0xA000));
    assert!(!table.register("valid_name", 0));
    assert_eq!(table.dynamic_count(), 0);
}

#[test]
fn test_registered_name_outlives_caller_buffer() {
    let mut table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::BuiltinFirst);
    {
        let transient = String::from("ephemeral_sym");
        assert!(table.register(&transient, 0xB000));
    }
    assert_eq!(table.resolve("ephemeral_sym"), Some(0xB000));
}

#[test]
fn test_duplicate_registration_newest_wins() {
    let mut table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::DynamicFirst);
    assert!(table.register("cap", 0x10));
    assert!(table.register("cap", 0x20));
    assert!(table.register("cap", 0x30));
    assert_eq!(table.resolve("cap"), Some(0x30));
    // Shadowed entries are retained, not replaced.
    assert_eq!(table.dynamic_count(), 3);
}

#[test]
fn test_dynamic_names_in_registration_order() {
    let mut table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::BuiltinFirst);
    table.register("first", 0x1);
    table.register("second", 0x2);
    let names: Vec<&str> = table.dynamic_names().collect();
    assert_eq!(names, ["first", "second"]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRECEDENCE POLICY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_builtin_first_static_shadows_dynamic() {
    let mut table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::BuiltinFirst);
    assert!(table.register("shared", 0xDEAD));
    assert_eq!(table.resolve("shared"), Some(0x1100));
}

#[test]
fn test_dynamic_first_overrides_static() {
    let mut table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::DynamicFirst);
    assert!(table.register("shared", 0xDEAD));
    assert_eq!(table.resolve("shared"), Some(0xDEAD));
    // Names absent from the dynamic tier still fall through.
    assert_eq!(table.resolve("plat_putc"), Some(0x2000));
}

#[test]
fn test_default_order_is_builtin_first() {
    assert_eq!(ResolveOrder::default(), ResolveOrder::BuiltinFirst);
    let table = SymbolTable::with_tiers(LIB, PLAT, ResolveOrder::default());
    assert_eq!(table.order(), ResolveOrder::BuiltinFirst);
}
