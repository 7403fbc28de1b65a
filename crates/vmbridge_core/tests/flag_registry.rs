use vmbridge_core::{FlagKind, FlagRegistry, FlagSnapshot};

fn registry() -> FlagRegistry {
    let mut builder = FlagRegistry::builder();
    builder.register_bool("EnableFoo", false).unwrap();
    builder.register_bool("CompilerInlining", true).unwrap();
    builder.register_bool("x", false).unwrap();
    builder.register_int("MaxDepth", 10).unwrap();
    builder.register_int("x", 0).unwrap();
    builder.build()
}

#[test]
fn get_after_set_returns_new_value_for_every_flag() {
    let registry = registry();
    let bool_names = registry
        .records::<bool>()
        .iter()
        .map(|record| record.name().to_string())
        .collect::<Vec<_>>();
    let int_names = registry
        .records::<i32>()
        .iter()
        .map(|record| record.name().to_string())
        .collect::<Vec<_>>();

    for name in &bool_names {
        for value in [true, false, true] {
            assert!(registry.set_bool(name, value));
            assert_eq!(registry.get_bool(name), Some(value));
        }
    }
    for name in &int_names {
        for value in [i32::MIN, -1, 0, 7, i32::MAX] {
            assert!(registry.set_int(name, value));
            assert_eq!(registry.get_int(name), Some(value));
        }
    }
}

#[test]
fn unknown_names_fail_without_touching_other_flags() {
    let registry = registry();
    let before = registry
        .records::<i32>()
        .iter()
        .map(|record| record.value())
        .collect::<Vec<_>>();

    assert_eq!(registry.get_int("Nonexistent"), None);
    assert!(!registry.set_int("Nonexistent", 99));
    assert!(!registry.set_bool("MaxDepth", true));
    assert!(!registry.set_int("maxdepth", 1));
    assert!(!registry.set_bool("", true));

    let after = registry
        .records::<i32>()
        .iter()
        .map(|record| record.value())
        .collect::<Vec<_>>();
    assert_eq!(before, after);
    assert_eq!(registry.get_bool("EnableFoo"), Some(false));
}

#[test]
fn set_is_idempotent() {
    let registry = registry();
    assert!(registry.set_int("MaxDepth", 4));
    assert!(registry.set_int("MaxDepth", 4));
    assert_eq!(registry.get_int("MaxDepth"), Some(4));
}

#[test]
fn same_name_flags_of_different_kinds_are_independent() {
    let registry = registry();
    assert!(registry.set_bool("x", true));
    assert!(registry.set_int("x", 5));
    assert_eq!(registry.get_bool("x"), Some(true));
    assert_eq!(registry.get_int("x"), Some(5));
}

#[test]
fn snapshot_lists_bools_then_ints_in_registration_order() {
    let registry = registry();
    let snapshot = registry.snapshot();

    assert_eq!(
        snapshot.len(),
        registry.count(FlagKind::Bool) + registry.count(FlagKind::Int)
    );
    assert_eq!(
        snapshot.names().collect::<Vec<_>>(),
        vec!["EnableFoo", "CompilerInlining", "x", "MaxDepth", "x"]
    );
    assert_eq!(snapshot.tags().collect::<Vec<_>>(), vec![0, 0, 0, 1, 1]);
    assert_eq!(snapshot.count(FlagKind::Bool), 3);
}

#[test]
fn snapshot_is_independent_of_later_writes_and_stable_across_calls() {
    let registry = registry();
    let first = registry.snapshot();
    assert!(registry.set_int("MaxDepth", 1));
    let second = registry.snapshot();
    assert_eq!(first, second);

    let names = first.into_entries();
    assert_eq!(names[0].name, "EnableFoo");
}

#[test]
fn concrete_example_flow() {
    let registry = FlagRegistry::builder()
        .with_bool("EnableFoo", false)
        .and_then(|builder| builder.with_int("MaxDepth", 10))
        .unwrap()
        .build();

    assert!(registry.set_bool("EnableFoo", true));
    assert_eq!(registry.get_bool("EnableFoo"), Some(true));
    let entries = registry
        .snapshot()
        .into_iter()
        .map(|entry| { let tag = entry.tag(); (entry.name, tag) })
        .collect::<Vec<_>>();
    assert_eq!(
        entries,
        vec![("EnableFoo".to_string(), 0), ("MaxDepth".to_string(), 1)]
    );
    assert_eq!(registry.get_int("Nonexistent"), None);
}

#[test]
fn released_snapshot_reports_every_entry() {
    let registry = registry();
    let snapshot: FlagSnapshot = registry.snapshot();
    assert_eq!(snapshot.release(), registry.len());
}

#[test]
fn overrides_apply_in_order_and_collect_unknown_names() {
    let registry = registry();
    let overrides =
        vmbridge_core::parse_overrides("false,EnableFoo,MaxDepth=64,Missing=3").unwrap();
    let report = registry.apply_overrides(&overrides);

    assert_eq!(report.applied, 3);
    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(registry.get_bool("EnableFoo"), Some(true));
    assert_eq!(registry.get_bool("CompilerInlining"), Some(false));
    assert_eq!(registry.get_int("MaxDepth"), Some(64));
}
