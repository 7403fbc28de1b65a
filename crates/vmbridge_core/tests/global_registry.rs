use vmbridge_core::{
    global_registry, global_registry_installed, install_global_registry, FlagRegistry,
    FlagRegistryError,
};

// Single test: the global slot is process-wide and written once.
#[test]
fn global_registry_is_empty_until_installed_once() {
    assert!(!global_registry_installed());
    assert!(global_registry().is_empty());
    assert!(!global_registry().set_bool("EnableFoo", true));

    let registry = FlagRegistry::builder()
        .with_bool("EnableFoo", false)
        .unwrap()
        .build();
    let installed = install_global_registry(registry).expect("first install succeeds");
    assert!(installed.set_bool("EnableFoo", true));
    assert_eq!(global_registry().get_bool("EnableFoo"), Some(true));

    let again = install_global_registry(FlagRegistry::empty());
    assert_eq!(again.err(), Some(FlagRegistryError::AlreadyInstalled));
    assert_eq!(global_registry().len(), 1);
}
