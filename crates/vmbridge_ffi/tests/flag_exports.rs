use std::ffi::{c_char, c_int, CStr};
use std::sync::OnceLock;
use vmbridge_core::{global_registry, install_global_registry, FlagRegistry};
use vmbridge_ffi::{
    vmbridge_apply_flag_overrides, vmbridge_flags_json, vmbridge_free, vmbridge_get_flag_bool,
    vmbridge_get_flag_int, vmbridge_get_flags, vmbridge_release_flags, vmbridge_set_flag_bool,
    vmbridge_set_flag_int, FlagGroup,
};

static INSTALLED: OnceLock<()> = OnceLock::new();

// Tests in this file share the process-wide registry and only touch flags
// they own.
fn install() {
    INSTALLED.get_or_init(|| {
        let registry = FlagRegistry::builder()
            .with_bool("EnableFoo", false)
            .and_then(|b| b.with_bool("Shared", false))
            .and_then(|b| b.with_bool("OverrideBool", false))
            .and_then(|b| b.with_int("MaxDepth", 10))
            .and_then(|b| b.with_int("Shared", 0))
            .and_then(|b| b.with_int("OverrideInt", 0))
            .expect("test flags should register")
            .build();
        install_global_registry(registry).expect("registry installs once");
    });
}

fn name(value: &str) -> (*const c_char, usize) {
    (value.as_ptr().cast::<c_char>(), value.len())
}

#[test]
fn set_then_get_bool_through_c_abi() {
    install();
    let (ptr, len) = name("EnableFoo");
    assert!(unsafe { vmbridge_set_flag_bool(ptr, len, true) });

    let mut out = false;
    assert!(unsafe { vmbridge_get_flag_bool(ptr, len, &mut out) });
    assert!(out);
}

#[test]
fn name_is_length_delimited() {
    install();
    let raw = "MaxDepthIgnoredSuffix";
    assert!(unsafe { vmbridge_set_flag_int(raw.as_ptr().cast::<c_char>(), 8, 32) });

    let mut out: c_int = 0;
    let (ptr, len) = name("MaxDepth");
    assert!(unsafe { vmbridge_get_flag_int(ptr, len, &mut out) });
    assert_eq!(out, 32);
}

#[test]
fn unknown_name_leaves_out_slot_untouched() {
    install();
    let (ptr, len) = name("Nonexistent");
    let mut out: c_int = -77;
    assert!(!unsafe { vmbridge_get_flag_int(ptr, len, &mut out) });
    assert_eq!(out, -77);
    assert!(!unsafe { vmbridge_set_flag_int(ptr, len, 1) });
    assert!(!unsafe { vmbridge_get_flag_int(ptr, len, std::ptr::null_mut()) });
}

#[test]
fn same_name_across_kinds_is_independent() {
    install();
    let (ptr, len) = name("Shared");
    assert!(unsafe { vmbridge_set_flag_bool(ptr, len, true) });
    assert!(unsafe { vmbridge_set_flag_int(ptr, len, 5) });

    let mut flag = false;
    let mut number: c_int = 0;
    assert!(unsafe { vmbridge_get_flag_bool(ptr, len, &mut flag) });
    assert!(unsafe { vmbridge_get_flag_int(ptr, len, &mut number) });
    assert!(flag);
    assert_eq!(number, 5);
}

#[test]
fn enumerated_group_matches_registry_and_releases_once() {
    install();
    let mut group = vmbridge_get_flags();
    assert_eq!(group.size, global_registry().len());

    let entries = unsafe { group.to_entries() };
    let names = entries.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["EnableFoo", "Shared", "OverrideBool", "MaxDepth", "Shared", "OverrideInt"]
    );
    let tags = entries.iter().map(|(_, tag)| *tag).collect::<Vec<_>>();
    assert_eq!(tags, vec![0, 0, 0, 1, 1, 1]);

    unsafe { vmbridge_release_flags(&mut group) };
    assert!(group.is_released());
    assert_eq!(group.size, 0);

    // Second release of the zeroed group and a null group are no-ops.
    unsafe { vmbridge_release_flags(&mut group) };
    unsafe { vmbridge_release_flags(std::ptr::null_mut::<FlagGroup>()) };
}

#[test]
fn overrides_apply_through_c_abi() {
    install();
    let (ptr, len) = name("OverrideBool=true,OverrideInt=9,Missing=1");
    assert_eq!(unsafe { vmbridge_apply_flag_overrides(ptr, len) }, 1);
    assert_eq!(global_registry().get_bool("OverrideBool"), Some(true));
    assert_eq!(global_registry().get_int("OverrideInt"), Some(9));

    let (ptr, len) = name("OverrideInt=nine");
    assert_eq!(unsafe { vmbridge_apply_flag_overrides(ptr, len) }, -1);
    assert_eq!(global_registry().get_int("OverrideInt"), Some(9));
}

#[test]
fn flags_json_is_released_with_free() {
    install();
    let raw = vmbridge_flags_json();
    assert!(!raw.is_null());

    let json = unsafe { CStr::from_ptr(raw) }
        .to_str()
        .expect("json is utf-8")
        .to_string();
    unsafe { vmbridge_free(raw.cast()) };

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let entries = value.as_array().expect("json array");
    assert_eq!(entries.len(), global_registry().len());
    assert_eq!(entries[0]["name"], "EnableFoo");
    assert_eq!(entries[3]["kind"], "int");
}
