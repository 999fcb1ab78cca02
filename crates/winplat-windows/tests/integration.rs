//! Integration tests for Windows platform registration against a host.

use std::sync::Arc;

use winplat_host::{
    Architecture, CallingConvention, DuplicatePolicy, HostConfig, HostContext, HostModule, Role,
};
use winplat_windows::{initialize, Skip, WindowsModule, NAMESPACE, PE_FORMAT};

fn host(without: &[&str]) -> HostContext {
    HostConfig::builtin()
        .without_modules(without)
        .into_context(DuplicatePolicy::Reject)
        .expect("builtin host")
}

#[test]
fn full_catalog_fills_every_role() {
    let mut host = host(&[]);
    initialize(&mut host).expect("initialize");

    for platform in host.platforms.platforms(NAMESPACE) {
        let default = platform
            .default_calling_convention()
            .unwrap_or_else(|| panic!("{} has no default", platform.name()));
        for role in Role::ALL {
            assert!(
                platform.role(role).is_some(),
                "{} has no {role} role",
                platform.name()
            );
        }
        assert!(platform
            .calling_conventions()
            .iter()
            .any(|cc| Arc::ptr_eq(cc, default)));
    }
}

#[test]
fn x86_and_x64_present_arm_absent() {
    let mut host = host(&["arch_armv7"]);
    let report = initialize(&mut host).expect("initialize");

    let names: Vec<_> = host
        .platforms
        .platforms(NAMESPACE)
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, vec!["windows-x86", "windows-x86_64", "windows-aarch64"]);
    assert!(host.platforms.get(NAMESPACE, "windows-armv7").is_none());
    assert!(host.platforms.get(NAMESPACE, "windows-thumb2").is_none());

    let x86 = host.platforms.get(NAMESPACE, "windows-x86").unwrap();
    assert_eq!(x86.default_calling_convention().unwrap().name, "cdecl");

    let x64 = host.platforms.get(NAMESPACE, "windows-x86_64").unwrap();
    assert_eq!(x64.default_calling_convention().unwrap().name, "win64");
    for role in Role::ALL {
        assert_eq!(x64.role(role).unwrap().name, "win64");
    }

    let skipped: Vec<_> = report.skipped.iter().map(Skip::architecture).collect();
    assert_eq!(skipped, vec!["armv7", "thumb2"]);
}

#[test]
fn arm_siblings_link_to_each_other() {
    let mut host = host(&[]);
    initialize(&mut host).expect("initialize");

    let arm = host.platforms.get(NAMESPACE, "windows-armv7").unwrap();
    let thumb = host.platforms.get(NAMESPACE, "windows-thumb2").unwrap();

    let from_arm = host
        .platforms
        .related_platform(NAMESPACE, &arm, "thumb2")
        .expect("armv7 -> thumb2");
    let from_thumb = host
        .platforms
        .related_platform(NAMESPACE, &thumb, "armv7")
        .expect("thumb2 -> armv7");

    assert!(Arc::ptr_eq(&from_arm, &thumb));
    assert!(Arc::ptr_eq(&from_thumb, &arm));
    assert!(!Arc::ptr_eq(&from_arm, &arm));
}

#[test]
fn thumb_without_arm_builds_neither() {
    let mut host = host(&["arch_armv7"]);
    let thumb = host
        .catalog
        .register_architecture(Architecture::new("thumb2", 4))
        .unwrap();
    host.catalog
        .register_calling_convention(CallingConvention::new(&thumb, "cdecl"))
        .unwrap();

    let report = initialize(&mut host).expect("initialize");
    assert!(host.platforms.platforms_for_architecture(NAMESPACE, "thumb2").is_empty());
    assert!(host.platforms.platforms_for_architecture(NAMESPACE, "armv7").is_empty());
    assert!(report.skipped.contains(&Skip::SiblingNotReady {
        architecture: "thumb2".into(),
        sibling: "armv7".into(),
    }));
}

#[test]
fn missing_convention_degrades_gracefully() {
    let config = HostConfig::parse(
        r#"
[[module]]
name = "arch_x86"

[[module.architecture]]
name = "x86"
address-size = 4

[[module.architecture.calling-convention]]
name = "cdecl"

[[module.architecture.calling-convention]]
name = "thiscall"
"#,
    )
    .unwrap();
    let mut host = config.into_context(DuplicatePolicy::Reject).unwrap();
    let report = initialize(&mut host).expect("initialize");

    let x86 = host.platforms.get(NAMESPACE, "windows-x86").unwrap();
    assert_eq!(x86.role(Role::Cdecl).unwrap().name, "cdecl");
    assert!(x86.role(Role::Fastcall).is_none());
    assert!(x86.role(Role::Stdcall).is_none());
    assert!(x86.calling_convention("thiscall").is_some());
    for (_, cc) in x86.roles() {
        assert!(x86.calling_conventions().iter().any(|r| Arc::ptr_eq(r, cc)));
    }

    let built = &report.built[0];
    assert_eq!(
        built.missing().collect::<Vec<_>>(),
        vec!["fastcall", "stdcall", "regparm"]
    );
}

#[test]
fn pe_defaults_point_at_published_platforms() {
    let mut host = host(&[]);
    initialize(&mut host).expect("initialize");

    for arch in ["x86", "x86_64", "armv7", "aarch64"] {
        let default = host
            .default_platforms
            .default_platform(PE_FORMAT, arch)
            .unwrap_or_else(|| panic!("no PE default for {arch}"));
        let published = host
            .platforms
            .get(NAMESPACE, default.name())
            .expect("published");
        assert!(Arc::ptr_eq(&default, &published));
        assert_eq!(default.architecture().name, arch);
    }
    assert!(host
        .default_platforms
        .default_platform(PE_FORMAT, "thumb2")
        .is_none());
}

#[test]
fn format_default_can_be_overridden() {
    let mut host = host(&[]);
    initialize(&mut host).expect("initialize");

    let x86 = host.catalog.lookup_architecture("x86").unwrap();
    let custom = host
        .platforms
        .register("custom", winplat_host::Platform::new(Arc::clone(&x86), "custom-x86"))
        .unwrap();
    host.default_platforms
        .register_default_platform(PE_FORMAT, &x86, Arc::clone(&custom));

    let current = host
        .default_platforms
        .default_platform(PE_FORMAT, "x86")
        .unwrap();
    assert!(Arc::ptr_eq(&current, &custom));
    assert_eq!(host.default_platforms.len(), 4);
}

#[test]
fn module_load_reports_and_registers() {
    let mut host = host(&["arch_arm64"]);
    let module = WindowsModule::new();
    host.load(&module).expect("load");

    assert!(host.is_loaded(module.name()));
    let report = module.take_report().expect("report");
    assert_eq!(report.published().count(), 4);
    assert_eq!(report.skipped, vec![Skip::MissingArchitecture {
        architecture: "aarch64".into(),
    }]);
}

#[test]
fn report_serializes_to_json() {
    let mut host = host(&["arch_armv7"]);
    let report = initialize(&mut host).expect("initialize");
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["built"][0]["platform"], "windows-x86");
    assert_eq!(json["built"][0]["lookups"][0]["status"], "found");
    assert_eq!(json["skipped"][0]["reason"], "missing-architecture");
}

#[test]
fn host_description_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("host.toml");
    let builtin = HostConfig::builtin().without_modules(&["arch_x86"]);
    std::fs::write(&path, builtin.to_toml().unwrap()).unwrap();

    let mut host = HostConfig::load(&path)
        .unwrap()
        .into_context(DuplicatePolicy::Reject)
        .unwrap();
    let report = initialize(&mut host).expect("initialize");
    assert_eq!(
        report.published().collect::<Vec<_>>(),
        vec!["windows-armv7", "windows-thumb2", "windows-aarch64"]
    );
}
