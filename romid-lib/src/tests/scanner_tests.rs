use super::*;
use romid_dat::TableProvider;
use std::fs;
use std::sync::Arc;

fn registry() -> PluginRegistry {
    PluginRegistry::with_defaults(Arc::new(TableProvider::empty()))
}

#[test]
fn test_candidate_extensions() {
    let registry = registry();
    let nes = candidate_extensions(&registry, Some(Platform::Nes));
    assert!(nes.contains("nes"));
    assert!(nes.contains("zip"));
    assert!(!nes.contains("gba"));

    let all = candidate_extensions(&registry, None);
    assert!(all.contains("gba"));
    assert!(all.contains("nsp"));
}

#[test]
fn test_scan_recurses_and_filters() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("nes/hacks")).unwrap();
    fs::create_dir_all(root.join(".cache")).unwrap();
    fs::write(root.join("nes/B.NES"), b"x").unwrap();
    fs::write(root.join("nes/a.nes"), b"x").unwrap();
    fs::write(root.join("nes/hacks/c.zip"), b"x").unwrap();
    fs::write(root.join("nes/readme.txt"), b"x").unwrap();
    fs::write(root.join(".cache/d.nes"), b"x").unwrap();

    let extensions = candidate_extensions(&registry(), Some(Platform::Nes));
    let found = scan_candidates(root, &extensions).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["nes/B.NES", "nes/a.nes", "nes/hacks/c.zip"]);
}

#[test]
fn test_missing_root_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let extensions = candidate_extensions(&registry(), None);
    assert!(scan_candidates(&dir.path().join("missing"), &extensions).is_err());
}
