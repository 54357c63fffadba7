use super::*;

#[test]
fn all_has_6_variants() {
    assert_eq!(Platform::all().len(), 6);
}

#[test]
fn canonical_names_round_trip() {
    for &platform in Platform::all() {
        let parsed: Platform = platform.short_name().parse().unwrap();
        assert_eq!(parsed, platform, "round-trip failed for {:?}", platform);
    }
}

#[test]
fn aliases_resolve_correctly() {
    let cases = [
        ("famicom", Platform::Nes),
        ("sfc", Platform::Snes),
        ("ds", Platform::Ds),
        ("n3ds", Platform::N3ds),
        ("nx", Platform::Switch),
        ("game boy advance", Platform::Gba),
    ];
    for (input, expected) in cases {
        let parsed: Platform = input.parse().unwrap();
        assert_eq!(
            parsed, expected,
            "alias '{}' should parse to {:?}",
            input, expected
        );
    }
}

#[test]
fn case_insensitive_parsing() {
    let parsed: Platform = "SNES".parse().unwrap();
    assert_eq!(parsed, Platform::Snes);
    let parsed: Platform = "Switch".parse().unwrap();
    assert_eq!(parsed, Platform::Switch);
}

#[test]
fn unknown_string_returns_err() {
    let result: Result<Platform, _> = "commodore64".parse();
    assert!(result.is_err());
}

#[test]
fn short_name_is_first_alias() {
    for &platform in Platform::all() {
        assert_eq!(platform.short_name(), platform.aliases()[0]);
    }
}

#[test]
fn display_returns_display_name() {
    assert_eq!(Platform::Nes.to_string(), "Nintendo Entertainment System");
    assert_eq!(Platform::N3ds.to_string(), "Nintendo 3DS");
}
