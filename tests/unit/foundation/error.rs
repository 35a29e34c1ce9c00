use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ScrollError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ScrollError::asset("x").to_string().contains("asset error:"));
    assert!(
        ScrollError::playback("x")
            .to_string()
            .contains("playback error:")
    );
    assert!(ScrollError::export("x").to_string().contains("export error:"));
    assert!(
        ScrollError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ScrollError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
