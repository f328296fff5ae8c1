use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(SceneError::parse("x").to_string().contains("parse error:"));
    assert!(
        SceneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SceneError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(SceneError::render("x").to_string().contains("render error:"));
    assert!(
        SceneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
