use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ShowError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ShowError::asset_load("x")
            .to_string()
            .contains("asset load error:")
    );
    assert!(
        ShowError::playback("x")
            .to_string()
            .contains("playback error:")
    );
    assert!(ShowError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn catalog_errors_name_kind_and_folder() {
    let err = ShowError::CatalogEmpty {
        kind: MediaKind::Image,
        dir: PathBuf::from("photos"),
    };
    let msg = err.to_string();
    assert!(msg.contains("image"));
    assert!(msg.contains("photos"));
    assert!(err.is_catalog());
    assert!(!ShowError::playback("x").is_catalog());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ShowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
