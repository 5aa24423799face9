//! Reading sketches and writing renders

use anyhow::{bail, Context, Result};
use netsketch_core::{ImagePayload, MediaType, VariantId, WorkflowState};
use std::path::{Path, PathBuf};

/// Load an image file; the media type follows the extension, PNG otherwise
///
/// # Errors
/// Fails when the file cannot be read.
pub fn read_image(path: &Path) -> Result<ImagePayload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let media_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(MediaType::from_extension)
        .unwrap_or(MediaType::Png);
    Ok(ImagePayload::new(bytes, media_type))
}

/// Load a sketch given as a file path or an inline `data:` URL
///
/// # Errors
/// Fails for malformed data URLs and unreadable files.
pub fn load_sketch(source: &str) -> Result<ImagePayload> {
    if source.starts_with("data:") {
        return ImagePayload::from_data_url(source).context("invalid data URL");
    }
    read_image(Path::new(source))
}

/// Write one image, creating parent directories
///
/// # Errors
/// Fails on any filesystem error.
pub fn write_image(path: &Path, image: &ImagePayload) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, &image.bytes)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Write every ready variant as `<dir>/<id>.<ext>`
///
/// # Errors
/// Fails on the first filesystem error.
pub fn save_variants(state: &WorkflowState, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for variant in state.variants() {
        let Some(image) = &variant.image else {
            continue;
        };
        let path = dir.join(format!("{}.{}", variant.id, image.media_type.extension()));
        write_image(&path, image)?;
        written.push(path);
    }
    Ok(written)
}

/// Write one variant to `path`
///
/// # Errors
/// Fails when the variant has no image or the write fails.
pub fn save_variant(state: &WorkflowState, id: VariantId, path: &Path) -> Result<()> {
    let Some(image) = state.variant(id).and_then(|v| v.image.as_ref()) else {
        bail!("variant {id} has no image");
    };
    write_image(path, image)
}

/// Inline `data:` URL of one variant
///
/// # Errors
/// Fails when the variant has no image.
pub fn variant_data_url(state: &WorkflowState, id: VariantId) -> Result<String> {
    match state.variant(id).and_then(|v| v.image.as_ref()) {
        Some(image) => Ok(image.to_data_url()),
        None => bail!("variant {id} has no image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netsketch_core::StyleCategory;
    use netsketch_test_utils::tagged_payload;
    use pretty_assertions::assert_eq;

    fn state_with_one_ready() -> (WorkflowState, VariantId) {
        let mut state = WorkflowState::new();
        state.set_source(tagged_payload(0));
        let batch = state.begin_generation().unwrap();
        let id = VariantId::new(StyleCategory::Perspective3d, 2);
        state.update_variant(batch, id, Ok(tagged_payload(9))).unwrap();
        state
            .update_variant(
                batch,
                VariantId::new(StyleCategory::Flat2d, 1),
                Err("timeout".to_string()),
            )
            .unwrap();
        state.end_generation(batch).unwrap();
        (state, id)
    }

    #[test]
    fn read_image_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sketch.JPG");
        std::fs::write(&path, b"bytes").unwrap();

        let image = read_image(&path).unwrap();
        assert_eq!(image.media_type, MediaType::Jpeg);
        assert_eq!(image.bytes, b"bytes");
    }

    #[test]
    fn load_sketch_accepts_data_url_and_path() {
        let image = load_sketch("data:image/png;base64,AQID").unwrap();
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert_eq!(image.media_type, MediaType::Png);
        assert!(load_sketch("data:image/png,not-base64").is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sketch.webp");
        std::fs::write(&path, b"webp").unwrap();
        let image = load_sketch(path.to_str().unwrap()).unwrap();
        assert_eq!(image.media_type, MediaType::Webp);
    }

    #[test]
    fn variant_data_url_round_trips() {
        let (state, ready) = state_with_one_ready();
        let url = variant_data_url(&state, ready).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(ImagePayload::from_data_url(&url).unwrap(), tagged_payload(9));

        assert!(variant_data_url(&state, VariantId::new(StyleCategory::Flat2d, 1)).is_err());
    }

    #[test]
    fn read_missing_file_fails() {
        assert!(read_image(Path::new("/nonexistent/sketch.png")).is_err());
    }

    #[test]
    fn saves_only_ready_variants() {
        let (state, _) = state_with_one_ready();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("renders");

        let written = save_variants(&state, &out).unwrap();
        assert_eq!(written, vec![out.join("perspective-3d-2.png")]);
        assert_eq!(std::fs::read(&written[0]).unwrap(), tagged_payload(9).bytes);
    }

    #[test]
    fn save_variant_rejects_missing_image() {
        let (state, ready) = state_with_one_ready();
        let dir = tempfile::tempdir().unwrap();

        save_variant(&state, ready, &dir.path().join("a.png")).unwrap();
        let err = save_variant(
            &state,
            VariantId::new(StyleCategory::Flat2d, 1),
            &dir.path().join("b.png"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("flat-2d-1"));
    }
}
