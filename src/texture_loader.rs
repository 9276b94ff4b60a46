use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use exif::{In, Reader, Tag, Value};
use raylib::prelude::*;

use crate::slide::Slide;

#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<String, Option<Texture2D>>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(&mut self, rl: &mut RaylibHandle, thread: &RaylibThread, slides: &[Slide]) {
        for reference in slides.iter().flat_map(crate::render::image_refs) {
            if self.textures.contains_key(reference) {
                continue;
            }
            let texture = if is_remote(reference) {
                tracing::debug!(reference, "Skipping remote slide image");
                None
            } else {
                match load_texture_with_exif_rotation(rl, thread, Path::new(reference)) {
                    Ok(texture) => Some(texture),
                    Err(e) => {
                        tracing::warn!(reference, error = %e, "Could not load slide image");
                        None
                    }
                }
            };
            self.textures.insert(reference.to_string(), texture);
        }
        tracing::info!(
            loaded = self.textures.values().filter(|t| t.is_some()).count(),
            "Slide images preloaded"
        );
    }

    pub fn get(&self, reference: &str) -> Option<&Texture2D> {
        self.textures.get(reference).and_then(Option::as_ref)
    }
}

fn is_remote(reference: &str) -> bool {
    ["http://", "https://", "data:"]
        .iter()
        .any(|scheme| reference.starts_with(scheme))
}

fn read_orientation(image_path: &Path, file_bytes: &[u8]) -> u32 {
    match Reader::new().read_from_container(&mut Cursor::new(file_bytes)) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| match &field.value {
                Value::Short(values) => values.first().map(|v| u32::from(*v)),
                _ => None,
            })
            .unwrap_or(1),
        Err(e) => {
            // Non-critical: proceed without rotation
            tracing::debug!(path = %image_path.display(), error = %e, "No EXIF data");
            1
        }
    }
}

// --- Load Image, Apply EXIF Rotation, Create Texture ---
pub fn load_texture_with_exif_rotation(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    image_path: &Path,
) -> Result<Texture2D> {
    let file_bytes = fs::read(image_path)
        .with_context(|| format!("Failed to read file {}", image_path.display()))?;

    let extension = image_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    // EXIF is only read reliably from JPEG
    let orientation = if extension == "jpg" || extension == "jpeg" {
        read_orientation(image_path, &file_bytes)
    } else {
        1
    };

    let mut image = Image::load_image_from_mem(&format!(".{extension}"), &file_bytes)
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {e}", image_path.display()))?;

    // 3 = 180 deg, 6 = 90 deg CW, 8 = 90 deg CCW. Flipped variants are ignored.
    match orientation {
        3 => {
            image.rotate_cw();
            image.rotate_cw();
        }
        6 => image.rotate_cw(),
        8 => image.rotate_ccw(),
        _ => {}
    }
    tracing::trace!(path = %image_path.display(), orientation, "Image decoded");

    let texture = rl
        .load_texture_from_image(thread, &image)
        .map_err(|e| {
            anyhow::anyhow!("Failed to create texture for {}: {e}", image_path.display())
        })?;

    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_references_are_detected() {
        assert!(is_remote("https://cdn.example.com/a.png"));
        assert!(is_remote("http://localhost/a.png"));
        assert!(is_remote("data:image/png;base64,AAAA"));
        assert!(!is_remote("assets/hero.jpg"));
        assert!(!is_remote("/srv/slides/bg.png"));
    }

    #[test]
    fn missing_exif_means_upright() {
        assert_eq!(read_orientation(Path::new("x.jpg"), b"not a jpeg"), 1);
    }
}
