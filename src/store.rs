use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::StoreError;
use crate::slide::Slide;

pub trait SlideStore {
    fn list_slides(&self) -> Result<Vec<Slide>, StoreError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SlidesDocument {
    Wrapped { slides: Vec<Slide> },
    Bare(Vec<Slide>),
}

impl SlidesDocument {
    fn into_slides(self) -> Vec<Slide> {
        match self {
            SlidesDocument::Wrapped { slides } | SlidesDocument::Bare(slides) => slides,
        }
    }
}

/// Store backed by a JSON document on disk. The file is re-read on every
/// call so edits show up on the next fetch.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SlideStore for JsonFileStore {
    fn list_slides(&self) -> Result<Vec<Slide>, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let slides = serde_json::from_str::<SlidesDocument>(&raw)
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?
            .into_slides();
        check_unique_ids(&slides)?;
        tracing::debug!(path = %self.path.display(), count = slides.len(), "Read slide document");
        Ok(slides)
    }
}

fn check_unique_ids(slides: &[Slide]) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for slide in slides {
        if !seen.insert(slide.id.as_str()) {
            return Err(StoreError::DuplicateId(slide.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_doc(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_wrapped_document_in_order() {
        let file = write_doc(
            r#"{ "slides": [
                { "id": "b", "title": "Second created" },
                { "id": "a", "title": "Third created" },
                { "id": "c" }
            ] }"#,
        );
        let slides = JsonFileStore::new(file.path()).list_slides().unwrap();
        let ids: Vec<_> = slides.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
        assert_eq!(slides[0].text("title"), Some("Second created"));
    }

    #[test]
    fn reads_bare_array() {
        let file = write_doc(r#"[{ "id": "only" }]"#);
        let slides = JsonFileStore::new(file.path()).list_slides().unwrap();
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn empty_list_is_not_an_error() {
        let file = write_doc(r#"{ "slides": [] }"#);
        let slides = JsonFileStore::new(file.path()).list_slides().unwrap();
        assert!(slides.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert!(matches!(store.list_slides(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let file = write_doc("{ slides: ");
        let store = JsonFileStore::new(file.path());
        assert!(matches!(store.list_slides(), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn slide_without_id_is_parse_error() {
        let file = write_doc(r#"{ "slides": [{ "title": "draft" }] }"#);
        let store = JsonFileStore::new(file.path());
        assert!(matches!(store.list_slides(), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let file = write_doc(r#"[{ "id": "x" }, { "id": "y" }, { "id": "x" }]"#);
        let err = JsonFileStore::new(file.path()).list_slides().unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(ref id) if id == "x"));
    }
}
