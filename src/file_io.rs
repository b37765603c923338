use std::fs;
use std::path::{Path, PathBuf};

use abdraw_core::{Document, from_json, to_json};
use anyhow::{Context, Result};
use tracing::info;

/// Extension of persisted documents
pub const FILE_EXTENSION: &str = "abdraw";

/// Load and validate a `.abdraw` document
pub fn load_document(path: &Path) -> Result<Document> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = from_json(&content)
        .with_context(|| format!("Invalid abDraw document {}", path.display()))?;
    info!(path = %path.display(), shapes = doc.len(), "document loaded");
    Ok(doc)
}

/// Save a document as JSON
pub fn save_document(doc: &Document, path: &Path) -> Result<()> {
    let content = to_json(doc).context("Failed to serialize document")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), shapes = doc.len(), "document saved");
    Ok(())
}

/// Save to `output` (given the `.abdraw` extension when it has none), or
/// print to stdout
pub fn write_document(doc: &Document, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => save_document(doc, &document_path(path)),
        None => {
            let content = to_json(doc).context("Failed to serialize document")?;
            println!("{content}");
            Ok(())
        }
    }
}

/// Add the document extension to paths without one
pub fn document_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(FILE_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abdraw_core::{Shape, ShapeKind, Style};
    use abdraw_geometry::Point;
    use tempfile::TempDir;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.insert(Shape::new(
            ShapeKind::Ellipse {
                start: Point::new(0.0, 0.0),
                end: Point::new(80.0, 40.0),
            },
            Style::default(),
        ))
        .unwrap();
        doc
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diagram.abdraw");
        let doc = sample();
        save_document(&doc, &path).unwrap();
        assert_eq!(load_document(&path).unwrap(), doc);
    }

    #[test]
    fn test_write_adds_extension() {
        let dir = TempDir::new().unwrap();
        let bare = dir.path().join("diagram");
        write_document(&sample(), Some(&bare)).unwrap();
        assert!(dir.path().join("diagram.abdraw").exists());
    }

    #[test]
    fn test_load_reports_path_and_cause() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.abdraw");
        fs::write(&path, r#"{"shapes":[{"type":"hexagon"}]}"#).unwrap();
        let err = load_document(&path).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("broken.abdraw"));
        assert!(chain.contains("malformed document"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_document(&dir.path().join("nope.abdraw")).unwrap_err();
        assert!(format!("{err}").starts_with("Failed to read"));
    }
}
