//! Document discovery on disk.

use crate::error::{CliError, Result};
use sifter_domain::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Reads every matching file below a root directory as a document.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    /// Create a source over `root` accepting the given extensions
    /// (case-insensitive, leading dot optional).
    pub fn new(root: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Load all documents, sorted by path.
    ///
    /// Document ids are paths relative to the root. Symlinks are not
    /// followed. PDFs whose text cannot be extracted and files that are
    /// empty after trimming are skipped.
    pub fn load(&self) -> Result<Vec<Document>> {
        if !self.root.is_dir() {
            return Err(CliError::Source(format!(
                "Input directory not found: {}",
                self.root.display()
            )));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.accepts(path))
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = fs::read(&path)
                .map_err(|e| CliError::Source(format!("Failed to read {}: {}", path.display(), e)))?;
            let id = self.document_id(&path);

            let text = if is_pdf(&path) {
                match pdf_extract::extract_text_from_mem(&bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Skipping '{}': PDF text extraction failed: {}", id, e);
                        continue;
                    }
                }
            } else {
                decode_text(bytes, &id)
            };
            if text.trim().is_empty() {
                warn!("Skipping empty file '{}'", id);
                continue;
            }

            debug!("Loaded '{}' ({} chars)", id, text.chars().count());
            documents.push(Document::new(id, text));
        }

        info!("Found {} documents in {}", documents.len(), self.root.display());
        Ok(documents)
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    fn document_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Decode file contents as UTF-8, falling back to Latin-1.
fn decode_text(bytes: Vec<u8>, id: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("'{}' is not valid UTF-8; decoding as Latin-1", id);
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(documents: &[Document]) -> Vec<&str> {
        documents.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_load_sorted_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), "second").unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        fs::write(dir.path().join("sub").join("c.TXT"), "third").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let source = DirectorySource::new(dir.path(), &["txt".to_string()]);
        let documents = source.load().unwrap();

        assert_eq!(ids(&documents), ["a.txt", "b.txt", "sub/c.TXT"]);
        assert_eq!(documents[0].text, "first");
    }

    #[test]
    fn test_empty_files_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blank.txt"), "  \n\t ").unwrap();
        fs::write(dir.path().join("full.txt"), "content").unwrap();

        let documents = DirectorySource::new(dir.path(), &["txt".to_string()]).load().unwrap();
        assert_eq!(ids(&documents), ["full.txt"]);
    }

    #[test]
    fn test_latin1_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.txt"), [b'c', b'a', b'f', 0xE9]).unwrap();

        let documents = DirectorySource::new(dir.path(), &[".txt".to_string()]).load().unwrap();
        assert_eq!(documents[0].text, "café");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "only once").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub").join("loop")).unwrap();

        let documents = DirectorySource::new(dir.path(), &["txt".to_string()]).load().unwrap();
        assert_eq!(ids(&documents), ["a.txt"]);
    }

    #[test]
    fn test_unreadable_pdf_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not really a pdf").unwrap();
        fs::write(dir.path().join("paper.txt"), "plain text").unwrap();

        let extensions = ["txt".to_string(), "PDF".to_string()];
        let documents = DirectorySource::new(dir.path(), &extensions).load().unwrap();
        assert_eq!(ids(&documents), ["paper.txt"]);
    }

    #[test]
    fn test_pdf_extension_detection() {
        assert!(is_pdf(Path::new("dir/Paper.PDF")));
        assert!(!is_pdf(Path::new("dir/paper.txt")));
        assert!(!is_pdf(Path::new("dir/pdf")));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("absent"), &["txt".to_string()]);
        assert!(matches!(source.load(), Err(CliError::Source(_))));
    }
}
