//! Reads supported files from a directory tree into [`Document`]s.
//!
//! Parsing is a closed dispatch over the supported extensions; a failure to
//! read or parse any single file is logged and skipped so one corrupt PDF
//! cannot sink a whole build.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::types::Document;

/// The file types the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Text,
    Markdown,
    Pdf,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Some(Self::Text),
            Some(ext) if ext.eq_ignore_ascii_case("md") => Some(Self::Markdown),
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// Load every supported file under `docs_dir`, recursively.
///
/// Per-file failures are warnings, not errors; an empty result is not an
/// error either — the caller decides whether zero documents is fatal.
pub fn load_documents(docs_dir: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for (path, kind) in list_supported_files(docs_dir) {
        match extract_text(&path, kind) {
            Ok(text) if text.trim().is_empty() => {
                warn!(path = %path.display(), "skipping file with no extractable text");
            }
            Ok(text) => {
                debug!(path = %path.display(), chars = text.chars().count(), "loaded document");
                documents.push(Document {
                    source_path: path.to_string_lossy().to_string(),
                    raw_text: text,
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
            }
        }
    }
    Ok(documents)
}

fn extract_text(path: &Path, kind: SourceKind) -> Result<String> {
    match kind {
        SourceKind::Text | SourceKind::Markdown => read_text_lossy(path),
        SourceKind::Pdf => {
            let text = pdf_extract::extract_text(path)?;
            Ok(text)
        }
    }
}

fn read_text_lossy(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
    }
}

/// Supported files under `root` in sorted path order, so builds are
/// deterministic across runs.
fn list_supported_files(root: &Path) -> Vec<(PathBuf, SourceKind)> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if let Some(kind) = SourceKind::from_path(path) {
            files.push((path.to_path_buf(), kind));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}
