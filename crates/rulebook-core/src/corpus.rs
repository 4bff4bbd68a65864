use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::ChapterEntry;
use crate::error::{Error, Result};
use crate::types::ChapterDocument;

/// Reads rulebook chapter JSON files from a directory.
pub struct CorpusLoader {
    dir: PathBuf,
}

impl CorpusLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load the chapters named by `entries`, in manifest order.
    ///
    /// A chapter that cannot be read or parsed is skipped; the rest still load.
    pub fn load_manifest(&self, entries: &[ChapterEntry]) -> Result<Vec<ChapterDocument>> {
        self.ensure_dir()?;
        let mut chapters = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.load_chapter(&self.dir.join(&entry.file), &entry.file) {
                Ok(mut chapter) => {
                    if chapter.title.is_empty() {
                        chapter.title = entry.title.clone();
                    }
                    chapters.push(chapter);
                }
                Err(e) => warn!(chapter = %entry.id, error = %e, "skipping chapter"),
            }
        }
        debug!(loaded = chapters.len(), listed = entries.len(), "manifest corpus loaded");
        Ok(chapters)
    }

    /// Load every `*.json` file under the directory, sorted by path.
    pub fn load_dir(&self) -> Result<Vec<ChapterDocument>> {
        self.ensure_dir()?;
        let mut chapters = Vec::new();
        for path in self.list_json_files() {
            let source = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            match self.load_chapter(&path, &source) {
                Ok(chapter) => chapters.push(chapter),
                Err(e) => warn!(error = %e, "skipping chapter"),
            }
        }
        debug!(loaded = chapters.len(), dir = %self.dir.display(), "directory corpus loaded");
        Ok(chapters)
    }

    /// Parse one chapter file, stamping `source` as its chapter id.
    pub fn load_chapter(&self, path: &Path, source: &str) -> Result<ChapterDocument> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Chapter { path: path.to_path_buf(), reason: e.to_string() })?;
        let mut chapter: ChapterDocument = serde_json::from_str(&raw)
            .map_err(|e| Error::Chapter { path: path.to_path_buf(), reason: e.to_string() })?;
        chapter.source = source.to_string();
        Ok(chapter)
    }

    fn ensure_dir(&self) -> Result<()> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(Error::NotFound(format!("chapter directory {}", self.dir.display())))
        }
    }

    fn list_json_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&self.dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }
}
