//! Content loader - reads notices from the notices directory and assembles
//! them into the published collection

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::{normalize, Defaults, FrontMatter, MarkdownRenderer, Notice};
use crate::error::{NoticeError, Result};
use crate::Noticeboard;

/// What to do with a document whose metadata cannot be used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the whole collection
    #[default]
    Abort,
    /// Log a warning and leave the document out
    Skip,
}

/// Raw content of one notice file
#[derive(Debug, Clone)]
pub struct Source {
    pub filename: String,
    pub content: String,
}

impl Source {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Per-document work shared by every loader task
struct Pipeline {
    renderer: MarkdownRenderer,
    title: String,
    author: String,
    timezone: Tz,
}

impl Pipeline {
    /// Parse, normalize and render a single document
    fn process(&self, source: &Source, now: DateTime<FixedOffset>) -> Result<Notice> {
        let (fm, body) =
            FrontMatter::parse(&source.content).map_err(|e| NoticeError::MalformedFrontMatter {
                filename: source.filename.clone(),
                source: e,
            })?;

        let defaults = Defaults {
            title: self.title.clone(),
            author: self.author.clone(),
            now,
            timezone: self.timezone,
        };
        let header = normalize(&source.filename, &fm, &defaults)?;
        let rendered = self.renderer.render(body);

        Ok(Notice::new(header, body.to_string(), rendered))
    }

    fn load_file(
        &self,
        filename: String,
        path: &Path,
        now: DateTime<FixedOffset>,
    ) -> Result<Notice> {
        let content = fs::read_to_string(path).map_err(|e| NoticeError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.process(&Source { filename, content }, now)
    }
}

/// Loads notices from the notices directory
#[derive(Clone)]
pub struct NoticeLoader {
    dir: PathBuf,
    extensions: Vec<String>,
    policy: MalformedPolicy,
    pipeline: Arc<Pipeline>,
}

impl NoticeLoader {
    /// Create a loader for the board's notices directory
    pub fn new(board: &Noticeboard) -> Self {
        let config = &board.config;
        let locale = config.language;

        let pipeline = Pipeline {
            renderer: MarkdownRenderer::with_options(&config.highlight),
            title: config
                .default_title
                .clone()
                .unwrap_or_else(|| locale.untitled().to_string()),
            author: config
                .default_author
                .clone()
                .unwrap_or_else(|| locale.administrator().to_string()),
            timezone: board.timezone,
        };

        Self {
            dir: board.notices_dir.clone(),
            extensions: config.extensions.clone(),
            policy: config.on_malformed,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Directory the notices are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Turn one raw document into a notice
    pub fn process(&self, source: &Source, now: DateTime<FixedOffset>) -> Result<Notice> {
        self.pipeline.process(source, now)
    }

    /// Process every source and order the result newest-first
    pub fn assemble(&self, sources: &[Source], now: DateTime<FixedOffset>) -> Result<Vec<Notice>> {
        let results = sources
            .iter()
            .map(|source| (source.filename.clone(), self.process(source, now)))
            .collect();
        self.collect(results)
    }

    /// Load all notices, newest first.
    ///
    /// Files are read and rendered concurrently and joined back in filename
    /// order before sorting.
    pub async fn load_all(&self, now: DateTime<FixedOffset>) -> Result<Vec<Notice>> {
        let files = self.list_files()?;

        let handles: Vec<_> = files
            .into_iter()
            .map(|(filename, path)| {
                let pipeline = Arc::clone(&self.pipeline);
                let name = filename.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    pipeline.load_file(filename, &path, now)
                });
                (name, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (filename, handle) in handles {
            results.push((filename, handle.await?));
        }

        let notices = self.collect(results)?;
        tracing::debug!("Loaded {} notices from {:?}", notices.len(), self.dir);
        Ok(notices)
    }

    /// Load a single notice by its file name
    pub async fn load_one(&self, filename: &str, now: DateTime<FixedOffset>) -> Result<Notice> {
        if !self.is_identifier(filename) {
            return Err(NoticeError::NotFound(filename.to_string()));
        }

        let path = self.dir.join(filename);
        if !path.is_file() {
            return Err(NoticeError::NotFound(filename.to_string()));
        }

        let pipeline = Arc::clone(&self.pipeline);
        let name = filename.to_string();
        let result =
            tokio::task::spawn_blocking(move || pipeline.load_file(name, &path, now)).await?;

        match result {
            Err(NoticeError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Err(NoticeError::NotFound(filename.to_string()))
            }
            other => other,
        }
    }

    /// Apply the malformed-document policy and sort newest-first.
    ///
    /// `results` must be in enumeration order; the sort is stable so notices
    /// sharing a date keep that order.
    fn collect(&self, results: Vec<(String, Result<Notice>)>) -> Result<Vec<Notice>> {
        let mut notices = Vec::with_capacity(results.len());

        for (filename, result) in results {
            match result {
                Ok(notice) => notices.push(notice),
                Err(e) if e.is_document_fault() && self.policy == MalformedPolicy::Skip => {
                    tracing::warn!("Skipping notice {}: {}", filename, e);
                }
                Err(e) => return Err(e),
            }
        }

        notices.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(notices)
    }

    /// Notice files in the directory, sorted by file name
    fn list_files(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| NoticeError::Read {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.dir.clone()),
                source: e.into(),
            })?;

            let path = entry.path();
            if path.is_file() && self.is_notice_file(path) {
                let filename = entry.file_name().to_string_lossy().into_owned();
                files.push((filename, path.to_path_buf()));
            }
        }

        Ok(files)
    }

    fn is_notice_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|ext| ext == e))
            .unwrap_or(false)
    }

    /// A bare file name with a notice extension; anything else cannot name a
    /// notice. Accepts exactly the names `list_files` can return.
    fn is_identifier(&self, filename: &str) -> bool {
        !filename.is_empty()
            && filename != ".."
            && !filename.contains(['/', '\\'])
            && self.is_notice_file(Path::new(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn board() -> (TempDir, Noticeboard) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("notices")).unwrap();
        let board = Noticeboard::new(dir.path()).unwrap();
        (dir, board)
    }

    fn write(board: &Noticeboard, name: &str, content: &str) {
        fs::write(board.notices_dir.join(name), content).unwrap();
    }

    fn now(board: &Noticeboard) -> DateTime<FixedOffset> {
        crate::content::parse_date("2030-01-01", &board.timezone).unwrap()
    }

    #[test]
    fn test_assemble_orders_newest_first() {
        let (_dir, board) = board();
        let loader = NoticeLoader::new(&board);
        let sources = [
            Source::new("a.md", "---\ndate: 2024-01-01\n---\nOld notice\n"),
            Source::new("b.md", "---\ntitle: Maintenance\ndate: 2024-06-01\n---\nNew\n"),
        ];

        let notices = loader.assemble(&sources, now(&board)).unwrap();
        let names: Vec<_> = notices.iter().map(|n| n.filename.as_str()).collect();
        assert_eq!(names, ["b.md", "a.md"]);
        assert_eq!(notices[0].title, "Maintenance");
        assert_eq!(notices[1].title, "제목 없음");
    }

    #[test]
    fn test_assemble_is_stable_for_equal_dates() {
        let (_dir, board) = board();
        let loader = NoticeLoader::new(&board);
        let sources = [
            Source::new("z.md", "---\ndate: 2024-03-01\n---\n"),
            Source::new("m.md", "---\ndate: 2024-05-01\n---\n"),
            Source::new("a.md", "---\ndate: 2024-03-01\n---\n"),
            Source::new("k.md", "---\ndate: 2024-03-01\n---\n"),
        ];

        let notices = loader.assemble(&sources, now(&board)).unwrap();
        let names: Vec<_> = notices.iter().map(|n| n.filename.as_str()).collect();
        assert_eq!(names, ["m.md", "z.md", "a.md", "k.md"]);
        assert!(notices.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_missing_date_uses_injected_now() {
        let (_dir, board) = board();
        let loader = NoticeLoader::new(&board);
        let sources = [
            Source::new("dated.md", "---\ndate: 2029-12-31\n---\n"),
            Source::new("undated.md", "no header at all"),
        ];

        let notices = loader.assemble(&sources, now(&board)).unwrap();
        assert_eq!(notices[0].filename, "undated.md");
        assert_eq!(notices[0].date, now(&board));
        assert_eq!(notices[0].raw_body, "no header at all");
    }

    #[test]
    fn test_rendered_body_matches_renderer() {
        let (_dir, board) = board();
        let loader = NoticeLoader::new(&board);
        let source = Source::new("r.md", "---\ntitle: R\n---\n# Heading\n\n- item\n");

        let notice = loader.process(&source, now(&board)).unwrap();
        let renderer = MarkdownRenderer::with_options(&board.config.highlight);
        assert_eq!(notice.rendered_body, renderer.render(&notice.raw_body));
    }

    #[test]
    fn test_malformed_aborts_by_default() {
        let (_dir, board) = board();
        let loader = NoticeLoader::new(&board);
        let sources = [
            Source::new("ok.md", "---\ntitle: Fine\n---\n"),
            Source::new("bad.md", "---\ntitle: Broken\nbody without end\n"),
        ];

        let err = loader.assemble(&sources, now(&board)).unwrap_err();
        assert!(matches!(
            err,
            NoticeError::MalformedFrontMatter { ref filename, .. } if filename == "bad.md"
        ));
    }

    #[test]
    fn test_malformed_skipped_when_configured() {
        let (_dir, mut board) = board();
        board.config.on_malformed = MalformedPolicy::Skip;
        let loader = NoticeLoader::new(&board);
        let sources = [
            Source::new("ok.md", "---\ntitle: Fine\n---\n"),
            Source::new("bad.md", "---\ntitle: Broken\nbody without end\n"),
            Source::new("typo.md", "---\npriority: urgent\n---\n"),
        ];

        let notices = loader.assemble(&sources, now(&board)).unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].filename, "ok.md");
    }

    #[tokio::test]
    async fn test_load_all_reads_directory() {
        let (_dir, board) = board();
        write(&board, "a.md", "---\ndate: 2024-01-01\n---\nA\n");
        write(&board, "b.md", "---\ntitle: Maintenance\ndate: 2024-06-01\n---\nB\n");
        write(&board, "notes.txt", "not a notice");
        fs::create_dir_all(board.notices_dir.join("nested")).unwrap();
        write(&board, "nested/c.md", "---\ndate: 2025-01-01\n---\n");

        let loader = NoticeLoader::new(&board);
        let notices = loader.load_all(now(&board)).await.unwrap();
        let names: Vec<_> = notices.iter().map(|n| n.filename.as_str()).collect();
        assert_eq!(names, ["b.md", "a.md"]);
    }

    #[tokio::test]
    async fn test_load_all_empty_directory() {
        let (_dir, board) = board();
        let loader = NoticeLoader::new(&board);
        assert!(loader.load_all(now(&board)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_all_missing_directory_is_read_error() {
        let (_dir, board) = board();
        fs::remove_dir_all(&board.notices_dir).unwrap();
        let loader = NoticeLoader::new(&board);
        let err = loader.load_all(now(&board)).await.unwrap_err();
        assert!(matches!(err, NoticeError::Read { .. }));
    }

    #[tokio::test]
    async fn test_listed_names_load_individually() {
        let (_dir, board) = board();
        write(&board, ".draft.md", "---\ntitle: Draft\ndate: 2024-02-01\n---\n");
        write(&board, "plain.md", "---\ndate: 2024-01-01\n---\n");
        let loader = NoticeLoader::new(&board);

        let notices = loader.load_all(now(&board)).await.unwrap();
        assert_eq!(notices.len(), 2);
        for listed in &notices {
            let notice = loader.load_one(&listed.filename, now(&board)).await.unwrap();
            assert_eq!(notice.title, listed.title);
        }
    }

    #[tokio::test]
    async fn test_load_one() {
        let (_dir, board) = board();
        write(&board, "hello.md", "---\ntitle: Hello\n---\nHi\n");
        let loader = NoticeLoader::new(&board);

        let notice = loader.load_one("hello.md", now(&board)).await.unwrap();
        assert_eq!(notice.title, "Hello");

        for missing in ["nope.md", "../hello.md", "..", "hello.txt", ".hidden.md", ""] {
            let err = loader.load_one(missing, now(&board)).await.unwrap_err();
            assert!(matches!(err, NoticeError::NotFound(_)), "{}", missing);
        }
    }
}
