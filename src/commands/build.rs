//! Build the static bundle

use anyhow::Result;
use notify_debouncer_mini::notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::content::NoticeLoader;
use crate::templates::{self, PageRenderer, Target};
use crate::Noticeboard;

/// Page written by the build
pub const INDEX_FILE: &str = "index.html";
/// Feed written by the build
pub const FEED_FILE: &str = "notices.json";

/// Outcome of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub notices: usize,
    pub dist_dir: PathBuf,
    pub stylesheet_copied: bool,
}

/// Build `index.html`, `notices.json` and the stylesheet into the dist
/// directory. Any failure aborts the build.
pub async fn run(board: &Noticeboard) -> Result<BuildReport> {
    let start = Instant::now();

    let loader = NoticeLoader::new(board);
    let renderer = PageRenderer::new(board)?;

    let notices = loader.load_all(board.now()).await?;
    tracing::info!("Found {} notices", notices.len());

    let html = renderer.render_page(&notices, Target::Static)?;
    let feed = templates::render_feed(&notices)?;

    fs::create_dir_all(&board.dist_dir)?;

    let index_path = board.dist_dir.join(INDEX_FILE);
    fs::write(&index_path, html)?;
    tracing::info!("Generated {:?}", index_path);

    let stylesheet_copied = copy_stylesheet(board);

    let feed_path = board.dist_dir.join(FEED_FILE);
    fs::write(&feed_path, feed)?;
    tracing::info!("Generated {:?}", feed_path);

    let duration = start.elapsed();
    tracing::info!("Built in {:.2}s", duration.as_secs_f64());

    Ok(BuildReport {
        notices: notices.len(),
        dist_dir: board.dist_dir.clone(),
        stylesheet_copied,
    })
}

/// Copy the stylesheet next to the page. A missing stylesheet only warns.
fn copy_stylesheet(board: &Noticeboard) -> bool {
    let source = board.public_dir.join(&board.config.stylesheet);
    let target = board.dist_dir.join(&board.config.stylesheet);

    if let Some(parent) = target.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!("Failed to create {:?}: {}", parent, e);
            return false;
        }
    }

    match fs::copy(&source, &target) {
        Ok(_) => {
            tracing::info!("Copied {:?}", target);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to copy stylesheet {:?}: {}", source, e);
            false
        }
    }
}

/// Watch notices, template, stylesheet and config; rebuild fully on change
pub async fn watch(board: &Noticeboard) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    // Debounce to avoid rebuilding once per saved file
    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |result: DebounceEventResult| {
            let _ = tx.send(result);
        },
    )?;

    let mut watched = vec![
        (board.notices_dir.clone(), RecursiveMode::NonRecursive),
        (board.public_dir.clone(), RecursiveMode::Recursive),
        (board.base_dir.join("_config.yml"), RecursiveMode::NonRecursive),
    ];
    if let Some(template) = board.template_path() {
        watched.push((template, RecursiveMode::NonRecursive));
    }

    for (path, mode) in watched {
        if path.exists() {
            debouncer.watcher().watch(&path, mode)?;
            tracing::debug!("Watching: {:?}", path);
        }
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while let Some(result) = rx.recv().await {
        match result {
            Ok(events) => {
                for event in &events {
                    tracing::info!("File changed: {}", event.path.display());
                }

                // Reload so config and template edits take effect
                let rebuilt = match Noticeboard::new(&board.base_dir) {
                    Ok(board) => run(&board).await,
                    Err(e) => Err(e),
                };
                match rebuilt {
                    Ok(report) => tracing::info!("Rebuilt {} notices", report.notices),
                    Err(e) => tracing::error!("Build failed: {:#}", e),
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}
