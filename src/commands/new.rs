//! Create a new notice

use anyhow::{bail, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::content::{Priority, Status};
use crate::Noticeboard;

/// Front-matter written for a new notice
#[derive(Serialize)]
struct Scaffold<'a> {
    title: &'a str,
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    priority: Priority,
    status: Status,
}

/// Create `<notices_dir>/<slug>.md` and return its path. Existing files are
/// never overwritten.
pub fn create_notice(
    board: &Noticeboard,
    title: &str,
    priority: Priority,
    status: Status,
    author: Option<&str>,
) -> Result<PathBuf> {
    fs::create_dir_all(&board.notices_dir)?;

    let slug = slug::slugify(title);
    let stem: &str = if slug.is_empty() { "notice" } else { &slug };
    let extension = board
        .config
        .extensions
        .first()
        .map(String::as_str)
        .unwrap_or("md");
    let path = board.notices_dir.join(format!("{}.{}", stem, extension));

    if path.exists() {
        bail!("Notice already exists: {:?}", path);
    }

    let scaffold = Scaffold {
        title,
        date: board.now().format("%Y-%m-%d %H:%M:%S").to_string(),
        author,
        priority,
        status,
    };
    let header = serde_yaml::to_string(&scaffold)?;
    fs::write(&path, format!("---\n{}---\n\n", header))?;

    tracing::info!("Created: {:?}", path);
    Ok(path)
}
