//! Clean the dist directory

use anyhow::Result;
use std::fs;

use crate::Noticeboard;

/// Remove the static bundle
pub fn run(board: &Noticeboard) -> Result<()> {
    if board.dist_dir.exists() {
        fs::remove_dir_all(&board.dist_dir)?;
        tracing::info!("Deleted: {:?}", board.dist_dir);
    }

    Ok(())
}
