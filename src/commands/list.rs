//! List notices

use anyhow::Result;

use crate::content::NoticeLoader;
use crate::Noticeboard;

/// Print the collection in published order
pub async fn run(board: &Noticeboard) -> Result<()> {
    let loader = NoticeLoader::new(board);
    let notices = loader.load_all(board.now()).await?;
    let locale = board.config.language;

    println!("Notices ({}):", notices.len());
    for notice in notices {
        println!(
            "  {} [{} / {}] {} - {} ({})",
            notice
                .date
                .with_timezone(&board.timezone)
                .format("%Y-%m-%d"),
            locale.priority_label(notice.priority),
            locale.status_label(notice.status),
            notice.title,
            notice.author,
            notice.filename
        );
    }

    Ok(())
}
