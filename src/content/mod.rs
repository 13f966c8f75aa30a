//! Content module - notice documents and the pipeline that turns them into
//! an ordered collection

mod frontmatter;
pub mod loader;
mod markdown;
mod notice;

pub use frontmatter::{FrontMatter, FrontMatterError};
pub use loader::{MalformedPolicy, NoticeLoader, Source};
pub use markdown::MarkdownRenderer;
pub use notice::{normalize, parse_date, Defaults, Notice, NoticeHeader, Priority, Status};
