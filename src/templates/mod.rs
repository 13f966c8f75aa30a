//! Page and feed rendering
//!
//! The page is a Tera template with autoescaping. The built-in template is
//! embedded in the binary; a board may point `template` at its own.

use anyhow::{Context as _, Result};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tera::{Context, Tera};

use crate::content::{Notice, Priority, Status};
use crate::i18n::Locale;
use crate::Noticeboard;

/// Name the page template is registered under. The `.html` suffix turns on
/// Tera's autoescaping.
const PAGE_TEMPLATE: &str = "notice.html";

lazy_static! {
    /// End of a script block directly followed by the end of the body
    static ref SCRIPT_BEFORE_BODY_END: Regex = Regex::new(r"</script>\s*</body>").unwrap();
}

/// Where a rendered page is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Served by the live server; client-side refresh is kept
    Server,
    /// Written to disk; the page carries no scripts
    Static,
}

/// Renders notice collections as a page or a JSON feed
pub struct PageRenderer {
    tera: Tera,
    locale: Locale,
    timezone: Tz,
    title: String,
    stylesheet: String,
}

impl PageRenderer {
    /// Create a renderer with the board's template
    pub fn new(board: &Noticeboard) -> Result<Self> {
        let mut tera = Tera::default();

        match board.template_path() {
            Some(path) => {
                tera.add_template_file(&path, Some(PAGE_TEMPLATE))
                    .with_context(|| format!("Failed to load template {:?}", path))?;
                tracing::debug!("Using page template {:?}", path);
            }
            None => tera.add_raw_template(PAGE_TEMPLATE, include_str!("notice.html"))?,
        }

        Ok(Self {
            tera,
            locale: board.config.language,
            timezone: board.timezone,
            title: board.config.page_title().to_string(),
            stylesheet: board.config.stylesheet.clone(),
        })
    }

    /// Render the full HTML page for an ordered collection
    pub fn render_page(&self, notices: &[Notice], target: Target) -> Result<String> {
        let cards: Vec<NoticeCard> = notices.iter().map(|n| self.card(n)).collect();

        let mut context = Context::new();
        context.insert("lang", self.locale.html_lang());
        context.insert("title", &self.title);
        context.insert("stylesheet", &self.stylesheet);
        context.insert("empty_message", self.locale.no_notices());
        context.insert("notices", &cards);
        context.insert("interactive", &(target == Target::Server));

        let html = self.tera.render(PAGE_TEMPLATE, &context)?;

        Ok(match target {
            Target::Server => html,
            Target::Static => strip_trailing_script(&html),
        })
    }

    fn card<'a>(&self, notice: &'a Notice) -> NoticeCard<'a> {
        NoticeCard {
            filename: &notice.filename,
            title: &notice.title,
            author: &notice.author,
            date: self
                .locale
                .format_date(&notice.date.with_timezone(&self.timezone)),
            datetime: notice.date.to_rfc3339(),
            priority: notice.priority,
            priority_label: self.locale.priority_label(notice.priority),
            priority_class: notice.priority.badge_class(),
            status: notice.status,
            status_label: self.locale.status_label(notice.status),
            status_class: notice.status.badge_class(),
            content: &notice.rendered_body,
        }
    }
}

/// Render the machine-readable feed: every notice without its raw markdown
pub fn render_feed(notices: &[Notice]) -> Result<String> {
    let entries: Vec<FeedEntry> = notices.iter().map(FeedEntry::from).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Remove the script block that closes the body, if any. Scripts elsewhere
/// in the document are left alone.
fn strip_trailing_script(html: &str) -> String {
    let Some(end) = SCRIPT_BEFORE_BODY_END.find_iter(html).last() else {
        return html.to_string();
    };
    let Some(start) = html[..end.start()].rfind("<script") else {
        return html.to_string();
    };

    let mut stripped = String::with_capacity(html.len());
    stripped.push_str(&html[..start]);
    stripped.push_str("</body>");
    stripped.push_str(&html[end.end()..]);
    stripped
}

/// Per-notice values exposed to the page template
#[derive(Debug, Serialize)]
struct NoticeCard<'a> {
    filename: &'a str,
    title: &'a str,
    author: &'a str,
    /// Localized display date
    date: String,
    datetime: String,
    priority: Priority,
    priority_label: &'static str,
    priority_class: &'static str,
    status: Status,
    status_label: &'static str,
    status_class: &'static str,
    content: &'a str,
}

/// One record of `notices.json`
#[derive(Debug, Serialize)]
struct FeedEntry<'a> {
    filename: &'a str,
    title: &'a str,
    date: &'a chrono::DateTime<chrono::FixedOffset>,
    author: &'a str,
    priority: Priority,
    status: Status,
    content: &'a str,
}

impl<'a> From<&'a Notice> for FeedEntry<'a> {
    fn from(notice: &'a Notice) -> Self {
        Self {
            filename: &notice.filename,
            title: &notice.title,
            date: &notice.date,
            author: &notice.author,
            priority: notice.priority,
            status: notice.status,
            content: &notice.rendered_body,
        }
    }
}
