//! Internationalization (i18n) support
//!
//! Every user-facing string the board renders comes from a [`Locale`]. The
//! set of languages is closed, so each lookup is an exhaustive `match`.

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

use crate::content::{Priority, Status};

/// Display language of the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ko,
    En,
}

impl Locale {
    /// Value of the `<html lang>` attribute
    pub fn html_lang(self) -> &'static str {
        match self {
            Locale::Ko => "ko",
            Locale::En => "en",
        }
    }

    /// Heading of the notice page
    pub fn page_title(self) -> &'static str {
        match self {
            Locale::Ko => "공지사항",
            Locale::En => "Notices",
        }
    }

    /// Title used for notices without one
    pub fn untitled(self) -> &'static str {
        match self {
            Locale::Ko => "제목 없음",
            Locale::En => "Untitled",
        }
    }

    /// Author used for notices without one
    pub fn administrator(self) -> &'static str {
        match self {
            Locale::Ko => "관리자",
            Locale::En => "Administrator",
        }
    }

    /// Placeholder shown when there are no notices
    pub fn no_notices(self) -> &'static str {
        match self {
            Locale::Ko => "등록된 공지사항이 없습니다.",
            Locale::En => "No notices have been posted.",
        }
    }

    pub fn list_failed(self) -> &'static str {
        match self {
            Locale::Ko => "공지사항을 불러오는데 실패했습니다.",
            Locale::En => "Failed to load notices.",
        }
    }

    pub fn not_found(self) -> &'static str {
        match self {
            Locale::Ko => "공지사항을 찾을 수 없습니다.",
            Locale::En => "Notice not found.",
        }
    }

    pub fn page_failed(self) -> &'static str {
        match self {
            Locale::Ko => "페이지를 불러오는데 실패했습니다.",
            Locale::En => "Failed to load the page.",
        }
    }

    /// Badge label for a priority
    pub fn priority_label(self, priority: Priority) -> &'static str {
        match (self, priority) {
            (Locale::Ko, Priority::High) => "중요",
            (Locale::Ko, Priority::Normal) => "일반",
            (Locale::Ko, Priority::Low) => "참고",
            (Locale::En, Priority::High) => "Important",
            (Locale::En, Priority::Normal) => "General",
            (Locale::En, Priority::Low) => "For reference",
        }
    }

    /// Badge label for a status
    pub fn status_label(self, status: Status) -> &'static str {
        match (self, status) {
            (Locale::Ko, Status::Scheduled) => "예정",
            (Locale::Ko, Status::Ongoing) => "진행 중",
            (Locale::Ko, Status::Completed) => "완료",
            (Locale::En, Status::Scheduled) => "Scheduled",
            (Locale::En, Status::Ongoing) => "In progress",
            (Locale::En, Status::Completed) => "Completed",
        }
    }

    /// Long calendar date, e.g. "2024년 1월 15일" or "January 15, 2024"
    pub fn format_date<Tz: TimeZone>(self, date: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match self {
            Locale::Ko => format!("{}년 {}월 {}일", date.year(), date.month(), date.day()),
            Locale::En => date.format("%B %-d, %Y").to_string(),
        }
    }
}
