//! Notice model and metadata normalization

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::FrontMatter;
use crate::error::{NoticeError, Result};

/// How urgent a notice is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    /// CSS class of the priority badge
    pub fn badge_class(self) -> &'static str {
        match self {
            Priority::High => "priority-badge-high",
            Priority::Normal => "priority-badge-normal",
            Priority::Low => "priority-badge-low",
        }
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            _ => Err(()),
        }
    }
}

/// Progress of the event a notice announces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Scheduled,
    Ongoing,
    #[default]
    Completed,
}

impl Status {
    /// CSS class of the status badge
    pub fn badge_class(self) -> &'static str {
        match self {
            Status::Scheduled => "status-badge-scheduled",
            Status::Ongoing => "status-badge-ongoing",
            Status::Completed => "status-badge-completed",
        }
    }
}

impl FromStr for Status {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Status::Scheduled),
            "ongoing" => Ok(Status::Ongoing),
            "completed" => Ok(Status::Completed),
            _ => Err(()),
        }
    }
}

/// Values used for fields a notice leaves out
#[derive(Debug, Clone)]
pub struct Defaults {
    pub title: String,
    pub author: String,
    /// Date given to notices without one
    pub now: DateTime<FixedOffset>,
    /// Zone in which dates without an offset are read
    pub timezone: Tz,
}

/// Fully populated metadata of a notice, before its body is attached
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeHeader {
    pub filename: String,
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub author: String,
    pub priority: Priority,
    pub status: Status,
}

/// A published announcement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    /// Source file name, unique within the notices directory
    pub filename: String,
    pub title: String,
    pub date: DateTime<FixedOffset>,
    pub author: String,
    pub priority: Priority,
    pub status: Status,
    /// Rendered HTML body
    #[serde(rename = "content")]
    pub rendered_body: String,
    /// Markdown body as written
    #[serde(rename = "rawContent")]
    pub raw_body: String,
}

impl Notice {
    pub fn new(header: NoticeHeader, raw_body: String, rendered_body: String) -> Self {
        Self {
            filename: header.filename,
            title: header.title,
            date: header.date,
            author: header.author,
            priority: header.priority,
            status: header.status,
            rendered_body,
            raw_body,
        }
    }
}

/// Fill in defaults and validate the enumerated fields of a front-matter block
pub fn normalize(filename: &str, fm: &FrontMatter, defaults: &Defaults) -> Result<NoticeHeader> {
    let invalid = |field: &'static str, value: &str| NoticeError::InvalidField {
        filename: filename.to_string(),
        field,
        value: value.to_string(),
    };

    let date = match fm.date.as_deref() {
        Some(s) => parse_date(s, &defaults.timezone).ok_or_else(|| invalid("date", s))?,
        None => defaults.now,
    };

    let priority = match fm.priority.as_deref() {
        Some(s) => s.parse().map_err(|_| invalid("priority", s))?,
        None => Priority::default(),
    };

    let status = match fm.status.as_deref() {
        Some(s) => s.parse().map_err(|_| invalid("status", s))?,
        None => Status::default(),
    };

    Ok(NoticeHeader {
        filename: filename.to_string(),
        title: fm.title.clone().unwrap_or_else(|| defaults.title.clone()),
        date,
        author: fm.author.clone().unwrap_or_else(|| defaults.author.clone()),
        priority,
        status,
    })
}

/// Parse a date string in various formats.
///
/// Values without an offset are read as local time in `tz`.
pub fn parse_date(s: &str, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return localize(naive, tz);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return localize(d.and_hms_opt(0, 0, 0)?, tz);
        }
    }

    None
}

fn localize(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}
