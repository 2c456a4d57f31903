use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout accepted by the Google Calendar import API (timezone-naive).
pub const GOOGLE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Length of an event whose listing carries no end time.
pub const DEFAULT_EVENT_MINUTES: i64 = 30;

/// Export projection: (institute, title, start, end, body, location, link).
pub type ExportRow = (String, String, String, String, String, String, String);

/// A validated calendar entry. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub institute: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub body: Option<String>,
    pub location: String,
    pub link: Option<String>,
}

impl Event {
    /// `end` falls back to `start + 30min` only when it is `None`.
    pub fn new(
        institute: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        body: Option<String>,
        location: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            institute: institute.into(),
            title: title.into(),
            start,
            end: end.unwrap_or_else(|| start + Duration::minutes(DEFAULT_EVENT_MINUTES)),
            body,
            location: location.into(),
            link,
        }
    }

    pub fn to_tuple(&self) -> ExportRow {
        (
            self.institute.clone(),
            self.title.clone(),
            to_google_format(Some(self.start)),
            to_google_format(Some(self.end)),
            self.body.clone().unwrap_or_default(),
            self.location.clone(),
            self.link.clone().unwrap_or_default(),
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "title: {}", self.title)?;
        writeln!(f, "start_date: {}", self.start)?;
        writeln!(f, "location: {}", self.location)
    }
}

/// Formats a timestamp for the calendar API; a missing value renders as "".
pub fn to_google_format(date_time: Option<NaiveDateTime>) -> String {
    date_time
        .map(|dt| dt.format(GOOGLE_DATETIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Stable sort by start time, so equal starts keep discovery order.
pub fn sort_by_start(events: &mut [Event]) {
    events.sort_by_key(|event| event.start);
}

/// Raw time sub-fields of one listing, exactly as they appear in the markup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeFields {
    pub year: String,
    pub month: String,
    pub day: String,
    pub start_hour: String,
    pub end_hour: Option<String>,
}

impl TimeFields {
    pub fn date_prefix(&self) -> String {
        format!("{} {} {}", self.year, self.month, self.day)
    }
}

/// Owned snapshot of a listing container, taken before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    pub title: Option<String>,
    /// `None` when the container is an all-day event.
    pub time: Option<TimeFields>,
    pub location: Option<String>,
    pub link: Option<String>,
}

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub events: Vec<Event>,
    pub rows: Vec<ExportRow>,
    pub csv_output: String,
    pub json_output: String,
}

/// Event resource in the shape the Google Calendar `events.insert` call expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleEvent {
    pub summary: String,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<GoogleSource>,
    pub start: GoogleDateTime,
    pub end: GoogleDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSource {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleDateTime {
    pub date_time: String,
    pub time_zone: String,
}

impl GoogleEvent {
    pub fn from_event(event: &Event, time_zone: &str) -> Self {
        let (institute, title, start, end, body, location, link) = event.to_tuple();
        let at = |date_time: String| GoogleDateTime {
            date_time,
            time_zone: time_zone.to_string(),
        };

        Self {
            summary: title,
            description: body,
            location,
            source: event.link.as_ref().map(|_| GoogleSource {
                title: institute,
                url: link,
            }),
            start: at(start),
            end: at(end),
        }
    }
}
