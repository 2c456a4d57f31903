//! Text extraction from listing containers.
//!
//! All selectors are fixed; a selector that fails to parse is a bug in this
//! module, so they are compiled once and panic on first use if malformed.

use crate::domain::model::TimeFields;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e:?}"))
}

pub static EVENT_YEAR: LazyLock<Selector> = LazyLock::new(|| selector(".event-year"));
pub static EVENT_START_MONTH: LazyLock<Selector> = LazyLock::new(|| selector(".event-start-month"));
pub static EVENT_START_DAY: LazyLock<Selector> = LazyLock::new(|| selector(".event-start-day"));
pub static DISPLAY_START: LazyLock<Selector> = LazyLock::new(|| selector(".date-display-start"));
pub static DISPLAY_END: LazyLock<Selector> = LazyLock::new(|| selector(".date-display-end"));
pub static NODE_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".node-title"));
pub static NODE_CONTENT: LazyLock<Selector> = LazyLock::new(|| selector(".node-content"));
pub static LOCATION_SECTION: LazyLock<Selector> =
    LazyLock::new(|| selector("section.field-name-field-event-location"));
pub static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));

static ALL_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)all day").expect("invalid regex: all day"));

pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of the first match, or an empty string when nothing matches.
pub fn extract_text(container: ElementRef<'_>, selector: &Selector) -> String {
    container
        .select(selector)
        .next()
        .map(|element| element_text(element).trim().to_string())
        .unwrap_or_default()
}

/// Like [`extract_text`], but absent and blank fields are both `None`.
pub fn extract_field(container: ElementRef<'_>, selector: &Selector) -> Option<String> {
    Some(extract_text(container, selector)).filter(|text| !text.is_empty())
}

pub fn is_all_day(container: ElementRef<'_>) -> bool {
    ALL_DAY.is_match(&element_text(container))
}

/// Reads the date and hour sub-fields. `None` means the listing is an
/// all-day event; blank sub-fields are passed through and fail at parse time.
/// Only a missing `.date-display-end` element leaves `end_hour` unset.
pub fn extract_time(container: ElementRef<'_>) -> Option<TimeFields> {
    if is_all_day(container) {
        return None;
    }

    Some(TimeFields {
        year: extract_text(container, &EVENT_YEAR),
        month: extract_text(container, &EVENT_START_MONTH),
        day: extract_text(container, &EVENT_START_DAY),
        start_hour: extract_text(container, &DISPLAY_START),
        end_hour: container
            .select(&DISPLAY_END)
            .next()
            .map(|element| element_text(element).trim().to_string()),
    })
}
