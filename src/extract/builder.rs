use crate::config::EndTimePolicy;
use crate::domain::model::{Event, Listing, TimeFields};
use crate::domain::ports::Fetcher;
use crate::extract::fields::{extract_field, NODE_CONTENT};
use chrono::NaiveDateTime;
use scraper::Html;
use std::sync::Arc;
use thiserror::Error;

/// Layout of the composed date strings, e.g. `2018 May 6 1:00PM`.
pub const LISTING_DATETIME_FORMAT: &str = "%Y %b %d %I:%M%p";

/// Why a listing did not become an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Discard {
    #[error("listing has no title")]
    MissingTitle,

    #[error("'{0}' has a placeholder title")]
    PlaceholderTitle(String),

    #[error("'{0}' is an all-day event")]
    AllDay(String),

    #[error("'{0}' has no location")]
    MissingLocation(String),

    #[error("Error getting {title}'s date: {reason}")]
    UnparseableDate { title: String, reason: String },
}

/// A listing that passed the field checks; dates are not parsed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedListing {
    pub title: String,
    pub time: TimeFields,
    pub location: String,
    pub link: Option<String>,
}

pub fn is_placeholder_title(title: &str) -> bool {
    title.contains("TBA")
}

pub fn check_listing(listing: Listing) -> Result<CheckedListing, Discard> {
    let title = listing.title.ok_or(Discard::MissingTitle)?;
    if is_placeholder_title(&title) {
        return Err(Discard::PlaceholderTitle(title));
    }
    let Some(time) = listing.time else {
        return Err(Discard::AllDay(title));
    };
    let Some(location) = listing.location else {
        return Err(Discard::MissingLocation(title));
    };

    Ok(CheckedListing {
        title,
        time,
        location,
        link: listing.link,
    })
}

pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, LISTING_DATETIME_FORMAT)
}

/// Start and end strings for a listing; the end is `None` when the listing has no end hour.
pub fn compose_times(time: &TimeFields, policy: EndTimePolicy) -> (String, Option<String>) {
    let date = time.date_prefix();
    let start = format!("{} {}", date, time.start_hour);
    let end = match policy {
        EndTimePolicy::EndHour => time.end_hour.as_ref().map(|hour| format!("{} {}", date, hour)),
        EndTimePolicy::StartHour => Some(start.clone()),
    };
    (start, end)
}

/// Body text of a detail page.
pub fn body_from_detail_page(raw_html: &[u8]) -> Option<String> {
    let doc = Html::parse_document(&String::from_utf8_lossy(raw_html));
    extract_field(doc.root_element(), &NODE_CONTENT)
}

pub struct EventBuilder<F: Fetcher> {
    fetcher: Arc<F>,
    institute: String,
    end_time: EndTimePolicy,
}

impl<F: Fetcher> EventBuilder<F> {
    pub fn new(fetcher: Arc<F>, institute: impl Into<String>, end_time: EndTimePolicy) -> Self {
        Self {
            fetcher,
            institute: institute.into(),
            end_time,
        }
    }

    /// Turns one listing into an event, or logs why it was dropped.
    pub async fn build(&self, listing: Listing) -> Option<Event> {
        match self.try_build(listing).await {
            Ok(event) => Some(event),
            Err(discard @ Discard::UnparseableDate { .. }) => {
                tracing::warn!("{}", discard);
                None
            }
            Err(discard) => {
                tracing::debug!("Skipping listing: {}", discard);
                None
            }
        }
    }

    pub async fn try_build(&self, listing: Listing) -> Result<Event, Discard> {
        let checked = check_listing(listing)?;
        let (start, end) = self.parse_times(&checked)?;

        // Detail pages are optional; a failed fetch only loses the body.
        let body = match &checked.link {
            Some(link) => self.fetch_body(link).await,
            None => None,
        };

        Ok(Event::new(
            self.institute.clone(),
            checked.title,
            start,
            end,
            body,
            checked.location,
            checked.link,
        ))
    }

    fn parse_times(
        &self,
        checked: &CheckedListing,
    ) -> Result<(NaiveDateTime, Option<NaiveDateTime>), Discard> {
        let unparseable = |e: chrono::ParseError| Discard::UnparseableDate {
            title: checked.title.clone(),
            reason: e.to_string(),
        };

        let (start, end) = compose_times(&checked.time, self.end_time);
        let start = parse_datetime(&start).map_err(unparseable)?;
        let end = end
            .map(|end| parse_datetime(&end))
            .transpose()
            .map_err(unparseable)?;
        Ok((start, end))
    }

    async fn fetch_body(&self, link: &str) -> Option<String> {
        let raw_html = self.fetcher.fetch(link).await?;
        body_from_detail_page(&raw_html)
    }
}
