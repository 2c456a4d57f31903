use crate::config::ScanStrategy;
use crate::domain::model::{Event, Listing};
use crate::domain::ports::Fetcher;
use crate::extract::builder::EventBuilder;
use crate::extract::fields::{extract_field, extract_time, ANCHOR, LOCATION_SECTION, NODE_TITLE};
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use url::Url;

const ROW_CLASS_PREFIX: &str = "views-row-";

static ANY_ROW: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="views-row-"]"#).expect("invalid selector: views rows")
});

/// True for `views-row-<n>` classes; `views-row-odd`, `views-row-first` and friends don't count.
fn is_numbered_row(element: &ElementRef<'_>) -> bool {
    element.value().classes().any(|class| {
        class
            .strip_prefix(ROW_CLASS_PREFIX)
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
    })
}

/// Listing containers of a page, in the order they will be built.
pub fn find_containers<'a>(doc: &'a Html, strategy: ScanStrategy) -> Vec<ElementRef<'a>> {
    match strategy {
        ScanStrategy::ClassPrefix => doc.select(&ANY_ROW).filter(is_numbered_row).collect(),
        ScanStrategy::Sequential => {
            let mut containers = Vec::new();
            for index in 1.. {
                let Ok(selector) = Selector::parse(&format!(".{ROW_CLASS_PREFIX}{index}")) else {
                    break;
                };
                match doc.select(&selector).next() {
                    Some(container) => containers.push(container),
                    None => break,
                }
            }
            containers
        }
    }
}

/// Absolute form of a listing link; unresolvable hrefs are kept verbatim.
pub fn resolve_link(page_url: &str, href: &str) -> String {
    Url::parse(page_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

pub fn listing_from_container(container: ElementRef<'_>, page_url: &str) -> Listing {
    let location = container
        .select(&LOCATION_SECTION)
        .next()
        .map(|section| section.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());

    let link = container
        .select(&ANCHOR)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| resolve_link(page_url, href));

    Listing {
        title: extract_field(container, &NODE_TITLE),
        time: extract_time(container),
        location,
        link,
    }
}

/// Parses the index page and snapshots every container it finds.
pub fn parse_listings(raw_html: &[u8], page_url: &str, strategy: ScanStrategy) -> Vec<Listing> {
    let doc = Html::parse_document(&String::from_utf8_lossy(raw_html));
    find_containers(&doc, strategy)
        .into_iter()
        .map(|container| listing_from_container(container, page_url))
        .collect()
}

/// Result of one scan of the index page.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub events: Vec<Event>,
    pub attempted: usize,
}

impl Collection {
    pub fn discarded(&self) -> usize {
        self.attempted - self.events.len()
    }
}

pub struct ListingDriver<F: Fetcher> {
    fetcher: Arc<F>,
    builder: EventBuilder<F>,
    strategy: ScanStrategy,
}

impl<F: Fetcher> ListingDriver<F> {
    pub fn new(fetcher: Arc<F>, builder: EventBuilder<F>, strategy: ScanStrategy) -> Self {
        Self {
            fetcher,
            builder,
            strategy,
        }
    }

    /// Events from `url` in page order. Never fails; an unreachable page yields nothing.
    pub async fn collect(&self, url: &str) -> Vec<Event> {
        self.collect_with_stats(url).await.events
    }

    pub async fn collect_with_stats(&self, url: &str) -> Collection {
        let Some(raw_html) = self.fetcher.fetch(url).await else {
            tracing::error!("Could not get the url: {}", url);
            return Collection::default();
        };

        let listings = parse_listings(&raw_html, url, self.strategy);
        tracing::debug!(
            "Found {} listing containers ({:?} scan)",
            listings.len(),
            self.strategy
        );

        let mut collection = Collection {
            events: Vec::with_capacity(listings.len()),
            attempted: listings.len(),
        };
        for listing in listings {
            if let Some(event) = self.builder.build(listing).await {
                collection.events.push(event);
            }
        }

        tracing::info!("obtained {} events from {}", collection.events.len(), url);
        collection
    }
}
