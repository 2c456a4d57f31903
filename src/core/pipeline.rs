use crate::adapters::http::HttpFetcher;
use crate::core::{ConfigProvider, Event, Fetcher, Pipeline, Storage, TransformResult};
use crate::domain::model::{sort_by_start, ExportRow, GoogleEvent};
use crate::extract::builder::EventBuilder;
use crate::extract::listing::ListingDriver;
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::sync::Arc;
use zip::write::{FileOptions, ZipWriter};

pub const EXPORT_ARCHIVE: &str = "calendar_export.zip";
pub const CSV_FILE: &str = "events.csv";
pub const JSON_FILE: &str = "events.json";
const CSV_HEADER: [&str; 7] = ["institute", "title", "start", "end", "body", "location", "link"];

pub struct CalendarPipeline<S: Storage, C: ConfigProvider, F: Fetcher = HttpFetcher> {
    storage: S,
    config: C,
    fetcher: Arc<F>,
}

impl<S: Storage, C: ConfigProvider> CalendarPipeline<S, C, HttpFetcher> {
    pub fn new(storage: S, config: C) -> Self {
        Self::with_fetcher(storage, config, HttpFetcher::new())
    }
}

impl<S: Storage, C: ConfigProvider, F: Fetcher> CalendarPipeline<S, C, F> {
    pub fn with_fetcher(storage: S, config: C, fetcher: F) -> Self {
        Self {
            storage,
            config,
            fetcher: Arc::new(fetcher),
        }
    }

    fn driver(&self) -> ListingDriver<F> {
        let builder = EventBuilder::new(
            self.fetcher.clone(),
            self.config.institute(),
            self.config.end_time_policy(),
        );
        ListingDriver::new(self.fetcher.clone(), builder, self.config.scan_strategy())
    }
}

pub fn render_csv(rows: &[ExportRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for (institute, title, start, end, body, location, link) in rows {
        writer.write_record([institute, title, start, end, body, location, link])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

pub fn render_json(events: &[Event], time_zone: &str) -> Result<String> {
    let resources: Vec<GoogleEvent> = events
        .iter()
        .map(|event| GoogleEvent::from_event(event, time_zone))
        .collect();
    Ok(serde_json::to_string_pretty(&resources)?)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, F: Fetcher> Pipeline for CalendarPipeline<S, C, F> {
    async fn extract(&self) -> Result<Vec<Event>> {
        let url = self.config.source_url();
        tracing::debug!("Collecting events from: {}", url);
        Ok(self.driver().collect(url).await)
    }

    async fn transform(&self, mut events: Vec<Event>) -> Result<TransformResult> {
        sort_by_start(&mut events);
        let rows: Vec<ExportRow> = events.iter().map(Event::to_tuple).collect();

        let csv_output = render_csv(&rows)?;
        let json_output = render_json(&events, self.config.time_zone())?;

        Ok(TransformResult {
            events,
            rows,
            csv_output,
            json_output,
        })
    }

    async fn load(&self, result: &TransformResult) -> Result<Option<String>> {
        let Some(output_dir) = self.config.output_path() else {
            tracing::debug!("No output path configured, skipping export");
            return Ok(None);
        };

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(CSV_FILE, FileOptions::default())?;
            zip.write_all(result.csv_output.as_bytes())?;

            zip.start_file::<_, ()>(JSON_FILE, FileOptions::default())?;
            zip.write_all(result.json_output.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing {} ({} bytes)", EXPORT_ARCHIVE, zip_data.len());
        self.storage.write_file(EXPORT_ARCHIVE, &zip_data).await?;

        Ok(Some(format!("{}/{}", output_dir, EXPORT_ARCHIVE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CalendarConfig, EndTimePolicy, ScanStrategy};
    use crate::extract::builder::tests::MockFetcher;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    const PAGE_URL: &str = "http://calendar.test/events";

    fn listing_row(index: usize, title: &str, day: u32, start: &str, link: Option<&str>) -> String {
        let anchor = link
            .map(|href| format!(r#"<a href="{href}">{title}</a>"#))
            .unwrap_or_default();
        format!(
            r#"<div class="views-row views-row-{index}">
                 <h3 class="node-title">{title}</h3>{anchor}
                 <span class="event-year">2018</span>
                 <span class="event-start-month">May</span>
                 <span class="event-start-day">{day}</span>
                 <span class="date-display-start">{start}</span>
                 <span class="date-display-end">5:00PM</span>
                 <section class="field-name-field-event-location">Manchester 2</section>
               </div>"#
        )
    }

    fn calendar_page() -> String {
        format!(
            "<html><body>{}{}{}</body></html>",
            listing_row(1, "Late talk", 9, "3:00PM", Some("/event/late")),
            listing_row(2, "All day workshop (All day)", 7, "9:00AM", None),
            listing_row(3, "Early talk", 8, "11:00AM", None),
        )
    }

    fn config(output_path: Option<&str>) -> CalendarConfig {
        CalendarConfig {
            source_url: PAGE_URL.to_string(),
            output_path: output_path.map(str::to_string),
            ..CalendarConfig::default()
        }
    }

    fn fetcher() -> MockFetcher {
        MockFetcher::new()
            .with_page(PAGE_URL, calendar_page())
            .with_page(
                "http://calendar.test/event/late",
                r#"<div class="node-content">Details of the late talk</div>"#,
            )
    }

    fn event(title: &str, day: u32) -> Event {
        let start = NaiveDate::from_ymd_opt(2018, 5, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Event::new("Institute", title, start, None, None, "Room", None)
    }

    #[tokio::test]
    async fn test_extract_builds_valid_listings_in_page_order() {
        let pipeline = CalendarPipeline::with_fetcher(MockStorage::new(), config(None), fetcher());

        let events = pipeline.extract().await.unwrap();

        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Late talk", "Early talk"]);
        assert_eq!(events[0].body.as_deref(), Some("Details of the late talk"));
        assert_eq!(events[0].link.as_deref(), Some("http://calendar.test/event/late"));
        assert_eq!(events[0].institute, "Einstein Institute of Mathematics");
    }

    #[tokio::test]
    async fn test_extract_honours_configured_policies() {
        let mut cfg = config(None);
        cfg.scan = ScanStrategy::Sequential;
        cfg.end_time = EndTimePolicy::StartHour;
        cfg.institute = "Physics".to_string();
        let pipeline = CalendarPipeline::with_fetcher(MockStorage::new(), cfg, fetcher());

        let events = pipeline.extract().await.unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.start == e.end));
        assert!(events.iter().all(|e| e.institute == "Physics"));
    }

    #[tokio::test]
    async fn test_extract_unreachable_source_is_empty() {
        let pipeline =
            CalendarPipeline::with_fetcher(MockStorage::new(), config(None), MockFetcher::new());
        assert!(pipeline.extract().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transform_sorts_and_renders() {
        let pipeline = CalendarPipeline::with_fetcher(MockStorage::new(), config(None), fetcher());

        let result = pipeline
            .transform(vec![event("b", 8), event("a", 6), event("c", 9)])
            .await
            .unwrap();

        let titles: Vec<&str> = result.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
        assert_eq!(result.rows[0].2, "2018-05-06T10:00:00");
        assert_eq!(result.rows[0].3, "2018-05-06T10:30:00");

        let csv_lines: Vec<&str> = result.csv_output.lines().collect();
        assert_eq!(csv_lines.len(), 4);
        assert_eq!(csv_lines[0], "institute,title,start,end,body,location,link");
        assert_eq!(
            csv_lines[1],
            "Institute,a,2018-05-06T10:00:00,2018-05-06T10:30:00,,Room,"
        );

        let json: serde_json::Value = serde_json::from_str(&result.json_output).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["summary"], "a");
        assert_eq!(json[0]["start"]["timeZone"], "Asia/Jerusalem");
    }

    #[tokio::test]
    async fn test_csv_quotes_fields_with_commas() {
        let mut e = event("Groups, rings and fields", 6);
        e.body = Some("line one\nline two".to_string());

        let csv_output = render_csv(&[e.to_tuple()]).unwrap();

        let mut reader = csv::Reader::from_reader(csv_output.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], "Groups, rings and fields");
        assert_eq!(&record[4], "line one\nline two");
    }

    #[tokio::test]
    async fn test_load_without_output_path_writes_nothing() {
        let storage = MockStorage::new();
        let pipeline = CalendarPipeline::with_fetcher(storage.clone(), config(None), fetcher());
        let result = pipeline.transform(vec![event("a", 6)]).await.unwrap();

        assert_eq!(pipeline.load(&result).await.unwrap(), None);
        assert!(storage.get_file(EXPORT_ARCHIVE).await.is_none());
    }

    #[tokio::test]
    async fn test_load_writes_csv_and_json_archive() {
        let storage = MockStorage::new();
        let pipeline =
            CalendarPipeline::with_fetcher(storage.clone(), config(Some("test_output")), fetcher());
        let result = pipeline.transform(vec![event("a", 6)]).await.unwrap();

        let output_path = pipeline.load(&result).await.unwrap();
        assert_eq!(output_path.as_deref(), Some("test_output/calendar_export.zip"));

        let zip_bytes = storage.read_file(EXPORT_ARCHIVE).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(file_names, vec!["events.csv", "events.json"]);

        let csv_content = {
            let mut csv_file = archive.by_name(CSV_FILE).unwrap();
            let mut content = String::new();
            std::io::Read::read_to_string(&mut csv_file, &mut content).unwrap();
            content
        };
        assert_eq!(csv_content, result.csv_output);
    }
}
