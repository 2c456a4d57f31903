use crate::config::{EndTimePolicy, ScanStrategy};
use crate::domain::model::{Event, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Page fetcher. Failures are reported as `None`, never as errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn institute(&self) -> &str;
    fn scan_strategy(&self) -> ScanStrategy;
    fn end_time_policy(&self) -> EndTimePolicy;
    fn output_path(&self) -> Option<&str>;
    fn time_zone(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Event>>;
    async fn transform(&self, events: Vec<Event>) -> Result<TransformResult>;
    /// Returns where the export was written, or `None` when export is disabled.
    async fn load(&self, result: &TransformResult) -> Result<Option<String>>;
}
