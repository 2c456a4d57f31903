use crate::core::{Event, Pipeline};
use crate::utils::error::Result;

/// What a run produced: the sorted events and, when exporting, the archive path.
#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub events: Vec<Event>,
    pub output_path: Option<String>,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<EtlOutcome> {
        tracing::info!("Starting calendar ETL");

        let events = self.pipeline.extract().await?;
        tracing::info!("Extracted {} events", events.len());

        let transformed = self.pipeline.transform(events).await?;
        tracing::debug!("Prepared {} export rows", transformed.rows.len());

        let output_path = self.pipeline.load(&transformed).await?;
        if let Some(path) = &output_path {
            tracing::info!("Export saved to: {}", path);
        }

        Ok(EtlOutcome {
            events: transformed.events,
            output_path,
        })
    }
}
