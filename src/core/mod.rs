pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{Event, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Fetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
