pub mod aggregator;
pub mod engine;

pub use crate::domain::model::{AggregateReport, SourceOutcome, SourceResult};
pub use crate::domain::ports::{ConfigProvider, SourceLookup, Storage};
pub use crate::utils::error::Result;
