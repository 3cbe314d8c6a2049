pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::storage::LocalStorage;
pub use crate::config::LookupConfig;
pub use crate::core::aggregator::{AggregateOutcome, Aggregator};
pub use crate::core::engine::{LookupEngine, LookupRun};
pub use crate::domain::model::{AggregateReport, SourceOutcome, SourceResult};
pub use crate::domain::phone::{CanonicalNumber, PhoneCandidate, ValidPhone};
pub use crate::utils::error::{ReconError, Result};
