use crate::app::report;
use crate::core::aggregator::{AggregateOutcome, Aggregator};
use crate::domain::phone::{CanonicalNumber, PhoneCandidate};
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// Result of one engine run.
#[derive(Debug)]
pub struct LookupRun {
    pub number: CanonicalNumber,
    pub outcome: AggregateOutcome,
    /// Where the report was written, if it was.
    pub saved_to: Option<String>,
}

/// Validate, look up, persist. Only an invalid number stops a run before
/// any request is made.
pub struct LookupEngine<S: Storage> {
    aggregator: Aggregator,
    storage: S,
    save: bool,
}

impl<S: Storage> LookupEngine<S> {
    pub fn new(aggregator: Aggregator, storage: S) -> Self {
        Self {
            aggregator,
            storage,
            save: true,
        }
    }

    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    pub async fn run(&self, candidate: PhoneCandidate) -> Result<LookupRun> {
        let phone = candidate.validate()?;
        let number = phone.normalize();
        tracing::info!("🔍 Investigating SA number: {}", number);
        tracing::debug!(sources = ?self.aggregator.source_names(), "querying sources");

        let outcome = self.aggregator.run(&number).await;

        let saved_to = if outcome.report.is_empty() {
            tracing::info!("No information found for {}", number);
            None
        } else if self.save {
            let path = report::save_report(&self.storage, &number, &outcome.report).await?;
            tracing::info!("📁 Results saved to {}", path);
            Some(path)
        } else {
            None
        };

        Ok(LookupRun {
            number,
            outcome,
            saved_to,
        })
    }
}
