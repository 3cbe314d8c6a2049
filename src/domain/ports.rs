use crate::domain::model::SourceResult;
use crate::domain::phone::CanonicalNumber;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// One external source queried for a number.
///
/// `Ok(None)` means the source answered but had nothing usable; `Err` is a
/// fault of this source only and never stops the other sources.
#[async_trait]
pub trait SourceLookup: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, number: &CanonicalNumber) -> Result<Option<SourceResult>>;

    /// Per-source override of the aggregator's deadline.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn source_timeout(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn max_workers(&self) -> Option<usize>;
    fn user_agents(&self) -> &[String];
    fn save_report(&self) -> bool;
}
