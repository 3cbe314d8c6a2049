use super::PageFetcher;
use crate::domain::model::SourceResult;
use crate::domain::phone::CanonicalNumber;
use crate::domain::ports::SourceLookup;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://web.whatsapp.com";

pub const STATUS_EXISTS: &str = "WhatsApp account exists";
pub const STATUS_SHARED: &str = "Number shared on WhatsApp";
pub const STATUS_NOT_FOUND: &str = "No WhatsApp account found";

/// Click-to-chat page of the messaging service. Always reports a status
/// once the page loads.
pub struct WhatsAppSource {
    name: String,
    page: PageFetcher,
    timeout: Option<Duration>,
}

impl WhatsAppSource {
    pub fn new(name: String, page: PageFetcher, timeout: Option<Duration>) -> Self {
        Self {
            name,
            page,
            timeout,
        }
    }
}

#[async_trait]
impl SourceLookup for WhatsAppSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn lookup(&self, number: &CanonicalNumber) -> Result<Option<SourceResult>> {
        let url = self.page.url(&["send"], &[("phone", number.as_str())]);
        let body = self.page.get_any(url.clone()).await?;
        Ok(Some(classify(&body, url.as_str())))
    }
}

fn classify(body: &str, url: &str) -> SourceResult {
    if body.contains("use WhatsApp on your phone") {
        SourceResult::new()
            .with_field("status", STATUS_EXISTS)
            .with_field("url", url)
    } else if body.to_lowercase().contains("phone number shared") {
        SourceResult::new().with_field("status", STATUS_SHARED)
    } else {
        SourceResult::new().with_field("status", STATUS_NOT_FOUND)
    }
}
