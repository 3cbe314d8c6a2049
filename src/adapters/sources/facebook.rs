use super::{extract_emails, PageFetcher};
use crate::domain::model::SourceResult;
use crate::domain::phone::CanonicalNumber;
use crate::domain::ports::SourceLookup;
use crate::utils::error::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.facebook.com";
const MAX_PROFILES: usize = 3;

static PROFILE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="/profile.php"]"#).expect("valid profile selector")
});
static GROUP_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/groups/"]"#).expect("valid group selector"));

/// Public search page of the social network. The landing page is loaded
/// first so the search runs with the site's session cookies.
pub struct FacebookSource {
    name: String,
    page: PageFetcher,
    timeout: Option<Duration>,
}

impl FacebookSource {
    pub fn new(name: String, page: PageFetcher, timeout: Option<Duration>) -> Self {
        Self {
            name,
            page,
            timeout,
        }
    }
}

#[async_trait]
impl SourceLookup for FacebookSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn lookup(&self, number: &CanonicalNumber) -> Result<Option<SourceResult>> {
        self.page.visit_home().await?;
        let url = self.page.url(&["search", "top", ""], &[("q", number.as_str())]);
        let Some(body) = self.page.get(url).await? else {
            return Ok(None);
        };
        Ok(parse_search(&body).into_non_empty())
    }
}

fn links(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|link| link.value().attr("href"))
        .map(str::to_string)
        .take(MAX_PROFILES)
        .collect()
}

fn parse_search(html: &str) -> SourceResult {
    let document = Html::parse_document(html);
    let mut result = SourceResult::new();

    // 找不到個人頁面時改找社團連結
    let mut profiles = links(&document, &PROFILE_SELECTOR);
    if profiles.is_empty() {
        profiles = links(&document, &GROUP_SELECTOR);
    }
    result.insert_list("profiles", profiles);
    result.insert_list("emails", extract_emails(html));

    result
}
