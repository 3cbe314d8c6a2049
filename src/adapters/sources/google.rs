use super::{element_text, extract_emails, PageFetcher};
use crate::domain::model::SourceResult;
use crate::domain::phone::CanonicalNumber;
use crate::domain::ports::SourceLookup;
use crate::utils::error::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::json;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.google.com";
const MAX_RESULTS: usize = 5;

static RESULT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.g").expect("valid result selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="http"]"#).expect("valid link selector"));

/// Web search for the exact number.
pub struct GoogleSource {
    name: String,
    page: PageFetcher,
    timeout: Option<Duration>,
}

impl GoogleSource {
    pub fn new(name: String, page: PageFetcher, timeout: Option<Duration>) -> Self {
        Self {
            name,
            page,
            timeout,
        }
    }
}

#[async_trait]
impl SourceLookup for GoogleSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn lookup(&self, number: &CanonicalNumber) -> Result<Option<SourceResult>> {
        let quoted = format!("\"{}\"", number);
        let url = self.page.url(&["search"], &[("q", quoted.as_str())]);
        let Some(body) = self.page.get(url).await? else {
            return Ok(None);
        };
        Ok(Some(parse_results(&body)))
    }
}

/// The search page always yields `search_results`, possibly empty, as a
/// successful search with no hits is still worth reporting.
fn parse_results(html: &str) -> SourceResult {
    let document = Html::parse_document(html);
    let hits: Vec<serde_json::Value> = document
        .select(&RESULT_SELECTOR)
        .filter_map(|block| block.select(&LINK_SELECTOR).next())
        .filter_map(|link| {
            let url = link.value().attr("href")?;
            Some(json!({ "title": element_text(link), "url": url }))
        })
        .take(MAX_RESULTS)
        .collect();

    let mut result = SourceResult::new().with_field("search_results", hits);
    result.insert_list("emails", extract_emails(html));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results_limits_hits() {
        let links: String = (1..=7)
            .map(|i| format!(r#"<div class="g"><a href="https://site{i}.co.za/page"><h3>Result {i}</h3></a></div>"#))
            .collect();

        let result = parse_results(&links);
        let hits = result.get("search_results").unwrap().as_array().unwrap();

        assert_eq!(hits.len(), 5);
        assert_eq!(hits[0], json!({"title": "Result 1", "url": "https://site1.co.za/page"}));
        assert!(result.get("emails").is_none());
    }

    #[test]
    fn test_parse_results_decodes_titles() {
        let html = r#"<div class="g"><a href="https://eats.co.za/?a=1&amp;b=2"><h3>Thandi&#x27;s Caf&eacute; &lt;Soweto&gt;</h3></a></div>
            <a href="https://outside.example.com">not a result block</a>"#;

        let result = parse_results(html);

        assert_eq!(
            result.get("search_results"),
            Some(&json!([{
                "title": "Thandi's Café <Soweto>",
                "url": "https://eats.co.za/?a=1&b=2"
            }]))
        );
    }

    #[test]
    fn test_parse_results_collects_emails() {
        let html = r#"<span>Call 082 123 4567 or mail sales@shop.co.za</span>"#;
        let result = parse_results(html);
        assert_eq!(result.get("search_results"), Some(&json!([])));
        assert_eq!(result.get("emails"), Some(&json!(["sales@shop.co.za"])));
    }
}
