use super::{element_text, PageFetcher};
use crate::domain::model::SourceResult;
use crate::domain::phone::CanonicalNumber;
use crate::domain::ports::SourceLookup;
use crate::utils::error::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.truecaller.com";

// 依序嘗試，第一個命中的選擇器勝出
static NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "h1.profile-name",
        r#"h1[itemprop="name"]"#,
        "div.profile-detail h1",
    ]
    .iter()
    .map(|css| Selector::parse(css).expect("valid name selector"))
    .collect()
});
static EMAIL_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [r#"a[href^="mailto:"]"#, r#"div.profile-detail a[href*="@"]"#]
        .iter()
        .map(|css| Selector::parse(css).expect("valid email selector"))
        .collect()
});
static DETAIL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.profile-detail div.detail").expect("valid detail selector")
});

/// Caller-ID directory profile page.
pub struct TruecallerSource {
    name: String,
    page: PageFetcher,
    timeout: Option<Duration>,
}

impl TruecallerSource {
    pub fn new(name: String, page: PageFetcher, timeout: Option<Duration>) -> Self {
        Self {
            name,
            page,
            timeout,
        }
    }
}

#[async_trait]
impl SourceLookup for TruecallerSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn lookup(&self, number: &CanonicalNumber) -> Result<Option<SourceResult>> {
        let url = self.page.url(&["search", "za", number.as_str()], &[]);
        let Some(body) = self.page.get(url).await? else {
            return Ok(None);
        };
        Ok(parse_profile(&body).into_non_empty())
    }
}

fn parse_profile(html: &str) -> SourceResult {
    let document = Html::parse_document(html);
    let mut result = SourceResult::new();

    if let Some(name) = NAME_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .map(element_text)
        .filter(|name| !name.is_empty())
    {
        result.insert("name", name);
    }

    if let Some(email) = EMAIL_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .and_then(|link| link.value().attr("href"))
    {
        let email = email.trim_start_matches("mailto:");
        let email = email.split('?').next().unwrap_or(email).trim();
        if !email.is_empty() {
            result.insert("email", email.to_string());
        }
    }

    let details: Vec<String> = document
        .select(&DETAIL_SELECTOR)
        .map(element_text)
        .filter(|detail| !detail.is_empty())
        .collect();
    result.insert_list("additional_info", details);

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_profile_fields() {
        let html = r#"
            <div class="profile-detail">
              <h1 class="profile-name">  Lerato <span>Mokoena</span> </h1>
              <a href="mailto:lerato@example.co.za">Email</a>
              <div class="detail">Johannesburg</div>
              <div class="detail">Vodacom</div>
            </div>"#;

        let result = parse_profile(html);

        assert_eq!(result.get("name"), Some(&json!("Lerato Mokoena")));
        assert_eq!(result.get("email"), Some(&json!("lerato@example.co.za")));
        assert_eq!(
            result.get("additional_info"),
            Some(&json!(["Johannesburg", "Vodacom"]))
        );
    }

    #[test]
    fn test_parse_profile_decodes_entities() {
        let html = r#"
            <div class="profile-detail">
              <h1 itemprop="name">Se&#x27;an O&#39;Reilly &amp; Sons</h1>
              <div class="detail">Caf&eacute; &lt;Braamfontein&gt;</div>
            </div>"#;

        let result = parse_profile(html);

        assert_eq!(result.get("name"), Some(&json!("Se'an O'Reilly & Sons")));
        assert_eq!(
            result.get("additional_info"),
            Some(&json!(["Café <Braamfontein>"]))
        );
        assert!(result.get("email").is_none());
    }

    #[test]
    fn test_detail_outside_profile_is_ignored() {
        let html = r#"<div class="detail">Advert</div><h2>Nobody</h2>"#;
        assert!(parse_profile(html).is_empty());
    }

    #[test]
    fn test_parse_profile_without_matches_is_empty() {
        assert!(parse_profile("<html><body>Sign in to search</body></html>").is_empty());
    }
}
