//! HTTP adapters, one per public source.
//!
//! Every adapter fetches a single page and pulls out what it can with CSS
//! selectors, plus a regex sweep for email addresses. Page layouts belong to
//! the sites and change without notice, so extraction stays shallow and a
//! miss is simply an empty result.

pub mod facebook;
pub mod google;
pub mod truecaller;
pub mod whatsapp;

pub use facebook::FacebookSource;
pub use google::GoogleSource;
pub use truecaller::TruecallerSource;
pub use whatsapp::WhatsAppSource;

use crate::domain::ports::SourceLookup;
use crate::utils::error::{ReconError, Result};
use rand::seq::SliceRandom;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_USER_AGENT: &str = concat!("sa-phone-recon/", env!("CARGO_PKG_VERSION"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email regex")
});

/// Known source adapters, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Truecaller,
    Facebook,
    Whatsapp,
    Google,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Truecaller,
        SourceKind::Facebook,
        SourceKind::Whatsapp,
        SourceKind::Google,
    ];

    pub const NAMES: [&'static str; 4] = ["truecaller", "facebook", "whatsapp", "google"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Truecaller => "truecaller",
            SourceKind::Facebook => "facebook",
            SourceKind::Whatsapp => "whatsapp",
            SourceKind::Google => "google",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            SourceKind::Truecaller => truecaller::DEFAULT_BASE_URL,
            SourceKind::Facebook => facebook::DEFAULT_BASE_URL,
            SourceKind::Whatsapp => whatsapp::DEFAULT_BASE_URL,
            SourceKind::Google => google::DEFAULT_BASE_URL,
        }
    }

    /// Builds the adapter. `name` is the report key; it defaults to the kind.
    pub fn build(&self, spec: SourceSpec) -> Result<Arc<dyn SourceLookup>> {
        let name = spec.name.unwrap_or_else(|| self.as_str().to_string());
        let base_url = spec
            .base_url
            .unwrap_or_else(|| self.default_base_url().to_string());
        let page = PageFetcher::new(spec.session, &base_url)?;

        let source: Arc<dyn SourceLookup> = match self {
            SourceKind::Truecaller => Arc::new(TruecallerSource::new(name, page, spec.timeout)),
            SourceKind::Facebook => Arc::new(FacebookSource::new(name, page, spec.timeout)),
            SourceKind::Whatsapp => Arc::new(WhatsAppSource::new(name, page, spec.timeout)),
            SourceKind::Google => Arc::new(GoogleSource::new(name, page, spec.timeout)),
        };
        Ok(source)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceKind {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReconError::InvalidConfigValueError {
                field: "sources".to_string(),
                value: s.to_string(),
                reason: format!("Unknown source. Known sources: {}", SourceKind::NAMES.join(", ")),
            })
    }
}

/// Everything needed to build one adapter.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub session: HttpSession,
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

/// HTTP client shared by all adapters of one run. Cookies persist for the
/// whole run and each request carries a user agent drawn from the pool.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    user_agents: Arc<[String]>,
}

impl HttpSession {
    pub fn new(user_agents: &[String], request_timeout: Duration) -> Result<Self> {
        if user_agents.iter().all(|agent| agent.trim().is_empty()) {
            return Err(ReconError::ConfigValidationError {
                field: "user_agents".to_string(),
                message: "At least one user agent is required".to_string(),
            });
        }

        Ok(Self {
            client: build_client(request_timeout)?,
            user_agents: user_agents
                .iter()
                .filter(|agent| !agent.trim().is_empty())
                .cloned()
                .collect(),
        })
    }

    pub fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url).header(USER_AGENT, self.pick_user_agent())
    }
}

fn build_client(request_timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );

    let client = Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .timeout(request_timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// GETs pages relative to one base URL.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    session: HttpSession,
    base_url: Url,
}

impl PageFetcher {
    pub fn new(session: HttpSession, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ReconError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        Ok(Self { session, base_url })
    }

    pub fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Body of a successful response, `None` for any other status.
    pub async fn get(&self, url: Url) -> Result<Option<String>> {
        tracing::debug!("GET {}", url);
        let response = self.session.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::debug!("non-success status {}", status);
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }

    /// Body of the final response after redirects, whatever its status.
    pub async fn get_any(&self, url: Url) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.session.get(url).send().await?;
        tracing::debug!("status {} from {}", response.status(), response.url());
        Ok(response.text().await?)
    }

    /// Loads the landing page so the session picks up its cookies.
    pub async fn visit_home(&self) -> Result<()> {
        tracing::debug!("GET {} (session warm-up)", self.base_url);
        let response = self.session.get(self.base_url.clone()).send().await?;
        tracing::debug!("warm-up status {}", response.status());
        Ok(())
    }
}

/// Unique email addresses found anywhere in `text`, sorted.
pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Decoded text of an element with whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn session(agents: &[&str]) -> HttpSession {
        let agents: Vec<String> = agents.iter().map(|a| a.to_string()).collect();
        HttpSession::new(&agents, DEFAULT_REQUEST_TIMEOUT).unwrap()
    }

    #[test]
    fn test_extract_emails_dedups_and_sorts() {
        let text = "contact zanele@example.co.za or admin@site.com, again zanele@example.co.za";
        assert_eq!(
            extract_emails(text),
            vec!["admin@site.com".to_string(), "zanele@example.co.za".to_string()]
        );
        assert!(extract_emails("no addresses here").is_empty());
    }

    fn first_text(html: &str) -> String {
        let document = Html::parse_fragment(html);
        let p = Selector::parse("p").unwrap();
        document.select(&p).next().map(element_text).unwrap_or_default()
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        assert_eq!(first_text("<p><b>Sipho</b>\n  <i>Ndlovu</i></p>"), "Sipho Ndlovu");
    }

    #[test]
    fn test_element_text_decodes_entities() {
        assert_eq!(first_text("<p>Tom &amp; Jerry</p>"), "Tom & Jerry");
        assert_eq!(first_text("<p>a &lt;b&gt; c</p>"), "a <b> c");
        assert_eq!(first_text("<p>O&#x27;Brien</p>"), "O'Brien");
        assert_eq!(first_text("<p>Caf&eacute; Soweto</p>"), "Café Soweto");
        assert_eq!(first_text("<p>&amp;nbsp;</p>"), "&nbsp;");
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("Google".parse::<SourceKind>().unwrap(), SourceKind::Google);
        assert_eq!(" whatsapp ".parse::<SourceKind>().unwrap(), SourceKind::Whatsapp);
        assert!("myspace".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_page_fetcher_builds_urls() {
        let page = PageFetcher::new(session(&[DEFAULT_USER_AGENT]), "https://example.com/").unwrap();
        let url = page.url(&["search", "za", "+27821234567"], &[]);
        assert_eq!(url.path(), "/search/za/+27821234567");

        let url = page.url(&["search"], &[("q", "\"+27821234567\"")]);
        assert_eq!(url.path(), "/search");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("q".to_string(), "\"+27821234567\"".to_string())]);
    }

    #[test]
    fn test_page_fetcher_rejects_bad_base_url() {
        assert!(PageFetcher::new(session(&[DEFAULT_USER_AGENT]), "not a url").is_err());
    }

    #[test]
    fn test_every_kind_builds_under_its_own_name() {
        let shared = session(&[DEFAULT_USER_AGENT]);
        for kind in SourceKind::ALL {
            let source = kind
                .build(SourceSpec {
                    session: shared.clone(),
                    name: None,
                    base_url: None,
                    timeout: None,
                })
                .unwrap();
            assert_eq!(source.name(), kind.as_str());
        }
    }

    #[test]
    fn test_session_picks_from_configured_agents() {
        let agents = ["agent-a/1.0", "agent-b/2.0", "agent-c/3.0"];
        let session = session(&agents);
        for _ in 0..20 {
            assert!(agents.contains(&session.pick_user_agent()));
        }
    }

    #[test]
    fn test_session_requires_a_user_agent() {
        assert!(HttpSession::new(&[], DEFAULT_REQUEST_TIMEOUT).is_err());
        assert!(HttpSession::new(&["  ".to_string()], DEFAULT_REQUEST_TIMEOUT).is_err());
    }
}
