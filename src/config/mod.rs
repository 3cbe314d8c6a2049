#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::sources::{
    HttpSession, SourceKind, SourceSpec, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::core::aggregator::{Aggregator, DEFAULT_SOURCE_TIMEOUT};
use crate::core::ConfigProvider;
use crate::domain::ports::SourceLookup;
use crate::utils::error::{ReconError, Result};
use crate::utils::validation::{self, Validate};
use std::sync::Arc;
use std::time::Duration;
use toml_config::{SourceEntry, TomlConfig};

/// Settings for one run after merging defaults, the TOML file and flags.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub output_path: String,
    pub source_timeout: Duration,
    pub request_timeout: Duration,
    pub max_workers: Option<usize>,
    /// One is picked at random for every request.
    pub user_agents: Vec<String>,
    pub save: bool,
    pub sources: Vec<SourceEntry>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            output_path: ".".to_string(),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_workers: None,
            user_agents: vec![DEFAULT_USER_AGENT.to_string()],
            save: true,
            sources: SourceKind::ALL.into_iter().map(SourceEntry::new).collect(),
        }
    }
}

impl LookupConfig {
    /// Fills anything the file leaves out with defaults. A file without
    /// `[[sources]]` keeps every known source.
    pub fn from_toml(file: TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            output_path: file.output.output_path.unwrap_or(defaults.output_path),
            source_timeout: file
                .lookup
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.source_timeout),
            request_timeout: file
                .lookup
                .request_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_workers: file.lookup.max_workers,
            user_agents: file
                .lookup
                .user_agents
                .filter(|agents| !agents.is_empty())
                .unwrap_or(defaults.user_agents),
            save: file.output.save.unwrap_or(defaults.save),
            sources: if file.sources.is_empty() {
                defaults.sources
            } else {
                file.sources
            },
        }
    }

    /// Keeps only the named sources, matched by report name or kind.
    pub fn select_sources(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        for name in names {
            let known = self
                .sources
                .iter()
                .any(|entry| entry.name() == name || entry.kind.as_str() == name);
            if !known {
                return Err(ReconError::InvalidConfigValueError {
                    field: "sources".to_string(),
                    value: name.clone(),
                    reason: "No configured source with this name".to_string(),
                });
            }
        }

        self.sources
            .retain(|entry| names.iter().any(|n| n == entry.name() || n == entry.kind.as_str()));
        Ok(())
    }

    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceEntry> {
        self.sources.iter().filter(|entry| entry.is_enabled())
    }

    pub fn build_sources(&self) -> Result<Vec<Arc<dyn SourceLookup>>> {
        let session = HttpSession::new(&self.user_agents, self.request_timeout)?;

        self.enabled_sources()
            .map(|entry| {
                entry.kind.build(SourceSpec {
                    session: session.clone(),
                    name: Some(entry.name().to_string()),
                    base_url: entry.base_url.clone(),
                    timeout: entry.timeout_seconds.map(Duration::from_secs),
                })
            })
            .collect()
    }

    pub fn build_aggregator(&self) -> Result<Aggregator> {
        Ok(Aggregator::new(self.build_sources()?)
            .with_timeout(self.source_timeout)
            .with_max_workers(self.max_workers))
    }
}

impl ConfigProvider for LookupConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn source_timeout(&self) -> Duration {
        self.source_timeout
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn max_workers(&self) -> Option<usize> {
        self.max_workers
    }

    fn user_agents(&self) -> &[String] {
        &self.user_agents
    }

    fn save_report(&self) -> bool {
        self.save
    }
}

impl Validate for LookupConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("timeout", self.source_timeout.as_secs(), 1)?;
        validation::validate_positive_number(
            "request_timeout",
            self.request_timeout.as_secs(),
            1,
        )?;
        if let Some(workers) = self.max_workers {
            validation::validate_positive_number("max_workers", workers as u64, 1)?;
        }
        if self.user_agents.is_empty() {
            return Err(ReconError::ConfigValidationError {
                field: "user_agents".to_string(),
                message: "At least one user agent is required".to_string(),
            });
        }
        for agent in &self.user_agents {
            validation::validate_non_empty_string("user_agents", agent)?;
        }

        if self.enabled_sources().next().is_none() {
            return Err(ReconError::ConfigValidationError {
                field: "sources".to_string(),
                message: "At least one source must be enabled".to_string(),
            });
        }

        // 與 TOML 檔案相同的來源檢查
        TomlConfig {
            sources: self.sources.clone(),
            ..TomlConfig::default()
        }
        .validate()
    }
}
