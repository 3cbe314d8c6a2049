use crate::adapters::sources::SourceKind;
use crate::utils::error::{ReconError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub lookup: LookupSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupSection {
    pub timeout_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
    pub max_workers: Option<usize>,
    pub user_agents: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    pub output_path: Option<String>,
    pub save: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub kind: SourceKind,
    /// 報告中的鍵名，預設與 kind 相同
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl SourceEntry {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            name: None,
            enabled: None,
            base_url: None,
            timeout_seconds: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReconError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReconError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TRUECALLER_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::{Captures, Regex};
        use std::sync::LazyLock;

        static ENV_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env regex"));

        ENV_RE
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(timeout) = self.lookup.timeout_seconds {
            validation::validate_positive_number("lookup.timeout_seconds", timeout, 1)?;
        }
        if let Some(timeout) = self.lookup.request_timeout_seconds {
            validation::validate_positive_number("lookup.request_timeout_seconds", timeout, 1)?;
        }
        if let Some(workers) = self.lookup.max_workers {
            validation::validate_positive_number("lookup.max_workers", workers as u64, 1)?;
        }
        for user_agent in self.lookup.user_agents.iter().flatten() {
            validation::validate_non_empty_string("lookup.user_agents", user_agent)?;
        }
        if let Some(path) = &self.output.output_path {
            validation::validate_path("output.output_path", path)?;
        }

        for entry in &self.sources {
            validation::validate_non_empty_string("sources.name", entry.name())?;
            if let Some(base_url) = &entry.base_url {
                validation::validate_url(&format!("sources.{}.base_url", entry.name()), base_url)?;
            }
            if let Some(timeout) = entry.timeout_seconds {
                validation::validate_positive_number(
                    &format!("sources.{}.timeout_seconds", entry.name()),
                    timeout,
                    1,
                )?;
            }
        }
        validation::validate_unique_names("sources", self.sources.iter().map(SourceEntry::name))?;

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[lookup]
timeout_seconds = 20
request_timeout_seconds = 10
max_workers = 2
user_agents = ["recon-test/1.0", "recon-test/2.0"]

[output]
output_path = "./reports"
save = false

[[sources]]
kind = "truecaller"
base_url = "https://mirror.example.com"
timeout_seconds = 5

[[sources]]
kind = "google"
enabled = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.lookup.timeout_seconds, Some(20));
        assert_eq!(config.lookup.max_workers, Some(2));
        assert_eq!(config.output.save, Some(false));
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].kind, SourceKind::Truecaller);
        assert_eq!(config.sources[0].name(), "truecaller");
        assert!(config.sources[0].is_enabled());
        assert!(!config.sources[1].is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.sources.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_source_kind_is_rejected() {
        let result = TomlConfig::from_toml_str("[[sources]]\nkind = \"myspace\"\n");
        assert!(matches!(
            result,
            Err(ReconError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RECON_TEST_GOOGLE_URL", "https://search.example.com");

        let toml_content = r#"
[[sources]]
kind = "google"
base_url = "${RECON_TEST_GOOGLE_URL}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.sources[0].base_url.as_deref(),
            Some("https://search.example.com")
        );

        std::env::remove_var("RECON_TEST_GOOGLE_URL");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = r#"
[[sources]]
kind = "facebook"
base_url = "invalid-url"
"#;
        assert!(TomlConfig::from_toml_str(invalid_url).unwrap().validate().is_err());

        let zero_timeout = "[lookup]\ntimeout_seconds = 0\n";
        assert!(TomlConfig::from_toml_str(zero_timeout).unwrap().validate().is_err());

        let duplicate_names = r#"
[[sources]]
kind = "google"

[[sources]]
kind = "google"
"#;
        assert!(TomlConfig::from_toml_str(duplicate_names).unwrap().validate().is_err());

        let renamed = r#"
[[sources]]
kind = "google"

[[sources]]
kind = "google"
name = "google-mirror"
base_url = "http://localhost:9000"
"#;
        assert!(TomlConfig::from_toml_str(renamed).unwrap().validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\noutput_path = \"./from-file\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.output_path.as_deref(), Some("./from-file"));
    }
}
