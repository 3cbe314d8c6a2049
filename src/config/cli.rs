use super::toml_config::TomlConfig;
use super::LookupConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "sa-phone-recon")]
#[command(about = "Look up public information about a South African mobile number")]
pub struct CliConfig {
    /// Number to investigate, e.g. 0821234567 or +27821234567 (prompted when omitted)
    pub phone: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the JSON report is written to
    #[arg(short, long)]
    pub output_path: Option<String>,

    /// Per-source deadline in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Per-request HTTP timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Worker pool size (defaults to one per source)
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Only query these sources
    #[arg(long, value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Print results without writing the report file
    #[arg(long)]
    pub no_save: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the TOML file if given and lets flags override it.
    pub fn resolve(&self) -> Result<LookupConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate_config()?;
                LookupConfig::from_toml(file)
            }
            None => LookupConfig::default(),
        };

        if let Some(path) = &self.output_path {
            config.output_path = path.clone();
        }
        if let Some(secs) = self.timeout {
            config.source_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        if self.max_workers.is_some() {
            config.max_workers = self.max_workers;
        }
        if self.no_save {
            config.save = false;
        }
        config.select_sources(&self.sources)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_args() {
        let cli = CliConfig::parse_from([
            "sa-phone-recon",
            "0821234567",
            "--timeout",
            "10",
            "--sources",
            "google,whatsapp",
            "--no-save",
        ]);

        assert_eq!(cli.phone.as_deref(), Some("0821234567"));
        assert_eq!(cli.timeout, Some(10));
        assert_eq!(cli.sources, vec!["google", "whatsapp"]);
        assert!(cli.no_save);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_flags_override_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[lookup]\ntimeout_seconds = 5\nmax_workers = 1\n\n[output]\noutput_path = \"./file-out\"\n")
            .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "sa-phone-recon",
            "--config",
            path.as_str(),
            "--timeout",
            "12",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.source_timeout, Duration::from_secs(12));
        assert_eq!(config.max_workers, Some(1));
        assert_eq!(config.output_path, "./file-out");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_source_flag_fails() {
        let cli = CliConfig::parse_from(["sa-phone-recon", "--sources", "myspace"]);
        assert!(cli.resolve().is_err());
    }
}
