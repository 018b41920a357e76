//! Configuration management for f2read
//!
//! Effective options come from three layers, highest precedence first:
//! command-line flags, the TOML config file, built-in defaults.
//! Location: `F2READ-config.toml` in the working directory.

use crate::completion::ResponseMode;
use crate::errors::{F2ReadError, Result};
use crate::streaming::client::DEFAULT_BASE_URL;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "F2READ-config.toml";

/// Default model
pub const DEFAULT_MODEL: &str = "gemma2:2b";

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "README.md";

/// Default source root, relative to the working directory
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Values read from the config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub model: Option<String>,
    pub output: Option<String>,
    pub stream: Option<bool>,
    pub token_usage: Option<bool>,
    pub base_url: Option<String>,
    pub source_root: Option<String>,
}

impl ConfigFile {
    /// Well-known config location for a working directory
    pub fn default_path(working_dir: &Path) -> PathBuf {
        working_dir.join(CONFIG_FILE_NAME)
    }

    /// Load the config file, degrading to an empty config on any problem
    pub async fn load(path: &Path) -> Self {
        match Self::load_from_file(path).await {
            Ok(config) if config.is_empty() => {
                tracing::warn!(
                    "Configuration file {} is empty. Continuing with default options.",
                    path.display()
                );
                config
            }
            Ok(config) => {
                tracing::info!("Configuration loaded from {}", path.display());
                config
            }
            Err(F2ReadError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    "No configuration file found at {}. Continuing with default options.",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Could not use configuration file {}: {}. Continuing with default options.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load configuration from specific file
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    /// Parse a TOML document; keys are extracted independently
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table: Table = toml::from_str(contents)
            .map_err(|e| F2ReadError::ConfigError(format!("Failed to parse config: {}", e)))?;

        Ok(Self::from_table(&table))
    }

    fn from_table(table: &Table) -> Self {
        Self {
            model: string_field(table, "model"),
            output: string_field(table, "output"),
            stream: bool_field(table, "stream"),
            token_usage: bool_field(table, "tokenUsage"),
            base_url: string_field(table, "baseUrl"),
            source_root: string_field(table, "sourceRoot"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn string_field(table: &Table, key: &str) -> Option<String> {
    match table.get(key)? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => {
            tracing::warn!(key, found = other.type_str(), "Ignoring config value: expected a string");
            None
        }
    }
}

fn bool_field(table: &Table, key: &str) -> Option<bool> {
    match table.get(key)? {
        Value::Boolean(b) => Some(*b),
        other => {
            tracing::warn!(key, found = other.type_str(), "Ignoring config value: expected a boolean");
            None
        }
    }
}

/// Options given explicitly on the command line; `None` means "not given"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationFlags {
    pub model: Option<String>,
    pub output: Option<String>,
    pub stream: Option<bool>,
    pub token_usage: Option<bool>,
    pub base_url: Option<String>,
    pub source_root: Option<String>,
}

/// Merged options for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOptions {
    pub model: String,
    pub output_name: String,
    pub stream: bool,
    pub report_token_usage: bool,
    pub base_url: String,
    pub source_root: String,
}

impl Default for EffectiveOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            output_name: DEFAULT_OUTPUT.to_string(),
            stream: false,
            report_token_usage: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
        }
    }
}

impl EffectiveOptions {
    /// Merge flags over config file over defaults, field by field
    pub fn resolve(flags: &InvocationFlags, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        let options = Self {
            model: pick(&flags.model, &file.model, defaults.model),
            output_name: pick(&flags.output, &file.output, defaults.output_name),
            stream: pick(&flags.stream, &file.stream, defaults.stream),
            report_token_usage: pick(&flags.token_usage, &file.token_usage, defaults.report_token_usage),
            base_url: pick(&flags.base_url, &file.base_url, defaults.base_url),
            source_root: pick(&flags.source_root, &file.source_root, defaults.source_root),
        };

        tracing::debug!(?options, "Effective options");
        options
    }

    pub fn response_mode(&self) -> ResponseMode {
        ResponseMode::from_stream_flag(self.stream)
    }
}

fn pick<T: Clone>(flag: &Option<T>, file: &Option<T>, default: T) -> T {
    flag.clone().or_else(|| file.clone()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (buffer, guard)
    }

    fn full_file() -> ConfigFile {
        ConfigFile::from_toml_str(
            r#"
            model = "llama3.1:8b"
            output = "DOCS.md"
            stream = true
            tokenUsage = true
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_all_keys() {
        let file = full_file();
        assert_eq!(file.model.as_deref(), Some("llama3.1:8b"));
        assert_eq!(file.output.as_deref(), Some("DOCS.md"));
        assert_eq!(file.stream, Some(true));
        assert_eq!(file.token_usage, Some(true));
        assert_eq!(file.base_url, None);
    }

    #[test]
    fn test_garbled_field_does_not_poison_others() {
        let file = ConfigFile::from_toml_str(
            r#"
            model = 42
            output = "DOCS.md"
            stream = "yes"
            tokenUsage = true
            "#,
        )
        .unwrap();

        assert_eq!(file.model, None);
        assert_eq!(file.stream, None);
        assert_eq!(file.output.as_deref(), Some("DOCS.md"));
        assert_eq!(file.token_usage, Some(true));

        let options = EffectiveOptions::resolve(&InvocationFlags::default(), &file);
        assert_eq!(options.model, DEFAULT_MODEL);
        assert!(!options.stream);
        assert_eq!(options.output_name, "DOCS.md");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = ConfigFile::from_toml_str("model = ");
        assert!(matches!(result, Err(F2ReadError::ConfigError(_))));
    }

    #[test]
    fn test_empty_document_is_empty_config() {
        assert!(ConfigFile::from_toml_str("").unwrap().is_empty());
        assert!(ConfigFile::from_toml_str("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_precedence_flag_then_file_then_default() {
        let file = full_file();
        let flags = InvocationFlags {
            model: Some("qwen2.5:7b".to_string()),
            output: Some("API.md".to_string()),
            ..InvocationFlags::default()
        };

        let options = EffectiveOptions::resolve(&flags, &file);
        assert_eq!(options.model, "qwen2.5:7b");
        assert_eq!(options.output_name, "API.md");

        let options = EffectiveOptions::resolve(&InvocationFlags::default(), &file);
        assert_eq!(options.model, "llama3.1:8b");
        assert_eq!(options.output_name, "DOCS.md");
        assert!(options.stream);
        assert!(options.report_token_usage);

        let options = EffectiveOptions::resolve(&InvocationFlags::default(), &ConfigFile::default());
        assert_eq!(options, EffectiveOptions::default());
    }

    #[test]
    fn test_defaults() {
        let options = EffectiveOptions::default();
        assert_eq!(options.model, DEFAULT_MODEL);
        assert_eq!(options.output_name, "README.md");
        assert!(!options.stream);
        assert!(!options.report_token_usage);
        assert_eq!(options.response_mode(), ResponseMode::Buffered);
    }

    #[tokio::test]
    async fn test_missing_file_warns_with_path() {
        let (logs, _guard) = capture_logs();
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigFile::default_path(temp_dir.path());

        let file = ConfigFile::load(&path).await;

        assert!(file.is_empty());
        let options = EffectiveOptions::resolve(&InvocationFlags::default(), &file);
        assert_eq!(options, EffectiveOptions::default());

        let output = logs.contents();
        assert!(output.contains("WARN"));
        assert!(output.contains(&format!(
            "No configuration file found at {}",
            path.display()
        )));
    }

    #[tokio::test]
    async fn test_unparsable_file_degrades_to_defaults() {
        let (logs, _guard) = capture_logs();
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigFile::default_path(temp_dir.path());
        std::fs::write(&path, "this is [not toml").unwrap();

        let file = ConfigFile::load(&path).await;

        assert!(file.is_empty());
        assert!(logs.contents().contains("Could not use configuration file"));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_not_reported_missing() {
        let (logs, _guard) = capture_logs();
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigFile::default_path(temp_dir.path());
        std::fs::write(&path, [0xff, 0xfe, b'=', 0x00]).unwrap();

        let file = ConfigFile::load(&path).await;

        assert!(file.is_empty());
        let output = logs.contents();
        assert!(output.contains("Could not use configuration file"));
        assert!(!output.contains("No configuration file found"));
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigFile::default_path(temp_dir.path());
        std::fs::write(&path, "model = \"gemma2:9b\"\nstream = true\n").unwrap();

        let file = ConfigFile::load(&path).await;
        assert_eq!(file.model.as_deref(), Some("gemma2:9b"));
        assert_eq!(file.stream, Some(true));
    }
}
