//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `ORDER_INTAKE_CONFIG`
//! environment variable. A missing file is not an error; every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **GOOGLE_SHEETS_URL** - Legacy variable, sets `webhook.url`
//! 3. **Environment variables** - Variables prefixed with `ORDER_INTAKE_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `ORDER_INTAKE_STORAGE__TYPE=s3` sets the `storage.type` field.
//!
//! ## Example
//!
//! ```yaml
//! host: 0.0.0.0
//! port: 3000
//! max_upload_size: 52428800
//! storage:
//!   type: s3
//!   bucket: order-files
//!   endpoint_url: https://<account>.r2.cloudflarestorage.com
//!   region: auto
//! webhook:
//!   url: https://script.google.com/macros/s/<id>/exec
//!   timeout_secs: 30
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! ORDER_INTAKE_PORT=8080
//! ORDER_INTAKE_STORAGE__TYPE=filesystem
//! ORDER_INTAKE_STORAGE__ROOT=/var/lib/order-intake
//! ORDER_INTAKE_WEBHOOK__URL="https://script.google.com/macros/s/<id>/exec"
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "ORDER_INTAKE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Largest accepted request body for `POST /upload`, in bytes
    pub max_upload_size: usize,
    /// Object store that receives uploaded files.
    ///
    /// Optional at startup so the process can come up without it; uploads fail with a 500 until
    /// it is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
    /// Spreadsheet webhook that receives each order record
    pub webhook: WebhookConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_size: 50 * 1024 * 1024,
            storage: None,
            webhook: WebhookConfig::default(),
            enable_otel_export: false,
        }
    }
}

/// Object storage backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// AWS S3 or an S3-compatible service such as Cloudflare R2 or MinIO
    S3 {
        bucket: String,
        /// Region name; falls back to the AWS provider chain when unset
        #[serde(default, skip_serializing_if = "Option::is_none")]
        region: Option<String>,
        /// Custom endpoint for S3-compatible services
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint_url: Option<Url>,
        /// Use `<endpoint>/<bucket>/<key>` addressing (required by MinIO)
        #[serde(default)]
        force_path_style: bool,
    },
    /// Local directory
    Filesystem { root: PathBuf },
    /// Process memory; contents are lost on restart
    Memory,
}

/// Spreadsheet webhook configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebhookConfig {
    /// Endpoint to POST order records to. When unset, forwarding is skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    /// HTTP timeout for the webhook call in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_upload_size == 0 {
            anyhow::bail!("Config validation: max_upload_size must be greater than zero");
        }

        match &self.storage {
            Some(StorageConfig::S3 { bucket, .. }) if bucket.trim().is_empty() => {
                anyhow::bail!("Config validation: storage.bucket must not be empty");
            }
            Some(StorageConfig::Filesystem { root }) if root.as_os_str().is_empty() => {
                anyhow::bail!("Config validation: storage.root must not be empty");
            }
            _ => {}
        }

        if let Some(url) = &self.webhook.url
            && !matches!(url.scheme(), "http" | "https")
        {
            anyhow::bail!("Config validation: webhook.url must be an http(s) URL, got scheme '{}'", url.scheme());
        }

        if self.webhook.timeout_secs == 0 {
            anyhow::bail!("Config validation: webhook.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Legacy variable name from earlier deployments
            .merge(Env::raw().only(&["GOOGLE_SHEETS_URL"]).map(|_| "webhook.url".into()))
            // Prefixed variables win over everything else
            .merge(Env::prefixed("ORDER_INTAKE_").ignore(&["CONFIG"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args() -> Args {
        Args {
            config: "test.yaml".to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args())?;

            assert_eq!(config.bind_address(), "0.0.0.0:3000");
            assert_eq!(config.max_upload_size, 50 * 1024 * 1024);
            assert!(config.storage.is_none());
            assert!(config.webhook.url.is_none());
            assert_eq!(config.webhook.timeout_secs, 30);
            Ok(())
        });
    }

    #[test]
    fn test_s3_storage_from_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
storage:
  type: s3
  bucket: order-files
  region: auto
  endpoint_url: https://account.r2.cloudflarestorage.com
webhook:
  url: https://script.google.com/macros/s/abc/exec
  timeout_secs: 10
"#,
            )?;

            let config = Config::load(&args())?;

            assert_eq!(
                config.storage,
                Some(StorageConfig::S3 {
                    bucket: "order-files".to_string(),
                    region: Some("auto".to_string()),
                    endpoint_url: Some("https://account.r2.cloudflarestorage.com".parse().unwrap()),
                    force_path_style: false,
                })
            );
            assert_eq!(
                config.webhook.url.as_ref().map(Url::as_str),
                Some("https://script.google.com/macros/s/abc/exec")
            );
            assert_eq!(config.webhook.timeout_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 3000
storage:
  type: memory
"#,
            )?;

            jail.set_env("ORDER_INTAKE_PORT", "8080");
            jail.set_env("ORDER_INTAKE_STORAGE__TYPE", "filesystem");
            jail.set_env("ORDER_INTAKE_STORAGE__ROOT", "/tmp/orders");

            let config = Config::load(&args())?;

            assert_eq!(config.port, 8080);
            assert_eq!(
                config.storage,
                Some(StorageConfig::Filesystem {
                    root: PathBuf::from("/tmp/orders")
                })
            );
            Ok(())
        });
    }

    #[test]
    fn test_legacy_sheets_url_variable() {
        Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_SHEETS_URL", "https://sheets.example.com/hook");

            let config = Config::load(&args())?;
            assert_eq!(
                config.webhook.url.as_ref().map(Url::as_str),
                Some("https://sheets.example.com/hook")
            );

            jail.set_env("ORDER_INTAKE_WEBHOOK__URL", "https://override.example.com/hook");
            let config = Config::load(&args())?;
            assert_eq!(
                config.webhook.url.as_ref().map(Url::as_str),
                Some("https://override.example.com/hook")
            );
            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_empty_bucket() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
storage:
  type: s3
  bucket: ""
"#,
            )?;

            let err = Config::load(&args()).unwrap_err();
            assert!(err.to_string().contains("storage.bucket"));
            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_non_http_webhook() {
        let config = Config {
            webhook: WebhookConfig {
                url: Some("ftp://example.com/hook".parse().unwrap()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "database_url: postgres://nope\n")?;
            assert!(Config::load(&args()).is_err());
            Ok(())
        });
    }
}
