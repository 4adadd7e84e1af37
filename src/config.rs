use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: &str = "8080";
const DEFAULT_DEPLOY_TIMEOUT_SECS: &str = "30";
const LOCAL_FOLDER_NAME: &str = "JiraControlM";

#[derive(Debug, Clone)]
pub struct Config {
    pub service_host: String,
    pub service_port: u16,
    pub storage_dir: PathBuf,
    pub deploy: Option<DeployConfig>,
}

/// Settings for the external deployment API
#[derive(Clone)]
pub struct DeployConfig {
    pub api_url: String,
    pub api_token: String,
    pub timeout: Duration,
}

impl fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let platform_port = var("PORT");

        let service_port = var("SERVICE_PORT")
            .or_else(|| platform_port.clone())
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .context("SERVICE_PORT (or PORT) must be a valid port number (0-65535)")?;

        let service_host = var("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let storage_dir = match var("STORAGE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None if platform_port.is_some() => PathBuf::from("/app/storage"),
            None if var("RENDER").is_some() => PathBuf::from("/tmp/storage"),
            None => local_storage_dir(),
        };

        let deploy = match (var("DEPLOY_API_URL"), var("DEPLOY_API_TOKEN")) {
            (Some(api_url), Some(api_token)) => {
                reqwest::Url::parse(&api_url).context("DEPLOY_API_URL must be a valid URL")?;

                let timeout_secs = var("DEPLOY_TIMEOUT_SECS")
                    .unwrap_or_else(|| DEFAULT_DEPLOY_TIMEOUT_SECS.to_string())
                    .parse::<u64>()
                    .context("DEPLOY_TIMEOUT_SECS must be a whole number of seconds")?;

                Some(DeployConfig {
                    api_url,
                    api_token,
                    timeout: Duration::from_secs(timeout_secs),
                })
            }
            (None, None) => None,
            (Some(_), None) => {
                bail!("DEPLOY_API_TOKEN environment variable is required when DEPLOY_API_URL is set")
            }
            (None, Some(_)) => {
                bail!("DEPLOY_API_URL environment variable is required when DEPLOY_API_TOKEN is set")
            }
        };

        Ok(Config {
            service_host,
            service_port,
            storage_dir,
            deploy,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Storage directory: {}", self.storage_dir.display());
        match &self.deploy {
            Some(deploy) => {
                tracing::info!("  Deployment API: {}", deploy.api_url);
                tracing::info!("  Deployment token: configured");
                tracing::info!("  Deployment timeout: {}s", deploy.timeout.as_secs());
            }
            None => {
                tracing::info!("  Deployment API: disabled (DEPLOY_API_URL/DEPLOY_API_TOKEN not set)")
            }
        }
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
    }
}

/// Folder on the user's desktop, used when running outside a hosted container.
fn local_storage_dir() -> PathBuf {
    let desktop = directories::UserDirs::new().map(|dirs| {
        dirs.desktop_dir()
            .map(|desktop| desktop.to_path_buf())
            .unwrap_or_else(|| dirs.home_dir().join("Desktop"))
    });

    match desktop {
        Some(desktop) => desktop.join(LOCAL_FOLDER_NAME),
        None => PathBuf::from(LOCAL_FOLDER_NAME),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_with_all_vars() {
        let config = config_from(&[
            ("SERVICE_PORT", "9000"),
            ("SERVICE_HOST", "127.0.0.1"),
            ("STORAGE_DIR", "/data/json"),
            ("DEPLOY_API_URL", "https://deploy.example.com/upload"),
            ("DEPLOY_API_TOKEN", "secret-token"),
            ("DEPLOY_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.service_port, 9000);
        assert_eq!(config.service_host, "127.0.0.1");
        assert_eq!(config.storage_dir, PathBuf::from("/data/json"));

        let deploy = config.deploy.expect("deploy should be configured");
        assert_eq!(deploy.api_url, "https://deploy.example.com/upload");
        assert_eq!(deploy.api_token, "secret-token");
        assert_eq!(deploy.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_with_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.service_port, 8080);
        assert_eq!(config.service_host, "0.0.0.0");
        assert!(config.storage_dir.ends_with(LOCAL_FOLDER_NAME));
        assert!(config.deploy.is_none());
    }

    #[test]
    fn test_platform_port_selects_container_storage() {
        let config = config_from(&[("PORT", "5000")]).unwrap();

        assert_eq!(config.service_port, 5000);
        assert_eq!(config.storage_dir, PathBuf::from("/app/storage"));
    }

    #[test]
    fn test_service_port_overrides_platform_port() {
        let config = config_from(&[("PORT", "5000"), ("SERVICE_PORT", "7000")]).unwrap();

        assert_eq!(config.service_port, 7000);
    }

    #[test]
    fn test_render_selects_tmp_storage() {
        let config = config_from(&[("RENDER", "true")]).unwrap();

        assert_eq!(config.storage_dir, PathBuf::from("/tmp/storage"));
    }

    #[test]
    fn test_explicit_storage_dir_wins() {
        let config = config_from(&[("PORT", "5000"), ("STORAGE_DIR", "/srv/files")]).unwrap();

        assert_eq!(config.storage_dir, PathBuf::from("/srv/files"));
    }

    #[test]
    fn test_invalid_port() {
        let result = config_from(&[("SERVICE_PORT", "not-a-number")]);

        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(error.to_string().contains("SERVICE_PORT"));
    }

    #[test]
    fn test_port_out_of_range() {
        let result = config_from(&[("SERVICE_PORT", "99999")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_deploy_url_without_token() {
        let result = config_from(&[("DEPLOY_API_URL", "https://deploy.example.com")]);

        let error = result.unwrap_err();
        assert!(error.to_string().contains("DEPLOY_API_TOKEN"));
    }

    #[test]
    fn test_deploy_token_without_url() {
        let result = config_from(&[("DEPLOY_API_TOKEN", "secret-token")]);

        let error = result.unwrap_err();
        assert!(error.to_string().contains("DEPLOY_API_URL"));
    }

    #[test]
    fn test_invalid_deploy_url() {
        let result = config_from(&[
            ("DEPLOY_API_URL", "not a url"),
            ("DEPLOY_API_TOKEN", "secret-token"),
        ]);

        let error = result.unwrap_err();
        assert!(error.to_string().contains("DEPLOY_API_URL"));
    }

    #[test]
    fn test_empty_deploy_vars_disable_forwarding() {
        let config = config_from(&[("DEPLOY_API_URL", ""), ("DEPLOY_API_TOKEN", " ")]).unwrap();
        assert!(config.deploy.is_none());
    }

    #[test]
    fn test_invalid_deploy_timeout() {
        let result = config_from(&[
            ("DEPLOY_API_URL", "https://deploy.example.com"),
            ("DEPLOY_API_TOKEN", "secret-token"),
            ("DEPLOY_TIMEOUT_SECS", "soon"),
        ]);

        let error = result.unwrap_err();
        assert!(error.to_string().contains("DEPLOY_TIMEOUT_SECS"));
    }

    #[test]
    fn test_debug_output_hides_token() {
        let config = config_from(&[
            ("DEPLOY_API_URL", "https://deploy.example.com"),
            ("DEPLOY_API_TOKEN", "secret-token"),
        ])
        .unwrap();

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
