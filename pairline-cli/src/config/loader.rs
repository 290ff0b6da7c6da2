use super::types::{
    AdapterConfig, DEFAULT_HOST, DEFAULT_PORT, PairlineConfig, RawAdapterConfig,
    RawPairlineConfig, RawServerConfig, ServerConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "PORT";
/// Environment variable overriding `adapter.url`
pub const BRIDGE_URL_ENV: &str = "PAIRLINE_BRIDGE_URL";
/// Environment variable relocating the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "PAIRLINE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user, project, then environment)
    pub fn load() -> Result<PairlineConfig> {
        let mut raw = RawPairlineConfig::default();

        // Layer 1: User config
        let user_path = Self::user_config_path();
        if let Some(user_config) = Self::read_raw(&user_path)? {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if let Some(project_config) = Self::read_raw(&project_path)? {
            raw = Self::merge_raw(raw, project_config);
        }

        // Layer 3: Environment
        let raw = Self::apply_env(raw, |key| std::env::var(key).ok())?;

        Ok(Self::finalize(raw))
    }

    /// Get user config path (`<config_dir>/config.toml`)
    pub fn user_config_path() -> PathBuf {
        pairline_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with PAIRLINE_PROJECT_CONFIG_DIR (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".pairline/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<Option<RawPairlineConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawPairlineConfig, overlay: RawPairlineConfig) -> RawPairlineConfig {
        RawPairlineConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            adapter: RawAdapterConfig {
                url: overlay.adapter.url.or(base.adapter.url),
                api_key: overlay.adapter.api_key.or(base.adapter.api_key),
                client_id: overlay.adapter.client_id.or(base.adapter.client_id),
                headless: overlay.adapter.headless.or(base.adapter.headless),
                browser_args: overlay.adapter.browser_args.or(base.adapter.browser_args),
                data_path: overlay.adapter.data_path.or(base.adapter.data_path),
                send_timeout_secs: overlay
                    .adapter
                    .send_timeout_secs
                    .or(base.adapter.send_timeout_secs),
                identity_timeout_secs: overlay
                    .adapter
                    .identity_timeout_secs
                    .or(base.adapter.identity_timeout_secs),
            },
        }
    }

    /// Overlay `PORT` and `PAIRLINE_BRIDGE_URL` from `lookup`
    fn apply_env<F>(mut raw: RawPairlineConfig, lookup: F) -> Result<RawPairlineConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            let port = port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid {} value '{}'", PORT_ENV, port))?;
            raw.server.port = Some(port);
        }
        if let Some(url) = lookup(BRIDGE_URL_ENV) {
            if !url.trim().is_empty() {
                raw.adapter.url = Some(url);
            }
        }
        Ok(raw)
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawPairlineConfig) -> PairlineConfig {
        let defaults = AdapterConfig::default();
        PairlineConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            adapter: AdapterConfig {
                url: raw.adapter.url.unwrap_or(defaults.url),
                api_key: raw.adapter.api_key,
                client_id: raw.adapter.client_id.unwrap_or(defaults.client_id),
                headless: raw.adapter.headless.unwrap_or(defaults.headless),
                browser_args: raw.adapter.browser_args.unwrap_or(defaults.browser_args),
                data_path: raw.adapter.data_path,
                send_timeout_secs: raw.adapter.send_timeout_secs,
                identity_timeout_secs: raw.adapter.identity_timeout_secs,
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<PairlineConfig> {
        let raw = Self::read_raw(path)?.unwrap_or_default();
        Ok(Self::finalize(raw))
    }
}
