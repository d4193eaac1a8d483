//! Runtime configuration read from the environment (`.env` is loaded by `main`)

use std::time::Duration;

use crate::utils::ViewerError;

pub const DEFAULT_REFRESH_SECS: u64 = 60;
pub const DEFAULT_CHART_WIDTH: u32 = 1024;
pub const DEFAULT_CHART_HEIGHT: u32 = 512;
pub const DEFAULT_COOLDOWN_SECS: u64 = 5;
pub const DEFAULT_CHART_TIMEOUT_SECS: u64 = 15;

/// Where market data comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayKind {
    Mock,
    Http { base_url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub refresh_interval: Duration,
    pub chart_width: u32,
    pub chart_height: u32,
    pub gateway: GatewayKind,
    pub gateway_token: Option<String>,
    pub command_cooldown: Duration,
    pub chart_timeout: Duration,
    pub mock_latency: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
            gateway: GatewayKind::Mock,
            gateway_token: None,
            command_cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            chart_timeout: Duration::from_secs(DEFAULT_CHART_TIMEOUT_SECS),
            mock_latency: Duration::ZERO,
        }
    }
}

impl ViewerConfig {
    pub fn from_env() -> Result<Self, ViewerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ViewerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let refresh_secs = parse_or(&lookup, "VIEWER_REFRESH_SECS", DEFAULT_REFRESH_SECS)?;
        if refresh_secs == 0 {
            return Err(ViewerError::Config("VIEWER_REFRESH_SECS must be greater than 0".to_string()));
        }

        let chart_width = parse_or(&lookup, "VIEWER_CHART_WIDTH", defaults.chart_width)?;
        let chart_height = parse_or(&lookup, "VIEWER_CHART_HEIGHT", defaults.chart_height)?;
        if chart_width < 64 || chart_height < 64 {
            return Err(ViewerError::Config(format!(
                "chart surface {}x{} is too small (minimum 64x64)",
                chart_width, chart_height
            )));
        }

        let gateway = match lookup("VIEWER_GATEWAY").as_deref().map(str::trim) {
            None | Some("") | Some("mock") => GatewayKind::Mock,
            Some("http") => {
                let base_url = lookup("VIEWER_GATEWAY_URL")
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| ViewerError::Config("VIEWER_GATEWAY_URL is required for the http gateway".to_string()))?;
                GatewayKind::Http { base_url }
            }
            Some(other) => {
                return Err(ViewerError::Config(format!(
                    "unknown VIEWER_GATEWAY '{}' (expected mock or http)",
                    other
                )))
            }
        };

        Ok(Self {
            refresh_interval: Duration::from_secs(refresh_secs),
            chart_width,
            chart_height,
            gateway,
            gateway_token: lookup("VIEWER_GATEWAY_TOKEN").filter(|t| !t.is_empty()),
            command_cooldown: Duration::from_secs(parse_or(&lookup, "VIEWER_COMMAND_COOLDOWN_SECS", DEFAULT_COOLDOWN_SECS)?),
            chart_timeout: Duration::from_secs(parse_or(&lookup, "VIEWER_CHART_TIMEOUT_SECS", DEFAULT_CHART_TIMEOUT_SECS)?),
            mock_latency: Duration::from_millis(parse_or(&lookup, "VIEWER_MOCK_LATENCY_MS", 0)?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ViewerError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ViewerError::Config(format!("{} has invalid value '{}'", key, raw))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ViewerConfig, ViewerError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ViewerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_http_gateway_requires_url() {
        assert!(config_from(&[("VIEWER_GATEWAY", "http")]).is_err());
        let config = config_from(&[
            ("VIEWER_GATEWAY", "http"),
            ("VIEWER_GATEWAY_URL", "http://quotes.local"),
        ])
        .unwrap();
        assert_eq!(
            config.gateway,
            GatewayKind::Http {
                base_url: "http://quotes.local".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(config_from(&[("VIEWER_REFRESH_SECS", "soon")]).is_err());
        assert!(config_from(&[("VIEWER_REFRESH_SECS", "0")]).is_err());
        assert!(config_from(&[("VIEWER_CHART_WIDTH", "10")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("VIEWER_REFRESH_SECS", "30"),
            ("VIEWER_MOCK_LATENCY_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.mock_latency, Duration::from_millis(250));
    }
}
