use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

const DEFAULT_API_KEY_VAR: &str = "GEMINI_API_KEY";
const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    /// OTLP collector endpoint; traces are only exported when set.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Name of the environment variable holding the API key. The key itself
    /// is read per request, never stored here.
    pub api_key_var: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";

        let api_key_var = get_var(&lookup, "GEMINI_API_KEY_VAR", Some(DEFAULT_API_KEY_VAR))?;

        // In production a missing key is a deployment mistake, surface it at startup.
        if is_prod && lookup(&api_key_var).filter(|k| !k.is_empty()).is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required in production but not set",
                api_key_var
            )));
        }

        let timeout_secs = get_var(
            &lookup,
            "GEMINI_TIMEOUT_SECS",
            Some(&DEFAULT_TIMEOUT_SECS.to_string()),
        )?
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("GEMINI_TIMEOUT_SECS: {}", e)))?;

        Ok(ChatConfig {
            common,
            gemini: GeminiSettings {
                api_key_var,
                model: get_var(&lookup, "GEMINI_MODEL", Some(DEFAULT_MODEL))?,
                base_url: get_var(&lookup, "GEMINI_API_BASE", Some(DEFAULT_API_BASE))?
                    .trim_end_matches('/')
                    .to_string(),
                timeout_secs,
            },
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|e| !e.is_empty()),
        })
    }
}

fn get_var<F>(lookup: &F, key: &str, default: Option<&str>) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => default.map(str::to_string).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn common() -> core_config::Config {
        core_config::Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "info".to_string(),
        }
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ChatConfig::from_lookup(common(), lookup_from(&[])).unwrap();

        assert_eq!(config.gemini.api_key_var, "GEMINI_API_KEY");
        assert_eq!(config.gemini.model, "gemini-1.5-pro-latest");
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.gemini.timeout(), Duration::from_secs(120));
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ChatConfig::from_lookup(
            common(),
            lookup_from(&[
                ("GEMINI_MODEL", "gemini-2.0-flash"),
                ("GEMINI_API_BASE", "http://localhost:9999/v1beta/"),
                ("GEMINI_TIMEOUT_SECS", "5"),
                ("OTLP_ENDPOINT", "http://tempo:4317"),
            ]),
        )
        .unwrap();

        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.base_url, "http://localhost:9999/v1beta");
        assert_eq!(config.gemini.timeout_secs, 5);
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://tempo:4317"));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = ChatConfig::from_lookup(
            common(),
            lookup_from(&[("GEMINI_TIMEOUT_SECS", "soon")]),
        );
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_prod_requires_api_key() {
        let result = ChatConfig::from_lookup(common(), lookup_from(&[("ENVIRONMENT", "prod")]));
        assert!(matches!(result, Err(AppError::ConfigError(_))));

        let config = ChatConfig::from_lookup(
            common(),
            lookup_from(&[("ENVIRONMENT", "prod"), ("GEMINI_API_KEY", "k")]),
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_dev_tolerates_missing_api_key() {
        let config = ChatConfig::from_lookup(common(), lookup_from(&[("ENVIRONMENT", "dev")]));
        assert!(config.is_ok());
    }
}
