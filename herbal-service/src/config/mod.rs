use secrecy::Secret;
use service_core::config::{self as core_config, env_or, get_env, parse_env, Environment};
use service_core::error::AppError;
use std::time::Duration;

/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct HerbalConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub timeouts: TimeoutConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model used for both relevance classification and remedy generation.
    pub text_model: String,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeoutConfig {
    pub classify: Duration,
    pub generate: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl HerbalConfig {
    /// Load configuration from the environment.
    ///
    /// A missing `GOOGLE_API_KEY` is an error in every environment; the service
    /// refuses to start without it.
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let environment = Environment::from_env();

        Ok(HerbalConfig {
            common: common_config,
            environment,
            google: GoogleConfig {
                api_key: Secret::new(get_env("GOOGLE_API_KEY", None, environment)?),
                api_base: env_or("GENAI_API_BASE", DEFAULT_GEMINI_API_BASE),
            },
            models: ModelConfig {
                text_model: env_or("GENAI_TEXT_MODEL", "gemini-1.5-flash"),
            },
            timeouts: TimeoutConfig {
                classify: Duration::from_secs(parse_env("REMEDY_CLASSIFY_TIMEOUT_SECS", 10)?),
                generate: Duration::from_secs(parse_env("REMEDY_GENERATE_TIMEOUT_SECS", 30)?),
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", 100)?,
                window_seconds: parse_env("RATE_LIMIT_WINDOW_SECS", 15 * 60)?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_or("CORS_ALLOWED_ORIGINS", "")),
            },
        })
    }

    /// Diagnostics (raw upstream errors) are only returned to callers outside production.
    pub fn expose_error_details(&self) -> bool {
        !self.environment.is_production()
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch process environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_api_key_fails_load() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let saved = std::env::var("GOOGLE_API_KEY").ok();
        std::env::remove_var("GOOGLE_API_KEY");

        let result = HerbalConfig::load();

        if let Some(key) = saved {
            std::env::set_var("GOOGLE_API_KEY", key);
        }

        match result {
            Err(AppError::ConfigError(e)) => assert!(e.to_string().contains("GOOGLE_API_KEY")),
            Err(other) => panic!("expected a configuration error, got {:?}", other),
            Ok(_) => panic!("configuration loaded without GOOGLE_API_KEY"),
        }
    }

    #[test]
    fn origins_are_trimmed_and_wildcard_means_any() {
        assert_eq!(
            parse_origins(" https://a.example , https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("*").is_empty());
        assert!(parse_origins("").is_empty());
    }
}
