use std::fmt;

/// Deployment flavour; decides log format and default verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Logging settings, read separately from the app config so logging is up
/// before configuration errors need reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub environment: Environment,
    pub level: String,
    pub dir: String,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development);
        let level = lookup("LOG_LEVEL").unwrap_or_else(|| match environment {
            Environment::Production => "info".to_string(),
            Environment::Development => "debug".to_string(),
        });

        Self {
            environment,
            level,
            dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> String {
        format!(
            "artist_portfolio_api={},tower_http=debug,axum=debug,sqlx=warn",
            self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_verbose_development() {
        let config = LogConfig::from_lookup(|_| None);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.level, "debug");
        assert_eq!(config.dir, "logs");
        assert!(config.default_directive().starts_with("artist_portfolio_api=debug"));
    }

    #[test]
    fn test_production_defaults_to_info() {
        let config = LogConfig::from_lookup(|name| (name == "ENVIRONMENT").then(|| "Production".to_string()));
        assert!(config.is_production());
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_explicit_level_wins() {
        let config = LogConfig::from_lookup(|name| match name {
            "ENVIRONMENT" => Some("production".into()),
            "LOG_LEVEL" => Some("trace".into()),
            _ => None,
        });
        assert_eq!(config.level, "trace");
        assert_eq!(config.environment.to_string(), "production");
    }
}
