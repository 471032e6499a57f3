use once_cell::sync::Lazy;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Settings for the hosted media transform service. The overlay fields fix
/// the caption styling server-side; callers only control the text itself.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub base_url: String,
    pub api_key: String,
    pub max_upload_bytes: usize,
    pub overlay_font: String,
    pub overlay_color: String,
    pub overlay_gravity: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SNAPFEED_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Media store overrides
        if let Ok(v) = env::var("SNAPFEED_MEDIA_URL") {
            self.media.base_url = v;
        }
        if let Ok(v) = env::var("SNAPFEED_MEDIA_API_KEY") {
            self.media.api_key = v;
        }
        if let Ok(v) = env::var("MEDIA_MAX_UPLOAD_BYTES") {
            self.media.max_upload_bytes = v.parse().unwrap_or(self.media.max_upload_bytes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            security: SecurityConfig {
                jwt_secret: "snapfeed-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            media: MediaConfig {
                base_url: "http://localhost:9500".to_string(),
                api_key: String::new(),
                max_upload_bytes: 25 * 1024 * 1024, // 25MB
                overlay_font: "Helvetica_32_bold".to_string(),
                overlay_color: "white".to_string(),
                overlay_gravity: "south".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connect_timeout_secs: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from SNAPFEED_JWT_SECRET
                jwt_expiry_hours: 24,
            },
            media: MediaConfig {
                base_url: "https://media.staging.snapfeed.internal".to_string(),
                api_key: String::new(),
                max_upload_bytes: 25 * 1024 * 1024, // 25MB
                overlay_font: "Helvetica_32_bold".to_string(),
                overlay_color: "white".to_string(),
                overlay_gravity: "south".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connect_timeout_secs: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from SNAPFEED_JWT_SECRET
                jwt_expiry_hours: 4,
            },
            media: MediaConfig {
                base_url: "https://media.snapfeed.internal".to_string(),
                api_key: String::new(),
                max_upload_bytes: 50 * 1024 * 1024, // 50MB for short videos
                overlay_font: "Helvetica_32_bold".to_string(),
                overlay_color: "white".to_string(),
                overlay_gravity: "south".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.jwt_secret, "snapfeed-dev-secret");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.media.max_upload_bytes, 25 * 1024 * 1024);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        // Production never ships a baked-in signing secret
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert_eq!(config.database.max_connections, 50);
    }
}
