/// Configuration management for the CMS service
///
/// This module handles loading and managing configuration from
/// environment variables.
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Public file storage configuration
    pub storage: StorageConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (dev, staging, prod)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Public file storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the public disk
    pub root: String,
    /// Base URL the public tier serves stored files from
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("CMS_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("CMS_SERVICE_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/quill".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            storage: StorageConfig {
                root: std::env::var("STORAGE_ROOT")
                    .unwrap_or_else(|_| "storage/public".to_string()),
                base_url: std::env::var("STORAGE_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/storage".to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for key in [
            "APP_ENV",
            "CMS_SERVICE_HOST",
            "CMS_SERVICE_PORT",
            "CORS_ALLOWED_ORIGINS",
            "DATABASE_URL",
            "DATABASE_MAX_CONNECTIONS",
            "STORAGE_ROOT",
            "STORAGE_BASE_URL",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.cors.allowed_origins, "http://localhost:3000");
        assert_eq!(config.storage.root, "storage/public");
    }

    #[test]
    #[serial_test::serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("CMS_SERVICE_PORT", "9090");
        std::env::set_var("STORAGE_ROOT", "/var/quill/public");

        let config = Config::from_env().unwrap();
        assert_eq!(config.app.port, 9090);
        assert_eq!(config.storage.root, "/var/quill/public");

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_production_requires_cors_origins() {
        clear_env();
        std::env::set_var("APP_ENV", "production");

        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        assert!(Config::from_env().is_err());

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://quill.dev");
        assert!(Config::from_env().is_ok());

        clear_env();
    }
}
