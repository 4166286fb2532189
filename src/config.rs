/// Server configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Database URL (e.g., "sqlite://data/adpanel.db")
    pub database_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite://data/adpanel.db".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults on missing or invalid values.
    pub fn from_env() -> ServerConfig {
        let mut config = ServerConfig::default();

        if let Ok(host) = std::env::var("HOST") {
            if !host.trim().is_empty() {
                config.host = host;
            }
        }

        if let Ok(port) = std::env::var("PORT") {
            match port.parse::<u16>() {
                Ok(value) if value > 0 => config.port = value,
                _ => {
                    tracing::warn!(
                        "Invalid PORT value '{}', using default: {}",
                        port,
                        config.port
                    );
                }
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                config.database_url = url;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "sqlite://data/adpanel.db");
    }
}
