use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration loaded from YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on the handling time of a single request
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt: JwtSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    /// HS256 shared secret. Requests needing a principal fail with 500 while unset.
    pub secret: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub database: String,
    pub audit_db: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    /// HTTP mail relay accepting `{from, to, subject, html}` as JSON
    pub relay_url: Option<String>,
    pub from: String,
    /// Sent as `X-Api-Key` when set
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Approve/Reject report a failed notification as 502 instead of only logging it
    pub strict_decisions: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database: "infocare.sqlite".to_string(),
            audit_db: "audit.sqlite".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            relay_url: None,
            from: "InfoCare <no-reply@infocare.local>".to_string(),
            api_key: None,
            timeout_secs: 10,
            strict_decisions: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = if let Some(path) = config_path {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };

        if let Ok(port) = std::env::var("INFOCARE_PORT")
            && let Ok(port_num) = port.parse()
        {
            config.server.port = port_num;
        }

        if let Ok(host) = std::env::var("INFOCARE_HOST") {
            config.server.host = host;
        }

        if let Ok(data_dir) = std::env::var("INFOCARE_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Some(secret) = std::env::var("INFOCARE_JWT_SECRET")
            .or_else(|_| std::env::var("JWT_SECRET"))
            .ok()
            .filter(|s| !s.is_empty())
        {
            config.auth.jwt.secret = Some(secret);
        }

        if let Ok(relay_url) = std::env::var("INFOCARE_MAIL_RELAY_URL") {
            config.notifications.relay_url = Some(relay_url);
            config.notifications.enabled = true;
        }

        Ok(config)
    }

    /// Get the full path to the ward records database
    pub fn database_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.database)
    }

    /// Get the full path to the audit database
    pub fn audit_db_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.audit_db)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Reject settings the server cannot honour.
    ///
    /// A strict decision waits for the relay inside the request, so the relay
    /// must give up before the request timeout fires.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.request_timeout_secs == 0 {
            return Err("server.request_timeout_secs must be at least 1".into());
        }
        if self.notifications.enabled
            && self.notifications.timeout_secs >= self.server.request_timeout_secs
        {
            return Err(format!(
                "notifications.timeout_secs ({}) must be lower than server.request_timeout_secs ({})",
                self.notifications.timeout_secs, self.server.request_timeout_secs
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.auth.jwt.secret.is_none());
        assert!(!config.notifications.enabled);
        assert!(config.notifications.strict_decisions);
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_validate_relay_timeout() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_ok());

        config.notifications.enabled = true;
        config.notifications.relay_url = Some("http://relay.local/send".to_string());
        config.notifications.timeout_secs = 30;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("notifications.timeout_secs"));

        config.notifications.timeout_secs = 29;
        assert!(config.validate().is_ok());

        // Disabled notifications never wait on the relay
        config.notifications.enabled = false;
        config.notifications.timeout_secs = 120;
        assert!(config.validate().is_ok());

        config.server.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_db_paths() {
        let config = ServerConfig::default();
        assert_eq!(config.database_path(), PathBuf::from("data/infocare.sqlite"));
        assert_eq!(config.audit_db_path(), PathBuf::from("data/audit.sqlite"));
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
server:
  port: 9090
auth:
  jwt:
    secret: "ward-secret"
log:
  format: json
notifications:
  enabled: true
  relay_url: "http://relay.local/send"
  strict_decisions: false
"#;
        let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.jwt.secret.as_deref(), Some("ward-secret"));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");
        assert!(config.notifications.enabled);
        assert!(!config.notifications.strict_decisions);
        assert_eq!(config.notifications.timeout_secs, 10);
    }
}
