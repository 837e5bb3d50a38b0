use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Connection settings for a single CouchDB database
#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    /// Database name, e.g. "my-db"
    pub name: String,
    #[serde(default)]
    pub create_db_if_not_exist: bool,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Socket read timeout in milliseconds, 0 disables it.
    /// Applies between reads, so a slow but progressing body is not cut off.
    #[serde(default)]
    pub socket_timeout_ms: u64,
    /// Connect timeout in milliseconds, 0 disables it
    #[serde(default)]
    pub connection_timeout_ms: u64,
    /// Idle connections kept per host
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5984
}

fn default_max_connections() -> usize {
    100
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Config for `name` on the default local server
    pub fn for_database(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Server root, `{protocol}://{host}:{port}/`
    pub fn base_uri(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}://{}:{}/", self.protocol, self.host, self.port))
    }

    pub fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
    }
}

// password is redacted so configs can be logged
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .field("create_db_if_not_exist", &self.create_db_if_not_exist)
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("socket_timeout_ms", &self.socket_timeout_ms)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: String::new(),
            create_db_if_not_exist: false,
            protocol: default_protocol(),
            host: default_host(),
            port: default_port(),
            username: None,
            password: None,
            socket_timeout_ms: 0,
            connection_timeout_ms: 0,
            max_connections: default_max_connections(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"name": "albums"}"#).unwrap();

        assert_eq!(config.name, "albums");
        assert!(!config.create_db_if_not_exist);
        assert_eq!(config.protocol, "http");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5984);
        assert_eq!(config.max_connections, 100);
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "name": "albums",
                "create_db_if_not_exist": true,
                "protocol": "https",
                "host": "couch.internal",
                "port": 6984,
                "username": "admin",
                "password": "secret",
                "socket_timeout_ms": 5000
            }}"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert!(config.create_db_if_not_exist);
        assert!(config.has_credentials());
        assert_eq!(config.socket_timeout_ms, 5000);
        assert_eq!(config.connection_timeout_ms, 0);
        assert_eq!(
            config.base_uri().unwrap().as_str(),
            "https://couch.internal:6984/"
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config {
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
            ..Config::for_database("albums")
        };

        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("\"***\""));
        assert!(printed.contains("admin"));

        let anonymous = format!("{:?}", Config::for_database("albums"));
        assert!(anonymous.contains("password: None"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Config::load("/nonexistent/couchkit.json").is_err());
    }

    #[test]
    fn test_base_uri_rejects_garbage_host() {
        let config = Config {
            host: "bad host".to_string(),
            ..Config::for_database("albums")
        };
        assert!(config.base_uri().is_err());
    }
}
