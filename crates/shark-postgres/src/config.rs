//! PostgreSQL connection configuration.

use std::collections::HashMap;
use std::time::Duration;

/// PostgreSQL connection configuration. TLS is never negotiated; the
/// startup sequence always proceeds straight to cleartext/MD5 auth.
#[derive(Debug, Clone)]
pub struct PgConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub application_name: Option<String>,
    pub connect_timeout: Duration,
    /// Extra `key,value` pairs appended to the startup message.
    pub options: HashMap<String, String>,
}

impl Default for PgConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: String::new(),
            password: None,
            database: String::new(),
            application_name: None,
            connect_timeout: Duration::from_secs(30),
            options: HashMap::new(),
        }
    }
}

impl PgConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, user: impl Into<String>, database: impl Into<String>) -> Self {
        Self { host: host.into(), user: user.into(), database: database.into(), ..Default::default() }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// `(key, value)` pairs written into the `StartupMessage` body, in
    /// order: `user`, `database`, then any extra options.
    #[must_use]
    pub fn startup_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("user".to_string(), self.user.clone()), ("database".to_string(), self.database.clone())];
        if let Some(app_name) = &self.application_name {
            params.push(("application_name".to_string(), app_name.clone()));
        }
        for (k, v) in &self.options {
            params.push((k.clone(), v.clone()));
        }
        params
    }

    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = PgConfig::new("localhost", "postgres", "testdb")
            .port(5433)
            .password("secret")
            .application_name("myapp")
            .connect_timeout(Duration::from_secs(10))
            .option("timezone", "UTC");

        assert_eq!(config.port, 5433);
        assert_eq!(config.password, Some("secret".to_string()));
        assert_eq!(config.application_name, Some("myapp".to_string()));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.options.get("timezone"), Some(&"UTC".to_string()));
    }

    #[test]
    fn startup_params_lead_with_user_and_database() {
        let config = PgConfig::new("localhost", "postgres", "testdb");
        let params = config.startup_params();
        assert_eq!(params[0], ("user".to_string(), "postgres".to_string()));
        assert_eq!(params[1], ("database".to_string(), "testdb".to_string()));
    }

    #[test]
    fn socket_addr_joins_host_and_port() {
        let config = PgConfig::new("db.example.com", "user", "db").port(5433);
        assert_eq!(config.socket_addr(), "db.example.com:5433");
    }

    #[test]
    fn default_config_has_no_password() {
        let config = PgConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert!(config.password.is_none());
    }
}
